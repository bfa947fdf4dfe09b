//! # Signed HITS Module.
//!
//! Hub and authority scores where a negative edge propagates with the opposite
//! sign: an authority pointed to by a good hub through a negative edge is
//! penalized, and a hub that distrusts good authorities loses hub score.

use crate::{
	calibration::Calibration,
	error::EdgeTrustError,
	graph::{NodeId, SignedGraph},
	scorer::{
		score_of, Convergence, IterationParams, Method, Predictor, ReputationModel, Scorer,
	},
};
use log::warn;
use std::collections::BTreeMap;

/// Signed HITS scorer.
#[derive(Clone, Copy, Debug, Default)]
pub struct SignedHits {
	params: IterationParams,
}

impl SignedHits {
	/// Creates a new Signed HITS scorer.
	pub fn new(params: IterationParams) -> Self {
		Self { params }
	}
}

/// Hub and authority scores, each L2-normalized.
#[derive(Clone, Debug, Default)]
pub struct SignedHitsModel {
	/// Hub score of each node.
	pub hubs: BTreeMap<NodeId, f64>,
	/// Authority score of each node.
	pub authorities: BTreeMap<NodeId, f64>,
	/// Iteration outcome.
	pub convergence: Convergence,
	/// Map from `authority(target)` to edge weight.
	pub calibration: Calibration,
}

fn normalize(values: &mut [f64]) {
	let norm = values.iter().map(|value| value * value).sum::<f64>().sqrt();
	if norm > 0.0 {
		for value in values.iter_mut() {
			*value /= norm;
		}
	}
}

impl Scorer for SignedHits {
	fn method(&self) -> Method {
		Method::SignedHits
	}

	fn fit(&self, graph: &SignedGraph) -> ReputationModel {
		if graph.is_empty() {
			return ReputationModel::SignedHits(SignedHitsModel::default());
		}

		let nodes: Vec<&NodeId> = graph.nodes().collect();
		let index: BTreeMap<&str, usize> =
			nodes.iter().enumerate().map(|(i, node)| (node.as_str(), i)).collect();
		let n = nodes.len();

		let links: Vec<(usize, usize, f64)> = graph
			.edges()
			.map(|(source, target, edge)| {
				(index[source.as_str()], index[target.as_str()], edge.sign.factor())
			})
			.collect();

		let mut hubs = vec![1.0; n];
		let mut authorities = vec![1.0; n];
		normalize(&mut hubs);
		normalize(&mut authorities);

		let mut convergence = Convergence { iterations: 0, converged: false };
		for iteration in 1..=self.params.max_iterations {
			let mut next_authorities = vec![0.0; n];
			for &(u, v, sign) in &links {
				next_authorities[v] += sign * hubs[u];
			}
			normalize(&mut next_authorities);

			let mut next_hubs = vec![0.0; n];
			for &(u, v, sign) in &links {
				next_hubs[u] += sign * next_authorities[v];
			}
			normalize(&mut next_hubs);

			let change = hubs
				.iter()
				.zip(&next_hubs)
				.chain(authorities.iter().zip(&next_authorities))
				.map(|(old, new)| (old - new).abs())
				.fold(0.0, f64::max);

			hubs = next_hubs;
			authorities = next_authorities;
			convergence.iterations = iteration;

			if change < self.params.tolerance {
				convergence.converged = true;
				break;
			}
		}

		if !convergence.converged {
			warn!(
				"Signed HITS did not converge after {} iterations.",
				convergence.iterations
			);
		}

		let hubs: BTreeMap<NodeId, f64> = nodes.iter().map(|node| (*node).clone()).zip(hubs).collect();
		let authorities: BTreeMap<NodeId, f64> =
			nodes.into_iter().cloned().zip(authorities).collect();
		let calibration = Calibration::fit(
			graph.edges().map(|(_, target, edge)| (authorities[target], edge.weight)),
		);

		ReputationModel::SignedHits(SignedHitsModel { hubs, authorities, convergence, calibration })
	}
}

impl SignedHitsModel {
	/// Uncalibrated feature of `source -> target`.
	pub fn feature(&self, source: &str, target: &str) -> Result<f64, EdgeTrustError> {
		score_of(&self.hubs, source)?;
		score_of(&self.authorities, target)
	}
}

impl Predictor for SignedHitsModel {
	fn predict(&self, source: &str, target: &str) -> Result<f64, EdgeTrustError> {
		self.feature(source, target).map(|feature| self.calibration.apply(feature))
	}
}
