//! # PageRank Module.
//!
//! Random walk stationary distribution where an edge's transition weight is
//! its binarized sign, so negative ratings pass on no reputation.

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

/// Default damping factor.
pub const DEFAULT_DAMPING: f64 = 0.85;

/// PageRank scorer.
#[derive(Clone, Copy, Debug)]
pub struct PageRank {
	damping: f64,
	params: IterationParams,
}

impl Default for PageRank {
	fn default() -> Self {
		Self::new(DEFAULT_DAMPING, IterationParams::default())
	}
}

impl PageRank {
	/// Creates a new PageRank scorer.
	pub fn new(damping: f64, params: IterationParams) -> Self {
		Self { damping, params }
	}
}

/// PageRank scores with their weight calibration.
#[derive(Clone, Debug, Default)]
pub struct PageRankModel {
	/// Stationary probability of each node. Sums to 1.
	pub scores: BTreeMap<NodeId, f64>,
	/// Iteration outcome.
	pub convergence: Convergence,
	/// Map from `N * pr(target)` to edge weight.
	pub calibration: Calibration,
}

impl Scorer for PageRank {
	fn method(&self) -> Method {
		Method::PageRank
	}

	fn fit(&self, graph: &SignedGraph) -> ReputationModel {
		if graph.is_empty() {
			return ReputationModel::PageRank(PageRankModel::default());
		}

		let nodes: Vec<&NodeId> = graph.nodes().collect();
		let index: BTreeMap<&str, usize> =
			nodes.iter().enumerate().map(|(i, node)| (node.as_str(), i)).collect();
		let n = nodes.len();
		let n_f = n as f64;

		let mut out_weight = vec![0.0; n];
		let mut links = Vec::with_capacity(graph.edge_count());
		for (source, target, edge) in graph.edges() {
			let (u, v) = (index[source.as_str()], index[target.as_str()]);
			out_weight[u] += edge.signed_weight;
			if edge.signed_weight > 0.0 {
				links.push((u, v, edge.signed_weight));
			}
		}

		let mut x = vec![1.0 / n_f; n];
		let mut convergence = Convergence { iterations: 0, converged: false };
		for iteration in 1..=self.params.max_iterations {
			let dangling: f64 = (0..n).filter(|&u| out_weight[u] == 0.0).map(|u| x[u]).sum();
			let base = (1.0 - self.damping) / n_f + self.damping * dangling / n_f;

			let mut next = vec![base; n];
			for &(u, v, weight) in &links {
				next[v] += self.damping * x[u] * weight / out_weight[u];
			}

			let err: f64 = next.iter().zip(&x).map(|(a, b)| (a - b).abs()).sum();
			x = next;
			convergence.iterations = iteration;

			if err < n_f * self.params.tolerance {
				convergence.converged = true;
				break;
			}
		}

		if !convergence.converged {
			warn!(
				"PageRank did not converge after {} iterations.",
				convergence.iterations
			);
		}

		let scores: BTreeMap<NodeId, f64> =
			nodes.into_iter().cloned().zip(x.iter().copied()).collect();
		let calibration = Calibration::fit(
			graph.edges().map(|(_, target, edge)| (n_f * scores[target], edge.weight)),
		);

		ReputationModel::PageRank(PageRankModel { scores, convergence, calibration })
	}
}

impl PageRankModel {
	/// Uncalibrated feature of `source -> target`.
	pub fn feature(&self, source: &str, target: &str) -> Result<f64, EdgeTrustError> {
		score_of(&self.scores, source)?;
		let rank = score_of(&self.scores, target)?;
		Ok(self.scores.len() as f64 * rank)
	}
}

impl Predictor for PageRankModel {
	fn predict(&self, source: &str, target: &str) -> Result<f64, EdgeTrustError> {
		self.feature(source, target).map(|feature| self.calibration.apply(feature))
	}
}
