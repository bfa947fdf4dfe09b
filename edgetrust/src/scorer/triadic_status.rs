//! # Triadic Status Module.
//!
//! Status reasoning over length two paths. Each link around a third node `w`
//! is read as a status step: `u -> w` positive, or `w -> u` negative, means
//! `w` ranks above `u`. When both steps of `u, w, v` point the same way the
//! triad is evidence that `v` ranks above (or below) `u`.

use crate::{
	error::EdgeTrustError,
	graph::SignedGraph,
	scorer::{require_node, Method, Predictor, ReputationModel, Scorer},
};

/// Triadic Status scorer.
#[derive(Clone, Copy, Debug, Default)]
pub struct TriadicStatus;

/// Snapshot of the graph the status votes are read from.
#[derive(Clone, Debug, Default)]
pub struct TriadicStatusModel {
	/// Graph the model was fit on.
	pub graph: SignedGraph,
	/// Prediction when no triad carries evidence.
	pub mean_weight: f64,
}

impl Scorer for TriadicStatus {
	fn method(&self) -> Method {
		Method::TriadicStatus
	}

	fn fit(&self, graph: &SignedGraph) -> ReputationModel {
		ReputationModel::TriadicStatus(TriadicStatusModel {
			graph: graph.clone(),
			mean_weight: graph.mean_weight().unwrap_or(0.0),
		})
	}
}

impl TriadicStatusModel {
	/// Status step from `from` to `to` with the magnitude of the link.
	fn step(&self, from: &str, to: &str) -> Option<(f64, f64)> {
		if let Some(edge) = self.graph.edge(from, to) {
			return Some((edge.sign.factor(), edge.weight.abs()));
		}
		self.graph.edge(to, from).map(|edge| (-edge.sign.factor(), edge.weight.abs()))
	}

	/// Status votes of every triad closing `source -> target`.
	pub fn votes(&self, source: &str, target: &str) -> Vec<f64> {
		self.graph
			.neighbours(source)
			.into_iter()
			.filter(|middle| middle.as_str() != target)
			.filter_map(|middle| {
				let (first, first_magnitude) = self.step(source, middle)?;
				let (second, second_magnitude) = self.step(middle, target)?;
				if first != second {
					return None;
				}
				Some(first * (first_magnitude + second_magnitude) / 2.0)
			})
			.collect()
	}
}

impl Predictor for TriadicStatusModel {
	fn predict(&self, source: &str, target: &str) -> Result<f64, EdgeTrustError> {
		require_node(&self.graph, source)?;
		require_node(&self.graph, target)?;

		let votes = self.votes(source, target);
		if votes.is_empty() {
			return Ok(self.mean_weight);
		}

		Ok(votes.iter().sum::<f64>() / votes.len() as f64)
	}
}
