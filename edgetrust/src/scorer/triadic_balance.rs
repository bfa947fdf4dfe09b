//! # Triadic Balance Module.
//!
//! Structural balance over length two paths: every third node `w` linked to
//! both endpoints votes for the sign the triad needs to be balanced. The
//! friend of a friend is a friend, the enemy of an enemy is a friend and the
//! friend of an enemy is an enemy.

use crate::{
	error::EdgeTrustError,
	graph::SignedGraph,
	scorer::{require_node, Method, Predictor, ReputationModel, Scorer},
};

/// Triadic Balance scorer.
#[derive(Clone, Copy, Debug, Default)]
pub struct TriadicBalance;

/// Snapshot of the graph the balance votes are read from.
#[derive(Clone, Debug, Default)]
pub struct TriadicBalanceModel {
	/// Graph the model was fit on.
	pub graph: SignedGraph,
	/// Prediction when no triad closes the edge.
	pub mean_weight: f64,
}

impl Scorer for TriadicBalance {
	fn method(&self) -> Method {
		Method::TriadicBalance
	}

	fn fit(&self, graph: &SignedGraph) -> ReputationModel {
		ReputationModel::TriadicBalance(TriadicBalanceModel {
			graph: graph.clone(),
			mean_weight: graph.mean_weight().unwrap_or(0.0),
		})
	}
}

impl TriadicBalanceModel {
	/// Balance votes of every triad closing `source -> target`.
	pub fn votes(&self, source: &str, target: &str) -> Vec<f64> {
		self.graph
			.neighbours(source)
			.into_iter()
			.filter(|middle| middle.as_str() != target)
			.filter_map(|middle| {
				let first = self.graph.link(source, middle)?;
				let second = self.graph.link(middle, target)?;
				let product = first.weight * second.weight;
				Some(product.signum() * product.abs().sqrt())
			})
			.collect()
	}
}

impl Predictor for TriadicBalanceModel {
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
