//! # Reciprocal Module.
//!
//! Predicts that a node returns the rating it received: the weight of
//! `source -> target` is the weight of `target -> source` when that edge
//! exists.

use crate::{
	error::EdgeTrustError,
	graph::SignedGraph,
	scorer::{require_node, Method, Predictor, ReputationModel, Scorer},
};

/// Reciprocal scorer.
#[derive(Clone, Copy, Debug, Default)]
pub struct Reciprocal;

/// Snapshot of the graph the reciprocal predictor looks up.
#[derive(Clone, Debug, Default)]
pub struct ReciprocalModel {
	/// Graph the model was fit on.
	pub graph: SignedGraph,
	/// Mean weight of the snapshot.
	pub mean_weight: f64,
}

impl Scorer for Reciprocal {
	fn method(&self) -> Method {
		Method::Reciprocal
	}

	fn fit(&self, graph: &SignedGraph) -> ReputationModel {
		ReputationModel::Reciprocal(ReciprocalModel {
			graph: graph.clone(),
			mean_weight: graph.mean_weight().unwrap_or(0.0),
		})
	}
}

impl Predictor for ReciprocalModel {
	/// Reverse edge weight, else the mean rating `target` receives, else the
	/// mean weight of the snapshot.
	fn predict(&self, source: &str, target: &str) -> Result<f64, EdgeTrustError> {
		require_node(&self.graph, source)?;
		require_node(&self.graph, target)?;

		if let Some(weight) = self.graph.weight(target, source) {
			return Ok(weight);
		}

		let degree = self.graph.in_degree(target);
		if degree > 0 {
			let sum: f64 = self.graph.in_edges(target).map(|(_, edge)| edge.weight).sum();
			return Ok(sum / degree as f64);
		}

		Ok(self.mean_weight)
	}
}
