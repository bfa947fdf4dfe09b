//! # Status Theory Module.
//!
//! A positive edge `u -> v` states that `v` has higher status than `u`, a
//! negative edge that it has lower status. A node's status is the balance of
//! these statements:
//!
//! `status(x) = in+(x) - in-(x) + out-(x) - out+(x)`
//!
//! The status difference between the endpoints predicts the edge.

use crate::{
	calibration::Calibration,
	error::EdgeTrustError,
	graph::{NodeId, SignedGraph},
	scorer::{score_of, Method, Predictor, ReputationModel, Scorer},
};
use std::collections::BTreeMap;

/// Status Theory scorer.
#[derive(Clone, Copy, Debug, Default)]
pub struct StatusTheory;

/// Status of every node.
#[derive(Clone, Debug, Default)]
pub struct StatusTheoryModel {
	/// Status of each node.
	pub status: BTreeMap<NodeId, f64>,
	/// Map from `status(target) - status(source)` to edge weight.
	pub calibration: Calibration,
}

impl Scorer for StatusTheory {
	fn method(&self) -> Method {
		Method::StatusTheory
	}

	fn fit(&self, graph: &SignedGraph) -> ReputationModel {
		let mut status: BTreeMap<NodeId, f64> =
			graph.nodes().map(|node| (node.clone(), 0.0)).collect();

		for (source, target, edge) in graph.edges() {
			let step = edge.sign.factor();
			if let Some(value) = status.get_mut(target) {
				*value += step;
			}
			if let Some(value) = status.get_mut(source) {
				*value -= step;
			}
		}

		let calibration = Calibration::fit(
			graph
				.edges()
				.map(|(source, target, edge)| (status[target] - status[source], edge.weight)),
		);

		ReputationModel::StatusTheory(StatusTheoryModel { status, calibration })
	}
}

impl StatusTheoryModel {
	/// Uncalibrated feature of `source -> target`.
	pub fn feature(&self, source: &str, target: &str) -> Result<f64, EdgeTrustError> {
		let low = score_of(&self.status, source)?;
		let high = score_of(&self.status, target)?;
		Ok(high - low)
	}
}

impl Predictor for StatusTheoryModel {
	fn predict(&self, source: &str, target: &str) -> Result<f64, EdgeTrustError> {
		self.feature(source, target).map(|feature| self.calibration.apply(feature))
	}
}

#[cfg(test)]
mod tests {
	use crate::{graph::SignedGraph, scorer::status_theory::*};

	fn fit(graph: &SignedGraph) -> StatusTheoryModel {
		match StatusTheory.fit(graph) {
			ReputationModel::StatusTheory(model) => model,
			_ => unreachable!(),
		}
	}

	#[test]
	fn test_status_counts() {
		let mut graph = SignedGraph::new();
		graph.add_edge("low", "high", 2.0);
		graph.add_edge("mid", "high", 1.0);
		graph.add_edge("high", "low", -3.0);
		graph.add_edge("mid", "low", -1.0);

		let model = fit(&graph);

		assert_eq!(model.status["high"], 3.0);
		assert_eq!(model.status["low"], -3.0);
		assert_eq!(model.status["mid"], 0.0);
	}

	#[test]
	fn test_status_difference_predicts_sign() {
		let mut graph = SignedGraph::new();
		let ladder = ["a", "b", "c", "d"];
		for (i, low) in ladder.iter().enumerate() {
			for high in &ladder[i + 1..] {
				graph.add_edge(low, high, 4.0);
				graph.add_edge(high, low, -4.0);
			}
		}
		graph.remove_edge("a", "d").unwrap();

		let model = fit(&graph);

		assert!(model.predict("a", "d").unwrap() > 0.0);
		assert!(model.predict("d", "a").unwrap() < 0.0);
	}
}
