//! # Fairness-Goodness Module.
//!
//! Coupled fixed point: a node's goodness is the fairness-weighted average of
//! the ratings it receives, and a node's fairness is one minus the average
//! deviation of its ratings from the goodness of the rated nodes.
//!
//! Weights are scaled into `[-1, 1]` by the graph's largest absolute weight
//! for the updates; goodness is reported back on the original scale.

use crate::{
	calibration::Calibration,
	error::EdgeTrustError,
	graph::{NodeId, SignedGraph},
	scorer::{
		max_change, score_of, Convergence, IterationParams, Method, Predictor, ReputationModel,
		Scorer,
	},
};
use log::warn;
use std::collections::BTreeMap;

/// Fairness-Goodness scorer.
#[derive(Clone, Copy, Debug, Default)]
pub struct FairnessGoodness {
	params: IterationParams,
}

impl FairnessGoodness {
	/// Creates a new Fairness-Goodness scorer.
	pub fn new(params: IterationParams) -> Self {
		Self { params }
	}
}

/// Fairness and goodness of every node.
#[derive(Clone, Debug, Default)]
pub struct FairnessGoodnessModel {
	/// Reliability of a node as a rater, in `[0, 1]`.
	pub fairness: BTreeMap<NodeId, f64>,
	/// Deserved rating of a node, on the weight scale.
	pub goodness: BTreeMap<NodeId, f64>,
	/// Iteration outcome.
	pub convergence: Convergence,
	/// Map from `f(source) * g(target)` to edge weight.
	pub calibration: Calibration,
}

impl Scorer for FairnessGoodness {
	fn method(&self) -> Method {
		Method::FairnessGoodness
	}

	fn fit(&self, graph: &SignedGraph) -> ReputationModel {
		if graph.is_empty() {
			return ReputationModel::FairnessGoodness(FairnessGoodnessModel::default());
		}

		let scale = graph.weight_scale();

		let mut fairness: BTreeMap<NodeId, f64> =
			graph.nodes().map(|node| (node.clone(), 1.0)).collect();
		let mut goodness: BTreeMap<NodeId, f64> = graph
			.nodes()
			.map(|node| {
				let (sum, count) = graph
					.in_edges(node)
					.fold((0.0, 0usize), |(sum, count), (_, edge)| (sum + edge.weight, count + 1));
				let initial = if count == 0 { 0.0 } else { sum / (scale * count as f64) };
				(node.clone(), initial)
			})
			.collect();

		let mut convergence = Convergence { iterations: 0, converged: false };
		for iteration in 1..=self.params.max_iterations {
			let next_goodness: BTreeMap<NodeId, f64> = graph
				.nodes()
				.map(|node| {
					let degree = graph.in_degree(node);
					if degree == 0 {
						return (node.clone(), 0.0);
					}
					let sum: f64 = graph
						.in_edges(node)
						.map(|(source, edge)| fairness[source] * edge.weight / scale)
						.sum();
					(node.clone(), sum / degree as f64)
				})
				.collect();

			let next_fairness: BTreeMap<NodeId, f64> = graph
				.nodes()
				.map(|node| {
					let degree = graph.out_degree(node);
					if degree == 0 {
						return (node.clone(), 1.0);
					}
					let deviation: f64 = graph
						.out_edges(node)
						.map(|(target, edge)| (edge.weight / scale - next_goodness[target]).abs())
						.sum();
					(node.clone(), 1.0 - deviation / (2.0 * degree as f64))
				})
				.collect();

			let change = max_change(&goodness, &next_goodness)
				.max(max_change(&fairness, &next_fairness));
			goodness = next_goodness;
			fairness = next_fairness;
			convergence.iterations = iteration;

			if change < self.params.tolerance {
				convergence.converged = true;
				break;
			}
		}

		if !convergence.converged {
			warn!(
				"Fairness-Goodness did not converge after {} iterations.",
				convergence.iterations
			);
		}

		for value in goodness.values_mut() {
			*value *= scale;
		}

		let calibration = Calibration::fit(
			graph
				.edges()
				.map(|(source, target, edge)| (fairness[source] * goodness[target], edge.weight)),
		);

		ReputationModel::FairnessGoodness(FairnessGoodnessModel {
			fairness,
			goodness,
			convergence,
			calibration,
		})
	}
}

impl FairnessGoodnessModel {
	/// Uncalibrated feature of `source -> target`.
	pub fn feature(&self, source: &str, target: &str) -> Result<f64, EdgeTrustError> {
		let fairness = score_of(&self.fairness, source)?;
		let goodness = score_of(&self.goodness, target)?;
		Ok(fairness * goodness)
	}
}

impl Predictor for FairnessGoodnessModel {
	fn predict(&self, source: &str, target: &str) -> Result<f64, EdgeTrustError> {
		self.feature(source, target).map(|feature| self.calibration.apply(feature))
	}
}

#[cfg(test)]
mod tests {
	use crate::{graph::SignedGraph, scorer::fairness_goodness::*};

	fn fit(graph: &SignedGraph) -> FairnessGoodnessModel {
		match FairnessGoodness::default().fit(graph) {
			ReputationModel::FairnessGoodness(model) => model,
			_ => unreachable!(),
		}
	}

	fn network() -> SignedGraph {
		let mut graph = SignedGraph::new();
		graph.add_edge("alice", "bob", 8.0);
		graph.add_edge("carol", "bob", 9.0);
		graph.add_edge("dave", "bob", -10.0);
		graph.add_edge("alice", "erin", -6.0);
		graph.add_edge("carol", "erin", -7.0);
		graph.add_edge("dave", "erin", 10.0);
		graph.add_edge("bob", "alice", 3.0);
		graph
	}

	#[test]
	fn test_fit_is_deterministic() {
		let graph = network();
		let first = fit(&graph);
		let second = fit(&graph);

		assert_eq!(first.fairness, second.fairness);
		assert_eq!(first.goodness, second.goodness);
		assert_eq!(first.calibration, second.calibration);
	}

	#[test]
	fn test_constant_weights_converge_to_constant() {
		for c in [4.0, -2.5, 0.0] {
			let mut graph = SignedGraph::new();
			for (source, target) in [("a", "b"), ("b", "c"), ("c", "a"), ("a", "c"), ("d", "b")] {
				graph.add_edge(source, target, c);
			}

			let model = fit(&graph);

			assert!(model.convergence.converged);
			for node in ["a", "b", "c"] {
				assert!((model.goodness[node] - c).abs() < 1e-9);
			}
			for fairness in model.fairness.values() {
				assert!((fairness - 1.0).abs() < 1e-9);
			}
		}
	}

	#[test]
	fn test_dissenting_rater_is_less_fair() {
		let model = fit(&network());

		assert!(model.fairness["dave"] < model.fairness["alice"]);
		assert!(model.fairness["dave"] < model.fairness["carol"]);
		assert!(model.goodness["bob"] > model.goodness["erin"]);
		for fairness in model.fairness.values() {
			assert!((0.0..=1.0).contains(fairness));
		}
	}

	#[test]
	fn test_nodes_without_ratings_have_zero_goodness() {
		let model = fit(&network());

		assert_eq!(model.goodness["dave"], 0.0);
		assert_eq!(model.fairness["erin"], 1.0);
	}

	#[test]
	fn test_unconverged_is_flagged() {
		let params = IterationParams { max_iterations: 1, tolerance: 1e-15 };
		let model = match FairnessGoodness::new(params).fit(&network()) {
			ReputationModel::FairnessGoodness(model) => model,
			_ => unreachable!(),
		};

		assert!(!model.convergence.converged);
		assert_eq!(model.convergence.iterations, 1);
		assert_eq!(model.goodness.len(), 5);
		assert!(model.fairness.values().chain(model.goodness.values()).all(|v| v.is_finite()));
	}
}
