//! # Bias-Deserve Module.
//!
//! A node's bias is half the average amount by which its ratings exceed what
//! the rated nodes deserve. A node's deserve is the average rating it receives
//! after discounting ratings that agree with the rater's bias.

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

/// Bias-Deserve scorer.
#[derive(Clone, Copy, Debug, Default)]
pub struct BiasDeserve {
	params: IterationParams,
}

impl BiasDeserve {
	/// Creates a new Bias-Deserve scorer.
	pub fn new(params: IterationParams) -> Self {
		Self { params }
	}
}

/// Bias and deserve of every node, on the weight scale.
#[derive(Clone, Debug, Default)]
pub struct BiasDeserveModel {
	/// Rating tendency of a node relative to what its targets deserve.
	pub bias: BTreeMap<NodeId, f64>,
	/// Bias-corrected rating a node receives.
	pub deserve: BTreeMap<NodeId, f64>,
	/// Iteration outcome.
	pub convergence: Convergence,
	/// Map from `deserve(target) + 2 * bias(source)` to edge weight.
	pub calibration: Calibration,
}

impl Scorer for BiasDeserve {
	fn method(&self) -> Method {
		Method::BiasDeserve
	}

	fn fit(&self, graph: &SignedGraph) -> ReputationModel {
		if graph.is_empty() {
			return ReputationModel::BiasDeserve(BiasDeserveModel::default());
		}

		let scale = graph.weight_scale();

		let mut bias: BTreeMap<NodeId, f64> = graph.nodes().map(|node| (node.clone(), 0.0)).collect();
		let mut deserve: BTreeMap<NodeId, f64> =
			graph.nodes().map(|node| (node.clone(), 0.0)).collect();

		let mut convergence = Convergence { iterations: 0, converged: false };
		for iteration in 1..=self.params.max_iterations {
			let next_deserve: BTreeMap<NodeId, f64> = graph
				.nodes()
				.map(|node| {
					let degree = graph.in_degree(node);
					if degree == 0 {
						return (node.clone(), 0.0);
					}
					let sum: f64 = graph
						.in_edges(node)
						.map(|(source, edge)| {
							let weight = edge.weight / scale;
							let agreement = (bias[source] * weight).max(0.0);
							weight * (1.0 - agreement)
						})
						.sum();
					(node.clone(), sum / degree as f64)
				})
				.collect();

			let next_bias: BTreeMap<NodeId, f64> = graph
				.nodes()
				.map(|node| {
					let degree = graph.out_degree(node);
					if degree == 0 {
						return (node.clone(), 0.0);
					}
					let excess: f64 = graph
						.out_edges(node)
						.map(|(target, edge)| edge.weight / scale - next_deserve[target])
						.sum();
					(node.clone(), excess / (2.0 * degree as f64))
				})
				.collect();

			let change =
				max_change(&deserve, &next_deserve).max(max_change(&bias, &next_bias));
			deserve = next_deserve;
			bias = next_bias;
			convergence.iterations = iteration;

			if change < self.params.tolerance {
				convergence.converged = true;
				break;
			}
		}

		if !convergence.converged {
			warn!(
				"Bias-Deserve did not converge after {} iterations.",
				convergence.iterations
			);
		}

		for value in bias.values_mut().chain(deserve.values_mut()) {
			*value *= scale;
		}

		let calibration = Calibration::fit(graph.edges().map(|(source, target, edge)| {
			(deserve[target] + 2.0 * bias[source], edge.weight)
		}));

		ReputationModel::BiasDeserve(BiasDeserveModel { bias, deserve, convergence, calibration })
	}
}

impl BiasDeserveModel {
	/// Uncalibrated feature of `source -> target`.
	pub fn feature(&self, source: &str, target: &str) -> Result<f64, EdgeTrustError> {
		let bias = score_of(&self.bias, source)?;
		let deserve = score_of(&self.deserve, target)?;
		Ok(deserve + 2.0 * bias)
	}
}

impl Predictor for BiasDeserveModel {
	fn predict(&self, source: &str, target: &str) -> Result<f64, EdgeTrustError> {
		self.feature(source, target).map(|feature| self.calibration.apply(feature))
	}
}

#[cfg(test)]
mod tests {
	use crate::{graph::SignedGraph, scorer::bias_deserve::*};

	fn fit(graph: &SignedGraph) -> BiasDeserveModel {
		match BiasDeserve::default().fit(graph) {
			ReputationModel::BiasDeserve(model) => model,
			_ => unreachable!(),
		}
	}

	#[test]
	fn test_generous_rater_has_positive_bias() {
		let mut graph = SignedGraph::new();
		for target in ["x", "y", "z"] {
			graph.add_edge("generous", target, 10.0);
			graph.add_edge("strict", target, -10.0);
			graph.add_edge("neutral", target, 0.0);
		}

		let model = fit(&graph);

		assert!(model.convergence.converged);
		assert!(model.bias["generous"] > 0.0);
		assert!(model.bias["strict"] < 0.0);
		assert!(model.bias["generous"] > model.bias["neutral"]);
		assert!(model.bias["neutral"] > model.bias["strict"]);
		for node in ["x", "y", "z"] {
			assert!((model.deserve[node] - model.deserve["x"]).abs() < 1e-12);
		}
	}

	#[test]
	fn test_fit_is_deterministic() {
		let mut graph = SignedGraph::new();
		graph.add_edge("1", "2", 3.0);
		graph.add_edge("2", "3", -1.0);
		graph.add_edge("3", "1", 2.0);
		graph.add_edge("1", "3", 1.0);

		let first = fit(&graph);
		let second = fit(&graph);

		assert_eq!(first.bias, second.bias);
		assert_eq!(first.deserve, second.deserve);
	}

	#[test]
	fn test_unconverged_is_flagged() {
		let mut graph = SignedGraph::new();
		graph.add_edge("a", "c", 4.0);
		graph.add_edge("b", "c", -2.0);
		graph.add_edge("c", "a", 1.0);

		let params = IterationParams { max_iterations: 1, tolerance: 1e-15 };
		let model = match BiasDeserve::new(params).fit(&graph) {
			ReputationModel::BiasDeserve(model) => model,
			_ => unreachable!(),
		};

		assert!(!model.convergence.converged);
		assert_eq!(model.convergence.iterations, 1);
		assert_eq!(model.bias.len(), 3);
		assert!(model.bias.values().chain(model.deserve.values()).all(|v| v.is_finite()));
	}
}
