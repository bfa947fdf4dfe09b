//! # Scorer Module.
//!
//! Reputation scorers over a signed graph and the edge weight predictors built
//! on their models. Every scorer is a pure function of an immutable graph
//! snapshot; the resulting [`ReputationModel`] never changes after `fit`.

pub mod bias_deserve;
pub mod fairness_goodness;
pub mod page_rank;
pub mod reciprocal;
pub mod signed_hits;
pub mod status_theory;
pub mod triadic_balance;
pub mod triadic_status;

use crate::{
	error::EdgeTrustError,
	graph::{NodeId, SignedGraph},
};
use bias_deserve::{BiasDeserve, BiasDeserveModel};
use fairness_goodness::{FairnessGoodness, FairnessGoodnessModel};
use page_rank::{PageRank, PageRankModel};
use reciprocal::{Reciprocal, ReciprocalModel};
use serde::{Deserialize, Serialize};
use signed_hits::{SignedHits, SignedHitsModel};
use status_theory::{StatusTheory, StatusTheoryModel};
use std::{
	collections::BTreeMap,
	fmt::{Display, Formatter, Result as FmtResult},
	str::FromStr,
};
use triadic_balance::{TriadicBalance, TriadicBalanceModel};
use triadic_status::{TriadicStatus, TriadicStatusModel};

/// Default iteration budget of the iterative scorers.
pub const DEFAULT_MAX_ITERATIONS: usize = 100;
/// Default convergence tolerance of the iterative scorers.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Prediction method.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Method {
	/// PageRank over binarized signs.
	#[serde(rename = "PR")]
	PageRank,
	/// Fairness and goodness.
	#[serde(rename = "FG")]
	FairnessGoodness,
	/// Signed hubs and authorities.
	#[serde(rename = "SH")]
	SignedHits,
	/// Bias and deserve.
	#[serde(rename = "BD")]
	BiasDeserve,
	/// Reverse edge lookup.
	#[serde(rename = "RP")]
	Reciprocal,
	/// Global status from edge signs.
	#[serde(rename = "ST")]
	StatusTheory,
	/// Balance votes of length two paths.
	#[serde(rename = "TB")]
	TriadicBalance,
	/// Status votes of length two paths.
	#[serde(rename = "TS")]
	TriadicStatus,
	/// Linear regression over the other scorers.
	#[serde(rename = "LR")]
	Regression,
}

impl Method {
	/// Every method, in report order.
	pub const ALL: [Method; 9] = [
		Method::PageRank,
		Method::FairnessGoodness,
		Method::SignedHits,
		Method::BiasDeserve,
		Method::Reciprocal,
		Method::StatusTheory,
		Method::TriadicBalance,
		Method::TriadicStatus,
		Method::Regression,
	];

	/// Short label used in reports.
	pub fn label(&self) -> &'static str {
		match self {
			Method::PageRank => "PR",
			Method::FairnessGoodness => "FG",
			Method::SignedHits => "SH",
			Method::BiasDeserve => "BD",
			Method::Reciprocal => "RP",
			Method::StatusTheory => "ST",
			Method::TriadicBalance => "TB",
			Method::TriadicStatus => "TS",
			Method::Regression => "LR",
		}
	}

	/// Human readable name.
	pub fn name(&self) -> &'static str {
		match self {
			Method::PageRank => "PageRank",
			Method::FairnessGoodness => "Fairness-Goodness",
			Method::SignedHits => "Signed HITS",
			Method::BiasDeserve => "Bias-Deserve",
			Method::Reciprocal => "Reciprocal",
			Method::StatusTheory => "Status Theory",
			Method::TriadicBalance => "Triadic Balance",
			Method::TriadicStatus => "Triadic Status",
			Method::Regression => "Linear Regression",
		}
	}

	/// Whether the method is a standalone scorer rather than the combiner.
	pub fn is_scorer(&self) -> bool {
		*self != Method::Regression
	}

	/// Whether the method's model carries per-node scores the combiner can use.
	pub fn has_node_scores(&self) -> bool {
		matches!(
			self,
			Method::PageRank
				| Method::FairnessGoodness
				| Method::SignedHits
				| Method::BiasDeserve
				| Method::StatusTheory
		)
	}
}

impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}", self.label())
	}
}

impl FromStr for Method {
	type Err = EdgeTrustError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let needle = s.trim();
		Method::ALL
			.into_iter()
			.find(|method| {
				method.label().eq_ignore_ascii_case(needle)
					|| method.name().eq_ignore_ascii_case(needle)
			})
			.ok_or_else(|| EdgeTrustError::ParsingError(format!("Unknown method \"{}\".", s)))
	}
}

/// Budget shared by the iterative scorers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct IterationParams {
	/// Maximum number of update rounds.
	pub max_iterations: usize,
	/// Largest score change considered converged.
	pub tolerance: f64,
}

impl Default for IterationParams {
	fn default() -> Self {
		Self { max_iterations: DEFAULT_MAX_ITERATIONS, tolerance: DEFAULT_TOLERANCE }
	}
}

/// Outcome of an iterative fit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Convergence {
	/// Update rounds performed.
	pub iterations: usize,
	/// Whether the tolerance was reached within the budget.
	pub converged: bool,
}

impl Default for Convergence {
	fn default() -> Self {
		Self::trivial()
	}
}

impl Convergence {
	/// Convergence of a model fit on an empty graph.
	pub fn trivial() -> Self {
		Self { iterations: 0, converged: true }
	}
}

/// Computes a reputation model from a graph snapshot.
pub trait Scorer {
	/// The method this scorer implements.
	fn method(&self) -> Method;
	/// Fits the model.
	fn fit(&self, graph: &SignedGraph) -> ReputationModel;
}

/// Predicts the weight of an edge.
pub trait Predictor {
	/// Predicted weight of `source -> target`.
	fn predict(&self, source: &str, target: &str) -> Result<f64, EdgeTrustError>;
}

/// Per-scorer reputation state.
#[derive(Clone, Debug)]
pub enum ReputationModel {
	/// PageRank scores.
	PageRank(PageRankModel),
	/// Fairness and goodness scores.
	FairnessGoodness(FairnessGoodnessModel),
	/// Hub and authority scores.
	SignedHits(SignedHitsModel),
	/// Bias and deserve scores.
	BiasDeserve(BiasDeserveModel),
	/// Reverse edge snapshot.
	Reciprocal(ReciprocalModel),
	/// Status scores.
	StatusTheory(StatusTheoryModel),
	/// Balance triad snapshot.
	TriadicBalance(TriadicBalanceModel),
	/// Status triad snapshot.
	TriadicStatus(TriadicStatusModel),
}

impl ReputationModel {
	/// The method that produced the model.
	pub fn method(&self) -> Method {
		match self {
			ReputationModel::PageRank(_) => Method::PageRank,
			ReputationModel::FairnessGoodness(_) => Method::FairnessGoodness,
			ReputationModel::SignedHits(_) => Method::SignedHits,
			ReputationModel::BiasDeserve(_) => Method::BiasDeserve,
			ReputationModel::Reciprocal(_) => Method::Reciprocal,
			ReputationModel::StatusTheory(_) => Method::StatusTheory,
			ReputationModel::TriadicBalance(_) => Method::TriadicBalance,
			ReputationModel::TriadicStatus(_) => Method::TriadicStatus,
		}
	}

	/// Convergence record of iterative models.
	pub fn convergence(&self) -> Option<Convergence> {
		match self {
			ReputationModel::PageRank(model) => Some(model.convergence),
			ReputationModel::FairnessGoodness(model) => Some(model.convergence),
			ReputationModel::SignedHits(model) => Some(model.convergence),
			ReputationModel::BiasDeserve(model) => Some(model.convergence),
			_ => None,
		}
	}

	/// Whether the last iterate met the tolerance. Always `true` for
	/// non-iterative models.
	pub fn is_converged(&self) -> bool {
		self.convergence().map_or(true, |convergence| convergence.converged)
	}

	/// Whether the model has a score for `node`.
	pub fn contains(&self, node: &str) -> bool {
		match self {
			ReputationModel::PageRank(model) => model.scores.contains_key(node),
			ReputationModel::FairnessGoodness(model) => model.goodness.contains_key(node),
			ReputationModel::SignedHits(model) => model.authorities.contains_key(node),
			ReputationModel::BiasDeserve(model) => model.deserve.contains_key(node),
			ReputationModel::Reciprocal(model) => model.graph.contains_node(node),
			ReputationModel::StatusTheory(model) => model.status.contains_key(node),
			ReputationModel::TriadicBalance(model) => model.graph.contains_node(node),
			ReputationModel::TriadicStatus(model) => model.graph.contains_node(node),
		}
	}

	/// Number of nodes covered by the model.
	pub fn len(&self) -> usize {
		match self {
			ReputationModel::PageRank(model) => model.scores.len(),
			ReputationModel::FairnessGoodness(model) => model.goodness.len(),
			ReputationModel::SignedHits(model) => model.authorities.len(),
			ReputationModel::BiasDeserve(model) => model.deserve.len(),
			ReputationModel::Reciprocal(model) => model.graph.node_count(),
			ReputationModel::StatusTheory(model) => model.status.len(),
			ReputationModel::TriadicBalance(model) => model.graph.node_count(),
			ReputationModel::TriadicStatus(model) => model.graph.node_count(),
		}
	}

	/// Whether the model covers no node.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Named per-node score maps. Structural models have none.
	pub fn score_tables(&self) -> Vec<(&'static str, &BTreeMap<NodeId, f64>)> {
		match self {
			ReputationModel::PageRank(model) => vec![("page_rank", &model.scores)],
			ReputationModel::FairnessGoodness(model) => {
				vec![("fairness", &model.fairness), ("goodness", &model.goodness)]
			},
			ReputationModel::SignedHits(model) => {
				vec![("hub", &model.hubs), ("authority", &model.authorities)]
			},
			ReputationModel::BiasDeserve(model) => {
				vec![("bias", &model.bias), ("deserve", &model.deserve)]
			},
			ReputationModel::StatusTheory(model) => vec![("status", &model.status)],
			ReputationModel::Reciprocal(_)
			| ReputationModel::TriadicBalance(_)
			| ReputationModel::TriadicStatus(_) => Vec::new(),
		}
	}

	/// Fixed-order feature vector of a node, `None` for unknown nodes and for
	/// structural models.
	pub fn node_features(&self, node: &str) -> Option<Vec<f64>> {
		let tables = self.score_tables();
		if tables.is_empty() {
			return None;
		}

		let scale = match self {
			ReputationModel::PageRank(model) => model.scores.len() as f64,
			_ => 1.0,
		};

		tables.iter().map(|(_, table)| table.get(node).map(|score| score * scale)).collect()
	}

	/// Width of [`Self::node_features`].
	pub fn feature_width(&self) -> usize {
		self.score_tables().len()
	}
}

impl Predictor for ReputationModel {
	fn predict(&self, source: &str, target: &str) -> Result<f64, EdgeTrustError> {
		match self {
			ReputationModel::PageRank(model) => model.predict(source, target),
			ReputationModel::FairnessGoodness(model) => model.predict(source, target),
			ReputationModel::SignedHits(model) => model.predict(source, target),
			ReputationModel::BiasDeserve(model) => model.predict(source, target),
			ReputationModel::Reciprocal(model) => model.predict(source, target),
			ReputationModel::StatusTheory(model) => model.predict(source, target),
			ReputationModel::TriadicBalance(model) => model.predict(source, target),
			ReputationModel::TriadicStatus(model) => model.predict(source, target),
		}
	}
}

/// Builds the scorer of a method, `None` for the combiner.
pub fn scorer_for(
	method: Method, params: IterationParams, damping: f64,
) -> Option<Box<dyn Scorer>> {
	let scorer: Box<dyn Scorer> = match method {
		Method::PageRank => Box::new(PageRank::new(damping, params)),
		Method::FairnessGoodness => Box::new(FairnessGoodness::new(params)),
		Method::SignedHits => Box::new(SignedHits::new(params)),
		Method::BiasDeserve => Box::new(BiasDeserve::new(params)),
		Method::Reciprocal => Box::new(Reciprocal),
		Method::StatusTheory => Box::new(StatusTheory),
		Method::TriadicBalance => Box::new(TriadicBalance),
		Method::TriadicStatus => Box::new(TriadicStatus),
		Method::Regression => return None,
	};

	Some(scorer)
}

/// Looks up the score of a node.
pub(crate) fn score_of(scores: &BTreeMap<NodeId, f64>, node: &str) -> Result<f64, EdgeTrustError> {
	scores.get(node).copied().ok_or_else(|| EdgeTrustError::UnknownNodeError(node.to_string()))
}

/// Fails with `UnknownNodeError` unless the graph contains the node.
pub(crate) fn require_node(graph: &SignedGraph, node: &str) -> Result<(), EdgeTrustError> {
	if graph.contains_node(node) {
		Ok(())
	} else {
		Err(EdgeTrustError::UnknownNodeError(node.to_string()))
	}
}

/// Largest absolute difference between two score maps over the same keys.
pub(crate) fn max_change(old: &BTreeMap<NodeId, f64>, new: &BTreeMap<NodeId, f64>) -> f64 {
	new.iter()
		.map(|(node, value)| (value - old.get(node).copied().unwrap_or(0.0)).abs())
		.fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
	use crate::{graph::SignedGraph, scorer::*};

	fn toy_graph() -> SignedGraph {
		let mut graph = SignedGraph::new();
		graph.add_edge("A", "B", 3.0);
		graph.add_edge("B", "A", 3.0);
		graph.add_edge("A", "C", -2.0);
		graph.add_edge("C", "B", 1.0);
		graph
	}

	#[test]
	fn test_method_labels() {
		for method in Method::ALL {
			assert_eq!(method.label().parse::<Method>().unwrap(), method);
			assert_eq!(method.name().parse::<Method>().unwrap(), method);
		}
		assert_eq!("fg".parse::<Method>().unwrap(), Method::FairnessGoodness);
		assert!("XX".parse::<Method>().is_err());
		assert_eq!(serde_json::to_string(&Method::SignedHits).unwrap(), "\"SH\"");
	}

	#[test]
	fn test_every_scorer_fits_empty_graph() {
		let graph = SignedGraph::new();
		for method in Method::ALL.into_iter().filter(Method::is_scorer) {
			let scorer = scorer_for(method, IterationParams::default(), 0.85).unwrap();
			let model = scorer.fit(&graph);

			assert_eq!(model.method(), method);
			assert!(model.is_empty());
			assert!(model.is_converged());
			assert!(matches!(
				model.predict("A", "B"),
				Err(EdgeTrustError::UnknownNodeError(_))
			));
		}
		assert!(scorer_for(Method::Regression, IterationParams::default(), 0.85).is_none());
	}

	#[test]
	fn test_every_scorer_covers_graph_nodes() {
		let graph = toy_graph();
		for method in Method::ALL.into_iter().filter(Method::is_scorer) {
			let model = scorer_for(method, IterationParams::default(), 0.85).unwrap().fit(&graph);

			assert_eq!(model.len(), 3);
			for node in ["A", "B", "C"] {
				assert!(model.contains(node));
			}
			let prediction = model.predict("B", "C").unwrap();
			assert!(prediction.is_finite());
			assert!(matches!(
				model.predict("A", "Z"),
				Err(EdgeTrustError::UnknownNodeError(ref node)) if node == "Z"
			));
		}
	}

	#[test]
	fn test_node_features_width() {
		let graph = toy_graph();
		for method in Method::ALL.into_iter().filter(Method::is_scorer) {
			let model = scorer_for(method, IterationParams::default(), 0.85).unwrap().fit(&graph);
			match model.node_features("A") {
				Some(features) => assert_eq!(features.len(), model.feature_width()),
				None => assert_eq!(model.feature_width(), 0),
			}
			assert!(model.node_features("Z").is_none());
		}
	}
}
