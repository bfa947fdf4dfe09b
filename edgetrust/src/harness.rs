//! # Harness Module.
//!
//! Leave-out evaluation of the prediction methods. Edges are withheld from a
//! private copy of the graph, every configured method is fit on what remains
//! and asked to predict the withheld weights.
//!
//! Two protocols are supported:
//! - leave-one-out over a seeded sample of edges, restoring each edge after
//!   it was predicted,
//! - leave-out-by-percentage, where a fresh random share of the edges is
//!   removed per round.

use crate::{
	error::EdgeTrustError,
	graph::{Edge, NodeId, SignedGraph},
	metrics::{format_metric, ErrorMetrics},
	regression::{RegressionModel, DEFAULT_RIDGE},
	scorer::{
		page_rank::DEFAULT_DAMPING, scorer_for, IterationParams, Method, Predictor,
		ReputationModel, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE,
	},
};
use log::{debug, info, warn};
use rand::{rngs::StdRng, seq::index::sample, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default number of edges sampled for leave-one-out.
pub const DEFAULT_SAMPLE_SIZE: usize = 1000;

fn default_percentages() -> Vec<u32> {
	(10..=90).step_by(10).collect()
}

fn default_sample_size() -> usize {
	DEFAULT_SAMPLE_SIZE
}

fn default_methods() -> Vec<Method> {
	Method::ALL.to_vec()
}

fn default_max_iterations() -> usize {
	DEFAULT_MAX_ITERATIONS
}

fn default_tolerance() -> f64 {
	DEFAULT_TOLERANCE
}

fn default_damping() -> f64 {
	DEFAULT_DAMPING
}

fn default_ridge() -> f64 {
	DEFAULT_RIDGE
}

/// Evaluation configuration settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvaluationConfig {
	/// Seed of the edge sampling.
	pub seed: u64,
	/// Percentages of edges withheld by leave-out-by-percentage, ascending.
	#[serde(default = "default_percentages")]
	pub percentages: Vec<u32>,
	/// Edges sampled by leave-one-out.
	#[serde(default = "default_sample_size")]
	pub sample_size: usize,
	/// Methods to evaluate, in report order.
	#[serde(default = "default_methods")]
	pub methods: Vec<Method>,
	/// Iteration budget of the iterative scorers.
	#[serde(default = "default_max_iterations")]
	pub max_iterations: usize,
	/// Convergence tolerance of the iterative scorers.
	#[serde(default = "default_tolerance")]
	pub tolerance: f64,
	/// PageRank damping factor.
	#[serde(default = "default_damping")]
	pub damping: f64,
	/// Ridge term of the regression combiner.
	#[serde(default = "default_ridge")]
	pub ridge: f64,
}

impl EvaluationConfig {
	/// Creates a configuration with default settings and the given seed.
	pub fn new(seed: u64) -> Self {
		Self {
			seed,
			percentages: default_percentages(),
			sample_size: default_sample_size(),
			methods: default_methods(),
			max_iterations: default_max_iterations(),
			tolerance: default_tolerance(),
			damping: default_damping(),
			ridge: default_ridge(),
		}
	}

	/// Budget handed to the iterative scorers.
	pub fn iteration_params(&self) -> IterationParams {
		IterationParams { max_iterations: self.max_iterations, tolerance: self.tolerance }
	}

	/// Checks the settings for consistency.
	pub fn validate(&self) -> Result<(), EdgeTrustError> {
		if self.methods.is_empty() {
			return Err(EdgeTrustError::ConfigurationError(
				"At least one method is required.".to_string(),
			));
		}
		for (i, method) in self.methods.iter().enumerate() {
			if self.methods[..i].contains(method) {
				return Err(EdgeTrustError::ConfigurationError(format!(
					"Method {} is listed twice.",
					method
				)));
			}
		}

		validate_percentages(&self.percentages)?;

		if self.max_iterations == 0 {
			return Err(EdgeTrustError::ConfigurationError(
				"max_iterations must be positive.".to_string(),
			));
		}
		if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
			return Err(EdgeTrustError::ConfigurationError(format!(
				"tolerance must be positive, got {}.",
				self.tolerance
			)));
		}
		if !(self.damping > 0.0 && self.damping < 1.0) {
			return Err(EdgeTrustError::ConfigurationError(format!(
				"damping must lie in (0, 1), got {}.",
				self.damping
			)));
		}
		if !(self.ridge.is_finite() && self.ridge > 0.0) {
			return Err(EdgeTrustError::ConfigurationError(format!(
				"ridge must be positive, got {}.",
				self.ridge
			)));
		}

		Ok(())
	}
}

/// Fails unless every percentage is below 100 and the list is strictly
/// ascending.
pub fn validate_percentages(percentages: &[u32]) -> Result<(), EdgeTrustError> {
	if let Some(p) = percentages.iter().find(|p| **p >= 100) {
		return Err(EdgeTrustError::ConfigurationError(format!(
			"Percentage {} is outside [0, 100).",
			p
		)));
	}
	if percentages.windows(2).any(|pair| pair[0] >= pair[1]) {
		return Err(EdgeTrustError::ConfigurationError(
			"Percentages must be strictly ascending.".to_string(),
		));
	}

	Ok(())
}

/// A held-out edge with its prediction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
	/// Edge source.
	pub source: NodeId,
	/// Edge target.
	pub target: NodeId,
	/// Withheld weight.
	pub true_weight: f64,
	/// Predicted weight.
	pub predicted_weight: f64,
}

impl PredictionRecord {
	/// Creates a new prediction record.
	pub fn new(
		source: impl Into<NodeId>, target: impl Into<NodeId>, true_weight: f64,
		predicted_weight: f64,
	) -> Self {
		Self { source: source.into(), target: target.into(), true_weight, predicted_weight }
	}
}

/// Metrics of one method in one leave-out-by-percentage round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundMetrics {
	/// Percentage of edges withheld.
	pub percentage: u32,
	/// Edges left in the reduced graph.
	pub retained_edges: usize,
	/// Edges withheld.
	pub held_out_edges: usize,
	/// Prediction quality.
	pub metrics: ErrorMetrics,
}

/// Rounds of leave-out-by-percentage, per method in ascending percentage.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EvaluationResult {
	/// Rounds of each method.
	pub rounds: BTreeMap<Method, Vec<RoundMetrics>>,
}

impl EvaluationResult {
	/// Rounds of a method.
	pub fn get(&self, method: Method) -> Option<&[RoundMetrics]> {
		self.rounds.get(&method).map(Vec::as_slice)
	}
}

/// Predictions of one method under leave-one-out.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MethodPredictions {
	/// Predicted held-out edges.
	pub predictions: Vec<PredictionRecord>,
	/// Aggregate quality, including the count of missing predictions.
	pub metrics: ErrorMetrics,
}

impl MethodPredictions {
	/// Held-out edges the method could not predict.
	pub fn missing(&self) -> usize {
		self.metrics.missing
	}
}

/// Outcome of leave-one-out.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LeaveOneOutReport {
	/// Number of edges withheld one at a time.
	pub sample_size: usize,
	/// Edges of the evaluated graph.
	pub edge_count: usize,
	/// Predictions of each method.
	pub methods: BTreeMap<Method, MethodPredictions>,
}

impl LeaveOneOutReport {
	/// Predictions of a method.
	pub fn get(&self, method: Method) -> Option<&MethodPredictions> {
		self.methods.get(&method)
	}
}

/// Models fit on one graph snapshot.
#[derive(Clone, Debug, Default)]
pub struct ModelSet {
	/// Scorer models by method.
	pub models: BTreeMap<Method, ReputationModel>,
	/// Combiner, absent when it was not requested or could not be fit.
	pub regression: Option<RegressionModel>,
}

impl ModelSet {
	/// Predicts `source -> target` with a method.
	///
	/// Returns `None` when the method has no model or does not know one of
	/// the endpoints.
	pub fn predict(
		&self, method: Method, source: &str, target: &str,
	) -> Result<Option<f64>, EdgeTrustError> {
		let result = match method {
			Method::Regression => match &self.regression {
				Some(model) => model.predict(source, target),
				None => return Ok(None),
			},
			_ => match self.models.get(&method) {
				Some(model) => model.predict(source, target),
				None => return Ok(None),
			},
		};

		match result {
			Ok(weight) => Ok(Some(weight)),
			Err(e) if e.is_recoverable() => Ok(None),
			Err(e) => Err(e),
		}
	}
}

/// Removes `floor(|E| * percentage / 100)` edges chosen uniformly without
/// replacement. Returns the reduced copy and the removed edges.
///
/// The sampled indices are distinct, so every removal targets an edge still
/// present in the copy; `EdgeNotFoundError` means the bookkeeping broke.
pub fn reduce<R: Rng + ?Sized>(
	graph: &SignedGraph, percentage: u32, rng: &mut R,
) -> Result<(SignedGraph, Vec<(NodeId, NodeId, Edge)>), EdgeTrustError> {
	let edges: Vec<(&NodeId, &NodeId)> =
		graph.edges().map(|(source, target, _)| (source, target)).collect();
	let amount = edges.len() * percentage.min(100) as usize / 100;

	let mut reduced = graph.clone();
	let mut held_out = Vec::with_capacity(amount);
	for index in sample(rng, edges.len(), amount) {
		let (source, target) = edges[index];
		let edge = reduced.remove_edge(source, target)?;
		held_out.push((source.clone(), target.clone(), edge));
	}

	Ok((reduced, held_out))
}

/// Runs the leave-out protocols.
#[derive(Clone, Debug)]
pub struct Evaluator {
	config: EvaluationConfig,
}

impl Evaluator {
	/// Creates a new evaluator from a validated configuration.
	pub fn new(config: EvaluationConfig) -> Result<Self, EdgeTrustError> {
		config.validate()?;
		Ok(Self { config })
	}

	/// Returns the configuration.
	pub fn config(&self) -> &EvaluationConfig {
		&self.config
	}

	/// Scorers to fit: the configured ones, plus every node score scorer the
	/// combiner needs.
	fn required_scorers(&self) -> Vec<Method> {
		let combine = self.config.methods.contains(&Method::Regression);
		Method::ALL
			.into_iter()
			.filter(|method| {
				method.is_scorer()
					&& (self.config.methods.contains(method) || (combine && method.has_node_scores()))
			})
			.collect()
	}

	/// Fits every required model on a graph snapshot.
	pub fn fit_models(&self, graph: &SignedGraph) -> ModelSet {
		let params = self.config.iteration_params();

		let mut models = BTreeMap::new();
		for method in self.required_scorers() {
			if let Some(scorer) = scorer_for(method, params, self.config.damping) {
				let model = scorer.fit(graph);
				debug!("Fitted {} on {} nodes.", method.name(), model.len());
				models.insert(method, model);
			}
		}

		let regression = if self.config.methods.contains(&Method::Regression) {
			let inputs: Vec<(Method, &ReputationModel)> =
				models.iter().map(|(method, model)| (*method, model)).collect();
			match RegressionModel::fit(graph, &inputs, self.config.ridge) {
				Ok(model) => Some(model),
				Err(e) => {
					warn!("Regression combiner unavailable: {}", e);
					None
				},
			}
		} else {
			None
		};

		ModelSet { models, regression }
	}

	/// Predicts every configured method on a set of held-out edges.
	fn predict_all(
		&self, models: &ModelSet, held_out: &[(NodeId, NodeId, Edge)],
	) -> Result<BTreeMap<Method, (Vec<PredictionRecord>, usize)>, EdgeTrustError> {
		let mut outcome = BTreeMap::new();
		for method in &self.config.methods {
			let mut predictions = Vec::with_capacity(held_out.len());
			let mut missing = 0;
			for (source, target, edge) in held_out {
				match models.predict(*method, source, target)? {
					Some(weight) => predictions.push(PredictionRecord::new(
						source.as_str(),
						target.as_str(),
						edge.weight,
						weight,
					)),
					None => missing += 1,
				}
			}
			outcome.insert(*method, (predictions, missing));
		}

		Ok(outcome)
	}

	/// Leave-one-out over `min(sample_size, |E|)` seeded sample edges.
	///
	/// Each sampled edge is removed from a working copy, every method is fit
	/// on the copy and predicts the edge, then the edge is restored with its
	/// exact attributes.
	pub fn evaluate_leave_one(
		&self, graph: &SignedGraph, sample_size: usize,
	) -> Result<LeaveOneOutReport, EdgeTrustError> {
		let mut rng = StdRng::seed_from_u64(self.config.seed);
		let edges: Vec<(NodeId, NodeId)> =
			graph.edges().map(|(source, target, _)| (source.clone(), target.clone())).collect();
		let amount = sample_size.min(edges.len());

		info!(
			"Leave-one-out over {} of {} edges with {} methods.",
			amount,
			edges.len(),
			self.config.methods.len()
		);

		let mut collected: BTreeMap<Method, (Vec<PredictionRecord>, usize)> = self
			.config
			.methods
			.iter()
			.map(|method| (*method, (Vec::with_capacity(amount), 0)))
			.collect();

		let mut working = graph.clone();
		for (round, index) in sample(&mut rng, edges.len(), amount).into_iter().enumerate() {
			let (source, target) = &edges[index];
			let edge = working.remove_edge(source, target)?;

			let models = self.fit_models(&working);
			let held_out = [(source.clone(), target.clone(), edge)];
			for (method, (predictions, missing)) in self.predict_all(&models, &held_out)? {
				let entry = collected.entry(method).or_default();
				entry.0.extend(predictions);
				entry.1 += missing;
			}

			working.restore_edge(source, target, edge);
			debug!("Edge {}/{}: {} -> {} predicted.", round + 1, amount, source, target);
		}

		if working != *graph {
			return Err(EdgeTrustError::ValidationError(
				"Working graph differs from the original after leave-one-out.".to_string(),
			));
		}

		let methods = collected
			.into_iter()
			.map(|(method, (predictions, missing))| {
				let metrics = ErrorMetrics::from_records(&predictions, missing);
				info!(
					"{}: RMSE {}, PCC {}, {} missing.",
					method,
					format_metric(metrics.rmse),
					format_metric(metrics.pcc),
					missing
				);
				(method, MethodPredictions { predictions, metrics })
			})
			.collect();

		Ok(LeaveOneOutReport { sample_size: amount, edge_count: graph.edge_count(), methods })
	}

	/// Leave-out-by-percentage for each percentage in ascending order.
	///
	/// Every round draws a fresh sample from the seeded generator, fits once
	/// on the reduced graph and predicts all removed edges.
	pub fn evaluate_leave_percent(
		&self, graph: &SignedGraph, percentages: &[u32],
	) -> Result<EvaluationResult, EdgeTrustError> {
		validate_percentages(percentages)?;

		let mut rng = StdRng::seed_from_u64(self.config.seed);
		let mut result = EvaluationResult::default();

		for &percentage in percentages {
			let (reduced, held_out) = reduce(graph, percentage, &mut rng)?;
			info!(
				"Leave out {}%: {} edges retained, {} held out.",
				percentage,
				reduced.edge_count(),
				held_out.len()
			);

			let models = if held_out.is_empty() { ModelSet::default() } else { self.fit_models(&reduced) };

			for (method, (predictions, missing)) in self.predict_all(&models, &held_out)? {
				let metrics = ErrorMetrics::from_records(&predictions, missing);
				debug!(
					"{} at {}%: RMSE {}, PCC {}.",
					method,
					percentage,
					format_metric(metrics.rmse),
					format_metric(metrics.pcc)
				);
				result.rounds.entry(method).or_default().push(RoundMetrics {
					percentage,
					retained_edges: reduced.edge_count(),
					held_out_edges: held_out.len(),
					metrics,
				});
			}
		}

		Ok(result)
	}
}

#[cfg(test)]
mod tests {
	use crate::{graph::SignedGraph, harness::*};

	fn chain_graph(edges: usize) -> SignedGraph {
		let mut graph = SignedGraph::new();
		for i in 0..edges {
			let weight = if i % 3 == 0 { -1.0 } else { 2.0 };
			graph.add_edge(&format!("n{}", i), &format!("n{}", i + 1), weight);
		}
		graph
	}

	#[test]
	fn test_config_defaults() {
		let config: EvaluationConfig = serde_json::from_str("{\"seed\": 7}").unwrap();

		assert_eq!(config, EvaluationConfig::new(7));
		assert_eq!(config.percentages, vec![10, 20, 30, 40, 50, 60, 70, 80, 90]);
		assert_eq!(config.methods.len(), 9);
		assert!(config.validate().is_ok());
		assert!(serde_json::from_str::<EvaluationConfig>("{}").is_err());
	}

	#[test]
	fn test_config_validation() {
		let mut config = EvaluationConfig::new(1);
		config.percentages = vec![10, 100];
		assert!(matches!(config.validate(), Err(EdgeTrustError::ConfigurationError(_))));

		config.percentages = vec![20, 10];
		assert!(config.validate().is_err());

		config.percentages = vec![0, 50];
		assert!(config.validate().is_ok());

		config.damping = 1.0;
		assert!(config.validate().is_err());

		config.damping = 0.5;
		config.methods = Vec::new();
		assert!(config.validate().is_err());

		config.methods = vec![Method::Reciprocal, Method::Reciprocal];
		assert!(config.validate().is_err());

		config.methods = vec![Method::Reciprocal];
		config.ridge = 0.0;
		assert!(Evaluator::new(config).is_err());
	}

	#[test]
	fn test_reduce_removes_floor_share() {
		let graph = chain_graph(15);
		let mut rng = StdRng::seed_from_u64(3);

		let (reduced, held_out) = reduce(&graph, 50, &mut rng).unwrap();

		assert_eq!(held_out.len(), 7);
		assert_eq!(reduced.edge_count(), 8);
		for (source, target, edge) in &held_out {
			assert!(reduced.edge(source, target).is_none());
			assert_eq!(graph.edge(source, target), Some(edge));
		}
		assert_eq!(graph.edge_count(), 15);

		let mut rng = StdRng::seed_from_u64(3);
		let (_, repeated) = reduce(&graph, 50, &mut rng).unwrap();
		assert_eq!(repeated, held_out);

		let (reduced, held_out) = reduce(&graph, 90, &mut rng).unwrap();
		assert_eq!(held_out.len(), 13);
		assert_eq!(reduced.edge_count(), 2);
	}

	#[test]
	fn test_zero_percent_keeps_full_graph() {
		let graph = chain_graph(10);
		let mut rng = StdRng::seed_from_u64(3);

		let (reduced, held_out) = reduce(&graph, 0, &mut rng).unwrap();
		assert_eq!(reduced, graph);
		assert!(held_out.is_empty());

		let evaluator = Evaluator::new(EvaluationConfig::new(3)).unwrap();
		let result = evaluator.evaluate_leave_percent(&graph, &[0]).unwrap();
		for method in Method::ALL {
			let rounds = result.get(method).unwrap();
			assert_eq!(rounds.len(), 1);
			assert_eq!(rounds[0].retained_edges, 10);
			assert_eq!(rounds[0].metrics.predicted, 0);
			assert_eq!(rounds[0].metrics.rmse, None);
		}
	}

	#[test]
	fn test_retained_edges_decrease() {
		let graph = chain_graph(40);
		let mut config = EvaluationConfig::new(11);
		config.methods = vec![Method::Reciprocal, Method::StatusTheory];
		let evaluator = Evaluator::new(config).unwrap();

		let result = evaluator.evaluate_leave_percent(&graph, &[0, 25, 50, 75]).unwrap();
		let rounds = result.get(Method::StatusTheory).unwrap();

		assert_eq!(
			rounds.iter().map(|round| round.held_out_edges).collect::<Vec<_>>(),
			vec![0, 10, 20, 30]
		);
		assert!(rounds.windows(2).all(|pair| pair[0].retained_edges > pair[1].retained_edges));
		for round in rounds {
			assert_eq!(round.metrics.predicted + round.metrics.missing, round.held_out_edges);
		}
		assert!(evaluator.evaluate_leave_percent(&graph, &[50, 25]).is_err());
	}

	#[test]
	fn test_leave_one_restores_graph() {
		let mut graph = SignedGraph::new();
		graph.add_edge("A", "B", 5.0);
		graph.add_edge("B", "A", 5.0);
		graph.add_edge("A", "C", -1.0);
		graph.add_edge("C", "A", -1.0);

		let mut config = EvaluationConfig::new(5);
		config.methods = vec![Method::Reciprocal];
		let evaluator = Evaluator::new(config).unwrap();

		let report = evaluator.evaluate_leave_one(&graph, 10).unwrap();
		let reciprocal = report.get(Method::Reciprocal).unwrap();

		assert_eq!(report.sample_size, 4);
		assert_eq!(reciprocal.predictions.len(), 4);
		assert_eq!(reciprocal.missing(), 0);
		for record in &reciprocal.predictions {
			assert_eq!(record.predicted_weight, record.true_weight);
		}
		assert_eq!(reciprocal.metrics.rmse, Some(0.0));
	}

	#[test]
	fn test_leave_one_is_seeded() {
		let graph = chain_graph(30);
		let mut config = EvaluationConfig::new(42);
		config.methods = vec![Method::PageRank, Method::TriadicBalance];
		let evaluator = Evaluator::new(config).unwrap();

		let first = evaluator.evaluate_leave_one(&graph, 5).unwrap();
		let second = evaluator.evaluate_leave_one(&graph, 5).unwrap();

		assert_eq!(first, second);
	}

	#[test]
	fn test_isolated_endpoint_is_missing() {
		let mut graph = SignedGraph::new();
		graph.add_edge("A", "B", 1.0);
		graph.add_edge("B", "C", 1.0);

		let evaluator = Evaluator::new(EvaluationConfig::new(0)).unwrap();
		let report = evaluator.evaluate_leave_one(&graph, 2).unwrap();

		for method in Method::ALL {
			let outcome = report.get(method).unwrap();
			assert_eq!(outcome.predictions.len() + outcome.missing(), 2);
			assert_eq!(outcome.missing(), 2);
		}
	}
}
