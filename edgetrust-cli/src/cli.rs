//! # CLI Module.
//!
//! This module contains all CLI related data handling and conversions.

use crate::fs::{load_dataset_path, save_config, save_report};
use clap::{Args, Parser, Subcommand};
use edgetrust::{
	error::EdgeTrustError,
	load_csv,
	metrics::format_metric,
	storage::{MetricRecord, PredictionRow, ScoreRecord},
	EvaluationConfig, Evaluator, Method, SignedGraph,
};
use log::info;
use std::str::FromStr;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
	#[command(subcommand)]
	pub mode: Mode,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Mode {
	/// Run leave-one-out over a sample of edges. Accepts 'LeaveOneData'.
	LeaveOne(LeaveOneData),
	/// Run leave-out-by-percentage over the configured percentages.
	LeavePercent,
	/// Fit every scorer on the full dataset and save the node scores.
	Scores,
	/// Display the current configuration.
	Show,
	/// Update the configuration. Requires 'UpdateData'.
	Update(UpdateData),
}

/// Leave-one-out subcommand input.
#[derive(Args, Debug)]
pub struct LeaveOneData {
	/// Number of sampled edges, overriding the configuration.
	#[clap(long = "sample-size")]
	sample_size: Option<usize>,
}

/// Configuration update subcommand input.
#[derive(Args, Debug, Default)]
pub struct UpdateData {
	/// Seed of the edge sampling.
	#[clap(long = "seed")]
	seed: Option<String>,
	/// Leave-one-out sample size.
	#[clap(long = "sample-size")]
	sample_size: Option<String>,
	/// Comma separated, ascending percentages (e.g. "10,20,30").
	#[clap(long = "percentages")]
	percentages: Option<String>,
	/// Comma separated method labels (e.g. "PR,FG,LR").
	#[clap(long = "methods")]
	methods: Option<String>,
	/// Iteration budget of the iterative scorers.
	#[clap(long = "max-iterations")]
	max_iterations: Option<String>,
	/// Convergence tolerance of the iterative scorers.
	#[clap(long = "tolerance")]
	tolerance: Option<String>,
	/// PageRank damping factor.
	#[clap(long = "damping")]
	damping: Option<String>,
	/// Ridge term of the regression combiner.
	#[clap(long = "ridge")]
	ridge: Option<String>,
}

/// Parses a single value.
fn parse_value<T>(value: &str) -> Result<T, EdgeTrustError>
where
	T: FromStr,
	T::Err: ToString,
{
	value.trim().parse::<T>().map_err(|e| EdgeTrustError::ParsingError(e.to_string()))
}

/// Parses a comma separated list.
fn parse_list<T>(value: &str) -> Result<Vec<T>, EdgeTrustError>
where
	T: FromStr,
	T::Err: ToString,
{
	value.split(',').filter(|item| !item.trim().is_empty()).map(parse_value).collect()
}

/// Loads the dataset named by the environment.
fn load_graph() -> Result<SignedGraph, EdgeTrustError> {
	load_csv(load_dataset_path()?, false)
}

/// Handles the `leave-one` command.
pub fn handle_leave_one(config: EvaluationConfig, data: LeaveOneData) -> Result<(), EdgeTrustError> {
	let sample_size = data.sample_size.unwrap_or(config.sample_size);
	let graph = load_graph()?;
	let evaluator = Evaluator::new(config)?;

	let report = evaluator.evaluate_leave_one(&graph, sample_size)?;

	let mut predictions = Vec::new();
	let mut metrics = Vec::new();
	for (method, outcome) in &report.methods {
		predictions.extend(outcome.predictions.iter().map(|record| PredictionRow::new(*method, record)));
		metrics.push(MetricRecord::new(
			*method,
			None,
			report.edge_count.saturating_sub(1),
			report.sample_size,
			&outcome.metrics,
		));
	}

	save_report("predictions", predictions)?;
	save_report("metrics", metrics)
}

/// Handles the `leave-percent` command.
pub fn handle_leave_percent(config: EvaluationConfig) -> Result<(), EdgeTrustError> {
	let percentages = config.percentages.clone();
	let graph = load_graph()?;
	let evaluator = Evaluator::new(config)?;

	let result = evaluator.evaluate_leave_percent(&graph, &percentages)?;

	let mut metrics = Vec::new();
	for (method, rounds) in &result.rounds {
		for round in rounds {
			info!(
				"{} {:>2}%: RMSE {}, PCC {}",
				method,
				round.percentage,
				format_metric(round.metrics.rmse),
				format_metric(round.metrics.pcc)
			);
			metrics.push(MetricRecord::from_round(*method, round));
		}
	}

	save_report("metrics", metrics)
}

/// Handles the `scores` command.
pub fn handle_scores(config: EvaluationConfig) -> Result<(), EdgeTrustError> {
	let graph = load_graph()?;
	let evaluator = Evaluator::new(config)?;

	let models = evaluator.fit_models(&graph);
	let records: Vec<ScoreRecord> = models.models.values().flat_map(ScoreRecord::from_model).collect();

	save_report("scores", records)
}

/// Applies an update to the configuration and validates the result.
pub fn apply_update(config: &mut EvaluationConfig, data: UpdateData) -> Result<(), EdgeTrustError> {
	if let Some(seed) = data.seed {
		config.seed = parse_value(&seed)?;
	}

	if let Some(sample_size) = data.sample_size {
		config.sample_size = parse_value(&sample_size)?;
	}

	if let Some(percentages) = data.percentages {
		config.percentages = parse_list(&percentages)?;
	}

	if let Some(methods) = data.methods {
		config.methods = parse_list::<Method>(&methods)?;
	}

	if let Some(max_iterations) = data.max_iterations {
		config.max_iterations = parse_value(&max_iterations)?;
	}

	if let Some(tolerance) = data.tolerance {
		config.tolerance = parse_value(&tolerance)?;
	}

	if let Some(damping) = data.damping {
		config.damping = parse_value(&damping)?;
	}

	if let Some(ridge) = data.ridge {
		config.ridge = parse_value(&ridge)?;
	}

	config.validate()
}

/// Handles the CLI project configuration update.
pub fn handle_update(config: &mut EvaluationConfig, data: UpdateData) -> Result<(), EdgeTrustError> {
	apply_update(config, data)?;
	save_config(config.clone())
}
