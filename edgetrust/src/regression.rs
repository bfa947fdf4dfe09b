//! # Regression Module.
//!
//! Ordinary least squares combiner over the node scores of several reputation
//! models. The design row of an edge `u -> v` is
//! `[1, features(u) of every model..., features(v) of every model...]`,
//! features a model has no value for are replaced with the training mean of
//! their column.

use crate::{
	error::EdgeTrustError,
	graph::SignedGraph,
	scorer::{Method, Predictor, ReputationModel},
};
use log::debug;
use nalgebra::{DMatrix, DVector};

/// Default ridge term added to the normal equations.
pub const DEFAULT_RIDGE: f64 = 1e-6;

/// Linear map from endpoint scores to edge weight.
#[derive(Clone, Debug)]
pub struct RegressionModel {
	/// Intercept followed by one coefficient per feature column.
	pub coefficients: Vec<f64>,
	/// Contributing methods with their per-node feature width, in column order.
	pub columns: Vec<(Method, usize)>,
	/// Training mean of every feature column, used for imputation.
	pub means: Vec<f64>,
	models: Vec<ReputationModel>,
}

impl RegressionModel {
	/// Fits the combiner on the edges of `graph`.
	///
	/// Only models with node scores contribute. Fails with `ValidationError`
	/// when none does, when the graph has no edge, or when the normal
	/// equations cannot be solved.
	pub fn fit(
		graph: &SignedGraph, models: &[(Method, &ReputationModel)], ridge: f64,
	) -> Result<Self, EdgeTrustError> {
		let contributing: Vec<(Method, &ReputationModel)> =
			models.iter().filter(|(_, model)| model.feature_width() > 0).copied().collect();
		if contributing.is_empty() {
			return Err(EdgeTrustError::ValidationError(
				"Regression needs at least one node score model.".to_string(),
			));
		}
		if graph.is_empty() {
			return Err(EdgeTrustError::ValidationError(
				"Regression needs at least one training edge.".to_string(),
			));
		}

		let mut model = Self {
			coefficients: Vec::new(),
			columns: contributing.iter().map(|(method, model)| (*method, model.feature_width())).collect(),
			means: Vec::new(),
			models: contributing.iter().map(|(_, model)| (*model).clone()).collect(),
		};

		let raw_rows: Vec<Vec<Option<f64>>> =
			graph.edges().map(|(source, target, _)| model.raw_row(source, target)).collect();
		let targets: Vec<f64> = graph.edges().map(|(_, _, edge)| edge.weight).collect();

		let width = model.feature_count();
		model.means = (0..width)
			.map(|column| {
				let known: Vec<f64> = raw_rows.iter().filter_map(|row| row[column]).collect();
				if known.is_empty() {
					0.0
				} else {
					known.iter().sum::<f64>() / known.len() as f64
				}
			})
			.collect();

		let rows: Vec<Vec<f64>> = raw_rows.iter().map(|row| model.impute(row)).collect();
		let p = width + 1;
		let x = DMatrix::<f64>::from_fn(rows.len(), p, |i, j| rows[i][j]);
		let y = DVector::<f64>::from_vec(targets);

		let xt = x.transpose();
		let mut h = &xt * &x;
		let b = &xt * &y;
		for d in 0..p {
			h[(d, d)] += ridge;
		}

		let solved = h
			.clone()
			.cholesky()
			.map(|chol| chol.solve(&b))
			.or_else(|| h.clone().lu().solve(&b))
			.filter(|beta| beta.iter().all(|value| value.is_finite()))
			.ok_or_else(|| {
				EdgeTrustError::ValidationError("Regression normal equations are singular.".to_string())
			})?;

		model.coefficients = solved.iter().copied().collect();
		debug!(
			"Regression fit on {} edges with {} features: {:?}",
			rows.len(),
			width,
			model.coefficients
		);

		Ok(model)
	}

	/// Number of feature columns, intercept excluded.
	pub fn feature_count(&self) -> usize {
		2 * self.columns.iter().map(|(_, width)| width).sum::<usize>()
	}

	fn raw_row(&self, source: &str, target: &str) -> Vec<Option<f64>> {
		let mut row = Vec::with_capacity(self.feature_count());
		for node in [source, target] {
			for (model, (_, width)) in self.models.iter().zip(&self.columns) {
				match model.node_features(node) {
					Some(features) => row.extend(features.into_iter().map(Some)),
					None => row.extend(std::iter::repeat(None).take(*width)),
				}
			}
		}
		row
	}

	fn impute(&self, raw: &[Option<f64>]) -> Vec<f64> {
		let mut row = Vec::with_capacity(raw.len() + 1);
		row.push(1.0);
		row.extend(raw.iter().zip(&self.means).map(|(value, mean)| value.unwrap_or(*mean)));
		row
	}

	/// Design row of `source -> target`, intercept included.
	pub fn design_row(&self, source: &str, target: &str) -> Result<Vec<f64>, EdgeTrustError> {
		for node in [source, target] {
			if !self.models.iter().any(|model| model.contains(node)) {
				return Err(EdgeTrustError::UnknownNodeError(node.to_string()));
			}
		}

		Ok(self.impute(&self.raw_row(source, target)))
	}
}

impl Predictor for RegressionModel {
	fn predict(&self, source: &str, target: &str) -> Result<f64, EdgeTrustError> {
		let row = self.design_row(source, target)?;
		Ok(row.iter().zip(&self.coefficients).map(|(x, beta)| x * beta).sum())
	}
}
