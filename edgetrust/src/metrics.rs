//! # Metrics Module.
//!
//! Error and correlation statistics over held-out predictions. Degenerate
//! statistics are `None`, written as `undefined` in reports.

use crate::harness::PredictionRecord;
use serde::{Deserialize, Serialize};

/// Placeholder written for statistics that cannot be computed.
pub const UNDEFINED: &str = "undefined";

/// Aggregate prediction quality of one method in one round.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorMetrics {
	/// Root mean squared error, `None` without predictions.
	pub rmse: Option<f64>,
	/// Pearson correlation, `None` with fewer than 2 predictions or zero variance.
	pub pcc: Option<f64>,
	/// Number of predictions the statistics cover.
	pub predicted: usize,
	/// Number of held-out edges that could not be predicted.
	pub missing: usize,
}

impl ErrorMetrics {
	/// Computes the metrics of a set of predictions.
	pub fn from_records(records: &[PredictionRecord], missing: usize) -> Self {
		let truth: Vec<f64> = records.iter().map(|record| record.true_weight).collect();
		let predicted: Vec<f64> = records.iter().map(|record| record.predicted_weight).collect();

		Self {
			rmse: rmse(&truth, &predicted),
			pcc: pcc(&truth, &predicted),
			predicted: records.len(),
			missing,
		}
	}
}

/// Root mean squared error between two equally long vectors.
pub fn rmse(truth: &[f64], predicted: &[f64]) -> Option<f64> {
	let n = truth.len();
	if n == 0 || n != predicted.len() {
		return None;
	}

	let sum: f64 = truth.iter().zip(predicted).map(|(t, p)| (t - p) * (t - p)).sum();
	Some((sum / n as f64).sqrt())
}

/// Pearson correlation coefficient between two equally long vectors.
pub fn pcc(x: &[f64], y: &[f64]) -> Option<f64> {
	let n = x.len();
	if n < 2 || n != y.len() {
		return None;
	}

	let mean_x = x.iter().sum::<f64>() / n as f64;
	let mean_y = y.iter().sum::<f64>() / n as f64;

	let mut num = 0.0;
	let mut den_x = 0.0;
	let mut den_y = 0.0;
	for (xi, yi) in x.iter().zip(y) {
		let dx = xi - mean_x;
		let dy = yi - mean_y;
		num += dx * dy;
		den_x += dx * dx;
		den_y += dy * dy;
	}

	if den_x == 0.0 || den_y == 0.0 {
		return None;
	}

	let r = num / (den_x.sqrt() * den_y.sqrt());
	r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

/// Formats a statistic for reports.
pub fn format_metric(value: Option<f64>) -> String {
	value.map_or_else(|| UNDEFINED.to_string(), |value| format!("{:.6}", value))
}

#[cfg(test)]
mod tests {
	use crate::metrics::*;

	#[test]
	fn test_rmse_exact_predictions() {
		let truth = [1.0, -2.0, 3.5];
		assert_eq!(rmse(&truth, &truth), Some(0.0));
	}

	#[test]
	fn test_rmse_positive_on_error() {
		let value = rmse(&[1.0, 2.0], &[2.0, 0.0]).unwrap();
		assert!((value - (2.5f64).sqrt()).abs() < 1e-12);
		assert!(value > 0.0);
		assert_eq!(rmse(&[], &[]), None);
	}

	#[test]
	fn test_pcc_undefined() {
		assert_eq!(pcc(&[], &[]), None);
		assert_eq!(pcc(&[1.0], &[4.0]), None);
		assert_eq!(pcc(&[1.0, 2.0, 3.0], &[5.0, 5.0, 5.0]), None);
	}

	#[test]
	fn test_pcc_affine() {
		let truth = [1.0, -3.0, 4.0, 0.5];
		let predicted: Vec<f64> = truth.iter().map(|t| 2.5 * t - 1.0).collect();
		assert!((pcc(&truth, &predicted).unwrap() - 1.0).abs() < 1e-12);

		let inverted: Vec<f64> = truth.iter().map(|t| -t).collect();
		assert!((pcc(&truth, &inverted).unwrap() + 1.0).abs() < 1e-12);
	}

	#[test]
	fn test_error_metrics_from_records() {
		let records = vec![PredictionRecord::new("a", "b", 2.0, 2.0)];
		let metrics = ErrorMetrics::from_records(&records, 3);

		assert_eq!(metrics.rmse, Some(0.0));
		assert_eq!(metrics.pcc, None);
		assert_eq!(metrics.predicted, 1);
		assert_eq!(metrics.missing, 3);
		assert_eq!(format_metric(metrics.pcc), UNDEFINED);
		assert_eq!(format_metric(metrics.rmse), "0.000000");
	}
}
