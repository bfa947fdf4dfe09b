//! # Calibration Module.
//!
//! Maps a raw score feature onto the weight scale of the graph it was
//! computed from, using a one dimensional least squares fit.

use serde::{Deserialize, Serialize};

/// Linear map `weight = intercept + slope * feature`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
	/// Constant term.
	pub intercept: f64,
	/// Feature coefficient.
	pub slope: f64,
}

impl Default for Calibration {
	fn default() -> Self {
		Self::identity()
	}
}

impl Calibration {
	/// Calibration that returns the feature unchanged.
	pub fn identity() -> Self {
		Self { intercept: 0.0, slope: 1.0 }
	}

	/// Fits the map over `(feature, weight)` pairs.
	///
	/// Without pairs the identity is returned; a constant feature yields the
	/// mean weight for every input.
	pub fn fit<I>(pairs: I) -> Self
	where
		I: IntoIterator<Item = (f64, f64)>,
	{
		let pairs: Vec<(f64, f64)> = pairs.into_iter().collect();
		if pairs.is_empty() {
			return Self::identity();
		}

		let n = pairs.len() as f64;
		let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
		let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

		let mut cov = 0.0;
		let mut var = 0.0;
		for (x, y) in &pairs {
			cov += (x - mean_x) * (y - mean_y);
			var += (x - mean_x) * (x - mean_x);
		}

		if var <= f64::EPSILON * n * mean_x.abs().max(1.0) {
			return Self { intercept: mean_y, slope: 0.0 };
		}

		let slope = cov / var;
		Self { intercept: mean_y - slope * mean_x, slope }
	}

	/// Applies the map.
	pub fn apply(&self, feature: f64) -> f64 {
		self.intercept + self.slope * feature
	}
}
