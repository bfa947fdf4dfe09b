//! # Dataset Module.
//!
//! Builds a [`SignedGraph`] from `(source, target, weight)` edge records.

use crate::{
	error::EdgeTrustError,
	graph::SignedGraph,
	storage::EdgeListStorage,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One line of an edge list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
	/// Rating node.
	pub source: String,
	/// Rated node.
	pub target: String,
	/// Signed rating.
	pub weight: f64,
}

impl EdgeRecord {
	/// Creates a new edge record.
	pub fn new(source: impl Into<String>, target: impl Into<String>, weight: f64) -> Self {
		Self { source: source.into(), target: target.into(), weight }
	}
}

/// Builds a graph from edge records.
///
/// A repeated ordered pair overwrites the earlier record.
pub fn load<I>(records: I) -> Result<SignedGraph, EdgeTrustError>
where
	I: IntoIterator<Item = EdgeRecord>,
{
	let mut graph = SignedGraph::new();
	let mut overwritten = 0;

	for (index, record) in records.into_iter().enumerate() {
		if record.source.is_empty() || record.target.is_empty() {
			return Err(EdgeTrustError::DatasetFormatError(format!(
				"record {}: empty node identifier",
				index + 1
			)));
		}
		if !record.weight.is_finite() {
			return Err(EdgeTrustError::DatasetFormatError(format!(
				"record {}: weight is not a finite number",
				index + 1
			)));
		}

		if graph.add_edge(&record.source, &record.target, record.weight).is_some() {
			overwritten += 1;
		}
	}

	if overwritten > 0 {
		debug!("{} duplicate edge records overwritten", overwritten);
	}

	Ok(graph)
}

/// Loads a graph from a CSV edge list.
pub fn load_csv(filepath: PathBuf, has_headers: bool) -> Result<SignedGraph, EdgeTrustError> {
	let storage = EdgeListStorage::new(filepath).with_headers(has_headers);
	let records = storage.load()?;
	let graph = load(records)?;

	info!(
		"Loaded {} nodes and {} edges from \"{}\".",
		graph.node_count(),
		graph.edge_count(),
		storage.filepath().display()
	);

	Ok(graph)
}

#[cfg(test)]
mod tests {
	use crate::{dataset::*, graph::Sign};

	#[test]
	fn test_load_records() {
		let records = vec![
			EdgeRecord::new("1", "2", 4.0),
			EdgeRecord::new("2", "3", -7.0),
			EdgeRecord::new("1", "2", 5.0),
		];

		let graph = load(records).unwrap();

		assert_eq!(graph.edge_count(), 2);
		assert_eq!(graph.node_count(), 3);
		assert_eq!(graph.weight("1", "2"), Some(5.0));

		let edge = graph.edge("2", "3").unwrap();
		assert_eq!(edge.sign, Sign::Negative);
		assert_eq!(edge.negative, 7.0);
		assert_eq!(edge.positive, 0.0);
	}

	#[test]
	fn test_load_rejects_non_finite_weight() {
		let records = vec![EdgeRecord::new("1", "2", 1.0), EdgeRecord::new("2", "3", f64::NAN)];
		let result = load(records);

		assert!(matches!(result, Err(EdgeTrustError::DatasetFormatError(_))));
	}

	#[test]
	fn test_load_rejects_empty_identifier() {
		let result = load(vec![EdgeRecord::new("", "2", 1.0)]);
		assert!(matches!(result, Err(EdgeTrustError::DatasetFormatError(_))));
	}
}
