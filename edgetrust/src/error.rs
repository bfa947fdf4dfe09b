//! # Error Module.
//!
//! This module features the `EdgeTrustError` enum for error handling throughout the project.

use thiserror::Error;

/// The crate-wide error variants.
#[derive(Debug, Error)]
pub enum EdgeTrustError {
	/// Configuration error
	#[error("ConfigurationError: {0}")]
	ConfigurationError(String),

	/// Malformed dataset record
	#[error("DatasetFormatError: {0}")]
	DatasetFormatError(String),

	/// Removing or restoring an edge that is not in the graph
	#[error("EdgeNotFoundError: {0} -> {1}")]
	EdgeNotFoundError(String, String),

	/// File read/write error
	#[error("FileIOError: {0}")]
	FileIOError(String),

	/// Input/output error
	#[error("IOError: {0}")]
	IOError(std::io::Error),

	/// Parsing error
	#[error("ParsingError: {0}")]
	ParsingError(String),

	/// Node without a score in the queried model
	#[error("UnknownNodeError: {0}")]
	UnknownNodeError(String),

	/// Validation error
	#[error("ValidationError: {0}")]
	ValidationError(String),
}

impl EdgeTrustError {
	/// Returns `true` for errors a single prediction may recover from.
	pub fn is_recoverable(&self) -> bool {
		matches!(self, EdgeTrustError::UnknownNodeError(_))
	}
}
