//! # Edge Trust
//!
//! A library for predicting the sign and strength of edges in weighted signed
//! networks, such as trust ratings between users, from reputation scores the
//! network assigns to its own nodes.
//!
//! ## Main characteristics:
//!
//! **Self-contained** - every score is derived from the topology of the
//! network; no side information about the nodes is needed.
//!
//! **Comparable** - eight reputation scorers and a regression combiner share
//! one prediction interface, so they are evaluated under identical
//! conditions.
//!
//! **Reproducible** - graphs iterate in a fixed order and edge sampling is
//! seeded, so an evaluation run can be repeated exactly.
//!
//! ## Implementation
//!
//! Edges are withheld from a private copy of the graph, every scorer is fit on
//! what remains and its predictor is asked for the withheld weights. The
//! [`harness::Evaluator`] runs this as leave-one-out or leave-out-by-percentage
//! and reports RMSE and Pearson correlation per method.

// Rustc
#![warn(trivial_casts)]
#![deny(
	absolute_paths_not_starting_with_crate, deprecated, future_incompatible, missing_docs,
	nonstandard_style, unreachable_code, unreachable_patterns
)]
#![forbid(unsafe_code)]
// Clippy
#![allow(clippy::tabs_in_doc_comments, clippy::needless_range_loop, clippy::new_without_default)]
#![deny(
	// Complexity
 	clippy::unnecessary_cast,
	clippy::needless_question_mark,
	clippy::clone_on_copy,
	// Pedantic
 	clippy::cast_lossless,
 	clippy::cast_possible_wrap,
	// Perf
	clippy::redundant_clone,
	// Restriction
 	clippy::panic,
	// Style
 	clippy::let_and_return,
 	clippy::needless_borrow
)]

pub mod calibration;
pub mod dataset;
pub mod error;
pub mod graph;
pub mod harness;
pub mod metrics;
pub mod regression;
pub mod scorer;
pub mod storage;

pub use dataset::{load, load_csv, EdgeRecord};
pub use error::EdgeTrustError;
pub use graph::{Edge, NodeId, Sign, SignedGraph};
pub use harness::{
	reduce, EvaluationConfig, EvaluationResult, Evaluator, LeaveOneOutReport, ModelSet,
	PredictionRecord, RoundMetrics,
};
pub use metrics::ErrorMetrics;
pub use regression::RegressionModel;
pub use scorer::{Method, Predictor, ReputationModel, Scorer};
