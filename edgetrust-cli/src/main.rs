//! # Edge Trust CLI
//!
//! This crate provides a CLI interface to use the `edgetrust` library.

#![warn(trivial_casts)]
#![deny(
	absolute_paths_not_starting_with_crate, deprecated, future_incompatible, missing_docs,
	nonstandard_style, unreachable_code, unreachable_patterns
)]
#![forbid(unsafe_code)]
#![deny(
	// Complexity
 	clippy::unnecessary_cast,
	clippy::needless_question_mark,
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

mod cli;
mod fs;

use clap::Parser;
use cli::*;
use dotenv::dotenv;
use edgetrust::{error::EdgeTrustError, EvaluationConfig};
use env_logger::{init_from_env, Env};
use fs::load_config;
use log::info;

fn main() -> Result<(), EdgeTrustError> {
	dotenv().ok();
	init_from_env(Env::default().filter_or("LOG_LEVEL", "info"));
	let mut config: EvaluationConfig = load_config()?;

	match Cli::parse().mode {
		Mode::LeaveOne(leave_one_data) => handle_leave_one(config, leave_one_data)?,
		Mode::LeavePercent => handle_leave_percent(config)?,
		Mode::Scores => handle_scores(config)?,
		Mode::Show => info!("Evaluation config:\n{:#?}", config),
		Mode::Update(update_data) => handle_update(&mut config, update_data)?,
	};

	Ok(())
}
