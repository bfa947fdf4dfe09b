//! # Filesystem Actions Module.
//!
//! This module provides functionalities for filesystem actions.

use dotenv::{dotenv, var};
use edgetrust::{
	error::EdgeTrustError,
	storage::{CSVFileStorage, JSONFileStorage, Storage},
	EvaluationConfig,
};
use log::{info, warn};
use serde::{de::DeserializeOwned, Serialize};
use std::{env::current_dir, path::PathBuf};

/// Evaluation configuration file name.
pub const CONFIG_FILENAME: &str = "config";
/// Default dataset file name.
pub const DATASET_FILENAME: &str = "dataset";

/// Enum representing the possible file extensions.
pub enum FileType {
	/// CSV file.
	Csv,
	/// JSON file.
	Json,
}

impl FileType {
	/// Converts the enum variant into its corresponding file extension.
	fn as_str(&self) -> &'static str {
		match self {
			FileType::Csv => "csv",
			FileType::Json => "json",
		}
	}
}

/// Retrieves the path to the `assets` directory.
pub fn get_assets_path() -> Result<PathBuf, EdgeTrustError> {
	current_dir().map_err(EdgeTrustError::IOError).map(|current_dir| {
		// Workaround for the tests running in the crate directory.
		#[cfg(test)]
		{
			current_dir.join("assets")
		}

		#[cfg(not(test))]
		{
			current_dir.join("edgetrust-cli/assets")
		}
	})
}

/// Helper function to get the path of a file in the `assets` directory.
pub fn get_file_path(file_name: &str, file_type: FileType) -> Result<PathBuf, EdgeTrustError> {
	let assets_path = get_assets_path()?;
	Ok(assets_path.join(format!("{}.{}", file_name, file_type.as_str())))
}

/// Loads the dataset location from the environment file, falling back to the
/// bundled sample network.
pub fn load_dataset_path() -> Result<PathBuf, EdgeTrustError> {
	dotenv().ok();
	match var("DATASET_PATH") {
		Ok(path) => Ok(PathBuf::from(path)),
		Err(_) => {
			warn!("DATASET_PATH environment variable is not set. Using default.");
			get_file_path(DATASET_FILENAME, FileType::Csv)
		},
	}
}

/// Loads the configuration file.
pub fn load_config() -> Result<EvaluationConfig, EdgeTrustError> {
	let filepath = get_file_path(CONFIG_FILENAME, FileType::Json)?;
	JSONFileStorage::<EvaluationConfig>::new(filepath).load()
}

/// Saves the configuration file.
pub fn save_config(config: EvaluationConfig) -> Result<(), EdgeTrustError> {
	let filepath = get_file_path(CONFIG_FILENAME, FileType::Json)?;
	JSONFileStorage::<EvaluationConfig>::new(filepath).save(config)
}

/// Writes a report to a CSV file in the `assets` directory.
pub fn save_report<T>(file_name: &str, records: Vec<T>) -> Result<(), EdgeTrustError>
where
	T: Serialize + DeserializeOwned + Clone,
{
	let filepath = get_file_path(file_name, FileType::Csv)?;
	let mut storage = CSVFileStorage::<T>::new(filepath);
	let count = records.len();

	storage.save(records)?;

	info!(
		"{} records saved at \"{}\".",
		count,
		storage.filepath().display()
	);

	Ok(())
}
