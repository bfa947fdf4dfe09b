//! # Storage Module.
//!
//! This module contains generic storage traits and implementations, together
//! with the record types written by the evaluation reports.

use crate::{
	dataset::EdgeRecord,
	error::EdgeTrustError,
	harness::{PredictionRecord, RoundMetrics},
	metrics::{format_metric, ErrorMetrics},
	scorer::{Method, ReputationModel},
};
use csv::{ReaderBuilder, Trim, WriterBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{from_reader, to_string_pretty};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::marker::PhantomData;
use std::path::PathBuf;

/// The main trait to be implemented by different storage types.
pub trait Storage<T> {
	/// The error type.
	type Err;

	/// Loads data from storage.
	fn load(&self) -> Result<T, Self::Err>;
	/// Saves data to storage.
	fn save(&mut self, data: T) -> Result<(), Self::Err>;
}

/// The `CSVFileStorage` struct provides a mechanism for persisting
/// and retrieving structured data to and from CSV files.
///
/// # Examples
///
/// ```no_run
/// use serde::{Serialize, Deserialize};
/// use std::path::PathBuf;
/// use edgetrust::storage::{CSVFileStorage, Storage};
///
/// #[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
/// struct Record {
///    node: String,
///    score: f64,
/// }
///
/// let filepath = PathBuf::from("/path/to/your/file.csv");
/// let mut storage = CSVFileStorage::<Record>::new(filepath);
///
/// let data = vec![Record { node: "alice".into(), score: 0.5 }];
///
/// // Save the data to the CSV file.
/// storage.save(data.clone()).unwrap();
///
/// // Load the data from the CSV file.
/// let loaded_data = storage.load().unwrap();
/// assert_eq!(data, loaded_data);
/// ```
pub struct CSVFileStorage<T> {
	filepath: PathBuf,
	phantom: PhantomData<T>,
}

impl<T> CSVFileStorage<T> {
	/// Creates a new CSVFileStorage.
	pub fn new(filepath: PathBuf) -> Self {
		Self { filepath, phantom: PhantomData }
	}

	/// Returns the path to the file.
	pub fn filepath(&self) -> &PathBuf {
		&self.filepath
	}
}

impl<T: Serialize + DeserializeOwned + Clone> Storage<Vec<T>> for CSVFileStorage<T> {
	type Err = EdgeTrustError;

	fn load(&self) -> Result<Vec<T>, EdgeTrustError> {
		let file = File::open(&self.filepath).map_err(EdgeTrustError::IOError)?;
		let mut reader = ReaderBuilder::new().from_reader(BufReader::new(file));

		reader
			.deserialize()
			.map(|result| result.map_err(|e| EdgeTrustError::FileIOError(e.to_string())))
			.collect()
	}

	fn save(&mut self, data: Vec<T>) -> Result<(), EdgeTrustError> {
		let mut writer = WriterBuilder::new()
			.from_path(&self.filepath)
			.map_err(|e| EdgeTrustError::FileIOError(e.to_string()))?;

		for record in &data {
			writer.serialize(record).map_err(|e| EdgeTrustError::FileIOError(e.to_string()))?;
		}

		writer.flush().map_err(|e| EdgeTrustError::FileIOError(e.to_string()))?;

		Ok(())
	}
}

/// The `JSONFileStorage` struct provides a mechanism for persisting
/// and retrieving structured data to and from JSON files.
pub struct JSONFileStorage<T> {
	filepath: PathBuf,
	phantom: PhantomData<T>,
}

impl<T> JSONFileStorage<T> {
	/// Creates a new JSONFileStorage.
	pub fn new(filepath: PathBuf) -> Self {
		Self { filepath, phantom: PhantomData }
	}

	/// Returns the path to the file.
	pub fn filepath(&self) -> &PathBuf {
		&self.filepath
	}
}

impl<T: Serialize + DeserializeOwned + Clone> Storage<T> for JSONFileStorage<T> {
	type Err = EdgeTrustError;

	fn load(&self) -> Result<T, Self::Err> {
		let file = File::open(&self.filepath).map_err(EdgeTrustError::IOError)?;
		let reader = BufReader::new(file);
		from_reader(reader).map_err(|e| EdgeTrustError::ParsingError(e.to_string()))
	}

	fn save(&mut self, data: T) -> Result<(), Self::Err> {
		let json_str =
			to_string_pretty(&data).map_err(|e| EdgeTrustError::ParsingError(e.to_string()))?;

		let mut file = File::create(&self.filepath).map_err(EdgeTrustError::IOError)?;
		file.write_all(json_str.as_bytes()).map_err(EdgeTrustError::IOError)
	}
}

/// The `EdgeListStorage` struct reads `source,target,weight` edge lists.
/// Columns after the third are ignored.
pub struct EdgeListStorage {
	filepath: PathBuf,
	has_headers: bool,
}

impl EdgeListStorage {
	/// Creates a new EdgeListStorage for a file without a header row.
	pub fn new(filepath: PathBuf) -> Self {
		Self { filepath, has_headers: false }
	}

	/// Sets whether the first row is a header.
	pub fn with_headers(mut self, has_headers: bool) -> Self {
		self.has_headers = has_headers;
		self
	}

	/// Returns the path to the file.
	pub fn filepath(&self) -> &PathBuf {
		&self.filepath
	}

	/// Loads the edge records of the file.
	pub fn load(&self) -> Result<Vec<EdgeRecord>, EdgeTrustError> {
		let file = File::open(&self.filepath).map_err(EdgeTrustError::IOError)?;
		Self::read_records(BufReader::new(file), self.has_headers)
	}

	/// Parses edge records from any reader.
	pub fn read_records<R: Read>(
		reader: R, has_headers: bool,
	) -> Result<Vec<EdgeRecord>, EdgeTrustError> {
		let mut reader = ReaderBuilder::new()
			.has_headers(has_headers)
			.flexible(true)
			.trim(Trim::All)
			.from_reader(reader);

		let mut records = Vec::new();
		for (index, result) in reader.records().enumerate() {
			let row = result.map_err(|e| EdgeTrustError::DatasetFormatError(e.to_string()))?;
			let line = row
				.position()
				.and_then(|position| usize::try_from(position.line()).ok())
				.unwrap_or(index + 1);

			if row.len() < 3 {
				return Err(EdgeTrustError::DatasetFormatError(format!(
					"line {}: expected 3 fields, found {}",
					line,
					row.len()
				)));
			}

			let weight = row[2].parse::<f64>().map_err(|e| {
				EdgeTrustError::DatasetFormatError(format!(
					"line {}: invalid weight \"{}\": {}",
					line, &row[2], e
				))
			})?;

			records.push(EdgeRecord::new(&row[0], &row[1], weight));
		}

		Ok(records)
	}
}

/// Prediction record tagged with the method that produced it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictionRow {
	/// Prediction method.
	pub method: Method,
	/// Edge source.
	pub source: String,
	/// Edge target.
	pub target: String,
	/// Held-out weight.
	pub true_weight: f64,
	/// Predicted weight.
	pub predicted_weight: f64,
}

impl PredictionRow {
	/// Creates a new prediction row.
	pub fn new(method: Method, record: &PredictionRecord) -> Self {
		Self {
			method,
			source: record.source.clone(),
			target: record.target.clone(),
			true_weight: record.true_weight,
			predicted_weight: record.predicted_weight,
		}
	}
}

/// Metric record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
	/// Prediction method.
	method: Method,
	/// Percentage of edges removed, empty for leave-one-out.
	percentage: Option<u32>,
	/// Edges kept in the reduced graph.
	retained_edges: usize,
	/// Edges withheld for prediction.
	held_out_edges: usize,
	/// Predictions used by the metrics.
	predicted: usize,
	/// Predictions skipped for unknown nodes.
	missing: usize,
	/// Root mean squared error, or `undefined`.
	rmse: String,
	/// Pearson correlation, or `undefined`.
	pcc: String,
}

impl MetricRecord {
	/// Creates a metric record from aggregate metrics.
	pub fn new(
		method: Method, percentage: Option<u32>, retained_edges: usize, held_out_edges: usize,
		metrics: &ErrorMetrics,
	) -> Self {
		Self {
			method,
			percentage,
			retained_edges,
			held_out_edges,
			predicted: metrics.predicted,
			missing: metrics.missing,
			rmse: format_metric(metrics.rmse),
			pcc: format_metric(metrics.pcc),
		}
	}

	/// Creates a metric record for a leave-out-by-percentage round.
	pub fn from_round(method: Method, round: &RoundMetrics) -> Self {
		Self::new(
			method,
			Some(round.percentage),
			round.retained_edges,
			round.held_out_edges,
			&round.metrics,
		)
	}

	/// Returns the method.
	pub fn method(&self) -> Method {
		self.method
	}

	/// Returns the percentage.
	pub fn percentage(&self) -> Option<u32> {
		self.percentage
	}

	/// Returns the RMSE column.
	pub fn rmse(&self) -> &String {
		&self.rmse
	}

	/// Returns the PCC column.
	pub fn pcc(&self) -> &String {
		&self.pcc
	}
}

/// Score record
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
	/// Scorer that produced the value.
	pub method: Method,
	/// Node identifier.
	pub node: String,
	/// Score name within the model.
	pub score: String,
	/// Score value.
	pub value: f64,
}

impl ScoreRecord {
	/// Flattens the score tables of a model, one record per node and score.
	pub fn from_model(model: &ReputationModel) -> Vec<Self> {
		let method = model.method();
		model
			.score_tables()
			.into_iter()
			.flat_map(|(score, table)| {
				table.iter().map(move |(node, value)| Self {
					method,
					node: node.clone(),
					score: score.to_string(),
					value: *value,
				})
			})
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use crate::storage::*;
	use serde::{Deserialize, Serialize};
	use std::{env::temp_dir, fs};

	#[derive(Debug, Deserialize, PartialEq, Clone, Serialize)]
	struct Record {
		node: String,
		score: f64,
	}

	#[test]
	fn test_csv_file_storage() {
		let filepath = temp_dir().join("edgetrust-test-storage.csv");
		let mut csv_storage = CSVFileStorage::<Record>::new(filepath.clone());

		let content = vec![Record { node: "alice".to_string(), score: 0.25 }];

		assert!(csv_storage.save(content.clone()).is_ok());

		let result = csv_storage.load();

		assert!(result.is_ok());
		let records: Vec<Record> = result.unwrap();
		assert_eq!(records.len(), 1);
		assert_eq!(records[0], content[0]);

		fs::remove_file(filepath).unwrap();
	}

	#[test]
	fn test_json_file_storage() {
		let filepath = temp_dir().join("edgetrust-test-storage.json");
		let mut json_storage = JSONFileStorage::<Record>::new(filepath.clone());

		let content = Record { node: "bob".to_string(), score: -1.5 };

		assert!(json_storage.save(content.clone()).is_ok());

		let result = json_storage.load();

		assert!(result.is_ok());
		assert_eq!(result.unwrap(), content);

		fs::remove_file(filepath).unwrap();
	}

	#[test]
	fn test_edge_list_ignores_extra_columns() {
		let data = "1,2,4,1289241911.72836\n2,3,-3,1289241941.53378\n";
		let records = EdgeListStorage::read_records(data.as_bytes(), false).unwrap();

		assert_eq!(
			records,
			vec![EdgeRecord::new("1", "2", 4.0), EdgeRecord::new("2", "3", -3.0)]
		);
	}

	#[test]
	fn test_edge_list_with_header() {
		let data = "source,target,weight\n a , b , 0.5\n";
		let records = EdgeListStorage::read_records(data.as_bytes(), true).unwrap();

		assert_eq!(records, vec![EdgeRecord::new("a", "b", 0.5)]);
	}

	#[test]
	fn test_edge_list_rejects_bad_weight() {
		let data = "1,2,4\n2,3,high\n";
		let result = EdgeListStorage::read_records(data.as_bytes(), false);

		assert!(matches!(
			result,
			Err(EdgeTrustError::DatasetFormatError(ref message)) if message.contains("line 2")
		));
	}

	#[test]
	fn test_edge_list_rejects_missing_field() {
		let data = "1,2\n";
		let result = EdgeListStorage::read_records(data.as_bytes(), false);

		assert!(matches!(result, Err(EdgeTrustError::DatasetFormatError(_))));
	}

	#[test]
	fn test_edge_list_file_load() {
		let filepath = temp_dir().join("edgetrust-test-edges.csv");
		fs::write(&filepath, "source,target,weight\nx,y,-2.5\n").unwrap();

		let storage = EdgeListStorage::new(filepath.clone()).with_headers(true);
		assert_eq!(storage.filepath(), &filepath);
		assert_eq!(storage.load().unwrap(), vec![EdgeRecord::new("x", "y", -2.5)]);

		fs::remove_file(filepath).unwrap();
	}

	#[test]
	fn test_metric_record_writes_undefined() {
		let metrics = ErrorMetrics { rmse: Some(0.5), pcc: None, predicted: 1, missing: 2 };
		let record = MetricRecord::new(Method::Reciprocal, None, 3, 1, &metrics);

		assert_eq!(record.method(), Method::Reciprocal);
		assert_eq!(record.percentage(), None);
		assert_eq!(record.rmse(), "0.500000");
		assert_eq!(record.pcc(), "undefined");
	}

	#[test]
	fn test_score_records_from_model() {
		use crate::{
			graph::SignedGraph,
			scorer::{status_theory::StatusTheory, Scorer},
		};

		let mut graph = SignedGraph::new();
		graph.add_edge("a", "b", 1.0);
		let model = StatusTheory.fit(&graph);

		let records = ScoreRecord::from_model(&model);

		assert_eq!(records.len(), 2);
		assert_eq!(records[0].method, Method::StatusTheory);
		assert_eq!(records[0].node, "a");
		assert_eq!(records[0].score, "status");
		assert_eq!(records[0].value, -1.0);
		assert_eq!(records[1].value, 1.0);
	}
}
