//! # Signed Graph Module.
//!
//! Directed graph whose edges carry a signed weight together with the derived
//! sign, positive/negative magnitudes and the binarized weight used by random
//! walk scorers.

use crate::error::EdgeTrustError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Node identifier.
pub type NodeId = String;

/// Sign of an edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Sign {
	/// Weight is zero or greater.
	Positive,
	/// Weight is below zero.
	Negative,
}

impl Sign {
	/// Returns `1.0` for positive and `-1.0` for negative signs.
	pub fn factor(&self) -> f64 {
		match self {
			Sign::Positive => 1.0,
			Sign::Negative => -1.0,
		}
	}
}

/// Edge attributes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
	/// Observed signed strength.
	pub weight: f64,
	/// Sign derived from the weight.
	pub sign: Sign,
	/// Magnitude of a positive weight, zero otherwise.
	pub positive: f64,
	/// Magnitude of a negative weight, zero otherwise.
	pub negative: f64,
	/// Binarized sign: `1.0` for positive edges, `0.0` for negative ones.
	pub signed_weight: f64,
}

impl Edge {
	/// Builds the edge attributes for a raw weight. `-0.0` is stored as `0.0`.
	pub fn new(weight: f64) -> Self {
		let weight = if weight == 0.0 { 0.0 } else { weight };
		if weight >= 0.0 {
			Self {
				weight,
				sign: Sign::Positive,
				positive: weight,
				negative: 0.0,
				signed_weight: 1.0,
			}
		} else {
			Self {
				weight,
				sign: Sign::Negative,
				positive: 0.0,
				negative: -weight,
				signed_weight: 0.0,
			}
		}
	}

	/// Whether the edge is positive.
	pub fn is_positive(&self) -> bool {
		self.sign == Sign::Positive
	}
}

/// Weighted signed directed graph.
///
/// Nodes exist only as endpoints of edges: removing the last edge of a node
/// drops the node, restoring the edge brings it back. All maps are ordered so
/// iteration is deterministic.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SignedGraph {
	out_edges: BTreeMap<NodeId, BTreeMap<NodeId, Edge>>,
	in_edges: BTreeMap<NodeId, BTreeMap<NodeId, Edge>>,
	incidence: BTreeMap<NodeId, usize>,
	edge_count: usize,
}

impl SignedGraph {
	/// Creates an empty graph.
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts or overwrites the edge `source -> target`.
	/// Returns the previous attributes if the edge existed.
	pub fn add_edge(&mut self, source: &str, target: &str, weight: f64) -> Option<Edge> {
		self.insert(source, target, Edge::new(weight))
	}

	/// Re-inserts an edge with exactly the given attributes.
	pub fn restore_edge(&mut self, source: &str, target: &str, edge: Edge) -> Option<Edge> {
		self.insert(source, target, edge)
	}

	fn insert(&mut self, source: &str, target: &str, edge: Edge) -> Option<Edge> {
		let previous = self
			.out_edges
			.entry(source.to_string())
			.or_default()
			.insert(target.to_string(), edge);
		self.in_edges.entry(target.to_string()).or_default().insert(source.to_string(), edge);

		if previous.is_none() {
			self.edge_count += 1;
			*self.incidence.entry(source.to_string()).or_insert(0) += 1;
			*self.incidence.entry(target.to_string()).or_insert(0) += 1;
		}

		previous
	}

	/// Deletes the edge `source -> target`, returning its attributes.
	pub fn remove_edge(&mut self, source: &str, target: &str) -> Result<Edge, EdgeTrustError> {
		let edge = self
			.out_edges
			.get_mut(source)
			.and_then(|targets| targets.remove(target))
			.ok_or_else(|| {
				EdgeTrustError::EdgeNotFoundError(source.to_string(), target.to_string())
			})?;

		if self.out_edges.get(source).map_or(false, BTreeMap::is_empty) {
			self.out_edges.remove(source);
		}
		if let Some(sources) = self.in_edges.get_mut(target) {
			sources.remove(source);
			if sources.is_empty() {
				self.in_edges.remove(target);
			}
		}

		self.edge_count -= 1;
		self.release(source);
		self.release(target);

		Ok(edge)
	}

	fn release(&mut self, node: &str) {
		if let Some(count) = self.incidence.get_mut(node) {
			*count -= 1;
			if *count == 0 {
				self.incidence.remove(node);
			}
		}
	}

	/// Number of nodes.
	pub fn node_count(&self) -> usize {
		self.incidence.len()
	}

	/// Number of edges.
	pub fn edge_count(&self) -> usize {
		self.edge_count
	}

	/// Whether the graph has no edges.
	pub fn is_empty(&self) -> bool {
		self.edge_count == 0
	}

	/// Iterates over the nodes in ascending order.
	pub fn nodes(&self) -> impl Iterator<Item = &NodeId> {
		self.incidence.keys()
	}

	/// Whether the node is an endpoint of at least one edge.
	pub fn contains_node(&self, node: &str) -> bool {
		self.incidence.contains_key(node)
	}

	/// Returns the attributes of `source -> target`.
	pub fn edge(&self, source: &str, target: &str) -> Option<&Edge> {
		self.out_edges.get(source).and_then(|targets| targets.get(target))
	}

	/// Returns the weight of `source -> target`.
	pub fn weight(&self, source: &str, target: &str) -> Option<f64> {
		self.edge(source, target).map(|edge| edge.weight)
	}

	/// Iterates over all edges as `(source, target, edge)`.
	pub fn edges(&self) -> impl Iterator<Item = (&NodeId, &NodeId, &Edge)> {
		self.out_edges.iter().flat_map(|(source, targets)| {
			targets.iter().map(move |(target, edge)| (source, target, edge))
		})
	}

	/// Iterates over the outgoing edges of `node` as `(target, edge)`.
	pub fn out_edges(&self, node: &str) -> impl Iterator<Item = (&NodeId, &Edge)> {
		self.out_edges.get(node).into_iter().flat_map(|targets| targets.iter())
	}

	/// Iterates over the incoming edges of `node` as `(source, edge)`.
	pub fn in_edges(&self, node: &str) -> impl Iterator<Item = (&NodeId, &Edge)> {
		self.in_edges.get(node).into_iter().flat_map(|sources| sources.iter())
	}

	/// Nodes linked to `node` in either direction, excluding `node` itself.
	pub fn neighbours(&self, node: &str) -> BTreeSet<&NodeId> {
		self.out_edges(node)
			.map(|(target, _)| target)
			.chain(self.in_edges(node).map(|(source, _)| source))
			.filter(|other| other.as_str() != node)
			.collect()
	}

	/// Edge between `a` and `b` ignoring direction, `a -> b` first.
	pub fn link(&self, a: &str, b: &str) -> Option<&Edge> {
		self.edge(a, b).or_else(|| self.edge(b, a))
	}

	/// Number of outgoing edges.
	pub fn out_degree(&self, node: &str) -> usize {
		self.out_edges.get(node).map_or(0, BTreeMap::len)
	}

	/// Number of incoming edges.
	pub fn in_degree(&self, node: &str) -> usize {
		self.in_edges.get(node).map_or(0, BTreeMap::len)
	}

	/// Largest absolute weight, `None` for an empty graph.
	pub fn max_abs_weight(&self) -> Option<f64> {
		self.edges().map(|(_, _, edge)| edge.weight.abs()).reduce(f64::max)
	}

	/// Mean weight, `None` for an empty graph.
	pub fn mean_weight(&self) -> Option<f64> {
		if self.is_empty() {
			return None;
		}
		let sum: f64 = self.edges().map(|(_, _, edge)| edge.weight).sum();
		Some(sum / self.edge_count as f64)
	}

	/// Factor that maps every weight into `[-1, 1]`.
	/// Falls back to `1.0` when all weights are zero.
	pub fn weight_scale(&self) -> f64 {
		match self.max_abs_weight() {
			Some(max) if max > 0.0 => max,
			_ => 1.0,
		}
	}
}
