//! Error types for loading and validating graph data.

use thiserror::Error;

/// Result type alias for view operations.
pub type Result<T> = std::result::Result<T, ViewError>;

/// A graph document that parsed as JSON but does not describe a usable graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidDatasetError {
	/// Node at `index` has neither an `id` nor a `caption`.
	#[error("node #{index} has no id or caption")]
	MissingNodeId {
		/// Position of the node in the document.
		index: usize,
	},

	/// Two nodes share the same identity.
	#[error("duplicate node id `{0}`")]
	DuplicateNode(String),

	/// A link refers to a node index past the end of the node list.
	#[error("link #{link} {endpoint} index {index} is out of range ({nodes} nodes)")]
	EndpointOutOfRange {
		/// Position of the link in the document.
		link: usize,
		/// `"source"` or `"target"`.
		endpoint: &'static str,
		/// The offending index.
		index: usize,
		/// Number of nodes in the document.
		nodes: usize,
	},

	/// A link refers to a node id that is not in the node list.
	#[error("link #{link} {endpoint} `{id}` is not a known node")]
	UnknownEndpoint {
		/// Position of the link in the document.
		link: usize,
		/// `"source"` or `"target"`.
		endpoint: &'static str,
		/// The unresolved id.
		id: String,
	},
}

/// Errors raised while retrieving a graph dataset.
#[derive(Debug, Error)]
pub enum ViewError {
	/// The request could not be issued or the body could not be read.
	#[error("fetch failed: {0}")]
	Fetch(String),

	/// The server answered with a non-success status.
	#[error("server returned HTTP {0}")]
	Status(u16),

	/// The body was not valid graph JSON.
	#[error("invalid graph JSON: {0}")]
	Json(#[from] serde_json::Error),

	/// The body was valid JSON but failed validation.
	#[error("invalid graph dataset: {0}")]
	InvalidDataset(#[from] InvalidDatasetError),
}
