//! Graph data structures: the JSON wire schema served by the pathspider
//! service and the validated dataset the view renders.
//!
//! Parsing happens once at the fetch boundary. A [`GraphDataset`] can only be
//! built through validation, so every link endpoint is known to resolve.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::Deserialize;

pub use crate::components::geometry::{CanvasSize, Position};
use crate::error::{InvalidDatasetError, ViewError};

/// How a link was observed along a traced path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkMode {
	/// Consecutive responding hops.
	#[default]
	Normal,
	/// One or more hops in between did not answer.
	Missing,
}

/// A node in the rendered graph.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	/// Stable identity across re-renders.
	pub id: String,
	/// Label and tooltip text.
	pub caption: String,
	/// `None` until the layout places the node.
	pub position: Option<Position>,
	/// Fixed nodes are moved only by dragging, never by the simulation.
	pub fixed: bool,
}

impl Node {
	/// Unplaced, free node captioned with its id.
	pub fn new(id: impl Into<String>) -> Self {
		let id = id.into();
		Self {
			caption: id.clone(),
			id,
			position: None,
			fixed: false,
		}
	}

	/// Replace the caption.
	pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
		self.caption = caption.into();
		self
	}

	/// Start the node at `(x, y)`.
	pub fn at(mut self, x: f64, y: f64) -> Self {
		self.position = Some(Position::new(x, y));
		self
	}

	/// Mark the node fixed.
	pub fn pinned(mut self) -> Self {
		self.fixed = true;
		self
	}
}

/// A link between two nodes. Endpoints index into [`GraphDataset::nodes`].
#[derive(Clone, Debug, PartialEq)]
pub struct Link {
	/// Source node index.
	pub source: usize,
	/// Target node index.
	pub target: usize,
	/// How the link was observed.
	pub mode: LinkMode,
	/// Extra style classes, e.g. `probe_<name>` for per-probe coloring.
	pub classes: BTreeSet<String>,
	/// Tooltip text.
	pub caption: String,
}

impl Link {
	/// Normal link without classes or caption.
	pub fn new(source: usize, target: usize) -> Self {
		Self {
			source,
			target,
			mode: LinkMode::Normal,
			classes: BTreeSet::new(),
			caption: String::new(),
		}
	}

	/// Mark the link as spanning unanswered hops.
	pub fn missing(mut self) -> Self {
		self.mode = LinkMode::Missing;
		self
	}

	/// Add a style class.
	pub fn with_class(mut self, class: impl Into<String>) -> Self {
		self.classes.insert(class.into());
		self
	}

	/// Replace the caption.
	pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
		self.caption = caption.into();
		self
	}

	/// Probe name carried in a `probe_<name>` class, if any.
	pub fn probe(&self) -> Option<&str> {
		self.classes.iter().find_map(|c| c.strip_prefix("probe_"))
	}
}

/// A validated graph: unique node ids, every link endpoint in range.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphDataset {
	nodes: Vec<Node>,
	links: Vec<Link>,
}

impl GraphDataset {
	/// Validate `nodes` and `links` into a dataset.
	pub fn new(nodes: Vec<Node>, links: Vec<Link>) -> Result<Self, InvalidDatasetError> {
		let mut seen = HashMap::with_capacity(nodes.len());
		for (index, node) in nodes.iter().enumerate() {
			if node.id.is_empty() {
				return Err(InvalidDatasetError::MissingNodeId { index });
			}
			if seen.insert(node.id.as_str(), index).is_some() {
				return Err(InvalidDatasetError::DuplicateNode(node.id.clone()));
			}
		}
		for (i, link) in links.iter().enumerate() {
			for (endpoint, index) in [("source", link.source), ("target", link.target)] {
				if index >= nodes.len() {
					return Err(InvalidDatasetError::EndpointOutOfRange {
						link: i,
						endpoint,
						index,
						nodes: nodes.len(),
					});
				}
			}
		}
		Ok(Self { nodes, links })
	}

	/// Parse and validate a graph document as served by `/command/graph`.
	pub fn from_json(text: &str) -> Result<Self, ViewError> {
		let wire: WireDataset = serde_json::from_str(text)?;
		Ok(Self::from_wire(wire)?)
	}

	/// Resolve endpoints, derive classes and captions, then validate.
	pub fn from_wire(wire: WireDataset) -> Result<Self, InvalidDatasetError> {
		let nodes = wire
			.nodes
			.into_iter()
			.enumerate()
			.map(|(index, n)| {
				let id = n
					.id
					.or_else(|| n.caption.clone())
					.filter(|id| !id.is_empty())
					.ok_or(InvalidDatasetError::MissingNodeId { index })?;
				let position = match (n.x, n.y) {
					(None, None) => None,
					(x, y) => Some(Position::new(x.unwrap_or(0.0), y.unwrap_or(0.0))),
				};
				Ok(Node {
					caption: n.caption.unwrap_or_else(|| id.clone()),
					id,
					position,
					fixed: n.fixed,
				})
			})
			.collect::<Result<Vec<_>, InvalidDatasetError>>()?;

		let index_of: HashMap<&str, usize> = nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.id.as_str(), i))
			.collect();
		let resolve = |link: usize, endpoint: &'static str, r: EndpointRef| match r {
			EndpointRef::Index(index) if index < nodes.len() => Ok(index),
			EndpointRef::Index(index) => Err(InvalidDatasetError::EndpointOutOfRange {
				link,
				endpoint,
				index,
				nodes: nodes.len(),
			}),
			EndpointRef::Id(id) => index_of
				.get(id.as_str())
				.copied()
				.ok_or(InvalidDatasetError::UnknownEndpoint { link, endpoint, id }),
		};

		let mut links = Vec::with_capacity(wire.links.len());
		for (i, l) in wire.links.into_iter().enumerate() {
			let source = resolve(i, "source", l.source)?;
			let target = resolve(i, "target", l.target)?;
			let mut classes: BTreeSet<String> = l.classes.into_iter().collect();
			if let Some(probe) = l.probe {
				classes.insert(format!("probe_{probe}"));
			}
			let caption = l.caption.unwrap_or_else(|| {
				format!("{} -> {}", nodes[source].caption, nodes[target].caption)
			});
			links.push(Link {
				source,
				target,
				mode: l.mode,
				classes,
				caption,
			});
		}

		Self::new(nodes, links)
	}

	/// Validated nodes.
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// Validated links.
	pub fn links(&self) -> &[Link] {
		&self.links
	}

	/// True when there are no nodes.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub(crate) fn node_mut(&mut self, index: usize) -> Option<&mut Node> {
		self.nodes.get_mut(index)
	}

	pub(crate) fn nodes_mut(&mut self) -> &mut [Node] {
		&mut self.nodes
	}
}

/// Link endpoint as it appears on the wire: a node index or a node id.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EndpointRef {
	/// Position in the node list.
	Index(usize),
	/// Node identity.
	Id(String),
}

/// Probe identifier; the service sends either names or numbers.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ProbeRef {
	/// Probe name.
	Name(String),
	/// Numeric probe id.
	Number(i64),
}

impl fmt::Display for ProbeRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ProbeRef::Name(name) => f.write_str(name),
			ProbeRef::Number(n) => write!(f, "{n}"),
		}
	}
}

/// Node record as served by the graph endpoint.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct WireNode {
	/// Node identity.
	pub id: Option<String>,
	/// Display name; also the identity when `id` is absent.
	pub caption: Option<String>,
	/// Initial horizontal position.
	pub x: Option<f64>,
	/// Initial vertical position.
	pub y: Option<f64>,
	/// Probe and target nodes arrive fixed.
	#[serde(default)]
	pub fixed: bool,
}

/// Link record as served by the graph endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct WireLink {
	/// Source node, by index or id.
	pub source: EndpointRef,
	/// Target node, by index or id.
	pub target: EndpointRef,
	/// How the link was observed.
	#[serde(default)]
	pub mode: LinkMode,
	/// Explicit style classes.
	#[serde(default)]
	pub classes: Vec<String>,
	/// Probe that traced the link; adds a `probe_<probe>` class.
	pub probe: Option<ProbeRef>,
	/// Tooltip text.
	pub caption: Option<String>,
}

/// Complete graph document.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct WireDataset {
	/// All nodes.
	#[serde(default)]
	pub nodes: Vec<WireNode>,
	/// All links.
	#[serde(default)]
	pub links: Vec<WireLink>,
}
