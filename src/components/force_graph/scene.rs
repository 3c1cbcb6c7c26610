//! Retained scene for the graph view.
//!
//! One [`NodeElement`] per node and one [`LinkElement`] per link. Elements are
//! keyed so that re-rendering a dataset keeps the elements of entities that
//! survive and drops the rest. Painting to the canvas reads this scene only.

use std::collections::{BTreeSet, HashMap};

use crate::components::element::{ElementId, ElementIds, Reconciliation};

use super::types::{GraphDataset, LinkMode, Position};

/// Node circle radius in pixels.
pub const NODE_RADIUS: f64 = 4.0;
/// Horizontal offset of a node label from the node centre.
pub const LABEL_OFFSET: f64 = 20.0;

/// Stroke treatment of a link, derived from its [`LinkMode`] only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkStyle {
	/// Default stroke, colored by the link's classes.
	Default,
	/// Dashed red stroke of fixed width.
	Missing,
}

impl LinkStyle {
	/// Stroke color of missing links.
	pub const MISSING_COLOR: &'static str = "red";
	/// Dash and gap length of missing links.
	pub const MISSING_DASH: (f64, f64) = (5.0, 5.0);
	/// Stroke width of missing links.
	pub const MISSING_WIDTH: f64 = 2.0;

	/// Style for a link of `mode`.
	pub fn for_mode(mode: LinkMode) -> Self {
		match mode {
			LinkMode::Normal => LinkStyle::Default,
			LinkMode::Missing => LinkStyle::Missing,
		}
	}
}

/// Identity of a link: its endpoints' node ids plus an occurrence counter for
/// parallel links between the same pair.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LinkKey {
	/// Id of the source node.
	pub source: String,
	/// Id of the target node.
	pub target: String,
	/// How many links between the same pair came before this one.
	pub occurrence: usize,
}

/// A drawn node group: circle, label and tooltip.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeElement {
	/// Stable element identity.
	pub id: ElementId,
	/// Id of the node this element draws.
	pub node_id: String,
	/// Label and tooltip text.
	pub caption: String,
	/// Centre of the node group.
	pub translate: Position,
	/// Drawn with a ring when set.
	pub fixed: bool,
}

/// A drawn link line.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkElement {
	/// Stable element identity.
	pub id: ElementId,
	/// Reconciliation key.
	pub key: LinkKey,
	/// Index of the source node element.
	pub source: usize,
	/// Index of the target node element.
	pub target: usize,
	/// Source end of the line.
	pub from: Position,
	/// Target end of the line.
	pub to: Position,
	/// Stroke treatment derived from the link mode.
	pub style: LinkStyle,
	/// Style classes copied from the link.
	pub classes: BTreeSet<String>,
	/// Link caption shown on hover.
	pub tooltip: String,
}

impl LinkElement {
	/// Distance from `point` to the line segment.
	pub fn distance_to(&self, point: Position) -> f64 {
		let (dx, dy) = (self.to.x - self.from.x, self.to.y - self.from.y);
		let len_sq = dx * dx + dy * dy;
		if len_sq < f64::EPSILON {
			return point.distance(self.from);
		}
		let t = (((point.x - self.from.x) * dx + (point.y - self.from.y) * dy) / len_sq)
			.clamp(0.0, 1.0);
		point.distance(Position::new(self.from.x + t * dx, self.from.y + t * dy))
	}
}

/// What the pointer is over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hit {
	/// Index of a node element.
	Node(usize),
	/// Index of a link element.
	Link(usize),
}

/// All elements currently drawn for one graph view.
#[derive(Clone, Debug, Default)]
pub struct Scene {
	nodes: Vec<NodeElement>,
	links: Vec<LinkElement>,
	ids: ElementIds,
}

impl Scene {
	/// Node elements, in dataset order.
	pub fn nodes(&self) -> &[NodeElement] {
		&self.nodes
	}

	/// Link elements, in dataset order.
	pub fn links(&self) -> &[LinkElement] {
		&self.links
	}

	/// Rebuild the element lists for `dataset`, reusing the elements of every
	/// node id and link key already present.
	pub fn reconcile(&mut self, dataset: &GraphDataset) -> Reconciliation {
		let mut old_nodes: HashMap<String, NodeElement> = self
			.nodes
			.drain(..)
			.map(|el| (el.node_id.clone(), el))
			.collect();
		let mut stats = Reconciliation::default();

		self.nodes = dataset
			.nodes()
			.iter()
			.map(|node| {
				let translate = node.position.unwrap_or_default();
				match old_nodes.remove(&node.id) {
					Some(mut el) => {
						stats.updated += 1;
						el.caption = node.caption.clone();
						el.fixed = node.fixed;
						if let Some(p) = node.position {
							el.translate = p;
						}
						el
					}
					None => {
						stats.entered += 1;
						NodeElement {
							id: self.ids.fresh(),
							node_id: node.id.clone(),
							caption: node.caption.clone(),
							translate,
							fixed: node.fixed,
						}
					}
				}
			})
			.collect();
		stats.exited += old_nodes.len();

		let mut old_links: HashMap<LinkKey, LinkElement> =
			self.links.drain(..).map(|el| (el.key.clone(), el)).collect();
		let mut occurrences: HashMap<(usize, usize), usize> = HashMap::new();

		let mut links = Vec::with_capacity(dataset.links().len());
		for link in dataset.links() {
			let occurrence = occurrences.entry((link.source, link.target)).or_insert(0);
			let key = LinkKey {
				source: dataset.nodes()[link.source].id.clone(),
				target: dataset.nodes()[link.target].id.clone(),
				occurrence: *occurrence,
			};
			*occurrence += 1;

			let id = match old_links.remove(&key) {
				Some(el) => {
					stats.updated += 1;
					el.id
				}
				None => {
					stats.entered += 1;
					self.ids.fresh()
				}
			};
			links.push(LinkElement {
				id,
				key,
				source: link.source,
				target: link.target,
				from: self.nodes[link.source].translate,
				to: self.nodes[link.target].translate,
				style: LinkStyle::for_mode(link.mode),
				classes: link.classes.clone(),
				tooltip: link.caption.clone(),
			});
		}
		stats.exited += old_links.len();
		self.links = links;
		stats
	}

	/// Move node groups and link endpoints to `positions` (dataset order).
	pub fn apply_positions(&mut self, positions: &[Position]) {
		for (el, &p) in self.nodes.iter_mut().zip(positions) {
			el.translate = p;
		}
		for link in &mut self.links {
			if let (Some(&from), Some(&to)) = (positions.get(link.source), positions.get(link.target))
			{
				link.from = from;
				link.to = to;
			}
		}
	}

	/// Update the fixed ring of one node element.
	pub fn set_fixed(&mut self, node: usize, fixed: bool) {
		if let Some(el) = self.nodes.get_mut(node) {
			el.fixed = fixed;
		}
	}

	/// Topmost node within `radius` of `point`, else the nearest link within
	/// `tolerance`.
	pub fn hit_test(&self, point: Position, radius: f64, tolerance: f64) -> Option<Hit> {
		if let Some(i) = self
			.nodes
			.iter()
			.rposition(|el| el.translate.distance(point) <= radius)
		{
			return Some(Hit::Node(i));
		}
		self.links
			.iter()
			.enumerate()
			.map(|(i, l)| (i, l.distance_to(point)))
			.filter(|&(_, d)| d <= tolerance)
			.min_by(|a, b| a.1.total_cmp(&b.1))
			.map(|(i, _)| Hit::Link(i))
	}

	/// Tooltip text for a hit element.
	pub fn tooltip(&self, hit: Hit) -> Option<&str> {
		match hit {
			Hit::Node(i) => self.nodes.get(i).map(|el| el.caption.as_str()),
			Hit::Link(i) => self.links.get(i).map(|el| el.tooltip.as_str()),
		}
	}
}
