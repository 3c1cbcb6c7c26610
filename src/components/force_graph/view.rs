//! Graph view state: binds a dataset to the scene, drives the layout engine,
//! and mediates drag / double-click interaction.
//!
//! Created once per canvas and mutated by the animation loop, the pointer
//! handlers, and completed fetches. All of these run on the UI thread, so a
//! tick never interleaves with a drag update.

use std::cell::RefCell;
use std::collections::HashMap;

use log::{debug, error, info, warn};
use serde::Deserialize;

use crate::components::element::Reconciliation;
use crate::error::ViewError;

use super::fetch::DataSource;
use super::layout::{LayoutEngine, TickListener};
use super::scene::{Hit, Scene};
use super::types::{CanvasSize, GraphDataset, Position};

/// Whether a node stays pinned where the user dropped it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinPolicy {
	/// Dropped nodes become fixed until double-clicked.
	#[default]
	Pin,
	/// Dropped nodes return to simulation control (unless already fixed).
	Release,
}

/// Identifies one fetch-then-render request. Later requests compare greater.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

/// What happened to a completed request.
#[derive(Clone, Debug, PartialEq)]
pub enum LoadOutcome {
	/// The dataset is on screen.
	Rendered(Reconciliation),
	/// The fetch failed; the previous render stays on screen.
	Failed,
	/// A newer request was issued before this one completed.
	Stale,
}

/// Writes positions into the dataset and the scene.
struct Frame<'a> {
	dataset: &'a mut GraphDataset,
	scene: &'a mut Scene,
}

impl TickListener for Frame<'_> {
	fn on_tick(&mut self, positions: &[Position]) {
		for (node, &p) in self.dataset.nodes_mut().iter_mut().zip(positions) {
			node.position = Some(p);
		}
		self.scene.apply_positions(positions);
	}
}

/// Interactive node/link diagram over a [`LayoutEngine`].
pub struct GraphView<L: LayoutEngine> {
	layout: L,
	scene: Scene,
	dataset: GraphDataset,
	canvas: Option<CanvasSize>,
	pin_policy: PinPolicy,
	latest_request: u64,
	dragging: Option<usize>,
}

impl<L: LayoutEngine> GraphView<L> {
	/// Empty view driving `layout`.
	pub fn new(layout: L, pin_policy: PinPolicy) -> Self {
		Self {
			layout,
			scene: Scene::default(),
			dataset: GraphDataset::default(),
			canvas: None,
			pin_policy,
			latest_request: 0,
			dragging: None,
		}
	}

	/// Retained elements currently drawn.
	pub fn scene(&self) -> &Scene {
		&self.scene
	}

	/// Dataset on screen, with current positions.
	pub fn dataset(&self) -> &GraphDataset {
		&self.dataset
	}

	/// Engine driving node positions.
	pub fn layout(&self) -> &L {
		&self.layout
	}

	/// Canvas size measured at the last render.
	pub fn canvas(&self) -> Option<CanvasSize> {
		self.canvas
	}

	/// What happens to a node when its drag ends.
	pub fn pin_policy(&self) -> PinPolicy {
		self.pin_policy
	}

	/// Show `dataset` on a canvas of `canvas` size.
	///
	/// Nodes that were already on screen keep their place and their pin,
	/// unless the new dataset fixes them somewhere. Positions of free nodes
	/// in the dataset only seed nodes that are new.
	pub fn render(&mut self, mut dataset: GraphDataset, canvas: CanvasSize) -> Reconciliation {
		let previous: HashMap<&str, (Position, bool)> = self
			.dataset
			.nodes()
			.iter()
			.filter_map(|n| Some((n.id.as_str(), (n.position?, n.fixed))))
			.collect();
		for node in dataset.nodes_mut() {
			if node.fixed {
				continue;
			}
			if let Some(&(position, fixed)) = previous.get(node.id.as_str()) {
				node.position = Some(position);
				node.fixed = fixed;
			}
		}

		if dataset.is_empty() {
			warn!("graph: dataset has no nodes");
		}
		self.dragging = None;
		self.canvas = Some(canvas);
		self.layout.load(&dataset, canvas);
		let stats = self.scene.reconcile(&dataset);
		self.dataset = dataset;
		let positions = self.layout.positions();
		self.on_tick(&positions);

		info!(
			"graph: rendered {} nodes, {} links ({} new, {} kept, {} removed)",
			self.dataset.nodes().len(),
			self.dataset.links().len(),
			stats.entered,
			stats.updated,
			stats.exited
		);
		stats
	}

	/// Place every node group and link end at `positions` (dataset order).
	pub fn on_tick(&mut self, positions: &[Position]) {
		Frame {
			dataset: &mut self.dataset,
			scene: &mut self.scene,
		}
		.on_tick(positions);
	}

	/// Run one simulation step of `dt` seconds.
	pub fn advance(&mut self, dt: f32) {
		let mut frame = Frame {
			dataset: &mut self.dataset,
			scene: &mut self.scene,
		};
		self.layout.step(dt, &mut frame);
	}

	/// Stop the layout and hold `node` under the pointer.
	pub fn on_drag_start(&mut self, node: usize) -> bool {
		if node >= self.dataset.nodes().len() {
			warn!("graph: drag start on unknown node #{node}");
			return false;
		}
		self.layout.stop();
		self.layout.set_fixed(node, true);
		self.dragging = Some(node);
		true
	}

	/// Move `node` by `(dx, dy)` and redraw immediately.
	pub fn on_drag_move(&mut self, node: usize, dx: f64, dy: f64) -> bool {
		let Some(n) = self.dataset.node_mut(node) else {
			return false;
		};
		let position = n.position.unwrap_or_default().offset(dx, dy);
		n.position = Some(position);
		self.layout.set_position(node, position);

		let positions: Vec<Position> = self
			.dataset
			.nodes()
			.iter()
			.map(|n| n.position.unwrap_or_default())
			.collect();
		self.on_tick(&positions);
		true
	}

	/// Resume the layout; pins `node` under [`PinPolicy::Pin`].
	pub fn on_drag_end(&mut self, node: usize) -> bool {
		let pin = self.pin_policy == PinPolicy::Pin;
		let Some(n) = self.dataset.node_mut(node) else {
			return false;
		};
		n.fixed |= pin;
		let fixed = n.fixed;

		self.layout.set_fixed(node, fixed);
		self.scene.set_fixed(node, fixed);
		self.layout.resume();
		self.dragging = None;
		debug!("graph: drag of node #{node} ended, fixed={fixed}");
		true
	}

	/// Release `node` back to the simulation.
	pub fn on_double_click(&mut self, node: usize) -> bool {
		let Some(n) = self.dataset.node_mut(node) else {
			return false;
		};
		n.fixed = false;
		self.layout.set_fixed(node, false);
		self.scene.set_fixed(node, false);
		true
	}

	/// Node currently being dragged.
	pub fn dragging(&self) -> Option<usize> {
		self.dragging
	}

	/// Element under `point`, see [`Scene::hit_test`].
	pub fn hit_test(&self, point: Position, radius: f64, tolerance: f64) -> Option<Hit> {
		self.scene.hit_test(point, radius, tolerance)
	}

	/// Start a new request. Any request begun earlier becomes stale.
	pub fn begin_request(&mut self) -> RequestToken {
		self.latest_request += 1;
		RequestToken(self.latest_request)
	}

	/// Apply the result of the request identified by `token`.
	pub fn complete_request(
		&mut self,
		token: RequestToken,
		result: Result<GraphDataset, ViewError>,
		canvas: CanvasSize,
	) -> LoadOutcome {
		if token.0 != self.latest_request {
			debug!(
				"graph: discarding response for request {} (latest is {})",
				token.0, self.latest_request
			);
			return LoadOutcome::Stale;
		}
		match result {
			Ok(dataset) => LoadOutcome::Rendered(self.render(dataset, canvas)),
			Err(e) => {
				error!("graph: failed to load graph data: {e}");
				LoadOutcome::Failed
			}
		}
	}
}

/// Fetch the graph for `ids` from `source` and render it into `view`.
///
/// The canvas is measured after the fetch completes, right before rendering.
/// The view is not borrowed across the await, so other handlers keep running.
pub async fn load<L, S>(
	view: &RefCell<GraphView<L>>,
	source: &S,
	ids: &[String],
	measure: impl FnOnce() -> CanvasSize,
) -> LoadOutcome
where
	L: LayoutEngine,
	S: DataSource + ?Sized,
{
	let token = view.borrow_mut().begin_request();
	let result = source.fetch_graph(ids).await;
	let canvas = measure();
	view.borrow_mut().complete_request(token, result, canvas)
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;

	use async_trait::async_trait;
	use futures::executor::block_on;

	use super::*;
	use crate::components::force_graph::layout::ForceLayout;
	use crate::components::force_graph::scene::LinkStyle;
	use crate::components::force_graph::types::{Link, Node};

	/// Deterministic engine: every step shifts free nodes right by one pixel.
	#[derive(Default)]
	struct ScriptedLayout {
		positions: Vec<Position>,
		fixed: Vec<bool>,
		running: bool,
		loads: usize,
	}

	impl LayoutEngine for ScriptedLayout {
		fn load(&mut self, dataset: &GraphDataset, _size: CanvasSize) {
			self.positions = dataset
				.nodes()
				.iter()
				.enumerate()
				.map(|(i, n)| n.position.unwrap_or(Position::new(i as f64 * 10.0, 0.0)))
				.collect();
			self.fixed = dataset.nodes().iter().map(|n| n.fixed).collect();
			self.running = true;
			self.loads += 1;
		}

		fn step(&mut self, _dt: f32, listener: &mut dyn TickListener) {
			if !self.running {
				return;
			}
			for (p, fixed) in self.positions.iter_mut().zip(&self.fixed) {
				if !fixed {
					p.x += 1.0;
				}
			}
			listener.on_tick(&self.positions);
		}

		fn positions(&self) -> Vec<Position> {
			self.positions.clone()
		}

		fn set_position(&mut self, node: usize, position: Position) {
			self.positions[node] = position;
		}

		fn set_fixed(&mut self, node: usize, fixed: bool) {
			self.fixed[node] = fixed;
		}

		fn stop(&mut self) {
			self.running = false;
		}

		fn resume(&mut self) {
			self.running = true;
		}

		fn is_running(&self) -> bool {
			self.running
		}
	}

	const CANVAS: CanvasSize = CanvasSize::new(720.0, 680.0);

	fn view(policy: PinPolicy) -> GraphView<ScriptedLayout> {
		GraphView::new(ScriptedLayout::default(), policy)
	}

	fn chain(ids: &[&str]) -> GraphDataset {
		GraphDataset::new(
			ids.iter().map(|id| Node::new(*id)).collect(),
			(1..ids.len()).map(|i| Link::new(i - 1, i)).collect(),
		)
		.unwrap()
	}

	#[test]
	fn missing_link_scenario() {
		let mut v = view(PinPolicy::Pin);
		let data = GraphDataset::new(
			vec![Node::new("a"), Node::new("b")],
			vec![Link::new(0, 1).missing()],
		)
		.unwrap();

		let stats = v.render(data, CANVAS);
		assert_eq!(stats, Reconciliation { entered: 3, updated: 0, exited: 0 });
		assert_eq!(v.scene().nodes().len(), 2);
		assert_eq!(v.scene().links().len(), 1);
		assert_eq!(v.scene().links()[0].style, LinkStyle::Missing);
	}

	#[test]
	fn rerender_preserves_common_elements() {
		let mut v = view(PinPolicy::Pin);
		v.render(chain(&["a", "b", "c"]), CANVAS);
		let id_b = v.scene().nodes()[1].id;

		let stats = v.render(chain(&["x", "b"]), CANVAS);
		assert_eq!(stats.exited, 4);
		assert_eq!(v.scene().nodes().len(), 2);
		assert_eq!(v.scene().nodes()[1].id, id_b);
		assert_eq!(v.layout().loads, 2);
	}

	#[test]
	fn rerender_keeps_positions_of_surviving_nodes() {
		let mut v = view(PinPolicy::Pin);
		v.render(chain(&["a", "b"]), CANVAS);
		v.on_drag_start(1);
		v.on_drag_move(1, 100.0, 50.0);
		v.on_drag_end(1);

		v.render(chain(&["b", "c"]), CANVAS);
		assert_eq!(v.dataset().nodes()[0].position, Some(Position::new(110.0, 50.0)));
		assert_eq!(v.scene().nodes()[0].translate, Position::new(110.0, 50.0));
	}

	#[test]
	fn reload_of_service_document_keeps_layout_and_pins() {
		// the service sends x/y for every node, 0/0 for unplaced hops
		let json = r#"{
			"nodes": [
				{"caption": "probe", "x": 10, "y": 0, "fixed": true},
				{"caption": "hop-1", "x": 0, "y": 0, "fixed": false},
				{"caption": "hop-2", "x": 0, "y": 0, "fixed": false},
				{"caption": "target", "x": 800, "y": 0, "fixed": true}
			],
			"links": [
				{"source": 0, "target": 1, "mode": "normal", "probe": 1},
				{"source": 1, "target": 2, "mode": "normal", "probe": 1},
				{"source": 2, "target": 3, "mode": "missing", "probe": 1}
			]
		}"#;

		let mut v = view(PinPolicy::Pin);
		v.render(GraphDataset::from_json(json).unwrap(), CANVAS);
		v.advance(0.016);
		v.advance(0.016);
		v.on_drag_start(1);
		v.on_drag_move(1, 30.0, 40.0);
		v.on_drag_end(1);

		let stats = v.render(GraphDataset::from_json(json).unwrap(), CANVAS);
		assert_eq!(stats, Reconciliation { entered: 0, updated: 7, exited: 0 });
		let nodes = v.dataset().nodes();
		assert_eq!(nodes[0].position, Some(Position::new(10.0, 0.0)));
		assert_eq!(nodes[1].position, Some(Position::new(32.0, 40.0)));
		assert!(nodes[1].fixed);
		assert_eq!(nodes[2].position, Some(Position::new(2.0, 0.0)));
		assert!(!nodes[2].fixed);
		assert!(v.layout().fixed[1]);
		assert_eq!(v.scene().nodes()[1].translate, Position::new(32.0, 40.0));
	}

	#[test]
	fn tick_moves_links_with_their_endpoints() {
		let mut v = view(PinPolicy::Pin);
		let data = GraphDataset::new(
			vec![Node::new("a"), Node::new("b").at(5.0, 5.0).pinned()],
			vec![Link::new(0, 1)],
		)
		.unwrap();
		v.render(data, CANVAS);
		v.advance(0.016);
		v.advance(0.016);

		let nodes = v.scene().nodes();
		let link = &v.scene().links()[0];
		assert_eq!(nodes[0].translate, Position::new(2.0, 0.0));
		assert_eq!(link.from, nodes[0].translate);
		assert_eq!(link.to, Position::new(5.0, 5.0));
		assert!(v.dataset().nodes()[1].fixed);
	}

	#[test]
	fn on_tick_is_idempotent() {
		let mut v = view(PinPolicy::Pin);
		v.render(chain(&["a", "b"]), CANVAS);
		let positions = [Position::new(1.0, 1.0), Position::new(2.0, 2.0)];
		v.on_tick(&positions);
		let once = v.scene().clone();
		v.on_tick(&positions);
		assert_eq!(v.scene().nodes(), once.nodes());
		assert_eq!(v.scene().links(), once.links());
		assert!(v.dataset().nodes().iter().all(|n| !n.fixed));
	}

	#[test]
	fn drag_moves_only_the_dragged_node() {
		let mut v = view(PinPolicy::Release);
		v.render(chain(&["a", "b", "c"]), CANVAS);
		let before: Vec<_> = v.scene().nodes().iter().map(|n| n.translate).collect();

		assert!(v.on_drag_start(1));
		assert!(!v.layout().is_running());
		assert!(v.on_drag_move(1, 3.0, -4.0));

		let after: Vec<_> = v.scene().nodes().iter().map(|n| n.translate).collect();
		assert_eq!(after[0], before[0]);
		assert_eq!(after[2], before[2]);
		assert_eq!(after[1], before[1].offset(3.0, -4.0));
		assert_eq!(v.scene().links()[0].to, after[1]);
		assert_eq!(v.scene().links()[1].from, after[1]);

		// stopped engine does not fight the drag
		v.advance(0.016);
		assert_eq!(v.scene().nodes()[1].translate, after[1]);
	}

	#[test]
	fn pin_policy_decides_fixed_after_drag() {
		let mut pin = view(PinPolicy::Pin);
		pin.render(chain(&["a", "b"]), CANVAS);
		pin.on_drag_start(0);
		pin.on_drag_end(0);
		assert!(pin.dataset().nodes()[0].fixed);
		assert!(pin.scene().nodes()[0].fixed);
		assert!(pin.layout().is_running());

		let mut release = view(PinPolicy::Release);
		release.render(chain(&["a", "b"]), CANVAS);
		release.on_drag_start(0);
		release.on_drag_end(0);
		assert!(!release.dataset().nodes()[0].fixed);
		assert!(!release.layout().fixed[0]);
		assert!(release.layout().is_running());
	}

	#[test]
	fn release_policy_keeps_nodes_that_were_already_fixed() {
		let mut v = view(PinPolicy::Release);
		let data = GraphDataset::new(vec![Node::new("a").at(1.0, 1.0).pinned()], vec![]).unwrap();
		v.render(data, CANVAS);
		v.on_drag_start(0);
		v.on_drag_end(0);
		assert!(v.dataset().nodes()[0].fixed);
	}

	#[test]
	fn double_click_releases_node() {
		let mut v = view(PinPolicy::Pin);
		v.render(chain(&["a", "b"]), CANVAS);
		v.on_drag_start(1);
		v.on_drag_end(1);
		assert!(v.on_double_click(1));
		assert!(!v.dataset().nodes()[1].fixed);
		assert!(!v.scene().nodes()[1].fixed);
		assert!(!v.layout().fixed[1]);
	}

	#[test]
	fn interactions_on_unknown_nodes_are_ignored() {
		let mut v = view(PinPolicy::Pin);
		v.render(chain(&["a"]), CANVAS);
		assert!(!v.on_drag_start(5));
		assert!(v.layout().is_running());
		assert!(!v.on_drag_move(5, 1.0, 1.0));
		assert!(!v.on_drag_end(5));
		assert!(!v.on_double_click(5));
	}

	#[test]
	fn stale_responses_are_discarded() {
		let mut v = view(PinPolicy::Pin);
		let first = v.begin_request();
		let second = v.begin_request();

		let outcome = v.complete_request(second, Ok(chain(&["new"])), CANVAS);
		assert!(matches!(outcome, LoadOutcome::Rendered(_)));

		let outcome = v.complete_request(first, Ok(chain(&["old", "older"])), CANVAS);
		assert_eq!(outcome, LoadOutcome::Stale);
		assert_eq!(v.scene().nodes().len(), 1);
		assert_eq!(v.scene().nodes()[0].node_id, "new");
	}

	#[test]
	fn failed_fetch_keeps_previous_render() {
		let mut v = view(PinPolicy::Pin);
		let t = v.begin_request();
		v.complete_request(t, Ok(chain(&["a", "b"])), CANVAS);

		let t = v.begin_request();
		let outcome = v.complete_request(t, Err(ViewError::Status(502)), CANVAS);
		assert_eq!(outcome, LoadOutcome::Failed);
		assert_eq!(v.scene().nodes().len(), 2);
		assert_eq!(v.canvas(), Some(CANVAS));
	}

	struct FixedSource {
		calls: Cell<usize>,
	}

	#[async_trait(?Send)]
	impl DataSource for FixedSource {
		async fn fetch_graph(&self, ids: &[String]) -> Result<GraphDataset, ViewError> {
			self.calls.set(self.calls.get() + 1);
			let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
			Ok(chain(&ids))
		}
	}

	#[test]
	fn load_fetches_and_renders_with_fresh_measurement() {
		let view = RefCell::new(GraphView::new(ForceLayout::default(), PinPolicy::Pin));
		let source = FixedSource { calls: Cell::new(0) };
		let ids = vec!["192.0.2.1".to_string(), "192.0.2.2".to_string()];

		let outcome = block_on(load(&view, &source, &ids, || CanvasSize::new(300.0, 200.0)));
		assert!(matches!(outcome, LoadOutcome::Rendered(r) if r.entered == 3));
		assert_eq!(source.calls.get(), 1);

		let v = view.borrow();
		assert_eq!(v.canvas(), Some(CanvasSize::new(300.0, 200.0)));
		assert_eq!(v.scene().nodes().len(), 2);
		assert!(v.dataset().nodes().iter().all(|n| n.position.is_some()));
	}
}
