//! Layout engine seam and the default force-directed implementation.
//!
//! The view never computes positions itself. It hands the dataset to a
//! [`LayoutEngine`], drives it once per animation frame, and receives the
//! recomputed positions through a [`TickListener`].

use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use serde::Deserialize;

use super::types::{CanvasSize, GraphDataset, Position};

/// Receives positions each time the layout recomputes them.
///
/// `positions[i]` belongs to `dataset.nodes()[i]`.
pub trait TickListener {
	/// Called with the position of every node, in dataset order.
	fn on_tick(&mut self, positions: &[Position]);
}

/// An iterative 2-D layout over a loaded dataset.
pub trait LayoutEngine {
	/// Replace the simulated graph. Nodes with a position start there; the
	/// rest are seeded by the engine. Loading restarts a stopped engine.
	fn load(&mut self, dataset: &GraphDataset, size: CanvasSize);

	/// Advance by `dt` seconds and report the new positions. Does nothing
	/// while stopped.
	fn step(&mut self, dt: f32, listener: &mut dyn TickListener);

	/// Current position of every node, in dataset order.
	fn positions(&self) -> Vec<Position>;

	/// Move one node. Out-of-range indices are ignored.
	fn set_position(&mut self, node: usize, position: Position);

	/// Fixed nodes are excluded from the simulation's motion.
	fn set_fixed(&mut self, node: usize, fixed: bool);

	/// Suspend stepping until [`LayoutEngine::resume`].
	fn stop(&mut self);

	/// Continue stepping after [`LayoutEngine::stop`].
	fn resume(&mut self);

	/// Whether [`LayoutEngine::step`] currently advances the layout.
	fn is_running(&self) -> bool;
}

/// Force simulation tuning.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
	/// Repulsion between every pair of nodes.
	pub charge: f32,
	/// Spring strength along links.
	pub spring: f32,
	/// Upper bound on the force applied to a node per step.
	pub max_force: f32,
	/// Scale from accumulated force to velocity.
	pub node_speed: f32,
	/// Velocity kept from one step to the next.
	pub damping: f32,
	/// Mass of every node; scales repulsion.
	pub node_mass: f32,
	/// Radius of the circle unpositioned nodes are seeded on.
	pub seed_radius: f64,
	/// Pull of free nodes toward the canvas centre, as the fraction of their
	/// offset closed per second.
	pub gravity: f64,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		Self {
			charge: 200.0,
			spring: 0.05,
			max_force: 100.0,
			node_speed: 3000.0,
			damping: 0.9,
			node_mass: 10.0,
			seed_radius: 100.0,
			gravity: 1.0,
		}
	}
}

impl SimulationConfig {
	fn parameters(&self) -> SimulationParameters {
		SimulationParameters {
			force_charge: self.charge,
			force_spring: self.spring,
			force_max: self.max_force,
			node_speed: self.node_speed,
			damping_factor: self.damping,
		}
	}
}

/// [`LayoutEngine`] backed by the `force_graph` simulation.
///
/// Each simulated node carries its dataset index as user data.
pub struct ForceLayout {
	config: SimulationConfig,
	graph: ForceGraph<usize, ()>,
	indices: Vec<DefaultNodeIdx>,
	bounds: CanvasSize,
	running: bool,
}

impl ForceLayout {
	/// Empty layout with the given tuning.
	pub fn new(config: SimulationConfig) -> Self {
		let graph = ForceGraph::new(config.parameters());
		Self {
			config,
			graph,
			indices: Vec::new(),
			bounds: CanvasSize::new(0.0, 0.0),
			running: false,
		}
	}

	fn visit_node_mut(&mut self, node: usize, mut f: impl FnMut(&mut NodeData<usize>)) {
		let Some(&idx) = self.indices.get(node) else {
			return;
		};
		self.graph.visit_nodes_mut(|n| {
			if n.index() == idx {
				f(&mut n.data);
			}
		});
	}

	/// Move free nodes toward the canvas centre and keep them on the canvas.
	fn pull_to_center(&mut self, dt: f32) {
		let bounds = self.bounds;
		let center = bounds.center();
		let pull = (self.config.gravity * dt as f64).clamp(0.0, 1.0);
		let clamp = bounds.width > 0.0 && bounds.height > 0.0;
		self.graph.visit_nodes_mut(|node| {
			if node.data.is_anchor {
				return;
			}
			let (mut x, mut y) = (node.data.x as f64, node.data.y as f64);
			x += (center.x - x) * pull;
			y += (center.y - y) * pull;
			if clamp {
				x = x.clamp(0.0, bounds.width);
				y = y.clamp(0.0, bounds.height);
			}
			node.data.x = x as f32;
			node.data.y = y as f32;
		});
	}
}

impl Default for ForceLayout {
	fn default() -> Self {
		Self::new(SimulationConfig::default())
	}
}

impl LayoutEngine for ForceLayout {
	fn load(&mut self, dataset: &GraphDataset, size: CanvasSize) {
		let mut graph = ForceGraph::new(self.config.parameters());
		let center = size.center();
		let count = dataset.nodes().len().max(1) as f64;
		let mut taken: Vec<Position> = Vec::with_capacity(dataset.nodes().len());

		let indices: Vec<DefaultNodeIdx> = dataset
			.nodes()
			.iter()
			.enumerate()
			.map(|(i, node)| {
				let seed = || {
					let angle = (i as f64) * 2.0 * PI / count;
					center.offset(
						self.config.seed_radius * angle.cos(),
						self.config.seed_radius * angle.sin(),
					)
				};
				// free nodes stacked on an occupied spot feel no force from
				// each other and would never separate
				let position = match node.position {
					Some(p) if node.fixed || !taken.contains(&p) => p,
					_ => seed(),
				};
				taken.push(position);
				graph.add_node(NodeData {
					x: position.x as f32,
					y: position.y as f32,
					mass: self.config.node_mass,
					is_anchor: node.fixed,
					user_data: i,
				})
			})
			.collect();

		// self-loops are drawn but not simulated
		for link in dataset.links().iter().filter(|l| l.source != l.target) {
			graph.add_edge(indices[link.source], indices[link.target], EdgeData::default());
		}

		self.graph = graph;
		self.indices = indices;
		self.bounds = size;
		self.running = true;
	}

	fn step(&mut self, dt: f32, listener: &mut dyn TickListener) {
		if !self.running || self.indices.is_empty() {
			return;
		}
		self.graph.update(dt);
		self.pull_to_center(dt);
		listener.on_tick(&self.positions());
	}

	fn positions(&self) -> Vec<Position> {
		let mut positions = vec![Position::default(); self.indices.len()];
		self.graph.visit_nodes(|node| {
			if let Some(slot) = positions.get_mut(node.data.user_data) {
				*slot = Position::new(node.x() as f64, node.y() as f64);
			}
		});
		positions
	}

	fn set_position(&mut self, node: usize, position: Position) {
		self.visit_node_mut(node, |data| {
			data.x = position.x as f32;
			data.y = position.y as f32;
		});
	}

	fn set_fixed(&mut self, node: usize, fixed: bool) {
		self.visit_node_mut(node, |data| data.is_anchor = fixed);
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

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::types::{Link, Node};

	#[derive(Default)]
	struct Counter {
		ticks: usize,
		last: Vec<Position>,
	}

	impl TickListener for Counter {
		fn on_tick(&mut self, positions: &[Position]) {
			self.ticks += 1;
			self.last = positions.to_vec();
		}
	}

	fn triangle() -> GraphDataset {
		GraphDataset::new(
			vec![Node::new("a"), Node::new("b").at(50.0, 60.0).pinned(), Node::new("c")],
			vec![Link::new(0, 1), Link::new(1, 2), Link::new(2, 0)],
		)
		.unwrap()
	}

	#[test]
	fn seeds_unplaced_nodes_and_keeps_placed_ones() {
		let mut layout = ForceLayout::default();
		layout.load(&triangle(), CanvasSize::new(720.0, 680.0));

		let positions = layout.positions();
		assert_eq!(positions.len(), 3);
		assert_eq!(positions[1], Position::new(50.0, 60.0));
		// first node sits on the seed circle at angle 0
		assert_eq!(positions[0], Position::new(460.0, 340.0));
		assert!(layout.is_running());
	}

	#[test]
	fn step_reports_positions_and_keeps_anchors_still() {
		let mut layout = ForceLayout::default();
		layout.load(&triangle(), CanvasSize::new(720.0, 680.0));

		let mut counter = Counter::default();
		for _ in 0..5 {
			layout.step(0.016, &mut counter);
		}
		assert_eq!(counter.ticks, 5);
		assert_eq!(counter.last.len(), 3);
		assert_eq!(counter.last[1], Position::new(50.0, 60.0));
	}

	#[test]
	fn stopped_engine_does_not_tick() {
		let mut layout = ForceLayout::default();
		layout.load(&triangle(), CanvasSize::new(400.0, 400.0));
		layout.stop();

		let mut counter = Counter::default();
		layout.step(0.016, &mut counter);
		assert_eq!(counter.ticks, 0);

		layout.resume();
		layout.step(0.016, &mut counter);
		assert_eq!(counter.ticks, 1);
	}

	#[test]
	fn set_position_moves_only_that_node() {
		let mut layout = ForceLayout::default();
		layout.load(&triangle(), CanvasSize::new(400.0, 400.0));
		let before = layout.positions();

		layout.set_position(2, Position::new(1.0, 2.0));
		let after = layout.positions();
		assert_eq!(after[2], Position::new(1.0, 2.0));
		assert_eq!(after[0], before[0]);
		assert_eq!(after[1], before[1]);
	}

	const SERVICE_CHAIN: &str = r#"{
		"nodes": [
			{"caption": "probe", "x": 10, "y": 0, "fixed": true},
			{"caption": "hop-1", "x": 0, "y": 0, "fixed": false},
			{"caption": "hop-2", "x": 0, "y": 0, "fixed": false},
			{"caption": "hop-3", "x": 0, "y": 0, "fixed": false},
			{"caption": "hop-4", "x": 0, "y": 0, "fixed": false},
			{"caption": "target", "x": 800, "y": 0, "fixed": true}
		],
		"links": [
			{"source": 0, "target": 1, "mode": "normal", "probe": 1},
			{"source": 1, "target": 2, "mode": "normal", "probe": 1},
			{"source": 2, "target": 3, "mode": "normal", "probe": 1},
			{"source": 3, "target": 4, "mode": "normal", "probe": 1},
			{"source": 4, "target": 5, "mode": "missing", "probe": 1}
		]
	}"#;

	#[test]
	fn self_loop_is_drawn_but_not_simulated() {
		// a traceroute repeating a hop links it to itself
		let data = GraphDataset::from_json(
			r#"{
				"nodes": [{"caption": "a"}, {"caption": "b"}],
				"links": [{"source": 0, "target": 1}, {"source": 1, "target": 1}]
			}"#,
		)
		.unwrap();
		assert_eq!(data.links().len(), 2);

		let mut layout = ForceLayout::default();
		layout.load(&data, CanvasSize::new(720.0, 680.0));
		let mut counter = Counter::default();
		for _ in 0..10 {
			layout.step(0.016, &mut counter);
		}
		assert_eq!(counter.ticks, 10);
		assert!(counter.last.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
	}

	#[test]
	fn free_nodes_of_service_chain_stay_on_canvas() {
		let data = GraphDataset::from_json(SERVICE_CHAIN).unwrap();
		let size = CanvasSize::new(720.0, 680.0);
		let mut layout = ForceLayout::default();
		layout.load(&data, size);

		let mut counter = Counter::default();
		for _ in 0..3000 {
			layout.step(0.016, &mut counter);
		}
		let positions = layout.positions();
		for hop in &positions[1..5] {
			assert!((0.0..=size.width).contains(&hop.x), "{hop:?}");
			assert!((0.0..=size.height).contains(&hop.y), "{hop:?}");
		}
		assert_eq!(positions[0], Position::new(10.0, 0.0));
		assert_eq!(positions[5], Position::new(800.0, 0.0));
	}

	#[test]
	fn stacked_free_nodes_are_spread_on_load() {
		let data = GraphDataset::from_json(SERVICE_CHAIN).unwrap();
		let mut layout = ForceLayout::default();
		layout.load(&data, CanvasSize::new(720.0, 680.0));

		let hops = &layout.positions()[1..5];
		assert_eq!(hops[0], Position::new(0.0, 0.0));
		for (i, a) in hops.iter().enumerate() {
			for b in &hops[i + 1..] {
				assert_ne!(a, b);
			}
		}
	}

	#[test]
	fn gravity_pulls_free_nodes_toward_center() {
		let data = GraphDataset::new(vec![Node::new("a").at(0.0, 0.0)], vec![]).unwrap();
		let size = CanvasSize::new(400.0, 400.0);
		let mut layout = ForceLayout::default();
		layout.load(&data, size);

		let before = layout.positions()[0].distance(size.center());
		layout.step(0.016, &mut Counter::default());
		let after = layout.positions()[0].distance(size.center());
		assert!(after < before);
	}

	#[test]
	fn out_of_range_node_is_ignored() {
		let mut layout = ForceLayout::default();
		layout.load(&triangle(), CanvasSize::new(400.0, 400.0));
		let before = layout.positions();
		layout.set_position(9, Position::new(1.0, 2.0));
		layout.set_fixed(9, true);
		assert_eq!(layout.positions(), before);
	}
}
