//! Runtime configuration for the views.
//!
//! Defaults live here; a page can override any subset of fields with a JSON
//! `<script id="view-config">` element (see [`crate::load_config`]).

use serde::Deserialize;

use crate::components::force_graph::{CanvasSize, PinPolicy, SimulationConfig};

/// Settings shared by the graph and chart components.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
	/// Base URL of the pathspider command service.
	pub endpoint: String,
	/// Canvas size used when the container cannot be measured.
	pub fallback_width: f64,
	/// Height used with `fallback_width`.
	pub fallback_height: f64,
	/// Simulation time step per animation frame, in seconds.
	pub frame_dt: f32,
	/// Whether dragged nodes stay pinned.
	pub pin_policy: PinPolicy,
	/// Pointer distance within which a node counts as hit.
	pub hit_radius: f64,
	/// Pointer distance within which a link counts as hit.
	pub link_tolerance: f64,
	/// Force simulation tuning.
	pub simulation: SimulationConfig,
}

impl Default for ViewConfig {
	fn default() -> Self {
		Self {
			endpoint: "http://localhost:37100".into(),
			fallback_width: 720.0,
			fallback_height: 680.0,
			frame_dt: 0.016,
			pin_policy: PinPolicy::default(),
			hit_radius: 8.0,
			link_tolerance: 4.0,
			simulation: SimulationConfig::default(),
		}
	}
}

impl ViewConfig {
	/// Parse overrides; absent fields keep their defaults.
	pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(text)
	}

	/// Canvas size used when the container cannot be measured.
	pub fn fallback_size(&self) -> CanvasSize {
		CanvasSize::new(self.fallback_width, self.fallback_height)
	}
}
