//! Force-directed graph of measured paths.
//!
//! Fetches a node/link dataset for a set of target addresses and renders it
//! on an HTML canvas with:
//! - Physics-based node positioning via force simulation
//! - Node dragging, with pinning on release and unpinning on double-click
//! - Dashed red links for hops missing from a trace
//! - Tooltips for node and link captions
//!
//! # Example
//!
//! ```ignore
//! use pathspider_view::ForceGraphCanvas;
//!
//! let (ids, set_ids) = signal(vec!["192.0.2.1".to_string()]);
//! view! { <ForceGraphCanvas ids=ids /> }
//! ```

mod component;
mod fetch;
mod layout;
mod render;
mod scene;
pub mod theme;
mod types;
mod view;

pub use component::ForceGraphCanvas;
pub use fetch::{DataSource, GRAPH_PATH, HttpDataSource, encode_key_values, graph_url};
pub use layout::{ForceLayout, LayoutEngine, SimulationConfig, TickListener};
pub use scene::{Hit, LinkElement, LinkKey, LinkStyle, NodeElement, Scene};
pub use theme::Theme;
pub use types::{
	CanvasSize, EndpointRef, GraphDataset, Link, LinkMode, Node, Position, ProbeRef, WireDataset,
	WireLink, WireNode,
};
pub use view::{GraphView, LoadOutcome, PinPolicy, RequestToken, load};
