//! Donut chart of measurement outcomes per path state.
//!
//! Each category gets a fixed color from the state taxonomy; slices are
//! keyed by category across redraws.

mod component;
mod layout;
mod palette;
mod render;

pub use component::PieChart;
pub use layout::{DonutGeometry, PieView, Slice, pie_angles};
pub use palette::{ProbeState, UNRECOGNIZED_COLOR, UnknownState, state_color};
