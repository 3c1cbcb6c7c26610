//! UI components for the pathspider views.

pub mod element;
pub mod force_graph;
pub mod geometry;
pub mod pie_chart;
