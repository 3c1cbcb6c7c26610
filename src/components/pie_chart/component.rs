//! Leptos component wrapping the state donut chart.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, error};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::components::geometry::CanvasSize;

use super::layout::PieView;
use super::render;

/// Renders a donut chart of `data` (category, count) pairs.
///
/// The chart is redrawn whenever `data` changes. The canvas is re-measured
/// against its parent on every redraw; explicit `width`/`height` override
/// the measurement.
#[component]
pub fn PieChart(
	#[prop(into)] data: Signal<Vec<(String, f64)>>,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let pie = Rc::new(RefCell::new(PieView::default()));

	Effect::new(move |_| {
		let data = data.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas;
		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			error!("pie: canvas has no 2d context");
			return;
		};

		let parent = canvas.parent_element();
		let size = CanvasSize::new(
			width.unwrap_or_else(|| parent.as_ref().map_or(0.0, |p| p.client_width() as f64)),
			height.unwrap_or_else(|| parent.as_ref().map_or(0.0, |p| p.client_height() as f64)),
		);
		canvas.set_width(size.width as u32);
		canvas.set_height(size.height as u32);

		let mut pie = pie.borrow_mut();
		let stats = pie.render(size, &data);
		debug!(
			"pie: {} slices ({} new, {} kept, {} removed)",
			pie.slices().len(),
			stats.entered,
			stats.updated,
			stats.exited
		);
		render::render(&pie, size, &ctx);
	});

	view! { <canvas node_ref=canvas_ref class="state-pie-chart" style="display: block;" /> }
}
