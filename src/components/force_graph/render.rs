//! Canvas painting of the graph scene.
//!
//! Passes, back to front: background, links, node groups (circle + label),
//! then the tooltip of the hovered element.

use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::scene::{Hit, LABEL_OFFSET, LinkElement, LinkStyle, NODE_RADIUS, Scene};
use super::theme::Theme;
use super::types::{CanvasSize, Position};

const TOOLTIP_PADDING: f64 = 6.0;
const TOOLTIP_HEIGHT: f64 = 22.0;

/// Renders the complete scene to the canvas.
pub fn render(
	scene: &Scene,
	size: CanvasSize,
	ctx: &CanvasRenderingContext2d,
	theme: &Theme,
	hover: Option<(Hit, Position)>,
) {
	ctx.set_fill_style_str(&theme.background.to_css());
	ctx.fill_rect(0.0, 0.0, size.width, size.height);

	let hovered = hover.map(|(hit, _)| hit);
	for (i, link) in scene.links().iter().enumerate() {
		draw_link(ctx, link, theme, hovered == Some(Hit::Link(i)));
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());

	for (i, node) in scene.nodes().iter().enumerate() {
		let (x, y) = (node.translate.x, node.translate.y);
		let radius = if hovered == Some(Hit::Node(i)) {
			NODE_RADIUS * 1.5
		} else {
			NODE_RADIUS
		};

		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&theme.node.to_css());
		ctx.fill();

		if node.fixed {
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius + 2.0, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(&theme.fixed_ring.to_css());
			ctx.set_line_width(1.0);
			ctx.stroke();
		}

		ctx.set_fill_style_str(&theme.label.to_css());
		ctx.set_font(theme.label_font);
		let _ = ctx.fill_text(&node.caption, x + LABEL_OFFSET, y + 3.0);
	}

	if let Some((hit, pointer)) = hover {
		if let Some(text) = scene.tooltip(hit) {
			draw_tooltip(ctx, size, theme, text, pointer);
		}
	}
}

fn draw_link(ctx: &CanvasRenderingContext2d, link: &LinkElement, theme: &Theme, hovered: bool) {
	match link.style {
		LinkStyle::Missing => {
			ctx.set_stroke_style_str(LinkStyle::MISSING_COLOR);
			ctx.set_line_width(LinkStyle::MISSING_WIDTH);
			let (dash, gap) = LinkStyle::MISSING_DASH;
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(dash),
				&JsValue::from_f64(gap),
			));
		}
		LinkStyle::Default => {
			let color = link
				.classes
				.iter()
				.find_map(|c| c.strip_prefix("probe_"))
				.map(|probe| theme.probes.for_probe(probe))
				.unwrap_or(theme.edge);
			ctx.set_stroke_style_str(&color.to_css());
			ctx.set_line_width(theme.edge_width);
			let _ = ctx.set_line_dash(&js_sys::Array::new());
		}
	}

	if hovered {
		ctx.set_stroke_style_str(&theme.hover.to_css());
	}

	ctx.begin_path();
	ctx.move_to(link.from.x, link.from.y);
	ctx.line_to(link.to.x, link.to.y);
	ctx.stroke();
}

fn draw_tooltip(
	ctx: &CanvasRenderingContext2d,
	size: CanvasSize,
	theme: &Theme,
	text: &str,
	pointer: Position,
) {
	ctx.set_font(theme.tooltip_font);
	let width = ctx
		.measure_text(text)
		.map(|m| m.width())
		.unwrap_or(text.len() as f64 * 7.0)
		+ 2.0 * TOOLTIP_PADDING;

	// keep the box inside the canvas
	let x = (pointer.x + 12.0).min(size.width - width).max(0.0);
	let y = (pointer.y + 12.0).min(size.height - TOOLTIP_HEIGHT).max(0.0);

	ctx.set_fill_style_str(&theme.tooltip_background.to_css());
	ctx.fill_rect(x, y, width, TOOLTIP_HEIGHT);
	ctx.set_fill_style_str(&theme.tooltip_text.to_css());
	let _ = ctx.fill_text(text, x + TOOLTIP_PADDING, y + TOOLTIP_HEIGHT - 7.0);
}
