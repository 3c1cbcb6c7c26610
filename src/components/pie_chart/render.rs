//! Canvas painting of donut slices.

use std::f64::consts::FRAC_PI_2;

use web_sys::CanvasRenderingContext2d;

use crate::components::geometry::CanvasSize;

use super::layout::PieView;

/// Clears the canvas and fills every slice with its state color.
pub fn render(pie: &PieView, size: CanvasSize, ctx: &CanvasRenderingContext2d) {
	ctx.clear_rect(0.0, 0.0, size.width, size.height);

	let g = pie.geometry();
	let (cx, cy) = (g.center.x, g.center.y);
	for slice in pie.slices() {
		if slice.span() <= 0.0 {
			continue;
		}
		// canvas angles start at 3 o'clock
		let (start, end) = (slice.start_angle - FRAC_PI_2, slice.end_angle - FRAC_PI_2);

		ctx.begin_path();
		let _ = ctx.arc(cx, cy, g.outer_radius, start, end);
		let _ = ctx.arc_with_anticlockwise(cx, cy, g.inner_radius, end, start, true);
		ctx.close_path();
		ctx.set_fill_style_str(slice.color);
		ctx.fill();
	}
}
