//! Donut layout and slice reconciliation for the state chart.
//!
//! Angles are in radians, measured clockwise from 12 o'clock, in input order.
//! Slices are keyed by category, so a category keeps its element when the
//! order of the input changes.

use std::collections::HashMap;
use std::f64::consts::TAU;

use log::warn;

use crate::components::element::{ElementId, ElementIds, Reconciliation};
use crate::components::geometry::{CanvasSize, Position};

use super::palette::state_color;

/// Inner radius as a fraction of the chart radius.
pub const INNER_RATIO: f64 = 0.4;
/// Outer radius as a fraction of the chart radius.
pub const OUTER_RATIO: f64 = 0.9;

/// Centre and radii shared by all slices.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DonutGeometry {
	/// Centre of the chart.
	pub center: Position,
	/// Radius of the hole.
	pub inner_radius: f64,
	/// Radius of the outer edge.
	pub outer_radius: f64,
}

impl DonutGeometry {
	/// Donut centred on a canvas of `size`.
	pub fn for_canvas(size: CanvasSize) -> Self {
		let radius = size.width.min(size.height).max(0.0) / 2.0;
		Self {
			center: size.center(),
			inner_radius: radius * INNER_RATIO,
			outer_radius: radius * OUTER_RATIO,
		}
	}
}

/// One drawn arc.
#[derive(Clone, Debug, PartialEq)]
pub struct Slice {
	/// Stable element identity.
	pub id: ElementId,
	/// State name; the slice's identity.
	pub category: String,
	/// Value after merging duplicates.
	pub value: f64,
	/// Radians clockwise from 12 o'clock.
	pub start_angle: f64,
	/// Radians clockwise from 12 o'clock.
	pub end_angle: f64,
	/// Fill color.
	pub color: &'static str,
}

impl Slice {
	/// Angular size in radians.
	pub fn span(&self) -> f64 {
		self.end_angle - self.start_angle
	}
}

/// Start and end angle for each value, proportional to its share of the
/// total. Negative and non-finite values count as zero.
pub fn pie_angles(values: &[f64]) -> Vec<(f64, f64)> {
	let clean = |v: f64| if v.is_finite() && v > 0.0 { v } else { 0.0 };
	let total: f64 = values.iter().copied().map(clean).sum();
	let k = if total > 0.0 { TAU / total } else { 0.0 };

	let mut angle = 0.0;
	values
		.iter()
		.map(|&v| {
			let start = angle;
			angle += clean(v) * k;
			(start, angle)
		})
		.collect()
}

/// Retained state of one donut chart.
#[derive(Clone, Debug, Default)]
pub struct PieView {
	geometry: DonutGeometry,
	slices: Vec<Slice>,
	ids: ElementIds,
}

impl PieView {
	/// Slices in input order.
	pub fn slices(&self) -> &[Slice] {
		&self.slices
	}

	/// Centre and radii of the last render.
	pub fn geometry(&self) -> DonutGeometry {
		self.geometry
	}

	/// Lay out `data` on a canvas of `size`. Repeated categories are summed
	/// into their first occurrence.
	pub fn render(&mut self, size: CanvasSize, data: &[(String, f64)]) -> Reconciliation {
		let mut merged: Vec<(&str, f64)> = Vec::with_capacity(data.len());
		let mut position: HashMap<&str, usize> = HashMap::new();
		for (category, value) in data {
			match position.get(category.as_str()) {
				Some(&i) => {
					warn!("pie: category `{category}` appears more than once, summing");
					merged[i].1 += value;
				}
				None => {
					position.insert(category.as_str(), merged.len());
					merged.push((category.as_str(), *value));
				}
			}
		}

		let mut previous: HashMap<String, ElementId> = self
			.slices
			.drain(..)
			.map(|s| (s.category, s.id))
			.collect();
		let mut stats = Reconciliation::default();
		let values: Vec<f64> = merged.iter().map(|&(_, v)| v).collect();

		self.geometry = DonutGeometry::for_canvas(size);
		self.slices = merged
			.iter()
			.zip(pie_angles(&values))
			.map(|(&(category, value), (start_angle, end_angle))| {
				let id = match previous.remove(category) {
					Some(id) => {
						stats.updated += 1;
						id
					}
					None => {
						stats.entered += 1;
						self.ids.fresh()
					}
				};
				Slice {
					id,
					category: category.to_string(),
					value,
					start_angle,
					end_angle,
					color: state_color(category),
				}
			})
			.collect();
		stats.exited = previous.len();
		stats
	}
}

#[cfg(test)]
mod tests {
	use std::f64::consts::PI;

	use super::*;
	use crate::components::pie_chart::palette::UNRECOGNIZED_COLOR;

	fn data(pairs: &[(&str, f64)]) -> Vec<(String, f64)> {
		pairs.iter().map(|&(c, v)| (c.to_string(), v)).collect()
	}

	fn close(a: f64, b: f64) -> bool {
		(a - b).abs() < 1e-9
	}

	#[test]
	fn two_states_three_to_one() {
		let mut pie = PieView::default();
		let stats = pie.render(
			CanvasSize::new(200.0, 100.0),
			&data(&[("safe", 3.0), ("broken_site", 1.0)]),
		);
		assert_eq!(stats.entered, 2);

		let slices = pie.slices();
		assert_eq!(slices.len(), 2);
		assert_eq!(slices[0].color, "#00de41");
		assert_eq!(slices[1].color, "#ff3c3c");
		assert!(close(slices[0].span(), 1.5 * PI));
		assert!(close(slices[1].span(), 0.5 * PI));
		assert!(close(slices[0].span() / slices[1].span(), 3.0));
		assert!(close(slices[1].end_angle, TAU));
	}

	#[test]
	fn geometry_uses_smaller_dimension() {
		let mut pie = PieView::default();
		pie.render(CanvasSize::new(200.0, 100.0), &data(&[("safe", 1.0)]));
		let g = pie.geometry();
		assert_eq!(g.center, Position::new(100.0, 50.0));
		assert!(close(g.inner_radius, 20.0));
		assert!(close(g.outer_radius, 45.0));
	}

	#[test]
	fn slices_keep_identity_when_order_changes() {
		let mut pie = PieView::default();
		pie.render(
			CanvasSize::new(100.0, 100.0),
			&data(&[("safe", 1.0), ("unknown", 1.0), ("broken_path", 1.0)]),
		);
		let safe = pie.slices()[0].id;
		let unknown = pie.slices()[1].id;

		let stats = pie.render(
			CanvasSize::new(100.0, 100.0),
			&data(&[("unknown", 2.0), ("safe", 1.0), ("broken_other", 1.0)]),
		);
		assert_eq!(stats, Reconciliation { entered: 1, updated: 2, exited: 1 });
		assert_eq!(pie.slices()[0].id, unknown);
		assert_eq!(pie.slices()[1].id, safe);
		assert_eq!(pie.slices()[0].color, "#d27bff");
	}

	#[test]
	fn zero_negative_and_nan_values_get_no_span() {
		let angles = pie_angles(&[0.0, -2.0, f64::NAN, 4.0]);
		assert_eq!(angles[0], (0.0, 0.0));
		assert_eq!(angles[1], (0.0, 0.0));
		assert_eq!(angles[2], (0.0, 0.0));
		assert!(close(angles[3].1, TAU));

		assert!(pie_angles(&[0.0, 0.0]).iter().all(|&(s, e)| s == 0.0 && e == 0.0));
	}

	#[test]
	fn duplicates_are_summed_and_unknown_categories_get_fallback() {
		let mut pie = PieView::default();
		pie.render(
			CanvasSize::new(100.0, 100.0),
			&data(&[("safe", 1.0), ("offline", 1.0), ("safe", 2.0)]),
		);
		assert_eq!(pie.slices().len(), 2);
		assert_eq!(pie.slices()[0].value, 3.0);
		assert_eq!(pie.slices()[1].color, UNRECOGNIZED_COLOR);
	}

	#[test]
	fn empty_data_removes_all_slices() {
		let mut pie = PieView::default();
		pie.render(CanvasSize::new(100.0, 100.0), &data(&[("safe", 1.0)]));
		let stats = pie.render(CanvasSize::new(100.0, 100.0), &[]);
		assert_eq!(stats.exited, 1);
		assert!(pie.slices().is_empty());
	}
}
