//! Visual theming for the graph view.

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red.
	pub r: u8,
	/// Green.
	pub g: u8,
	/// Blue.
	pub b: u8,
	/// Opacity, 0.0 to 1.0.
	pub a: f64,
}

impl Color {
	/// Opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Color with opacity.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Same color with opacity `a`.
	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// CSS color string, hex when opaque.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Stroke colors for links, one per probe.
#[derive(Clone, Debug)]
pub struct ProbePalette {
	/// Palette, indexed by probe hash.
	pub colors: Vec<Color>,
}

impl ProbePalette {
	/// Ten well-separated hues.
	pub fn category10() -> Self {
		Self {
			colors: vec![
				Color::rgb(31, 119, 180),
				Color::rgb(255, 127, 14),
				Color::rgb(44, 160, 44),
				Color::rgb(214, 39, 40),
				Color::rgb(148, 103, 189),
				Color::rgb(140, 86, 75),
				Color::rgb(227, 119, 194),
				Color::rgb(127, 127, 127),
				Color::rgb(188, 189, 34),
				Color::rgb(23, 190, 207),
			],
		}
	}

	/// Stable color for a probe name. The same name always maps to the same
	/// color, independent of the order probes appear in.
	pub fn for_probe(&self, probe: &str) -> Color {
		// FNV-1a
		let hash = probe.bytes().fold(0xcbf2_9ce4_8422_2325_u64, |h, b| {
			(h ^ b as u64).wrapping_mul(0x0100_0000_01b3)
		});
		match self.colors.len() {
			0 => Color::rgb(127, 127, 127),
			n => self.colors[(hash % n as u64) as usize],
		}
	}
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	/// Canvas fill.
	pub background: Color,
	/// Fill of node circles.
	pub node: Color,
	/// Outline drawn around fixed nodes.
	pub fixed_ring: Color,
	/// Node label text color.
	pub label: Color,
	/// Canvas font for node labels.
	pub label_font: &'static str,
	/// Stroke for normal links without a probe class.
	pub edge: Color,
	/// Stroke width of normal links.
	pub edge_width: f64,
	/// Highlight for the element under the pointer.
	pub hover: Color,
	/// Tooltip box fill.
	pub tooltip_background: Color,
	/// Tooltip text color.
	pub tooltip_text: Color,
	/// Canvas font for tooltips.
	pub tooltip_font: &'static str,
	/// Link colors for `probe_<name>` classes.
	pub probes: ProbePalette,
}

impl Default for Theme {
	fn default() -> Self {
		Self {
			background: Color::rgb(255, 255, 255),
			node: Color::rgb(51, 51, 51),
			fixed_ring: Color::rgb(214, 39, 40),
			label: Color::rgb(34, 34, 34),
			label_font: "11px sans-serif",
			edge: Color::rgba(120, 120, 120, 0.8),
			edge_width: 1.5,
			hover: Color::rgba(255, 200, 0, 0.9),
			tooltip_background: Color::rgba(30, 30, 30, 0.9),
			tooltip_text: Color::rgb(245, 245, 245),
			tooltip_font: "12px sans-serif",
			probes: ProbePalette::category10(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn css_output() {
		assert_eq!(Color::rgb(0, 222, 65).to_css(), "#00de41");
		assert_eq!(Color::rgb(1, 2, 3).with_alpha(0.5).to_css(), "rgba(1, 2, 3, 0.5)");
	}

	#[test]
	fn probe_colors_are_stable() {
		let palette = ProbePalette::category10();
		assert_eq!(palette.for_probe("zrh"), palette.for_probe("zrh"));
		assert!(palette.colors.contains(&palette.for_probe("ams")));
	}
}
