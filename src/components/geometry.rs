//! Canvas-space geometry shared by the views.

/// A point in canvas coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
	/// Initial horizontal position.
	pub x: f64,
	/// Initial vertical position.
	pub y: f64,
}

impl Position {
	/// Construct from parts.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// This point moved by `(dx, dy)`.
	pub fn offset(self, dx: f64, dy: f64) -> Self {
		Self {
			x: self.x + dx,
			y: self.y + dy,
		}
	}

	/// Euclidean distance to `other`.
	pub fn distance(self, other: Position) -> f64 {
		((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
	}
}

/// Canvas dimensions in pixels, measured from the render target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasSize {
	/// Width in pixels.
	pub width: f64,
	/// Height in pixels.
	pub height: f64,
}

impl CanvasSize {
	/// Construct from parts.
	pub const fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}

	/// Centre point.
	pub fn center(self) -> Position {
		Position::new(self.width / 2.0, self.height / 2.0)
	}
}
