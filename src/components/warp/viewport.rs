//! Viewport geometry and perspective projection.
//!
//! # Coordinate Spaces
//!
//! - **Field-space**: particle `x`/`y` are signed offsets from the viewport
//!   center, `z` is depth along the view axis.
//! - **Screen-space**: CSS pixel coordinates on the drawing surface. The
//!   backing store may be larger by [`Viewport::pixel_ratio`], but all drawing
//!   happens in CSS pixels.

/// A projected point in screen-space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
	/// Horizontal CSS pixels from the left edge.
	pub x: f64,
	/// Vertical CSS pixels from the top edge.
	pub y: f64,
}

impl Point {
	/// Point at `(x, y)`.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

/// Size, center, and pixel density of the drawing surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	/// Width in CSS pixels.
	pub width: f64,
	/// Height in CSS pixels.
	pub height: f64,
	/// Horizontal center, the projection origin.
	pub center_x: f64,
	/// Vertical center, the projection origin.
	pub center_y: f64,
	/// Device pixel ratio (1.0 on standard displays, 2.0+ on HiDPI).
	pub pixel_ratio: f64,
}

impl Viewport {
	/// Builds a viewport from CSS pixel dimensions. Negative or non-finite
	/// sizes collapse to zero; the pixel ratio is floored at 1.
	pub fn new(width: f64, height: f64, pixel_ratio: f64) -> Self {
		let sanitize = |v: f64| if v.is_finite() { v.max(0.0) } else { 0.0 };
		let (width, height) = (sanitize(width), sanitize(height));
		let pixel_ratio = if pixel_ratio.is_finite() {
			pixel_ratio.max(1.0)
		} else {
			1.0
		};
		Self {
			width,
			height,
			center_x: width / 2.0,
			center_y: height / 2.0,
			pixel_ratio,
		}
	}

	/// Area in CSS px².
	pub fn area(&self) -> f64 {
		self.width * self.height
	}

	/// The larger of width and height.
	pub fn longest_side(&self) -> f64 {
		self.width.max(self.height)
	}

	/// Backing store size in device pixels.
	pub fn backing_size(&self) -> (u32, u32) {
		(
			(self.width * self.pixel_ratio).round() as u32,
			(self.height * self.pixel_ratio).round() as u32,
		)
	}

	/// Perspective projection of a field-space point onto the screen.
	///
	/// `z` must be positive; callers keep it at or above 1.
	pub fn project(&self, x: f64, y: f64, z: f64, projection: f64) -> Point {
		let k = projection / z;
		Point::new(self.center_x + x * k, self.center_y + y * k)
	}

	/// Whether `p` lies inside the viewport grown by `margin` on every side.
	pub fn contains_with_margin(&self, p: Point, margin: f64) -> bool {
		p.x >= -margin
			&& p.x <= self.width + margin
			&& p.y >= -margin
			&& p.y <= self.height + margin
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn center_is_half_the_size() {
		let vp = Viewport::new(800.0, 600.0, 2.0);
		assert_eq!((vp.center_x, vp.center_y), (400.0, 300.0));
		assert_eq!(vp.backing_size(), (1600, 1200));
	}

	#[test]
	fn degenerate_inputs_are_sanitized() {
		let vp = Viewport::new(-10.0, f64::NAN, 0.5);
		assert_eq!(vp.area(), 0.0);
		assert_eq!(vp.pixel_ratio, 1.0);
	}

	#[test]
	fn projection_scales_with_inverse_depth() {
		let vp = Viewport::new(800.0, 600.0, 1.0);
		let near = vp.project(10.0, -10.0, 100.0, 200.0);
		let far = vp.project(10.0, -10.0, 400.0, 200.0);
		assert_eq!(near, Point::new(420.0, 280.0));
		assert_eq!(far, Point::new(405.0, 295.0));
	}

	#[test]
	fn margin_expands_bounds() {
		let vp = Viewport::new(100.0, 100.0, 1.0);
		assert!(vp.contains_with_margin(Point::new(-20.0, 50.0), 30.0));
		assert!(!vp.contains_with_margin(Point::new(-20.0, 50.0), 10.0));
		assert!(!vp.contains_with_margin(Point::new(50.0, 131.0), 30.0));
	}
}
