//! Frame rendering for the warp effect.
//!
//! Each frame is drawn in three passes:
//! 1. Translucent black fill over the previous frame (motion-blur trail)
//! 2. Radial glow at the viewport center
//! 3. One line segment per star, from last frame's position to this one's
//!
//! Drawing goes through the [`Surface`] capability so the frame logic does not
//! depend on any particular backend. [`CanvasRenderingContext2d`] implements it
//! for the browser.

use web_sys::CanvasRenderingContext2d;

use super::particles::ParticleField;
use super::theme::{Color, WarpStyle};
use super::viewport::{Point, Viewport};

/// The 2D primitives the renderer needs. All coordinates are CSS pixels.
pub trait Surface {
	/// Fill an axis-aligned rectangle with a solid color.
	fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color);

	/// Fill the whole surface with a radial gradient from `inner` at the center
	/// to `outer` at `radius`.
	fn fill_radial(&mut self, viewport: &Viewport, center: Point, radius: f64, inner: Color, outer: Color);

	/// Stroke a straight segment.
	fn stroke_line(&mut self, from: Point, to: Point, width: f64, color: Color);

	/// Reset every pixel to transparent.
	fn clear(&mut self, viewport: &Viewport);
}

/// Draws one frame of the effect for the given eased progress (0.0 to 1.0).
pub fn draw_frame<S: Surface + ?Sized>(
	surface: &mut S,
	field: &ParticleField,
	eased: f64,
	style: &WarpStyle,
) {
	let viewport = field.viewport();
	let eased = eased.clamp(0.0, 1.0);

	draw_trail(surface, viewport, eased, style);
	draw_glow(surface, viewport, eased, style);
	draw_streaks(surface, field, eased, style);
}

fn draw_trail<S: Surface + ?Sized>(surface: &mut S, viewport: &Viewport, eased: f64, style: &WarpStyle) {
	let alpha = style.trail.base + eased * style.trail.ramp;
	surface.fill_rect(
		0.0,
		0.0,
		viewport.width,
		viewport.height,
		Color::rgb(0, 0, 0).with_alpha(alpha),
	);
}

fn draw_glow<S: Surface + ?Sized>(surface: &mut S, viewport: &Viewport, eased: f64, style: &WarpStyle) {
	let glow = &style.glow;
	let alpha = glow.base_alpha + eased * glow.alpha_ramp;
	if alpha < 0.005 {
		return;
	}
	let radius = viewport.longest_side() * glow.radius;
	if radius <= 0.0 {
		return;
	}
	surface.fill_radial(
		viewport,
		Point::new(viewport.center_x, viewport.center_y),
		radius,
		glow.color.with_alpha(alpha),
		glow.color.with_alpha(0.0),
	);
}

fn draw_streaks<S: Surface + ?Sized>(surface: &mut S, field: &ParticleField, eased: f64, style: &WarpStyle) {
	let streak = &style.streak;
	let depth_max = field.depth_max().max(1.0);

	for p in field.particles() {
		let Some((from, to)) = p.streak() else {
			continue;
		};

		// 0.0 at the far plane, 1.0 right at the viewer.
		let nearness = (1.0 - p.z / depth_max).clamp(0.0, 1.0);
		let alpha = nearness * (streak.base_alpha + eased * streak.alpha_ramp);
		if alpha < 0.01 {
			continue;
		}
		let width = streak.min_width + nearness * streak.width_range;
		let tone = streak.from.lerp(streak.to, 0.7 * eased + 0.3 * nearness);

		surface.stroke_line(from, to, width, tone.with_alpha(alpha));
	}
}

impl Surface for CanvasRenderingContext2d {
	fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color) {
		self.set_fill_style_str(&color.to_css());
		CanvasRenderingContext2d::fill_rect(self, x, y, w, h);
	}

	fn fill_radial(&mut self, viewport: &Viewport, center: Point, radius: f64, inner: Color, outer: Color) {
		let Ok(gradient) = self.create_radial_gradient(center.x, center.y, 0.0, center.x, center.y, radius)
		else {
			return;
		};
		if gradient.add_color_stop(0.0, &inner.to_css()).is_err()
			|| gradient.add_color_stop(1.0, &outer.to_css()).is_err()
		{
			return;
		}

		#[allow(deprecated)]
		self.set_fill_style(&gradient);
		CanvasRenderingContext2d::fill_rect(self, 0.0, 0.0, viewport.width, viewport.height);
	}

	fn stroke_line(&mut self, from: Point, to: Point, width: f64, color: Color) {
		self.set_stroke_style_str(&color.to_css());
		self.set_line_width(width);
		self.begin_path();
		self.move_to(from.x, from.y);
		self.line_to(to.x, to.y);
		self.stroke();
	}

	fn clear(&mut self, viewport: &Viewport) {
		self.clear_rect(0.0, 0.0, viewport.width, viewport.height);
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use rand::SeedableRng;
	use rand::rngs::SmallRng;

	use super::*;

	/// A drawing call captured by [`RecordingSurface`].
	#[derive(Clone, Debug, PartialEq)]
	pub(crate) enum Op {
		Fill(Color),
		Radial { radius: f64, inner: Color },
		Line { width: f64, color: Color },
		Clear,
	}

	/// Records drawing calls instead of rasterizing them.
	#[derive(Default)]
	pub(crate) struct RecordingSurface {
		pub ops: Vec<Op>,
	}

	impl Surface for RecordingSurface {
		fn fill_rect(&mut self, _x: f64, _y: f64, _w: f64, _h: f64, color: Color) {
			self.ops.push(Op::Fill(color));
		}

		fn fill_radial(&mut self, _vp: &Viewport, _c: Point, radius: f64, inner: Color, _outer: Color) {
			self.ops.push(Op::Radial { radius, inner });
		}

		fn stroke_line(&mut self, _from: Point, _to: Point, width: f64, color: Color) {
			self.ops.push(Op::Line { width, color });
		}

		fn clear(&mut self, _vp: &Viewport) {
			self.ops.push(Op::Clear);
		}
	}

	fn warmed_field(style: &WarpStyle) -> ParticleField {
		let mut field = ParticleField::initialize(
			Viewport::new(800.0, 600.0, 1.0),
			&style.field,
			SmallRng::seed_from_u64(9),
		);
		field.advance(2.0);
		field.advance(2.0);
		field
	}

	fn lines(ops: &[Op]) -> Vec<(f64, Color)> {
		ops.iter()
			.filter_map(|op| match op {
				Op::Line { width, color } => Some((*width, *color)),
				_ => None,
			})
			.collect()
	}

	#[test]
	fn trail_then_glow_then_streaks() {
		let style = WarpStyle::warp();
		let field = warmed_field(&style);
		let mut surface = RecordingSurface::default();
		draw_frame(&mut surface, &field, 0.5, &style);

		assert!(matches!(surface.ops[0], Op::Fill(_)));
		assert!(matches!(surface.ops[1], Op::Radial { .. }));
		assert!(!lines(&surface.ops).is_empty());
	}

	#[test]
	fn trail_and_glow_intensify_with_progress() {
		let style = WarpStyle::warp();
		let field = warmed_field(&style);
		let (mut early, mut late) = (RecordingSurface::default(), RecordingSurface::default());
		draw_frame(&mut early, &field, 0.0, &style);
		draw_frame(&mut late, &field, 1.0, &style);

		let (Op::Fill(a0), Op::Fill(a1)) = (&early.ops[0], &late.ops[0]) else {
			panic!("first op must be the trail fill");
		};
		assert!((a0.a - style.trail.base).abs() < 1e-9);
		assert!((a1.a - (style.trail.base + style.trail.ramp)).abs() < 1e-9);

		let (Op::Radial { inner: g0, .. }, Op::Radial { inner: g1, radius }) = (&early.ops[1], &late.ops[1])
		else {
			panic!("second op must be the glow");
		};
		assert!(g1.a > g0.a);
		assert_eq!(*radius, 800.0 * style.glow.radius);
	}

	#[test]
	fn nearer_stars_draw_thicker_and_brighter() {
		let style = WarpStyle::warp();
		let mut field = ParticleField::initialize(
			Viewport::new(800.0, 600.0, 1.0),
			&style.field,
			SmallRng::seed_from_u64(4),
		);
		field.advance(1.0);
		field.advance(1.0);

		let mut surface = RecordingSurface::default();
		draw_frame(&mut surface, &field, 0.5, &style);

		let depth_max = field.depth_max();
		let mut drawn: Vec<(f64, f64, f64)> = field
			.particles()
			.iter()
			.filter(|p| p.streak().is_some())
			.map(|p| {
				let nearness = 1.0 - p.z / depth_max;
				let alpha = nearness * (style.streak.base_alpha + 0.5 * style.streak.alpha_ramp);
				(p.z, style.streak.min_width + nearness * style.streak.width_range, alpha)
			})
			.filter(|(_, _, alpha)| *alpha >= 0.01)
			.collect();
		let recorded = lines(&surface.ops);
		assert_eq!(recorded.len(), drawn.len());

		drawn.sort_by(|a, b| a.0.total_cmp(&b.0));
		let (nearest, farthest) = (drawn[0], drawn[drawn.len() - 1]);
		assert!(nearest.1 >= farthest.1);
		assert!(nearest.2 >= farthest.2);
	}

	#[test]
	fn fresh_field_draws_no_streaks() {
		let style = WarpStyle::warp();
		let field = ParticleField::initialize(
			Viewport::new(800.0, 600.0, 1.0),
			&style.field,
			SmallRng::seed_from_u64(1),
		);
		let mut surface = RecordingSurface::default();
		draw_frame(&mut surface, &field, 0.3, &style);
		assert!(lines(&surface.ops).is_empty());
	}
}
