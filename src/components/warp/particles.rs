//! Starfield particles flying toward the viewer.
//!
//! Particles are never added or removed after [`ParticleField::initialize`]:
//! one that passes the viewer (`z <= 1`) or leaves the expanded viewport is
//! respawned in place at a fresh far position. The per-frame cost therefore
//! stays constant for the whole run.

use rand::Rng;
use rand::rngs::SmallRng;

use super::theme::FieldStyle;
use super::viewport::{Point, Viewport};

/// A single star.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
	/// Signed offset from the viewport center, pre-projection.
	pub x: f64,
	/// Vertical counterpart of `x`.
	pub y: f64,
	/// Depth along the view axis, kept within `1..=depth_max`.
	pub z: f64,
	/// Screen position from the previous frame; `None` right after a respawn.
	pub last_projected: Option<Point>,
	/// Screen position for the current frame.
	pub projected: Option<Point>,
}

impl Particle {
	/// Returns the streak segment to draw this frame, if both ends are known.
	pub fn streak(&self) -> Option<(Point, Point)> {
		Some((self.last_projected?, self.projected?))
	}
}

/// Owns every particle of a single transition run.
pub struct ParticleField {
	particles: Vec<Particle>,
	viewport: Viewport,
	style: FieldStyle,
	rng: SmallRng,
}

impl ParticleField {
	/// Particle count for a viewport: `min(max_count, floor(area / divisor))`.
	pub fn count_for(viewport: &Viewport, style: &FieldStyle) -> usize {
		if style.density_divisor <= 0.0 {
			return 0;
		}
		let n = (viewport.area() / style.density_divisor).floor();
		if n.is_finite() && n > 0.0 {
			(n as usize).min(style.max_count)
		} else {
			0
		}
	}

	/// Populates a fresh field, every particle placed by the spawn rule.
	pub fn initialize(viewport: Viewport, style: &FieldStyle, mut rng: SmallRng) -> Self {
		let count = Self::count_for(&viewport, style);
		let particles = (0..count)
			.map(|_| Self::spawn(&viewport, style, &mut rng))
			.collect();

		Self {
			particles,
			viewport,
			style: style.clone(),
			rng,
		}
	}

	/// Uniform `x, y` in a square of half-width `longest_side * spread` and
	/// uniform `z` in `(1, depth_max]`.
	fn spawn(viewport: &Viewport, style: &FieldStyle, rng: &mut SmallRng) -> Particle {
		let half = viewport.longest_side() * style.spread;
		let (x, y) = if half > 0.0 {
			(rng.gen_range(-half..=half), rng.gen_range(-half..=half))
		} else {
			(0.0, 0.0)
		};
		let depth_max = style.depth_max.max(1.0);
		let z = if depth_max > 1.0 {
			// Subtracting from depth_max maps [0, span) onto (1, depth_max].
			depth_max - rng.gen_range(0.0..depth_max - 1.0)
		} else {
			depth_max
		};

		Particle {
			x,
			y,
			z,
			last_projected: None,
			projected: None,
		}
	}

	/// Moves every particle `speed` closer to the viewer and projects it.
	pub fn advance(&mut self, speed: f64) {
		let Self {
			particles,
			viewport,
			style,
			rng,
		} = self;

		for p in particles.iter_mut() {
			p.last_projected = p.projected;
			p.z -= speed;

			if p.z <= 1.0 {
				*p = Self::spawn(viewport, style, rng);
				continue;
			}

			let screen = viewport.project(p.x, p.y, p.z, style.projection);
			if viewport.contains_with_margin(screen, style.margin) {
				p.projected = Some(screen);
			} else {
				*p = Self::spawn(viewport, style, rng);
			}
		}
	}

	/// Applies new geometry; the particle count is left unchanged.
	pub fn set_viewport(&mut self, viewport: Viewport) {
		self.viewport = viewport;
		// Old projections belong to the previous center.
		for p in &mut self.particles {
			p.last_projected = None;
			p.projected = None;
		}
	}

	/// All particles, in spawn order.
	pub fn particles(&self) -> &[Particle] {
		&self.particles
	}

	/// Number of particles. Fixed for the field's lifetime.
	pub fn len(&self) -> usize {
		self.particles.len()
	}

	/// Whether the field has no particles (the `fade` look).
	pub fn is_empty(&self) -> bool {
		self.particles.is_empty()
	}

	/// Geometry the field projects into.
	pub fn viewport(&self) -> &Viewport {
		&self.viewport
	}

	/// Farthest spawn depth.
	pub fn depth_max(&self) -> f64 {
		self.style.depth_max
	}
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;

	use super::*;
	use crate::components::warp::theme::WarpStyle;

	fn field(seed: u64) -> ParticleField {
		let style = WarpStyle::warp().field;
		ParticleField::initialize(
			Viewport::new(800.0, 600.0, 1.0),
			&style,
			SmallRng::seed_from_u64(seed),
		)
	}

	fn assert_depths(field: &ParticleField) {
		let depth_max = field.depth_max();
		for p in field.particles() {
			assert!(p.z >= 1.0 && p.z <= depth_max, "z out of range: {}", p.z);
		}
	}

	#[test]
	fn count_follows_density_and_cap() {
		let vp = Viewport::new(800.0, 600.0, 1.0);
		let mut style = WarpStyle::warp().field;
		style.density_divisor = 1000.0;
		style.max_count = 10_000;
		assert_eq!(ParticleField::count_for(&vp, &style), 480);
		style.max_count = 300;
		assert_eq!(ParticleField::count_for(&vp, &style), 300);
		style.density_divisor = 0.0;
		assert_eq!(ParticleField::count_for(&vp, &style), 0);
		assert_eq!(
			ParticleField::count_for(&Viewport::new(0.0, 600.0, 1.0), &WarpStyle::warp().field),
			0
		);
	}

	#[test]
	fn initial_particles_are_in_spawn_volume() {
		let f = field(1);
		let half = 800.0 * WarpStyle::warp().field.spread;
		assert_eq!(f.len(), (800.0 * 600.0 / 1800.0_f64).floor() as usize);
		for p in f.particles() {
			assert!(p.x.abs() <= half && p.y.abs() <= half);
			assert!(p.projected.is_none() && p.last_projected.is_none());
		}
		assert_depths(&f);
	}

	#[test]
	fn count_and_depth_hold_across_many_steps() {
		let mut f = field(7);
		let n = f.len();
		for step in 0..500 {
			f.advance(4.0 + (step % 50) as f64);
			assert_eq!(f.len(), n);
			assert_depths(&f);
		}
	}

	#[test]
	fn passing_the_viewer_respawns_in_place() {
		let mut f = field(3);
		f.particles[0] = Particle {
			x: 1.0,
			y: 1.0,
			z: 0.5,
			last_projected: Some(Point::new(1.0, 2.0)),
			projected: Some(Point::new(3.0, 4.0)),
		};
		f.advance(10.0);
		let p = &f.particles[0];
		assert!(p.z > 1.0 && p.z <= f.depth_max(), "z = {}", p.z);
		assert!(p.last_projected.is_none());
		assert!(p.projected.is_none());
	}

	#[test]
	fn off_screen_particles_respawn() {
		let mut f = field(5);
		// Near the viewer and far to the side: projects way past the margin.
		f.particles[0] = Particle {
			x: 900.0,
			y: 0.0,
			z: 20.0,
			last_projected: Some(Point::new(700.0, 300.0)),
			projected: Some(Point::new(790.0, 300.0)),
		};
		f.advance(5.0);
		let p = &f.particles[0];
		assert!(p.last_projected.is_none() && p.projected.is_none());
		assert!(p.z > 1.0);
	}

	#[test]
	fn streak_appears_on_second_frame() {
		let mut f = field(11);
		f.particles[0] = Particle {
			x: 10.0,
			y: 10.0,
			z: 1000.0,
			last_projected: None,
			projected: None,
		};
		f.advance(1.0);
		assert!(f.particles[0].streak().is_none());
		f.advance(1.0);
		let (from, to) = f.particles[0].streak().expect("streak after two frames");
		// Moving toward the viewer pushes the star away from the center.
		assert!(to.x > from.x && to.y > from.y);
	}

	#[test]
	fn resize_keeps_count_and_clears_projections() {
		let mut f = field(2);
		f.advance(3.0);
		f.advance(3.0);
		let n = f.len();
		f.set_viewport(Viewport::new(1024.0, 768.0, 2.0));
		assert_eq!(f.len(), n);
		assert_eq!(f.viewport().width, 1024.0);
		assert!(f.particles().iter().all(|p| p.streak().is_none()));
	}
}
