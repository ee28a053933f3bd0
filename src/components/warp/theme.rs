//! Visual styling for the warp transition.
//!
//! Every tunable constant of the effect lives in a [`WarpStyle`]. The simpler
//! page-transition looks are not separate engines, only presets that switch
//! parts of the starfield off.

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Opacity, 0.0 to 1.0.
	pub a: f64,
}

impl Color {
	/// Opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Color with explicit opacity.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Same color at opacity `a`, clamped to `[0, 1]`.
	pub fn with_alpha(self, a: f64) -> Self {
		Self {
			a: a.clamp(0.0, 1.0),
			..self
		}
	}

	/// Linear interpolation between two colors
	pub fn lerp(self, other: Color, t: f64) -> Self {
		let t = t.clamp(0.0, 1.0);
		let mix = |a: u8, b: u8| (a as f64 * (1.0 - t) + b as f64 * t).round() as u8;
		Self {
			r: mix(self.r, other.r),
			g: mix(self.g, other.g),
			b: mix(self.b, other.b),
			a: self.a * (1.0 - t) + other.a * t,
		}
	}

	/// `#rrggbb` when opaque, `rgba(...)` otherwise.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {:.3})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Particle population and projection parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldStyle {
	/// Viewport area (CSS px²) per particle.
	pub density_divisor: f64,
	/// Upper bound on the particle count.
	pub max_count: usize,
	/// Spawn square half-width as a fraction of the longest viewport side.
	pub spread: f64,
	/// Farthest spawn depth.
	pub depth_max: f64,
	/// Focal constant of the perspective projection.
	pub projection: f64,
	/// Off-screen tolerance in CSS pixels before a particle is recycled.
	pub margin: f64,
}

/// Per-frame depth speed, ramped by eased progress.
#[derive(Clone, Debug, PartialEq)]
pub struct SpeedStyle {
	/// Depth units per frame at progress 0.
	pub base: f64,
	/// Extra depth units per frame at progress 1.
	pub ramp: f64,
}

/// Motion-blur trail produced by a translucent fill instead of a clear.
#[derive(Clone, Debug, PartialEq)]
pub struct TrailStyle {
	/// Fill opacity at progress 0 (higher = shorter trails).
	pub base: f64,
	/// Extra opacity added at progress 1.
	pub ramp: f64,
}

/// Radial "end of the tunnel" glow at the viewport center.
#[derive(Clone, Debug, PartialEq)]
pub struct GlowStyle {
	/// Center color of the gradient.
	pub color: Color,
	/// Center opacity at progress 0.
	pub base_alpha: f64,
	/// Extra center opacity at progress 1.
	pub alpha_ramp: f64,
	/// Gradient radius as a fraction of the longest viewport side.
	pub radius: f64,
}

/// Star streak appearance.
#[derive(Clone, Debug, PartialEq)]
pub struct StreakStyle {
	/// Line width of the farthest star.
	pub min_width: f64,
	/// Width added as a star approaches the viewer.
	pub width_range: f64,
	/// Opacity of the farthest star.
	pub base_alpha: f64,
	/// Opacity added as a star approaches the viewer.
	pub alpha_ramp: f64,
	/// Accent tone at the start of the run.
	pub from: Color,
	/// Accent tone at the end of the run.
	pub to: Color,
}

/// Complete transition style.
#[derive(Clone, Debug, PartialEq)]
pub struct WarpStyle {
	/// Preset name, as accepted by [`WarpStyle::by_name`].
	pub name: &'static str,
	/// Default run length when the caller does not pass one.
	pub duration_ms: f64,
	/// Hold after the last frame so it registers before `on_done` fires.
	pub grace_ms: f64,
	/// Particle population.
	pub field: FieldStyle,
	/// Depth speed ramp.
	pub speed: SpeedStyle,
	/// Motion-blur trail.
	pub trail: TrailStyle,
	/// Center glow.
	pub glow: GlowStyle,
	/// Star streaks.
	pub streak: StreakStyle,
}

impl WarpStyle {
	/// Starfield jump to warp (default)
	pub fn warp() -> Self {
		Self {
			name: "warp",
			duration_ms: 650.0,
			grace_ms: 60.0,
			field: FieldStyle {
				density_divisor: 1800.0,
				max_count: 900,
				spread: 1.2,
				depth_max: 1400.0,
				projection: 280.0,
				margin: 60.0,
			},
			speed: SpeedStyle {
				base: 4.0,
				ramp: 46.0,
			},
			trail: TrailStyle {
				base: 0.22,
				ramp: 0.28,
			},
			glow: GlowStyle {
				color: Color::rgb(200, 220, 255),
				base_alpha: 0.02,
				alpha_ramp: 0.35,
				radius: 0.55,
			},
			streak: StreakStyle {
				min_width: 0.4,
				width_range: 2.2,
				base_alpha: 0.25,
				alpha_ramp: 0.75,
				from: Color::rgb(120, 180, 255), // Ice blue
				to: Color::rgb(235, 205, 255),   // Pale violet
			},
		}
	}

	/// Longer, denser, faster variant
	pub fn hyperspace() -> Self {
		let base = Self::warp();
		Self {
			name: "hyperspace",
			duration_ms: 900.0,
			grace_ms: 80.0,
			field: FieldStyle {
				density_divisor: 1200.0,
				max_count: 1400,
				..base.field
			},
			speed: SpeedStyle {
				base: 6.0,
				ramp: 70.0,
			},
			trail: TrailStyle {
				base: 0.14,
				ramp: 0.2,
			},
			streak: StreakStyle {
				from: Color::rgb(110, 235, 255), // Cyan
				to: Color::rgb(255, 255, 255),
				..base.streak
			},
			..base
		}
	}

	/// Plain fade to black with a center glow, no stars
	pub fn fade() -> Self {
		let base = Self::warp();
		Self {
			name: "fade",
			duration_ms: 400.0,
			field: FieldStyle {
				max_count: 0,
				..base.field
			},
			trail: TrailStyle {
				base: 0.05,
				ramp: 0.45,
			},
			glow: GlowStyle {
				alpha_ramp: 0.15,
				..base.glow
			},
			..base
		}
	}

	/// Looks up a preset by name.
	pub fn by_name(name: &str) -> Option<Self> {
		match name {
			"warp" => Some(Self::warp()),
			"hyperspace" => Some(Self::hyperspace()),
			"fade" => Some(Self::fade()),
			_ => None,
		}
	}
}

impl Default for WarpStyle {
	fn default() -> Self {
		Self::warp()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn css_formats() {
		assert_eq!(Color::rgb(255, 0, 16).to_css(), "#ff0010");
		assert_eq!(
			Color::rgba(1, 2, 3, 0.25).to_css(),
			"rgba(1, 2, 3, 0.250)"
		);
	}

	#[test]
	fn lerp_endpoints_and_clamp() {
		let a = Color::rgb(0, 0, 0);
		let b = Color::rgb(200, 100, 50);
		assert_eq!(a.lerp(b, 0.0), a);
		assert_eq!(a.lerp(b, 1.0), b);
		assert_eq!(a.lerp(b, 7.0), b);
		assert_eq!(a.lerp(b, 0.5), Color::rgb(100, 50, 25));
	}

	#[test]
	fn presets_resolve_by_name() {
		for name in ["warp", "hyperspace", "fade"] {
			assert_eq!(WarpStyle::by_name(name).map(|s| s.name), Some(name));
		}
		assert!(WarpStyle::by_name("slide").is_none());
		assert_eq!(WarpStyle::fade().field.max_count, 0);
	}
}
