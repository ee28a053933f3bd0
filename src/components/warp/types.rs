//! Page-level configuration for the warp overlay.

use log::warn;
use serde::Deserialize;

use super::theme::WarpStyle;

/// Default id of the overlay layer element.
pub const DEFAULT_LAYER_ID: &str = "warp";
/// Default id of the canvas inside the overlay layer.
pub const DEFAULT_CANVAS_ID: &str = "warpCanvas";

/// Optional settings a page can embed as JSON. Every field may be omitted.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct WarpConfig {
	/// Preset name: "warp", "hyperspace" or "fade".
	pub style: Option<String>,
	/// Run length override in milliseconds.
	pub duration_ms: Option<f64>,
	/// Particle cap override.
	pub max_particles: Option<usize>,
	/// Id of the page's overlay element. When no element has it, the
	/// component renders its own layer under this id.
	pub layer_id: Option<String>,
	/// Id of the canvas to draw on. Falls back to the first canvas inside the
	/// layer.
	pub canvas_id: Option<String>,
}

impl WarpConfig {
	/// Resolves the configuration into a complete style.
	pub fn style(&self) -> WarpStyle {
		let mut style = match self.style.as_deref() {
			None => WarpStyle::default(),
			Some(name) => WarpStyle::by_name(name).unwrap_or_else(|| {
				warn!("warp-nav: unknown style {:?}, using warp", name);
				WarpStyle::default()
			}),
		};

		if let Some(duration) = self.duration_ms {
			if duration.is_finite() && duration > 0.0 {
				style.duration_ms = duration;
			} else {
				warn!("warp-nav: ignoring invalid duration {}", duration);
			}
		}
		if let Some(max) = self.max_particles {
			style.field.max_count = max;
		}
		style
	}

	/// Configured layer id, or [`DEFAULT_LAYER_ID`].
	pub fn layer_id(&self) -> &str {
		self.layer_id.as_deref().unwrap_or(DEFAULT_LAYER_ID)
	}

	/// Configured canvas id, or [`DEFAULT_CANVAS_ID`].
	pub fn canvas_id(&self) -> &str {
		self.canvas_id.as_deref().unwrap_or(DEFAULT_CANVAS_ID)
	}
}
