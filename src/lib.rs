//! warp-nav: starfield warp page transitions for in-site navigation.
//!
//! This crate provides a WASM overlay that intercepts same-site link clicks,
//! plays a short star-streak "jump to warp" animation on a full-viewport
//! canvas, and only then changes the page location.

use leptos::prelude::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::warp::{
	FrameClock, LinkAction, LinkActivation, MotionPreference, ParticleField, Surface,
	TransitionController, Viewport, WarpConfig, WarpOverlay, WarpStyle,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("warp-nav: logging initialized");
}

/// Load overlay settings from a script element with id="warp-config".
/// Expected format: JSON with optional { style, durationMs, maxParticles, layerId, canvasId }
fn load_warp_config() -> Option<WarpConfig> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("warp-config")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match serde_json::from_str::<WarpConfig>(&json_text) {
		Ok(config) => {
			info!(
				"warp-nav: loaded config (style {})",
				config.style.as_deref().unwrap_or("warp")
			);
			Some(config)
		}
		Err(e) => {
			warn!("warp-nav: failed to parse warp config: {}", e);
			None
		}
	}
}

/// Main application component.
/// Loads settings from the DOM and mounts the warp overlay.
#[component]
pub fn App() -> impl IntoView {
	let config = load_warp_config().unwrap_or_default();

	view! { <WarpOverlay config=config /> }
}
