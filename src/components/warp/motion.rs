//! Reduced-motion preference.

use web_sys::Window;

/// Answers "should motion be minimized". Read once per transition request.
pub trait MotionPreference {
	/// `true` when the user asked for reduced motion.
	fn reduced_motion(&self) -> bool;
}

impl<F: Fn() -> bool> MotionPreference for F {
	fn reduced_motion(&self) -> bool {
		self()
	}
}

/// Reads `(prefers-reduced-motion: reduce)` from the browser on every query,
/// so a preference changed while the page is open is honored.
#[derive(Clone, Debug, Default)]
pub struct MediaQueryPreference;

impl MediaQueryPreference {
	const QUERY: &'static str = "(prefers-reduced-motion: reduce)";

	fn query(window: &Window) -> Option<bool> {
		let list = window.match_media(Self::QUERY).ok()??;
		Some(list.matches())
	}
}

impl MotionPreference for MediaQueryPreference {
	fn reduced_motion(&self) -> bool {
		// No window or no matchMedia: assume motion is fine.
		web_sys::window()
			.and_then(|w| Self::query(&w))
			.unwrap_or(false)
	}
}
