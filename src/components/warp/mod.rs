//! Starfield warp page transition.
//!
//! Intercepts same-site link clicks and plays a perspective-projected
//! star-streak animation on a full-viewport canvas before navigating:
//! - Constant-size particle field with respawn-in-place
//! - Quadratic ease-in-out ramps for speed, trail, and glow
//! - At most one transition at a time; completion fires exactly once
//! - Instant navigation under reduced motion or without a canvas
//!
//! The engine ([`TransitionController`], [`ParticleField`], [`draw_frame`])
//! has no browser dependency beyond the [`Surface`] it draws on, so it can be
//! driven by any [`FrameClock`].
//!
//! # Example
//!
//! ```ignore
//! use warp_nav::{WarpConfig, WarpOverlay};
//!
//! let config = WarpConfig {
//!     style: Some("hyperspace".into()),
//!     ..Default::default()
//! };
//!
//! view! { <WarpOverlay config=config /> }
//! ```

mod component;
pub mod gate;
pub mod motion;
pub mod once;
mod particles;
mod render;
mod state;
pub mod theme;
mod types;
pub mod viewport;

pub use component::{SurfaceError, WarpOverlay};
pub use gate::{LinkAction, LinkActivation, classify};
pub use motion::{MediaQueryPreference, MotionPreference};
pub use particles::{Particle, ParticleField};
pub use render::{Surface, draw_frame};
pub use state::{
	FrameClock, FrameStatus, OnDone, RunOutcome, TransitionController, TransitionState,
	ease_in_out_quad,
};
pub use theme::{Color, WarpStyle};
pub use types::WarpConfig;
pub use viewport::{Point, Viewport};
