//! Transition state machine.
//!
//! [`TransitionController`] owns the single in-flight transition. A run is
//! accepted by [`TransitionController::run`], advanced one display frame at a
//! time by [`TransitionController::frame`], and ends by invoking the caller's
//! completion callback exactly once. The controller only times and draws; what
//! happens on completion (usually navigation) belongs to the caller.
//!
//! Time is passed in explicitly (milliseconds, any monotonic origin), so the
//! loop can be driven by `requestAnimationFrame` in the browser or by a
//! [`FrameClock`] in tests.

use log::{debug, info, warn};
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

use super::motion::MotionPreference;
use super::once::OneShot;
use super::particles::ParticleField;
use super::render::{self, Surface};
use super::theme::WarpStyle;
use super::viewport::Viewport;

/// Quadratic ease-in-out: gentle start and end, fastest through the middle.
pub fn ease_in_out_quad(t: f64) -> f64 {
	let t = t.clamp(0.0, 1.0);
	if t < 0.5 {
		2.0 * t * t
	} else {
		1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
	}
}

/// Completion callback handed to [`TransitionController::run`].
pub type OnDone = Box<dyn FnOnce()>;

/// Lifecycle of the controller. At most one run exists at a time.
#[derive(Clone, Debug, PartialEq)]
pub enum TransitionState {
	/// No run in flight.
	Idle,
	/// Frames are being drawn.
	Running {
		/// Timestamp the run was accepted at.
		start_time: f64,
		/// Where the run navigates once done.
		target: String,
		/// Length of the animated part in milliseconds.
		duration_ms: f64,
	},
	/// Last frame drawn; waiting out the grace delay before `on_done`.
	Completing {
		/// Where the run navigates once done.
		target: String,
		/// Frame timestamp at or after which `on_done` runs.
		deadline: f64,
	},
}

/// Result of a [`TransitionController::run`] request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
	/// Animation started; the caller should start delivering frames.
	Started,
	/// Reduced motion or no drawing surface: `on_done` already ran.
	Completed,
	/// Another run is in flight; the request was dropped.
	Ignored,
}

/// Result of one [`TransitionController::frame`] step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrameStatus {
	/// Nothing is running. No frame should be scheduled.
	Idle,
	/// A frame was drawn at linear progress `progress` (0.0 to 1.0).
	Drawn {
		/// Linear progress of the drawn frame.
		progress: f64,
	},
	/// Holding the final frame during the grace delay.
	Settling,
	/// `on_done` ran during this step and the controller is idle again.
	Finished,
}

/// Source of display-frame timestamps for [`TransitionController::drive`].
pub trait FrameClock {
	/// Waits for the next frame and returns its timestamp in milliseconds, or
	/// `None` when no more frames will come.
	fn next_frame(&mut self) -> Option<f64>;
}

/// Drives the warp effect for one navigation at a time.
pub struct TransitionController {
	state: TransitionState,
	style: WarpStyle,
	motion: Box<dyn MotionPreference>,
	rng: SmallRng,
	field: Option<ParticleField>,
	on_done: Option<OnDone>,
	resize: OneShot,
	progress: f64,
	needs_clear: bool,
}

impl TransitionController {
	/// An idle controller drawing `style`; `seed` feeds every particle field.
	pub fn new(style: WarpStyle, motion: impl MotionPreference + 'static, seed: u64) -> Self {
		Self {
			state: TransitionState::Idle,
			style,
			motion: Box::new(motion),
			rng: SmallRng::seed_from_u64(seed),
			field: None,
			on_done: None,
			resize: OneShot::default(),
			progress: 0.0,
			needs_clear: false,
		}
	}

	/// Current lifecycle state.
	pub fn state(&self) -> &TransitionState {
		&self.state
	}

	/// Whether a run is in flight (running or settling).
	pub fn is_busy(&self) -> bool {
		!matches!(self.state, TransitionState::Idle)
	}

	/// The active run's particles, if any.
	pub fn field(&self) -> Option<&ParticleField> {
		self.field.as_ref()
	}

	/// Requests a transition to `target`.
	///
	/// `viewport` is `None` when the overlay or its drawing surface is missing;
	/// like reduced motion, that completes immediately. `duration_ms` falls back
	/// to the style's duration when absent or not a positive number.
	pub fn run(
		&mut self,
		target: impl Into<String>,
		on_done: impl FnOnce() + 'static,
		duration_ms: Option<f64>,
		viewport: Option<Viewport>,
		now: f64,
	) -> RunOutcome {
		let target = target.into();

		if self.is_busy() {
			debug!("warp-nav: transition in flight, ignoring request for {}", target);
			return RunOutcome::Ignored;
		}

		if self.motion.reduced_motion() {
			info!("warp-nav: reduced motion, completing {} immediately", target);
			on_done();
			return RunOutcome::Completed;
		}

		let Some(viewport) = viewport else {
			warn!("warp-nav: no drawing surface, completing {} immediately", target);
			on_done();
			return RunOutcome::Completed;
		};

		let duration_ms = duration_ms
			.filter(|d| d.is_finite() && *d > 0.0)
			.unwrap_or(self.style.duration_ms);
		let field_rng = SmallRng::seed_from_u64(self.rng.next_u64());
		let field = ParticleField::initialize(viewport, &self.style.field, field_rng);

		info!(
			"warp-nav: warping to {} over {}ms with {} stars",
			target,
			duration_ms,
			field.len()
		);

		self.field = Some(field);
		self.on_done = Some(Box::new(on_done));
		self.resize.arm();
		self.progress = 0.0;
		self.needs_clear = true;
		self.state = TransitionState::Running {
			start_time: now,
			target,
			duration_ms,
		};
		RunOutcome::Started
	}

	/// Advances the active run to time `now` and draws it onto `surface`.
	pub fn frame<S: Surface + ?Sized>(&mut self, now: f64, surface: &mut S) -> FrameStatus {
		match &self.state {
			TransitionState::Idle => FrameStatus::Idle,
			TransitionState::Completing { deadline, .. } => {
				if now >= *deadline {
					self.finish();
					FrameStatus::Finished
				} else {
					FrameStatus::Settling
				}
			}
			TransitionState::Running {
				start_time,
				target,
				duration_ms,
			} => {
				let t = ((now - start_time) / duration_ms).clamp(0.0, 1.0);
				// Clock jitter must not run the effect backwards.
				let t = t.max(self.progress);
				let eased = ease_in_out_quad(t);
				let speed = self.style.speed.base + eased * self.style.speed.ramp;

				let next = (t >= 1.0).then(|| TransitionState::Completing {
					target: target.clone(),
					deadline: now + self.style.grace_ms.max(0.0),
				});

				if let Some(field) = self.field.as_mut() {
					if self.needs_clear {
						surface.clear(field.viewport());
						self.needs_clear = false;
					}
					field.advance(speed);
					render::draw_frame(surface, field, eased, &self.style);
				}

				self.progress = t;
				if let Some(next) = next {
					self.state = next;
				}
				FrameStatus::Drawn { progress: t }
			}
		}
	}

	/// Whether the one-shot resize handler is still waiting for an event.
	pub fn awaits_resize(&self) -> bool {
		self.resize.is_armed()
	}

	/// Applies new geometry to the active run, at most once per run.
	/// Returns `true` if the caller should resize its backing store.
	pub fn resize(&mut self, viewport: Viewport) -> bool {
		let Some(field) = self.field.as_mut() else {
			return false;
		};
		if !self.resize.fire() {
			return false;
		}
		debug!(
			"warp-nav: viewport resized to {}x{}",
			viewport.width, viewport.height
		);
		field.set_viewport(viewport);
		self.needs_clear = true;
		true
	}

	/// Forces the controller back to idle without calling `on_done`.
	/// Returns `true` if a run was interrupted.
	pub fn reset(&mut self) -> bool {
		let interrupted = self.is_busy();
		if interrupted {
			info!("warp-nav: resetting interrupted transition");
		}
		self.state = TransitionState::Idle;
		self.field = None;
		self.on_done = None;
		self.resize.disarm();
		self.progress = 0.0;
		self.needs_clear = false;
		interrupted
	}

	/// Runs frames from `clock` until the active run finishes or the clock
	/// stops. Returns the number of frames drawn.
	pub fn drive<C, S>(&mut self, clock: &mut C, surface: &mut S) -> usize
	where
		C: FrameClock + ?Sized,
		S: Surface + ?Sized,
	{
		let mut drawn = 0;
		while let Some(now) = clock.next_frame() {
			match self.frame(now, surface) {
				FrameStatus::Drawn { .. } => drawn += 1,
				FrameStatus::Settling => {}
				FrameStatus::Finished | FrameStatus::Idle => break,
			}
		}
		drawn
	}

	fn finish(&mut self) {
		let state = std::mem::replace(&mut self.state, TransitionState::Idle);
		if let TransitionState::Completing { target, .. } = state {
			info!("warp-nav: transition to {} complete", target);
		}
		self.field = None;
		self.resize.disarm();
		self.progress = 0.0;
		if let Some(on_done) = self.on_done.take() {
			on_done();
		}
	}
}
