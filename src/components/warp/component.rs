//! Leptos component hosting the warp overlay.
//!
//! The component draws into the page's own layer and canvas when elements with
//! the configured ids exist, and renders a full-viewport layer with a canvas
//! otherwise. It installs three
//! listeners: a document-level click handler (link delegation, so links added
//! later are covered too), a window resize handler gated by the controller's
//! one-shot, and a `pageshow` handler that resets a transition interrupted by
//! the back/forward cache. Frames are delivered with `requestAnimationFrame`
//! only while a run is active.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, info, warn};
use thiserror::Error;
use url::Url;
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, Element, HtmlCanvasElement, HtmlElement, MouseEvent,
	PageTransitionEvent, ScrollBehavior, ScrollIntoViewOptions, ScrollToOptions, Window,
};

use super::gate::{self, LinkAction, LinkActivation};
use super::motion::{MediaQueryPreference, MotionPreference};
use super::render::Surface;
use super::state::{FrameStatus, RunOutcome, TransitionController};
use super::types::WarpConfig;
use super::viewport::Viewport;

/// Presence class that makes the overlay visible.
const VISIBLE_CLASS: &str = "on";

/// Why the overlay could not be wired up. Never fatal: the page keeps working
/// with plain navigation.
#[derive(Debug, Error)]
pub enum SurfaceError {
	/// Not running in a browser window.
	#[error("no window")]
	NoWindow,
	/// The window has no document.
	#[error("no document")]
	NoDocument,
	/// The page's layer holds no canvas and no canvas has the configured id.
	#[error("no canvas for the overlay layer")]
	MissingCanvas,
	/// The canvas refused a 2D context.
	#[error("2d canvas context unavailable")]
	ContextUnavailable,
	/// Registering the named event listener failed.
	#[error("failed to add {0} listener")]
	Listener(&'static str),
}

/// Where the overlay draws.
#[derive(Debug, PartialEq)]
enum Mount<L, C> {
	/// No layer with the configured id; the component renders its own markup.
	Rendered,
	/// The page already has the layer, and maybe its canvas.
	Existing { layer: L, canvas: Option<C> },
}

/// Picks the page's layer if there is one. Its canvas is the element with the
/// canvas id, or else the first canvas inside the layer.
fn resolve_mount<L, C>(
	layer: Option<L>,
	canvas_by_id: impl FnOnce() -> Option<C>,
	canvas_in_layer: impl FnOnce(&L) -> Option<C>,
) -> Mount<L, C> {
	let Some(layer) = layer else {
		return Mount::Rendered;
	};
	let canvas = canvas_by_id().or_else(|| canvas_in_layer(&layer));
	Mount::Existing { layer, canvas }
}

fn find_mount(layer_id: &str, canvas_id: &str) -> Mount<HtmlElement, HtmlCanvasElement> {
	let Some(document) = web_sys::window().and_then(|w| w.document()) else {
		return Mount::Rendered;
	};
	let by_id = |id: &str| document.get_element_by_id(id);
	resolve_mount(
		by_id(layer_id).and_then(|e| e.dyn_into::<HtmlElement>().ok()),
		|| by_id(canvas_id).and_then(|e| e.dyn_into::<HtmlCanvasElement>().ok()),
		|layer| {
			layer
				.query_selector("canvas")
				.ok()
				.flatten()
				.and_then(|e| e.dyn_into::<HtmlCanvasElement>().ok())
		},
	)
}

/// The visible side of the overlay, as seen by a starting run.
trait OverlayLayer {
	/// Sizes the drawing area for `viewport` and clears it.
	fn fit(&mut self, viewport: &Viewport);
	fn show(&mut self);
	fn hide(&mut self);
}

/// The overlay layer and its drawing context.
struct OverlaySurface {
	layer: HtmlElement,
	canvas: HtmlCanvasElement,
	ctx: CanvasRenderingContext2d,
}

impl OverlaySurface {
	fn attach(layer: HtmlElement, canvas: Option<HtmlCanvasElement>) -> Result<Self, SurfaceError> {
		let canvas = canvas.ok_or(SurfaceError::MissingCanvas)?;
		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into().ok())
			.ok_or(SurfaceError::ContextUnavailable)?;
		Ok(Self { layer, canvas, ctx })
	}
}

impl OverlayLayer for OverlaySurface {
	fn fit(&mut self, viewport: &Viewport) {
		let (w, h) = viewport.backing_size();
		// Assigning the size also resets the context state.
		self.canvas.set_width(w);
		self.canvas.set_height(h);
		let style = HtmlElement::style(&self.canvas);
		let _ = style.set_property("width", &format!("{}px", viewport.width));
		let _ = style.set_property("height", &format!("{}px", viewport.height));
		let ratio = viewport.pixel_ratio;
		let _ = self.ctx.set_transform(ratio, 0.0, 0.0, ratio, 0.0, 0.0);
		self.ctx.clear(viewport);
	}

	fn show(&mut self) {
		let _ = self.layer.class_list().add_1(VISIBLE_CLASS);
		let _ = self.layer.set_attribute("aria-hidden", "false");
	}

	fn hide(&mut self) {
		let _ = self.layer.class_list().remove_1(VISIBLE_CLASS);
		let _ = self.layer.set_attribute("aria-hidden", "true");
	}
}

/// Controller plus the surface it draws on (absent if the canvas is unusable).
struct WarpContext {
	controller: TransitionController,
	surface: Option<OverlaySurface>,
	/// Set by the completion callback when the browser refused the navigation.
	navigation_failed: Rc<Cell<bool>>,
}

/// Whether the layer stays up after a frame step reported `status`.
///
/// After `Finished` the browser is loading the next page, so the layer covers
/// the swap. If the navigation was refused nothing will replace the page and
/// the layer must go.
fn layer_stays_visible(status: FrameStatus, navigation_failed: bool) -> bool {
	match status {
		FrameStatus::Drawn { .. } | FrameStatus::Settling => true,
		FrameStatus::Finished => !navigation_failed,
		FrameStatus::Idle => false,
	}
}

type SharedContext = Rc<RefCell<Option<WarpContext>>>;
type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Keeps the installed listener closures alive for the page's lifetime.
#[derive(Default)]
#[allow(dead_code, reason = "fields are only held so the callbacks are not dropped")]
struct Listeners {
	click: Option<Closure<dyn FnMut(MouseEvent)>>,
	resize: Option<Closure<dyn FnMut()>>,
	pageshow: Option<Closure<dyn FnMut(PageTransitionEvent)>>,
}

/// Full-viewport warp overlay that intercepts same-site link clicks.
///
/// If the page already contains an element with the configured layer id, that
/// element and its canvas are used and nothing is rendered. Style the layer
/// with CSS: hidden by default, visible with the `on` class.
#[component]
pub fn WarpOverlay(#[prop(optional)] config: WarpConfig) -> impl IntoView {
	let layer_ref = NodeRef::<leptos::html::Div>::new();
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: SharedContext = Rc::new(RefCell::new(None));
	let animate: FrameCallback = Rc::new(RefCell::new(None));
	let listeners: Rc<RefCell<Listeners>> = Rc::new(RefCell::new(Listeners::default()));
	let (layer_id, canvas_id) = (config.layer_id().to_string(), config.canvas_id().to_string());

	let mount = find_mount(&layer_id, &canvas_id);
	let rendered = matches!(mount, Mount::Rendered);
	if !rendered {
		debug!("warp-nav: drawing into existing #{} layer", layer_id);
	}

	Effect::new(move |_| {
		if context.borrow().is_some() {
			return;
		}
		let (layer, canvas) = match &mount {
			Mount::Existing { layer, canvas } => (layer.clone(), canvas.clone()),
			Mount::Rendered => {
				let (Some(layer), Some(canvas)) = (layer_ref.get(), canvas_ref.get()) else {
					return;
				};
				let layer: HtmlElement = layer.into();
				let canvas: HtmlCanvasElement = canvas.into();
				(layer, Some(canvas))
			}
		};

		let surface = match OverlaySurface::attach(layer, canvas) {
			Ok(surface) => Some(surface),
			Err(e) => {
				warn!("warp-nav: {}, transitions will be instant", e);
				None
			}
		};
		let style = config.style();
		let seed = (js_sys::Math::random() * u64::MAX as f64) as u64;
		*context.borrow_mut() = Some(WarpContext {
			controller: TransitionController::new(style, MediaQueryPreference, seed),
			surface,
			navigation_failed: Rc::new(Cell::new(false)),
		});

		let (context_anim, animate_inner) = (context.clone(), animate.clone());
		*animate.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
			let status = {
				let mut guard = context_anim.borrow_mut();
				let Some(c) = guard.as_mut() else {
					return;
				};
				let Some(surface) = c.surface.as_mut() else {
					return;
				};
				let status = c.controller.frame(timestamp, &mut surface.ctx);
				if !layer_stays_visible(status, c.navigation_failed.get()) {
					surface.hide();
				}
				status
			};
			match status {
				FrameStatus::Drawn { .. } | FrameStatus::Settling => schedule_frame(&animate_inner),
				FrameStatus::Finished | FrameStatus::Idle => {}
			}
		}));

		match install_listeners(&context, &animate, &listeners) {
			Ok(()) => info!("warp-nav: overlay ready"),
			Err(e) => warn!("warp-nav: {}, links navigate normally", e),
		}
	});

	rendered.then(move || {
		view! {
			<div node_ref=layer_ref id=layer_id class="warp-layer" aria-hidden="true">
				<canvas node_ref=canvas_ref id=canvas_id class="warp-canvas" />
			</div>
		}
	})
}

fn install_listeners(
	context: &SharedContext,
	animate: &FrameCallback,
	listeners: &Rc<RefCell<Listeners>>,
) -> Result<(), SurfaceError> {
	let window = web_sys::window().ok_or(SurfaceError::NoWindow)?;
	let document = window.document().ok_or(SurfaceError::NoDocument)?;
	let mut listeners = listeners.borrow_mut();

	let (context_click, animate_click) = (context.clone(), animate.clone());
	let click: Closure<dyn FnMut(MouseEvent)> = Closure::new(move |ev: MouseEvent| {
		let Some(link) = link_activation(&ev) else {
			return;
		};
		let current = web_sys::window()
			.and_then(|w| w.location().href().ok())
			.and_then(|href| Url::parse(&href).ok());
		match gate::classify(&link, current.as_ref()) {
			LinkAction::Default => {}
			LinkAction::ScrollTo(id) => {
				ev.prevent_default();
				scroll_to_fragment(&id, MediaQueryPreference.reduced_motion());
			}
			LinkAction::Warp(href) => {
				ev.prevent_default();
				begin_warp(&context_click, &animate_click, href);
			}
		}
	});
	document
		.add_event_listener_with_callback("click", click.as_ref().unchecked_ref())
		.map_err(|_| SurfaceError::Listener("click"))?;
	listeners.click = Some(click);

	let context_resize = context.clone();
	let resize: Closure<dyn FnMut()> = Closure::new(move || {
		let Some(win) = web_sys::window() else {
			return;
		};
		if let Some(ref mut c) = *context_resize.borrow_mut() {
			if !c.controller.awaits_resize() {
				return;
			}
			let viewport = measure_viewport(&win);
			if c.controller.resize(viewport) {
				if let Some(surface) = c.surface.as_mut() {
					surface.fit(&viewport);
				}
			}
		}
	});
	window
		.add_event_listener_with_callback("resize", resize.as_ref().unchecked_ref())
		.map_err(|_| SurfaceError::Listener("resize"))?;
	listeners.resize = Some(resize);

	let context_show = context.clone();
	let pageshow: Closure<dyn FnMut(PageTransitionEvent)> = Closure::new(move |ev: PageTransitionEvent| {
		if !ev.persisted() {
			return;
		}
		if let Some(ref mut c) = *context_show.borrow_mut() {
			c.controller.reset();
			c.navigation_failed.set(false);
			if let Some(surface) = c.surface.as_mut() {
				surface.hide();
			}
		}
	});
	window
		.add_event_listener_with_callback("pageshow", pageshow.as_ref().unchecked_ref())
		.map_err(|_| SurfaceError::Listener("pageshow"))?;
	listeners.pageshow = Some(pageshow);

	Ok(())
}

/// Starts a warp to `href`, or navigates right away if that is not possible.
fn begin_warp(context: &SharedContext, animate: &FrameCallback, href: String) {
	let Some(window) = web_sys::window() else {
		return;
	};
	let now = window.performance().map(|p| p.now()).unwrap_or(0.0);

	let outcome = {
		let mut guard = context.borrow_mut();
		let Some(c) = guard.as_mut() else {
			if let Err(e) = navigate(&href) {
				warn!("warp-nav: navigation to {} failed: {:?}", href, e);
			}
			return;
		};
		if c.controller.is_busy() {
			debug!("warp-nav: transition in flight, dropping click on {}", href);
			return;
		}

		let failed = c.navigation_failed.clone();
		failed.set(false);
		let target = href.clone();
		let on_done = move || {
			if let Err(e) = navigate(&target) {
				warn!("warp-nav: navigation to {} failed: {:?}", target, e);
				failed.set(true);
			}
		};
		start_run(
			&mut c.controller,
			c.surface.as_mut(),
			measure_viewport(&window),
			href,
			on_done,
			now,
		)
	};

	if outcome == RunOutcome::Started {
		schedule_frame(animate);
	}
}

/// Hands `href` to the controller. The layer is sized and revealed only once
/// the run has started, so an instant completion never flashes it.
fn start_run<L: OverlayLayer>(
	controller: &mut TransitionController,
	layer: Option<&mut L>,
	viewport: Viewport,
	href: String,
	on_done: impl FnOnce() + 'static,
	now: f64,
) -> RunOutcome {
	let outcome = controller.run(href, on_done, None, layer.is_some().then_some(viewport), now);
	if outcome == RunOutcome::Started {
		if let Some(layer) = layer {
			layer.fit(&viewport);
			layer.show();
		}
	}
	outcome
}

fn schedule_frame(animate: &FrameCallback) {
	let Some(window) = web_sys::window() else {
		return;
	};
	if let Some(ref cb) = *animate.borrow() {
		if let Err(e) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
			warn!("warp-nav: requestAnimationFrame failed: {:?}", e);
		}
	}
}

fn measure_viewport(window: &Window) -> Viewport {
	let dimension = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
	Viewport::new(
		dimension(window.inner_width()),
		dimension(window.inner_height()),
		window.device_pixel_ratio(),
	)
}

/// Reads the closest anchor of a click into a [`LinkActivation`].
fn link_activation(ev: &MouseEvent) -> Option<LinkActivation> {
	let target: Element = ev.target()?.dyn_into().ok()?;
	let anchor = target.closest("a").ok()??;
	let href = anchor.get_attribute("href")?;

	Some(LinkActivation {
		href,
		button: ev.button(),
		ctrl: ev.ctrl_key(),
		meta: ev.meta_key(),
		shift: ev.shift_key(),
		alt: ev.alt_key(),
		target: anchor.get_attribute("target"),
		download: anchor.has_attribute("download"),
		default_prevented: ev.default_prevented(),
	})
}

/// Scrolls the element with `id` into view; an empty id means the top.
fn scroll_to_fragment(id: &str, reduced_motion: bool) {
	let Some(window) = web_sys::window() else {
		return;
	};
	let behavior = if reduced_motion {
		ScrollBehavior::Instant
	} else {
		ScrollBehavior::Smooth
	};

	if id.is_empty() {
		let options = ScrollToOptions::new();
		options.set_top(0.0);
		options.set_behavior(behavior);
		window.scroll_to_with_scroll_to_options(&options);
		return;
	}

	match window.document().and_then(|d| d.get_element_by_id(id)) {
		Some(element) => {
			let options = ScrollIntoViewOptions::new();
			options.set_behavior(behavior);
			element.scroll_into_view_with_scroll_into_view_options(&options);
		}
		None => debug!("warp-nav: no element with id {:?}", id),
	}
}

fn navigate(href: &str) -> Result<(), JsValue> {
	let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
	window.location().set_href(href)
}
