//! Frame scheduling: one update → render cycle per display refresh.
//!
//! [`FrameLoop`] is the cycle itself and is driven by whoever calls
//! [`FrameLoop::tick`]. [`FrameApp`] drives it from `requestAnimationFrame`
//! and keeps the canvas backing store sized to the element.

#[cfg(test)]
#[path = "frame_test.rs"]
mod frame_test;

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen::closure::Closure;
use web_sys::{CanvasRenderingContext2d, ContextAttributes2d, HtmlCanvasElement, Window};

use crate::consts::MAX_FRAME_DELTA_SECS;
use crate::dom::{self, Listener, PerformanceClock};
use crate::error::{Error, Result};
use crate::geom::Size;

/// Millisecond time source.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Seconds between two millisecond timestamps, clamped to `[0, 1]`.
#[must_use]
pub fn frame_delta_secs(previous_ms: f64, now_ms: f64) -> f64 {
    ((now_ms - previous_ms) / 1000.0).clamp(0.0, MAX_FRAME_DELTA_SECS)
}

/// Arguments to [`Component::update`].
pub struct UpdateProps<'a, C> {
    /// Seconds since the previous cycle, at most 1.0.
    pub delta_time: f64,
    pub window_size: Size,
    pub context: &'a mut C,
}

/// Arguments to [`Component::render`].
pub struct RenderProps<'a, S: ?Sized, C> {
    pub surface: &'a mut S,
    pub window_size: Size,
    pub context: &'a mut C,
}

/// User logic run once per frame.
pub trait Component<S: ?Sized, C> {
    fn update(&mut self, props: UpdateProps<'_, C>);

    /// # Errors
    ///
    /// Errors are logged by the loop; the next frame still runs.
    fn render(&mut self, props: RenderProps<'_, S, C>) -> Result<()>;
}

/// Clonable switch that stops a [`FrameLoop`], usable from inside `update`.
#[derive(Debug, Clone)]
pub struct StopHandle(Rc<Cell<bool>>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.set(false);
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.0.get()
    }
}

/// The update → render cycle and its timing state.
pub struct FrameLoop<S, C, K, T> {
    surface: S,
    context: C,
    component: K,
    clock: T,
    window_size: Size,
    last_ms: f64,
    running: Rc<Cell<bool>>,
}

impl<S, C, K, T> FrameLoop<S, C, K, T>
where
    K: Component<S, C>,
    T: Clock,
{
    /// A running loop whose first `delta_time` is measured from now.
    pub fn new(surface: S, context: C, component: K, clock: T) -> Self {
        let last_ms = clock.now_ms();
        Self {
            surface,
            context,
            component,
            clock,
            window_size: Size::default(),
            last_ms,
            running: Rc::new(Cell::new(true)),
        }
    }

    pub fn resize(&mut self, window_size: Size) {
        self.window_size = window_size;
    }

    #[must_use]
    pub fn window_size(&self) -> Size {
        self.window_size
    }

    #[must_use]
    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    pub fn stop(&mut self) {
        self.running.set(false);
    }

    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(Rc::clone(&self.running))
    }

    /// Run one cycle. Returns `false` (and does nothing) once stopped.
    ///
    /// Update always finishes before render starts. A stop requested during
    /// update skips this cycle's render.
    pub fn tick(&mut self) -> bool {
        if !self.running.get() {
            return false;
        }

        let delta_time = frame_delta_secs(self.last_ms, self.clock.now_ms());
        self.component.update(UpdateProps {
            delta_time,
            window_size: self.window_size,
            context: &mut self.context,
        });
        if !self.running.get() {
            return false;
        }

        if let Err(err) = self.component.render(RenderProps {
            surface: &mut self.surface,
            window_size: self.window_size,
            context: &mut self.context,
        }) {
            log::warn!("render failed: {err}");
        }

        self.last_ms = self.clock.now_ms();
        true
    }
}

// =============================================================
// DOM driver
// =============================================================

/// 2D context attributes requested at start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameOptions {
    pub alpha: bool,
    pub desynchronized: bool,
    pub will_read_frequently: bool,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self { alpha: true, desynchronized: false, will_read_frequently: false }
    }
}

impl FrameOptions {
    /// Parse options from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOptions`] on malformed JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    fn to_attributes(self) -> Result<ContextAttributes2d> {
        let attrs = ContextAttributes2d::new();
        attrs.set_alpha(self.alpha);
        attrs.set_will_read_frequently(self.will_read_frequently);
        // No stable web-sys setter for this one.
        js_sys::Reflect::set(&attrs, &JsValue::from_str("desynchronized"), &JsValue::from_bool(self.desynchronized))?;
        Ok(attrs)
    }
}

/// The parts of a [`FrameLoop`] the DOM driver needs, without its type parameters.
trait Cycle {
    fn tick(&mut self) -> bool;
    fn resize(&mut self, window_size: Size);
}

impl<S, C, K, T> Cycle for FrameLoop<S, C, K, T>
where
    K: Component<S, C>,
    T: Clock,
{
    fn tick(&mut self) -> bool {
        FrameLoop::tick(self)
    }

    fn resize(&mut self, window_size: Size) {
        FrameLoop::resize(self, window_size);
    }
}

struct Driver {
    window: Window,
    canvas: HtmlCanvasElement,
    cycle: RefCell<Box<dyn Cycle>>,
    running: StopHandle,
    animation_handle: Cell<Option<i32>>,
    on_frame: RefCell<Option<Closure<dyn FnMut(f64)>>>,
    on_resize: RefCell<Option<Listener>>,
}

impl Driver {
    fn recalculate_canvas_size(&self) {
        let size = logical_canvas_size(&self.canvas);
        self.canvas.set_width(backing_pixels(size.width));
        self.canvas.set_height(backing_pixels(size.height));
        match self.cycle.try_borrow_mut() {
            Ok(mut cycle) => cycle.resize(size),
            Err(_) => log::warn!("frame loop busy, resize deferred"),
        }
    }

    fn request_frame(&self) -> Result<()> {
        let on_frame = self.on_frame.borrow();
        let Some(callback) = on_frame.as_ref() else {
            return Ok(());
        };
        let handle = self.window.request_animation_frame(callback.as_ref().unchecked_ref())?;
        self.animation_handle.set(Some(handle));
        Ok(())
    }

    fn run_frame(&self) {
        self.animation_handle.set(None);
        let ticked = match self.cycle.try_borrow_mut() {
            Ok(mut cycle) => cycle.tick(),
            Err(_) => {
                log::warn!("frame loop re-entered, skipping frame");
                self.running.is_running()
            }
        };
        if ticked && self.running.is_running() {
            if let Err(err) = self.request_frame() {
                log::error!("failed to schedule next frame: {err}");
            }
        }
    }

    fn stop(&self) {
        self.running.stop();
        if let Some(handle) = self.animation_handle.take() {
            if let Err(err) = self.window.cancel_animation_frame(handle) {
                log::warn!("failed to cancel animation frame: {err:?}");
            }
        }
        self.on_resize.borrow_mut().take();
    }
}

/// A running frame loop bound to a canvas element.
///
/// Stops (cancels the pending frame, removes the resize listener) on
/// [`FrameApp::stop`], [`FrameApp::destroy`] or drop.
pub struct FrameApp {
    driver: Rc<Driver>,
}

impl FrameApp {
    /// Acquire the canvas 2D context and start the loop.
    ///
    /// The context is acquired before anything is registered, so a failure
    /// leaves nothing running.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidContext`] if the canvas has no usable 2D
    /// context, or a platform error if scheduling the first frame fails.
    pub fn start<C, K>(canvas: &HtmlCanvasElement, context: C, component: K, options: FrameOptions) -> Result<Self>
    where
        C: 'static,
        K: Component<CanvasRenderingContext2d, C> + 'static,
    {
        let window = dom::window()?;
        let ctx = canvas
            .get_context_with_context_options("2d", &options.to_attributes()?.into())?
            .ok_or(Error::InvalidContext)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| Error::InvalidContext)?;

        let frame_loop = FrameLoop::new(ctx, context, component, PerformanceClock::new());
        let running = frame_loop.stop_handle();
        let driver = Rc::new(Driver {
            window,
            canvas: canvas.clone(),
            cycle: RefCell::new(Box::new(frame_loop)),
            running,
            animation_handle: Cell::new(None),
            on_frame: RefCell::new(None),
            on_resize: RefCell::new(None),
        });

        driver.recalculate_canvas_size();

        let weak = Rc::downgrade(&driver);
        let on_resize = Listener::new(&driver.window, "resize", true, move |_: web_sys::Event| {
            if let Some(driver) = weak.upgrade() {
                driver.recalculate_canvas_size();
            }
        })?;
        *driver.on_resize.borrow_mut() = Some(on_resize);

        let weak: Weak<Driver> = Rc::downgrade(&driver);
        let on_frame = Closure::wrap(Box::new(move |_ts: f64| {
            if let Some(driver) = weak.upgrade() {
                driver.run_frame();
            }
        }) as Box<dyn FnMut(f64)>);
        *driver.on_frame.borrow_mut() = Some(on_frame);

        let app = Self { driver };
        app.driver.request_frame()?;
        log::debug!("frame loop started");
        Ok(app)
    }

    /// Resize the canvas backing store to `client size × device pixel ratio`.
    pub fn recalculate_canvas_size(&self) {
        self.driver.recalculate_canvas_size();
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.driver.running.is_running()
    }

    /// Stop immediately; no further update or render runs.
    pub fn stop(&self) {
        if self.driver.running.is_running() {
            log::debug!("frame loop stopped");
        }
        self.driver.stop();
    }

    /// Stop and release everything.
    pub fn destroy(self) {
        self.stop();
    }
}

impl Drop for FrameApp {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Logical canvas size: its layout size times the device pixel ratio, unrounded.
fn logical_canvas_size(canvas: &HtmlCanvasElement) -> Size {
    scaled_client_size(canvas.client_width(), canvas.client_height(), dom::pixel_ratio())
}

fn scaled_client_size(client_width: i32, client_height: i32, ratio: f64) -> Size {
    Size::new(f64::from(client_width) * ratio, f64::from(client_height) * ratio)
}

/// Whole backing-store pixels for a logical length; the fraction is dropped.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn backing_pixels(length: f64) -> u32 {
    length as u32
}
