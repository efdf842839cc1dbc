//! Browser glue shared by the DOM bindings: scoped event listeners, the
//! device pixel ratio, and a `performance.now()` clock.
//!
//! Everything in here calls into `web-sys` and only does something useful
//! on `wasm32` in a browser main thread.

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{AddEventListenerOptions, Event, EventTarget, Performance, Window};

use crate::consts::FALLBACK_PIXEL_RATIO;
use crate::error::{Error, Result};
use crate::frame::Clock;
use crate::input::sanitize_pixel_ratio;

/// The global `window`.
///
/// # Errors
///
/// Returns [`Error::NoWindow`] outside a browser main thread.
pub fn window() -> Result<Window> {
    web_sys::window().ok_or(Error::NoWindow)
}

/// Current device pixel ratio, falling back to 1 when unavailable.
#[must_use]
pub fn pixel_ratio() -> f64 {
    web_sys::window().map_or(FALLBACK_PIXEL_RATIO, |w| sanitize_pixel_ratio(w.device_pixel_ratio()))
}

/// An event listener registered on a DOM target for as long as this value lives.
///
/// Dropping it removes the listener and frees the closure, so no callback can
/// fire after the owner is torn down.
pub struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    /// Register `handler` for `event` on `target`.
    ///
    /// The handler receives the event already cast to `E`. Pass
    /// `passive: false` for handlers that call `prevent_default` on touch or
    /// wheel events.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the browser rejects the registration.
    pub fn new<E, F>(target: &EventTarget, event: &'static str, passive: bool, mut handler: F) -> Result<Self>
    where
        E: JsCast + 'static,
        F: FnMut(E) + 'static,
    {
        let callback = Closure::wrap(Box::new(move |e: Event| {
            handler(e.unchecked_into::<E>());
        }) as Box<dyn FnMut(Event)>);

        let options = AddEventListenerOptions::new();
        options.set_passive(passive);
        target.add_event_listener_with_callback_and_add_event_listener_options(
            event,
            callback.as_ref().unchecked_ref(),
            &options,
        )?;
        log::debug!("listening for {event}");

        Ok(Self { target: target.clone(), event, callback })
    }

    /// Name of the DOM event this listener is attached to.
    #[must_use]
    pub fn event(&self) -> &'static str {
        self.event
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        if let Err(err) = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref())
        {
            log::warn!("failed to remove {} listener: {err:?}", self.event);
        } else {
            log::debug!("stopped listening for {}", self.event);
        }
    }
}

/// Millisecond clock backed by `performance.now()`, or `Date.now()` when the
/// Performance API is missing.
pub struct PerformanceClock {
    performance: Option<Performance>,
}

impl PerformanceClock {
    #[must_use]
    pub fn new() -> Self {
        Self { performance: web_sys::window().and_then(|w| w.performance()) }
    }
}

impl Default for PerformanceClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for PerformanceClock {
    fn now_ms(&self) -> f64 {
        self.performance.as_ref().map_or_else(js_sys::Date::now, Performance::now)
    }
}
