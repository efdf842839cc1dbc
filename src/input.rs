//! Input vocabulary: keys, buttons, wheel deltas, touch contacts, options, and
//! the one-frame gesture records produced by the aggregator.
//!
//! Nothing here holds state across events. The state machine that turns raw
//! events into gestures lives in [`crate::aggregator`].

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_TOUCH_ZOOM_SENSITIVITY, DEFAULT_ZOOM_SENSITIVITY, FALLBACK_PIXEL_RATIO};
use crate::error::Result;
use crate::geom::Point;

/// A keyboard key.
///
/// The inner string holds the key name as reported by the browser (e.g. `"a"`, `" "`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button. The only button that drives the touch/click lifecycle.
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button.
    Secondary,
    /// Back/forward or other extra buttons.
    Other(i16),
}

impl Button {
    /// Map a DOM `MouseEvent.button` value.
    #[must_use]
    pub fn from_dom(button: i16) -> Self {
        match button {
            0 => Self::Primary,
            1 => Self::Middle,
            2 => Self::Secondary,
            other => Self::Other(other),
        }
    }
}

/// Keyboard modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    pub shift: bool,
    /// Ctrl is held. Turns wheel scrolling into zoom (trackpad pinch reports this too).
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy, Default)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// One active touch contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    /// Platform identifier, stable for the lifetime of the contact.
    pub id: i32,
    /// Position in client (CSS pixel) space.
    pub client: Point,
}

impl TouchPoint {
    #[must_use]
    pub fn new(id: i32, x: f64, y: f64) -> Self {
        Self { id, client: Point::new(x, y) }
    }
}

/// Placement of the input surface on the page.
///
/// `left`/`top` are the surface's client-space origin; `pixel_ratio` is the
/// device pixel ratio applied after subtracting the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub left: f64,
    pub top: f64,
    pub pixel_ratio: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { left: 0.0, top: 0.0, pixel_ratio: FALLBACK_PIXEL_RATIO }
    }
}

impl Viewport {
    /// Build a viewport, replacing a non-finite or non-positive pixel ratio with 1.
    #[must_use]
    pub fn new(left: f64, top: f64, pixel_ratio: f64) -> Self {
        Self { left, top, pixel_ratio: sanitize_pixel_ratio(pixel_ratio) }
    }

    /// Client-space point to surface pixels.
    #[must_use]
    pub fn to_surface(&self, client: Point) -> Point {
        (client - Point::new(self.left, self.top)) * self.pixel_ratio
    }
}

/// Pixel ratios of zero, negative, NaN or infinity collapse to 1.
#[must_use]
pub fn sanitize_pixel_ratio(ratio: f64) -> f64 {
    if ratio.is_finite() && ratio > 0.0 { ratio } else { FALLBACK_PIXEL_RATIO }
}

/// Tunables for gesture recognition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputOptions {
    /// Pan with one finger instead of requiring two.
    pub pan_with_single_finger: bool,
    /// Multiplier from wheel `dy` to zoom delta when ctrl is held.
    pub zoom_sensitivity: f64,
    /// Multiplier from pinch distance change to zoom delta.
    pub touch_zoom_sensitivity: f64,
}

impl Default for InputOptions {
    fn default() -> Self {
        Self {
            pan_with_single_finger: false,
            zoom_sensitivity: DEFAULT_ZOOM_SENSITIVITY,
            touch_zoom_sensitivity: DEFAULT_TOUCH_ZOOM_SENSITIVITY,
        }
    }
}

impl InputOptions {
    /// Parse options from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidOptions`] on malformed JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

// =============================================================
// One-frame gesture records
// =============================================================

/// A touch or primary click going down or up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchGesture {
    pub position: Point,
    /// Where the touch/click started. Equals `position` for touch-down.
    pub initial_position: Point,
}

impl TouchGesture {
    #[must_use]
    pub fn new(position: Point) -> Self {
        Self { position, initial_position: position }
    }
}

/// Pan offset accumulated since the last clear.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanGesture {
    pub offset: Point,
}

/// Zoom delta accumulated since the last clear.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomGesture {
    pub delta: f64,
}

/// Gestures that fold repeated occurrences within a frame into one value.
pub trait Accumulate {
    fn merge(&mut self, next: Self);
}

impl Accumulate for PanGesture {
    fn merge(&mut self, next: Self) {
        self.offset += next.offset;
    }
}

impl Accumulate for ZoomGesture {
    fn merge(&mut self, next: Self) {
        self.delta += next.delta;
    }
}

/// Store `value` in an empty slot, or merge it into the existing one.
pub fn accumulate<T: Accumulate>(slot: &mut Option<T>, value: T) {
    match slot {
        Some(acc) => acc.merge(value),
        None => *slot = Some(value),
    }
}
