//! Shared numeric constants for the framekit crate.

// ── Input ───────────────────────────────────────────────────────

/// Wheel delta to zoom delta multiplier. Negative so scrolling up zooms in.
pub const DEFAULT_ZOOM_SENSITIVITY: f64 = -0.02;

/// Pinch distance change (client pixels) to zoom delta multiplier.
pub const DEFAULT_TOUCH_ZOOM_SENSITIVITY: f64 = 0.02;

/// Pixel ratio used when the platform reports none (or a nonsensical one).
pub const FALLBACK_PIXEL_RATIO: f64 = 1.0;

// ── Camera ──────────────────────────────────────────────────────

/// Oversize factor applied by `Camera::fill_to`.
pub const FILL_FACTOR: f64 = 0.65;

// ── Frame loop ──────────────────────────────────────────────────

/// Upper bound on a single frame's `delta_time`, in seconds.
pub const MAX_FRAME_DELTA_SECS: f64 = 1.0;
