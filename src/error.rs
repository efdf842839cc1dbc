//! Crate-wide error type.

use wasm_bindgen::JsValue;

/// Errors surfaced by framekit.
///
/// Everything here is reported synchronously by the call that triggers it;
/// nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// There is no global `window` (not running in a browser main thread).
    #[error("no global window available")]
    NoWindow,
    /// The canvas refused to hand out a 2D rendering context.
    #[error("invalid rendering context for canvas")]
    InvalidContext,
    /// A rectangle with zero width or height was used as a scale divisor.
    #[error("degenerate rectangle {width}x{height}")]
    DegenerateRect { width: f64, height: f64 },
    /// The camera has no window size yet, so nothing can be fitted into it.
    #[error("degenerate viewport {width}x{height}")]
    DegenerateViewport { width: f64, height: f64 },
    /// A camera scale of zero (or NaN/infinity) cannot be inverted.
    #[error("degenerate camera scale {0}")]
    DegenerateScale(f64),
    /// Options JSON could not be parsed.
    #[error("invalid options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
    /// A browser API call threw.
    #[error("platform call failed: {0}")]
    Platform(String),
    /// The console logger could not be installed.
    #[error("failed to install logger: {0}")]
    Logger(String),
}

impl From<JsValue> for Error {
    fn from(value: JsValue) -> Self {
        Self::Platform(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

/// Shorthand for results carrying [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
