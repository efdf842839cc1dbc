//! Camera, input aggregation and frame scheduling for 2D canvas apps.
//!
//! The crate compiles to WebAssembly and runs in the browser. A [`Camera`]
//! maps between world and screen space and applies its transform around a
//! drawing closure. An [`InputManager`] listens on a canvas and folds raw
//! mouse, wheel, touch and keyboard events into per-frame state and
//! pan/zoom gestures. A [`FrameApp`] drives an update → render loop from
//! `requestAnimationFrame` and keeps the canvas sized to the display.
//!
//! The pure state ([`Camera`], [`InputCore`], [`FrameLoop`]) has no DOM
//! dependency and is exercised natively in tests; the DOM wrappers only
//! forward events and timestamps into it.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`camera`] | World/screen camera and scoped transform application |
//! | [`input`] | Input value types, options and gesture accumulation |
//! | [`aggregator`] | Input state machine and the DOM [`InputManager`] |
//! | [`frame`] | Update → render loop and the DOM [`FrameApp`] driver |
//! | [`surface`] | Render surface trait and transform save/restore guard |
//! | [`geom`] | Points, sizes, rectangles and affine transforms |
//! | [`dom`] | Scoped event listeners, pixel ratio and clock |
//! | [`error`] | Crate error type |
//! | [`consts`] | Default sensitivities and timing limits |
//! | `logging` | Browser console logger (feature `console`) |

pub mod aggregator;
pub mod camera;
pub mod consts;
pub mod dom;
pub mod error;
pub mod frame;
pub mod geom;
pub mod input;
#[cfg(feature = "console")]
pub mod logging;
pub mod surface;

#[cfg(test)]
mod testing;

pub use aggregator::{InputCore, InputManager};
pub use camera::Camera;
pub use error::{Error, Result};
pub use frame::{Component, FrameApp, FrameLoop, FrameOptions, RenderProps, UpdateProps};
pub use geom::{Point, Rect, Size, Transform};
pub use input::InputOptions;
pub use surface::RenderSurface;
