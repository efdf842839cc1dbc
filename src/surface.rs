//! Render surface abstraction: the slice of a 2D context the camera needs.
//!
//! The camera never draws. It only reads and writes the surface's current
//! affine transform around a caller-supplied drawing closure, so the trait
//! here is limited to transform-stack operations. Actual drawing happens on
//! the concrete surface type handed back to the closure.

#[cfg(test)]
#[path = "surface_test.rs"]
mod surface_test;

use std::ops::{Deref, DerefMut};

use web_sys::CanvasRenderingContext2d;

use crate::error::Result;
use crate::geom::{Size, Transform};

/// A drawable surface with an affine transform.
pub trait RenderSurface {
    /// Logical pixel dimensions of the backing store.
    fn size(&self) -> Size;

    /// Read the current transform.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the platform call fails.
    fn current_transform(&self) -> Result<Transform>;

    /// Replace the current transform.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the platform call fails.
    fn set_transform(&mut self, transform: &Transform) -> Result<()>;

    /// Post-multiply a translation onto the current transform.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the platform call fails.
    fn translate(&mut self, x: f64, y: f64) -> Result<()>;

    /// Post-multiply a scale onto the current transform.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the platform call fails.
    fn scale(&mut self, x: f64, y: f64) -> Result<()>;
}

/// Saved transform that is written back to the surface when dropped.
///
/// Derefs to the wrapped surface, so callers keep drawing through it. The
/// restore runs on normal exit, on `?` early returns, and while unwinding.
pub struct TransformScope<'a, S: RenderSurface + ?Sized> {
    surface: &'a mut S,
    saved: Transform,
}

impl<'a, S: RenderSurface + ?Sized> TransformScope<'a, S> {
    /// Capture the surface's current transform.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the current transform cannot be read; nothing is
    /// captured in that case and nothing will be restored.
    pub fn enter(surface: &'a mut S) -> Result<Self> {
        let saved = surface.current_transform()?;
        Ok(Self { surface, saved })
    }

    /// The transform that will be restored on drop.
    #[must_use]
    pub fn saved(&self) -> Transform {
        self.saved
    }
}

impl<S: RenderSurface + ?Sized> Deref for TransformScope<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.surface
    }
}

impl<S: RenderSurface + ?Sized> DerefMut for TransformScope<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.surface
    }
}

impl<S: RenderSurface + ?Sized> Drop for TransformScope<'_, S> {
    fn drop(&mut self) {
        if let Err(err) = self.surface.set_transform(&self.saved) {
            log::warn!("failed to restore surface transform: {err}");
        }
    }
}

impl RenderSurface for CanvasRenderingContext2d {
    fn size(&self) -> Size {
        self.canvas()
            .map_or_else(Size::default, |c| Size::new(f64::from(c.width()), f64::from(c.height())))
    }

    fn current_transform(&self) -> Result<Transform> {
        let m = self.get_transform()?;
        Ok(Transform { a: m.a(), b: m.b(), c: m.c(), d: m.d(), e: m.e(), f: m.f() })
    }

    fn set_transform(&mut self, t: &Transform) -> Result<()> {
        CanvasRenderingContext2d::set_transform(self, t.a, t.b, t.c, t.d, t.e, t.f)?;
        Ok(())
    }

    fn translate(&mut self, x: f64, y: f64) -> Result<()> {
        CanvasRenderingContext2d::translate(self, x, y)?;
        Ok(())
    }

    fn scale(&mut self, x: f64, y: f64) -> Result<()> {
        CanvasRenderingContext2d::scale(self, x, y)?;
        Ok(())
    }
}
