#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use crate::consts::FILL_FACTOR;
use crate::error::{Error, Result};
use crate::geom::{Point, Rect, Size, Transform};
use crate::surface::{RenderSurface, TransformScope};

/// 2D camera centered on a world-space point.
///
/// `window_size` is the surface size in logical pixels, `position` is the
/// world point drawn at the center of the surface, and `scale` is the
/// world-to-screen multiplier (1.0 = no zoom).
///
/// The render transform is always
/// `translate(window_size / 2) · scale(scale) · translate(-position)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub window_size: Size,
    pub position: Point,
    pub scale: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { window_size: Size::default(), position: Point::ZERO, scale: 1.0 }
    }
}

impl Camera {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the current viewport size. Call once per frame before using
    /// `fit_to`, `fill_to` or any conversion.
    pub fn update(&mut self, window_size: Size) {
        self.window_size = window_size;
    }

    pub fn move_to(&mut self, point: Point) {
        self.position = point;
    }

    /// Center on `rect` at the largest scale that keeps all of it visible.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DegenerateRect`] if `rect` has no width or height, or
    /// [`Error::DegenerateViewport`] if [`Self::update`] has not set a
    /// non-empty window size; the camera is left unchanged.
    pub fn fit_to(&mut self, rect: &Rect) -> Result<()> {
        self.check_divisors(rect)?;
        self.move_to(rect.center());
        self.scale = (self.window_size.width / rect.width).min(self.window_size.height / rect.height);
        Ok(())
    }

    /// Center on `rect` and zoom in past it so it overflows the viewport.
    ///
    /// Note the ratios pair window width with rect height (and vice versa)
    /// before applying [`FILL_FACTOR`]; this is not a plain cover fit.
    ///
    /// # Errors
    ///
    /// Same as [`Self::fit_to`].
    pub fn fill_to(&mut self, rect: &Rect) -> Result<()> {
        self.check_divisors(rect)?;
        self.move_to(rect.center());
        self.scale =
            (self.window_size.width / rect.height).max(self.window_size.height / rect.width) * FILL_FACTOR;
        Ok(())
    }

    /// Convert a screen-space point to integer world coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DegenerateScale`] if `scale` is zero, subnormal or not finite.
    pub fn screen_to_world(&self, screen: Point) -> Result<Point> {
        if !self.scale.is_normal() {
            return Err(Error::DegenerateScale(self.scale));
        }
        let half = self.window_size.center();
        let world = Point {
            x: (screen.x - half.x) / self.scale + self.position.x,
            y: (screen.y - half.y) / self.scale + self.position.y,
        };
        Ok(world.round())
    }

    /// Convert a world-space point to screen coordinates (unrounded).
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        self.transform().apply(world)
    }

    /// The render transform as a value.
    #[must_use]
    pub fn transform(&self) -> Transform {
        let half = self.window_size.center();
        Transform::IDENTITY
            .translate(half.x, half.y)
            .scale(self.scale, self.scale)
            .translate(-self.position.x, -self.position.y)
    }

    /// Run `draw` with the camera transform applied to `surface`.
    ///
    /// The surface's prior transform is read first and written back when the
    /// scope ends, including when a transform call fails or `draw` panics.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the surface rejects reading or changing its transform.
    pub fn draw<S, R, F>(&self, surface: &mut S, draw: F) -> Result<R>
    where
        S: RenderSurface + ?Sized,
        F: FnOnce(&mut S) -> R,
    {
        let half = self.window_size.center();
        let mut scope = TransformScope::enter(surface)?;
        scope.translate(half.x, half.y)?;
        scope.scale(self.scale, self.scale)?;
        scope.translate(-self.position.x, -self.position.y)?;
        Ok(draw(&mut *scope))
    }

    fn check_divisors(&self, rect: &Rect) -> Result<()> {
        if rect.is_degenerate() {
            return Err(Error::DegenerateRect { width: rect.width, height: rect.height });
        }
        let Size { width, height } = self.window_size;
        if Rect::new(0.0, 0.0, width, height).is_degenerate() {
            return Err(Error::DegenerateViewport { width, height });
        }
        Ok(())
    }
}
