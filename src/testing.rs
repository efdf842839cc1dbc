//! In-memory doubles shared by unit tests.

use crate::error::{Error, Result};
use crate::geom::{Size, Transform};
use crate::surface::RenderSurface;

/// One recorded transform-stack call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceOp {
    Set(Transform),
    Translate(f64, f64),
    Scale(f64, f64),
}

/// Surface that tracks its transform in memory and records every mutation.
#[derive(Debug, Default)]
pub struct MockSurface {
    pub size: Size,
    pub transform: Transform,
    pub ops: Vec<SurfaceOp>,
    /// Make `scale` fail, to exercise early-return restore paths.
    pub fail_scale: bool,
}

impl MockSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self { size: Size::new(width, height), ..Self::default() }
    }
}

impl RenderSurface for MockSurface {
    fn size(&self) -> Size {
        self.size
    }

    fn current_transform(&self) -> Result<Transform> {
        Ok(self.transform)
    }

    fn set_transform(&mut self, transform: &Transform) -> Result<()> {
        self.ops.push(SurfaceOp::Set(*transform));
        self.transform = *transform;
        Ok(())
    }

    fn translate(&mut self, x: f64, y: f64) -> Result<()> {
        self.ops.push(SurfaceOp::Translate(x, y));
        self.transform = self.transform.translate(x, y);
        Ok(())
    }

    fn scale(&mut self, x: f64, y: f64) -> Result<()> {
        if self.fail_scale {
            return Err(Error::Platform("scale rejected".to_owned()));
        }
        self.ops.push(SurfaceOp::Scale(x, y));
        self.transform = self.transform.scale(x, y);
        Ok(())
    }
}
