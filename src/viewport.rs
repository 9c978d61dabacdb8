use crate::foundation::core::{ISize, Point};
use crate::foundation::error::StageResult;

/// Current and design-time output size, plus the derived appropriate scale.
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
    size: ISize,
    default_size: ISize,
    scale: f64,
    recomputes: u32,
}

impl Viewport {
    /// Viewport at its design-time size (scale 1).
    pub fn new(default_size: ISize) -> StageResult<Self> {
        let default_size = ISize::non_empty(default_size.w, default_size.h)?;
        Ok(Self {
            size: default_size,
            default_size,
            scale: 1.0,
            recomputes: 0,
        })
    }

    /// `min(current.w / default.w, current.h / default.h)`.
    pub fn scale_for(current: ISize, default: ISize) -> f64 {
        let sx = f64::from(current.w) / f64::from(default.w);
        let sy = f64::from(current.h) / f64::from(default.h);
        sx.min(sy)
    }

    /// Apply a new output size and recompute the scale. Returns the new scale.
    pub fn resize(&mut self, size: ISize) -> StageResult<f64> {
        self.size = ISize::non_empty(size.w, size.h)?;
        self.scale = Self::scale_for(self.size, self.default_size);
        self.recomputes += 1;
        Ok(self.scale)
    }

    /// Current pixel size.
    pub fn size(&self) -> ISize {
        self.size
    }

    /// Design-time size.
    pub fn default_size(&self) -> ISize {
        self.default_size
    }

    /// Appropriate scale for size-dependent layout.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// How many times the scale has been recomputed.
    pub fn recompute_count(&self) -> u32 {
        self.recomputes
    }

    /// Map a point in viewport pixels back to design-time coordinates.
    pub fn to_design(&self, p: Point) -> Point {
        Point::new(p.x / self.scale, p.y / self.scale)
    }
}

#[cfg(test)]
#[path = "../tests/unit/viewport.rs"]
mod tests;
