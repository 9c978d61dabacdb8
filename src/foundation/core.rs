use crate::foundation::error::{StageError, StageResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Integer pixel position.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct IPoint {
    /// Horizontal coordinate in pixels.
    pub x: i32,
    /// Vertical coordinate in pixels.
    pub y: i32,
}

impl IPoint {
    /// The origin `(0, 0)`.
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Construct a point.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Component-wise saturating addition.
    pub fn offset(self, other: IPoint) -> Self {
        Self {
            x: self.x.saturating_add(other.x),
            y: self.y.saturating_add(other.y),
        }
    }
}

impl std::ops::Add for IPoint {
    type Output = IPoint;

    fn add(self, rhs: IPoint) -> IPoint {
        self.offset(rhs)
    }
}

/// Integer pixel extent.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ISize {
    /// Width in pixels.
    pub w: i32,
    /// Height in pixels.
    pub h: i32,
}

impl ISize {
    /// Zero-sized extent.
    pub const ZERO: Self = Self { w: 0, h: 0 };

    /// Construct an extent.
    pub const fn new(w: i32, h: i32) -> Self {
        Self { w, h }
    }

    /// Validated constructor for sizes that must cover at least one pixel.
    pub fn non_empty(w: i32, h: i32) -> StageResult<Self> {
        if w <= 0 || h <= 0 {
            return Err(StageError::validation(format!(
                "size must be positive, got {w}x{h}"
            )));
        }
        Ok(Self { w, h })
    }

    /// Return `true` when either dimension is zero or negative.
    pub fn is_empty(self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Multiply both dimensions by `factor`, flooring the result.
    pub fn scaled_floor(self, factor: f64) -> Self {
        Self {
            w: (f64::from(self.w) * factor).floor() as i32,
            h: (f64::from(self.h) * factor).floor() as i32,
        }
    }
}

/// Axis-aligned integer rectangle anchored at its top-left corner.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct IRect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub w: i32,
    /// Height in pixels.
    pub h: i32,
}

impl IRect {
    /// Construct a rectangle from its top-left corner and extent.
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Construct a rectangle from a corner point and a size.
    pub const fn from_origin_size(origin: IPoint, size: ISize) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            w: size.w,
            h: size.h,
        }
    }

    /// Top-left corner.
    pub fn origin(self) -> IPoint {
        IPoint::new(self.x, self.y)
    }

    /// Extent.
    pub fn size(self) -> ISize {
        ISize::new(self.w, self.h)
    }

    /// Exclusive right edge.
    pub fn right(self) -> i32 {
        self.x.saturating_add(self.w)
    }

    /// Exclusive bottom edge.
    pub fn bottom(self) -> i32 {
        self.y.saturating_add(self.h)
    }

    /// Return `true` when the rectangle covers no pixels.
    pub fn is_empty(self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Intersection of two rectangles; empty rectangles collapse to zero extent.
    pub fn intersect(self, other: IRect) -> IRect {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= x0 || y1 <= y0 {
            return IRect::new(x0, y0, 0, 0);
        }
        IRect::new(x0, y0, x1 - x0, y1 - y0)
    }

    /// Convert to a floating-point `kurbo` rectangle.
    pub fn to_kurbo(self) -> Rect {
        Rect::new(
            f64::from(self.x),
            f64::from(self.y),
            f64::from(self.right()),
            f64::from(self.bottom()),
        )
    }

    /// Return `true` when `p` lies inside the half-open rectangle.
    pub fn contains(self, p: Point) -> bool {
        !self.is_empty() && self.to_kurbo().contains(p)
    }
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Default for Rgba8 {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Rgba8 {
    /// Opaque white.
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::rgba(0, 0, 0, 255);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    /// Construct from straight channels.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from RGB channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Scale the alpha channel by a node opacity in `0..=255`.
    pub fn with_opacity(self, opacity: u8) -> Self {
        Self {
            a: mul_div255(self.a, opacity),
            ..self
        }
    }

    /// Premultiplied `[r, g, b, a]` bytes.
    pub fn to_premul(self) -> [u8; 4] {
        [
            mul_div255(self.r, self.a),
            mul_div255(self.g, self.a),
            mul_div255(self.b, self.a),
            self.a,
        ]
    }
}

/// Texture mirroring applied by the drawing surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flip {
    /// No mirroring.
    #[default]
    None,
    /// Mirror around the vertical axis.
    Horizontal,
    /// Mirror around the horizontal axis.
    Vertical,
    /// Mirror around both axes.
    Both,
}

impl Flip {
    /// Whether the horizontal axis is mirrored.
    pub fn flips_x(self) -> bool {
        matches!(self, Self::Horizontal | Self::Both)
    }

    /// Whether the vertical axis is mirrored.
    pub fn flips_y(self) -> bool {
        matches!(self, Self::Vertical | Self::Both)
    }
}

pub(crate) fn mul_div255(x: u8, y: u8) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
