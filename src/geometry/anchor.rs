use crate::foundation::core::{IPoint, ISize};

/// Alignment along one axis.
///
/// The same enum describes both where a child's local offset `0` sits inside its parent
/// (the *origin*) and which part of the child's own box is aligned to that point (the
/// *draw bias*).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    /// Left / top.
    Start,
    /// Center.
    #[default]
    Middle,
    /// Right / bottom.
    End,
}

impl Anchor {
    /// All anchors in axis order.
    pub const ALL: [Anchor; 3] = [Anchor::Start, Anchor::Middle, Anchor::End];

    /// Offset of the origin point inside a parent extent of `len` pixels.
    pub fn origin_along(self, len: i32) -> i32 {
        match self {
            Self::Start => 0,
            Self::Middle => len / 2,
            Self::End => len,
        }
    }

    /// Offset applied to an object of extent `len` so that this part of it lands on the
    /// origin point.
    pub fn bias_along(self, len: i32) -> i32 {
        match self {
            Self::End => 0,
            Self::Middle => -(len / 2),
            Self::Start => -len,
        }
    }
}

/// Per-axis anchor pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct AnchorPair {
    /// Horizontal alignment.
    pub x: Anchor,
    /// Vertical alignment.
    pub y: Anchor,
}

impl AnchorPair {
    /// Centered on both axes.
    pub const CENTER: Self = Self {
        x: Anchor::Middle,
        y: Anchor::Middle,
    };

    /// Construct a pair.
    pub const fn new(x: Anchor, y: Anchor) -> Self {
        Self { x, y }
    }

    /// Origin point inside a parent of size `parent`.
    pub fn origin_in(self, parent: ISize) -> IPoint {
        IPoint::new(self.x.origin_along(parent.w), self.y.origin_along(parent.h))
    }

    /// Draw bias for an object of size `own`.
    pub fn bias_for(self, own: ISize) -> IPoint {
        IPoint::new(self.x.bias_along(own.w), self.y.bias_along(own.h))
    }
}

/// Absolute draw position of an object.
///
/// `parent_offset` is the cumulative absolute offset of the parent container.
pub fn resolve_draw_position(
    parent_offset: IPoint,
    parent_size: ISize,
    origin: AnchorPair,
    bias: AnchorPair,
    own_size: ISize,
    local: IPoint,
) -> IPoint {
    parent_offset + origin.origin_in(parent_size) + bias.bias_for(own_size) + local
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/anchor.rs"]
mod tests;
