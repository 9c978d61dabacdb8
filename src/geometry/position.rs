use crate::foundation::core::{IPoint, IRect, ISize};
use crate::geometry::anchor::AnchorPair;

/// How a drawable determines its own extent.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeSpec {
    /// Fixed pixel size, independent of the viewport.
    Fixed(ISize),
    /// Design-time size multiplied by the viewport's appropriate scale (floored).
    Scaled(ISize),
    /// Natural size of the node's loaded texture, multiplied by `scale`.
    Texture {
        /// Multiplier applied to the texture dimensions.
        scale: f64,
    },
}

impl Default for SizeSpec {
    fn default() -> Self {
        Self::Fixed(ISize::ZERO)
    }
}

impl SizeSpec {
    /// Whether the resolved size depends on the viewport scale.
    pub fn depends_on_scale(self) -> bool {
        matches!(self, Self::Scaled(_))
    }

    pub(crate) fn resolve(self, viewport_scale: f64, texture: Option<ISize>) -> ISize {
        match self {
            Self::Fixed(s) => s,
            Self::Scaled(s) => s.scaled_floor(viewport_scale),
            Self::Texture { scale } => texture.unwrap_or(ISize::ZERO).scaled_floor(scale),
        }
    }
}

/// Lazily recomputed geometry of one drawable.
///
/// Three independent invalidation bits are resolved in the fixed order
/// origin → size → draw position. Moving a node only dirties the draw position, so the
/// size term is not recomputed.
#[derive(Clone, Debug)]
pub struct PositionState {
    local: IPoint,
    origin_anchor: AnchorPair,
    bias_anchor: AnchorPair,
    size_spec: SizeSpec,

    origin: IPoint,
    size: ISize,
    bias: IPoint,
    draw: IPoint,

    origin_dirty: bool,
    size_dirty: bool,
    draw_dirty: bool,

    recomputes: Recomputes,
}

/// Counters of how often each cached term was recomputed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Recomputes {
    /// Origin recomputations.
    pub origin: u32,
    /// Size recomputations.
    pub size: u32,
    /// Draw-position recomputations.
    pub draw: u32,
}

impl Default for PositionState {
    fn default() -> Self {
        Self::new(IPoint::ZERO, SizeSpec::default())
    }
}

impl PositionState {
    /// New state with every cached term dirty.
    pub fn new(local: IPoint, size_spec: SizeSpec) -> Self {
        Self {
            local,
            origin_anchor: AnchorPair::CENTER,
            bias_anchor: AnchorPair::CENTER,
            size_spec,
            origin: IPoint::ZERO,
            size: ISize::ZERO,
            bias: IPoint::ZERO,
            draw: IPoint::ZERO,
            origin_dirty: true,
            size_dirty: true,
            draw_dirty: true,
            recomputes: Recomputes::default(),
        }
    }

    /// Local offset relative to the origin point.
    pub fn local(&self) -> IPoint {
        self.local
    }

    /// Origin anchor.
    pub fn origin_anchor(&self) -> AnchorPair {
        self.origin_anchor
    }

    /// Draw-bias anchor.
    pub fn bias_anchor(&self) -> AnchorPair {
        self.bias_anchor
    }

    /// Size specification.
    pub fn size_spec(&self) -> SizeSpec {
        self.size_spec
    }

    /// Recompute counters, for diagnostics.
    pub fn recomputes(&self) -> Recomputes {
        self.recomputes
    }

    /// `(origin, size, draw_position)` dirty bits.
    pub fn dirty_bits(&self) -> (bool, bool, bool) {
        (self.origin_dirty, self.size_dirty, self.draw_dirty)
    }

    /// Move the local offset. Only the draw position is invalidated.
    pub fn set_local(&mut self, local: IPoint) {
        if self.local != local {
            self.local = local;
            self.draw_dirty = true;
        }
    }

    /// Replace both anchors. The origin is invalidated, and the size term too because the
    /// draw bias is derived alongside it.
    pub fn set_anchors(&mut self, origin: AnchorPair, bias: AnchorPair) {
        self.origin_anchor = origin;
        self.bias_anchor = bias;
        self.origin_dirty = true;
        self.size_dirty = true;
    }

    /// Replace the size specification.
    pub fn set_size_spec(&mut self, spec: SizeSpec) {
        self.size_spec = spec;
        self.size_dirty = true;
    }

    /// The parent's extent changed.
    pub fn invalidate_origin(&mut self) {
        self.origin_dirty = true;
    }

    /// The viewport scale or the backing texture changed.
    pub fn invalidate_size(&mut self) {
        self.size_dirty = true;
    }

    /// Viewport scale changed; only scale-dependent sizes are invalidated.
    pub fn invalidate_scale(&mut self) {
        if self.size_spec.depends_on_scale() {
            self.size_dirty = true;
        }
    }

    /// Resolve the origin term from the parent's extent.
    pub fn resolve_origin(&mut self, parent: ISize) {
        if self.origin_dirty {
            self.origin = self.origin_anchor.origin_in(parent);
            self.origin_dirty = false;
            self.draw_dirty = true;
            self.recomputes.origin += 1;
        }
    }

    /// Resolve the own-size term and the draw bias derived from it.
    pub fn resolve_size(&mut self, viewport_scale: f64, texture: Option<ISize>) {
        if self.size_dirty {
            self.size = self.size_spec.resolve(viewport_scale, texture);
            self.bias = self.bias_anchor.bias_for(self.size);
            self.size_dirty = false;
            self.draw_dirty = true;
            self.recomputes.size += 1;
        }
    }

    /// Resolve the draw position relative to the parent's cumulative offset.
    pub fn resolve_draw_position(&mut self) {
        if self.draw_dirty {
            self.draw = self.origin + self.bias + self.local;
            self.draw_dirty = false;
            self.recomputes.draw += 1;
        }
    }

    /// Resolve every dirty term in dependency order and return the rectangle relative to
    /// the parent's cumulative offset.
    pub fn resolve(&mut self, parent: ISize, viewport_scale: f64, texture: Option<ISize>) -> IRect {
        self.resolve_origin(parent);
        self.resolve_size(viewport_scale, texture);
        self.resolve_draw_position();
        IRect::from_origin_size(self.draw, self.size)
    }

    /// Last resolved size. Stale while the size bit is dirty.
    pub fn cached_size(&self) -> ISize {
        self.size
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/position.rs"]
mod tests;
