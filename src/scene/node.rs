use std::fmt;

use smallvec::SmallVec;

use crate::animation::scheduler::AnimationId;
use crate::events::capability::Capabilities;
use crate::events::handler::Behavior;
use crate::events::router::EventRegistry;
use crate::foundation::core::{Flip, IPoint, IRect, ISize, Rgba8};
use crate::geometry::anchor::AnchorPair;
use crate::geometry::position::{PositionState, SizeSpec};
use crate::render::surface::{Texture, TextureSource};

/// Handle to a node in a [`Scene`](crate::Scene).
///
/// Carries a slot index and a generation counter so stale handles are detected after the
/// node is destroyed and its slot reused.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

impl NodeId {
    /// Raw slot index, for diagnostics.
    pub fn index(self) -> u32 {
        self.idx
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}@gen{})", self.idx, self.generation)
    }
}

/// Attachment and resource state of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    /// Not part of any group.
    Detached,
    /// Attached, backing resources not loaded.
    Inactive,
    /// Attached to the running tree with resources loaded.
    Active,
}

/// What a drawable paints.
#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    /// Solid rectangle.
    Rect {
        /// Fill color; node opacity further scales its alpha.
        color: Rgba8,
    },
    /// Textured quad.
    Sprite {
        /// Texture to load on prepare.
        source: TextureSource,
        /// Sub-rectangle of the texture; whole texture when `None`.
        src_rect: Option<IRect>,
        /// Clockwise rotation in degrees about the quad center.
        rotation_deg: f64,
        /// Mirroring.
        flip: Flip,
    },
}

pub(crate) struct GroupData {
    pub(crate) children: Vec<NodeId>,
    pub(crate) registry: EventRegistry,
    pub(crate) local: IPoint,
    pub(crate) size: Option<ISize>,
    pub(crate) clip: bool,
}

pub(crate) struct DrawableData {
    pub(crate) position: PositionState,
    pub(crate) paint: Paint,
    pub(crate) texture: Option<Texture>,
}

pub(crate) enum NodeKind {
    Group(GroupData),
    Drawable(DrawableData),
}

/// A scene node: either a group that owns ordered children, or a drawable leaf.
///
/// Build nodes with [`Node::group`], [`Node::rect`] or [`Node::sprite`], then insert them
/// with [`Stage::create`](crate::Stage::create).
pub struct Node {
    pub(crate) name: Option<String>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) lifecycle: Lifecycle,
    pub(crate) hidden: bool,
    pub(crate) ignore_events: bool,
    pub(crate) opacity: u8,
    pub(crate) capabilities: Capabilities,
    pub(crate) behavior: Option<Box<dyn Behavior>>,
    pub(crate) animations: SmallVec<[AnimationId; 2]>,
    pub(crate) last_rect: Option<IRect>,
    pub(crate) kind: NodeKind,
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("lifecycle", &self.lifecycle)
            .field("group", &self.is_group())
            .field("hidden", &self.hidden)
            .field("opacity", &self.opacity)
            .finish_non_exhaustive()
    }
}

impl Node {
    fn with_kind(kind: NodeKind) -> Self {
        Self {
            name: None,
            parent: None,
            lifecycle: Lifecycle::Detached,
            hidden: false,
            ignore_events: false,
            opacity: 255,
            capabilities: Capabilities::empty(),
            behavior: None,
            animations: SmallVec::new(),
            last_rect: None,
            kind,
        }
    }

    /// Group that takes its parent's extent.
    pub fn group() -> Self {
        Self::with_kind(NodeKind::Group(GroupData {
            children: Vec::new(),
            registry: EventRegistry::default(),
            local: IPoint::ZERO,
            size: None,
            clip: false,
        }))
    }

    /// Group with an explicit extent, which its children anchor against.
    pub fn group_sized(size: ISize) -> Self {
        let mut node = Self::group();
        if let NodeKind::Group(g) = &mut node.kind {
            g.size = Some(size);
        }
        node
    }

    /// Solid rectangle.
    pub fn rect(size: SizeSpec, color: Rgba8) -> Self {
        Self::with_kind(NodeKind::Drawable(DrawableData {
            position: PositionState::new(IPoint::ZERO, size),
            paint: Paint::Rect { color },
            texture: None,
        }))
    }

    /// Textured sprite. Its texture is loaded when the node is prepared.
    pub fn sprite(source: TextureSource, size: SizeSpec) -> Self {
        Self::with_kind(NodeKind::Drawable(DrawableData {
            position: PositionState::new(IPoint::ZERO, size),
            paint: Paint::Sprite {
                source,
                src_rect: None,
                rotation_deg: 0.0,
                flip: Flip::None,
            },
            texture: None,
        }))
    }

    /// Attach a diagnostic name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the local offset.
    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.set_local(IPoint::new(x, y));
        self
    }

    /// Set origin and draw-bias anchors. Groups ignore anchors.
    pub fn anchored(mut self, origin: AnchorPair, bias: AnchorPair) -> Self {
        if let NodeKind::Drawable(d) = &mut self.kind {
            d.position.set_anchors(origin, bias);
        }
        self
    }

    /// Set opacity.
    pub fn with_opacity(mut self, opacity: u8) -> Self {
        self.opacity = opacity;
        self
    }

    /// Start hidden.
    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Opt out of event delivery.
    pub fn ignoring_events(mut self, ignore: bool) -> Self {
        self.ignore_events = ignore;
        self
    }

    /// Clip children to the group's bounds. Only meaningful on sized groups.
    pub fn clipped(mut self) -> Self {
        if let NodeKind::Group(g) = &mut self.kind {
            g.clip = true;
        }
        self
    }

    /// Restrict a sprite to a sub-rectangle of its texture.
    pub fn with_src_rect(mut self, rect: IRect) -> Self {
        if let NodeKind::Drawable(DrawableData {
            paint: Paint::Sprite { src_rect, .. },
            ..
        }) = &mut self.kind
        {
            *src_rect = Some(rect);
        }
        self
    }

    /// Rotate a sprite clockwise about its center.
    pub fn rotated(mut self, degrees: f64) -> Self {
        if let NodeKind::Drawable(DrawableData {
            paint: Paint::Sprite { rotation_deg, .. },
            ..
        }) = &mut self.kind
        {
            *rotation_deg = degrees;
        }
        self
    }

    /// Mirror a sprite.
    pub fn flipped(mut self, flip: Flip) -> Self {
        if let NodeKind::Drawable(DrawableData {
            paint: Paint::Sprite { flip: f, .. },
            ..
        }) = &mut self.kind
        {
            *f = flip;
        }
        self
    }

    /// Attach a behavior. Its capabilities are captured now and used at attach time.
    pub fn with_behavior(mut self, behavior: impl Behavior + 'static) -> Self {
        self.capabilities = behavior.capabilities();
        self.behavior = Some(Box::new(behavior));
        self
    }

    /// Diagnostic name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Owning group, if attached.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Attachment state.
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Whether this node is a group.
    pub fn is_group(&self) -> bool {
        matches!(self.kind, NodeKind::Group(_))
    }

    /// Whether drawing skips this node and its subtree.
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Whether event delivery skips this node and its subtree.
    pub fn ignores_events(&self) -> bool {
        self.ignore_events
    }

    /// Opacity in `0..=255`.
    pub fn opacity(&self) -> u8 {
        self.opacity
    }

    /// Capabilities declared by this node's behavior.
    ///
    /// Groups join every registry of their parent regardless, so events reach their children.
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Animations currently in flight on this node.
    pub fn animations(&self) -> &[AnimationId] {
        &self.animations
    }

    /// Local offset relative to the node's origin.
    pub fn local_position(&self) -> IPoint {
        match &self.kind {
            NodeKind::Group(g) => g.local,
            NodeKind::Drawable(d) => d.position.local(),
        }
    }

    /// Absolute rectangle from the last layout pass; `None` for groups and hidden nodes.
    pub fn last_rect(&self) -> Option<IRect> {
        self.last_rect
    }

    /// Ordered children of a group; empty for drawables.
    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Group(g) => &g.children,
            NodeKind::Drawable(_) => &[],
        }
    }

    /// Paint of a drawable.
    pub fn paint(&self) -> Option<&Paint> {
        match &self.kind {
            NodeKind::Group(_) => None,
            NodeKind::Drawable(d) => Some(&d.paint),
        }
    }

    /// Loaded texture of an active sprite.
    pub fn texture(&self) -> Option<Texture> {
        match &self.kind {
            NodeKind::Group(_) => None,
            NodeKind::Drawable(d) => d.texture,
        }
    }

    /// Cached geometry of a drawable.
    pub fn position_state(&self) -> Option<&PositionState> {
        match &self.kind {
            NodeKind::Group(_) => None,
            NodeKind::Drawable(d) => Some(&d.position),
        }
    }

    pub(crate) fn set_local(&mut self, local: IPoint) {
        match &mut self.kind {
            NodeKind::Group(g) => g.local = local,
            NodeKind::Drawable(d) => d.position.set_local(local),
        }
    }

    pub(crate) fn group_data(&self) -> Option<&GroupData> {
        match &self.kind {
            NodeKind::Group(g) => Some(g),
            NodeKind::Drawable(_) => None,
        }
    }

    pub(crate) fn group_data_mut(&mut self) -> Option<&mut GroupData> {
        match &mut self.kind {
            NodeKind::Group(g) => Some(g),
            NodeKind::Drawable(_) => None,
        }
    }

    pub(crate) fn drawable_data_mut(&mut self) -> Option<&mut DrawableData> {
        match &mut self.kind {
            NodeKind::Group(_) => None,
            NodeKind::Drawable(d) => Some(d),
        }
    }

    /// Capabilities this node joins registries with.
    pub(crate) fn registry_capabilities(&self) -> Capabilities {
        if self.is_group() {
            Capabilities::all()
        } else {
            self.capabilities
        }
    }
}
