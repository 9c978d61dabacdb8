//! stagecraft is a retained-mode scene-graph compositor with a coupled animation scheduler.
//!
//! A [`Stage`] owns a tree of [`Node`]s: groups that own ordered children and drawables that
//! paint a rectangle or a texture. Each frame the [`FrameDriver`] runs:
//!
//! 1. **Dispatch**: platform [`Event`]s fan out to nodes that declared the matching
//!    [`Capabilities`] through per-group registries.
//! 2. **Update**: the [`Animator`] advances movement and opacity animations, then
//!    [`Behavior::on_update`] runs for every node in the update registry.
//! 3. **Draw**: a pre-order walk resolves anchored positions and issues calls against a
//!    [`Surface`].
//! 4. **Present**.
//!
//! Handlers never mutate the tree directly; they queue [`Commands`] that the stage applies
//! once the current pass is over.
//!
//! [`CpuSurface`] is a headless reference surface that renders to premultiplied RGBA8, which
//! makes scenes testable pixel by pixel.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod animation;
mod config;
mod description;
mod driver;
mod events;
mod foundation;
mod geometry;
mod render;
mod scene;
mod stage;
mod viewport;

pub use animation::ease::Ease;
pub use animation::scheduler::{
    AnimatedProperty, AnimationId, AnimationRequest, AnimationState, AnimationTarget, Animator,
    CompletionFn, PropertyValue,
};
pub use config::{PacingSettings, StageConfig};
pub use description::{AnimationDesc, NodeDesc, NodeKindDesc, SceneDescription};
pub use driver::clock::{Clock, ManualClock, SystemClock};
pub use driver::frame::{FrameDriver, FrameOutcome};
pub use driver::input::{InputSnapshot, InputSource, NoInput, ScriptedInput};
pub use driver::pacing::{DEFAULT_FRAME_INTERVAL, FramePacer, PacingConfig, Poll};
pub use events::capability::{Capabilities, Event, KeyCode, MouseButton};
pub use events::handler::{Behavior, HandlerCtx};
pub use foundation::core::{Affine, Flip, IPoint, IRect, ISize, Point, Rect, Rgba8, Vec2};
pub use foundation::error::{StageError, StageResult};
pub use geometry::anchor::{Anchor, AnchorPair, resolve_draw_position};
pub use geometry::position::{PositionState, Recomputes, SizeSpec};
pub use render::cpu::{CpuSurface, FrameRGBA};
pub use render::surface::{Surface, Texture, TextureId, TextureSource};
pub use render::walker::{DrawList, DrawOp, compile_draw_list, execute_draw_list};
pub use scene::command::{Command, Commands};
pub use scene::node::{Lifecycle, Node, NodeId, Paint};
pub use scene::tree::Scene;
pub use stage::Stage;
pub use viewport::Viewport;
