use crate::driver::input::InputSnapshot;
use crate::events::capability::{Capabilities, Event};
use crate::foundation::core::IRect;
use crate::scene::command::Commands;
use crate::scene::node::NodeId;
use crate::viewport::Viewport;

/// User behavior attached to a node.
///
/// The declared [`capabilities`](Behavior::capabilities) are read once, when the node is
/// attached to a group, and decide which registries the node joins. Handlers never mutate the
/// scene directly; they push [`Commands`] that the stage applies after the current dispatch
/// or update pass.
pub trait Behavior: Send {
    /// Capabilities this behavior handles.
    fn capabilities(&self) -> Capabilities;

    /// Called for every routed event whose capability is declared.
    fn on_event(&mut self, _event: &Event, _ctx: &mut HandlerCtx<'_>) {}

    /// Called once per frame when [`Capabilities::UPDATE`] is declared.
    fn on_update(&mut self, _dt: f64, _ctx: &mut HandlerCtx<'_>) {}
}

/// Read-only view of the frame state plus the command queue, handed to handlers.
pub struct HandlerCtx<'a> {
    pub(crate) node: NodeId,
    pub(crate) now: f64,
    pub(crate) bounds: Option<IRect>,
    pub(crate) viewport: &'a Viewport,
    pub(crate) input: &'a InputSnapshot,
    pub(crate) commands: &'a mut Commands,
}

impl<'a> HandlerCtx<'a> {
    /// Node whose behavior is running.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Current frame time in seconds.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Absolute rectangle the node occupied when last laid out, if it is a visible drawable.
    pub fn bounds(&self) -> Option<IRect> {
        self.bounds
    }

    /// Viewport state.
    pub fn viewport(&self) -> &Viewport {
        self.viewport
    }

    /// Input snapshot for the current frame.
    pub fn input(&self) -> &InputSnapshot {
        self.input
    }

    /// Queue for deferred scene changes.
    pub fn commands(&mut self) -> &mut Commands {
        self.commands
    }
}
