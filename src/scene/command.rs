use crate::animation::scheduler::{AnimationId, AnimationRequest};
use crate::foundation::core::IPoint;
use crate::scene::node::NodeId;

/// Deferred scene change, queued by handlers and completion callbacks.
#[derive(Debug)]
pub enum Command {
    /// Attach `child` as the last child of `parent`.
    Attach {
        /// Receiving group.
        parent: NodeId,
        /// Detached node.
        child: NodeId,
    },
    /// Release and detach `child` from `parent`.
    Detach {
        /// Owning group.
        parent: NodeId,
        /// Child to remove.
        child: NodeId,
    },
    /// Release and free a whole subtree.
    Destroy(NodeId),
    /// Move a node's local offset.
    SetPosition(NodeId, IPoint),
    /// Change a node's opacity.
    SetOpacity(NodeId, u8),
    /// Hide or show a node and its subtree.
    SetHidden(NodeId, bool),
    /// Opt a node (and its subtree) out of event delivery.
    SetIgnoreEvents(NodeId, bool),
    /// Schedule an animation.
    Animate(AnimationRequest),
    /// Cancel one animation.
    Cancel(AnimationId),
    /// Cancel every animation on a node.
    CancelAll(NodeId),
    /// Ask the frame driver to stop after the current frame.
    Quit,
}

/// FIFO of [`Command`]s applied by the stage once the current pass is over.
#[derive(Debug, Default)]
pub struct Commands {
    queue: Vec<Command>,
}

impl Commands {
    /// Empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an arbitrary command.
    pub fn push(&mut self, cmd: Command) {
        self.queue.push(cmd);
    }

    /// Queue an attach.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.push(Command::Attach { parent, child });
    }

    /// Queue a detach.
    pub fn detach(&mut self, parent: NodeId, child: NodeId) {
        self.push(Command::Detach { parent, child });
    }

    /// Queue a subtree destruction.
    pub fn destroy(&mut self, node: NodeId) {
        self.push(Command::Destroy(node));
    }

    /// Queue a move.
    pub fn set_position(&mut self, node: NodeId, position: IPoint) {
        self.push(Command::SetPosition(node, position));
    }

    /// Queue an opacity change.
    pub fn set_opacity(&mut self, node: NodeId, opacity: u8) {
        self.push(Command::SetOpacity(node, opacity));
    }

    /// Queue a visibility change.
    pub fn set_hidden(&mut self, node: NodeId, hidden: bool) {
        self.push(Command::SetHidden(node, hidden));
    }

    /// Queue an animation.
    pub fn animate(&mut self, request: AnimationRequest) {
        self.push(Command::Animate(request));
    }

    /// Queue an exit request.
    pub fn quit(&mut self) {
        self.push(Command::Quit);
    }

    /// Number of queued commands.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Return `true` when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Append every command of `other`, preserving order.
    pub fn extend(&mut self, other: Commands) {
        self.queue.extend(other.queue);
    }

    /// Take every queued command in FIFO order.
    pub fn drain(&mut self) -> impl Iterator<Item = Command> + '_ {
        self.queue.drain(..)
    }

    pub(crate) fn take(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.queue)
    }
}
