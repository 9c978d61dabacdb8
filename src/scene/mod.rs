//! Arena-backed scene tree: groups, drawables and the deferred command queue.

pub(crate) mod command;
pub(crate) mod node;
pub(crate) mod tree;
