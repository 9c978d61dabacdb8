//! Anchor resolution and the lazily recomputed position cache of drawables.

pub(crate) mod anchor;
pub(crate) mod position;
