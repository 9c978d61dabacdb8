//! Time-keyed property animation.

pub(crate) mod ease;
pub(crate) mod scheduler;
