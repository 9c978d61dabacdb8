pub(crate) mod clock;
pub(crate) mod frame;
pub(crate) mod input;
pub(crate) mod pacing;
