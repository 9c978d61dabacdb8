pub(crate) mod blend;
pub(crate) mod cpu;
pub(crate) mod surface;
pub(crate) mod walker;
