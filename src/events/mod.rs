//! Capability-keyed event routing.
//!
//! Every group keeps one ordered registry per [`Capabilities`](crate::Capabilities) flag. Membership is decided
//! once, when a child is attached, from the capability set its [`Behavior`](crate::Behavior) declares; dispatch
//! only visits registered members, in attach order.

pub(crate) mod capability;
pub(crate) mod handler;
pub(crate) mod router;
