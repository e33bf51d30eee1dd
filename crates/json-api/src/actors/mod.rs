//! Caller identification.
//!
//! The authenticating gateway in front of this server resolves tokens and forwards the caller as
//! `X-Actor-Type` (`operator` or `company`) and `X-Actor-Uuid`. Routes check the role they need
//! through the depot helpers.

pub(crate) mod middleware;

pub(crate) const ACTOR_TYPE_HEADER: &str = "x-actor-type";
pub(crate) const ACTOR_UUID_HEADER: &str = "x-actor-uuid";
