//! In-process hosts
//!
//! [`StubHost`] is a scripted double for tests. [`Encounter`] is a small
//! cooldown and gauge model that lets the headless runner exercise the
//! engine without a game client.

pub mod encounter;
pub mod stub;

pub use encounter::Encounter;
pub use stub::StubHost;

use serde::{Deserialize, Serialize};

use crate::actions::catalog::Action;
use crate::core::clock::Timestamp;
use crate::core::types::TargetId;

/// One request seen by a host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    pub at: Timestamp,
    pub action: Action,
    pub target: TargetId,
    pub accepted: bool,
}
