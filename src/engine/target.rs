//! Target gate
//!
//! Decides whether the engine has something to shoot at this tick. Finding
//! candidates is the host's job; the gate only validates what the
//! [`TargetProvider`] reports and, when allowed, switches to the nearest
//! hostile.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

use crate::core::types::{TargetHandle, TargetId};

/// Host-side view of the current target and nearby candidates
pub trait TargetProvider {
    fn current(&self) -> Option<TargetHandle>;

    /// Nearest candidate that qualifies as a hostile target
    fn nearest_hostile(&self) -> Option<TargetHandle>;

    fn set_current(&mut self, target: Option<TargetId>);
}

impl<T: TargetProvider> TargetProvider for Rc<RefCell<T>> {
    fn current(&self) -> Option<TargetHandle> {
        self.borrow().current()
    }

    fn nearest_hostile(&self) -> Option<TargetHandle> {
        self.borrow().nearest_hostile()
    }

    fn set_current(&mut self, target: Option<TargetId>) {
        self.borrow_mut().set_current(target)
    }
}

/// Outcome of a target check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetStatus {
    Ready(TargetId),
    /// Manually paused until resumed
    Paused,
    NoTarget,
    Dead,
    Untargetable,
    NotHostile,
}

impl TargetStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, TargetStatus::Ready(_))
    }

    pub fn target(&self) -> Option<TargetId> {
        match self {
            TargetStatus::Ready(id) => Some(*id),
            _ => None,
        }
    }

    /// Status line shown while blocked
    pub fn label(&self) -> &'static str {
        match self {
            TargetStatus::Ready(_) => "Target Ready",
            TargetStatus::Paused => "Targeting paused",
            TargetStatus::NoTarget => "No Target",
            TargetStatus::Dead => "Target Dead",
            TargetStatus::Untargetable => "Target Untargetable",
            TargetStatus::NotHostile => "Target Not Hostile",
        }
    }

    fn of(handle: Option<&TargetHandle>, require_hostile: bool) -> TargetStatus {
        match handle {
            None => TargetStatus::NoTarget,
            Some(t) if !t.is_alive() => TargetStatus::Dead,
            Some(t) if !t.targetable => TargetStatus::Untargetable,
            Some(t) if require_hostile && !t.hostile => TargetStatus::NotHostile,
            Some(t) => TargetStatus::Ready(t.id),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TargetGate {
    paused: bool,
    require_hostile: bool,
}

impl TargetGate {
    pub fn new(require_hostile: bool) -> Self {
        Self {
            paused: false,
            require_hostile,
        }
    }

    /// Latch targeting off; only [`TargetGate::resume`] clears it
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Validate the current target, acquiring the nearest hostile when it
    /// is unusable and auto-acquire is allowed
    pub fn acquire(
        &mut self,
        provider: &mut dyn TargetProvider,
        allow_auto_acquire: bool,
    ) -> TargetStatus {
        if self.paused {
            return TargetStatus::Paused;
        }

        let current = provider.current();
        let status = TargetStatus::of(current.as_ref(), self.require_hostile);
        if status.is_ready() || !allow_auto_acquire {
            return status;
        }

        match provider
            .nearest_hostile()
            .filter(|c| c.is_valid(self.require_hostile))
        {
            Some(candidate) => {
                tracing::info!(
                    "Acquired target {} ({}) at {:.1}y",
                    candidate.name,
                    candidate.id,
                    candidate.distance
                );
                provider.set_current(Some(candidate.id));
                TargetStatus::Ready(candidate.id)
            }
            None => status,
        }
    }

    /// True when the engine may act this tick
    pub fn ensure_target(
        &mut self,
        provider: &mut dyn TargetProvider,
        allow_auto_acquire: bool,
    ) -> bool {
        self.acquire(provider, allow_auto_acquire).is_ready()
    }
}
