//! Scripted opener
//!
//! Replays a fixed list of steps once per engagement. Two timeouts keep a
//! missing proc from wedging the agent:
//! - a single step that stays "not ready" past the stall timeout is
//!   force-advanced
//! - an opener running past its ceiling is abandoned outright

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::actions::catalog::{Action, SlotKind};
use crate::actions::policy::AbilityPolicy;
use crate::core::clock::Timestamp;
use crate::core::config::TimingConfig;
use crate::engine::ports::{first_ready, ReadinessOracle};
use crate::engine::timing::TimingTracker;

/// One scripted step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenerStep {
    pub action: Action,
    pub slot: SlotKind,
    pub label: String,
}

impl OpenerStep {
    pub fn new(action: Action, label: impl Into<String>) -> Self {
        Self {
            action,
            slot: action.slot(),
            label: label.into(),
        }
    }
}

/// Standard level 100 opener
pub fn standard_opener() -> Vec<OpenerStep> {
    use Action::*;
    let script: [(Action, &str); 29] = [
        (Reassemble, "Reassemble"),
        (AirAnchor, "Air Anchor"),
        (GaussRound, "Gauss Round"),
        (Ricochet, "Ricochet"),
        (Drill, "Drill"),
        (BarrelStabilizer, "Barrel Stabilizer"),
        (GaussRound, "Gauss Round"),
        (HeatedSplitShot, "Heated Split Shot"),
        (Ricochet, "Ricochet"),
        (HeatedSlugShot, "Heated Slug Shot"),
        (GaussRound, "Gauss Round"),
        (HeatedCleanShot, "Heated Clean Shot"),
        (Ricochet, "Ricochet"),
        (Reassemble, "Reassemble"),
        (ChainSaw, "Chain Saw"),
        (GaussRound, "Gauss Round"),
        (Ricochet, "Ricochet"),
        (Hypercharge, "Hypercharge"),
        (HeatBlast, "Heat Blast 1"),
        (Wildfire, "Wildfire"),
        (HeatBlast, "Heat Blast 2"),
        (GaussRound, "Gauss Round"),
        (HeatBlast, "Heat Blast 3"),
        (Ricochet, "Ricochet"),
        (HeatBlast, "Heat Blast 4"),
        (GaussRound, "Gauss Round"),
        (HeatBlast, "Heat Blast 5"),
        (Ricochet, "Ricochet"),
        (Drill, "Drill"),
    ];
    script
        .iter()
        .map(|(action, label)| OpenerStep::new(*action, *label))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpenerState {
    NotStarted,
    Active,
    Completed,
    Abandoned,
}

/// What the sequencer wants done this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenerDecision {
    /// Not running
    Inactive,
    /// Step disabled by policy; cursor moved on without acting
    Skipped(Action),
    /// Step stalled past the timeout; cursor moved on without acting
    ForceAdvanced(Action),
    /// Ceiling hit; hand over to the selector
    Abandoned,
    /// Every step done
    Completed,
    /// Step not ready yet, or its slot is still locked
    Waiting(Action),
    /// Invoke this action now
    Invoke(Action),
}

#[derive(Debug, Clone)]
pub struct OpenerSequencer {
    steps: Vec<OpenerStep>,
    cursor: usize,
    state: OpenerState,
    started_at: Option<Timestamp>,
    stalled_since: Option<Timestamp>,
    stall_timeout: Duration,
    ceiling: Duration,
}

impl OpenerSequencer {
    pub fn new(steps: Vec<OpenerStep>, timing: &TimingConfig) -> Self {
        Self {
            steps,
            cursor: 0,
            state: OpenerState::NotStarted,
            started_at: None,
            stalled_since: None,
            stall_timeout: timing.stall_timeout(),
            ceiling: timing.ceiling(),
        }
    }

    pub fn start(&mut self, now: Timestamp) {
        self.cursor = 0;
        self.stalled_since = None;
        self.started_at = Some(now);
        self.state = if self.steps.is_empty() {
            OpenerState::Completed
        } else {
            OpenerState::Active
        };
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
        self.stalled_since = None;
        self.started_at = None;
        self.state = OpenerState::NotStarted;
    }

    pub fn state(&self) -> OpenerState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == OpenerState::Active
    }

    /// Steps done so far (including skipped ones)
    pub fn step(&self) -> usize {
        self.cursor
    }

    pub fn total(&self) -> usize {
        self.steps.len()
    }

    pub fn current_step(&self) -> Option<&OpenerStep> {
        if self.is_active() {
            self.steps.get(self.cursor)
        } else {
            None
        }
    }

    pub fn steps(&self) -> &[OpenerStep] {
        &self.steps
    }

    /// Decide this tick's move; never invokes anything itself
    pub fn decide(
        &mut self,
        now: Timestamp,
        policy: &AbilityPolicy,
        oracle: &dyn ReadinessOracle,
        timing: &TimingTracker,
    ) -> OpenerDecision {
        if !self.is_active() {
            return match self.state {
                OpenerState::Completed => OpenerDecision::Completed,
                OpenerState::Abandoned => OpenerDecision::Abandoned,
                _ => OpenerDecision::Inactive,
            };
        }

        if let Some(started_at) = self.started_at {
            if now.since(started_at) >= self.ceiling {
                tracing::warn!(
                    "Opener abandoned at step {}/{} after {:.1}s",
                    self.cursor,
                    self.steps.len(),
                    now.since(started_at).as_secs_f32()
                );
                self.state = OpenerState::Abandoned;
                return OpenerDecision::Abandoned;
            }
        }

        let Some(step) = self.steps.get(self.cursor) else {
            self.state = OpenerState::Completed;
            return OpenerDecision::Completed;
        };
        let (action, slot) = (step.action, step.slot);

        if !policy.is_enabled(action) {
            tracing::debug!("Opener step {} ({}) disabled, skipping", self.cursor + 1, step.label);
            self.advance();
            return OpenerDecision::Skipped(action);
        }

        let Some(ready) = first_ready(oracle, action) else {
            let stalled_since = *self.stalled_since.get_or_insert(now);
            if now.since(stalled_since) >= self.stall_timeout {
                tracing::warn!(
                    "Opener step {} ({}) not ready for {:.1}s, moving on",
                    self.cursor + 1,
                    step.label,
                    now.since(stalled_since).as_secs_f32()
                );
                self.advance();
                return OpenerDecision::ForceAdvanced(action);
            }
            return OpenerDecision::Waiting(action);
        };

        if !timing.slot_ready(slot, now) {
            return OpenerDecision::Waiting(action);
        }

        OpenerDecision::Invoke(ready)
    }

    /// Report how the invocation went; only success moves the cursor
    pub fn record_result(&mut self, accepted: bool) {
        if accepted && self.is_active() {
            self.advance();
        }
    }

    fn advance(&mut self) {
        self.cursor += 1;
        self.stalled_since = None;
        if self.cursor >= self.steps.len() {
            self.state = OpenerState::Completed;
        }
    }
}
