//! Per-tick rotation driver
//!
//! Owns the engine state, the timing tracker, the opener and the target
//! gate, and talks to the host only through [`Collaborators`]. Every call
//! to [`RotationEngine::tick`] makes at most one invocation attempt.

use crate::actions::catalog::Action;
use crate::actions::policy::AbilityPolicy;
use crate::core::clock::Timestamp;
use crate::core::config::EngineConfig;
use crate::core::types::TargetId;
use crate::engine::opener::{
    standard_opener, OpenerDecision, OpenerSequencer, OpenerState, OpenerStep,
};
use crate::engine::ports::Collaborators;
use crate::engine::selector::{RotationSelector, SelectorContext};
use crate::engine::state::{EngineMode, EngineState, EngineStatus};
use crate::engine::target::{TargetGate, TargetStatus};
use crate::engine::timing::TimingTracker;
use crate::gauge::GaugeSnapshot;

const WAITING_FOR_TARGET: &str = "Waiting for target...";

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Engine is stopped
    Disabled,
    /// Too soon after the previous evaluated tick
    Throttled,
    /// No usable target
    Blocked(TargetStatus),
    /// Oracle or invoker could not be reached; nothing changed
    CollaboratorUnavailable,
    /// Nothing applicable right now
    Waiting,
    /// Opener step passed over without acting
    Skipped(Action),
    Invoked(Action),
    /// The host refused the request
    Rejected(Action),
}

impl TickOutcome {
    pub fn invoked(&self) -> Option<Action> {
        match self {
            TickOutcome::Invoked(action) => Some(*action),
            _ => None,
        }
    }

    /// An invocation was attempted, accepted or not
    pub fn attempted(&self) -> bool {
        matches!(self, TickOutcome::Invoked(_) | TickOutcome::Rejected(_))
    }
}

pub struct RotationEngine {
    collab: Collaborators,
    config: EngineConfig,
    policy: AbilityPolicy,
    state: EngineState,
    timing: TimingTracker,
    opener: OpenerSequencer,
    gate: TargetGate,
    selector: RotationSelector,
    last_tick_at: Option<Timestamp>,
}

impl RotationEngine {
    /// Create a stopped engine using the standard opener
    ///
    /// The standard opener runs close to 30 seconds, well past the default
    /// 15 second `opener_ceiling`. Raise the ceiling (the shipped `default`
    /// profile sets 45) or pass a shorter script through
    /// [`RotationEngine::with_opener`], otherwise the opener is abandoned
    /// and the priority rotation takes over.
    pub fn new(collab: Collaborators, config: EngineConfig, policy: AbilityPolicy) -> Self {
        Self {
            timing: TimingTracker::new(&config.timing),
            opener: OpenerSequencer::new(standard_opener(), &config.timing),
            gate: TargetGate::new(config.targeting.require_hostile),
            selector: RotationSelector::new(),
            state: EngineState::new(),
            last_tick_at: None,
            collab,
            config,
            policy,
        }
    }

    /// Replace the opener script
    pub fn with_opener(mut self, steps: Vec<OpenerStep>) -> Self {
        self.opener = OpenerSequencer::new(steps, &self.config.timing);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn policy(&self) -> &AbilityPolicy {
        &self.policy
    }

    /// Swap in a new policy snapshot; takes effect on the next tick
    pub fn set_policy(&mut self, policy: AbilityPolicy) {
        self.policy = policy;
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn timing(&self) -> &TimingTracker {
        &self.timing
    }

    pub fn opener(&self) -> &OpenerSequencer {
        &self.opener
    }

    pub fn is_enabled(&self) -> bool {
        self.state.enabled
    }

    pub fn mode(&self) -> EngineMode {
        self.state.mode
    }

    /// Enable the engine with fresh timing so nothing starts locked out.
    /// Does nothing when already enabled, so a running opener is kept.
    pub fn start(&mut self) {
        if self.state.enabled {
            return;
        }
        self.state.enabled = true;
        self.state.mode = EngineMode::Running;
        self.state.reset_combat();
        self.state.status = "Running".to_string();
        self.timing.reset();
        self.last_tick_at = None;
        tracing::info!("Rotation started");
    }

    pub fn stop(&mut self) {
        self.state.enabled = false;
        self.state.mode = EngineMode::Idle;
        self.state.reset_combat();
        self.state.status = "Stopped".to_string();
        self.state.next_preview.clear();
        self.opener.reset();
        tracing::info!("Rotation stopped");
    }

    /// Arm the opener; returns false when the policy rules it out, in
    /// which case the engine goes straight to the priority rotation
    pub fn start_opener(&mut self) -> bool {
        if !self.state.enabled {
            self.start();
        }

        if !self.policy.use_opener || self.policy.suppress_burst {
            tracing::info!("Opener skipped by policy");
            self.opener.reset();
            self.state.mode = EngineMode::Running;
            self.state.status = "Running".to_string();
            return false;
        }

        let now = self.collab.clock.now();
        self.opener.start(now);
        self.state.combo_step = 0;
        if self.opener.is_active() {
            self.state.mode = EngineMode::Opener;
            self.state.status = "Opener Active".to_string();
            tracing::info!("Opener started ({} steps)", self.opener.total());
        } else {
            self.state.mode = EngineMode::Running;
            self.state.status = "Opener Complete - Running".to_string();
        }
        true
    }

    /// Drop out of the opener and clear per-engagement state
    pub fn reset_opener(&mut self) {
        self.opener.reset();
        self.state.reset_combat();
        if self.state.enabled {
            self.state.mode = EngineMode::Running;
            self.state.status = "Running".to_string();
        } else {
            self.state.mode = EngineMode::Idle;
            self.state.status = "Idle".to_string();
        }
    }

    /// Start the engine, pick up the nearest hostile and begin the opener
    pub fn engage(&mut self) -> TargetStatus {
        if !self.state.enabled {
            self.start();
        }
        let status = self.gate.acquire(self.collab.targets.as_mut(), true);
        self.start_opener();
        status
    }

    pub fn pause_targeting(&mut self) {
        self.gate.pause();
        tracing::info!("Targeting paused");
    }

    pub fn resume_targeting(&mut self) {
        self.gate.resume();
        tracing::info!("Targeting resumed");
    }

    pub fn tick(&mut self) -> TickOutcome {
        if !self.state.enabled {
            return TickOutcome::Disabled;
        }

        let now = self.collab.clock.now();
        if let Some(last) = self.last_tick_at {
            if now.since(last) < self.config.timing.tick_interval() {
                return TickOutcome::Throttled;
            }
        }

        if !self.collab.oracle.is_available() || !self.collab.invoker.is_available() {
            return TickOutcome::CollaboratorUnavailable;
        }
        self.last_tick_at = Some(now);

        let target = match self
            .gate
            .acquire(self.collab.targets.as_mut(), self.config.targeting.auto_acquire)
        {
            TargetStatus::Ready(id) => id,
            blocked => {
                if self.state.mode != EngineMode::Stalled {
                    tracing::debug!("Blocked: {}", blocked.label());
                }
                self.state.mode = EngineMode::Stalled;
                self.state.status = blocked.label().to_string();
                self.state.next_preview = WAITING_FOR_TARGET.to_string();
                return TickOutcome::Blocked(blocked);
            }
        };

        if self.state.mode == EngineMode::Stalled {
            if self.opener.is_active() {
                self.state.mode = EngineMode::Opener;
                self.state.status =
                    format!("Opener {}/{}", self.opener.step(), self.opener.total());
            } else {
                self.state.mode = EngineMode::Running;
                self.state.status = "Running".to_string();
            }
        }

        let gauge = self.collab.gauge.snapshot();
        self.state
            .sync_special_mode(&gauge, now, self.config.special_mode_window());

        if self.opener.is_active() {
            if let Some(outcome) = self.tick_opener(now, target) {
                return outcome;
            }
        }

        self.tick_rotation(now, target, &gauge)
    }

    /// Returns None once the opener hands control back this tick
    fn tick_opener(&mut self, now: Timestamp, target: TargetId) -> Option<TickOutcome> {
        let decision = self.opener.decide(
            now,
            &self.policy,
            self.collab.oracle.as_ref(),
            &self.timing,
        );

        let outcome = match decision {
            OpenerDecision::Inactive | OpenerDecision::Completed | OpenerDecision::Abandoned => {
                self.finish_opener();
                return None;
            }
            OpenerDecision::Skipped(action) | OpenerDecision::ForceAdvanced(action) => {
                TickOutcome::Skipped(action)
            }
            OpenerDecision::Waiting(action) => {
                self.state.next_preview = format!("[Opener] {}", action);
                TickOutcome::Waiting
            }
            OpenerDecision::Invoke(action) => {
                let accepted = self.invoke(action, target, now);
                self.opener.record_result(accepted);
                if accepted {
                    self.state.status =
                        format!("Opener {}/{}", self.opener.step(), self.opener.total());
                    tracing::info!("Opener step {}: {}", self.opener.step(), action);
                    TickOutcome::Invoked(action)
                } else {
                    TickOutcome::Rejected(action)
                }
            }
        };

        if !self.opener.is_active() {
            self.finish_opener();
        } else if let Some(step) = self.opener.current_step() {
            self.state.next_preview = format!("[Opener] {}", step.label);
        }
        Some(outcome)
    }

    fn finish_opener(&mut self) {
        if self.state.mode != EngineMode::Opener {
            return;
        }
        self.state.mode = EngineMode::Running;
        match self.opener.state() {
            OpenerState::Abandoned => {
                self.state.status = "Opener Abandoned - Running".to_string();
            }
            _ => {
                self.state.status = "Opener Complete - Running".to_string();
                tracing::info!("Opener completed, switching to rotation");
            }
        }
    }

    fn tick_rotation(
        &mut self,
        now: Timestamp,
        target: TargetId,
        gauge: &GaugeSnapshot,
    ) -> TickOutcome {
        let selection = self.selector.select(&self.context(now, gauge));

        let Some(selection) = selection else {
            self.state.next_preview = "Waiting...".to_string();
            return TickOutcome::Waiting;
        };

        self.state.next_preview = selection.action.name().to_string();
        if self.invoke(selection.action, target, now) {
            tracing::debug!(
                "Used {} ({:?}: {})",
                selection.action,
                selection.layer,
                selection.reason
            );
            TickOutcome::Invoked(selection.action)
        } else {
            TickOutcome::Rejected(selection.action)
        }
    }

    /// Single call into the invoker plus the bookkeeping for its answer
    fn invoke(&mut self, action: Action, target: TargetId, now: Timestamp) -> bool {
        let accepted = self.collab.invoker.invoke(action, target);
        if accepted {
            self.timing.record(action.slot(), now);
            self.state
                .record_success(action, now, self.config.special_mode_uses);
        } else {
            tracing::warn!("{} rejected by host (target {})", action, target);
            self.state.record_failure(action);
        }
        accepted
    }

    fn context<'a>(&'a self, now: Timestamp, gauge: &'a GaugeSnapshot) -> SelectorContext<'a> {
        SelectorContext {
            now,
            policy: &self.policy,
            config: &self.config,
            gauge,
            combo: self.collab.combo.as_ref().map(|reader| reader.snapshot()),
            timing: &self.timing,
            oracle: self.collab.oracle.as_ref(),
            state: &self.state,
        }
    }

    /// What the engine would do if it ticked right now
    pub fn next_action_preview(&self) -> String {
        if !self.state.enabled {
            return "Rotation disabled".to_string();
        }
        if let Some(step) = self.opener.current_step() {
            return format!("[Opener] {}", step.label);
        }
        let now = self.collab.clock.now();
        let gauge = self.collab.gauge.snapshot();
        match self.selector.select(&self.context(now, &gauge)) {
            Some(selection) => selection.action.name().to_string(),
            None => self.state.next_preview.clone(),
        }
    }

    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            enabled: self.state.enabled,
            mode: self.state.mode,
            status: self.state.status.clone(),
            next_action_preview: self.state.next_preview.clone(),
            last_action: self.state.last_invoked.clone(),
            is_in_opener: self.opener.is_active(),
            opener_progress: (self.opener.step(), self.opener.total()),
            combo_step: self.state.combo_step,
            special_mode_active: self.state.special_mode.active,
            special_mode_remaining: self.state.special_mode.remaining_uses,
        }
    }
}
