//! Engine state owned by the rotation driver

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::actions::catalog::{Action, ActionGroup, COMBO};
use crate::core::clock::Timestamp;
use crate::gauge::GaugeSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineMode {
    Idle,
    Opener,
    Running,
    /// Enabled but blocked (no usable target)
    Stalled,
}

/// Local mirror of the special mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpecialMode {
    pub active: bool,
    pub remaining_uses: u32,
    entered_at: Option<Timestamp>,
    /// The gauge has reported this mode at least once
    gauge_confirmed: bool,
}

impl SpecialMode {
    pub fn enter(&mut self, uses: u32, now: Timestamp) {
        self.active = uses > 0;
        self.remaining_uses = uses;
        self.entered_at = Some(now);
        self.gauge_confirmed = false;
    }

    pub fn is_gauge_confirmed(&self) -> bool {
        self.gauge_confirmed
    }

    /// Spend one finisher use; clears the mode at zero
    pub fn consume(&mut self) {
        self.remaining_uses = self.remaining_uses.saturating_sub(1);
        if self.remaining_uses == 0 {
            self.clear();
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone)]
pub struct EngineState {
    pub enabled: bool,
    pub mode: EngineMode,
    /// Position in the three-hit combo when self-tracked
    pub combo_step: u8,
    pub special_mode: SpecialMode,
    /// Pre-buff applied and waiting for a burst tool
    pub prebuff_armed: bool,
    pub status: String,
    pub last_invoked: String,
    pub next_preview: String,
}

impl Default for EngineState {
    fn default() -> Self {
        Self {
            enabled: false,
            mode: EngineMode::Idle,
            combo_step: 0,
            special_mode: SpecialMode::default(),
            prebuff_armed: false,
            status: "Idle".to_string(),
            last_invoked: String::new(),
            next_preview: String::new(),
        }
    }
}

impl EngineState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything tied to the current engagement
    pub fn reset_combat(&mut self) {
        self.combo_step = 0;
        self.special_mode.clear();
        self.prebuff_armed = false;
    }

    /// Next action of the self-tracked combo
    pub fn combo_action(&self) -> Action {
        COMBO[self.combo_step as usize % COMBO.len()]
    }

    /// Advance the tracked combo after a combo action lands
    pub fn update_combo(&mut self, action: Action) {
        self.combo_step = match action {
            Action::HeatedSplitShot => 1,
            Action::HeatedSlugShot => 2,
            Action::HeatedCleanShot => 0,
            _ => self.combo_step,
        };
    }

    /// Apply the bookkeeping of an accepted invocation
    pub fn record_success(&mut self, action: Action, now: Timestamp, special_uses: u32) {
        self.last_invoked = action.name().to_string();
        match action.group() {
            ActionGroup::Combo => self.update_combo(action),
            ActionGroup::ModeEntry => self.special_mode.enter(special_uses, now),
            ActionGroup::SpecialFinisher => self.special_mode.consume(),
            ActionGroup::PreBuff => self.prebuff_armed = true,
            ActionGroup::BurstTool => self.prebuff_armed = false,
            _ => {}
        }
    }

    /// A rejected combo hit past the first step means the chain broke
    pub fn record_failure(&mut self, action: Action) {
        if action.group() == ActionGroup::Combo && self.combo_step > 0 {
            tracing::debug!("Combo broke at step {}, restarting", self.combo_step);
            self.combo_step = 0;
        }
    }

    /// Reconcile the local special-mode mirror with the gauge
    ///
    /// The gauge wins whenever it reports the mode active, and a mode it
    /// has confirmed ends as soon as it reports the mode over. A
    /// self-entered mode the gauge never confirms expires after `window`.
    pub fn sync_special_mode(&mut self, gauge: &GaugeSnapshot, now: Timestamp, window: Duration) {
        if gauge.overheated && gauge.overheated_stacks > 0 {
            let mirror = &mut self.special_mode;
            if !mirror.active || mirror.remaining_uses != gauge.overheated_stacks {
                let entered_at = mirror.entered_at.unwrap_or(now);
                mirror.enter(gauge.overheated_stacks, entered_at);
            }
            mirror.gauge_confirmed = true;
            return;
        }

        if self.special_mode.active && self.special_mode.gauge_confirmed {
            tracing::debug!("Special mode ended on the gauge");
            self.special_mode.clear();
            return;
        }

        if let Some(entered_at) = self.special_mode.entered_at {
            if self.special_mode.active && now.since(entered_at) > window {
                tracing::debug!("Special mode mirror expired without gauge confirmation");
                self.special_mode.clear();
            }
        }
    }
}

/// Observability snapshot for UIs and reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineStatus {
    pub enabled: bool,
    pub mode: EngineMode,
    pub status: String,
    pub next_action_preview: String,
    pub last_action: String,
    pub is_in_opener: bool,
    pub opener_progress: (usize, usize),
    pub combo_step: u8,
    pub special_mode_active: bool,
    pub special_mode_remaining: u32,
}
