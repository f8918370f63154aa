//! Per-action enable flags plus cross-cutting overrides
//!
//! The policy is owned by whatever configuration surface the host exposes.
//! The engine only ever reads a snapshot of it.

use serde::{Deserialize, Serialize};

use crate::actions::catalog::Action;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityPolicy {
    // Burst tools
    pub use_drill: bool,
    pub use_air_anchor: bool,
    pub use_chain_saw: bool,
    pub use_excavator: bool,
    pub use_full_metal_field: bool,

    // Buffs and resource cooldowns
    pub use_reassemble: bool,
    pub use_barrel_stabilizer: bool,
    pub use_automaton: bool,

    // Special mode window
    pub use_hypercharge: bool,
    pub use_heat_blast: bool,
    pub use_wildfire: bool,

    // Weave fillers
    pub use_gauss_round: bool,
    pub use_ricochet: bool,

    pub use_basic_combo: bool,

    /// Run the scripted opener when an engagement starts
    pub use_opener: bool,

    /// Forces every burst action off regardless of its own flag
    pub suppress_burst: bool,
}

impl Default for AbilityPolicy {
    fn default() -> Self {
        Self {
            use_drill: true,
            use_air_anchor: true,
            use_chain_saw: true,
            use_excavator: true,
            use_full_metal_field: true,
            use_reassemble: true,
            use_barrel_stabilizer: true,
            use_automaton: true,
            use_hypercharge: true,
            use_heat_blast: true,
            use_wildfire: true,
            use_gauss_round: true,
            use_ricochet: true,
            use_basic_combo: true,
            use_opener: true,
            suppress_burst: false,
        }
    }
}

impl AbilityPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Effective flag: overrides take precedence over the action's own flag
    pub fn is_enabled(&self, action: Action) -> bool {
        if self.suppress_burst && action.is_burst() {
            return false;
        }
        self.is_individually_enabled(action)
    }

    /// The action's own flag, ignoring overrides
    pub fn is_individually_enabled(&self, action: Action) -> bool {
        match self.flag(action) {
            Some(flag) => flag,
            // Not configurable: never selected by the engine anyway
            None => true,
        }
    }

    /// Set the flag governing `action`; returns false if it has none
    pub fn set(&mut self, action: Action, enabled: bool) -> bool {
        match self.flag_mut(action) {
            Some(flag) => {
                *flag = enabled;
                true
            }
            None => false,
        }
    }

    pub fn toggle_suppress_burst(&mut self) -> bool {
        self.suppress_burst = !self.suppress_burst;
        self.suppress_burst
    }

    /// Re-enable every action. Overrides and the opener flag are left alone.
    pub fn reset_to_defaults(&mut self) {
        let defaults = Self::default();
        *self = Self {
            use_opener: self.use_opener,
            suppress_burst: self.suppress_burst,
            ..defaults
        };
    }

    /// Actions currently forced off, for display
    pub fn disabled_actions(&self) -> Vec<Action> {
        Action::all()
            .iter()
            .copied()
            .filter(|a| !self.is_enabled(*a))
            .collect()
    }

    fn flag(&self, action: Action) -> Option<bool> {
        let flag = match action.base() {
            Action::Drill => self.use_drill,
            Action::AirAnchor => self.use_air_anchor,
            Action::ChainSaw => self.use_chain_saw,
            Action::Excavator => self.use_excavator,
            Action::FullMetalField => self.use_full_metal_field,
            Action::Reassemble => self.use_reassemble,
            Action::BarrelStabilizer => self.use_barrel_stabilizer,
            Action::AutomatonQueen => self.use_automaton,
            Action::Hypercharge => self.use_hypercharge,
            Action::HeatBlast => self.use_heat_blast,
            Action::Wildfire => self.use_wildfire,
            Action::GaussRound => self.use_gauss_round,
            Action::Ricochet => self.use_ricochet,
            Action::HeatedSplitShot | Action::HeatedSlugShot | Action::HeatedCleanShot => {
                self.use_basic_combo
            }
            _ => return None,
        };
        Some(flag)
    }

    fn flag_mut(&mut self, action: Action) -> Option<&mut bool> {
        let flag = match action.base() {
            Action::Drill => &mut self.use_drill,
            Action::AirAnchor => &mut self.use_air_anchor,
            Action::ChainSaw => &mut self.use_chain_saw,
            Action::Excavator => &mut self.use_excavator,
            Action::FullMetalField => &mut self.use_full_metal_field,
            Action::Reassemble => &mut self.use_reassemble,
            Action::BarrelStabilizer => &mut self.use_barrel_stabilizer,
            Action::AutomatonQueen => &mut self.use_automaton,
            Action::Hypercharge => &mut self.use_hypercharge,
            Action::HeatBlast => &mut self.use_heat_blast,
            Action::Wildfire => &mut self.use_wildfire,
            Action::GaussRound => &mut self.use_gauss_round,
            Action::Ricochet => &mut self.use_ricochet,
            Action::HeatedSplitShot | Action::HeatedSlugShot | Action::HeatedCleanShot => {
                &mut self.use_basic_combo
            }
            _ => return None,
        };
        Some(flag)
    }
}
