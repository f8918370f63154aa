//! Action definitions and catalog

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::core::error::RotationError;

/// Every action the engine knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    // Basic combo
    HeatedSplitShot,
    HeatedSlugShot,
    HeatedCleanShot,
    // Burst tools
    Drill,
    AirAnchor,
    ChainSaw,
    // Proc finishers
    Excavator,
    FullMetalField,
    // Special mode finishers
    HeatBlast,
    BlazingShot,
    // Charge fillers
    GaussRound,
    DoubleCheck,
    Ricochet,
    Checkmate,
    // Cooldowns
    Hypercharge,
    Wildfire,
    Reassemble,
    BarrelStabilizer,
    AutomatonQueen,
    QueenOverdrive,
}

/// Whether an action occupies the shared recovery timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotKind {
    CastLocked,
    Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionGroup {
    Combo,
    BurstTool,
    ProcFinisher,
    SpecialFinisher,
    ChargeFiller,
    ModeEntry,
    ModeBurst,
    PreBuff,
    ResourceGenerator,
    BatterySpender,
}

const ALL_ACTIONS: [Action; 20] = [
    Action::HeatedSplitShot,
    Action::HeatedSlugShot,
    Action::HeatedCleanShot,
    Action::Drill,
    Action::AirAnchor,
    Action::ChainSaw,
    Action::Excavator,
    Action::FullMetalField,
    Action::HeatBlast,
    Action::BlazingShot,
    Action::GaussRound,
    Action::DoubleCheck,
    Action::Ricochet,
    Action::Checkmate,
    Action::Hypercharge,
    Action::Wildfire,
    Action::Reassemble,
    Action::BarrelStabilizer,
    Action::AutomatonQueen,
    Action::QueenOverdrive,
];

/// The three-hit combo in order
pub const COMBO: [Action; 3] = [
    Action::HeatedSplitShot,
    Action::HeatedSlugShot,
    Action::HeatedCleanShot,
];

/// Burst tools in tool-priority order
pub const BURST_TOOLS: [Action; 3] = [Action::Drill, Action::AirAnchor, Action::ChainSaw];

impl Action {
    pub fn all() -> &'static [Action] {
        &ALL_ACTIONS
    }

    /// Numeric identifier used by the host
    pub fn id(&self) -> u32 {
        match self {
            Action::HeatedSplitShot => 7411,
            Action::HeatedSlugShot => 7412,
            Action::HeatedCleanShot => 7413,
            Action::Drill => 16498,
            Action::AirAnchor => 16500,
            Action::ChainSaw => 25788,
            Action::Excavator => 36981,
            Action::FullMetalField => 36982,
            Action::HeatBlast => 7410,
            Action::BlazingShot => 36978,
            Action::GaussRound => 2874,
            Action::DoubleCheck => 36979,
            Action::Ricochet => 2890,
            Action::Checkmate => 36980,
            Action::Hypercharge => 17209,
            Action::Wildfire => 2878,
            Action::Reassemble => 2876,
            Action::BarrelStabilizer => 7414,
            Action::AutomatonQueen => 2864,
            Action::QueenOverdrive => 16502,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::HeatedSplitShot => "Heated Split Shot",
            Action::HeatedSlugShot => "Heated Slug Shot",
            Action::HeatedCleanShot => "Heated Clean Shot",
            Action::Drill => "Drill",
            Action::AirAnchor => "Air Anchor",
            Action::ChainSaw => "Chain Saw",
            Action::Excavator => "Excavator",
            Action::FullMetalField => "Full Metal Field",
            Action::HeatBlast => "Heat Blast",
            Action::BlazingShot => "Blazing Shot",
            Action::GaussRound => "Gauss Round",
            Action::DoubleCheck => "Double Check",
            Action::Ricochet => "Ricochet",
            Action::Checkmate => "Checkmate",
            Action::Hypercharge => "Hypercharge",
            Action::Wildfire => "Wildfire",
            Action::Reassemble => "Reassemble",
            Action::BarrelStabilizer => "Barrel Stabilizer",
            Action::AutomatonQueen => "Automaton Queen",
            Action::QueenOverdrive => "Queen Overdrive",
        }
    }

    pub fn group(&self) -> ActionGroup {
        match self {
            Action::HeatedSplitShot | Action::HeatedSlugShot | Action::HeatedCleanShot => {
                ActionGroup::Combo
            }
            Action::Drill | Action::AirAnchor | Action::ChainSaw => ActionGroup::BurstTool,
            Action::Excavator | Action::FullMetalField => ActionGroup::ProcFinisher,
            Action::HeatBlast | Action::BlazingShot => ActionGroup::SpecialFinisher,
            Action::GaussRound | Action::DoubleCheck | Action::Ricochet | Action::Checkmate => {
                ActionGroup::ChargeFiller
            }
            Action::Hypercharge => ActionGroup::ModeEntry,
            Action::Wildfire => ActionGroup::ModeBurst,
            Action::Reassemble => ActionGroup::PreBuff,
            Action::BarrelStabilizer => ActionGroup::ResourceGenerator,
            Action::AutomatonQueen | Action::QueenOverdrive => ActionGroup::BatterySpender,
        }
    }

    pub fn slot(&self) -> SlotKind {
        match self.group() {
            ActionGroup::Combo
            | ActionGroup::BurstTool
            | ActionGroup::ProcFinisher
            | ActionGroup::SpecialFinisher => SlotKind::CastLocked,
            _ => SlotKind::Instant,
        }
    }

    pub fn is_instant(&self) -> bool {
        self.slot() == SlotKind::Instant
    }

    /// Actions forced off while burst is suppressed
    pub fn is_burst(&self) -> bool {
        matches!(
            self.group(),
            ActionGroup::BurstTool
                | ActionGroup::ProcFinisher
                | ActionGroup::ModeEntry
                | ActionGroup::ModeBurst
                | ActionGroup::PreBuff
                | ActionGroup::ResourceGenerator
        )
    }

    /// Upgraded form that replaces this action at higher levels
    pub fn upgrade(&self) -> Option<Action> {
        match self {
            Action::HeatBlast => Some(Action::BlazingShot),
            Action::GaussRound => Some(Action::DoubleCheck),
            Action::Ricochet => Some(Action::Checkmate),
            _ => None,
        }
    }

    /// The base action whose policy flag governs this one
    pub fn base(&self) -> Action {
        match self {
            Action::BlazingShot => Action::HeatBlast,
            Action::DoubleCheck => Action::GaussRound,
            Action::Checkmate => Action::Ricochet,
            other => *other,
        }
    }

    pub fn from_id(id: u32) -> Option<Action> {
        ALL_ACTIONS.iter().copied().find(|a| a.id() == id)
    }

    /// Parse a display name or identifier-style name
    ///
    /// Case, spaces, dashes and underscores are ignored, so "Air Anchor",
    /// "air_anchor" and "AirAnchor" all resolve to the same action.
    pub fn parse(name: &str) -> Option<Action> {
        let wanted = normalize(name);
        if wanted.is_empty() {
            return None;
        }
        ALL_ACTIONS
            .iter()
            .copied()
            .find(|a| normalize(a.name()) == wanted)
    }

    /// Position within the basic combo, if this is a combo action
    pub fn combo_step(&self) -> Option<u8> {
        COMBO.iter().position(|a| a == self).map(|i| i as u8)
    }

    /// Combo action that follows this one (the finisher wraps to the
    /// opener of the combo)
    pub fn combo_follow_up(&self) -> Option<Action> {
        self.combo_step()
            .map(|step| COMBO[(step as usize + 1) % COMBO.len()])
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Action {
    type Err = RotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::parse(s).ok_or_else(|| RotationError::UnknownAction(s.to_string()))
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let mut ids: Vec<u32> = Action::all().iter().map(|a| a.id()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), Action::all().len());
    }

    #[test]
    fn test_from_id_round_trips_catalog() {
        assert_eq!(Action::from_id(16498), Some(Action::Drill));
        assert_eq!(Action::from_id(7410), Some(Action::HeatBlast));
        assert_eq!(Action::from_id(1), None);
    }

    #[test]
    fn test_slot_kinds() {
        assert_eq!(Action::HeatBlast.slot(), SlotKind::CastLocked);
        assert_eq!(Action::AirAnchor.slot(), SlotKind::CastLocked);
        assert_eq!(Action::Hypercharge.slot(), SlotKind::Instant);
        assert_eq!(Action::Checkmate.slot(), SlotKind::Instant);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(Action::parse("Air Anchor"), Some(Action::AirAnchor));
        assert_eq!(Action::parse("air_anchor"), Some(Action::AirAnchor));
        assert_eq!(Action::parse("FULL-METAL-FIELD"), Some(Action::FullMetalField));
        assert_eq!(Action::parse("fireball"), None);
        assert_eq!(Action::parse(""), None);
    }

    #[test]
    fn test_from_str_reports_unknown() {
        assert_eq!("Chain Saw".parse::<Action>().ok(), Some(Action::ChainSaw));
        assert!(matches!(
            "fireball".parse::<Action>(),
            Err(RotationError::UnknownAction(name)) if name == "fireball"
        ));
    }

    #[test]
    fn test_combo_follow_up_wraps() {
        assert_eq!(
            Action::HeatedSplitShot.combo_follow_up(),
            Some(Action::HeatedSlugShot)
        );
        assert_eq!(
            Action::HeatedCleanShot.combo_follow_up(),
            Some(Action::HeatedSplitShot)
        );
        assert_eq!(Action::Drill.combo_follow_up(), None);
    }

    #[test]
    fn test_upgrades_share_base() {
        for action in Action::all() {
            if let Some(upgraded) = action.upgrade() {
                assert_eq!(upgraded.base(), *action);
                assert_eq!(upgraded.slot(), action.slot());
            }
        }
    }

    #[test]
    fn test_burst_classification() {
        assert!(Action::Drill.is_burst());
        assert!(Action::Hypercharge.is_burst());
        assert!(!Action::GaussRound.is_burst());
        assert!(!Action::HeatBlast.is_burst());
        assert!(!Action::HeatedSplitShot.is_burst());
    }
}
