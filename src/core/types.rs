//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Identifier of a game object as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetId(pub u64);

impl std::fmt::Display for TargetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Read-only view of a candidate target supplied by the target provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetHandle {
    pub id: TargetId,
    pub name: String,
    /// Current hit points; zero means dead
    pub current_hp: u32,
    pub max_hp: u32,
    /// Whether the world allows this object to be targeted at all
    pub targetable: bool,
    /// Classified as an enemy by the host
    pub hostile: bool,
    /// Distance from the player, supplied by the host
    pub distance: f32,
}

impl TargetHandle {
    /// Convenience: a live, targetable enemy at the given distance
    pub fn enemy(id: u64, name: impl Into<String>, distance: f32) -> Self {
        Self {
            id: TargetId(id),
            name: name.into(),
            current_hp: 1000,
            max_hp: 1000,
            targetable: true,
            hostile: true,
            distance,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.current_hp > 0
    }

    pub fn hp_percent(&self) -> f32 {
        if self.max_hp == 0 {
            return 0.0;
        }
        self.current_hp as f32 / self.max_hp as f32 * 100.0
    }

    /// Alive, targetable and (when required) hostile
    pub fn is_valid(&self, require_hostile: bool) -> bool {
        self.is_alive() && self.targetable && (!require_hostile || self.hostile)
    }
}
