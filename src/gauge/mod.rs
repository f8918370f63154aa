//! Job gauge and combo state as reported by the host
//!
//! Raw memory parsing lives in host adapters. The engine only sees these
//! value objects.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

use crate::actions::catalog::Action;

/// Resource levels at one instant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GaugeSnapshot {
    /// Resource A: spent to enter the special mode
    pub heat: u32,
    /// Resource B: spent to summon the automaton
    pub battery: u32,
    /// Special mode ("overheated") is active
    pub overheated: bool,
    /// Finisher uses left in the special mode
    pub overheated_stacks: u32,
}

impl GaugeSnapshot {
    pub fn with_heat(mut self, heat: u32) -> Self {
        self.heat = heat;
        self
    }

    pub fn with_battery(mut self, battery: u32) -> Self {
        self.battery = battery;
        self
    }

    pub fn overheated(mut self, stacks: u32) -> Self {
        self.overheated = stacks > 0;
        self.overheated_stacks = stacks;
        self
    }
}

/// Combo timer state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboSnapshot {
    pub timer_active: bool,
    /// Numeric id of the last combo action, 0 when none
    pub last_action_id: u32,
}

impl ComboSnapshot {
    pub fn after(action: Action) -> Self {
        Self {
            timer_active: true,
            last_action_id: action.id(),
        }
    }

    pub fn last_action(&self) -> Option<Action> {
        Action::from_id(self.last_action_id)
    }

    /// Combo action to continue with, if the combo is still live
    pub fn next_action(&self) -> Option<Action> {
        if !self.timer_active {
            return None;
        }
        self.last_action().and_then(|a| a.combo_follow_up())
    }
}

pub trait GaugeReader {
    fn snapshot(&self) -> GaugeSnapshot;
}

pub trait ComboReader {
    fn snapshot(&self) -> ComboSnapshot;
}

impl<T: GaugeReader> GaugeReader for Rc<RefCell<T>> {
    fn snapshot(&self) -> GaugeSnapshot {
        self.borrow().snapshot()
    }
}

impl<T: ComboReader> ComboReader for Rc<RefCell<T>> {
    fn snapshot(&self) -> ComboSnapshot {
        self.borrow().snapshot()
    }
}
