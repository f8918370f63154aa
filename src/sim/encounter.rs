//! Training-dummy encounter
//!
//! Keeps just enough of the job's cooldowns, charges, procs and gauge to
//! answer the engine's questions believably. No damage is modelled. Call
//! [`Encounter::advance_to`] before each engine tick so cooldowns recover.

use ahash::{AHashMap, AHashSet};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

use crate::actions::catalog::{Action, SlotKind};
use crate::core::clock::{Clock, ManualClock, Timestamp};
use crate::core::config::EngineConfig;
use crate::core::types::{TargetHandle, TargetId};
use crate::engine::ports::{ActionInvoker, Charges, ReadinessOracle};
use crate::engine::target::TargetProvider;
use crate::gauge::{ComboReader, ComboSnapshot, GaugeReader, GaugeSnapshot};
use crate::sim::Invocation;

const COMBO_TIMEOUT: Duration = Duration::from_secs(30);
const OVERHEAT_DURATION: Duration = Duration::from_secs(10);
const OVERHEAT_STACKS: u32 = 5;
const HYPERCHARGE_COST: u32 = 50;
const AUTOMATON_MIN_BATTERY: u32 = 50;
/// Cooldown taken off both charge fillers by each overheated finisher
const FINISHER_CHARGE_REFUND: Duration = Duration::from_secs(15);

/// Recast timer with optional charges
#[derive(Debug, Clone)]
struct Cooldown {
    recast: Duration,
    max: u32,
    charges: u32,
    recharge_at: Timestamp,
}

impl Cooldown {
    fn new(recast_secs: u64, max: u32) -> Self {
        Self {
            recast: Duration::from_secs(recast_secs),
            max,
            charges: max,
            recharge_at: Timestamp::ZERO,
        }
    }

    fn refresh(&mut self, now: Timestamp) {
        while self.charges < self.max && now >= self.recharge_at {
            self.charges += 1;
            self.recharge_at = self.recharge_at + self.recast;
        }
    }

    fn spend(&mut self, now: Timestamp) {
        if self.charges == self.max {
            self.recharge_at = now + self.recast;
        }
        self.charges = self.charges.saturating_sub(1);
    }

    fn reduce(&mut self, by: Duration, now: Timestamp) {
        if self.charges < self.max {
            self.recharge_at = self.recharge_at.saturating_sub(by);
            self.refresh(now);
        }
    }
}

/// Simulated host for a single-target encounter
#[derive(Debug)]
pub struct Encounter {
    clock: ManualClock,
    rng: StdRng,
    reject_chance: f32,
    /// Level-synced upgrades replace their base actions
    upgrades: bool,
    recovery: Duration,
    cooldowns: AHashMap<Action, Cooldown>,
    procs: AHashSet<Action>,
    heat: u32,
    battery: u32,
    heat_cap: u32,
    battery_cap: u32,
    hypercharged: bool,
    overheat_stacks: u32,
    overheat_until: Timestamp,
    combo_last: Option<Action>,
    combo_expires: Timestamp,
    last_cast_locked: Option<Timestamp>,
    current: Option<TargetHandle>,
    candidates: Vec<TargetHandle>,
    history: Vec<Invocation>,
}

impl Encounter {
    pub fn new(clock: ManualClock, config: &EngineConfig, seed: u64) -> Self {
        let mut cooldowns = AHashMap::new();
        cooldowns.insert(Action::Drill, Cooldown::new(20, 2));
        cooldowns.insert(Action::AirAnchor, Cooldown::new(40, 1));
        cooldowns.insert(Action::ChainSaw, Cooldown::new(60, 1));
        cooldowns.insert(Action::GaussRound, Cooldown::new(30, 3));
        cooldowns.insert(Action::Ricochet, Cooldown::new(30, 3));
        cooldowns.insert(Action::Hypercharge, Cooldown::new(10, 1));
        cooldowns.insert(Action::Wildfire, Cooldown::new(120, 1));
        cooldowns.insert(Action::Reassemble, Cooldown::new(55, 2));
        cooldowns.insert(Action::BarrelStabilizer, Cooldown::new(120, 1));
        cooldowns.insert(Action::AutomatonQueen, Cooldown::new(6, 1));

        Self {
            clock,
            rng: StdRng::seed_from_u64(seed),
            reject_chance: 0.0,
            upgrades: true,
            recovery: config.timing.recovery(),
            cooldowns,
            procs: AHashSet::new(),
            heat: 0,
            battery: 0,
            heat_cap: config.thresholds.heat_cap,
            battery_cap: config.thresholds.battery_cap,
            hypercharged: false,
            overheat_stacks: 0,
            overheat_until: Timestamp::ZERO,
            combo_last: None,
            combo_expires: Timestamp::ZERO,
            last_cast_locked: None,
            current: None,
            candidates: vec![TargetHandle::enemy(0x4000_0001, "Striking Dummy", 3.0)],
            history: Vec::new(),
        }
    }

    /// Randomly refuse this share of otherwise valid requests
    pub fn with_reject_chance(mut self, chance: f32) -> Self {
        self.reject_chance = chance.clamp(0.0, 1.0);
        self
    }

    /// Play with base actions only (low level sync)
    pub fn without_upgrades(mut self) -> Self {
        self.upgrades = false;
        self
    }

    /// Start with the dummy already targeted
    pub fn with_target_selected(mut self) -> Self {
        self.current = self.candidates.first().cloned();
        self
    }

    pub fn history(&self) -> &[Invocation] {
        &self.history
    }

    /// Recover cooldowns and expire timed effects up to `now`
    pub fn advance_to(&mut self, now: Timestamp) {
        for cooldown in self.cooldowns.values_mut() {
            cooldown.refresh(now);
        }
        if self.overheat_stacks > 0 && now >= self.overheat_until {
            self.overheat_stacks = 0;
        }
        if self.combo_last.is_some() && now >= self.combo_expires {
            self.combo_last = None;
        }
    }

    fn unlocked(&self, action: Action) -> bool {
        match (action.upgrade(), action == action.base()) {
            // Base action that has an upgrade
            (Some(_), true) => !self.upgrades,
            // Upgraded form
            (None, false) => self.upgrades,
            _ => action != Action::QueenOverdrive,
        }
    }

    fn cooldown(&self, action: Action) -> Option<&Cooldown> {
        self.cooldowns.get(&action.base())
    }

    fn off_cooldown(&self, action: Action) -> bool {
        self.cooldown(action).map_or(true, |c| c.charges > 0)
    }

    fn add_heat(&mut self, amount: u32) {
        self.heat = (self.heat + amount).min(self.heat_cap);
    }

    fn add_battery(&mut self, amount: u32) {
        self.battery = (self.battery + amount).min(self.battery_cap);
    }

    fn spend(&mut self, action: Action, now: Timestamp) {
        if let Some(cooldown) = self.cooldowns.get_mut(&action.base()) {
            cooldown.spend(now);
        }
    }

    fn apply(&mut self, action: Action, now: Timestamp) {
        self.spend(action, now);
        match action {
            Action::HeatedSplitShot => {
                self.add_heat(5);
                self.combo_last = Some(action);
            }
            Action::HeatedSlugShot | Action::HeatedCleanShot => {
                let in_sequence = self.combo_last.and_then(|a| a.combo_follow_up()) == Some(action);
                if in_sequence {
                    self.add_heat(5);
                    if action == Action::HeatedCleanShot {
                        self.add_battery(10);
                    }
                    self.combo_last = Some(action);
                } else {
                    self.combo_last = None;
                }
            }
            Action::AirAnchor => self.add_battery(20),
            Action::ChainSaw => {
                self.add_battery(20);
                self.procs.insert(Action::Excavator);
            }
            Action::Excavator => {
                self.add_battery(20);
                self.procs.remove(&Action::Excavator);
            }
            Action::FullMetalField => {
                self.procs.remove(&Action::FullMetalField);
            }
            Action::BarrelStabilizer => {
                self.hypercharged = true;
                self.procs.insert(Action::FullMetalField);
            }
            Action::Hypercharge => {
                if self.hypercharged {
                    self.hypercharged = false;
                } else {
                    self.heat = self.heat.saturating_sub(HYPERCHARGE_COST);
                }
                self.overheat_stacks = OVERHEAT_STACKS;
                self.overheat_until = now + OVERHEAT_DURATION;
            }
            Action::HeatBlast | Action::BlazingShot => {
                self.overheat_stacks = self.overheat_stacks.saturating_sub(1);
                for filler in [Action::GaussRound, Action::Ricochet] {
                    if let Some(cooldown) = self.cooldowns.get_mut(&filler) {
                        cooldown.reduce(FINISHER_CHARGE_REFUND, now);
                    }
                }
            }
            Action::AutomatonQueen => self.battery = 0,
            _ => {}
        }
        if action.combo_step().is_some() {
            self.combo_expires = now + COMBO_TIMEOUT;
        }
    }
}

impl ReadinessOracle for Encounter {
    fn is_ready(&self, action: Action) -> bool {
        if !self.unlocked(action) || !self.off_cooldown(action) {
            return false;
        }
        match action {
            Action::Excavator | Action::FullMetalField => self.procs.contains(&action),
            Action::HeatBlast | Action::BlazingShot => self.overheat_stacks > 0,
            Action::Hypercharge => {
                self.overheat_stacks == 0 && (self.hypercharged || self.heat >= HYPERCHARGE_COST)
            }
            Action::AutomatonQueen => self.battery >= AUTOMATON_MIN_BATTERY,
            _ => true,
        }
    }

    fn charges(&self, action: Action) -> Option<Charges> {
        let cooldown = self.cooldown(action).filter(|c| c.max > 1)?;
        Some(Charges {
            current: cooldown.charges,
            max: cooldown.max,
        })
    }
}

impl ActionInvoker for Encounter {
    fn invoke(&mut self, action: Action, target: TargetId) -> bool {
        let now = self.clock.now();
        let on_target = self.current.as_ref().map(|t| t.id) == Some(target);
        let recovered = action.slot() == SlotKind::Instant
            || self
                .last_cast_locked
                .map_or(true, |at| now.since(at) >= self.recovery);

        let mut accepted = on_target && recovered && self.is_ready(action);
        if accepted && self.reject_chance > 0.0 && self.rng.gen::<f32>() < self.reject_chance {
            accepted = false;
        }

        if accepted {
            if action.slot() == SlotKind::CastLocked {
                self.last_cast_locked = Some(now);
            }
            self.apply(action, now);
        }
        self.history.push(Invocation {
            at: now,
            action,
            target,
            accepted,
        });
        accepted
    }
}

impl GaugeReader for Encounter {
    fn snapshot(&self) -> GaugeSnapshot {
        GaugeSnapshot::default()
            .with_heat(self.heat)
            .with_battery(self.battery)
            .overheated(self.overheat_stacks)
    }
}

impl ComboReader for Encounter {
    fn snapshot(&self) -> ComboSnapshot {
        match self.combo_last {
            Some(action) => ComboSnapshot::after(action),
            None => ComboSnapshot::default(),
        }
    }
}

impl TargetProvider for Encounter {
    fn current(&self) -> Option<TargetHandle> {
        self.current.clone()
    }

    fn nearest_hostile(&self) -> Option<TargetHandle> {
        self.candidates
            .iter()
            .filter(|c| c.is_valid(true))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
            .cloned()
    }

    fn set_current(&mut self, target: Option<TargetId>) {
        self.current = target.and_then(|id| self.candidates.iter().find(|c| c.id == id).cloned());
    }
}
