//! Priority-ordered action selection
//!
//! Walks the layered ladder once per tick and names at most one action.
//! Invocation and bookkeeping stay with the driver.

use serde::{Deserialize, Serialize};

use crate::actions::catalog::{Action, BURST_TOOLS};
use crate::actions::policy::AbilityPolicy;
use crate::core::clock::Timestamp;
use crate::core::config::EngineConfig;
use crate::engine::ports::{first_ready, ReadinessOracle};
use crate::engine::state::EngineState;
use crate::engine::timing::TimingTracker;
use crate::gauge::{ComboSnapshot, GaugeSnapshot};

/// Ladder layer an action was picked from, highest priority first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PriorityLayer {
    SpecialFinisher = 1,
    WeaveFiller = 2,
    ProcFinisher = 3,
    BurstTool = 4,
    BasicCombo = 5,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub action: Action,
    pub layer: PriorityLayer,
    pub reason: &'static str,
}

impl Selection {
    fn new(action: Action, layer: PriorityLayer, reason: &'static str) -> Self {
        Self {
            action,
            layer,
            reason,
        }
    }
}

/// Everything the selector reads during one tick
pub struct SelectorContext<'a> {
    pub now: Timestamp,
    pub policy: &'a AbilityPolicy,
    pub config: &'a EngineConfig,
    pub gauge: &'a GaugeSnapshot,
    /// None when the combo is self-tracked
    pub combo: Option<ComboSnapshot>,
    pub timing: &'a TimingTracker,
    pub oracle: &'a dyn ReadinessOracle,
    pub state: &'a EngineState,
}

impl<'a> SelectorContext<'a> {
    /// Ready form of `action` if the policy allows it
    fn usable(&self, action: Action) -> Option<Action> {
        if !self.policy.is_enabled(action) {
            return None;
        }
        first_ready(self.oracle, action)
    }

    fn special_active(&self) -> bool {
        self.state.special_mode.active
    }

    fn cast_locked_ready(&self) -> bool {
        self.timing.cast_locked_ready(self.now)
    }

    /// First enabled burst tool that is ready, in tool order
    fn ready_tool(&self) -> Option<Action> {
        BURST_TOOLS.iter().copied().find_map(|tool| self.usable(tool))
    }

    /// Charges held by a filler family, summed over base and upgrade
    fn family_charges(&self, base: Action) -> Option<u32> {
        let base_charges = self.oracle.charges(base);
        let upgrade_charges = base.upgrade().and_then(|u| self.oracle.charges(u));
        match (base_charges, upgrade_charges) {
            (None, None) => None,
            (a, b) => Some(a.map_or(0, |c| c.current).max(b.map_or(0, |c| c.current))),
        }
    }
}

/// Stateless ladder evaluator
#[derive(Debug, Clone, Copy, Default)]
pub struct RotationSelector;

impl RotationSelector {
    pub fn new() -> Self {
        Self
    }

    /// Pick this tick's action, or None when nothing applies
    pub fn select(&self, ctx: &SelectorContext) -> Option<Selection> {
        let selection = self
            .special_finisher(ctx)
            .or_else(|| self.weave_filler(ctx))
            .or_else(|| self.proc_finisher(ctx))
            .or_else(|| self.burst_tool(ctx))
            .or_else(|| self.basic_combo(ctx));

        if let Some(selection) = &selection {
            tracing::trace!(
                "Selected {} from layer {:?} ({})",
                selection.action,
                selection.layer,
                selection.reason
            );
        }
        selection
    }

    fn special_finisher(&self, ctx: &SelectorContext) -> Option<Selection> {
        if !ctx.special_active() || !ctx.cast_locked_ready() {
            return None;
        }
        ctx.usable(Action::HeatBlast)
            .map(|a| Selection::new(a, PriorityLayer::SpecialFinisher, "special mode finisher"))
    }

    fn weave_filler(&self, ctx: &SelectorContext) -> Option<Selection> {
        if !ctx.timing.can_weave(ctx.now) {
            return None;
        }
        let weave = |action: Action, reason: &'static str| {
            Some(Selection::new(action, PriorityLayer::WeaveFiller, reason))
        };
        let thresholds = &ctx.config.thresholds;
        let special = ctx.special_active();

        // Heat about to cap: spend it even with burst suppressed
        if !special
            && ctx.gauge.heat >= thresholds.heat_must_spend
            && ctx.policy.is_individually_enabled(Action::Hypercharge)
            && ctx.oracle.is_ready(Action::Hypercharge)
        {
            return weave(Action::Hypercharge, "heat at must-spend");
        }

        if let Some(action) = ctx.usable(Action::BarrelStabilizer) {
            return weave(action, "resource generator");
        }

        if !ctx.state.prebuff_armed && !special && ctx.ready_tool().is_some() {
            if let Some(action) = ctx.usable(Action::Reassemble) {
                return weave(action, "pre-buff before burst tool");
            }
        }

        if !special && ctx.gauge.heat >= thresholds.heat_may_spend {
            if let Some(action) = ctx.usable(Action::Hypercharge) {
                return weave(action, "heat at may-spend");
            }
        }

        if special {
            if let Some(action) = ctx.usable(Action::Wildfire) {
                return weave(action, "burst paired with special mode");
            }
        }

        if ctx.oracle.is_ready(Action::AutomatonQueen)
            && ctx.policy.is_individually_enabled(Action::AutomatonQueen)
        {
            let battery = ctx.gauge.battery;
            if battery >= thresholds.battery_must_spend {
                return weave(Action::AutomatonQueen, "battery at must-spend");
            }
            if battery >= thresholds.battery_may_spend && !ctx.policy.suppress_burst {
                return weave(Action::AutomatonQueen, "battery at may-spend");
            }
        }

        self.charge_filler(ctx)
            .map(|a| Selection::new(a, PriorityLayer::WeaveFiller, "charge filler"))
    }

    /// Drain the fuller charge family first so neither sits at its cap
    fn charge_filler(&self, ctx: &SelectorContext) -> Option<Action> {
        let mut families = [Action::GaussRound, Action::Ricochet];
        if let (Some(gauss), Some(ricochet)) = (
            ctx.family_charges(Action::GaussRound),
            ctx.family_charges(Action::Ricochet),
        ) {
            if ricochet > gauss {
                families.swap(0, 1);
            }
        }
        families.iter().copied().find_map(|family| ctx.usable(family))
    }

    fn proc_finisher(&self, ctx: &SelectorContext) -> Option<Selection> {
        if !ctx.cast_locked_ready() {
            return None;
        }
        [Action::Excavator, Action::FullMetalField]
            .iter()
            .copied()
            .find_map(|a| ctx.usable(a))
            .map(|a| Selection::new(a, PriorityLayer::ProcFinisher, "proc finisher"))
    }

    fn burst_tool(&self, ctx: &SelectorContext) -> Option<Selection> {
        if !ctx.cast_locked_ready() {
            return None;
        }
        let tool = ctx.ready_tool()?;

        // Pre-buff goes out right before the tool it empowers
        if !ctx.state.prebuff_armed
            && !ctx.special_active()
            && ctx.timing.instant_ready(ctx.now)
        {
            if let Some(prebuff) = ctx.usable(Action::Reassemble) {
                return Some(Selection::new(
                    prebuff,
                    PriorityLayer::BurstTool,
                    "pre-buff before burst tool",
                ));
            }
        }

        Some(Selection::new(tool, PriorityLayer::BurstTool, "burst tool"))
    }

    fn basic_combo(&self, ctx: &SelectorContext) -> Option<Selection> {
        if !ctx.cast_locked_ready() {
            return None;
        }
        let action = match ctx.combo {
            Some(combo) => combo.next_action().unwrap_or(Action::HeatedSplitShot),
            None => ctx.state.combo_action(),
        };
        ctx.usable(action)
            .map(|a| Selection::new(a, PriorityLayer::BasicCombo, "basic combo"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::catalog::SlotKind;
    use crate::engine::ports::Charges;
    use ahash::{AHashMap, AHashSet};

    #[derive(Default)]
    struct Oracle {
        ready: AHashSet<Action>,
        charges: AHashMap<Action, Charges>,
    }

    impl Oracle {
        fn with(actions: &[Action]) -> Self {
            Self {
                ready: actions.iter().copied().collect(),
                charges: AHashMap::new(),
            }
        }
    }

    impl ReadinessOracle for Oracle {
        fn is_ready(&self, action: Action) -> bool {
            self.ready.contains(&action)
        }

        fn charges(&self, action: Action) -> Option<Charges> {
            self.charges.get(&action).copied()
        }
    }

    struct Fixture {
        policy: AbilityPolicy,
        config: EngineConfig,
        gauge: GaugeSnapshot,
        combo: Option<ComboSnapshot>,
        timing: TimingTracker,
        state: EngineState,
        now: Timestamp,
    }

    impl Fixture {
        /// Fresh fixture: nothing cast yet, so cast-locked actions are free
        /// and the weave window is closed
        fn fresh() -> Self {
            let config = EngineConfig::default();
            Self {
                policy: AbilityPolicy::default(),
                timing: TimingTracker::new(&config.timing),
                config,
                gauge: GaugeSnapshot::default(),
                combo: None,
                state: EngineState::new(),
                now: Timestamp::from_millis(10_000),
            }
        }

        /// One second after a cast-locked action: inside the weave window
        fn weaving() -> Self {
            let mut fixture = Self::fresh();
            fixture
                .timing
                .record(SlotKind::CastLocked, Timestamp::from_millis(9_000));
            fixture
        }

        fn select(&self, oracle: &Oracle) -> Option<Selection> {
            let ctx = SelectorContext {
                now: self.now,
                policy: &self.policy,
                config: &self.config,
                gauge: &self.gauge,
                combo: self.combo,
                timing: &self.timing,
                oracle,
                state: &self.state,
            };
            RotationSelector::new().select(&ctx)
        }

        fn pick(&self, oracle: &Oracle) -> Option<Action> {
            self.select(oracle).map(|s| s.action)
        }
    }

    #[test]
    fn test_nothing_ready_selects_nothing() {
        let fixture = Fixture::fresh();
        assert_eq!(fixture.select(&Oracle::default()), None);
    }

    #[test]
    fn test_combo_starts_at_first_step() {
        let fixture = Fixture::fresh();
        let oracle = Oracle::with(&crate::actions::catalog::COMBO);
        assert_eq!(fixture.pick(&oracle), Some(Action::HeatedSplitShot));
    }

    #[test]
    fn test_combo_follows_reported_timer() {
        let mut fixture = Fixture::fresh();
        fixture.combo = Some(ComboSnapshot::after(Action::HeatedSlugShot));
        let oracle = Oracle::with(&crate::actions::catalog::COMBO);
        assert_eq!(fixture.pick(&oracle), Some(Action::HeatedCleanShot));

        fixture.combo = Some(ComboSnapshot::default());
        assert_eq!(fixture.pick(&oracle), Some(Action::HeatedSplitShot));
    }

    #[test]
    fn test_burst_tool_beats_combo() {
        let fixture = Fixture::fresh();
        let oracle = Oracle::with(&[Action::HeatedSplitShot, Action::AirAnchor, Action::ChainSaw]);
        let selection = fixture.select(&oracle);
        assert_eq!(selection.map(|s| s.action), Some(Action::AirAnchor));
        assert_eq!(selection.map(|s| s.layer), Some(PriorityLayer::BurstTool));
    }

    #[test]
    fn test_prebuff_spent_before_tool() {
        let mut fixture = Fixture::fresh();
        let oracle = Oracle::with(&[Action::Drill, Action::Reassemble]);
        assert_eq!(fixture.pick(&oracle), Some(Action::Reassemble));

        fixture.state.prebuff_armed = true;
        assert_eq!(fixture.pick(&oracle), Some(Action::Drill));
    }

    #[test]
    fn test_proc_finisher_beats_burst_tool() {
        let fixture = Fixture::fresh();
        let oracle = Oracle::with(&[Action::Drill, Action::FullMetalField]);
        assert_eq!(fixture.pick(&oracle), Some(Action::FullMetalField));
    }

    #[test]
    fn test_special_finisher_first_and_upgrade_used() {
        let mut fixture = Fixture::fresh();
        fixture.state.special_mode.enter(5, fixture.now);
        let oracle = Oracle::with(&[Action::BlazingShot, Action::Excavator, Action::Drill]);
        let selection = fixture.select(&oracle);
        assert_eq!(selection.map(|s| s.action), Some(Action::BlazingShot));
        assert_eq!(selection.map(|s| s.layer), Some(PriorityLayer::SpecialFinisher));
    }

    #[test]
    fn test_cast_locked_layers_wait_for_recovery() {
        let fixture = Fixture::weaving();
        let oracle = Oracle::with(&[Action::Drill, Action::HeatedSplitShot]);
        assert_eq!(fixture.pick(&oracle), None);
    }

    #[test]
    fn test_weave_order_generator_before_prebuff() {
        let fixture = Fixture::weaving();
        let oracle = Oracle::with(&[
            Action::BarrelStabilizer,
            Action::Reassemble,
            Action::Drill,
            Action::GaussRound,
        ]);
        assert_eq!(fixture.pick(&oracle), Some(Action::BarrelStabilizer));
    }

    #[test]
    fn test_must_spend_heat_ignores_suppression() {
        let mut fixture = Fixture::weaving();
        fixture.gauge = GaugeSnapshot::default().with_heat(100);
        fixture.policy.suppress_burst = true;
        let oracle = Oracle::with(&[Action::Hypercharge, Action::BarrelStabilizer]);
        let selection = fixture.select(&oracle);
        assert_eq!(selection.map(|s| s.action), Some(Action::Hypercharge));
        assert_eq!(selection.map(|s| s.reason), Some("heat at must-spend"));
    }

    #[test]
    fn test_may_spend_heat_respects_suppression() {
        let mut fixture = Fixture::weaving();
        fixture.gauge = GaugeSnapshot::default().with_heat(60);
        let oracle = Oracle::with(&[Action::Hypercharge]);
        assert_eq!(fixture.pick(&oracle), Some(Action::Hypercharge));

        fixture.policy.suppress_burst = true;
        assert_eq!(fixture.pick(&oracle), None);
    }

    #[test]
    fn test_may_spend_heat_beats_charge_filler_with_tool_ready() {
        let mut fixture = Fixture::weaving();
        fixture.gauge = GaugeSnapshot::default().with_heat(60);
        let oracle = Oracle::with(&[
            Action::HeatedSplitShot,
            Action::Hypercharge,
            Action::Drill,
            Action::GaussRound,
        ]);
        let selection = fixture.select(&oracle);
        assert_eq!(selection.map(|s| s.action), Some(Action::Hypercharge));
        assert_eq!(selection.map(|s| s.reason), Some("heat at may-spend"));
    }

    #[test]
    fn test_wildfire_only_in_special_mode() {
        let mut fixture = Fixture::weaving();
        let oracle = Oracle::with(&[Action::Wildfire]);
        assert_eq!(fixture.pick(&oracle), None);

        fixture.state.special_mode.enter(5, fixture.now);
        assert_eq!(fixture.pick(&oracle), Some(Action::Wildfire));
    }

    #[test]
    fn test_automaton_battery_rules() {
        let mut fixture = Fixture::weaving();
        let oracle = Oracle::with(&[Action::AutomatonQueen]);

        fixture.gauge = GaugeSnapshot::default().with_battery(40);
        assert_eq!(fixture.pick(&oracle), None);

        fixture.gauge = GaugeSnapshot::default().with_battery(60);
        assert_eq!(fixture.pick(&oracle), Some(Action::AutomatonQueen));

        fixture.policy.suppress_burst = true;
        assert_eq!(fixture.pick(&oracle), None);

        fixture.gauge = GaugeSnapshot::default().with_battery(90);
        assert_eq!(fixture.pick(&oracle), Some(Action::AutomatonQueen));
    }

    #[test]
    fn test_charge_filler_prefers_fuller_family() {
        let fixture = Fixture::weaving();
        let mut oracle = Oracle::with(&[Action::GaussRound, Action::Ricochet]);
        assert_eq!(fixture.pick(&oracle), Some(Action::GaussRound));

        oracle.charges.insert(Action::GaussRound, Charges { current: 1, max: 3 });
        oracle.charges.insert(Action::Ricochet, Charges { current: 3, max: 3 });
        assert_eq!(fixture.pick(&oracle), Some(Action::Ricochet));
    }

    #[test]
    fn test_disabled_actions_never_selected() {
        let mut fixture = Fixture::fresh();
        fixture.policy.use_drill = false;
        fixture.policy.use_basic_combo = false;
        let oracle = Oracle::with(&[Action::Drill, Action::HeatedSplitShot]);
        assert_eq!(fixture.pick(&oracle), None);
    }

    #[test]
    fn test_weave_closed_late_in_recovery() {
        let mut fixture = Fixture::weaving();
        fixture.now = Timestamp::from_millis(11_200);
        let oracle = Oracle::with(&[Action::GaussRound]);
        assert_eq!(fixture.pick(&oracle), None);
    }
}
