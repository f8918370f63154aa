//! Shared test harness: a stub host, a manual clock and an engine wired
//! to both

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use gunner_rotation::actions::{AbilityPolicy, Action};
use gunner_rotation::core::{EngineConfig, ManualClock};
use gunner_rotation::engine::{OpenerStep, RotationEngine, TickOutcome};
use gunner_rotation::sim::StubHost;

pub struct Harness {
    pub clock: ManualClock,
    pub host: Rc<RefCell<StubHost>>,
    pub engine: RotationEngine,
}

impl Harness {
    pub fn new(
        configure: impl FnOnce(StubHost) -> StubHost,
        config: EngineConfig,
        policy: AbilityPolicy,
    ) -> Self {
        let clock = ManualClock::new();
        let (host, collab) = configure(StubHost::new(clock.clone())).into_collaborators();
        let engine = RotationEngine::new(collab, config, policy);
        Self {
            clock,
            host,
            engine,
        }
    }

    /// Default config and policy, engine started without an opener
    pub fn running(configure: impl FnOnce(StubHost) -> StubHost) -> Self {
        let mut harness = Self::new(configure, EngineConfig::default(), AbilityPolicy::default());
        harness.engine.start();
        harness
    }

    pub fn with_opener(mut self, steps: Vec<OpenerStep>) -> Self {
        self.engine = self.engine.with_opener(steps);
        self
    }

    /// Advance the clock, then tick
    pub fn tick_after(&mut self, millis: u64) -> TickOutcome {
        self.clock.advance_millis(millis);
        self.engine.tick()
    }

    /// Tick every `step_ms` until `done` holds or `limit_ms` passes;
    /// returns the elapsed time in milliseconds
    pub fn run_until(
        &mut self,
        step_ms: u64,
        limit_ms: u64,
        mut done: impl FnMut(&RotationEngine) -> bool,
    ) -> u64 {
        let mut elapsed = 0;
        while elapsed <= limit_ms {
            self.engine.tick();
            if done(&self.engine) {
                return elapsed;
            }
            self.clock.advance_millis(step_ms);
            elapsed += step_ms;
        }
        elapsed
    }

    pub fn accepted(&self) -> Vec<Action> {
        self.host.borrow().accepted()
    }

    pub fn attempts(&self) -> usize {
        self.host.borrow().attempts()
    }
}

/// Instant, cast-locked, instant, cast-locked, instant
pub fn five_step_opener() -> Vec<OpenerStep> {
    vec![
        OpenerStep::new(Action::Reassemble, "Reassemble"),
        OpenerStep::new(Action::AirAnchor, "Air Anchor"),
        OpenerStep::new(Action::GaussRound, "Gauss Round"),
        OpenerStep::new(Action::Drill, "Drill"),
        OpenerStep::new(Action::Ricochet, "Ricochet"),
    ]
}
