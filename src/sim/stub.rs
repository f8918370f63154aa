//! Scripted host double

use ahash::{AHashMap, AHashSet};
use std::cell::RefCell;
use std::rc::Rc;

use crate::actions::catalog::Action;
use crate::core::clock::{Clock, ManualClock};
use crate::core::types::{TargetHandle, TargetId};
use crate::engine::ports::{ActionInvoker, Charges, Collaborators, ReadinessOracle};
use crate::engine::target::TargetProvider;
use crate::gauge::{ComboReader, ComboSnapshot, GaugeReader, GaugeSnapshot};
use crate::sim::Invocation;

/// Host whose every answer is set by hand
///
/// By default everything is ready, every request is accepted and a live
/// training dummy is targeted.
#[derive(Debug, Clone)]
pub struct StubHost {
    /// When false only `ready` actions report ready
    pub ready_all: bool,
    pub ready: AHashSet<Action>,
    /// Never ready, whatever the other settings say
    pub not_ready: AHashSet<Action>,
    pub accept: bool,
    pub charges: AHashMap<Action, Charges>,
    pub gauge: GaugeSnapshot,
    pub combo: ComboSnapshot,
    pub current: Option<TargetHandle>,
    pub candidates: Vec<TargetHandle>,
    pub available: bool,
    pub invocations: Vec<Invocation>,
    clock: ManualClock,
}

impl StubHost {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            ready_all: true,
            ready: AHashSet::new(),
            not_ready: AHashSet::new(),
            accept: true,
            charges: AHashMap::new(),
            gauge: GaugeSnapshot::default(),
            combo: ComboSnapshot::default(),
            current: Some(TargetHandle::enemy(0x4000_0001, "Striking Dummy", 3.0)),
            candidates: Vec::new(),
            available: true,
            invocations: Vec::new(),
            clock,
        }
    }

    /// Only the listed actions report ready
    pub fn ready_only(mut self, actions: &[Action]) -> Self {
        self.ready_all = false;
        self.ready = actions.iter().copied().collect();
        self
    }

    pub fn with_gauge(mut self, gauge: GaugeSnapshot) -> Self {
        self.gauge = gauge;
        self
    }

    pub fn without_target(mut self) -> Self {
        self.current = None;
        self
    }

    /// Wrap for sharing and build a collaborator set around it
    pub fn into_collaborators(self) -> (Rc<RefCell<StubHost>>, Collaborators) {
        let clock = self.clock.clone();
        let host = Rc::new(RefCell::new(self));
        let collab = Collaborators::shared(&host, clock);
        (host, collab)
    }

    /// Same as [`StubHost::into_collaborators`] with the combo reader wired
    /// in as well
    pub fn into_collaborators_with_combo(self) -> (Rc<RefCell<StubHost>>, Collaborators) {
        let (host, collab) = self.into_collaborators();
        let collab = collab.with_combo_reader(Rc::clone(&host));
        (host, collab)
    }

    /// Actions the host accepted, in order
    pub fn accepted(&self) -> Vec<Action> {
        self.invocations
            .iter()
            .filter(|i| i.accepted)
            .map(|i| i.action)
            .collect()
    }

    pub fn attempts(&self) -> usize {
        self.invocations.len()
    }
}

impl ReadinessOracle for StubHost {
    fn is_available(&self) -> bool {
        self.available
    }

    fn is_ready(&self, action: Action) -> bool {
        if self.not_ready.contains(&action) {
            return false;
        }
        self.ready_all || self.ready.contains(&action)
    }

    fn charges(&self, action: Action) -> Option<Charges> {
        self.charges.get(&action).copied()
    }
}

impl ActionInvoker for StubHost {
    fn is_available(&self) -> bool {
        self.available
    }

    fn invoke(&mut self, action: Action, target: TargetId) -> bool {
        let accepted = self.accept;
        self.invocations.push(Invocation {
            at: self.clock.now(),
            action,
            target,
            accepted,
        });
        accepted
    }
}

impl GaugeReader for StubHost {
    fn snapshot(&self) -> GaugeSnapshot {
        self.gauge
    }
}

impl ComboReader for StubHost {
    fn snapshot(&self) -> ComboSnapshot {
        self.combo
    }
}

impl TargetProvider for StubHost {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_ready_and_accepting() {
        let mut host = StubHost::new(ManualClock::new());
        assert!(host.is_ready(Action::Drill));
        assert!(host.invoke(Action::Drill, TargetId(1)));
        assert_eq!(host.accepted(), vec![Action::Drill]);
    }

    #[test]
    fn test_not_ready_wins() {
        let mut host = StubHost::new(ManualClock::new()).ready_only(&[Action::Drill]);
        assert!(host.is_ready(Action::Drill));
        assert!(!host.is_ready(Action::AirAnchor));
        host.not_ready.insert(Action::Drill);
        assert!(!host.is_ready(Action::Drill));
    }

    #[test]
    fn test_nearest_hostile_skips_invalid() {
        let mut host = StubHost::new(ManualClock::new()).without_target();
        let mut dead = TargetHandle::enemy(1, "Dead", 1.0);
        dead.current_hp = 0;
        host.candidates = vec![
            dead,
            TargetHandle::enemy(2, "Far", 20.0),
            TargetHandle::enemy(3, "Near", 5.0),
        ];
        let nearest = host.nearest_hostile().map(|t| t.id);
        assert_eq!(nearest, Some(TargetId(3)));

        host.set_current(Some(TargetId(3)));
        assert_eq!(host.current().map(|t| t.name), Some("Near".to_string()));
    }
}
