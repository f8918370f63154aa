//! Capabilities the engine borrows from its host

use std::cell::RefCell;
use std::rc::Rc;

use crate::actions::catalog::Action;
use crate::core::clock::Clock;
use crate::core::types::TargetId;
use crate::engine::target::TargetProvider;
use crate::gauge::{ComboReader, GaugeReader};

/// Charge count of a multi-use instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Charges {
    pub current: u32,
    pub max: u32,
}

/// Reports whether an action can be used right now
pub trait ReadinessOracle {
    /// False when the host cannot answer this tick
    fn is_available(&self) -> bool {
        true
    }

    /// Cooldown elapsed, resources present, not locked out
    fn is_ready(&self, action: Action) -> bool;

    /// Charge count for charge-based actions, when the host exposes it
    fn charges(&self, _action: Action) -> Option<Charges> {
        None
    }
}

/// Fires an action at a target
pub trait ActionInvoker {
    fn is_available(&self) -> bool {
        true
    }

    /// True when the host accepted the request
    fn invoke(&mut self, action: Action, target: TargetId) -> bool;
}

impl<T: ReadinessOracle> ReadinessOracle for Rc<RefCell<T>> {
    fn is_available(&self) -> bool {
        self.borrow().is_available()
    }

    fn is_ready(&self, action: Action) -> bool {
        self.borrow().is_ready(action)
    }

    fn charges(&self, action: Action) -> Option<Charges> {
        self.borrow().charges(action)
    }
}

impl<T: ActionInvoker> ActionInvoker for Rc<RefCell<T>> {
    fn is_available(&self) -> bool {
        self.borrow().is_available()
    }

    fn invoke(&mut self, action: Action, target: TargetId) -> bool {
        self.borrow_mut().invoke(action, target)
    }
}

/// Ready form of `action`: the action itself, or its upgrade
pub fn first_ready(oracle: &dyn ReadinessOracle, action: Action) -> Option<Action> {
    if oracle.is_ready(action) {
        return Some(action);
    }
    action.upgrade().filter(|upgraded| oracle.is_ready(*upgraded))
}

/// Everything the engine talks to, injected at construction
pub struct Collaborators {
    pub oracle: Box<dyn ReadinessOracle>,
    pub invoker: Box<dyn ActionInvoker>,
    pub gauge: Box<dyn GaugeReader>,
    pub combo: Option<Box<dyn ComboReader>>,
    pub targets: Box<dyn TargetProvider>,
    pub clock: Box<dyn Clock>,
}

impl Collaborators {
    /// Back every capability with one shared host object
    pub fn shared<W, C>(world: &Rc<RefCell<W>>, clock: C) -> Self
    where
        W: ReadinessOracle + ActionInvoker + GaugeReader + TargetProvider + 'static,
        C: Clock + 'static,
    {
        Self {
            oracle: Box::new(Rc::clone(world)),
            invoker: Box::new(Rc::clone(world)),
            gauge: Box::new(Rc::clone(world)),
            combo: None,
            targets: Box::new(Rc::clone(world)),
            clock: Box::new(clock),
        }
    }

    pub fn with_combo_reader(mut self, reader: impl ComboReader + 'static) -> Self {
        self.combo = Some(Box::new(reader));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct OnlyUpgrades;

    impl ReadinessOracle for OnlyUpgrades {
        fn is_ready(&self, action: Action) -> bool {
            matches!(action, Action::DoubleCheck | Action::BlazingShot)
        }
    }

    #[test]
    fn test_first_ready_prefers_base() {
        struct All;
        impl ReadinessOracle for All {
            fn is_ready(&self, _action: Action) -> bool {
                true
            }
        }
        assert_eq!(first_ready(&All, Action::GaussRound), Some(Action::GaussRound));
    }

    #[test]
    fn test_first_ready_falls_back_to_upgrade() {
        assert_eq!(
            first_ready(&OnlyUpgrades, Action::GaussRound),
            Some(Action::DoubleCheck)
        );
        assert_eq!(
            first_ready(&OnlyUpgrades, Action::HeatBlast),
            Some(Action::BlazingShot)
        );
        assert_eq!(first_ready(&OnlyUpgrades, Action::Ricochet), None);
        assert_eq!(first_ready(&OnlyUpgrades, Action::Drill), None);
    }

    #[test]
    fn test_default_charges_unknown() {
        assert!(OnlyUpgrades.charges(Action::GaussRound).is_none());
        assert!(ReadinessOracle::is_available(&OnlyUpgrades));
    }
}
