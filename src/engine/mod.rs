//! Rotation decision engine
//!
//! Timing, opener, selector and target gate, wired together by
//! [`RotationEngine`].

pub mod opener;
pub mod ports;
pub mod rotation;
pub mod selector;
pub mod state;
pub mod target;
pub mod timing;

pub use opener::{standard_opener, OpenerDecision, OpenerSequencer, OpenerState, OpenerStep};
pub use ports::{first_ready, ActionInvoker, Charges, Collaborators, ReadinessOracle};
pub use rotation::{RotationEngine, TickOutcome};
pub use selector::{PriorityLayer, RotationSelector, Selection, SelectorContext};
pub use state::{EngineMode, EngineState, EngineStatus, SpecialMode};
pub use target::{TargetGate, TargetProvider, TargetStatus};
pub use timing::TimingTracker;
