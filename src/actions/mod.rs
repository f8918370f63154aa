pub mod catalog;
pub mod policy;

pub use catalog::{Action, ActionGroup, SlotKind, BURST_TOOLS, COMBO};
pub use policy::AbilityPolicy;
