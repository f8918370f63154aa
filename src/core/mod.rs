pub mod clock;
pub mod config;
pub mod error;
pub mod types;

pub use clock::{Clock, ManualClock, MonotonicClock, Timestamp};
pub use config::{
    load_profile, EngineConfig, GaugeThresholds, RotationProfile, TargetingConfig, TimingConfig,
};
pub use error::{Result, RotationError};
pub use types::{TargetHandle, TargetId};
