//! Engine configuration with documented constants
//!
//! All timing windows and gauge thresholds live here with explanations of
//! how they interact. A [`RotationProfile`] bundles a config with an
//! ability policy and is loaded from `data/profiles/{name}.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::actions::policy::AbilityPolicy;
use crate::core::error::{Result, RotationError};

/// Cast-lock and weave timing, in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Shared recovery timer started by every cast-locked action
    ///
    /// A cast-locked action may only be invoked once this much time has
    /// passed since the previous cast-locked action.
    pub recovery_period: f32,

    /// Earliest point after a cast-locked action at which an instant may
    /// be woven
    pub weave_min: f32,

    /// How close to the end of the recovery period an instant may still be
    /// woven without delaying the next cast-locked action
    ///
    /// The weave window is `[weave_min, recovery_period - weave_margin)`.
    pub weave_margin: f32,

    /// Minimum spacing between an instant and the previous action of any
    /// kind (animation lock)
    pub instant_lockout: f32,

    /// Minimum spacing between evaluated ticks
    ///
    /// Keeps the engine from hammering the invoker every frame when
    /// nothing is ready.
    pub tick_spacing: f32,

    /// How long a single opener step may report "not ready" before the
    /// sequencer force-advances past it
    pub opener_stall_timeout: f32,

    /// Hard ceiling on the whole opener; past this it is abandoned and the
    /// priority selector takes over
    pub opener_ceiling: f32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            recovery_period: 2.5,
            weave_min: 0.6,
            weave_margin: 0.5,
            instant_lockout: 0.6,
            tick_spacing: 0.1,
            opener_stall_timeout: 3.0,
            opener_ceiling: 15.0,
        }
    }
}

impl TimingConfig {
    pub fn recovery(&self) -> Duration {
        secs(self.recovery_period)
    }

    pub fn weave_start(&self) -> Duration {
        secs(self.weave_min)
    }

    /// Exclusive end of the weave window
    pub fn weave_end(&self) -> Duration {
        secs(self.recovery_period - self.weave_margin)
    }

    pub fn instant_lock(&self) -> Duration {
        secs(self.instant_lockout)
    }

    pub fn tick_interval(&self) -> Duration {
        secs(self.tick_spacing)
    }

    pub fn stall_timeout(&self) -> Duration {
        secs(self.opener_stall_timeout)
    }

    pub fn ceiling(&self) -> Duration {
        secs(self.opener_ceiling)
    }
}

/// Gauge levels that gate the resource spenders
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GaugeThresholds {
    /// Heat at which Hypercharge is spent no matter what
    ///
    /// Overrides SuppressBurst: heat past this point would be lost to the
    /// cap by the next few combo hits.
    pub heat_must_spend: u32,

    /// Heat at which Hypercharge may be spent while burst is allowed
    pub heat_may_spend: u32,

    pub heat_cap: u32,

    /// Battery at which the Automaton Queen is summoned regardless of
    /// SuppressBurst
    pub battery_must_spend: u32,

    /// Battery at which the Automaton Queen may be summoned while burst is
    /// allowed
    pub battery_may_spend: u32,

    pub battery_cap: u32,
}

impl Default for GaugeThresholds {
    fn default() -> Self {
        Self {
            heat_must_spend: 90,
            heat_may_spend: 50,
            heat_cap: 100,
            battery_must_spend: 90,
            battery_may_spend: 50,
            battery_cap: 100,
        }
    }
}

/// Target gate behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetingConfig {
    /// Only hostile candidates count as valid targets
    pub require_hostile: bool,
    /// Pick the nearest hostile automatically when the current target is
    /// lost
    pub auto_acquire: bool,
}

impl Default for TargetingConfig {
    fn default() -> Self {
        Self {
            require_hostile: true,
            auto_acquire: false,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub timing: TimingConfig,
    pub thresholds: GaugeThresholds,
    pub targeting: TargetingConfig,

    /// Signature finisher uses granted by one entry into the special mode
    pub special_mode_uses: u32,

    /// How long a self-entered special mode is trusted without the gauge
    /// confirming it (seconds)
    pub special_mode_duration: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timing: TimingConfig::default(),
            thresholds: GaugeThresholds::default(),
            targeting: TargetingConfig::default(),
            special_mode_uses: 5,
            special_mode_duration: 15.0,
        }
    }
}

impl EngineConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn special_mode_window(&self) -> Duration {
        secs(self.special_mode_duration)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let t = &self.timing;

        if t.recovery_period <= 0.0 {
            return Err(invalid("recovery_period must be positive"));
        }

        // Weave window must be non-empty and sit inside the recovery period
        if t.weave_min < 0.0 || t.weave_margin < 0.0 {
            return Err(invalid("weave bounds must not be negative"));
        }
        if t.weave_min >= t.recovery_period - t.weave_margin {
            return Err(invalid(format!(
                "weave window is empty: weave_min ({}) >= recovery_period - weave_margin ({:.2})",
                t.weave_min,
                t.recovery_period - t.weave_margin
            )));
        }

        if t.opener_stall_timeout <= 0.0 || t.opener_ceiling <= 0.0 {
            return Err(invalid("opener timeouts must be positive"));
        }
        if t.opener_stall_timeout > t.opener_ceiling {
            return Err(invalid(format!(
                "opener_stall_timeout ({}) should be <= opener_ceiling ({})",
                t.opener_stall_timeout, t.opener_ceiling
            )));
        }

        let g = &self.thresholds;
        if !(g.heat_may_spend <= g.heat_must_spend && g.heat_must_spend <= g.heat_cap) {
            return Err(invalid(format!(
                "heat thresholds out of order: may {} / must {} / cap {}",
                g.heat_may_spend, g.heat_must_spend, g.heat_cap
            )));
        }
        if !(g.battery_may_spend <= g.battery_must_spend && g.battery_must_spend <= g.battery_cap)
        {
            return Err(invalid(format!(
                "battery thresholds out of order: may {} / must {} / cap {}",
                g.battery_may_spend, g.battery_must_spend, g.battery_cap
            )));
        }

        if self.special_mode_uses == 0 {
            return Err(invalid("special_mode_uses must be at least 1"));
        }

        Ok(())
    }
}

/// Engine config plus ability policy, as stored on disk
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RotationProfile {
    /// Name of this profile (set from filename)
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub policy: AbilityPolicy,
}

impl RotationProfile {
    /// Parse a profile from TOML text and validate it
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let profile: RotationProfile = toml::from_str(contents)?;
        profile.engine.validate()?;
        Ok(profile)
    }
}

/// Load a profile from `data/profiles/{name}.toml`
pub fn load_profile(name: &str) -> Result<RotationProfile> {
    let path = profile_path(name);
    if !path.exists() {
        return Err(RotationError::ProfileNotFound(path.display().to_string()));
    }

    let contents = fs::read_to_string(&path)?;
    let mut profile = RotationProfile::from_toml_str(&contents)?;
    profile.name = name.to_string();
    Ok(profile)
}

/// Get path to profile file
fn profile_path(name: &str) -> PathBuf {
    PathBuf::from("data/profiles").join(format!("{}.toml", name))
}

/// Whole milliseconds, so 0.6 s compares equal to 600 ms
fn secs(value: f32) -> Duration {
    Duration::from_millis((value.max(0.0) * 1000.0).round() as u64)
}

fn invalid(msg: impl Into<String>) -> RotationError {
    RotationError::InvalidConfig(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_weave_window_bounds() {
        let timing = TimingConfig::default();
        assert_eq!(timing.weave_start(), Duration::from_millis(600));
        assert_eq!(timing.weave_end(), Duration::from_millis(2000));
        assert_eq!(timing.recovery(), Duration::from_millis(2500));
        assert!(timing.weave_start() < timing.weave_end());
    }

    #[test]
    fn test_empty_weave_window_rejected() {
        let mut config = EngineConfig::default();
        config.timing.weave_min = 2.2;
        assert!(matches!(
            config.validate(),
            Err(RotationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_heat_thresholds_must_be_ordered() {
        let mut config = EngineConfig::default();
        config.thresholds.heat_may_spend = 95;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_special_uses_rejected() {
        let mut config = EngineConfig::default();
        config.special_mode_uses = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_profile_falls_back_to_defaults() {
        let toml_str = r#"
[engine.timing]
recovery_period = 2.4

[policy]
use_drill = false
"#;
        let profile = RotationProfile::from_toml_str(toml_str).unwrap();
        assert!((profile.engine.timing.recovery_period - 2.4).abs() < 0.001);
        assert_eq!(profile.engine.timing.weave_min, 0.6);
        assert_eq!(profile.engine.special_mode_uses, 5);
        assert!(!profile.policy.use_drill);
        assert!(profile.policy.use_air_anchor);
    }

    #[test]
    fn test_invalid_profile_rejected() {
        let toml_str = r#"
[engine]
special_mode_uses = 0
"#;
        assert!(RotationProfile::from_toml_str(toml_str).is_err());
    }

    #[test]
    fn test_load_default_profile() {
        let profile = load_profile("default").expect("Should load default profile");
        assert_eq!(profile.name, "default");
        assert!(profile.policy.use_opener);
    }

    #[test]
    fn test_missing_profile() {
        assert!(matches!(
            load_profile("does_not_exist"),
            Err(RotationError::ProfileNotFound(_))
        ));
    }
}
