/// Simulation configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameplayConfig {
    /// Fixed simulation steps per wall-clock second.
    pub target_steps_per_second: u32,
    /// When true, one host frame may run several steps to catch up a backlog.
    /// When false, at most one step runs per frame and the backlog is kept.
    pub use_aggregated_steps: bool,
    /// Number of tick buckets entities are spread across.
    pub tick_bucket_count: usize,
    /// Smallest value change that counts as a change for notifications.
    pub value_tolerance: f32,
}

impl GameplayConfig {
    // ===== compile-time constants =====
    /// Upper bound on tick buckets. Bucket storage is sized from this.
    pub const MAX_TICK_BUCKETS: usize = 64;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_STEPS_PER_SECOND: u32 = 30;
    pub const DEFAULT_TICK_BUCKETS: usize = 15;
    pub const DEFAULT_VALUE_TOLERANCE: f32 = 1.0e-4;

    pub fn new() -> Self {
        Self {
            target_steps_per_second: Self::DEFAULT_STEPS_PER_SECOND,
            use_aggregated_steps: false,
            tick_bucket_count: Self::DEFAULT_TICK_BUCKETS,
            value_tolerance: Self::DEFAULT_VALUE_TOLERANCE,
        }
    }

    pub fn with_steps_per_second(target_steps_per_second: u32) -> Self {
        Self {
            target_steps_per_second,
            ..Self::new()
        }
    }

    /// Length of one fixed step in milliseconds.
    pub fn step_size_ms(&self) -> f64 {
        1000.0 / f64::from(self.target_steps_per_second.max(1))
    }

    /// Checks the configuration for values the scheduler cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_steps_per_second == 0 {
            return Err(ConfigError::ZeroStepRate);
        }
        if self.tick_bucket_count == 0 || self.tick_bucket_count > Self::MAX_TICK_BUCKETS {
            return Err(ConfigError::BucketCount {
                requested: self.tick_bucket_count,
                max: Self::MAX_TICK_BUCKETS,
            });
        }
        if !self.value_tolerance.is_finite() || self.value_tolerance < 0.0 {
            return Err(ConfigError::Tolerance(self.value_tolerance));
        }
        Ok(())
    }
}

impl Default for GameplayConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Rejected configuration values.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("target steps per second must be greater than zero")]
    ZeroStepRate,

    #[error("tick bucket count {requested} must be within 1..={max}")]
    BucketCount { requested: usize, max: usize },

    #[error("value tolerance {0} must be a finite non-negative number")]
    Tolerance(f32),
}

impl crate::error::GameplayError for ConfigError {
    fn severity(&self) -> crate::error::ErrorSeverity {
        crate::error::ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ZeroStepRate => "CONFIG_ZERO_STEP_RATE",
            Self::BucketCount { .. } => "CONFIG_BUCKET_COUNT",
            Self::Tolerance(_) => "CONFIG_TOLERANCE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = GameplayConfig::default();
        assert_eq!(config.target_steps_per_second, 30);
        assert!(!config.use_aggregated_steps);
        assert_eq!(config.tick_bucket_count, 15);
        assert!((config.step_size_ms() - 33.333).abs() < 1.0e-2);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_unusable_values() {
        assert_eq!(
            GameplayConfig::with_steps_per_second(0).validate(),
            Err(ConfigError::ZeroStepRate)
        );

        let config = GameplayConfig {
            tick_bucket_count: GameplayConfig::MAX_TICK_BUCKETS + 1,
            ..GameplayConfig::new()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BucketCount { .. })
        ));
    }
}
