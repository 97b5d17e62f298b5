//! Simulation configuration loader.

use std::path::Path;

use gameplay_core::GameplayConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for [`GameplayConfig`] from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate config data from a TOML file.
    ///
    /// Missing fields fall back to [`GameplayConfig::default`].
    pub fn load(path: &Path) -> LoadResult<GameplayConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<GameplayConfig> {
        let config: GameplayConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse gameplay config TOML: {}", e))?;
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid gameplay config: {}", e))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let config = ConfigLoader::parse("target_steps_per_second = 60\n").unwrap();
        assert_eq!(config.target_steps_per_second, 60);
        assert_eq!(config.tick_bucket_count, GameplayConfig::DEFAULT_TICK_BUCKETS);
        assert!(!config.use_aggregated_steps);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let error = ConfigLoader::parse("tick_bucket_count = 65\n").unwrap_err();
        assert!(error.to_string().contains("Invalid gameplay config"));
        assert!(ConfigLoader::parse("target_steps_per_second = 0\n").is_err());
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gameplay.toml");
        std::fs::write(&path, "use_aggregated_steps = true\nvalue_tolerance = 0.5\n").unwrap();

        let config = ConfigLoader::load(&path).unwrap();
        assert!(config.use_aggregated_steps);
        assert_eq!(config.value_tolerance, 0.5);
    }
}
