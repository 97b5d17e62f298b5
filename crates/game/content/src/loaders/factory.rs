//! Content factory for loading every gameplay data file from one directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use gameplay_core::{AttributeInit, Curve, GameplayConfig, StatusEffectDefinition, Tag};

use crate::loaders::{AttributeLoader, ConfigLoader, CurveLoader, EffectLoader, LoadResult};

/// Content factory that loads all gameplay content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── gameplay.toml
/// ├── effects.ron
/// ├── curves.ron
/// └── attributes.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub const CONFIG_FILE: &'static str = "gameplay.toml";
    pub const EFFECTS_FILE: &'static str = "effects.ron";
    pub const CURVES_FILE: &'static str = "curves.ron";
    pub const ATTRIBUTES_FILE: &'static str = "attributes.ron";

    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load simulation configuration from `gameplay.toml`.
    ///
    /// A missing file yields the default configuration.
    pub fn load_config(&self) -> LoadResult<GameplayConfig> {
        let path = self.data_dir.join(Self::CONFIG_FILE);
        if !path.exists() {
            tracing::debug!(
                target: "content::loaders",
                path = %path.display(),
                "no gameplay config, using defaults"
            );
            return Ok(GameplayConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load status-effect definitions from `effects.ron`.
    pub fn load_effects(&self) -> LoadResult<Vec<StatusEffectDefinition>> {
        EffectLoader::load(&self.data_dir.join(Self::EFFECTS_FILE))
    }

    /// Load modifier curves from `curves.ron`.
    pub fn load_curves(&self) -> LoadResult<BTreeMap<Tag, Curve>> {
        CurveLoader::load(&self.data_dir.join(Self::CURVES_FILE))
    }

    /// Load the starting attribute set from `attributes.ron`.
    pub fn load_attributes(&self) -> LoadResult<Vec<(Tag, AttributeInit)>> {
        AttributeLoader::load(&self.data_dir.join(Self::ATTRIBUTES_FILE))
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }

    #[test]
    fn loads_every_file_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(ContentFactory::EFFECTS_FILE),
            r#"(effects: [(effect_tag: "Effect.Marked", state_tags_to_add: ["State.Marked"])])"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join(ContentFactory::CURVES_FILE),
            r#"(curves: { "Modifier.Curve.Linear.Increase": (keys: [(0.0, 0.0), (1.0, 1.0)]) })"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join(ContentFactory::ATTRIBUTES_FILE),
            r#"(attributes: { "Attribute.Health": (initial_value: 10.0) })"#,
        )
        .unwrap();

        let factory = ContentFactory::new(dir.path());
        assert_eq!(factory.load_config().unwrap(), GameplayConfig::default());
        assert_eq!(factory.load_effects().unwrap().len(), 1);
        assert_eq!(factory.load_curves().unwrap().len(), 1);
        assert_eq!(factory.load_attributes().unwrap().len(), 1);
    }
}
