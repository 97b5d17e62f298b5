//! Status-effect definition loader.

use std::collections::BTreeSet;
use std::path::Path;

use gameplay_core::StatusEffectDefinition;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Effect catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectCatalog {
    pub effects: Vec<StatusEffectDefinition>,
}

/// Loader for status-effect definitions from RON files.
pub struct EffectLoader;

impl EffectLoader {
    /// Load an effect catalog from a RON file.
    ///
    /// Fails on the first definition with configuration problems or a
    /// duplicated effect tag.
    pub fn load(path: &Path) -> LoadResult<Vec<StatusEffectDefinition>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<Vec<StatusEffectDefinition>> {
        let catalog: EffectCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse effect catalog RON: {}", e))?;

        let mut seen = BTreeSet::new();
        for definition in &catalog.effects {
            let issues = definition.validate(false);
            if !issues.is_empty() {
                let details: Vec<String> = issues.iter().map(ToString::to_string).collect();
                anyhow::bail!(
                    "Invalid status effect {}: {}",
                    definition.effect_tag,
                    details.join("; ")
                );
            }
            if !seen.insert(definition.effect_tag.clone()) {
                anyhow::bail!("Duplicate status effect {}", definition.effect_tag);
            }
        }

        tracing::debug!(
            target: "content::loaders",
            effects = catalog.effects.len(),
            "loaded effect catalog"
        );
        Ok(catalog.effects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gameplay_core::{ApplicationType, OperationType, StackingPolicy, Tag};

    const CATALOG: &str = r#"(
        effects: [
            (
                effect_tag: "Effect.Poison",
                categories: ["Category.Debuff"],
                state_tags_to_add: ["State.Poisoned"],
                stacking: Stackable,
                modifiers: {
                    "Attribute.Health": (
                        application: Periodic,
                        calculation: SetByCaller,
                        operation: Additive,
                        value: -5.0,
                        interval: 5,
                        duration: 50,
                        apply_on_removal: true,
                    ),
                },
            ),
            (
                effect_tag: "Effect.Cleanse",
                effect_categories_to_cancel: ["Category.Debuff"],
            ),
        ],
    )"#;

    #[test]
    fn parses_definitions_with_defaults() {
        let effects = EffectLoader::parse(CATALOG).unwrap();
        assert_eq!(effects.len(), 2);

        let poison = &effects[0];
        assert_eq!(poison.stacking, StackingPolicy::Stackable);
        assert!(poison.remove_when_modifiers_expire);
        let spec = &poison.modifiers[&Tag::new("Attribute.Health")];
        assert_eq!(spec.application, ApplicationType::Periodic);
        assert_eq!(spec.operation, OperationType::Additive);
        assert!(spec.affects_base());

        let cleanse = &effects[1];
        assert!(cleanse.modifiers.is_empty());
        assert_eq!(cleanse.stacking, StackingPolicy::Exclusive);
    }

    #[test]
    fn invalid_template_is_rejected() {
        let content = r#"(
            effects: [
                (
                    effect_tag: "Effect.Broken",
                    modifiers: {
                        "Attribute.Health": (
                            application: Instant,
                            calculation: SetByCaller,
                            operation: Multiply,
                            value: 2.0,
                        ),
                    },
                ),
            ],
        )"#;
        let error = EffectLoader::parse(content).unwrap_err();
        assert!(error.to_string().contains("Effect.Broken"));
    }

    #[test]
    fn duplicate_tags_are_rejected() {
        let content = r#"(effects: [(effect_tag: "Effect.A"), (effect_tag: "Effect.A")])"#;
        assert!(EffectLoader::parse(content).is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let error = EffectLoader::load(&dir.path().join("effects.ron")).unwrap_err();
        assert!(error.to_string().contains("Failed to read file"));
    }
}
