//! [`gameplay_core::EffectOracle`] backed by an in-memory map.
use std::collections::HashMap;
use std::sync::Arc;

use gameplay_core::{EffectOracle, ModifierDelegate, StatusEffectDefinition, Tag};

/// EffectOracle implementation with static status-effect definitions
#[derive(Debug, Clone, Default)]
pub struct EffectOracleImpl {
    definitions: HashMap<Tag, Arc<StatusEffectDefinition>>,
}

impl EffectOracleImpl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_definitions(definitions: impl IntoIterator<Item = StatusEffectDefinition>) -> Self {
        let mut oracle = Self::new();
        for definition in definitions {
            oracle.add_definition(definition);
        }
        oracle
    }

    /// Add a definition, replacing any previous one with the same tag.
    pub fn add_definition(&mut self, definition: StatusEffectDefinition) {
        self.definitions
            .insert(definition.effect_tag.clone(), Arc::new(definition));
    }

    /// Binds the scripted hook used by the effect's `SetByEffect` templates.
    ///
    /// Returns `false` if no definition with that tag is known.
    pub fn attach_behavior(&mut self, effect_tag: &Tag, behavior: ModifierDelegate) -> bool {
        let Some(definition) = self.definitions.get_mut(effect_tag) else {
            return false;
        };
        Arc::make_mut(definition).behavior = Some(behavior);
        true
    }

    pub fn contains(&self, effect_tag: &Tag) -> bool {
        self.definitions.contains_key(effect_tag)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl EffectOracle for EffectOracleImpl {
    fn definition(&self, effect_tag: &Tag) -> Option<Arc<StatusEffectDefinition>> {
        self.definitions.get(effect_tag).cloned()
    }

    fn effect_tags(&self) -> Vec<Tag> {
        let mut tags: Vec<Tag> = self.definitions.keys().cloned().collect();
        tags.sort();
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn behavior_is_attached_to_known_definitions_only() {
        let mut oracle = EffectOracleImpl::from_definitions([
            StatusEffectDefinition::new("Effect.Burning"),
            StatusEffectDefinition::new("Effect.Aura"),
        ]);
        let hook = ModifierDelegate::from_fns(|_| true, |_| 1.0);

        assert!(oracle.attach_behavior(&Tag::new("Effect.Burning"), hook.clone()));
        assert!(!oracle.attach_behavior(&Tag::new("Effect.Unknown"), hook));
        assert!(
            oracle
                .definition(&Tag::new("Effect.Burning"))
                .is_some_and(|definition| definition.behavior.is_some())
        );
        assert_eq!(
            oracle.effect_tags(),
            vec![Tag::new("Effect.Aura"), Tag::new("Effect.Burning")]
        );
    }
}
