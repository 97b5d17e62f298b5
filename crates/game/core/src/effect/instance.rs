use std::sync::Arc;

use super::definition::StatusEffectDefinition;
use crate::state::SlotKey;
use crate::tag::Tag;

/// An active status effect on one entity.
///
/// Holds the keys of the tracked modifiers it created. Instant modifiers are
/// applied on creation and never listed.
#[derive(Clone, Debug)]
pub struct StatusEffect {
    definition: Arc<StatusEffectDefinition>,
    pub(crate) modifiers: Vec<SlotKey>,
    applied_step: u64,
}

impl StatusEffect {
    pub(crate) fn new(definition: Arc<StatusEffectDefinition>, applied_step: u64) -> Self {
        Self {
            definition,
            modifiers: Vec::new(),
            applied_step,
        }
    }

    pub fn effect_tag(&self) -> &Tag {
        &self.definition.effect_tag
    }

    pub fn definition(&self) -> &Arc<StatusEffectDefinition> {
        &self.definition
    }

    pub fn applied_step(&self) -> u64 {
        self.applied_step
    }

    pub fn modifier_count(&self) -> usize {
        self.modifiers.len()
    }
}
