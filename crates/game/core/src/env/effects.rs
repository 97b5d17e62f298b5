use std::sync::Arc;

use crate::effect::StatusEffectDefinition;
use crate::tag::Tag;

/// Read-only lookup of status-effect definitions by effect tag.
pub trait EffectOracle: Send + Sync {
    fn definition(&self, effect: &Tag) -> Option<Arc<StatusEffectDefinition>>;

    /// Tags of every known definition, sorted.
    fn effect_tags(&self) -> Vec<Tag>;
}
