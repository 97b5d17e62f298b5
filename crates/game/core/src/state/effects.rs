//! Status-effect application and removal.
use std::sync::Arc;

use super::{GameplayState, ModifierHandle, SlotKey, StateError, StatusEffectHandle};
use crate::effect::{StackingPolicy, StatusEffect, StatusEffectError};
use crate::env::GameplayEnv;
use crate::error::reject;
use crate::tag::{Tag, TagCountContainer};

impl GameplayState {
    /// Applies the status effect `effect_tag`, resolved through `env`.
    ///
    /// Every modifier template is checked before anything is applied. If a
    /// template still fails once earlier ones are in place, the tracked
    /// modifiers created so far are removed again.
    pub fn add_status_effect(
        &mut self,
        env: GameplayEnv<'_>,
        effect_tag: &Tag,
    ) -> Result<StatusEffectHandle, StatusEffectError> {
        self.apply_status_effect(env, effect_tag)
            .map_err(|error| reject("add_status_effect", error))
    }

    /// Removes one status effect instance and every modifier it owns.
    pub fn remove_status_effect(
        &mut self,
        handle: StatusEffectHandle,
    ) -> Result<(), StatusEffectError> {
        let key = self
            .resolve(handle, |key| self.status_effects.contains(key))
            .map_err(|error| reject("remove_status_effect", effect_handle_error(error)))?;
        self.remove_effect_instance(key);
        Ok(())
    }

    /// Removes every active instance of `effect_tag` and returns how many
    /// were removed.
    pub fn clear_status_effect(&mut self, effect_tag: &Tag) -> Result<usize, StatusEffectError> {
        let keys = self.status_effect_keys(effect_tag);
        if keys.is_empty() {
            return Err(reject(
                "clear_status_effect",
                StatusEffectError::NotFound(effect_tag.clone()),
            ));
        }

        let total = keys.len();
        let failed = keys
            .into_iter()
            .filter(|key| self.remove_effect_instance(*key).is_none())
            .count();
        if failed > 0 {
            return Err(reject(
                "clear_status_effect",
                StatusEffectError::PartialClear {
                    effect: effect_tag.clone(),
                    failed,
                    total,
                },
            ));
        }
        Ok(total)
    }

    pub fn has_status_effect(&self, effect_tag: &Tag) -> bool {
        self.status_effects
            .values()
            .any(|effect| effect.effect_tag() == effect_tag)
    }

    pub fn status_effect_count(&self, effect_tag: &Tag) -> usize {
        self.status_effects
            .values()
            .filter(|effect| effect.effect_tag() == effect_tag)
            .count()
    }

    pub fn status_effect(&self, handle: StatusEffectHandle) -> Option<&StatusEffect> {
        let key = self
            .resolve(handle, |key| self.status_effects.contains(key))
            .ok()?;
        self.status_effects.get(key)
    }

    pub fn is_status_effect_handle_valid(&self, handle: StatusEffectHandle) -> bool {
        self.status_effect(handle).is_some()
    }

    pub fn status_effects(&self) -> impl Iterator<Item = &StatusEffect> {
        self.status_effects.values()
    }

    pub fn status_effect_handles(&self, effect_tag: &Tag) -> Vec<StatusEffectHandle> {
        self.status_effect_keys(effect_tag)
            .into_iter()
            .map(|key| StatusEffectHandle::new(self.entity, key))
            .collect()
    }

    /// Handles of the tracked modifiers an instance still owns.
    pub fn status_effect_modifiers(&self, handle: StatusEffectHandle) -> Vec<ModifierHandle> {
        self.status_effect(handle)
            .map(|effect| {
                effect
                    .modifiers
                    .iter()
                    .map(|key| ModifierHandle::new(self.entity, *key))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Effect tags and granted state tags, reference counted.
    pub fn state_tags(&self) -> &TagCountContainer {
        &self.state_tags
    }

    pub fn has_state_tag(&self, tag: &Tag) -> bool {
        self.state_tags.contains(tag)
    }

    pub fn state_tag_count(&self, tag: &Tag) -> u32 {
        self.state_tags.count(tag)
    }

    // ===== internals =====

    fn apply_status_effect(
        &mut self,
        env: GameplayEnv<'_>,
        effect_tag: &Tag,
    ) -> Result<StatusEffectHandle, StatusEffectError> {
        if !effect_tag.is_valid() {
            return Err(StatusEffectError::InvalidTag);
        }
        let definition = env
            .effects()?
            .definition(effect_tag)
            .ok_or_else(|| StatusEffectError::DefinitionNotFound(effect_tag.clone()))?;

        if definition.stacking == StackingPolicy::Exclusive && self.has_status_effect(effect_tag) {
            return Err(StatusEffectError::StackingForbidden(effect_tag.clone()));
        }
        if let Some(tag) = definition
            .blocking_tags
            .iter()
            .find(|tag| self.state_tags.contains(tag))
        {
            return Err(StatusEffectError::Blocked {
                effect: effect_tag.clone(),
                tag: tag.clone(),
            });
        }
        if let Some(tag) = definition
            .enabling_tags
            .iter()
            .find(|tag| !self.state_tags.contains(tag))
        {
            return Err(StatusEffectError::MissingEnablingTag {
                effect: effect_tag.clone(),
                tag: tag.clone(),
            });
        }

        let templates = definition.bound_modifiers();
        for (attribute, spec) in &templates {
            self.check_modifier(env, attribute, spec)
                .map_err(|source| template_error(effect_tag, attribute, source))?;
        }

        let key = self
            .status_effects
            .insert(StatusEffect::new(Arc::clone(&definition), self.latest_step));

        for (attribute, spec) in &templates {
            // Earlier templates may have overridden an attribute or added a
            // dependency edge since the first check.
            let curve = match self.check_modifier(env, attribute, spec) {
                Ok(curve) => curve,
                Err(source) => {
                    self.rollback_status_effect(key);
                    return Err(template_error(effect_tag, attribute, source));
                }
            };
            if let Some(handle) = self.commit_modifier(attribute, spec, curve, Some(key)) {
                if let Some(effect) = self.status_effects.get_mut(key) {
                    effect.modifiers.push(handle.key());
                }
            }
        }

        self.state_tags.add(effect_tag);
        for tag in &definition.state_tags_to_add {
            self.state_tags.add(tag);
        }

        let cancelled: Vec<SlotKey> = self
            .status_effects
            .iter()
            .filter(|(other, effect)| {
                *other != key && effect.definition().is_cancelled_by(&definition)
            })
            .map(|(other, _)| other)
            .collect();
        for other in cancelled {
            if let Some(effect) = self.remove_effect_instance(other) {
                tracing::debug!(
                    target: "gameplay::effects",
                    entity = %self.entity,
                    effect = %effect.effect_tag(),
                    cancelled_by = %effect_tag,
                    "status effect cancelled"
                );
            }
        }

        tracing::debug!(
            target: "gameplay::effects",
            entity = %self.entity,
            effect = %effect_tag,
            modifiers = self.status_effects.get(key).map_or(0, StatusEffect::modifier_count),
            "status effect applied"
        );
        Ok(StatusEffectHandle::new(self.entity, key))
    }

    /// Undoes a partially applied effect. Instant templates already changed
    /// base values and cannot be reverted.
    fn rollback_status_effect(&mut self, key: SlotKey) {
        let Some(effect) = self.status_effects.remove(key) else {
            return;
        };
        for modifier in &effect.modifiers {
            self.release_modifier(*modifier, false);
        }
        let instants = effect
            .definition()
            .modifiers
            .values()
            .filter(|spec| !spec.application.is_tracked())
            .count();
        if instants > 0 {
            tracing::warn!(
                target: "gameplay::effects",
                entity = %self.entity,
                effect = %effect.effect_tag(),
                instants,
                "rolled back status effect after instant modifiers were applied"
            );
        }
    }

    /// Drops an active instance: its modifiers first, then its tag counts.
    pub(super) fn remove_effect_instance(&mut self, key: SlotKey) -> Option<StatusEffect> {
        let effect = self.status_effects.remove(key)?;
        for modifier in &effect.modifiers {
            self.release_modifier(*modifier, false);
        }

        self.state_tags.remove(effect.effect_tag());
        for tag in &effect.definition().state_tags_to_add {
            self.state_tags.remove(tag);
        }

        tracing::debug!(
            target: "gameplay::effects",
            entity = %self.entity,
            effect = %effect.effect_tag(),
            "status effect removed"
        );
        Some(effect)
    }

    /// Removes effects whose last tracked modifier expired this step.
    pub(super) fn remove_finished_effects(&mut self) {
        for key in std::mem::take(&mut self.finished_effects) {
            let finished = self
                .status_effects
                .get(key)
                .is_some_and(|effect| effect.modifiers.is_empty());
            if finished {
                self.remove_effect_instance(key);
            }
        }
    }

    fn status_effect_keys(&self, effect_tag: &Tag) -> Vec<SlotKey> {
        self.status_effects
            .iter()
            .filter(|(_, effect)| effect.effect_tag() == effect_tag)
            .map(|(key, _)| key)
            .collect()
    }
}

fn template_error(effect: &Tag, attribute: &Tag, source: StateError) -> StatusEffectError {
    match source {
        StateError::Oracle(error) => StatusEffectError::Oracle(error),
        source => StatusEffectError::Modifier {
            effect: effect.clone(),
            attribute: attribute.clone(),
            source,
        },
    }
}

fn effect_handle_error(error: StateError) -> StatusEffectError {
    match error {
        StateError::ForeignHandle { .. } => StatusEffectError::ForeignHandle,
        _ => StatusEffectError::StaleHandle,
    }
}
