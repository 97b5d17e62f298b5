//! Modifier creation, updates and removal.
use std::sync::Arc;

use super::{GameplayState, ModifierHandle, SlotKey, StateError};
use crate::attribute::{AttributeDependency, ValueChange};
use crate::env::GameplayEnv;
use crate::error::reject;
use crate::modifier::{
    ApplicationType, CalculationType, Curve, Modifier, ModifierSpec, OperationType, SpecContext,
};
use crate::tag::Tag;

impl GameplayState {
    /// Applies `spec` to the attribute `tag`.
    ///
    /// Instant modifiers change the base value right away and return
    /// `Ok(None)`; every other type is stored and returns its handle.
    ///
    /// # Errors
    ///
    /// Fails without touching any state if the attribute is missing or
    /// overridden, the spec is invalid, a `SetByAttribute` source is missing
    /// or would close a dependency cycle, or a `SetByData` curve cannot be
    /// resolved.
    pub fn modify_attribute(
        &mut self,
        env: GameplayEnv<'_>,
        tag: &Tag,
        spec: ModifierSpec,
    ) -> Result<Option<ModifierHandle>, StateError> {
        let curve = self
            .check_modifier(env, tag, &spec)
            .map_err(|error| reject("modify_attribute", error))?;
        Ok(self.commit_modifier(tag, &spec, curve, None))
    }

    /// Freezes an attribute at its current value with a persistent override.
    pub fn inhibit_attribute(&mut self, tag: &Tag) -> Result<ModifierHandle, StateError> {
        let current = self
            .current_value(tag)
            .ok_or_else(|| {
                reject("inhibit_attribute", StateError::AttributeNotFound(tag.clone()))
            })?;
        let spec = ModifierSpec::persistent(OperationType::Override, current)
            .recalculate_immediately(true);

        let curve = self
            .check_modifier(GameplayEnv::empty(), tag, &spec)
            .map_err(|error| reject("inhibit_attribute", error))?;
        let key = self.insert_tracked(tag, &spec, curve, None);
        Ok(ModifierHandle::new(self.entity, key))
    }

    /// Removes a stored modifier and marks its attribute dirty.
    ///
    /// # Errors
    ///
    /// Fails if the handle is invalid, belongs to another entity, or its slot
    /// no longer holds the modifier it was issued for.
    pub fn remove_modifier(&mut self, handle: ModifierHandle) -> Result<(), StateError> {
        let key = self
            .resolve(handle, |key| self.modifiers.contains(key))
            .map_err(|error| reject("remove_modifier", error))?;
        self.release_modifier(key, false);
        Ok(())
    }

    /// Pushes a new value into a `SetExternally` modifier.
    pub fn set_modifier_value(
        &mut self,
        handle: ModifierHandle,
        value: f32,
    ) -> Result<(), StateError> {
        let key = self
            .resolve(handle, |key| self.modifiers.contains(key))
            .map_err(|error| reject("set_modifier_value", error))?;

        let Some(modifier) = self.modifiers.get_mut(key) else {
            return Err(reject("set_modifier_value", StateError::StaleHandle));
        };
        if modifier.calculation() != CalculationType::SetExternally {
            return Err(reject("set_modifier_value", StateError::NotSetExternally));
        }
        modifier.value = value;
        let attribute = modifier.attribute().clone();
        self.mark_dirty(&attribute);
        Ok(())
    }

    pub fn modifier(&self, handle: ModifierHandle) -> Option<&Modifier> {
        let key = self.resolve(handle, |key| self.modifiers.contains(key)).ok()?;
        self.modifiers.get(key)
    }

    pub fn is_modifier_handle_valid(&self, handle: ModifierHandle) -> bool {
        self.modifier(handle).is_some()
    }

    /// Handles of the modifiers currently active on `tag`.
    pub fn modifier_handles(&self, tag: &Tag) -> Vec<ModifierHandle> {
        self.attribute(tag)
            .map(|attribute| {
                attribute
                    .active_modifiers
                    .iter()
                    .map(|key| ModifierHandle::new(self.entity, *key))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn modifier_count(&self) -> usize {
        self.modifiers.len()
    }

    // ===== internals =====

    /// Runs every check `commit_modifier` relies on, without mutating.
    ///
    /// Returns the resolved curve for `SetByData` specs.
    pub(super) fn check_modifier(
        &self,
        env: GameplayEnv<'_>,
        tag: &Tag,
        spec: &ModifierSpec,
    ) -> Result<Option<Arc<Curve>>, StateError> {
        let attribute = self
            .attribute(tag)
            .ok_or_else(|| StateError::AttributeNotFound(tag.clone()))?;
        if attribute.is_overridden() {
            return Err(StateError::AttributeOverridden(tag.clone()));
        }

        spec.validate(SpecContext::Runtime)
            .map_err(|source| StateError::InvalidModifier {
                attribute: tag.clone(),
                source,
            })?;

        if !spec.application.is_tracked() {
            return Ok(None);
        }

        match spec.calculation {
            CalculationType::SetByAttribute => {
                let Some(source) = spec.source_attribute.as_ref() else {
                    return Err(StateError::InvalidModifier {
                        attribute: tag.clone(),
                        source: crate::modifier::ModifierSpecError::MissingSourceAttribute,
                    });
                };
                if !self.has_attribute(source) {
                    return Err(StateError::SourceAttributeNotFound {
                        attribute: tag.clone(),
                        source_attribute: source.clone(),
                    });
                }
                if self.would_create_cycle(source, tag) {
                    return Err(StateError::DependencyCycle {
                        attribute: tag.clone(),
                        source_attribute: source.clone(),
                    });
                }
                Ok(None)
            }
            CalculationType::SetByData => {
                let Some(params) = spec.curve.as_ref() else {
                    return Err(StateError::InvalidModifier {
                        attribute: tag.clone(),
                        source: crate::modifier::ModifierSpecError::MissingCurve,
                    });
                };
                let curve = env
                    .curves()?
                    .curve(&params.tag)
                    .ok_or_else(|| StateError::CurveNotFound(params.tag.clone()))?;
                Ok(Some(curve))
            }
            _ => Ok(None),
        }
    }

    /// True if a modifier on `target` reading `source` would close a loop,
    /// i.e. `source` already depends on `target` directly or transitively.
    pub(super) fn would_create_cycle(&self, source: &Tag, target: &Tag) -> bool {
        if source == target {
            return true;
        }

        let mut pending = vec![target];
        let mut visited = std::collections::HashSet::new();
        while let Some(tag) = pending.pop() {
            if !visited.insert(tag) {
                continue;
            }
            let Some(attribute) = self.attribute(tag) else {
                continue;
            };
            for dependent in attribute.dependent_tags() {
                if dependent == source {
                    return true;
                }
                pending.push(dependent);
            }
        }
        false
    }

    /// Applies a spec that already passed `check_modifier`.
    pub(super) fn commit_modifier(
        &mut self,
        tag: &Tag,
        spec: &ModifierSpec,
        curve: Option<Arc<Curve>>,
        status_effect: Option<SlotKey>,
    ) -> Option<ModifierHandle> {
        if spec.application == ApplicationType::Instant {
            self.apply_immediate_modifier(tag, spec);
            return None;
        }
        let key = self.insert_tracked(tag, spec, curve, status_effect);
        Some(ModifierHandle::new(self.entity, key))
    }

    pub(super) fn insert_tracked(
        &mut self,
        tag: &Tag,
        spec: &ModifierSpec,
        curve: Option<Arc<Curve>>,
        status_effect: Option<SlotKey>,
    ) -> SlotKey {
        let mut modifier = Modifier::from_spec(tag.clone(), spec, self.latest_step, curve);
        modifier.status_effect = status_effect;

        let source_key = match (spec.calculation, modifier.source_attribute()) {
            (CalculationType::SetByAttribute, Some(source)) => {
                self.attribute_index.get(source).copied()
            }
            _ => None,
        };
        if let Some(source) = source_key.and_then(|key| self.attributes.get(key)) {
            modifier.value = source.current_value();
        }

        let key = self.modifiers.insert(modifier);

        if let Some(source) = source_key.and_then(|key| self.attributes.get_mut(key)) {
            source.dependents.push(AttributeDependency {
                dependent: tag.clone(),
                modifier: key,
            });
        }

        let Some(&attribute_key) = self.attribute_index.get(tag) else {
            return key;
        };
        if let Some(attribute) = self.attributes.get_mut(attribute_key) {
            attribute.active_modifiers.push(key);
            if spec.operation == OperationType::Override {
                attribute.overriding_modifier = Some(key);
            }
            attribute.dirty = true;
        }

        tracing::trace!(
            target: "gameplay::state",
            entity = %self.entity,
            attribute = %tag,
            application = %spec.application,
            operation = %spec.operation,
            "modifier added"
        );

        if spec.recalculate_immediately {
            self.recalculate_attribute(attribute_key, self.latest_step);
        }
        key
    }

    /// Permanently applies an instant modifier to the base value. The current
    /// value moves by the same delta; both are then clamped.
    fn apply_immediate_modifier(&mut self, tag: &Tag, spec: &ModifierSpec) {
        let Some(&key) = self.attribute_index.get(tag) else {
            return;
        };
        let Some(attribute) = self.attributes.get_mut(key) else {
            return;
        };

        let old = attribute.values();
        if let Some(delta) = spec.clamping {
            for clamping in [&mut attribute.clamping, &mut attribute.effective_clamping]
                .into_iter()
                .flatten()
            {
                clamping.base = clamping.base.shifted(delta.min_delta, delta.max_delta);
                clamping.current = clamping.current.shifted(delta.min_delta, delta.max_delta);
            }
        }

        let new_base = match spec.operation {
            OperationType::Additive | OperationType::PostAdditive => old.0 + spec.value,
            OperationType::Override => spec.value,
            OperationType::Multiply => old.0 * (1.0 + spec.value),
        };
        attribute.base_value = new_base;
        attribute.current_value = old.1 + (new_base - old.0);
        attribute.clamp_values();
        // Current-value modifiers may scale the base; rebuild on the next tick.
        attribute.dirty = true;

        let new = attribute.values();
        tracing::trace!(
            target: "gameplay::state",
            entity = %self.entity,
            attribute = %tag,
            base = new.0,
            current = new.1,
            "instant modifier applied"
        );
        if !ValueChange::between(old, new, self.value_tolerance).is_empty() {
            self.notify_attribute_changed(key, old, new);
        }
    }

    /// Detaches and drops a stored modifier.
    ///
    /// `expired` marks removals caused by the fixed tick; those may finish an
    /// owning status effect whose last modifier just ended.
    pub(super) fn release_modifier(&mut self, key: SlotKey, expired: bool) -> Option<Modifier> {
        let modifier = self.modifiers.remove(key)?;

        if let Some(attribute) = self
            .attribute_index
            .get(modifier.attribute())
            .and_then(|attribute_key| self.attributes.get_mut(*attribute_key))
        {
            attribute.detach_modifier(key);
            attribute.dirty = true;
        }

        if let Some(source) = modifier
            .source_attribute()
            .and_then(|source| self.attribute_index.get(source))
            .and_then(|source_key| self.attributes.get_mut(*source_key))
        {
            source.remove_dependency(key);
        }

        if let Some(effect_key) = modifier.status_effect {
            if let Some(effect) = self.status_effects.get_mut(effect_key) {
                effect.modifiers.retain(|owned| *owned != key);
                if expired
                    && effect.modifiers.is_empty()
                    && effect.definition().remove_when_modifiers_expire
                {
                    self.finished_effects.push(effect_key);
                }
            }
        }

        tracing::trace!(
            target: "gameplay::state",
            entity = %self.entity,
            attribute = %modifier.attribute(),
            expired,
            "modifier removed"
        );
        Some(modifier)
    }
}
