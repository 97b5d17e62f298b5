//! The fixed-step pass and attribute aggregation.
//!
//! Each step runs four phases:
//! 1. scan modifiers, refresh dynamic values, mark attributes dirty and sort
//!    expired modifiers into pre- and post-recalculation removal lists
//! 2. drop modifiers whose final contribution does not count
//! 3. recalculate every attribute that was dirty when the phase started
//! 4. drop expired modifiers that applied one last time
//!
//! Status effects left without modifiers are removed afterwards.
use super::{GameplayState, SlotKey};
use crate::attribute::{AttributeChanged, ValueChange};
use crate::modifier::{ApplicationType, OperationType};
use crate::tick::FixedTick;

/// One `(additive, multiplier, post-additive)` triple.
#[derive(Clone, Copy, Debug)]
struct Accumulator {
    additive: f32,
    multiplier: f32,
    post_additive: f32,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self {
            additive: 0.0,
            multiplier: 1.0,
            post_additive: 0.0,
        }
    }
}

impl Accumulator {
    fn add(&mut self, operation: OperationType, value: f32) {
        match operation {
            OperationType::Additive => self.additive += value,
            // Multipliers sum: two +50% modifiers give x2, not x2.25.
            OperationType::Multiply => self.multiplier += value,
            OperationType::PostAdditive => self.post_additive += value,
            // Overrides short-circuit aggregation entirely.
            OperationType::Override => {}
        }
    }

    fn apply(&self, value: f32) -> f32 {
        (value + self.additive) * self.multiplier + self.post_additive
    }
}

impl FixedTick for GameplayState {
    fn fixed_tick(&mut self, step: u64) {
        self.latest_step = step;

        let mut remove_before = Vec::new();
        let mut remove_after = Vec::new();

        for key in self.modifiers.keys() {
            let Some(modifier) = self.modifiers.get_mut(key) else {
                continue;
            };
            let expired = modifier.has_expired(step);

            // Expiry is checked even off-interval so a periodic modifier whose
            // duration is not a multiple of its interval still ends on time.
            if !modifier.can_apply(step) {
                if expired {
                    remove_before.push(key);
                }
                continue;
            }

            let Some(&attribute_key) = self.attribute_index.get(modifier.attribute()) else {
                tracing::error!(
                    target: "gameplay::state",
                    entity = %self.entity,
                    attribute = %modifier.attribute(),
                    "modifier targets a missing attribute"
                );
                remove_before.push(key);
                continue;
            };

            if expired {
                if modifier.applies_on_removal() {
                    remove_after.push(key);
                } else {
                    remove_before.push(key);
                    continue;
                }
            }

            let mut changed = false;
            if modifier.calculation().is_dynamic() && modifier.should_recalculate() {
                let old = modifier.value();
                let new = modifier.recalculate();
                changed = (new - old).abs() > self.value_tolerance;
            }

            if changed || modifier.application() != ApplicationType::Persistent {
                if let Some(attribute) = self.attributes.get_mut(attribute_key) {
                    attribute.dirty = true;
                }
            }
        }

        for key in remove_before {
            self.release_modifier(key, true);
        }

        let dirty: Vec<SlotKey> = self
            .attributes
            .iter()
            .filter(|(_, attribute)| attribute.dirty)
            .map(|(key, _)| key)
            .collect();
        for key in dirty {
            self.recalculate_attribute(key, step);
        }

        for key in remove_after {
            self.release_modifier(key, true);
        }

        self.remove_finished_effects();
    }
}

impl GameplayState {
    /// Rebuilds base and current value of one attribute from its modifiers.
    pub(super) fn recalculate_attribute(&mut self, key: SlotKey, step: u64) {
        let Some(attribute) = self.attributes.get_mut(key) else {
            return;
        };
        attribute.dirty = false;
        let old = attribute.values();
        attribute.effective_clamping = attribute.clamping;

        if let Some(overriding) = attribute.overriding_modifier {
            if let Some(modifier) = self.modifiers.get(overriding) {
                attribute.current_value = modifier.value();
            }
        } else {
            let mut bounds = attribute.clamping;
            let mut base = Accumulator::default();
            let mut current = Accumulator::default();

            for modifier_key in &attribute.active_modifiers {
                let Some(modifier) = self.modifiers.get_mut(*modifier_key) else {
                    continue;
                };
                if !modifier.can_apply(step) {
                    continue;
                }

                if let (Some(delta), Some(bounds)) = (modifier.clamping(), bounds.as_mut()) {
                    bounds.base = bounds.base.shifted(delta.min_delta, delta.max_delta);
                    bounds.current = bounds.current.shifted(delta.min_delta, delta.max_delta);
                }

                let accumulator = if modifier.affects_base() {
                    &mut base
                } else {
                    &mut current
                };
                accumulator.add(modifier.operation(), modifier.value());
                modifier.post_apply(step);
            }

            let new_base = base.apply(attribute.base_value);
            attribute.effective_clamping = bounds;
            attribute.base_value = new_base;
            attribute.current_value = current.apply(new_base);
        }
        attribute.clamp_values();

        let new = attribute.values();
        if !ValueChange::between(old, new, self.value_tolerance).is_empty() {
            self.notify_attribute_changed(key, old, new);
        }
    }

    /// Pushes a real value change into dependent modifiers and listeners.
    ///
    /// Dependent attributes are only marked dirty. Ones already recalculated
    /// this step pick the change up on the next step.
    pub(super) fn notify_attribute_changed(
        &mut self,
        key: SlotKey,
        old: (f32, f32),
        new: (f32, f32),
    ) {
        let Some(attribute) = self.attributes.get(key) else {
            return;
        };
        let tag = attribute.tag().clone();
        let dependents = attribute.dependents.clone();

        for edge in dependents {
            if let Some(modifier) = self.modifiers.get_mut(edge.modifier) {
                modifier.value = new.1;
            }
            self.mark_dirty(&edge.dependent);
        }

        tracing::debug!(
            target: "gameplay::state",
            entity = %self.entity,
            attribute = %tag,
            old_base = old.0,
            old_current = old.1,
            new_base = new.0,
            new_current = new.1,
            "attribute changed"
        );

        self.listeners.emit(&AttributeChanged {
            tag,
            new_base: new.0,
            new_current: new.1,
            old_base: old.0,
            old_current: old.1,
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::attribute::AttributeInit;
    use crate::env::GameplayEnv;
    use crate::modifier::{CalculationType, ModifierSpec};
    use crate::state::EntityId;
    use crate::tag::Tag;

    fn health() -> Tag {
        Tag::new("Attribute.Health")
    }

    fn state(init: AttributeInit) -> GameplayState {
        let mut state = GameplayState::new(EntityId(1));
        state.add_attribute(health(), init).unwrap();
        state
    }

    fn apply(state: &mut GameplayState, spec: ModifierSpec) {
        state
            .modify_attribute(GameplayEnv::empty(), &health(), spec)
            .unwrap();
    }

    fn periodic_damage(apply_on_removal: bool) -> ModifierSpec {
        ModifierSpec::new(
            ApplicationType::Periodic,
            CalculationType::SetByCaller,
            OperationType::Additive,
            -5.0,
        )
        .with_periodic(5, 50, false, apply_on_removal)
    }

    #[test]
    fn persistent_multiply_scales_current_only() {
        let mut state = state(AttributeInit::new(40.0));
        apply(&mut state, ModifierSpec::persistent(OperationType::Multiply, 0.5));

        state.fixed_tick(1);
        assert_eq!(state.current_value(&health()), Some(60.0));
        assert_eq!(state.base_value(&health()), Some(40.0));

        state.fixed_tick(2);
        assert_eq!(state.current_value(&health()), Some(60.0));
    }

    #[test]
    fn multipliers_accumulate_additively() {
        let mut state = state(AttributeInit::new(10.0));
        apply(&mut state, ModifierSpec::persistent(OperationType::Multiply, 0.5));
        apply(&mut state, ModifierSpec::persistent(OperationType::Multiply, 0.5));
        state.fixed_tick(1);
        assert_eq!(state.current_value(&health()), Some(20.0));
    }

    #[test]
    fn aggregation_order_is_additive_multiply_post_additive() {
        let mut state = state(AttributeInit::new(10.0));
        apply(&mut state, ModifierSpec::persistent(OperationType::PostAdditive, 3.0));
        apply(&mut state, ModifierSpec::persistent(OperationType::Multiply, 1.0));
        apply(&mut state, ModifierSpec::persistent(OperationType::Additive, 5.0));
        state.fixed_tick(1);
        assert_eq!(state.current_value(&health()), Some(33.0));
    }

    #[test]
    fn periodic_applies_through_final_step_when_applied_on_removal() {
        let mut state = state(AttributeInit::new(100.0));
        apply(&mut state, periodic_damage(true));

        let mut decreases = Vec::new();
        for step in 1..=51 {
            let before = state.base_value(&health()).unwrap();
            state.fixed_tick(step);
            if state.base_value(&health()).unwrap() < before {
                decreases.push(step);
            }
        }

        assert_eq!(decreases, (5..=50).step_by(5).collect::<Vec<_>>());
        assert_eq!(state.base_value(&health()), Some(50.0));
        assert_eq!(state.modifier_count(), 0);
        assert!(state.modifier_handles(&health()).is_empty());
    }

    #[test]
    fn periodic_expiry_drops_final_application_by_default() {
        let mut state = state(AttributeInit::new(100.0));
        apply(&mut state, periodic_damage(false));

        for step in 1..=50 {
            state.fixed_tick(step);
        }
        assert_eq!(state.base_value(&health()), Some(55.0));
        assert_eq!(state.modifier_count(), 0);
    }

    #[test]
    fn periodic_with_uneven_duration_still_expires() {
        let mut state = state(AttributeInit::new(100.0));
        apply(
            &mut state,
            ModifierSpec::new(
                ApplicationType::Periodic,
                CalculationType::SetByCaller,
                OperationType::Additive,
                -1.0,
            )
            .with_periodic(7, 10, false, true),
        );

        for step in 1..=10 {
            state.fixed_tick(step);
        }
        assert_eq!(state.base_value(&health()), Some(99.0));
        assert_eq!(state.modifier_count(), 0);
    }

    #[test]
    fn duration_modifier_reverts_after_expiry() {
        let mut state = state(AttributeInit::new(10.0));
        apply(
            &mut state,
            ModifierSpec::new(
                ApplicationType::Duration,
                CalculationType::SetByCaller,
                OperationType::Additive,
                5.0,
            )
            .with_duration(3, false),
        );
        assert_eq!(state.current_value(&health()), Some(15.0));

        state.fixed_tick(1);
        state.fixed_tick(2);
        assert_eq!(state.current_value(&health()), Some(15.0));

        state.fixed_tick(3);
        assert_eq!(state.current_value(&health()), Some(10.0));
        assert_eq!(state.modifier_count(), 0);
    }

    #[test]
    fn ticking_modifier_applies_every_step() {
        let mut state = state(AttributeInit::clamped(0.0, 0.0, 3.0));
        apply(
            &mut state,
            ModifierSpec::new(
                ApplicationType::Ticking,
                CalculationType::SetByCaller,
                OperationType::Additive,
                1.0,
            ),
        );
        for step in 1..=5 {
            state.fixed_tick(step);
        }
        assert_eq!(state.base_value(&health()), Some(3.0));
        assert_eq!(state.modifier_count(), 1);
    }

    #[test]
    fn same_step_recalculation_does_not_repeat_a_tick() {
        let mut state = state(AttributeInit::new(10.0));
        apply(
            &mut state,
            ModifierSpec::new(
                ApplicationType::Ticking,
                CalculationType::SetByCaller,
                OperationType::Additive,
                1.0,
            ),
        );
        state.fixed_tick(1);
        assert_eq!(state.base_value(&health()), Some(11.0));

        // The buff recalculates the attribute again at step 1.
        apply(
            &mut state,
            ModifierSpec::new(
                ApplicationType::Duration,
                CalculationType::SetByCaller,
                OperationType::Additive,
                5.0,
            )
            .with_duration(10, false),
        );
        assert_eq!(state.base_value(&health()), Some(11.0));
        assert_eq!(state.current_value(&health()), Some(16.0));

        state.fixed_tick(2);
        assert_eq!(state.base_value(&health()), Some(12.0));
        assert_eq!(state.current_value(&health()), Some(17.0));
    }

    #[test]
    fn clamp_delta_widens_bounds_while_active() {
        let mut state = state(AttributeInit::clamped(100.0, 0.0, 100.0));
        apply(
            &mut state,
            ModifierSpec::persistent(OperationType::Additive, 50.0).with_clamping(0.0, 25.0),
        );
        state.fixed_tick(1);
        assert_eq!(state.current_value(&health()), Some(125.0));
        assert_eq!(
            state.attribute(&health()).and_then(|a| a.current_range()).map(|r| r.max),
            Some(125.0)
        );
    }

    #[test]
    fn override_sets_current_and_keeps_base() {
        let mut state = state(AttributeInit::new(10.0));
        apply(&mut state, ModifierSpec::persistent(OperationType::Additive, 5.0));
        apply(&mut state, ModifierSpec::persistent(OperationType::Override, 1.0));
        state.fixed_tick(1);
        assert_eq!(state.current_value(&health()), Some(1.0));
        assert_eq!(state.base_value(&health()), Some(10.0));
    }

    #[test]
    fn listeners_fire_only_on_real_changes() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut state = state(AttributeInit::new(10.0));
        state
            .subscribe(&health(), move |change| {
                sink.lock().unwrap().push((change.old_current, change.new_current))
            })
            .unwrap();

        apply(&mut state, ModifierSpec::persistent(OperationType::Additive, 2.0));
        state.fixed_tick(1);
        state.fixed_tick(2);

        assert_eq!(*seen.lock().unwrap(), vec![(10.0, 12.0)]);
    }

    proptest::proptest! {
        #[test]
        fn clamped_values_stay_in_range(
            initial in -500.0f32..500.0,
            additive in -500.0f32..500.0,
            multiplier in -2.0f32..2.0,
            post_additive in -500.0f32..500.0,
            ticking in -50.0f32..50.0,
            steps in 1u64..20,
        ) {
            let mut state = state(AttributeInit::clamped(initial, -100.0, 100.0));
            apply(&mut state, ModifierSpec::persistent(OperationType::Additive, additive));
            apply(&mut state, ModifierSpec::persistent(OperationType::Multiply, multiplier));
            apply(&mut state, ModifierSpec::persistent(OperationType::PostAdditive, post_additive));
            apply(
                &mut state,
                ModifierSpec::new(
                    ApplicationType::Ticking,
                    CalculationType::SetByCaller,
                    OperationType::Additive,
                    ticking,
                ),
            );

            for step in 1..=steps {
                state.fixed_tick(step);
                let attribute = state.attribute(&health()).unwrap();
                proptest::prop_assert!((-100.0..=100.0).contains(&attribute.base_value()));
                proptest::prop_assert!((-100.0..=100.0).contains(&attribute.current_value()));
            }
        }
    }

    #[test]
    fn dependency_chain_resolves_one_hop_per_step() {
        let mut state = GameplayState::new(EntityId(1));
        for name in ["A", "B", "C"] {
            state.add_attribute(name, AttributeInit::new(0.0)).unwrap();
        }
        let reads = |source: &str| {
            ModifierSpec::persistent(OperationType::Additive, 0.0)
                .with_calculation(CalculationType::SetByAttribute)
                .with_source_attribute(source)
        };
        state
            .modify_attribute(GameplayEnv::empty(), &Tag::new("C"), reads("B"))
            .unwrap();
        state
            .modify_attribute(GameplayEnv::empty(), &Tag::new("B"), reads("A"))
            .unwrap();
        state.fixed_tick(1);

        state
            .modify_attribute(
                GameplayEnv::empty(),
                &Tag::new("A"),
                ModifierSpec::instant(OperationType::Additive, 4.0),
            )
            .unwrap();
        state.fixed_tick(2);
        assert_eq!(state.current_value(&Tag::new("B")), Some(4.0));

        state.fixed_tick(3);
        assert_eq!(state.current_value(&Tag::new("C")), Some(4.0));
    }
}
