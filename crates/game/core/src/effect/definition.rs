//! Read-only status-effect definitions.
use std::collections::BTreeMap;

use crate::modifier::{
    CalculationType, ModifierDelegate, ModifierSpec, ModifierSpecError, SpecContext,
};
use crate::tag::{Tag, TagSet};

/// Whether several instances of one effect may be active on an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StackingPolicy {
    /// A second application is rejected while one instance is active.
    #[default]
    Exclusive,
    /// Every application creates a new instance.
    Stackable,
}

/// Data describing one status effect.
///
/// `modifiers` maps each affected attribute to the modifier applied to it.
/// `behavior` is the scripted hook bound into `SetByEffect` templates when the
/// effect is applied; it cannot come from data files and is attached by the
/// host after loading.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffectDefinition {
    pub effect_tag: Tag,
    #[cfg_attr(feature = "serde", serde(default))]
    pub categories: TagSet,
    #[cfg_attr(feature = "serde", serde(default))]
    pub state_tags_to_add: TagSet,
    #[cfg_attr(feature = "serde", serde(default))]
    pub blocking_tags: TagSet,
    #[cfg_attr(feature = "serde", serde(default))]
    pub enabling_tags: TagSet,
    #[cfg_attr(feature = "serde", serde(default))]
    pub effects_to_cancel: TagSet,
    #[cfg_attr(feature = "serde", serde(default))]
    pub effect_categories_to_cancel: TagSet,
    #[cfg_attr(feature = "serde", serde(default))]
    pub stacking: StackingPolicy,
    #[cfg_attr(feature = "serde", serde(default))]
    pub modifiers: BTreeMap<Tag, ModifierSpec>,
    /// End the instance once every tracked modifier it created has expired.
    #[cfg_attr(feature = "serde", serde(default = "default_true"))]
    pub remove_when_modifiers_expire: bool,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub behavior: Option<ModifierDelegate>,
}

#[cfg(feature = "serde")]
fn default_true() -> bool {
    true
}

/// Configuration problems found by [`StatusEffectDefinition::validate`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionIssue {
    #[error("effect tag is empty")]
    InvalidEffectTag,

    #[error("modifier template targets an empty attribute tag")]
    InvalidAttributeTag,

    #[error("modifier on {attribute}: {error}")]
    Modifier {
        attribute: Tag,
        error: ModifierSpecError,
    },

    #[error("tag {0} is both blocking and enabling")]
    ContradictoryTag(Tag),

    #[error("template on {0} is SetByEffect but the definition has no behavior")]
    MissingBehavior(Tag),
}

impl StatusEffectDefinition {
    pub fn new(effect_tag: impl Into<Tag>) -> Self {
        Self {
            effect_tag: effect_tag.into(),
            categories: TagSet::new(),
            state_tags_to_add: TagSet::new(),
            blocking_tags: TagSet::new(),
            enabling_tags: TagSet::new(),
            effects_to_cancel: TagSet::new(),
            effect_categories_to_cancel: TagSet::new(),
            stacking: StackingPolicy::Exclusive,
            modifiers: BTreeMap::new(),
            remove_when_modifiers_expire: true,
            behavior: None,
        }
    }

    pub fn with_modifier(mut self, attribute: impl Into<Tag>, spec: ModifierSpec) -> Self {
        self.modifiers.insert(attribute.into(), spec);
        self
    }

    pub fn with_category(mut self, category: impl Into<Tag>) -> Self {
        self.categories.insert(category.into());
        self
    }

    pub fn with_state_tag(mut self, tag: impl Into<Tag>) -> Self {
        self.state_tags_to_add.insert(tag.into());
        self
    }

    pub fn with_blocking_tag(mut self, tag: impl Into<Tag>) -> Self {
        self.blocking_tags.insert(tag.into());
        self
    }

    pub fn with_enabling_tag(mut self, tag: impl Into<Tag>) -> Self {
        self.enabling_tags.insert(tag.into());
        self
    }

    pub fn cancelling_effect(mut self, effect: impl Into<Tag>) -> Self {
        self.effects_to_cancel.insert(effect.into());
        self
    }

    pub fn cancelling_category(mut self, category: impl Into<Tag>) -> Self {
        self.effect_categories_to_cancel.insert(category.into());
        self
    }

    pub fn with_stacking(mut self, stacking: StackingPolicy) -> Self {
        self.stacking = stacking;
        self
    }

    pub fn with_behavior(mut self, behavior: ModifierDelegate) -> Self {
        self.behavior = Some(behavior);
        self
    }

    pub fn keep_after_modifiers_expire(mut self) -> Self {
        self.remove_when_modifiers_expire = false;
        self
    }

    /// True if an instance of this definition is cancelled by `other`.
    pub fn is_cancelled_by(&self, other: &StatusEffectDefinition) -> bool {
        self.effect_tag.matches_any(&other.effects_to_cancel)
            || self
                .categories
                .iter()
                .any(|category| category.matches_any(&other.effect_categories_to_cancel))
    }

    /// Collects every configuration problem. An empty list means the
    /// definition can be registered.
    ///
    /// `SetByEffect` templates without a behavior are reported only when
    /// `require_behavior` is set, since data files never carry behaviors.
    pub fn validate(&self, require_behavior: bool) -> Vec<DefinitionIssue> {
        let mut issues = Vec::new();

        if !self.effect_tag.is_valid() {
            issues.push(DefinitionIssue::InvalidEffectTag);
        }

        for tag in self.blocking_tags.intersection(&self.enabling_tags) {
            issues.push(DefinitionIssue::ContradictoryTag(tag.clone()));
        }

        for (attribute, spec) in &self.modifiers {
            if !attribute.is_valid() {
                issues.push(DefinitionIssue::InvalidAttributeTag);
                continue;
            }
            issues.extend(spec.errors(SpecContext::Definition).into_iter().map(|error| {
                DefinitionIssue::Modifier {
                    attribute: attribute.clone(),
                    error,
                }
            }));
            if require_behavior
                && spec.calculation == CalculationType::SetByEffect
                && self.behavior.is_none()
            {
                issues.push(DefinitionIssue::MissingBehavior(attribute.clone()));
            }
        }

        issues
    }

    /// Modifier specs ready to apply, with `SetByEffect` templates bound to
    /// this definition's behavior.
    pub(crate) fn bound_modifiers(&self) -> Vec<(Tag, ModifierSpec)> {
        self.modifiers
            .iter()
            .map(|(attribute, template)| {
                let mut spec = template.clone();
                if spec.calculation == CalculationType::SetByEffect && spec.delegate.is_none() {
                    spec.delegate = self.behavior.clone();
                }
                (attribute.clone(), spec)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifier::{ApplicationType, OperationType};

    #[test]
    fn validate_reports_every_problem() {
        let definition = StatusEffectDefinition::new("")
            .with_blocking_tag("State.Dead")
            .with_enabling_tag("State.Dead")
            .with_modifier(
                "Attribute.Health",
                ModifierSpec::new(
                    ApplicationType::Ticking,
                    CalculationType::SetByCaller,
                    OperationType::Multiply,
                    2.0,
                ),
            );

        let issues = definition.validate(false);
        assert!(issues.contains(&DefinitionIssue::InvalidEffectTag));
        assert!(issues.contains(&DefinitionIssue::ContradictoryTag(Tag::new("State.Dead"))));
        assert!(issues.iter().any(|issue| matches!(
            issue,
            DefinitionIssue::Modifier {
                error: ModifierSpecError::ForbiddenOperation { .. },
                ..
            }
        )));
    }

    #[test]
    fn set_by_effect_templates_bind_behavior() {
        let definition = StatusEffectDefinition::new("Effect.Regen")
            .with_modifier(
                "Attribute.Health",
                ModifierSpec::persistent(OperationType::Additive, 0.0)
                    .with_calculation(CalculationType::SetByEffect),
            );
        assert!(definition.validate(false).is_empty());
        assert_eq!(
            definition.validate(true),
            vec![DefinitionIssue::MissingBehavior(Tag::new("Attribute.Health"))]
        );

        let definition =
            definition.with_behavior(ModifierDelegate::from_fns(|_| true, |_| 3.0));
        let bound = definition.bound_modifiers();
        assert!(bound[0].1.delegate.is_some());
        assert!(bound[0].1.is_valid(SpecContext::Runtime));
    }

    #[test]
    fn cancellation_matches_tags_and_categories() {
        let burning = StatusEffectDefinition::new("Effect.Burning").with_category("Effect.Fire");
        let douse = StatusEffectDefinition::new("Effect.Wet").cancelling_category("Effect.Fire");
        let cleanse = StatusEffectDefinition::new("Effect.Cleanse").cancelling_effect("Effect");
        let unrelated = StatusEffectDefinition::new("Effect.Haste");

        assert!(burning.is_cancelled_by(&douse));
        assert!(burning.is_cancelled_by(&cleanse));
        assert!(!burning.is_cancelled_by(&unrelated));
    }
}
