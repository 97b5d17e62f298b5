//! Live modifiers stored in an entity's modifier arena.
use std::sync::Arc;

use super::curve::Curve;
use super::delegate::ModifierDelegate;
use super::spec::{ClampDelta, ModifierSpec};
use super::types::{ApplicationType, CalculationType, OperationType};
use crate::state::SlotKey;
use crate::tag::Tag;

#[derive(Clone, Debug)]
struct CurveProgress {
    tag: Tag,
    curve: Arc<Curve>,
    speed: f32,
    multiplier: f32,
    progress: f32,
}

impl CurveProgress {
    fn sample(&self) -> f32 {
        self.curve.evaluate(self.progress) * self.multiplier
    }
}

/// A stored (non-instant) modifier.
#[derive(Clone, Debug)]
pub struct Modifier {
    attribute: Tag,
    application: ApplicationType,
    calculation: CalculationType,
    operation: OperationType,
    affects_base: bool,
    pub(crate) value: f32,
    clamping: Option<ClampDelta>,
    interval: u64,
    duration: u64,
    start_step: u64,
    last_applied_step: u64,
    apply_on_add: bool,
    has_applied: bool,
    apply_on_removal: bool,
    source_attribute: Option<Tag>,
    curve: Option<CurveProgress>,
    delegate: Option<ModifierDelegate>,
    pub(crate) status_effect: Option<SlotKey>,
}

impl Modifier {
    /// Builds a modifier from a validated spec.
    ///
    /// `curve` must be resolved by the caller for `SetByData` specs.
    pub(crate) fn from_spec(
        attribute: Tag,
        spec: &ModifierSpec,
        step: u64,
        curve: Option<Arc<Curve>>,
    ) -> Self {
        let curve = match (&spec.curve, curve) {
            (Some(params), Some(curve)) => Some(CurveProgress {
                tag: params.tag.clone(),
                curve,
                speed: params.speed,
                multiplier: params.multiplier,
                progress: 0.0,
            }),
            _ => None,
        };
        let value = curve.as_ref().map_or(spec.value, CurveProgress::sample);

        Self {
            attribute,
            application: spec.application,
            calculation: spec.calculation,
            operation: spec.operation,
            affects_base: spec.affects_base(),
            value,
            clamping: spec.clamping,
            interval: spec.interval,
            duration: spec.duration,
            start_step: step,
            last_applied_step: step,
            apply_on_add: spec.apply_on_add,
            has_applied: false,
            apply_on_removal: spec.apply_on_removal,
            source_attribute: spec.source_attribute.clone(),
            curve,
            delegate: spec.delegate.clone(),
            status_effect: None,
        }
    }

    pub fn attribute(&self) -> &Tag {
        &self.attribute
    }

    pub fn application(&self) -> ApplicationType {
        self.application
    }

    pub fn calculation(&self) -> CalculationType {
        self.calculation
    }

    pub fn operation(&self) -> OperationType {
        self.operation
    }

    pub fn affects_base(&self) -> bool {
        self.affects_base
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn clamping(&self) -> Option<ClampDelta> {
        self.clamping
    }

    pub fn start_step(&self) -> u64 {
        self.start_step
    }

    pub fn last_applied_step(&self) -> u64 {
        self.last_applied_step
    }

    pub fn applies_on_removal(&self) -> bool {
        self.apply_on_removal
    }

    pub fn source_attribute(&self) -> Option<&Tag> {
        self.source_attribute.as_ref()
    }

    pub fn curve_tag(&self) -> Option<&Tag> {
        self.curve.as_ref().map(|curve| &curve.tag)
    }

    /// Curve progress in `[0, 1]` for `SetByData` modifiers.
    pub fn curve_progress(&self) -> Option<f32> {
        self.curve.as_ref().map(|curve| curve.progress)
    }

    pub fn is_from_status_effect(&self) -> bool {
        self.status_effect.is_some()
    }

    /// Whether this modifier contributes at `step`.
    ///
    /// Periodic modifiers apply once on the creation step when `apply_on_add`
    /// is set, then every `interval` steps. Ticking modifiers apply at most
    /// once per step, however often the attribute is recalculated.
    pub fn can_apply(&self, step: u64) -> bool {
        match self.application {
            ApplicationType::Periodic => {
                (self.apply_on_add && !self.has_applied)
                    || step.saturating_sub(self.last_applied_step) >= self.interval
            }
            ApplicationType::Ticking => !self.has_applied || step > self.last_applied_step,
            _ => true,
        }
    }

    /// Whether this modifier's lifetime ended at or before `step`.
    pub fn has_expired(&self, step: u64) -> bool {
        let timed = match self.application {
            ApplicationType::Periodic | ApplicationType::Duration => true,
            ApplicationType::Ticking => self.duration > 0,
            ApplicationType::Instant | ApplicationType::Persistent => false,
        };
        timed && step >= self.start_step.saturating_add(self.duration)
    }

    /// Records an application at `step`.
    pub(crate) fn post_apply(&mut self, step: u64) {
        if matches!(
            self.application,
            ApplicationType::Periodic | ApplicationType::Ticking
        ) {
            self.has_applied = true;
            self.last_applied_step = step;
        }
    }

    /// Whether the dynamic value source wants a refresh this step.
    pub fn should_recalculate(&self) -> bool {
        match self.calculation {
            CalculationType::SetByDelegate | CalculationType::SetByEffect => self
                .delegate
                .as_ref()
                .is_some_and(|delegate| delegate.should_recalculate(&self.attribute)),
            CalculationType::SetByData => self
                .curve
                .as_ref()
                .is_some_and(|curve| curve.progress < 1.0),
            CalculationType::SetByCaller
            | CalculationType::SetByAttribute
            | CalculationType::SetExternally => false,
        }
    }

    /// Refreshes the value from its dynamic source and returns it.
    pub(crate) fn recalculate(&mut self) -> f32 {
        match self.calculation {
            CalculationType::SetByDelegate | CalculationType::SetByEffect => {
                if let Some(delegate) = &self.delegate {
                    self.value = delegate.recalculate(&self.attribute);
                }
            }
            CalculationType::SetByData => {
                if let Some(curve) = &mut self.curve {
                    curve.progress = (curve.progress + curve.speed).clamp(0.0, 1.0);
                    self.value = curve.sample();
                }
            }
            CalculationType::SetByCaller
            | CalculationType::SetByAttribute
            | CalculationType::SetExternally => {}
        }
        self.value
    }
}
