//! Legality rules for modifier specs.
//!
//! | Application | Must affect base | Forbidden operations |
//! |---|---|---|
//! | Instant | yes | Multiply |
//! | Duration | no | |
//! | Periodic | yes | Multiply, Override |
//! | Ticking | yes | Multiply, Override |
//! | Persistent | no | |
//!
//! Periodic and Ticking modifiers may not shift clamp bounds, since they
//! reapply every interval and the bounds would drift without limit. Instant
//! and Persistent modifiers never expire, so a duration on them is rejected.
use super::spec::ModifierSpec;
use super::types::{ApplicationType, CalculationType, OperationType};
use crate::error::{ErrorSeverity, GameplayError};

/// Where a spec is being checked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpecContext {
    /// About to be applied to an attribute. Every hook must be bound.
    Runtime,
    /// Inside a status-effect definition. `SetByEffect` hooks are bound later,
    /// when the effect is applied.
    Definition,
}

/// Reasons a modifier spec is rejected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ModifierSpecError {
    #[error("{application} modifiers must affect the base value")]
    MustAffectBase { application: ApplicationType },

    #[error("{application} modifiers must not affect the base value")]
    MustNotAffectBase { application: ApplicationType },

    #[error("{operation} is not allowed on {application} modifiers")]
    ForbiddenOperation {
        application: ApplicationType,
        operation: OperationType,
    },

    #[error("{application} modifiers cannot shift clamp bounds")]
    ClampingNotAllowed { application: ApplicationType },

    #[error("{application} modifiers need a non-zero duration")]
    ZeroDuration { application: ApplicationType },

    #[error("{application} modifiers do not expire and take no duration")]
    IgnoredDuration { application: ApplicationType },

    #[error("periodic modifiers need a non-zero interval")]
    ZeroInterval,

    #[error("{calculation} modifiers need a delegate")]
    MissingDelegate { calculation: CalculationType },

    #[error("{calculation} modifiers must not carry a delegate")]
    UnexpectedDelegate { calculation: CalculationType },

    #[error("SetByAttribute modifiers need a valid source attribute")]
    MissingSourceAttribute,

    #[error("SetByData modifiers need a valid curve tag")]
    MissingCurve,

    #[error("modifier value must be finite")]
    NonFiniteValue,
}

impl GameplayError for ModifierSpecError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        use ModifierSpecError::*;
        match self {
            MustAffectBase { .. } => "MODIFIER_MUST_AFFECT_BASE",
            MustNotAffectBase { .. } => "MODIFIER_MUST_NOT_AFFECT_BASE",
            ForbiddenOperation { .. } => "MODIFIER_FORBIDDEN_OPERATION",
            ClampingNotAllowed { .. } => "MODIFIER_CLAMPING_NOT_ALLOWED",
            ZeroDuration { .. } => "MODIFIER_ZERO_DURATION",
            IgnoredDuration { .. } => "MODIFIER_IGNORED_DURATION",
            ZeroInterval => "MODIFIER_ZERO_INTERVAL",
            MissingDelegate { .. } => "MODIFIER_MISSING_DELEGATE",
            UnexpectedDelegate { .. } => "MODIFIER_UNEXPECTED_DELEGATE",
            MissingSourceAttribute => "MODIFIER_MISSING_SOURCE_ATTRIBUTE",
            MissingCurve => "MODIFIER_MISSING_CURVE",
            NonFiniteValue => "MODIFIER_NON_FINITE_VALUE",
        }
    }
}

impl ModifierSpec {
    /// Returns the first rule this spec breaks.
    pub fn validate(&self, context: SpecContext) -> Result<(), ModifierSpecError> {
        match self.errors(context).into_iter().next() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    pub fn is_valid(&self, context: SpecContext) -> bool {
        self.validate(context).is_ok()
    }

    /// Returns every rule this spec breaks, in rule order.
    pub fn errors(&self, context: SpecContext) -> Vec<ModifierSpecError> {
        let mut errors = Vec::new();
        let application = self.application;

        let (must_affect_base, forbidden): (bool, &[OperationType]) = match application {
            ApplicationType::Instant => (true, &[OperationType::Multiply]),
            ApplicationType::Duration | ApplicationType::Persistent => (false, &[]),
            ApplicationType::Periodic | ApplicationType::Ticking => {
                (true, &[OperationType::Multiply, OperationType::Override])
            }
        };

        match (must_affect_base, self.affects_base()) {
            (true, false) => errors.push(ModifierSpecError::MustAffectBase { application }),
            (false, true) => errors.push(ModifierSpecError::MustNotAffectBase { application }),
            _ => {}
        }

        if forbidden.contains(&self.operation) {
            errors.push(ModifierSpecError::ForbiddenOperation {
                application,
                operation: self.operation,
            });
        }

        if self.clamping.is_some()
            && matches!(
                application,
                ApplicationType::Periodic | ApplicationType::Ticking
            )
        {
            errors.push(ModifierSpecError::ClampingNotAllowed { application });
        }

        if matches!(
            application,
            ApplicationType::Duration | ApplicationType::Periodic
        ) && self.duration == 0
        {
            errors.push(ModifierSpecError::ZeroDuration { application });
        }

        if matches!(
            application,
            ApplicationType::Instant | ApplicationType::Persistent
        ) && self.duration != 0
        {
            errors.push(ModifierSpecError::IgnoredDuration { application });
        }

        if application == ApplicationType::Periodic && self.interval == 0 {
            errors.push(ModifierSpecError::ZeroInterval);
        }

        self.delegate_errors(context, &mut errors);

        if !self.value.is_finite() {
            errors.push(ModifierSpecError::NonFiniteValue);
        }

        errors
    }

    fn delegate_errors(&self, context: SpecContext, errors: &mut Vec<ModifierSpecError>) {
        let calculation = self.calculation;
        let has_delegate = self.delegate.is_some();

        match calculation {
            CalculationType::SetByDelegate if !has_delegate => {
                errors.push(ModifierSpecError::MissingDelegate { calculation });
            }
            CalculationType::SetByEffect
                if !has_delegate && context == SpecContext::Runtime =>
            {
                errors.push(ModifierSpecError::MissingDelegate { calculation });
            }
            CalculationType::SetByDelegate | CalculationType::SetByEffect => {}
            _ if has_delegate => {
                errors.push(ModifierSpecError::UnexpectedDelegate { calculation });
            }
            _ => {}
        }

        if calculation == CalculationType::SetByAttribute
            && !self
                .source_attribute
                .as_ref()
                .is_some_and(|source| source.is_valid())
        {
            errors.push(ModifierSpecError::MissingSourceAttribute);
        }

        if calculation == CalculationType::SetByData
            && !self.curve.as_ref().is_some_and(|curve| curve.tag.is_valid())
        {
            errors.push(ModifierSpecError::MissingCurve);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifier::ModifierDelegate;
    use strum::IntoEnumIterator;

    fn spec(application: ApplicationType, operation: OperationType) -> ModifierSpec {
        let spec = ModifierSpec::new(application, CalculationType::SetByCaller, operation, 1.0);
        match application {
            ApplicationType::Periodic => spec.with_periodic(5, 50, false, false),
            ApplicationType::Duration => spec.with_duration(10, false),
            _ => spec,
        }
    }

    #[test]
    fn default_base_selection_satisfies_matrix() {
        let expected_forbidden = |application, operation| match application {
            ApplicationType::Instant => operation == OperationType::Multiply,
            ApplicationType::Periodic | ApplicationType::Ticking => matches!(
                operation,
                OperationType::Multiply | OperationType::Override
            ),
            _ => false,
        };

        for application in ApplicationType::iter() {
            for operation in OperationType::iter() {
                let valid = spec(application, operation).is_valid(SpecContext::Runtime);
                assert_eq!(
                    valid,
                    !expected_forbidden(application, operation),
                    "{application} x {operation}"
                );
            }
        }
    }

    #[test]
    fn base_flag_must_match_application() {
        let duration_on_base = spec(ApplicationType::Duration, OperationType::Additive)
            .affecting_base(true);
        assert_eq!(
            duration_on_base.validate(SpecContext::Runtime),
            Err(ModifierSpecError::MustNotAffectBase {
                application: ApplicationType::Duration
            })
        );

        let instant_on_current =
            spec(ApplicationType::Instant, OperationType::Additive).affecting_base(false);
        assert!(!instant_on_current.is_valid(SpecContext::Runtime));
    }

    #[test]
    fn periodic_and_ticking_reject_clamp_deltas() {
        let ticking =
            spec(ApplicationType::Ticking, OperationType::Additive).with_clamping(0.0, 5.0);
        assert_eq!(
            ticking.validate(SpecContext::Runtime),
            Err(ModifierSpecError::ClampingNotAllowed {
                application: ApplicationType::Ticking
            })
        );

        let persistent =
            spec(ApplicationType::Persistent, OperationType::Additive).with_clamping(0.0, 5.0);
        assert!(persistent.is_valid(SpecContext::Runtime));
    }

    #[test]
    fn delegate_configuration_rules() {
        let delegate = ModifierDelegate::from_fns(|_| true, |_| 1.0);

        let unbound = spec(ApplicationType::Persistent, OperationType::Additive)
            .with_calculation(CalculationType::SetByDelegate);
        assert!(!unbound.is_valid(SpecContext::Runtime));
        assert!(!unbound.is_valid(SpecContext::Definition));

        let effect_bound_later = spec(ApplicationType::Persistent, OperationType::Additive)
            .with_calculation(CalculationType::SetByEffect);
        assert!(effect_bound_later.is_valid(SpecContext::Definition));
        assert!(!effect_bound_later.is_valid(SpecContext::Runtime));

        let stray = spec(ApplicationType::Persistent, OperationType::Additive)
            .with_delegate(delegate);
        assert_eq!(
            stray.validate(SpecContext::Runtime),
            Err(ModifierSpecError::UnexpectedDelegate {
                calculation: CalculationType::SetByCaller
            })
        );
    }

    #[test]
    fn dynamic_sources_need_their_inputs() {
        let by_attribute = spec(ApplicationType::Persistent, OperationType::Additive)
            .with_calculation(CalculationType::SetByAttribute);
        assert!(
            by_attribute
                .errors(SpecContext::Runtime)
                .contains(&ModifierSpecError::MissingSourceAttribute)
        );

        let by_data = spec(ApplicationType::Persistent, OperationType::Additive)
            .with_calculation(CalculationType::SetByData);
        assert!(
            by_data
                .errors(SpecContext::Runtime)
                .contains(&ModifierSpecError::MissingCurve)
        );
    }

    #[test]
    fn timing_must_be_positive() {
        let periodic = ModifierSpec::new(
            ApplicationType::Periodic,
            CalculationType::SetByCaller,
            OperationType::Additive,
            -5.0,
        );
        let errors = periodic.errors(SpecContext::Runtime);
        assert!(errors.contains(&ModifierSpecError::ZeroInterval));
        assert!(errors.contains(&ModifierSpecError::ZeroDuration {
            application: ApplicationType::Periodic
        }));
    }

    #[test]
    fn untimed_applications_reject_a_duration() {
        let persistent = ModifierSpec::persistent(OperationType::Additive, 10.0)
            .with_duration(3, false);
        assert_eq!(
            persistent.validate(SpecContext::Runtime),
            Err(ModifierSpecError::IgnoredDuration {
                application: ApplicationType::Persistent
            })
        );

        let instant = ModifierSpec::instant(OperationType::Additive, 10.0).with_ticking(5);
        assert!(
            instant
                .errors(SpecContext::Definition)
                .contains(&ModifierSpecError::IgnoredDuration {
                    application: ApplicationType::Instant
                })
        );

        let ticking = ModifierSpec::new(
            ApplicationType::Ticking,
            CalculationType::SetByCaller,
            OperationType::Additive,
            1.0,
        )
        .with_ticking(5);
        assert!(ticking.is_valid(SpecContext::Runtime));
    }
}
