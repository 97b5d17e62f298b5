//! Modifier construction parameters.
use super::delegate::ModifierDelegate;
use super::types::{ApplicationType, CalculationType, OperationType};
use crate::tag::Tag;

/// Shift applied to an attribute's clamp bounds while a modifier is active.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClampDelta {
    pub min_delta: f32,
    pub max_delta: f32,
}

/// Curve lookup parameters for `SetByData` modifiers.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurveParams {
    pub tag: Tag,
    /// Progress gained along the curve per recalculation, in `[0, 1]` units.
    #[cfg_attr(feature = "serde", serde(default = "CurveParams::default_speed"))]
    pub speed: f32,
    /// Scale applied to the curve output.
    #[cfg_attr(feature = "serde", serde(default = "CurveParams::default_multiplier"))]
    pub multiplier: f32,
}

impl CurveParams {
    pub const DEFAULT_SPEED: f32 = 0.1;
    pub const DEFAULT_MULTIPLIER: f32 = 100.0;

    pub fn new(tag: impl Into<Tag>) -> Self {
        Self {
            tag: tag.into(),
            speed: Self::DEFAULT_SPEED,
            multiplier: Self::DEFAULT_MULTIPLIER,
        }
    }

    fn default_speed() -> f32 {
        Self::DEFAULT_SPEED
    }

    fn default_multiplier() -> f32 {
        Self::DEFAULT_MULTIPLIER
    }
}

/// Everything needed to create a modifier on one attribute.
///
/// Built with [`ModifierSpec::new`] and the `with_*` setters, or loaded from
/// status-effect definitions.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModifierSpec {
    pub application: ApplicationType,
    pub calculation: CalculationType,
    pub operation: OperationType,
    /// Explicit base/current selection. `None` follows the application type.
    #[cfg_attr(feature = "serde", serde(default))]
    pub affects_base: Option<bool>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub value: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub recalculate_immediately: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub clamping: Option<ClampDelta>,
    /// Steps between applications (Periodic).
    #[cfg_attr(feature = "serde", serde(default))]
    pub interval: u64,
    /// Lifetime in steps (Duration, Periodic, optional for Ticking).
    #[cfg_attr(feature = "serde", serde(default))]
    pub duration: u64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub apply_on_add: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub apply_on_removal: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub source_attribute: Option<Tag>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub curve: Option<CurveParams>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub delegate: Option<ModifierDelegate>,
}

impl ModifierSpec {
    pub fn new(
        application: ApplicationType,
        calculation: CalculationType,
        operation: OperationType,
        value: f32,
    ) -> Self {
        Self {
            application,
            calculation,
            operation,
            affects_base: None,
            value,
            recalculate_immediately: false,
            clamping: None,
            interval: 0,
            duration: 0,
            apply_on_add: false,
            apply_on_removal: false,
            source_attribute: None,
            curve: None,
            delegate: None,
        }
    }

    /// Instant `SetByCaller` modifier.
    pub fn instant(operation: OperationType, value: f32) -> Self {
        Self::new(
            ApplicationType::Instant,
            CalculationType::SetByCaller,
            operation,
            value,
        )
    }

    /// Persistent `SetByCaller` modifier.
    pub fn persistent(operation: OperationType, value: f32) -> Self {
        Self::new(
            ApplicationType::Persistent,
            CalculationType::SetByCaller,
            operation,
            value,
        )
    }

    /// Whether this modifier targets the base value.
    pub fn affects_base(&self) -> bool {
        self.affects_base
            .unwrap_or_else(|| self.application.affects_base_by_default())
    }

    pub fn affecting_base(mut self, affects_base: bool) -> Self {
        self.affects_base = Some(affects_base);
        self
    }

    pub fn with_calculation(mut self, calculation: CalculationType) -> Self {
        self.calculation = calculation;
        self
    }

    /// Periodic timing. Applying on add forces an immediate recalculation so
    /// the first application lands on the creation step.
    pub fn with_periodic(
        mut self,
        interval: u64,
        duration: u64,
        apply_on_add: bool,
        apply_on_removal: bool,
    ) -> Self {
        self.interval = interval;
        self.duration = duration;
        self.apply_on_add = apply_on_add;
        self.apply_on_removal = apply_on_removal;
        self.recalculate_immediately |= apply_on_add;
        self
    }

    /// Duration timing. The contribution starts on the creation step.
    pub fn with_duration(mut self, duration: u64, apply_on_removal: bool) -> Self {
        self.duration = duration;
        self.apply_on_removal = apply_on_removal;
        self.recalculate_immediately = true;
        self
    }

    /// Ticking lifetime. A zero duration ticks until removed.
    pub fn with_ticking(mut self, duration: u64) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_clamping(mut self, min_delta: f32, max_delta: f32) -> Self {
        self.clamping = Some(ClampDelta {
            min_delta,
            max_delta,
        });
        self
    }

    pub fn with_curve(mut self, tag: impl Into<Tag>, speed: f32, multiplier: f32) -> Self {
        self.curve = Some(CurveParams {
            tag: tag.into(),
            speed,
            multiplier,
        });
        self
    }

    pub fn with_source_attribute(mut self, source: impl Into<Tag>) -> Self {
        self.source_attribute = Some(source.into());
        self
    }

    pub fn with_delegate(mut self, delegate: ModifierDelegate) -> Self {
        self.delegate = Some(delegate);
        self
    }

    pub fn recalculate_immediately(mut self, immediately: bool) -> Self {
        self.recalculate_immediately = immediately;
        self
    }
}
