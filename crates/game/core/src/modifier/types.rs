//! Tagged variants that select modifier behavior.
use strum::{Display, EnumIter};

/// When and for how long a modifier is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ApplicationType {
    /// Applied once to the base value and never stored.
    Instant,
    /// Contributes to the current value until its duration elapses.
    Duration,
    /// Applied to the base value every `interval` steps until its duration elapses.
    Periodic,
    /// Applied to the base value every step, optionally for a limited duration.
    Ticking,
    /// Contributes to the current value until removed.
    Persistent,
}

impl ApplicationType {
    /// Whether modifiers of this type change the base value when nothing else is said.
    pub const fn affects_base_by_default(self) -> bool {
        matches!(self, Self::Instant | Self::Periodic | Self::Ticking)
    }

    /// Instant modifiers are applied and dropped; every other type is stored.
    pub const fn is_tracked(self) -> bool {
        !matches!(self, Self::Instant)
    }
}

/// How a modifier's numeric value is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CalculationType {
    /// Fixed at creation.
    SetByCaller,
    /// Recomputed each eligible step by an injected hook.
    SetByDelegate,
    /// Like `SetByDelegate`, with the hook supplied by the owning status effect.
    SetByEffect,
    /// Read from a curve, advancing along it each recalculation.
    SetByData,
    /// Mirrors the current value of another attribute.
    SetByAttribute,
    /// Pushed from outside through `set_modifier_value`.
    SetExternally,
}

impl CalculationType {
    /// Types whose value is recomputed during the fixed tick.
    pub const fn is_dynamic(self) -> bool {
        matches!(
            self,
            Self::SetByDelegate | Self::SetByEffect | Self::SetByData
        )
    }

    pub const fn uses_delegate(self) -> bool {
        matches!(self, Self::SetByDelegate | Self::SetByEffect)
    }
}

/// How a modifier's value folds into the aggregate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OperationType {
    Override,
    Additive,
    Multiply,
    PostAdditive,
}
