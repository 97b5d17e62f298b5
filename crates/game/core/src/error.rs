//! Common error infrastructure for gameplay-core.
//!
//! Domain errors ([`crate::state::StateError`], [`crate::effect::StatusEffectError`],
//! [`crate::modifier::ModifierSpecError`], [`crate::env::OracleError`]) live next to
//! the code that produces them. This module holds what they share.
//!
//! # Design Principles
//!
//! - **Local and non-fatal**: every rejection leaves the entity unchanged
//! - **Severity Classification**: errors are categorized for logging and recovery
//! - **Stable codes**: `error_code()` gives a string usable in metrics and tests

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the request may succeed later (attribute currently overridden)
/// - **Validation**: invalid input, retrying without changes will fail again
/// - **Internal**: bookkeeping inconsistency that indicates a bug
/// - **Fatal**: a required collaborator is missing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Temporary condition, may succeed on retry.
    Recoverable,

    /// Invalid input that should be rejected without retry.
    ///
    /// Examples: unknown attribute, invalid modifier spec, stale handle
    Validation,

    /// Unexpected state inconsistency.
    ///
    /// These indicate bugs and should be investigated.
    Internal,

    /// Missing collaborator, the operation cannot run at all.
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all gameplay-core errors.
///
/// # Implementation Guidelines
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait GameplayError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Default implementation uses the error type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Logs a rejected operation once, at a level derived from its severity.
///
/// Returns the error so call sites can write `return Err(reject(op, err))`.
pub(crate) fn reject<E: GameplayError>(operation: &'static str, error: E) -> E {
    match error.severity() {
        ErrorSeverity::Recoverable | ErrorSeverity::Validation => tracing::warn!(
            target: "gameplay::state",
            operation,
            code = error.error_code(),
            %error,
            "operation rejected"
        ),
        ErrorSeverity::Internal | ErrorSeverity::Fatal => tracing::error!(
            target: "gameplay::state",
            operation,
            code = error.error_code(),
            %error,
            "operation failed"
        ),
    }
    error
}
