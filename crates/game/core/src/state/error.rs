//! Attribute and modifier errors.

use super::EntityId;
use crate::env::OracleError;
use crate::error::{ErrorSeverity, GameplayError};
use crate::modifier::ModifierSpecError;
use crate::tag::Tag;

/// Rejections from the attribute store and modifier engine.
///
/// Every variant is returned before any mutation happens.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum StateError {
    #[error("attribute tag is empty")]
    InvalidAttributeTag,

    #[error("attribute {0} not found")]
    AttributeNotFound(Tag),

    #[error("attribute {0} already exists")]
    AttributeExists(Tag),

    #[error("attribute {0} is overridden")]
    AttributeOverridden(Tag),

    #[error("invalid modifier for attribute {attribute}")]
    InvalidModifier {
        attribute: Tag,
        #[source]
        source: ModifierSpecError,
    },

    #[error("source attribute {source_attribute} for {attribute} not found")]
    SourceAttributeNotFound { attribute: Tag, source_attribute: Tag },

    #[error("modifier reading {source_attribute} onto {attribute} would close a dependency cycle")]
    DependencyCycle { attribute: Tag, source_attribute: Tag },

    #[error("curve {0} not found")]
    CurveNotFound(Tag),

    #[error("handle is stale")]
    StaleHandle,

    #[error("handle belongs to entity {handle_owner}, not {owner}")]
    ForeignHandle {
        owner: EntityId,
        handle_owner: EntityId,
    },

    #[error("modifier is not externally set")]
    NotSetExternally,

    #[error("listener not found")]
    ListenerNotFound,

    #[error(transparent)]
    Oracle(#[from] OracleError),
}

impl GameplayError for StateError {
    fn severity(&self) -> ErrorSeverity {
        use StateError::*;
        match self {
            AttributeOverridden(_) => ErrorSeverity::Recoverable,
            Oracle(error) => error.severity(),
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        use StateError::*;
        match self {
            InvalidAttributeTag => "STATE_INVALID_ATTRIBUTE_TAG",
            AttributeNotFound(_) => "STATE_ATTRIBUTE_NOT_FOUND",
            AttributeExists(_) => "STATE_ATTRIBUTE_EXISTS",
            AttributeOverridden(_) => "STATE_ATTRIBUTE_OVERRIDDEN",
            InvalidModifier { source, .. } => source.error_code(),
            SourceAttributeNotFound { .. } => "STATE_SOURCE_ATTRIBUTE_NOT_FOUND",
            DependencyCycle { .. } => "STATE_DEPENDENCY_CYCLE",
            CurveNotFound(_) => "STATE_CURVE_NOT_FOUND",
            StaleHandle => "STATE_STALE_HANDLE",
            ForeignHandle { .. } => "STATE_FOREIGN_HANDLE",
            NotSetExternally => "STATE_NOT_SET_EXTERNALLY",
            ListenerNotFound => "STATE_LISTENER_NOT_FOUND",
            Oracle(error) => error.error_code(),
        }
    }
}
