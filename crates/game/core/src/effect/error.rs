//! Status-effect application and removal errors.

use crate::env::OracleError;
use crate::error::{ErrorSeverity, GameplayError};
use crate::state::StateError;
use crate::tag::Tag;

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum StatusEffectError {
    #[error("status effect tag is empty")]
    InvalidTag,

    #[error("no definition for status effect {0}")]
    DefinitionNotFound(Tag),

    #[error("status effect {0} is already active and does not stack")]
    StackingForbidden(Tag),

    #[error("status effect {effect} is blocked by state tag {tag}")]
    Blocked { effect: Tag, tag: Tag },

    #[error("status effect {effect} requires state tag {tag}")]
    MissingEnablingTag { effect: Tag, tag: Tag },

    #[error("status effect {effect} could not modify {attribute}")]
    Modifier {
        effect: Tag,
        attribute: Tag,
        #[source]
        source: StateError,
    },

    #[error("status effect handle is stale")]
    StaleHandle,

    #[error("status effect handle belongs to another entity")]
    ForeignHandle,

    #[error("no active status effect {0}")]
    NotFound(Tag),

    #[error("{failed} of {total} instances of status effect {effect} could not be removed")]
    PartialClear {
        effect: Tag,
        failed: usize,
        total: usize,
    },

    #[error(transparent)]
    Oracle(#[from] OracleError),
}

impl GameplayError for StatusEffectError {
    fn severity(&self) -> ErrorSeverity {
        use StatusEffectError::*;
        match self {
            StackingForbidden(_) | Blocked { .. } | MissingEnablingTag { .. } => {
                ErrorSeverity::Recoverable
            }
            InvalidTag | DefinitionNotFound(_) | StaleHandle | ForeignHandle | NotFound(_) => {
                ErrorSeverity::Validation
            }
            Modifier { source, .. } => source.severity(),
            PartialClear { .. } => ErrorSeverity::Internal,
            Oracle(error) => error.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        use StatusEffectError::*;
        match self {
            InvalidTag => "EFFECT_INVALID_TAG",
            DefinitionNotFound(_) => "EFFECT_DEFINITION_NOT_FOUND",
            StackingForbidden(_) => "EFFECT_STACKING_FORBIDDEN",
            Blocked { .. } => "EFFECT_BLOCKED",
            MissingEnablingTag { .. } => "EFFECT_MISSING_ENABLING_TAG",
            Modifier { .. } => "EFFECT_MODIFIER_REJECTED",
            StaleHandle => "EFFECT_STALE_HANDLE",
            ForeignHandle => "EFFECT_FOREIGN_HANDLE",
            NotFound(_) => "EFFECT_NOT_FOUND",
            PartialClear { .. } => "EFFECT_PARTIAL_CLEAR",
            Oracle(error) => error.error_code(),
        }
    }
}
