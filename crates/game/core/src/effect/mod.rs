//! Status effects: named bundles of modifiers plus state-tag, stacking and
//! cancellation rules.
//!
//! Definitions are read-only data resolved through [`crate::env::EffectOracle`].
//! Active instances live inside the owning [`crate::GameplayState`]; the
//! application/removal state machine is implemented there.
mod definition;
mod error;
mod instance;

pub use definition::{DefinitionIssue, StackingPolicy, StatusEffectDefinition};
pub use error::StatusEffectError;
pub use instance::StatusEffect;
