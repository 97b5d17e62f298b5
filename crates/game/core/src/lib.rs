//! Deterministic gameplay-state simulation core.
//!
//! `gameplay-core` tracks numeric attributes per entity, folds time-scoped
//! modifiers into them once per fixed step, and bundles modifiers into status
//! effects with stacking and mutual-exclusion rules. Every entity owns one
//! [`GameplayState`]; all mutation goes through its methods or through
//! [`FixedTick::fixed_tick`]. Read-only definition data is reached through the
//! oracle traits in [`env`].
pub mod attribute;
pub mod config;
pub mod effect;
pub mod env;
pub mod error;
pub mod modifier;
pub mod state;
pub mod tag;
pub mod tick;

pub use attribute::{
    Attribute, AttributeChanged, AttributeClamping, AttributeInit, ClampRange, ValueChange,
};
pub use config::{ConfigError, GameplayConfig};
pub use effect::{
    DefinitionIssue, StackingPolicy, StatusEffect, StatusEffectDefinition, StatusEffectError,
};
pub use env::{CurveOracle, EffectOracle, Env, GameplayEnv, OracleError};
pub use error::{ErrorSeverity, GameplayError};
pub use modifier::{
    ApplicationType, CalculationType, ClampDelta, Curve, CurveParams, Modifier, ModifierDelegate,
    ModifierHook, ModifierSpec, ModifierSpecError, OperationType, SpecContext,
};
pub use state::{
    AttributeHandle, AttributeListener, EntityId, GameplayState, Handle, ListenerId,
    ModifierHandle, SlotKey, StateError, StatusEffectHandle,
};
pub use tag::{Tag, TagCountContainer, TagSet};
pub use tick::FixedTick;
