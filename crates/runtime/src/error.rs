//! Errors surfaced by the simulation API.
//!
//! Wraps core rejections so callers driving a whole [`crate::Simulation`] can
//! bubble them up with one type.
use gameplay_core::{
    ConfigError, EntityId, ErrorSeverity, GameplayError, StateError, StatusEffectError,
};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SimulationError>;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("simulation configuration rejected")]
    Config(#[from] ConfigError),

    #[error("entity {0} is not part of this simulation")]
    UnknownEntity(EntityId),

    #[error("entity {0} is borrowed elsewhere")]
    EntityBusy(EntityId),

    #[error("entity {entity} rejected the operation")]
    State {
        entity: EntityId,
        #[source]
        source: StateError,
    },

    #[error("entity {entity} rejected the status effect")]
    StatusEffect {
        entity: EntityId,
        #[source]
        source: StatusEffectError,
    },
}

impl GameplayError for SimulationError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            SimulationError::Config(_) => ErrorSeverity::Fatal,
            SimulationError::UnknownEntity(_) => ErrorSeverity::Validation,
            SimulationError::EntityBusy(_) => ErrorSeverity::Internal,
            SimulationError::State { source, .. } => source.severity(),
            SimulationError::StatusEffect { source, .. } => source.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            SimulationError::Config(_) => "SIMULATION_CONFIG",
            SimulationError::UnknownEntity(_) => "SIMULATION_UNKNOWN_ENTITY",
            SimulationError::EntityBusy(_) => "SIMULATION_ENTITY_BUSY",
            SimulationError::State { source, .. } => source.error_code(),
            SimulationError::StatusEffect { source, .. } => source.error_code(),
        }
    }
}
