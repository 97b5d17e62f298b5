//! Runtime orchestration for the fixed-step gameplay simulation.
//!
//! This crate turns host frame times into fixed steps and distributes entity
//! ticks across buckets so only a slice of entities is processed per step.
//! Consumers embed [`Simulation`] and drive it with [`Simulation::frame`].
//!
//! Modules are organized by responsibility:
//! - [`scheduler`] hosts the fixed-step clock
//! - [`buckets`] spreads registered members over tick buckets
//! - [`manager`] owns the buckets of one simulation and its oracles
//! - [`simulation`] is the host-facing driver
//! - [`oracle`] provides data adapters built from loaded content
pub mod buckets;
pub mod error;
pub mod manager;
pub mod oracle;
pub mod scheduler;
pub mod simulation;

pub use buckets::TickBuckets;
pub use error::{Result, SimulationError};
pub use manager::GameplayStateManager;
pub use oracle::{CurveOracleImpl, EffectOracleImpl, OracleManager};
pub use scheduler::TickManager;
pub use simulation::{Simulation, SimulationBuilder};
