//! Data-driven gameplay content and loaders.
//!
//! This crate reads static gameplay data from RON/TOML files:
//! - status-effect definitions (RON)
//! - `SetByData` modifier curves (RON)
//! - starting attribute sets (RON)
//! - simulation configuration (TOML)
//!
//! Content is consumed by runtime oracles and never appears in entity state.
//! All loaders use `gameplay-core` types directly with serde for deserialization.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    AttributeLoader, AttributeSet, ConfigLoader, ContentFactory, CurveCatalog, CurveLoader,
    EffectCatalog, EffectLoader, LoadResult,
};
