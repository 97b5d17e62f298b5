//! Runtime wrappers around static gameplay content oracles.
//!
//! These implementations expose `gameplay-core` oracle traits and bundle them
//! into an [`OracleManager`] so the runtime can build [`gameplay_core::Env`]
//! snapshots on demand. The data is immutable once the simulation starts;
//! dynamic state lives in each entity's [`gameplay_core::GameplayState`].
mod curves;
mod effects;

use std::sync::Arc;

use gameplay_core::{
    Curve, CurveOracle, EffectOracle, Env, GameplayEnv, StatusEffectDefinition, Tag,
};

pub use curves::CurveOracleImpl;
pub use effects::EffectOracleImpl;

/// Manages all oracle implementations and provides unified access
#[derive(Clone, Debug, Default)]
pub struct OracleManager {
    pub(crate) effects: Arc<EffectOracleImpl>,
    pub(crate) curves: Arc<CurveOracleImpl>,
}

impl OracleManager {
    /// Creates a new oracle manager
    pub fn new(effects: Arc<EffectOracleImpl>, curves: Arc<CurveOracleImpl>) -> Self {
        Self { effects, curves }
    }

    /// Builds oracles from the effect and curve files of a content directory.
    ///
    /// Loaded curves are layered over the built-in curve set.
    #[cfg(feature = "content")]
    pub fn from_content(
        factory: &gameplay_content::ContentFactory,
    ) -> gameplay_content::LoadResult<Self> {
        let effects = EffectOracleImpl::from_definitions(factory.load_effects()?);

        let mut curves = CurveOracleImpl::with_builtin_curves();
        for (tag, curve) in factory.load_curves()? {
            curves.add_curve(tag, curve);
        }

        tracing::info!(
            target: "runtime::oracle",
            effects = effects.len(),
            curves = curves.len(),
            "oracles loaded from content"
        );
        Ok(Self::new(Arc::new(effects), Arc::new(curves)))
    }

    /// Converts oracle manager into GameplayEnv for gameplay-core
    pub fn as_gameplay_env(&self) -> GameplayEnv<'_> {
        Env::with_all(self.effects.as_ref(), self.curves.as_ref()).into_gameplay_env()
    }

    pub fn effects(&self) -> &EffectOracleImpl {
        &self.effects
    }

    pub fn curves(&self) -> &CurveOracleImpl {
        &self.curves
    }

    pub fn definition(&self, effect_tag: &Tag) -> Option<Arc<StatusEffectDefinition>> {
        self.effects.definition(effect_tag)
    }

    pub fn curve(&self, tag: &Tag) -> Option<Arc<Curve>> {
        self.curves.curve(tag)
    }
}
