//! Traits describing read-only gameplay data.
//!
//! Oracles expose status-effect definitions and modifier curves. The [`Env`]
//! aggregate bundles them so entity state can resolve what it needs without
//! hard coupling to concrete implementations. Every lookup is a synchronous
//! "get cached item" call; a miss fails the dependent operation.
mod curves;
mod effects;
mod error;

use std::fmt;

pub use curves::CurveOracle;
pub use effects::EffectOracle;
pub use error::OracleError;

/// Aggregates the read-only oracles used by [`crate::GameplayState`].
pub struct Env<'a, E, C>
where
    E: EffectOracle + ?Sized,
    C: CurveOracle + ?Sized,
{
    effects: Option<&'a E>,
    curves: Option<&'a C>,
}

pub type GameplayEnv<'a> = Env<'a, dyn EffectOracle + 'a, dyn CurveOracle + 'a>;

impl<'a, E, C> Env<'a, E, C>
where
    E: EffectOracle + ?Sized,
    C: CurveOracle + ?Sized,
{
    pub fn new(effects: Option<&'a E>, curves: Option<&'a C>) -> Self {
        Self { effects, curves }
    }

    pub fn with_all(effects: &'a E, curves: &'a C) -> Self {
        Self::new(Some(effects), Some(curves))
    }

    pub fn empty() -> Self {
        Self {
            effects: None,
            curves: None,
        }
    }

    /// Returns the EffectOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::EffectsNotAvailable` if no effect oracle was provided.
    pub fn effects(&self) -> Result<&'a E, OracleError> {
        self.effects.ok_or(OracleError::EffectsNotAvailable)
    }

    /// Returns the CurveOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::CurvesNotAvailable` if no curve oracle was provided.
    pub fn curves(&self) -> Result<&'a C, OracleError> {
        self.curves.ok_or(OracleError::CurvesNotAvailable)
    }
}

impl<'a, E, C> Env<'a, E, C>
where
    E: EffectOracle + 'a,
    C: CurveOracle + 'a,
{
    /// Converts this environment into a trait-object based `GameplayEnv`.
    pub fn into_gameplay_env(self) -> GameplayEnv<'a> {
        let effects: Option<&'a dyn EffectOracle> = self.effects.map(|effects| effects as _);
        let curves: Option<&'a dyn CurveOracle> = self.curves.map(|curves| curves as _);
        Env::new(effects, curves)
    }
}

impl<E, C> Clone for Env<'_, E, C>
where
    E: EffectOracle + ?Sized,
    C: CurveOracle + ?Sized,
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<E, C> Copy for Env<'_, E, C>
where
    E: EffectOracle + ?Sized,
    C: CurveOracle + ?Sized,
{
}

impl<E, C> fmt::Debug for Env<'_, E, C>
where
    E: EffectOracle + ?Sized,
    C: CurveOracle + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Env")
            .field("effects", &self.effects.is_some())
            .field("curves", &self.curves.is_some())
            .finish()
    }
}
