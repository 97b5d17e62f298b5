//! [`gameplay_core::CurveOracle`] backed by an in-memory map.
use std::collections::HashMap;
use std::sync::Arc;

use gameplay_core::tag::curves;
use gameplay_core::{Curve, CurveOracle, Tag};

/// CurveOracle implementation with static curves
#[derive(Debug, Clone, Default)]
pub struct CurveOracleImpl {
    curves: HashMap<Tag, Arc<Curve>>,
}

impl CurveOracleImpl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Oracle preloaded with the well-known curve tags in
    /// [`gameplay_core::tag::curves`], all over `[0, 1]`.
    pub fn with_builtin_curves() -> Self {
        let mut oracle = Self::new();
        oracle.add_curve(curves::LINEAR_INCREASE, Curve::linear(0.0, 1.0));
        oracle.add_curve(curves::LINEAR_DECREASE, Curve::linear(1.0, 0.0));
        oracle.add_curve(
            curves::CURVED_INCREASE,
            Curve::new(vec![(0.0, 0.0), (0.5, 0.25), (1.0, 1.0)]),
        );
        oracle.add_curve(
            curves::CURVED_DECREASE,
            Curve::new(vec![(0.0, 1.0), (0.5, 0.25), (1.0, 0.0)]),
        );
        oracle.add_curve(
            curves::BELL,
            Curve::new(vec![(0.0, 0.0), (0.5, 1.0), (1.0, 0.0)]),
        );
        oracle
    }

    /// Add a curve, replacing any previous one with the same tag.
    pub fn add_curve(&mut self, tag: impl Into<Tag>, curve: Curve) {
        self.curves.insert(tag.into(), Arc::new(curve));
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }
}

impl CurveOracle for CurveOracleImpl {
    fn curve(&self, tag: &Tag) -> Option<Arc<Curve>> {
        self.curves.get(tag).cloned()
    }
}
