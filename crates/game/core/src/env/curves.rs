use std::sync::Arc;

use crate::modifier::Curve;
use crate::tag::Tag;

/// Read-only lookup of modifier curves by curve tag.
pub trait CurveOracle: Send + Sync {
    fn curve(&self, tag: &Tag) -> Option<Arc<Curve>>;
}
