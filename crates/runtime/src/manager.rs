//! Per-simulation owner of entity tick distribution and definition lookup.
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use gameplay_core::{ConfigError, Curve, FixedTick, GameplayState, StatusEffectDefinition, Tag};

use crate::buckets::TickBuckets;
use crate::oracle::OracleManager;

/// Spreads entity state ticks over [`TickBuckets`] and serves definition and
/// curve lookups from the loaded oracles.
///
/// Registered with the [`crate::TickManager`] as one tick callback; each
/// global step ticks one bucket of entities.
pub struct GameplayStateManager {
    buckets: TickBuckets<GameplayState>,
    oracles: OracleManager,
}

impl GameplayStateManager {
    pub fn new(oracles: OracleManager, bucket_count: usize) -> Result<Self, ConfigError> {
        Ok(Self {
            buckets: TickBuckets::new(bucket_count)?,
            oracles,
        })
    }

    /// Adds an entity to the bucket rotation and returns its bucket.
    ///
    /// The entity's step clock is moved to the last local step its bucket
    /// passed, so modifiers applied before its first tick are timed from the
    /// bucket's clock rather than from zero.
    pub fn register_state(&mut self, state: &Rc<RefCell<GameplayState>>) -> usize {
        let bucket = self.buckets.register(state);
        let step = self
            .buckets
            .bucket_step(bucket)
            .unwrap_or_default()
            .saturating_sub(1);
        match state.try_borrow_mut() {
            Ok(mut state) => state.sync_step(step),
            Err(_) => tracing::warn!(
                target: "runtime::buckets",
                bucket,
                step,
                "state borrowed during registration, step clock not synced"
            ),
        }
        bucket
    }

    pub fn unregister_state(&mut self, state: &Rc<RefCell<GameplayState>>) -> bool {
        self.buckets.unregister(state)
    }

    pub fn buckets(&self) -> &TickBuckets<GameplayState> {
        &self.buckets
    }

    pub fn oracles(&self) -> &OracleManager {
        &self.oracles
    }

    pub fn definition(&self, effect_tag: &Tag) -> Option<Arc<StatusEffectDefinition>> {
        self.oracles.definition(effect_tag)
    }

    pub fn curve_for_modifier(&self, curve_tag: &Tag) -> Option<Arc<Curve>> {
        self.oracles.curve(curve_tag)
    }
}

impl FixedTick for GameplayStateManager {
    fn fixed_tick(&mut self, step: u64) {
        let ticked = self.buckets.tick();
        tracing::trace!(
            target: "runtime::buckets",
            step,
            bucket = (self.buckets.next_to_tick() + self.buckets.bucket_count() - 1)
                % self.buckets.bucket_count(),
            ticked,
            "bucket ticked"
        );
    }
}
