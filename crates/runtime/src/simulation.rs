//! Host-facing simulation driver.
//!
//! [`Simulation`] owns the fixed-step clock, the bucket manager and every
//! spawned entity. Hosts call [`Simulation::frame`] with their frame time and
//! reach entity state through the methods below.
use std::cell::{RefCell, RefMut};
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

use gameplay_core::{
    AttributeInit, EntityId, FixedTick, GameplayConfig, GameplayEnv, GameplayState,
    ModifierHandle, ModifierSpec, StatusEffectHandle, Tag,
};

use crate::error::{Result, SimulationError};
use crate::manager::GameplayStateManager;
use crate::oracle::OracleManager;
use crate::scheduler::TickManager;

/// Fixed-step gameplay simulation over a set of entities.
pub struct Simulation {
    config: GameplayConfig,
    ticks: TickManager,
    manager: Rc<RefCell<GameplayStateManager>>,
    oracles: OracleManager,
    entities: BTreeMap<EntityId, Rc<RefCell<GameplayState>>>,
    next_entity: u32,
}

impl Simulation {
    pub fn builder() -> SimulationBuilder {
        SimulationBuilder::new()
    }

    /// Creates a simulation and registers its bucket manager with the clock.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Config`] if `config` does not validate.
    pub fn new(config: GameplayConfig, oracles: OracleManager) -> Result<Self> {
        config.validate()?;

        let manager = Rc::new(RefCell::new(GameplayStateManager::new(
            oracles.clone(),
            config.tick_bucket_count,
        )?));
        let mut ticks = TickManager::new(&config);
        ticks.register(&manager, |manager: &mut GameplayStateManager, step| {
            manager.fixed_tick(step)
        });

        tracing::info!(
            target: "runtime::simulation",
            steps_per_second = config.target_steps_per_second,
            buckets = config.tick_bucket_count,
            aggregated = config.use_aggregated_steps,
            "simulation created"
        );

        Ok(Self {
            config,
            ticks,
            manager,
            oracles,
            entities: BTreeMap::new(),
            next_entity: 0,
        })
    }

    // ===== entities =====

    /// Spawns an entity without attributes.
    pub fn spawn(&mut self) -> EntityId {
        let id = self.allocate_id();
        self.insert(GameplayState::with_config(id, &self.config))
    }

    /// Spawns an entity with the given attributes.
    ///
    /// Nothing is registered if any attribute is rejected.
    pub fn spawn_with(
        &mut self,
        attributes: impl IntoIterator<Item = (Tag, AttributeInit)>,
    ) -> Result<EntityId> {
        let id = self.allocate_id();
        let mut state = GameplayState::with_config(id, &self.config);
        for (tag, init) in attributes {
            state
                .add_attribute(tag, init)
                .map_err(|source| SimulationError::State { entity: id, source })?;
        }
        Ok(self.insert(state))
    }

    /// Removes an entity and its bucket membership.
    pub fn despawn(&mut self, id: EntityId) -> Result<()> {
        let state = self
            .entities
            .remove(&id)
            .ok_or(SimulationError::UnknownEntity(id))?;
        self.manager.borrow_mut().unregister_state(&state);
        tracing::debug!(target: "runtime::simulation", entity = %id, "entity despawned");
        Ok(())
    }

    pub fn entity(&self, id: EntityId) -> Option<&Rc<RefCell<GameplayState>>> {
        self.entities.get(&id)
    }

    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &Rc<RefCell<GameplayState>>)> {
        self.entities.iter().map(|(id, state)| (*id, state))
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Bucket the entity is ticked in.
    pub fn bucket_of(&self, id: EntityId) -> Option<usize> {
        let state = self.entities.get(&id)?;
        self.manager.borrow().buckets().bucket_of(state)
    }

    // ===== time =====

    /// Advances the clock by one host frame. Returns the number of fixed
    /// steps that ran.
    pub fn frame(&mut self, elapsed: Duration) -> u32 {
        self.ticks.advance(elapsed)
    }

    pub fn current_step(&self) -> u64 {
        self.ticks.current_step()
    }

    pub fn ticks(&self) -> &TickManager {
        &self.ticks
    }

    pub fn config(&self) -> &GameplayConfig {
        &self.config
    }

    pub fn oracles(&self) -> &OracleManager {
        &self.oracles
    }

    pub fn env(&self) -> GameplayEnv<'_> {
        self.oracles.as_gameplay_env()
    }

    // ===== gameplay =====

    /// Runs `f` with mutable access to one entity's state.
    pub fn with_state<R>(
        &self,
        id: EntityId,
        f: impl FnOnce(&mut GameplayState) -> R,
    ) -> Result<R> {
        let mut state = self.borrow_state(id)?;
        Ok(f(&mut state))
    }

    pub fn current_value(&self, id: EntityId, attribute: &Tag) -> Result<Option<f32>> {
        let state = self
            .entities
            .get(&id)
            .ok_or(SimulationError::UnknownEntity(id))?;
        let state = state
            .try_borrow()
            .map_err(|_| SimulationError::EntityBusy(id))?;
        Ok(state.current_value(attribute))
    }

    pub fn apply_effect(&self, id: EntityId, effect_tag: &Tag) -> Result<StatusEffectHandle> {
        let mut state = self.borrow_state(id)?;
        state
            .add_status_effect(self.env(), effect_tag)
            .map_err(|source| SimulationError::StatusEffect { entity: id, source })
    }

    pub fn clear_effect(&self, id: EntityId, effect_tag: &Tag) -> Result<usize> {
        let mut state = self.borrow_state(id)?;
        state
            .clear_status_effect(effect_tag)
            .map_err(|source| SimulationError::StatusEffect { entity: id, source })
    }

    pub fn modify_attribute(
        &self,
        id: EntityId,
        attribute: &Tag,
        spec: ModifierSpec,
    ) -> Result<Option<ModifierHandle>> {
        let mut state = self.borrow_state(id)?;
        state
            .modify_attribute(self.env(), attribute, spec)
            .map_err(|source| SimulationError::State { entity: id, source })
    }

    fn borrow_state(&self, id: EntityId) -> Result<RefMut<'_, GameplayState>> {
        let state = self
            .entities
            .get(&id)
            .ok_or(SimulationError::UnknownEntity(id))?;
        state
            .try_borrow_mut()
            .map_err(|_| SimulationError::EntityBusy(id))
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_entity);
        self.next_entity += 1;
        id
    }

    fn insert(&mut self, state: GameplayState) -> EntityId {
        let id = state.entity();
        let state = Rc::new(RefCell::new(state));
        let bucket = self.manager.borrow_mut().register_state(&state);
        self.entities.insert(id, state);
        tracing::debug!(target: "runtime::simulation", entity = %id, bucket, "entity spawned");
        id
    }
}

/// Builder for [`Simulation`].
#[derive(Debug, Default)]
pub struct SimulationBuilder {
    config: GameplayConfig,
    oracles: Option<OracleManager>,
}

impl SimulationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: GameplayConfig) -> Self {
        self.config = config;
        self
    }

    pub fn oracles(mut self, oracles: OracleManager) -> Self {
        self.oracles = Some(oracles);
        self
    }

    /// Loads config and oracles from a content directory.
    #[cfg(feature = "content")]
    pub fn content(
        mut self,
        factory: &gameplay_content::ContentFactory,
    ) -> gameplay_content::LoadResult<Self> {
        self.config = factory.load_config()?;
        self.oracles = Some(OracleManager::from_content(factory)?);
        Ok(self)
    }

    pub fn build(self) -> Result<Simulation> {
        Simulation::new(self.config, self.oracles.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gameplay_core::{ApplicationType, CalculationType, OperationType};

    fn health() -> Tag {
        Tag::new("Attribute.Health")
    }

    fn buff(value: f32, duration: u64) -> ModifierSpec {
        ModifierSpec::new(
            ApplicationType::Duration,
            CalculationType::SetByCaller,
            OperationType::Additive,
            value,
        )
        .with_duration(duration, false)
    }

    fn simulation(buckets: usize) -> Simulation {
        let config = GameplayConfig {
            target_steps_per_second: 50,
            tick_bucket_count: buckets,
            use_aggregated_steps: true,
            ..GameplayConfig::new()
        };
        Simulation::builder().config(config).build().unwrap()
    }

    #[test]
    fn invalid_config_is_rejected() {
        let result = Simulation::builder()
            .config(GameplayConfig::with_steps_per_second(0))
            .build();
        assert!(matches!(result, Err(SimulationError::Config(_))));
    }

    #[test]
    fn entities_are_spread_over_buckets() {
        let mut sim = simulation(3);
        let ids: Vec<EntityId> = (0..4).map(|_| sim.spawn()).collect();

        let buckets: Vec<Option<usize>> = ids.iter().map(|id| sim.bucket_of(*id)).collect();
        assert_eq!(buckets, vec![Some(0), Some(1), Some(2), Some(0)]);

        sim.despawn(ids[1]).unwrap();
        assert_eq!(sim.bucket_of(ids[1]), None);
        assert!(matches!(
            sim.despawn(ids[1]),
            Err(SimulationError::UnknownEntity(_))
        ));
    }

    #[test]
    fn modifiers_progress_with_bucket_steps() {
        let mut sim = simulation(1);
        let id = sim
            .spawn_with([(health(), AttributeInit::new(100.0))])
            .unwrap();
        sim.modify_attribute(id, &health(), buff(10.0, 3)).unwrap();

        sim.frame(Duration::from_millis(20));
        assert_eq!(sim.current_value(id, &health()).unwrap(), Some(110.0));

        sim.frame(Duration::from_millis(80));
        assert_eq!(sim.current_value(id, &health()).unwrap(), Some(100.0));
    }

    #[test]
    fn late_spawned_entity_times_modifiers_from_its_bucket() {
        let mut sim = simulation(1);
        assert_eq!(sim.frame(Duration::from_secs(2)), 100);

        let id = sim
            .spawn_with([(health(), AttributeInit::new(10.0))])
            .unwrap();
        assert_eq!(sim.with_state(id, |state| state.latest_step()).unwrap(), 99);
        sim.modify_attribute(id, &health(), buff(5.0, 30)).unwrap();
        assert_eq!(sim.current_value(id, &health()).unwrap(), Some(15.0));

        sim.frame(Duration::from_millis(20));
        assert_eq!(sim.current_value(id, &health()).unwrap(), Some(15.0));
        assert_eq!(sim.with_state(id, |state| state.modifier_count()).unwrap(), 1);

        sim.frame(Duration::from_millis(20 * 28));
        assert_eq!(sim.current_value(id, &health()).unwrap(), Some(15.0));

        sim.frame(Duration::from_millis(20));
        assert_eq!(sim.current_value(id, &health()).unwrap(), Some(10.0));
        assert_eq!(sim.with_state(id, |state| state.modifier_count()).unwrap(), 0);
    }

    #[test]
    fn spawned_entities_join_their_bucket_clock() {
        let mut sim = simulation(2);
        sim.frame(Duration::from_millis(60));

        // Bucket 0 has passed local steps 0 and 1, bucket 1 only step 0.
        let first = sim.spawn();
        let second = sim.spawn();
        let latest = |sim: &Simulation, id: EntityId| {
            sim.with_state(id, |state| state.latest_step()).unwrap()
        };
        assert_eq!((latest(&sim, first), latest(&sim, second)), (1, 0));

        sim.frame(Duration::from_millis(40));
        assert_eq!((latest(&sim, first), latest(&sim, second)), (2, 1));
    }

    #[test]
    fn duplicate_attributes_fail_spawn() {
        let mut sim = simulation(2);
        let result = sim.spawn_with([
            (health(), AttributeInit::new(1.0)),
            (health(), AttributeInit::new(2.0)),
        ]);
        assert!(matches!(result, Err(SimulationError::State { .. })));
        assert_eq!(sim.entity_count(), 0);
    }

    #[test]
    fn unknown_effect_is_reported_with_entity() {
        let mut sim = simulation(2);
        let id = sim.spawn();
        let error = sim.apply_effect(id, &Tag::new("Effect.Missing")).unwrap_err();
        assert!(matches!(error, SimulationError::StatusEffect { entity, .. } if entity == id));
    }
}
