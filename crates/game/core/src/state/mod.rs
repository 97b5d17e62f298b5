//! Per-entity gameplay state.
//!
//! [`GameplayState`] owns one entity's attributes, modifiers and active status
//! effects in slot arenas, and exposes every mutation as a method. The
//! implementation is split by concern:
//! - this module: construction, the attribute store and listeners
//! - `modifiers`: creating, updating and removing modifiers
//! - `recalculate`: the fixed-step pass and the aggregation formula
//! - `effects`: the status-effect state machine
mod arena;
mod effects;
mod error;
mod handle;
mod listeners;
mod modifiers;
mod recalculate;

use std::collections::HashMap;
use std::fmt;

pub use arena::SlotArena;
pub use error::StateError;
pub use handle::{
    AttributeHandle, AttributeMarker, EntityId, Handle, ModifierHandle, ModifierMarker, SlotKey,
    StatusEffectHandle, StatusEffectMarker,
};
pub use listeners::{AttributeListener, ListenerId};

use crate::attribute::{Attribute, AttributeChanged, AttributeInit};
use crate::config::GameplayConfig;
use crate::effect::StatusEffect;
use crate::error::reject;
use crate::modifier::Modifier;
use crate::tag::{Tag, TagCountContainer};
use listeners::ListenerRegistry;

/// Attributes, modifiers and status effects of one entity.
///
/// All mutation is synchronous and happens either through the public methods
/// or inside [`crate::FixedTick::fixed_tick`]. Nothing here is shared across
/// entities.
pub struct GameplayState {
    entity: EntityId,
    value_tolerance: f32,
    latest_step: u64,
    attributes: SlotArena<Attribute>,
    attribute_index: HashMap<Tag, SlotKey>,
    modifiers: SlotArena<Modifier>,
    status_effects: SlotArena<StatusEffect>,
    state_tags: TagCountContainer,
    listeners: ListenerRegistry,
    /// Effects whose last tracked modifier expired during the current tick.
    finished_effects: Vec<SlotKey>,
}

impl GameplayState {
    pub fn new(entity: EntityId) -> Self {
        Self::with_config(entity, &GameplayConfig::default())
    }

    pub fn with_config(entity: EntityId, config: &GameplayConfig) -> Self {
        Self {
            entity,
            value_tolerance: config.value_tolerance,
            latest_step: 0,
            attributes: SlotArena::new(),
            attribute_index: HashMap::new(),
            modifiers: SlotArena::new(),
            status_effects: SlotArena::new(),
            state_tags: TagCountContainer::new(),
            listeners: ListenerRegistry::default(),
            finished_effects: Vec::new(),
        }
    }

    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// Step passed to the most recent fixed tick. New modifiers start here.
    pub fn latest_step(&self) -> u64 {
        self.latest_step
    }

    /// Moves the step clock of a state joining a tick rotation that is
    /// already running. Modifiers added before its first tick start at `step`.
    #[doc(hidden)]
    pub fn sync_step(&mut self, step: u64) {
        self.latest_step = step;
    }

    // ===== attribute store =====

    /// Adds a new attribute.
    ///
    /// # Errors
    ///
    /// Fails if the tag is empty or already present on this entity.
    pub fn add_attribute(
        &mut self,
        tag: impl Into<Tag>,
        init: AttributeInit,
    ) -> Result<AttributeHandle, StateError> {
        let tag = tag.into();
        if !tag.is_valid() {
            return Err(reject("add_attribute", StateError::InvalidAttributeTag));
        }
        if self.attribute_index.contains_key(&tag) {
            return Err(reject("add_attribute", StateError::AttributeExists(tag)));
        }

        let key = self.attributes.insert(Attribute::new(tag.clone(), &init));
        self.attribute_index.insert(tag.clone(), key);
        tracing::trace!(
            target: "gameplay::state",
            entity = %self.entity,
            attribute = %tag,
            value = init.initial_value,
            "attribute added"
        );
        Ok(AttributeHandle::new(self.entity, key))
    }

    /// Removes an attribute together with every modifier that targets it or
    /// reads it.
    pub fn remove_attribute(&mut self, tag: &Tag) -> Result<(), StateError> {
        let Some(&key) = self.attribute_index.get(tag) else {
            return Err(reject(
                "remove_attribute",
                StateError::AttributeNotFound(tag.clone()),
            ));
        };

        let dependent_modifiers: Vec<SlotKey> = self
            .attributes
            .get(key)
            .map(|attribute| {
                attribute
                    .dependents
                    .iter()
                    .map(|edge| edge.modifier)
                    .chain(attribute.active_modifiers.iter().copied())
                    .collect()
            })
            .unwrap_or_default();

        for modifier in dependent_modifiers {
            self.release_modifier(modifier, false);
        }

        self.listeners.remove_for(tag);
        self.attributes.remove(key);
        self.attribute_index.remove(tag);
        tracing::trace!(
            target: "gameplay::state",
            entity = %self.entity,
            attribute = %tag,
            "attribute removed"
        );
        Ok(())
    }

    pub fn has_attribute(&self, tag: &Tag) -> bool {
        self.attribute_index.contains_key(tag)
    }

    pub fn attribute(&self, tag: &Tag) -> Option<&Attribute> {
        let key = self.attribute_index.get(tag)?;
        self.attributes.get(*key)
    }

    pub fn attribute_handle(&self, tag: &Tag) -> Option<AttributeHandle> {
        self.attribute_index
            .get(tag)
            .map(|key| AttributeHandle::new(self.entity, *key))
    }

    pub fn attribute_by_handle(&self, handle: AttributeHandle) -> Option<&Attribute> {
        if handle.owner() != self.entity {
            return None;
        }
        self.attributes.get(handle.key())
    }

    pub fn is_attribute_handle_valid(&self, handle: AttributeHandle) -> bool {
        handle.is_valid() && self.attribute_by_handle(handle).is_some()
    }

    pub fn base_value(&self, tag: &Tag) -> Option<f32> {
        self.attribute(tag).map(Attribute::base_value)
    }

    pub fn current_value(&self, tag: &Tag) -> Option<f32> {
        self.attribute(tag).map(Attribute::current_value)
    }

    /// Attributes in slot order.
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.values()
    }

    // ===== listeners =====

    /// Registers a callback for value changes of one attribute.
    pub fn subscribe(
        &mut self,
        tag: &Tag,
        listener: impl FnMut(&AttributeChanged) + Send + 'static,
    ) -> Result<ListenerId, StateError> {
        if !self.has_attribute(tag) {
            return Err(reject(
                "subscribe",
                StateError::AttributeNotFound(tag.clone()),
            ));
        }
        Ok(self
            .listeners
            .subscribe(Some(tag.clone()), Box::new(listener)))
    }

    /// Registers a callback for value changes of every attribute.
    pub fn subscribe_all(
        &mut self,
        listener: impl FnMut(&AttributeChanged) + Send + 'static,
    ) -> ListenerId {
        self.listeners.subscribe(None, Box::new(listener))
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> Result<(), StateError> {
        if self.listeners.unsubscribe(id) {
            Ok(())
        } else {
            Err(reject("unsubscribe", StateError::ListenerNotFound))
        }
    }

    // ===== internal helpers shared by the submodules =====

    fn mark_dirty(&mut self, tag: &Tag) {
        if let Some(attribute) = self
            .attribute_index
            .get(tag)
            .and_then(|key| self.attributes.get_mut(*key))
        {
            attribute.dirty = true;
        }
    }

    /// Resolves a handle issued by this entity into a live slot key.
    fn resolve<K>(
        &self,
        handle: Handle<K>,
        live: impl Fn(SlotKey) -> bool,
    ) -> Result<SlotKey, StateError> {
        if !handle.is_valid() {
            return Err(StateError::StaleHandle);
        }
        if handle.owner() != self.entity {
            return Err(StateError::ForeignHandle {
                owner: self.entity,
                handle_owner: handle.owner(),
            });
        }
        let key = handle.key();
        if live(key) {
            Ok(key)
        } else {
            Err(StateError::StaleHandle)
        }
    }
}

impl fmt::Debug for GameplayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameplayState")
            .field("entity", &self.entity)
            .field("latest_step", &self.latest_step)
            .field("attributes", &self.attributes.len())
            .field("modifiers", &self.modifiers.len())
            .field("status_effects", &self.status_effects.len())
            .field("state_tags", &self.state_tags)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
