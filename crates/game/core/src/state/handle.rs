//! Stale-detecting references into an entity's slot collections.
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Unique identifier of an entity that owns a [`super::GameplayState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl EntityId {
    /// Placeholder owner used by invalid handles.
    pub const NONE: Self = Self(u32::MAX);

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == Self::NONE.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Marker for handles to attributes.
#[derive(Debug)]
pub enum AttributeMarker {}
/// Marker for handles to modifiers.
#[derive(Debug)]
pub enum ModifierMarker {}
/// Marker for handles to active status effects.
#[derive(Debug)]
pub enum StatusEffectMarker {}

pub type AttributeHandle = Handle<AttributeMarker>;
pub type ModifierHandle = Handle<ModifierMarker>;
pub type StatusEffectHandle = Handle<StatusEffectMarker>;

/// `{owner, slot index, identifier}` triple.
///
/// A handle is only meaningful to the `GameplayState` of its owner. The
/// identifier is compared against the one stored in the slot, so a handle
/// whose slot was freed and reused reports invalid instead of resolving to
/// the new occupant.
pub struct Handle<K> {
    owner: EntityId,
    index: u32,
    identifier: u32,
    _kind: PhantomData<fn() -> K>,
}

impl<K> Handle<K> {
    pub const INVALID_INDEX: u32 = u32::MAX;

    pub const INVALID: Self = Self {
        owner: EntityId::NONE,
        index: Self::INVALID_INDEX,
        identifier: Self::INVALID_INDEX,
        _kind: PhantomData,
    };

    pub(crate) const fn new(owner: EntityId, key: SlotKey) -> Self {
        Self {
            owner,
            index: key.index,
            identifier: key.identifier,
            _kind: PhantomData,
        }
    }

    pub const fn owner(&self) -> EntityId {
        self.owner
    }

    pub const fn index(&self) -> u32 {
        self.index
    }

    pub const fn identifier(&self) -> u32 {
        self.identifier
    }

    /// Structural check only. Whether the slot is still occupied by the same
    /// object is answered by the owning `GameplayState`.
    pub const fn is_valid(&self) -> bool {
        !self.owner.is_none()
            && self.index != Self::INVALID_INDEX
            && self.identifier != Self::INVALID_INDEX
    }

    /// Resets this handle so later use fails fast.
    pub fn invalidate(&mut self) {
        *self = Self::INVALID;
    }

    pub(crate) const fn key(&self) -> SlotKey {
        SlotKey {
            index: self.index,
            identifier: self.identifier,
        }
    }
}

impl<K> Default for Handle<K> {
    fn default() -> Self {
        Self::INVALID
    }
}

impl<K> Clone for Handle<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for Handle<K> {}

impl<K> PartialEq for Handle<K> {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner
            && self.index == other.index
            && self.identifier == other.identifier
    }
}

impl<K> Eq for Handle<K> {}

impl<K> Hash for Handle<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.owner.hash(state);
        self.index.hash(state);
        self.identifier.hash(state);
    }
}

impl<K> fmt::Debug for Handle<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "Handle({}, {}v{})", self.owner, self.index, self.identifier)
        } else {
            f.write_str("Handle(<invalid>)")
        }
    }
}

/// Index plus identifier of an occupied arena slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotKey {
    pub index: u32,
    pub identifier: u32,
}
