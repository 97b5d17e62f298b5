//! Slot collection with stable indices and reuse detection.
use super::handle::SlotKey;

#[derive(Clone, Debug)]
enum Slot<T> {
    Occupied { identifier: u32, value: T },
    Vacant,
}

/// Owning storage for attributes, modifiers and status effects.
///
/// Indices stay stable while an entry lives. Freed slots are reused, and every
/// insertion receives a fresh identifier, so a [`SlotKey`] taken before a
/// removal never resolves to the entry that later reuses its slot.
#[derive(Clone, Debug)]
pub struct SlotArena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    next_identifier: u32,
    len: usize,
}

impl<T> SlotArena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            next_identifier: 0,
            len: 0,
        }
    }

    /// Stores `value` and returns its key.
    pub fn insert(&mut self, value: T) -> SlotKey {
        self.insert_with(|_| value)
    }

    /// Stores the value built by `make`, which receives the key it will occupy.
    pub fn insert_with(&mut self, make: impl FnOnce(SlotKey) -> T) -> SlotKey {
        let identifier = self.next_identifier;
        self.next_identifier = self.next_identifier.wrapping_add(1);

        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot::Vacant);
                (self.slots.len() - 1) as u32
            }
        };

        let key = SlotKey { index, identifier };
        self.slots[index as usize] = Slot::Occupied {
            identifier,
            value: make(key),
        };
        self.len += 1;
        key
    }

    pub fn contains(&self, key: SlotKey) -> bool {
        self.get(key).is_some()
    }

    pub fn get(&self, key: SlotKey) -> Option<&T> {
        match self.slots.get(key.index as usize)? {
            Slot::Occupied { identifier, value } if *identifier == key.identifier => Some(value),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, key: SlotKey) -> Option<&mut T> {
        match self.slots.get_mut(key.index as usize)? {
            Slot::Occupied { identifier, value } if *identifier == key.identifier => Some(value),
            _ => None,
        }
    }

    /// Removes and returns the entry, or `None` if the key is stale.
    pub fn remove(&mut self, key: SlotKey) -> Option<T> {
        let slot = self.slots.get_mut(key.index as usize)?;
        match slot {
            Slot::Occupied { identifier, .. } if *identifier == key.identifier => {}
            _ => return None,
        }

        match std::mem::replace(slot, Slot::Vacant) {
            Slot::Occupied { value, .. } => {
                self.free.push(key.index);
                self.len -= 1;
                Some(value)
            }
            Slot::Vacant => None,
        }
    }

    /// Keys of all occupied slots in index order.
    pub fn keys(&self) -> Vec<SlotKey> {
        self.iter().map(|(key, _)| key).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotKey, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| match slot {
                Slot::Occupied { identifier, value } => Some((
                    SlotKey {
                        index: index as u32,
                        identifier: *identifier,
                    },
                    value,
                )),
                Slot::Vacant => None,
            })
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.iter().map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T> Default for SlotArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reused_slot_rejects_stale_key() {
        let mut arena = SlotArena::new();
        let first = arena.insert("first");
        assert_eq!(arena.remove(first), Some("first"));

        let second = arena.insert("second");
        assert_eq!(second.index, first.index);
        assert_ne!(second.identifier, first.identifier);

        assert_eq!(arena.get(first), None);
        assert_eq!(arena.remove(first), None);
        assert_eq!(arena.get(second), Some(&"second"));
    }

    #[test]
    fn iteration_skips_vacant_slots_in_index_order() {
        let mut arena = SlotArena::new();
        let a = arena.insert(1);
        let b = arena.insert(2);
        let c = arena.insert(3);
        arena.remove(b);

        let keys = arena.keys();
        assert_eq!(keys, vec![a, c]);
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.values().copied().collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn insert_with_sees_its_own_key() {
        let mut arena = SlotArena::new();
        let key = arena.insert_with(|key| key.identifier * 10);
        assert_eq!(arena.get(key), Some(&(key.identifier * 10)));
    }

    #[test]
    fn double_remove_fails_cleanly() {
        let mut arena = SlotArena::new();
        let key = arena.insert(5);
        assert!(arena.remove(key).is_some());
        assert!(arena.remove(key).is_none());
        assert!(arena.is_empty());
    }
}
