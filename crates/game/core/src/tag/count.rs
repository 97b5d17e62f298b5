//! Reference-counted tag set.

use std::collections::{BTreeSet, HashMap};

use super::Tag;

/// Counts how many sources currently grant each tag.
///
/// A tag enters the explicit set on its 0→1 transition and leaves it on
/// 1→0. Removing a tag that was never added is ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagCountContainer {
    counts: HashMap<Tag, u32>,
    explicit: BTreeSet<Tag>,
}

impl TagCountContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the count for `tag` and returns the new count.
    pub fn add(&mut self, tag: &Tag) -> u32 {
        let count = self.counts.entry(tag.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            self.explicit.insert(tag.clone());
        }
        *count
    }

    /// Decrements the count for `tag`.
    ///
    /// Returns the remaining count, or `None` when the tag was not present.
    pub fn remove(&mut self, tag: &Tag) -> Option<u32> {
        let Some(count) = self.counts.get_mut(tag) else {
            tracing::warn!(
                target: "gameplay::tags",
                tag = %tag,
                "attempted to remove a tag that was never added"
            );
            return None;
        };

        *count -= 1;
        let remaining = *count;
        if remaining == 0 {
            self.counts.remove(tag);
            self.explicit.remove(tag);
        }
        Some(remaining)
    }

    pub fn count(&self, tag: &Tag) -> u32 {
        self.counts.get(tag).copied().unwrap_or(0)
    }

    pub fn contains(&self, tag: &Tag) -> bool {
        self.explicit.contains(tag)
    }

    /// True if any tag in `tags` is present.
    pub fn contains_any<'a>(&self, tags: impl IntoIterator<Item = &'a Tag>) -> bool {
        tags.into_iter().any(|tag| self.contains(tag))
    }

    /// True if every tag in `tags` is present. Vacuously true for an empty set.
    pub fn contains_all<'a>(&self, tags: impl IntoIterator<Item = &'a Tag>) -> bool {
        tags.into_iter().all(|tag| self.contains(tag))
    }

    /// Explicit tags in sorted order.
    pub fn tags(&self) -> impl Iterator<Item = &Tag> {
        self.explicit.iter()
    }

    pub fn len(&self) -> usize {
        self.explicit.len()
    }

    pub fn is_empty(&self) -> bool {
        self.explicit.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn explicit_set_tracks_transitions() {
        let mut container = TagCountContainer::new();
        let stunned = Tag::new("State.Stunned");

        assert_eq!(container.add(&stunned), 1);
        assert_eq!(container.add(&stunned), 2);
        assert!(container.contains(&stunned));

        assert_eq!(container.remove(&stunned), Some(1));
        assert!(container.contains(&stunned));
        assert_eq!(container.remove(&stunned), Some(0));
        assert!(!container.contains(&stunned));
        assert!(container.is_empty());
    }

    #[test]
    fn removing_absent_tag_is_noop() {
        let mut container = TagCountContainer::new();
        container.add(&Tag::new("State.Burning"));

        assert_eq!(container.remove(&Tag::new("State.Frozen")), None);
        assert_eq!(container.len(), 1);
        assert_eq!(container.count(&Tag::new("State.Burning")), 1);
    }

    #[test]
    fn contains_all_is_vacuous_for_empty_input() {
        let container = TagCountContainer::new();
        assert!(container.contains_all(std::iter::empty()));
        assert!(!container.contains_any(std::iter::empty()));
    }

    proptest! {
        #[test]
        fn membership_matches_positive_count(
            ops in proptest::collection::vec((0usize..4, any::<bool>()), 0..64),
        ) {
            let tags: Vec<Tag> = ["A", "A.B", "C", "D"]
                .iter()
                .map(|name| Tag::new(*name))
                .collect();
            let mut container = TagCountContainer::new();
            let mut expected = [0u32; 4];

            for (index, add) in ops {
                if add {
                    container.add(&tags[index]);
                    expected[index] += 1;
                } else {
                    container.remove(&tags[index]);
                    expected[index] = expected[index].saturating_sub(1);
                }
            }

            for (tag, count) in tags.iter().zip(expected) {
                prop_assert_eq!(container.count(tag), count);
                prop_assert_eq!(container.contains(tag), count > 0);
            }
        }
    }
}
