//! Numeric gameplay attributes.
//!
//! An [`Attribute`] holds a base value, a derived current value, optional
//! clamp ranges for each, and the bookkeeping the modifier engine needs:
//! the dirty flag, the override slot, the list of active modifiers and the
//! reverse dependency edges to attributes that read this one.
use crate::state::SlotKey;
use crate::tag::Tag;

/// Inclusive `[min, max]` bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClampRange {
    pub min: f32,
    pub max: f32,
}

impl ClampRange {
    pub const UNBOUNDED: Self = Self {
        min: f32::MIN,
        max: f32::MAX,
    };

    /// Builds a range, ordering the bounds if given reversed.
    pub fn new(min: f32, max: f32) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn clamp(&self, value: f32) -> f32 {
        value.max(self.min).min(self.max)
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Returns this range with both bounds moved by the given deltas.
    ///
    /// If the deltas cross the bounds over, the range collapses onto `min`.
    pub fn shifted(&self, min_delta: f32, max_delta: f32) -> Self {
        let min = self.min + min_delta;
        let max = (self.max + max_delta).max(min);
        Self { min, max }
    }
}

/// Clamp ranges for the base and the current value.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeClamping {
    pub base: ClampRange,
    pub current: ClampRange,
}

impl AttributeClamping {
    /// Same range for base and current.
    pub fn uniform(min: f32, max: f32) -> Self {
        let range = ClampRange::new(min, max);
        Self {
            base: range,
            current: range,
        }
    }
}

/// Parameters for [`crate::GameplayState::add_attribute`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeInit {
    pub initial_value: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub clamping: Option<AttributeClamping>,
}

impl AttributeInit {
    pub fn new(initial_value: f32) -> Self {
        Self {
            initial_value,
            clamping: None,
        }
    }

    pub fn clamped(initial_value: f32, min: f32, max: f32) -> Self {
        Self {
            initial_value,
            clamping: Some(AttributeClamping::uniform(min, max)),
        }
    }

    pub fn with_clamping(mut self, clamping: AttributeClamping) -> Self {
        self.clamping = Some(clamping);
        self
    }
}

/// Reverse dependency edge: `modifier` on attribute `dependent` reads this
/// attribute's current value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeDependency {
    pub dependent: Tag,
    pub(crate) modifier: SlotKey,
}

/// Payload delivered to attribute listeners on every real value change.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeChanged {
    pub tag: Tag,
    pub new_base: f32,
    pub new_current: f32,
    pub old_base: f32,
    pub old_current: f32,
}

bitflags::bitflags! {
    /// Which values of an attribute moved beyond tolerance.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ValueChange: u8 {
        const BASE = 1 << 0;
        const CURRENT = 1 << 1;
    }
}

impl ValueChange {
    pub fn between(old: (f32, f32), new: (f32, f32), tolerance: f32) -> Self {
        let mut change = Self::empty();
        if (old.0 - new.0).abs() > tolerance {
            change |= Self::BASE;
        }
        if (old.1 - new.1).abs() > tolerance {
            change |= Self::CURRENT;
        }
        change
    }
}

/// A named numeric value on one entity.
#[derive(Clone, Debug)]
pub struct Attribute {
    tag: Tag,
    pub(crate) base_value: f32,
    pub(crate) current_value: f32,
    /// Configured ranges. Only instant modifiers change these.
    pub(crate) clamping: Option<AttributeClamping>,
    /// Ranges in effect after the last recalculation (configured plus deltas).
    pub(crate) effective_clamping: Option<AttributeClamping>,
    pub(crate) dirty: bool,
    pub(crate) overriding_modifier: Option<SlotKey>,
    pub(crate) active_modifiers: Vec<SlotKey>,
    pub(crate) dependents: Vec<AttributeDependency>,
}

impl Attribute {
    pub(crate) fn new(tag: Tag, init: &AttributeInit) -> Self {
        let mut attribute = Self {
            tag,
            base_value: init.initial_value,
            current_value: init.initial_value,
            clamping: init.clamping,
            effective_clamping: init.clamping,
            dirty: false,
            overriding_modifier: None,
            active_modifiers: Vec::new(),
            dependents: Vec::new(),
        };
        attribute.clamp_values();
        attribute
    }

    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    pub fn base_value(&self) -> f32 {
        self.base_value
    }

    pub fn current_value(&self) -> f32 {
        self.current_value
    }

    pub fn uses_clamping(&self) -> bool {
        self.clamping.is_some()
    }

    /// Base bounds currently in effect.
    pub fn base_range(&self) -> Option<ClampRange> {
        self.effective_clamping.map(|clamping| clamping.base)
    }

    /// Current-value bounds currently in effect.
    pub fn current_range(&self) -> Option<ClampRange> {
        self.effective_clamping.map(|clamping| clamping.current)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_overridden(&self) -> bool {
        self.overriding_modifier.is_some()
    }

    pub fn active_modifier_count(&self) -> usize {
        self.active_modifiers.len()
    }

    /// Tags of attributes whose modifiers read this attribute.
    pub fn dependent_tags(&self) -> impl Iterator<Item = &Tag> {
        self.dependents.iter().map(|edge| &edge.dependent)
    }

    pub(crate) fn values(&self) -> (f32, f32) {
        (self.base_value, self.current_value)
    }

    pub(crate) fn clamp_values(&mut self) {
        if let Some(clamping) = self.effective_clamping {
            self.base_value = clamping.base.clamp(self.base_value);
            self.current_value = clamping.current.clamp(self.current_value);
        }
    }

    pub(crate) fn detach_modifier(&mut self, modifier: SlotKey) {
        self.active_modifiers.retain(|key| *key != modifier);
        if self.overriding_modifier == Some(modifier) {
            self.overriding_modifier = None;
        }
    }

    pub(crate) fn remove_dependency(&mut self, modifier: SlotKey) {
        self.dependents.retain(|edge| edge.modifier != modifier);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_attribute_clamps_initial_value() {
        let attribute = Attribute::new(
            Tag::new("Attribute.Health"),
            &AttributeInit::clamped(150.0, 0.0, 100.0),
        );
        assert_eq!(attribute.base_value(), 100.0);
        assert_eq!(attribute.current_value(), 100.0);
        assert!(attribute.uses_clamping());
    }

    #[test]
    fn shifted_range_never_inverts() {
        let range = ClampRange::new(0.0, 10.0).shifted(20.0, 0.0);
        assert_eq!(range.min, 20.0);
        assert_eq!(range.max, 20.0);
        assert!(range.contains(range.clamp(-5.0)));
    }

    #[test]
    fn reversed_bounds_are_ordered() {
        assert_eq!(ClampRange::new(5.0, -5.0), ClampRange::new(-5.0, 5.0));
    }

    #[test]
    fn value_change_respects_tolerance() {
        assert!(ValueChange::between((1.0, 1.0), (1.00001, 1.0), 1.0e-4).is_empty());
        assert_eq!(
            ValueChange::between((1.0, 1.0), (1.0, 2.0), 1.0e-4),
            ValueChange::CURRENT
        );
    }
}
