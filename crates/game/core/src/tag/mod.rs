//! Hierarchical symbolic tags.
//!
//! Tags name attributes, status effects, state flags and curves. They are
//! dotted paths (`"Effect.Damage.Fire"`) compared exactly for bookkeeping and
//! hierarchically (via [`Tag::matches`]) for category rules such as
//! cancel-on-apply.
mod count;

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

pub use count::TagCountContainer;

/// Ordered set of tags used by definitions. Ordering keeps iteration deterministic.
pub type TagSet = BTreeSet<Tag>;

/// Well-known curve tags for `SetByData` modifiers.
pub mod curves {
    pub const LINEAR_INCREASE: &str = "Modifier.Curve.Linear.Increase";
    pub const LINEAR_DECREASE: &str = "Modifier.Curve.Linear.Decrease";
    pub const CURVED_INCREASE: &str = "Modifier.Curve.Curved.Increase";
    pub const CURVED_DECREASE: &str = "Modifier.Curve.Curved.Decrease";
    pub const BELL: &str = "Modifier.Curve.Bell";
}

/// Cheap-to-clone dotted name.
///
/// The empty tag is the "none" value and is never valid as a key.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Tag(Arc<str>);

impl Tag {
    const SEPARATOR: char = '.';

    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref().trim()))
    }

    /// Returns the empty tag.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_valid(&self) -> bool {
        !self.0.is_empty()
    }

    /// Returns true if `self` equals `parent` or is nested below it.
    ///
    /// `"Effect.Damage.Fire".matches("Effect.Damage")` holds,
    /// `"Effect.DamageOverTime".matches("Effect.Damage")` does not.
    pub fn matches(&self, parent: &Tag) -> bool {
        if !self.is_valid() || !parent.is_valid() {
            return false;
        }
        match self.0.strip_prefix(parent.as_str()) {
            Some("") => true,
            Some(rest) => rest.starts_with(Self::SEPARATOR),
            None => false,
        }
    }

    /// Returns true if this tag matches any tag in `set`.
    pub fn matches_any<'a>(&self, set: impl IntoIterator<Item = &'a Tag>) -> bool {
        set.into_iter().any(|parent| self.matches(parent))
    }

    /// Returns the direct parent (`"A.B"` for `"A.B.C"`), if any.
    pub fn parent(&self) -> Option<Tag> {
        self.0
            .rfind(Self::SEPARATOR)
            .map(|split| Tag::new(&self.0[..split]))
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "Tag({})", self.0)
        } else {
            f.write_str("Tag(<none>)")
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Tag {
    fn from(value: &str) -> Self {
        Tag::new(value)
    }
}

impl From<String> for Tag {
    fn from(value: String) -> Self {
        Tag::new(value)
    }
}

impl AsRef<str> for Tag {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
