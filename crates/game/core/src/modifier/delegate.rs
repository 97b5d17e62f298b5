//! Injected recalculation hooks for `SetByDelegate` / `SetByEffect` modifiers.
use std::fmt;
use std::sync::Arc;

use crate::tag::Tag;

/// Strategy object queried once per eligible step.
///
/// Implementations that keep state use interior mutability; the engine only
/// ever holds shared references.
pub trait ModifierHook: Send + Sync {
    /// Whether the modifier's value should be refreshed this step.
    fn should_recalculate(&self, attribute: &Tag) -> bool;

    /// Produces the new modifier value.
    fn recalculate(&self, attribute: &Tag) -> f32;
}

struct FnHook<S, R> {
    should: S,
    recalc: R,
}

impl<S, R> ModifierHook for FnHook<S, R>
where
    S: Fn(&Tag) -> bool + Send + Sync,
    R: Fn(&Tag) -> f32 + Send + Sync,
{
    fn should_recalculate(&self, attribute: &Tag) -> bool {
        (self.should)(attribute)
    }

    fn recalculate(&self, attribute: &Tag) -> f32 {
        (self.recalc)(attribute)
    }
}

/// Shared handle to a [`ModifierHook`].
#[derive(Clone)]
pub struct ModifierDelegate(Arc<dyn ModifierHook>);

impl ModifierDelegate {
    pub fn new(hook: impl ModifierHook + 'static) -> Self {
        Self(Arc::new(hook))
    }

    pub fn from_arc(hook: Arc<dyn ModifierHook>) -> Self {
        Self(hook)
    }

    /// Builds a delegate from a `(should_recalculate, recalculate)` function pair.
    pub fn from_fns<S, R>(should_recalculate: S, recalculate: R) -> Self
    where
        S: Fn(&Tag) -> bool + Send + Sync + 'static,
        R: Fn(&Tag) -> f32 + Send + Sync + 'static,
    {
        Self::new(FnHook {
            should: should_recalculate,
            recalc: recalculate,
        })
    }

    pub fn should_recalculate(&self, attribute: &Tag) -> bool {
        self.0.should_recalculate(attribute)
    }

    pub fn recalculate(&self, attribute: &Tag) -> f32 {
        self.0.recalculate(attribute)
    }
}

impl fmt::Debug for ModifierDelegate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ModifierDelegate(..)")
    }
}
