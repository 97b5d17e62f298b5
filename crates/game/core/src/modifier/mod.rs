//! Modifier model: behavior variants, construction specs, validation and the
//! stored modifier type.
//!
//! A modifier changes one attribute. Its [`ApplicationType`] decides when it
//! is active, its [`CalculationType`] where its value comes from, and its
//! [`OperationType`] how that value folds into the attribute's aggregate.
mod curve;
mod delegate;
mod instance;
mod spec;
mod types;
mod validation;

pub use curve::Curve;
pub use delegate::{ModifierDelegate, ModifierHook};
pub use instance::Modifier;
pub use spec::{ClampDelta, CurveParams, ModifierSpec};
pub use types::{ApplicationType, CalculationType, OperationType};
pub use validation::{ModifierSpecError, SpecContext};
