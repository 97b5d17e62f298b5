//! Fixed-step entry point shared by every tickable simulation object.

/// Something advanced once per fixed simulation step.
///
/// `step` is the caller's own monotonically increasing counter. For entities
/// ticked through bucket distribution it is the bucket's local step, not the
/// global one.
pub trait FixedTick {
    fn fixed_tick(&mut self, step: u64);
}
