//! Fixed-step clock.
//!
//! [`TickManager`] turns variable host frame times into whole fixed-size
//! steps and invokes registered callbacks once per step. Owners are held
//! weakly: dropping an owner never leaves a dangling callback, it is skipped
//! with a warning and pruned on the next unregistration.
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use gameplay_core::GameplayConfig;

/// Slack applied when comparing the accumulator against the step size, so a
/// frame of exactly one step does not fall short through rounding.
const STEP_EPSILON_MS: f64 = 1.0e-6;

enum TickOutcome {
    Ticked,
    OwnerDropped,
    OwnerBusy,
}

trait TickEntry {
    fn owner_id(&self) -> usize;
    fn is_alive(&self) -> bool;
    fn tick(&mut self, step: u64) -> TickOutcome;
}

struct Registration<T, F> {
    owner: Weak<RefCell<T>>,
    callback: F,
}

impl<T, F> TickEntry for Registration<T, F>
where
    F: FnMut(&mut T, u64),
{
    fn owner_id(&self) -> usize {
        owner_id(self.owner.as_ptr())
    }

    fn is_alive(&self) -> bool {
        self.owner.strong_count() > 0
    }

    fn tick(&mut self, step: u64) -> TickOutcome {
        let Some(owner) = self.owner.upgrade() else {
            return TickOutcome::OwnerDropped;
        };
        let Ok(mut owner) = owner.try_borrow_mut() else {
            return TickOutcome::OwnerBusy;
        };
        (self.callback)(&mut owner, step);
        TickOutcome::Ticked
    }
}

fn owner_id<T>(owner: *const RefCell<T>) -> usize {
    owner.cast::<()>() as usize
}

/// Converts elapsed host time into fixed steps.
pub struct TickManager {
    step_size_ms: f64,
    use_aggregated_steps: bool,
    unspent_ms: f64,
    current_step: u64,
    entries: Vec<Box<dyn TickEntry>>,
}

impl TickManager {
    pub fn new(config: &GameplayConfig) -> Self {
        Self {
            step_size_ms: config.step_size_ms(),
            use_aggregated_steps: config.use_aggregated_steps,
            unspent_ms: 0.0,
            current_step: 0,
            entries: Vec::new(),
        }
    }

    /// Registers `callback` to run once per step for `owner`.
    ///
    /// Returns `false` if `owner` was already registered; the existing
    /// callback is kept.
    pub fn register<T, F>(&mut self, owner: &Rc<RefCell<T>>, callback: F) -> bool
    where
        T: 'static,
        F: FnMut(&mut T, u64) + 'static,
    {
        let id = owner_id(Rc::as_ptr(owner));
        if self
            .entries
            .iter()
            .any(|entry| entry.is_alive() && entry.owner_id() == id)
        {
            return false;
        }

        self.entries.push(Box::new(Registration {
            owner: Rc::downgrade(owner),
            callback,
        }));
        tracing::debug!(
            target: "runtime::ticks",
            registrations = self.entries.len(),
            "tick callback registered"
        );
        true
    }

    /// Removes the callback for `owner` and prunes callbacks whose owner was
    /// dropped. Returns whether `owner` was registered.
    pub fn unregister<T>(&mut self, owner: &Rc<RefCell<T>>) -> bool {
        let id = owner_id(Rc::as_ptr(owner));
        let mut found = false;
        self.entries.retain(|entry| {
            if !entry.is_alive() {
                return false;
            }
            if !found && entry.owner_id() == id {
                found = true;
                return false;
            }
            true
        });
        found
    }

    /// Adds `elapsed` to the accumulator and runs as many whole steps as it
    /// covers, or at most one when aggregated steps are disabled. Leftover
    /// time carries over to the next frame. Returns the number of steps run.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.unspent_ms += elapsed.as_secs_f64() * 1000.0;

        let mut executed = 0;
        while self.unspent_ms + STEP_EPSILON_MS >= self.step_size_ms {
            self.unspent_ms = (self.unspent_ms - self.step_size_ms).max(0.0);
            self.current_step += 1;
            executed += 1;
            self.run_step(self.current_step);

            if !self.use_aggregated_steps {
                break;
            }
        }
        executed
    }

    fn run_step(&mut self, step: u64) {
        for entry in &mut self.entries {
            match entry.tick(step) {
                TickOutcome::Ticked => {}
                TickOutcome::OwnerDropped => tracing::warn!(
                    target: "runtime::ticks",
                    step,
                    "skipping tick callback whose owner was dropped"
                ),
                TickOutcome::OwnerBusy => tracing::warn!(
                    target: "runtime::ticks",
                    step,
                    "skipping tick callback whose owner is already borrowed"
                ),
            }
        }
    }

    /// Global step counter. Starts at 0; the first executed step is 1.
    pub fn current_step(&self) -> u64 {
        self.current_step
    }

    /// Accumulated time not yet spent on a step.
    pub fn unspent(&self) -> Duration {
        Duration::from_secs_f64(self.unspent_ms / 1000.0)
    }

    pub fn step_size(&self) -> Duration {
        Duration::from_secs_f64(self.step_size_ms / 1000.0)
    }

    pub fn registration_count(&self) -> usize {
        self.entries.len()
    }
}

impl std::fmt::Debug for TickManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickManager")
            .field("step_size_ms", &self.step_size_ms)
            .field("use_aggregated_steps", &self.use_aggregated_steps)
            .field("unspent_ms", &self.unspent_ms)
            .field("current_step", &self.current_step)
            .field("registrations", &self.entries.len())
            .finish()
    }
}
