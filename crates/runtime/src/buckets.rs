//! Load distribution across consecutive fixed steps.
//!
//! Members are assigned round robin to a fixed number of buckets. Each global
//! step ticks exactly one bucket, so every member is ticked once every
//! `bucket_count` global steps while the per-step cost stays bounded. Each
//! bucket keeps its own step counter: members see a contiguous local step
//! sequence regardless of where their bucket sits in the rotation.
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use arrayvec::ArrayVec;
use gameplay_core::{ConfigError, FixedTick, GameplayConfig};

const MAX_TICK_BUCKETS: usize = GameplayConfig::MAX_TICK_BUCKETS;

struct TickBucket<T> {
    step: u64,
    members: Vec<Weak<RefCell<T>>>,
}

impl<T> TickBucket<T> {
    fn new() -> Self {
        Self {
            step: 0,
            members: Vec::new(),
        }
    }
}

/// Fixed set of buckets ticked one per global step.
pub struct TickBuckets<T> {
    buckets: ArrayVec<TickBucket<T>, MAX_TICK_BUCKETS>,
    assignments: HashMap<usize, usize>,
    next_to_assign: usize,
    next_to_tick: usize,
}

fn member_id<T>(member: &Rc<RefCell<T>>) -> usize {
    Rc::as_ptr(member).cast::<()>() as usize
}

impl<T: FixedTick> TickBuckets<T> {
    /// # Errors
    ///
    /// Fails if `bucket_count` is zero or above
    /// [`GameplayConfig::MAX_TICK_BUCKETS`].
    pub fn new(bucket_count: usize) -> Result<Self, ConfigError> {
        if bucket_count == 0 || bucket_count > MAX_TICK_BUCKETS {
            return Err(ConfigError::BucketCount {
                requested: bucket_count,
                max: MAX_TICK_BUCKETS,
            });
        }

        let mut buckets = ArrayVec::new();
        for _ in 0..bucket_count {
            buckets.push(TickBucket::new());
        }
        Ok(Self {
            buckets,
            assignments: HashMap::new(),
            next_to_assign: 0,
            next_to_tick: 0,
        })
    }

    /// Assigns `member` to the next bucket in rotation and returns its index.
    ///
    /// Registering a live member twice returns its existing bucket.
    pub fn register(&mut self, member: &Rc<RefCell<T>>) -> usize {
        let id = member_id(member);
        if let Some(&bucket) = self.assignments.get(&id) {
            let live = self.buckets[bucket]
                .members
                .iter()
                .any(|weak| Weak::as_ptr(weak) == Rc::as_ptr(member) && weak.strong_count() > 0);
            if live {
                return bucket;
            }
            // The address belonged to a dropped member that was never
            // unregistered.
            self.detach(bucket, id);
        }

        let bucket = self.next_to_assign;
        self.buckets[bucket].members.push(Rc::downgrade(member));
        self.assignments.insert(id, bucket);
        self.next_to_assign = (self.next_to_assign + 1) % self.buckets.len();

        tracing::trace!(
            target: "runtime::buckets",
            bucket,
            members = self.buckets[bucket].members.len(),
            "member registered"
        );
        bucket
    }

    /// Removes `member` from its bucket. Returns whether it was registered.
    pub fn unregister(&mut self, member: &Rc<RefCell<T>>) -> bool {
        let id = member_id(member);
        let Some(bucket) = self.assignments.remove(&id) else {
            return false;
        };
        self.detach(bucket, id);
        true
    }

    fn detach(&mut self, bucket: usize, id: usize) {
        self.assignments.remove(&id);
        self.buckets[bucket]
            .members
            .retain(|weak| Weak::as_ptr(weak).cast::<()>() as usize != id);
    }

    /// Ticks every live member of the due bucket with that bucket's local
    /// step, then advances the bucket's counter and the rotation cursor.
    ///
    /// Dropped or currently borrowed members are skipped. Returns how many
    /// members were ticked.
    pub fn tick(&mut self) -> usize {
        let index = self.next_to_tick;
        let bucket = &mut self.buckets[index];
        let step = bucket.step;

        let mut ticked = 0;
        for weak in &bucket.members {
            let Some(member) = weak.upgrade() else {
                continue;
            };
            let Ok(mut member) = member.try_borrow_mut() else {
                tracing::warn!(
                    target: "runtime::buckets",
                    bucket = index,
                    step,
                    "skipping member that is already borrowed"
                );
                continue;
            };
            member.fixed_tick(step);
            ticked += 1;
        }

        bucket.step += 1;
        self.next_to_tick = (self.next_to_tick + 1) % self.buckets.len();
        ticked
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Bucket `member` is assigned to, if registered.
    pub fn bucket_of(&self, member: &Rc<RefCell<T>>) -> Option<usize> {
        self.assignments.get(&member_id(member)).copied()
    }

    /// Local step the bucket will pass on its next tick.
    pub fn bucket_step(&self, bucket: usize) -> Option<u64> {
        self.buckets.get(bucket).map(|bucket| bucket.step)
    }

    pub fn bucket_len(&self, bucket: usize) -> usize {
        self.buckets.get(bucket).map_or(0, |bucket| bucket.members.len())
    }

    /// Index of the bucket ticked next.
    pub fn next_to_tick(&self) -> usize {
        self.next_to_tick
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        steps: Vec<u64>,
    }

    impl FixedTick for Recorder {
        fn fixed_tick(&mut self, step: u64) {
            self.steps.push(step);
        }
    }

    fn member() -> Rc<RefCell<Recorder>> {
        Rc::new(RefCell::new(Recorder::default()))
    }

    #[test]
    fn bucket_count_is_bounded() {
        assert!(TickBuckets::<Recorder>::new(0).is_err());
        assert!(TickBuckets::<Recorder>::new(MAX_TICK_BUCKETS + 1).is_err());
        assert!(TickBuckets::<Recorder>::new(MAX_TICK_BUCKETS).is_ok());
    }

    #[test]
    fn members_are_assigned_round_robin() {
        let mut buckets = TickBuckets::new(3).unwrap();
        let members: Vec<_> = (0..5).map(|_| member()).collect();
        let assigned: Vec<usize> = members.iter().map(|m| buckets.register(m)).collect();
        assert_eq!(assigned, vec![0, 1, 2, 0, 1]);
        assert_eq!(buckets.register(&members[0]), 0);
        assert_eq!(buckets.len(), 5);
    }

    #[test]
    fn one_bucket_ticks_per_call_with_local_steps() {
        let mut buckets = TickBuckets::new(2).unwrap();
        let first = member();
        let second = member();
        buckets.register(&first);
        buckets.register(&second);

        for _ in 0..6 {
            buckets.tick();
        }
        assert_eq!(first.borrow().steps, vec![0, 1, 2]);
        assert_eq!(second.borrow().steps, vec![0, 1, 2]);
        assert_eq!(buckets.bucket_step(0), Some(3));
    }

    #[test]
    fn unregistered_and_dropped_members_are_not_ticked() {
        let mut buckets = TickBuckets::new(1).unwrap();
        let kept = member();
        let removed = member();
        let dropped = member();
        buckets.register(&kept);
        buckets.register(&removed);
        buckets.register(&dropped);

        assert!(buckets.unregister(&removed));
        assert!(!buckets.unregister(&removed));
        drop(dropped);

        assert_eq!(buckets.tick(), 1);
        assert_eq!(kept.borrow().steps, vec![0]);
        assert!(removed.borrow().steps.is_empty());
        assert_eq!(buckets.bucket_len(0), 2);
    }

    #[test]
    fn borrowed_member_is_skipped() {
        let mut buckets = TickBuckets::new(1).unwrap();
        let busy = member();
        buckets.register(&busy);

        let guard = busy.borrow_mut();
        assert_eq!(buckets.tick(), 0);
        drop(guard);

        assert_eq!(buckets.tick(), 1);
        assert_eq!(busy.borrow().steps, vec![1]);
    }

    proptest::proptest! {
        #[test]
        fn every_member_sees_contiguous_local_steps(
            members in 1usize..40,
            buckets_n in 1usize..16,
            rounds in 1usize..6,
        ) {
            let mut buckets = TickBuckets::new(buckets_n).unwrap();
            let all: Vec<_> = (0..members).map(|_| member()).collect();
            for m in &all {
                buckets.register(m);
            }
            for _ in 0..buckets_n * rounds {
                buckets.tick();
            }
            for m in &all {
                let expected: Vec<u64> = (0..rounds as u64).collect();
                proptest::prop_assert_eq!(&m.borrow().steps, &expected);
            }
        }
    }
}
