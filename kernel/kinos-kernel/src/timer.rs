//! One-shot timers.
//!
//! Tasks arm timers with `create_timer`; the timer interrupt calls
//! [`TimerFacility::tick`] and the kernel turns each expired timer into a
//! `TimerTimeout` message for its owner (see [`Kernel::timer_tick`]).
//!
//! [`Kernel::timer_tick`]: crate::Kernel::timer_tick

use alloc::collections::BinaryHeap;
use core::cmp::{Ordering, Reverse};
use core::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use kinos_core::id::TaskId;
use kinos_core::sync::IrqSpinLock;
use planck_noalloc::vec::ArrayVec;

use crate::config::TIMER_BATCH;

/// An armed timer.
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    /// Absolute expiry tick.
    pub timeout: u64,
    /// Delivered verbatim in the timeout message.
    pub value: i64,
    /// Owner; receives the timeout message.
    pub task_id: TaskId,
}

impl PartialEq for Timer {
    fn eq(&self, other: &Self) -> bool {
        self.timeout == other.timeout
    }
}

impl Eq for Timer {}

impl PartialOrd for Timer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timer {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timeout.cmp(&other.timeout)
    }
}

/// Expired timers handed out by one [`TimerFacility::tick`].
pub type ExpiredBatch = ArrayVec<Timer, TIMER_BATCH>;

/// The global tick counter and the queue of armed timers.
pub struct TimerFacility {
    tick: AtomicU64,
    frequency: u64,
    queue: IrqSpinLock<BinaryHeap<Reverse<Timer>>>,
}

impl TimerFacility {
    /// A facility at tick 0 running at `frequency` ticks per second.
    pub const fn new(frequency: u64) -> Self {
        Self {
            tick: AtomicU64::new(0),
            frequency,
            queue: IrqSpinLock::named("timers", BinaryHeap::new()),
        }
    }

    /// Ticks since boot.
    pub fn current_tick(&self) -> u64 {
        self.tick.load(AtomicOrdering::Acquire)
    }

    /// Ticks per second.
    pub fn frequency(&self) -> u64 {
        self.frequency
    }

    /// Arms `timer`.
    pub fn add(&self, timer: Timer) {
        self.queue.lock().push(Reverse(timer));
    }

    /// Number of armed timers.
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Advances the tick and pops up to [`TIMER_BATCH`] expired timers in
    /// expiry order.
    ///
    /// Timers beyond the batch stay queued; their timeout is still in the
    /// past on the next tick, so they come out first then.
    pub fn tick(&self) -> ExpiredBatch {
        let now = self.tick.fetch_add(1, AtomicOrdering::AcqRel) + 1;
        let mut batch = ExpiredBatch::new();

        let mut queue = self.queue.lock();
        while batch.len() < TIMER_BATCH {
            match queue.peek() {
                Some(Reverse(timer)) if timer.timeout <= now => {
                    let Some(Reverse(timer)) = queue.pop() else {
                        break;
                    };
                    batch.push(timer);
                }
                _ => break,
            }
        }
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timer(timeout: u64, value: i64) -> Timer {
        Timer {
            timeout,
            value,
            task_id: TaskId::new(1),
        }
    }

    fn values(batch: &ExpiredBatch) -> Vec<i64> {
        batch.iter().map(|t| t.value).collect()
    }

    #[test]
    fn tick_advances_counter() {
        let timers = TimerFacility::new(100);
        assert_eq!(timers.current_tick(), 0);
        timers.tick();
        timers.tick();
        assert_eq!(timers.current_tick(), 2);
        assert_eq!(timers.frequency(), 100);
    }

    #[test]
    fn expired_timers_come_out_in_order() {
        let timers = TimerFacility::new(100);
        timers.add(timer(3, -3));
        timers.add(timer(1, -1));
        timers.add(timer(2, -2));
        timers.add(timer(10, -10));

        assert_eq!(values(&timers.tick()), [-1]);
        assert_eq!(values(&timers.tick()), [-2]);
        assert_eq!(values(&timers.tick()), [-3]);
        assert_eq!(timers.pending(), 1);
    }

    #[test]
    fn timer_at_current_tick_fires_on_next_tick() {
        let timers = TimerFacility::new(100);
        timers.tick();
        timers.add(timer(timers.current_tick(), 7));
        assert_eq!(values(&timers.tick()), [7]);
    }

    #[test]
    fn overflow_beyond_batch_is_deferred() {
        let timers = TimerFacility::new(100);
        for i in 0..(TIMER_BATCH as i64 + 5) {
            timers.add(timer(1, i));
        }
        assert_eq!(timers.tick().len(), TIMER_BATCH);
        assert_eq!(timers.pending(), 5);
        assert_eq!(timers.tick().len(), 5);
        assert_eq!(timers.pending(), 0);
    }
}
