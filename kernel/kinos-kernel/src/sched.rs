//! Scheduler interface.
//!
//! The switch algorithm is not part of this crate. The syscall layer only
//! needs to know which task is running, to park a task that is waiting for
//! mail, and to make it runnable again when mail arrives.

use crate::task::Task;
use kinos_core::id::TaskId;

/// Scheduler operations used by the syscall layer.
pub trait Scheduler: Send + Sync {
    /// The task whose syscall is being handled on this CPU.
    fn current(&self) -> TaskId;

    /// A new task was created by `new_task`; make it schedulable.
    fn admit(&self, task: &Task);

    /// Parks `task` until [`Scheduler::wakeup`] is called for it.
    ///
    /// Called with no kernel lock held and the task's state already set to
    /// [`TaskState::BlockedOnReceive`](crate::task::TaskState). If the state
    /// has moved on by the time the scheduler looks, it must return
    /// immediately. Spurious returns are allowed; the caller re-checks.
    fn sleep(&self, task: &Task);

    /// `task` left [`TaskState::BlockedOnReceive`](crate::task::TaskState)
    /// and should run again.
    fn wakeup(&self, task: &Task);
}
