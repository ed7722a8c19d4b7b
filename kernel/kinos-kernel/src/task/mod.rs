//! Tasks as the syscall layer sees them.
//!
//! A [`Task`] bundles what syscalls read and mutate on a task's behalf:
//! its resources (descriptors, mappings, cursors, argument, transfer
//! buffer) and its mailbox. The two sit behind separate locks so message
//! traffic never contends with file I/O bookkeeping.

mod mailbox;
mod resources;
mod table;

pub use mailbox::TaskState;
pub use resources::{FileMapping, TaskResources};
pub use table::TaskTable;

use alloc::boxed::Box;
use core::sync::atomic::{AtomicU64, Ordering};

use kinos_core::id::TaskId;
use kinos_core::sync::{IrqSpinLock, IrqSpinLockGuard};
use kinos_syscall::Message;

use crate::config::KernelConfig;
use mailbox::Mailbox;

/// A task.
pub struct Task {
    id: TaskId,
    command_line: Box<[u8]>,
    os_stack_pointer: AtomicU64,
    resources: IrqSpinLock<TaskResources>,
    mailbox: IrqSpinLock<Mailbox>,
}

impl Task {
    pub(crate) fn new(id: TaskId, command_line: &[u8], config: &KernelConfig) -> Self {
        Self {
            id,
            command_line: command_line.into(),
            os_stack_pointer: AtomicU64::new(0),
            resources: IrqSpinLock::named("task.resources", TaskResources::new(config)),
            mailbox: IrqSpinLock::named("task.mailbox", Mailbox::new()),
        }
    }

    /// The task's id.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// The command line `find_server` matches against.
    pub fn command_line(&self) -> &[u8] {
        &self.command_line
    }

    /// Kernel stack pointer saved when the task entered its application.
    pub fn os_stack_pointer(&self) -> u64 {
        self.os_stack_pointer.load(Ordering::Acquire)
    }

    /// Records the kernel stack pointer `exit` will return to.
    pub fn set_os_stack_pointer(&self, sp: u64) {
        self.os_stack_pointer.store(sp, Ordering::Release);
    }

    /// Locks the task's resources.
    pub fn resources(&self) -> IrqSpinLockGuard<'_, TaskResources> {
        self.resources.lock()
    }

    /// Current messaging state.
    pub fn state(&self) -> TaskState {
        self.mailbox.lock().state()
    }

    /// Messages waiting in the mailbox.
    pub fn pending_messages(&self) -> usize {
        self.mailbox.lock().len()
    }

    /// Enqueues `msg`. Returns `true` if the task was blocked in a receive
    /// and is now runnable; the caller must then wake it.
    pub fn post(&self, msg: Message) -> bool {
        self.mailbox.lock().post(msg)
    }

    /// Dequeues the next message without blocking.
    pub fn try_receive(&self) -> Option<Message> {
        self.mailbox.lock().try_receive()
    }

    /// Dequeues the next message, or atomically marks the task
    /// [`TaskState::BlockedOnReceive`] and returns `None`.
    pub fn receive_or_block(&self) -> Option<Message> {
        self.mailbox.lock().receive_or_block()
    }
}

impl core::fmt::Debug for Task {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("command_line", &core::str::from_utf8(&self.command_line))
            .finish_non_exhaustive()
    }
}
