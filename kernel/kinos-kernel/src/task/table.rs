//! The task registry.

use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use core::sync::atomic::{AtomicU64, Ordering};

use kinos_core::id::TaskId;
use kinos_core::sync::IrqSpinLock;

use super::Task;
use crate::config::KernelConfig;

/// All live tasks, by id.
///
/// Lookups clone the `Arc` out so no caller holds the table lock while it
/// works on a task.
pub struct TaskTable {
    tasks: IrqSpinLock<BTreeMap<TaskId, Arc<Task>>>,
    next_id: AtomicU64,
}

impl TaskTable {
    /// An empty table. The first task gets id 1.
    pub const fn new() -> Self {
        Self {
            tasks: IrqSpinLock::named("tasks", BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Creates and registers a task.
    pub fn spawn(&self, command_line: &[u8], config: &KernelConfig) -> Arc<Task> {
        let id = TaskId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let task = Arc::new(Task::new(id, command_line, config));
        self.tasks.lock().insert(id, task.clone());
        task
    }

    /// Looks a task up.
    pub fn get(&self, id: TaskId) -> Option<Arc<Task>> {
        self.tasks.lock().get(&id).cloned()
    }

    /// The lowest-id task whose command line is exactly `command_line`.
    pub fn find_by_command_line(&self, command_line: &[u8]) -> Option<Arc<Task>> {
        self.tasks
            .lock()
            .values()
            .find(|task| task.command_line() == command_line)
            .cloned()
    }

    /// Unregisters a task. Its resources go away with the last `Arc`.
    pub fn remove(&self, id: TaskId) -> Option<Arc<Task>> {
        self.tasks.lock().remove(&id)
    }

    /// Number of live tasks.
    pub fn len(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Whether no task is registered.
    pub fn is_empty(&self) -> bool {
        self.tasks.lock().is_empty()
    }
}

impl Default for TaskTable {
    fn default() -> Self {
        Self::new()
    }
}
