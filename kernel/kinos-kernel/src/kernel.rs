//! The kernel state every syscall runs against.

use alloc::sync::Arc;

use kinos_core::id::{Fd, TaskId};
use kinos_core::sync::without_interrupts;
use kinos_core::{kdebug, ktrace};
use kinos_syscall::{ESRCH, Message};

use crate::config::KernelConfig;
use crate::display::Display;
use crate::fs::{FileHandle, FileSystem};
use crate::klog::{self, KernelLog};
use crate::sched::Scheduler;
use crate::task::{Task, TaskTable};
use crate::timer::TimerFacility;
use crate::volume::VolumeImage;

/// The collaborators a [`Kernel`] drives.
pub struct KernelServices {
    /// Backs `open_file`.
    pub fs: Arc<dyn FileSystem>,
    /// Backs the pixel and frame-buffer syscalls.
    pub display: Arc<dyn Display>,
    /// Backs `read_volume_image`.
    pub volume: Arc<dyn VolumeImage>,
    /// Tracks the running task and parks receivers.
    pub scheduler: Arc<dyn Scheduler>,
}

/// Shared kernel state.
pub struct Kernel {
    pub(crate) config: KernelConfig,
    pub(crate) tasks: TaskTable,
    pub(crate) timers: TimerFacility,
    pub(crate) klog: Arc<KernelLog>,
    pub(crate) fs: Arc<dyn FileSystem>,
    pub(crate) display: Arc<dyn Display>,
    pub(crate) volume: Arc<dyn VolumeImage>,
    pub(crate) scheduler: Arc<dyn Scheduler>,
}

impl Kernel {
    /// Builds the kernel state. No task exists yet.
    pub fn new(config: KernelConfig, services: KernelServices) -> Self {
        Self {
            config,
            tasks: TaskTable::new(),
            timers: TimerFacility::new(config.timer_freq),
            klog: Arc::new(KernelLog::new()),
            fs: services.fs,
            display: services.display,
            volume: services.volume,
            scheduler: services.scheduler,
        }
    }

    /// Points the kernel's log macros at this kernel's log ring and applies
    /// the configured level filter. Called once at boot.
    pub fn install_logging(&self) {
        kinos_core::log::set_max_level(self.config.max_log_level);
        klog::install(self.klog.clone());
    }

    /// The configuration the kernel was built with.
    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// The task registry.
    pub fn tasks(&self) -> &TaskTable {
        &self.tasks
    }

    /// The timer facility.
    pub fn timers(&self) -> &TimerFacility {
        &self.timers
    }

    /// The kernel log ring.
    pub fn klog(&self) -> &KernelLog {
        &self.klog
    }

    /// The task on whose behalf the current syscall runs.
    ///
    /// # Errors
    ///
    /// `ESRCH` if the scheduler names a task that is not registered.
    pub fn current_task(&self) -> Result<Arc<Task>, i32> {
        let id = without_interrupts(|| self.scheduler.current());
        self.tasks.get(id).ok_or(ESRCH)
    }

    /// Creates a task and hands it to the scheduler.
    pub fn spawn(&self, command_line: &[u8]) -> Arc<Task> {
        let task = self.tasks.spawn(command_line, &self.config);
        self.scheduler.admit(&task);
        kdebug!("task {} created", task.id());
        task
    }

    /// Tears a task down: unregisters it, which drops its descriptors and
    /// mappings once in-flight syscalls let go of it. Armed timers for it
    /// are discarded when they fire.
    pub fn remove_task(&self, id: TaskId) -> Option<Arc<Task>> {
        let task = self.tasks.remove(id)?;
        kdebug!("task {} removed", id);
        Some(task)
    }

    /// Closes descriptor `fd` of `task`, freeing the slot for reuse.
    pub fn close_file(&self, task: &Task, fd: Fd) -> Option<Arc<dyn FileHandle>> {
        task.resources().close(fd)
    }

    /// Posts `msg` to `dest`, waking it if it was blocked in a receive.
    ///
    /// # Errors
    ///
    /// `ESRCH` if `dest` does not exist.
    pub fn deliver(&self, dest: TaskId, msg: Message) -> Result<(), i32> {
        let task = self.tasks.get(dest).ok_or(ESRCH)?;
        if task.post(msg) {
            self.scheduler.wakeup(&task);
        }
        Ok(())
    }

    /// Timer interrupt work: advances the tick and delivers expired timers
    /// as `TimerTimeout` messages from task 0.
    pub fn timer_tick(&self) {
        let expired = self.timers.tick();
        for timer in expired.iter() {
            let msg = Message::timer_timeout(timer.timeout, timer.value);
            if self.deliver(timer.task_id, msg).is_err() {
                kdebug!("timer for missing task {} dropped", timer.task_id);
            } else {
                ktrace!("timer {} fired for task {}", timer.value, timer.task_id);
            }
        }
    }
}
