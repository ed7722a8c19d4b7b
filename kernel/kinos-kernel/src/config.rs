//! Kernel configuration.
//!
//! Compile-time constants for sizes the type system needs, plus
//! [`KernelConfig`] for everything a boot path (or a test) may want to
//! choose at run time.

use kinos_core::log::LogLevel;

/// Bytes of history kept by the kernel log ring (backing array size).
pub const KLOG_CAPACITY: usize = 16 * 1024;

/// Timers delivered per tick at most; the rest wait for the next tick.
pub const TIMER_BATCH: usize = 32;

/// Timer interrupt rate, in ticks per second.
pub const DEFAULT_TIMER_FREQ: u64 = 100;

/// Run-time kernel parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelConfig {
    /// Timer interrupt rate, in ticks per second.
    pub timer_freq: u64,
    /// Initial `demand_paging_end` for new tasks.
    pub demand_paging_base: u64,
    /// Initial `file_map_end` for new tasks. Must be page-aligned.
    pub file_map_top: u64,
    /// Capacity of a task's argument buffer, NUL included.
    pub argument_capacity: usize,
    /// Capacity of a task's `copy_to_task_buffer` area.
    pub task_buffer_capacity: usize,
    /// Least severe level that reaches the log backend.
    pub max_log_level: LogLevel,
}

impl KernelConfig {
    /// The configuration the kernel boots with.
    pub const fn new() -> Self {
        Self {
            timer_freq: DEFAULT_TIMER_FREQ,
            demand_paging_base: 0x0000_1000_0000_0000,
            file_map_top: 0x0000_7000_0000_0000,
            argument_capacity: 1024,
            task_buffer_capacity: 4096,
            max_log_level: LogLevel::Debug,
        }
    }

    /// Overrides the timer frequency.
    #[must_use]
    pub const fn with_timer_freq(mut self, timer_freq: u64) -> Self {
        self.timer_freq = timer_freq;
        self
    }

    /// Overrides the demand-paging base and file-map top.
    #[must_use]
    pub const fn with_address_layout(mut self, demand_paging_base: u64, file_map_top: u64) -> Self {
        self.demand_paging_base = demand_paging_base;
        self.file_map_top = file_map_top;
        self
    }

    /// Overrides the per-task buffer capacities.
    #[must_use]
    pub const fn with_buffers(mut self, argument_capacity: usize, task_buffer_capacity: usize) -> Self {
        self.argument_capacity = argument_capacity;
        self.task_buffer_capacity = task_buffer_capacity;
        self
    }

    /// Overrides the log filter.
    #[must_use]
    pub const fn with_max_log_level(mut self, level: LogLevel) -> Self {
        self.max_log_level = level;
        self
    }
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self::new()
    }
}
