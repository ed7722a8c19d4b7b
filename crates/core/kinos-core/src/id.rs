//! Type-safe identifiers for kernel resources.
//!
//! Task ids and descriptor slots both travel through the syscall ABI as
//! plain integers; wrapping them keeps the two from being swapped inside
//! the kernel.

use core::fmt;

/// Task identifier.
///
/// Ids are handed out from 1 upward. [`TaskId::NONE`] (0) never names a
/// live task and is what the ABI uses for "no task".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct TaskId(u64);

impl TaskId {
    /// The reserved "no task" id.
    pub const NONE: Self = Self(0);

    /// Creates a new `TaskId`.
    pub const fn new(val: u64) -> Self {
        Self(val)
    }

    /// Returns the raw `u64` value.
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns `true` unless this is [`TaskId::NONE`].
    pub const fn is_some(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// File descriptor slot index within a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Fd(u32);

impl Fd {
    /// The descriptor `open_file("@stdin")` reports.
    pub const STDIN: Self = Self(0);

    /// Creates a new `Fd`.
    pub const fn new(val: u32) -> Self {
        Self(val)
    }

    /// Converts a raw syscall argument, rejecting values that do not fit.
    pub fn from_raw(raw: u64) -> Option<Self> {
        u32::try_from(raw).ok().map(Self)
    }

    /// Returns the raw `u32` value.
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Returns the value as `usize` for indexing.
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Fd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
