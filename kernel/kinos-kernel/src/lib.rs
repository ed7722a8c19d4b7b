//! The KinOS syscall layer.
//!
//! A [`Kernel`] owns every piece of shared kernel state the syscalls touch:
//! the task table (each task with its descriptor table, file mappings,
//! address cursors and mailbox), the timer facility and the kernel log ring.
//! It is built once at boot from a [`KernelConfig`] and the collaborators
//! it drives ([`FileSystem`], [`Display`], [`VolumeImage`], [`Scheduler`])
//! and then handed to the trap entry, which calls [`Kernel::syscall`].
//!
//! Nothing here is reached through a global. Every shared table is guarded
//! by its own [`IrqSpinLock`](kinos_core::sync::IrqSpinLock).

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

extern crate alloc;

pub mod arch;
pub mod config;
pub mod display;
pub mod fs;
pub mod kernel;
pub mod klog;
pub mod sched;
pub mod syscall;
pub mod task;
pub mod timer;
pub mod volume;

#[cfg(test)]
pub(crate) mod testutil;

pub use config::KernelConfig;
pub use display::Display;
pub use fs::{FileHandle, FileSystem};
pub use kernel::{Kernel, KernelServices};
pub use sched::Scheduler;
pub use volume::VolumeImage;
