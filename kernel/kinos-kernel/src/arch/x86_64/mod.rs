//! x86_64 support: model-specific registers and fast syscall setup.

pub mod msr;
pub mod syscall;
