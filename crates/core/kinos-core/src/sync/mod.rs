//! Synchronization primitives for the kernel.
//!
//! KinOS shares its task table, mailboxes, timer heap and kernel log ring
//! between syscall handlers and the timer interrupt. Every one of them sits
//! behind an [`IrqSpinLock`], which masks interrupts for exactly as long as
//! the guard lives.

mod irq_spinlock;

pub use irq_spinlock::{IrqSpinLock, IrqSpinLockGuard, without_interrupts};
