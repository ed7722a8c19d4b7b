//! `syscall`/`sysret` setup.
//!
//! The entry stub itself (stack switch, register save, the call into
//! [`Kernel::syscall`](crate::Kernel::syscall) and the return through
//! `sysretq`) is linked in by the boot crate; this module only points the
//! CPU at it.

use super::msr::EferFlags;

/// Kernel code selector; `syscall` loads CS from here and SS from +8.
pub const KERNEL_CS: u64 = 0x08;

/// `sysret` base selector with RPL 3; it loads SS from +8 and CS from +16.
pub const USER_BASE: u64 = 0x10 | 3;

/// RFLAGS bits cleared on entry. Interrupts stay as the caller had them;
/// handlers mask them around each critical section.
pub const FMASK_VALUE: u64 = 0;

/// Value programmed into `STAR`.
pub const fn star_value() -> u64 {
    (KERNEL_CS << 32) | (USER_BASE << 48)
}

/// `efer` with the bits the syscall path needs switched on.
pub const fn efer_value(efer: u64) -> u64 {
    efer | EferFlags::SYSTEM_CALL_ENABLE.bits()
        | EferFlags::LONG_MODE_ENABLE.bits()
        | EferFlags::NO_EXECUTE_ENABLE.bits()
}

/// Enables `syscall` and points `LSTAR` at `entry`.
///
/// # Safety
///
/// Must run once per CPU, in ring 0, after the GDT is loaded with the
/// selector layout [`KERNEL_CS`] and [`USER_BASE`] assume. `entry` must be
/// the address of a valid entry stub.
#[cfg(target_os = "none")]
pub unsafe fn init(entry: u64) {
    use super::msr::{IA32_EFER, MSR_FMASK, MSR_LSTAR, MSR_STAR};

    unsafe {
        IA32_EFER.write(efer_value(IA32_EFER.read()));
        MSR_STAR.write(star_value());
        MSR_LSTAR.write(entry);
        MSR_FMASK.write(FMASK_VALUE);
    }
    kinos_core::kdebug!("syscall entry at {:#x}", entry);
}
