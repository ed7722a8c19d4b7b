//! Model-specific registers used by the syscall entry.

/// A model-specific register, by address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Msr(u32);

/// `IA32_EFER`.
pub const IA32_EFER: Msr = Msr(0xC000_0080);
/// `STAR`: segment selector bases for `syscall` and `sysret`.
pub const MSR_STAR: Msr = Msr(0xC000_0081);
/// `LSTAR`: 64-bit `syscall` entry point.
pub const MSR_LSTAR: Msr = Msr(0xC000_0082);
/// `FMASK`: RFLAGS bits cleared on `syscall`.
pub const MSR_FMASK: Msr = Msr(0xC000_0084);

bitflags::bitflags! {
    /// `IA32_EFER` bits the kernel sets.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct EferFlags: u64 {
        /// `syscall`/`sysret` enable.
        const SYSTEM_CALL_ENABLE = 1 << 0;
        /// Long mode enable.
        const LONG_MODE_ENABLE = 1 << 8;
        /// No-execute enable.
        const NO_EXECUTE_ENABLE = 1 << 11;
    }
}

impl Msr {
    /// Register address.
    pub const fn addr(self) -> u32 {
        self.0
    }

    /// Reads the register.
    ///
    /// # Safety
    ///
    /// Ring 0 only, and the register must exist on this CPU.
    #[inline]
    pub unsafe fn read(self) -> u64 {
        let (low, high): (u32, u32);
        unsafe {
            core::arch::asm!(
                "rdmsr",
                in("ecx") self.0,
                out("eax") low,
                out("edx") high,
                options(nomem, nostack, preserves_flags),
            );
        }
        (u64::from(high) << 32) | u64::from(low)
    }

    /// Writes the register.
    ///
    /// # Safety
    ///
    /// Ring 0 only. The value must be valid for the register; a bad EFER or
    /// STAR takes the whole CPU down.
    #[inline]
    pub unsafe fn write(self, value: u64) {
        unsafe {
            core::arch::asm!(
                "wrmsr",
                in("ecx") self.0,
                in("eax") value as u32,
                in("edx") (value >> 32) as u32,
                options(nomem, nostack, preserves_flags),
            );
        }
    }
}
