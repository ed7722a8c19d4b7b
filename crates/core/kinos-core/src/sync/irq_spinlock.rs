//! Interrupt-masking spin lock.
//!
//! Acquiring an [`IrqSpinLock`] saves RFLAGS and executes `cli` before
//! spinning; dropping the guard releases the lock and restores IF only if
//! it was set on entry. Nested guards therefore keep interrupts off until
//! the outermost one goes away.
//!
//! On hosted builds (tests) the flag handling compiles to nothing and the
//! lock degrades to a plain TTAS spin lock, which still gives the mutual
//! exclusion the kernel relies on.

use core::cell::UnsafeCell;
use core::marker::PhantomData;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicBool, Ordering};

/// RFLAGS.IF
#[cfg(all(target_os = "none", target_arch = "x86_64"))]
const RFLAGS_IF: u64 = 1 << 9;

/// A spin lock that keeps interrupts disabled while held.
pub struct IrqSpinLock<T> {
    locked: AtomicBool,
    name: &'static str,
    data: UnsafeCell<T>,
}

// SAFETY: Access to `data` is serialized by `locked`.
unsafe impl<T: Send> Send for IrqSpinLock<T> {}
unsafe impl<T: Send> Sync for IrqSpinLock<T> {}

impl<T> IrqSpinLock<T> {
    /// Creates a new unlocked `IrqSpinLock`.
    pub const fn new(value: T) -> Self {
        Self::named("<unnamed>", value)
    }

    /// Creates a new unlocked `IrqSpinLock` carrying a name for diagnostics.
    pub const fn named(name: &'static str, value: T) -> Self {
        Self {
            locked: AtomicBool::new(false),
            name,
            data: UnsafeCell::new(value),
        }
    }

    /// Returns the diagnostic name given at construction.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Disables interrupts, then spins until the lock is acquired.
    pub fn lock(&self) -> IrqSpinLockGuard<'_, T> {
        let saved_flags = save_flags_and_cli();

        loop {
            if self
                .locked
                .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
                .is_ok()
            {
                return IrqSpinLockGuard {
                    lock: self,
                    saved_flags,
                    _not_send: PhantomData,
                };
            }
            while self.locked.load(Ordering::Relaxed) {
                core::hint::spin_loop();
            }
        }
    }

    /// Attempts to acquire the lock once. Interrupt state is restored on failure.
    pub fn try_lock(&self) -> Option<IrqSpinLockGuard<'_, T>> {
        let saved_flags = save_flags_and_cli();
        if self
            .locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            Some(IrqSpinLockGuard {
                lock: self,
                saved_flags,
                _not_send: PhantomData,
            })
        } else {
            restore_flags(saved_flags);
            None
        }
    }

    /// Returns a mutable reference without locking; `&mut self` proves exclusivity.
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }

    /// Consumes the lock and returns the protected value.
    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

impl<T: Default> Default for IrqSpinLock<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> core::fmt::Debug for IrqSpinLock<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IrqSpinLock")
            .field("name", &self.name)
            .field("locked", &self.locked.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

/// RAII guard for [`IrqSpinLock`].
///
/// Not `Send`: the saved interrupt flag belongs to the CPU that took the
/// lock.
pub struct IrqSpinLockGuard<'a, T> {
    lock: &'a IrqSpinLock<T>,
    saved_flags: u64,
    _not_send: PhantomData<*const ()>,
}

// SAFETY: Sharing `&guard` only hands out `&T`.
unsafe impl<T: Sync> Sync for IrqSpinLockGuard<'_, T> {}

impl<T> Deref for IrqSpinLockGuard<'_, T> {
    type Target = T;
    fn deref(&self) -> &T {
        // SAFETY: The lock is held for the guard's lifetime.
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> DerefMut for IrqSpinLockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: The lock is held for the guard's lifetime.
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T> Drop for IrqSpinLockGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.locked.store(false, Ordering::Release);
        restore_flags(self.saved_flags);
    }
}

/// Runs `f` with interrupts disabled, restoring the previous state after.
///
/// For short reads of per-CPU state (such as "which task is current") that
/// do not need a lock of their own.
pub fn without_interrupts<R>(f: impl FnOnce() -> R) -> R {
    let saved_flags = save_flags_and_cli();
    let result = f();
    restore_flags(saved_flags);
    result
}

#[cfg(all(target_os = "none", target_arch = "x86_64"))]
#[inline]
fn save_flags_and_cli() -> u64 {
    let flags: u64;
    // SAFETY: Reading RFLAGS and clearing IF is always allowed in ring 0.
    unsafe {
        core::arch::asm!(
            "pushfq",
            "pop {}",
            "cli",
            out(reg) flags,
            options(nomem),
        );
    }
    flags
}

#[cfg(all(target_os = "none", target_arch = "x86_64"))]
#[inline]
fn restore_flags(flags: u64) {
    if flags & RFLAGS_IF != 0 {
        // SAFETY: Interrupts were enabled when the matching save ran.
        unsafe {
            core::arch::asm!("sti", options(nomem, nostack, preserves_flags));
        }
    }
}

#[cfg(not(all(target_os = "none", target_arch = "x86_64")))]
#[inline]
fn save_flags_and_cli() -> u64 {
    0
}

#[cfg(not(all(target_os = "none", target_arch = "x86_64")))]
#[inline]
fn restore_flags(_flags: u64) {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn lock_then_try_lock_after_release() {
        let lock = IrqSpinLock::new(7);
        {
            let guard = lock.lock();
            assert_eq!(*guard, 7);
            assert!(lock.try_lock().is_none());
        }
        assert!(lock.try_lock().is_some());
    }

    #[test]
    fn mutation_is_visible_to_next_holder() {
        let lock = IrqSpinLock::named("counter", 0u32);
        *lock.lock() += 5;
        assert_eq!(*lock.lock(), 5);
        assert_eq!(lock.name(), "counter");
    }

    #[test]
    fn into_inner_and_get_mut() {
        let mut lock = IrqSpinLock::new(vec![1, 2]);
        lock.get_mut().push(3);
        assert_eq!(lock.into_inner(), vec![1, 2, 3]);
    }

    #[test]
    fn without_interrupts_returns_closure_value() {
        assert_eq!(without_interrupts(|| 40 + 2), 42);
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        const THREADS: usize = 8;
        const ITERS: usize = 10_000;

        let lock = Arc::new(IrqSpinLock::new(0usize));
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let lock = Arc::clone(&lock);
                thread::spawn(move || {
                    for _ in 0..ITERS {
                        *lock.lock() += 1;
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(*lock.lock(), THREADS * ITERS);
    }
}
