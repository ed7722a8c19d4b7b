//! User-space pointer validation for syscall arguments.
//!
//! Every pointer a syscall receives is a raw register value. The types here
//! check it is non-null, aligned and entirely below the user/kernel split
//! before the handler touches memory through it. They do not prove the
//! memory is mapped: a bad but user-half address still faults in the
//! caller's address space, which is the page-fault handler's business.

use alloc::vec::Vec;
use core::marker::PhantomData;
use core::mem::{align_of, size_of};

use kinos_syscall::{E2BIG, EFAULT};

/// Upper bound of canonical user-space addresses.
#[cfg(target_arch = "x86_64")]
pub const USER_ADDR_MAX: u64 = 0x0000_8000_0000_0000;

/// Upper bound of user-space addresses on hosts without the x86_64 split.
#[cfg(not(target_arch = "x86_64"))]
pub const USER_ADDR_MAX: u64 = 0x0001_0000_0000_0000;

fn check_range(addr: u64, len: u64) -> Result<(), i32> {
    let end = addr.checked_add(len).ok_or(EFAULT)?;
    if addr == 0 || end > USER_ADDR_MAX {
        return Err(EFAULT);
    }
    Ok(())
}

/// A validated pointer to one `T` in user memory.
#[derive(Debug)]
pub struct UserPtr<T> {
    addr: u64,
    _marker: PhantomData<*mut T>,
}

impl<T> Clone for UserPtr<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for UserPtr<T> {}

impl<T: Copy> UserPtr<T> {
    /// Validates `addr` for a `T`.
    ///
    /// # Errors
    ///
    /// `EFAULT` if `addr` is null, misaligned, or the `T` would reach past
    /// the user half.
    pub fn new(addr: u64) -> Result<Self, i32> {
        if addr % align_of::<T>() as u64 != 0 {
            return Err(EFAULT);
        }
        check_range(addr, size_of::<T>() as u64)?;
        Ok(Self {
            addr,
            _marker: PhantomData,
        })
    }

    /// Returns the raw address.
    pub fn addr(&self) -> u64 {
        self.addr
    }

    /// Copies the `T` out of user memory.
    ///
    /// # Safety
    ///
    /// The address must be mapped and readable in the current address
    /// space and hold a valid `T`.
    pub unsafe fn read(&self) -> T {
        unsafe { (self.addr as *const T).read_volatile() }
    }

    /// Copies `value` into user memory.
    ///
    /// # Safety
    ///
    /// The address must be mapped and writable in the current address space.
    pub unsafe fn write(&self, value: T) {
        unsafe { (self.addr as *mut T).write_volatile(value) }
    }
}

/// A validated user byte range.
#[derive(Debug, Clone, Copy)]
pub struct UserSlice {
    addr: u64,
    len: usize,
}

impl UserSlice {
    /// Validates `[addr, addr + len)`.
    ///
    /// A zero length is always accepted and never dereferenced.
    ///
    /// # Errors
    ///
    /// `EFAULT` if `len > 0` and the range is null or leaves the user half.
    pub fn new(addr: u64, len: u64) -> Result<Self, i32> {
        if len == 0 {
            return Ok(Self { addr: 0, len: 0 });
        }
        check_range(addr, len)?;
        let len = usize::try_from(len).map_err(|_| EFAULT)?;
        Ok(Self { addr, len })
    }

    /// Returns the raw address.
    pub fn addr(&self) -> u64 {
        self.addr
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the range is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Borrows the range.
    ///
    /// # Safety
    ///
    /// The range must be mapped and readable, and not written by anything
    /// else while the borrow lives.
    pub unsafe fn as_slice<'a>(&self) -> &'a [u8] {
        if self.len == 0 {
            return &[];
        }
        unsafe { core::slice::from_raw_parts(self.addr as *const u8, self.len) }
    }

    /// Borrows the range mutably.
    ///
    /// # Safety
    ///
    /// The range must be mapped and writable, and not aliased while the
    /// borrow lives.
    pub unsafe fn as_mut_slice<'a>(&self) -> &'a mut [u8] {
        if self.len == 0 {
            return &mut [];
        }
        unsafe { core::slice::from_raw_parts_mut(self.addr as *mut u8, self.len) }
    }
}

/// A validated user array of `count` elements of `T`.
#[derive(Debug)]
pub struct UserArray<T> {
    addr: u64,
    count: usize,
    _marker: PhantomData<*mut T>,
}

impl<T: Copy> UserArray<T> {
    /// Validates room for `count` elements at `addr`.
    ///
    /// # Errors
    ///
    /// `EFAULT` if `count > 0` and the array is null, misaligned, or does
    /// not fit below the user half.
    pub fn new(addr: u64, count: u64) -> Result<Self, i32> {
        if count == 0 {
            return Ok(Self {
                addr: 0,
                count: 0,
                _marker: PhantomData,
            });
        }
        if addr % align_of::<T>() as u64 != 0 {
            return Err(EFAULT);
        }
        let bytes = count.checked_mul(size_of::<T>() as u64).ok_or(EFAULT)?;
        check_range(addr, bytes)?;
        let count = usize::try_from(count).map_err(|_| EFAULT)?;
        Ok(Self {
            addr,
            count,
            _marker: PhantomData,
        })
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Stores `value` at `index`. Out-of-range indices are ignored.
    ///
    /// # Safety
    ///
    /// The array must be mapped and writable in the current address space.
    pub unsafe fn write_at(&self, index: usize, value: T) {
        if index >= self.count {
            return;
        }
        let ptr = (self.addr as *mut T).wrapping_add(index);
        unsafe { ptr.write_volatile(value) }
    }
}

/// Copies a NUL-terminated user string of at most `max_len` bytes.
///
/// The NUL is not included in the result.
///
/// # Errors
///
/// `EFAULT` if the string starts at null or runs into the kernel half
/// before its terminator; `E2BIG` if no NUL appears within `max_len + 1`
/// bytes.
///
/// # Safety
///
/// Every byte up to the terminator (or `max_len + 1` bytes) that lies in
/// the user half must be mapped and readable.
pub unsafe fn read_user_cstr(addr: u64, max_len: usize) -> Result<Vec<u8>, i32> {
    if addr == 0 {
        return Err(EFAULT);
    }
    let mut out = Vec::new();
    for i in 0..=max_len as u64 {
        let at = addr.checked_add(i).ok_or(EFAULT)?;
        if at >= USER_ADDR_MAX {
            return Err(EFAULT);
        }
        let byte = unsafe { (at as *const u8).read_volatile() };
        if byte == 0 {
            return Ok(out);
        }
        out.push(byte);
    }
    Err(E2BIG)
}
