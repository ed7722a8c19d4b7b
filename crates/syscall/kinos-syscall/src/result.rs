//! The two-register syscall return value.

/// What every syscall hands back: a value in `RAX` and an errno in `RDX`.
///
/// `error == 0` means success. [`SYS_EXIT`](crate::SYS_EXIT) is the one
/// exception to the convention: it reuses `error` for the exit code.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyscallResult {
    /// Result value; meaningless when `error != 0`.
    pub value: u64,
    /// Errno, or 0.
    pub error: i32,
}

impl SyscallResult {
    /// Success with `value`.
    #[must_use]
    pub const fn ok(value: u64) -> Self {
        Self { value, error: 0 }
    }

    /// Failure with `errno` and a zero value.
    #[must_use]
    pub const fn err(errno: i32) -> Self {
        Self {
            value: 0,
            error: errno,
        }
    }

    /// The `exit` return: the task's saved kernel stack pointer plus its exit code.
    #[must_use]
    pub const fn exit(os_stack_pointer: u64, code: i32) -> Self {
        Self {
            value: os_stack_pointer,
            error: code,
        }
    }

    /// Returns `true` if `error` is zero.
    #[must_use]
    pub const fn is_ok(self) -> bool {
        self.error == 0
    }

    /// Converts to `Result<value, errno>`.
    ///
    /// # Errors
    ///
    /// Returns the errno when it is non-zero.
    pub const fn into_result(self) -> Result<u64, i32> {
        if self.error == 0 {
            Ok(self.value)
        } else {
            Err(self.error)
        }
    }
}

impl From<Result<u64, i32>> for SyscallResult {
    fn from(result: Result<u64, i32>) -> Self {
        match result {
            Ok(value) => Self::ok(value),
            Err(errno) => Self::err(errno),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EBADF, EFAULT};

    #[test]
    fn ok_and_err_constructors() {
        assert_eq!(SyscallResult::ok(5).into_result(), Ok(5));
        assert_eq!(SyscallResult::err(EBADF).into_result(), Err(EBADF));
        assert!(!SyscallResult::err(EBADF).is_ok());
    }

    #[test]
    fn from_result_keeps_errno() {
        let r: SyscallResult = Err(EFAULT).into();
        assert_eq!(r, SyscallResult { value: 0, error: EFAULT });
        let r: SyscallResult = Ok(9).into();
        assert_eq!(r, SyscallResult::ok(9));
    }

    #[test]
    fn layout_fits_two_registers() {
        assert_eq!(core::mem::size_of::<SyscallResult>(), 16);
    }
}
