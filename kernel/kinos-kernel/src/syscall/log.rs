//! Logging syscalls: log_string, read_kernel_log, write_kernel_log.

use alloc::string::String;

use kinos_core::kprint;
use kinos_core::log::LogLevel;
use kinos_syscall::{EAGAIN, EPERM, MAX_STRING_LEN, UserLogLevel};

use super::userptr::{UserSlice, read_user_cstr};
use crate::kernel::Kernel;

fn kernel_level(level: UserLogLevel) -> LogLevel {
    match level {
        UserLogLevel::Error => LogLevel::Error,
        UserLogLevel::Warn => LogLevel::Warn,
        UserLogLevel::Info => LogLevel::Info,
        UserLogLevel::Debug => LogLevel::Debug,
    }
}

/// `log_string`: appends a tagged line to the kernel log and echoes it to
/// the console. Returns the string length.
///
/// The level is checked before the string is touched, so a bad level has
/// no side effect whatever `msg` points at.
pub(super) fn sys_log_string(k: &Kernel, level: u64, msg: u64) -> Result<u64, i32> {
    let level = UserLogLevel::from_raw(level).ok_or(EPERM)?;
    // SAFETY: The string lies in the caller's address space, which is the
    // active one while its syscall runs.
    let text = unsafe { read_user_cstr(msg, MAX_STRING_LEN) }?;
    k.klog.write_line(kernel_level(level), &text);
    kprint!("{}", String::from_utf8_lossy(&text));
    Ok(text.len() as u64)
}

/// `read_kernel_log`: drains up to `len` bytes of the kernel log ring.
pub(super) fn sys_read_kernel_log(k: &Kernel, buf: u64, len: u64) -> Result<u64, i32> {
    let out = UserSlice::new(buf, len)?;
    if !k.klog.is_changed() {
        return Err(EAGAIN);
    }
    // SAFETY: `out` is a validated range of the caller's address space.
    let n = k.klog.read(unsafe { out.as_mut_slice() });
    Ok(n as u64)
}

/// `write_kernel_log`: appends a raw string to the kernel log ring.
pub(super) fn sys_write_kernel_log(k: &Kernel, buf: u64) -> Result<u64, i32> {
    // SAFETY: See `sys_log_string`.
    let text = unsafe { read_user_cstr(buf, MAX_STRING_LEN) }?;
    k.klog.write(&text);
    kprint!("{}", String::from_utf8_lossy(&text));
    Ok(0)
}
