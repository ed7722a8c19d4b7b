//! Time syscalls: get_current_tick, create_timer.

use kinos_core::ktrace;
use kinos_syscall::{EINVAL, SyscallResult, TIMER_MODE_RELATIVE};

use crate::kernel::Kernel;
use crate::timer::Timer;

/// `get_current_tick`: the tick in the value slot, the frequency in the
/// error slot.
pub(super) fn sys_get_current_tick(k: &Kernel) -> SyscallResult {
    SyscallResult {
        value: k.timers.current_tick(),
        error: k.timers.frequency() as i32,
    }
}

/// `create_timer`: arms a one-shot timer that posts `TimerTimeout` with
/// `-value` to the caller.
///
/// `timeout_ms` is absolute (milliseconds since boot) unless
/// [`TIMER_MODE_RELATIVE`] is set in `mode`. Returns the absolute expiry in
/// milliseconds, as rounded to whole ticks.
pub(super) fn sys_create_timer(k: &Kernel, mode: u64, value: u64, timeout_ms: u64) -> Result<u64, i32> {
    let value = value as i32;
    if value <= 0 {
        return Err(EINVAL);
    }
    let task = k.current_task()?;
    let freq = k.timers.frequency();

    let mut timeout = timeout_ms.checked_mul(freq).ok_or(EINVAL)? / 1000;
    if mode & TIMER_MODE_RELATIVE != 0 {
        timeout = timeout.checked_add(k.timers.current_tick()).ok_or(EINVAL)?;
    }
    let timeout_ms = timeout
        .checked_mul(1000)
        .and_then(|ms| ms.checked_div(freq))
        .ok_or(EINVAL)?;

    k.timers.add(Timer {
        timeout,
        value: -i64::from(value),
        task_id: task.id(),
    });
    ktrace!("task {} armed timer {} for tick {}", task.id(), value, timeout);
    Ok(timeout_ms)
}
