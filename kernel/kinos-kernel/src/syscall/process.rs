//! Task syscalls: exit, new_task, copy_to_task_buffer, set_argument,
//! find_server.

use kinos_core::id::TaskId;
use kinos_core::kdebug;
use kinos_syscall::{EFBIG, ESRCH, MAX_STRING_LEN, SyscallResult};

use super::userptr::{UserSlice, read_user_cstr};
use crate::kernel::Kernel;

/// `exit`: returns the task's saved kernel stack pointer in the value slot
/// and the exit code in the error slot. The trap exit path switches back to
/// that stack; the task itself is torn down by whoever launched it.
pub(super) fn sys_exit(k: &Kernel, code: u64) -> SyscallResult {
    match k.current_task() {
        Ok(task) => {
            kdebug!("task {} exiting with {}", task.id(), code as i32);
            SyscallResult::exit(task.os_stack_pointer(), code as i32)
        }
        Err(errno) => SyscallResult::err(errno),
    }
}

/// `new_task`: creates a task with an empty command line and returns its id.
pub(super) fn sys_new_task(k: &Kernel) -> Result<u64, i32> {
    Ok(k.spawn(b"").id().as_u64())
}

/// `copy_to_task_buffer`: copies `len` bytes into task `task_id`'s
/// transfer buffer at `offset`. Returns the capacity left after the range.
pub(super) fn sys_copy_to_task_buffer(
    k: &Kernel,
    task_id: u64,
    buf: u64,
    offset: u64,
    len: u64,
) -> Result<u64, i32> {
    let src = UserSlice::new(buf, len)?;
    let task = k.tasks.get(TaskId::new(task_id)).ok_or(EFBIG)?;
    let offset = usize::try_from(offset).map_err(|_| EFBIG)?;
    // SAFETY: `src` is a validated range of the caller's address space.
    let data = unsafe { src.as_slice() };
    let remaining = task
        .resources()
        .copy_to_transfer_buffer(offset, data)
        .ok_or(EFBIG)?;
    Ok(remaining as u64)
}

/// `set_argument`: replaces task `task_id`'s argument string, truncated to
/// the argument capacity.
pub(super) fn sys_set_argument(k: &Kernel, task_id: u64, arg: u64) -> Result<u64, i32> {
    // SAFETY: The string lies in the caller's address space.
    let arg = unsafe { read_user_cstr(arg, MAX_STRING_LEN) }?;
    let task = k.tasks.get(TaskId::new(task_id)).ok_or(ESRCH)?;
    task.resources().set_argument(&arg);
    Ok(0)
}

/// `find_server`: the id of the task registered under `command_line`.
pub(super) fn sys_find_server(k: &Kernel, command_line: u64) -> Result<u64, i32> {
    // SAFETY: The string lies in the caller's address space.
    let command_line = unsafe { read_user_cstr(command_line, MAX_STRING_LEN) }?;
    let task = k.tasks.find_by_command_line(&command_line).ok_or(ESRCH)?;
    Ok(task.id().as_u64())
}
