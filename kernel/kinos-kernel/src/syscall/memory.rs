//! Address-space syscalls: demand_pages, map_file.
//!
//! Both only move the task's cursors and record what the page-fault
//! handler should back the reserved range with.

use kinos_core::id::Fd;
use kinos_core::kdebug;
use kinos_syscall::{EBADF, EINVAL};

use super::userptr::UserPtr;
use crate::kernel::Kernel;

/// `demand_pages`: reserves `num_pages` at the top of the demand-paged
/// region and returns the start of the reservation.
pub(super) fn sys_demand_pages(k: &Kernel, num_pages: u64) -> Result<u64, i32> {
    let task = k.current_task()?;
    task.resources().reserve_demand_pages(num_pages).ok_or(EINVAL)
}

/// `map_file`: reserves a page-aligned range below the task's file-map
/// cursor for descriptor `fd`, stores the file size at `file_size_out`
/// and returns the start of the range.
pub(super) fn sys_map_file(k: &Kernel, fd: u64, file_size_out: u64) -> Result<u64, i32> {
    let out = UserPtr::<u64>::new(file_size_out)?;
    let task = k.current_task()?;
    let fd = Fd::from_raw(fd).ok_or(EBADF)?;
    let file = task.resources().file(fd).ok_or(EBADF)?;
    let size = file.size();
    // SAFETY: `out` is a validated, aligned address in the caller's space.
    unsafe { out.write(size) };

    let mapping = task.resources().map_file(fd, size).ok_or(EINVAL)?;
    kdebug!(
        "task {} mapped fd {} at {:#x}..{:#x}",
        task.id(),
        fd,
        mapping.begin,
        mapping.end
    );
    Ok(mapping.begin)
}
