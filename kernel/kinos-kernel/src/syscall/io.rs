//! File and volume syscalls: put_string, open_file, read_file,
//! read_volume_image.
//!
//! Descriptor lookups take the task's resource lock only long enough to
//! clone the handle out; the transfer itself runs unlocked.

use kinos_core::id::Fd;
use kinos_core::kdebug;
use kinos_syscall::{E2BIG, EBADF, EINVAL, ENOENT, MAX_STRING_LEN, OpenFlags, STDIN_PATH};

use super::userptr::{UserSlice, read_user_cstr};
use crate::fs::{FileEntry, FsError};
use crate::kernel::Kernel;

/// `put_string`: writes `len` bytes to descriptor `fd`.
pub(super) fn sys_put_string(k: &Kernel, fd: u64, buf: u64, len: u64) -> Result<u64, i32> {
    if len > MAX_STRING_LEN as u64 {
        return Err(E2BIG);
    }
    let src = UserSlice::new(buf, len)?;
    let task = k.current_task()?;
    let fd = Fd::from_raw(fd).ok_or(EBADF)?;
    let file = task.resources().file(fd).ok_or(EBADF)?;
    // SAFETY: `src` is a validated range of the caller's address space.
    let written = file.write(unsafe { src.as_slice() });
    Ok(written as u64)
}

/// `open_file`: opens `path` (creating it with `O_CREAT`) and returns the
/// new descriptor.
///
/// `"@stdin"` is answered with descriptor 0 without consulting the file
/// system or allocating a slot.
pub(super) fn sys_open_file(k: &Kernel, path: u64, flags: u64) -> Result<u64, i32> {
    // SAFETY: The string lies in the caller's address space.
    let path = unsafe { read_user_cstr(path, MAX_STRING_LEN) }?;
    let task = k.current_task()?;
    if path == STDIN_PATH {
        return Ok(u64::from(Fd::STDIN.as_u32()));
    }
    let path = core::str::from_utf8(&path).map_err(|_| EINVAL)?;
    let flags = OpenFlags::from_bits_truncate(flags);

    let lookup = k.fs.find(path);
    let entry: FileEntry = match lookup.entry {
        None if flags.contains(OpenFlags::CREATE) => k.fs.create(path).map_err(FsError::errno)?,
        None => return Err(ENOENT),
        Some(entry) if !entry.is_directory && lookup.post_slash => return Err(ENOENT),
        Some(entry) => entry,
    };

    let handle = k.fs.open(&entry);
    let fd = task.resources().allocate_fd(handle);
    kdebug!("task {} opened {} as fd {}", task.id(), path, fd);
    Ok(u64::from(fd.as_u32()))
}

/// `read_file`: reads up to `count` bytes from descriptor `fd`.
pub(super) fn sys_read_file(k: &Kernel, fd: u64, buf: u64, count: u64) -> Result<u64, i32> {
    let dst = UserSlice::new(buf, count)?;
    let task = k.current_task()?;
    let fd = Fd::from_raw(fd).ok_or(EBADF)?;
    let file = task.resources().file(fd).ok_or(EBADF)?;
    // SAFETY: `dst` is a validated range of the caller's address space.
    let read = file.read(unsafe { dst.as_mut_slice() });
    Ok(read as u64)
}

/// `read_volume_image`: copies `len` bytes of the boot volume starting at
/// byte `offset`. Returns 0.
pub(super) fn sys_read_volume_image(k: &Kernel, buf: u64, offset: u64, len: u64) -> Result<u64, i32> {
    let dst = UserSlice::new(buf, len)?;
    let end = offset.checked_add(len).ok_or(EINVAL)?;
    if end > k.volume.size() {
        return Err(EINVAL);
    }
    // SAFETY: `dst` is a validated range of the caller's address space.
    k.volume.read(offset, unsafe { dst.as_mut_slice() });
    Ok(0)
}
