//! Single source of truth for the KinOS user/kernel ABI.
//!
//! `define_syscalls!` below generates:
//! - errno constants (`E*`) and [`errno_name`]
//! - syscall number constants (`SYS_*`) and [`SYSCALL_COUNT`]
//! - the [`Syscall`] enum with introspection methods
//! - (feature `kernel`) the `SyscallHandler` trait and `dispatch()`
//! - (feature `userspace`) raw `syscallN` stubs and typed wrappers
//!
//! The hand-written modules carry the shapes that cross the boundary by
//! pointer: [`Message`], [`OpenFlags`], the log-level codes and
//! [`SyscallResult`].

#![cfg_attr(not(test), no_std)]

pub mod flags;
pub mod log;
pub mod message;
pub mod result;

pub use flags::{OpenFlags, TIMER_MODE_RELATIVE};
pub use log::UserLogLevel;
pub use message::{Message, MessageKind};
pub use result::SyscallResult;

/// Longest string (excluding the NUL) accepted by string-taking syscalls.
pub const MAX_STRING_LEN: usize = 1024;

/// Path that `open_file` maps to descriptor 0 without touching the file system.
pub const STDIN_PATH: &[u8] = b"@stdin";

/// Page granularity of `demand_pages` and `map_file`.
pub const PAGE_SIZE: u64 = 4096;

kinos_syscall_macros::define_syscalls! {
    errors {
        /// `EPERM`: operation not permitted.
        EPERM = 1;
        /// `ENOENT`: no such file or directory.
        ENOENT = 2;
        /// `ESRCH`: no such task.
        ESRCH = 3;
        /// `E2BIG`: argument too long.
        E2BIG = 7;
        /// `EBADF`: bad file descriptor.
        EBADF = 9;
        /// `EAGAIN`: nothing available yet, try again.
        EAGAIN = 11;
        /// `EFAULT`: bad user address.
        EFAULT = 14;
        /// `EISDIR`: is a directory.
        EISDIR = 21;
        /// `EINVAL`: invalid argument.
        EINVAL = 22;
        /// `EFBIG`: does not fit in the destination.
        EFBIG = 27;
        /// `ENOSPC`: no space left on device.
        ENOSPC = 28;
        /// `ENOSYS`: no such syscall.
        ENOSYS = 38;
    }

    syscalls {
        /// Write a NUL-terminated string to the kernel log at a `UserLogLevel`.
        fn log_string(level: u64, msg: u64) = 0x00;
        /// Write `len` bytes to an open descriptor.
        fn put_string(fd: u64, buf: u64, len: u64) = 0x01;
        /// Terminate the calling task.
        fn exit(code: u64) = 0x02;
        /// Current tick and ticks per second.
        fn get_current_tick() = 0x03;
        /// Arm a one-shot timer that posts a timer message back to the caller.
        fn create_timer(mode: u64, value: u64, timeout_ms: u64) = 0x04;
        /// Open (or with `O_CREAT`, create) a file.
        fn open_file(path: u64, flags: u64) = 0x05;
        /// Read up to `count` bytes from an open descriptor.
        fn read_file(fd: u64, buf: u64, count: u64) = 0x06;
        /// Reserve `num_pages` of lazily-backed memory.
        fn demand_pages(num_pages: u64) = 0x07;
        /// Map an open file into the caller's address space.
        fn map_file(fd: u64, file_size_out: u64) = 0x08;
        /// Create a task and return its id.
        fn new_task() = 0x09;
        /// Copy bytes into another task's transfer buffer.
        fn copy_to_task_buffer(task_id: u64, buf: u64, offset: u64, len: u64) = 0x0a;
        /// Replace another task's argument string.
        fn set_argument(task_id: u64, arg: u64) = 0x0b;
        /// Find a task by command line.
        fn find_server(command_line: u64) = 0x0c;
        /// Receive messages from any sender, blocking while none are queued.
        fn open_receive_message(buf: u64, max_count: u64) = 0x0d;
        /// Receive messages from one sender, bouncing the rest with a retry.
        fn closed_receive_message(buf: u64, max_count: u64, expected_src: u64) = 0x0e;
        /// Post a message to another task's mailbox.
        fn send_message(msg: u64, dest: u64) = 0x0f;
        /// Write one pixel to the screen.
        fn write_pixel(x: u64, y: u64, r: u64, g: u64, b: u64) = 0x10;
        /// Horizontal resolution in pixels.
        fn frame_buffer_width() = 0x11;
        /// Vertical resolution in pixels.
        fn frame_buffer_height() = 0x12;
        /// Copy one line of pixel bytes straight into the frame buffer.
        fn copy_to_frame_buffer(src: u64, x: u64, y: u64, bytes_per_line: u64) = 0x13;
        /// Read raw bytes from the boot volume.
        fn read_volume_image(buf: u64, offset: u64, len: u64) = 0x14;
        /// Drain the kernel log ring.
        fn read_kernel_log(buf: u64, len: u64) = 0x15;
        /// Append a NUL-terminated string to the kernel log ring.
        fn write_kernel_log(buf: u64) = 0x16;
    }
}
