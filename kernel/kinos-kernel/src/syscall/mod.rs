//! Syscall dispatch.
//!
//! The trap entry hands [`Kernel::syscall`] the number from `RAX` and the
//! six argument registers. The generated [`dispatch`] routes the call to
//! [`KernelDispatch`], which forwards it to the handler module that owns
//! it. Handlers return `Result<u64, i32>` and are converted to the
//! two-register [`SyscallResult`] at this boundary.

mod display;
mod io;
mod ipc;
mod log;
mod memory;
mod process;
mod time;
pub mod userptr;

use kinos_core::{ktrace, kwarn};
use kinos_syscall::{ENOSYS, Syscall, SyscallHandler, SyscallResult, dispatch};

use crate::kernel::Kernel;

/// Binds the generated handler trait to one [`Kernel`].
struct KernelDispatch<'a>(&'a Kernel);

impl SyscallHandler for KernelDispatch<'_> {
    fn sys_log_string(&self, level: u64, msg: u64) -> SyscallResult {
        log::sys_log_string(self.0, level, msg).into()
    }

    fn sys_put_string(&self, fd: u64, buf: u64, len: u64) -> SyscallResult {
        io::sys_put_string(self.0, fd, buf, len).into()
    }

    fn sys_exit(&self, code: u64) -> SyscallResult {
        process::sys_exit(self.0, code)
    }

    fn sys_get_current_tick(&self) -> SyscallResult {
        time::sys_get_current_tick(self.0)
    }

    fn sys_create_timer(&self, mode: u64, value: u64, timeout_ms: u64) -> SyscallResult {
        time::sys_create_timer(self.0, mode, value, timeout_ms).into()
    }

    fn sys_open_file(&self, path: u64, flags: u64) -> SyscallResult {
        io::sys_open_file(self.0, path, flags).into()
    }

    fn sys_read_file(&self, fd: u64, buf: u64, count: u64) -> SyscallResult {
        io::sys_read_file(self.0, fd, buf, count).into()
    }

    fn sys_demand_pages(&self, num_pages: u64) -> SyscallResult {
        memory::sys_demand_pages(self.0, num_pages).into()
    }

    fn sys_map_file(&self, fd: u64, file_size_out: u64) -> SyscallResult {
        memory::sys_map_file(self.0, fd, file_size_out).into()
    }

    fn sys_new_task(&self) -> SyscallResult {
        process::sys_new_task(self.0).into()
    }

    fn sys_copy_to_task_buffer(&self, task_id: u64, buf: u64, offset: u64, len: u64) -> SyscallResult {
        process::sys_copy_to_task_buffer(self.0, task_id, buf, offset, len).into()
    }

    fn sys_set_argument(&self, task_id: u64, arg: u64) -> SyscallResult {
        process::sys_set_argument(self.0, task_id, arg).into()
    }

    fn sys_find_server(&self, command_line: u64) -> SyscallResult {
        process::sys_find_server(self.0, command_line).into()
    }

    fn sys_open_receive_message(&self, buf: u64, max_count: u64) -> SyscallResult {
        ipc::sys_open_receive_message(self.0, buf, max_count).into()
    }

    fn sys_closed_receive_message(&self, buf: u64, max_count: u64, expected_src: u64) -> SyscallResult {
        ipc::sys_closed_receive_message(self.0, buf, max_count, expected_src).into()
    }

    fn sys_send_message(&self, msg: u64, dest: u64) -> SyscallResult {
        ipc::sys_send_message(self.0, msg, dest).into()
    }

    fn sys_write_pixel(&self, x: u64, y: u64, r: u64, g: u64, b: u64) -> SyscallResult {
        display::sys_write_pixel(self.0, x, y, r, g, b).into()
    }

    fn sys_frame_buffer_width(&self) -> SyscallResult {
        display::sys_frame_buffer_width(self.0).into()
    }

    fn sys_frame_buffer_height(&self) -> SyscallResult {
        display::sys_frame_buffer_height(self.0).into()
    }

    fn sys_copy_to_frame_buffer(&self, src: u64, x: u64, y: u64, bytes_per_line: u64) -> SyscallResult {
        display::sys_copy_to_frame_buffer(self.0, src, x, y, bytes_per_line).into()
    }

    fn sys_read_volume_image(&self, buf: u64, offset: u64, len: u64) -> SyscallResult {
        io::sys_read_volume_image(self.0, buf, offset, len).into()
    }

    fn sys_read_kernel_log(&self, buf: u64, len: u64) -> SyscallResult {
        log::sys_read_kernel_log(self.0, buf, len).into()
    }

    fn sys_write_kernel_log(&self, buf: u64) -> SyscallResult {
        log::sys_write_kernel_log(self.0, buf).into()
    }
}

impl Kernel {
    /// Executes syscall `nr` for the current task.
    ///
    /// `args` are `RDI, RSI, RDX, R10, R8, R9` in that order. Numbers
    /// outside the table return `ENOSYS`.
    pub fn syscall(&self, nr: u64, args: [u64; 6]) -> SyscallResult {
        let Some(call) = Syscall::from_nr(nr) else {
            kwarn!("unknown syscall {:#x}", nr);
            return SyscallResult::err(ENOSYS);
        };
        ktrace!("syscall {}", call.name());
        dispatch(&KernelDispatch(self), nr, args)
    }
}
