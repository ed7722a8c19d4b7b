//! Messaging syscalls: open_receive_message, closed_receive_message,
//! send_message.
//!
//! A receive blocks only while it has collected nothing. Once at least one
//! message has been copied out, an empty mailbox ends the call.

use kinos_core::id::TaskId;
use kinos_core::{kdebug, kwarn};
use kinos_syscall::Message;

use super::userptr::{UserArray, UserPtr};
use crate::kernel::Kernel;

fn receive(k: &Kernel, buf: u64, max_count: u64, expected_src: Option<u64>) -> Result<u64, i32> {
    let out = UserArray::<Message>::new(buf, max_count)?;
    let task = k.current_task()?;

    let mut received = 0;
    while received < out.len() {
        let next = if received == 0 {
            task.receive_or_block()
        } else {
            task.try_receive()
        };
        let Some(msg) = next else {
            if received == 0 {
                k.scheduler.sleep(&task);
                continue;
            }
            break;
        };

        match expected_src {
            Some(expected) if msg.src_task != expected => {
                // Never retry to ourselves; it would be bounced forever.
                if msg.src_task == task.id().as_u64() {
                    kdebug!("retry for own message on task {} dropped", msg.src_task);
                    continue;
                }
                let retry = Message::error_retry().with_src(task.id().as_u64());
                if k.deliver(TaskId::new(msg.src_task), retry).is_err() {
                    kdebug!("retry for missing sender {} dropped", msg.src_task);
                }
            }
            _ => {
                // SAFETY: `out` is a validated array in the caller's space
                // and `received < out.len()`.
                unsafe { out.write_at(received, msg) };
                received += 1;
            }
        }
    }
    Ok(received as u64)
}

/// `open_receive_message`: copies up to `max_count` messages from any
/// sender into `buf`, blocking until at least one arrives.
pub(super) fn sys_open_receive_message(k: &Kernel, buf: u64, max_count: u64) -> Result<u64, i32> {
    receive(k, buf, max_count, None)
}

/// `closed_receive_message`: like `open_receive_message`, but only accepts
/// messages from `expected_src`. Anything else is consumed and answered
/// with an `Error { retry }` message so its sender can try again later.
/// The caller's own messages are consumed without a reply.
pub(super) fn sys_closed_receive_message(
    k: &Kernel,
    buf: u64,
    max_count: u64,
    expected_src: u64,
) -> Result<u64, i32> {
    receive(k, buf, max_count, Some(expected_src))
}

/// `send_message`: posts a copy of `*msg`, stamped with the caller's id, to
/// task `dest`.
pub(super) fn sys_send_message(k: &Kernel, msg: u64, dest: u64) -> Result<u64, i32> {
    let msg = UserPtr::<Message>::new(msg)?;
    let task = k.current_task()?;
    // SAFETY: `msg` is a validated, aligned address in the caller's space.
    // Every bit pattern is a valid `Message`.
    let msg = unsafe { msg.read() }.with_src(task.id().as_u64());
    if let Err(errno) = k.deliver(TaskId::new(dest), msg) {
        kwarn!("task {} sent to missing task {}", task.id(), dest);
        return Err(errno);
    }
    Ok(0)
}
