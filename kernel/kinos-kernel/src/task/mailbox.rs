//! Task mailbox and the receive state machine.
//!
//! The queue and the task's [`TaskState`] live under one lock, so a sender
//! can never enqueue between a receiver finding the queue empty and
//! marking itself blocked.

use alloc::collections::VecDeque;

use kinos_syscall::Message;

/// Scheduling state as far as messaging is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Created or woken, waiting for the CPU.
    Runnable,
    /// Consuming messages or otherwise executing.
    Running,
    /// Parked in a receive with an empty mailbox.
    BlockedOnReceive,
}

/// FIFO of undelivered messages plus the owner's state.
pub(crate) struct Mailbox {
    queue: VecDeque<Message>,
    state: TaskState,
}

impl Mailbox {
    pub(crate) const fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            state: TaskState::Runnable,
        }
    }

    pub(crate) fn state(&self) -> TaskState {
        self.state
    }

    pub(crate) fn len(&self) -> usize {
        self.queue.len()
    }

    /// Enqueues `msg`. Returns `true` if this woke a blocked receiver.
    pub(crate) fn post(&mut self, msg: Message) -> bool {
        self.queue.push_back(msg);
        if self.state == TaskState::BlockedOnReceive {
            self.state = TaskState::Runnable;
            true
        } else {
            false
        }
    }

    pub(crate) fn try_receive(&mut self) -> Option<Message> {
        let msg = self.queue.pop_front()?;
        self.state = TaskState::Running;
        Some(msg)
    }

    /// Dequeues the next message, or marks the owner blocked if there is
    /// none.
    pub(crate) fn receive_or_block(&mut self) -> Option<Message> {
        let msg = self.try_receive();
        if msg.is_none() {
            self.state = TaskState::BlockedOnReceive;
        }
        msg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinos_syscall::MessageKind;

    fn msg(src: u64) -> Message {
        Message::new(MessageKind::LayerId).with_src(src)
    }

    #[test]
    fn messages_are_fifo() {
        let mut mb = Mailbox::new();
        mb.post(msg(1));
        mb.post(msg(2));
        assert_eq!(mb.len(), 2);
        assert_eq!(mb.try_receive().map(|m| m.src_task), Some(1));
        assert_eq!(mb.try_receive().map(|m| m.src_task), Some(2));
        assert!(mb.try_receive().is_none());
    }

    #[test]
    fn empty_receive_blocks_and_post_wakes() {
        let mut mb = Mailbox::new();
        assert!(mb.receive_or_block().is_none());
        assert_eq!(mb.state(), TaskState::BlockedOnReceive);
        assert!(mb.post(msg(3)));
        assert_eq!(mb.state(), TaskState::Runnable);
        assert!(!mb.post(msg(4)));
        assert_eq!(mb.receive_or_block().map(|m| m.src_task), Some(3));
        assert_eq!(mb.state(), TaskState::Running);
    }

    #[test]
    fn try_receive_never_blocks() {
        let mut mb = Mailbox::new();
        assert!(mb.try_receive().is_none());
        assert_eq!(mb.state(), TaskState::Runnable);
        assert!(!mb.post(msg(1)));
    }
}
