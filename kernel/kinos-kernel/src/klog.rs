//! Kernel log ring.
//!
//! A fixed-size byte ring that user space drains with `read_kernel_log`.
//! Writers never block on readers: once the ring is full the oldest bytes
//! are dropped to make room. A changed flag tells readers whether anything
//! arrived since they last emptied the ring.
//!
//! The ring doubles as the backend for the `klog!` family once
//! [`install`] has run, so kernel diagnostics show up next to the text
//! tasks write with `log_string` and `write_kernel_log`.

use alloc::sync::Arc;
use core::fmt::{self, Write};
use core::sync::atomic::{AtomicBool, AtomicPtr, Ordering};

use kinos_core::log::LogLevel;
use kinos_core::sync::IrqSpinLock;
use planck_noalloc::ringbuf::RingBuf;

use crate::config::KLOG_CAPACITY;

type Ring = RingBuf<u8, KLOG_CAPACITY>;

/// The kernel log ring.
pub struct KernelLog {
    ring: IrqSpinLock<Ring>,
    changed: AtomicBool,
}

impl KernelLog {
    /// Usable capacity in bytes.
    pub const CAPACITY: usize = KLOG_CAPACITY - 1;

    /// An empty ring.
    pub const fn new() -> Self {
        Self {
            ring: IrqSpinLock::named("klog", RingBuf::new()),
            changed: AtomicBool::new(false),
        }
    }

    /// Appends `bytes`, evicting the oldest bytes if the ring is full.
    pub fn write(&self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        let mut ring = self.ring.lock();
        push_evicting(&mut ring, bytes);
        self.changed.store(true, Ordering::Release);
    }

    /// Appends `msg` as one line tagged with `level`.
    ///
    /// A trailing newline is added unless `msg` already ends with one.
    pub fn write_line(&self, level: LogLevel, msg: &[u8]) {
        let mut ring = self.ring.lock();
        push_evicting(&mut ring, b"[");
        push_evicting(&mut ring, level.name().as_bytes());
        push_evicting(&mut ring, b"] ");
        push_evicting(&mut ring, msg);
        if msg.last() != Some(&b'\n') {
            push_evicting(&mut ring, b"\n");
        }
        self.changed.store(true, Ordering::Release);
    }

    /// Appends one formatted line tagged with `level`.
    pub fn write_args(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        let mut ring = self.ring.lock();
        let _ = writeln!(RingWriter(&mut ring), "[{}] {}", level.name(), args);
        self.changed.store(true, Ordering::Release);
    }

    /// Drains up to `buf.len()` bytes into `buf` and returns the count.
    ///
    /// The changed flag is cleared once the ring is empty.
    pub fn read(&self, buf: &mut [u8]) -> usize {
        let mut ring = self.ring.lock();
        let mut n = 0;
        while n < buf.len() {
            match ring.pop() {
                Some(byte) => {
                    buf[n] = byte;
                    n += 1;
                }
                None => break,
            }
        }
        if ring.is_empty() {
            self.changed.store(false, Ordering::Release);
        }
        n
    }

    /// Whether bytes arrived since the ring was last drained empty.
    pub fn is_changed(&self) -> bool {
        self.changed.load(Ordering::Acquire)
    }

    /// Bytes currently buffered.
    pub fn len(&self) -> usize {
        self.ring.lock().len()
    }

    /// Whether the ring is empty.
    pub fn is_empty(&self) -> bool {
        self.ring.lock().is_empty()
    }
}

impl Default for KernelLog {
    fn default() -> Self {
        Self::new()
    }
}

fn push_evicting(ring: &mut Ring, bytes: &[u8]) {
    for &byte in bytes {
        if ring.try_push(byte).is_err() {
            ring.pop();
            let _ = ring.try_push(byte);
        }
    }
}

struct RingWriter<'a>(&'a mut Ring);

impl Write for RingWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        push_evicting(self.0, s.as_bytes());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Global sink
// ---------------------------------------------------------------------------

static SINK: AtomicPtr<KernelLog> = AtomicPtr::new(core::ptr::null_mut());

/// Routes the `klog!` family into `log`.
///
/// Meant to run once at boot. The installed ring is kept alive for the rest
/// of the kernel's life; a later call replaces the sink without freeing the
/// previous one.
pub fn install(log: Arc<KernelLog>) {
    SINK.store(Arc::into_raw(log).cast_mut(), Ordering::Release);
    // SAFETY: `sink` only dereferences SINK, which now points at a ring that
    // is never freed.
    unsafe { kinos_core::log::set_log_fn(sink) };
}

fn sink(level: LogLevel, args: fmt::Arguments<'_>) {
    let ptr = SINK.load(Ordering::Acquire);
    if ptr.is_null() {
        return;
    }
    // SAFETY: `install` leaked a strong reference, so the ring outlives us.
    let log = unsafe { &*ptr };
    log.write_args(level, args);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(log: &KernelLog) -> Vec<u8> {
        let mut out = vec![0u8; KLOG_CAPACITY];
        let n = log.read(&mut out);
        out.truncate(n);
        out
    }

    #[test]
    fn write_sets_changed_and_read_clears_it() {
        let log = KernelLog::new();
        assert!(!log.is_changed());
        log.write(b"hello");
        assert!(log.is_changed());
        assert_eq!(drain(&log), b"hello");
        assert!(!log.is_changed());
    }

    #[test]
    fn partial_read_keeps_changed_flag() {
        let log = KernelLog::new();
        log.write(b"abcdef");
        let mut buf = [0u8; 4];
        assert_eq!(log.read(&mut buf), 4);
        assert_eq!(&buf, b"abcd");
        assert!(log.is_changed());
        assert_eq!(drain(&log), b"ef");
        assert!(!log.is_changed());
    }

    #[test]
    fn empty_write_does_not_mark_changed() {
        let log = KernelLog::new();
        log.write(b"");
        assert!(!log.is_changed());
    }

    #[test]
    fn full_ring_drops_oldest_bytes() {
        let log = KernelLog::new();
        let filler = vec![b'x'; KernelLog::CAPACITY];
        log.write(&filler);
        log.write(b"tail");
        assert_eq!(log.len(), KernelLog::CAPACITY);
        let out = drain(&log);
        assert_eq!(out.len(), KernelLog::CAPACITY);
        assert!(out.ends_with(b"xtail"));
    }

    #[test]
    fn write_line_tags_level_and_terminates() {
        let log = KernelLog::new();
        log.write_line(LogLevel::Warn, b"disk almost full");
        log.write_line(LogLevel::Info, b"ready\n");
        assert_eq!(drain(&log), b"[WARN ] disk almost full\n[INFO ] ready\n");
    }

    #[test]
    fn formatted_line_marks_changed() {
        let log = KernelLog::new();
        log.write_args(LogLevel::Error, format_args!("code {}", 7));
        assert!(log.is_changed());
        assert_eq!(drain(&log), b"[ERROR] code 7\n");
        assert!(!log.is_changed());
    }

    #[test]
    fn changed_flag_matches_ring_after_concurrent_drain() {
        let log = Arc::new(KernelLog::new());
        let writer = {
            let log = log.clone();
            std::thread::spawn(move || {
                for i in 0..2000 {
                    log.write_args(LogLevel::Info, format_args!("line {i}"));
                }
            })
        };
        let mut buf = [0u8; 64];
        while !writer.is_finished() {
            log.read(&mut buf);
        }
        writer.join().unwrap();
        while log.read(&mut buf) > 0 {}
        assert!(log.is_empty());
        assert!(!log.is_changed());
    }

    #[test]
    fn installed_ring_receives_kernel_diagnostics() {
        let log = Arc::new(KernelLog::new());
        install(log.clone());
        kinos_core::kerr!("sink test {}", 42);
        let text = String::from_utf8(drain(&log)).unwrap();
        assert!(text.contains("sink test 42"), "got {text:?}");
    }
}
