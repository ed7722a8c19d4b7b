//! Kernel logging front-end.
//!
//! [`klog!`] and the per-level shorthands (`kerr!`, `kwarn!`, `kinfo!`,
//! `kdebug!`, `ktrace!`) format lazily and hand the result to whatever
//! backend was installed with [`set_log_fn`]. [`kprint!`] / [`kprintln!`]
//! bypass levels entirely and go to the [`set_print_fn`] backend.
//!
//! Until a backend is installed, output is discarded. Messages less severe
//! than [`max_level`] are dropped before formatting.

use core::fmt;
use core::sync::atomic::{AtomicPtr, AtomicU8, Ordering};

// ── Levels ───────────────────────────────────────────────────────────

/// Kernel log severity. Lower values are more severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    /// The kernel cannot continue.
    Fatal = 0,
    /// An operation failed.
    Error = 1,
    /// Something unexpected that the kernel recovered from.
    Warn = 2,
    /// Coarse progress.
    Info = 3,
    /// Detailed diagnostics.
    Debug = 4,
    /// Per-call tracing.
    Trace = 5,
}

impl LogLevel {
    /// Fixed-width tag used as the line prefix.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fatal => "FATAL",
            Self::Error => "ERROR",
            Self::Warn => "WARN ",
            Self::Info => "INFO ",
            Self::Debug => "DEBUG",
            Self::Trace => "TRACE",
        }
    }

    /// Converts the `repr(u8)` discriminant back into a level.
    pub const fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Fatal),
            1 => Some(Self::Error),
            2 => Some(Self::Warn),
            3 => Some(Self::Info),
            4 => Some(Self::Debug),
            5 => Some(Self::Trace),
            _ => None,
        }
    }
}

static MAX_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Trace as u8);

/// Sets the least severe level that still reaches the backend.
pub fn set_max_level(level: LogLevel) {
    MAX_LEVEL.store(level as u8, Ordering::Relaxed);
}

/// Returns the current filter level.
pub fn max_level() -> LogLevel {
    LogLevel::from_u8(MAX_LEVEL.load(Ordering::Relaxed)).unwrap_or(LogLevel::Trace)
}

/// Returns whether a message at `level` would be emitted.
#[inline]
pub fn enabled(level: LogLevel) -> bool {
    level as u8 <= MAX_LEVEL.load(Ordering::Relaxed)
}

// ── Raw output ───────────────────────────────────────────────────────

/// Backend for [`kprint!`].
pub type PrintFn = fn(fmt::Arguments<'_>);

fn discard_print(_args: fmt::Arguments<'_>) {}

static PRINT_FN: AtomicPtr<()> = AtomicPtr::new(discard_print as *mut ());

/// Installs the raw print backend.
///
/// # Safety
///
/// `f` must be callable from every context the kernel prints from,
/// including with interrupts disabled.
pub unsafe fn set_print_fn(f: PrintFn) {
    PRINT_FN.store(f as *mut (), Ordering::Release);
}

#[inline]
fn print_fn() -> PrintFn {
    let ptr = PRINT_FN.load(Ordering::Acquire);
    // SAFETY: PRINT_FN only ever holds `discard_print` or a `PrintFn`
    // stored by `set_print_fn`.
    unsafe { core::mem::transmute::<*mut (), PrintFn>(ptr) }
}

#[doc(hidden)]
pub fn _print(args: fmt::Arguments<'_>) {
    print_fn()(args);
}

/// Prints to the raw console backend.
#[macro_export]
macro_rules! kprint {
    ($($arg:tt)*) => { $crate::log::_print(format_args!($($arg)*)) };
}

/// Prints to the raw console backend with a trailing newline.
#[macro_export]
macro_rules! kprintln {
    () => { $crate::kprint!("\n") };
    ($($arg:tt)*) => { $crate::kprint!("{}\n", format_args!($($arg)*)) };
}

// ── Leveled output ───────────────────────────────────────────────────

/// Backend for [`klog!`].
pub type LogFn = fn(LogLevel, fmt::Arguments<'_>);

fn discard_log(_level: LogLevel, _args: fmt::Arguments<'_>) {}

static LOG_FN: AtomicPtr<()> = AtomicPtr::new(discard_log as *mut ());

/// Installs the leveled log backend.
///
/// # Safety
///
/// Same requirements as [`set_print_fn`].
pub unsafe fn set_log_fn(f: LogFn) {
    LOG_FN.store(f as *mut (), Ordering::Release);
}

#[inline]
fn log_fn() -> LogFn {
    let ptr = LOG_FN.load(Ordering::Acquire);
    // SAFETY: LOG_FN only ever holds `discard_log` or a `LogFn` stored by
    // `set_log_fn`.
    unsafe { core::mem::transmute::<*mut (), LogFn>(ptr) }
}

#[doc(hidden)]
pub fn _log(level: LogLevel, args: fmt::Arguments<'_>) {
    if enabled(level) {
        log_fn()(level, args);
    }
}

/// Logs a message at an explicit level.
#[macro_export]
macro_rules! klog {
    ($level:expr, $($arg:tt)*) => {
        $crate::log::_log($level, format_args!($($arg)*))
    };
}

/// Logs at [`LogLevel::Fatal`].
#[macro_export]
macro_rules! kfatal {
    ($($arg:tt)*) => { $crate::klog!($crate::log::LogLevel::Fatal, $($arg)*) };
}

/// Logs at [`LogLevel::Error`].
#[macro_export]
macro_rules! kerr {
    ($($arg:tt)*) => { $crate::klog!($crate::log::LogLevel::Error, $($arg)*) };
}

/// Logs at [`LogLevel::Warn`].
#[macro_export]
macro_rules! kwarn {
    ($($arg:tt)*) => { $crate::klog!($crate::log::LogLevel::Warn, $($arg)*) };
}

/// Logs at [`LogLevel::Info`].
#[macro_export]
macro_rules! kinfo {
    ($($arg:tt)*) => { $crate::klog!($crate::log::LogLevel::Info, $($arg)*) };
}

/// Logs at [`LogLevel::Debug`].
#[macro_export]
macro_rules! kdebug {
    ($($arg:tt)*) => { $crate::klog!($crate::log::LogLevel::Debug, $($arg)*) };
}

/// Logs at [`LogLevel::Trace`].
#[macro_export]
macro_rules! ktrace {
    ($($arg:tt)*) => { $crate::klog!($crate::log::LogLevel::Trace, $($arg)*) };
}
