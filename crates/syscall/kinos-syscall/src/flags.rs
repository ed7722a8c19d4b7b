//! Flag words passed to `open_file` and `create_timer`.

bitflags::bitflags! {
    /// `open_file` flags, newlib numbering.
    ///
    /// The kernel only acts on [`OpenFlags::CREATE`]; the access-mode bits
    /// are recorded but not enforced.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OpenFlags: u64 {
        /// `O_WRONLY`
        const WRITE_ONLY = 0x0001;
        /// `O_RDWR`
        const READ_WRITE = 0x0002;
        /// `O_APPEND`
        const APPEND     = 0x0008;
        /// `O_CREAT`: create the file if it does not exist.
        const CREATE     = 0x0200;
        /// `O_TRUNC`
        const TRUNCATE   = 0x0400;
    }
}

impl OpenFlags {
    /// `O_RDONLY` is the absence of the write bits.
    pub const READ_ONLY: Self = Self::empty();
}

/// `create_timer` mode bit: `timeout_ms` counts from now instead of from boot.
pub const TIMER_MODE_RELATIVE: u64 = 1;
