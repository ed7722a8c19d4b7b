//! File system interface consumed by the syscall layer.
//!
//! The on-disk format lives elsewhere; the syscalls only need to look a
//! path up, create a file, and get a handle that can read, write and
//! report its size.

use alloc::sync::Arc;

use kinos_syscall::{EISDIR, ENOENT, ENOSPC};

/// An open file.
///
/// Handles are shared between the owning descriptor slot and an in-flight
/// transfer, so they take `&self` and keep their position internally.
pub trait FileHandle: Send + Sync {
    /// Reads from the current position; returns bytes read (0 at EOF).
    fn read(&self, buf: &mut [u8]) -> usize;
    /// Writes at the current position; returns bytes written.
    fn write(&self, buf: &[u8]) -> usize;
    /// File size in bytes.
    fn size(&self) -> u64;
}

/// A resolved directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileEntry {
    /// Opaque to the kernel; meaningful to the file system that produced it.
    pub id: u64,
    /// Size in bytes.
    pub size: u64,
    /// Entry is a directory.
    pub is_directory: bool,
}

/// Result of [`FileSystem::find`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lookup {
    /// The entry, if the path resolved.
    pub entry: Option<FileEntry>,
    /// The path had a separator after the last component that matched.
    pub post_slash: bool,
}

/// Why [`FileSystem::create`] failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsError {
    /// The path names a directory.
    IsDirectory,
    /// An intermediate directory does not exist.
    NoSuchEntry,
    /// No room for another entry or cluster.
    NoSpace,
}

impl FsError {
    /// The errno `open_file` reports for this failure.
    pub const fn errno(self) -> i32 {
        match self {
            Self::IsDirectory => EISDIR,
            Self::NoSuchEntry => ENOENT,
            Self::NoSpace => ENOSPC,
        }
    }
}

/// File system operations needed by `open_file`.
pub trait FileSystem: Send + Sync {
    /// Resolves `path`.
    fn find(&self, path: &str) -> Lookup;
    /// Creates an empty regular file at `path`.
    ///
    /// # Errors
    ///
    /// See [`FsError`].
    fn create(&self, path: &str) -> Result<FileEntry, FsError>;
    /// Opens a handle on a previously resolved entry.
    fn open(&self, entry: &FileEntry) -> Arc<dyn FileHandle>;
}
