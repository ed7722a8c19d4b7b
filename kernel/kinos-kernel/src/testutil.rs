//! In-memory collaborators for host tests.
//!
//! [`Harness`] wires a [`Kernel`] to a RAM-backed file system, screen,
//! boot volume and a scheduler that maps host threads to tasks, so syscall
//! tests can pass pointers to local buffers straight through the ABI.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};

use kinos_core::id::TaskId;
use kinos_syscall::SyscallResult;

use crate::display::{Display, FrameBuffer, PixelColor};
use crate::fs::{FileEntry, FileHandle, FileSystem, FsError, Lookup};
use crate::kernel::{Kernel, KernelServices};
use crate::sched::Scheduler;
use crate::task::{Task, TaskState};
use crate::volume::VolumeImage;
use crate::KernelConfig;

/// NUL-terminated copy of `s`.
pub(crate) fn cstr(s: &str) -> Vec<u8> {
    let mut out = s.as_bytes().to_vec();
    out.push(0);
    out
}

/// Address of `buf` as a syscall argument.
pub(crate) fn addr(buf: &[u8]) -> u64 {
    buf.as_ptr() as u64
}

/// Address of a buffer the kernel will write into.
pub(crate) fn addr_mut(buf: &mut [u8]) -> u64 {
    buf.as_mut_ptr() as u64
}

pub(crate) struct Harness {
    pub kernel: Arc<Kernel>,
    pub fs: Arc<MemFs>,
    pub display: Arc<MemDisplay>,
    pub volume: Arc<MemVolume>,
    pub scheduler: Arc<HostScheduler>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(KernelConfig::new())
    }

    pub fn with_config(config: KernelConfig) -> Self {
        let fs = Arc::new(MemFs::default());
        let display = Arc::new(MemDisplay::new(800, 600, 832));
        let volume = Arc::new(MemVolume::new(512));
        let scheduler = Arc::new(HostScheduler::default());
        let kernel = Arc::new(Kernel::new(
            config,
            KernelServices {
                fs: fs.clone(),
                display: display.clone(),
                volume: volume.clone(),
                scheduler: scheduler.clone(),
            },
        ));
        Self {
            kernel,
            fs,
            display,
            volume,
            scheduler,
        }
    }

    /// Spawns a task and makes it current on the calling thread.
    pub fn spawn_current(&self, command_line: &[u8]) -> Arc<Task> {
        let task = self.kernel.spawn(command_line);
        self.scheduler.set_current(task.id());
        task
    }

    pub fn call(&self, nr: u64, args: [u64; 6]) -> SyscallResult {
        self.kernel.syscall(nr, args)
    }
}

// ---------------------------------------------------------------------------
// File system
// ---------------------------------------------------------------------------

struct Node {
    is_directory: bool,
    data: Arc<Mutex<Vec<u8>>>,
}

#[derive(Default)]
struct MemFsInner {
    nodes: Vec<Node>,
    by_path: BTreeMap<String, u64>,
    full: bool,
}

/// Flat path-keyed file system. The root directory always exists.
#[derive(Default)]
pub(crate) struct MemFs {
    inner: Mutex<MemFsInner>,
    find_calls: AtomicUsize,
}

/// Splits off the leading `/` and at most one trailing `/`.
fn normalize(path: &str) -> (&str, bool) {
    let path = path.strip_prefix('/').unwrap_or(path);
    match path.strip_suffix('/') {
        Some(trimmed) => (trimmed, true),
        None => (path, false),
    }
}

fn parent_of(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(parent, _)| parent)
}

impl MemFsInner {
    fn insert(&mut self, path: &str, is_directory: bool, data: &[u8]) -> FileEntry {
        let id = self.nodes.len() as u64;
        self.nodes.push(Node {
            is_directory,
            data: Arc::new(Mutex::new(data.to_vec())),
        });
        self.by_path.insert(path.to_owned(), id);
        FileEntry {
            id,
            size: data.len() as u64,
            is_directory,
        }
    }

    fn entry(&self, path: &str) -> Option<FileEntry> {
        let id = *self.by_path.get(path)?;
        let node = &self.nodes[id as usize];
        Some(FileEntry {
            id,
            size: node.data.lock().unwrap().len() as u64,
            is_directory: node.is_directory,
        })
    }

    fn is_dir(&self, path: &str) -> bool {
        path.is_empty() || self.entry(path).is_some_and(|e| e.is_directory)
    }
}

impl MemFs {
    pub fn add_file(&self, path: &str, data: &[u8]) {
        let (path, _) = normalize(path);
        self.inner.lock().unwrap().insert(path, false, data);
    }

    pub fn add_dir(&self, path: &str) {
        let (path, _) = normalize(path);
        self.inner.lock().unwrap().insert(path, true, &[]);
    }

    pub fn contains(&self, path: &str) -> bool {
        let (path, _) = normalize(path);
        self.inner.lock().unwrap().by_path.contains_key(path)
    }

    pub fn contents(&self, path: &str) -> Option<Vec<u8>> {
        let (path, _) = normalize(path);
        let inner = self.inner.lock().unwrap();
        let id = *inner.by_path.get(path)?;
        let data = inner.nodes[id as usize].data.lock().unwrap().clone();
        Some(data)
    }

    /// Makes every later `create` fail with [`FsError::NoSpace`].
    pub fn set_full(&self, full: bool) {
        self.inner.lock().unwrap().full = full;
    }

    pub fn find_calls(&self) -> usize {
        self.find_calls.load(Ordering::Relaxed)
    }
}

impl FileSystem for MemFs {
    fn find(&self, path: &str) -> Lookup {
        self.find_calls.fetch_add(1, Ordering::Relaxed);
        let (path, post_slash) = normalize(path);
        Lookup {
            entry: self.inner.lock().unwrap().entry(path),
            post_slash,
        }
    }

    fn create(&self, path: &str) -> Result<FileEntry, FsError> {
        let (path, post_slash) = normalize(path);
        let mut inner = self.inner.lock().unwrap();
        if post_slash || inner.is_dir(path) {
            return Err(FsError::IsDirectory);
        }
        if !inner.is_dir(parent_of(path)) {
            return Err(FsError::NoSuchEntry);
        }
        if inner.full {
            return Err(FsError::NoSpace);
        }
        Ok(inner.insert(path, false, &[]))
    }

    fn open(&self, entry: &FileEntry) -> Arc<dyn FileHandle> {
        let data = self.inner.lock().unwrap().nodes[entry.id as usize].data.clone();
        Arc::new(MemFileHandle {
            data,
            pos: Mutex::new(0),
        })
    }
}

struct MemFileHandle {
    data: Arc<Mutex<Vec<u8>>>,
    pos: Mutex<usize>,
}

impl FileHandle for MemFileHandle {
    fn read(&self, buf: &mut [u8]) -> usize {
        let data = self.data.lock().unwrap();
        let mut pos = self.pos.lock().unwrap();
        let start = (*pos).min(data.len());
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        *pos = start + n;
        n
    }

    fn write(&self, buf: &[u8]) -> usize {
        let mut data = self.data.lock().unwrap();
        let mut pos = self.pos.lock().unwrap();
        let end = *pos + buf.len();
        if data.len() < end {
            data.resize(end, 0);
        }
        data[*pos..end].copy_from_slice(buf);
        *pos = end;
        buf.len()
    }

    fn size(&self) -> u64 {
        self.data.lock().unwrap().len() as u64
    }
}

// ---------------------------------------------------------------------------
// Screen and volume
// ---------------------------------------------------------------------------

/// Records pixel writes and owns a zeroed 32-bpp frame buffer.
pub(crate) struct MemDisplay {
    width: u32,
    height: u32,
    stride: u32,
    pixels: Mutex<Vec<(i32, i32, PixelColor)>>,
    fb: Mutex<Vec<u8>>,
}

impl MemDisplay {
    fn new(width: u32, height: u32, stride: u32) -> Self {
        let bytes = stride as usize * height as usize * FrameBuffer::BYTES_PER_PIXEL;
        Self {
            width,
            height,
            stride,
            pixels: Mutex::new(Vec::new()),
            fb: Mutex::new(vec![0; bytes]),
        }
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn pixels(&self) -> Vec<(i32, i32, PixelColor)> {
        self.pixels.lock().unwrap().clone()
    }

    pub fn frame_buffer_bytes(&self) -> Vec<u8> {
        self.fb.lock().unwrap().clone()
    }
}

impl Display for MemDisplay {
    fn write_pixel(&self, x: i32, y: i32, color: PixelColor) {
        self.pixels.lock().unwrap().push((x, y, color));
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn frame_buffer(&self) -> FrameBuffer {
        let mut fb = self.fb.lock().unwrap();
        FrameBuffer {
            base: fb.as_mut_ptr(),
            size: fb.len(),
            pixels_per_scan_line: self.stride,
        }
    }
}

/// Volume whose byte `i` is `i as u8`.
pub(crate) struct MemVolume {
    data: Vec<u8>,
}

impl MemVolume {
    fn new(len: usize) -> Self {
        Self {
            data: (0..len).map(|i| i as u8).collect(),
        }
    }

    pub fn size_bytes(&self) -> u64 {
        self.data.len() as u64
    }
}

impl VolumeImage for MemVolume {
    fn size(&self) -> u64 {
        self.size_bytes()
    }

    fn read(&self, offset: u64, buf: &mut [u8]) {
        let start = offset as usize;
        buf.copy_from_slice(&self.data[start..start + buf.len()]);
    }
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Each host thread runs one task; `sleep` spins with `yield_now` until the
/// task leaves `BlockedOnReceive`.
#[derive(Default)]
pub(crate) struct HostScheduler {
    current: Mutex<HashMap<ThreadId, TaskId>>,
    admitted: Mutex<Vec<TaskId>>,
    wakeups: AtomicUsize,
}

impl HostScheduler {
    /// Makes `id` the current task of the calling thread.
    pub fn set_current(&self, id: TaskId) {
        self.current.lock().unwrap().insert(thread::current().id(), id);
    }

    pub fn admitted(&self) -> Vec<TaskId> {
        self.admitted.lock().unwrap().clone()
    }

    pub fn wakeups(&self) -> usize {
        self.wakeups.load(Ordering::SeqCst)
    }
}

impl Scheduler for HostScheduler {
    fn current(&self) -> TaskId {
        self.current
            .lock()
            .unwrap()
            .get(&thread::current().id())
            .copied()
            .unwrap_or(TaskId::NONE)
    }

    fn admit(&self, task: &Task) {
        self.admitted.lock().unwrap().push(task.id());
    }

    fn sleep(&self, task: &Task) {
        while task.state() == TaskState::BlockedOnReceive {
            thread::yield_now();
        }
    }

    fn wakeup(&self, _task: &Task) {
        self.wakeups.fetch_add(1, Ordering::SeqCst);
    }
}
