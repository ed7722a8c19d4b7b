//! Per-task resources: descriptor table, file mappings, address-space
//! cursors, the argument string and the transfer buffer.

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;

use kinos_core::id::Fd;
use kinos_syscall::PAGE_SIZE;

use crate::config::KernelConfig;
use crate::fs::FileHandle;

/// A file mapped into the task's address space by `map_file`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMapping {
    /// The descriptor the mapping reads through.
    pub fd: Fd,
    /// First mapped address, page-aligned.
    pub begin: u64,
    /// One past the last mapped address.
    pub end: u64,
}

impl FileMapping {
    /// Whether `addr` falls inside the mapping.
    pub fn contains(&self, addr: u64) -> bool {
        (self.begin..self.end).contains(&addr)
    }
}

/// Everything a task owns besides its mailbox.
pub struct TaskResources {
    files: Vec<Option<Arc<dyn FileHandle>>>,
    file_maps: Vec<FileMapping>,
    demand_paging_end: u64,
    file_map_end: u64,
    argument: Vec<u8>,
    argument_capacity: usize,
    transfer_buffer: Box<[u8]>,
}

impl TaskResources {
    /// Fresh resources laid out per `config`.
    pub fn new(config: &KernelConfig) -> Self {
        Self {
            files: Vec::new(),
            file_maps: Vec::new(),
            demand_paging_end: config.demand_paging_base,
            file_map_end: config.file_map_top,
            argument: Vec::new(),
            argument_capacity: config.argument_capacity,
            transfer_buffer: vec![0u8; config.task_buffer_capacity].into_boxed_slice(),
        }
    }

    // -- descriptors ------------------------------------------------------

    /// Installs `handle` in the lowest free slot, growing the table only
    /// when every slot is taken.
    pub fn allocate_fd(&mut self, handle: Arc<dyn FileHandle>) -> Fd {
        let index = match self.files.iter().position(Option::is_none) {
            Some(free) => {
                self.files[free] = Some(handle);
                free
            }
            None => {
                self.files.push(Some(handle));
                self.files.len() - 1
            }
        };
        Fd::new(index as u32)
    }

    /// The handle in slot `fd`, if any.
    pub fn file(&self, fd: Fd) -> Option<Arc<dyn FileHandle>> {
        self.files.get(fd.as_usize()).cloned().flatten()
    }

    /// Empties slot `fd` and returns what was in it.
    pub fn close(&mut self, fd: Fd) -> Option<Arc<dyn FileHandle>> {
        self.files.get_mut(fd.as_usize()).and_then(Option::take)
    }

    /// Number of occupied descriptor slots.
    pub fn open_files(&self) -> usize {
        self.files.iter().filter(|slot| slot.is_some()).count()
    }

    // -- address cursors --------------------------------------------------

    /// Top of the demand-paged region.
    pub fn demand_paging_end(&self) -> u64 {
        self.demand_paging_end
    }

    /// Bottom of the file-mapping region.
    pub fn file_map_end(&self) -> u64 {
        self.file_map_end
    }

    /// Grows the demand-paged region by `num_pages` and returns its old top.
    ///
    /// Returns `None` if the new top would overflow or run into the
    /// file-mapping region.
    pub fn reserve_demand_pages(&mut self, num_pages: u64) -> Option<u64> {
        let old = self.demand_paging_end;
        let new = num_pages
            .checked_mul(PAGE_SIZE)
            .and_then(|bytes| old.checked_add(bytes))
            .filter(|&end| end <= self.file_map_end)?;
        self.demand_paging_end = new;
        Some(old)
    }

    /// Carves `size` bytes for `fd` off the bottom of the file-mapping
    /// region and records the mapping.
    ///
    /// Returns `None` for an empty file or when the region would run into
    /// the demand-paged one.
    pub fn map_file(&mut self, fd: Fd, size: u64) -> Option<FileMapping> {
        if size == 0 {
            return None;
        }
        let end = self.file_map_end;
        let begin = end.checked_sub(size)? & !(PAGE_SIZE - 1);
        if begin < self.demand_paging_end {
            return None;
        }
        let mapping = FileMapping { fd, begin, end };
        self.file_map_end = begin;
        self.file_maps.push(mapping);
        Some(mapping)
    }

    /// The mapping covering `addr`, for the page-fault path.
    pub fn find_file_mapping(&self, addr: u64) -> Option<FileMapping> {
        self.file_maps.iter().copied().find(|m| m.contains(addr))
    }

    /// All mappings, oldest first.
    pub fn file_mappings(&self) -> &[FileMapping] {
        &self.file_maps
    }

    // -- argument and transfer buffer -------------------------------------

    /// The argument string, without its NUL.
    pub fn argument(&self) -> &[u8] {
        &self.argument
    }

    /// Replaces the argument, truncating so it and its NUL fit the
    /// configured capacity. Returns the stored length.
    pub fn set_argument(&mut self, arg: &[u8]) -> usize {
        let len = arg.len().min(self.argument_capacity.saturating_sub(1));
        self.argument.clear();
        self.argument.extend_from_slice(&arg[..len]);
        len
    }

    /// The transfer buffer filled by `copy_to_task_buffer`.
    pub fn transfer_buffer(&self) -> &[u8] {
        &self.transfer_buffer
    }

    /// Copies `data` into the transfer buffer at `offset`.
    ///
    /// Returns the capacity left after the copied range, or `None` if the
    /// range does not fit.
    pub fn copy_to_transfer_buffer(&mut self, offset: usize, data: &[u8]) -> Option<usize> {
        let end = offset.checked_add(data.len())?;
        let dest = self.transfer_buffer.get_mut(offset..end)?;
        dest.copy_from_slice(data);
        Some(self.transfer_buffer.len() - end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullFile;

    impl FileHandle for NullFile {
        fn read(&self, _buf: &mut [u8]) -> usize {
            0
        }

        fn write(&self, buf: &[u8]) -> usize {
            buf.len()
        }

        fn size(&self) -> u64 {
            0
        }
    }

    fn resources() -> TaskResources {
        TaskResources::new(&KernelConfig::new())
    }

    #[test]
    fn descriptors_are_sequential() {
        let mut res = resources();
        for expected in 0..4 {
            assert_eq!(res.allocate_fd(Arc::new(NullFile)), Fd::new(expected));
        }
        assert_eq!(res.open_files(), 4);
    }

    #[test]
    fn lowest_free_slot_is_reused() {
        let mut res = resources();
        let a = res.allocate_fd(Arc::new(NullFile));
        let b = res.allocate_fd(Arc::new(NullFile));
        let c = res.allocate_fd(Arc::new(NullFile));
        assert!(res.close(a).is_some());
        assert!(res.close(c).is_some());
        assert_eq!(res.allocate_fd(Arc::new(NullFile)), a);
        assert_eq!(res.allocate_fd(Arc::new(NullFile)), c);
        assert_eq!(res.allocate_fd(Arc::new(NullFile)), Fd::new(3));
        assert!(res.file(b).is_some());
    }

    #[test]
    fn closing_empty_or_unknown_slot_is_none() {
        let mut res = resources();
        assert!(res.close(Fd::new(0)).is_none());
        let fd = res.allocate_fd(Arc::new(NullFile));
        assert!(res.close(fd).is_some());
        assert!(res.close(fd).is_none());
        assert!(res.file(fd).is_none());
    }

    #[test]
    fn demand_pages_advance_by_whole_pages() {
        let mut res = resources();
        let base = res.demand_paging_end();
        assert_eq!(res.reserve_demand_pages(3), Some(base));
        assert_eq!(res.demand_paging_end(), base + 3 * PAGE_SIZE);
        assert_eq!(res.reserve_demand_pages(0), Some(base + 3 * PAGE_SIZE));
        assert_eq!(res.reserve_demand_pages(u64::MAX), None);
        assert_eq!(res.demand_paging_end(), base + 3 * PAGE_SIZE);
    }

    #[test]
    fn file_mappings_are_page_aligned_and_descend() {
        let mut res = resources();
        let top = res.file_map_end();
        for size in [1, 4095, 4096, 4097, 12_345] {
            let before = res.file_map_end();
            let m = res.map_file(Fd::new(0), size).unwrap();
            assert_eq!(m.begin % PAGE_SIZE, 0);
            assert_eq!(m.end, before);
            assert!(m.end - m.begin >= size);
            assert!(m.end - m.begin < size + PAGE_SIZE);
            assert!(res.file_map_end() < before);
        }
        assert!(res.find_file_mapping(top - 1).is_some());
        assert!(res.find_file_mapping(top).is_none());
        assert_eq!(res.file_mappings().len(), 5);
    }

    #[test]
    fn empty_file_is_not_mapped() {
        let mut res = resources();
        assert!(res.map_file(Fd::new(0), 0).is_none());
        assert!(res.file_mappings().is_empty());
    }

    #[test]
    fn regions_do_not_collide() {
        let config = KernelConfig::new().with_address_layout(0x1000, 0x4000);
        let mut res = TaskResources::new(&config);
        assert!(res.reserve_demand_pages(4).is_none());
        assert_eq!(res.reserve_demand_pages(1), Some(0x1000));
        assert!(res.map_file(Fd::new(0), 0x3000).is_none());
        assert!(res.map_file(Fd::new(0), 0x2000).is_some());
    }

    #[test]
    fn argument_is_truncated_to_capacity() {
        let config = KernelConfig::new().with_buffers(4, 16);
        let mut res = TaskResources::new(&config);
        assert_eq!(res.set_argument(b"abcdef"), 3);
        assert_eq!(res.argument(), b"abc");
        assert_eq!(res.set_argument(b"x"), 1);
        assert_eq!(res.argument(), b"x");
    }

    #[test]
    fn transfer_buffer_bounds() {
        let config = KernelConfig::new().with_buffers(4, 16);
        let mut res = TaskResources::new(&config);
        assert_eq!(res.copy_to_transfer_buffer(4, b"abcd"), Some(8));
        assert_eq!(&res.transfer_buffer()[4..8], b"abcd");
        assert_eq!(res.copy_to_transfer_buffer(12, b"wxyz"), Some(0));
        assert_eq!(res.copy_to_transfer_buffer(13, b"wxyz"), None);
        assert_eq!(res.copy_to_transfer_buffer(usize::MAX, b"a"), None);
    }
}
