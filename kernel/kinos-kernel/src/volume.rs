//! Boot volume interface.

/// Raw, byte-addressed read access to the volume the kernel booted from.
pub trait VolumeImage: Send + Sync {
    /// Image size in bytes.
    fn size(&self) -> u64;
    /// Fills `buf` from byte `offset`. The caller keeps the range inside
    /// [`VolumeImage::size`].
    fn read(&self, offset: u64, buf: &mut [u8]);
}
