//! Screen interface consumed by the frame-buffer syscalls.

/// 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelColor {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
}

/// Raw view of the hardware frame buffer.
#[derive(Debug, Clone, Copy)]
pub struct FrameBuffer {
    /// First byte of pixel (0, 0).
    pub base: *mut u8,
    /// Total mapped bytes starting at `base`.
    pub size: usize,
    /// Pixels per scan line (stride), which may exceed the visible width.
    pub pixels_per_scan_line: u32,
}

impl FrameBuffer {
    /// Every format the kernel drives is 32 bits per pixel.
    pub const BYTES_PER_PIXEL: usize = 4;

    /// Byte offset of pixel `(x, y)`, or `None` on overflow.
    pub fn offset_of(&self, x: usize, y: usize) -> Option<usize> {
        (self.pixels_per_scan_line as usize)
            .checked_mul(y)?
            .checked_add(x)?
            .checked_mul(Self::BYTES_PER_PIXEL)
    }
}

/// Screen operations.
pub trait Display: Send + Sync {
    /// Writes one pixel. Coordinates outside the screen are ignored.
    fn write_pixel(&self, x: i32, y: i32, color: PixelColor);
    /// Visible width in pixels.
    fn width(&self) -> u32;
    /// Visible height in pixels.
    fn height(&self) -> u32;
    /// The raw frame buffer behind the screen.
    fn frame_buffer(&self) -> FrameBuffer;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_uses_stride_not_width() {
        let fb = FrameBuffer {
            base: core::ptr::null_mut(),
            size: 0,
            pixels_per_scan_line: 1024,
        };
        assert_eq!(fb.offset_of(0, 0), Some(0));
        assert_eq!(fb.offset_of(3, 2), Some(4 * (1024 * 2 + 3)));
        assert_eq!(fb.offset_of(usize::MAX, 1), None);
    }
}
