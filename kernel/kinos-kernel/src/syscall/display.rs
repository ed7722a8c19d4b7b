//! Screen syscalls: write_pixel, frame_buffer_width, frame_buffer_height,
//! copy_to_frame_buffer.

use kinos_syscall::EINVAL;

use super::userptr::UserSlice;
use crate::display::PixelColor;
use crate::kernel::Kernel;

/// `write_pixel`: arguments are truncated to their register-level types.
pub(super) fn sys_write_pixel(k: &Kernel, x: u64, y: u64, r: u64, g: u64, b: u64) -> Result<u64, i32> {
    let color = PixelColor {
        r: r as u8,
        g: g as u8,
        b: b as u8,
    };
    k.display.write_pixel(x as i32, y as i32, color);
    Ok(0)
}

pub(super) fn sys_frame_buffer_width(k: &Kernel) -> Result<u64, i32> {
    Ok(u64::from(k.display.width()))
}

pub(super) fn sys_frame_buffer_height(k: &Kernel) -> Result<u64, i32> {
    Ok(u64::from(k.display.height()))
}

/// `copy_to_frame_buffer`: copies `bytes_per_line` raw bytes from `src`
/// into the frame buffer starting at pixel `(x, y)`.
///
/// The destination may run past the end of the scan line into the next
/// one, but never past the mapped frame buffer.
pub(super) fn sys_copy_to_frame_buffer(
    k: &Kernel,
    src: u64,
    x: u64,
    y: u64,
    bytes_per_line: u64,
) -> Result<u64, i32> {
    let (x, y) = (x as i32, y as i32);
    let x = usize::try_from(x).map_err(|_| EINVAL)?;
    let y = usize::try_from(y).map_err(|_| EINVAL)?;
    let len = usize::try_from(bytes_per_line).map_err(|_| EINVAL)?;

    let fb = k.display.frame_buffer();
    let offset = fb.offset_of(x, y).ok_or(EINVAL)?;
    let end = offset.checked_add(len).ok_or(EINVAL)?;
    if end > fb.size {
        return Err(EINVAL);
    }
    let src = UserSlice::new(src, bytes_per_line)?;
    if src.is_empty() {
        return Ok(0);
    }

    // SAFETY: `src` is a validated range of the caller's address space and
    // `offset..end` lies inside the mapped frame buffer.
    unsafe {
        core::ptr::copy_nonoverlapping(src.as_slice().as_ptr(), fb.base.add(offset), len);
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use crate::display::PixelColor;
    use crate::testutil::{Harness, addr};
    use kinos_syscall::{
        EFAULT, EINVAL, SYS_COPY_TO_FRAME_BUFFER, SYS_FRAME_BUFFER_HEIGHT, SYS_FRAME_BUFFER_WIDTH,
        SYS_WRITE_PIXEL, SyscallResult,
    };

    #[test]
    fn geometry_queries() {
        let h = Harness::new();
        assert_eq!(h.call(SYS_FRAME_BUFFER_WIDTH, [0; 6]), SyscallResult::ok(800));
        assert_eq!(h.call(SYS_FRAME_BUFFER_HEIGHT, [0; 6]), SyscallResult::ok(600));
    }

    #[test]
    fn write_pixel_truncates_arguments() {
        let h = Harness::new();
        assert_eq!(
            h.call(SYS_WRITE_PIXEL, [10, 20, 0x1ff, 0x80, 7, 0]),
            SyscallResult::ok(0)
        );
        assert_eq!(
            h.call(SYS_WRITE_PIXEL, [u64::MAX, 3, 1, 2, 3, 0]),
            SyscallResult::ok(0)
        );
        assert_eq!(
            h.display.pixels(),
            vec![
                (10, 20, PixelColor { r: 0xff, g: 0x80, b: 7 }),
                (-1, 3, PixelColor { r: 1, g: 2, b: 3 }),
            ]
        );
    }

    #[test]
    fn copy_lands_at_stride_offset() {
        let h = Harness::new();
        let line = [0xaau8, 0xbb, 0xcc, 0xdd, 0x11, 0x22, 0x33, 0x44];
        assert_eq!(
            h.call(SYS_COPY_TO_FRAME_BUFFER, [addr(&line), 3, 2, 8, 0, 0]),
            SyscallResult::ok(0)
        );
        let stride = h.display.stride() as usize;
        let offset = 4 * (stride * 2 + 3);
        let fb = h.display.frame_buffer_bytes();
        assert_eq!(&fb[offset..offset + 8], &line);
        assert!(fb[..offset].iter().all(|&b| b == 0));
        assert!(fb[offset + 8..].iter().all(|&b| b == 0));
    }

    #[test]
    fn copy_out_of_range_is_einval() {
        let h = Harness::new();
        let line = [1u8; 16];
        let height = 600u64;
        assert_eq!(
            h.call(SYS_COPY_TO_FRAME_BUFFER, [addr(&line), 0, height, 16, 0, 0]),
            SyscallResult::err(EINVAL)
        );
        assert_eq!(
            h.call(SYS_COPY_TO_FRAME_BUFFER, [addr(&line), u64::from(u32::MAX), 0, 16, 0, 0]),
            SyscallResult::err(EINVAL)
        );
        let stride = u64::from(h.display.stride());
        assert_eq!(
            h.call(SYS_COPY_TO_FRAME_BUFFER, [addr(&line), stride - 2, height - 1, 16, 0, 0]),
            SyscallResult::err(EINVAL)
        );
        assert!(h.display.frame_buffer_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn copy_from_null_is_efault() {
        let h = Harness::new();
        assert_eq!(
            h.call(SYS_COPY_TO_FRAME_BUFFER, [0, 0, 0, 4, 0, 0]),
            SyscallResult::err(EFAULT)
        );
    }
}
