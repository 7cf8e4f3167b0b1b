//! # Image Blitting and Wallpaper Composition
//!
//! Blits decoded 24-bit images onto the surface. Two quirks of the format
//! and the screen layout are handled here and nowhere else:
//!
//! * rows are stored bottom-to-top, so vertical placement flips the row
//!   order to make the picture read top-to-bottom on screen;
//! * a blit walks the full framebuffer extent and extends each image row's
//!   last pixel to the right edge, so a single image covers the remaining
//!   scanline without leaving undrawn seams.

use crate::surface::Surface;
use kernel_handoff::boot::ImageHandle;

/// Bytes per source pixel: (blue, green, red).
const SRC_BYTES_PER_PIXEL: usize = 3;

/// The pixel array behind an image handle.
///
/// # Safety
/// `image` must be an available handle whose pixel array covers
/// `width * height * 3` bytes.
unsafe fn pixel_rows(image: &ImageHandle) -> &[u8] {
    let len = image.width as usize * image.height as usize * SRC_BYTES_PER_PIXEL;
    // SAFETY: the caller vouches for the handle; handles are only built
    // from fully decoded images.
    unsafe { core::slice::from_raw_parts(image.pixels_ptr as *const u8, len) }
}

/// Blit `image` with its top-left target corner at `(origin_x, origin_y)`.
///
/// Iterates the full framebuffer extent. Inside the image's span, the
/// (B,G,R) triple converts to opaque `0xAARRGGBB`; to the right of the
/// span, the row's last written pixel repeats to the framebuffer edge.
/// Decoded row 0 (the stored bottom row) lands at the bottom of the
/// target rectangle.
pub fn blit_image(surface: &mut Surface, image: &ImageHandle, origin_x: u32, origin_y: u32) {
    if !image.is_available() || image.width == 0 || image.height == 0 {
        return;
    }
    // SAFETY: availability checked above.
    let pixels = unsafe { pixel_rows(image) };
    let row_bytes = image.width as usize * SRC_BYTES_PER_PIXEL;

    for y in 0..surface.height() {
        if y < origin_y || y - origin_y >= image.height {
            continue;
        }
        // Flip: screen row `origin_y + r` shows decoded row `h - 1 - r`.
        let src_row = (image.height - 1 - (y - origin_y)) as usize;
        let row = &pixels[src_row * row_bytes..(src_row + 1) * row_bytes];

        let mut last = 0u32;
        for x in origin_x..surface.width() {
            let rel_x = (x - origin_x) as usize;
            if rel_x < image.width as usize {
                let i = rel_x * SRC_BYTES_PER_PIXEL;
                last = pack_bgr(row[i], row[i + 1], row[i + 2]);
            }
            // Beyond the image's width the last pixel repeats.
            surface.put(x, y, last);
        }
    }
}

/// A (blue, green, red) triple as an opaque `0xAARRGGBB` pixel.
#[inline]
const fn pack_bgr(b: u8, g: u8, r: u8) -> u32 {
    0xFF00_0000 | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}

/// Compose the wallpaper: the same image at four fixed placements.
///
/// This is a fixed layout policy, not a general tiling algorithm: the
/// offsets are derived from the image dimensions, later placements
/// overdraw the earlier placements' edge-extension, and each blit's own
/// extension covers the rest of the scanline out to the framebuffer
/// width.
pub fn render_wallpaper(surface: &mut Surface, image: &ImageHandle) {
    if !image.is_available() {
        return;
    }
    let (w, h) = (image.width, image.height);
    for (x, y) in [(0, 0), (w, 0), (0, h), (w, h)] {
        blit_image(surface, image, x, y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// An image handle over bottom-up rows of (b, g, r) triples, plus the
    /// backing storage.
    fn test_image(width: u32, height: u32, rows: &[&[(u8, u8, u8)]]) -> (Vec<u8>, ImageHandle) {
        let mut pixels = Vec::new();
        for row in rows {
            for &(b, g, r) in *row {
                pixels.extend([b, g, r]);
            }
        }
        let handle = ImageHandle {
            pixels_ptr: pixels.as_ptr() as u64,
            width,
            height,
            bits_per_pixel: 24,
        };
        (pixels, handle)
    }

    #[test]
    fn flips_rows_and_extends_edges() {
        // Stored bottom-to-top (b,g,r): row 0 = blue, green; row 1 = red,
        // white.
        let (_p, img) = test_image(
            2,
            2,
            &[
                &[(255, 0, 0), (0, 255, 0)],
                &[(0, 0, 255), (255, 255, 255)],
            ],
        );
        let mut buf = vec![0u32; 16];
        let mut s = unsafe { Surface::from_raw_parts(buf.as_mut_ptr(), 4, 4, 4) };

        blit_image(&mut s, &img, 0, 0);

        // Screen row 0 shows decoded row 1 (the visual top): the
        // (0,0,255) triple is red=255, then white.
        assert_eq!(s.get(0, 0), 0xFFFF_0000);
        assert_eq!(s.get(1, 0), 0xFFFF_FFFF);
        // Screen row 1 shows decoded row 0 (the visual bottom): blue=255,
        // then green=255.
        assert_eq!(s.get(0, 1), 0xFF00_00FF);
        assert_eq!(s.get(1, 1), 0xFF00_FF00);

        // Edge-extension: columns 2 and 3 repeat each row's last pixel.
        assert_eq!(s.get(2, 0), 0xFFFF_FFFF);
        assert_eq!(s.get(3, 0), 0xFFFF_FFFF);
        assert_eq!(s.get(2, 1), 0xFF00_FF00);
        assert_eq!(s.get(3, 1), 0xFF00_FF00);

        // Rows below the image's span stay untouched.
        assert_eq!(s.get(0, 2), 0);
        assert_eq!(s.get(3, 3), 0);
    }

    #[test]
    fn extension_equals_last_valid_column() {
        let (_p, img) = test_image(3, 1, &[&[(1, 2, 3), (4, 5, 6), (7, 8, 9)]]);
        let mut buf = vec![0u32; 8];
        let mut s = unsafe { Surface::from_raw_parts(buf.as_mut_ptr(), 8, 1, 8) };

        blit_image(&mut s, &img, 0, 0);

        let last = s.get(2, 0);
        for x in 3..8 {
            assert_eq!(s.get(x, 0), last, "column {x}");
        }
    }

    #[test]
    fn respects_nonzero_origin() {
        let (_p, img) = test_image(1, 1, &[&[(9, 9, 9)]]);
        let mut buf = vec![0u32; 25];
        let mut s = unsafe { Surface::from_raw_parts(buf.as_mut_ptr(), 5, 5, 5) };

        blit_image(&mut s, &img, 2, 3);

        // Left of the origin: untouched. At and right of it: drawn.
        assert_eq!(s.get(1, 3), 0);
        assert_eq!(s.get(2, 3), pack_bgr(9, 9, 9));
        assert_eq!(s.get(4, 3), pack_bgr(9, 9, 9));
        assert_eq!(s.get(2, 2), 0);
        assert_eq!(s.get(2, 4), 0);
    }

    #[test]
    fn wallpaper_places_four_tiles() {
        // 2x1 image: bottom row only. Four placements cover a 4x2 grid,
        // extensions cover the rest of each scanline.
        let (_p, img) = test_image(2, 1, &[&[(10, 0, 0), (20, 0, 0)]]);
        let mut buf = vec![0u32; 6 * 2];
        let mut s = unsafe { Surface::from_raw_parts(buf.as_mut_ptr(), 6, 2, 6) };

        render_wallpaper(&mut s, &img);

        let a = pack_bgr(10, 0, 0);
        let b = pack_bgr(20, 0, 0);
        for y in 0..2 {
            assert_eq!(s.get(0, y), a);
            assert_eq!(s.get(1, y), b);
            // Second placement overdraws the first one's extension.
            assert_eq!(s.get(2, y), a);
            assert_eq!(s.get(3, y), b);
            // Rightmost columns: second placement's extension.
            assert_eq!(s.get(4, y), b);
            assert_eq!(s.get(5, y), b);
        }
    }

    #[test]
    fn empty_image_draws_nothing() {
        let mut buf = vec![0u32; 4];
        let mut s = unsafe { Surface::from_raw_parts(buf.as_mut_ptr(), 2, 2, 2) };
        blit_image(&mut s, &ImageHandle::EMPTY, 0, 0);
        render_wallpaper(&mut s, &ImageHandle::EMPTY);
        assert!(buf.iter().all(|&p| p == 0));
    }
}
