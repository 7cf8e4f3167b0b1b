//! # Glyph Rasterization and Raw Text Emission
//!
//! The single text-drawing primitive. Free-form console output calls
//! [`write_text`] directly; terminal-window output routes through it via
//! [`crate::terminal::term_write`].

use crate::surface::Surface;
use kernel_handoff::boot::{Canvas, FontHandle};

/// Glyph advance in pixels. PSF1 glyphs are always eight pixels wide.
pub const GLYPH_WIDTH: u32 = 8;

/// Vertical advance on newline.
pub const LINE_HEIGHT: u32 = 20;

/// The row bytes of one glyph from the handed-off table.
///
/// # Safety
/// `font` must be an available handle whose glyph table covers
/// `glyph_count * glyph_height` bytes.
unsafe fn glyph_rows(font: &FontHandle, c: u8) -> &[u8] {
    let height = font.glyph_height as usize;
    let start = c as usize * height;
    // SAFETY: a u8 character index stays below the 256-glyph minimum, so
    // start + height is within the table the caller vouches for.
    unsafe { core::slice::from_raw_parts((font.glyphs_ptr as *const u8).add(start), height) }
}

/// Rasterize one glyph at `(x, y)`.
///
/// Set bits (bit 7 is the leftmost column) write `color`; clear bits leave
/// the existing pixel untouched. There is no background fill. Pixels past
/// the surface edge are clipped by the surface itself.
pub fn draw_glyph(surface: &mut Surface, font: &FontHandle, c: u8, x: u32, y: u32, color: u32) {
    if !font.is_available() {
        return;
    }
    // SAFETY: availability checked; the handle was built from a fully
    // decoded font.
    let rows = unsafe { glyph_rows(font, c) };
    for (row, &bits) in rows.iter().enumerate() {
        for col in 0..GLYPH_WIDTH {
            if bits & (0x80 >> col) != 0 {
                surface.put(x + col, y + row as u32, color);
            }
        }
    }
}

/// Raw text emission at the canvas pen.
///
/// Newlines reset the pen to the caller-supplied `restore_x` column and
/// advance it one line down; any other byte rasterizes at the pen offset
/// by one glyph width and advances the pen by [`GLYPH_WIDTH`].
pub fn write_text(
    surface: &mut Surface,
    font: &FontHandle,
    canvas: &mut Canvas,
    text: &[u8],
    color: u32,
    restore_x: u32,
) {
    for &b in text {
        if b == b'\n' {
            canvas.x = restore_x;
            canvas.y += LINE_HEIGHT;
        } else {
            draw_glyph(surface, font, b, canvas.x + GLYPH_WIDTH, canvas.y, color);
            canvas.x += GLYPH_WIDTH;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A 4-row font whose glyph for `c` has row bytes `[c, c, c, c]`,
    /// handy for checking addressing. Returns the backing table too so it
    /// stays alive.
    fn test_font(height: u8) -> (Vec<u8>, FontHandle) {
        let mut table = Vec::with_capacity(256 * height as usize);
        for c in 0u16..256 {
            table.extend(core::iter::repeat_n(c as u8, height as usize));
        }
        let handle = FontHandle {
            glyphs_ptr: table.as_ptr() as u64,
            glyph_height: u32::from(height),
            glyph_count: 256,
        };
        (table, handle)
    }

    fn surface(buf: &mut Vec<u32>, w: u32, h: u32, stride: u32) -> Surface {
        unsafe { Surface::from_raw_parts(buf.as_mut_ptr(), w, h, stride) }
    }

    #[test]
    fn set_bits_paint_clear_bits_preserve() {
        let (_table, font) = test_font(4);
        let mut buf = vec![0x1111_1111u32; 32 * 16];
        let mut s = surface(&mut buf, 32, 16, 32);

        // Glyph 0xA5 = 1010_0101: columns 0, 2, 5, 7 set.
        draw_glyph(&mut s, &font, 0xA5, 0, 0, 0xFFFF_FFFF);
        for row in 0..4u32 {
            for col in 0..8u32 {
                let expect = if [0, 2, 5, 7].contains(&col) {
                    0xFFFF_FFFF
                } else {
                    0x1111_1111
                };
                assert_eq!(s.get(col, row), expect, "col {col} row {row}");
            }
        }
    }

    #[test]
    fn glyph_rasterization_is_idempotent() {
        let (_table, font) = test_font(4);
        let mut once = vec![0u32; 16 * 8];
        let mut twice = vec![0u32; 16 * 8];

        let mut s = surface(&mut once, 16, 8, 16);
        draw_glyph(&mut s, &font, b'Z', 3, 2, 0xFF00_FF00);
        drop(s);

        let mut s = surface(&mut twice, 16, 8, 16);
        draw_glyph(&mut s, &font, b'Z', 3, 2, 0xFF00_FF00);
        draw_glyph(&mut s, &font, b'Z', 3, 2, 0xFF00_FF00);
        drop(s);

        assert_eq!(once, twice);
    }

    #[test]
    fn newline_restores_column_and_advances_line() {
        let (_table, font) = test_font(4);
        let mut buf = vec![0u32; 256 * 64];
        let mut s = surface(&mut buf, 256, 64, 256);
        let mut canvas = Canvas { x: 100, y: 0 };

        // "AB\nC" with restore column 100.
        let mut positions = Vec::new();
        for &b in b"AB\nC" {
            if b == b'\n' {
                write_text(&mut s, &font, &mut canvas, b"\n", 0xFFFF_FFFF, 100);
            } else {
                positions.push((canvas.x, canvas.y));
                write_text(&mut s, &font, &mut canvas, &[b], 0xFFFF_FFFF, 100);
            }
        }

        // A drawn with the pen at 100, B at 108; after the newline the pen
        // returns to 100 one line down and C draws there.
        assert_eq!(positions, vec![(100, 0), (108, 0), (100, LINE_HEIGHT)]);
        assert_eq!(canvas.x, 108);
        assert_eq!(canvas.y, LINE_HEIGHT);

        // Glyph pixels sit one glyph width right of the pen. The test
        // font's row byte for 'A' is 0x41 = 0100_0001: columns 1 and 7.
        assert_eq!(s.get(100 + GLYPH_WIDTH + 1, 0), 0xFFFF_FFFF);
        assert_eq!(s.get(100 + GLYPH_WIDTH + 7, 0), 0xFFFF_FFFF);
        // 'C' = 0x43 = 0100_0011: columns 1, 6, 7 on the new line.
        assert_eq!(s.get(100 + GLYPH_WIDTH + 1, LINE_HEIGHT), 0xFFFF_FFFF);
        assert_eq!(s.get(100 + GLYPH_WIDTH + 6, LINE_HEIGHT), 0xFFFF_FFFF);
    }

    #[test]
    fn empty_font_draws_nothing() {
        let mut buf = vec![0u32; 64];
        let mut s = surface(&mut buf, 8, 8, 8);
        let mut canvas = Canvas { x: 0, y: 0 };
        write_text(
            &mut s,
            &FontHandle::EMPTY,
            &mut canvas,
            b"hi",
            0xFFFF_FFFF,
            0,
        );
        assert!(buf.iter().all(|&p| p == 0));
        // The pen still advances; only rasterization is unavailable.
        assert_eq!(canvas.x, 2 * GLYPH_WIDTH);
    }
}
