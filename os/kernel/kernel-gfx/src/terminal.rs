//! # Terminal Text Emission
//!
//! The terminal keeps a writing position independent of whatever the
//! free-form canvas pen is doing elsewhere: emission saves the pen, moves
//! it to the terminal cursor, delegates to raw emission, and restores it.

use crate::surface::Surface;
use crate::text::{GLYPH_WIDTH, write_text};
use kernel_handoff::boot::{Canvas, FontHandle, Terminal};

/// Left edge of the terminal's text area, relative to the window origin.
pub const TERMINAL_MARGIN_X: u32 = 16;

/// Top edge of the terminal's text area, relative to the window origin.
pub const TERMINAL_MARGIN_Y: u32 = 16;

/// Write text at the terminal window's cursor.
///
/// The terminal cursor advances by one glyph width per byte written,
/// including newline bytes. Newlines still reposition the canvas pen
/// (raw emission handles them), but the terminal's own cursor does not
/// track them; that asymmetry is long-standing observed behavior and is
/// kept as documented.
pub fn term_write(
    surface: &mut Surface,
    font: &FontHandle,
    canvas: &mut Canvas,
    terminal: &mut Terminal,
    text: &[u8],
    color: u32,
) {
    let saved = *canvas;

    canvas.x = terminal.x + TERMINAL_MARGIN_X + terminal.cursor_x;
    canvas.y = terminal.y + TERMINAL_MARGIN_Y + terminal.cursor_y;
    write_text(
        surface,
        font,
        canvas,
        text,
        color,
        terminal.x + TERMINAL_MARGIN_X,
    );
    terminal.cursor_x += GLYPH_WIDTH * text.len() as u32;

    *canvas = saved;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_font() -> (Vec<u8>, FontHandle) {
        let table = vec![0xFFu8; 256 * 2];
        let handle = FontHandle {
            glyphs_ptr: table.as_ptr() as u64,
            glyph_height: 2,
            glyph_count: 256,
        };
        (table, handle)
    }

    #[test]
    fn writes_at_window_origin_plus_margins_plus_cursor() {
        let (_t, font) = test_font();
        let mut buf = vec![0u32; 256 * 128];
        let mut s = unsafe { Surface::from_raw_parts(buf.as_mut_ptr(), 256, 128, 256) };
        let mut canvas = Canvas { x: 7, y: 9 };
        let mut term = Terminal {
            x: 40,
            y: 20,
            width: 100,
            height: 60,
            cursor_x: 8,
            cursor_y: 4,
        };

        term_write(&mut s, &font, &mut canvas, &mut term, b"x", 0xFF12_3456);

        // Pen position during the write: window origin + margins + cursor;
        // glyph pixels one glyph width further right.
        let pen_x = 40 + TERMINAL_MARGIN_X + 8;
        let pen_y = 20 + TERMINAL_MARGIN_Y + 4;
        assert_eq!(s.get(pen_x + GLYPH_WIDTH, pen_y), 0xFF12_3456);
    }

    #[test]
    fn canvas_pen_is_restored() {
        let (_t, font) = test_font();
        let mut buf = vec![0u32; 256 * 128];
        let mut s = unsafe { Surface::from_raw_parts(buf.as_mut_ptr(), 256, 128, 256) };
        let mut canvas = Canvas { x: 7, y: 9 };
        let mut term = Terminal {
            x: 0,
            y: 0,
            width: 100,
            height: 60,
            cursor_x: 0,
            cursor_y: 0,
        };

        term_write(&mut s, &font, &mut canvas, &mut term, b"abc", 0xFFFF_FFFF);
        assert_eq!((canvas.x, canvas.y), (7, 9));
    }

    #[test]
    fn cursor_advances_per_byte_even_for_newlines() {
        let (_t, font) = test_font();
        let mut buf = vec![0u32; 256 * 128];
        let mut s = unsafe { Surface::from_raw_parts(buf.as_mut_ptr(), 256, 128, 256) };
        let mut canvas = Canvas { x: 0, y: 0 };
        let mut term = Terminal {
            x: 0,
            y: 0,
            width: 100,
            height: 60,
            cursor_x: 0,
            cursor_y: 0,
        };

        term_write(&mut s, &font, &mut canvas, &mut term, b"a\nb", 0xFFFF_FFFF);
        // Three bytes, three glyph widths; the newline is not special at
        // the terminal level.
        assert_eq!(term.cursor_x, 3 * GLYPH_WIDTH);
        assert_eq!(term.cursor_y, 0);
    }
}
