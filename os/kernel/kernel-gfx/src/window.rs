//! # Window Rendering
//!
//! A window is a darkened rectangle over whatever is on screen, with an
//! optional outline and an optional centered title. The rectangle's size
//! is fixed at [`WINDOW_WIDTH`] × [`WINDOW_HEIGHT`]; callers position
//! windows but do not size them (a current limitation, not an oversight).

use crate::surface::{Surface, blend_over};
use crate::terminal::{TERMINAL_MARGIN_X, term_write};
use crate::text::GLYPH_WIDTH;
use kernel_handoff::boot::{Canvas, FontHandle, Terminal};

/// Fixed window extent.
pub const WINDOW_WIDTH: u32 = 480;
pub const WINDOW_HEIGHT: u32 = 300;

/// Outline inset for the root boot-menu window.
pub const OUTLINE_INSET_ROOT: u32 = 10;

/// Outline inset for plain windows.
pub const OUTLINE_INSET_PLAIN: u32 = 4;

/// Vertical gap the body text area leaves below a rendered title.
pub const TITLE_GAP: u32 = 28;

/// What kind of window is being rendered; decides the outline inset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowKind {
    /// The root boot-menu window.
    BootMenu,
    /// Any other window.
    Plain,
}

impl WindowKind {
    const fn outline_inset(self) -> u32 {
        match self {
            Self::BootMenu => OUTLINE_INSET_ROOT,
            Self::Plain => OUTLINE_INSET_PLAIN,
        }
    }
}

/// Render the terminal window at `(x, y)`.
///
/// Repositions the terminal to the new origin with its cursor reset,
/// darkens the fixed-size rectangle via [`blend_over`], draws the outline
/// when requested, and emits the centered title (when given and a font is
/// available) through terminal text emission, leaving the terminal cursor
/// at the first body line.
#[allow(clippy::too_many_arguments)]
pub fn render_terminal_window(
    surface: &mut Surface,
    font: &FontHandle,
    canvas: &mut Canvas,
    terminal: &mut Terminal,
    kind: WindowKind,
    x: u32,
    y: u32,
    title: Option<&[u8]>,
    draw_outline: bool,
    outline_color: u32,
) {
    terminal.x = x;
    terminal.y = y;
    terminal.width = WINDOW_WIDTH;
    terminal.height = WINDOW_HEIGHT;
    terminal.cursor_x = 0;
    terminal.cursor_y = 0;

    darken_rect(surface, x, y, WINDOW_WIDTH, WINDOW_HEIGHT);

    if draw_outline {
        draw_rect_outline(
            surface,
            x,
            y,
            WINDOW_WIDTH,
            WINDOW_HEIGHT,
            kind.outline_inset(),
            outline_color,
        );
    }

    if let Some(title) = title {
        if font.is_available() {
            // Center the title by steering the terminal cursor to the
            // midpoint, then hand the cursor back to the body area.
            let title_px = GLYPH_WIDTH * title.len() as u32;
            let centered = (WINDOW_WIDTH.saturating_sub(title_px)) / 2;
            terminal.cursor_x = centered.saturating_sub(TERMINAL_MARGIN_X);
            term_write(surface, font, canvas, terminal, title, outline_color);
            terminal.cursor_x = 0;
            terminal.cursor_y = TITLE_GAP;
        }
    }
}

/// Darken every pixel of the rectangle against the fixed backdrop.
fn darken_rect(surface: &mut Surface, x: u32, y: u32, w: u32, h: u32) {
    for row in y..y + h {
        for col in x..x + w {
            let darkened = blend_over(surface.get(col, row));
            surface.put(col, row, darkened);
        }
    }
}

/// Four one-pixel edges inset from the rectangle bounds.
fn draw_rect_outline(
    surface: &mut Surface,
    x: u32,
    y: u32,
    w: u32,
    h: u32,
    inset: u32,
    color: u32,
) {
    let left = x + inset;
    let right = x + w - 1 - inset;
    let top = y + inset;
    let bottom = y + h - 1 - inset;

    for col in left..=right {
        surface.put(col, top, color);
        surface.put(col, bottom, color);
    }
    for row in top..=bottom {
        surface.put(left, row, color);
        surface.put(right, row, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::BLEND_BACKDROP;

    const W: u32 = 640;
    const H: u32 = 400;

    fn make_state() -> (Canvas, Terminal) {
        (
            Canvas { x: 0, y: 0 },
            Terminal {
                x: 0,
                y: 0,
                width: 0,
                height: 0,
                cursor_x: 0,
                cursor_y: 0,
            },
        )
    }

    #[test]
    fn darkens_the_fixed_rect_and_repositions_terminal() {
        let mut buf = vec![0xFFFF_FFFFu32; (W * H) as usize];
        let mut s = unsafe { Surface::from_raw_parts(buf.as_mut_ptr(), W, H, W) };
        let (mut canvas, mut term) = make_state();

        render_terminal_window(
            &mut s,
            &FontHandle::EMPTY,
            &mut canvas,
            &mut term,
            WindowKind::Plain,
            20,
            30,
            None,
            false,
            0,
        );

        assert_eq!((term.x, term.y), (20, 30));
        assert_eq!((term.width, term.height), (WINDOW_WIDTH, WINDOW_HEIGHT));
        assert_eq!((term.cursor_x, term.cursor_y), (0, 0));

        // Inside: white at full alpha darkens to the even split.
        assert_eq!(s.get(20, 30), 0xFF7F_7F7F);
        assert_eq!(
            s.get(20 + WINDOW_WIDTH - 1, 30 + WINDOW_HEIGHT - 1),
            0xFF7F_7F7F
        );
        // Outside: untouched.
        assert_eq!(s.get(19, 30), 0xFFFF_FFFF);
        assert_eq!(s.get(20 + WINDOW_WIDTH, 30), 0xFFFF_FFFF);
    }

    #[test]
    fn outline_inset_differs_by_window_kind() {
        for (kind, inset) in [
            (WindowKind::BootMenu, OUTLINE_INSET_ROOT),
            (WindowKind::Plain, OUTLINE_INSET_PLAIN),
        ] {
            let mut buf = vec![0u32; (W * H) as usize];
            let mut s = unsafe { Surface::from_raw_parts(buf.as_mut_ptr(), W, H, W) };
            let (mut canvas, mut term) = make_state();

            render_terminal_window(
                &mut s,
                &FontHandle::EMPTY,
                &mut canvas,
                &mut term,
                kind,
                0,
                0,
                None,
                true,
                0xFF00_FF00,
            );

            assert_eq!(s.get(inset, inset), 0xFF00_FF00);
            assert_eq!(s.get(WINDOW_WIDTH - 1 - inset, inset), 0xFF00_FF00);
            assert_eq!(s.get(inset, WINDOW_HEIGHT - 1 - inset), 0xFF00_FF00);
            // One pixel inward of the outline: darkened black, not outline.
            assert_eq!(s.get(inset + 1, inset + 1), BLEND_BACKDROP);
        }
    }

    #[test]
    fn darkening_all_black_region_stays_black() {
        let mut buf = vec![0u32; (W * H) as usize];
        let mut s = unsafe { Surface::from_raw_parts(buf.as_mut_ptr(), W, H, W) };
        let (mut canvas, mut term) = make_state();

        render_terminal_window(
            &mut s,
            &FontHandle::EMPTY,
            &mut canvas,
            &mut term,
            WindowKind::Plain,
            0,
            0,
            None,
            false,
            0,
        );
        // Alpha-0 pixels collapse to the opaque backdrop.
        assert_eq!(s.get(1, 1), BLEND_BACKDROP);
    }
}
