//! # Handoff Record and Service Table

use crate::memory::MemoryMap;

/// Kernel entry function pointer.
///
/// # ABI
/// The ABI is defined as `win64` since the kernel is called from a UEFI
/// (PE/COFF) application; the record pointer arrives in `RCX`.
///
/// The pointee is consumed by value: the kernel reads the record into its
/// own frame once and the loader-side storage is never touched again.
pub type KernelEntryFn = extern "win64" fn(*const HandoffRecord) -> !;

/// Everything the kernel needs right after `ExitBootServices`, plus the
/// rendering services the pre-boot stage keeps offering across the
/// transfer.
///
/// Keep this `#[repr(C)]`; field order is the wire format. Both stages
/// compile against this one definition, so there is no version tag (a
/// deliberate single-build simplification).
#[repr(C)]
pub struct HandoffRecord {
    /// Linear framebuffer geometry.
    pub framebuffer: FramebufferDescriptor,

    /// Translated, OS-owned memory map.
    pub memory_map: MemoryMap,

    /// Loaded bitmap font, or [`FontHandle::EMPTY`].
    pub font: FontHandle,

    /// Loaded wallpaper image, or [`ImageHandle::EMPTY`].
    pub wallpaper: ImageHandle,

    /// Free-form text pen used by raw text emission.
    pub canvas: Canvas,

    /// Terminal window state with its independent cursor.
    pub terminal: Terminal,

    /// Nullable rendering entry points offered to the kernel.
    pub services: ServiceTable,
}

/// Linear framebuffer description, from UEFI GOP.
///
/// Pixels are 32-bit `0xAARRGGBB` (GOP BGR byte order plus the reserved
/// byte, read as a little-endian `u32`). `stride` is pixels per scanline
/// and may exceed `width`; all pixel addressing must use `stride`, never
/// `width`, as the row step.
#[repr(C)]
#[derive(Clone)]
pub struct FramebufferDescriptor {
    /// Framebuffer base (CPU physical address, identity-mapped).
    pub base_ptr: u64,

    /// Total framebuffer size in bytes.
    pub size_bytes: u64,

    /// Visible width in pixels.
    pub width: u32,

    /// Visible height in pixels.
    pub height: u32,

    /// Pixels per scanline; `>= width`.
    pub stride: u32,
}

/// A loaded PSF1 bitmap font.
///
/// Each glyph is a fixed 8×`glyph_height` monochrome bitmap, one byte per
/// row, bit 7 being the leftmost pixel. The glyph for character `c` starts
/// at byte offset `c * glyph_height` in the table.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct FontHandle {
    /// Glyph table base, or 0 when no font is available.
    pub glyphs_ptr: u64,

    /// Height of every glyph in pixel rows.
    pub glyph_height: u32,

    /// Number of glyphs in the table (256 or 512).
    pub glyph_count: u32,
}

impl FontHandle {
    /// The well-defined "no font" state. Missing and corrupt fonts both
    /// collapse to this; the handle is never partially populated.
    pub const EMPTY: Self = Self {
        glyphs_ptr: 0,
        glyph_height: 0,
        glyph_count: 0,
    };

    /// Whether a glyph table is present.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.glyphs_ptr != 0
    }
}

/// A decoded 24-bit wallpaper image.
///
/// The pixel array holds `height` rows of `width` (blue, green, red) byte
/// triples with no row padding, stored bottom-to-top as on disk. Blitting
/// compensates for the row order.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct ImageHandle {
    /// Pixel array base, or 0 when no wallpaper is available.
    pub pixels_ptr: u64,

    /// Width in pixels.
    pub width: u32,

    /// Height in pixels.
    pub height: u32,

    /// Bits per pixel; 24 is the only value a loaded handle carries.
    pub bits_per_pixel: u32,
}

impl ImageHandle {
    /// The well-defined "no wallpaper" state.
    pub const EMPTY: Self = Self {
        pixels_ptr: 0,
        width: 0,
        height: 0,
        bits_per_pixel: 0,
    };

    /// Whether a pixel array is present.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.pixels_ptr != 0
    }
}

/// Free-form text pen. Mutated by every character write; callers that
/// manage layout (the terminal) save and restore it around their own
/// emission.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct Canvas {
    pub x: u32,
    pub y: u32,
}

/// Terminal window state: a rendered window plus an independent text
/// cursor relative to it.
///
/// Writes advance `cursor_x` by one glyph width per character and never
/// wrap; newline handling happens at the canvas level, not here.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct Terminal {
    /// Window origin, absolute framebuffer coordinates.
    pub x: u32,
    pub y: u32,

    /// Window extent.
    pub width: u32,
    pub height: u32,

    /// Text cursor, relative to the window's text area.
    pub cursor_x: u32,
    pub cursor_y: u32,
}

/// Renders or refreshes the wallpaper composition.
pub type WallpaperFn = unsafe extern "C" fn(record: *mut HandoffRecord);

/// Renders the terminal window at the given framebuffer origin.
pub type TerminalRenderFn = unsafe extern "C" fn(record: *mut HandoffRecord, x: u32, y: u32);

/// Writes raw text at the canvas pen. `restore_x` is the column the pen
/// returns to after a newline.
pub type TextWriteFn = unsafe extern "C" fn(
    record: *mut HandoffRecord,
    text: *const u8,
    len: usize,
    color: u32,
    restore_x: u32,
);

/// Writes text at the terminal window's cursor.
pub type TermWriteFn =
    unsafe extern "C" fn(record: *mut HandoffRecord, text: *const u8, len: usize, color: u32);

/// The set of rendering capabilities the pre-boot stage offers.
///
/// A `None` entry means "unavailable in this boot configuration"; for
/// example, every text service is absent when no font loaded. Callers must
/// check before invoking. There is no fallback behind a null entry.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct ServiceTable {
    /// Full four-placement wallpaper composition.
    pub render_wallpaper: Option<WallpaperFn>,

    /// Redraws the wallpaper over whatever is on screen.
    pub refresh_wallpaper: Option<WallpaperFn>,

    /// Renders the terminal window (darkened rect, outline, title) and
    /// repositions the terminal to the given origin.
    pub render_terminal: Option<TerminalRenderFn>,

    /// Raw text emission at the canvas pen.
    pub write_text: Option<TextWriteFn>,

    /// Terminal text emission at the terminal cursor.
    pub term_write: Option<TermWriteFn>,
}

impl ServiceTable {
    /// No services offered.
    pub const EMPTY: Self = Self {
        render_wallpaper: None,
        refresh_wallpaper: None,
        render_terminal: None,
        write_text: None,
        term_write: None,
    };
}
