//! # Handoff Record Assembly and Service Shims
//!
//! Builds the record passed to the kernel and provides the `extern "C"`
//! entry points captured into its service table.
//!
//! Every shim takes the record pointer as its first argument and rebuilds
//! its drawing state from it; there is no ambient global to reach for.
//! The shims stay valid across the transfer because the loader image
//! (`LOADER_CODE`/`LOADER_DATA`) remains identity-mapped; the loader
//! never switches address spaces.

use crate::config;
use kernel_gfx::Surface;
use kernel_gfx::blit::render_wallpaper;
use kernel_gfx::terminal::term_write;
use kernel_gfx::text::write_text;
use kernel_gfx::window::{WindowKind, render_terminal_window};
use kernel_handoff::boot::{
    Canvas, FontHandle, FramebufferDescriptor, HandoffRecord, ImageHandle, ServiceTable,
    TermWriteFn, Terminal, TerminalRenderFn, TextWriteFn, WallpaperFn,
};
use kernel_handoff::memory::MemoryMap;

/// Whether window outlines are drawn; a build-time switch.
const DRAW_OUTLINE: bool = cfg!(feature = "outline");

/// Assemble the handoff record.
///
/// Service entries are offered only when the assets they need loaded:
/// both wallpaper services require the wallpaper, both text services
/// require the font. The terminal-window renderer needs neither (it only
/// darkens and outlines), so it is always offered.
pub fn build_record(
    framebuffer: FramebufferDescriptor,
    font: FontHandle,
    wallpaper: ImageHandle,
    canvas: Canvas,
    terminal: Terminal,
) -> HandoffRecord {
    let mut services = ServiceTable::EMPTY;
    services.render_terminal = Some(svc_render_terminal as TerminalRenderFn);
    if wallpaper.is_available() {
        services.render_wallpaper = Some(svc_render_wallpaper as WallpaperFn);
        services.refresh_wallpaper = Some(svc_refresh_wallpaper as WallpaperFn);
    }
    if font.is_available() {
        services.write_text = Some(svc_write_text as TextWriteFn);
        services.term_write = Some(svc_term_write as TermWriteFn);
    }

    HandoffRecord {
        framebuffer,
        memory_map: MemoryMap::EMPTY,
        font,
        wallpaper,
        canvas,
        terminal,
        services,
    }
}

/// Render the full wallpaper composition.
///
/// # Safety
/// `record` must point to the live handoff record.
pub unsafe extern "C" fn svc_render_wallpaper(record: *mut HandoffRecord) {
    let Some(record) = (unsafe { record.as_mut() }) else {
        return;
    };
    // SAFETY: the record's framebuffer descriptor stays valid for the
    // lifetime of the system.
    let mut surface = unsafe { Surface::from_descriptor(&record.framebuffer) };
    render_wallpaper(&mut surface, &record.wallpaper);
}

/// Redraw the wallpaper over whatever is on screen.
///
/// # Safety
/// `record` must point to the live handoff record.
pub unsafe extern "C" fn svc_refresh_wallpaper(record: *mut HandoffRecord) {
    // A refresh is a full recomposition; the placements are fixed, so
    // redrawing them is the cheapest correct thing.
    unsafe { svc_render_wallpaper(record) }
}

/// Render the terminal window at `(x, y)` as a plain (non-menu) window.
///
/// # Safety
/// `record` must point to the live handoff record.
pub unsafe extern "C" fn svc_render_terminal(record: *mut HandoffRecord, x: u32, y: u32) {
    let Some(record) = (unsafe { record.as_mut() }) else {
        return;
    };
    // SAFETY: as in `svc_render_wallpaper`.
    let mut surface = unsafe { Surface::from_descriptor(&record.framebuffer) };
    render_terminal_window(
        &mut surface,
        &record.font,
        &mut record.canvas,
        &mut record.terminal,
        WindowKind::Plain,
        x,
        y,
        None,
        DRAW_OUTLINE,
        config::ACCENT_COLOR,
    );
}

/// Raw text emission at the canvas pen.
///
/// # Safety
/// `record` must point to the live handoff record and `text`/`len` must
/// describe a readable byte range.
pub unsafe extern "C" fn svc_write_text(
    record: *mut HandoffRecord,
    text: *const u8,
    len: usize,
    color: u32,
    restore_x: u32,
) {
    let Some(record) = (unsafe { record.as_mut() }) else {
        return;
    };
    if text.is_null() {
        return;
    }
    // SAFETY: caller contract.
    let text = unsafe { core::slice::from_raw_parts(text, len) };
    let mut surface = unsafe { Surface::from_descriptor(&record.framebuffer) };
    write_text(
        &mut surface,
        &record.font,
        &mut record.canvas,
        text,
        color,
        restore_x,
    );
}

/// Terminal text emission at the terminal cursor.
///
/// # Safety
/// `record` must point to the live handoff record and `text`/`len` must
/// describe a readable byte range.
pub unsafe extern "C" fn svc_term_write(
    record: *mut HandoffRecord,
    text: *const u8,
    len: usize,
    color: u32,
) {
    let Some(record) = (unsafe { record.as_mut() }) else {
        return;
    };
    if text.is_null() {
        return;
    }
    // SAFETY: caller contract.
    let text = unsafe { core::slice::from_raw_parts(text, len) };
    let mut surface = unsafe { Surface::from_descriptor(&record.framebuffer) };
    term_write(
        &mut surface,
        &record.font,
        &mut record.canvas,
        &mut record.terminal,
        text,
        color,
    );
}
