//! # UEFI Pre-Boot Stage
//!
//! This UEFI application boots the system: it loads the kernel image and
//! the graphical assets from the boot volume, initializes the linear
//! framebuffer, renders the early boot menu, and transfers control to the
//! kernel together with the handoff record: the hardware description plus
//! the table of rendering services that keep working after the transfer.
//!
//! ## Boot Sequence
//!
//! ```text
//! UEFI Firmware Boot
//!         ↓
//! ┌─────────────────────────────────────────────┐
//! │              UEFI Loader                    │
//! ├─────────────────────────────────────────────┤
//! │  1. Environment Setup                       │
//! │     • Initialize logging and allocator      │
//! │  2. Kernel Loading                          │
//! │     • Parse kernel.elf, place PT_LOAD       │
//! │       segments at their load addresses      │
//! │  3. Graphics & Assets                       │
//! │     • Pick a GOP mode, describe the         │
//! │       framebuffer                           │
//! │     • Decode font (PSF1) and wallpaper      │
//! │       (BMP); failures degrade gracefully    │
//! │  4. First Frame                             │
//! │     • Compose wallpaper, render boot menu   │
//! │  5. Handoff                                 │
//! │     • Assemble the record, capture service  │
//! │       pointers                              │
//! │     • Exit boot services, translate the     │
//! │       memory map                            │
//! │     • Switch stacks and jump to the kernel  │
//! └─────────────────────────────────────────────┘
//!         ↓
//! Kernel Entry (identity-mapped)
//! ```
//!
//! ## Failure Policy
//!
//! Asset failures (font, wallpaper) disable their services and boot
//! continues. Anything that prevents basic graphics or memory state (no
//! kernel image, no GOP, allocation failure) halts with interrupts masked
//! after a diagnostic; there is nothing to recover into yet.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![no_main]
#![allow(unsafe_code, dead_code)]
extern crate alloc;

mod config;
mod elf;
mod file_system;
mod framebuffer;
mod handoff;
mod logger;
mod memory;
mod tracing;
mod uefi_mmap;

use crate::elf::KernelImage;
use crate::file_system::load_file;
use crate::framebuffer::get_framebuffer;
use crate::handoff::build_record;
use crate::logger::UefiLogger;
use alloc::boxed::Box;
#[cfg(feature = "wallpaper")]
use kernel_assets::bmp::BmpImage;
use kernel_assets::psf::Psf1Font;
use kernel_gfx::Surface;
use kernel_gfx::blit::render_wallpaper;
use kernel_gfx::terminal::term_write;
use kernel_gfx::text::LINE_HEIGHT;
use kernel_gfx::window::{WindowKind, render_terminal_window};
use kernel_handoff::boot::{Canvas, FontHandle, HandoffRecord, ImageHandle, Terminal};
use log::{LevelFilter, info, warn};
use uefi::Status;
use uefi::prelude::*;

#[entry]
#[allow(clippy::too_many_lines)]
fn efi_main() -> Status {
    // Initialize logging and allocator helpers
    if uefi::helpers::init().is_err() {
        return Status::UNSUPPORTED;
    }

    let logger = UefiLogger::new(LevelFilter::Debug);
    let logger = logger.init().expect("logger init");

    info!("UEFI loader starting");
    info!("Attempting to load kernel.elf ...");

    let kernel_bytes = match load_file(config::KERNEL_PATH) {
        Ok(bytes) => bytes,
        Err(status) => die(status, &format_args!("failed to load kernel.elf")),
    };

    // Parse ELF64, collect PT_LOAD segments and the entry address
    let image = match KernelImage::parse(&kernel_bytes) {
        Ok(image) => image,
        Err(e) => {
            log::error!("kernel.elf rejected: {e}");
            die(e.into(), &format_args!("not a loadable kernel image"))
        }
    };

    info!("Loading kernel segments into memory ...");
    let entry = match image.load(&kernel_bytes) {
        Ok(entry) => entry,
        Err(e) => {
            log::error!("failed to place kernel segments: {e}");
            die(e.into(), &format_args!("kernel segments not loadable"))
        }
    };
    info!(
        "kernel.elf loaded: entry={entry:#x}, segments={}",
        image.segments.len()
    );
    drop(kernel_bytes);

    let fb = match get_framebuffer() {
        Ok(fb) => fb,
        Err(status) => die(status, &format_args!("no usable framebuffer")),
    };

    // Assets: failures here disable features, never the boot.
    let font = load_font();
    let wallpaper = load_wallpaper();

    // First frame: wallpaper, then the boot menu on top.
    // SAFETY: the GOP mode was just set; the descriptor is live.
    let mut surface = unsafe { Surface::from_descriptor(&fb) };
    let mut canvas = Canvas { x: 0, y: 0 };
    let mut terminal = Terminal {
        x: 0,
        y: 0,
        width: 0,
        height: 0,
        cursor_x: 0,
        cursor_y: 0,
    };

    render_wallpaper(&mut surface, &wallpaper);
    render_terminal_window(
        &mut surface,
        &font,
        &mut canvas,
        &mut terminal,
        WindowKind::BootMenu,
        config::MENU_ORIGIN.0,
        config::MENU_ORIGIN.1,
        Some(config::MENU_TITLE),
        cfg!(feature = "outline"),
        config::ACCENT_COLOR,
    );
    for label in config::MENU_ENTRIES {
        term_write(
            &mut surface,
            &font,
            &mut canvas,
            &mut terminal,
            label,
            config::TEXT_COLOR,
        );
        // The terminal cursor does not track lines; the caller manages
        // the layout.
        terminal.cursor_x = 0;
        terminal.cursor_y += LINE_HEIGHT;
    }

    let stack_top = memory::alloc_kernel_stack(config::KERNEL_STACK_SIZE);

    // Heap-allocate and leak the record; the pool pages are LOADER_DATA
    // and stay mapped for the kernel.
    let record = Box::leak(Box::new(build_record(
        fb, font, wallpaper, canvas, terminal,
    )));
    info!("Handoff record at {:p}", core::ptr::from_ref(record));

    logger.exit_boot_services();
    record.memory_map = match uefi_mmap::exit_boot_services() {
        Ok(map) => map,
        Err(status) => die(status, &format_args!("memory map capture failed")),
    };

    #[cfg(feature = "verbose-dump")]
    tracing::trace_record(record);

    // Off we pop.
    unsafe { switch_to_kernel(entry, core::ptr::from_mut(record), stack_top) }
}

/// Load and decode the console font; unavailable or corrupt fonts yield
/// the empty handle.
fn load_font() -> FontHandle {
    let bytes = match load_file(config::FONT_PATH) {
        Ok(bytes) => bytes,
        Err(status) if status == Status::NOT_FOUND => {
            warn!("Font unavailable: {} not found", config::FONT_PATH);
            return FontHandle::EMPTY;
        }
        Err(status) => {
            warn!("Font unavailable: read failed ({status:?})");
            return FontHandle::EMPTY;
        }
    };
    match Psf1Font::decode(&bytes) {
        Ok(font) => {
            info!(
                "Font loaded: {} glyphs, {} px tall",
                font.glyph_count, font.glyph_height
            );
            let (height, count) = (font.glyph_height, font.glyph_count);
            let glyphs = font.into_glyphs().leak();
            FontHandle {
                glyphs_ptr: glyphs.as_ptr() as u64,
                glyph_height: u32::from(height),
                glyph_count: u32::from(count),
            }
        }
        Err(e) => {
            warn!("Font corrupt: {e}");
            FontHandle::EMPTY
        }
    }
}

/// Load and decode the wallpaper; unavailable or corrupt images yield the
/// empty handle.
#[cfg(feature = "wallpaper")]
fn load_wallpaper() -> ImageHandle {
    let bytes = match load_file(config::WALLPAPER_PATH) {
        Ok(bytes) => bytes,
        Err(status) if status == Status::NOT_FOUND => {
            warn!("Wallpaper unavailable: {} not found", config::WALLPAPER_PATH);
            return ImageHandle::EMPTY;
        }
        Err(status) => {
            warn!("Wallpaper unavailable: read failed ({status:?})");
            return ImageHandle::EMPTY;
        }
    };
    match BmpImage::decode(&bytes) {
        Ok(image) => {
            info!("Wallpaper loaded: {}x{} px", image.width, image.height);
            let (width, height, bpp) = (image.width, image.height, image.bits_per_pixel);
            let pixels = image.into_pixels().leak();
            ImageHandle {
                pixels_ptr: pixels.as_ptr() as u64,
                width,
                height,
                bits_per_pixel: u32::from(bpp),
            }
        }
        Err(e) => {
            warn!("Wallpaper corrupt: {e}");
            ImageHandle::EMPTY
        }
    }
}

/// Wallpaper disabled at build time; same empty handle as a missing file.
#[cfg(not(feature = "wallpaper"))]
fn load_wallpaper() -> ImageHandle {
    ImageHandle::EMPTY
}

/// Fatal-path halt: emit the diagnostic, then stop with interrupts
/// masked.
#[cold]
fn die(status: Status, msg: &core::fmt::Arguments) -> ! {
    log::error!("[fatal] {msg} ({status:?})");
    halt()
}

/// Mask interrupts and halt forever.
fn halt() -> ! {
    unsafe {
        loop {
            core::arch::asm!("cli", "hlt", options(nomem, nostack));
        }
    }
}

/// Enter the kernel.
/// - `entry`: kernel entry physical address (identity-mapped)
/// - `record`: the handoff record (identity-mapped `LOADER_DATA`)
/// - `stack_top`: top of the kernel's initial stack
///
/// The `win64` entry contract puts the record pointer in `RCX`. No CR3
/// switch happens here: the firmware's identity mapping stays active,
/// which is what keeps the record's service pointers (loader code)
/// callable after the jump.
#[inline(never)]
unsafe fn switch_to_kernel(entry: u64, record: *mut HandoffRecord, stack_top: u64) -> ! {
    info!("Loader is about to jump into kernel land. Ciao Kakao ...");
    unsafe {
        core::arch::asm!(
            "cli",
            // Set up the kernel stack
            "mov    rsp, rdx",
            // First argument under win64: RCX = record pointer
            "mov    rcx, rsi",
            // Align RSP down to 16-byte boundary
            "and    rsp, -16",
            // Emulate a CALL by pushing a dummy return address (the
            // kernel entry never returns)
            "push   0",
            "jmp    rdi",
            in("rdi") entry,
            in("rsi") record as u64,
            in("rdx") stack_top,
            options(noreturn)
        )
    }
}
