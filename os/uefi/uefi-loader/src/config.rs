//! # Build-Time Configuration
//!
//! The loader's configuration surface is fixed at build time: asset paths,
//! menu text, and colors live here; on/off switches (wallpaper, outline,
//! record dump) are Cargo features. Nothing is negotiated at runtime.

use uefi::{CStr16, cstr16};

/// Kernel image on the EFI system partition.
pub const KERNEL_PATH: &CStr16 = cstr16!("\\EFI\\Boot\\kernel.elf");

/// Console font (PSF1).
pub const FONT_PATH: &CStr16 = cstr16!("\\EFI\\Boot\\console.psf");

/// Wallpaper image (24-bit BMP).
pub const WALLPAPER_PATH: &CStr16 = cstr16!("\\EFI\\Boot\\wallpaper.bmp");

/// Boot-menu window origin.
pub const MENU_ORIGIN: (u32, u32) = (80, 60);

/// Boot-menu title, centered in the window.
pub const MENU_TITLE: &[u8] = b"Boot Menu";

/// Menu entry labels, one line each.
pub const MENU_ENTRIES: &[&[u8]] = &[
    b"[1] Continue boot",
    b"[2] Boot fallback image",
    b"[3] Reboot into firmware setup",
];

/// Body text color.
pub const TEXT_COLOR: u32 = 0xFFD0_D0D0;

/// Title and outline color.
pub const ACCENT_COLOR: u32 = 0xFF5F_D7AF;

/// Kernel stack size handed to the entry point.
pub const KERNEL_STACK_SIZE: usize = 64 * 1024;
