//! # Framebuffer Compositor and Console Engine
//!
//! The pixel-level rendering routines both boot stages share: pixel
//! addressing, the fixed-factor darkening blend, glyph rasterization,
//! cursor-tracked text emission, image blitting with edge-extension, window
//! rendering, and the four-placement wallpaper composition.
//!
//! ## Overview
//!
//! Everything draws through [`Surface`], a raw-pointer view of the linear
//! framebuffer built from the [`FramebufferDescriptor`] in the handoff
//! record. The surface owns the single pixel-addressing function
//! (`x + y * stride`); no drawing routine computes an offset any other way,
//! which is what keeps the `stride != width` case correct by construction.
//!
//! The crate has no UEFI dependency and no allocator requirement: the same
//! code runs in the pre-boot stage, runs behind the service table after
//! `ExitBootServices`, and runs in host tests over a plain `Vec<u32>`.
//!
//! ## Module Map
//!
//! | Module | Contents |
//! |---------|----------|
//! | [`surface`] | [`Surface`], pixel addressing, [`blend_over`] |
//! | [`text`] | glyph rasterization, raw text emission |
//! | [`terminal`] | terminal-window text emission |
//! | [`window`] | darkened window rectangle, outline, title |
//! | [`blit`] | image blit, wallpaper composition |
//!
//! [`FramebufferDescriptor`]: kernel_handoff::boot::FramebufferDescriptor
//! [`blend_over`]: surface::blend_over

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

pub mod blit;
pub mod surface;
pub mod terminal;
pub mod text;
pub mod window;

pub use surface::{BLEND_BACKDROP, Surface, blend_over};
pub use text::{GLYPH_WIDTH, LINE_HEIGHT, draw_glyph, write_text};
