//! # Boot-to-Kernel Handoff Protocol
//!
//! This crate defines the binary contract between the UEFI pre-boot stage
//! and the kernel: the [`HandoffRecord`](boot::HandoffRecord) layout, the
//! nullable [`ServiceTable`](boot::ServiceTable) of rendering entry points,
//! and the OS-owned memory map model together with the translator that
//! produces it from the firmware's descriptor array.
//!
//! ## Overview
//!
//! The loader and the kernel are compiled as separate images but must agree
//! on every field offset of the data passed between them. This crate is the
//! single definition both sides compile against, which is what makes the
//! agreement hold: there is no duplicated struct to drift.
//!
//! The crate is organized into two modules:
//!
//! ### Boot Records ([`boot`])
//! The handoff record and everything embedded in it:
//! * **Framebuffer**: linear framebuffer geometry, `0xAARRGGBB` pixels
//! * **Asset Handles**: loaded font and wallpaper, or a well-defined empty
//!   state when an asset is unavailable
//! * **Console State**: the free-form canvas pen and the terminal window
//!   with its independent cursor
//! * **Service Table**: named rendering capabilities, each either present
//!   or absent
//!
//! ### Memory Model ([`memory`])
//! The closed [`RegionKind`](memory::RegionKind) enumeration, the
//! fixed-layout [`MemoryRegion`](memory::MemoryRegion) descriptor, and
//! [`translate_firmware_map`](memory::translate_firmware_map), which walks
//! the firmware's array by its *reported* stride rather than by any assumed
//! descriptor size.
//!
//! ## ABI Rules
//!
//! * Every boundary-crossing struct is `#[repr(C)]` with fixed-size integer
//!   fields; pointers cross as `u64`.
//! * Tag enums are `#[repr(u32)]` with no payloads.
//! * Service entries are `Option<unsafe extern "C" fn ...>`; the nullable
//!   pointer optimization guarantees these are ABI-compatible with a plain,
//!   possibly-null C function pointer.
//!
//! ## Lifecycle
//!
//! The record is constructed once by the pre-boot stage, consumed by value
//! exactly once by the kernel entry point, and never reconstructed. The
//! service pointers keep working after the transfer because the pre-boot
//! image remains mapped at the same addresses: the loader performs no
//! address-space switch.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

pub mod boot;
pub mod memory;
