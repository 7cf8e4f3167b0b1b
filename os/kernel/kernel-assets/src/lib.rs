//! # On-Disk Asset Decoders
//!
//! Decoders for the two asset formats the pre-boot stage reads from the
//! boot volume: 24-bit uncompressed BMP images ([`bmp`]) and PSF1 bitmap
//! fonts ([`psf`]).
//!
//! Both decoders follow the same discipline as the kernel image parser:
//! validate the magic bytes before trusting any other field, bounds-check
//! every offset against the input, and read multi-byte fields with
//! explicit little-endian decoding so no layout or endianness assumption
//! leaks in. A decode either yields a fully populated value or an error;
//! there is no partially populated output.
//!
//! Failure classification is the caller's job: a file that cannot be
//! opened is "asset unavailable", a file that fails these decoders is
//! "asset corrupt". Both leave the corresponding handoff handle in its
//! empty state.

#![cfg_attr(not(any(test, doctest)), no_std)]

extern crate alloc;

pub mod bmp;
pub mod psf;
