//! # PSF1 Font Loader
//!
//! PC Screen Font version 1: a 4-byte header followed immediately by the
//! glyph table. Glyphs are 8 pixels wide, `charsize` rows tall, one byte
//! per row with bit 7 as the leftmost pixel. The mode byte's low bit
//! selects a 512-glyph table instead of the usual 256.

use alloc::vec::Vec;

/// PSF1 magic bytes.
pub const PSF1_MAGIC: [u8; 2] = [0x36, 0x04];

/// Header length: magic, mode, charsize.
const HEADER_LEN: usize = 4;

/// Glyph count without the 512-glyph mode flag.
const GLYPHS_DEFAULT: usize = 256;
const GLYPHS_EXTENDED: usize = 512;

/// PSF1 mode byte.
#[bitfield_struct::bitfield(u8)]
pub struct Psf1Mode {
    /// The font carries 512 glyphs instead of 256.
    #[bits(1)]
    pub extended_table: bool,
    /// A unicode mapping table follows the glyphs (ignored here).
    #[bits(1)]
    pub has_unicode_table: bool,
    /// The unicode table uses sequences (ignored here).
    #[bits(1)]
    pub unicode_sequences: bool,
    #[bits(5)]
    __: u8,
}

/// Decode failures. All of these classify as "asset corrupt"; a missing
/// font file never reaches this decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PsfError {
    /// Input ends inside the header.
    #[error("input too short for PSF1 header ({0} bytes)")]
    Truncated(usize),
    /// The magic bytes are not `0x36 0x04`.
    #[error("bad PSF1 magic")]
    BadMagic,
    /// The glyph table extends past the end of the input.
    #[error("glyph table out of bounds: need {needed} bytes, have {have}")]
    GlyphTableOutOfBounds { needed: usize, have: usize },
}

/// A loaded PSF1 font.
pub struct Psf1Font {
    /// Glyph cell height in pixel rows (`charsize`).
    pub glyph_height: u8,
    /// 256 or 512, per the mode byte.
    pub glyph_count: u16,
    glyphs: Vec<u8>,
}

impl Psf1Font {
    /// Decode a PSF1 font file image.
    ///
    /// The glyph table is sized `charsize * glyph_count` and read in full;
    /// a short input is an error, not a shorter font.
    ///
    /// # Errors
    /// Returns a [`PsfError`] when the magic or the glyph table bounds
    /// fail validation.
    pub fn decode(bytes: &[u8]) -> Result<Self, PsfError> {
        if bytes.len() < HEADER_LEN {
            return Err(PsfError::Truncated(bytes.len()));
        }
        if bytes[0..2] != PSF1_MAGIC {
            return Err(PsfError::BadMagic);
        }

        let mode = Psf1Mode::from_bits(bytes[2]);
        let glyph_height = bytes[3];
        let glyph_count = if mode.extended_table() {
            GLYPHS_EXTENDED
        } else {
            GLYPHS_DEFAULT
        };

        let table_bytes = glyph_height as usize * glyph_count;
        let end = HEADER_LEN + table_bytes;
        if bytes.len() < end {
            return Err(PsfError::GlyphTableOutOfBounds {
                needed: table_bytes,
                have: bytes.len() - HEADER_LEN,
            });
        }

        Ok(Self {
            glyph_height,
            glyph_count: glyph_count as u16,
            glyphs: bytes[HEADER_LEN..end].to_vec(),
        })
    }

    /// The row bytes of one glyph. A `u8` index is always within the
    /// table; the extended half of a 512-glyph font is reachable only
    /// through the raw handle.
    #[must_use]
    pub fn glyph(&self, c: u8) -> &[u8] {
        let h = self.glyph_height as usize;
        let start = c as usize * h;
        &self.glyphs[start..start + h]
    }

    /// Total size of the glyph table in bytes.
    #[must_use]
    pub fn table_len(&self) -> usize {
        self.glyphs.len()
    }

    /// Consume the font, returning the raw glyph table for handoff.
    #[must_use]
    pub fn into_glyphs(self) -> Vec<u8> {
        self.glyphs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_psf(mode: u8, charsize: u8, table_len: usize) -> Vec<u8> {
        let mut out = vec![PSF1_MAGIC[0], PSF1_MAGIC[1], mode, charsize];
        out.extend(core::iter::repeat_n(0u8, table_len));
        out
    }

    #[test]
    fn default_mode_allocates_256_glyphs() {
        let font = Psf1Font::decode(&make_psf(0, 16, 16 * 256)).unwrap();
        assert_eq!(font.glyph_height, 16);
        assert_eq!(font.glyph_count, 256);
        assert_eq!(font.table_len(), 16 * 256);
    }

    #[test]
    fn extended_mode_allocates_512_glyphs() {
        let font = Psf1Font::decode(&make_psf(1, 16, 16 * 512)).unwrap();
        assert_eq!(font.glyph_count, 512);
        assert_eq!(font.table_len(), 16 * 512);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = make_psf(0, 16, 16 * 256);
        bytes[0] = 0x00;
        assert!(matches!(Psf1Font::decode(&bytes), Err(PsfError::BadMagic)));
    }

    #[test]
    fn rejects_short_glyph_table() {
        let bytes = make_psf(0, 16, 16 * 256 - 1);
        assert!(matches!(
            Psf1Font::decode(&bytes),
            Err(PsfError::GlyphTableOutOfBounds { .. })
        ));
    }

    #[test]
    fn rejects_header_truncation() {
        assert!(matches!(
            Psf1Font::decode(&[0x36]),
            Err(PsfError::Truncated(1))
        ));
    }

    #[test]
    fn glyph_rows_are_addressed_by_character_times_height() {
        let mut bytes = make_psf(0, 4, 4 * 256);
        // Mark glyph 'A' (0x41) with a recognizable pattern.
        let start = HEADER_LEN + 0x41 * 4;
        bytes[start..start + 4].copy_from_slice(&[0x18, 0x24, 0x42, 0x81]);
        let font = Psf1Font::decode(&bytes).unwrap();
        assert_eq!(font.glyph(b'A'), &[0x18, 0x24, 0x42, 0x81]);
        assert_eq!(font.glyph(0), &[0, 0, 0, 0]);
    }
}
