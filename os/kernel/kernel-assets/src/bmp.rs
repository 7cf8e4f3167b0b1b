//! # BMP Decoder
//!
//! Decodes the wallpaper format: 24-bit, uncompressed, bottom-up BMP.
//!
//! Field offsets below are the classic `BITMAPFILEHEADER` +
//! `BITMAPINFOHEADER` layout, all fields little-endian. Rows are assumed
//! unpadded (`width * 3` bytes each); wallpapers are authored with widths
//! that make the stride a multiple of four, and anything short of a full
//! unpadded pixel array is rejected rather than guessed at.

use alloc::vec::Vec;

/// File signature, checked byte-wise so the test stays endianness-agnostic.
pub const BMP_SIGNATURE: [u8; 2] = *b"BM";

// BITMAPFILEHEADER
const SIGNATURE_OFFSET: usize = 0;
const DATA_OFFSET_OFFSET: usize = 10;
// BITMAPINFOHEADER
const WIDTH_OFFSET: usize = 18;
const HEIGHT_OFFSET: usize = 22;
const BPP_OFFSET: usize = 28;
const COMPRESSION_OFFSET: usize = 30;

/// Smallest input that still holds both headers.
const MIN_HEADER_LEN: usize = 54;

/// Bytes per pixel in the only supported depth.
const BYTES_PER_PIXEL: usize = 3;

/// Decode failures. All of these classify as "asset corrupt".
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BmpError {
    /// Input ends inside the headers.
    #[error("input too short for BMP headers ({0} bytes)")]
    Truncated(usize),
    /// The two signature bytes are not `BM`.
    #[error("bad BMP signature")]
    BadSignature,
    /// Only 24-bit images are supported.
    #[error("unsupported color depth: {0} bits per pixel")]
    UnsupportedDepth(u16),
    /// Only uncompressed images are supported.
    #[error("unsupported compression method {0}")]
    Compressed(u32),
    /// The pixel array at `data_offset` does not hold
    /// `height * width * 3` bytes.
    #[error("pixel array out of bounds")]
    PixelDataOutOfBounds,
}

/// A decoded 24-bit image.
///
/// `pixels` holds `height` rows of `width` (blue, green, red) triples,
/// bottom-to-top as stored on disk.
pub struct BmpImage {
    pub width: u32,
    pub height: u32,
    pub bits_per_pixel: u16,
    pixels: Vec<u8>,
}

impl BmpImage {
    /// Decode a BMP file image.
    ///
    /// # Errors
    /// Returns a [`BmpError`] when the signature, depth, compression or
    /// pixel array bounds fail validation.
    pub fn decode(bytes: &[u8]) -> Result<Self, BmpError> {
        if bytes.len() < MIN_HEADER_LEN {
            return Err(BmpError::Truncated(bytes.len()));
        }
        if bytes[SIGNATURE_OFFSET..SIGNATURE_OFFSET + 2] != BMP_SIGNATURE {
            return Err(BmpError::BadSignature);
        }

        let data_offset = read_u32_le(bytes, DATA_OFFSET_OFFSET) as usize;
        let width = read_u32_le(bytes, WIDTH_OFFSET);
        let height = read_u32_le(bytes, HEIGHT_OFFSET);
        let bits_per_pixel = read_u16_le(bytes, BPP_OFFSET);
        let compression = read_u32_le(bytes, COMPRESSION_OFFSET);

        if bits_per_pixel != 24 {
            return Err(BmpError::UnsupportedDepth(bits_per_pixel));
        }
        if compression != 0 {
            return Err(BmpError::Compressed(compression));
        }

        let row_bytes = width as usize * BYTES_PER_PIXEL;
        let pixel_bytes = row_bytes
            .checked_mul(height as usize)
            .ok_or(BmpError::PixelDataOutOfBounds)?;
        let end = data_offset
            .checked_add(pixel_bytes)
            .ok_or(BmpError::PixelDataOutOfBounds)?;
        if end > bytes.len() {
            return Err(BmpError::PixelDataOutOfBounds);
        }

        Ok(Self {
            width,
            height,
            bits_per_pixel,
            pixels: bytes[data_offset..end].to_vec(),
        })
    }

    /// One stored row (bottom-up order), `width * 3` bytes of B,G,R
    /// triples.
    #[must_use]
    pub fn row(&self, r: u32) -> &[u8] {
        let row_bytes = self.width as usize * BYTES_PER_PIXEL;
        let start = r as usize * row_bytes;
        &self.pixels[start..start + row_bytes]
    }

    /// The (blue, green, red) triple at column `x` of stored row `r`.
    #[must_use]
    pub fn pixel(&self, x: u32, r: u32) -> (u8, u8, u8) {
        let row = self.row(r);
        let i = x as usize * BYTES_PER_PIXEL;
        (row[i], row[i + 1], row[i + 2])
    }

    /// Consume the image, returning the raw pixel array for handoff.
    #[must_use]
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }
}

fn read_u16_le(bytes: &[u8], offset: usize) -> u16 {
    let mut b = [0u8; 2];
    b.copy_from_slice(&bytes[offset..offset + 2]);
    u16::from_le_bytes(b)
}

fn read_u32_le(bytes: &[u8], offset: usize) -> u32 {
    let mut b = [0u8; 4];
    b.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a minimal well-formed 24-bit BMP from bottom-up rows of
    /// (b, g, r) triples.
    fn make_bmp(width: u32, height: u32, rows: &[&[(u8, u8, u8)]]) -> Vec<u8> {
        let data_offset = MIN_HEADER_LEN as u32;
        let pixel_bytes = width * height * 3;
        let mut out = vec![0u8; MIN_HEADER_LEN];
        out[0..2].copy_from_slice(b"BM");
        out[2..6].copy_from_slice(&(data_offset + pixel_bytes).to_le_bytes());
        out[10..14].copy_from_slice(&data_offset.to_le_bytes());
        out[14..18].copy_from_slice(&40u32.to_le_bytes()); // info header size
        out[18..22].copy_from_slice(&width.to_le_bytes());
        out[22..26].copy_from_slice(&height.to_le_bytes());
        out[26..28].copy_from_slice(&1u16.to_le_bytes()); // planes
        out[28..30].copy_from_slice(&24u16.to_le_bytes());
        out[30..34].copy_from_slice(&0u32.to_le_bytes()); // compression
        for row in rows {
            for &(b, g, r) in *row {
                out.extend([b, g, r]);
            }
        }
        out
    }

    #[test]
    fn roundtrips_dimensions_and_triples() {
        let rows: &[&[(u8, u8, u8)]] = &[
            &[(255, 0, 0), (0, 255, 0)],
            &[(0, 0, 255), (255, 255, 255)],
        ];
        let bytes = make_bmp(2, 2, rows);
        let img = BmpImage::decode(&bytes).unwrap();

        assert_eq!(img.width, 2);
        assert_eq!(img.height, 2);
        assert_eq!(img.bits_per_pixel, 24);
        for (r, row) in rows.iter().enumerate() {
            for (x, &px) in row.iter().enumerate() {
                assert_eq!(img.pixel(x as u32, r as u32), px);
            }
        }
    }

    #[test]
    fn rejects_bad_signature() {
        let mut bytes = make_bmp(1, 1, &[&[(1, 2, 3)]]);
        bytes[0] = b'X';
        assert!(matches!(
            BmpImage::decode(&bytes),
            Err(BmpError::BadSignature)
        ));
    }

    #[test]
    fn rejects_unsupported_depth() {
        let mut bytes = make_bmp(1, 1, &[&[(1, 2, 3)]]);
        bytes[28..30].copy_from_slice(&32u16.to_le_bytes());
        assert!(matches!(
            BmpImage::decode(&bytes),
            Err(BmpError::UnsupportedDepth(32))
        ));
    }

    #[test]
    fn rejects_compressed_images() {
        let mut bytes = make_bmp(1, 1, &[&[(1, 2, 3)]]);
        bytes[30..34].copy_from_slice(&1u32.to_le_bytes());
        assert!(matches!(
            BmpImage::decode(&bytes),
            Err(BmpError::Compressed(1))
        ));
    }

    #[test]
    fn rejects_short_pixel_array() {
        let mut bytes = make_bmp(2, 2, &[&[(0, 0, 0), (0, 0, 0)], &[(0, 0, 0), (0, 0, 0)]]);
        bytes.truncate(bytes.len() - 1);
        assert!(matches!(
            BmpImage::decode(&bytes),
            Err(BmpError::PixelDataOutOfBounds)
        ));
    }

    #[test]
    fn rejects_header_truncation() {
        assert!(matches!(
            BmpImage::decode(&[0u8; 20]),
            Err(BmpError::Truncated(20))
        ));
    }
}
