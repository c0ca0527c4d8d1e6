//! The GrayBit-7 raster format.
//!
//! A 12-byte header followed by one byte per pixel, row-major:
//!
//! | Offset | Size | Field     | Notes                     |
//! |--------|------|-----------|---------------------------|
//! | 0      | 4    | signature | `47 42 37 1D` ("GB7·")    |
//! | 4      | 1    | version   | `0x01`                    |
//! | 5      | 1    | flags     | bit 0: mask present       |
//! | 6      | 2    | width     | big-endian                |
//! | 8      | 2    | height    | big-endian                |
//! | 10     | 2    | reserved  | written as zero           |
//! | 12     | w·h  | payload   | 7-bit gray + 1 mask bit   |
//!
//! Bits 0–6 of a payload byte hold the gray sample, bit 7 holds the mask bit which is only
//! meaningful when the header flags it as present. Decoding expands the 7-bit sample to 8 bits
//! and writes it to all color channels. Encoding averages the color channels and quantizes alpha
//! into the single mask bit with a threshold, both of which are lossy.
use grayedit_texel::{PixelBuffer, Rgba};
use serde::{Deserialize, Serialize};

/// The magic bytes at the start of every file.
pub const SIGNATURE: [u8; 4] = [0x47, 0x42, 0x37, 0x1D];
/// The only supported format version.
pub const VERSION: u8 = 0x01;
/// Size of the fixed header.
pub const HEADER_SIZE: usize = 12;
/// Conventional file extension.
pub const EXTENSION: &str = "gb7";

const FLAG_MASK: u8 = 0x01;
const GRAY_BITS: u8 = 0x7F;
const MASK_BIT: u8 = 0x80;
/// Alpha values above this are encoded as opaque.
const MASK_THRESHOLD: u8 = 127;

/// Header fields of a decoded file.
///
/// The editor shell persists this between page loads as an opaque blob, see
/// [`FormatMetadata::to_blob`]. Encoding never reuses it, every header field is derived from the
/// buffer being written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormatMetadata {
    pub signature: [u8; 4],
    pub version: u8,
    pub has_mask: bool,
    pub width: u16,
    pub height: u16,
    pub reserved: u16,
    /// Byte length of the decoded input, including any trailing data.
    pub original_size: usize,
}

/// A decoded image and its header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    pub buffer: PixelBuffer,
    pub metadata: FormatMetadata,
}

/// Header-only summary of a file, see [`file_info`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FileInfo {
    pub version: u8,
    pub has_mask: bool,
    pub width: u16,
    pub height: u16,
    pub file_size: usize,
    pub data_size: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// The data is not a GrayBit-7 file. Callers should try another decoder.
    #[error("not a GrayBit-7 file")]
    BadSignature,
    #[error("unsupported GrayBit-7 version {0}")]
    UnsupportedVersion(u8),
    #[error("insufficient image data, expected {expected} bytes but got {actual}")]
    TruncatedData { expected: usize, actual: usize },
    #[error("a {width}x{height} image does not fit the 16-bit GrayBit-7 header")]
    DimensionsTooLarge { width: u32, height: u32 },
}

impl FormatError {
    /// Whether the error only means the data belongs to some other format.
    pub fn is_foreign_format(&self) -> bool {
        matches!(self, FormatError::BadSignature)
    }
}

impl FormatMetadata {
    /// Serialize for the key-value storage of the editor shell.
    pub fn to_blob(&self) -> String {
        // A struct of plain integers and booleans always serializes.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Restore metadata previously written by [`FormatMetadata::to_blob`].
    pub fn from_blob(blob: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(blob)
    }
}

/// Whether `bytes` start with a complete GrayBit-7 header signature.
pub fn probe(bytes: &[u8]) -> bool {
    bytes.len() >= HEADER_SIZE && bytes[..4] == SIGNATURE
}

/// Inspect the header without decoding the payload.
pub fn file_info(bytes: &[u8]) -> Option<FileInfo> {
    if !probe(bytes) {
        return None;
    }

    let header = Header::parse(bytes);
    Some(FileInfo {
        version: header.version,
        has_mask: header.has_mask(),
        width: header.width,
        height: header.height,
        file_size: bytes.len(),
        data_size: bytes.len() - HEADER_SIZE,
    })
}

/// Decode a complete file into an RGBA buffer.
///
/// Fails with [`FormatError::BadSignature`] when the data is of another format, in which case
/// the caller falls back to a platform decoder. Any bytes beyond the payload are ignored.
pub fn decode(bytes: &[u8]) -> Result<DecodedImage, FormatError> {
    if bytes.len() < SIGNATURE.len() || bytes[..4] != SIGNATURE {
        return Err(FormatError::BadSignature);
    }

    if bytes.len() < HEADER_SIZE {
        return Err(FormatError::TruncatedData {
            expected: HEADER_SIZE,
            actual: bytes.len(),
        });
    }

    let header = Header::parse(bytes);
    log::debug!(
        "GrayBit-7 header: version {}, flags {:#04x}, {}x{}, reserved {:#06x}",
        header.version,
        header.flags,
        header.width,
        header.height,
        header.reserved,
    );

    if header.version != VERSION {
        return Err(FormatError::UnsupportedVersion(header.version));
    }

    let expected = usize::from(header.width) * usize::from(header.height);
    let payload = &bytes[HEADER_SIZE..];
    if payload.len() < expected {
        return Err(FormatError::TruncatedData {
            expected,
            actual: payload.len(),
        });
    }

    let has_mask = header.has_mask();
    let mut buffer = PixelBuffer::new(header.width.into(), header.height.into());
    for (pixel, &byte) in buffer.as_texels_mut().iter_mut().zip(payload) {
        let gray = expand_gray7(byte & GRAY_BITS);
        let alpha = if !has_mask || byte & MASK_BIT != 0 {
            0xff
        } else {
            0
        };
        *pixel = Rgba::gray(gray, alpha);
    }

    Ok(DecodedImage {
        buffer,
        metadata: FormatMetadata {
            signature: SIGNATURE,
            version: header.version,
            has_mask,
            width: header.width,
            height: header.height,
            reserved: header.reserved,
            original_size: bytes.len(),
        },
    })
}

/// Encode a buffer, optionally storing a 1-bit mask derived from alpha.
///
/// Gray is the rounded mean of the color channels. With `include_mask`, a pixel is marked
/// visible when its alpha is above 127; partial transparency is lost.
pub fn encode(buffer: &PixelBuffer, include_mask: bool) -> Result<Vec<u8>, FormatError> {
    let too_large = || FormatError::DimensionsTooLarge {
        width: buffer.width(),
        height: buffer.height(),
    };
    let width = u16::try_from(buffer.width()).map_err(|_| too_large())?;
    let height = u16::try_from(buffer.height()).map_err(|_| too_large())?;

    let mut out = Vec::with_capacity(HEADER_SIZE + buffer.len());
    out.extend_from_slice(&SIGNATURE);
    out.push(VERSION);
    out.push(if include_mask { FLAG_MASK } else { 0 });
    out.extend_from_slice(&width.to_be_bytes());
    out.extend_from_slice(&height.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());

    out.extend(buffer.as_texels().iter().map(|&pixel| {
        let mut byte = quantize_gray7(average_gray(pixel)) & GRAY_BITS;
        if include_mask && pixel.a() > MASK_THRESHOLD {
            byte |= MASK_BIT;
        }
        byte
    }));

    Ok(out)
}

/// Encode with a mask exactly when the buffer has any transparency.
pub fn encode_auto(buffer: &PixelBuffer) -> Result<Vec<u8>, FormatError> {
    encode(buffer, buffer.has_transparency())
}

/// The 7-bit gray value a pipette shows for an image loaded from this format.
pub fn gray7_label(pixel: Rgba) -> String {
    format!("Gray: {}/127", quantize_gray7(pixel.r()))
}

/// `round(gray * 255 / 127)`, exact in integers as the quotient never ends in `.5`.
pub(crate) fn expand_gray7(gray: u8) -> u8 {
    ((2 * u32::from(gray) * 255 + 127) / 254) as u8
}

/// `round(gray * 127 / 255)`, exact in integers as the quotient never ends in `.5`.
pub(crate) fn quantize_gray7(gray: u8) -> u8 {
    ((2 * u32::from(gray) * 127 + 255) / 510) as u8
}

/// `round((r + g + b) / 3)`.
fn average_gray(pixel: Rgba) -> u8 {
    let sum: u32 = pixel.rgb().iter().map(|&c| u32::from(c)).sum();
    ((2 * sum + 3) / 6) as u8
}

struct Header {
    version: u8,
    flags: u8,
    width: u16,
    height: u16,
    reserved: u16,
}

impl Header {
    /// Read the fields of a header, `bytes` must hold at least [`HEADER_SIZE`] bytes.
    fn parse(bytes: &[u8]) -> Self {
        let be16 = |at: usize| u16::from_be_bytes([bytes[at], bytes[at + 1]]);
        Header {
            version: bytes[4],
            flags: bytes[5],
            width: be16(6),
            height: be16(8),
            reserved: be16(10),
        }
    }

    fn has_mask(&self) -> bool {
        self.flags & FLAG_MASK != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(version: u8, flags: u8, width: u16, height: u16) -> Vec<u8> {
        let mut bytes = SIGNATURE.to_vec();
        bytes.push(version);
        bytes.push(flags);
        bytes.extend_from_slice(&width.to_be_bytes());
        bytes.extend_from_slice(&height.to_be_bytes());
        bytes.extend_from_slice(&[0, 0]);
        bytes
    }

    #[test]
    fn white_two_by_two() {
        let white = PixelBuffer::filled(2, 2, Rgba::WHITE);
        let bytes = encode(&white, false).unwrap();

        assert_eq!(
            bytes,
            [0x47, 0x42, 0x37, 0x1D, 1, 0, 0, 2, 0, 2, 0, 0, 0x7F, 0x7F, 0x7F, 0x7F]
        );
        // Header plus one byte for each of the four pixels.
        assert_eq!(bytes.len(), HEADER_SIZE + 4);
    }

    #[test]
    fn decode_expands_gray() {
        let mut bytes = header(1, 0, 3, 1);
        bytes.extend_from_slice(&[0, 64, 127]);

        let decoded = decode(&bytes).unwrap();
        let pixels = decoded.buffer.as_texels();
        assert_eq!(pixels[0], Rgba::gray(0, 255));
        // round(64 * 255 / 127) = round(128.5039...) = 129
        assert_eq!(pixels[1], Rgba::gray(129, 255));
        assert_eq!(pixels[2], Rgba::gray(255, 255));
        assert!(!decoded.metadata.has_mask);
        assert_eq!(decoded.metadata.original_size, bytes.len());
    }

    #[test]
    fn mask_bit_ignored_without_flag() {
        let mut bytes = header(1, 0, 2, 1);
        bytes.extend_from_slice(&[0x80 | 10, 10]);

        let decoded = decode(&bytes).unwrap();
        assert!(decoded.buffer.as_texels().iter().all(|p| p.a() == 255));
        assert_eq!(decoded.buffer.pixel(0, 0), decoded.buffer.pixel(1, 0));
    }

    #[test]
    fn mask_bit_controls_alpha() {
        let mut bytes = header(1, FLAG_MASK, 2, 1);
        bytes.extend_from_slice(&[0x80 | 10, 10]);

        let decoded = decode(&bytes).unwrap();
        assert!(decoded.metadata.has_mask);
        assert_eq!(decoded.buffer.pixel(0, 0).a(), 255);
        assert_eq!(decoded.buffer.pixel(1, 0).a(), 0);
    }

    #[test]
    fn rejects_foreign_data() {
        let mut png = b"\x89PNG\r\n\x1a\n".to_vec();
        png.extend_from_slice(&[0; 5]);
        assert_eq!(decode(&png), Err(FormatError::BadSignature));
        assert_eq!(decode(&[]), Err(FormatError::BadSignature));
        assert!(FormatError::BadSignature.is_foreign_format());
        assert!(!probe(&png));
    }

    #[test]
    fn rejects_unknown_version() {
        let mut bytes = header(2, 0, 1, 1);
        bytes.push(0);
        assert_eq!(decode(&bytes), Err(FormatError::UnsupportedVersion(2)));
    }

    #[test]
    fn rejects_short_payload() {
        let mut bytes = header(1, 0, 2, 2);
        bytes.extend_from_slice(&[1, 2, 3]);
        assert_eq!(
            decode(&bytes),
            Err(FormatError::TruncatedData {
                expected: 4,
                actual: 3
            })
        );
    }

    #[test]
    fn rejects_short_header() {
        let bytes = [0x47, 0x42, 0x37, 0x1D, 1, 0];
        assert_eq!(
            decode(&bytes),
            Err(FormatError::TruncatedData {
                expected: HEADER_SIZE,
                actual: 6
            })
        );
        assert!(file_info(&bytes).is_none());
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let mut bytes = header(1, 0, 1, 1);
        bytes.extend_from_slice(&[127, 0xAA, 0xBB]);
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.buffer.len(), 1);

        let info = file_info(&bytes).unwrap();
        assert_eq!(info.data_size, 3);
        assert_eq!(info.file_size, HEADER_SIZE + 3);
    }

    #[test]
    fn mask_round_trip_thresholds_alpha() {
        let alphas = [0u8, 1, 127, 128, 200, 255];
        let source = PixelBuffer::from_fn(alphas.len() as u32, 1, |x, _| {
            Rgba::new(90, 90, 90, alphas[x as usize])
        });

        let decoded = decode(&encode(&source, true).unwrap()).unwrap();
        for (pixel, &alpha) in decoded.buffer.as_texels().iter().zip(&alphas) {
            let expected = if alpha > 127 { 255 } else { 0 };
            assert_eq!(pixel.a(), expected, "alpha {}", alpha);
        }
    }

    #[test]
    fn gray_round_trip_within_quantization_step() {
        let source = PixelBuffer::from_fn(256, 3, |x, y| {
            let v = x as u8;
            match y {
                0 => Rgba::gray(v, 255),
                1 => Rgba::new(v, 255 - v, v / 2, 255),
                _ => Rgba::new(v / 3, v, 17, 40),
            }
        });

        let decoded = decode(&encode(&source, false).unwrap()).unwrap();
        for (original, restored) in source.as_texels().iter().zip(decoded.buffer.as_texels()) {
            let [r, g, b] = original.rgb().map(f64::from);
            let mean = (r + g + b) / 3.0;
            let gray = f64::from(restored.r());
            let close = (gray - mean).abs() <= 2.01;
            assert!(close, "{:?} -> {:?}", original, restored);
            assert_eq!(restored.r(), restored.g());
            assert_eq!(restored.g(), restored.b());
        }
    }

    #[test]
    fn quantization_is_monotonic_and_covers_range() {
        assert_eq!(expand_gray7(0), 0);
        assert_eq!(expand_gray7(127), 255);
        assert_eq!(quantize_gray7(0), 0);
        assert_eq!(quantize_gray7(255), 127);
        for g in 0..127u8 {
            assert!(expand_gray7(g) < expand_gray7(g + 1));
            assert_eq!(quantize_gray7(expand_gray7(g)), g);
        }
    }

    #[test]
    fn encode_auto_detects_transparency() {
        let opaque = PixelBuffer::filled(1, 1, Rgba::BLACK);
        assert_eq!(encode_auto(&opaque).unwrap()[5], 0);

        let translucent = PixelBuffer::filled(1, 1, Rgba::new(0, 0, 0, 254));
        assert_eq!(encode_auto(&translucent).unwrap()[5], FLAG_MASK);
    }

    #[test]
    fn oversized_images_are_refused() {
        let wide = PixelBuffer::new(70_000, 0);
        assert_eq!(
            encode(&wide, false),
            Err(FormatError::DimensionsTooLarge {
                width: 70_000,
                height: 0
            })
        );
    }

    #[test]
    fn metadata_blob_round_trip() {
        let mut bytes = header(1, FLAG_MASK, 1, 1);
        bytes.push(0x80);
        let metadata = decode(&bytes).unwrap().metadata;

        let restored = FormatMetadata::from_blob(&metadata.to_blob()).unwrap();
        assert_eq!(restored, metadata);
        assert!(FormatMetadata::from_blob("not json").is_err());
    }

    #[test]
    fn pipette_label() {
        assert_eq!(gray7_label(Rgba::gray(255, 255)), "Gray: 127/127");
        assert_eq!(gray7_label(Rgba::gray(129, 255)), "Gray: 64/127");
    }
}
