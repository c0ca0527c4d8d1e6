//! Turning file contents into pixels.
//!
//! GrayBit-7 data is decoded here, everything else is handed to a [`PlatformDecoder`].
use core::fmt;

use grayedit_texel::PixelBuffer;

use crate::codec::{self, FormatError, FormatMetadata};
use crate::depth;

/// Decodes the common image formats the editor does not handle itself.
pub trait PlatformDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer, LoadError>;

    /// A short format name such as `PNG`, if the data is recognized.
    fn format_name(&self, bytes: &[u8]) -> Option<String>;
}

/// Where a loaded image came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    GrayBit7(FormatMetadata),
    Platform { format: Option<String> },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadedImage {
    pub buffer: PixelBuffer,
    pub source: Source,
    /// Size of the file.
    pub byte_len: usize,
    /// Label for the status bar, e.g. `7-bit Grayscale` or `24-bit RGB`.
    pub color_depth: String,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("could not decode image: {0}")]
    Platform(String),
}

/// A decoder for setups without platform support, it recognizes nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPlatformDecoder;

/// Decode `bytes` as GrayBit-7, falling back to `platform` for other formats.
///
/// Only a signature mismatch falls back, a damaged GrayBit-7 file is an error.
pub fn load(
    bytes: &[u8],
    platform: &dyn PlatformDecoder,
    depth_sample_limit: u32,
) -> Result<LoadedImage, LoadError> {
    match codec::decode(bytes) {
        Ok(decoded) => {
            let color_depth = if decoded.metadata.has_mask {
                "8-bit Grayscale+A"
            } else {
                "7-bit Grayscale"
            };

            Ok(LoadedImage {
                buffer: decoded.buffer,
                source: Source::GrayBit7(decoded.metadata),
                byte_len: bytes.len(),
                color_depth: color_depth.into(),
            })
        }
        Err(err) if err.is_foreign_format() => {
            let format = platform.format_name(bytes);
            log::debug!(
                "not GrayBit-7, decoding as {}",
                format.as_deref().unwrap_or("unknown format")
            );

            let buffer = platform.decode(bytes)?;
            let color_depth = depth::analyze(&buffer, depth_sample_limit).description();
            Ok(LoadedImage {
                buffer,
                source: Source::Platform { format },
                byte_len: bytes.len(),
                color_depth,
            })
        }
        Err(err) => Err(err.into()),
    }
}

impl LoadedImage {
    pub fn metadata(&self) -> Option<&FormatMetadata> {
        match &self.source {
            Source::GrayBit7(metadata) => Some(metadata),
            Source::Platform { .. } => None,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::GrayBit7(_) => f.write_str("GrayBit-7"),
            Source::Platform { format: Some(name) } => f.write_str(name),
            Source::Platform { format: None } => f.write_str("unknown"),
        }
    }
}

impl PlatformDecoder for NoPlatformDecoder {
    fn decode(&self, _: &[u8]) -> Result<PixelBuffer, LoadError> {
        Err(LoadError::Platform("no platform decoder available".into()))
    }

    fn format_name(&self, _: &[u8]) -> Option<String> {
        None
    }
}

#[cfg(feature = "platform-decoder")]
pub use self::image_crate::ImageCrateDecoder;

#[cfg(feature = "platform-decoder")]
mod image_crate {
    use grayedit_texel::PixelBuffer;

    use super::{LoadError, PlatformDecoder};

    fn platform_error(err: impl core::fmt::Display) -> LoadError {
        LoadError::Platform(err.to_string())
    }

    /// Decodes PNG, JPEG, GIF, BMP and WebP with the `image` crate.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct ImageCrateDecoder;

    impl PlatformDecoder for ImageCrateDecoder {
        fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer, LoadError> {
            let image = image::load_from_memory(bytes).map_err(platform_error)?;
            let rgba = image.into_rgba8();
            let (width, height) = rgba.dimensions();
            PixelBuffer::try_from_vec(width, height, rgba.into_raw()).map_err(platform_error)
        }

        fn format_name(&self, bytes: &[u8]) -> Option<String> {
            let format = image::guess_format(bytes).ok()?;
            Some(format!("{:?}", format).to_uppercase())
        }
    }
}
