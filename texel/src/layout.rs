//! The checked geometry of a pixel buffer.
use core::fmt;

use crate::texel::Rgba;

/// Width and height of an RGBA buffer, validated to describe an addressable allocation.
///
/// Constructing a layout never allocates. It only checks that `width * height * 4` fits into a
/// `usize`, so that callers handling untrusted dimensions (for example, from a file header) can
/// reject them before any memory is reserved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Layout {
    width: u32,
    height: u32,
}

/// The layout could not be represented in memory, or data did not match it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayoutError {
    inner: ErrorKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ErrorKind {
    Overflow,
    Length { expected: usize, actual: usize },
}

impl Layout {
    /// Create a layout, checking that the byte length does not overflow.
    pub fn new(width: u32, height: u32) -> Result<Self, LayoutError> {
        let layout = Layout { width, height };
        Self::byte_len_checked(width, height).ok_or(LayoutError::OVERFLOW)?;
        Ok(layout)
    }

    /// A layout without any pixels.
    pub const fn empty() -> Self {
        Layout {
            width: 0,
            height: 0,
        }
    }

    pub const fn width(self) -> u32 {
        self.width
    }

    pub const fn height(self) -> u32 {
        self.height
    }

    /// Number of pixels.
    pub fn len(self) -> usize {
        // Does not overflow due to construction.
        self.width as usize * self.height as usize
    }

    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// Get the required bytes for this layout.
    pub fn byte_len(self) -> usize {
        self.len() * Rgba::BYTES
    }

    /// Index of the pixel at `(x, y)`, without bounds checks beyond debug assertions.
    pub fn index(self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y as usize * self.width as usize + x as usize
    }

    /// Check that `len` bytes exactly fill this layout.
    pub fn check_bytes(self, len: usize) -> Result<(), LayoutError> {
        let expected = self.byte_len();
        if expected == len {
            Ok(())
        } else {
            Err(LayoutError {
                inner: ErrorKind::Length {
                    expected,
                    actual: len,
                },
            })
        }
    }

    fn byte_len_checked(width: u32, height: u32) -> Option<usize> {
        usize::try_from(width)
            .ok()?
            .checked_mul(usize::try_from(height).ok()?)?
            .checked_mul(Rgba::BYTES)
    }
}

impl LayoutError {
    const OVERFLOW: Self = LayoutError {
        inner: ErrorKind::Overflow,
    };

    /// The number of bytes the layout required, if the error was a length mismatch.
    pub fn expected_len(&self) -> Option<usize> {
        match self.inner {
            ErrorKind::Length { expected, .. } => Some(expected),
            ErrorKind::Overflow => None,
        }
    }
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.inner {
            ErrorKind::Overflow => {
                f.write_str("pixel buffer dimensions overflow the address space")
            }
            ErrorKind::Length { expected, actual } => write!(
                f,
                "pixel data has {} bytes but the layout requires {}",
                actual, expected
            ),
        }
    }
}

impl core::error::Error for LayoutError {}
