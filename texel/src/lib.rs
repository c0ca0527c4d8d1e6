// Distributed under The MIT License (MIT)
//
// Copyright (c) 2026 The `grayedit` developers
//! # Pixel buffers
//!
//! Row-major RGBA byte buffers tagged with their width and height.
//!
//! Every transformation in the image core consumes one of these buffers and allocates a new one;
//! channel data is never shared between two buffers. The byte order is always R, G, B, A with
//! one byte per channel and no padding between rows, so the length of the data is exactly
//! `width * height * 4`.
//!
//! ## Usage
//!
//! ```
//! use grayedit_texel::{PixelBuffer, Rgba};
//! let mut image = PixelBuffer::new(4, 4);
//!
//! // Draw a red diagonal.
//! for i in 0..4 {
//!     image[(i, i)] = Rgba::new(0xFF, 0x00, 0x00, 0xFF);
//! }
//!
//! assert_eq!(image.as_bytes().len(), 4 * 4 * 4);
//! assert_eq!(image.pixel(2, 2), Rgba::new(0xFF, 0, 0, 0xFF));
//! ```
// Be std for doctests, avoids a weird warning about missing allocator.
#![cfg_attr(not(doctest), no_std)]
#![forbid(unsafe_code)]
extern crate alloc;

mod layout;
mod matrix;
mod texel;

pub use self::layout::{Layout, LayoutError};
pub use self::matrix::PixelBuffer;
pub use self::texel::Rgba;
