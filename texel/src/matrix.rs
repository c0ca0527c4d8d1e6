// Distributed under The MIT License (MIT)
//
// Copyright (c) 2026 The `grayedit` developers
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use core::ops::{Index, IndexMut};

use crate::layout::{Layout, LayoutError};
use crate::texel::Rgba;

/// A 2d, row-major matrix of RGBA pixels.
///
/// The samples always appear without any holes: row `y` starts at byte `y * width * 4`. This is
/// the exchange format between every stage of the image core and the platform decoder which
/// produces `{width, height, bytes}` triples.
///
/// ## Usage for trusted inputs
///
/// Directly allocate with [`PixelBuffer::new`] or wrap existing data with
/// [`PixelBuffer::from_vec`]. These panic when the data does not match the dimensions, as a
/// mismatch at this point is a bug in the caller and must not be silently tolerated.
///
/// ## Usage for untrusted inputs
///
/// Validate dimensions first with [`Layout::new`], then use [`PixelBuffer::try_from_vec`] which
/// reports a [`LayoutError`] instead of panicking.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PixelBuffer {
    layout: Layout,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Allocate a fully transparent buffer.
    ///
    /// # Panics
    /// When the dimensions can not be addressed, or allocation fails.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Rgba::TRANSPARENT)
    }

    /// Allocate a buffer with every pixel set to `color`.
    ///
    /// # Panics
    /// When the dimensions can not be addressed, or allocation fails.
    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        let layout = Layout::new(width, height).expect("Pixel layout can not fit into memory");
        Self::with_layout(layout, color)
    }

    /// Allocate a buffer of a validated layout.
    pub fn with_layout(layout: Layout, color: Rgba) -> Self {
        let data = vec![color; layout.len()];
        PixelBuffer {
            layout,
            data: bytemuck::allocation::cast_vec(data),
        }
    }

    /// Wrap existing RGBA data.
    ///
    /// # Panics
    /// If `data.len() != width * height * 4`.
    pub fn from_vec(width: u32, height: u32, data: Vec<u8>) -> Self {
        match Self::try_from_vec(width, height, data) {
            Ok(buffer) => buffer,
            Err(err) => panic!("malformed pixel buffer: {}", err),
        }
    }

    /// Wrap existing RGBA data, reporting a length mismatch as an error.
    pub fn try_from_vec(width: u32, height: u32, data: Vec<u8>) -> Result<Self, LayoutError> {
        let layout = Layout::new(width, height)?;
        layout.check_bytes(data.len())?;
        Ok(PixelBuffer { layout, data })
    }

    /// Build a buffer by evaluating `f` at every coordinate, in row-major order.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> Rgba) -> Self {
        let mut buffer = Self::new(width, height);
        for (idx, pixel) in buffer.as_texels_mut().iter_mut().enumerate() {
            let x = (idx % width as usize) as u32;
            let y = (idx / width as usize) as u32;
            *pixel = f(x, y);
        }
        buffer
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn width(&self) -> u32 {
        self.layout.width()
    }

    pub fn height(&self) -> u32 {
        self.layout.height()
    }

    /// Number of pixels.
    pub fn len(&self) -> usize {
        self.layout.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layout.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_texels(&self) -> &[Rgba] {
        Rgba::cast_slice(&self.data)
    }

    pub fn as_texels_mut(&mut self) -> &mut [Rgba] {
        Rgba::cast_slice_mut(&mut self.data)
    }

    /// The pixel at `(x, y)`.
    ///
    /// # Panics
    /// If the coordinate is outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        self[(x, y)]
    }

    /// The pixel at `(x, y)`, or `None` outside the buffer.
    pub fn get(&self, x: u32, y: u32) -> Option<Rgba> {
        if x < self.width() && y < self.height() {
            Some(self.as_texels()[self.layout.index(x, y)])
        } else {
            None
        }
    }

    /// The pixels of row `y`.
    pub fn row(&self, y: u32) -> &[Rgba] {
        let width = self.width() as usize;
        let start = y as usize * width;
        &self.as_texels()[start..start + width]
    }

    /// Iterate over all rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Rgba]> + '_ {
        // `chunks_exact` rejects a zero chunk size, an empty buffer simply has no rows.
        let width = (self.width() as usize).max(1);
        self.as_texels().chunks_exact(width)
    }

    /// Apply `f` to every pixel, producing a new buffer of the same size.
    pub fn map(&self, mut f: impl FnMut(Rgba) -> Rgba) -> PixelBuffer {
        let data: Vec<Rgba> = self.as_texels().iter().map(|&p| f(p)).collect();
        PixelBuffer {
            layout: self.layout,
            data: bytemuck::allocation::cast_vec(data),
        }
    }

    /// Whether any pixel is not fully opaque.
    pub fn has_transparency(&self) -> bool {
        self.as_texels().iter().any(|p| !p.is_opaque())
    }

    /// Unwrap the underlying RGBA bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

impl Default for PixelBuffer {
    fn default() -> Self {
        PixelBuffer {
            layout: Layout::empty(),
            data: Vec::new(),
        }
    }
}

impl Index<(u32, u32)> for PixelBuffer {
    type Output = Rgba;

    fn index(&self, (x, y): (u32, u32)) -> &Rgba {
        assert!(x < self.width() && y < self.height(), "pixel ({}, {}) out of bounds", x, y);
        &self.as_texels()[self.layout.index(x, y)]
    }
}

impl IndexMut<(u32, u32)> for PixelBuffer {
    fn index_mut(&mut self, (x, y): (u32, u32)) -> &mut Rgba {
        assert!(x < self.width() && y < self.height(), "pixel ({}, {}) out of bounds", x, y);
        let idx = self.layout.index(x, y);
        &mut self.as_texels_mut()[idx]
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}
