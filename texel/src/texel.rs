// Distributed under The MIT License (MIT)
//
// Copyright (c) 2026 The `grayedit` developers
use bytemuck::{Pod, Zeroable};

/// A single straight-alpha RGBA pixel, one byte per channel.
///
/// The wrapper is `Pod` so that a byte slice of pixel data can be reinterpreted as a slice of
/// pixels (and back) without copying. Its alignment is 1, hence any byte slice whose length is a
/// multiple of four casts successfully.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    /// Bytes occupied by one pixel.
    pub const BYTES: usize = 4;

    pub const TRANSPARENT: Self = Rgba([0, 0, 0, 0]);
    pub const BLACK: Self = Rgba([0, 0, 0, 0xff]);
    pub const WHITE: Self = Rgba([0xff, 0xff, 0xff, 0xff]);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Rgba([r, g, b, a])
    }

    /// A fully opaque pixel.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Rgba([r, g, b, 0xff])
    }

    /// A gray pixel with the same value in all color channels.
    pub const fn gray(value: u8, alpha: u8) -> Self {
        Rgba([value, value, value, alpha])
    }

    pub const fn r(self) -> u8 {
        self.0[0]
    }

    pub const fn g(self) -> u8 {
        self.0[1]
    }

    pub const fn b(self) -> u8 {
        self.0[2]
    }

    pub const fn a(self) -> u8 {
        self.0[3]
    }

    /// The color channels, without alpha.
    pub const fn rgb(self) -> [u8; 3] {
        let [r, g, b, _] = self.0;
        [r, g, b]
    }

    /// The same color with a replaced alpha channel.
    pub const fn with_alpha(self, alpha: u8) -> Self {
        let [r, g, b, _] = self.0;
        Rgba([r, g, b, alpha])
    }

    pub const fn is_opaque(self) -> bool {
        self.0[3] == 0xff
    }

    /// Cast a byte slice to pixels.
    ///
    /// # Panics
    /// If the length is not a multiple of four.
    pub fn cast_slice(bytes: &[u8]) -> &[Rgba] {
        bytemuck::cast_slice(bytes)
    }

    /// Cast a mutable byte slice to pixels.
    ///
    /// # Panics
    /// If the length is not a multiple of four.
    pub fn cast_slice_mut(bytes: &mut [u8]) -> &mut [Rgba] {
        bytemuck::cast_slice_mut(bytes)
    }

    pub fn to_bytes(pixels: &[Rgba]) -> &[u8] {
        bytemuck::cast_slice(pixels)
    }
}

impl From<[u8; 4]> for Rgba {
    fn from(value: [u8; 4]) -> Self {
        Rgba(value)
    }
}

impl From<Rgba> for [u8; 4] {
    fn from(value: Rgba) -> Self {
        value.0
    }
}
