//! Estimation of the effective color depth of an image.
//!
//! This is a heuristic. It counts the distinct values of each channel in a sample and reports
//! the smallest bit depth that could hold that many values. A smooth 8-bit gradient that happens
//! to use only 100 gray levels is reported as 7 bits, and a 16-bit source is never detected as
//! such since the buffer stores 8 bits per channel.
use core::fmt;

use grayedit_texel::{PixelBuffer, Rgba};

use crate::resample;

/// Distinct values observed in one channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelStats {
    pub unique_values: usize,
    pub estimated_bits: u8,
}

/// The estimate of [`analyze`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorDepth {
    /// The largest estimate among the color channels.
    pub bits_per_channel: u8,
    /// Three color channels plus the alpha estimate, if any pixel is transparent.
    pub total_bits: u8,
    /// Some pixel has `A < 255`.
    pub has_alpha: bool,
    /// Some pixel has `0 < A < 255`.
    pub has_partial_alpha: bool,
    pub red: ChannelStats,
    pub green: ChannelStats,
    pub blue: ChannelStats,
    /// Estimated bits are zero when no pixel is transparent.
    pub alpha: ChannelStats,
}

/// Analyze at most `limit`×`limit` pixels of `buffer`.
///
/// Larger images are downscaled with nearest-neighbor first, which never introduces values
/// that do not occur in the image.
pub fn analyze(buffer: &PixelBuffer, limit: u32) -> ColorDepth {
    let width = buffer.width().min(limit);
    let height = buffer.height().min(limit);

    if (width, height) == (buffer.width(), buffer.height()) {
        return analyze_sample(buffer.as_texels());
    }

    log::trace!(
        "sampling {}x{} image at {}x{} for depth analysis",
        buffer.width(),
        buffer.height(),
        width,
        height
    );
    let sample = resample::nearest(buffer, width, height);
    analyze_sample(sample.as_texels())
}

/// Analyze every pixel of a sample.
///
/// An empty sample yields [`ColorDepth::FALLBACK`].
pub fn analyze_sample(pixels: &[Rgba]) -> ColorDepth {
    if pixels.is_empty() {
        return ColorDepth::FALLBACK;
    }

    let mut seen = [ValueSet::default(); 4];
    let mut has_alpha = false;
    let mut has_partial_alpha = false;

    for &pixel in pixels {
        for (set, &value) in seen.iter_mut().zip(&pixel.0) {
            set.insert(value);
        }

        let alpha = pixel.a();
        has_alpha |= alpha < 255;
        has_partial_alpha |= alpha > 0 && alpha < 255;
    }

    let stats = |set: &ValueSet| {
        let unique_values = set.len();
        ChannelStats {
            unique_values,
            estimated_bits: bits_for_count(unique_values),
        }
    };

    let [red, green, blue, mut alpha] = seen.each_ref().map(stats);
    if !has_alpha {
        alpha.estimated_bits = 0;
    }

    let bits_per_channel = red
        .estimated_bits
        .max(green.estimated_bits)
        .max(blue.estimated_bits);

    ColorDepth {
        bits_per_channel,
        total_bits: 3 * bits_per_channel + alpha.estimated_bits,
        has_alpha,
        has_partial_alpha,
        red,
        green,
        blue,
        alpha,
    }
}

/// The smallest bit count able to represent `count` distinct values, at most 8.
pub fn bits_for_count(count: usize) -> u8 {
    match count {
        0..=2 => 1,
        3..=4 => 2,
        5..=8 => 3,
        9..=16 => 4,
        17..=32 => 5,
        33..=64 => 6,
        65..=128 => 7,
        _ => 8,
    }
}

impl ColorDepth {
    /// Reported when there is nothing to analyze: plain 24-bit RGB.
    pub const FALLBACK: Self = {
        let color = ChannelStats {
            unique_values: 0,
            estimated_bits: 8,
        };

        ColorDepth {
            bits_per_channel: 8,
            total_bits: 24,
            has_alpha: false,
            has_partial_alpha: false,
            red: color,
            green: color,
            blue: color,
            alpha: ChannelStats {
                unique_values: 0,
                estimated_bits: 0,
            },
        }
    };

    /// A short label such as `24-bit RGB` or `8-bit Indexed`.
    pub fn description(&self) -> String {
        let bpc = self.bits_per_channel;
        let alpha = if self.has_alpha { "A" } else { "" };
        // Counts a full alpha channel of the same depth, unlike `total_bits`.
        let total = if self.has_alpha { 4 * u32::from(bpc) } else { 3 * u32::from(bpc) };

        match bpc {
            0..=1 => format!("{total}-bit Monochrome{alpha}"),
            2..=4 => format!("{total}-bit Indexed{alpha}"),
            _ => format!("{total}-bit RGB{alpha}"),
        }
    }

    /// Bits per color channel and, when present, of the alpha channel.
    pub fn detailed_description(&self) -> String {
        let mut text = format!("{} bits per channel (RGB)", self.bits_per_channel);
        if self.has_alpha {
            text.push_str(&format!(" + {} bits alpha", self.alpha.estimated_bits));
        }
        text
    }
}

impl fmt::Display for ColorDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

/// A set of byte values.
#[derive(Clone, Copy, Default)]
struct ValueSet([u64; 4]);

impl ValueSet {
    fn insert(&mut self, value: u8) {
        self.0[usize::from(value >> 6)] |= 1u64 << (value & 63);
    }

    fn len(&self) -> usize {
        self.0.iter().map(|word| word.count_ones() as usize).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds() {
        let expected = [(0, 1), (1, 1), (2, 1), (3, 2), (4, 2), (5, 3), (8, 3), (9, 4), (16, 4)];
        for (count, bits) in expected {
            assert_eq!(bits_for_count(count), bits, "{count} values");
        }
        assert_eq!(bits_for_count(32), 5);
        assert_eq!(bits_for_count(33), 6);
        assert_eq!(bits_for_count(64), 6);
        assert_eq!(bits_for_count(128), 7);
        assert_eq!(bits_for_count(129), 8);
        assert_eq!(bits_for_count(256), 8);
    }

    #[test]
    fn full_gray_ramp() {
        let ramp: Vec<_> = (0..=255).map(|v| Rgba::gray(v, 255)).collect();
        let depth = analyze_sample(&ramp);

        assert_eq!(depth.bits_per_channel, 8);
        assert_eq!(depth.total_bits, 24);
        assert!(!depth.has_alpha);
        assert_eq!(depth.red.unique_values, 256);
        assert_eq!(depth.alpha.unique_values, 1);
        assert_eq!(depth.alpha.estimated_bits, 0);
        assert_eq!(depth.description(), "24-bit RGB");
        assert_eq!(depth.detailed_description(), "8 bits per channel (RGB)");
    }

    #[test]
    fn black_and_white_with_mask() {
        let pixels = [Rgba::BLACK, Rgba::WHITE, Rgba::TRANSPARENT];
        let depth = analyze_sample(&pixels);

        assert_eq!(depth.bits_per_channel, 1);
        assert!(depth.has_alpha);
        assert!(!depth.has_partial_alpha);
        assert_eq!(depth.alpha.estimated_bits, 1);
        assert_eq!(depth.total_bits, 4);
        assert_eq!(depth.description(), "4-bit MonochromeA");
        assert_eq!(depth.detailed_description(), "1 bits per channel (RGB) + 1 bits alpha");
    }

    #[test]
    fn max_of_color_channels() {
        // 20 reds, 3 greens, one blue.
        let pixels: Vec<_> = (0..20u8).map(|i| Rgba::new(i, i % 3, 0, 128)).collect();
        let depth = analyze_sample(&pixels);

        assert_eq!(depth.red.estimated_bits, 5);
        assert_eq!(depth.green.estimated_bits, 2);
        assert_eq!(depth.blue.estimated_bits, 1);
        assert_eq!(depth.bits_per_channel, 5);
        assert!(depth.has_partial_alpha);
        assert_eq!(depth.total_bits, 16);
        assert_eq!(depth.description(), "20-bit RGBA");
    }

    #[test]
    fn descriptions() {
        let with = |bits_per_channel, has_alpha| ColorDepth {
            bits_per_channel,
            has_alpha,
            ..ColorDepth::FALLBACK
        };

        assert_eq!(with(3, false).description(), "9-bit Indexed");
        assert_eq!(with(5, false).description(), "15-bit RGB");
        assert_eq!(with(6, false).description(), "18-bit RGB");
        assert_eq!(with(6, true).description(), "24-bit RGBA");
        assert_eq!(with(7, false).description(), "21-bit RGB");
        assert_eq!(with(8, true).description(), "32-bit RGBA");
        assert_eq!(with(8, true).to_string(), "32-bit RGBA");
    }

    #[test]
    fn empty_sample_falls_back() {
        assert_eq!(analyze_sample(&[]), ColorDepth::FALLBACK);
        assert_eq!(analyze(&PixelBuffer::new(0, 0), 200).description(), "24-bit RGB");
    }

    #[test]
    fn large_images_are_sampled() {
        // Four gray levels in vertical stripes survive the downscale.
        let stripes = PixelBuffer::from_fn(1000, 10, |x, _| Rgba::gray((x % 4 * 60) as u8, 255));
        let depth = analyze(&stripes, 200);
        assert!(depth.red.unique_values <= 4);
        assert!(depth.bits_per_channel <= 2);
    }
}
