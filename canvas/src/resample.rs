//! Resizing of pixel buffers.
//!
//! All algorithms map a destination pixel center onto the source grid with
//! `src = (dst + 0.5) * src_dim / dst_dim - 0.5` and clamp every source index to the edge. They
//! work on each of the four channels independently, alpha is not premultiplied.
use core::fmt;

use grayedit_texel::{PixelBuffer, Rgba};

use crate::math;
use crate::rows::for_each_row;

/// A resampling algorithm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Nearest,
    #[default]
    Bilinear,
    Bicubic,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Algorithm::Nearest, Algorithm::Bilinear, Algorithm::Bicubic];

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Nearest => "Nearest neighbor",
            Algorithm::Bilinear => "Bilinear",
            Algorithm::Bicubic => "Bicubic",
        }
    }

    /// A one-sentence explanation for a tooltip next to the algorithm choice.
    pub fn description(self) -> &'static str {
        match self {
            Algorithm::Nearest => {
                "Copies the closest source pixel. Fastest, keeps hard edges, blocky when enlarged."
            }
            Algorithm::Bilinear => {
                "Blends the four nearest source pixels. Smooth result at moderate cost."
            }
            Algorithm::Bicubic => {
                "Weighs a 4x4 neighborhood with a cubic kernel. Sharpest smooth result, slowest."
            }
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resize `src` to `width`×`height` with the chosen algorithm.
///
/// # Panics
///
/// When `src` has no pixels but the target does.
pub fn resample(src: &PixelBuffer, width: u32, height: u32, algorithm: Algorithm) -> PixelBuffer {
    match algorithm {
        Algorithm::Nearest => nearest(src, width, height),
        Algorithm::Bilinear => bilinear(src, width, height),
        Algorithm::Bicubic => bicubic(src, width, height),
    }
}

/// Resize by a percentage of the current size in each direction.
///
/// The result is rounded and never smaller than one pixel.
pub fn scale_percent(
    src: &PixelBuffer,
    width_percent: f64,
    height_percent: f64,
    algorithm: Algorithm,
) -> PixelBuffer {
    let (width, height) = percent_size(src.width(), src.height(), width_percent, height_percent);
    resample(src, width, height, algorithm)
}

/// The target dimensions of [`scale_percent`].
pub fn percent_size(
    width: u32,
    height: u32,
    width_percent: f64,
    height_percent: f64,
) -> (u32, u32) {
    let scale = |dim: u32, percent: f64| {
        let target = math::round_half_up(f64::from(dim) * percent / 100.0);
        // Saturating float to integer conversion.
        (target as u32).max(1)
    };

    (scale(width, width_percent), scale(height, height_percent))
}

/// Pixel count in millions, as shown next to the image size.
pub fn megapixels(width: u32, height: u32) -> f64 {
    f64::from(width) * f64::from(height) / 1_000_000.0
}

pub fn nearest(src: &PixelBuffer, width: u32, height: u32) -> PixelBuffer {
    let mut out = target(src, width, height);
    let grid = Grid::new(src, width, height);

    for_each_row(&mut out, |y, row| {
        let sy = grid.clamp_y(math::round_half_up(grid.map_y(y)));
        for (x, pixel) in (0u32..).zip(row.iter_mut()) {
            let sx = grid.clamp_x(math::round_half_up(grid.map_x(x)));
            *pixel = src.pixel(sx, sy);
        }
    });

    out
}

pub fn bilinear(src: &PixelBuffer, width: u32, height: u32) -> PixelBuffer {
    let mut out = target(src, width, height);
    let grid = Grid::new(src, width, height);

    for_each_row(&mut out, |y, row| {
        let gy = grid.map_y(y);
        let gyi = math::floor(gy);
        let fy = gy - gyi;
        let (y1, y2) = (grid.clamp_y(gyi), grid.clamp_y(gyi + 1.0));

        for (x, pixel) in (0u32..).zip(row.iter_mut()) {
            let gx = grid.map_x(x);
            let gxi = math::floor(gx);
            let fx = gx - gxi;
            let (x1, x2) = (grid.clamp_x(gxi), grid.clamp_x(gxi + 1.0));

            let a = src.pixel(x1, y1).0;
            let b = src.pixel(x2, y1).0;
            let c = src.pixel(x1, y2).0;
            let d = src.pixel(x2, y2).0;

            *pixel = Rgba(core::array::from_fn(|ch| {
                let value = f64::from(a[ch]) * (1.0 - fx) * (1.0 - fy)
                    + f64::from(b[ch]) * fx * (1.0 - fy)
                    + f64::from(c[ch]) * (1.0 - fx) * fy
                    + f64::from(d[ch]) * fx * fy;
                math::round_u8(value)
            }));
        }
    });

    out
}

pub fn bicubic(src: &PixelBuffer, width: u32, height: u32) -> PixelBuffer {
    let mut out = target(src, width, height);
    let grid = Grid::new(src, width, height);

    for_each_row(&mut out, |y, row| {
        let gy = grid.map_y(y);
        let gyi = math::floor(gy);

        for (x, pixel) in (0u32..).zip(row.iter_mut()) {
            let gx = grid.map_x(x);
            let gxi = math::floor(gx);

            let mut sum = [0.0f64; 4];
            let mut weight_sum = 0.0;
            for i in -1..=2 {
                let xi = gxi + f64::from(i);
                let wx = keys_cubic(gx - xi);
                for j in -1..=2 {
                    let yi = gyi + f64::from(j);
                    let weight = wx * keys_cubic(gy - yi);
                    let sample = src.pixel(grid.clamp_x(xi), grid.clamp_y(yi)).0;

                    for (acc, &value) in sum.iter_mut().zip(&sample) {
                        *acc += f64::from(value) * weight;
                    }
                    weight_sum += weight.abs();
                }
            }

            *pixel = Rgba(core::array::from_fn(|ch| {
                let value = if weight_sum > 0.0 { sum[ch] / weight_sum } else { 0.0 };
                math::round_u8(value)
            }));
        }
    });

    out
}

/// The Keys cubic convolution kernel with `a = -0.5`.
fn keys_cubic(t: f64) -> f64 {
    let t = t.abs();
    if t <= 1.0 {
        1.5 * t * t * t - 2.5 * t * t + 1.0
    } else if t <= 2.0 {
        -0.5 * t * t * t + 2.5 * t * t - 4.0 * t + 2.0
    } else {
        0.0
    }
}

fn target(src: &PixelBuffer, width: u32, height: u32) -> PixelBuffer {
    let out = PixelBuffer::new(width, height);
    assert!(
        out.is_empty() || !src.is_empty(),
        "can not resample an empty {}x{} image to {}x{}",
        src.width(),
        src.height(),
        width,
        height,
    );
    out
}

/// Maps destination coordinates onto the source grid.
struct Grid {
    src_width: f64,
    src_height: f64,
    dst_width: f64,
    dst_height: f64,
    max_x: f64,
    max_y: f64,
}

impl Grid {
    fn new(src: &PixelBuffer, width: u32, height: u32) -> Self {
        Grid {
            src_width: src.width().into(),
            src_height: src.height().into(),
            dst_width: width.into(),
            dst_height: height.into(),
            max_x: f64::from(src.width().saturating_sub(1)),
            max_y: f64::from(src.height().saturating_sub(1)),
        }
    }

    fn map_x(&self, x: u32) -> f64 {
        (f64::from(x) + 0.5) * self.src_width / self.dst_width - 0.5
    }

    fn map_y(&self, y: u32) -> f64 {
        (f64::from(y) + 0.5) * self.src_height / self.dst_height - 0.5
    }

    fn clamp_x(&self, x: f64) -> u32 {
        x.clamp(0.0, self.max_x) as u32
    }

    fn clamp_y(&self, y: f64) -> u32 {
        y.clamp(0.0, self.max_y) as u32
    }
}
