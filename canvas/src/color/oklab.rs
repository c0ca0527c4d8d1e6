use crate::color_matrix::ColMatrix;
use crate::math::{atan2, cbrt, sqrt};

/// Linear sRGB to LMS cone response.
#[rustfmt::skip]
const M1: ColMatrix = ColMatrix([
    [0.4122214708, 0.2119034982, 0.0883024619],
    [0.5363325363, 0.6806995451, 0.2817188376],
    [0.0514459929, 0.1073969566, 0.6299787005],
]);

/// Non-linear LMS to Lab.
#[rustfmt::skip]
const M2: ColMatrix = ColMatrix([
    [0.2104542553, 1.9779984951, 0.0259040371],
    [0.7936177850, -2.4285922050, 0.7827717662],
    [-0.0040720468, 0.4505937099, -0.8086757660],
]);

// Used Reference: <https://bottosson.github.io/posts/oklab/>
pub fn oklab_from_linear_srgb(rgb: [f64; 3]) -> [f64; 3] {
    let lms = M1.mul_vec(rgb);
    M2.mul_vec(f_lms(lms))
}

/// Polar form of Oklab. The hue is in degrees, within `[0, 360)`.
pub fn oklch_from_oklab([l, a, b]: [f64; 3]) -> [f64; 3] {
    let c = sqrt(a * a + b * b);
    let mut h = atan2(b, a).to_degrees();
    if h < 0.0 {
        h += 360.0;
    }
    // A tiny negative angle wraps to exactly 360.0 after the addition.
    if h >= 360.0 {
        h -= 360.0;
    }
    [l, c, h]
}

fn f_lms([l, m, s]: [f64; 3]) -> [f64; 3] {
    // `cbrt` is defined for negative components, unlike `pow`.
    [cbrt(l), cbrt(m), cbrt(s)]
}

#[test]
fn white_is_achromatic() {
    let [l, a, b] = oklab_from_linear_srgb([1.0, 1.0, 1.0]);
    assert!((l - 1.0).abs() < 1e-4, "{}", l);
    assert!(a.abs() < 1e-4, "{}", a);
    assert!(b.abs() < 1e-4, "{}", b);
}

#[test]
fn red_reference() {
    // Published value for sRGB red: oklch(0.628 0.258 29.2)
    let [l, c, h] = oklch_from_oklab(oklab_from_linear_srgb([1.0, 0.0, 0.0]));
    assert!((l - 0.628).abs() < 1e-3, "{}", l);
    assert!((c - 0.258).abs() < 1e-3, "{}", c);
    assert!((h - 29.23).abs() < 0.1, "{}", h);
}
