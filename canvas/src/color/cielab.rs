use crate::color_matrix::RowMatrix;
use crate::math::pow;

/// Linear sRGB to CIE XYZ, D65 whitepoint.
#[rustfmt::skip]
const M_XYZ: RowMatrix = RowMatrix::new([
    0.4124564, 0.3575761, 0.1804375,
    0.2126729, 0.7151522, 0.0721750,
    0.0193339, 0.1191920, 0.9503041,
]);

/// Reference white of the D65 illuminant, scaled so that `Y = 100`.
pub const WHITE_D65: [f64; 3] = [95.047, 100.0, 108.883];

const EPSILON: f64 = 0.008856;
const KAPPA_SLOPE: f64 = 7.787;

/// XYZ scaled to `[0, 100]`.
pub fn xyz_from_linear_srgb(rgb: [f64; 3]) -> [f64; 3] {
    let [x, y, z] = M_XYZ.mul_vec(rgb);
    [x * 100.0, y * 100.0, z * 100.0]
}

// Used Reference: CIE 15:2004, with the rounded constants of the common implementations.
pub fn lab_from_xyz([x, y, z]: [f64; 3]) -> [f64; 3] {
    let [xn, yn, zn] = WHITE_D65;
    let fx = f_lab(x / xn);
    let fy = f_lab(y / yn);
    let fz = f_lab(z / zn);

    [116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz)]
}

fn f_lab(t: f64) -> f64 {
    if t > EPSILON {
        pow(t, 1.0 / 3.0)
    } else {
        KAPPA_SLOPE * t + 16.0 / 116.0
    }
}

#[test]
fn black_is_origin() {
    assert_eq!(lab_from_xyz([0.0, 0.0, 0.0]), [0.0, 0.0, 0.0]);
}

#[test]
fn whitepoint_is_neutral() {
    let [l, a, b] = lab_from_xyz(WHITE_D65);
    assert!((l - 100.0).abs() < 1e-9);
    assert!(a.abs() < 1e-9);
    assert!(b.abs() < 1e-9);
}
