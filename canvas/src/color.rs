mod cielab;
mod oklab;
mod transfer;

use core::cell::OnceCell;
use core::fmt;

use grayedit_texel::Rgba;

pub use self::cielab::WHITE_D65;

/// An 8-bit, gamma encoded sRGB color as read from a pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// CIE 1931 XYZ tristimulus values for the D65 whitepoint, scaled so that white has `Y = 100`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Xyz {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// CIE L*a*b* relative to the D65 whitepoint.
///
/// Lightness is within `[0, 100]`, the chroma components are unbounded but stay within about
/// `±128` for colors from sRGB.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Lab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

/// The perceptual Oklab space by Björn Ottosson.
///
/// Reference: <https://bottosson.github.io/posts/oklab/>
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Oklab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

/// Oklab in polar coordinates: lightness, chroma and hue in degrees within `[0, 360)`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Oklch {
    pub l: f64,
    pub c: f64,
    pub h: f64,
}

/// Accessibility classification of a contrast ratio, after WCAG 2.1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rating {
    /// At least 7:1.
    Aaa,
    /// At least 4.5:1.
    Aa,
    /// At least 3:1, sufficient for large text only.
    AaLargeText,
    Insufficient,
}

/// The WCAG contrast between two colors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contrast {
    /// The ratio `(lighter + 0.05) / (darker + 0.05)`, within `[1, 21]`.
    pub ratio: f64,
    pub rating: Rating,
}

/// An RGB color with its derived representations, computed on first access.
#[derive(Clone, Debug, Default)]
pub struct ColorSample {
    rgb: Rgb8,
    xyz: OnceCell<Xyz>,
    lab: OnceCell<Lab>,
    oklch: OnceCell<Oklch>,
}

impl Rgb8 {
    pub const BLACK: Self = Rgb8::new(0, 0, 0);
    pub const WHITE: Self = Rgb8::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb8 { r, g, b }
    }

    /// The linear light representation of each channel, within `[0, 1]`.
    pub fn to_linear(self) -> [f64; 3] {
        self.channels().map(transfer::transfer_eo_srgb)
    }

    fn channels(self) -> [f64; 3] {
        [self.r, self.g, self.b].map(transfer::unorm8)
    }
}

impl From<Rgba> for Rgb8 {
    fn from(pixel: Rgba) -> Self {
        let [r, g, b] = pixel.rgb();
        Rgb8 { r, g, b }
    }
}

impl From<[u8; 3]> for Rgb8 {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Rgb8 { r, g, b }
    }
}

/// Convert to CIE XYZ (D65), via linear sRGB.
pub fn to_xyz(rgb: Rgb8) -> Xyz {
    let [x, y, z] = cielab::xyz_from_linear_srgb(rgb.to_linear());
    Xyz { x, y, z }
}

/// Convert to CIE L*a*b* (D65), via linear sRGB and XYZ.
pub fn to_lab(rgb: Rgb8) -> Lab {
    xyz_to_lab(to_xyz(rgb))
}

pub fn xyz_to_lab(xyz: Xyz) -> Lab {
    let [l, a, b] = cielab::lab_from_xyz([xyz.x, xyz.y, xyz.z]);
    Lab { l, a, b }
}

/// Convert to Oklab, via linear sRGB.
pub fn to_oklab(rgb: Rgb8) -> Oklab {
    let [l, a, b] = oklab::oklab_from_linear_srgb(rgb.to_linear());
    Oklab { l, a, b }
}

/// Convert to the polar Oklch form.
pub fn to_oklch(rgb: Rgb8) -> Oklch {
    oklab_to_oklch(to_oklab(rgb))
}

pub fn oklab_to_oklch(lab: Oklab) -> Oklch {
    let [l, c, h] = oklab::oklch_from_oklab([lab.l, lab.a, lab.b]);
    Oklch { l, c, h }
}

/// Relative luminance as defined by WCAG 2.1, within `[0, 1]`.
pub fn relative_luminance(rgb: Rgb8) -> f64 {
    let [r, g, b] = rgb.channels().map(transfer::transfer_eo_wcag);
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

/// The WCAG 2.1 contrast ratio between two colors. Symmetric in its arguments.
pub fn contrast(first: Rgb8, second: Rgb8) -> Contrast {
    let lum1 = relative_luminance(first);
    let lum2 = relative_luminance(second);

    let lighter = lum1.max(lum2);
    let darker = lum1.min(lum2);
    let ratio = (lighter + 0.05) / (darker + 0.05);

    Contrast {
        ratio,
        rating: Rating::for_ratio(ratio),
    }
}

/// Parse the `rgb(r, g, b)` notation produced by a pipette.
pub fn parse_css_rgb(text: &str) -> Option<Rgb8> {
    let inner = text.trim().strip_prefix("rgb(")?.strip_suffix(')')?;
    let mut parts = inner.split(',').map(|part| part.trim().parse::<u8>());
    let r = parts.next()?.ok()?;
    let g = parts.next()?.ok()?;
    let b = parts.next()?.ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Rgb8 { r, g, b })
}

impl Rating {
    pub fn for_ratio(ratio: f64) -> Self {
        if ratio >= 7.0 {
            Rating::Aaa
        } else if ratio >= 4.5 {
            Rating::Aa
        } else if ratio >= 3.0 {
            Rating::AaLargeText
        } else {
            Rating::Insufficient
        }
    }

    /// Whether normal body text passes at this rating.
    pub fn passes_normal_text(self) -> bool {
        matches!(self, Rating::Aaa | Rating::Aa)
    }
}

impl ColorSample {
    pub fn new(rgb: Rgb8) -> Self {
        ColorSample {
            rgb,
            ..ColorSample::default()
        }
    }

    pub fn rgb(&self) -> Rgb8 {
        self.rgb
    }

    pub fn xyz(&self) -> Xyz {
        *self.xyz.get_or_init(|| to_xyz(self.rgb))
    }

    pub fn lab(&self) -> Lab {
        *self.lab.get_or_init(|| xyz_to_lab(self.xyz()))
    }

    pub fn oklch(&self) -> Oklch {
        *self.oklch.get_or_init(|| to_oklch(self.rgb))
    }

    /// Contrast of this sample against another color.
    pub fn contrast(&self, other: Rgb8) -> Contrast {
        contrast(self.rgb, other)
    }
}

impl PartialEq for ColorSample {
    fn eq(&self, other: &Self) -> bool {
        // The derived values are a pure function of the triple.
        self.rgb == other.rgb
    }
}

impl Eq for ColorSample {}

impl From<Rgb8> for ColorSample {
    fn from(rgb: Rgb8) -> Self {
        ColorSample::new(rgb)
    }
}

impl fmt::Display for Rgb8 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

impl fmt::Display for Xyz {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "X: {:.2}, Y: {:.2}, Z: {:.2}", self.x, self.y, self.z)
    }
}

impl fmt::Display for Lab {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "L: {:.2}, a: {:.2}, b: {:.2}", self.l, self.a, self.b)
    }
}

impl fmt::Display for Oklch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "L: {:.3}, C: {:.3}, h: {:.1}°", self.l, self.c, self.h)
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Rating::Aaa => "AAA",
            Rating::Aa => "AA",
            Rating::AaLargeText => "AA large text",
            Rating::Insufficient => "insufficient",
        })
    }
}

impl fmt::Display for Contrast {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:.2}:1 ({})", self.ratio, self.rating)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lab_reference_points() {
        let white = to_lab(Rgb8::WHITE);
        assert!((white.l - 100.0).abs() <= 0.5, "{:?}", white);
        assert!(white.a.abs() <= 0.5, "{:?}", white);
        assert!(white.b.abs() <= 0.5, "{:?}", white);

        let black = to_lab(Rgb8::BLACK);
        assert_eq!((black.l, black.a, black.b), (0.0, 0.0, 0.0));
    }

    #[test]
    fn xyz_of_red() {
        let red = to_xyz(Rgb8::new(255, 0, 0));
        assert_eq!(red.to_string(), "X: 41.25, Y: 21.27, Z: 1.93");
    }

    #[test]
    fn lab_of_red() {
        let red = to_lab(Rgb8::new(255, 0, 0));
        assert!((red.l - 53.24).abs() < 0.05, "{:?}", red);
        assert!((red.a - 80.09).abs() < 0.05, "{:?}", red);
        assert!((red.b - 67.20).abs() < 0.05, "{:?}", red);
    }

    #[test]
    fn oklch_formatting() {
        let red = to_oklch(Rgb8::new(255, 0, 0));
        assert_eq!(red.to_string(), "L: 0.628, C: 0.258, h: 29.2°");
    }

    #[test]
    fn gray_hue_is_normalized() {
        let gray = to_oklch(Rgb8::new(128, 128, 128));
        assert!(gray.c < 1e-4);
        assert!((0.0..360.0).contains(&gray.h));
    }

    #[test]
    fn contrast_identity_and_symmetry() {
        let c = Rgb8::new(12, 200, 99);
        let same = contrast(c, c);
        assert_eq!(same.ratio, 1.0);
        assert_eq!(same.rating, Rating::Insufficient);

        let other = Rgb8::new(240, 10, 10);
        assert_eq!(contrast(c, other), contrast(other, c));
    }

    #[test]
    fn black_on_white_is_maximal() {
        let c = contrast(Rgb8::BLACK, Rgb8::WHITE);
        assert!((c.ratio - 21.0).abs() < 1e-9);
        assert_eq!(c.rating, Rating::Aaa);
        assert_eq!(c.to_string(), "21.00:1 (AAA)");
    }

    #[test]
    fn rating_thresholds() {
        assert_eq!(Rating::for_ratio(7.0), Rating::Aaa);
        assert_eq!(Rating::for_ratio(6.99), Rating::Aa);
        assert_eq!(Rating::for_ratio(4.5), Rating::Aa);
        assert_eq!(Rating::for_ratio(4.49), Rating::AaLargeText);
        assert_eq!(Rating::for_ratio(3.0), Rating::AaLargeText);
        assert_eq!(Rating::for_ratio(2.99), Rating::Insufficient);
        assert!(!Rating::AaLargeText.passes_normal_text());
    }

    #[test]
    fn sample_derives_lazily() {
        let sample = ColorSample::new(Rgb8::new(255, 0, 0));
        assert_eq!(sample.lab(), to_lab(Rgb8::new(255, 0, 0)));
        assert_eq!(sample.xyz(), to_xyz(Rgb8::new(255, 0, 0)));
        assert_eq!(sample.oklch(), to_oklch(Rgb8::new(255, 0, 0)));
        assert_eq!(sample.clone(), sample);
    }

    #[test]
    fn parse_pipette_notation() {
        assert_eq!(parse_css_rgb("rgb(255, 128, 64)"), Some(Rgb8::new(255, 128, 64)));
        assert_eq!(parse_css_rgb("rgb(1,2,3)"), Some(Rgb8::new(1, 2, 3)));
        assert_eq!(parse_css_rgb("rgb(256, 0, 0)"), None);
        assert_eq!(parse_css_rgb("rgba(1, 2, 3, 4)"), None);
        assert_eq!(parse_css_rgb("rgb(1, 2, 3, 4)"), None);
    }
}
