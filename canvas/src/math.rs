/// Equivalent to `f64::powf` but suitable on `no_std`.
#[inline]
pub(crate) fn pow(base: f64, exp: f64) -> f64 {
    libm::pow(base, exp)
}

/// Real cube root, defined for negative values.
#[inline]
pub(crate) fn cbrt(val: f64) -> f64 {
    libm::cbrt(val)
}

#[inline]
pub(crate) fn atan2(y: f64, x: f64) -> f64 {
    libm::atan2(y, x)
}

#[inline]
pub(crate) fn sqrt(val: f64) -> f64 {
    libm::sqrt(val)
}

/// Round half away from zero, then saturate into a byte.
#[inline]
pub(crate) fn round_u8(val: f64) -> u8 {
    libm::round(val.clamp(0.0, 255.0)) as u8
}

/// Round half towards positive infinity, as `Math.round` in a browser does.
///
/// Differs from [`libm::round`] only for negative values ending in exactly `.5`.
#[inline]
pub(crate) fn round_half_up(val: f64) -> f64 {
    libm::floor(val + 0.5)
}

#[inline]
pub(crate) fn floor(val: f64) -> f64 {
    libm::floor(val)
}
