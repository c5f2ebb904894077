//! Standard normal distribution functions.
//!
//! - `norm_cdf`: Φ(x) = ½·(1 + erf(x/√2)), evaluated as ½·erfc(−x/√2)
//! - `norm_pdf`: φ(x) = e^{−x²/2}/√(2π)
//!
//! Both are generic over `T: Float`.

use num_traits::Float;

/// 1 / sqrt(2 * pi)
const FRAC_1_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

/// Abramowitz & Stegun 7.1.26 polynomial coefficients, lowest order first.
const ERFC_POLY: [f64; 5] = [
    0.254_829_592,
    -0.284_496_736,
    1.421_413_741,
    -1.453_152_027,
    1.061_405_429,
];

/// A&S 7.1.26 rational argument scale.
const ERFC_P: f64 = 0.327_591_1;

#[inline]
fn constant<T: Float>(value: f64) -> T {
    T::from(value).unwrap_or_else(T::nan)
}

/// Complementary error function, A&S 7.1.26 (absolute error below 1.5e-7).
///
/// Evaluated on |x| and reflected with erfc(−x) = 2 − erfc(x).
#[inline]
fn erfc<T: Float>(x: T) -> T {
    let one = T::one();
    let abs_x = x.abs();
    let t = one / (one + constant::<T>(ERFC_P) * abs_x);

    // Horner, highest order first
    let poly = ERFC_POLY
        .iter()
        .rev()
        .fold(T::zero(), |acc, &c| acc * t + constant(c));

    let tail = t * poly * (-abs_x * abs_x).exp();
    if x < T::zero() {
        one + one - tail
    } else {
        tail
    }
}

/// Standard normal cumulative distribution function.
///
/// # Accuracy
/// Absolute error below 1e-7 for all finite x; the result always lies in
/// `[0, 1]`.
///
/// # Examples
/// ```
/// use ivol_models::analytical::norm_cdf;
///
/// assert!((norm_cdf(0.0_f64) - 0.5).abs() < 1e-7);
/// assert!(norm_cdf(-3.0_f64) < 0.01);
/// assert!(norm_cdf(3.0_f64) > 0.99);
/// ```
#[inline]
pub fn norm_cdf<T: Float>(x: T) -> T {
    let half = constant::<T>(0.5);
    half * erfc(-x / constant(std::f64::consts::SQRT_2))
}

/// Standard normal probability density function.
///
/// # Examples
/// ```
/// use ivol_models::analytical::norm_pdf;
///
/// assert!((norm_pdf(0.0_f64) - 0.3989422804).abs() < 1e-9);
/// assert!((norm_pdf(1.0_f64) - 0.2419707245).abs() < 1e-9);
/// ```
#[inline]
pub fn norm_pdf<T: Float>(x: T) -> T {
    let half = constant::<T>(0.5);
    constant::<T>(FRAC_1_SQRT_2PI) * (-half * x * x).exp()
}
