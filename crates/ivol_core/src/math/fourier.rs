//! Fractional discrete Fourier transform.
//!
//! Computes
//!
//! ```text
//! Y_k = Σ_{j=0}^{N-1} x_j · exp(-2πi · β · j · k),   k = 0..N
//! ```
//!
//! for an arbitrary frequency scale `β > 0`. With `β = 1/N` this is the
//! ordinary forward DFT and is executed as a single length-`N` FFT. For any
//! other `β` the transform uses the chirp-z identity
//! `jk = (j² + k² − (k − j)²) / 2`, which turns the sum into a circular
//! convolution evaluated with two length-`2N` FFTs.
//!
//! Transform pricers use this to decouple the integration step in the
//! frequency domain from the output grid spacing.

use crate::types::TransformError;
use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

/// Tolerance on `β·N − 1` below which the plain DFT path is taken.
const PLAIN_DFT_TOLERANCE: f64 = 1e-12;

#[derive(Clone)]
enum Plan {
    /// `β = 1/N`: plain forward FFT.
    Plain(Arc<dyn Fft<f64>>),
    /// Chirp-z convolution of length `2N`.
    Chirp {
        forward: Arc<dyn Fft<f64>>,
        inverse: Arc<dyn Fft<f64>>,
        /// `exp(-iπβj²)` for `j < N`.
        chirp: Vec<Complex64>,
        /// FFT of the conjugate chirp wrapped to length `2N`.
        kernel_spectrum: Vec<Complex64>,
    },
}

/// Planned fractional DFT of fixed length and scale.
///
/// Planning allocates the FFT plans and the chirp tables once; the same plan
/// is then applied to any number of input vectors.
///
/// # Example
///
/// ```
/// use ivol_core::math::fourier::FractionalDft;
/// use num_complex::Complex64;
///
/// // β = 1/N reduces to the ordinary DFT
/// let dft = FractionalDft::new(4, 0.25).unwrap();
/// assert!(dft.is_plain());
///
/// let out = dft.transform(&[Complex64::new(1.0, 0.0); 4]).unwrap();
/// assert!((out[0].re - 4.0).abs() < 1e-12);
/// assert!(out[1].norm() < 1e-12);
/// ```
#[derive(Clone)]
pub struct FractionalDft {
    n: usize,
    beta: f64,
    plan: Plan,
}

impl FractionalDft {
    /// Plan a length-`n` transform with frequency scale `beta`.
    ///
    /// # Errors
    ///
    /// * `TransformError::InvalidLength` - `n` is not a power of two `>= 2`
    /// * `TransformError::InvalidScale` - `beta` is not finite and positive
    pub fn new(n: usize, beta: f64) -> Result<Self, TransformError> {
        if n < 2 || !n.is_power_of_two() {
            return Err(TransformError::InvalidLength { n });
        }
        if !(beta.is_finite() && beta > 0.0) {
            return Err(TransformError::InvalidScale { beta });
        }

        let mut planner = FftPlanner::<f64>::new();

        if (beta * n as f64 - 1.0).abs() < PLAIN_DFT_TOLERANCE {
            return Ok(Self {
                n,
                beta,
                plan: Plan::Plain(planner.plan_fft_forward(n)),
            });
        }

        let m = 2 * n;
        let forward = planner.plan_fft_forward(m);
        let inverse = planner.plan_fft_inverse(m);

        let chirp: Vec<Complex64> = (0..n).map(|j| chirp_phase(beta, j, -1.0)).collect();

        let mut kernel_spectrum: Vec<Complex64> = (0..m)
            .map(|j| {
                let lag = if j < n { j } else { m - j };
                chirp_phase(beta, lag, 1.0)
            })
            .collect();
        forward.process(&mut kernel_spectrum);

        Ok(Self {
            n,
            beta,
            plan: Plan::Chirp {
                forward,
                inverse,
                chirp,
                kernel_spectrum,
            },
        })
    }

    /// Apply the transform to `input`.
    ///
    /// # Errors
    ///
    /// `TransformError::LengthMismatch` when `input.len()` differs from the
    /// planned length.
    pub fn transform(&self, input: &[Complex64]) -> Result<Vec<Complex64>, TransformError> {
        if input.len() != self.n {
            return Err(TransformError::LengthMismatch {
                expected: self.n,
                got: input.len(),
            });
        }

        match &self.plan {
            Plan::Plain(fft) => {
                let mut buffer = input.to_vec();
                fft.process(&mut buffer);
                Ok(buffer)
            }
            Plan::Chirp {
                forward,
                inverse,
                chirp,
                kernel_spectrum,
            } => {
                let m = 2 * self.n;
                let mut buffer = vec![Complex64::new(0.0, 0.0); m];
                for (slot, (x, c)) in buffer.iter_mut().zip(input.iter().zip(chirp)) {
                    *slot = x * c;
                }

                forward.process(&mut buffer);
                for (b, k) in buffer.iter_mut().zip(kernel_spectrum) {
                    *b *= k;
                }
                inverse.process(&mut buffer);

                // rustfft leaves the inverse unnormalised
                let scale = 1.0 / m as f64;
                Ok(buffer
                    .iter()
                    .zip(chirp)
                    .map(|(b, c)| b * c * scale)
                    .collect())
            }
        }
    }

    /// Planned transform length.
    pub fn len(&self) -> usize {
        self.n
    }

    /// Always `false`: planning rejects empty transforms.
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Frequency scale `β`.
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Whether the plan degenerated to an ordinary length-`N` FFT.
    pub fn is_plain(&self) -> bool {
        matches!(self.plan, Plan::Plain(_))
    }
}

impl fmt::Debug for FractionalDft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FractionalDft")
            .field("n", &self.n)
            .field("beta", &self.beta)
            .field("plain", &self.is_plain())
            .finish()
    }
}

/// `exp(sign · iπβj²)`
fn chirp_phase(beta: f64, j: usize, sign: f64) -> Complex64 {
    let j = j as f64;
    Complex64::from_polar(1.0, sign * PI * beta * j * j)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    /// Direct O(N²) evaluation of the defining sum.
    fn naive(input: &[Complex64], beta: f64) -> Vec<Complex64> {
        let n = input.len();
        (0..n)
            .map(|k| {
                input
                    .iter()
                    .enumerate()
                    .map(|(j, x)| {
                        x * Complex64::from_polar(1.0, -2.0 * PI * beta * (j * k) as f64)
                    })
                    .sum()
            })
            .collect()
    }

    fn sample_input(n: usize) -> Vec<Complex64> {
        (0..n)
            .map(|j| {
                let t = j as f64;
                Complex64::new((0.3 * t).cos() + 0.1 * t, (0.7 * t).sin() - 0.05 * t)
            })
            .collect()
    }

    // ========================================
    // Planning Tests
    // ========================================

    #[test]
    fn test_rejects_non_power_of_two() {
        assert_eq!(
            FractionalDft::new(12, 0.1).unwrap_err(),
            TransformError::InvalidLength { n: 12 }
        );
        assert!(FractionalDft::new(1, 0.1).is_err());
        assert!(FractionalDft::new(0, 0.1).is_err());
    }

    #[test]
    fn test_rejects_bad_scale() {
        assert!(matches!(
            FractionalDft::new(8, 0.0),
            Err(TransformError::InvalidScale { .. })
        ));
        assert!(FractionalDft::new(8, f64::NAN).is_err());
        assert!(FractionalDft::new(8, -0.5).is_err());
    }

    #[test]
    fn test_plain_path_selected_for_inverse_length() {
        let dft = FractionalDft::new(16, 1.0 / 16.0).unwrap();
        assert!(dft.is_plain());
        assert_eq!(dft.len(), 16);
        assert!(!dft.is_empty());

        let chirp = FractionalDft::new(16, 0.01).unwrap();
        assert!(!chirp.is_plain());
    }

    #[test]
    fn test_length_mismatch() {
        let dft = FractionalDft::new(8, 0.01).unwrap();
        let err = dft.transform(&sample_input(4)).unwrap_err();
        assert_eq!(err, TransformError::LengthMismatch { expected: 8, got: 4 });
    }

    // ========================================
    // Accuracy Tests
    // ========================================

    #[test]
    fn test_plain_matches_naive() {
        let input = sample_input(32);
        let dft = FractionalDft::new(32, 1.0 / 32.0).unwrap();
        let fast = dft.transform(&input).unwrap();
        let slow = naive(&input, 1.0 / 32.0);
        for (a, b) in fast.iter().zip(&slow) {
            assert_relative_eq!(a.re, b.re, epsilon = 1e-9);
            assert_relative_eq!(a.im, b.im, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_chirp_matches_naive() {
        let input = sample_input(64);
        let beta = 0.0123;
        let dft = FractionalDft::new(64, beta).unwrap();
        let fast = dft.transform(&input).unwrap();
        let slow = naive(&input, beta);
        for (a, b) in fast.iter().zip(&slow) {
            assert_relative_eq!(a.re, b.re, epsilon = 1e-8);
            assert_relative_eq!(a.im, b.im, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_chirp_with_large_scale_matches_naive() {
        // β > 1/N wraps the output frequencies several times
        let input = sample_input(16);
        let beta = 0.37;
        let dft = FractionalDft::new(16, beta).unwrap();
        let fast = dft.transform(&input).unwrap();
        let slow = naive(&input, beta);
        for (a, b) in fast.iter().zip(&slow) {
            assert_relative_eq!(a.re, b.re, epsilon = 1e-9);
            assert_relative_eq!(a.im, b.im, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_zero_frequency_is_sum() {
        let input = sample_input(128);
        let dft = FractionalDft::new(128, 0.002).unwrap();
        let out = dft.transform(&input).unwrap();
        let sum: Complex64 = input.iter().sum();
        assert_relative_eq!(out[0].re, sum.re, epsilon = 1e-8);
        assert_relative_eq!(out[0].im, sum.im, epsilon = 1e-8);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn prop_chirp_linear(beta in 0.001f64..0.2, a in -3.0f64..3.0) {
            let x = sample_input(32);
            let scaled: Vec<Complex64> = x.iter().map(|v| v * a).collect();
            let dft = FractionalDft::new(32, beta).unwrap();
            let y = dft.transform(&x).unwrap();
            let ys = dft.transform(&scaled).unwrap();
            for (u, v) in y.iter().zip(&ys) {
                prop_assert!((u * a - v).norm() < 1e-8);
            }
        }
    }
}
