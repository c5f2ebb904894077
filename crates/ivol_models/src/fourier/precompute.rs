//! Quote-level precomputation for the Carr-Madan sum.
//!
//! The Simpson weights, the frequency grid and the spot phase factors
//! `e^{-i v_j ln S}` depend only on `(n, η, α, S)`. They stay fixed while the
//! calibration loop varies the Heston parameters, so they are computed once
//! per quote and reused.

use num_complex::Complex64;

/// Frequency substituted for `v_0 = 0`, where the damped integrand has a
/// removable pole.
pub const ZERO_FREQUENCY: f64 = 1e-10;

/// Simpson rule weights `1/3, 4/3, 2/3, 4/3, …, 2/3, 4/3, 1/3`.
///
/// The first and last entries are `1/3`; interior entries are `4/3` at odd
/// indices and `2/3` at even ones.
///
/// # Examples
/// ```
/// use ivol_models::fourier::simpson_weights;
///
/// let w = simpson_weights(8);
/// assert_eq!(w[0], 1.0 / 3.0);
/// assert_eq!(w[1], 4.0 / 3.0);
/// assert_eq!(w[2], 2.0 / 3.0);
/// assert_eq!(w[7], 1.0 / 3.0);
/// ```
pub fn simpson_weights(n: usize) -> Vec<f64> {
    (0..n)
        .map(|j| {
            if j == 0 || j + 1 == n {
                1.0 / 3.0
            } else if j % 2 == 1 {
                4.0 / 3.0
            } else {
                2.0 / 3.0
            }
        })
        .collect()
}

/// Weights, frequencies and spot phase factors for one `(n, η, α, S)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Precomputation {
    n: usize,
    eta: f64,
    alpha: f64,
    spot: f64,
    weights: Vec<f64>,
    frequencies: Vec<f64>,
    spot_phase: Vec<Complex64>,
}

impl Precomputation {
    /// Compute the tables for a grid of `n` frequencies spaced `eta` apart.
    pub fn new(n: usize, eta: f64, alpha: f64, spot: f64) -> Self {
        let log_spot = spot.ln();
        let frequencies: Vec<f64> = (0..n)
            .map(|j| if j == 0 { ZERO_FREQUENCY } else { j as f64 * eta })
            .collect();
        let spot_phase = frequencies
            .iter()
            .map(|&v| Complex64::from_polar(1.0, -v * log_spot))
            .collect();

        Self {
            n,
            eta,
            alpha,
            spot,
            weights: simpson_weights(n),
            frequencies,
            spot_phase,
        }
    }

    /// Whether these tables serve `(n, η, α, S)`.
    ///
    /// Grid size, spacing and damping must match exactly; the spot may
    /// differ by at most `spot_tolerance`.
    pub fn matches(&self, n: usize, eta: f64, alpha: f64, spot: f64, spot_tolerance: f64) -> bool {
        self.n == n
            && self.eta == eta
            && self.alpha == alpha
            && (self.spot - spot).abs() <= spot_tolerance
    }

    /// Grid size.
    pub fn len(&self) -> usize {
        self.n
    }

    /// Whether the grid has no points.
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Damping exponent the tables were built for.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Frequency spacing.
    pub fn eta(&self) -> f64 {
        self.eta
    }

    /// Simpson weights.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Frequencies `v_j = jη`, with `v_0` replaced by [`ZERO_FREQUENCY`].
    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    /// Phase factors `e^{-i v_j ln S}`.
    pub fn spot_phase(&self) -> &[Complex64] {
        &self.spot_phase
    }
}

/// Single-slot cache of [`Precomputation`] tables.
#[derive(Debug, Clone, Default)]
pub struct PrecomputeCache {
    slot: Option<Precomputation>,
}

impl PrecomputeCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tables for `(n, η, α, S)`, rebuilding the slot when it does not match.
    ///
    /// The flag is `true` when the tables were rebuilt.
    pub fn get_or_build(
        &mut self,
        n: usize,
        eta: f64,
        alpha: f64,
        spot: f64,
        spot_tolerance: f64,
    ) -> (&Precomputation, bool) {
        let built = !self
            .slot
            .as_ref()
            .is_some_and(|p| p.matches(n, eta, alpha, spot, spot_tolerance));
        if built {
            self.slot = None;
        }
        let tables = self
            .slot
            .get_or_insert_with(|| Precomputation::new(n, eta, alpha, spot));
        (tables, built)
    }

    /// Drop the cached tables.
    pub fn clear(&mut self) {
        self.slot = None;
    }

    /// Whether a table is cached.
    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }
}
