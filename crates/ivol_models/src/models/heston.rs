//! Heston確率的ボラティリティモデル
//!
//! Hestonモデルは以下のSDEで記述される:
//! ```text
//! dS = (r - q) * S * dt + sqrt(V) * S * dW_S
//! dV = kappa * (theta - V) * dt + sigma * sqrt(V) * dW_V
//! E[dW_S * dW_V] = rho * dt
//! ```
//! ここで:
//! - v0 = 初期分散
//! - kappa = 平均回帰速度
//! - theta = 長期分散
//! - sigma = ボラティリティのボラティリティ (vol-of-vol)
//! - rho = 資産価格と分散の相関
//!
//! ## 特性関数
//!
//! Albrecher et al. (2007) の "little Heston trap" 形式を使用する:
//! ```text
//! b = kappa - rho * sigma * i * u
//! d = sqrt(b^2 + sigma^2 * (i * u - (i * u)^2))
//! g = (b - d) / (b + d)
//! A = (r - q) * i * u * T + (kappa * theta / sigma^2) * [(b - d) * T - 2 ln((1 - g e^{-dT}) / (1 - g))]
//! B = (b - d) * (1 - e^{-dT}) / (sigma^2 * (1 - g e^{-dT}))
//! phi(u) = exp(A + B * v0 + i * u * ln S)
//! ```
//! 複素対数は主枝を一様に使用する。`g`、`A`、`B` のいずれかが非有限の場合は
//! 中立値 `1 + 0i` を返す。
//!
//! ## Feller条件
//!
//! `2 * kappa * theta >= sigma^2` は強制しない。違反時も特性関数は有限値を返す。
//!
//! ## 使用例
//!
//! ```
//! use ivol_models::models::heston::HestonParams;
//!
//! let params = HestonParams::new(0.04, 1.5, 0.04, 0.3, -0.7).unwrap();
//! assert!(params.satisfies_feller());
//! assert!((params.initial_vol() - 0.2).abs() < 1e-12);
//! ```

use ivol_core::types::PricingError;
use num_complex::Complex64;
use thiserror::Error;
use tracing::trace;

use crate::quote::MarketState;

/// Hestonモデルエラー型
///
/// # バリアント
///
/// - `InvalidV0`: 初期分散が正でない
/// - `InvalidKappa`: 平均回帰速度が正でない
/// - `InvalidTheta`: 長期分散が正でない
/// - `InvalidSigma`: vol-of-volが正でない
/// - `InvalidRho`: 相関が(-1, 1)の範囲外
///
/// # 例
///
/// ```
/// use ivol_models::models::heston::HestonError;
///
/// let err = HestonError::InvalidV0(-0.04);
/// assert!(format!("{}", err).contains("-0.04"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HestonError {
    /// 初期分散が正でない
    #[error("無効な初期分散: v0 = {0} (正の値が必要)")]
    InvalidV0(f64),

    /// 平均回帰速度が正でない
    #[error("無効な平均回帰速度: kappa = {0} (正の値が必要)")]
    InvalidKappa(f64),

    /// 長期分散が正でない
    #[error("無効な長期分散: theta = {0} (正の値が必要)")]
    InvalidTheta(f64),

    /// vol-of-volが正でない
    #[error("無効なvol-of-vol: sigma = {0} (正の値が必要)")]
    InvalidSigma(f64),

    /// 相関が範囲外
    #[error("無効な相関係数: rho = {0} ((-1, 1)の範囲が必要)")]
    InvalidRho(f64),
}

impl From<HestonError> for PricingError {
    fn from(err: HestonError) -> Self {
        PricingError::InvalidInput(err.to_string())
    }
}

/// Hestonモデルパラメータ
///
/// # 例
///
/// ```
/// use ivol_models::models::heston::HestonParams;
///
/// assert!(HestonParams::new(0.04, 1.5, 0.04, 0.3, -0.7).is_ok());
/// assert!(HestonParams::new(0.04, 1.5, 0.04, 0.3, -1.0).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HestonParams {
    /// 初期分散 (v0)
    pub v0: f64,
    /// 平均回帰速度 (kappa)
    pub kappa: f64,
    /// 長期分散 (theta)
    pub theta: f64,
    /// ボラティリティのボラティリティ (sigma)
    pub sigma: f64,
    /// 相関係数 (rho)
    pub rho: f64,
}

impl HestonParams {
    /// 新しいHestonパラメータを作成（検証付き）
    ///
    /// # 引数
    ///
    /// * `v0` - 初期分散（正）
    /// * `kappa` - 平均回帰速度（正）
    /// * `theta` - 長期分散（正）
    /// * `sigma` - vol-of-vol（正）
    /// * `rho` - 相関係数（-1から1の開区間）
    pub fn new(v0: f64, kappa: f64, theta: f64, sigma: f64, rho: f64) -> Result<Self, HestonError> {
        let params = Self {
            v0,
            kappa,
            theta,
            sigma,
            rho,
        };
        params.validate()?;
        Ok(params)
    }

    /// パラメータを検証
    pub fn validate(&self) -> Result<(), HestonError> {
        let positive = |x: f64| x.is_finite() && x > 0.0;

        if !positive(self.v0) {
            return Err(HestonError::InvalidV0(self.v0));
        }
        if !positive(self.kappa) {
            return Err(HestonError::InvalidKappa(self.kappa));
        }
        if !positive(self.theta) {
            return Err(HestonError::InvalidTheta(self.theta));
        }
        if !positive(self.sigma) {
            return Err(HestonError::InvalidSigma(self.sigma));
        }
        if !(self.rho > -1.0 && self.rho < 1.0) {
            return Err(HestonError::InvalidRho(self.rho));
        }
        Ok(())
    }

    /// 初期ボラティリティ sqrt(v0)
    #[inline]
    pub fn initial_vol(&self) -> f64 {
        self.v0.sqrt()
    }

    /// Feller条件 `2 * kappa * theta >= sigma^2` を満たすか
    pub fn satisfies_feller(&self) -> bool {
        self.feller_ratio() >= 1.0
    }

    /// Feller比率 (2 * kappa * theta / sigma^2)
    pub fn feller_ratio(&self) -> f64 {
        2.0 * self.kappa * self.theta / (self.sigma * self.sigma)
    }

    /// 対数価格の特性関数 phi(u) = E[exp(i * u * ln S_T)]
    ///
    /// 複素引数 `u` を受け付ける。Carr-Madan では減衰形
    /// `phi(v - (alpha + 1) i)` として評価される。
    pub fn characteristic_function(&self, u: Complex64, market: &MarketState) -> Complex64 {
        let one = Complex64::new(1.0, 0.0);
        let iu = Complex64::i() * u;
        let t = market.expiry;
        let sigma2 = self.sigma * self.sigma;

        let b = self.kappa - iu * (self.rho * self.sigma);
        let d = (b * b + (iu - iu * iu) * sigma2).sqrt();
        let g = (b - d) / (b + d);
        if !g.is_finite() {
            trace!(?u, "non-finite g in Heston characteristic function");
            return one;
        }

        let exp_dt = (-d * t).exp();
        let one_minus_g_exp = one - g * exp_dt;
        let log_term = (one_minus_g_exp / (one - g)).ln();

        let a = iu * ((market.rate - market.dividend) * t)
            + ((b - d) * t - log_term * 2.0) * (self.kappa * self.theta / sigma2);
        let b_coef = (b - d) * (one - exp_dt) / (one_minus_g_exp * sigma2);
        if !(a.is_finite() && b_coef.is_finite()) {
            trace!(?u, "non-finite A or B in Heston characteristic function");
            return one;
        }

        (a + b_coef * self.v0 + iu * market.spot.ln()).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn market() -> MarketState {
        MarketState::new(100.0, 1.0, 0.05, 0.02).unwrap()
    }

    // ================================================================
    // パラメータ検証
    // ================================================================

    #[test]
    fn test_new_valid() {
        let p = HestonParams::new(0.04, 1.5, 0.04, 0.3, -0.7).unwrap();
        assert_eq!(p.v0, 0.04);
        assert_eq!(p.rho, -0.7);
    }

    #[test]
    fn test_new_invalid_each_field() {
        assert_eq!(
            HestonParams::new(0.0, 1.5, 0.04, 0.3, -0.7).unwrap_err(),
            HestonError::InvalidV0(0.0)
        );
        assert_eq!(
            HestonParams::new(0.04, -1.0, 0.04, 0.3, -0.7).unwrap_err(),
            HestonError::InvalidKappa(-1.0)
        );
        assert_eq!(
            HestonParams::new(0.04, 1.5, f64::NAN, 0.3, -0.7)
                .unwrap_err()
                .to_string(),
            HestonError::InvalidTheta(f64::NAN).to_string()
        );
        assert_eq!(
            HestonParams::new(0.04, 1.5, 0.04, 0.0, -0.7).unwrap_err(),
            HestonError::InvalidSigma(0.0)
        );
        assert_eq!(
            HestonParams::new(0.04, 1.5, 0.04, 0.3, 1.0).unwrap_err(),
            HestonError::InvalidRho(1.0)
        );
    }

    #[test]
    fn test_error_to_pricing_error() {
        let err: PricingError = HestonError::InvalidSigma(-0.1).into();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_feller() {
        // 2 * 1.5 * 0.04 = 0.12 > 0.09
        let p = HestonParams::new(0.04, 1.5, 0.04, 0.3, -0.7).unwrap();
        assert!(p.satisfies_feller());
        assert_relative_eq!(p.feller_ratio(), 0.12 / 0.09, epsilon = 1e-12);

        // 2 * 0.5 * 0.04 = 0.04 < 0.25
        let q = HestonParams::new(0.04, 0.5, 0.04, 0.5, -0.7).unwrap();
        assert!(!q.satisfies_feller());
    }

    // ================================================================
    // 特性関数
    // ================================================================

    #[test]
    fn test_cf_at_zero_is_one() {
        let p = HestonParams::new(0.04, 1.5, 0.04, 0.3, -0.7).unwrap();
        let phi = p.characteristic_function(Complex64::new(0.0, 0.0), &market());
        assert_relative_eq!(phi.re, 1.0, epsilon = 1e-12);
        assert_relative_eq!(phi.im, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_cf_martingale() {
        // phi(-i) = E[S_T] = S * exp((r - q) T)
        let m = market();
        for p in [
            HestonParams::new(0.04, 1.5, 0.04, 0.3, -0.7).unwrap(),
            HestonParams::new(0.09, 0.5, 0.02, 1.2, -0.9).unwrap(),
            HestonParams::new(0.8, 3.0, 0.8, 0.78, -0.75).unwrap(),
        ] {
            let phi = p.characteristic_function(Complex64::new(0.0, -1.0), &m);
            assert_relative_eq!(phi.re, m.forward(), max_relative = 1e-10);
            assert!(phi.im.abs() < 1e-8);
        }
    }

    #[test]
    fn test_cf_bounded_on_real_axis() {
        // |phi(u)| <= 1 for real u (up to the spot phase)
        let p = HestonParams::new(0.04, 0.5, 0.04, 1.0, -0.9).unwrap();
        for k in 0..200 {
            let u = Complex64::new(k as f64 * 0.5, 0.0);
            let phi = p.characteristic_function(u, &market());
            assert!(phi.is_finite());
            assert!(phi.norm() <= 1.0 + 1e-10, "|phi({})| = {}", u, phi.norm());
        }
    }

    #[test]
    fn test_cf_tiny_vol_of_vol_is_lognormal() {
        // sigma -> 0, v0 = theta: log-price is normal with variance v0 * T
        let m = market();
        let p = HestonParams::new(0.04, 1.5, 0.04, 1e-4, 0.0).unwrap();
        let u = 1.7;
        let phi = p.characteristic_function(Complex64::new(u, 0.0), &m);

        let mean = m.spot.ln() + (m.rate - m.dividend - 0.02) * m.expiry;
        let expected = Complex64::new(-0.5 * 0.04 * u * u, u * mean).exp();
        assert_relative_eq!(phi.re, expected.re, epsilon = 1e-5);
        assert_relative_eq!(phi.im, expected.im, epsilon = 1e-5);
    }

    #[test]
    fn test_cf_non_finite_is_neutral() {
        let p = HestonParams {
            v0: 0.04,
            kappa: 1.5,
            theta: 0.04,
            sigma: 0.3,
            rho: -0.7,
        };
        let phi = p.characteristic_function(Complex64::new(f64::NAN, 0.0), &market());
        assert_eq!(phi, Complex64::new(1.0, 0.0));
    }
}
