//! Black-Scholes implied volatility command

use ivol_models::analytical::ImpliedVolSolver;
use tracing::debug;

use crate::cli::BsCli;
use crate::error::Result;

/// Run the Black-Scholes calculator and return the implied volatility.
pub fn run(cli: &BsCli) -> Result<f64> {
    let (price, quote) = cli.quote.parse()?;
    debug!(
        "Inputs - Price: {}, Spot: {}, Strike: {}, Time: {}, Rate: {}, Dividend: {}",
        price, quote.spot, quote.strike, quote.expiry, quote.rate, quote.dividend
    );

    let vol = ImpliedVolSolver::default().solve(price, &quote)?;
    Ok(vol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use approx::assert_abs_diff_eq;
    use clap::Parser;

    fn cli(args: &[&str]) -> BsCli {
        BsCli::try_parse_from(std::iter::once("bs_implied_vol").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_at_the_money() {
        let vol = run(&cli(&["10.45", "100", "100", "1.0", "0.05", "0.0"])).unwrap();
        assert_abs_diff_eq!(vol, 0.2, epsilon = 1e-3);
    }

    #[test]
    fn test_negative_price_is_rejected() {
        let err = run(&cli(&["-1", "100", "100", "1.0", "0.05", "0.0"])).unwrap_err();
        assert!(matches!(err, CliError::Calculation(_)));
    }

    #[test]
    fn test_non_numeric_argument() {
        let err = run(&cli(&["ten", "100", "100", "1.0", "0.05", "0.0"])).unwrap_err();
        assert!(matches!(err, CliError::InvalidNumber(_)));
    }
}
