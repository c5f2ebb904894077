//! Heston implied volatility calculator

use std::process::ExitCode;

use clap::Parser;
use ivol_cli::cli::HestonCli;
use ivol_cli::{commands, finish, logging, report_parse_error};

fn main() -> ExitCode {
    let cli = match HestonCli::try_parse() {
        Ok(cli) => cli,
        Err(err) => return report_parse_error(err),
    };

    logging::init(cli.log.verbosity());
    finish(commands::heston_iv::run(&cli))
}
