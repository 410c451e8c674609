/*
 * Monthly invoices for an hourly contractor
 *
 * Invoice a month:
 *  - Resolve the month (previous month by default, closest year otherwise)
 *  - Split it into Monday to Sunday weeks owned by their Wednesday
 *  - Prorate weekly hours by the workdays left in boundary weeks
 *  - Ask opencode to write a styled HTML invoice and confirm it exists
 *  - Optionally convert the HTML to PDF
 *
 * Defaults for vendor, customer, rate, hours, pdf and model live in
 * ~/.invoicer/config and are updated with `set config`.
 */

mod billing;
mod calendar;
mod cli;
mod config;
mod error;
mod generate;
mod logging;
mod month;
mod options;
mod pdf;
mod run;
mod templates;

use std::env;
use std::process;

use clap::Parser;

use crate::cli::Opts;
use crate::generate::Opencode;
use crate::month::SystemClock;
use crate::run::{Context, RunError};

fn main() {
    let opts = Opts::parse();
    logging::init();

    if let Err(error) = run(opts) {
        eprintln!("{}", error);
        process::exit(1);
    }
}

fn run(opts: Opts) -> Result<(), RunError> {
    let config_path = match opts.config {
        Some(path) => path,
        None => config::default_path()?,
    };
    let generator = Opencode::default();

    let ctx = Context {
        config_path,
        output_dir: run::output_dir(),
        search_path: env::var_os("PATH").unwrap_or_default(),
        clock: &SystemClock,
        generator: &generator,
    };

    run::run_cmd(&opts.invoice, opts.subcommand, &ctx)
}
