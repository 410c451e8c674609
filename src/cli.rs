use clap::{Args, Parser, Subcommand, ValueHint};
use rust_decimal::Decimal;
use std::path::PathBuf;

/* Argument Stucture
 *
 * [month] [year] [--vendor | --customer | --rate | --hours | --pdf | --model]
 * set config [--vendor | --customer | --rate | --hours | --pdf | --model]
 */

/// Generate invoices for an hourly contractor
#[derive(Parser)]
#[clap(name = "invoicer")]
pub struct Opts {
    /// Configuration file, defaults to ~/.invoicer/config
    #[clap(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[clap(flatten)]
    pub invoice: InvoiceArgs,

    #[clap(subcommand)]
    pub subcommand: Option<Command>,
}

#[derive(Args, Debug, Default, Clone)]
pub struct InvoiceArgs {
    /// Month to invoice for (e.g. 'january', 'jan', or '1'), defaults to
    /// the previous month
    pub month: Option<String>,

    /// Year of the month to invoice for, defaults to the year closest to
    /// the given month
    pub year: Option<i32>,

    /// Name of the contractor sending the invoice
    #[clap(short, long)]
    pub vendor: Option<String>,

    /// Name of the client receiving the invoice
    #[clap(short, long)]
    pub customer: Option<String>,

    /// Hourly rate in dollars
    #[clap(short, long)]
    pub rate: Option<Decimal>,

    /// Hours worked in a full week
    #[clap(short = 'H', long)]
    pub hours: Option<Decimal>,

    /// Convert the HTML invoice to a PDF file
    #[clap(short, long)]
    pub pdf: bool,

    /// opencode model used to generate the invoice
    /// [default: anthropic/claude-haiku-4-5]
    #[clap(short, long)]
    pub model: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Manage stored settings
    Set {
        #[clap(subcommand)]
        property: Setable,
    },
}

#[derive(Subcommand)]
pub enum Setable {
    /// Store default options in the configuration file
    Config(SetConfigArgs),
}

#[derive(Args, Debug, Default, Clone)]
pub struct SetConfigArgs {
    /// Name of the contractor sending the invoice
    #[clap(long)]
    pub vendor: Option<String>,

    /// Name of the client receiving the invoice
    #[clap(long)]
    pub customer: Option<String>,

    /// Hourly rate in dollars
    #[clap(long)]
    pub rate: Option<Decimal>,

    /// Hours worked in a full week
    #[clap(long)]
    pub hours: Option<Decimal>,

    /// Convert invoices to PDF by default
    #[clap(long, value_name = "BOOL")]
    pub pdf: Option<bool>,

    /// opencode model used to generate invoices
    #[clap(long)]
    pub model: Option<String>,
}
