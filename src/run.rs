use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::billing::{weeks_for_month, Invoice, Money};
use crate::cli::{Command, InvoiceArgs, Setable, SetConfigArgs};
use crate::config;
use crate::error::{ConfigError, OptionError};
use crate::generate::{self, GenerateError, Generator};
use crate::month::{self, Clock};
use crate::options;
use crate::pdf::{self, RenderError};

/// Everything a run touches outside its arguments.
pub struct Context<'a> {
    pub config_path: PathBuf,
    pub output_dir: PathBuf,
    pub search_path: OsString,
    pub clock: &'a dyn Clock,
    pub generator: &'a dyn Generator,
}

/// Invoices are written to the working directory, or the temp directory
/// when it is unavailable.
pub fn output_dir() -> PathBuf {
    env::current_dir().unwrap_or_else(|_| env::temp_dir())
}

/// Paths written by an invoice run.
#[derive(Debug, PartialEq)]
pub struct Written {
    pub html: PathBuf,
    pub pdf: Option<PathBuf>,
}

pub fn run_cmd(
    args: &InvoiceArgs,
    cmd: Option<Command>,
    ctx: &Context,
) -> Result<(), RunError> {
    match cmd {
        Some(Command::Set { property }) => match property {
            Setable::Config(updates) => set_config(&ctx.config_path, updates),
        },
        None => {
            let (invoice, written) = invoice(args, ctx)?;
            println!("Invoice generated: {}", written.html.display());
            if let Some(pdf) = written.pdf {
                println!("PDF generated: {}", pdf.display());
            }
            println!("\n{}", invoice);
            Ok(())
        }
    }
}

fn set_config(path: &Path, updates: SetConfigArgs) -> Result<(), RunError> {
    let config = config::save(path, updates.into())?;
    debug!("stored configuration: {:?}", config);
    println!("Configuration saved to {}", path.display());
    Ok(())
}

/// Build the invoice for the requested month, have it generated as HTML
/// and optionally converted to PDF.
pub fn invoice(
    args: &InvoiceArgs,
    ctx: &Context,
) -> Result<(Invoice, Written), RunError> {
    let stored = config::load(&ctx.config_path)?;
    let opts = options::resolve(args, &stored)?;
    let month = month::resolve(args.month.as_deref(), args.year, ctx.clock.now())?;
    info!("invoicing {} for {}", month, opts.customer);

    let weeks = weeks_for_month(month, opts.hours);
    for week in weeks.iter() {
        debug!("week {}: {} hours", week.period, week.hours);
    }
    let invoice = Invoice::new(
        month,
        opts.vendor,
        opts.customer,
        Money::new(opts.rate),
        weeks,
    );
    info!(
        "{} weeks, {} hours, {}",
        invoice.weeks.len(),
        invoice.total_hours().round_dp(2),
        invoice.total()
    );

    let html = invoice.html_path(&ctx.output_dir);
    generate::html(ctx.generator, &invoice, &opts.model, &html)?;

    let pdf = if opts.pdf {
        let pdf = invoice.pdf_path(&ctx.output_dir);
        let renderer = pdf::convert_with(&ctx.search_path, &html, &pdf)?;
        info!("converted with {}", renderer);
        Some(pdf)
    } else {
        None
    };

    Ok((invoice, Written { html, pdf }))
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("{source}")]
    Options {
        #[from]
        source: OptionError,
    },

    #[error("{source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Generation Error: {source}")]
    Generate {
        #[from]
        source: GenerateError,
    },

    #[error("PDF Error: {source}")]
    Render {
        #[from]
        source: RenderError,
    },
}
