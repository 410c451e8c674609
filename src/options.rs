use rust_decimal::Decimal;

use crate::cli::{InvoiceArgs, SetConfigArgs};
use crate::config::{non_empty, non_zero, Config};
use crate::error::OptionError;

pub const DEFAULT_MODEL: &str = "anthropic/claude-haiku-4-5";

/// Options for one invoice after the command line has been merged over
/// the stored configuration.
#[derive(Debug, PartialEq, Clone)]
pub struct InvoiceOptions {
    pub vendor: String,
    pub customer: String,
    pub rate: Decimal,
    pub hours: Decimal,
    pub pdf: bool,
    pub model: String,
}

/// Command line values win when non-empty and non-zero, the stored
/// configuration fills the rest.
pub fn resolve(
    args: &InvoiceArgs,
    config: &Config,
) -> Result<InvoiceOptions, OptionError> {
    let vendor = non_empty(args.vendor.clone())
        .or_else(|| non_empty(config.vendor.clone()))
        .ok_or(OptionError::MissingRequiredOption { name: "vendor" })?;
    let customer = non_empty(args.customer.clone())
        .or_else(|| non_empty(config.customer.clone()))
        .ok_or(OptionError::MissingRequiredOption { name: "customer" })?;
    let rate = positive("rate", args.rate, config.rate)?;
    let hours = positive("hours", args.hours, config.hours)?;
    let model = non_empty(args.model.clone())
        .or_else(|| non_empty(config.model.clone()))
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    Ok(InvoiceOptions {
        vendor,
        customer,
        rate,
        hours,
        pdf: args.pdf || config.pdf.unwrap_or(false),
        model,
    })
}

// An explicit zero only surfaces when nothing else is available, and then
// fails as non-positive rather than missing.
fn positive(
    name: &'static str,
    arg: Option<Decimal>,
    stored: Option<Decimal>,
) -> Result<Decimal, OptionError> {
    let value = non_zero(arg)
        .or(stored)
        .or(arg)
        .ok_or(OptionError::MissingRequiredOption { name })?;
    if value <= Decimal::ZERO {
        return Err(OptionError::NonPositive { name, value });
    }
    Ok(value)
}

impl From<SetConfigArgs> for Config {
    fn from(args: SetConfigArgs) -> Self {
        Self {
            vendor: args.vendor,
            customer: args.customer,
            rate: args.rate,
            hours: args.hours,
            pdf: args.pdf,
            model: args.model,
        }
    }
}
