mod cli;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

pub(crate) use cli::as_cli;

/// Flags that consume the following argument as their value.
const VALUE_FLAGS: &[&str] = &["--date", "--desc", "--limit", "--month", "--category"];

pub(crate) fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

pub(crate) fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

/// Arguments that are neither flags nor values of flags.
pub(crate) fn positionals(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if VALUE_FLAGS.contains(&arg.as_str()) {
            skip_next = true;
            continue;
        }
        if arg.starts_with("--") {
            continue;
        }
        out.push(arg.as_str());
    }
    out
}

/// Parse a user-entered amount such as `1,250.00` or `$19.99`.
pub(crate) fn parse_amount(s: &str) -> Result<Decimal> {
    let cleaned = s.replace(['$', ','], "");
    let amount = Decimal::from_str(cleaned.trim())
        .with_context(|| format!("Invalid amount: '{s}'"))?;
    if amount < Decimal::ZERO {
        anyhow::bail!("Amount must not be negative: '{s}'");
    }
    Ok(amount)
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{s}', expected YYYY-MM-DD"))
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
