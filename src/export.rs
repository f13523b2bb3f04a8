use anyhow::{Context, Result};
use std::path::Path;

use crate::models::Transaction;

const HEADER: [&str; 6] = ["id", "type", "date", "category", "description", "amount"];

/// Write transactions to a CSV file in the order given. Returns the number
/// of rows written.
pub(crate) fn export_to_csv(transactions: &[Transaction], path: &Path) -> Result<usize> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    wtr.write_record(HEADER)?;
    for txn in transactions {
        let date = txn.date.format("%Y-%m-%d").to_string();
        let amount = txn.amount.to_string();
        wtr.write_record([
            txn.id.as_str(),
            txn.kind.as_str(),
            date.as_str(),
            txn.category.as_str(),
            txn.description.as_str(),
            amount.as_str(),
        ])
        .with_context(|| format!("Failed to write transaction {}", txn.id))?;
    }
    wtr.flush().context("Failed to flush CSV file")?;
    Ok(transactions.len())
}
