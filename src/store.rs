//! Loading the saved transaction list.
//!
//! The tracker saves its transactions as a JSON array of
//! [TransactionRecord]s. This module reads that file and validates it before
//! anything is handed to the analytics engine.

use std::{fs, path::Path};

use time::UtcOffset;

use crate::{
    Error,
    config::DatePolicy,
    transaction::{Transaction, TransactionRecord},
};

/// Read the transactions saved at `path`.
///
/// See [parse_transactions] for how the contents are interpreted.
///
/// # Errors
/// Returns [Error::Io] if the file cannot be read, otherwise the errors of
/// [parse_transactions].
pub fn load_transactions(
    path: &Path,
    offset: UtcOffset,
    date_policy: DatePolicy,
) -> Result<Vec<Transaction>, Error> {
    let json = fs::read_to_string(path).map_err(|error| Error::Io {
        path: path.display().to_string(),
        message: error.to_string(),
    })?;

    let transactions = parse_transactions(&json, offset, date_policy)?;
    tracing::info!(
        "loaded {} transactions from {}",
        transactions.len(),
        path.display()
    );

    Ok(transactions)
}

/// Parse a JSON array of transaction records.
///
/// Bare `YYYY-MM-DD` dates are placed at midnight in `offset`.
///
/// # Errors
/// - [Error::MalformedInput] if `json` is not an array of transactions.
/// - [Error::InvalidDate] if a date cannot be parsed and `date_policy` is
///   [DatePolicy::Reject]. With [DatePolicy::Skip] the record is dropped.
pub fn parse_transactions(
    json: &str,
    offset: UtcOffset,
    date_policy: DatePolicy,
) -> Result<Vec<Transaction>, Error> {
    let records: Vec<TransactionRecord> =
        serde_json::from_str(json).map_err(|error| Error::MalformedInput(error.to_string()))?;

    let mut transactions = Vec::with_capacity(records.len());

    for record in records {
        match (record.to_transaction(offset), date_policy) {
            (Some(transaction), _) => transactions.push(transaction),
            (None, DatePolicy::Skip) => {
                tracing::warn!(
                    "dropping transaction \"{}\" with unparseable date {:?}",
                    record.id,
                    record.date
                );
            }
            (None, DatePolicy::Reject) => return Err(Error::InvalidDate(record.id)),
        }
    }

    Ok(transactions)
}
