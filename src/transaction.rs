//! Defines the transaction model consumed by the analytics engine.
//!
//! There are two representations of a transaction:
//! - [Transaction] is the in-process form with a real timestamp.
//! - [TransactionRecord] is the wire form, where the date is plain text. This
//!   is what gets stored on disk and what crosses into the analytics worker.
//!
//! The engine reads both through the [LedgerEntry] trait.

use serde::{Deserialize, Serialize};
use time::{
    Date, OffsetDateTime, Time, UtcOffset,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::format_description,
};

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming in, e.g. a salary payment.
    Income,
    /// Money going out, e.g. groceries.
    Expense,
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: String,
    /// Whether the transaction is income or an expense.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// A free-form category label, e.g. "Food" or "Transport".
    pub category: String,
    /// How much money moved. Always a magnitude, the sign comes from `kind`.
    pub amount: f64,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction happened.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(kind: TransactionType, amount: f64, date: OffsetDateTime) -> TransactionBuilder {
        TransactionBuilder {
            kind,
            amount,
            date,
            category: String::new(),
            description: String::new(),
        }
    }

    /// Convert the transaction to its wire form with the date formatted as
    /// RFC 3339.
    ///
    /// # Errors
    /// Returns an error if the timestamp cannot be expressed in RFC 3339, e.g.
    /// the year is beyond 9999.
    pub fn to_record(&self) -> Result<TransactionRecord, time::error::Format> {
        Ok(TransactionRecord {
            id: self.id.clone(),
            kind: self.kind,
            category: self.category.clone(),
            amount: self.amount,
            description: self.description.clone(),
            date: self.date.format(&Rfc3339)?,
        })
    }
}

/// A builder for creating [Transaction] instances.
///
/// # Examples
///
/// ```
/// use time::macros::datetime;
/// use waltrack::{Transaction, TransactionType};
///
/// let transaction = Transaction::build(
///         TransactionType::Expense,
///         45_000.0,
///         datetime!(2025-01-15 12:30 +7),
///     )
///     .category("Food")
///     .description("Lunch")
///     .finalise("1736919000000");
///
/// assert_eq!(transaction.category, "Food");
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    kind: TransactionType,
    amount: f64,
    date: OffsetDateTime,
    category: String,
    description: String,
}

impl TransactionBuilder {
    /// Set the category label for the transaction.
    pub fn category(mut self, category: &str) -> Self {
        self.category = category.to_owned();
        self
    }

    /// Set the description for the transaction.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    /// Build the final transaction with the specified ID.
    pub fn finalise(self, id: &str) -> Transaction {
        Transaction {
            id: id.to_owned(),
            kind: self.kind,
            category: self.category,
            amount: self.amount,
            description: self.description,
            date: self.date,
        }
    }
}

/// A transaction as it is stored or sent across a thread boundary.
///
/// The date is kept as text. It is parsed on demand by
/// [LedgerEntry::local_date], so a record with a garbage date can still be
/// loaded and is dealt with according to the [crate::DatePolicy].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// The ID of the transaction.
    pub id: String,
    /// Whether the transaction is income or an expense.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// A free-form category label.
    pub category: String,
    /// How much money moved.
    pub amount: f64,
    /// A text description of what the transaction was for.
    #[serde(default)]
    pub description: String,
    /// When the transaction happened, as an RFC 3339 timestamp or a
    /// `YYYY-MM-DD` date.
    pub date: String,
}

impl TransactionRecord {
    /// Convert the record into a [Transaction].
    ///
    /// Timestamps keep their own offset. A bare date is placed at midnight in
    /// `offset` so that it stays on the same calendar day in that offset.
    ///
    /// Returns `None` if the date cannot be parsed.
    pub fn to_transaction(&self, offset: UtcOffset) -> Option<Transaction> {
        let date = parse_timestamp(&self.date, offset)?;

        Some(Transaction {
            id: self.id.clone(),
            kind: self.kind,
            category: self.category.clone(),
            amount: self.amount,
            description: self.description.clone(),
            date,
        })
    }
}

/// Read access to the fields the analytics engine aggregates over.
pub trait LedgerEntry {
    /// The ID of the transaction.
    fn id(&self) -> &str;

    /// Whether the transaction is income or an expense.
    fn kind(&self) -> TransactionType;

    /// The category label.
    fn category(&self) -> &str;

    /// The magnitude of the transaction.
    fn amount(&self) -> f64;

    /// The calendar date of the transaction as seen from `offset`, or `None`
    /// if the date is unusable.
    fn local_date(&self, offset: UtcOffset) -> Option<Date>;
}

impl LedgerEntry for Transaction {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> TransactionType {
        self.kind
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn amount(&self) -> f64 {
        self.amount
    }

    fn local_date(&self, offset: UtcOffset) -> Option<Date> {
        self.date.checked_to_offset(offset).map(|date| date.date())
    }
}

impl LedgerEntry for TransactionRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> TransactionType {
        self.kind
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn amount(&self) -> f64 {
        self.amount
    }

    fn local_date(&self, offset: UtcOffset) -> Option<Date> {
        parse_local_date(&self.date, offset)
    }
}

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Parse the calendar date of `text` as seen from `offset`.
///
/// Accepts RFC 3339 timestamps (e.g. `2025-11-03T10:00:00.000Z`), which are
/// shifted into `offset` first, and bare dates (e.g. `2025-11-03`), which are
/// taken as is.
pub(crate) fn parse_local_date(text: &str, offset: UtcOffset) -> Option<Date> {
    let text = text.trim();

    match OffsetDateTime::parse(text, &Rfc3339) {
        Ok(timestamp) => timestamp.checked_to_offset(offset).map(|date| date.date()),
        Err(_) => Date::parse(text, DATE_FORMAT).ok(),
    }
}

fn parse_timestamp(text: &str, offset: UtcOffset) -> Option<OffsetDateTime> {
    let text = text.trim();

    match OffsetDateTime::parse(text, &Rfc3339) {
        Ok(timestamp) => Some(timestamp),
        Err(_) => Date::parse(text, DATE_FORMAT)
            .ok()
            .map(|date| date.with_time(Time::MIDNIGHT).assume_offset(offset)),
    }
}

#[cfg(test)]
mod tests {
    use time::{
        UtcOffset,
        macros::{date, datetime, offset},
    };

    use super::{LedgerEntry, Transaction, TransactionRecord, TransactionType, parse_local_date};

    fn record(date: &str) -> TransactionRecord {
        TransactionRecord {
            id: "1".to_owned(),
            kind: TransactionType::Expense,
            category: "Food".to_owned(),
            amount: 25_000.0,
            description: String::new(),
            date: date.to_owned(),
        }
    }

    #[test]
    fn parses_utc_timestamp_into_offset() {
        let got = parse_local_date("2025-10-31T20:00:00.000Z", offset!(+7));

        assert_eq!(got, Some(date!(2025 - 11 - 01)));
    }

    #[test]
    fn parses_bare_date_verbatim() {
        let got = parse_local_date("2025-10-31", offset!(-10));

        assert_eq!(got, Some(date!(2025 - 10 - 31)));
    }

    #[test]
    fn unparseable_date_is_none() {
        for text in ["", "yesterday", "2025-13-01", "31/10/2025", "Invalid Date"] {
            assert_eq!(parse_local_date(text, UtcOffset::UTC), None, "{text:?}");
        }
    }

    #[test]
    fn record_round_trips_through_rfc3339() {
        let transaction = Transaction::build(
            TransactionType::Income,
            1_000_000.0,
            datetime!(2025-03-01 00:30 +7),
        )
        .category("Gaji")
        .description("March salary")
        .finalise("42");

        let record = transaction.to_record().unwrap();

        assert_eq!(record.date, "2025-03-01T00:30:00+07:00");
        assert_eq!(record.to_transaction(UtcOffset::UTC), Some(transaction.clone()));
        assert_eq!(
            record.local_date(offset!(+7)),
            transaction.local_date(offset!(+7))
        );
        assert_eq!(
            record.local_date(UtcOffset::UTC),
            transaction.local_date(UtcOffset::UTC)
        );
    }

    #[test]
    fn local_date_depends_on_offset() {
        let transaction = Transaction::build(
            TransactionType::Expense,
            10.0,
            datetime!(2025-03-01 00:30 +7),
        )
        .finalise("1");

        assert_eq!(transaction.local_date(offset!(+7)), Some(date!(2025 - 03 - 01)));
        assert_eq!(transaction.local_date(UtcOffset::UTC), Some(date!(2025 - 02 - 28)));
    }

    #[test]
    fn bare_date_record_becomes_local_midnight() {
        let transaction = record("2025-06-15").to_transaction(offset!(+7)).unwrap();

        assert_eq!(transaction.date, datetime!(2025-06-15 00:00 +7));
    }

    #[test]
    fn record_with_garbage_date_does_not_convert() {
        assert_eq!(record("not a date").to_transaction(UtcOffset::UTC), None);
    }

    #[test]
    fn deserializes_stored_json() {
        let json = r#"{
            "id": "1730620800000",
            "type": "expense",
            "category": "Makanan",
            "amount": 35000,
            "description": "Nasi goreng",
            "date": "2024-11-03T08:00:00.000Z"
        }"#;

        let record: TransactionRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.kind, TransactionType::Expense);
        assert_eq!(record.amount, 35_000.0);
        assert_eq!(record.local_date(UtcOffset::UTC), Some(date!(2024 - 11 - 03)));
    }
}
