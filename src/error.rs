//! Defines the crate level error type.
//!
//! These are the errors a caller of the analytics engine can see. Failures at
//! the worker boundary have their own type, [crate::DispatchError], and never
//! leave the dispatcher.

/// The errors that may occur while computing a report.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The lookback window must cover at least one month, and its first month
    /// must be a representable date.
    #[error("cannot build a report window of {0} months")]
    InvalidWindow(u32),

    /// A transaction amount was negative, NaN or infinite.
    ///
    /// Amounts are magnitudes; whether money came in or went out is decided by
    /// the transaction type.
    #[error("transaction \"{id}\" has an invalid amount {amount}")]
    InvalidAmount {
        /// The ID of the offending transaction.
        id: String,
        /// The amount as it was given.
        amount: f64,
    },

    /// The date of the transaction with this ID could not be parsed and the
    /// date policy is [crate::DatePolicy::Reject].
    #[error("transaction \"{0}\" has a date that could not be parsed")]
    InvalidDate(String),

    /// A month key was not in the `YYYY-MM` format.
    #[error("\"{0}\" is not a month in the format YYYY-MM")]
    InvalidMonthKey(String),

    /// The transaction collection could not be read, e.g. the JSON was not a
    /// list of transactions.
    ///
    /// No partial report is produced in this case.
    #[error("could not read the transactions: {0}")]
    MalformedInput(String),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// The computation was abandoned before it finished.
    ///
    /// Only a worker that the dispatcher stopped waiting for sees this.
    #[error("the computation was cancelled")]
    Cancelled,

    /// A file could not be read.
    #[error("could not read {path}: {message}")]
    Io {
        /// The path of the file.
        path: String,
        /// The underlying error message.
        message: String,
    },
}
