//! Waltrack analytics turns a wallet's transaction list into the aggregates
//! behind its reports.
//!
//! The core is [aggregate], a pure function producing a gap-free monthly
//! income/expense series for a lookback window plus a per-category expense
//! breakdown. [Dispatcher] runs it on a worker thread with a timeout and falls
//! back to computing it inline, so a slow or failed worker never costs the
//! caller a report.
//!
//! ```no_run
//! use waltrack::{AnalyticsConfig, DatePolicy, Dispatcher, load_transactions};
//!
//! # async fn run() -> Result<(), waltrack::Error> {
//! let config = AnalyticsConfig::default().months_back(6);
//! let offset = config.utc_offset()?;
//! let transactions = load_transactions("transactions.json".as_ref(), offset, DatePolicy::Skip)?;
//!
//! let report = Dispatcher::new(config).analyze(&transactions).await?;
//!
//! for month in &report.monthly_series {
//!     println!("{}: +{} -{}", month.month_key, month.income, month.expense);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod analytics;
mod config;
mod dispatcher;
mod error;
mod month;
mod store;
mod summary;
mod timezone;
mod transaction;

pub use analytics::{
    AggregationParams, AnalyticsReport, CategoryTotal, MonthlySeriesItem, aggregate, month_window,
};
pub use config::{AnalyticsConfig, DEFAULT_MONTHS_BACK, DEFAULT_TIMEOUT, DatePolicy};
pub use dispatcher::{
    DispatchError, Dispatcher, Executor, ThreadExecutor, WORKER_THREAD_NAME, handle_message,
};
pub use error::Error;
pub use month::MonthKey;
pub use store::{load_transactions, parse_transactions};
pub use summary::{CategoryShare, WalletStats, average_expense, category_shares, top_categories};
pub use timezone::{current_month, get_local_offset};
pub use transaction::{
    LedgerEntry, Transaction, TransactionBuilder, TransactionRecord, TransactionType,
};
