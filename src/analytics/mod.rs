//! The transaction analytics engine.
//!
//! Turns an unordered list of transactions into a gap-free monthly
//! income/expense series and a per-category expense breakdown.

mod aggregation;
mod report;

pub use aggregation::{aggregate, month_window};
pub(crate) use aggregation::aggregate_until;
pub use report::{AggregationParams, AnalyticsReport, CategoryTotal, MonthlySeriesItem};
