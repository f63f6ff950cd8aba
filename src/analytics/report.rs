//! The inputs and outputs of the analytics engine.

use serde::{Deserialize, Serialize};
use time::UtcOffset;

use crate::{config::DatePolicy, month::MonthKey};

/// Income and expense totals for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySeriesItem {
    /// The month, formatted as `YYYY-MM`.
    pub month_key: MonthKey,
    /// The sum of income transactions in the month.
    pub income: f64,
    /// The sum of expense transactions in the month.
    pub expense: f64,
}

impl MonthlySeriesItem {
    /// A month with no transactions.
    pub fn empty(month_key: MonthKey) -> Self {
        Self {
            month_key,
            income: 0.0,
            expense: 0.0,
        }
    }
}

/// The total spent in one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    /// The category label.
    pub category: String,
    /// The sum of expense transactions with this label.
    pub total: f64,
}

/// The aggregates for the income vs. expense chart and category breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    /// One entry per month in the lookback window, oldest first.
    pub monthly_series: Vec<MonthlySeriesItem>,
    /// One entry per category that has expenses, over all transactions
    /// regardless of the window. The order carries no meaning.
    pub categories_breakdown: Vec<CategoryTotal>,
}

/// Everything the engine needs besides the transactions.
///
/// These are resolved once per report, see
/// [crate::AnalyticsConfig::aggregation_params], so that the worker and the
/// inline fallback agree on what "this month" is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationParams {
    /// The last month of the window, normally the current month.
    pub anchor: MonthKey,
    /// The number of months in the window.
    pub months_back: u32,
    /// The offset used to decide which day, and therefore month, a
    /// timestamp falls on.
    #[serde(with = "offset_seconds")]
    pub utc_offset: UtcOffset,
    /// How unparseable dates are handled.
    pub date_policy: DatePolicy,
}

/// Serializes a [UtcOffset] as its whole number of seconds east of UTC.
mod offset_seconds {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::UtcOffset;

    pub fn serialize<S: Serializer>(offset: &UtcOffset, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(offset.whole_seconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<UtcOffset, D::Error> {
        let seconds = i32::deserialize(deserializer)?;
        UtcOffset::from_whole_seconds(seconds).map_err(serde::de::Error::custom)
    }
}
