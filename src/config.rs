//! Settings for computing reports.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use time::UtcOffset;

use crate::{
    Error,
    analytics::AggregationParams,
    timezone::{current_month, get_local_offset},
};

/// The number of months in the series when nothing else is requested.
pub const DEFAULT_MONTHS_BACK: u32 = 6;

/// How long the analytics worker gets before the report is computed inline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// What to do with a transaction whose date cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatePolicy {
    /// Leave the transaction out of every total.
    #[default]
    Skip,
    /// Fail the whole report with [Error::InvalidDate].
    Reject,
}

/// Configuration for [crate::Dispatcher].
///
/// Use [AnalyticsConfig::default] and the setters to override individual
/// values.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsConfig {
    /// The number of months in the monthly series, ending with the current
    /// month.
    pub months_back: u32,
    /// How long to wait for the worker before falling back.
    pub timeout: Duration,
    /// Canonical timezone name, e.g. "Asia/Jakarta", that decides which
    /// month a transaction and "now" fall in. `None` uses the system's local
    /// offset.
    pub timezone: Option<String>,
    /// How unparseable transaction dates are handled.
    pub date_policy: DatePolicy,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            months_back: DEFAULT_MONTHS_BACK,
            timeout: DEFAULT_TIMEOUT,
            timezone: None,
            date_policy: DatePolicy::default(),
        }
    }
}

impl AnalyticsConfig {
    /// Set the number of months in the series.
    pub fn months_back(mut self, months_back: u32) -> Self {
        self.months_back = months_back;
        self
    }

    /// Set the worker timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the canonical timezone name.
    pub fn timezone(mut self, timezone: Option<String>) -> Self {
        self.timezone = timezone;
        self
    }

    /// Set the date policy.
    pub fn date_policy(mut self, date_policy: DatePolicy) -> Self {
        self.date_policy = date_policy;
        self
    }

    /// The UTC offset that reports are computed in.
    ///
    /// # Errors
    /// Returns [Error::InvalidTimezoneError] if the configured timezone is not
    /// a known canonical name.
    pub fn utc_offset(&self) -> Result<UtcOffset, Error> {
        match &self.timezone {
            Some(timezone) => get_local_offset(timezone)
                .ok_or_else(|| Error::InvalidTimezoneError(timezone.clone())),
            None => Ok(UtcOffset::current_local_offset().unwrap_or_else(|error| {
                tracing::debug!("could not determine the local offset, using UTC: {error}");
                UtcOffset::UTC
            })),
        }
    }

    /// Resolve the parameters for one report, anchored at the current month.
    ///
    /// # Errors
    /// Returns [Error::InvalidWindow] if `months_back` is zero, or
    /// [Error::InvalidTimezoneError] if the timezone is unknown.
    pub fn aggregation_params(&self) -> Result<AggregationParams, Error> {
        if self.months_back == 0 {
            return Err(Error::InvalidWindow(self.months_back));
        }

        let utc_offset = self.utc_offset()?;

        Ok(AggregationParams {
            anchor: current_month(utc_offset),
            months_back: self.months_back,
            utc_offset,
            date_policy: self.date_policy,
        })
    }
}
