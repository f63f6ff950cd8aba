//! Transaction aggregation by month and by category.
//!
//! This is the single implementation used both by the analytics worker and by
//! the inline fallback in [crate::Dispatcher].

use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicBool, Ordering},
};

use crate::{
    Error,
    analytics::report::{AggregationParams, AnalyticsReport, CategoryTotal, MonthlySeriesItem},
    config::DatePolicy,
    month::MonthKey,
    transaction::{LedgerEntry, TransactionType},
};

/// The `months_back` consecutive months ending with `anchor`, oldest first.
///
/// # Errors
/// Returns [Error::InvalidWindow] if `months_back` is zero or the window
/// would start before the earliest representable date.
pub fn month_window(anchor: MonthKey, months_back: u32) -> Result<Vec<MonthKey>, Error> {
    if months_back == 0 {
        return Err(Error::InvalidWindow(months_back));
    }

    (0..months_back)
        .rev()
        .map(|months| {
            anchor
                .checked_sub_months(months)
                .ok_or(Error::InvalidWindow(months_back))
        })
        .collect()
}

/// Aggregates transactions into a monthly series and a category breakdown.
///
/// The monthly series has one entry per month of the window described by
/// `params`, including months without transactions. Transactions outside the
/// window do not show up in the series.
///
/// The category breakdown sums expenses over *all* transactions, not just
/// the ones inside the window. Income has no breakdown. Categories are listed
/// in label order.
///
/// # Errors
/// - [Error::InvalidWindow] if the window is empty or out of range.
/// - [Error::InvalidAmount] if an amount is negative, NaN or infinite.
/// - [Error::InvalidDate] if a date cannot be parsed and the date policy is
///   [DatePolicy::Reject]. With [DatePolicy::Skip] such transactions count
///   towards nothing.
pub fn aggregate<T: LedgerEntry>(
    transactions: &[T],
    params: &AggregationParams,
) -> Result<AnalyticsReport, Error> {
    aggregate_until(transactions, params, &AtomicBool::new(false))
}

/// [aggregate], giving up with [Error::Cancelled] once `cancelled` is set.
pub(crate) fn aggregate_until<T: LedgerEntry>(
    transactions: &[T],
    params: &AggregationParams,
    cancelled: &AtomicBool,
) -> Result<AnalyticsReport, Error> {
    let months = month_window(params.anchor, params.months_back)?;
    let first_month = months[0];

    let mut monthly_series: Vec<MonthlySeriesItem> =
        months.into_iter().map(MonthlySeriesItem::empty).collect();
    let mut category_totals: BTreeMap<&str, f64> = BTreeMap::new();

    for transaction in transactions {
        if cancelled.load(Ordering::Relaxed) {
            return Err(Error::Cancelled);
        }

        let amount = transaction.amount();

        if !amount.is_finite() || amount < 0.0 {
            return Err(Error::InvalidAmount {
                id: transaction.id().to_owned(),
                amount,
            });
        }

        let Some(date) = transaction.local_date(params.utc_offset) else {
            match params.date_policy {
                DatePolicy::Skip => {
                    tracing::debug!(
                        "skipping transaction \"{}\" with an unparseable date",
                        transaction.id()
                    );
                    continue;
                }
                DatePolicy::Reject => {
                    return Err(Error::InvalidDate(transaction.id().to_owned()));
                }
            }
        };

        let offset = MonthKey::from_date(date).months_since(first_month);

        if let Some(bucket) = usize::try_from(offset)
            .ok()
            .and_then(|index| monthly_series.get_mut(index))
        {
            match transaction.kind() {
                TransactionType::Income => bucket.income += amount,
                TransactionType::Expense => bucket.expense += amount,
            }
        }

        if transaction.kind() == TransactionType::Expense {
            *category_totals.entry(transaction.category()).or_insert(0.0) += amount;
        }
    }

    let categories_breakdown = category_totals
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category: category.to_owned(),
            total,
        })
        .collect();

    Ok(AnalyticsReport {
        monthly_series,
        categories_breakdown,
    })
}
