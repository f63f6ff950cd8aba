//! Figures derived from transactions and reports for display.
//!
//! These are the numbers the dashboard cards and the expense analysis show
//! next to the charts: overall totals, the average expense, and each
//! category's share of spending.

use serde::Serialize;

use crate::{
    analytics::CategoryTotal,
    transaction::{LedgerEntry, TransactionType},
};

/// Lifetime totals over every transaction.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletStats {
    /// The sum of all income.
    pub total_income: f64,
    /// The sum of all expenses.
    pub total_expense: f64,
    /// Income minus expenses.
    pub balance: f64,
    /// The number of transactions, income and expenses alike.
    pub transaction_count: usize,
}

impl WalletStats {
    /// Sum up `transactions`.
    pub fn from_transactions<T: LedgerEntry>(transactions: &[T]) -> Self {
        let mut stats = transactions
            .iter()
            .fold(Self::default(), |mut stats, transaction| {
                match transaction.kind() {
                    TransactionType::Income => stats.total_income += transaction.amount(),
                    TransactionType::Expense => stats.total_expense += transaction.amount(),
                }
                stats.transaction_count += 1;
                stats
            });

        stats.balance = stats.total_income - stats.total_expense;
        stats
    }
}

/// The mean amount of the expense transactions, or `None` if there are none.
pub fn average_expense<T: LedgerEntry>(transactions: &[T]) -> Option<f64> {
    let (total, count) = transactions
        .iter()
        .filter(|transaction| transaction.kind() == TransactionType::Expense)
        .fold((0.0, 0usize), |(total, count), transaction| {
            (total + transaction.amount(), count + 1)
        });

    (count > 0).then(|| total / count as f64)
}

/// A category's spending as a share of all spending.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    /// The category label.
    pub category: String,
    /// The amount spent in the category.
    pub total: f64,
    /// `total` as a percentage of the breakdown's total, or `None` when
    /// nothing was spent at all.
    pub percentage: Option<f64>,
}

/// Each category's percentage of total spending, in breakdown order.
pub fn category_shares(breakdown: &[CategoryTotal]) -> Vec<CategoryShare> {
    let total_expense: f64 = breakdown.iter().map(|item| item.total).sum();

    breakdown
        .iter()
        .map(|item| CategoryShare {
            category: item.category.clone(),
            total: item.total,
            percentage: (total_expense > 0.0).then(|| item.total / total_expense * 100.0),
        })
        .collect()
}

/// The `limit` categories with the most spending, largest first.
///
/// Categories with equal totals are ordered by label.
pub fn top_categories(breakdown: &[CategoryTotal], limit: usize) -> Vec<CategoryTotal> {
    let mut sorted = breakdown.to_vec();
    sorted.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.category.cmp(&b.category))
    });
    sorted.truncate(limit);
    sorted
}
