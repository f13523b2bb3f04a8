//! Derived views over the transaction list.
//!
//! Everything here is a pure function of its inputs. Callers pass the
//! reference date for the monthly window so reports are reproducible.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{Budget, Transaction, TransactionType};

/// Number of months in the trend window, current month included.
pub(crate) const MONTHS_IN_SERIES: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Totals {
    pub(crate) income: Decimal,
    pub(crate) expenses: Decimal,
    pub(crate) balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct MonthlyBucket {
    /// Short month name and year, e.g. "Jan 2025"
    #[serde(rename = "month")]
    pub(crate) label: String,
    pub(crate) income: Decimal,
    pub(crate) expenses: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReportData {
    pub(crate) total_income: Decimal,
    pub(crate) total_expenses: Decimal,
    pub(crate) balance: Decimal,
    pub(crate) expenses_by_category: BTreeMap<String, Decimal>,
    pub(crate) incomes_by_category: BTreeMap<String, Decimal>,
    pub(crate) monthly_data: Vec<MonthlyBucket>,
}

pub(crate) fn totals(transactions: &[Transaction]) -> Totals {
    let income = sum_of(transactions.iter().filter(|t| t.is_income()));
    let expenses = sum_of(transactions.iter().filter(|t| t.is_expense()));
    Totals {
        income,
        expenses,
        balance: income.saturating_sub(expenses),
    }
}

/// Summed amounts per category for one transaction type. Categories without
/// transactions are absent rather than zero.
pub(crate) fn category_breakdown(
    transactions: &[Transaction],
    kind: TransactionType,
) -> BTreeMap<String, Decimal> {
    let mut by_category: BTreeMap<String, Decimal> = BTreeMap::new();
    for txn in transactions.iter().filter(|t| t.kind == kind) {
        let sum = by_category.entry(txn.category.clone()).or_default();
        *sum = sum.saturating_add(txn.amount);
    }
    by_category
}

/// Income and expense sums for the six calendar months ending with the month
/// of `today`, oldest first. Months without transactions are zero-filled.
pub(crate) fn monthly_series(transactions: &[Transaction], today: NaiveDate) -> Vec<MonthlyBucket> {
    (0..MONTHS_IN_SERIES)
        .rev()
        .map(|back| {
            let (year, month) = months_before(today, back);
            let in_month = || transactions.iter().filter(move |t| t.falls_in(month, year));
            MonthlyBucket {
                label: month_label(year, month),
                income: sum_of(in_month().filter(|t| t.is_income())),
                expenses: sum_of(in_month().filter(|t| t.is_expense())),
            }
        })
        .collect()
}

pub(crate) fn generate_report(transactions: &[Transaction], today: NaiveDate) -> ReportData {
    let Totals {
        income,
        expenses,
        balance,
    } = totals(transactions);

    ReportData {
        total_income: income,
        total_expenses: expenses,
        balance,
        expenses_by_category: category_breakdown(transactions, TransactionType::Expense),
        incomes_by_category: category_breakdown(transactions, TransactionType::Income),
        monthly_data: monthly_series(transactions, today),
    }
}

/// Saturates at the `Decimal` bounds instead of overflowing.
fn sum_of<'a>(transactions: impl Iterator<Item = &'a Transaction>) -> Decimal {
    transactions.fold(Decimal::ZERO, |acc, t| acc.saturating_add(t.amount))
}

/// (year, month) of the calendar month `back` months before `today`'s month.
fn months_before(today: NaiveDate, back: usize) -> (i32, u32) {
    let index = today.year() * 12 + today.month0() as i32 - back as i32;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}

fn month_label(year: i32, month: u32) -> String {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_else(|| format!("{year}-{month:02}"))
}

// ── Budgets ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BudgetStatus {
    Good,
    Warning,
    Over,
}

impl BudgetStatus {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Warning => "warning",
            Self::Over => "over",
        }
    }
}

impl std::fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

const WARNING_RATIO: Decimal = Decimal::from_parts(8, 0, 0, false, 1);
const FULL_PERCENT: Decimal = Decimal::ONE_HUNDRED;

/// Spending against a budget: expenses in the budget's category whose date
/// falls in the budget's month and year.
pub(crate) fn budget_usage(budget: &Budget, transactions: &[Transaction]) -> Decimal {
    let Some(month) = budget.month_number() else {
        return Decimal::ZERO;
    };
    sum_of(transactions.iter().filter(|t| {
        t.is_expense() && t.category == budget.category && t.falls_in(month, budget.year)
    }))
}

/// Percentage of `limit` consumed by `usage`, rounded to two places.
///
/// A non-positive limit reads as 100% once anything is spent and 0% before.
pub(crate) fn usage_percent(usage: Decimal, limit: Decimal) -> Decimal {
    if limit <= Decimal::ZERO {
        return if usage > Decimal::ZERO {
            FULL_PERCENT
        } else {
            Decimal::ZERO
        };
    }
    usage
        .checked_mul(FULL_PERCENT)
        .and_then(|scaled| scaled.checked_div(limit))
        .map(|p| p.round_dp(2))
        .unwrap_or(Decimal::MAX)
}

/// Tier for `usage` against `limit`. Compares the exact amounts, so a budget
/// with a cent left is never reported as over.
pub(crate) fn budget_status(usage: Decimal, limit: Decimal) -> BudgetStatus {
    if limit <= Decimal::ZERO {
        return if usage > Decimal::ZERO {
            BudgetStatus::Over
        } else {
            BudgetStatus::Good
        };
    }
    if usage >= limit {
        BudgetStatus::Over
    } else if usage >= limit * WARNING_RATIO {
        BudgetStatus::Warning
    } else {
        BudgetStatus::Good
    }
}

/// A budget with its usage recomputed from transactions.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BudgetView {
    /// The stored budget with `current_usage` replaced by the live figure.
    pub(crate) budget: Budget,
    pub(crate) percent_used: Decimal,
    pub(crate) remaining: Decimal,
    pub(crate) status: BudgetStatus,
}

impl BudgetView {
    pub(crate) fn usage(&self) -> Decimal {
        self.budget.current_usage
    }

    /// Percentage for a progress bar, capped at 100.
    pub(crate) fn progress(&self) -> Decimal {
        self.percent_used.min(FULL_PERCENT)
    }
}

pub(crate) fn budget_view(budget: &Budget, transactions: &[Transaction]) -> BudgetView {
    let usage = budget_usage(budget, transactions);
    let limit = budget.monthly_limit;
    BudgetView {
        budget: Budget {
            current_usage: usage,
            ..budget.clone()
        },
        percent_used: usage_percent(usage, limit),
        remaining: limit.saturating_sub(usage),
        status: budget_status(usage, limit),
    }
}
