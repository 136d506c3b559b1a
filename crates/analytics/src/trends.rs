use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use tradetracker_core::period::days_before;
use tradetracker_core::{DateRange, Money, Transaction, TransactionKind};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Metric {
    pub current: Money,
    pub previous: Money,
    /// Percent change from `previous` to `current`.
    pub change: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Comparison {
    pub revenue: Metric,
    pub expenses: Metric,
    pub profit: Metric,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Trends {
    /// Last 7 days against the 7 before them.
    pub weekly: Comparison,
    /// Last 30 days against the 30 before them.
    pub monthly: Comparison,
}

/// From a zero baseline any growth counts as 100%.
pub fn percent_change(current: Decimal, previous: Decimal) -> f64 {
    if previous.is_zero() {
        return if current > Decimal::ZERO { 100.0 } else { 0.0 };
    }
    ((current - previous) / previous * Decimal::ONE_HUNDRED)
        .to_f64()
        .unwrap_or(0.0)
}

fn metric(current: Money, previous: Money) -> Metric {
    Metric { current, previous, change: percent_change(current.amount(), previous.amount()) }
}

fn totals(transactions: &[Transaction], range: DateRange) -> (Money, Money) {
    transactions
        .iter()
        .filter(|t| range.contains(t.transaction_date))
        .fold((Money::zero(), Money::zero()), |(rev, exp), t| match t.kind {
            TransactionKind::Income => (rev + t.amount, exp),
            TransactionKind::Expense => (rev, exp + t.amount),
        })
}

/// The `days`-long window ending today against the one just before it.
fn compare(transactions: &[Transaction], today: NaiveDate, days: u64) -> Comparison {
    let current = DateRange::new(days_before(today, days - 1), today);
    let previous = DateRange::new(days_before(today, 2 * days - 1), days_before(today, days));

    let (cur_rev, cur_exp) = totals(transactions, current);
    let (prev_rev, prev_exp) = totals(transactions, previous);

    Comparison {
        revenue: metric(cur_rev, prev_rev),
        expenses: metric(cur_exp, prev_exp),
        profit: metric(cur_rev - cur_exp, prev_rev - prev_exp),
    }
}

pub fn trends(transactions: &[Transaction], today: NaiveDate) -> Trends {
    Trends {
        weekly: compare(transactions, today, 7),
        monthly: compare(transactions, today, 30),
    }
}
