use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use tradetracker_core::category::{DEFAULT_COLOR, DEFAULT_ICON};
use tradetracker_core::{Category, DateRange, Money, Period, Transaction, TransactionKind};

use crate::trends::{trends, Trends};

pub const UNCATEGORIZED: &str = "Uncategorized";
pub const TOP_CATEGORIES: usize = 5;

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Summary {
    pub total_revenue: Money,
    pub total_expenses: Money,
    pub net_profit: Money,
    /// Net profit as a percentage of revenue; 0 when there is no revenue.
    pub profit_margin: f64,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTrend {
    pub date: NaiveDate,
    pub display_date: String,
    pub revenue: Money,
    pub expenses: Money,
    pub profit: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    pub name: String,
    pub icon: String,
    pub color: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: Money,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analytics {
    pub summary: Summary,
    pub daily_trends: Vec<DailyTrend>,
    pub category_breakdown: Vec<CategoryBreakdown>,
    pub top_categories: Vec<CategoryBreakdown>,
    pub trends: Trends,
}

/// Percentage of `part` in `whole`, 0 when `whole` is zero.
pub(crate) fn percent(part: Decimal, whole: Decimal) -> f64 {
    if whole.is_zero() {
        return 0.0;
    }
    (part / whole * Decimal::ONE_HUNDRED).to_f64().unwrap_or(0.0)
}

fn split(transactions: &[Transaction]) -> (Money, Money) {
    transactions.iter().fold((Money::zero(), Money::zero()), |(rev, exp), t| match t.kind {
        TransactionKind::Income => (rev + t.amount, exp),
        TransactionKind::Expense => (rev, exp + t.amount),
    })
}

pub fn summarize(transactions: &[Transaction]) -> Summary {
    let (total_revenue, total_expenses) = split(transactions);
    let net_profit = total_revenue - total_expenses;
    Summary {
        total_revenue,
        total_expenses,
        net_profit,
        profit_margin: percent(net_profit.amount(), total_revenue.amount()),
        transaction_count: transactions.len(),
    }
}

/// One entry per date that has transactions, oldest first.
pub fn daily_trends(transactions: &[Transaction]) -> Vec<DailyTrend> {
    let mut days: BTreeMap<NaiveDate, (Money, Money)> = BTreeMap::new();
    for t in transactions {
        let (rev, exp) = days.entry(t.transaction_date).or_default();
        match t.kind {
            TransactionKind::Income => *rev += t.amount,
            TransactionKind::Expense => *exp += t.amount,
        }
    }

    days.into_iter()
        .map(|(date, (revenue, expenses))| DailyTrend {
            date,
            display_date: date.format("%b %d").to_string(),
            revenue,
            expenses,
            profit: revenue - expenses,
        })
        .collect()
}

/// Totals per category name and kind, largest first. Transactions whose
/// category is unknown are pooled under "Uncategorized".
pub fn category_breakdown(transactions: &[Transaction], categories: &[Category]) -> Vec<CategoryBreakdown> {
    let by_id: HashMap<&str, &Category> = categories.iter().map(|c| (c.id.as_str(), c)).collect();

    let mut rows: Vec<CategoryBreakdown> = Vec::new();
    let mut index: HashMap<(String, TransactionKind), usize> = HashMap::new();

    for t in transactions {
        let category = t.category_id.as_ref().and_then(|id| by_id.get(id.as_str()).copied());
        let name = category.map_or(UNCATEGORIZED, |c| c.name.as_str());

        let slot = *index.entry((name.to_string(), t.kind)).or_insert_with(|| {
            rows.push(CategoryBreakdown {
                name: name.to_string(),
                icon: category.map_or(DEFAULT_ICON, |c| c.icon.as_str()).to_string(),
                color: category.map_or(DEFAULT_COLOR, |c| c.color.as_str()).to_string(),
                kind: t.kind,
                amount: Money::zero(),
                count: 0,
            });
            rows.len() - 1
        });
        rows[slot].amount += t.amount;
        rows[slot].count += 1;
    }

    // Stable: ties keep first-seen order.
    rows.sort_by(|a, b| b.amount.cmp(&a.amount));
    rows
}

pub fn analyze(transactions: &[Transaction], categories: &[Category], today: NaiveDate) -> Analytics {
    let category_breakdown = category_breakdown(transactions, categories);
    let top_categories = category_breakdown.iter().take(TOP_CATEGORIES).cloned().collect();
    Analytics {
        summary: summarize(transactions),
        daily_trends: daily_trends(transactions),
        category_breakdown,
        top_categories,
        trends: trends(transactions, today),
    }
}

pub fn in_range(transactions: &[Transaction], range: DateRange) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|t| range.contains(t.transaction_date))
        .cloned()
        .collect()
}

/// Restrict to `period` and analyze what remains.
pub fn analyze_period(
    transactions: &[Transaction],
    categories: &[Category],
    period: Period,
    today: NaiveDate,
) -> (Vec<Transaction>, Analytics) {
    let range = period.range(today);
    let selected = in_range(transactions, range);
    tracing::debug!(%period, %range, selected = selected.len(), total = transactions.len(), "analytics window");
    let analytics = analyze(&selected, categories, today);
    (selected, analytics)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use std::str::FromStr;

    pub fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    pub fn tx(kind: TransactionKind, amount: &str, category: Option<&str>, on: &str) -> Transaction {
        Transaction {
            id: None,
            kind,
            amount: Money::from_decimal(Decimal::from_str(amount).unwrap()),
            description: "test".to_string(),
            category_id: category.map(tradetracker_core::CategoryId::new),
            transaction_date: date(on),
            voice_input: None,
            receipt_url: None,
        }
    }

    pub fn cats() -> Vec<Category> {
        vec![
            Category::new("c1", "Sales", TransactionKind::Income),
            Category::new("c2", "Transport", TransactionKind::Expense),
            Category::new("c3", "Inventory", TransactionKind::Expense),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use TransactionKind::{Expense, Income};

    fn money(n: i64) -> Money {
        Money::from_decimal(Decimal::from(n))
    }

    #[test]
    fn summary_totals_and_margin() {
        let txs = vec![
            tx(Income, "1000", Some("c1"), "2024-03-10"),
            tx(Income, "1000", Some("c1"), "2024-03-11"),
            tx(Expense, "500", Some("c2"), "2024-03-11"),
        ];
        let s = summarize(&txs);
        assert_eq!(s.total_revenue, money(2000));
        assert_eq!(s.total_expenses, money(500));
        assert_eq!(s.net_profit, money(1500));
        assert!((s.profit_margin - 75.0).abs() < 1e-9);
        assert_eq!(s.transaction_count, 3);
    }

    #[test]
    fn margin_is_zero_without_revenue() {
        let s = summarize(&[tx(Expense, "300", None, "2024-03-10")]);
        assert_eq!(s.profit_margin, 0.0);
        assert_eq!(s.net_profit, Money::from_decimal(Decimal::from(-300)));
    }

    #[test]
    fn daily_trends_are_sorted_by_date() {
        let txs = vec![
            tx(Expense, "200", None, "2024-03-12"),
            tx(Income, "900", None, "2024-03-02"),
            tx(Income, "100", None, "2024-03-12"),
        ];
        let days = daily_trends(&txs);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, date("2024-03-02"));
        assert_eq!(days[0].display_date, "Mar 02");
        assert_eq!(days[1].profit, Money::from_decimal(Decimal::from(-100)));
    }

    #[test]
    fn breakdown_groups_and_sorts() {
        let txs = vec![
            tx(Expense, "100", Some("c2"), "2024-03-10"),
            tx(Expense, "400", Some("c3"), "2024-03-10"),
            tx(Expense, "150", Some("c2"), "2024-03-11"),
            tx(Expense, "50", Some("gone"), "2024-03-11"),
            tx(Income, "70", None, "2024-03-11"),
        ];
        let rows = category_breakdown(&txs, &cats());
        let names: Vec<(&str, TransactionKind)> = rows.iter().map(|r| (r.name.as_str(), r.kind)).collect();
        assert_eq!(
            names,
            vec![
                ("Inventory", Expense),
                ("Transport", Expense),
                ("Uncategorized", Income),
                ("Uncategorized", Expense)
            ]
        );
        assert_eq!(rows[1].amount, money(250));
        assert_eq!(rows[1].count, 2);
        assert_eq!(rows[3].icon, DEFAULT_ICON);
        assert_eq!(rows[3].color, DEFAULT_COLOR);
    }

    #[test]
    fn top_categories_capped_at_five() {
        let many: Vec<Category> = (0..7)
            .map(|i| Category::new(&format!("x{i}"), &format!("Cat {i}"), Expense))
            .collect();
        let txs: Vec<Transaction> = (0..7)
            .map(|i| tx(Expense, &format!("{}", (i + 1) * 10), Some(&format!("x{i}")), "2024-03-10"))
            .collect();
        let a = analyze(&txs, &many, date("2024-03-10"));
        assert_eq!(a.category_breakdown.len(), 7);
        assert_eq!(a.top_categories.len(), TOP_CATEGORIES);
        assert_eq!(a.top_categories[0].name, "Cat 6");
    }

    #[test]
    fn empty_input_is_all_zero() {
        let a = analyze(&[], &cats(), date("2024-03-10"));
        assert_eq!(a.summary, Summary::default());
        assert!(a.daily_trends.is_empty());
        assert!(a.top_categories.is_empty());
    }

    #[test]
    fn period_filter_is_inclusive() {
        let txs = vec![
            tx(Income, "10", None, "2024-03-04"),
            tx(Income, "20", None, "2024-03-10"),
            tx(Income, "40", None, "2024-03-03"),
        ];
        // 2024-03-10 is a Sunday; the week starts Monday 03-04.
        let (selected, a) = analyze_period(&txs, &[], Period::ThisWeek, date("2024-03-10"));
        assert_eq!(selected.len(), 2);
        assert_eq!(a.summary.total_revenue, money(30));
    }
}
