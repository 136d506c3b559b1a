use std::cmp::Reverse;

use chrono::NaiveDate;
use serde::Serialize;

use tradetracker_core::period::days_before;
use tradetracker_core::{Transaction, TransactionKind};

use crate::summary::{percent, Analytics};

pub const LOW_MARGIN: f64 = 10.0;
pub const HEALTHY_MARGIN: f64 = 30.0;
pub const REVENUE_GROWTH: f64 = 20.0;
pub const REVENUE_DECLINE: f64 = -10.0;
/// Share of total expenses above which one category is called out.
pub const DOMINANT_SHARE: f64 = 40.0;
pub const QUIET_DAYS: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Warning,
    Success,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub title: String,
    pub message: String,
    pub icon: String,
    pub priority: Priority,
}

impl Insight {
    fn new(kind: InsightKind, priority: Priority, icon: &str, title: &str, message: String) -> Self {
        Self { kind, title: title.to_string(), message, icon: icon.to_string(), priority }
    }
}

/// Plain-language observations about the analyzed window, most urgent first.
/// Nothing is reported for an empty window.
pub fn insights(analytics: &Analytics, transactions: &[Transaction], today: NaiveDate) -> Vec<Insight> {
    if transactions.is_empty() {
        return Vec::new();
    }

    let mut out = Vec::new();
    let summary = &analytics.summary;

    let margin = summary.profit_margin;
    if margin < LOW_MARGIN {
        out.push(Insight::new(
            InsightKind::Warning,
            Priority::High,
            "⚠️",
            "Low Profit Margin",
            format!("Your profit margin is {margin:.1}%. Consider reducing expenses or increasing prices."),
        ));
    } else if margin > HEALTHY_MARGIN {
        out.push(Insight::new(
            InsightKind::Success,
            Priority::Medium,
            "🎉",
            "Healthy Profit Margin",
            format!("Excellent! Your profit margin of {margin:.1}% is very healthy."),
        ));
    }

    let change = analytics.trends.weekly.revenue.change;
    if change > REVENUE_GROWTH {
        out.push(Insight::new(
            InsightKind::Success,
            Priority::Medium,
            "📈",
            "Revenue Growing",
            format!("Your weekly revenue increased by {change:.1}%!"),
        ));
    } else if change < REVENUE_DECLINE {
        out.push(Insight::new(
            InsightKind::Warning,
            Priority::High,
            "📉",
            "Revenue Declining",
            format!(
                "Your weekly revenue decreased by {:.1}%. Consider marketing or new strategies.",
                change.abs()
            ),
        ));
    }

    // Breakdown is already sorted, so the first expense row is the largest.
    if let Some(top) = analytics
        .category_breakdown
        .iter()
        .find(|c| c.kind == TransactionKind::Expense)
    {
        let share = percent(top.amount.amount(), summary.total_expenses.amount());
        if share > DOMINANT_SHARE {
            out.push(Insight::new(
                InsightKind::Info,
                Priority::Medium,
                &top.icon,
                "Major Expense Category",
                format!("{} represents {share:.1}% of your expenses. Monitor this closely.", top.name),
            ));
        }
    }

    let since = days_before(today, QUIET_DAYS);
    if !transactions.iter().any(|t| t.transaction_date >= since) {
        out.push(Insight::new(
            InsightKind::Info,
            Priority::Low,
            "📝",
            "No Recent Activity",
            "You haven't recorded any transactions in the last 3 days. Keep tracking for better insights!"
                .to_string(),
        ));
    }

    // Daily averages over the same span compare like the totals do.
    if summary.total_expenses > summary.total_revenue {
        out.push(Insight::new(
            InsightKind::Warning,
            Priority::High,
            "💰",
            "Cash Flow Alert",
            "Your daily expenses exceed daily revenue on average. Focus on increasing sales or reducing costs."
                .to_string(),
        ));
    }

    out.sort_by_key(|i| Reverse(i.priority));
    out
}
