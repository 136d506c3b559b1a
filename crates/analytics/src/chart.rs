use chrono::NaiveDate;
use serde::Serialize;

use tradetracker_core::{Money, TransactionKind};

use crate::summary::{CategoryBreakdown, DailyTrend};

pub const MAX_PIE_SLICES: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Series {
    Revenue,
    Expenses,
    Profit,
}

impl Series {
    pub const ALL: [Series; 3] = [Series::Revenue, Series::Expenses, Series::Profit];

    pub fn label(self) -> &'static str {
        match self {
            Series::Revenue => "Revenue",
            Series::Expenses => "Expenses",
            Series::Profit => "Profit",
        }
    }

    fn pick(self, day: &DailyTrend) -> Money {
        match self {
            Series::Revenue => day.revenue,
            Series::Expenses => day.expenses,
            Series::Profit => day.profit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesValue {
    pub name: &'static str,
    pub value: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub date: String,
    pub full_date: NaiveDate,
    pub values: Vec<SeriesValue>,
}

/// One point per day. `None` selects every series.
pub fn chart_series(days: &[DailyTrend], series: Option<Series>) -> Vec<ChartPoint> {
    let selected: &[Series] = match &series {
        Some(s) => std::slice::from_ref(s),
        None => &Series::ALL,
    };
    days.iter()
        .map(|day| ChartPoint {
            date: day.display_date.clone(),
            full_date: day.date,
            values: selected
                .iter()
                .map(|s| SeriesValue { name: s.label(), value: s.pick(day) })
                .collect(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub name: String,
    pub value: Money,
    pub count: usize,
    pub icon: String,
    pub color: String,
}

/// Largest categories of one kind; a category without a colour gets a hue
/// spaced by its position.
pub fn pie_slices(breakdown: &[CategoryBreakdown], kind: TransactionKind) -> Vec<PieSlice> {
    breakdown
        .iter()
        .filter(|c| c.kind == kind)
        .take(MAX_PIE_SLICES)
        .enumerate()
        .map(|(i, c)| PieSlice {
            name: c.name.clone(),
            value: c.amount,
            count: c.count,
            icon: c.icon.clone(),
            color: if c.color.trim().is_empty() {
                format!("hsl({}, 70%, 50%)", i * 45)
            } else {
                c.color.clone()
            },
        })
        .collect()
}
