//! Reporting over an in-memory list of transactions: totals, daily and
//! per-category breakdowns, period-over-period trends and insights.

pub mod chart;
pub mod export;
pub mod insights;
pub mod summary;
pub mod trends;

pub use chart::{chart_series, pie_slices, ChartPoint, PieSlice, Series};
pub use export::{export_rows, read_transactions_csv, read_transactions_path, write_csv, CsvError, ExportRow};
pub use insights::{insights, Insight, InsightKind, Priority};
pub use summary::{
    analyze, analyze_period, category_breakdown, daily_trends, in_range, summarize, Analytics, CategoryBreakdown,
    DailyTrend, Summary,
};
pub use trends::{percent_change, trends, Comparison, Metric, Trends};
