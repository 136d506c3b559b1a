use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    /// Inclusive on both ends.
    pub fn contains(self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn days(self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Named reporting windows, resolved against a caller-supplied "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    #[default]
    Today,
    Yesterday,
    ThisWeek,
    LastWeek,
    ThisMonth,
    LastMonth,
    Last7Days,
    Last30Days,
    Last90Days,
}

impl Period {
    pub const ALL: [Period; 9] = [
        Period::Today,
        Period::Yesterday,
        Period::ThisWeek,
        Period::LastWeek,
        Period::ThisMonth,
        Period::LastMonth,
        Period::Last7Days,
        Period::Last30Days,
        Period::Last90Days,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Period::Today => "today",
            Period::Yesterday => "yesterday",
            Period::ThisWeek => "this_week",
            Period::LastWeek => "last_week",
            Period::ThisMonth => "this_month",
            Period::LastMonth => "last_month",
            Period::Last7Days => "last_7_days",
            Period::Last30Days => "last_30_days",
            Period::Last90Days => "last_90_days",
        }
    }

    /// Weeks start on Monday.
    pub fn range(self, today: NaiveDate) -> DateRange {
        match self {
            Period::Today => DateRange::new(today, today),
            Period::Yesterday => {
                let y = days_before(today, 1);
                DateRange::new(y, y)
            }
            Period::ThisWeek => week_of(today),
            Period::LastWeek => week_of(days_before(today, 7)),
            Period::ThisMonth => month_of(today),
            Period::LastMonth => {
                let prev = today.checked_sub_months(Months::new(1)).unwrap_or(today);
                month_of(prev)
            }
            Period::Last7Days => DateRange::new(days_before(today, 6), today),
            Period::Last30Days => DateRange::new(days_before(today, 29), today),
            Period::Last90Days => DateRange::new(days_before(today, 89), today),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Period::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("Unknown period: '{s}'"))
    }
}

pub fn days_before(date: NaiveDate, n: u64) -> NaiveDate {
    date.checked_sub_days(Days::new(n)).unwrap_or(NaiveDate::MIN)
}

fn week_of(date: NaiveDate) -> DateRange {
    let offset = date.weekday().num_days_from_monday() as u64;
    let start = days_before(date, offset);
    let end = start.checked_add_days(Days::new(6)).unwrap_or(NaiveDate::MAX);
    DateRange::new(start, end)
}

fn month_of(date: NaiveDate) -> DateRange {
    let start = date.with_day(1).unwrap_or(date);
    let end = start
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date);
    DateRange::new(start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn date_range_contains() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 12, 31));
        assert!(range.contains(date(2024, 6, 15)));
        assert!(range.contains(date(2024, 1, 1))); // inclusive start
        assert!(range.contains(date(2024, 12, 31))); // inclusive end
        assert!(!range.contains(date(2023, 12, 31)));
        assert!(!range.contains(date(2025, 1, 1)));
    }

    #[test]
    fn date_range_display() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 12, 31));
        assert_eq!(range.to_string(), "2024-01-01 to 2024-12-31");
    }

    #[test]
    fn this_week_starts_monday() {
        // 2024-03-14 is a Thursday.
        let r = Period::ThisWeek.range(date(2024, 3, 14));
        assert_eq!(r.start, date(2024, 3, 11));
        assert_eq!(r.end, date(2024, 3, 17));
    }

    #[test]
    fn last_week_is_previous_monday_to_sunday() {
        let r = Period::LastWeek.range(date(2024, 3, 14));
        assert_eq!(r.start, date(2024, 3, 4));
        assert_eq!(r.end, date(2024, 3, 10));
    }

    #[test]
    fn last_month_handles_year_boundary() {
        let r = Period::LastMonth.range(date(2024, 1, 20));
        assert_eq!(r.start, date(2023, 12, 1));
        assert_eq!(r.end, date(2023, 12, 31));
    }

    #[test]
    fn this_month_in_leap_february() {
        let r = Period::ThisMonth.range(date(2024, 2, 10));
        assert_eq!(r.end, date(2024, 2, 29));
    }

    #[test]
    fn rolling_windows_include_today() {
        let today = date(2024, 3, 31);
        assert_eq!(Period::Last7Days.range(today).days(), 7);
        assert_eq!(Period::Last30Days.range(today).days(), 30);
        assert_eq!(Period::Last90Days.range(today).days(), 90);
        assert_eq!(Period::Yesterday.range(today).start, date(2024, 3, 30));
    }

    #[test]
    fn period_from_str() {
        assert_eq!(Period::from_str("last_30_days").unwrap(), Period::Last30Days);
        assert!(Period::from_str("fortnight").is_err());
    }
}
