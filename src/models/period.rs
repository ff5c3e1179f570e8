//! Monthly budget period representation
//!
//! Transactions are attributed to calendar-month cycles. This module holds
//! the month arithmetic used for filtering, history enumeration, and
//! installment end-date calculation.

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A calendar month acting as a budget cycle, stored as its first day
///
/// This is the `budget_period` a transaction counts toward for reporting,
/// which may differ from the month of its literal date when imported under
/// an explicit period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BudgetMonth(NaiveDate);

impl BudgetMonth {
    /// The month containing the given date
    pub fn containing(date: NaiveDate) -> Self {
        // from_ymd_opt with day 1 cannot fail for a date that already exists
        Self(NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date))
    }

    /// Construct from a year and 1-based month number
    pub fn from_ym(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }

    /// First day of the month
    pub fn start(&self) -> NaiveDate {
        self.0
    }

    /// Last day of the month
    pub fn end(&self) -> NaiveDate {
        self.next().start() - Duration::days(1)
    }

    /// Check if a date falls within this month
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start() && date <= self.end()
    }

    /// The following month
    pub fn next(&self) -> Self {
        Self(self.0 + Months::new(1))
    }

    /// The preceding month
    pub fn prev(&self) -> Self {
        Self(self.0 - Months::new(1))
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }
}

impl fmt::Display for BudgetMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.0.year(), self.0.month())
    }
}

/// Get the first and last day of the calendar month containing `date`
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let month = BudgetMonth::containing(date);
    (month.start(), month.end())
}

/// Check if two dates fall in the same calendar month and year
pub fn is_same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

/// Enumerate the months from the month containing `start` through the month
/// containing `end`, inclusive and ascending
///
/// Returns an empty list when `end` precedes the month of `start`; the
/// enumeration always terminates.
pub fn months_between(start: NaiveDate, end: NaiveDate) -> Vec<BudgetMonth> {
    let mut months = Vec::new();
    let mut current = BudgetMonth::containing(start);

    while current.start() <= end {
        months.push(current);
        current = current.next();
    }

    months
}

/// Calendar-month addition, clamping the day to the target month's length
///
/// `add_months(Jan 31, 1)` is Feb 28 (or 29), not an overflow into March.
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date + Months::new(months)
}
