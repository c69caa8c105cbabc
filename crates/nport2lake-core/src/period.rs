//! Calendar periods and load-window expansion.
//!
//! The SEC publishes one bulk file per calendar month. A load request names
//! one of four window shapes (single month, quarter, year, explicit
//! start/end); expansion turns it into the ordered, gap-free list of
//! [`Period`]s that drives the per-month fetch/stage loop.

use std::fmt;
use thiserror::Error;

/// One calendar month of the bulk archive.
///
/// Ordering is calendar order: year-major, month-minor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self, InvalidRange> {
        if !(1..=12).contains(&month) {
            return Err(InvalidRange::Month(month));
        }
        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The period one calendar month later.
    pub fn succ(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// A user-requested load window in one of the four supported shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadRequest {
    Month {
        year: i32,
        month: u32,
    },
    Quarter {
        year: i32,
        quarter: u32,
    },
    Year {
        year: i32,
    },
    Range {
        start_year: i32,
        start_month: u32,
        end_year: i32,
        end_month: u32,
    },
}

impl LoadRequest {
    /// Expand the window into ascending calendar order.
    ///
    /// The result has no duplicates and no gaps: consecutive periods differ
    /// by exactly one calendar month. Validation happens here, before any
    /// external call is made on the caller's side.
    pub fn expand(&self) -> Result<Vec<Period>, InvalidRange> {
        match *self {
            Self::Month { year, month } => Ok(vec![Period::new(year, month)?]),
            Self::Quarter { year, quarter } => {
                if !(1..=4).contains(&quarter) {
                    return Err(InvalidRange::Quarter(quarter));
                }
                (3 * quarter - 2..=3 * quarter)
                    .map(|month| Period::new(year, month))
                    .collect()
            }
            Self::Year { year } => (1..=12).map(|month| Period::new(year, month)).collect(),
            Self::Range {
                start_year,
                start_month,
                end_year,
                end_month,
            } => {
                let start = Period::new(start_year, start_month)?;
                let end = Period::new(end_year, end_month)?;
                if end < start {
                    return Err(InvalidRange::EndBeforeStart { start, end });
                }
                let mut periods = Vec::new();
                let mut current = start;
                while current <= end {
                    periods.push(current);
                    current = current.succ();
                }
                Ok(periods)
            }
        }
    }
}

/// A load window that cannot describe any set of calendar months.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InvalidRange {
    #[error("month {0} is out of range (expected 1-12)")]
    Month(u32),

    #[error("quarter {0} is out of range (expected 1-4)")]
    Quarter(u32),

    #[error("range end {end} precedes start {start}")]
    EndBeforeStart { start: Period, end: Period },
}
