use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike as _, Days, Months, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::Error;

/// A point in time on the UTC calendar.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Instant(pub DateTime<Utc>);

impl From<DateTime<Utc>> for Instant {
    #[inline]
    fn from(date_time: DateTime<Utc>) -> Instant {
        Instant(date_time)
    }
}

impl From<Instant> for DateTime<Utc> {
    #[inline]
    fn from(Instant(date_time): Instant) -> DateTime<Utc> {
        date_time
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Instant {
    pub fn now() -> Instant {
        Instant(Utc::now())
    }

    /// Seconds since the Unix epoch.
    #[inline]
    pub fn timestamp(self) -> i64 {
        self.0.timestamp()
    }

    /// Midnight at the start of the current day.
    pub fn start_of_day(self) -> Instant {
        Instant(self.0.date_naive().and_time(NaiveTime::MIN).and_utc())
    }

    /// Midnight on the Monday of the current week.
    pub fn start_of_week(self) -> Instant {
        let monday = self.0.date_naive().week(Weekday::Mon).first_day();
        Instant(monday.and_time(NaiveTime::MIN).and_utc())
    }

    /// Midnight on the first day of the current month.
    pub fn start_of_month(self) -> Instant {
        let date = self.0.date_naive();
        let first = date.with_day(1).unwrap_or(date);
        Instant(first.and_time(NaiveTime::MIN).and_utc())
    }

    pub fn start_of(self, step: Step) -> Instant {
        match step {
            Step::Day => self.start_of_day(),
            Step::Week => self.start_of_week(),
            Step::Month => self.start_of_month(),
        }
    }

    /// Moves `n` steps forward. Adding months keeps the day of month where
    /// the target month has it, and clamps to the last day otherwise.
    ///
    /// Returns `None` if the result is not representable.
    pub fn checked_add(self, n: u32, step: Step) -> Option<Instant> {
        match step {
            Step::Day => self.0.checked_add_days(Days::new(u64::from(n))),
            Step::Week => self.0.checked_add_days(Days::new(7 * u64::from(n))),
            Step::Month => self.0.checked_add_months(Months::new(n)),
        }
        .map(Instant)
    }
}

/// Calendar unit used to size rating periods.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Day,
    Week,
    Month,
}

impl FromStr for Step {
    type Err = Error;

    fn from_str(s: &str) -> Result<Step, Error> {
        Ok(match s {
            "day" => Step::Day,
            "week" => Step::Week,
            "month" => Step::Month,
            _ => return Err(Error::invalid_argument(format!("invalid step type {s:?}"))),
        })
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Step::Day => "day",
            Step::Week => "week",
            Step::Month => "month",
        })
    }
}
