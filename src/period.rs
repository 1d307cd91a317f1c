use chrono::{Datelike, Duration, Month, NaiveDate};
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::datetime::{add_months, days_of_month};
use crate::model::{Error, ErrorKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Week,
    Month,
}

impl Default for Granularity {
    fn default() -> Self {
        Granularity::Week
    }
}

impl FromStr for Granularity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "d" => Ok(Granularity::Day),
            "week" | "w" => Ok(Granularity::Week),
            "month" | "m" => Ok(Granularity::Month),
            other => Err(Error::new(
                ErrorKind::InvalidValue,
                &format!("'{}' is not one of day, week, month", other),
            )),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
        })
    }
}

/// Monday on or before `date`. The first representable week is cut short
/// and starts at [`NaiveDate::MIN`].
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date.checked_sub_signed(Duration::days(date.weekday().num_days_from_monday() as i64))
        .unwrap_or(NaiveDate::MIN)
}

pub fn visible_days(reference: NaiveDate, granularity: Granularity) -> Vec<NaiveDate> {
    match granularity {
        Granularity::Day => vec![reference],
        Granularity::Week => week_start(reference).iter_days().take(7).collect(),
        Granularity::Month => {
            let first = reference.with_day(1).unwrap_or(reference);
            let num_days = Month::from_u32(reference.month())
                .map_or(0, |month| days_of_month(&month, reference.year()));

            first.iter_days().take(num_days as usize).collect()
        }
    }
}

/// Moves `reference` by `units` periods. Returns `None` if the result would
/// leave the representable date range.
pub fn step(reference: NaiveDate, granularity: Granularity, units: i32) -> Option<NaiveDate> {
    match granularity {
        Granularity::Day => reference.checked_add_signed(Duration::days(units as i64)),
        Granularity::Week => reference.checked_add_signed(Duration::weeks(units as i64)),
        Granularity::Month => add_months(reference, units),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Period {
    reference: NaiveDate,
    granularity: Granularity,
}

impl Period {
    pub fn new(reference: NaiveDate, granularity: Granularity) -> Self {
        Period {
            reference,
            granularity,
        }
    }

    pub fn reference(&self) -> NaiveDate {
        self.reference
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn days(&self) -> Vec<NaiveDate> {
        visible_days(self.reference, self.granularity)
    }

    pub fn first(&self) -> NaiveDate {
        match self.granularity {
            Granularity::Day => self.reference,
            Granularity::Week => week_start(self.reference),
            Granularity::Month => self.reference.with_day(1).unwrap_or(self.reference),
        }
    }

    pub fn contains(&self, date: &NaiveDate) -> bool {
        self.column_of(date).is_some()
    }

    pub fn column_of(&self, date: &NaiveDate) -> Option<usize> {
        let offset = date.signed_duration_since(self.first()).num_days();
        if offset < 0 {
            return None;
        }

        let column = offset as usize;
        if column < self.days().len() {
            Some(column)
        } else {
            None
        }
    }

    /// The period `units` steps ahead, or `None` if the count or the
    /// resulting date is out of range.
    pub fn next(&self, units: u32) -> Option<Self> {
        let units = i32::try_from(units).ok()?;
        step(self.reference, self.granularity, units).map(|r| Period::new(r, self.granularity))
    }

    pub fn prev(&self, units: u32) -> Option<Self> {
        let units = i32::try_from(units).ok()?.checked_neg()?;
        step(self.reference, self.granularity, units).map(|r| Period::new(r, self.granularity))
    }
}
