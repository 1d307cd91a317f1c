use chrono::{Month, Months, NaiveDate, NaiveDateTime, Timelike};

use super::{Error, ErrorKind, Result};

/// Minute-precision local datetime as exchanged with form inputs.
pub const FORM_FORMAT: &str = "%Y-%m-%dT%H:%M";
const FORM_FORMAT_SECONDS: &str = "%Y-%m-%dT%H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn days_of_month(month: &Month, year: i32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month.number_from_month(), 1);
    let next = if month.number_from_month() == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month.number_from_month() + 1, 1)
    };

    match (first, next) {
        (Some(first), Some(next)) => next.signed_duration_since(first).num_days() as u32,
        _ => 0,
    }
}

pub fn truncate_to_minute(datetime: NaiveDateTime) -> NaiveDateTime {
    datetime
        .with_second(0)
        .and_then(|dt| dt.with_nanosecond(0))
        .unwrap_or(datetime)
}

/// Parses `YYYY-MM-DDTHH:MM`, accepting and dropping trailing seconds.
pub fn parse_form_datetime(value: &str) -> Result<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, FORM_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, FORM_FORMAT_SECONDS))
        .map(truncate_to_minute)
        .map_err(Error::from)
}

pub fn format_form_datetime(datetime: &NaiveDateTime) -> String {
    datetime.format(FORM_FORMAT).to_string()
}

pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|e| {
        Error::new(
            ErrorKind::DateParse,
            &format!("'{}' is not a YYYY-MM-DD date: {}", value, e),
        )
    })
}

/// Shifts `date` by whole calendar months, clamping the day to the length of
/// the target month.
pub fn add_months(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    let amount = Months::new(months.unsigned_abs());
    if months >= 0 {
        date.checked_add_months(amount)
    } else {
        date.checked_sub_months(amount)
    }
}

/// Serde adapter storing datetimes in [`FORM_FORMAT`].
pub mod minutes {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        datetime: &NaiveDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_form_datetime(datetime))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_form_datetime(&raw).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_lengths() {
        assert_eq!(days_of_month(&Month::February, 2024), 29);
        assert_eq!(days_of_month(&Month::February, 2025), 28);
        assert_eq!(days_of_month(&Month::April, 2025), 30);
        assert_eq!(days_of_month(&Month::December, 2025), 31);
    }

    #[test]
    fn form_datetime_drops_seconds() {
        let dt = parse_form_datetime("2025-04-28T09:15:42").unwrap();
        assert_eq!(format_form_datetime(&dt), "2025-04-28T09:15");
        assert_eq!(dt.second(), 0);

        let dt = parse_form_datetime("2025-04-28T09:15").unwrap();
        assert_eq!(dt.hour(), 9);
        assert_eq!(dt.minute(), 15);
    }

    #[test]
    fn rejects_garbage_datetime() {
        assert!(parse_form_datetime("tomorrow").is_err());
        assert!(parse_date("28.04.2025").is_err());
    }

    #[test]
    fn month_steps_clamp_to_month_end() {
        let jan31 = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        assert_eq!(
            add_months(jan31, 1),
            NaiveDate::from_ymd_opt(2025, 2, 28)
        );
        assert_eq!(
            add_months(jan31, -2),
            NaiveDate::from_ymd_opt(2024, 11, 30)
        );
    }
}
