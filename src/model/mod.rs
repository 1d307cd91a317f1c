use chrono::{NaiveDate, NaiveDateTime};
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub mod datetime;
pub mod error;

pub use error::{Error, ErrorKind};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, Debug, Display, From, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgramId(String);

impl ProgramId {
    pub fn new(id: impl Into<String>) -> Self {
        ProgramId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProgramId {
    fn from(id: &str) -> Self {
        ProgramId::new(id)
    }
}

#[derive(Clone, Debug, Display, From, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uid(String);

impl Uid {
    /// Synthetic identifier for records that have not been saved yet.
    pub fn generate() -> Self {
        Uid(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Uid {
    fn from(id: &str) -> Self {
        Uid(id.to_owned())
    }
}

/// Hex color as written in `#rgb` or `#rrggbb` notation.
#[derive(Clone, Debug, PartialEq, Eq, SerializeDisplay, DeserializeFromStr)]
pub struct Color(String);

impl Default for Color {
    fn default() -> Self {
        Color("#3b82f6".to_owned())
    }
}

impl Color {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Red, green and blue channels. `#rgb` expands to `#rrggbb`.
    pub fn rgb(&self) -> (u8, u8, u8) {
        let digits = self.0.trim_start_matches('#');
        let channel = |i: usize| {
            let hex = if digits.len() == 3 {
                digits[i..=i].repeat(2)
            } else {
                digits[2 * i..2 * i + 2].to_owned()
            };
            u8::from_str_radix(&hex, 16).unwrap_or(0)
        };

        (channel(0), channel(1), channel(2))
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let digits = s.strip_prefix('#').unwrap_or("");
        if matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit()) {
            Ok(Color(s.to_ascii_lowercase()))
        } else {
            Err(Error::new(
                ErrorKind::InvalidValue,
                &format!("'{}' is not a #rgb or #rrggbb color", s),
            ))
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub id: ProgramId,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uid,
    pub title: String,
    pub program_id: ProgramId,
    pub module_code: String,
    #[serde(default)]
    pub instructor: String,
    #[serde(default)]
    pub room: String,
    #[serde(with = "datetime::minutes")]
    pub start_time: NaiveDateTime,
    #[serde(with = "datetime::minutes")]
    pub end_time: NaiveDateTime,
    #[serde(default)]
    pub color: Color,
}

impl Session {
    /// A session starts before it ends and does not cross midnight.
    pub fn validate(&self) -> Result<()> {
        if self.start_time >= self.end_time {
            return Err(Error::new(
                ErrorKind::InvalidTimeSpan,
                &format!("session '{}' must start before it ends", self.title),
            ));
        }

        if self.start_time.date() != self.end_time.date() {
            return Err(Error::new(
                ErrorKind::InvalidTimeSpan,
                &format!("session '{}' must start and end on the same day", self.title),
            ));
        }

        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: Uid,
    pub title: String,
    pub program_id: ProgramId,
    pub module_code: String,
    #[serde(with = "datetime::minutes")]
    pub due_at: NaiveDateTime,
    #[serde(default)]
    pub description: String,
}

pub trait Scheduled {
    fn id(&self) -> &Uid;
    fn title(&self) -> &str;
    fn program_id(&self) -> &ProgramId;
    fn begin(&self) -> NaiveDateTime;

    fn date(&self) -> NaiveDate {
        self.begin().date()
    }
}

impl Scheduled for Session {
    fn id(&self) -> &Uid {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn program_id(&self) -> &ProgramId {
        &self.program_id
    }

    fn begin(&self) -> NaiveDateTime {
        self.start_time
    }
}

impl Scheduled for Assignment {
    fn id(&self) -> &Uid {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn program_id(&self) -> &ProgramId {
        &self.program_id
    }

    fn begin(&self) -> NaiveDateTime {
        self.due_at
    }
}

/// A finished record as handed to the save callback.
#[derive(Clone, Debug, PartialEq)]
pub enum Record {
    Session(Session),
    Assignment(Assignment),
}

impl Record {
    pub fn id(&self) -> &Uid {
        match self {
            Record::Session(session) => &session.id,
            Record::Assignment(assignment) => &assignment.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, 28)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn session(start: NaiveDateTime, end: NaiveDateTime) -> Session {
        Session {
            id: Uid::from("s1"),
            title: "Linear Algebra".to_owned(),
            program_id: ProgramId::new("math"),
            module_code: "MA101".to_owned(),
            instructor: String::new(),
            room: String::new(),
            start_time: start,
            end_time: end,
            color: Color::default(),
        }
    }

    #[test]
    fn session_time_invariant() {
        assert!(session(at(9, 0), at(11, 0)).validate().is_ok());
        assert!(session(at(11, 0), at(9, 0)).validate().is_err());
        assert!(session(at(9, 0), at(9, 0)).validate().is_err());

        let next_day = at(1, 0) + chrono::Duration::days(1);
        assert!(session(at(23, 0), next_day).validate().is_err());
    }

    #[test]
    fn color_notation() {
        assert_eq!("#ABC".parse::<Color>().unwrap().as_str(), "#abc");
        assert!("#a1b2c3".parse::<Color>().is_ok());
        assert!("a1b2c3".parse::<Color>().is_err());
        assert!("#a1b2".parse::<Color>().is_err());

        assert_eq!("#4f46e5".parse::<Color>().unwrap().rgb(), (0x4f, 0x46, 0xe5));
        assert_eq!("#ABC".parse::<Color>().unwrap().rgb(), (0xaa, 0xbb, 0xcc));
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(Uid::generate(), Uid::generate());
    }
}
