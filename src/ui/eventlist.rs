use chrono::{Locale, NaiveDate, NaiveDateTime};
use itertools::Itertools;
use std::fmt::{self, Display};

use crate::agenda::Agenda;
use crate::model::{Assignment, Session};

use super::{localized_date, Line, StyledText, Theme, Tone};

pub enum Entry<'a> {
    Session(&'a Session),
    Assignment(&'a Assignment),
    Time(NaiveDateTime),
}

impl Entry<'_> {
    pub fn datetime(&self) -> NaiveDateTime {
        match self {
            Entry::Session(session) => session.start_time,
            Entry::Assignment(assignment) => assignment.due_at,
            Entry::Time(dt) => *dt,
        }
    }
}

impl Display for Entry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Session(session) => {
                write!(
                    f,
                    "{} - {}: {} ({}",
                    session.start_time.format("%H:%M"),
                    session.end_time.format("%H:%M"),
                    session.title,
                    session.module_code
                )?;
                if !session.room.is_empty() {
                    write!(f, ", {}", session.room)?;
                }
                if !session.instructor.is_empty() {
                    write!(f, ", {}", session.instructor)?;
                }
                write!(f, ") [{}]", session.id)
            }
            Entry::Assignment(assignment) => write!(
                f,
                "due {}: {} ({}) [{}]",
                assignment.due_at.format("%H:%M"),
                assignment.title,
                assignment.module_code,
                assignment.id
            ),
            Entry::Time(dt) => f.pad(&format!("[{}]", dt.format("%H:%M"))),
        }
    }
}

/// Chronological listing of entries, grouped under one heading per day.
pub struct DayList<'a> {
    entries: Vec<Entry<'a>>,
    agenda: &'a Agenda,
    theme: &'a Theme,
    locale: Locale,
}

impl<'a> DayList<'a> {
    pub fn new<S, A>(
        sessions: S,
        assignments: A,
        agenda: &'a Agenda,
        theme: &'a Theme,
        locale: Locale,
    ) -> Self
    where
        S: IntoIterator<Item = &'a Session>,
        A: IntoIterator<Item = &'a Assignment>,
    {
        let mut entries = sessions
            .into_iter()
            .map(Entry::Session)
            .chain(assignments.into_iter().map(Entry::Assignment))
            .collect::<Vec<Entry>>();

        entries.sort_by_key(|entry| entry.datetime());

        DayList {
            entries,
            agenda,
            theme,
            locale,
        }
    }

    /// Adds a marker for the current time, placed among the entries of
    /// its day.
    pub fn with_now(mut self, now: NaiveDateTime) -> Self {
        let idx = self.entries.partition_point(|e| e.datetime() <= now);
        self.entries.insert(idx, Entry::Time(now));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries
            .iter()
            .all(|entry| matches!(entry, Entry::Time(_)))
    }

    fn marker(&self, entry: &Entry) -> (char, Tone) {
        match entry {
            Entry::Session(session) => {
                (self.theme.session_char, Tone::Session(session.color.clone()))
            }
            Entry::Assignment(_) => (self.theme.assignment_char, Tone::Assignment),
            Entry::Time(_) => (self.theme.now_char, Tone::Now),
        }
    }

    fn program_of<'e>(&'e self, entry: &'e Entry) -> Option<&'e str> {
        match entry {
            Entry::Session(session) => Some(self.agenda.program_name(&session.program_id)),
            Entry::Assignment(assignment) => {
                Some(self.agenda.program_name(&assignment.program_id))
            }
            Entry::Time(_) => None,
        }
    }
}

impl<'a> DayList<'a> {
    pub fn text(&self) -> StyledText {
        let mut text = StyledText::new(self.theme);
        if self.is_empty() {
            text.push(Line::plain("  (nothing scheduled)"));
            return text;
        }

        for (date, entries) in &self.entries.iter().group_by(|entry| entry.datetime().date()) {
            text.push(Line::styled(heading(&date, self.locale), Tone::Header));

            for entry in entries {
                let (marker, tone) = self.marker(entry);
                let body = match entry {
                    Entry::Time(_) => Tone::Now,
                    _ => Tone::Plain,
                };
                let mut line = Line::plain("  ")
                    .with(marker.to_string(), tone)
                    .with(format!(" {}", entry), body);
                if let Some(program) = self.program_of(entry) {
                    line.push(format!(" - {}", program), Tone::Plain);
                }
                text.push(line);
            }
        }

        text
    }
}

impl Display for DayList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.text().fmt(f)
    }
}

fn heading(date: &NaiveDate, locale: Locale) -> String {
    localized_date(date, "%A %d %B %Y", locale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Uid;

    #[test]
    fn entries_are_sorted_and_grouped() {
        let agenda = Agenda::sample().unwrap();
        let theme = Theme::default();

        let list = DayList::new(
            agenda.sessions(),
            agenda.assignments().iter().filter(|a| a.id == Uid::from("a-2")),
            &agenda,
            &theme,
            Locale::en_GB,
        );
        let text = list.to_string();

        let monday = text.find("Monday 28 April 2025").unwrap();
        let wednesday = text.find("Wednesday 30 April 2025").unwrap();
        let operating_systems = text.find("07:30 - 09:30: Operating Systems").unwrap();
        let problem_set = text.find("! due 12:00: Problem set 4 (MA110) [a-2] - Mathematics").unwrap();

        assert!(monday < wednesday);
        assert!(wednesday < operating_systems);
        assert!(operating_systems < problem_set);
        assert_eq!(text.matches("Wednesday 30 April 2025").count(), 1);

        let styled = list.text();
        let monday = &styled.lines()[1];
        assert_eq!(monday.tone_of("#"), Some(&Tone::Session("#4f46e5".parse().unwrap())));
        assert_eq!(styled.lines()[0].tone_of("Monday"), Some(&Tone::Header));
    }

    #[test]
    fn empty_list_says_so() {
        let agenda = Agenda::default();
        let theme = Theme::default();
        let now = NaiveDate::from_ymd_opt(2025, 4, 28)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();

        let list = DayList::new([], [], &agenda, &theme, Locale::en_GB).with_now(now);
        assert!(list.is_empty());
        assert_eq!(list.to_string(), "  (nothing scheduled)\n");
    }
}
