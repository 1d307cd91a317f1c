//! Geometry of the daily time grid.
//!
//! The grid has a morning band (07:00-12:59) and an afternoon band
//! (14:00-18:59). Each hour is one slot of [`SLOT_HEIGHT`] units; the noon
//! slot is a break marker. Offsets are measured from the top of the 07:00
//! slot.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use derive_more::Constructor;

use crate::model::{Assignment, Session};

pub const SLOT_HEIGHT: f64 = 64.0;
pub const SLOT_COUNT: usize = 11;
pub const BREAK_HOUR: u32 = 12;

const MORNING: (u32, u32) = (7, 12);
const AFTERNOON: (u32, u32) = (14, 18);

pub fn slot_index(hour: u32) -> Option<usize> {
    if (MORNING.0..=MORNING.1).contains(&hour) {
        Some((hour - MORNING.0) as usize)
    } else if (AFTERNOON.0..=AFTERNOON.1).contains(&hour) {
        Some((hour - AFTERNOON.0) as usize + (MORNING.1 - MORNING.0 + 1) as usize)
    } else {
        None
    }
}

pub fn slot_hour(index: usize) -> Option<u32> {
    (MORNING.0..=MORNING.1)
        .chain(AFTERNOON.0..=AFTERNOON.1)
        .nth(index)
}

pub fn is_break(index: usize) -> bool {
    slot_hour(index) == Some(BREAK_HOUR)
}

/// Offset of `time` as the top edge of an item.
pub fn start_offset(time: NaiveTime) -> Option<f64> {
    slot_index(time.hour())
        .map(|slot| slot as f64 * SLOT_HEIGHT + time.minute() as f64 / 60.0 * SLOT_HEIGHT)
}

/// Offset of `time` as the bottom edge of an item. A full hour closes the
/// slot of the preceding hour, so 13:00 and 19:00 are valid end times.
pub fn end_offset(time: NaiveTime) -> Option<f64> {
    if time.minute() == 0 && time.hour() > 0 {
        if let Some(slot) = slot_index(time.hour() - 1) {
            return Some((slot + 1) as f64 * SLOT_HEIGHT);
        }
    }

    start_offset(time)
}

#[derive(Clone, Copy, Debug, PartialEq, Constructor)]
pub struct Placement {
    pub column: usize,
    pub offset: f64,
    pub height: f64,
}

pub fn column_of(date: &NaiveDate, days: &[NaiveDate]) -> Option<usize> {
    days.iter().position(|day| day == date)
}

/// Placement of `session` in the visible `days`. Sessions starting inside the
/// noon break are not placed.
pub fn place_session(session: &Session, days: &[NaiveDate]) -> Option<Placement> {
    let column = column_of(&session.start_time.date(), days)?;

    if session.start_time.hour() == BREAK_HOUR {
        log::debug!(
            "Session '{}' starts at {} inside the break",
            session.title,
            session.start_time.time()
        );
        return None;
    }
    let top = start_offset(session.start_time.time());
    let bottom = end_offset(session.end_time.time());

    match (top, bottom) {
        (Some(top), Some(bottom)) if bottom > top => {
            Some(Placement::new(column, top, bottom - top))
        }
        _ => {
            log::debug!(
                "Session '{}' ({} - {}) does not fit the time grid",
                session.title,
                session.start_time.time(),
                session.end_time.time()
            );
            None
        }
    }
}

pub fn place_assignment(assignment: &Assignment, days: &[NaiveDate]) -> Option<Placement> {
    let column = column_of(&assignment.due_at.date(), days)?;

    match start_offset(assignment.due_at.time()) {
        Some(offset) => Some(Placement::new(column, offset, 0.0)),
        None => {
            log::debug!(
                "Assignment '{}' due at {} is outside the time grid",
                assignment.title,
                assignment.due_at.time()
            );
            None
        }
    }
}

/// Start of the slot at (`column`, `index`), or `None` for the break slot
/// and positions off the grid.
pub fn slot_start(days: &[NaiveDate], column: usize, index: usize) -> Option<NaiveDateTime> {
    if is_break(index) {
        return None;
    }

    let day = days.get(column)?;
    day.and_hms_opt(slot_hour(index)?, 0, 0)
}

/// Everything of one period that made it onto the grid.
pub struct CalendarLayout<'a> {
    pub days: Vec<NaiveDate>,
    pub sessions: Vec<(&'a Session, Placement)>,
    pub assignments: Vec<(&'a Assignment, Placement)>,
}

impl<'a> CalendarLayout<'a> {
    pub fn new<S, A>(days: Vec<NaiveDate>, sessions: S, assignments: A) -> Self
    where
        S: IntoIterator<Item = &'a Session>,
        A: IntoIterator<Item = &'a Assignment>,
    {
        let sessions = sessions
            .into_iter()
            .filter_map(|s| place_session(s, &days).map(|p| (s, p)))
            .collect();
        let assignments = assignments
            .into_iter()
            .filter_map(|a| place_assignment(a, &days).map(|p| (a, p)))
            .collect();

        CalendarLayout {
            days,
            sessions,
            assignments,
        }
    }

    pub fn sessions_in(&self, column: usize) -> impl Iterator<Item = &(&'a Session, Placement)> {
        self.sessions.iter().filter(move |(_, p)| p.column == column)
    }

    pub fn assignments_in(
        &self,
        column: usize,
    ) -> impl Iterator<Item = &(&'a Assignment, Placement)> {
        self.assignments
            .iter()
            .filter(move |(_, p)| p.column == column)
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty() && self.assignments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Color, ProgramId, Uid};
    use crate::period::{visible_days, Granularity};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn session_on(day: NaiveDate, start: (u32, u32), end: (u32, u32)) -> Session {
        Session {
            id: Uid::from("s"),
            title: "Databases".to_owned(),
            program_id: ProgramId::new("cs"),
            module_code: "CS204".to_owned(),
            instructor: "Dr. Wu".to_owned(),
            room: "B12".to_owned(),
            start_time: day.and_hms_opt(start.0, start.1, 0).unwrap(),
            end_time: day.and_hms_opt(end.0, end.1, 0).unwrap(),
            color: Color::default(),
        }
    }

    fn assignment_due(at: NaiveDateTime) -> Assignment {
        Assignment {
            id: Uid::from("a"),
            title: "Essay".to_owned(),
            program_id: ProgramId::new("cs"),
            module_code: "CS204".to_owned(),
            due_at: at,
            description: String::new(),
        }
    }

    #[test]
    fn hours_map_onto_two_bands() {
        assert_eq!(slot_index(7), Some(0));
        assert_eq!(slot_index(12), Some(5));
        assert_eq!(slot_index(14), Some(6));
        assert_eq!(slot_index(18), Some(10));
    }

    #[test]
    fn hours_outside_the_bands_have_no_slot() {
        for hour in [0, 6, 13, 19, 23] {
            assert_eq!(slot_index(hour), None, "hour {}", hour);
        }
    }

    #[test]
    fn slot_hours_invert_slot_index() {
        for index in 0..SLOT_COUNT {
            let hour = slot_hour(index).unwrap();
            assert_eq!(slot_index(hour), Some(index));
        }
        assert_eq!(slot_hour(SLOT_COUNT), None);
        assert!(is_break(5));
        assert!(!is_break(6));
    }

    #[test]
    fn two_hour_morning_session() {
        let day = date(2025, 4, 28);
        let placement = place_session(&session_on(day, (9, 0), (11, 0)), &[day]).unwrap();

        assert_eq!(placement.column, 0);
        assert_eq!(placement.offset, 2.0 * SLOT_HEIGHT);
        assert_eq!(placement.height, 2.0 * SLOT_HEIGHT);
    }

    #[test]
    fn half_hour_end() {
        let day = date(2025, 4, 28);
        let placement = place_session(&session_on(day, (7, 0), (9, 30)), &[day]).unwrap();

        assert_eq!(placement.offset, 0.0);
        assert_eq!(placement.height, 160.0);
    }

    #[test]
    fn sessions_may_end_on_band_edges() {
        let day = date(2025, 4, 28);

        let before_lunch = place_session(&session_on(day, (11, 0), (13, 0)), &[day]).unwrap();
        assert_eq!(before_lunch.offset, 4.0 * SLOT_HEIGHT);
        assert_eq!(before_lunch.height, 2.0 * SLOT_HEIGHT);

        let evening = place_session(&session_on(day, (17, 0), (19, 0)), &[day]).unwrap();
        assert_eq!(evening.offset, 9.0 * SLOT_HEIGHT);
        assert_eq!(evening.height, 2.0 * SLOT_HEIGHT);

        let last = place_session(&session_on(day, (18, 0), (19, 0)), &[day]).unwrap();
        assert_eq!(last.offset, 10.0 * SLOT_HEIGHT);
        assert_eq!(last.height, SLOT_HEIGHT);
        assert_eq!(last.offset + last.height, SLOT_COUNT as f64 * SLOT_HEIGHT);
    }

    #[test]
    fn break_is_not_used_for_sessions() {
        let day = date(2025, 4, 28);

        assert_eq!(place_session(&session_on(day, (12, 0), (12, 45)), &[day]), None);
        assert_eq!(place_session(&session_on(day, (12, 30), (15, 0)), &[day]), None);
        assert!(place_session(&session_on(day, (11, 0), (12, 30)), &[day]).is_some());
    }

    #[test]
    fn early_session_is_not_placed() {
        let day = date(2025, 4, 28);
        assert_eq!(place_session(&session_on(day, (6, 0), (8, 0)), &[day]), None);
        assert_eq!(place_session(&session_on(day, (13, 15), (14, 0)), &[day]), None);
    }

    #[test]
    fn session_outside_visible_week() {
        let session = session_on(date(2025, 4, 28), (9, 0), (11, 0));
        let days = visible_days(date(2025, 5, 7), Granularity::Week);

        let layout = CalendarLayout::new(days, [&session], []);
        assert!(layout.is_empty());
    }

    #[test]
    fn columns_follow_the_week() {
        let days = visible_days(date(2025, 4, 30), Granularity::Week);
        let session = session_on(date(2025, 5, 1), (14, 0), (16, 0));
        let due = assignment_due(date(2025, 5, 2).and_hms_opt(16, 30, 0).unwrap());

        let layout = CalendarLayout::new(days, [&session], [&due]);

        assert_eq!(layout.sessions.len(), 1);
        assert_eq!(layout.sessions[0].1.column, 3);
        assert_eq!(layout.sessions[0].1.offset, 6.0 * SLOT_HEIGHT);
        assert_eq!(layout.sessions_in(3).count(), 1);
        assert_eq!(layout.sessions_in(2).count(), 0);

        let (_, marker) = layout.assignments[0];
        assert_eq!(marker.column, 4);
        assert_eq!(marker.offset, 8.5 * SLOT_HEIGHT);
        assert_eq!(marker.height, 0.0);
    }

    #[test]
    fn late_assignment_is_not_placed() {
        let day = date(2025, 4, 28);
        let due = assignment_due(day.and_hms_opt(23, 59, 0).unwrap());
        assert_eq!(place_assignment(&due, &[day]), None);
    }

    #[test]
    fn break_slot_is_not_clickable() {
        let days = visible_days(date(2025, 4, 28), Granularity::Week);
        assert_eq!(slot_start(&days, 0, 5), None);
        assert_eq!(
            slot_start(&days, 1, 6),
            date(2025, 4, 29).and_hms_opt(14, 0, 0)
        );
        assert_eq!(slot_start(&days, 7, 0), None);
    }
}
