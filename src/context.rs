use chrono::{NaiveDate, NaiveDateTime};

use crate::agenda::{filter_by_program, Agenda};
use crate::layout::CalendarLayout;
use crate::model::ProgramId;
use crate::period::{Granularity, Period};

/// What the calendar currently looks at.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewContext {
    pub cursor: NaiveDate,
    pub granularity: Granularity,
    pub program: Option<ProgramId>,
    now: NaiveDateTime,
}

impl ViewContext {
    pub fn new(now: NaiveDateTime, granularity: Granularity) -> Self {
        ViewContext {
            cursor: now.date(),
            granularity,
            program: None,
            now,
        }
    }

    pub fn with_program(mut self, program: Option<ProgramId>) -> Self {
        self.program = program;
        self
    }

    pub fn with_cursor(mut self, cursor: NaiveDate) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn now(&self) -> &NaiveDateTime {
        &self.now
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date()
    }

    pub fn update(&mut self, now: NaiveDateTime) {
        self.now = now;
    }

    pub fn select_today(&mut self) {
        self.cursor = self.today();
    }

    pub fn period(&self) -> Period {
        Period::new(self.cursor, self.granularity)
    }

    /// Moves the cursor forward by `units` periods. Leaves it unchanged if the
    /// target date is not representable.
    pub fn next(&mut self, units: u32) {
        match self.period().next(units) {
            Some(period) => self.cursor = period.reference(),
            None => log::warn!("Cannot move {} {}s past {}", units, self.granularity, self.cursor),
        }
    }

    pub fn prev(&mut self, units: u32) {
        match self.period().prev(units) {
            Some(period) => self.cursor = period.reference(),
            None => log::warn!("Cannot move {} {}s before {}", units, self.granularity, self.cursor),
        }
    }

    /// Placements of every record visible under the current period and
    /// program filter.
    pub fn layout<'a>(&self, agenda: &'a Agenda) -> CalendarLayout<'a> {
        let program = self.program.as_ref();

        CalendarLayout::new(
            self.period().days(),
            filter_by_program(agenda.sessions(), program),
            filter_by_program(agenda.assignments(), program),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monday_morning() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, 28)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    #[test]
    fn navigation_moves_by_granularity() {
        let mut context = ViewContext::new(monday_morning(), Granularity::Week);
        context.next(2);
        assert_eq!(context.cursor, NaiveDate::from_ymd_opt(2025, 5, 12).unwrap());

        context.granularity = Granularity::Month;
        context.prev(1);
        assert_eq!(context.cursor, NaiveDate::from_ymd_opt(2025, 4, 12).unwrap());

        context.select_today();
        assert_eq!(context.cursor, monday_morning().date());
    }

    #[test]
    fn huge_typed_repeat_counts_leave_the_cursor_alone() {
        use crate::command::{parse_command, Cmd};

        let mut context = ViewContext::new(monday_morning(), Granularity::Day);

        match parse_command("4294967295next").unwrap() {
            Cmd::Next(units) => context.next(units),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(context.cursor, monday_morning().date());

        match parse_command("2147483648prev").unwrap() {
            Cmd::Prev(units) => context.prev(units),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(context.cursor, monday_morning().date());
    }

    #[test]
    fn layout_honours_program_filter() {
        let agenda = Agenda::sample().unwrap();
        let context = ViewContext::new(monday_morning(), Granularity::Week);

        let everything = context.layout(&agenda);
        assert_eq!(everything.days.len(), 7);
        assert_eq!(everything.sessions.len(), 4);
        assert_eq!(everything.assignments.len(), 2);

        let maths = context
            .clone()
            .with_program(Some(ProgramId::new("math")))
            .layout(&agenda);
        assert_eq!(maths.sessions.len(), 1);
        assert_eq!(maths.sessions[0].0.module_code, "MA110");
        assert_eq!(maths.assignments.len(), 1);
    }

    #[test]
    fn layout_is_a_function_of_state() {
        let agenda = Agenda::sample().unwrap();
        let context = ViewContext::new(monday_morning(), Granularity::Month);

        let first = context.layout(&agenda);
        let second = context.layout(&agenda);
        assert_eq!(first.days, second.days);
        assert_eq!(first.sessions, second.sessions);
    }
}
