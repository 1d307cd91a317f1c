use chrono::{Locale, NaiveDate, NaiveDateTime};
use std::fmt::{self, Display};

use crate::layout::{
    is_break, slot_hour, start_offset, CalendarLayout, Placement, SLOT_COUNT, SLOT_HEIGHT,
};

use super::{localized_date, truncate, Line, StyledText, Theme, Tone};

const GUTTER_WIDTH: usize = 6;

/// Day or week view: one column per visible day, one band of rows per
/// grid slot.
pub struct TimeGrid<'a> {
    layout: &'a CalendarLayout<'a>,
    theme: &'a Theme,
    locale: Locale,
    cursor: Option<NaiveDate>,
    now: Option<NaiveDateTime>,
    rows_per_slot: usize,
    column_width: usize,
}

impl<'a> TimeGrid<'a> {
    pub fn new(layout: &'a CalendarLayout<'a>, theme: &'a Theme, locale: Locale) -> Self {
        TimeGrid {
            layout,
            theme,
            locale,
            cursor: None,
            now: None,
            rows_per_slot: 2,
            column_width: 18,
        }
    }

    pub fn cursor(mut self, cursor: NaiveDate) -> Self {
        self.cursor = Some(cursor);
        self
    }

    pub fn now(mut self, now: NaiveDateTime) -> Self {
        self.now = Some(now);
        self
    }

    pub fn rows_per_slot(mut self, rows: usize) -> Self {
        self.rows_per_slot = rows.max(1);
        self
    }

    pub fn column_width(mut self, width: usize) -> Self {
        self.column_width = width.max(4);
        self
    }

    fn rows(&self) -> usize {
        SLOT_COUNT * self.rows_per_slot
    }

    fn row_of(&self, offset: f64) -> usize {
        let row = (offset / SLOT_HEIGHT * self.rows_per_slot as f64).floor() as usize;
        row.min(self.rows() - 1)
    }

    fn rows_of(&self, placement: &Placement) -> (usize, usize) {
        let top = self.row_of(placement.offset);
        let bottom = ((placement.offset + placement.height) / SLOT_HEIGHT
            * self.rows_per_slot as f64)
            .ceil() as usize;

        (top, bottom.clamp(top + 1, self.rows()))
    }

    fn header_cell(&self, day: &NaiveDate) -> (String, Tone) {
        let is_today = self.now.map(|now| now.date()) == Some(*day);
        let is_focus = self.cursor == Some(*day);
        let today = if is_today { self.theme.today_char } else { ' ' };
        let focus = if is_focus { self.theme.focus_char } else { ' ' };

        let tone = if is_today {
            Tone::Today
        } else if is_focus {
            Tone::Focus
        } else {
            Tone::Header
        };

        (
            format!("{}{}{}", today, focus, localized_date(day, "%a %d %b", self.locale)),
            tone,
        )
    }

    /// Text of every cell, indexed by column then row.
    fn cells(&self) -> Vec<Vec<(String, Tone)>> {
        let mut cells =
            vec![vec![(String::new(), Tone::Plain); self.rows()]; self.layout.days.len()];
        let inner = self.column_width - 1;

        for (session, placement) in &self.layout.sessions {
            let (top, bottom) = self.rows_of(placement);
            let mark = self.theme.session_char;
            let lines = [
                format!(
                    "{} {}-{}",
                    mark,
                    session.start_time.format("%H:%M"),
                    session.end_time.format("%H:%M")
                ),
                format!("{} {}", mark, session.title),
                format!("{} {} {}", mark, session.module_code, session.room),
                format!("{} {}", mark, session.instructor),
            ];

            for (idx, row) in (top..bottom).enumerate() {
                let text = lines.get(idx).cloned().unwrap_or_else(|| mark.to_string());
                cells[placement.column][row] =
                    (truncate(&text, inner), Tone::Session(session.color.clone()));
            }
        }

        for (assignment, placement) in &self.layout.assignments {
            let row = self.row_of(placement.offset);
            let text = format!(
                "{} {} {}",
                self.theme.assignment_char,
                assignment.due_at.format("%H:%M"),
                assignment.title
            );
            cells[placement.column][row] = (truncate(&text, inner), Tone::Assignment);
        }

        cells
    }

    fn now_row(&self) -> Option<usize> {
        let now = self.now?;
        if !self.layout.days.contains(&now.date()) {
            return None;
        }

        start_offset(now.time()).map(|offset| self.row_of(offset))
    }

    fn gutter(&self, row: usize) -> (String, Tone) {
        let slot = row / self.rows_per_slot;
        let label = if row % self.rows_per_slot == 0 {
            slot_hour(slot).map_or_else(String::new, |hour| format!("{:02}:00", hour))
        } else {
            String::new()
        };

        if Some(row) == self.now_row() {
            (
                format!("{:>width$}", self.theme.now_char, width = GUTTER_WIDTH - 1),
                Tone::Now,
            )
        } else {
            (format!("{:<width$}", label, width = GUTTER_WIDTH - 1), Tone::Plain)
        }
    }

    pub fn text(&self) -> StyledText {
        let inner = self.column_width - 1;
        let mut text = StyledText::new(self.theme);

        let mut header = Line::plain(" ".repeat(GUTTER_WIDTH));
        for day in &self.layout.days {
            let (cell, tone) = self.header_cell(day);
            header.push("|", Tone::Plain);
            header.push(format!("{:<inner$}", truncate(&cell, inner), inner = inner), tone);
        }
        header.push("|", Tone::Plain);
        text.push(header);

        let cells = self.cells();
        for row in 0..self.rows() {
            let lunch = is_break(row / self.rows_per_slot);
            let (gutter, tone) = self.gutter(row);
            let mut line = Line::styled(gutter, tone).with(" ", Tone::Plain);

            for column in cells.iter() {
                let (cell, tone) = &column[row];
                line.push("|", Tone::Plain);
                if cell.is_empty() && lunch {
                    line.push(self.theme.break_char.to_string().repeat(inner), Tone::Break);
                } else {
                    line.push(format!("{:<inner$}", cell, inner = inner), tone.clone());
                }
            }
            line.push("|", Tone::Plain);
            text.push(line);
        }

        text
    }
}

impl Display for TimeGrid<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.text().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agenda::Agenda;
    use crate::period::{visible_days, Granularity};

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 28).unwrap()
    }

    #[test]
    fn week_grid_shows_sessions_in_their_columns() {
        let agenda = Agenda::sample().unwrap();
        let layout = CalendarLayout::new(
            visible_days(monday(), Granularity::Week),
            agenda.sessions(),
            agenda.assignments(),
        );
        let theme = Theme::default();
        let text = TimeGrid::new(&layout, &theme, Locale::en_GB)
            .cursor(monday())
            .column_width(20)
            .to_string();
        let lines = text.lines().collect::<Vec<_>>();

        // header plus two rows for each of the eleven slots
        assert_eq!(lines.len(), 1 + 22);
        assert!(lines[0].contains(" >Mon 28 Apr"));
        assert!(lines[0].contains("Sun 04 May"));

        // 09:00 is slot 2, so its first row is line 5
        assert!(lines[5].starts_with("09:00"));
        assert!(lines[5].contains("# 09:00-11:00"));
        assert!(lines[6].contains("# Data Structures"));

        // the lunch slot is drawn as a break in empty columns
        assert!(lines[11].contains("|-------------------|"));
        assert!(lines[11].contains("! 12:00 Problem set"));
    }

    #[test]
    fn sessions_are_drawn_in_their_color() {
        let agenda = Agenda::sample().unwrap();
        let layout = CalendarLayout::new(
            visible_days(monday(), Granularity::Week),
            agenda.sessions(),
            agenda.assignments(),
        );
        let theme = Theme::default();
        let text = TimeGrid::new(&layout, &theme, Locale::en_GB)
            .cursor(monday())
            .text();
        let lines = text.lines();
        let color = "#4f46e5".parse().unwrap();

        assert_eq!(lines[0].tone_of("Mon 28 Apr"), Some(&Tone::Focus));
        assert_eq!(lines[5].tone_of("# 09:00-11:00"), Some(&Tone::Session(color)));
        assert_eq!(lines[11].tone_of("! 12:00"), Some(&Tone::Assignment));
        assert_eq!(lines[11].tone_of("---"), Some(&Tone::Break));
    }

    #[test]
    fn day_grid_marks_now() {
        let agenda = Agenda::default();
        let layout = CalendarLayout::new(vec![monday()], agenda.sessions(), agenda.assignments());
        let theme = Theme::default();
        let now = monday().and_hms_opt(14, 40, 0).unwrap();

        let text = TimeGrid::new(&layout, &theme, Locale::en_GB)
            .now(now)
            .rows_per_slot(1)
            .to_string();
        let lines = text.lines().collect::<Vec<_>>();

        assert_eq!(lines.len(), 1 + 11);
        assert!(lines[0].contains("*"));
        assert!(lines[7].starts_with("    >"));
    }
}
