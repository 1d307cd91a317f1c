use chrono::{Datelike, Locale, NaiveDate};
use std::collections::BTreeSet;
use std::fmt::{self, Display};

use crate::period::week_start;

use super::{localized_date, Line, StyledText, Theme, Tone};

pub struct DayCell<'a> {
    day_num: u32,
    selected: bool,
    is_today: bool,
    is_busy: bool,
    theme: &'a Theme,
}

impl<'a> DayCell<'a> {
    const CELL_WIDTH: usize = 5;

    fn new(day_num: u32, theme: &'a Theme) -> Self {
        DayCell {
            day_num,
            selected: false,
            is_today: false,
            is_busy: false,
            theme,
        }
    }

    fn select(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    fn today(mut self, is_today: bool) -> Self {
        self.is_today = is_today;
        self
    }

    fn busy(mut self, is_busy: bool) -> Self {
        self.is_busy = is_busy;
        self
    }
}

impl DayCell<'_> {
    fn tone(&self) -> Tone {
        if self.is_today {
            Tone::Today
        } else if self.selected {
            Tone::Focus
        } else {
            Tone::Plain
        }
    }
}

impl Display for DayCell<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arg_today = if self.is_today {
            self.theme.today_char
        } else {
            ' '
        };

        let arg_focus = if self.selected {
            self.theme.focus_char
        } else {
            ' '
        };

        let arg_busy = if self.is_busy {
            self.theme.busy_char
        } else {
            ' '
        };

        write!(f, "{}{}{:>2}{}", arg_today, arg_focus, self.day_num, arg_busy)
    }
}

/// Month overview: a weekday header and one row per calendar week.
pub struct MonthPane<'a> {
    days: &'a [NaiveDate],
    busy: BTreeSet<NaiveDate>,
    cursor: Option<NaiveDate>,
    today: Option<NaiveDate>,
    theme: &'a Theme,
    locale: Locale,
}

impl<'a> MonthPane<'a> {
    const COLUMNS: usize = 7;

    pub fn new(days: &'a [NaiveDate], theme: &'a Theme, locale: Locale) -> Self {
        MonthPane {
            days,
            busy: BTreeSet::new(),
            cursor: None,
            today: None,
            theme,
            locale,
        }
    }

    pub fn busy<I: IntoIterator<Item = NaiveDate>>(mut self, dates: I) -> Self {
        self.busy.extend(dates);
        self
    }

    pub fn cursor(mut self, cursor: NaiveDate) -> Self {
        self.cursor = Some(cursor);
        self
    }

    pub fn today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }
}

impl<'a> MonthPane<'a> {
    pub fn text(&self) -> StyledText {
        let mut text = StyledText::new(self.theme);
        let first = match self.days.first() {
            Some(first) => *first,
            None => return text,
        };
        let width = Self::COLUMNS * DayCell::CELL_WIDTH;

        text.push(Line::styled(
            format!(
                "{:^width$}",
                localized_date(&first, "%B %Y", self.locale),
                width = width
            ),
            Tone::Header,
        ));

        // print header first
        let mut header = Line::new();
        for day in week_start(first).iter_days().take(Self::COLUMNS) {
            header.push(
                format!("{:>4} ", localized_date(&day, "%a", self.locale)),
                Tone::Header,
            );
        }
        text.push(header);

        let offset = first.weekday().num_days_from_monday() as usize;
        let mut row = Line::plain(" ".repeat(offset * DayCell::CELL_WIDTH));

        for (idx, day) in self.days.iter().enumerate() {
            let cell = DayCell::new(day.day(), self.theme)
                .select(self.cursor == Some(*day))
                .today(self.today == Some(*day))
                .busy(self.busy.contains(day));
            row.push(cell.to_string(), cell.tone());

            if (offset + idx + 1) % Self::COLUMNS == 0 {
                text.push(std::mem::take(&mut row));
            }
        }

        if !row.spans.is_empty() {
            text.push(row);
        }

        text
    }
}

impl Display for MonthPane<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.text().fmt(f)
    }
}
