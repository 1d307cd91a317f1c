pub mod eventlist;
pub mod form;
pub mod grid;
pub mod month;
pub mod text;

pub use eventlist::{DayList, Entry};
pub use form::FormView;
pub use grid::TimeGrid;
pub use month::MonthPane;
pub use text::{Line, Span, StyledText, Tone};

use chrono::{Locale, NaiveDate, NaiveDateTime, TimeZone, Utc};
use unsegen::base::style::{Color as TermColor, StyleModifier};

#[derive(Clone, Debug)]
pub struct Theme {
    pub today_char: char,
    pub focus_char: char,
    pub busy_char: char,
    pub assignment_char: char,
    pub session_char: char,
    pub break_char: char,
    pub now_char: char,
    pub header_style: StyleModifier,
    pub today_style: StyleModifier,
    pub focus_style: StyleModifier,
    pub break_style: StyleModifier,
    pub now_style: StyleModifier,
    pub assignment_style: StyleModifier,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            today_char: '*',
            focus_char: '>',
            busy_char: '+',
            assignment_char: '!',
            session_char: '#',
            break_char: '-',
            now_char: '>',
            header_style: StyleModifier::new().fg_color(TermColor::Yellow),
            today_style: StyleModifier::new().invert(true),
            focus_style: StyleModifier::new().bg_color(TermColor::Blue),
            break_style: StyleModifier::new().fg_color(TermColor::LightBlack),
            now_style: StyleModifier::new().fg_color(TermColor::LightRed),
            assignment_style: StyleModifier::new().fg_color(TermColor::LightMagenta),
        }
    }
}

impl Theme {
    pub fn style(&self, tone: &Tone) -> StyleModifier {
        match tone {
            Tone::Plain => StyleModifier::new(),
            Tone::Header => self.header_style,
            Tone::Today => self.today_style,
            Tone::Focus => self.focus_style,
            Tone::Break => self.break_style,
            Tone::Now => self.now_style,
            Tone::Assignment => self.assignment_style,
            Tone::Session(color) => {
                let (r, g, b) = color.rgb();
                StyleModifier::new().fg_color(TermColor::Rgb { r, g, b })
            }
        }
    }
}

pub(crate) fn localized(datetime: &NaiveDateTime, fmt: &str, locale: Locale) -> String {
    Utc.from_utc_datetime(datetime)
        .format_localized(fmt, locale)
        .to_string()
}

pub(crate) fn localized_date(date: &NaiveDate, fmt: &str, locale: Locale) -> String {
    match date.and_hms_opt(0, 0, 0) {
        Some(midnight) => localized(&midnight, fmt, locale),
        None => date.format(fmt).to_string(),
    }
}

/// Cuts `text` to at most `width` characters.
pub(crate) fn truncate(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_use_the_configured_locale() {
        let date = NaiveDate::from_ymd_opt(2025, 4, 28).unwrap();
        assert_eq!(localized_date(&date, "%A %d %B", Locale::en_GB), "Monday 28 April");
        assert_eq!(localized_date(&date, "%A", Locale::de_DE), "Montag");
    }

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncate("Übersicht", 4), "Über");
        assert_eq!(truncate("ab", 4), "ab");
    }
}
