//! Styled lines produced by every view.
//!
//! A view builds [`StyledText`] once; it prints as plain text for `--show`
//! and draws as an unsegen widget in the interactive calendar.

use std::fmt::{self, Display};
use unsegen::base::style::StyleModifier;
use unsegen::base::{Cursor, Window};
use unsegen::widget::{ColDemand, Demand2D, RenderingHints, RowDemand, Widget};

use crate::model::Color;

use super::Theme;

/// What a piece of text shows, mapped to a terminal style by the [`Theme`].
#[derive(Clone, Debug, PartialEq)]
pub enum Tone {
    Plain,
    Header,
    Today,
    Focus,
    Break,
    Now,
    Assignment,
    Session(Color),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Span {
    pub text: String,
    pub tone: Tone,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Line {
    pub spans: Vec<Span>,
}

impl Line {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn styled<S: Into<String>>(text: S, tone: Tone) -> Self {
        Line::new().with(text, tone)
    }

    pub fn plain<S: Into<String>>(text: S) -> Self {
        Line::styled(text, Tone::Plain)
    }

    pub fn push<S: Into<String>>(&mut self, text: S, tone: Tone) {
        self.spans.push(Span {
            text: text.into(),
            tone,
        });
    }

    pub fn with<S: Into<String>>(mut self, text: S, tone: Tone) -> Self {
        self.push(text, tone);
        self
    }

    pub fn width(&self) -> usize {
        self.spans.iter().map(|s| s.text.chars().count()).sum()
    }

    /// Tone of the first span containing `needle`.
    pub fn tone_of(&self, needle: &str) -> Option<&Tone> {
        self.spans
            .iter()
            .find(|s| s.text.contains(needle))
            .map(|s| &s.tone)
    }
}

impl Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for span in &self.spans {
            f.write_str(&span.text)?;
        }
        Ok(())
    }
}

pub struct StyledText {
    lines: Vec<Line>,
    theme: Theme,
}

impl StyledText {
    pub fn new(theme: &Theme) -> Self {
        StyledText {
            lines: Vec::new(),
            theme: theme.clone(),
        }
    }

    pub fn push(&mut self, line: Line) {
        self.lines.push(line);
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn width(&self) -> usize {
        self.lines.iter().map(Line::width).max().unwrap_or(0)
    }
}

impl Display for StyledText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

impl Widget for StyledText {
    fn space_demand(&self) -> Demand2D {
        Demand2D {
            width: ColDemand::at_least(self.width()),
            height: RowDemand::exact(self.lines.len()),
        }
    }

    fn draw(&self, mut window: Window, _hints: RenderingHints) {
        let mut cursor = Cursor::new(&mut window);

        for line in &self.lines {
            for span in &line.spans {
                cursor.set_style_modifier(self.theme.style(&span.tone));
                cursor.write(&span.text);
            }
            cursor.set_style_modifier(StyleModifier::new());
            cursor.fill_and_wrap_line();
        }
    }
}
