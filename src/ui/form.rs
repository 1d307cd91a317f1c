use std::fmt::{self, Display};

use crate::form::Draft;
use crate::model::Color;

use super::{Line, StyledText, Theme, Tone};

pub struct FormView<'a> {
    draft: &'a Draft,
    is_new: bool,
    theme: &'a Theme,
}

impl<'a> FormView<'a> {
    pub fn new(draft: &'a Draft, is_new: bool, theme: &'a Theme) -> Self {
        FormView {
            draft,
            is_new,
            theme,
        }
    }

    pub fn text(&self) -> StyledText {
        let mut text = StyledText::new(self.theme);
        let verb = if self.is_new { "New" } else { "Edit" };
        text.push(Line::styled(
            format!("{} {} [{}]", verb, self.draft.kind(), self.draft.id()),
            Tone::Header,
        ));

        let fields = self.draft.fields();
        let width = fields.iter().map(|(name, _)| name.len()).max().unwrap_or(0);

        for (name, value) in fields {
            let mut line = Line::plain(format!("  {:>width$}: {}", name, value, width = width));
            if let Ok(color) = value.parse::<Color>() {
                line.push(format!(" {}", self.theme.session_char), Tone::Session(color));
            }
            text.push(line);
        }

        text.push(Line::plain("  (set key:value ... | save | cancel)"));
        text
    }
}

impl Display for FormView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.text().fmt(f)
    }
}
