use chrono::{Local, Locale, NaiveDateTime};
use unsegen::base::Terminal;
use unsegen::input::{Behavior, EditBehavior, Event as InputEvent, Input, Key, ScrollBehavior};
use unsegen::widget::builtin::PromptLine;
use unsegen::widget::{RenderingHints, VLayout, Widget};

use crate::agenda::{filter_by_program, Agenda};
use crate::command::{parse_command, Cmd, USAGE};
use crate::config::Config;
use crate::context::ViewContext;
use crate::events::{Dispatcher, Event};
use crate::form::{AssignmentDraft, Defaults, Draft, FormController, FormState, SessionDraft};
use crate::layout::slot_start;
use crate::model::*;
use crate::period::Granularity;
use crate::ui::{
    localized_date, DayList, FormView, Line, MonthPane, StyledText, Theme, TimeGrid, Tone,
};

const PROMPT: &str = ":";

const KEY_HELP: &str = "keys: h/l prev/next  t today  d/w/m view  n/a new  s save  esc cancel  : command  q quit";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Command,
}

/// The command bound to a key in normal mode.
fn key_command(key: Key) -> Option<Cmd> {
    let cmd = match key {
        Key::Char('l') | Key::Right => Cmd::Next(1),
        Key::Char('h') | Key::Left => Cmd::Prev(1),
        Key::Char('t') => Cmd::Today,
        Key::Char('d') => Cmd::View(Granularity::Day),
        Key::Char('w') => Cmd::View(Granularity::Week),
        Key::Char('m') => Cmd::View(Granularity::Month),
        Key::Char('n') => Cmd::NewSession,
        Key::Char('a') => Cmd::NewAssignment,
        Key::Char('s') => Cmd::Save,
        Key::Char('?') => Cmd::Help,
        Key::Char('q') => Cmd::Quit,
        Key::Esc => Cmd::Cancel,
        _ => return None,
    };
    Some(cmd)
}

pub struct App<'a> {
    config: &'a Config,
    theme: Theme,
    locale: Locale,
    agenda: Agenda,
    context: ViewContext,
    form: FormController,
    last_message: Option<String>,
    clock: fn() -> NaiveDateTime,
    mode: Mode,
    command_line: PromptLine,
    running: bool,
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

impl<'a> App<'a> {
    pub fn new(config: &'a Config, agenda: Agenda) -> Result<App<'a>> {
        let context = ViewContext::new(local_now(), config.default_view)
            .with_program(config.program.clone());

        Ok(App {
            config,
            theme: Theme::default(),
            locale: config.locale()?,
            agenda,
            context,
            form: FormController::new(),
            last_message: None,
            clock: local_now,
            mode: Mode::Normal,
            command_line: PromptLine::with_prompt(PROMPT.to_owned()),
            running: true,
        })
    }

    /// Replaces the wall clock, e.g. to pin "now" to a fixed instant.
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self.context = ViewContext::new(clock(), self.context.granularity)
            .with_program(self.context.program.clone());
        self
    }

    pub fn agenda(&self) -> &Agenda {
        &self.agenda
    }

    pub fn context(&self) -> &ViewContext {
        &self.context
    }

    pub fn form(&self) -> &FormController {
        &self.form
    }

    pub fn last_message(&self) -> Option<&str> {
        self.last_message.as_deref()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    fn defaults(&self) -> Defaults<'_> {
        Defaults {
            now: *self.context.now(),
            program: self.context.program.as_ref(),
            palette: &self.config.palette,
        }
    }

    /// Opens the session form pre-filled with `partial`.
    pub fn on_create_session(&mut self, partial: SessionDraft) {
        self.form.open(Draft::Session(partial), true);
    }

    pub fn on_edit_session(&mut self, session: &Session) {
        self.form.edit_session(session);
    }

    pub fn handle(&mut self, cmd: Cmd) -> Result<Flow> {
        log::debug!("Handling {:?}", cmd);

        match cmd {
            Cmd::Next(units) => self.context.next(units),
            Cmd::Prev(units) => self.context.prev(units),
            Cmd::Today => self.context.select_today(),
            Cmd::Goto(date) => self.context.cursor = date,
            Cmd::View(granularity) => self.context.granularity = granularity,
            Cmd::Program(program) => {
                if let Some(id) = &program {
                    if self.agenda.program(id).is_none() {
                        return Err(Error::new(
                            ErrorKind::UnknownRecord,
                            &format!("program '{}'", id),
                        ));
                    }
                }
                self.context.program = program;
            }
            Cmd::NewSession => {
                let draft = SessionDraft::new(&self.defaults());
                self.on_create_session(draft);
            }
            Cmd::NewAssignment => {
                let draft = AssignmentDraft::new(&self.defaults());
                self.form.open(Draft::Assignment(draft), true);
            }
            Cmd::Slot { column, slot } => {
                let days = self.context.period().days();
                let start = slot_start(&days, column, slot).ok_or_else(|| {
                    Error::new(
                        ErrorKind::InvalidValue,
                        &format!("no bookable slot {} in column {}", slot, column),
                    )
                })?;
                let draft = SessionDraft::starting_at(start, &self.defaults());
                self.on_create_session(draft);
            }
            Cmd::Edit(id) => {
                if let Some(session) = self.agenda.session(&id).cloned() {
                    self.on_edit_session(&session);
                } else if let Some(assignment) = self.agenda.assignment(&id) {
                    self.form.edit_assignment(assignment);
                } else {
                    return Err(Error::new(ErrorKind::UnknownRecord, id.as_str()));
                }
            }
            Cmd::Set(changes) => self.form.set_fields(&changes)?,
            Cmd::Save => {
                let agenda = &mut self.agenda;
                let id = self.form.submit(|record| agenda.save(record))?;
                self.last_message = Some(format!("Saved {}", id));
            }
            Cmd::Cancel => self.form.close(),
            Cmd::Help => self.last_message = Some(format!("{}\n{}", USAGE, KEY_HELP)),
            Cmd::Quit => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }

    fn visible<'r, T: Scheduled>(&self, records: &'r [T]) -> Vec<&'r T> {
        let period = self.context.period();

        filter_by_program(records, self.context.program.as_ref())
            .into_iter()
            .filter(|record| period.contains(&record.date()))
            .collect()
    }

    fn title(&self) -> String {
        let cursor = &self.context.cursor;
        let period = match self.context.granularity {
            Granularity::Day => localized_date(cursor, "%A %d %B %Y", self.locale),
            Granularity::Week => format!(
                "Week of {}",
                localized_date(&self.context.period().first(), "%d %B %Y", self.locale)
            ),
            Granularity::Month => localized_date(cursor, "%B %Y", self.locale),
        };
        let program = self
            .context
            .program
            .as_ref()
            .map_or("all programs", |id| self.agenda.program_name(id));

        format!("{} | {}", period, program)
    }

    fn report(&mut self, what: &str, result: Result<Flow>) {
        match result {
            Ok(Flow::Quit) => self.running = false,
            Ok(Flow::Continue) => {}
            Err(e) => {
                log::debug!("{} failed: {}", what, e);
                self.last_message = Some(e.to_string());
            }
        }
    }

    /// Runs one line typed at the command prompt. Errors end up in the
    /// message line.
    pub fn execute(&mut self, line: &str) -> Flow {
        self.last_message = None;

        if !line.trim().is_empty() {
            let result = parse_command(line).and_then(|cmd| self.handle(cmd));
            self.report(&format!("Command '{}'", line.trim()), result);
        }

        if self.running {
            Flow::Continue
        } else {
            Flow::Quit
        }
    }

    /// Handles a key in normal mode. Returns whether the key is bound.
    pub fn press(&mut self, key: Key) -> bool {
        if key == Key::Char(':') {
            self.mode = Mode::Command;
            return true;
        }

        match key_command(key) {
            Some(cmd) => {
                self.last_message = None;
                let result = self.handle(cmd);
                self.report(&format!("Key {:?}", key), result);
                true
            }
            None => false,
        }
    }

    pub fn on_input(&mut self, input: Input) {
        match self.mode {
            Mode::Normal => {
                input.chain(KeyBindings(self)).finish();
            }
            Mode::Command => {
                if input.matches(Key::Esc) {
                    self.command_line.finish_line();
                    self.mode = Mode::Normal;
                    return;
                }

                input
                    .chain(SubmitCommand(self))
                    .chain(
                        EditBehavior::new(&mut self.command_line)
                            .delete_forwards_on(Key::Delete)
                            .delete_backwards_on(Key::Backspace)
                            .left_on(Key::Left)
                            .right_on(Key::Right),
                    )
                    .chain(
                        ScrollBehavior::new(&mut self.command_line)
                            .backwards_on(Key::Up)
                            .forwards_on(Key::Down),
                    )
                    .finish();
            }
        }
    }

    /// The screen as stacked blocks: title, calendar, day list, open form
    /// and message. Depends on nothing but the current state.
    pub fn blocks(&self) -> Vec<StyledText> {
        let mut blocks = Vec::new();

        let mut title = StyledText::new(&self.theme);
        title.push(Line::styled(self.title(), Tone::Header));
        blocks.push(title);

        let layout = self.context.layout(&self.agenda);
        let now = *self.context.now();

        match self.context.granularity {
            Granularity::Day | Granularity::Week => {
                let grid = TimeGrid::new(&layout, &self.theme, self.locale)
                    .cursor(self.context.cursor)
                    .now(now)
                    .rows_per_slot(self.config.rows_per_slot)
                    .column_width(self.config.column_width);
                blocks.push(grid.text());
            }
            Granularity::Month => {
                let busy = layout
                    .sessions
                    .iter()
                    .map(|(s, _)| s.start_time.date())
                    .chain(layout.assignments.iter().map(|(a, _)| a.due_at.date()));
                let pane = MonthPane::new(&layout.days, &self.theme, self.locale)
                    .cursor(self.context.cursor)
                    .today(now.date())
                    .busy(busy);
                blocks.push(pane.text());
            }
        }

        if self.context.granularity != Granularity::Week {
            let mut list = DayList::new(
                self.visible(self.agenda.sessions()),
                self.visible(self.agenda.assignments()),
                &self.agenda,
                &self.theme,
                self.locale,
            );
            if self.context.period().contains(&now.date()) {
                list = list.with_now(now);
            }
            blocks.push(list.text());
        }

        if let FormState::Editing { draft, is_new } = self.form.state() {
            blocks.push(FormView::new(draft, *is_new, &self.theme).text());
        }

        if let Some(message) = &self.last_message {
            let mut text = StyledText::new(&self.theme);
            for line in message.lines() {
                text.push(Line::plain(line));
            }
            blocks.push(text);
        }

        blocks
    }

    /// The screen as plain text, one blank line between blocks.
    pub fn render(&self) -> String {
        self.blocks()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn as_widget(&self) -> impl Widget + '_ {
        let mut layout = VLayout::new();

        for block in self.blocks() {
            layout = layout.widget(block);
        }

        if self.mode == Mode::Command {
            layout = layout.widget(self.command_line.as_widget());
        }

        layout
    }

    /// Draws the calendar and handles input until `quit` or end of input.
    pub fn run(&mut self, dispatcher: Dispatcher, mut term: Terminal) -> Result<()> {
        while self.running {
            let root = term.create_root_window();
            self.as_widget().draw(root, RenderingHints::new());
            term.present();

            match dispatcher.next() {
                Ok(Event::Input(input)) => {
                    self.context.update((self.clock)());
                    self.on_input(input);
                }
                Err(_) => {
                    log::info!("Input closed");
                    break;
                }
            }
        }

        Ok(())
    }
}

struct KeyBindings<'a, 'c>(&'a mut App<'c>);

impl Behavior for KeyBindings<'_, '_> {
    fn input(self, input: Input) -> Option<Input> {
        if let InputEvent::Key(key) = input.event {
            if self.0.press(key) {
                return None;
            }
        }
        Some(input)
    }
}

struct SubmitCommand<'a, 'c>(&'a mut App<'c>);

impl Behavior for SubmitCommand<'_, '_> {
    fn input(self, input: Input) -> Option<Input> {
        if input.matches(Key::Char('\n')) {
            let line = self.0.command_line.finish_line().to_owned();
            self.0.mode = Mode::Normal;
            self.0.execute(&line);
            None
        } else {
            Some(input)
        }
    }
}
