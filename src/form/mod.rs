//! Create/edit form for a single session or assignment.
//!
//! The controller is either closed or editing one [`Draft`]. Field changes
//! never mutate the working copy in place: each change produces a new draft
//! that replaces the old one, and a rejected change leaves it untouched.

pub mod fields;

use chrono::{Duration, NaiveDateTime};

use crate::model::datetime::{format_form_datetime, truncate_to_minute};
use crate::model::*;
use fields::{find_setter, FieldSetter, ASSIGNMENT_FIELDS, SESSION_FIELDS};

/// Seed values for new records.
#[derive(Clone, Copy, Debug)]
pub struct Defaults<'a> {
    pub now: NaiveDateTime,
    pub program: Option<&'a ProgramId>,
    pub palette: &'a [Color],
}

impl Defaults<'_> {
    fn program_id(&self) -> String {
        self.program.map(|p| p.to_string()).unwrap_or_default()
    }

    fn color(&self) -> Color {
        self.palette.first().cloned().unwrap_or_default()
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(Error::new(ErrorKind::MissingField, field))
    } else {
        Ok(())
    }
}

fn apply<D: Clone>(
    draft: &D,
    table: &[(&str, FieldSetter<D>)],
    name: &str,
    value: &str,
) -> Result<D> {
    let setter = find_setter(table, name).ok_or_else(|| {
        Error::new(
            ErrorKind::UnknownField,
            &format!(
                "'{}' (expected one of {})",
                name,
                fields::field_names(table).join(", ")
            ),
        )
    })?;

    let mut next = draft.clone();
    setter(&mut next, value).map_err(|e| {
        let msg = format!("{}: {}", name, e.message.as_deref().unwrap_or("rejected"));
        e.with_msg(&msg)
    })?;
    Ok(next)
}

#[derive(Clone, Debug, PartialEq)]
pub struct SessionDraft {
    pub id: Uid,
    pub title: String,
    pub program_id: String,
    pub module_code: String,
    pub instructor: String,
    pub room: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub color: Color,
}

impl SessionDraft {
    pub const DEFAULT_LENGTH_HOURS: i64 = 2;

    pub fn new(defaults: &Defaults) -> Self {
        Self::starting_at(defaults.now, defaults)
    }

    /// Blank session beginning at `start`, as created from a grid slot.
    pub fn starting_at(start: NaiveDateTime, defaults: &Defaults) -> Self {
        let start = truncate_to_minute(start);
        SessionDraft {
            id: Uid::generate(),
            title: String::new(),
            program_id: defaults.program_id(),
            module_code: String::new(),
            instructor: String::new(),
            room: String::new(),
            start_time: start,
            end_time: start + Duration::hours(Self::DEFAULT_LENGTH_HOURS),
            color: defaults.color(),
        }
    }

    pub fn from_session(session: &Session) -> Self {
        SessionDraft {
            id: session.id.clone(),
            title: session.title.clone(),
            program_id: session.program_id.to_string(),
            module_code: session.module_code.clone(),
            instructor: session.instructor.clone(),
            room: session.room.clone(),
            start_time: session.start_time,
            end_time: session.end_time,
            color: session.color.clone(),
        }
    }

    pub fn with_field(&self, name: &str, value: &str) -> Result<Self> {
        apply(self, SESSION_FIELDS, name, value)
    }

    pub fn finish(&self) -> Result<Session> {
        require("title", &self.title)?;
        require("program_id", &self.program_id)?;
        require("module_code", &self.module_code)?;

        let session = Session {
            id: self.id.clone(),
            title: self.title.trim().to_owned(),
            program_id: ProgramId::new(self.program_id.trim()),
            module_code: self.module_code.trim().to_owned(),
            instructor: self.instructor.trim().to_owned(),
            room: self.room.trim().to_owned(),
            start_time: self.start_time,
            end_time: self.end_time,
            color: self.color.clone(),
        };
        session.validate()?;

        Ok(session)
    }

    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("title", self.title.clone()),
            ("program_id", self.program_id.clone()),
            ("module_code", self.module_code.clone()),
            ("instructor", self.instructor.clone()),
            ("room", self.room.clone()),
            ("start_time", format_form_datetime(&self.start_time)),
            ("end_time", format_form_datetime(&self.end_time)),
            ("color", self.color.to_string()),
        ]
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AssignmentDraft {
    pub id: Uid,
    pub title: String,
    pub program_id: String,
    pub module_code: String,
    pub due_at: NaiveDateTime,
    pub description: String,
}

impl AssignmentDraft {
    pub fn new(defaults: &Defaults) -> Self {
        AssignmentDraft {
            id: Uid::generate(),
            title: String::new(),
            program_id: defaults.program_id(),
            module_code: String::new(),
            due_at: truncate_to_minute(defaults.now),
            description: String::new(),
        }
    }

    pub fn from_assignment(assignment: &Assignment) -> Self {
        AssignmentDraft {
            id: assignment.id.clone(),
            title: assignment.title.clone(),
            program_id: assignment.program_id.to_string(),
            module_code: assignment.module_code.clone(),
            due_at: assignment.due_at,
            description: assignment.description.clone(),
        }
    }

    pub fn with_field(&self, name: &str, value: &str) -> Result<Self> {
        apply(self, ASSIGNMENT_FIELDS, name, value)
    }

    pub fn finish(&self) -> Result<Assignment> {
        require("title", &self.title)?;
        require("program_id", &self.program_id)?;
        require("module_code", &self.module_code)?;

        Ok(Assignment {
            id: self.id.clone(),
            title: self.title.trim().to_owned(),
            program_id: ProgramId::new(self.program_id.trim()),
            module_code: self.module_code.trim().to_owned(),
            due_at: self.due_at,
            description: self.description.trim().to_owned(),
        })
    }

    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("title", self.title.clone()),
            ("program_id", self.program_id.clone()),
            ("module_code", self.module_code.clone()),
            ("due_at", format_form_datetime(&self.due_at)),
            ("description", self.description.clone()),
        ]
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Draft {
    Session(SessionDraft),
    Assignment(AssignmentDraft),
}

impl Draft {
    pub fn kind(&self) -> &'static str {
        match self {
            Draft::Session(_) => "session",
            Draft::Assignment(_) => "assignment",
        }
    }

    pub fn id(&self) -> &Uid {
        match self {
            Draft::Session(d) => &d.id,
            Draft::Assignment(d) => &d.id,
        }
    }

    pub fn with_field(&self, name: &str, value: &str) -> Result<Self> {
        match self {
            Draft::Session(d) => d.with_field(name, value).map(Draft::Session),
            Draft::Assignment(d) => d.with_field(name, value).map(Draft::Assignment),
        }
    }

    pub fn finish(&self) -> Result<Record> {
        match self {
            Draft::Session(d) => d.finish().map(Record::Session),
            Draft::Assignment(d) => d.finish().map(Record::Assignment),
        }
    }

    pub fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Draft::Session(d) => d.fields(),
            Draft::Assignment(d) => d.fields(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum FormState {
    Closed,
    Editing { draft: Draft, is_new: bool },
}

impl Default for FormState {
    fn default() -> Self {
        FormState::Closed
    }
}

#[derive(Debug, Default)]
pub struct FormController {
    state: FormState,
}

impl FormController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, FormState::Editing { .. })
    }

    pub fn draft(&self) -> Option<&Draft> {
        match &self.state {
            FormState::Editing { draft, .. } => Some(draft),
            FormState::Closed => None,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self.state, FormState::Editing { is_new: true, .. })
    }

    /// Opens the form on `draft`, discarding any working copy.
    pub fn open(&mut self, draft: Draft, is_new: bool) {
        log::debug!("Opening {} form for {}", draft.kind(), draft.id());
        self.state = FormState::Editing { draft, is_new };
    }

    pub fn create_session(&mut self, defaults: &Defaults) {
        self.open(Draft::Session(SessionDraft::new(defaults)), true);
    }

    pub fn create_assignment(&mut self, defaults: &Defaults) {
        self.open(Draft::Assignment(AssignmentDraft::new(defaults)), true);
    }

    pub fn edit_session(&mut self, session: &Session) {
        self.open(Draft::Session(SessionDraft::from_session(session)), false);
    }

    pub fn edit_assignment(&mut self, assignment: &Assignment) {
        self.open(
            Draft::Assignment(AssignmentDraft::from_assignment(assignment)),
            false,
        );
    }

    pub fn set_field(&mut self, name: &str, value: &str) -> Result<()> {
        match &mut self.state {
            FormState::Editing { draft, .. } => {
                *draft = draft.with_field(name, value)?;
                Ok(())
            }
            FormState::Closed => Err(ErrorKind::FormClosed.into()),
        }
    }

    /// Applies several field changes at once. Either all of them take effect
    /// or none does.
    pub fn set_fields<K: AsRef<str>, V: AsRef<str>>(&mut self, changes: &[(K, V)]) -> Result<()> {
        match &mut self.state {
            FormState::Editing { draft, .. } => {
                let next = changes.iter().try_fold(draft.clone(), |d, (name, value)| {
                    d.with_field(name.as_ref(), value.as_ref())
                })?;
                *draft = next;
                Ok(())
            }
            FormState::Closed => Err(ErrorKind::FormClosed.into()),
        }
    }

    /// Finishes the working copy and hands it to `save`. The form closes on
    /// success and stays open with the working copy intact on failure.
    pub fn submit<F: FnOnce(Record)>(&mut self, save: F) -> Result<Uid> {
        let record = match &self.state {
            FormState::Editing { draft, .. } => draft.finish()?,
            FormState::Closed => return Err(ErrorKind::FormClosed.into()),
        };

        let id = record.id().clone();
        save(record);
        self.close();

        Ok(id)
    }

    pub fn close(&mut self) {
        self.state = FormState::Closed;
    }
}
