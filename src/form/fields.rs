use crate::model::datetime::parse_form_datetime;
use crate::model::Result;

use super::{AssignmentDraft, SessionDraft};

pub type FieldSetter<D> = fn(&mut D, &str) -> Result<()>;

pub const SESSION_FIELDS: &[(&str, FieldSetter<SessionDraft>)] = &[
    ("title", |d, v| {
        d.title = v.to_owned();
        Ok(())
    }),
    ("program_id", |d, v| {
        d.program_id = v.to_owned();
        Ok(())
    }),
    ("module_code", |d, v| {
        d.module_code = v.to_owned();
        Ok(())
    }),
    ("instructor", |d, v| {
        d.instructor = v.to_owned();
        Ok(())
    }),
    ("room", |d, v| {
        d.room = v.to_owned();
        Ok(())
    }),
    ("start_time", |d, v| {
        d.start_time = parse_form_datetime(v)?;
        Ok(())
    }),
    ("end_time", |d, v| {
        d.end_time = parse_form_datetime(v)?;
        Ok(())
    }),
    ("color", |d, v| {
        d.color = v.parse()?;
        Ok(())
    }),
];

pub const ASSIGNMENT_FIELDS: &[(&str, FieldSetter<AssignmentDraft>)] = &[
    ("title", |d, v| {
        d.title = v.to_owned();
        Ok(())
    }),
    ("program_id", |d, v| {
        d.program_id = v.to_owned();
        Ok(())
    }),
    ("module_code", |d, v| {
        d.module_code = v.to_owned();
        Ok(())
    }),
    ("due_at", |d, v| {
        d.due_at = parse_form_datetime(v)?;
        Ok(())
    }),
    ("description", |d, v| {
        d.description = v.to_owned();
        Ok(())
    }),
];

pub fn find_setter<D>(fields: &[(&str, FieldSetter<D>)], name: &str) -> Option<FieldSetter<D>> {
    fields
        .iter()
        .find(|(field, _)| *field == name)
        .map(|(_, setter)| *setter)
}

pub fn field_names<'a, D>(fields: &[(&'a str, FieldSetter<D>)]) -> Vec<&'a str> {
    fields.iter().map(|(name, _)| *name).collect()
}
