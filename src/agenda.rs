use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::model::*;

const SAMPLE_DATA: &str = include_str!("../data/sample.toml");

#[derive(Default, Deserialize, Serialize)]
struct AgendaFile {
    #[serde(default, rename = "program")]
    programs: Vec<Program>,
    #[serde(default, rename = "session")]
    sessions: Vec<Session>,
    #[serde(default, rename = "assignment")]
    assignments: Vec<Assignment>,
}

/// In-memory store of everything the calendar shows.
#[derive(Clone, Debug, Default)]
pub struct Agenda {
    programs: Vec<Program>,
    sessions: Vec<Session>,
    assignments: Vec<Assignment>,
}

impl Agenda {
    pub fn new(programs: Vec<Program>, sessions: Vec<Session>, assignments: Vec<Assignment>) -> Self {
        Agenda {
            programs,
            sessions,
            assignments,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        match &config.data_file {
            Some(path) => Self::load(path),
            None => Self::sample(),
        }
    }

    pub fn sample() -> Result<Self> {
        Self::from_toml_str(SAMPLE_DATA)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            Error::from(e).with_msg(&format!("Could not read data file {}", path.display()))
        })?;

        log::info!("Loading calendar data from {}", path.display());
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: AgendaFile = toml::from_str(contents)?;

        let sessions = file
            .sessions
            .into_iter()
            .map(|session| session.validate().map(|_| session))
            .inspect(|s| {
                if let Err(e) = s {
                    log::warn!("Skipping session: {}", e)
                }
            })
            .filter_map(Result::ok)
            .collect();

        Ok(Agenda::new(file.programs, sessions, file.assignments))
    }

    pub fn programs(&self) -> &[Program] {
        &self.programs
    }

    pub fn program(&self, id: &ProgramId) -> Option<&Program> {
        self.programs.iter().find(|p| &p.id == id)
    }

    /// Display name of a program, falling back to the raw id for dangling
    /// references.
    pub fn program_name<'a>(&'a self, id: &'a ProgramId) -> &'a str {
        self.program(id).map_or(id.as_str(), |p| p.name.as_str())
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn session(&self, id: &Uid) -> Option<&Session> {
        self.sessions.iter().find(|s| &s.id == id)
    }

    pub fn assignment(&self, id: &Uid) -> Option<&Assignment> {
        self.assignments.iter().find(|a| &a.id == id)
    }

    /// Stores `record`, replacing the record with the same id in place or
    /// appending it if the id is new.
    pub fn save(&mut self, record: Record) {
        match record {
            Record::Session(session) => {
                match self.sessions.iter_mut().find(|s| s.id == session.id) {
                    Some(existing) => {
                        log::info!("Updating session {}", session.id);
                        *existing = session;
                    }
                    None => {
                        log::info!("Adding session {}", session.id);
                        self.sessions.push(session);
                    }
                }
            }
            Record::Assignment(assignment) => {
                match self.assignments.iter_mut().find(|a| a.id == assignment.id) {
                    Some(existing) => {
                        log::info!("Updating assignment {}", assignment.id);
                        *existing = assignment;
                    }
                    None => {
                        log::info!("Adding assignment {}", assignment.id);
                        self.assignments.push(assignment);
                    }
                }
            }
        }
    }
}

/// Records belonging to `program`, or all records if no program is selected.
pub fn filter_by_program<'a, T: Scheduled>(
    records: &'a [T],
    program: Option<&ProgramId>,
) -> Vec<&'a T> {
    records
        .iter()
        .filter(|record| program.map_or(true, |id| record.program_id() == id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_data_loads() {
        let agenda = Agenda::sample().unwrap();
        assert_eq!(agenda.programs().len(), 3);
        assert_eq!(agenda.sessions().len(), 5);
        assert_eq!(agenda.assignments().len(), 3);
        assert_eq!(agenda.program_name(&ProgramId::new("cs")), "Computer Science");
        assert_eq!(agenda.program_name(&ProgramId::new("law")), "law");
    }

    #[test]
    fn invalid_sessions_are_skipped() {
        let agenda = Agenda::from_toml_str(
            r#"
            [[session]]
            id = "backwards"
            title = "Backwards"
            program_id = "cs"
            module_code = "CS1"
            start_time = "2025-04-28T11:00"
            end_time = "2025-04-28T09:00"

            [[session]]
            id = "fine"
            title = "Fine"
            program_id = "cs"
            module_code = "CS1"
            start_time = "2025-04-28T09:00"
            end_time = "2025-04-28T11:00"
            "#,
        )
        .unwrap();

        assert_eq!(agenda.sessions().len(), 1);
        assert_eq!(agenda.sessions()[0].id, Uid::from("fine"));
        assert_eq!(agenda.sessions()[0].color, Color::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(Agenda::from_toml_str("[[session]]\nid = 3").is_err());
    }

    #[test]
    fn filter_is_derived_from_selection() {
        let agenda = Agenda::sample().unwrap();
        let cs = ProgramId::new("cs");

        let all = filter_by_program(agenda.sessions(), None);
        assert_eq!(all.len(), agenda.sessions().len());

        let only_cs = filter_by_program(agenda.sessions(), Some(&cs));
        assert_eq!(only_cs.len(), 2);
        assert!(only_cs.iter().all(|s| s.program_id == cs));

        let none = filter_by_program(agenda.assignments(), Some(&ProgramId::new("law")));
        assert!(none.is_empty());
    }

    #[test]
    fn save_replaces_in_place_and_appends() {
        let mut agenda = Agenda::sample().unwrap();

        let mut edited = agenda.session(&Uid::from("s-2")).unwrap().clone();
        edited.room = "Hall C".to_owned();
        agenda.save(Record::Session(edited));

        assert_eq!(agenda.sessions().len(), 5);
        assert_eq!(agenda.sessions()[1].room, "Hall C");

        let mut fresh = agenda.assignments()[0].clone();
        fresh.id = Uid::from("a-new");
        agenda.save(Record::Assignment(fresh));

        assert_eq!(agenda.assignments().len(), 4);
        assert_eq!(agenda.assignments()[3].id, Uid::from("a-new"));
    }
}
