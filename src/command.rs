use chrono::NaiveDate;

use nom::{
    branch::alt,
    bytes::complete::{is_not, take_until, take_while1},
    character::complete::{alpha1, char, digit0, digit1, space1},
    combinator::all_consuming,
    multi::separated_list1,
    sequence::{delimited, pair, separated_pair},
    IResult,
};

use crate::model::datetime::parse_date;
use crate::model::{Error, ErrorKind, ProgramId, Result, Uid};
use crate::period::Granularity;

#[derive(Clone, Debug, PartialEq)]
pub enum Cmd {
    Next(u32),
    Prev(u32),
    Today,
    Goto(NaiveDate),
    View(Granularity),
    Program(Option<ProgramId>),
    NewSession,
    NewAssignment,
    Slot { column: usize, slot: usize },
    Edit(Uid),
    Set(Vec<(String, String)>),
    Save,
    Cancel,
    Help,
    Quit,
}

pub type ActionResult = Result<Cmd>;

pub enum Action {
    Arg(fn(&str) -> ActionResult),
    NoArg(fn() -> Cmd),
    Repeatable(fn(u32) -> Cmd),
}

const COMMANDS: &[(&str, Action)] = &[
    ("next", Action::Repeatable(Cmd::Next)),
    ("n", Action::Repeatable(Cmd::Next)),
    ("prev", Action::Repeatable(Cmd::Prev)),
    ("p", Action::Repeatable(Cmd::Prev)),
    ("today", Action::NoArg(|| Cmd::Today)),
    ("goto", Action::Arg(|arg| parse_date(arg).map(Cmd::Goto))),
    ("view", Action::Arg(|arg| arg.parse().map(Cmd::View))),
    (
        "program",
        Action::Arg(|arg| {
            Ok(Cmd::Program(match arg {
                "all" => None,
                id => Some(ProgramId::new(id)),
            }))
        }),
    ),
    (
        "new",
        Action::Arg(|arg| match arg {
            "session" => Ok(Cmd::NewSession),
            "assignment" => Ok(Cmd::NewAssignment),
            other => Err(Error::new(
                ErrorKind::CommandParse,
                &format!("cannot create '{}', expected session or assignment", other),
            )),
        }),
    ),
    ("slot", Action::Arg(parse_slot)),
    ("edit", Action::Arg(|arg| Ok(Cmd::Edit(Uid::from(arg))))),
    (
        "set",
        Action::Arg(|arg| parse_field_assignments(arg).map(Cmd::Set)),
    ),
    ("save", Action::NoArg(|| Cmd::Save)),
    ("cancel", Action::NoArg(|| Cmd::Cancel)),
    ("help", Action::NoArg(|| Cmd::Help)),
    ("quit", Action::NoArg(|| Cmd::Quit)),
    ("q", Action::NoArg(|| Cmd::Quit)),
];

pub const USAGE: &str = "\
[n]next [n]prev today goto <YYYY-MM-DD> view <day|week|month>
program <id|all> new <session|assignment> slot <column> <slot> edit <id>
set key:value key:\"quoted value\" ... save cancel help quit";

fn match_action(name: &str) -> Option<&'static Action> {
    COMMANDS
        .iter()
        .find(|(command, _)| *command == name)
        .map(|(_, action)| action)
}

fn command_head(input: &str) -> IResult<&str, (&str, &str)> {
    pair(digit0, alpha1)(input)
}

fn field_value(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('"'), take_until("\""), char('"')),
        is_not(" \t\""),
    ))(input)
}

fn key_value(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(
        take_while1(|c: char| c.is_alphanumeric() || c == '_'),
        char(':'),
        field_value,
    )(input)
}

fn slot_position(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(digit1, space1, digit1)(input)
}

/// Parses `key:value key:"quoted value" ...` into field assignments.
pub fn parse_field_assignments(input: &str) -> Result<Vec<(String, String)>> {
    let (_, pairs) = all_consuming(separated_list1(space1, key_value))(input.trim())?;

    Ok(pairs
        .into_iter()
        .map(|(key, value)| (key.to_owned(), value.to_owned()))
        .collect())
}

fn parse_number<T: std::str::FromStr>(digits: &str) -> Result<T> {
    digits
        .parse::<T>()
        .map_err(|_| Error::new(ErrorKind::CommandParse, digits))
}

fn parse_slot(arg: &str) -> ActionResult {
    let (_, (column, slot)) = all_consuming(slot_position)(arg)?;

    Ok(Cmd::Slot {
        column: parse_number(column)?,
        slot: parse_number(slot)?,
    })
}

pub fn parse_command(line: &str) -> Result<Cmd> {
    let line = line.trim();
    let (rest, (repeat, name)) = command_head(line)?;
    let arg = rest.trim();

    let action = match_action(name).ok_or_else(|| {
        Error::new(ErrorKind::CommandParse, &format!("unknown command '{}'", name))
    })?;

    match action {
        Action::Repeatable(a) if arg.is_empty() => {
            let repeats = if repeat.is_empty() {
                1
            } else {
                parse_number(repeat)?
            };
            Ok(a(repeats))
        }
        Action::NoArg(a) if repeat.is_empty() && arg.is_empty() => Ok(a()),
        Action::Arg(a) if repeat.is_empty() && !arg.is_empty() => a(arg),
        _ => Err(Error::new(
            ErrorKind::CommandParse,
            &format!("wrong arguments for '{}'", name),
        )),
    }
}
