use nom;
use std::convert::From;
use std::error;
use std::fmt;
use std::io;

#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: Option<String>,
}

#[derive(Debug)]
pub enum ErrorKind {
    MissingField,
    UnknownField,
    InvalidValue,
    InvalidTimeSpan,
    DateParse,
    TimeParse,
    CommandParse,
    UnknownRecord,
    FormClosed,
    ConfigParse,
    IOError(io::Error),
}

impl Error {
    pub fn new(kind: ErrorKind, msg: &str) -> Self {
        Error {
            kind,
            message: Some(msg.to_owned()),
        }
    }

    pub fn with_msg(mut self, message: &str) -> Self {
        self.message = Some(message.to_owned());
        self
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            kind,
            message: None,
        }
    }
}

impl From<io::ErrorKind> for Error {
    fn from(kind: io::ErrorKind) -> Error {
        Error::from(io::Error::from(kind))
    }
}

impl From<chrono::ParseError> for Error {
    fn from(parse_error: chrono::ParseError) -> Error {
        Error::new(
            ErrorKind::TimeParse,
            format!("Could not parse timestamp: {}", parse_error).as_str(),
        )
    }
}

impl From<toml::de::Error> for Error {
    fn from(toml_error: toml::de::Error) -> Error {
        Error::new(ErrorKind::ConfigParse, &toml_error.to_string())
    }
}

impl From<io::Error> for Error {
    fn from(io_error: io::Error) -> Error {
        Error::from(ErrorKind::IOError(io_error))
    }
}

impl<E: std::fmt::Debug> From<nom::Err<E>> for Error {
    fn from(error: nom::Err<E>) -> Self {
        Error::new(
            ErrorKind::CommandParse,
            &format!("Error while parsing: {:?}", error),
        )
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        if let ErrorKind::IOError(err) = err.kind {
            err
        } else {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                err.message.unwrap_or_else(|| "invalid input".to_owned()),
            )
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(msg) => write!(f, "{}: {}", self.kind, msg),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self.kind {
            ErrorKind::IOError(err) => Some(err),
            _ => None,
        }
    }
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MissingField => "required field is empty",
            ErrorKind::UnknownField => "unknown field",
            ErrorKind::InvalidValue => "invalid value",
            ErrorKind::InvalidTimeSpan => "invalid time span",
            ErrorKind::DateParse => "invalid date format",
            ErrorKind::TimeParse => "invalid time format",
            ErrorKind::CommandParse => "invalid command",
            ErrorKind::UnknownRecord => "no such record",
            ErrorKind::FormClosed => "no form is open",
            ErrorKind::ConfigParse => "invalid configuration",
            ErrorKind::IOError(_) => "i/o error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::IOError(err) => write!(f, "{}: {}", self.as_str(), err),
            _ => f.write_str(self.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn kinds_describe_themselves() {
        assert_eq!(ErrorKind::FormClosed.as_str(), "no form is open");
        assert_eq!(Error::from(ErrorKind::FormClosed).to_string(), "no form is open");
        assert_eq!(
            Error::new(ErrorKind::UnknownRecord, "s-9").to_string(),
            "no such record: s-9"
        );
    }

    #[test]
    fn io_errors_keep_their_cause() {
        let err = Error::from(io::Error::new(io::ErrorKind::NotFound, "gone"));

        assert_eq!(err.kind.as_str(), "i/o error");
        assert_eq!(err.to_string(), "i/o error: gone");
        assert!(err.source().is_some());
    }
}
