use crate::value::ValueType;
use std::fmt;
use thiserror::Error;

/// Broad classification shared by every error this crate produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The declaration set itself is inconsistent (programmer error).
    DeclarationConflict,
    UnknownOption,
    TypeMismatch,
    MissingRequiredParameter,
    MalformedToken,
    UnexpectedArgument,
    /// `-h`/`--help` was given; not a failure, but parsing stops.
    HelpRequested,
    /// An unset optional value was read (programmer error).
    ValueNotSet,
}

/// Consistency rule violated by a declaration set, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rule {
    MalformedIdentifier,
    DuplicateIdentifier,
    IndexedNamedParameter,
    PositionalIndexCollision,
    BooleanPositional,
    ArrayPositional,
    RequiredWithDefault,
    OptionalWithDefault,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MalformedIdentifier => "malformed identifier",
            Self::DuplicateIdentifier => "duplicate identifier",
            Self::IndexedNamedParameter => "named parameter with positional index",
            Self::PositionalIndexCollision => "ambiguous positional index",
            Self::BooleanPositional => "boolean positional",
            Self::ArrayPositional => "misplaced array positional",
            Self::RequiredWithDefault => "required parameter with default",
            Self::OptionalWithDefault => "optional parameter with default",
        })
    }
}

/// A declaration set failed its consistency check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("declaration conflict ({rule}): {message}")]
pub struct DeclarationError {
    pub rule: Rule,
    /// Names of the offending declarations, in declaration order.
    pub parameters: Vec<String>,
    pub message: String,
}

impl DeclarationError {
    pub(crate) fn new(rule: Rule, parameters: &[&str], message: impl Into<String>) -> Self {
        Self {
            rule,
            parameters: parameters.iter().map(|p| p.to_string()).collect(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        ErrorKind::DeclarationConflict
    }

    pub fn names(&self, parameter: &str) -> bool {
        self.parameters.iter().any(|p| p == parameter)
    }
}

/// One thing wrong with the user's input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Problem {
    #[error("unknown option '{option}'")]
    UnknownOption { option: String },

    #[error("invalid value '{token}' for '{parameter}': expected {expected} ({reason})")]
    TypeMismatch {
        parameter: String,
        token: String,
        expected: ValueType,
        reason: String,
    },

    #[error("missing required {}: {}", noun(.parameters.len()), .parameters.join(", "))]
    MissingRequired { parameters: Vec<String> },

    #[error("malformed argument '{token}': {reason}")]
    MalformedToken { token: String, reason: String },

    #[error("unexpected argument '{token}'")]
    UnexpectedArgument { token: String },

    #[error("help requested")]
    HelpRequested,
}

fn noun(count: usize) -> &'static str {
    if count == 1 { "parameter" } else { "parameters" }
}

impl Problem {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownOption { .. } => ErrorKind::UnknownOption,
            Self::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Self::MissingRequired { .. } => ErrorKind::MissingRequiredParameter,
            Self::MalformedToken { .. } => ErrorKind::MalformedToken,
            Self::UnexpectedArgument { .. } => ErrorKind::UnexpectedArgument,
            Self::HelpRequested => ErrorKind::HelpRequested,
        }
    }

    /// Problems after which the remaining tokens can't be attributed reliably.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::UnknownOption { .. } | Self::MalformedToken { .. } | Self::HelpRequested
        )
    }
}

/// Parsing failed. Holds every problem found, headline first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    problems: Vec<Problem>,
}

impl ParseError {
    pub(crate) fn new(problems: Vec<Problem>) -> Self {
        debug_assert!(!problems.is_empty());
        Self { problems }
    }

    pub(crate) fn single(problem: Problem) -> Self {
        Self {
            problems: vec![problem],
        }
    }

    /// Kind of the headline problem.
    pub fn kind(&self) -> ErrorKind {
        self.problems
            .first()
            .map(Problem::kind)
            .unwrap_or(ErrorKind::MalformedToken)
    }

    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    pub fn is_help(&self) -> bool {
        self.kind() == ErrorKind::HelpRequested
    }

    /// Names listed by a `MissingRequired` problem, if any.
    pub fn missing(&self) -> &[String] {
        self.problems
            .iter()
            .find_map(|p| match p {
                Problem::MissingRequired { parameters } => Some(parameters.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, problem) in self.problems.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "error: {problem}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// An optional parameter's value was read before it was set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("value of parameter '{parameter}' read before it was set")]
pub struct ValueNotSet {
    pub parameter: String,
}

impl ValueNotSet {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::ValueNotSet
    }
}

/// Any error from this crate, for hosts that propagate with `?`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Declaration(#[from] DeclarationError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    ValueNotSet(#[from] ValueNotSet),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Declaration(e) => e.kind(),
            Self::Parse(e) => e.kind(),
            Self::ValueNotSet(e) => e.kind(),
        }
    }
}

pub type CheckResult = Result<(), DeclarationError>;
pub type ParseResult<T> = Result<T, ParseError>;
