use std::{fmt, io};

use crate::alert::AlertKind;
use crate::porter::Phase;

/// Failure of a single field write. Fields never clamp on their own; the
/// tag processors are expected to clamp before setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    OutOfBounds { value: u64, min: u64, max: u64 },
    ReadOnly,
    Length { expected: usize, found: usize },
    Index { index: usize, len: usize },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::OutOfBounds { value, min, max } => {
                write!(f, "value {value} is outside of the field bounds [{min}, {max}]")
            }
            FieldError::ReadOnly => write!(f, "field is read-only"),
            FieldError::Length { expected, found } => {
                write!(f, "expected {expected} elements, found {found}")
            }
            FieldError::Index { index, len } => {
                write!(f, "index {index} is out of range for a field of length {len}")
            }
        }
    }
}

impl std::error::Error for FieldError {}

/// Errors which abort a port. Everything wrong with the *data* in a pku is
/// reported as an alert instead; these signal either a record that cannot
/// be represented at all or a defect in how a porter was put together.
#[derive(Debug)]
pub enum PortError {
    /// The record as a whole cannot exist in the target format.
    Infeasible(String),
    /// The second half was run before the first half.
    OutOfOrder,
    ChoiceMismatch { options: usize, candidates: usize },
    UnknownChoice(String),
    ChoiceIndex { tag: String, index: usize, options: usize },
    TextEntry { tag: String, text: String },
    UnknownPrerequisite { step: String, prerequisite: String },
    PrerequisiteCycle(String),
    DuplicateStep(String),
    UnsupportedAlertKind { tag: String, kind: AlertKind },
    Field { tag: String, source: FieldError },
    InvalidOverride(String),
    MissingValue { tag: String, phase: Phase },
    Io(io::Error),
    Json(serde_json::Error),
}

impl PortError {
    pub fn field(tag: impl Into<String>, source: FieldError) -> Self {
        PortError::Field {
            tag: tag.into(),
            source,
        }
    }
}

impl fmt::Display for PortError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortError::Infeasible(reason) => write!(f, "cannot port this pku: {reason}"),
            PortError::OutOfOrder => {
                write!(f, "the second half of a port was run before the first half")
            }
            PortError::ChoiceMismatch {
                options,
                candidates,
            } => write!(
                f,
                "choice has {options} option(s) but {candidates} candidate value(s)"
            ),
            PortError::UnknownChoice(tag) => write!(f, "no pending choice for tag {tag}"),
            PortError::ChoiceIndex {
                tag,
                index,
                options,
            } => write!(
                f,
                "option {index} does not exist for {tag}, which has {options} option(s)"
            ),
            PortError::TextEntry { tag, text } => {
                write!(f, "\"{text}\" is not an accepted entry for {tag}")
            }
            PortError::UnknownPrerequisite { step, prerequisite } => write!(
                f,
                "step {step} depends on {prerequisite}, which is not registered in the same phase"
            ),
            PortError::PrerequisiteCycle(step) => {
                write!(f, "step {step} is part of a prerequisite cycle")
            }
            PortError::DuplicateStep(step) => write!(f, "step {step} was registered twice"),
            PortError::UnsupportedAlertKind { tag, kind } => {
                write!(f, "cannot build an alert for {tag} with kind {kind:?}")
            }
            PortError::Field { tag, source } => write!(f, "failed to set {tag}: {source}"),
            PortError::InvalidOverride(reason) => write!(f, "invalid byte override: {reason}"),
            PortError::MissingValue { tag, phase } => {
                write!(f, "{tag} had no value by the {phase:?} phase")
            }
            PortError::Io(err) => write!(f, "I/O error: {err}"),
            PortError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl std::error::Error for PortError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PortError::Field { source, .. } => Some(source),
            PortError::Io(err) => Some(err),
            PortError::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for PortError {
    fn from(err: io::Error) -> Self {
        PortError::Io(err)
    }
}

impl From<serde_json::Error> for PortError {
    fn from(err: serde_json::Error) -> Self {
        PortError::Json(err)
    }
}

pub type PortResult<T> = Result<T, PortError>;
