use std::fmt::{self, Display};
use std::ops::Add;

use bitflags::bitflags;

use crate::error::{PortError, PortResult};

bitflags! {
    /// What went wrong with a tag. Several may be set at once, e.g. a move
    /// list with both unknown moves and too many moves.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AlertKind: u16 {
        const UNSPECIFIED = 1 << 0;
        const INVALID = 1 << 1;
        const OVERFLOW = 1 << 2;
        const UNDERFLOW = 1 << 3;
        const TOO_LONG = 1 << 4;
        const TOO_SHORT = 1 << 5;
        const MISMATCH = 1 << 6;
        const IN_BOUNDS = 1 << 7;
        const MODIFIER_A = 1 << 8;
        const MODIFIER_B = 1 << 9;
    }
}

/// Which list an alert is shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Note,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Alert {
            title: title.into(),
            message: message.into(),
        }
    }

    /// Merges two optional alerts. A missing side yields a copy of the other.
    pub fn combine(a: Option<&Alert>, b: Option<&Alert>) -> Option<Alert> {
        match (a, b) {
            (None, None) => None,
            (Some(a), None) => Some(a.clone()),
            (None, Some(b)) => Some(b.clone()),
            (Some(a), Some(b)) => {
                let title = if a.title == b.title {
                    a.title.clone()
                } else {
                    format!("{}, {}", a.title, b.title)
                };
                let message = match (a.message.is_empty(), b.message.is_empty()) {
                    (false, false) => format!("{}\n\n{}", a.message, b.message),
                    (false, true) => a.message.clone(),
                    (true, false) => b.message.clone(),
                    (true, true) => String::new(),
                };
                Some(Alert { title, message })
            }
        }
    }

    /// Folds any number of optional alerts into one.
    pub fn fold<I>(alerts: I) -> Option<Alert>
    where
        I: IntoIterator<Item = Option<Alert>>,
    {
        alerts
            .into_iter()
            .fold(None, |acc, next| Alert::combine(acc.as_ref(), next.as_ref()))
    }
}

impl Add for Alert {
    type Output = Alert;

    fn add(self, rhs: Alert) -> Alert {
        Alert::combine(Some(&self), Some(&rhs)).unwrap_or(self)
    }
}

impl Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOption {
    pub label: String,
    pub message: String,
}

impl ChoiceOption {
    pub fn new(label: impl Into<String>, message: impl Into<String>) -> Self {
        ChoiceOption {
            label: label.into(),
            message: message.into(),
        }
    }
}

/// An alert that asks the user to pick one of several options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceAlert {
    pub alert: Alert,
    pub options: Vec<ChoiceOption>,
    selected: usize,
    text_hint: Option<String>,
    text_entry: Option<String>,
}

impl ChoiceAlert {
    pub fn new(alert: Alert, options: Vec<ChoiceOption>) -> Self {
        ChoiceAlert {
            alert,
            options,
            selected: 0,
            text_hint: None,
            text_entry: None,
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn select(&mut self, index: usize) -> PortResult<()> {
        if index >= self.options.len() {
            return Err(PortError::ChoiceIndex {
                tag: self.alert.title.clone(),
                index,
                options: self.options.len(),
            });
        }
        self.selected = index;
        Ok(())
    }

    /// What the user may type instead of picking an option, if anything.
    pub fn text_hint(&self) -> Option<&str> {
        self.text_hint.as_deref()
    }

    pub fn set_text_hint(&mut self, hint: impl Into<String>) {
        self.text_hint = Some(hint.into());
    }

    /// Typed text that overrides the selected option when the choice is
    /// decided.
    pub fn text_entry(&self) -> Option<&str> {
        self.text_entry.as_deref()
    }

    pub fn set_text_entry(&mut self, text: impl Into<String>) {
        self.text_entry = Some(text.into());
    }
}

/// The notice a ChoiceResolver is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    /// Nothing to ask; `None` means nothing to report either.
    Plain(Option<Alert>),
    Choice(ChoiceAlert),
}

impl Prompt {
    pub fn option_count(&self) -> usize {
        match self {
            Prompt::Plain(_) => 1,
            Prompt::Choice(choice) => choice.options.len(),
        }
    }

    pub fn selected(&self) -> usize {
        match self {
            Prompt::Plain(_) => 0,
            Prompt::Choice(choice) => choice.selected(),
        }
    }

    pub fn text_entry(&self) -> Option<&str> {
        match self {
            Prompt::Plain(_) => None,
            Prompt::Choice(choice) => choice.text_entry(),
        }
    }
}

pub fn unspecified_alert(tag: &str, default: impl Display) -> Alert {
    Alert::new(
        tag,
        format!("No {} was specified, using the default: {default}.", tag.to_lowercase()),
    )
}

pub fn invalid_alert(tag: &str, value: impl Display, default: impl Display) -> Alert {
    Alert::new(
        tag,
        format!(
            "The {} \"{value}\" is invalid, using the default: {default}.",
            tag.to_lowercase()
        ),
    )
}

/// Alert for a single numeric value that had to be clamped. `bound` is the
/// value it was clamped to.
pub fn numerical_alert(tag: &str, kind: AlertKind, bound: impl Display) -> PortResult<Alert> {
    let message = if kind == AlertKind::OVERFLOW {
        format!(
            "This pku's {} is higher than the maximum. Rounding down to {bound}.",
            tag.to_lowercase()
        )
    } else if kind == AlertKind::UNDERFLOW {
        format!(
            "This pku's {} is lower than the minimum. Rounding up to {bound}.",
            tag.to_lowercase()
        )
    } else {
        return Err(PortError::UnsupportedAlertKind {
            tag: tag.to_owned(),
            kind,
        });
    };
    Ok(Alert::new(tag, message))
}

/// Alert for a string which did not fit the target encoding. Accepts any
/// combination of TOO_LONG and INVALID.
pub fn string_alert(tag: &str, kind: AlertKind, max_len: usize) -> PortResult<Alert> {
    let supported = AlertKind::TOO_LONG | AlertKind::INVALID;
    if kind.is_empty() || !supported.contains(kind) {
        return Err(PortError::UnsupportedAlertKind {
            tag: tag.to_owned(),
            kind,
        });
    }
    let mut parts = Vec::new();
    if kind.contains(AlertKind::TOO_LONG) {
        parts.push(format!(
            "This pku's {} is too long, it will be truncated to {max_len} characters.",
            tag.to_lowercase()
        ));
    }
    if kind.contains(AlertKind::INVALID) {
        parts.push(format!(
            "Some of the characters in this pku's {} can't be written in this format, they will be removed.",
            tag.to_lowercase()
        ));
    }
    Ok(Alert::new(tag, parts.join("\n\n")))
}

/// Per-stat classification for a multi-value tag such as IVs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatCheck {
    Valid,
    TooHigh,
    TooLow,
    Unspecified,
}

/// Builds the grouped message for a multi-value tag. `unit` is the singular
/// noun ("IV"), `stat_names` and `checks` line up index by index.
pub fn multi_numerical_alert(
    title: &str,
    unit: &str,
    stat_names: &[&str],
    checks: &[StatCheck],
    max: impl Display,
    min: impl Display,
    default: Option<String>,
) -> Option<Alert> {
    let names_with = |wanted: StatCheck| -> Vec<&str> {
        stat_names
            .iter()
            .zip(checks)
            .filter(|(_, check)| **check == wanted)
            .map(|(name, _)| *name)
            .collect()
    };

    let describe = |names: &[&str], singular: &str, plural: &str, tail: String| {
        if names.is_empty() {
            None
        } else if names.len() == 1 {
            Some(format!("The {} {unit} {singular}, {tail}.", names[0]))
        } else {
            Some(format!("The {} {unit}s {plural}, {tail}.", names.join("/")))
        }
    };

    let mut parts = Vec::new();
    parts.extend(describe(
        &names_with(StatCheck::TooHigh),
        "is too high",
        "are too high",
        format!("rounding down to {max}"),
    ));
    parts.extend(describe(
        &names_with(StatCheck::TooLow),
        "is too low",
        "are too low",
        format!("rounding up to {min}"),
    ));
    if let Some(default) = default {
        parts.extend(describe(
            &names_with(StatCheck::Unspecified),
            "was not specified",
            "were not specified",
            format!("using the default: {default}"),
        ));
    }

    if parts.is_empty() {
        None
    } else {
        Some(Alert::new(title, parts.join("\n\n")))
    }
}
