//! Checks shared by every format's tag processors.
//!
//! Each check takes the raw value out of a pku plus the target format's
//! limits and returns an [`Outcome`]: the value to write, what was wrong
//! with the input, and the alert explaining it. Writing the value and
//! routing the alert are left to the porter.

pub mod lists;
pub mod moves;
pub mod numeric;
pub mod stats;
pub mod text;

use crate::alert::{Alert, AlertKind, Severity};
use crate::porter::PortContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome<T> {
    pub value: T,
    pub kind: AlertKind,
    pub alert: Option<Alert>,
}

impl<T> Outcome<T> {
    /// Nothing to report.
    pub fn clean(value: T) -> Self {
        Outcome {
            value,
            kind: AlertKind::empty(),
            alert: None,
        }
    }

    pub fn with_alert(value: T, kind: AlertKind, alert: Alert) -> Self {
        Outcome {
            value,
            kind,
            alert: Some(alert),
        }
    }

    /// Unspecified values are notes, anything actually wrong is a warning.
    pub fn severity(&self) -> Severity {
        if self.kind.difference(AlertKind::UNSPECIFIED).is_empty() {
            Severity::Note
        } else {
            Severity::Warning
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            value: f(self.value),
            kind: self.kind,
            alert: self.alert,
        }
    }

    /// Files the alert with the port and hands back the value.
    pub fn report<P: 'static>(self, ctx: &mut PortContext<P>) -> T {
        match self.severity() {
            Severity::Note => {
                if let Some(alert) = self.alert {
                    ctx.unspecified(alert);
                }
            }
            severity => ctx.alert(severity, self.alert),
        }
        self.value
    }
}
