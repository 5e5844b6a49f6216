use crate::alert::{Alert, AlertKind};

use super::Outcome;

/// Parses a list of names (ribbons, markings) keeping the ones the format
/// knows. An absent list is simply empty.
pub fn named_list<T: PartialEq>(
    tag: &str,
    raw: Option<&[String]>,
    parse: impl Fn(&str) -> Option<T>,
) -> Outcome<Vec<T>> {
    let Some(raw) = raw else {
        return Outcome::clean(Vec::new());
    };

    let mut kept = Vec::new();
    let mut unknown = Vec::new();
    for name in raw {
        match parse(name) {
            Some(value) if !kept.contains(&value) => kept.push(value),
            Some(_) => {}
            None => unknown.push(format!("\"{name}\"")),
        }
    }

    if unknown.is_empty() {
        return Outcome::clean(kept);
    }
    let noun = tag.to_lowercase();
    let message = if unknown.len() == 1 {
        format!("The {noun} entry {} isn't supported by this format and was removed.", unknown[0])
    } else {
        format!(
            "The {noun} entries {} aren't supported by this format and were removed.",
            unknown.join(", ")
        )
    };
    Outcome::with_alert(kept, AlertKind::INVALID, Alert::new(tag, message))
}
