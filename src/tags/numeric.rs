use std::fmt::Display;

use crate::alert::{invalid_alert, numerical_alert, unspecified_alert, AlertKind};
use crate::dex::{Dex, DexCategory, DexIndex};
use crate::error::PortResult;

use super::Outcome;

/// Clamps an optional integer into `[min, max]`.
pub fn numeric(tag: &str, raw: Option<i64>, min: u64, max: u64, default: u64) -> PortResult<Outcome<u64>> {
    let Some(raw) = raw else {
        return Ok(Outcome::with_alert(
            default,
            AlertKind::UNSPECIFIED,
            unspecified_alert(tag, default),
        ));
    };
    if raw < 0 || (raw as u64) < min {
        let alert = numerical_alert(tag, AlertKind::UNDERFLOW, min)?;
        return Ok(Outcome::with_alert(min, AlertKind::UNDERFLOW, alert));
    }
    let raw = raw as u64;
    if raw > max {
        let alert = numerical_alert(tag, AlertKind::OVERFLOW, max)?;
        return Ok(Outcome::with_alert(max, AlertKind::OVERFLOW, alert));
    }
    Ok(Outcome::clean(raw))
}

/// Like [`numeric`], but an absent value is expected and goes unreported.
pub fn optional_numeric(
    tag: &str,
    raw: Option<i64>,
    min: u64,
    max: u64,
    default: u64,
) -> PortResult<Outcome<u64>> {
    match raw {
        None => Ok(Outcome::clean(default)),
        Some(_) => numeric(tag, raw, min, max, default),
    }
}

/// Parses a named value from a closed set (natures, games, genders...).
pub fn named<T: Display + Copy>(
    tag: &str,
    raw: Option<&str>,
    parse: impl Fn(&str) -> Option<T>,
    default: T,
) -> Outcome<T> {
    match raw {
        None => Outcome::with_alert(default, AlertKind::UNSPECIFIED, unspecified_alert(tag, default)),
        Some(name) => match parse(name) {
            Some(value) => Outcome::clean(value),
            None => Outcome::with_alert(default, AlertKind::INVALID, invalid_alert(tag, name, default)),
        },
    }
}

/// Looks a name up in the dex and returns the format's index for it. The
/// default is given both as a display name and as an index.
pub fn dex_entry(
    tag: &str,
    raw: Option<&str>,
    dex: &dyn Dex,
    category: DexCategory,
    format: &str,
    default: (&str, DexIndex),
) -> Outcome<DexIndex> {
    let (default_name, default_index) = default;
    let Some(name) = raw else {
        return Outcome::with_alert(
            default_index,
            AlertKind::UNSPECIFIED,
            unspecified_alert(tag, default_name),
        );
    };
    match dex.index_of(category, name, format) {
        Some(index) => Outcome::clean(index),
        None => {
            log::debug!("{name} is not a {category:?} in {format}");
            Outcome::with_alert(
                default_index,
                AlertKind::INVALID,
                invalid_alert(tag, name, default_name),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_values_take_the_default() {
        let outcome = numeric("Friendship", None, 0, 255, 70).unwrap();
        assert_eq!(outcome.value, 70);
        assert_eq!(outcome.kind, AlertKind::UNSPECIFIED);
        assert_eq!(
            outcome.alert.unwrap().message,
            "No friendship was specified, using the default: 70."
        );
    }

    #[test]
    fn out_of_range_values_clamp() {
        let high = numeric("Met Level", Some(101), 0, 100, 0).unwrap();
        assert_eq!((high.value, high.kind), (100, AlertKind::OVERFLOW));
        let low = numeric("Level", Some(-3), 1, 100, 100).unwrap();
        assert_eq!((low.value, low.kind), (1, AlertKind::UNDERFLOW));
        let fine = numeric("Level", Some(50), 1, 100, 100).unwrap();
        assert_eq!(fine, Outcome::clean(50));
    }
}
