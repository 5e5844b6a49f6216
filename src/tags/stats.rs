use crate::alert::{multi_numerical_alert, Alert, AlertKind, StatCheck};

use super::Outcome;

/// Limits for a six-valued tag such as IVs or EVs.
#[derive(Debug, Clone, Copy)]
pub struct StatLimits {
    pub min: u64,
    pub max: u64,
    pub default: u64,
}

/// Checks each of six values on its own and folds the results into a single
/// alert. Unspecified values only show up in the alert when
/// `alert_unspecified` is set; they take the default either way.
pub fn multi_stat(
    title: &str,
    unit: &str,
    names: &[&str; 6],
    raw: [Option<i64>; 6],
    limits: StatLimits,
    alert_unspecified: bool,
) -> Outcome<[u64; 6]> {
    let mut values = [limits.default; 6];
    let mut checks = [StatCheck::Valid; 6];
    let mut kind = AlertKind::empty();

    for (idx, raw) in raw.iter().enumerate() {
        let (value, check) = match *raw {
            None => (limits.default, StatCheck::Unspecified),
            Some(value) if value < 0 || (value as u64) < limits.min => {
                (limits.min, StatCheck::TooLow)
            }
            Some(value) if value as u64 > limits.max => (limits.max, StatCheck::TooHigh),
            Some(value) => (value as u64, StatCheck::Valid),
        };
        values[idx] = value;
        checks[idx] = check;
        kind |= match check {
            StatCheck::Valid => AlertKind::empty(),
            StatCheck::TooHigh => AlertKind::OVERFLOW,
            StatCheck::TooLow => AlertKind::UNDERFLOW,
            StatCheck::Unspecified => AlertKind::UNSPECIFIED,
        };
    }

    let default = alert_unspecified.then(|| limits.default.to_string());
    let alert = multi_numerical_alert(title, unit, names, &checks, limits.max, limits.min, default);
    Outcome { value: values, kind, alert }
}

/// Lowers values, last first, until they sum to at most `total`. Returns
/// the alert when anything had to change.
pub fn cap_total(title: &str, values: &mut [u64; 6], total: u64) -> Option<Alert> {
    let sum: u64 = values.iter().sum();
    if sum <= total {
        return None;
    }
    let mut excess = sum - total;
    for value in values.iter_mut().rev() {
        let cut = excess.min(*value);
        *value -= cut;
        excess -= cut;
        if excess == 0 {
            break;
        }
    }
    Some(Alert::new(
        title,
        format!(
            "This pku's {title} add up to {sum}, more than the maximum of {total}. Lowering them starting from the last stat."
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::STAT_NAMES;

    const IVS: StatLimits = StatLimits {
        min: 0,
        max: 31,
        default: 0,
    };

    #[test]
    fn all_valid_is_silent() {
        let outcome = multi_stat("IVs", "IV", &STAT_NAMES, [Some(31); 6], IVS, true);
        assert_eq!(outcome, Outcome::clean([31; 6]));
    }

    #[test]
    fn speed_is_checked_against_itself() {
        let raw = [Some(1), Some(1), Some(1), Some(1), Some(40), Some(-1)];
        let outcome = multi_stat("IVs", "IV", &STAT_NAMES, raw, IVS, true);
        assert_eq!(outcome.value, [1, 1, 1, 1, 31, 0]);
        assert_eq!(
            outcome.alert.unwrap().message,
            "The Sp. Defense IV is too high, rounding down to 31.\n\nThe Speed IV is too low, rounding up to 0."
        );
    }

    #[test]
    fn caps_total_from_the_back() {
        let mut evs = [252, 252, 252, 0, 0, 0];
        let alert = cap_total("EVs", &mut evs, 510);
        assert!(alert.is_some());
        assert_eq!(evs, [252, 252, 6, 0, 0, 0]);
    }
}
