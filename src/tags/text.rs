use crate::alert::{string_alert, AlertKind};
use crate::error::PortResult;

use super::Outcome;

/// Drops characters `encodable` rejects, then truncates to `max_len`
/// characters. The returned string is exactly what the format can hold.
pub fn text(
    tag: &str,
    value: &str,
    max_len: usize,
    encodable: impl Fn(char) -> bool,
) -> PortResult<Outcome<String>> {
    let mut kind = AlertKind::empty();
    let kept: Vec<char> = value
        .chars()
        .filter(|c| {
            let ok = encodable(*c);
            if !ok {
                kind |= AlertKind::INVALID;
            }
            ok
        })
        .collect();
    if kept.len() > max_len {
        kind |= AlertKind::TOO_LONG;
    }
    let cleaned: String = kept.into_iter().take(max_len).collect();

    if kind.is_empty() {
        Ok(Outcome::clean(cleaned))
    } else {
        let alert = string_alert(tag, kind, max_len)?;
        Ok(Outcome::with_alert(cleaned, kind, alert))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_then_truncates() {
        let outcome = text("Nickname", "Sp@rky the Pikachu", 10, |c| c != '@').unwrap();
        assert_eq!(outcome.value, "Sprky the ");
        assert_eq!(outcome.kind, AlertKind::INVALID | AlertKind::TOO_LONG);
        let message = outcome.alert.unwrap().message;
        assert!(message.contains("truncated to 10 characters"));
        assert!(message.contains("can't be written in this format"));
    }
}
