use crate::alert::{Alert, AlertKind};
use crate::dex::DexIndex;
use crate::pku::PkuMove;

use super::Outcome;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveSlot {
    /// `None` for a backfilled empty slot.
    pub name: Option<String>,
    pub index: DexIndex,
    pub pp_ups: Option<i64>,
}

impl MoveSlot {
    fn empty(index: DexIndex) -> Self {
        MoveSlot {
            name: None,
            index,
            pp_ups: None,
        }
    }
}

/// Fits a pku's move list into `slots` slots. Moves `lookup` can't find are
/// dropped; the remaining ones fill the slots in order and whatever is left
/// over is filled with `empty`.
pub fn move_set(
    moves: Option<&[PkuMove]>,
    slots: usize,
    lookup: impl Fn(&str) -> Option<DexIndex>,
    empty: DexIndex,
) -> Outcome<Vec<MoveSlot>> {
    let Some(moves) = moves else {
        return Outcome::with_alert(
            vec![MoveSlot::empty(empty); slots],
            AlertKind::UNSPECIFIED,
            Alert::new("Moves", "No moves were specified, every move slot will be empty."),
        );
    };

    let mut kept = Vec::with_capacity(slots);
    let mut invalid = Vec::new();
    for pku_move in moves {
        let found = pku_move
            .name
            .as_deref()
            .and_then(|name| lookup(name).map(|index| (name, index)));
        match found {
            Some((name, index)) if kept.len() < slots => kept.push(MoveSlot {
                name: Some(name.to_owned()),
                index,
                pp_ups: pku_move.pp_ups,
            }),
            Some(_) => {}
            None => invalid.push(pku_move.name.clone().unwrap_or_else(|| String::from("(unnamed)"))),
        }
    }
    kept.resize(slots, MoveSlot::empty(empty));

    let mut kind = AlertKind::empty();
    let mut messages = Vec::new();
    if !invalid.is_empty() {
        kind |= AlertKind::INVALID;
        let quoted: Vec<String> = invalid.iter().map(|name| format!("\"{name}\"")).collect();
        messages.push(if quoted.len() == 1 {
            format!("The move {} is invalid and was removed.", quoted[0])
        } else {
            format!("The moves {} are invalid and were removed.", quoted.join(", "))
        });
    }
    if moves.len() > slots {
        kind |= AlertKind::TOO_LONG;
        messages.push(format!(
            "This pku has {} moves but only {slots} fit, only the first {slots} valid moves were kept.",
            moves.len()
        ));
    }

    if messages.is_empty() {
        Outcome::clean(kept)
    } else {
        Outcome::with_alert(kept, kind, Alert::new("Moves", messages.join("\n\n")))
    }
}
