mod common;

use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;

use pkuport::alert::{numerical_alert, string_alert, Alert, AlertKind, ChoiceAlert, ChoiceOption, Prompt};
use pkuport::choice::{candidate, ChoiceResolver};
use pkuport::dex::DexCategory;
use pkuport::pku::PkuMove;
use pkuport::tags::moves::move_set;
use pkuport::tags::stats::{multi_stat, StatLimits};
use pkuport::types::STAT_NAMES;
use pkuport::PortError;

const IV_LIMITS: StatLimits = StatLimits {
    min: 0,
    max: 31,
    default: 0,
};

#[test]
fn alerts_fold_into_one() {
    let folded = Alert::fold([
        Some(Alert::new("Nickname", "Too long.")),
        None,
        Some(Alert::new("Nickname", "Bad characters.")),
        Some(Alert::new("OT", "Too long.")),
    ])
    .unwrap();
    assert_eq!(folded.title, "Nickname, OT");
    assert_eq!(folded.message, "Too long.\n\nBad characters.\n\nToo long.");
    assert_eq!(Alert::fold([None, None]), None);

    let summed = Alert::new("Level", "a") + Alert::new("EXP", "b");
    assert_eq!(summed.to_string(), "Level, EXP: a\n\nb");
}

#[test]
fn builders_reject_kinds_they_cannot_describe() {
    let result = numerical_alert("Level", AlertKind::INVALID, 1);
    assert!(matches!(result, Err(PortError::UnsupportedAlertKind { .. })));
    let result = string_alert("Nickname", AlertKind::OVERFLOW, 10);
    assert!(matches!(result, Err(PortError::UnsupportedAlertKind { .. })));

    let alert = string_alert("Nickname", AlertKind::TOO_LONG, 10).unwrap();
    assert_eq!(
        alert.message,
        "This pku's nickname is too long, it will be truncated to 10 characters."
    );
}

#[test]
fn iv_alerts_group_stats_by_problem() {
    let raw = [Some(40), None, Some(31), Some(31), Some(31), Some(-1)];
    let outcome = multi_stat("IVs", "IV", &STAT_NAMES, raw, IV_LIMITS, true);
    assert_eq!(outcome.value, [31, 0, 31, 31, 31, 0]);
    assert_eq!(
        outcome.kind,
        AlertKind::OVERFLOW | AlertKind::UNDERFLOW | AlertKind::UNSPECIFIED
    );
    assert_eq!(
        outcome.alert.unwrap().message,
        "The HP IV is too high, rounding down to 31.\n\n\
         The Speed IV is too low, rounding up to 0.\n\n\
         The Attack IV was not specified, using the default: 0."
    );

    let raw = [Some(40), Some(99), Some(31), Some(31), Some(31), Some(31)];
    let outcome = multi_stat("IVs", "IV", &STAT_NAMES, raw, IV_LIMITS, false);
    assert_eq!(
        outcome.alert.unwrap().message,
        "The HP/Attack IVs are too high, rounding down to 31."
    );
}

#[test]
fn unspecified_ivs_are_silent_when_asked() {
    let outcome = multi_stat("IVs", "IV", &STAT_NAMES, [None; 6], IV_LIMITS, false);
    assert_eq!(outcome.value, [0; 6]);
    assert_eq!(outcome.kind, AlertKind::UNSPECIFIED);
    assert_eq!(outcome.alert, None);
}

#[test]
fn invalid_moves_are_dropped_before_slots_fill() {
    let dex = common::dex();
    let moves: Vec<PkuMove> = ["Tackle", "Growl", "Splash Dance", "Headbutt", "Surf"]
        .into_iter()
        .map(PkuMove::named)
        .collect();
    let lookup = |name: &str| dex.index_of(DexCategory::Move, name, "pk3");
    let outcome = move_set(Some(&moves), 4, lookup, pkuport::dex::DexIndex::Int(0));

    let kept: Vec<Option<&str>> = outcome.value.iter().map(|slot| slot.name.as_deref()).collect();
    assert_eq!(kept, vec![Some("Tackle"), Some("Growl"), Some("Headbutt"), Some("Surf")]);
    assert_eq!(outcome.kind, AlertKind::INVALID | AlertKind::TOO_LONG);
    assert_eq!(
        outcome.alert.unwrap().message,
        "The move \"Splash Dance\" is invalid and was removed.\n\n\
         This pku has 5 moves but only 4 fit, only the first 4 valid moves were kept."
    );
}

fn two_way_prompt() -> Prompt {
    Prompt::Choice(ChoiceAlert::new(
        Alert::new("PID", "Pick one."),
        vec![ChoiceOption::new("Keep", ""), ChoiceOption::new("Generate", "")],
    ))
}

#[test]
fn only_the_selected_candidate_runs() {
    let evaluated = Rc::new(RefCell::new(Vec::new()));
    let tracked = |idx: usize| {
        let evaluated = evaluated.clone();
        candidate(move || {
            evaluated.borrow_mut().push(idx);
            idx * 10
        })
    };
    let mut resolver = ChoiceResolver::new(
        "PID",
        two_way_prompt(),
        vec![tracked(0), tracked(1)],
        |state: &mut Vec<usize>, value: usize| {
            state.push(value);
            Ok(())
        },
    )
    .unwrap();
    assert!(evaluated.borrow().is_empty());

    resolver.select(1).unwrap();
    let mut state = Vec::new();
    resolver.decide(&mut state).unwrap();
    assert_eq!(state, vec![10]);
    assert_eq!(*evaluated.borrow(), vec![1]);
}

#[test]
fn options_and_candidates_must_line_up() {
    let result = ChoiceResolver::new(
        "PID",
        two_way_prompt(),
        vec![candidate(|| 0u32)],
        |_: &mut (), _: u32| Ok(()),
    );
    assert!(matches!(
        result,
        Err(PortError::ChoiceMismatch {
            options: 2,
            candidates: 1
        })
    ));

    let result = ChoiceResolver::new(
        "PID",
        Prompt::Plain(None),
        vec![candidate(|| 0u32), candidate(|| 1u32)],
        |_: &mut (), _: u32| Ok(()),
    );
    assert!(matches!(result, Err(PortError::ChoiceMismatch { .. })));
}

#[test]
fn selection_is_bounds_checked() {
    let mut resolver = ChoiceResolver::new(
        "PID",
        two_way_prompt(),
        vec![candidate(|| 0u32), candidate(|| 1u32)],
        |_: &mut (), _: u32| Ok(()),
    )
    .unwrap();
    assert!(matches!(resolver.select(2), Err(PortError::ChoiceIndex { .. })));
    assert_eq!(resolver.prompt().selected(), 0);

    let mut single = ChoiceResolver::single("Level", || 5u32, |_: &mut (), _: u32| Ok(()));
    assert!(single.select(0).is_ok());
    assert!(single.select(1).is_err());
}
