mod common;

use pretty_assertions::assert_eq;

use pkuport::pku::PkuMove;
use pkuport::showdown::{ShowdownExporter, ShowdownImporter};
use pkuport::{Pku, PortError, PortSettings};

fn to_showdown(json: &str) -> String {
    ShowdownExporter::port(&common::pku(json), common::dex(), PortSettings::default())
        .unwrap()
        .run()
        .unwrap()
}

fn from_showdown(text: &str) -> Pku {
    ShowdownImporter::port(text, common::dex(), PortSettings::default())
        .unwrap()
        .run()
        .unwrap()
}

#[test]
fn minimal_set_is_species_and_moves() {
    let json = r#"{ "Species": "Zigzagoon", "Moves": [{ "Name": "Tackle" }, { "Name": "Growl" }] }"#;
    assert_eq!(to_showdown(json), "Zigzagoon\n- Tackle\n- Growl\n");
}

#[test]
fn full_set() {
    let expected = "Ziggy (Zigzagoon) (F) @ Silk Scarf\n\
                    Ability: Pickup\n\
                    Level: 5\n\
                    Happiness: 70\n\
                    EVs: 4 Atk / 8 Spe\n\
                    Hardy Nature\n\
                    IVs: 20 Atk / 10 Def / 0 SpA / 5 SpD / 30 Spe\n\
                    - Tackle\n\
                    - Growl\n";
    assert_eq!(to_showdown(common::ZIGZAGOON), expected);
}

#[test]
fn flags_and_shiny_lines() {
    let json = r#"{ "Species": "Mew", "Shiny": true, "Gigantamax_Factor": true, "Level": 100 }"#;
    assert_eq!(to_showdown(json), "Mew\nShiny: Yes\nGigantamax: Yes\n");
}

#[test]
fn fixed_genders_and_default_nicknames_are_left_out() {
    let json = r#"{ "Species": "Chansey", "Gender": "Female", "Nickname": "CHANSEY" }"#;
    assert_eq!(to_showdown(json), "Chansey\n");

    let json = r#"{ "Species": "Zigzagoon", "Nickname": "Ziggy", "Nickname_Flag": false }"#;
    assert_eq!(to_showdown(json), "Zigzagoon\n");
}

#[test]
fn impossible_gender_is_warned_about() {
    let json = r#"{ "Species": "Chansey", "Gender": "Male" }"#;
    let mut port = ShowdownExporter::port(&common::pku(json), common::dex(), PortSettings::default()).unwrap();
    port.first_half().unwrap();
    assert!(port.warnings().iter().any(|alert| alert.title == "Gender"));
    assert_eq!(port.second_half().unwrap(), "Chansey\n");
}

#[test]
fn evs_are_capped_from_the_last_stat() {
    let json = r#"{
        "Species": "Zigzagoon",
        "EVs": { "HP": 252, "Attack": 252, "Defense": 252, "Sp_Attack": 0, "Sp_Defense": 0, "Speed": 0 }
    }"#;
    let mut port = ShowdownExporter::port(&common::pku(json), common::dex(), PortSettings::default()).unwrap();
    port.first_half().unwrap();
    assert!(port.warnings().iter().any(|alert| alert.title == "EVs"));
    let text = port.second_half().unwrap();
    assert!(text.contains("EVs: 252 HP / 252 Atk / 6 Def\n"), "{text}");
}

#[test]
fn long_nicknames_are_truncated() {
    let json = r#"{ "Species": "Zigzagoon", "Nickname": "Zigzag (the best) zoomer" }"#;
    let mut port = ShowdownExporter::port(&common::pku(json), common::dex(), PortSettings::default()).unwrap();
    port.first_half().unwrap();
    let warning = port.warnings().iter().find(|alert| alert.title == "Nickname").unwrap();
    assert!(warning.message.contains("truncated to 18 characters"));
    assert_eq!(port.second_half().unwrap(), "Zigzag the best zo (Zigzagoon)\n");
}

#[test]
fn forms_use_their_own_showdown_names() {
    let json = r#"{ "Species": "Charizard", "Form": "Mega X" }"#;
    let text = to_showdown(json);
    assert_eq!(text, "Charizard-Mega-X\n");

    let pku = from_showdown(&text);
    assert_eq!(pku.species.as_deref(), Some("Charizard"));
    assert_eq!(pku.form.as_deref(), Some("Mega X"));
}

#[test]
fn eggs_and_unknown_species_are_infeasible() {
    let egg = common::pku(r#"{ "Species": "Zigzagoon", "Egg_Info": { "Is_Egg": true } }"#);
    let result = ShowdownExporter::port(&egg, common::dex(), PortSettings::default());
    assert!(matches!(result, Err(PortError::Infeasible(reason)) if reason.contains("egg")));

    let missing = common::pku(r#"{ "Species": "Missingno" }"#);
    let result = ShowdownExporter::port(&missing, common::dex(), PortSettings::default());
    assert!(matches!(result, Err(PortError::Infeasible(_))));

    let result = ShowdownImporter::port("\n\n", common::dex(), PortSettings::default());
    assert!(matches!(result, Err(PortError::Infeasible(_))));
}

#[test]
fn showdown_only_species_are_fine() {
    let json = r#"{ "Species": "Sylveon", "Item": "Life Orb", "Moves": [{ "Name": "Shadow Sneak" }] }"#;
    assert_eq!(to_showdown(json), "Sylveon @ Life Orb\n- Shadow Sneak\n");
}

#[test]
fn exported_text_imports_back() {
    let pku = from_showdown(&to_showdown(common::ZIGZAGOON));

    assert_eq!(pku.species.as_deref(), Some("Zigzagoon"));
    assert_eq!(pku.nickname.as_deref(), Some("Ziggy"));
    assert_eq!(pku.nickname_flag, Some(true));
    assert_eq!(pku.gender.as_deref(), Some("Female"));
    assert_eq!(pku.item.as_deref(), Some("Silk Scarf"));
    assert_eq!(pku.ability.as_deref(), Some("Pickup"));
    assert_eq!(pku.level, Some(5));
    assert_eq!(pku.friendship, Some(70));
    assert_eq!(pku.nature.as_deref(), Some("Hardy"));
    assert_eq!(pku.shiny, Some(false));
    assert_eq!(
        pku.ivs.unwrap().to_array(),
        [Some(31), Some(20), Some(10), Some(0), Some(5), Some(30)]
    );
    assert_eq!(
        pku.evs.unwrap().to_array(),
        [Some(0), Some(4), Some(0), Some(0), Some(0), Some(8)]
    );
    assert_eq!(
        pku.moves,
        Some(vec![PkuMove::named("Tackle"), PkuMove::named("Growl")])
    );
}

#[test]
fn importer_fills_in_what_showdown_leaves_out() {
    let pku = from_showdown("Chansey\n- Surf\n");
    assert_eq!(pku.gender.as_deref(), Some("Female"));
    assert_eq!(pku.nickname.as_deref(), Some("Chansey"));
    assert_eq!(pku.nickname_flag, Some(false));
    assert_eq!(pku.level, Some(100));
    assert_eq!(pku.friendship, Some(255));
    assert_eq!(pku.ivs.unwrap().to_array(), [Some(31); 6]);
}

#[test]
fn unreadable_lines_and_unknown_names_are_warned_about() {
    let text = "Zigzagoon @ Mystery Thing\nTera Type: Normal\n- Tackle\n- Dragon Dance\n";
    let mut port = ShowdownImporter::port(text, common::dex(), PortSettings::default()).unwrap();
    port.first_half().unwrap();
    let titles: Vec<&str> = port.warnings().iter().map(|alert| alert.title.as_str()).collect();
    assert_eq!(titles, vec!["Showdown", "Item", "Moves"]);

    let pku = port.second_half().unwrap();
    assert_eq!(pku.item, None);
    assert_eq!(pku.moves, Some(vec![PkuMove::named("Tackle")]));
}
