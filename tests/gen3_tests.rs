mod common;

use pretty_assertions::assert_eq;

use pkuport::gen3::charset::Charset;
use pkuport::gen3::layout;
use pkuport::gen3::pid;
use pkuport::gen3::{compute_checksum, encrypt_decrypt_pk3, Pk3Data, Pk3Exporter, Pk3Importer};
use pkuport::pku::PkuMove;
use pkuport::types::Nature;
use pkuport::{PortError, PortSettings};

fn export(json: &str) -> Vec<u8> {
    Pk3Exporter::port(&common::pku(json), common::dex(), PortSettings::default())
        .unwrap()
        .run()
        .unwrap()
}

fn decode(pk3: &[u8]) -> Pk3Data {
    let (data, checksum_ok) = Pk3Data::from_pk3(pk3).unwrap();
    assert!(checksum_ok);
    data
}

#[test]
fn full_pku_exports_without_alerts() {
    let mut port = Pk3Exporter::port(&common::pku(common::ZIGZAGOON), common::dex(), PortSettings::default()).unwrap();
    port.first_half().unwrap();
    assert!(port.notes().is_empty(), "{:?}", port.notes());
    assert!(port.warnings().is_empty(), "{:?}", port.warnings());
    assert!(port.errors().is_empty(), "{:?}", port.errors());
    assert_eq!(port.choices().count(), 0);

    let pk3 = port.second_half().unwrap();
    assert_eq!(pk3.len(), 80);
    let data = decode(&pk3);

    assert_eq!(data.get(layout::PID), 2684354575);
    assert_eq!(data.get(layout::TID), 12345);
    assert_eq!(data.get(layout::SID), 54321);
    assert_eq!(data.get(layout::SPECIES), 288);
    assert_eq!(data.get(layout::HAS_SPECIES), 1);
    assert_eq!(data.get(layout::EXP), 125);
    assert_eq!(data.get(layout::ITEM), 217);
    assert_eq!(data.get(layout::FRIENDSHIP), 70);
    assert_eq!(data.get_all(layout::MOVES), vec![33, 45, 0, 0]);
    assert_eq!(data.get_all(layout::PP_UPS), vec![1, 0, 0, 0]);
    assert_eq!(data.get_all(layout::PP), vec![42, 40, 0, 0]);
    assert_eq!(data.get_all(layout::IVS), vec![31, 20, 10, 30, 0, 5]);
    assert_eq!(data.get_all(layout::EVS), vec![0, 4, 0, 8, 0, 0]);
    assert_eq!(data.get_all(layout::CONTEST), vec![10, 0, 0, 0, 0, 0]);
    assert_eq!(data.get(layout::LANGUAGE), 2);
    assert_eq!(data.get(layout::MET_LOCATION), 16);
    assert_eq!(data.get(layout::MET_LEVEL), 5);
    assert_eq!(data.get(layout::ORIGIN_GAME), 3);
    assert_eq!(data.get(layout::BALL), 4);
    assert_eq!(data.get(layout::OT_GENDER), 1);
    assert_eq!(data.get(layout::FATEFUL_ENCOUNTER), 0);
    assert_eq!(data.get(layout::IS_EGG), 0);
    assert_eq!(data.get_all(layout::CONTEST_RIBBONS), vec![2, 0, 0, 0, 0]);
    assert_eq!(data.get_all(layout::RIBBON_FLAGS)[4], 1);
    assert_eq!(data.get_all(layout::MARKINGS), vec![0, 0, 0, 1]);

    let international = Charset::International;
    assert_eq!(international.decode(data.bytes(layout::NICKNAME, layout::NICKNAME_BYTES)), "Ziggy");
    assert_eq!(international.decode(data.bytes(layout::OT_NAME, layout::OT_NAME_BYTES)), "May");
}

#[test]
fn stored_checksum_covers_the_decrypted_substructures() {
    let pk3 = export(common::ZIGZAGOON);
    let mut decrypted = pk3.clone();
    encrypt_decrypt_pk3(&mut decrypted);
    assert_ne!(pk3[0x20..0x50], decrypted[0x20..0x50]);
    assert_eq!(
        compute_checksum(&decrypted[0x20..0x50]),
        u16::from_le_bytes([decrypted[0x1c], decrypted[0x1d]])
    );
}

#[test]
fn checksum_of_a_known_block() {
    let block: Vec<u8> = (0..48).collect();
    assert_eq!(compute_checksum(&block), 0x4228);
    assert_eq!(compute_checksum(&[0xff; 48]), 0xffe8);
}

#[test]
fn encryption_uses_the_pid_and_ot_id() {
    let mut pk3 = vec![0u8; 80];
    pk3[0..4].copy_from_slice(&0x1234_5678u32.to_le_bytes());
    pk3[4..6].copy_from_slice(&0x1111u16.to_le_bytes());
    pk3[6..8].copy_from_slice(&0x2222u16.to_le_bytes());
    for (idx, byte) in pk3[0x20..0x50].iter_mut().enumerate() {
        *byte = idx as u8;
    }
    let plain = pk3.clone();

    // Key is 0x12345678 ^ 0x22221111 = 0x30164769
    encrypt_decrypt_pk3(&mut pk3);
    let expected: [u8; 48] = [
        0x69, 0x46, 0x14, 0x33, 0x6d, 0x42, 0x10, 0x37, 0x61, 0x4e, 0x1c, 0x3b,
        0x65, 0x4a, 0x18, 0x3f, 0x79, 0x56, 0x04, 0x23, 0x7d, 0x52, 0x00, 0x27,
        0x71, 0x5e, 0x0c, 0x2b, 0x75, 0x5a, 0x08, 0x2f, 0x49, 0x66, 0x34, 0x13,
        0x4d, 0x62, 0x30, 0x17, 0x41, 0x6e, 0x3c, 0x1b, 0x45, 0x6a, 0x38, 0x1f,
    ];
    assert_eq!(pk3[0x20..0x50], expected[..]);
    assert_eq!(pk3[..0x20], plain[..0x20]);

    encrypt_decrypt_pk3(&mut pk3);
    assert_eq!(pk3, plain);
}

#[test]
fn export_then_import() {
    let pk3 = export(common::ZIGZAGOON);
    let pku = Pk3Importer::port(&pk3, common::dex(), PortSettings::default())
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(pku.species.as_deref(), Some("Zigzagoon"));
    assert_eq!(pku.nickname.as_deref(), Some("Ziggy"));
    assert_eq!(pku.nickname_flag, Some(true));
    assert_eq!(pku.gender.as_deref(), Some("Female"));
    assert_eq!(pku.level, Some(5));
    assert_eq!(pku.exp, Some(125));
    assert_eq!(pku.item.as_deref(), Some("Silk Scarf"));
    assert_eq!(
        pku.moves,
        Some(vec![
            PkuMove {
                name: Some(String::from("Tackle")),
                pp_ups: Some(1),
            },
            PkuMove {
                name: Some(String::from("Growl")),
                pp_ups: Some(0),
            },
        ])
    );
    assert_eq!(pku.pid, Some(2684354575));
    assert_eq!(pku.nature.as_deref(), Some("Hardy"));
    assert_eq!(pku.shiny, Some(false));
    assert_eq!(pku.ability.as_deref(), Some("Pickup"));
    assert_eq!(pku.friendship, Some(70));
    assert_eq!(pku.ot.as_deref(), Some("May"));
    assert_eq!(pku.ot_gender.as_deref(), Some("Female"));
    assert_eq!((pku.tid, pku.sid), (Some(12345), Some(54321)));
    assert_eq!(pku.language(), Some("English"));
    assert_eq!(pku.origin_game(), Some("Emerald"));
    assert_eq!(pku.ball(), Some("Poké Ball"));
    assert_eq!(pku.met_location(), Some("Route 101"));
    assert_eq!(pku.met_level(), Some(5));
    assert_eq!(pku.fateful_encounter(), Some(false));

    let ivs = pku.ivs.unwrap().to_array();
    assert_eq!(ivs, [Some(31), Some(20), Some(10), Some(0), Some(5), Some(30)]);
    let evs = pku.evs.unwrap().to_array();
    assert_eq!(evs, [Some(0), Some(4), Some(0), Some(0), Some(0), Some(8)]);
    assert_eq!(pku.contest_stats.unwrap().cool, Some(10));
    assert_eq!(
        pku.ribbons,
        Some(vec![
            String::from("Cool Ribbon"),
            String::from("Cool Ribbon Super"),
            String::from("Effort Ribbon"),
        ])
    );
    assert_eq!(pku.markings, Some(vec![String::from("Blue Heart")]));
}

#[test]
fn species_missing_from_gen3_is_infeasible() {
    let pku = common::pku(r#"{ "Species": "Sylveon" }"#);
    let result = Pk3Exporter::port(&pku, common::dex(), PortSettings::default());
    assert!(matches!(result, Err(PortError::Infeasible(reason)) if reason.contains("Sylveon")));

    let pku = common::pku(r#"{ "Species": "Charizard", "Form": "Mega X" }"#);
    let result = Pk3Exporter::port(&pku, common::dex(), PortSettings::default());
    assert!(matches!(result, Err(PortError::Infeasible(reason)) if reason.contains("Mega X")));
}

#[test]
fn format_override_can_make_a_pku_portable() {
    let pku = common::pku(
        r#"{
            "Species": "Sylveon",
            "Format_Overrides": { "pk3": { "Species": "Zigzagoon" } }
        }"#,
    );
    let pk3 = Pk3Exporter::port(&pku, common::dex(), PortSettings::default())
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(decode(&pk3).get(layout::SPECIES), 288);
}

const WRONG_NATURE: &str = r#"{
    "Species": "Zigzagoon",
    "Nickname": "Z",
    "OT": "A",
    "TID": 1,
    "SID": 2,
    "PID": 0,
    "Nature": "Adamant",
    "Game_Info": { "Language": "English" }
}"#;

#[test]
fn pid_that_disagrees_is_kept_by_default() {
    let mut port = Pk3Exporter::port(&common::pku(WRONG_NATURE), common::dex(), PortSettings::default()).unwrap();
    port.first_half().unwrap();

    let choices: Vec<_> = port.choices().collect();
    assert_eq!(choices.len(), 1);
    let (tag, choice) = choices[0];
    assert_eq!(tag, "PID");
    let labels: Vec<&str> = choice.options.iter().map(|option| option.label.as_str()).collect();
    assert_eq!(labels, vec!["Keep PID", "Generate PID"]);
    assert!(choice.alert.message.contains("nature"));

    let data = decode(&port.second_half().unwrap());
    assert_eq!(data.personality_value(), 0);
    assert_eq!(pid::nature(0), Nature::Hardy);
}

#[test]
fn generated_pid_agrees_with_the_pku() {
    let mut port = Pk3Exporter::port(&common::pku(WRONG_NATURE), common::dex(), PortSettings::default()).unwrap();
    port.first_half().unwrap();
    port.select("PID", 1).unwrap();
    let data = decode(&port.second_half().unwrap());
    let personality = data.personality_value();
    assert_ne!(personality, 0);
    assert_eq!(pid::nature(personality), Nature::Adamant);
}

#[test]
fn a_typed_pid_replaces_both_options() {
    let mut port = Pk3Exporter::port(&common::pku(WRONG_NATURE), common::dex(), PortSettings::default()).unwrap();
    port.first_half().unwrap();
    assert!(port.choices().all(|(_, choice)| choice.text_hint().is_some()));
    assert!(port.set_text_entry("PID", "0x100000000").is_err());
    assert!(port.set_text_entry("PID", "not a pid").is_err());

    port.set_text_entry("PID", "0x00000003").unwrap();
    let data = decode(&port.second_half().unwrap());
    assert_eq!(data.personality_value(), 3);
    assert_eq!(pid::nature(3), Nature::Adamant);
}

#[test]
fn unown_form_drives_the_generated_pid() {
    let json = r#"{ "Species": "Unown", "Form": "Q", "Nickname": "UNOWN", "OT": "A", "Game_Info": { "Language": "English" } }"#;
    let pk3 = export(json);
    let data = decode(&pk3);
    assert_eq!(pid::unown_form(data.personality_value()), 16);

    let pku = Pk3Importer::port(&pk3, common::dex(), PortSettings::default())
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(pku.form.as_deref(), Some("Q"));
    assert_eq!(pku.nickname_flag, Some(false));
}

#[test]
fn mismatched_experience_can_follow_the_level() {
    let json = r#"{ "Species": "Zigzagoon", "Level": 10, "EXP": 125 }"#;
    let mut port = Pk3Exporter::port(&common::pku(json), common::dex(), PortSettings::default()).unwrap();
    port.first_half().unwrap();
    let (_, choice) = port
        .choices()
        .find(|(tag, _)| *tag == "Experience")
        .unwrap();
    assert_eq!(choice.options[0].label, "Use EXP");
    assert_eq!(choice.options[1].label, "Use Level");

    port.select("Experience", 1).unwrap();
    let data = decode(&port.second_half().unwrap());
    assert_eq!(data.get(layout::EXP), 1000);
}

#[test]
fn unknown_choice_and_bad_index_are_rejected() {
    let json = r#"{ "Species": "Zigzagoon", "Level": 10, "EXP": 125 }"#;
    let mut port = Pk3Exporter::port(&common::pku(json), common::dex(), PortSettings::default()).unwrap();
    port.first_half().unwrap();
    assert!(matches!(port.select("Shininess", 0), Err(PortError::UnknownChoice(_))));
    assert!(matches!(port.select("Experience", 2), Err(PortError::ChoiceIndex { .. })));
}

#[test]
fn missing_language_offers_every_language_that_fits() {
    let json = r#"{ "Species": "Zigzagoon", "Nickname": "Ziggy", "OT": "May" }"#;
    let mut port = Pk3Exporter::port(&common::pku(json), common::dex(), PortSettings::default()).unwrap();
    port.first_half().unwrap();
    let (_, choice) = port.choices().find(|(tag, _)| *tag == "Language").unwrap();
    let labels: Vec<&str> = choice.options.iter().map(|option| option.label.as_str()).collect();
    assert_eq!(labels.first(), Some(&"English"));
    assert_eq!(labels.last(), Some(&"None"));
    assert!(labels.contains(&"French"));
    assert!(!labels.contains(&"Korean"));

    let data = decode(&port.second_half().unwrap());
    assert_eq!(data.get(layout::LANGUAGE), 2);
}

#[test]
fn japanese_names_only_fit_japanese() {
    let json = r#"{ "Species": "Zigzagoon", "Nickname": "ジグザグマ", "OT": "サトシ" }"#;
    let mut port = Pk3Exporter::port(&common::pku(json), common::dex(), PortSettings::default()).unwrap();
    port.first_half().unwrap();
    let (_, choice) = port.choices().find(|(tag, _)| *tag == "Language").unwrap();
    let labels: Vec<&str> = choice.options.iter().map(|option| option.label.as_str()).collect();
    assert_eq!(labels, vec!["Japanese", "None"]);

    let data = decode(&port.second_half().unwrap());
    assert_eq!(data.get(layout::LANGUAGE), 1);
    let japanese = Charset::Japanese;
    assert_eq!(japanese.decode(data.bytes(layout::NICKNAME, layout::NICKNAME_BYTES)), "ジグザグマ");
    assert_eq!(japanese.decode(data.bytes(layout::OT_NAME, layout::OT_NAME_BYTES)), "サトシ");
    assert!(port.remediations().is_empty());
}

#[test]
fn lossy_names_come_with_remediations() {
    let json = r#"{ "Species": "Zigzagoon", "Nickname": "ジグザグマ", "OT": "サトシ" }"#;
    let mut port = Pk3Exporter::port(&common::pku(json), common::dex(), PortSettings::default()).unwrap();
    port.first_half().unwrap();
    port.select("Language", 1).unwrap();
    let data = decode(&port.second_half().unwrap());

    assert_eq!(data.get(layout::LANGUAGE), 0);
    let tags: Vec<&str> = port.remediations().iter().map(|fix| fix.tag.as_str()).collect();
    assert_eq!(tags, vec!["Nickname", "OT"]);
    assert_eq!(port.remediations()[0].command.byte, layout::NICKNAME);
}

#[test]
fn event_species_without_the_flag_can_have_it_set() {
    let json = r#"{ "Species": "Mew", "Nickname": "MEW", "OT": "A", "Game_Info": { "Language": "English" } }"#;
    let mut port = Pk3Exporter::port(&common::pku(json), common::dex(), PortSettings::default()).unwrap();
    port.first_half().unwrap();
    let (_, choice) = port
        .choices()
        .find(|(tag, _)| *tag == "Fateful Encounter")
        .unwrap();
    assert_eq!(choice.options[1].label, "Set the flag");

    port.select("Fateful Encounter", 1).unwrap();
    let data = decode(&port.second_half().unwrap());
    assert_eq!(data.get(layout::FATEFUL_ENCOUNTER), 1);
}

#[test]
fn untrue_ot_can_be_cleared() {
    let json = r#"{ "Species": "Zigzagoon", "OT": "Red", "True_OT": false, "Game_Info": { "Language": "English" } }"#;
    let mut port = Pk3Exporter::port(&common::pku(json), common::dex(), PortSettings::default()).unwrap();
    port.first_half().unwrap();
    port.select("True OT", 1).unwrap();
    let data = decode(&port.second_half().unwrap());
    assert_eq!(Charset::International.decode(data.bytes(layout::OT_NAME, layout::OT_NAME_BYTES)), "");
}

#[test]
fn missing_values_are_noted() {
    let json = r#"{ "Species": "Zigzagoon" }"#;
    let mut port = Pk3Exporter::port(&common::pku(json), common::dex(), PortSettings::default()).unwrap();
    port.first_half().unwrap();
    let titles: Vec<&str> = port.notes().iter().map(|note| note.title.as_str()).collect();
    assert!(titles.contains(&"Ability"), "{titles:?}");
    assert!(titles.contains(&"Experience"), "{titles:?}");
    assert!(titles.contains(&"Nature"), "{titles:?}");

    let data = decode(&port.second_half().unwrap());
    assert_eq!(data.get(layout::EXP), 0);
    assert_eq!(data.get(layout::FRIENDSHIP), 70);
    assert_eq!(data.get(layout::BALL), 4);
}

#[test]
fn abilities_past_the_second_slot_are_warned_about() {
    let json = r#"{ "Species": "Chansey", "Ability": "Serene Grace" }"#;
    assert_eq!(decode(&export(json)).get(layout::ABILITY_SLOT), 1);

    let json = r#"{ "Species": "Chansey", "Ability": "Healer" }"#;
    let mut port = Pk3Exporter::port(&common::pku(json), common::dex(), PortSettings::default()).unwrap();
    port.first_half().unwrap();
    let warning = port.warnings().iter().find(|alert| alert.title == "Ability").unwrap();
    assert!(warning.message.contains("Natural Cure"), "{}", warning.message);
    assert_eq!(decode(&port.second_half().unwrap()).get(layout::ABILITY_SLOT), 0);
}

#[test]
fn silent_when_unspecified_alerts_are_off() {
    let json = r#"{ "Species": "Zigzagoon", "Nickname": "Z", "OT": "A", "Game_Info": { "Language": "English" } }"#;
    let settings = PortSettings {
        alert_unspecified: false,
        ..PortSettings::default()
    };
    let mut port = Pk3Exporter::port(&common::pku(json), common::dex(), settings).unwrap();
    port.first_half().unwrap();
    assert!(port.notes().is_empty(), "{:?}", port.notes());
}

#[test]
fn party_format_carries_stats() {
    let settings = PortSettings {
        pk3_party_format: true,
        ..PortSettings::default()
    };
    let pk3 = Pk3Exporter::port(&common::pku(common::ZIGZAGOON), common::dex(), settings)
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(pk3.len(), 100);
    let data = decode(&pk3);
    assert!(data.is_party());
    assert_eq!(data.get(layout::LEVEL), 5);
    assert_eq!(data.get(layout::CURRENT_HP), 20);
    assert_eq!(data.get_all(layout::STATS)[0], 20);
}

#[test]
fn shedinja_always_has_one_hp() {
    let settings = PortSettings {
        pk3_party_format: true,
        ..PortSettings::default()
    };
    let json = r#"{ "Species": "Shedinja", "Level": 50 }"#;
    let pk3 = Pk3Exporter::port(&common::pku(json), common::dex(), settings)
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(decode(&pk3).get(layout::CURRENT_HP), 1);
}

#[test]
fn byte_overrides_are_applied_last() {
    let json = common::ZIGZAGOON.replacen(
        "\"Species\": \"Zigzagoon\",",
        r#""Species": "Zigzagoon", "Byte_Override": { "pk3": [{ "Byte": 41, "Value": 99, "Virtual": true }] },"#,
        1,
    );
    let pk3 = export(&json);
    assert_eq!(decode(&pk3).get(layout::FRIENDSHIP), 99);

    let pku = Pk3Importer::port(&pk3, common::dex(), PortSettings::default())
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(pku.friendship, Some(99));
}

#[test]
fn bad_byte_overrides_become_errors() {
    let json = r#"{ "Species": "Zigzagoon", "Byte_Override": { "pk3": [{ "Byte": 200, "Value": 1 }] } }"#;
    let mut port = Pk3Exporter::port(&common::pku(json), common::dex(), PortSettings::default()).unwrap();
    port.first_half().unwrap();
    let pk3 = port.second_half().unwrap();
    assert_eq!(pk3.len(), 80);
    assert_eq!(port.errors().len(), 1);
    assert_eq!(port.errors()[0].title, "Byte Override");
}

#[test]
fn overrides_far_past_the_end_become_errors() {
    let json = r#"{
        "Species": "Zigzagoon",
        "Byte_Override": { "pk3": [{ "Byte": 18446744073709551615, "Value": 1 }, { "Byte": 41, "Value": 99, "Virtual": true }] }
    }"#;
    let mut port = Pk3Exporter::port(&common::pku(json), common::dex(), PortSettings::default()).unwrap();
    port.first_half().unwrap();
    let pk3 = port.second_half().unwrap();
    assert_eq!(port.errors().len(), 1);
    assert_eq!(port.errors()[0].title, "Byte Override");
    assert_eq!(decode(&pk3).get(layout::FRIENDSHIP), 99);
}

#[test]
fn corrupt_checksum_is_reported_on_import() {
    let mut pk3 = export(common::ZIGZAGOON);
    pk3[0x1c] ^= 0xff;
    let mut port = Pk3Importer::port(&pk3, common::dex(), PortSettings::default()).unwrap();
    port.first_half().unwrap();
    assert_eq!(port.errors()[0].title, "Checksum");
    let pku = port.second_half().unwrap();
    assert_eq!(pku.species.as_deref(), Some("Zigzagoon"));
}

#[test]
fn empty_slot_cannot_be_imported() {
    let result = Pk3Importer::port(&[0u8; 80], common::dex(), PortSettings::default());
    assert!(matches!(result, Err(PortError::Infeasible(_))));

    let result = Pk3Importer::port(&[0u8; 12], common::dex(), PortSettings::default());
    assert!(matches!(result, Err(PortError::Infeasible(_))));
}
