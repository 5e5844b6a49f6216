#![allow(dead_code)]

use pkuport::dex::{JsonDex, SharedDex};
use pkuport::Pku;

pub const DEX_JSON: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/", "dex.json");

pub fn dex() -> SharedDex {
    let file = std::fs::File::open(DEX_JSON).unwrap();
    JsonDex::from_reader(std::io::BufReader::new(file))
        .unwrap()
        .shared()
}

pub fn pku(json: &str) -> Pku {
    Pku::from_json(json).unwrap()
}

/// A fully specified Zigzagoon that fits in Gen 3 without any alerts.
pub const ZIGZAGOON: &str = r#"{
    "Species": "Zigzagoon",
    "Nickname": "Ziggy",
    "Gender": "Female",
    "Level": 5,
    "EXP": 125,
    "Item": "Silk Scarf",
    "Moves": [{ "Name": "Tackle", "PP_Ups": 1 }, { "Name": "Growl" }],
    "PID": 2684354575,
    "Nature": "Hardy",
    "Shiny": false,
    "Ability": "Pickup",
    "Friendship": 70,
    "OT": "May",
    "OT_Gender": "Female",
    "TID": 12345,
    "SID": 54321,
    "Game_Info": { "Origin_Game": "Emerald", "Language": "English" },
    "Catch_Info": { "Ball": "Poké Ball", "Met_Location": "Route 101", "Met_Level": 5, "Fateful_Encounter": false },
    "IVs": { "HP": 31, "Attack": 20, "Defense": 10, "Sp_Attack": 0, "Sp_Defense": 5, "Speed": 30 },
    "EVs": { "HP": 0, "Attack": 4, "Defense": 0, "Sp_Attack": 0, "Sp_Defense": 0, "Speed": 8 },
    "Contest_Stats": { "Cool": 10, "Beauty": 0, "Cute": 0, "Clever": 0, "Tough": 0, "Sheen": 0 },
    "Ribbons": ["Cool Ribbon Super", "Effort Ribbon"],
    "Markings": ["Blue Heart"]
}"#;
