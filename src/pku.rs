//! The canonical pku record.
//!
//! Every value is optional: `None` means the tag was not specified, which is
//! reported differently from a value that is present but unusable. Values
//! are kept raw (signed integers, free-form strings) so that an invalid
//! value survives deserialization and can be explained to the user.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::byte_override::ByteOverrideCommand;
use crate::error::PortResult;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pku {
    #[serde(rename = "Species", default, skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,
    #[serde(rename = "Form", default, skip_serializing_if = "Option::is_none")]
    pub form: Option<String>,
    #[serde(rename = "Nickname", default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(rename = "Nickname_Flag", default, skip_serializing_if = "Option::is_none")]
    pub nickname_flag: Option<bool>,
    #[serde(rename = "True_OT", default, skip_serializing_if = "Option::is_none")]
    pub true_ot: Option<bool>,
    #[serde(rename = "Gender", default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(rename = "Level", default, skip_serializing_if = "Option::is_none")]
    pub level: Option<i64>,
    #[serde(rename = "EXP", default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(rename = "Item", default, skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    #[serde(rename = "Moves", default, skip_serializing_if = "Option::is_none")]
    pub moves: Option<Vec<PkuMove>>,
    #[serde(rename = "PID", default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<i64>,
    #[serde(rename = "Shiny", default, skip_serializing_if = "Option::is_none")]
    pub shiny: Option<bool>,
    #[serde(rename = "Nature", default, skip_serializing_if = "Option::is_none")]
    pub nature: Option<String>,
    #[serde(rename = "Ability", default, skip_serializing_if = "Option::is_none")]
    pub ability: Option<String>,
    #[serde(rename = "Gigantamax_Factor", default, skip_serializing_if = "Option::is_none")]
    pub gigantamax_factor: Option<bool>,
    #[serde(rename = "Friendship", default, skip_serializing_if = "Option::is_none")]
    pub friendship: Option<i64>,
    #[serde(rename = "OT", default, skip_serializing_if = "Option::is_none")]
    pub ot: Option<String>,
    #[serde(rename = "OT_Gender", default, skip_serializing_if = "Option::is_none")]
    pub ot_gender: Option<String>,
    #[serde(rename = "TID", default, skip_serializing_if = "Option::is_none")]
    pub tid: Option<i64>,
    #[serde(rename = "SID", default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<i64>,
    #[serde(rename = "Game_Info", default, skip_serializing_if = "Option::is_none")]
    pub game_info: Option<GameInfo>,
    #[serde(rename = "Catch_Info", default, skip_serializing_if = "Option::is_none")]
    pub catch_info: Option<CatchInfo>,
    #[serde(rename = "Egg_Info", default, skip_serializing_if = "Option::is_none")]
    pub egg_info: Option<EggInfo>,
    #[serde(rename = "IVs", default, skip_serializing_if = "Option::is_none")]
    pub ivs: Option<StatValues>,
    #[serde(rename = "EVs", default, skip_serializing_if = "Option::is_none")]
    pub evs: Option<StatValues>,
    #[serde(rename = "Contest_Stats", default, skip_serializing_if = "Option::is_none")]
    pub contest_stats: Option<ContestStats>,
    #[serde(rename = "Ribbons", default, skip_serializing_if = "Option::is_none")]
    pub ribbons: Option<Vec<String>>,
    #[serde(rename = "Markings", default, skip_serializing_if = "Option::is_none")]
    pub markings: Option<Vec<String>>,
    #[serde(rename = "Pokerus", default, skip_serializing_if = "Option::is_none")]
    pub pokerus: Option<Pokerus>,
    #[serde(rename = "Byte_Override", default, skip_serializing_if = "Option::is_none")]
    pub byte_override: Option<BTreeMap<String, Vec<ByteOverrideCommand>>>,
    #[serde(rename = "Format_Overrides", default, skip_serializing_if = "Option::is_none")]
    pub format_overrides: Option<BTreeMap<String, Value>>,
    /// Tags this crate doesn't know about, carried through untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PkuMove {
    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "PP_Ups", default, skip_serializing_if = "Option::is_none")]
    pub pp_ups: Option<i64>,
}

impl PkuMove {
    pub fn named(name: impl Into<String>) -> Self {
        PkuMove {
            name: Some(name.into()),
            pp_ups: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameInfo {
    #[serde(rename = "Origin_Game", default, skip_serializing_if = "Option::is_none")]
    pub origin_game: Option<String>,
    #[serde(rename = "Language", default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatchInfo {
    #[serde(rename = "Ball", default, skip_serializing_if = "Option::is_none")]
    pub ball: Option<String>,
    #[serde(rename = "Met_Location", default, skip_serializing_if = "Option::is_none")]
    pub met_location: Option<String>,
    #[serde(rename = "Met_Level", default, skip_serializing_if = "Option::is_none")]
    pub met_level: Option<i64>,
    #[serde(rename = "Fateful_Encounter", default, skip_serializing_if = "Option::is_none")]
    pub fateful_encounter: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EggInfo {
    #[serde(rename = "Is_Egg", default, skip_serializing_if = "Option::is_none")]
    pub is_egg: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatValues {
    #[serde(rename = "HP", default, skip_serializing_if = "Option::is_none")]
    pub hp: Option<i64>,
    #[serde(rename = "Attack", default, skip_serializing_if = "Option::is_none")]
    pub attack: Option<i64>,
    #[serde(rename = "Defense", default, skip_serializing_if = "Option::is_none")]
    pub defense: Option<i64>,
    #[serde(rename = "Sp_Attack", default, skip_serializing_if = "Option::is_none")]
    pub sp_attack: Option<i64>,
    #[serde(rename = "Sp_Defense", default, skip_serializing_if = "Option::is_none")]
    pub sp_defense: Option<i64>,
    #[serde(rename = "Speed", default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<i64>,
}

impl StatValues {
    /// Values in HP, Attack, Defense, Sp. Attack, Sp. Defense, Speed order.
    pub fn to_array(&self) -> [Option<i64>; 6] {
        [
            self.hp,
            self.attack,
            self.defense,
            self.sp_attack,
            self.sp_defense,
            self.speed,
        ]
    }

    pub fn from_array(values: [Option<i64>; 6]) -> Self {
        let [hp, attack, defense, sp_attack, sp_defense, speed] = values;
        StatValues {
            hp,
            attack,
            defense,
            sp_attack,
            sp_defense,
            speed,
        }
    }

    pub fn all(value: i64) -> Self {
        StatValues::from_array([Some(value); 6])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContestStats {
    #[serde(rename = "Cool", default, skip_serializing_if = "Option::is_none")]
    pub cool: Option<i64>,
    #[serde(rename = "Beauty", default, skip_serializing_if = "Option::is_none")]
    pub beauty: Option<i64>,
    #[serde(rename = "Cute", default, skip_serializing_if = "Option::is_none")]
    pub cute: Option<i64>,
    #[serde(rename = "Clever", default, skip_serializing_if = "Option::is_none")]
    pub clever: Option<i64>,
    #[serde(rename = "Tough", default, skip_serializing_if = "Option::is_none")]
    pub tough: Option<i64>,
    #[serde(rename = "Sheen", default, skip_serializing_if = "Option::is_none")]
    pub sheen: Option<i64>,
}

impl ContestStats {
    /// Values in Cool, Beauty, Cute, Clever, Tough, Sheen order.
    pub fn to_array(&self) -> [Option<i64>; 6] {
        [
            self.cool,
            self.beauty,
            self.cute,
            self.clever,
            self.tough,
            self.sheen,
        ]
    }

    pub fn from_array(values: [Option<i64>; 6]) -> Self {
        let [cool, beauty, cute, clever, tough, sheen] = values;
        ContestStats {
            cool,
            beauty,
            cute,
            clever,
            tough,
            sheen,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pokerus {
    #[serde(rename = "Strain", default, skip_serializing_if = "Option::is_none")]
    pub strain: Option<i64>,
    #[serde(rename = "Days", default, skip_serializing_if = "Option::is_none")]
    pub days: Option<i64>,
}

impl Pku {
    pub fn from_json(json: &str) -> PortResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader(reader: impl std::io::Read) -> PortResult<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn to_json_pretty(&self) -> PortResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn is_egg(&self) -> bool {
        self.egg_info
            .as_ref()
            .and_then(|egg| egg.is_egg)
            .unwrap_or(false)
    }

    pub fn language(&self) -> Option<&str> {
        self.game_info.as_ref()?.language.as_deref()
    }

    pub fn origin_game(&self) -> Option<&str> {
        self.game_info.as_ref()?.origin_game.as_deref()
    }

    pub fn ball(&self) -> Option<&str> {
        self.catch_info.as_ref()?.ball.as_deref()
    }

    pub fn met_location(&self) -> Option<&str> {
        self.catch_info.as_ref()?.met_location.as_deref()
    }

    pub fn met_level(&self) -> Option<i64> {
        self.catch_info.as_ref()?.met_level
    }

    pub fn fateful_encounter(&self) -> Option<bool> {
        self.catch_info.as_ref()?.fateful_encounter
    }

    pub fn byte_overrides(&self, format: &str) -> &[ByteOverrideCommand] {
        self.byte_override
            .as_ref()
            .and_then(|overrides| overrides.get(format))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns a copy of this pku with the overrides for `format` merged on
    /// top. Objects merge key by key, anything else is replaced. The
    /// overrides themselves are dropped from the copy.
    pub fn with_format_override(&self, format: &str) -> PortResult<Pku> {
        let Some(patch) = self
            .format_overrides
            .as_ref()
            .and_then(|overrides| overrides.get(format))
        else {
            return Ok(self.clone());
        };

        let mut base = serde_json::to_value(self)?;
        merge_json(&mut base, patch);
        let mut merged: Pku = serde_json::from_value(base)?;
        merged.format_overrides = None;
        Ok(merged)
    }
}

fn merge_json(base: &mut Value, patch: &Value) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            for (key, value) in patch {
                match base.get_mut(key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        base.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, patch) => *base = patch.clone(),
    }
}
