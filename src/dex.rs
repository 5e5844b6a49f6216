//! Lookup tables for the names a pku uses and the values each format stores
//! for them.
//!
//! The porters only consume the [`Dex`] trait. [`JsonDex`] implements it
//! over a JSON document shaped like:
//!
//! ```json
//! {
//!   "Species": {
//!     "Unown": {
//!       "Indices": { "pk3": 201, "Showdown": "Unown" },
//!       "Gender_Ratio": 255,
//!       "Growth_Rate": "Medium Fast",
//!       "Abilities": ["Levitate"],
//!       "Base_Stats": [48, 72, 48, 72, 48, 48],
//!       "Default_Form": "A",
//!       "Forms": { "B": { "Indices": { "pk3": 201, "Showdown": "Unown-B" } } }
//!     }
//!   },
//!   "Moves": { "Tackle": { "Indices": { "pk3": 33, "Showdown": "Tackle" }, "PP": 35 } },
//!   "Items": {}, "Abilities": {}, "Balls": {}, "Locations": {}
//! }
//! ```
//!
//! A key that can't be found is simply absent; lookups never fail loudly.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::PortResult;
use crate::types::Gender;

pub type SharedDex = Arc<dyn Dex + Send + Sync>;

/// A format's encoding of a dex key: some formats store numbers, others
/// store names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DexIndex {
    Int(i64),
    Str(String),
}

impl DexIndex {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            DexIndex::Int(value) => Some(*value),
            DexIndex::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DexIndex::Int(_) => None,
            DexIndex::Str(value) => Some(value),
        }
    }

    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(number) => number.as_i64().map(DexIndex::Int),
            Value::String(text) => Some(DexIndex::Str(text.clone())),
            _ => None,
        }
    }

    fn matches_json(&self, value: &Value) -> bool {
        match (self, value) {
            (DexIndex::Int(index), Value::Number(number)) => number.as_i64() == Some(*index),
            (DexIndex::Str(index), Value::String(text)) => index.eq_ignore_ascii_case(text),
            _ => false,
        }
    }
}

impl fmt::Display for DexIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DexIndex::Int(value) => write!(f, "{value}"),
            DexIndex::Str(value) => f.write_str(value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DexCategory {
    Species,
    Move,
    Item,
    Ability,
    Ball,
    Location,
}

impl DexCategory {
    fn key(&self) -> &'static str {
        match self {
            DexCategory::Species => "Species",
            DexCategory::Move => "Moves",
            DexCategory::Item => "Items",
            DexCategory::Ability => "Abilities",
            DexCategory::Ball => "Balls",
            DexCategory::Location => "Locations",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenderRatio {
    AlwaysMale,
    AlwaysFemale,
    Genderless,
    /// A personality value whose low byte is below this is female.
    FemaleBelow(u8),
}

impl GenderRatio {
    /// Decodes the ratio byte the games use: 0 always male, 254 always
    /// female, 255 genderless.
    pub fn from_byte(value: u8) -> Self {
        match value {
            0 => GenderRatio::AlwaysMale,
            254 => GenderRatio::AlwaysFemale,
            255 => GenderRatio::Genderless,
            threshold => GenderRatio::FemaleBelow(threshold),
        }
    }

    pub fn permits(&self, gender: Gender) -> bool {
        matches!(
            (self, gender),
            (GenderRatio::AlwaysMale, Gender::Male)
                | (GenderRatio::AlwaysFemale, Gender::Female)
                | (GenderRatio::Genderless, Gender::Genderless)
                | (GenderRatio::FemaleBelow(_), Gender::Male | Gender::Female)
        )
    }

    /// The only gender this species can have, if there is just one.
    pub fn fixed(&self) -> Option<Gender> {
        match self {
            GenderRatio::AlwaysMale => Some(Gender::Male),
            GenderRatio::AlwaysFemale => Some(Gender::Female),
            GenderRatio::Genderless => Some(Gender::Genderless),
            GenderRatio::FemaleBelow(_) => None,
        }
    }

    /// Gender implied by a Gen 3+ personality value.
    pub fn gender_of(&self, pid: u32) -> Gender {
        match self {
            GenderRatio::FemaleBelow(threshold) if ((pid & 0xff) as u8) < *threshold => {
                Gender::Female
            }
            GenderRatio::FemaleBelow(_) => Gender::Male,
            fixed => fixed.fixed().unwrap_or(Gender::Genderless),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum GrowthRate {
    Erratic,
    Fast,
    #[serde(rename = "Medium Fast")]
    MediumFast,
    #[serde(rename = "Medium Slow")]
    MediumSlow,
    Slow,
    Fluctuating,
}

impl GrowthRate {
    /// Minimum experience needed to be at `level` (clamped to 1..=100).
    pub fn exp_at_level(&self, level: u32) -> u32 {
        let n = level.clamp(1, 100) as i64;
        if n == 1 {
            return 0;
        }
        let cube = n * n * n;
        let exp = match self {
            GrowthRate::Erratic => match n {
                ..=49 => cube * (100 - n) / 50,
                50..=67 => cube * (150 - n) / 100,
                68..=97 => cube * ((1911 - 10 * n) / 3) / 500,
                _ => cube * (160 - n) / 100,
            },
            GrowthRate::Fast => 4 * cube / 5,
            GrowthRate::MediumFast => cube,
            GrowthRate::MediumSlow => 6 * cube / 5 - 15 * n * n + 100 * n - 140,
            GrowthRate::Slow => 5 * cube / 4,
            GrowthRate::Fluctuating => match n {
                ..=14 => cube * ((n + 1) / 3 + 24) / 50,
                15..=35 => cube * (n + 14) / 50,
                _ => cube * (n / 2 + 32) / 50,
            },
        };
        exp.max(0) as u32
    }

    pub fn max_exp(&self) -> u32 {
        self.exp_at_level(100)
    }

    pub fn level_at_exp(&self, exp: u32) -> u32 {
        (1..=100)
            .rev()
            .find(|level| self.exp_at_level(*level) <= exp)
            .unwrap_or(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeciesInfo {
    pub gender_ratio: GenderRatio,
    pub growth_rate: GrowthRate,
    pub abilities: Vec<String>,
    /// HP, Attack, Defense, Sp. Attack, Sp. Defense, Speed.
    pub base_stats: Option<[u16; 6]>,
    pub base_friendship: Option<u8>,
}

pub trait Dex {
    /// The value `format` stores for `key`, if `key` exists there.
    fn index_of(&self, category: DexCategory, key: &str, format: &str) -> Option<DexIndex>;

    /// Reverse lookup, for reading a format back into a pku.
    fn key_of(&self, category: DexCategory, format: &str, index: &DexIndex) -> Option<String>;

    fn default_form(&self, species: &str) -> Option<String>;

    /// Index of a species, or of one of its forms when `form` is given and
    /// isn't the default one.
    fn species_index(&self, species: &str, form: Option<&str>, format: &str) -> Option<DexIndex>;

    fn species_info(&self, species: &str, form: Option<&str>) -> Option<SpeciesInfo>;

    fn move_base_pp(&self, move_name: &str) -> Option<u8>;

    /// Reverse lookup of a species or one of its forms. The form is `None`
    /// for the base species.
    fn species_key_of(&self, format: &str, index: &DexIndex) -> Option<(String, Option<String>)> {
        self.key_of(DexCategory::Species, format, index)
            .map(|species| (species, None))
    }

    fn exists(&self, category: DexCategory, key: &str, format: &str) -> bool {
        self.index_of(category, key, format).is_some()
    }
}

pub struct JsonDex {
    root: Value,
}

impl JsonDex {
    pub fn new(root: Value) -> Self {
        JsonDex { root }
    }

    pub fn from_json(json: &str) -> PortResult<Self> {
        Ok(JsonDex::new(serde_json::from_str(json)?))
    }

    pub fn from_reader(reader: impl std::io::Read) -> PortResult<Self> {
        Ok(JsonDex::new(serde_json::from_reader(reader)?))
    }

    pub fn shared(self) -> SharedDex {
        Arc::new(self)
    }

    fn table(&self, category: DexCategory) -> Option<&Map<String, Value>> {
        self.root.get(category.key())?.as_object()
    }

    fn entry(&self, category: DexCategory, key: &str) -> Option<&Value> {
        lookup(self.table(category)?, key)
    }

    fn form_entry(&self, species: &str, form: Option<&str>) -> Option<Option<&Value>> {
        let entry = self.entry(DexCategory::Species, species)?;
        let Some(form) = form else {
            return Some(None);
        };
        let is_default = entry
            .get("Default_Form")
            .and_then(Value::as_str)
            .is_some_and(|default| default.eq_ignore_ascii_case(form));
        if is_default || form.is_empty() {
            return Some(None);
        }
        let forms = entry.get("Forms")?.as_object()?;
        lookup(forms, form).map(Some)
    }
}

fn lookup<'a>(table: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    let key = key.trim();
    table.get(key).or_else(|| {
        table
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value)
    })
}

fn indices_for(entry: &Value, format: &str) -> Option<DexIndex> {
    DexIndex::from_json(entry.get("Indices")?.get(format)?)
}

impl Dex for JsonDex {
    fn index_of(&self, category: DexCategory, key: &str, format: &str) -> Option<DexIndex> {
        if category == DexCategory::Species {
            return self.species_index(key, None, format);
        }
        indices_for(self.entry(category, key)?, format)
    }

    fn key_of(&self, category: DexCategory, format: &str, index: &DexIndex) -> Option<String> {
        self.table(category)?
            .iter()
            .find(|(_, entry)| {
                entry
                    .get("Indices")
                    .and_then(|indices| indices.get(format))
                    .is_some_and(|value| index.matches_json(value))
            })
            .map(|(name, _)| name.clone())
    }

    fn default_form(&self, species: &str) -> Option<String> {
        self.entry(DexCategory::Species, species)?
            .get("Default_Form")?
            .as_str()
            .map(str::to_owned)
    }

    fn species_index(&self, species: &str, form: Option<&str>, format: &str) -> Option<DexIndex> {
        let base = self.entry(DexCategory::Species, species)?;
        match self.form_entry(species, form)? {
            None => indices_for(base, format),
            Some(form_entry) => indices_for(form_entry, format),
        }
    }

    fn species_info(&self, species: &str, form: Option<&str>) -> Option<SpeciesInfo> {
        let base = self.entry(DexCategory::Species, species)?;
        let form_entry = self.form_entry(species, form).flatten();
        // Forms only list what differs from the base species
        let field = |name: &str| {
            form_entry
                .and_then(|entry| entry.get(name))
                .or_else(|| base.get(name))
        };

        let gender_ratio = field("Gender_Ratio")
            .and_then(Value::as_u64)
            .map(|ratio| GenderRatio::from_byte(ratio.min(255) as u8))
            .unwrap_or(GenderRatio::FemaleBelow(127));
        let growth_rate = field("Growth_Rate")
            .and_then(|rate| GrowthRate::deserialize(rate).ok())
            .unwrap_or(GrowthRate::MediumFast);
        let abilities = field("Abilities")
            .and_then(Value::as_array)
            .map(|names| {
                names
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();
        let base_stats = field("Base_Stats")
            .and_then(|stats| <[u16; 6]>::deserialize(stats).ok());
        let base_friendship = field("Base_Friendship")
            .and_then(Value::as_u64)
            .map(|value| value.min(255) as u8);

        Some(SpeciesInfo {
            gender_ratio,
            growth_rate,
            abilities,
            base_stats,
            base_friendship,
        })
    }

    fn species_key_of(&self, format: &str, index: &DexIndex) -> Option<(String, Option<String>)> {
        if let Some(species) = self.key_of(DexCategory::Species, format, index) {
            return Some((species, None));
        }
        let matches = |entry: &Value| {
            entry
                .get("Indices")
                .and_then(|indices| indices.get(format))
                .is_some_and(|value| index.matches_json(value))
        };
        self.table(DexCategory::Species)?
            .iter()
            .find_map(|(species, entry)| {
                let forms = entry.get("Forms")?.as_object()?;
                forms
                    .iter()
                    .find(|(_, form)| matches(form))
                    .map(|(form, _)| (species.clone(), Some(form.clone())))
            })
    }

    fn move_base_pp(&self, move_name: &str) -> Option<u8> {
        self.entry(DexCategory::Move, move_name)?
            .get("PP")?
            .as_u64()
            .map(|pp| pp.min(255) as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growth_rate_curves() {
        assert_eq!(GrowthRate::MediumFast.exp_at_level(100), 1_000_000);
        assert_eq!(GrowthRate::MediumSlow.exp_at_level(100), 1_059_860);
        assert_eq!(GrowthRate::Fast.exp_at_level(100), 800_000);
        assert_eq!(GrowthRate::Slow.exp_at_level(100), 1_250_000);
        assert_eq!(GrowthRate::Erratic.exp_at_level(100), 600_000);
        assert_eq!(GrowthRate::Fluctuating.exp_at_level(100), 1_640_000);
        assert_eq!(GrowthRate::MediumSlow.exp_at_level(2), 9);
        assert_eq!(GrowthRate::MediumFast.level_at_exp(124), 4);
        assert_eq!(GrowthRate::MediumFast.level_at_exp(125), 5);
    }

    #[test]
    fn gender_from_pid() {
        let ratio = GenderRatio::FemaleBelow(31);
        assert_eq!(ratio.gender_of(0x1234_5600), Gender::Female);
        assert_eq!(ratio.gender_of(0x1234_561f), Gender::Male);
    }
}
