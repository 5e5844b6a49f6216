//! The Pokémon Showdown team text format.
//!
//! ```text
//! Ziggy (Zigzagoon) (F) @ Silk Scarf
//! Ability: Pickup
//! Level: 50
//! EVs: 252 Atk / 4 SpD / 252 Spe
//! Jolly Nature
//! IVs: 0 SpA
//! - Extreme Speed
//! ```
//!
//! Lines that hold their default value are left out, so a minimal set is
//! just the species line and the moves.

pub mod exporter;
pub mod importer;

use std::fmt::Write as _;

use crate::field::{ArrayField, Field, Memory, MemoryArrayField, MemoryField};
use crate::types::{Gender, Nature};

pub use exporter::ShowdownExporter;
pub use importer::ShowdownImporter;

pub const FORMAT: &str = "Showdown";

pub const NICKNAME_LEN: usize = 18;
pub const MAX_EV: u64 = 252;
pub const MAX_EV_TOTAL: u64 = 510;
pub const DEFAULT_LEVEL: u64 = 100;
pub const DEFAULT_HAPPINESS: u64 = 255;
pub const DEFAULT_IV: u64 = 31;

/// In pku stat order.
pub const STAT_ABBREVIATIONS: [&str; 6] = ["HP", "Atk", "Def", "SpA", "SpD", "Spe"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowdownData {
    pub species: Memory<String>,
    pub nickname: Memory<Option<String>>,
    pub gender: Memory<Option<Gender>>,
    pub item: Memory<Option<String>>,
    pub ability: Memory<Option<String>>,
    pub level: MemoryField,
    pub shiny: Memory<bool>,
    pub happiness: MemoryField,
    pub gigantamax: Memory<bool>,
    pub evs: MemoryArrayField,
    pub nature: Memory<Option<Nature>>,
    pub ivs: MemoryArrayField,
    pub moves: Memory<Vec<String>>,
}

impl Default for ShowdownData {
    fn default() -> Self {
        ShowdownData {
            species: Memory::new(String::new()),
            nickname: Memory::new(None),
            gender: Memory::new(None),
            item: Memory::new(None),
            ability: Memory::new(None),
            level: MemoryField::new(DEFAULT_LEVEL, 1, 100),
            shiny: Memory::new(false),
            happiness: MemoryField::new(DEFAULT_HAPPINESS, 0, 255),
            gigantamax: Memory::new(false),
            evs: MemoryArrayField::new(6, 0, 0, MAX_EV),
            nature: Memory::new(None),
            ivs: MemoryArrayField::new(6, DEFAULT_IV, 0, 31),
            moves: Memory::new(Vec::new()),
        }
    }
}

fn stat_line(values: &[u64], shown: impl Fn(u64) -> bool) -> Option<String> {
    let parts: Vec<String> = values
        .iter()
        .zip(STAT_ABBREVIATIONS)
        .filter(|(value, _)| shown(**value))
        .map(|(value, name)| format!("{value} {name}"))
        .collect();
    (!parts.is_empty()).then(|| parts.join(" / "))
}

impl ShowdownData {
    pub fn new() -> Self {
        Self::default()
    }

    /// The set as Showdown text, one line per value that isn't at its
    /// default, ending in a newline.
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        let species = self.species.get();
        match self.nickname.get() {
            Some(nickname) => {
                let _ = write!(text, "{nickname} ({species})");
            }
            None => text.push_str(&species),
        }
        match self.gender.get() {
            Some(Gender::Male) => text.push_str(" (M)"),
            Some(Gender::Female) => text.push_str(" (F)"),
            _ => {}
        }
        if let Some(item) = self.item.get() {
            let _ = write!(text, " @ {item}");
        }
        text.push('\n');

        if let Some(ability) = self.ability.get() {
            let _ = writeln!(text, "Ability: {ability}");
        }
        if self.level.get() != DEFAULT_LEVEL {
            let _ = writeln!(text, "Level: {}", self.level.get());
        }
        if self.shiny.get() {
            text.push_str("Shiny: Yes\n");
        }
        if self.happiness.get() != DEFAULT_HAPPINESS {
            let _ = writeln!(text, "Happiness: {}", self.happiness.get());
        }
        if self.gigantamax.get() {
            text.push_str("Gigantamax: Yes\n");
        }
        if let Some(evs) = stat_line(&self.evs.get_all(), |value| value != 0) {
            let _ = writeln!(text, "EVs: {evs}");
        }
        if let Some(nature) = self.nature.get() {
            let _ = writeln!(text, "{nature} Nature");
        }
        if let Some(ivs) = stat_line(&self.ivs.get_all(), |value| value != DEFAULT_IV) {
            let _ = writeln!(text, "IVs: {ivs}");
        }
        for name in self.moves.value() {
            let _ = writeln!(text, "- {name}");
        }
        text
    }

    /// Parses the first set in `text`. Lines that can't be understood are
    /// skipped and described in the returned list.
    pub fn parse(text: &str) -> (Self, Vec<String>) {
        let mut data = ShowdownData::new();
        let mut problems = Vec::new();
        let mut lines = text.lines().map(str::trim).skip_while(|line| line.is_empty());

        if let Some(first) = lines.next() {
            data.parse_species_line(first);
        }
        for line in lines {
            if line.is_empty() {
                // A blank line ends the set
                break;
            }
            if let Err(problem) = data.parse_line(line) {
                log::debug!("Skipping Showdown line {line:?}: {problem}");
                problems.push(problem);
            }
        }
        (data, problems)
    }

    fn parse_species_line(&mut self, line: &str) {
        let (rest, item) = match line.rsplit_once(" @ ") {
            Some((rest, item)) => (rest.trim(), Some(item.trim().to_owned())),
            None => (line, None),
        };
        let (rest, gender) = if let Some(rest) = rest.strip_suffix(" (M)") {
            (rest, Some(Gender::Male))
        } else if let Some(rest) = rest.strip_suffix(" (F)") {
            (rest, Some(Gender::Female))
        } else {
            (rest, None)
        };
        let (nickname, species) = match rest.strip_suffix(')').and_then(|rest| rest.rsplit_once(" (")) {
            Some((nickname, species)) => (Some(nickname.trim().to_owned()), species.trim()),
            None => (None, rest.trim()),
        };
        *self.species.value_mut() = species.to_owned();
        *self.nickname.value_mut() = nickname;
        *self.gender.value_mut() = gender;
        *self.item.value_mut() = item;
    }

    fn parse_line(&mut self, line: &str) -> Result<(), String> {
        if let Some(name) = line.strip_prefix('-') {
            self.moves.value_mut().push(name.trim().to_owned());
            return Ok(());
        }
        if let Some(nature) = line.strip_suffix(" Nature") {
            let nature = Nature::from_name(nature).ok_or_else(|| format!("unknown nature \"{nature}\""))?;
            *self.nature.value_mut() = Some(nature);
            return Ok(());
        }
        let Some((key, value)) = line.split_once(':') else {
            return Err(format!("unrecognized line \"{line}\""));
        };
        let value = value.trim();
        let number = || value.parse::<u64>().map_err(|_| format!("\"{value}\" is not a number"));
        match key.trim() {
            "Ability" => *self.ability.value_mut() = Some(value.to_owned()),
            "Level" => self.level.set(number()?).map_err(|err| format!("level: {err}"))?,
            "Happiness" => self.happiness.set(number()?).map_err(|err| format!("happiness: {err}"))?,
            "Shiny" => *self.shiny.value_mut() = value.eq_ignore_ascii_case("Yes"),
            "Gigantamax" => *self.gigantamax.value_mut() = value.eq_ignore_ascii_case("Yes"),
            "EVs" => parse_stats(value, &mut self.evs).map_err(|err| format!("EVs: {err}"))?,
            "IVs" => parse_stats(value, &mut self.ivs).map_err(|err| format!("IVs: {err}"))?,
            key => return Err(format!("unsupported line \"{key}\"")),
        }
        Ok(())
    }
}

/// Applies a `252 Atk / 4 SpD` list. Every entry is checked before any is
/// written.
fn parse_stats(list: &str, stats: &mut MemoryArrayField) -> Result<(), String> {
    let mut values = stats.get_all();
    for entry in list.split('/') {
        let entry = entry.trim();
        let (value, name) = entry
            .split_once(' ')
            .ok_or_else(|| format!("\"{entry}\" is not a stat"))?;
        let idx = STAT_ABBREVIATIONS
            .iter()
            .position(|abbreviation| abbreviation.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| format!("unknown stat \"{name}\""))?;
        values[idx] = value
            .parse()
            .map_err(|_| format!("\"{value}\" is not a number"))?;
    }
    stats.set_all(&values).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn species_line_variants() {
        let (data, problems) = ShowdownData::parse("Ziggy (Zigzagoon) (F) @ Silk Scarf\n");
        assert!(problems.is_empty());
        assert_eq!(data.species.get(), "Zigzagoon");
        assert_eq!(data.nickname.get().as_deref(), Some("Ziggy"));
        assert_eq!(data.gender.get(), Some(Gender::Female));
        assert_eq!(data.item.get().as_deref(), Some("Silk Scarf"));

        let (data, _) = ShowdownData::parse("Mr. Mime (M)");
        assert_eq!(data.species.get(), "Mr. Mime");
        assert_eq!(data.nickname.get(), None);
    }

    #[test]
    fn defaults_are_suppressed() {
        let mut data = ShowdownData::new();
        data.species.set(String::from("Unown-B")).unwrap();
        data.moves.set(vec![String::from("Hidden Power")]).unwrap();
        assert_eq!(data.to_text(), "Unown-B\n- Hidden Power\n");
    }

    #[test]
    fn out_of_range_stats_are_reported() {
        let (data, problems) = ShowdownData::parse("Zigzagoon\nEVs: 300 Atk\nIVs: 0 Spe\nTera Type: Normal\n");
        assert_eq!(problems.len(), 2);
        assert_eq!(data.evs.get_all(), vec![0; 6]);
        assert_eq!(data.ivs.get_all(), vec![31, 31, 31, 31, 31, 0]);
    }
}
