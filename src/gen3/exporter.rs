use crate::alert::{invalid_alert, unspecified_alert, Alert, ChoiceAlert, ChoiceOption, Prompt};
use crate::byte_override::{ByteOverrideCommand, Remap};
use crate::choice::{candidate, ChoiceResolver};
use crate::dex::{DexCategory, DexIndex, GrowthRate, SharedDex, SpeciesInfo};
use crate::error::{PortError, PortResult};
use crate::pku::Pku;
use crate::porter::{Phase, Port, PortContext, Porter, Schedule};
use crate::settings::PortSettings;
use crate::tags::lists::named_list;
use crate::tags::moves::move_set;
use crate::tags::numeric::{dex_entry, named, numeric, optional_numeric};
use crate::tags::stats::{multi_stat, StatLimits};
use crate::tags::text::text;
use crate::tags::Outcome;
use crate::types::{Game, Gender, Language, Marking, Nature, CONTEST_STAT_NAMES, STAT_NAMES};

use super::charset::{nickname_len, ot_name_len, Charset};
use super::layout::{self, STAT_SLOTS};
use super::pid::{self, PidTraits};
use super::ribbons::{self, Ribbon};
use super::{physical_index, Pk3Data, FORMAT};

const EGG_NAME: &str = "タマゴ";
const GEN3_LANGUAGES: [Language; 6] = [
    Language::Japanese,
    Language::English,
    Language::French,
    Language::Italian,
    Language::German,
    Language::Spanish,
];
/// Species that only obey with the fateful encounter flag set.
const EVENT_SPECIES: [&str; 2] = ["Mew", "Deoxys"];

struct Species {
    name: String,
    index: u16,
    info: SpeciesInfo,
}

/// Nickname and OT name as they will be written for one language.
#[derive(Debug, Clone)]
struct EncodedNames {
    language: Option<Language>,
    egg: bool,
    nickname: Vec<u8>,
    ot: Vec<u8>,
    nickname_lossy: bool,
    ot_lossy: bool,
    alert: Option<Alert>,
}

impl EncodedNames {
    fn encode(language: Option<Language>, nickname: &str, ot: &str, egg: bool) -> PortResult<Self> {
        let charset = Charset::for_language(language);
        let nickname = if egg {
            Outcome::clean(String::from(EGG_NAME))
        } else {
            text("Nickname", nickname, nickname_len(charset), |c| charset.can_encode(c))?
        };
        let ot = text("OT", ot, ot_name_len(charset), |c| charset.can_encode(c))?;
        let nickname_charset = if egg { Charset::Japanese } else { charset };
        Ok(EncodedNames {
            language,
            egg,
            nickname: nickname_charset.encode(&nickname.value, layout::NICKNAME_BYTES),
            ot: charset.encode(&ot.value, layout::OT_NAME_BYTES),
            nickname_lossy: !nickname.kind.is_empty(),
            ot_lossy: !ot.kind.is_empty(),
            alert: Alert::fold([nickname.alert, ot.alert]),
        })
    }

    fn preview(&self) -> String {
        let charset = Charset::for_language(self.language);
        let nickname_charset = if self.egg { Charset::Japanese } else { charset };
        format!(
            "Nickname: {}\nOT: {}",
            nickname_charset.decode(&self.nickname),
            charset.decode(&self.ot)
        )
    }
}

/// Writes a pku into a pk3.
pub struct Pk3Exporter {
    pku: Pku,
    dex: SharedDex,
    data: Pk3Data,
    species: Option<Species>,
    tid: u16,
    sid: u16,
    pid_traits: PidTraits,
    level: u8,
    ot_cleared: bool,
    remediations: Vec<(String, ByteOverrideCommand)>,
    output: Option<Vec<u8>>,
}

impl Pk3Exporter {
    /// Works on a copy of `pku`; the caller's record is left alone.
    pub fn new(pku: &Pku, dex: SharedDex, party: bool) -> Self {
        Pk3Exporter {
            pku: pku.clone(),
            dex,
            data: Pk3Data::new(party),
            species: None,
            tid: 0,
            sid: 0,
            pid_traits: PidTraits::default(),
            level: 1,
            ot_cleared: false,
            remediations: Vec::new(),
            output: None,
        }
    }

    /// Builds the exporter and its port in one go, using the party layout
    /// when the settings ask for it.
    pub fn port(pku: &Pku, dex: SharedDex, settings: PortSettings) -> PortResult<Port<Self>> {
        let exporter = Pk3Exporter::new(pku, dex, settings.pk3_party_format);
        Port::new(exporter, settings)
    }

    /// The unencrypted record as written so far, in canonical order.
    pub fn data(&self) -> &Pk3Data {
        &self.data
    }

    fn species(&self) -> PortResult<&Species> {
        self.species.as_ref().ok_or_else(|| PortError::MissingValue {
            tag: String::from("Species"),
            phase: Phase::PreProcessing,
        })
    }

    fn growth_rate(&self) -> GrowthRate {
        self.species
            .as_ref()
            .map(|species| species.info.growth_rate)
            .unwrap_or(GrowthRate::MediumFast)
    }

    fn format_overrides(&mut self, _ctx: &mut PortContext<Self>) -> PortResult<()> {
        self.pku = self.pku.with_format_override(FORMAT)?;
        Ok(())
    }

    fn write_species(&mut self, _ctx: &mut PortContext<Self>) -> PortResult<()> {
        let name = self
            .pku
            .species
            .clone()
            .ok_or_else(|| PortError::Infeasible(String::from("this pku has no species")))?;
        let form = self.pku.form.clone();
        let index = species_index(&self.dex, &name, form.as_deref())?;
        let info = self
            .dex
            .species_info(&name, form.as_deref())
            .ok_or_else(|| PortError::Infeasible(format!("the dex has no data for {name}")))?;
        self.data.set("Species", layout::SPECIES, index as u64)?;
        self.data.set("Species", layout::HAS_SPECIES, 1)?;
        log::debug!("Exporting {name} (#{index}) to {FORMAT}");
        self.species = Some(Species { name, index, info });
        Ok(())
    }

    fn trainer_id(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        self.tid = numeric("TID", self.pku.tid, 0, u16::MAX as u64, 0)?.report(ctx) as u16;
        self.sid = numeric("SID", self.pku.sid, 0, u16::MAX as u64, 0)?.report(ctx) as u16;
        self.data.set("TID", layout::TID, self.tid as u64)?;
        self.data.set("SID", layout::SID, self.sid as u64)
    }

    fn nature(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        let Some(name) = self.pku.nature.as_deref() else {
            ctx.unspecified(Alert::new(
                "Nature",
                "No nature was specified, the nature will follow the PID.",
            ));
            return Ok(());
        };
        match Nature::from_name(name) {
            Some(nature) => self.pid_traits.nature = Some(nature),
            None => ctx.warn(Some(Alert::new(
                "Nature",
                format!("The nature \"{name}\" is invalid, the nature will follow the PID instead."),
            ))),
        }
        Ok(())
    }

    fn gender(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        let Some(name) = self.pku.gender.clone() else {
            return Ok(());
        };
        let ratio = self.species()?.info.gender_ratio;
        match Gender::from_name(&name) {
            None => ctx.warn(Some(Alert::new(
                "Gender",
                format!("The gender \"{name}\" is invalid, the gender will follow the PID instead."),
            ))),
            Some(gender) if !ratio.permits(gender) => {
                let actual = ratio
                    .fixed()
                    .map(|fixed| format!("this species is always {}", fixed.name().to_lowercase()))
                    .unwrap_or_else(|| String::from("this species is never genderless"));
                ctx.warn(Some(Alert::new(
                    "Gender",
                    format!("This pku's gender is {}, but {actual}.", gender.name().to_lowercase()),
                )));
            }
            // Fixed genders don't depend on the PID
            Some(_) if ratio.fixed().is_some() => {}
            Some(gender) => self.pid_traits.gender = Some((ratio, gender)),
        }
        Ok(())
    }

    fn shiny(&mut self, _ctx: &mut PortContext<Self>) -> PortResult<()> {
        self.pid_traits.shiny = self.pku.shiny;
        Ok(())
    }

    fn form(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        let species = self.species()?;
        if !species.name.eq_ignore_ascii_case("Unown") {
            return Ok(());
        }
        let Some(form) = self.pku.form.clone() else {
            return Ok(());
        };
        match pid::unown_form_index(&form) {
            Some(index) => self.pid_traits.unown_form = Some(index),
            None => ctx.warn(Some(invalid_alert("Form", &form, "the form the PID gives"))),
        }
        Ok(())
    }

    fn ability(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        let abilities = self.species()?.info.abilities.clone();
        let default = abilities.first().cloned().unwrap_or_else(|| String::from("the first ability"));
        let slot = match self.pku.ability.as_deref() {
            None => {
                ctx.unspecified(unspecified_alert("Ability", &default));
                0
            }
            Some(name) => match abilities.iter().position(|ability| ability.eq_ignore_ascii_case(name)) {
                // Gen 3 stores one bit, so only the first two abilities fit
                Some(slot) if slot > 1 => {
                    ctx.warn(Some(Alert::new(
                        "Ability",
                        format!("The ability \"{name}\" doesn't exist in Gen 3, using the default: {default}."),
                    )));
                    0
                }
                Some(slot) => slot,
                None => {
                    ctx.warn(Some(invalid_alert("Ability", name, &default)));
                    0
                }
            },
        };
        self.data.set("Ability", layout::ABILITY_SLOT, slot as u64)
    }

    fn experience(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        let growth = self.growth_rate();
        let max_exp = growth.max_exp() as u64;
        let commit = |porter: &mut Self, exp: u32| -> PortResult<()> {
            porter.data.set("Experience", layout::EXP, exp as u64)?;
            porter.level = porter.growth_rate().level_at_exp(exp) as u8;
            Ok(())
        };

        let resolver = match (self.pku.level, self.pku.exp) {
            (None, None) => {
                ctx.unspecified(Alert::new(
                    "Experience",
                    "No level or EXP was specified, using the default: level 1.",
                ));
                ChoiceResolver::single("Experience", || 0, commit)
            }
            (None, Some(_)) => {
                let exp = numeric("EXP", self.pku.exp, 0, max_exp, 0)?.report(ctx) as u32;
                ChoiceResolver::single("Experience", move || exp, commit)
            }
            (Some(_), None) => {
                let level = numeric("Level", self.pku.level, 1, 100, 1)?.report(ctx) as u32;
                let exp = growth.exp_at_level(level);
                ChoiceResolver::single("Experience", move || exp, commit)
            }
            (Some(_), Some(_)) => {
                let level = numeric("Level", self.pku.level, 1, 100, 1)?.report(ctx) as u32;
                let exp = numeric("EXP", self.pku.exp, 0, max_exp, 0)?.report(ctx) as u32;
                let exp_level = growth.level_at_exp(exp);
                if exp_level == level {
                    ChoiceResolver::single("Experience", move || exp, commit)
                } else {
                    let level_exp = growth.exp_at_level(level);
                    let prompt = Prompt::Choice(ChoiceAlert::new(
                        Alert::new(
                            "Experience",
                            format!("This pku's EXP ({exp}) doesn't match its level ({level})."),
                        ),
                        vec![
                            ChoiceOption::new("Use EXP", format!("Keep {exp} EXP, which is level {exp_level}.")),
                            ChoiceOption::new("Use Level", format!("Keep level {level}, which is {level_exp} EXP.")),
                        ],
                    ));
                    ChoiceResolver::new(
                        "Experience",
                        prompt,
                        vec![candidate(move || exp), candidate(move || level_exp)],
                        commit,
                    )?
                }
            }
        };
        ctx.add_choice(resolver);
        Ok(())
    }

    fn item(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        if self.pku.item.is_none() {
            return Ok(());
        }
        let index = dex_entry(
            "Item",
            self.pku.item.as_deref(),
            self.dex.as_ref(),
            DexCategory::Item,
            FORMAT,
            ("None", DexIndex::Int(0)),
        )
        .report(ctx);
        let index = index.as_int().filter(|index| (0..=u16::MAX as i64).contains(index)).unwrap_or(0);
        self.data.set("Item", layout::ITEM, index as u64)
    }

    fn friendship(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        let default = self.species()?.info.base_friendship.unwrap_or(70) as u64;
        let friendship = numeric("Friendship", self.pku.friendship, 0, 255, default)?.report(ctx);
        self.data.set("Friendship", layout::FRIENDSHIP, friendship)
    }

    fn moves(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        let dex = self.dex.clone();
        let lookup = |name: &str| {
            dex.index_of(DexCategory::Move, name, FORMAT)
                .filter(|index| index.as_int().is_some_and(|index| (1..=u16::MAX as i64).contains(&index)))
        };
        let slots = move_set(self.pku.moves.as_deref(), 4, lookup, DexIndex::Int(0)).report(ctx);

        let mut indices = [0u64; 4];
        let mut pp_ups = [0u64; 4];
        let mut pp = [0u64; 4];
        for (idx, slot) in slots.iter().enumerate() {
            let Some(name) = slot.name.as_deref() else {
                continue;
            };
            indices[idx] = slot.index.as_int().unwrap_or(0) as u64;
            pp_ups[idx] = optional_numeric("PP Ups", slot.pp_ups, 0, 3, 0)?.report(ctx);
            let base = dex.move_base_pp(name).unwrap_or(0) as u64;
            pp[idx] = base * (5 + pp_ups[idx]) / 5;
        }
        self.data.set_all("Moves", layout::MOVES, &indices)?;
        self.data.set_all("PP Ups", layout::PP_UPS, &pp_ups)?;
        self.data.set_all("PP", layout::PP, &pp)
    }

    fn ivs(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        let raw = self.pku.ivs.as_ref().map(|ivs| ivs.to_array()).unwrap_or([None; 6]);
        let limits = StatLimits {
            min: 0,
            max: 31,
            default: 0,
        };
        let outcome = multi_stat("IVs", "IV", &STAT_NAMES, raw, limits, ctx.settings().alert_unspecified);
        let ivs = outcome.report(ctx);
        self.data.set_all("IVs", layout::IVS, &to_pk3_order(ivs))
    }

    fn evs(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        let raw = self.pku.evs.as_ref().map(|evs| evs.to_array()).unwrap_or([None; 6]);
        let limits = StatLimits {
            min: 0,
            max: 255,
            default: 0,
        };
        let outcome = multi_stat("EVs", "EV", &STAT_NAMES, raw, limits, ctx.settings().alert_unspecified);
        let evs = outcome.report(ctx);
        self.data.set_all("EVs", layout::EVS, &to_pk3_order(evs))
    }

    fn contest_stats(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        let Some(stats) = self.pku.contest_stats.as_ref() else {
            return Ok(());
        };
        let limits = StatLimits {
            min: 0,
            max: 255,
            default: 0,
        };
        let outcome = multi_stat(
            "Contest Stats",
            "contest stat",
            &CONTEST_STAT_NAMES,
            stats.to_array(),
            limits,
            false,
        );
        let values = outcome.report(ctx);
        self.data.set_all("Contest Stats", layout::CONTEST, &values)
    }

    fn pokerus(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        let Some(pokerus) = self.pku.pokerus.clone() else {
            return Ok(());
        };
        let strain = optional_numeric("Pokérus Strain", pokerus.strain, 0, 15, 0)?.report(ctx);
        let days = optional_numeric("Pokérus Days", pokerus.days, 0, 15, 0)?.report(ctx);
        self.data.set("Pokérus", layout::POKERUS_STRAIN, strain)?;
        self.data.set("Pokérus", layout::POKERUS_DAYS, days)
    }

    fn met_location(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        let index = dex_entry(
            "Met Location",
            self.pku.met_location(),
            self.dex.as_ref(),
            DexCategory::Location,
            FORMAT,
            ("None", DexIndex::Int(0)),
        )
        .report(ctx);
        let index = index.as_int().filter(|index| (0..=255).contains(index)).unwrap_or(0);
        self.data.set("Met Location", layout::MET_LOCATION, index as u64)
    }

    fn met_level(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        let level = numeric("Met Level", self.pku.met_level(), 0, 100, 0)?.report(ctx);
        self.data.set("Met Level", layout::MET_LEVEL, level)
    }

    fn origin_game(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        let game = named("Origin Game", self.pku.origin_game(), Game::from_name, Game::Emerald).report(ctx);
        self.data.set("Origin Game", layout::ORIGIN_GAME, game as u64)
    }

    fn ball(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        let index = dex_entry(
            "Ball",
            self.pku.ball(),
            self.dex.as_ref(),
            DexCategory::Ball,
            FORMAT,
            ("Poké Ball", DexIndex::Int(4)),
        )
        .report(ctx);
        let index = index.as_int().filter(|index| (1..=15).contains(index)).unwrap_or(4);
        self.data.set("Ball", layout::BALL, index as u64)
    }

    fn ot_gender(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        let parse = |name: &str| Gender::from_name(name).filter(|gender| *gender != Gender::Genderless);
        let gender = named("OT Gender", self.pku.ot_gender.as_deref(), parse, Gender::Male).report(ctx);
        self.data.set("OT Gender", layout::OT_GENDER, gender as u64)
    }

    fn ribbons(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        let ribbons = named_list("Ribbons", self.pku.ribbons.as_deref(), Ribbon::from_name).report(ctx);
        let (ranks, flags) = ribbons::pack(&ribbons);
        self.data.set_all("Ribbons", layout::CONTEST_RIBBONS, &ranks)?;
        self.data.set_all("Ribbons", layout::RIBBON_FLAGS, &flags)
    }

    fn markings(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        let markings = named_list("Markings", self.pku.markings.as_deref(), Marking::from_name).report(ctx);
        let flags: Vec<u64> = Marking::ALL
            .iter()
            .map(|marking| markings.contains(marking) as u64)
            .collect();
        self.data.set_all("Markings", layout::MARKINGS, &flags)
    }

    fn egg(&mut self, _ctx: &mut PortContext<Self>) -> PortResult<()> {
        let egg = self.pku.is_egg() as u64;
        self.data.set("Egg", layout::IS_EGG, egg)?;
        self.data.set("Egg", layout::USE_EGG_NAME, egg)
    }

    fn fateful_encounter(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        let species = self.species()?.name.clone();
        let event_species = EVENT_SPECIES.iter().any(|name| name.eq_ignore_ascii_case(&species));
        let flag = self.pku.fateful_encounter().unwrap_or(false);
        let commit = |porter: &mut Self, flag: bool| porter.data.set("Fateful Encounter", layout::FATEFUL_ENCOUNTER, flag as u64);

        let resolver = if flag && !event_species {
            let prompt = Prompt::Choice(ChoiceAlert::new(
                Alert::new(
                    "Fateful Encounter",
                    "This pku has the fateful encounter flag set. In Gen 3 it only matters to Mew and Deoxys.",
                ),
                vec![
                    ChoiceOption::new("Keep the flag", "Write the flag anyway."),
                    ChoiceOption::new("Clear the flag", "Leave the flag out of the pk3."),
                ],
            ));
            ChoiceResolver::new(
                "Fateful Encounter",
                prompt,
                vec![candidate(|| true), candidate(|| false)],
                commit,
            )?
        } else if !flag && event_species {
            let prompt = Prompt::Choice(ChoiceAlert::new(
                Alert::new(
                    "Fateful Encounter",
                    format!("This {species} doesn't have the fateful encounter flag, so it won't obey in Gen 3 games."),
                ),
                vec![
                    ChoiceOption::new("Leave it unset", "Keep the pku as it is."),
                    ChoiceOption::new("Set the flag", format!("Set the flag so the {species} obeys.")),
                ],
            ));
            ChoiceResolver::new(
                "Fateful Encounter",
                prompt,
                vec![candidate(|| false), candidate(|| true)],
                commit,
            )?
        } else {
            ChoiceResolver::single("Fateful Encounter", move || flag, commit)
        };
        ctx.add_choice(resolver);
        Ok(())
    }

    fn true_ot(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        if self.pku.true_ot != Some(false) || self.pku.ot.is_none() {
            return Ok(());
        }
        let prompt = Prompt::Choice(ChoiceAlert::new(
            Alert::new(
                "True OT",
                "This pku's OT is marked as not being its original trainer.",
            ),
            vec![
                ChoiceOption::new("Keep the OT", "Write the OT name as it is in the pku."),
                ChoiceOption::new("Clear the OT", "Leave the OT name blank."),
            ],
        ));
        let resolver = ChoiceResolver::new(
            "True OT",
            prompt,
            vec![candidate(|| false), candidate(|| true)],
            |porter: &mut Self, clear: bool| {
                porter.ot_cleared = clear;
                Ok(())
            },
        )?;
        ctx.add_choice(resolver);
        Ok(())
    }

    fn language(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        let egg = self.pku.is_egg();
        let nickname = match self.pku.nickname.clone() {
            Some(nickname) => nickname,
            None => {
                let default = self.species()?.name.to_uppercase();
                if !egg {
                    ctx.unspecified(unspecified_alert("Nickname", &default));
                }
                default
            }
        };
        let ot = self.pku.ot.clone().unwrap_or_else(|| {
            ctx.unspecified(Alert::new("OT", "No OT was specified, leaving it blank."));
            String::new()
        });
        let commit = |porter: &mut Self, names: PortResult<EncodedNames>| -> PortResult<()> {
            porter.commit_names(names?)
        };

        let declared = self.pku.language().map(|name| {
            Language::from_name(name)
                .filter(|language| GEN3_LANGUAGES.contains(language))
                .ok_or_else(|| name.to_owned())
        });
        let resolver = match declared {
            Some(Ok(language)) => {
                let names = EncodedNames::encode(Some(language), &nickname, &ot, egg)?;
                ctx.warn(names.alert.clone());
                ChoiceResolver::single("Language", move || Ok(names), commit)
            }
            declared => {
                if let Some(Err(name)) = declared {
                    ctx.warn(Some(Alert::new(
                        "Language",
                        format!("The language \"{name}\" doesn't exist in Gen 3."),
                    )));
                }
                self.language_choice(ctx, nickname, ot, egg, commit)?
            }
        };
        ctx.add_choice(resolver);
        Ok(())
    }

    /// One option per Gen 3 language that can hold both names, the default
    /// language first, then a catch-all "None".
    fn language_choice<C>(
        &self,
        ctx: &PortContext<Self>,
        nickname: String,
        ot: String,
        egg: bool,
        commit: C,
    ) -> PortResult<ChoiceResolver<Self, PortResult<EncodedNames>>>
    where
        C: FnOnce(&mut Self, PortResult<EncodedNames>) -> PortResult<()> + 'static,
    {
        let preferred = ctx.settings().default_language();
        let mut languages: Vec<Language> = GEN3_LANGUAGES.to_vec();
        languages.sort_by_key(|language| *language != preferred);

        let mut options = Vec::new();
        let mut candidates = Vec::new();
        for language in languages {
            let charset = Charset::for_language(Some(language));
            let nickname_fits = egg || nickname.chars().all(|c| charset.can_encode(c));
            if !nickname_fits || !ot.chars().all(|c| charset.can_encode(c)) {
                continue;
            }
            let names = EncodedNames::encode(Some(language), &nickname, &ot, egg)?;
            let mut message = names.preview();
            if let Some(alert) = &names.alert {
                message = format!("{message}\n\n{}", alert.message);
            }
            options.push(ChoiceOption::new(language.name(), message));
            let (nickname, ot) = (nickname.clone(), ot.clone());
            candidates.push(candidate(move || EncodedNames::encode(Some(language), &nickname, &ot, egg)));
        }

        let fallback = EncodedNames::encode(None, &nickname, &ot, egg)?;
        options.push(ChoiceOption::new(
            "None",
            format!(
                "Leave the language unset and write the names with the international characters.\n{}",
                fallback.preview()
            ),
        ));
        candidates.push(candidate(move || EncodedNames::encode(None, &nickname, &ot, egg)));

        let prompt = Prompt::Choice(ChoiceAlert::new(
            Alert::new(
                "Language",
                "This pku has no language, and Gen 3 encodes names differently per language. Pick the language to write.",
            ),
            options,
        ));
        ChoiceResolver::new("Language", prompt, candidates, commit)
    }

    fn commit_names(&mut self, names: EncodedNames) -> PortResult<()> {
        let language = names.language.map(|language| language as u64).unwrap_or(0);
        self.data.set("Language", layout::LANGUAGE, language)?;
        self.data.write_bytes(layout::NICKNAME, &names.nickname);
        if names.nickname_lossy {
            self.remediations.push((
                String::from("Nickname"),
                ByteOverrideCommand::byte_array(layout::NICKNAME, names.nickname.iter().map(|b| *b as u64).collect()),
            ));
        }
        if !self.ot_cleared {
            self.data.write_bytes(layout::OT_NAME, &names.ot);
            if names.ot_lossy {
                self.remediations.push((
                    String::from("OT"),
                    ByteOverrideCommand::byte_array(layout::OT_NAME, names.ot.iter().map(|b| *b as u64).collect()),
                ));
            }
        } else {
            self.data.write_bytes(layout::OT_NAME, &[super::charset::TERMINATOR; layout::OT_NAME_BYTES]);
        }
        Ok(())
    }

    /// Lists the names that didn't encode cleanly as byte overrides, so
    /// they can be patched by hand.
    fn text_remediation(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        for (tag, command) in std::mem::take(&mut self.remediations) {
            match command.validate(self.data.len(), None) {
                Ok(_) => ctx.add_remediation(&tag, command),
                Err(err) => ctx.error(Some(Alert::new(
                    "Byte Override",
                    format!("Could not build a byte override for the {tag}: {err}"),
                ))),
            }
        }
        Ok(())
    }

    fn pid(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        let traits = self.pid_traits;
        let (tid, sid) = (self.tid, self.sid);
        let seed = ((self.species()?.index as u32) << 16) ^ ((sid as u32) << 8) ^ tid as u32;
        let generate = move || generate_pid(traits, seed, tid, sid);
        let commit = |porter: &mut Self, pid: u32| porter.data.set("PID", layout::PID, pid as u64);

        let resolver = match self.pku.pid {
            Some(raw) if (0..=u32::MAX as i64).contains(&raw) => {
                let pid = raw as u32;
                let wrong = traits.mismatches(pid, tid, sid);
                if wrong.is_empty() {
                    ChoiceResolver::single("PID", move || pid, commit)
                } else {
                    let wrong = wrong.join(", ");
                    let prompt = Prompt::Choice(ChoiceAlert::new(
                        Alert::new(
                            "PID",
                            format!("This pku's PID doesn't agree with its {wrong}, which Gen 3 derives from the PID."),
                        ),
                        vec![
                            ChoiceOption::new("Keep PID", format!("Keep the PID {pid:#010x}, changing the {wrong}.")),
                            ChoiceOption::new("Generate PID", "Generate a PID that agrees with the pku, losing the original."),
                        ],
                    ));
                    ChoiceResolver::new("PID", prompt, vec![candidate(move || pid), candidate(generate)], commit)?
                        .with_text_entry("A PID of your own, in decimal or 0x-prefixed hex.", parse_pid)
                }
            }
            Some(raw) => {
                ctx.warn(Some(invalid_alert("PID", raw, "a generated one")));
                ChoiceResolver::single("PID", generate, commit)
            }
            None => {
                ctx.unspecified(Alert::new(
                    "PID",
                    "No PID was specified, generating one that agrees with the rest of the pku.",
                ));
                ChoiceResolver::single("PID", generate, commit)
            }
        };
        ctx.add_choice(resolver);
        Ok(())
    }

    fn party_stats(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        if !self.data.is_party() {
            return Ok(());
        }
        let level = self.level as u64;
        self.data.set("Level", layout::LEVEL, level)?;
        self.data.set("Status", layout::STATUS, 0)?;
        let days = self.data.get(layout::POKERUS_DAYS);
        self.data.set("Pokérus", layout::POKERUS_REMAINING, days)?;

        let Some(base) = self.species()?.info.base_stats else {
            ctx.warn(Some(Alert::new(
                "Stats",
                "The dex has no base stats for this species, its party stats are left at 0.",
            )));
            return Ok(());
        };
        let base = to_pk3_order(base.map(u64::from));
        let ivs = self.data.get_all(layout::IVS);
        let evs = self.data.get_all(layout::EVS);
        let nature = pid::nature(self.data.personality_value()) as usize;

        let stats: Vec<u64> = (0..6)
            .map(|slot| {
                let core = (2 * base[slot] + ivs[slot] + evs[slot] / 4) * level / 100;
                if slot == 0 {
                    // Shedinja always has 1 HP
                    return if base[0] == 1 { 1 } else { core + level + 10 };
                }
                let modifier = match (nature / 5 + 1 == slot, nature % 5 + 1 == slot) {
                    (true, false) => 110,
                    (false, true) => 90,
                    _ => 100,
                };
                (core + 5) * modifier / 100
            })
            .collect();
        self.data.set("Current HP", layout::CURRENT_HP, stats[0])?;
        self.data.set_all("Stats", layout::STATS, &stats)
    }

    fn encode(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        let overrides = self.pku.byte_overrides(FORMAT).to_vec();
        let pid = self.data.personality_value();
        let len = self.data.len();
        let mut rejected = Vec::new();
        let pk3 = self.data.to_pk3(|bytes| {
            let remap = move |idx: usize| physical_index(idx, pid, len);
            let remap: Remap<'_> = &remap;
            for command in &overrides {
                if let Err(err) = command.apply(bytes, Some(remap)) {
                    rejected.push(err.to_string());
                }
            }
        });
        for reason in rejected {
            ctx.error(Some(Alert::new(
                "Byte Override",
                format!("A byte override was not applied: {reason}"),
            )));
        }
        self.output = Some(pk3);
        Ok(())
    }
}

fn parse_pid(text: &str) -> Option<u32> {
    let text = text.trim();
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

fn species_index(dex: &SharedDex, name: &str, form: Option<&str>) -> PortResult<u16> {
    dex.species_index(name, form, FORMAT)
        .and_then(|index| index.as_int())
        .filter(|index| (1..=u16::MAX as i64).contains(index))
        .map(|index| index as u16)
        .ok_or_else(|| {
            let form = form.map(|form| format!(" ({form})")).unwrap_or_default();
            PortError::Infeasible(format!("{name}{form} doesn't exist in Gen 3"))
        })
}

/// Pku stat order to pk3 stat order.
fn to_pk3_order(values: [u64; 6]) -> [u64; 6] {
    let mut ordered = [0u64; 6];
    for (idx, value) in values.into_iter().enumerate() {
        ordered[STAT_SLOTS[idx]] = value;
    }
    ordered
}

/// Falls back to ignoring everything but shininess, then to the seed itself,
/// if no PID with every trait turns up.
fn generate_pid(traits: PidTraits, seed: u32, tid: u16, sid: u16) -> u32 {
    traits
        .generate(seed, tid, sid)
        .or_else(|| {
            log::warn!("No PID matches {traits:?}, keeping only shininess");
            PidTraits {
                shiny: traits.shiny,
                ..PidTraits::default()
            }
            .generate(seed, tid, sid)
        })
        .unwrap_or(seed)
}

impl Porter for Pk3Exporter {
    type Output = Vec<u8>;

    const FORMAT: &'static str = FORMAT;

    fn can_port(&self) -> PortResult<()> {
        let pku = self.pku.with_format_override(FORMAT)?;
        let name = pku
            .species
            .as_deref()
            .ok_or_else(|| PortError::Infeasible(String::from("this pku has no species")))?;
        species_index(&self.dex, name, pku.form.as_deref()).map(|_| ())
    }

    fn schedule(&self) -> Schedule<Self> {
        let mut schedule = Schedule::new();
        schedule.run(Phase::FormatOverride, "Format Overrides", Self::format_overrides);

        schedule.run(Phase::PreProcessing, "Species", Self::write_species);
        schedule.run(Phase::PreProcessing, "Trainer ID", Self::trainer_id);

        schedule.run(Phase::FirstPass, "Nature", Self::nature);
        schedule.run(Phase::FirstPass, "Gender", Self::gender);
        schedule.run(Phase::FirstPass, "Shiny", Self::shiny);
        schedule.run(Phase::FirstPass, "Form", Self::form);
        schedule.run(Phase::FirstPass, "Ability", Self::ability);
        schedule.run(Phase::FirstPass, "Experience", Self::experience);
        schedule.run(Phase::FirstPass, "Item", Self::item);
        schedule.run(Phase::FirstPass, "Friendship", Self::friendship);
        schedule.run(Phase::FirstPass, "Moves", Self::moves);
        schedule.run(Phase::FirstPass, "IVs", Self::ivs);
        schedule.run(Phase::FirstPass, "EVs", Self::evs);
        schedule.run(Phase::FirstPass, "Contest Stats", Self::contest_stats);
        schedule.run(Phase::FirstPass, "Pokérus", Self::pokerus);
        schedule.run(Phase::FirstPass, "Met Location", Self::met_location);
        schedule.run(Phase::FirstPass, "Met Level", Self::met_level);
        schedule.run(Phase::FirstPass, "Origin Game", Self::origin_game);
        schedule.run(Phase::FirstPass, "Ball", Self::ball);
        schedule.run(Phase::FirstPass, "OT Gender", Self::ot_gender);
        schedule.run(Phase::FirstPass, "Ribbons", Self::ribbons);
        schedule.run(Phase::FirstPass, "Markings", Self::markings);
        schedule.run(Phase::FirstPass, "Egg", Self::egg);
        schedule.run(Phase::FirstPass, "Fateful Encounter", Self::fateful_encounter);
        schedule.run(Phase::FirstPass, "True OT", Self::true_ot);
        schedule.run(Phase::FirstPass, "Language", Self::language);

        schedule.run(Phase::FirstPassStage2, "PID", Self::pid);

        schedule.resolve(Phase::SecondPass, "True OT");
        schedule.resolve(Phase::SecondPass, "Language").after(&["True OT"]);
        schedule
            .run(Phase::SecondPass, "Text Remediation", Self::text_remediation)
            .after(&["Language"]);
        schedule.resolve(Phase::SecondPass, "PID");
        schedule.resolve(Phase::SecondPass, "Experience");
        schedule.resolve(Phase::SecondPass, "Fateful Encounter");
        schedule
            .run(Phase::SecondPass, "Party Stats", Self::party_stats)
            .after(&["PID", "Experience"]);

        schedule.run(Phase::PostProcessing, "Encode", Self::encode);
        schedule
    }

    fn output(&mut self) -> PortResult<Vec<u8>> {
        self.output.take().ok_or(PortError::MissingValue {
            tag: String::from("pk3"),
            phase: Phase::PostProcessing,
        })
    }
}
