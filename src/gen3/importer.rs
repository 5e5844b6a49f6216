use num_traits::FromPrimitive;

use crate::alert::Alert;
use crate::dex::{DexCategory, DexIndex, SharedDex, SpeciesInfo};
use crate::error::{PortError, PortResult};
use crate::field::{Field, LambdaField};
use crate::pku::{CatchInfo, ContestStats, EggInfo, GameInfo, Pku, PkuMove, Pokerus, StatValues};
use crate::porter::{Phase, Port, PortContext, Porter, Schedule};
use crate::settings::PortSettings;
use crate::types::{Game, Gender, Language, Marking, Nature};

use super::charset::Charset;
use super::layout::{self, STAT_SLOTS};
use super::pid;
use super::ribbons;
use super::{Pk3Data, FORMAT};

/// Reads a pk3 back into a pku.
pub struct Pk3Importer {
    raw: Vec<u8>,
    dex: SharedDex,
    data: Pk3Data,
    info: Option<SpeciesInfo>,
    pku: Pku,
}

impl Pk3Importer {
    /// `raw` is the pk3 as stored on disk, encrypted and shuffled.
    pub fn new(raw: &[u8], dex: SharedDex) -> Self {
        Pk3Importer {
            raw: raw.to_vec(),
            dex,
            data: Pk3Data::new(false),
            info: None,
            pku: Pku::default(),
        }
    }

    pub fn port(raw: &[u8], dex: SharedDex, settings: PortSettings) -> PortResult<Port<Self>> {
        Port::new(Pk3Importer::new(raw, dex), settings)
    }

    fn key_of(&self, category: DexCategory, index: u64) -> Option<String> {
        self.dex.key_of(category, FORMAT, &DexIndex::Int(index as i64))
    }

    fn decrypt(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        let (data, checksum_ok) = Pk3Data::from_pk3(&self.raw)?;
        if !checksum_ok {
            ctx.error(Some(Alert::new(
                "Checksum",
                "This pk3's checksum doesn't match its data, it may be corrupted.",
            )));
        }
        if data.get(layout::IS_BAD_EGG) != 0 {
            ctx.warn(Some(Alert::new("Bad Egg", "This pk3 is flagged as a bad egg.")));
        }
        self.data = data;
        Ok(())
    }

    fn species(&mut self, _ctx: &mut PortContext<Self>) -> PortResult<()> {
        let index = self.data.get(layout::SPECIES);
        let name = self
            .key_of(DexCategory::Species, index)
            .ok_or_else(|| PortError::Infeasible(format!("species #{index} doesn't exist in Gen 3")))?;
        self.info = self.dex.species_info(&name, None);
        self.pku.species = Some(name);
        Ok(())
    }

    fn trainer(&mut self, _ctx: &mut PortContext<Self>) -> PortResult<()> {
        self.pku.tid = Some(self.data.get(layout::TID) as i64);
        self.pku.sid = Some(self.data.get(layout::SID) as i64);
        let gender = Gender::from_u64(self.data.get(layout::OT_GENDER)).unwrap_or(Gender::Male);
        self.pku.ot_gender = Some(gender.name().to_owned());
        Ok(())
    }

    /// Everything the games derive from the PID.
    fn personality(&mut self, _ctx: &mut PortContext<Self>) -> PortResult<()> {
        let personality = self.data.personality_value();
        let tid = self.data.get(layout::TID) as u16;
        let sid = self.data.get(layout::SID) as u16;
        self.pku.pid = Some(personality as i64);

        let nature = LambdaField::read_only(|| pid::nature(personality) as u64);
        let shiny = LambdaField::read_only(|| pid::is_shiny(personality, tid, sid) as u64);
        self.pku.nature = Nature::from_u64(nature.get()).map(|nature| nature.name().to_owned());
        self.pku.shiny = Some(shiny.get() != 0);

        if let Some(info) = &self.info {
            let gender = info.gender_ratio.gender_of(personality);
            self.pku.gender = Some(gender.name().to_owned());
        }
        let unown = self
            .pku
            .species
            .as_deref()
            .is_some_and(|species| species.eq_ignore_ascii_case("Unown"));
        if unown {
            let form = LambdaField::read_only(|| pid::unown_form(personality) as u64);
            self.pku.form = pid::unown_letter(form.get() as u8).map(String::from);
        }
        Ok(())
    }

    fn names(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        let byte = self.data.get(layout::LANGUAGE);
        let language = Language::from_u64(byte);
        if language.is_none() && byte != 0 {
            ctx.warn(Some(Alert::new(
                "Language",
                format!("This pk3's language byte ({byte}) is not a known language."),
            )));
        }
        let charset = Charset::for_language(language);
        let egg = self.data.get(layout::IS_EGG) != 0;

        let nickname_charset = if self.data.get(layout::USE_EGG_NAME) != 0 {
            Charset::Japanese
        } else {
            charset
        };
        let nickname = nickname_charset.decode(self.data.bytes(layout::NICKNAME, layout::NICKNAME_BYTES));
        let ot = charset.decode(self.data.bytes(layout::OT_NAME, layout::OT_NAME_BYTES));

        if !egg {
            let default_name = self.pku.species.as_deref().map(str::to_uppercase);
            self.pku.nickname_flag = Some(default_name.as_deref() != Some(nickname.as_str()));
            self.pku.nickname = Some(nickname);
        }
        if !ot.is_empty() {
            self.pku.ot = Some(ot);
        }
        self.pku.egg_info = egg.then_some(EggInfo { is_egg: Some(true) });
        let game_info = self.pku.game_info.get_or_insert_with(GameInfo::default);
        game_info.language = language.map(|language| language.name().to_owned());
        Ok(())
    }

    fn growth(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        let exp = self.data.get(layout::EXP);
        self.pku.exp = Some(exp as i64);
        if let Some(info) = &self.info {
            self.pku.level = Some(info.growth_rate.level_at_exp(exp.min(u32::MAX as u64) as u32) as i64);
        }

        let item = self.data.get(layout::ITEM);
        if item != 0 {
            self.pku.item = self.key_of(DexCategory::Item, item);
            if self.pku.item.is_none() {
                ctx.warn(Some(Alert::new("Item", format!("Item #{item} is not in the dex, it was dropped."))));
            }
        }
        self.pku.friendship = Some(self.data.get(layout::FRIENDSHIP) as i64);

        let slot = self.data.get(layout::ABILITY_SLOT) as usize;
        self.pku.ability = self.info.as_ref().and_then(|info| {
            info.abilities
                .get(slot)
                .or_else(|| info.abilities.first())
                .cloned()
        });
        Ok(())
    }

    fn moves(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        let indices = self.data.get_all(layout::MOVES);
        let pp_ups = self.data.get_all(layout::PP_UPS);
        let mut moves = Vec::new();
        for (index, ups) in indices.into_iter().zip(pp_ups) {
            if index == 0 {
                continue;
            }
            match self.key_of(DexCategory::Move, index) {
                Some(name) => moves.push(PkuMove {
                    name: Some(name),
                    pp_ups: Some(ups as i64),
                }),
                None => ctx.warn(Some(Alert::new(
                    "Moves",
                    format!("Move #{index} is not in the dex, it was dropped."),
                ))),
            }
        }
        self.pku.moves = Some(moves);
        Ok(())
    }

    fn stats(&mut self, _ctx: &mut PortContext<Self>) -> PortResult<()> {
        let from_pk3_order = |values: Vec<u64>| {
            let mut ordered = [None; 6];
            for (idx, slot) in STAT_SLOTS.iter().enumerate() {
                ordered[idx] = values.get(*slot).map(|value| *value as i64);
            }
            ordered
        };
        self.pku.ivs = Some(StatValues::from_array(from_pk3_order(self.data.get_all(layout::IVS))));
        self.pku.evs = Some(StatValues::from_array(from_pk3_order(self.data.get_all(layout::EVS))));

        let contest = self.data.get_all(layout::CONTEST);
        if contest.iter().any(|value| *value != 0) {
            let mut values = [None; 6];
            for (slot, value) in values.iter_mut().zip(contest) {
                *slot = Some(value as i64);
            }
            self.pku.contest_stats = Some(ContestStats::from_array(values));
        }

        let strain = self.data.get(layout::POKERUS_STRAIN);
        let days = self.data.get(layout::POKERUS_DAYS);
        if strain != 0 || days != 0 {
            self.pku.pokerus = Some(Pokerus {
                strain: Some(strain as i64),
                days: Some(days as i64),
            });
        }
        Ok(())
    }

    fn catch_info(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        let location = self.data.get(layout::MET_LOCATION);
        let met_location = self.key_of(DexCategory::Location, location);
        if met_location.is_none() {
            log::debug!("Met location #{location} is not in the dex");
        }
        let ball = self.data.get(layout::BALL);
        let ball_name = self.key_of(DexCategory::Ball, ball);
        if ball_name.is_none() {
            ctx.warn(Some(Alert::new("Ball", format!("Ball #{ball} is not in the dex, it was dropped."))));
        }
        self.pku.catch_info = Some(CatchInfo {
            ball: ball_name,
            met_location,
            met_level: Some(self.data.get(layout::MET_LEVEL) as i64),
            fateful_encounter: Some(self.data.get(layout::FATEFUL_ENCOUNTER) != 0),
        });

        let game = self.data.get(layout::ORIGIN_GAME);
        let game_info = self.pku.game_info.get_or_insert_with(GameInfo::default);
        game_info.origin_game = Game::from_u64(game).map(|game| game.name().to_owned());
        if game_info.origin_game.is_none() {
            ctx.warn(Some(Alert::new(
                "Origin Game",
                format!("This pk3's origin game ({game}) is not a known Gen 3 game."),
            )));
        }
        Ok(())
    }

    fn ribbons_and_markings(&mut self, _ctx: &mut PortContext<Self>) -> PortResult<()> {
        let ranks = self.data.get_all(layout::CONTEST_RIBBONS);
        let flags = self.data.get_all(layout::RIBBON_FLAGS);
        let ribbons: Vec<String> = ribbons::unpack(&ranks, &flags)
            .iter()
            .map(ribbons::Ribbon::name)
            .collect();
        if !ribbons.is_empty() {
            self.pku.ribbons = Some(ribbons);
        }

        let markings: Vec<String> = Marking::ALL
            .iter()
            .zip(self.data.get_all(layout::MARKINGS))
            .filter(|(_, set)| *set != 0)
            .map(|(marking, _)| marking.name().to_owned())
            .collect();
        if !markings.is_empty() {
            self.pku.markings = Some(markings);
        }
        Ok(())
    }
}

impl Porter for Pk3Importer {
    type Output = Pku;

    const FORMAT: &'static str = FORMAT;

    fn can_port(&self) -> PortResult<()> {
        let (data, _) = Pk3Data::from_pk3(&self.raw)?;
        let index = data.get(layout::SPECIES);
        if index == 0 || data.get(layout::HAS_SPECIES) == 0 {
            return Err(PortError::Infeasible(String::from("this pk3 is an empty slot")));
        }
        match self.key_of(DexCategory::Species, index) {
            Some(_) => Ok(()),
            None => Err(PortError::Infeasible(format!(
                "species #{index} doesn't exist in Gen 3"
            ))),
        }
    }

    fn schedule(&self) -> Schedule<Self> {
        let mut schedule = Schedule::new();
        schedule.run(Phase::PreProcessing, "Decrypt", Self::decrypt);
        schedule.run(Phase::FirstPass, "Species", Self::species);
        schedule.run(Phase::FirstPass, "Trainer", Self::trainer);
        schedule
            .run(Phase::FirstPass, "PID", Self::personality)
            .after(&["Species"]);
        schedule
            .run(Phase::FirstPass, "Names", Self::names)
            .after(&["Species"]);
        schedule
            .run(Phase::FirstPass, "Growth", Self::growth)
            .after(&["Species"]);
        schedule.run(Phase::FirstPass, "Moves", Self::moves);
        schedule.run(Phase::FirstPass, "Stats", Self::stats);
        schedule.run(Phase::FirstPass, "Catch Info", Self::catch_info);
        schedule.run(Phase::FirstPass, "Ribbons", Self::ribbons_and_markings);
        schedule
    }

    fn output(&mut self) -> PortResult<Pku> {
        Ok(std::mem::take(&mut self.pku))
    }
}
