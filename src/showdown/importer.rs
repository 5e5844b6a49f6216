use crate::alert::Alert;
use crate::dex::{DexCategory, DexIndex, SharedDex};
use crate::error::{PortError, PortResult};
use crate::field::{ArrayField, Field};
use crate::pku::{Pku, PkuMove, StatValues};
use crate::porter::{Phase, Port, PortContext, Porter, Schedule};
use crate::settings::PortSettings;

use super::{ShowdownData, FORMAT};

/// Reads one Showdown set into a pku.
pub struct ShowdownImporter {
    text: String,
    dex: SharedDex,
    data: ShowdownData,
    pku: Pku,
}

impl ShowdownImporter {
    pub fn new(text: &str, dex: SharedDex) -> Self {
        ShowdownImporter {
            text: text.to_owned(),
            dex,
            data: ShowdownData::new(),
            pku: Pku::default(),
        }
    }

    pub fn port(text: &str, dex: SharedDex, settings: PortSettings) -> PortResult<Port<Self>> {
        Port::new(ShowdownImporter::new(text, dex), settings)
    }

    fn key_of(&self, category: DexCategory, name: &str) -> Option<String> {
        self.dex.key_of(category, FORMAT, &DexIndex::Str(name.to_owned()))
    }

    fn parse(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        let (data, problems) = ShowdownData::parse(&self.text);
        for problem in problems {
            ctx.warn(Some(Alert::new("Showdown", format!("A line was skipped: {problem}."))));
        }
        self.data = data;
        Ok(())
    }

    fn species(&mut self, _ctx: &mut PortContext<Self>) -> PortResult<()> {
        let showdown = self.data.species.get();
        let (species, form) = self
            .dex
            .species_key_of(FORMAT, &DexIndex::Str(showdown.clone()))
            .ok_or_else(|| PortError::Infeasible(format!("\"{showdown}\" is not a species the dex knows")))?;

        if let Some(gender) = self.data.gender.get() {
            self.pku.gender = Some(gender.name().to_owned());
        } else if let Some(info) = self.dex.species_info(&species, form.as_deref()) {
            self.pku.gender = info.gender_ratio.fixed().map(|gender| gender.name().to_owned());
        }
        match self.data.nickname.get() {
            Some(nickname) => {
                self.pku.nickname = Some(nickname);
                self.pku.nickname_flag = Some(true);
            }
            None => {
                self.pku.nickname = Some(species.clone());
                self.pku.nickname_flag = Some(false);
            }
        }
        self.pku.species = Some(species);
        self.pku.form = form;
        Ok(())
    }

    fn named_entries(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        if let Some(item) = self.data.item.get() {
            self.pku.item = self.key_of(DexCategory::Item, &item);
            if self.pku.item.is_none() {
                ctx.warn(Some(Alert::new("Item", format!("The item \"{item}\" is not in the dex."))));
            }
        }
        if let Some(ability) = self.data.ability.get() {
            self.pku.ability = self.key_of(DexCategory::Ability, &ability);
            if self.pku.ability.is_none() {
                ctx.warn(Some(Alert::new(
                    "Ability",
                    format!("The ability \"{ability}\" is not in the dex."),
                )));
            }
        }
        self.pku.nature = self.data.nature.get().map(|nature| nature.name().to_owned());
        Ok(())
    }

    fn numbers(&mut self, _ctx: &mut PortContext<Self>) -> PortResult<()> {
        self.pku.level = Some(self.data.level.get() as i64);
        self.pku.friendship = Some(self.data.happiness.get() as i64);
        self.pku.shiny = Some(self.data.shiny.get());
        if self.data.gigantamax.get() {
            self.pku.gigantamax_factor = Some(true);
        }

        let stats = |values: Vec<u64>| {
            let mut array = [None; 6];
            for (slot, value) in array.iter_mut().zip(values) {
                *slot = Some(value as i64);
            }
            StatValues::from_array(array)
        };
        self.pku.evs = Some(stats(self.data.evs.get_all()));
        self.pku.ivs = Some(stats(self.data.ivs.get_all()));
        Ok(())
    }

    fn moves(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        let mut moves = Vec::new();
        for name in self.data.moves.get() {
            match self.key_of(DexCategory::Move, &name) {
                Some(key) => moves.push(PkuMove::named(key)),
                None => ctx.warn(Some(Alert::new(
                    "Moves",
                    format!("The move \"{name}\" is not in the dex and was dropped."),
                ))),
            }
        }
        self.pku.moves = Some(moves);
        Ok(())
    }
}

impl Porter for ShowdownImporter {
    type Output = Pku;

    const FORMAT: &'static str = FORMAT;

    fn can_port(&self) -> PortResult<()> {
        let (data, _) = ShowdownData::parse(&self.text);
        let species = data.species.get();
        if species.is_empty() {
            return Err(PortError::Infeasible(String::from("the text holds no Showdown set")));
        }
        self.dex
            .species_key_of(FORMAT, &DexIndex::Str(species.clone()))
            .map(|_| ())
            .ok_or_else(|| PortError::Infeasible(format!("\"{species}\" is not a species the dex knows")))
    }

    fn schedule(&self) -> Schedule<Self> {
        let mut schedule = Schedule::new();
        schedule.run(Phase::PreProcessing, "Parse", Self::parse);
        schedule.run(Phase::FirstPass, "Species", Self::species);
        schedule.run(Phase::FirstPass, "Item, Ability and Nature", Self::named_entries);
        schedule.run(Phase::FirstPass, "Stats", Self::numbers);
        schedule.run(Phase::FirstPass, "Moves", Self::moves);
        schedule
    }

    fn output(&mut self) -> PortResult<Pku> {
        Ok(std::mem::take(&mut self.pku))
    }
}
