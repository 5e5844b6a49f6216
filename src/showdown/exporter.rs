use crate::alert::{invalid_alert, unspecified_alert, Alert};
use crate::dex::{DexCategory, DexIndex, SharedDex, SpeciesInfo};
use crate::error::{PortError, PortResult};
use crate::field::{ArrayField, Field};
use crate::pku::Pku;
use crate::porter::{Phase, Port, PortContext, Porter, Schedule};
use crate::settings::PortSettings;
use crate::tags::moves::move_set;
use crate::tags::numeric::{dex_entry, numeric};
use crate::tags::stats::{cap_total, multi_stat, StatLimits};
use crate::tags::text::text;
use crate::types::{Gender, Nature, STAT_NAMES};

use super::{ShowdownData, DEFAULT_HAPPINESS, DEFAULT_IV, DEFAULT_LEVEL, FORMAT, MAX_EV, MAX_EV_TOTAL, NICKNAME_LEN};

/// Writes a pku as a Showdown set.
pub struct ShowdownExporter {
    pku: Pku,
    dex: SharedDex,
    data: ShowdownData,
    info: Option<SpeciesInfo>,
    output: Option<String>,
}

impl ShowdownExporter {
    pub fn new(pku: &Pku, dex: SharedDex) -> Self {
        ShowdownExporter {
            pku: pku.clone(),
            dex,
            data: ShowdownData::new(),
            info: None,
            output: None,
        }
    }

    pub fn port(pku: &Pku, dex: SharedDex, settings: PortSettings) -> PortResult<Port<Self>> {
        Port::new(ShowdownExporter::new(pku, dex), settings)
    }

    pub fn data(&self) -> &ShowdownData {
        &self.data
    }

    /// A Showdown name for `name`, or the reason there isn't one.
    fn showdown_name(&self, category: DexCategory, tag: &str, name: Option<&str>) -> NameLookup {
        let found = dex_entry(tag, name, self.dex.as_ref(), category, FORMAT, ("None", DexIndex::Int(0)));
        let value = found.value.as_str().map(str::to_owned);
        (value, found.alert)
    }

    fn format_overrides(&mut self, _ctx: &mut PortContext<Self>) -> PortResult<()> {
        self.pku = self.pku.with_format_override(FORMAT)?;
        Ok(())
    }

    fn species(&mut self, _ctx: &mut PortContext<Self>) -> PortResult<()> {
        let name = self
            .pku
            .species
            .clone()
            .ok_or_else(|| PortError::Infeasible(String::from("this pku has no species")))?;
        let showdown = showdown_species(&self.dex, &name, self.pku.form.as_deref())?;
        self.info = self.dex.species_info(&name, self.pku.form.as_deref());
        self.data
            .species
            .set(showdown)
            .map_err(|err| PortError::field("Species", err))
    }

    fn nickname(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        let Some(nickname) = self.pku.nickname.as_deref() else {
            return Ok(());
        };
        let species = self.pku.species.as_deref().unwrap_or_default();
        if self.pku.nickname_flag == Some(false)
            || nickname.eq_ignore_ascii_case(species)
            || nickname.eq_ignore_ascii_case(&self.data.species.get())
        {
            return Ok(());
        }
        // Parentheses would be read back as the species
        let outcome = text("Nickname", nickname, NICKNAME_LEN, |c| !c.is_control() && c != '(' && c != ')')?;
        let nickname = outcome.report(ctx);
        if !nickname.is_empty() {
            self.data
                .nickname
                .set(Some(nickname))
                .map_err(|err| PortError::field("Nickname", err))?;
        }
        Ok(())
    }

    fn gender(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        let Some(name) = self.pku.gender.as_deref() else {
            return Ok(());
        };
        let Some(gender) = Gender::from_name(name) else {
            ctx.warn(Some(invalid_alert("Gender", name, "the species default")));
            return Ok(());
        };
        if let Some(ratio) = self.info.as_ref().map(|info| info.gender_ratio) {
            if !ratio.permits(gender) {
                ctx.warn(Some(Alert::new(
                    "Gender",
                    format!(
                        "This pku's gender is {}, which this species can't be. It will be left out.",
                        gender.name().to_lowercase()
                    ),
                )));
                return Ok(());
            }
            // Showdown fills in fixed genders itself
            if ratio.fixed().is_some() {
                return Ok(());
            }
        }
        self.data
            .gender
            .set(Some(gender))
            .map_err(|err| PortError::field("Gender", err))
    }

    fn item(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        if self.pku.item.is_none() {
            return Ok(());
        }
        let (item, alert) = self.showdown_name(DexCategory::Item, "Item", self.pku.item.as_deref());
        ctx.warn(alert);
        self.data.item.set(item).map_err(|err| PortError::field("Item", err))
    }

    fn ability(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        let (ability, alert) = self.showdown_name(DexCategory::Ability, "Ability", self.pku.ability.as_deref());
        if self.pku.ability.is_none() {
            ctx.unspecified(unspecified_alert("Ability", "Showdown's default"));
        } else {
            ctx.warn(alert);
        }
        self.data
            .ability
            .set(ability)
            .map_err(|err| PortError::field("Ability", err))
    }

    fn level(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        let level = match (self.pku.level, self.pku.exp, &self.info) {
            (None, Some(exp), Some(info)) => {
                let exp = exp.clamp(0, info.growth_rate.max_exp() as i64) as u32;
                info.growth_rate.level_at_exp(exp) as u64
            }
            (level, ..) => numeric("Level", level, 1, 100, DEFAULT_LEVEL)?.report(ctx),
        };
        self.data.level.set(level).map_err(|err| PortError::field("Level", err))
    }

    fn flags(&mut self, _ctx: &mut PortContext<Self>) -> PortResult<()> {
        let shiny = self.pku.shiny.unwrap_or(false);
        let gigantamax = self.pku.gigantamax_factor.unwrap_or(false);
        self.data.shiny.set(shiny).map_err(|err| PortError::field("Shiny", err))?;
        self.data
            .gigantamax
            .set(gigantamax)
            .map_err(|err| PortError::field("Gigantamax", err))
    }

    fn happiness(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        let happiness = numeric("Friendship", self.pku.friendship, 0, 255, DEFAULT_HAPPINESS)?.report(ctx);
        self.data
            .happiness
            .set(happiness)
            .map_err(|err| PortError::field("Friendship", err))
    }

    fn evs(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        let raw = self.pku.evs.as_ref().map(|evs| evs.to_array()).unwrap_or([None; 6]);
        let limits = StatLimits {
            min: 0,
            max: MAX_EV,
            default: 0,
        };
        let mut evs = multi_stat("EVs", "EV", &STAT_NAMES, raw, limits, ctx.settings().alert_unspecified).report(ctx);
        ctx.warn(cap_total("EVs", &mut evs, MAX_EV_TOTAL));
        self.data.evs.set_all(&evs).map_err(|err| PortError::field("EVs", err))
    }

    fn nature(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        let nature = match self.pku.nature.as_deref() {
            None => {
                ctx.unspecified(unspecified_alert("Nature", Nature::Serious));
                None
            }
            Some(name) => {
                let nature = Nature::from_name(name);
                if nature.is_none() {
                    ctx.warn(Some(invalid_alert("Nature", name, Nature::Serious)));
                }
                nature
            }
        };
        self.data.nature.set(nature).map_err(|err| PortError::field("Nature", err))
    }

    fn ivs(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        let raw = self.pku.ivs.as_ref().map(|ivs| ivs.to_array()).unwrap_or([None; 6]);
        let limits = StatLimits {
            min: 0,
            max: 31,
            default: DEFAULT_IV,
        };
        let ivs = multi_stat("IVs", "IV", &STAT_NAMES, raw, limits, ctx.settings().alert_unspecified).report(ctx);
        self.data.ivs.set_all(&ivs).map_err(|err| PortError::field("IVs", err))
    }

    fn moves(&mut self, ctx: &mut PortContext<Self>) -> PortResult<()> {
        let dex = self.dex.clone();
        let lookup = |name: &str| {
            dex.index_of(DexCategory::Move, name, FORMAT)
                .filter(|index| index.as_str().is_some())
        };
        let slots = move_set(self.pku.moves.as_deref(), 4, lookup, DexIndex::Str(String::new())).report(ctx);
        let moves = slots
            .into_iter()
            .filter_map(|slot| slot.index.as_str().filter(|name| !name.is_empty()).map(str::to_owned))
            .collect();
        self.data.moves.set(moves).map_err(|err| PortError::field("Moves", err))
    }

    fn write_text(&mut self, _ctx: &mut PortContext<Self>) -> PortResult<()> {
        self.output = Some(self.data.to_text());
        Ok(())
    }
}

type NameLookup = (Option<String>, Option<Alert>);

fn showdown_species(dex: &SharedDex, name: &str, form: Option<&str>) -> PortResult<String> {
    match dex.species_index(name, form, FORMAT) {
        Some(DexIndex::Str(showdown)) => Ok(showdown),
        _ => {
            let form = form.map(|form| format!(" ({form})")).unwrap_or_default();
            Err(PortError::Infeasible(format!("{name}{form} doesn't exist in Showdown")))
        }
    }
}

impl Porter for ShowdownExporter {
    type Output = String;

    const FORMAT: &'static str = FORMAT;

    fn can_port(&self) -> PortResult<()> {
        let pku = self.pku.with_format_override(FORMAT)?;
        if pku.is_egg() {
            return Err(PortError::Infeasible(String::from("eggs can't be used in Showdown")));
        }
        let name = pku
            .species
            .as_deref()
            .ok_or_else(|| PortError::Infeasible(String::from("this pku has no species")))?;
        showdown_species(&self.dex, name, pku.form.as_deref()).map(|_| ())
    }

    fn schedule(&self) -> Schedule<Self> {
        let mut schedule = Schedule::new();
        schedule.run(Phase::FormatOverride, "Format Overrides", Self::format_overrides);
        schedule.run(Phase::PreProcessing, "Species", Self::species);
        schedule.run(Phase::FirstPass, "Nickname", Self::nickname);
        schedule.run(Phase::FirstPass, "Gender", Self::gender);
        schedule.run(Phase::FirstPass, "Item", Self::item);
        schedule.run(Phase::FirstPass, "Ability", Self::ability);
        schedule.run(Phase::FirstPass, "Level", Self::level);
        schedule.run(Phase::FirstPass, "Shiny and Gigantamax", Self::flags);
        schedule.run(Phase::FirstPass, "Friendship", Self::happiness);
        schedule.run(Phase::FirstPass, "EVs", Self::evs);
        schedule.run(Phase::FirstPass, "Nature", Self::nature);
        schedule.run(Phase::FirstPass, "IVs", Self::ivs);
        schedule.run(Phase::FirstPass, "Moves", Self::moves);
        schedule.run(Phase::PostProcessing, "Text", Self::write_text);
        schedule
    }

    fn output(&mut self) -> PortResult<String> {
        self.output.take().ok_or(PortError::MissingValue {
            tag: String::from("Showdown"),
            phase: Phase::PostProcessing,
        })
    }
}
