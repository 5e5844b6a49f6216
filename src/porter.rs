//! Phase-ordered execution of tag processors.
//!
//! A porter registers its steps in a [`Schedule`]; [`Port`] runs them in two
//! halves. The first half ends once every tag has either been written or
//! turned into a pending choice. The host then shows the collected alerts,
//! lets the user answer the choices, and runs the second half, which
//! commits the choices and assembles the output.

use std::collections::{HashMap, VecDeque};

use crate::alert::{Alert, ChoiceAlert, Prompt, Severity};
use crate::byte_override::ByteOverrideCommand;
use crate::choice::{ChoiceResolver, Decision};
use crate::error::{PortError, PortResult};
use crate::settings::PortSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    FormatOverride,
    PreProcessing,
    FirstPass,
    FirstPassStage2,
    SecondPass,
    PostProcessing,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::FormatOverride,
        Phase::PreProcessing,
        Phase::FirstPass,
        Phase::FirstPassStage2,
        Phase::SecondPass,
        Phase::PostProcessing,
    ];

    pub fn in_first_half(&self) -> bool {
        *self <= Phase::FirstPassStage2
    }
}

pub type Procedure<P> = fn(&mut P, &mut PortContext<P>) -> PortResult<()>;
type DeferredAction<P> = Box<dyn FnOnce(&mut P, &mut PortContext<P>) -> PortResult<()>>;

enum Action<P> {
    Run(Procedure<P>),
    /// Decide the pending choice registered under the step's name, if any.
    Resolve,
    Deferred(DeferredAction<P>),
}

struct Step<P> {
    phase: Phase,
    name: String,
    after: Vec<String>,
    action: Action<P>,
}

pub struct StepHandle<'s, P> {
    step: &'s mut Step<P>,
}

impl<P> StepHandle<'_, P> {
    /// Steps in the same phase that must run before this one.
    pub fn after(self, prerequisites: &[&str]) -> Self {
        self.step
            .after
            .extend(prerequisites.iter().map(|name| name.to_string()));
        self
    }
}

pub struct Schedule<P> {
    steps: Vec<Step<P>>,
}

impl<P> Default for Schedule<P> {
    fn default() -> Self {
        Schedule { steps: Vec::new() }
    }
}

impl<P> Schedule<P> {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, phase: Phase, name: &str, action: Action<P>) -> StepHandle<'_, P> {
        self.steps.push(Step {
            phase,
            name: name.to_owned(),
            after: Vec::new(),
            action,
        });
        let idx = self.steps.len() - 1;
        StepHandle {
            step: &mut self.steps[idx],
        }
    }

    pub fn run(&mut self, phase: Phase, name: &str, procedure: Procedure<P>) -> StepHandle<'_, P> {
        self.push(phase, name, Action::Run(procedure))
    }

    pub fn resolve(&mut self, phase: Phase, name: &str) -> StepHandle<'_, P> {
        self.push(phase, name, Action::Resolve)
    }

    pub fn defer<F>(&mut self, phase: Phase, name: &str, action: F) -> StepHandle<'_, P>
    where
        F: FnOnce(&mut P, &mut PortContext<P>) -> PortResult<()> + 'static,
    {
        self.push(phase, name, Action::Deferred(Box::new(action)))
    }

    /// Phase and name of every step, in the order they will run.
    pub fn order(&self) -> PortResult<Vec<(Phase, String)>> {
        Ok(self
            .ordered_indices()?
            .into_iter()
            .map(|idx| (self.steps[idx].phase, self.steps[idx].name.clone()))
            .collect())
    }

    fn plan(self) -> PortResult<VecDeque<Step<P>>> {
        let order = self.ordered_indices()?;
        let mut slots: Vec<Option<Step<P>>> = self.steps.into_iter().map(Some).collect();
        Ok(order
            .into_iter()
            .filter_map(|idx| slots[idx].take())
            .collect())
    }

    fn ordered_indices(&self) -> PortResult<Vec<usize>> {
        let mut order = Vec::with_capacity(self.steps.len());
        for phase in Phase::ALL {
            let in_phase: Vec<usize> = (0..self.steps.len())
                .filter(|idx| self.steps[*idx].phase == phase)
                .collect();

            let mut by_name = HashMap::new();
            for idx in &in_phase {
                if by_name.insert(self.steps[*idx].name.as_str(), *idx).is_some() {
                    return Err(PortError::DuplicateStep(self.steps[*idx].name.clone()));
                }
            }

            let mut marks = HashMap::new();
            for idx in in_phase {
                self.visit(idx, &by_name, &mut marks, &mut order)?;
            }
        }
        Ok(order)
    }

    fn visit(
        &self,
        idx: usize,
        by_name: &HashMap<&str, usize>,
        marks: &mut HashMap<usize, bool>,
        order: &mut Vec<usize>,
    ) -> PortResult<()> {
        match marks.get(&idx) {
            Some(true) => return Ok(()),
            Some(false) => return Err(PortError::PrerequisiteCycle(self.steps[idx].name.clone())),
            None => {}
        }
        marks.insert(idx, false);
        let step = &self.steps[idx];
        for prerequisite in &step.after {
            let Some(dependency) = by_name.get(prerequisite.as_str()) else {
                return Err(PortError::UnknownPrerequisite {
                    step: step.name.clone(),
                    prerequisite: prerequisite.clone(),
                });
            };
            self.visit(*dependency, by_name, marks, order)?;
        }
        marks.insert(idx, true);
        order.push(idx);
        Ok(())
    }
}

/// A byte override the port synthesized for data it couldn't write cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remediation {
    pub tag: String,
    pub command: ByteOverrideCommand,
}

/// Everything a step can report besides the values it writes.
pub struct PortContext<P> {
    settings: PortSettings,
    notes: Vec<Alert>,
    warnings: Vec<Alert>,
    errors: Vec<Alert>,
    choices: Vec<Box<dyn Decision<P>>>,
    remediations: Vec<Remediation>,
}

impl<P: 'static> PortContext<P> {
    fn new(settings: PortSettings) -> Self {
        PortContext {
            settings,
            notes: Vec::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
            choices: Vec::new(),
            remediations: Vec::new(),
        }
    }

    pub fn settings(&self) -> &PortSettings {
        &self.settings
    }

    pub fn alert(&mut self, severity: Severity, alert: Option<Alert>) {
        let Some(alert) = alert else {
            return;
        };
        log::debug!("{severity:?} for {}: {}", alert.title, alert.message);
        match severity {
            Severity::Note => self.notes.push(alert),
            Severity::Warning => self.warnings.push(alert),
            Severity::Error => self.errors.push(alert),
        }
    }

    pub fn note(&mut self, alert: Option<Alert>) {
        self.alert(Severity::Note, alert);
    }

    pub fn warn(&mut self, alert: Option<Alert>) {
        self.alert(Severity::Warning, alert);
    }

    pub fn error(&mut self, alert: Option<Alert>) {
        self.alert(Severity::Error, alert);
    }

    /// Notes an unspecified tag, unless the user turned those off.
    pub fn unspecified(&mut self, alert: Alert) {
        if self.settings.alert_unspecified {
            self.note(Some(alert));
        }
    }

    pub fn add_choice<T: 'static>(&mut self, resolver: ChoiceResolver<P, T>) {
        if let Prompt::Plain(Some(alert)) = resolver.prompt() {
            self.warnings.push(alert.clone());
        }
        self.choices.push(Box::new(resolver));
    }

    pub fn has_choice(&self, tag: &str) -> bool {
        self.choices.iter().any(|choice| choice.tag() == tag)
    }

    pub fn add_remediation(&mut self, tag: &str, command: ByteOverrideCommand) {
        self.remediations.push(Remediation {
            tag: tag.to_owned(),
            command,
        });
    }

    fn take_choice(&mut self, tag: &str) -> Option<Box<dyn Decision<P>>> {
        let idx = self.choices.iter().position(|choice| choice.tag() == tag)?;
        Some(self.choices.remove(idx))
    }
}

/// A format-specific importer or exporter.
pub trait Porter: Sized + 'static {
    type Output;

    /// The format's name, as used for dex indices and pku overrides.
    const FORMAT: &'static str;

    /// Rejects records that can't exist in the format at all. Runs before
    /// any step does.
    fn can_port(&self) -> PortResult<()> {
        Ok(())
    }

    fn schedule(&self) -> Schedule<Self>;

    /// Produces the finished output once every phase has run.
    fn output(&mut self) -> PortResult<Self::Output>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Ready,
    FirstHalfDone,
    Done,
}

/// One port of one record. Owns the porter and all of its pending state
/// across the pause between the two halves.
pub struct Port<P: Porter> {
    porter: P,
    ctx: PortContext<P>,
    pending: VecDeque<Step<P>>,
    stage: Stage,
}

impl<P: Porter> Port<P> {
    pub fn new(porter: P, settings: PortSettings) -> PortResult<Self> {
        porter.can_port()?;
        let pending = porter.schedule().plan()?;
        Ok(Port {
            porter,
            ctx: PortContext::new(settings),
            pending,
            stage: Stage::Ready,
        })
    }

    fn run_while(&mut self, keep_going: impl Fn(Phase) -> bool) -> PortResult<()> {
        while self
            .pending
            .front()
            .is_some_and(|step| keep_going(step.phase))
        {
            let Some(step) = self.pending.pop_front() else {
                break;
            };
            log::trace!("Running {:?} step {}", step.phase, step.name);
            match step.action {
                Action::Run(procedure) => procedure(&mut self.porter, &mut self.ctx)?,
                Action::Deferred(action) => action(&mut self.porter, &mut self.ctx)?,
                Action::Resolve => {
                    if let Some(choice) = self.ctx.take_choice(&step.name) {
                        choice.decide_boxed(&mut self.porter)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Runs every phase up to and including the first pass.
    pub fn first_half(&mut self) -> PortResult<()> {
        if self.stage != Stage::Ready {
            return Err(PortError::OutOfOrder);
        }
        self.run_while(|phase| phase.in_first_half())?;
        self.stage = Stage::FirstHalfDone;
        log::debug!(
            "First half of {} port done with {} pending choice(s)",
            P::FORMAT,
            self.ctx.choices.len()
        );
        Ok(())
    }

    /// Commits pending choices and builds the output.
    pub fn second_half(&mut self) -> PortResult<P::Output> {
        if self.stage != Stage::FirstHalfDone {
            return Err(PortError::OutOfOrder);
        }
        self.run_while(|phase| phase != Phase::PostProcessing)?;
        // Choices whose tag has no resolve step are committed before post
        // processing builds the output from them
        for choice in std::mem::take(&mut self.ctx.choices) {
            log::warn!("Choice {} had no resolve step, deciding it after the second pass", choice.tag());
            choice.decide_boxed(&mut self.porter)?;
        }
        self.run_while(|_| true)?;
        self.stage = Stage::Done;
        self.porter.output()
    }

    /// Both halves back to back, taking the default option of every choice.
    pub fn run(mut self) -> PortResult<P::Output> {
        self.first_half()?;
        self.second_half()
    }

    pub fn notes(&self) -> &[Alert] {
        &self.ctx.notes
    }

    pub fn warnings(&self) -> &[Alert] {
        &self.ctx.warnings
    }

    pub fn errors(&self) -> &[Alert] {
        &self.ctx.errors
    }

    /// Choices waiting for the user, in the order they were raised.
    pub fn choices(&self) -> impl Iterator<Item = (&str, &ChoiceAlert)> {
        self.ctx
            .choices
            .iter()
            .filter_map(|choice| match choice.prompt() {
                Prompt::Choice(alert) => Some((choice.tag(), alert)),
                Prompt::Plain(_) => None,
            })
    }

    fn choice_mut(&mut self, tag: &str) -> PortResult<&mut Box<dyn Decision<P>>> {
        self.ctx
            .choices
            .iter_mut()
            .find(|choice| choice.tag() == tag)
            .ok_or_else(|| PortError::UnknownChoice(tag.to_owned()))
    }

    pub fn select(&mut self, tag: &str, index: usize) -> PortResult<()> {
        let choice = self.choice_mut(tag)?;
        match choice.prompt_mut() {
            Prompt::Choice(alert) => alert.select(index),
            Prompt::Plain(_) if index == 0 => Ok(()),
            Prompt::Plain(_) => Err(PortError::ChoiceIndex {
                tag: tag.to_owned(),
                index,
                options: 1,
            }),
        }
    }

    /// Answers a choice with typed text instead of an option. The text
    /// wins over the selected option when the choice is decided.
    pub fn set_text_entry(&mut self, tag: &str, text: &str) -> PortResult<()> {
        let choice = self.choice_mut(tag)?;
        if !choice.accepts_text_entry(text) {
            return Err(PortError::TextEntry {
                tag: tag.to_owned(),
                text: text.to_owned(),
            });
        }
        if let Prompt::Choice(alert) = choice.prompt_mut() {
            alert.set_text_entry(text);
        }
        Ok(())
    }

    pub fn remediations(&self) -> &[Remediation] {
        &self.ctx.remediations
    }

    pub fn porter(&self) -> &P {
        &self.porter
    }
}
