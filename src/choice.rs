use crate::alert::Prompt;
use crate::error::{PortError, PortResult};

type Candidate<T> = Box<dyn FnOnce() -> T>;
type Commit<S, T> = Box<dyn FnOnce(&mut S, T) -> PortResult<()>>;
type TextParser<T> = Box<dyn Fn(&str) -> Option<T>>;

/// A value that can't be committed until the user has answered a prompt.
///
/// Candidates are thunks so that building the resolver has no side effects;
/// only the chosen one is ever evaluated, and its value is handed to the
/// commit function against the porter state `S`. A resolver built
/// [`with_text_entry`](Self::with_text_entry) also takes a typed value in
/// place of the listed options.
pub struct ChoiceResolver<S, T> {
    tag: String,
    prompt: Prompt,
    candidates: Vec<Candidate<T>>,
    commit: Commit<S, T>,
    text_parser: Option<TextParser<T>>,
}

impl<S, T> ChoiceResolver<S, T> {
    pub fn new<C>(
        tag: impl Into<String>,
        prompt: Prompt,
        candidates: Vec<Candidate<T>>,
        commit: C,
    ) -> PortResult<Self>
    where
        C: FnOnce(&mut S, T) -> PortResult<()> + 'static,
    {
        let options = prompt.option_count();
        if options != candidates.len() {
            return Err(PortError::ChoiceMismatch {
                options,
                candidates: candidates.len(),
            });
        }
        Ok(ChoiceResolver {
            tag: tag.into(),
            prompt,
            candidates,
            commit: Box::new(commit),
            text_parser: None,
        })
    }

    /// A resolver with one candidate and nothing to ask.
    pub fn single<F, C>(tag: impl Into<String>, candidate: F, commit: C) -> Self
    where
        F: FnOnce() -> T + 'static,
        C: FnOnce(&mut S, T) -> PortResult<()> + 'static,
    {
        ChoiceResolver {
            tag: tag.into(),
            prompt: Prompt::Plain(None),
            candidates: vec![Box::new(candidate)],
            commit: Box::new(commit),
            text_parser: None,
        }
    }

    /// Lets the user type a value instead of picking an option. `hint` is
    /// shown with the choice; text that `parse` rejects is refused when
    /// entered. Has no effect on a resolver with nothing to ask.
    pub fn with_text_entry<F>(mut self, hint: impl Into<String>, parse: F) -> Self
    where
        F: Fn(&str) -> Option<T> + 'static,
    {
        if let Prompt::Choice(choice) = &mut self.prompt {
            choice.set_text_hint(hint);
            self.text_parser = Some(Box::new(parse));
        }
        self
    }

    pub fn accepts_text_entry(&self, text: &str) -> bool {
        self.text_parser
            .as_ref()
            .is_some_and(|parse| parse(text).is_some())
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn prompt(&self) -> &Prompt {
        &self.prompt
    }

    pub fn select(&mut self, index: usize) -> PortResult<()> {
        match &mut self.prompt {
            Prompt::Choice(choice) => choice.select(index),
            Prompt::Plain(_) if index == 0 => Ok(()),
            Prompt::Plain(_) => Err(PortError::ChoiceIndex {
                tag: self.tag.clone(),
                index,
                options: 1,
            }),
        }
    }

    /// Commits the typed entry if one parses, otherwise evaluates the
    /// selected candidate and commits that. Consumes the resolver, so it
    /// can only happen once.
    pub fn decide(self, state: &mut S) -> PortResult<()> {
        let typed = match (self.prompt.text_entry(), &self.text_parser) {
            (Some(text), Some(parse)) => parse(text),
            _ => None,
        };
        if let Some(value) = typed {
            log::debug!("Deciding {} with the typed entry", self.tag);
            return (self.commit)(state, value);
        }
        let selected = self.prompt.selected();
        let candidate = self
            .candidates
            .into_iter()
            .nth(selected)
            .ok_or(PortError::ChoiceIndex {
                tag: self.tag.clone(),
                index: selected,
                options: 0,
            })?;
        log::debug!("Deciding {} with option {selected}", self.tag);
        (self.commit)(state, candidate())
    }
}

/// Type-erased view of a pending [`ChoiceResolver`], so that resolvers of
/// different value types can wait side by side on a porter.
pub trait Decision<S> {
    fn tag(&self) -> &str;
    fn prompt(&self) -> &Prompt;
    fn prompt_mut(&mut self) -> &mut Prompt;
    fn accepts_text_entry(&self, text: &str) -> bool;
    fn decide_boxed(self: Box<Self>, state: &mut S) -> PortResult<()>;
}

impl<S, T> Decision<S> for ChoiceResolver<S, T> {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn prompt(&self) -> &Prompt {
        &self.prompt
    }

    fn prompt_mut(&mut self) -> &mut Prompt {
        &mut self.prompt
    }

    fn accepts_text_entry(&self, text: &str) -> bool {
        ChoiceResolver::accepts_text_entry(self, text)
    }

    fn decide_boxed(self: Box<Self>, state: &mut S) -> PortResult<()> {
        (*self).decide(state)
    }
}

/// Shorthand for boxing a candidate thunk.
pub fn candidate<T, F>(thunk: F) -> Candidate<T>
where
    F: FnOnce() -> T + 'static,
{
    Box::new(thunk)
}
