//! Step-by-step search refinement.
//!
//! Where the wizard offers fixed choices, refinement takes typed values: a
//! cost ceiling, then a context minimum, each narrowing the matching set,
//! after which the survivors are ranked with the simple policy. [`advance`]
//! is the pure step function; [`Refinement`] binds it to a catalog snapshot.

use crate::core::catalog::CatalogEntry;
use crate::core::filter::{Requirements, filter_entries};
use crate::core::ranking::RankedList;
use crate::core::scoring::ScoringPolicy;

/// Refinement steps in the only order they can be visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefineStep {
    MaxCost,
    MinContext,
    Capabilities,
    Results,
    Finished,
    Cancelled,
}

impl RefineStep {
    /// Question shown while waiting in this step.
    #[must_use]
    pub const fn prompt(self) -> &'static str {
        match self {
            Self::MaxCost => "Maximum cost per 1M input tokens (Enter to skip)",
            Self::MinContext => "Minimum context window in K tokens (Enter to skip)",
            Self::Capabilities => "Press Enter to see results",
            Self::Results => "Press Enter to finish",
            Self::Finished | Self::Cancelled => "",
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Cancelled)
    }

    const fn next(self) -> Self {
        match self {
            Self::MaxCost => Self::MinContext,
            Self::MinContext => Self::Capabilities,
            Self::Capabilities => Self::Results,
            Self::Results | Self::Finished => Self::Finished,
            Self::Cancelled => Self::Cancelled,
        }
    }
}

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefineEvent {
    /// Trimmed text; empty means "skip".
    Submit(String),
    Cancel,
}

impl RefineEvent {
    /// `q` or `quit` cancels; anything else is submitted as typed.
    #[must_use]
    pub fn from_line(line: &str) -> Self {
        let line = line.trim();
        if line.eq_ignore_ascii_case("q") || line.eq_ignore_ascii_case("quit") {
            Self::Cancel
        } else {
            Self::Submit(line.to_string())
        }
    }
}

/// Pure step function.
///
/// - An empty submission skips a value step, keeping the current constraint.
/// - Cost must be a finite, non-negative number; context a whole number of
///   thousands. Anything else leaves step and requirements unchanged.
/// - `Cancel` ends any non-terminal step and resets the requirements.
/// - Terminal steps ignore all events.
#[must_use]
pub fn advance(
    step: RefineStep,
    requirements: Requirements,
    event: &RefineEvent,
) -> (RefineStep, Requirements) {
    if step.is_terminal() {
        return (step, requirements);
    }
    let text = match event {
        RefineEvent::Cancel => return (RefineStep::Cancelled, Requirements::default()),
        RefineEvent::Submit(text) => text.as_str(),
    };

    let mut updated = requirements;
    if !text.is_empty() {
        match step {
            RefineStep::MaxCost => match text.parse::<f64>() {
                Ok(cost) if cost.is_finite() && cost >= 0.0 => updated.budget = cost,
                _ => return (step, requirements),
            },
            RefineStep::MinContext => match text.parse::<u64>() {
                Ok(k) => updated.min_context = k.saturating_mul(1_000),
                Err(_) => return (step, requirements),
            },
            _ => {}
        }
    }
    (step.next(), updated)
}

/// Refinement bound to a catalog snapshot.
#[derive(Debug)]
pub struct Refinement<'a> {
    entries: Vec<CatalogEntry<'a>>,
    step: RefineStep,
    requirements: Requirements,
    results: Option<RankedList<'a>>,
}

impl<'a> Refinement<'a> {
    /// Start at the cost step. `base` carries constraints fixed up front,
    /// such as required capabilities.
    #[must_use]
    pub fn new(entries: Vec<CatalogEntry<'a>>, base: Requirements) -> Self {
        Self {
            entries,
            step: RefineStep::MaxCost,
            requirements: base,
            results: None,
        }
    }

    #[must_use]
    pub const fn step(&self) -> RefineStep {
        self.step
    }

    #[must_use]
    pub const fn requirements(&self) -> &Requirements {
        &self.requirements
    }

    /// How many entries pass the constraints gathered so far.
    #[must_use]
    pub fn matching(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| self.requirements.admits(e.model))
            .count()
    }

    /// Ranked survivors, available from `Results` onwards.
    #[must_use]
    pub fn results(&self) -> Option<&RankedList<'a>> {
        self.results.as_ref()
    }

    /// Apply one event and return the new step.
    pub fn handle(&mut self, event: &RefineEvent) -> RefineStep {
        let before = self.step;
        let (step, requirements) = advance(before, self.requirements, event);
        self.step = step;
        self.requirements = requirements;

        if step == RefineStep::Results && before != RefineStep::Results {
            let survivors = filter_entries(&self.entries, &self.requirements);
            tracing::debug!(?requirements, survivors = survivors.len(), "Ranking refined search");
            self.results = Some(RankedList::rank(
                &survivors,
                ScoringPolicy::Simple,
                &self.requirements,
            ));
        } else if step == RefineStep::Cancelled {
            self.results = None;
        }
        step
    }
}
