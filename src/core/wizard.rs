//! Requirement wizard state machine.
//!
//! The wizard walks a fixed sequence of questions, one confirmed answer per
//! step, and then ranks the whole catalog against the collected
//! requirements. [`transition`] is the pure step function; [`Wizard`] wraps
//! it with the catalog snapshot and runs the scoring pass on entry to
//! [`WizardState::ShowResults`].

use serde::Serialize;

use crate::core::catalog::CatalogEntry;
use crate::core::filter::Requirements;
use crate::core::ranking::RankedList;
use crate::core::scoring::ScoringPolicy;

/// Wizard states in the only order they can be visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WizardState {
    CollectBudget,
    CollectContext,
    CollectReasoning,
    CollectVision,
    ShowResults,
    /// Results acknowledged.
    Finished,
    /// Aborted; nothing gathered is kept.
    Cancelled,
}

/// One input event. Exactly one is consumed per transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardEvent {
    /// Accept the choice at this index of the current state's choice list.
    Confirm(usize),
    Cancel,
}

/// Value recorded when a choice is confirmed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChoiceValue {
    Budget(f64),
    Context(u64),
    Flag(bool),
}

/// A selectable answer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Choice {
    pub label: &'static str,
    pub value: ChoiceValue,
}

const fn choice(label: &'static str, value: ChoiceValue) -> Choice {
    Choice { label, value }
}

const BUDGET_CHOICES: [Choice; 6] = [
    choice("No budget limit", ChoiceValue::Budget(0.0)),
    choice("Under $0.50 per 1M tokens", ChoiceValue::Budget(0.5)),
    choice("Under $1.00 per 1M tokens", ChoiceValue::Budget(1.0)),
    choice("Under $5.00 per 1M tokens", ChoiceValue::Budget(5.0)),
    choice("Under $10.00 per 1M tokens", ChoiceValue::Budget(10.0)),
    choice("Any cost", ChoiceValue::Budget(1000.0)),
];

const CONTEXT_CHOICES: [Choice; 5] = [
    choice("Any context size", ChoiceValue::Context(0)),
    choice("At least 32K tokens", ChoiceValue::Context(32_000)),
    choice("At least 100K tokens", ChoiceValue::Context(100_000)),
    choice("At least 200K tokens", ChoiceValue::Context(200_000)),
    choice("At least 400K tokens", ChoiceValue::Context(400_000)),
];

const REASONING_CHOICES: [Choice; 2] = [
    choice("Yes, I need reasoning capabilities", ChoiceValue::Flag(true)),
    choice("No, reasoning not required", ChoiceValue::Flag(false)),
];

const VISION_CHOICES: [Choice; 2] = [
    choice("Yes, I need vision/multimodal", ChoiceValue::Flag(true)),
    choice("No, text-only is fine", ChoiceValue::Flag(false)),
];

impl WizardState {
    /// Question shown for this state.
    #[must_use]
    pub const fn prompt(self) -> &'static str {
        match self {
            Self::CollectBudget => "What's your budget?",
            Self::CollectContext => "What context size do you need?",
            Self::CollectReasoning => "Do you need reasoning capabilities?",
            Self::CollectVision => "Do you need vision/multimodal capabilities?",
            Self::ShowResults => "Top Recommended Models",
            Self::Finished | Self::Cancelled => "",
        }
    }

    /// Choices offered in this state. Empty outside the collecting states.
    #[must_use]
    pub const fn choices(self) -> &'static [Choice] {
        match self {
            Self::CollectBudget => &BUDGET_CHOICES,
            Self::CollectContext => &CONTEXT_CHOICES,
            Self::CollectReasoning => &REASONING_CHOICES,
            Self::CollectVision => &VISION_CHOICES,
            Self::ShowResults | Self::Finished | Self::Cancelled => &[],
        }
    }

    /// True once no further events are accepted.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Cancelled)
    }

    const fn next(self) -> Self {
        match self {
            Self::CollectBudget => Self::CollectContext,
            Self::CollectContext => Self::CollectReasoning,
            Self::CollectReasoning => Self::CollectVision,
            Self::CollectVision => Self::ShowResults,
            Self::ShowResults | Self::Finished => Self::Finished,
            Self::Cancelled => Self::Cancelled,
        }
    }
}

/// Pure step function.
///
/// - `Cancel` moves any non-terminal state to `Cancelled` and resets the
///   requirements.
/// - `Confirm(i)` in a collecting state records choice `i` and advances; an
///   out-of-range `i` leaves everything unchanged.
/// - `Confirm` in `ShowResults` finishes.
/// - Terminal states ignore all events.
#[must_use]
pub fn transition(
    state: WizardState,
    requirements: Requirements,
    event: WizardEvent,
) -> (WizardState, Requirements) {
    if state.is_terminal() {
        return (state, requirements);
    }

    match event {
        WizardEvent::Cancel => (WizardState::Cancelled, Requirements::default()),
        WizardEvent::Confirm(_) if state == WizardState::ShowResults => {
            (WizardState::Finished, requirements)
        }
        WizardEvent::Confirm(index) => {
            let Some(picked) = state.choices().get(index) else {
                return (state, requirements);
            };
            let mut updated = requirements;
            match (state, picked.value) {
                (WizardState::CollectBudget, ChoiceValue::Budget(b)) => updated.budget = b,
                (WizardState::CollectContext, ChoiceValue::Context(c)) => updated.min_context = c,
                (WizardState::CollectReasoning, ChoiceValue::Flag(f)) => updated.reasoning = f,
                (WizardState::CollectVision, ChoiceValue::Flag(f)) => updated.vision = f,
                _ => return (state, requirements),
            }
            (state.next(), updated)
        }
    }
}

/// Wizard bound to a catalog snapshot.
#[derive(Debug)]
pub struct Wizard<'a> {
    entries: Vec<CatalogEntry<'a>>,
    state: WizardState,
    requirements: Requirements,
    results: Option<RankedList<'a>>,
}

impl<'a> Wizard<'a> {
    /// Start at the budget question over the full candidate set.
    #[must_use]
    pub fn new(entries: Vec<CatalogEntry<'a>>) -> Self {
        Self {
            entries,
            state: WizardState::CollectBudget,
            requirements: Requirements::default(),
            results: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> WizardState {
        self.state
    }

    #[must_use]
    pub const fn requirements(&self) -> &Requirements {
        &self.requirements
    }

    /// Ranked results, available from `ShowResults` onwards.
    #[must_use]
    pub fn results(&self) -> Option<&RankedList<'a>> {
        self.results.as_ref()
    }

    /// Apply one event and return the new state.
    ///
    /// Entering `ShowResults` scores every original candidate with the
    /// requirement-weighted policy. Cancelling drops any results.
    pub fn handle(&mut self, event: WizardEvent) -> WizardState {
        let before = self.state;
        let (state, requirements) = transition(before, self.requirements, event);
        self.state = state;
        self.requirements = requirements;

        if state == WizardState::ShowResults && before != WizardState::ShowResults {
            tracing::debug!(?requirements, candidates = self.entries.len(), "Scoring wizard candidates");
            self.results = Some(RankedList::rank(
                &self.entries,
                ScoringPolicy::RequirementWeighted,
                &self.requirements,
            ));
        } else if state == WizardState::Cancelled {
            self.results = None;
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_float_eq;
    use crate::core::catalog::{Provider, entries};
    use crate::core::ranking::DETAIL_LIMIT;
    use crate::test_utils::{make_test_model, make_test_provider};

    #[test]
    fn confirms_walk_states_in_order() {
        let mut state = WizardState::CollectBudget;
        let mut req = Requirements::default();
        let mut seen = vec![state];
        for pick in [2, 2, 0, 1] {
            (state, req) = transition(state, req, WizardEvent::Confirm(pick));
            seen.push(state);
        }
        assert_eq!(
            seen,
            vec![
                WizardState::CollectBudget,
                WizardState::CollectContext,
                WizardState::CollectReasoning,
                WizardState::CollectVision,
                WizardState::ShowResults,
            ]
        );
        assert_eq!(
            req,
            Requirements {
                budget: 1.0,
                min_context: 100_000,
                reasoning: true,
                vision: false,
            }
        );

        let (state, _) = transition(state, req, WizardEvent::Confirm(0));
        assert_eq!(state, WizardState::Finished);
    }

    #[test]
    fn cancel_is_valid_everywhere() {
        for state in [
            WizardState::CollectBudget,
            WizardState::CollectContext,
            WizardState::CollectReasoning,
            WizardState::CollectVision,
            WizardState::ShowResults,
        ] {
            let req = Requirements {
                budget: 5.0,
                ..Requirements::default()
            };
            let (next, req) = transition(state, req, WizardEvent::Cancel);
            assert_eq!(next, WizardState::Cancelled);
            assert_eq!(req, Requirements::default());
        }
    }

    #[test]
    fn out_of_range_choice_is_rejected() {
        let req = Requirements::default();
        let (state, after) = transition(WizardState::CollectReasoning, req, WizardEvent::Confirm(2));
        assert_eq!(state, WizardState::CollectReasoning);
        assert_eq!(after, req);
    }

    #[test]
    fn terminal_states_ignore_events() {
        let req = Requirements::default();
        for state in [WizardState::Finished, WizardState::Cancelled] {
            assert_eq!(transition(state, req, WizardEvent::Confirm(0)).0, state);
            assert_eq!(transition(state, req, WizardEvent::Cancel).0, state);
        }
    }

    #[test]
    fn choice_tables() {
        let budgets: Vec<_> = WizardState::CollectBudget
            .choices()
            .iter()
            .map(|c| c.value)
            .collect();
        assert_eq!(
            budgets,
            [0.0, 0.5, 1.0, 5.0, 10.0, 1000.0]
                .map(ChoiceValue::Budget)
                .to_vec()
        );
        let contexts: Vec<_> = WizardState::CollectContext
            .choices()
            .iter()
            .map(|c| c.value)
            .collect();
        assert_eq!(
            contexts,
            [0, 32_000, 100_000, 200_000, 400_000]
                .map(ChoiceValue::Context)
                .to_vec()
        );
        assert!(WizardState::ShowResults.choices().is_empty());
    }

    fn three_model_fixture() -> Vec<Provider> {
        // alpha: cheap, reasoning, 128K
        let mut alpha = make_test_model("alpha", 0.4, 1.6, 128_000);
        alpha.can_reason = true;
        // beta: over budget, reasoning, vision, 200K
        let mut beta = make_test_model("beta", 3.0, 15.0, 200_000);
        beta.can_reason = true;
        beta.supports_vision = true;
        // gamma: within budget but not half, no reasoning, 32K
        let gamma = make_test_model("gamma", 0.8, 2.4, 32_000);
        vec![
            make_test_provider("one", vec![alpha, beta]),
            make_test_provider("two", vec![gamma]),
        ]
    }

    #[test]
    fn wizard_scores_full_candidate_set_on_results() {
        let providers = three_model_fixture();
        let mut wizard = Wizard::new(entries(&providers));
        assert!(wizard.results().is_none());

        // $1.00 budget, >=100K context, reasoning yes, vision no
        for pick in [2, 2, 0, 1] {
            wizard.handle(WizardEvent::Confirm(pick));
        }
        assert_eq!(wizard.state(), WizardState::ShowResults);

        let results = wizard.results().unwrap();
        // Over-budget and below-context models are scored, not dropped
        assert_eq!(results.len(), 3);
        let top = results.top(DETAIL_LIMIT);

        assert_eq!(top[0].model.id, "alpha");
        assert_float_eq!(top[0].score, 175.0);
        assert_eq!(
            top[0].reasons,
            vec!["Well under budget", "Meets context requirement", "Has reasoning"]
        );

        assert_eq!(top[1].model.id, "beta");
        assert_float_eq!(top[1].score, 45.0);
        assert_eq!(
            top[1].reasons,
            vec!["Over budget", "Meets context requirement", "Has reasoning"]
        );

        assert_eq!(top[2].model.id, "gamma");
        assert_float_eq!(top[2].score, 0.0);
        assert_eq!(
            top[2].reasons,
            vec!["Below context requirement", "No reasoning"]
        );

        assert_eq!(wizard.handle(WizardEvent::Confirm(0)), WizardState::Finished);
        assert!(wizard.results().is_some());
    }

    #[test]
    fn wizard_cancel_discards_results() {
        let providers = three_model_fixture();
        let mut wizard = Wizard::new(entries(&providers));
        for pick in [0, 0, 1, 1] {
            wizard.handle(WizardEvent::Confirm(pick));
        }
        assert!(wizard.results().is_some());
        assert_eq!(wizard.handle(WizardEvent::Cancel), WizardState::Cancelled);
        assert!(wizard.results().is_none());
        assert_eq!(*wizard.requirements(), Requirements::default());
    }
}
