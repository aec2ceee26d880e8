//! Scoring a candidate set and ordering it.

use crate::core::catalog::{CatalogEntry, Model, Provider};
use crate::core::filter::Requirements;
use crate::core::scoring::ScoringPolicy;

/// Display limit for search results.
pub const SEARCH_LIMIT: usize = 10;
/// Display limit for the wizard's result list.
pub const PREVIEW_LIMIT: usize = 5;
/// Display limit for the wizard's detailed cards.
pub const DETAIL_LIMIT: usize = 3;

/// A scored catalog entry.
#[derive(Debug, Clone)]
pub struct MatchCandidate<'a> {
    pub model: &'a Model,
    pub provider: &'a Provider,
    pub score: f64,
    pub reasons: Vec<String>,
}

/// Candidates in descending score order.
///
/// The full list is kept; [`RankedList::top`] only narrows the view.
#[derive(Debug, Clone, Default)]
pub struct RankedList<'a> {
    candidates: Vec<MatchCandidate<'a>>,
}

impl<'a> RankedList<'a> {
    /// Score every entry under `policy` and sort.
    ///
    /// The sort is stable: equal scores keep their input order, which for
    /// catalog entries is provider order then model order.
    #[must_use]
    pub fn rank(
        entries: &[CatalogEntry<'a>],
        policy: ScoringPolicy,
        requirements: &Requirements,
    ) -> Self {
        let mut candidates: Vec<MatchCandidate<'a>> = entries
            .iter()
            .map(|e| {
                let score = policy.score(e.model, requirements);
                MatchCandidate {
                    model: e.model,
                    provider: e.provider,
                    score: score.value,
                    reasons: score.reasons,
                }
            })
            .collect();
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        Self { candidates }
    }

    /// The first `n` candidates (or all, if fewer).
    #[must_use]
    pub fn top(&self, n: usize) -> &[MatchCandidate<'a>] {
        &self.candidates[..n.min(self.candidates.len())]
    }

    #[must_use]
    pub fn all(&self) -> &[MatchCandidate<'a>] {
        &self.candidates
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}
