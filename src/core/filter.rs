//! Constraint filtering and list sorting over catalog entries.

use serde::{Deserialize, Serialize};

use crate::core::catalog::{CatalogEntry, Model};

/// What the user needs from a model.
///
/// Every field defaults to "unconstrained": a zero budget or zero minimum
/// context disables that check rather than rejecting everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirements {
    /// Ceiling on input cost per 1M tokens (USD). `<= 0` means no limit.
    pub budget: f64,
    /// Minimum context window in tokens. `0` means no limit.
    pub min_context: u64,
    pub reasoning: bool,
    pub vision: bool,
}

impl Requirements {
    /// True if `model` passes every active constraint.
    #[must_use]
    pub fn admits(&self, model: &Model) -> bool {
        if self.budget > 0.0 && model.cost_per_1m_in > self.budget {
            return false;
        }
        if self.min_context > 0 && model.context_window < self.min_context {
            return false;
        }
        if self.reasoning && !model.can_reason {
            return false;
        }
        if self.vision && !model.supports_vision {
            return false;
        }
        true
    }
}

/// Keep the entries that satisfy `requirements`, preserving their order.
#[must_use]
pub fn filter_entries<'a>(
    entries: &[CatalogEntry<'a>],
    requirements: &Requirements,
) -> Vec<CatalogEntry<'a>> {
    entries
        .iter()
        .filter(|e| requirements.admits(e.model))
        .copied()
        .collect()
}

/// Sort key for per-provider model listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ModelSort {
    /// Display name, ascending.
    #[default]
    Name,
    /// Input cost, cheapest first.
    Cost,
    /// Context window, largest first.
    Context,
}

/// Sort models in place. Stable, so equal keys keep catalog order.
pub fn sort_models(models: &mut [&Model], sort: ModelSort) {
    match sort {
        ModelSort::Name => models.sort_by(|a, b| a.name.cmp(&b.name)),
        ModelSort::Cost => models.sort_by(|a, b| a.cost_per_1m_in.total_cmp(&b.cost_per_1m_in)),
        ModelSort::Context => models.sort_by(|a, b| b.context_window.cmp(&a.context_window)),
    }
}
