//! Match scoring policies.
//!
//! Two independent formulas exist. [`ScoringPolicy::Simple`] ranks browse
//! and search results on cost and capabilities alone.
//! [`ScoringPolicy::RequirementWeighted`] scores against the user's stated
//! requirements and records a reason for every rule that fired. They are
//! deliberately kept separate; neither is a special case of the other.

use serde::Serialize;

use crate::core::catalog::Model;
use crate::core::filter::Requirements;

/// Every score starts here.
pub const BASE_SCORE: f64 = 100.0;

/// Context window that earns the top simple-policy bonus.
pub const LARGE_CONTEXT: u64 = 200_000;
/// Context window that earns the smaller simple-policy bonus.
pub const MEDIUM_CONTEXT: u64 = 100_000;

/// Which formula to score with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ScoringPolicy {
    Simple,
    RequirementWeighted,
}

/// Score plus the labels of the rules that produced it, in rule order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Score {
    pub value: f64,
    pub reasons: Vec<String>,
}

impl ScoringPolicy {
    /// Score one model. Pure: depends only on the model and requirements.
    #[must_use]
    pub fn score(self, model: &Model, requirements: &Requirements) -> Score {
        match self {
            Self::Simple => simple_score(model),
            Self::RequirementWeighted => requirement_score(model, requirements),
        }
    }
}

fn simple_score(model: &Model) -> Score {
    let mut value = BASE_SCORE;

    if model.cost_per_1m_in > 0.0 {
        value -= (model.cost_per_1m_in / 10.0).min(50.0);
    }

    if model.context_window >= LARGE_CONTEXT {
        value += 20.0;
    } else if model.context_window >= MEDIUM_CONTEXT {
        value += 10.0;
    }

    if model.can_reason {
        value += 15.0;
    }
    if model.supports_vision {
        value += 10.0;
    }

    Score {
        value,
        reasons: Vec::new(),
    }
}

fn requirement_score(model: &Model, req: &Requirements) -> Score {
    let mut value = BASE_SCORE;
    let mut reasons = Vec::new();
    let mut apply = |delta: f64, label: &str| {
        value += delta;
        reasons.push(label.to_string());
    };

    let cost = model.cost_per_1m_in;
    if req.budget > 0.0 && cost > req.budget {
        apply(-100.0, "Over budget");
    } else if cost <= req.budget / 2.0 {
        // With no budget set this only rewards free models
        apply(30.0, "Well under budget");
    }

    if model.context_window >= req.min_context {
        apply(20.0, "Meets context requirement");
    } else {
        apply(-50.0, "Below context requirement");
    }

    if req.reasoning {
        if model.can_reason {
            apply(25.0, "Has reasoning");
        } else {
            apply(-50.0, "No reasoning");
        }
    }

    if req.vision {
        if model.supports_vision {
            apply(25.0, "Has vision");
        } else {
            apply(-50.0, "No vision");
        }
    }

    Score { value, reasons }
}
