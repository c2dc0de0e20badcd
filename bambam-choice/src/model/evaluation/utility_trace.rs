use crate::model::{AlternativeId, DecisionMakerId};
use serde::Serialize;

/// log target for utility traces, so they can be enabled independently,
/// e.g. `RUST_LOG=bambam_choice::trace=info`.
pub const TRACE_TARGET: &str = "bambam_choice::trace";

#[derive(Clone, Debug, Serialize)]
pub struct TermTrace {
    pub description: Option<String>,
    pub expression: String,
    pub value: f64,
    pub coefficient: f64,
    pub contribution: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct AlternativeTrace {
    pub id: AlternativeId,
    pub name: String,
    pub available: bool,
    pub utility: Option<f64>,
    pub terms: Vec<TermTrace>,
}

/// the per-term utility breakdown of one decision.
#[derive(Clone, Debug, Serialize)]
pub struct UtilityTrace {
    pub decision_maker_id: DecisionMakerId,
    pub model: String,
    pub alternatives: Vec<AlternativeTrace>,
}

impl UtilityTrace {
    pub fn log(&self) {
        for alt in self.alternatives.iter() {
            log::info!(
                target: TRACE_TARGET,
                "model '{}' decision maker {} alternative {} ({}): available={} utility={:?}",
                self.model,
                self.decision_maker_id,
                alt.id,
                alt.name,
                alt.available,
                alt.utility
            );
            for term in alt.terms.iter() {
                log::info!(
                    target: TRACE_TARGET,
                    "    {} `{}` value={} coefficient={} contribution={}",
                    term.description.as_deref().unwrap_or("-"),
                    term.expression,
                    term.value,
                    term.coefficient,
                    term.contribution
                );
            }
        }
    }
}
