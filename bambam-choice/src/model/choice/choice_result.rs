use crate::model::{evaluation::UtilityTrace, AlternativeId, DecisionMakerId};
use serde::Serialize;

/// the outcome of one decision. which fields are present depends on the
/// [`super::ChoiceOutputMode`].
#[derive(Clone, Debug, Serialize)]
pub struct ChoiceResult {
    pub decision_maker_id: DecisionMakerId,
    pub chosen: Option<AlternativeId>,
    /// aligned with the alternatives of the model
    pub probabilities: Option<Vec<f64>>,
    pub logsum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<UtilityTrace>,
}
