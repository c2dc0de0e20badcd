use crate::model::{choice::ChoiceResult, DecisionMakerId};
use serde::Serialize;

/// a decision maker whose choice could not be made. the rest of the batch
/// is unaffected.
#[derive(Clone, Debug, Serialize)]
pub struct DecisionMakerFailure {
    pub decision_maker_id: DecisionMakerId,
    pub model: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub results: Vec<ChoiceResult>,
    pub failures: Vec<DecisionMakerFailure>,
    /// records in chunks that never started because the batch was cancelled
    pub skipped: usize,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.skipped == 0
    }

    /// the number of decision makers processed, successfully or not
    pub fn processed(&self) -> usize {
        self.results.len() + self.failures.len()
    }
}
