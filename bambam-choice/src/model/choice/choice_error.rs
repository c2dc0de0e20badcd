use crate::model::DecisionMakerId;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ChoiceError {
    #[error("decision maker {decision_maker_id} has no available alternatives")]
    NoAvailableAlternatives { decision_maker_id: DecisionMakerId },
    #[error("probability {value} at position {position} is not a finite non-negative number")]
    InvalidProbability { position: usize, value: f64 },
    #[error("probabilities sum to zero, nothing to choose from")]
    ZeroProbabilityMass,
    #[error("expected {expected} probabilities, found {found}")]
    ProbabilityLengthMismatch { expected: usize, found: usize },
}
