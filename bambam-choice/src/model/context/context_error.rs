use crate::model::DecisionMakerId;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ContextError {
    #[error("decision maker {decision_maker_id} has no value for variable '{name}'")]
    MissingVariable {
        decision_maker_id: DecisionMakerId,
        name: String,
    },
    #[error("invalid model data: {0}")]
    InvalidData(String),
}
