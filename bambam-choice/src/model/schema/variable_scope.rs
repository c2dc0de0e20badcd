use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// the data source a variable is read from during utility evaluation.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum VariableScope {
    /// one value per decision-maker
    Scalar,
    /// one value per decision-maker and alternative
    Alternative,
    /// one value per zone, read at the origin or destination of the decision
    Zone,
    /// one value per origin-destination zone pair and (optionally) time period
    Matrix,
    /// a fixed model coefficient. declared with a value, folded into
    /// expressions at compile time.
    Constant,
}

impl Display for VariableScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            VariableScope::Scalar => "scalar",
            VariableScope::Alternative => "alternative",
            VariableScope::Zone => "zone",
            VariableScope::Matrix => "matrix",
            VariableScope::Constant => "constant",
        };
        write!(f, "{s}")
    }
}
