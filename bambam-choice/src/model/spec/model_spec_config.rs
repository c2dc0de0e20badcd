use crate::model::{schema::VariableScope, AlternativeId, ZoneId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// a choice model as read from a TOML or JSON model specification file.
///
/// ```toml
/// name = "work_mode"
///
/// [variables]
/// ivt = "scalar"
/// cost = "alternative"
/// sov_time = "matrix"
///
/// [constants]
/// c_ivt = -0.05
///
/// [[alternatives]]
/// id = 1
/// name = "drive"
/// utility = "c_ivt * @sov_time[orig, dest]"
/// availability = "@autos > 0"
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelSpecConfig {
    pub name: String,
    #[serde(default)]
    pub variables: BTreeMap<String, VariableScope>,
    /// named coefficients, usable in expressions and as term coefficients
    #[serde(default)]
    pub constants: BTreeMap<String, f64>,
    pub alternatives: Vec<AlternativeConfig>,
    /// root of the nesting tree. a flat multinomial logit model when omitted.
    #[serde(default)]
    pub nests: Option<NestConfig>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AlternativeConfig {
    pub id: AlternativeId,
    pub name: String,
    /// a single utility expression, evaluated as a term with coefficient 1
    #[serde(default)]
    pub utility: Option<String>,
    #[serde(default)]
    pub terms: Vec<UtilityTermConfig>,
    /// always available when omitted
    #[serde(default)]
    pub availability: Option<String>,
    /// zone that `dest` refers to when evaluating this alternative
    #[serde(default)]
    pub zone: Option<ZoneId>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UtilityTermConfig {
    #[serde(default)]
    pub description: Option<String>,
    pub expression: String,
    #[serde(default)]
    pub coefficient: CoefficientConfig,
}

/// a term coefficient, either a literal or the name of a declared constant.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum CoefficientConfig {
    Value(f64),
    Named(String),
}

impl Default for CoefficientConfig {
    fn default() -> Self {
        CoefficientConfig::Value(1.0)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NestConfig {
    pub name: String,
    #[serde(default = "default_theta")]
    pub theta: f64,
    pub children: Vec<NestChildConfig>,
}

/// a nest member: an alternative id, or a nested nest.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NestChildConfig {
    Alternative(AlternativeId),
    Nest(NestConfig),
}

fn default_theta() -> f64 {
    1.0
}
