use crate::model::{
    context::{AttributeSet, DecisionContext, ModelData},
    spec::ModelSpec,
    DecisionMakerId, TimePeriod, ZoneId,
};
use serde::{Deserialize, Serialize};

/// one row of the population: a decision maker's identity, trip geography
/// and attributes.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DecisionMakerRecord {
    pub id: DecisionMakerId,
    #[serde(default)]
    pub origin: Option<ZoneId>,
    #[serde(default)]
    pub destination: Option<ZoneId>,
    #[serde(default)]
    pub time_period: Option<TimePeriod>,
    #[serde(default)]
    pub attributes: AttributeSet,
}

impl DecisionMakerRecord {
    pub fn new(id: DecisionMakerId) -> DecisionMakerRecord {
        DecisionMakerRecord {
            id,
            ..Default::default()
        }
    }

    /// a fresh context for this decision maker bound to `spec`
    pub fn bind<'a>(&self, spec: &'a ModelSpec, data: &'a ModelData) -> DecisionContext<'a> {
        let mut builder = DecisionContext::builder(self.id);
        if let Some(origin) = self.origin {
            builder = builder.origin(origin);
        }
        if let Some(destination) = self.destination {
            builder = builder.destination(destination);
        }
        if let Some(period) = self.time_period {
            builder = builder.time_period(period);
        }
        builder.bind(spec, &self.attributes, data)
    }
}
