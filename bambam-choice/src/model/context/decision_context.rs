use super::{AttributeProvider, ContextError, ModelData};
use crate::model::{
    expression::{PeriodRef, ResolvedVariable, ZoneRef},
    schema::{VariableDeclaration, VariableSchema},
    spec::ModelSpec,
    AlternativeId, DecisionMakerId, TimePeriod, ZoneId,
};
use std::sync::Arc;

/// a decision maker that has not yet been bound to a model. set the trip
/// geography here, then call one of the `bind` methods to produce a
/// [`DecisionContext`].
#[derive(Clone, Debug)]
pub struct DecisionContextBuilder {
    decision_maker_id: DecisionMakerId,
    origin: Option<ZoneId>,
    destination: Option<ZoneId>,
    time_period: Option<TimePeriod>,
}

impl DecisionContextBuilder {
    pub fn origin(mut self, zone: ZoneId) -> Self {
        self.origin = Some(zone);
        self
    }

    pub fn destination(mut self, zone: ZoneId) -> Self {
        self.destination = Some(zone);
        self
    }

    pub fn time_period(mut self, period: TimePeriod) -> Self {
        self.time_period = Some(period);
        self
    }

    /// binds the decision maker to the variables and alternatives of a model.
    pub fn bind<'a>(
        self,
        spec: &'a ModelSpec,
        attributes: &dyn AttributeProvider,
        data: &'a ModelData,
    ) -> DecisionContext<'a> {
        self.bind_with(
            spec.schema(),
            spec.alternative_ids(),
            spec.alternative_zones(),
            attributes,
            data,
        )
    }

    /// binds against a schema alone, with no alternatives. useful for
    /// evaluating standalone expressions.
    pub fn bind_schema<'a>(
        self,
        schema: &'a VariableSchema,
        attributes: &dyn AttributeProvider,
        data: &'a ModelData,
    ) -> DecisionContext<'a> {
        self.bind_with(schema, &[], &[], attributes, data)
    }

    /// copies the scalar and alternative-indexed attributes the schema
    /// declares into dense slots. absent or NaN attributes are stored as missing.
    pub fn bind_with<'a>(
        self,
        schema: &'a VariableSchema,
        alternative_ids: &'a [AlternativeId],
        alternative_zones: &'a [Option<ZoneId>],
        attributes: &dyn AttributeProvider,
        data: &'a ModelData,
    ) -> DecisionContext<'a> {
        let scalars = schema
            .scalar_names()
            .iter()
            .map(|name| attributes.scalar(name).filter(|v| !v.is_nan()))
            .collect();
        let alternatives = schema
            .alternative_names()
            .iter()
            .map(|name| {
                alternative_ids
                    .iter()
                    .map(|id| attributes.alternative(name, *id).filter(|v| !v.is_nan()))
                    .collect()
            })
            .collect();
        DecisionContext {
            decision_maker_id: self.decision_maker_id,
            scalars,
            alternatives,
            origin: self.origin,
            destination: self.destination,
            time_period: self.time_period,
            schema,
            alternative_ids,
            alternative_zones,
            data,
        }
    }
}

/// the inputs of one decision: a decision maker's attributes bound to the
/// variable slots of a model, its trip geography, and the shared model data.
/// a context is read-only once bound.
pub struct DecisionContext<'a> {
    decision_maker_id: DecisionMakerId,
    scalars: Vec<Option<f64>>,
    /// indexed by alternative slot, then by alternative position
    alternatives: Vec<Vec<Option<f64>>>,
    origin: Option<ZoneId>,
    destination: Option<ZoneId>,
    time_period: Option<TimePeriod>,
    schema: &'a VariableSchema,
    alternative_ids: &'a [AlternativeId],
    alternative_zones: &'a [Option<ZoneId>],
    data: &'a ModelData,
}

impl<'a> DecisionContext<'a> {
    pub fn builder(decision_maker_id: DecisionMakerId) -> DecisionContextBuilder {
        DecisionContextBuilder {
            decision_maker_id,
            origin: None,
            destination: None,
            time_period: None,
        }
    }

    pub fn decision_maker_id(&self) -> DecisionMakerId {
        self.decision_maker_id
    }

    pub fn origin(&self) -> Option<ZoneId> {
        self.origin
    }

    pub fn destination(&self) -> Option<ZoneId> {
        self.destination
    }

    pub fn time_period(&self) -> Option<TimePeriod> {
        self.time_period
    }

    pub fn schema(&self) -> &VariableSchema {
        self.schema
    }

    pub fn alternative_count(&self) -> usize {
        self.alternative_ids.len()
    }

    /// the value of a compiled variable reference for the alternative at
    /// position `alternative`.
    pub fn resolve(
        &self,
        variable: &ResolvedVariable,
        alternative: usize,
    ) -> Result<f64, ContextError> {
        let value = match variable {
            ResolvedVariable::Scalar { slot, .. } => self.scalars.get(*slot).copied().flatten(),
            ResolvedVariable::Alternative { slot, .. } => self
                .alternatives
                .get(*slot)
                .and_then(|values| values.get(alternative))
                .copied()
                .flatten(),
            ResolvedVariable::Zone { name, zone } => self
                .zone(*zone, alternative)
                .and_then(|z| self.data.zones().lookup(name, z)),
            ResolvedVariable::Matrix {
                name,
                origin,
                destination,
                period,
            } => {
                let period = match period {
                    PeriodRef::Context => self.time_period,
                    PeriodRef::Fixed(p) => Some(*p),
                };
                match (
                    self.zone(*origin, alternative),
                    self.zone(*destination, alternative),
                ) {
                    (Some(o), Some(d)) => self.data.matrices().lookup(name, o, d, period),
                    _ => None,
                }
            }
        };
        value.ok_or_else(|| self.missing(variable.name()))
    }

    /// looks up a variable by name. zone variables default to the destination
    /// zone and matrix variables to the origin-destination pair in the context's
    /// time period. alternative-indexed variables require an alternative position.
    pub fn get_variable(&self, name: &str, alternative: Option<usize>) -> Result<f64, ContextError> {
        let shared: Arc<str> = Arc::from(name);
        let variable = match self.schema.get(name) {
            Some(VariableDeclaration::Constant { value }) => return Ok(*value),
            Some(VariableDeclaration::Scalar { slot }) => ResolvedVariable::Scalar {
                name: shared,
                slot: *slot,
            },
            Some(VariableDeclaration::Alternative { slot }) => ResolvedVariable::Alternative {
                name: shared,
                slot: *slot,
            },
            Some(VariableDeclaration::Zone) => ResolvedVariable::Zone {
                name: shared,
                zone: ZoneRef::Destination,
            },
            Some(VariableDeclaration::Matrix) => ResolvedVariable::Matrix {
                name: shared,
                origin: ZoneRef::Origin,
                destination: ZoneRef::Destination,
                period: PeriodRef::Context,
            },
            None => return Err(self.missing(name)),
        };
        match (&variable, alternative) {
            (ResolvedVariable::Alternative { .. }, None) => Err(self.missing(name)),
            (_, alt) => self.resolve(&variable, alt.unwrap_or(usize::MAX)),
        }
    }

    fn zone(&self, zone: ZoneRef, alternative: usize) -> Option<ZoneId> {
        match zone {
            ZoneRef::Origin => self.origin,
            ZoneRef::Destination => self
                .alternative_zones
                .get(alternative)
                .copied()
                .flatten()
                .or(self.destination),
        }
    }

    fn missing(&self, name: &str) -> ContextError {
        ContextError::MissingVariable {
            decision_maker_id: self.decision_maker_id,
            name: name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        context::{AttributeSet, InMemoryMatrixProvider, InMemoryZoneData, SkimMatrix},
        schema::VariableScope,
    };

    fn schema() -> VariableSchema {
        let mut schema = VariableSchema::new();
        schema.declare("income", VariableScope::Scalar).expect("test invariant failed");
        schema.declare("cost", VariableScope::Alternative).expect("test invariant failed");
        schema.declare("parking", VariableScope::Zone).expect("test invariant failed");
        schema.declare("dist", VariableScope::Matrix).expect("test invariant failed");
        schema.declare_constant("k", 2.5).expect("test invariant failed");
        schema
    }

    fn data() -> ModelData {
        let mut zones = InMemoryZoneData::default();
        zones.insert("parking", 1, 0.0);
        zones.insert("parking", 2, 4.0);
        zones.insert("parking", 3, 9.0);
        let mut matrices = InMemoryMatrixProvider::default();
        let skim = SkimMatrix::from_entries(&[(1, 2, 7.0), (1, 3, 11.0)]).expect("test invariant failed");
        matrices.insert("dist", None, skim);
        ModelData::new(Arc::new(matrices), Arc::new(zones))
    }

    #[test]
    fn test_get_variable_by_scope() {
        let schema = schema();
        let data = data();
        let ids = [1, 2];
        let zones = [None, Some(3)];
        let attrs = AttributeSet::new()
            .with_scalar("income", 50_000.0)
            .with_alternative("cost", 1, 3.0)
            .with_alternative("cost", 2, 1.5);
        let context = DecisionContext::builder(9)
            .origin(1)
            .destination(2)
            .bind_with(&schema, &ids, &zones, &attrs, &data);

        assert_eq!(context.get_variable("income", None), Ok(50_000.0));
        assert_eq!(context.get_variable("k", None), Ok(2.5));
        assert_eq!(context.get_variable("cost", Some(1)), Ok(1.5));
        assert!(context.get_variable("cost", None).is_err());
        assert_eq!(context.get_variable("parking", None), Ok(4.0));
        assert_eq!(context.get_variable("dist", None), Ok(7.0));
        // the second alternative carries its own zone
        assert_eq!(context.get_variable("parking", Some(1)), Ok(9.0));
        assert_eq!(context.get_variable("dist", Some(1)), Ok(11.0));
    }

    #[test]
    fn test_bind_from_plain_map() {
        let schema = schema();
        let data = data();
        let ids = [1, 2];
        let zones = [None, None];
        let attrs: std::collections::HashMap<String, f64> =
            [(String::from("income"), 42_000.0), (String::from("cost"), 9.0)]
                .into_iter()
                .collect();
        let context = DecisionContext::builder(5).bind_with(&schema, &ids, &zones, &attrs, &data);
        assert_eq!(context.get_variable("income", None), Ok(42_000.0));
        // a plain map serves scalars only
        assert!(context.get_variable("cost", Some(0)).is_err());
    }

    #[test]
    fn test_missing_values() {
        let schema = schema();
        let data = data();
        let attrs = AttributeSet::new().with_scalar("income", f64::NAN);
        let context = DecisionContext::builder(3).bind_schema(&schema, &attrs, &data);
        let expected = |name: &str| -> Result<f64, ContextError> {
            Err(ContextError::MissingVariable {
                decision_maker_id: 3,
                name: name.to_string(),
            })
        };
        assert_eq!(context.get_variable("income", None), expected("income"));
        // no destination bound
        assert_eq!(context.get_variable("parking", None), expected("parking"));
        assert_eq!(context.get_variable("dist", None), expected("dist"));
        assert_eq!(context.get_variable("undeclared", None), expected("undeclared"));
    }
}
