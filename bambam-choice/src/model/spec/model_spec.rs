use super::{AlternativeSpec, ModelSpecConfig, NestConfig, NestTree};
use crate::model::{
    expression::CompileError, schema::VariableSchema, AlternativeId, ZoneId,
};
use std::collections::HashMap;

/// a compiled choice model: ordered alternatives, their nesting, and the
/// variable schema their expressions were compiled against. built once and
/// shared read-only by every decision.
#[derive(Clone, Debug)]
pub struct ModelSpec {
    name: String,
    schema: VariableSchema,
    alternatives: Vec<AlternativeSpec>,
    alternative_ids: Vec<AlternativeId>,
    alternative_zones: Vec<Option<ZoneId>>,
    positions: HashMap<AlternativeId, usize>,
    nests: NestTree,
}

impl ModelSpec {
    /// compiles every expression in the configuration and validates its structure.
    pub fn compile(config: &ModelSpecConfig) -> Result<ModelSpec, CompileError> {
        let schema = VariableSchema::from_declarations(&config.variables, &config.constants)?;
        let alternatives = config
            .alternatives
            .iter()
            .map(|alt| AlternativeSpec::compile(alt, &schema))
            .collect::<Result<Vec<_>, _>>()?;
        let spec = ModelSpec::new(&config.name, schema, alternatives, config.nests.as_ref())?;
        log::info!(
            "compiled model '{}' with {} alternatives, {} nests and {} declared variables",
            spec.name,
            spec.alternatives.len(),
            spec.nests.len(),
            spec.schema.len()
        );
        Ok(spec)
    }

    /// assembles a model from alternatives already compiled against `schema`.
    pub fn new(
        name: &str,
        schema: VariableSchema,
        alternatives: Vec<AlternativeSpec>,
        nests: Option<&NestConfig>,
    ) -> Result<ModelSpec, CompileError> {
        if alternatives.is_empty() {
            return Err(CompileError::InvalidModelSpec(format!(
                "model '{name}' has no alternatives"
            )));
        }
        let mut positions = HashMap::with_capacity(alternatives.len());
        for (position, alt) in alternatives.iter().enumerate() {
            if positions.insert(alt.id, position).is_some() {
                return Err(CompileError::InvalidModelSpec(format!(
                    "alternative id {} is used more than once in model '{name}'",
                    alt.id
                )));
            }
        }
        let nests = match nests {
            Some(config) => NestTree::from_config(config, &positions)?,
            None => NestTree::flat(alternatives.len()),
        };
        Ok(ModelSpec {
            name: name.to_string(),
            schema,
            alternative_ids: alternatives.iter().map(|a| a.id).collect(),
            alternative_zones: alternatives.iter().map(|a| a.zone).collect(),
            alternatives,
            positions,
            nests,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &VariableSchema {
        &self.schema
    }

    pub fn alternatives(&self) -> &[AlternativeSpec] {
        &self.alternatives
    }

    pub fn alternative(&self, position: usize) -> Option<&AlternativeSpec> {
        self.alternatives.get(position)
    }

    /// alternative ids in model order
    pub fn alternative_ids(&self) -> &[AlternativeId] {
        &self.alternative_ids
    }

    pub fn alternative_zones(&self) -> &[Option<ZoneId>] {
        &self.alternative_zones
    }

    /// the position of an alternative id in model order
    pub fn position(&self, id: AlternativeId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    pub fn nests(&self) -> &NestTree {
        &self.nests
    }

    pub fn len(&self) -> usize {
        self.alternatives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }
}
