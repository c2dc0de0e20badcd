use super::{AlternativeConfig, CoefficientConfig};
use crate::model::{
    expression::{CompileError, CompiledExpression},
    schema::{VariableDeclaration, VariableSchema},
    AlternativeId, ZoneId,
};

/// one additive component of an alternative's utility.
#[derive(Clone, Debug)]
pub struct UtilityTerm {
    pub description: Option<String>,
    pub expression: CompiledExpression,
    pub coefficient: f64,
}

/// a compiled alternative. its utility is the sum of coefficient × value over
/// its terms.
#[derive(Clone, Debug)]
pub struct AlternativeSpec {
    pub id: AlternativeId,
    pub name: String,
    pub terms: Vec<UtilityTerm>,
    /// always available when None
    pub availability: Option<CompiledExpression>,
    pub zone: Option<ZoneId>,
}

impl AlternativeSpec {
    pub fn compile(
        config: &AlternativeConfig,
        schema: &VariableSchema,
    ) -> Result<AlternativeSpec, CompileError> {
        let name = config.name.as_str();
        if config.utility.is_none() && config.terms.is_empty() {
            return Err(CompileError::InvalidModelSpec(format!(
                "alternative '{name}' has neither a utility expression nor utility terms"
            )));
        }
        let mut terms = Vec::with_capacity(config.terms.len() + 1);
        if let Some(utility) = &config.utility {
            let expression = CompiledExpression::compile(utility, schema)
                .map_err(|e| e.in_alternative(name, "utility"))?;
            terms.push(UtilityTerm {
                description: None,
                expression,
                coefficient: 1.0,
            });
        }
        for (index, term) in config.terms.iter().enumerate() {
            let field = match &term.description {
                Some(d) => format!("term '{d}'"),
                None => format!("term {index}"),
            };
            let expression = CompiledExpression::compile(&term.expression, schema)
                .map_err(|e| e.in_alternative(name, &field))?;
            let coefficient = resolve_coefficient(&term.coefficient, schema)
                .map_err(|e| e.in_alternative(name, &field))?;
            terms.push(UtilityTerm {
                description: term.description.clone(),
                expression,
                coefficient,
            });
        }
        let availability = config
            .availability
            .as_ref()
            .map(|text| CompiledExpression::compile(text, schema))
            .transpose()
            .map_err(|e| e.in_alternative(name, "availability"))?;
        Ok(AlternativeSpec {
            id: config.id,
            name: config.name.clone(),
            terms,
            availability,
            zone: config.zone,
        })
    }

    /// an alternative with a single utility expression
    pub fn new(
        id: AlternativeId,
        name: &str,
        utility: CompiledExpression,
        availability: Option<CompiledExpression>,
    ) -> AlternativeSpec {
        AlternativeSpec {
            id,
            name: name.to_string(),
            terms: vec![UtilityTerm {
                description: None,
                expression: utility,
                coefficient: 1.0,
            }],
            availability,
            zone: None,
        }
    }
}

fn resolve_coefficient(
    coefficient: &CoefficientConfig,
    schema: &VariableSchema,
) -> Result<f64, CompileError> {
    match coefficient {
        CoefficientConfig::Value(v) if v.is_finite() => Ok(*v),
        CoefficientConfig::Value(v) => Err(CompileError::InvalidModelSpec(format!(
            "coefficient {v} is not finite"
        ))),
        CoefficientConfig::Named(name) => match schema.get(name) {
            Some(VariableDeclaration::Constant { value }) => Ok(*value),
            Some(other) => Err(CompileError::InvalidModelSpec(format!(
                "coefficient '{name}' must be a constant, found a {} variable",
                other.scope()
            ))),
            None => Err(CompileError::UnknownVariable {
                name: name.clone(),
                position: 0,
            }),
        },
    }
}
