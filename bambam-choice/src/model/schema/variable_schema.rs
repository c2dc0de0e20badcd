use super::VariableScope;
use crate::model::expression::CompileError;
use std::collections::{BTreeMap, HashMap};

/// how a declared variable is stored. scalar and alternative variables
/// are assigned dense slots so that a bound decision context can serve
/// them without hashing names.
#[derive(Clone, Debug, PartialEq)]
pub enum VariableDeclaration {
    Scalar { slot: usize },
    Alternative { slot: usize },
    Zone,
    Matrix,
    Constant { value: f64 },
}

impl VariableDeclaration {
    pub fn scope(&self) -> VariableScope {
        match self {
            VariableDeclaration::Scalar { .. } => VariableScope::Scalar,
            VariableDeclaration::Alternative { .. } => VariableScope::Alternative,
            VariableDeclaration::Zone => VariableScope::Zone,
            VariableDeclaration::Matrix => VariableScope::Matrix,
            VariableDeclaration::Constant { .. } => VariableScope::Constant,
        }
    }
}

/// every variable name an expression may reference, along with its scope.
#[derive(Clone, Debug, Default)]
pub struct VariableSchema {
    declarations: HashMap<String, VariableDeclaration>,
    scalar_names: Vec<String>,
    alternative_names: Vec<String>,
}

impl VariableSchema {
    pub fn new() -> VariableSchema {
        VariableSchema::default()
    }

    /// builds a schema from the declaration tables of a model specification.
    /// slots are assigned in name order.
    pub fn from_declarations(
        variables: &BTreeMap<String, VariableScope>,
        constants: &BTreeMap<String, f64>,
    ) -> Result<VariableSchema, CompileError> {
        let mut schema = VariableSchema::new();
        for (name, scope) in variables.iter() {
            schema.declare(name, *scope)?;
        }
        for (name, value) in constants.iter() {
            schema.declare_constant(name, *value)?;
        }
        Ok(schema)
    }

    pub fn declare(&mut self, name: &str, scope: VariableScope) -> Result<(), CompileError> {
        self.check_name(name)?;
        let declaration = match scope {
            VariableScope::Scalar => {
                let slot = self.scalar_names.len();
                self.scalar_names.push(name.to_string());
                VariableDeclaration::Scalar { slot }
            }
            VariableScope::Alternative => {
                let slot = self.alternative_names.len();
                self.alternative_names.push(name.to_string());
                VariableDeclaration::Alternative { slot }
            }
            VariableScope::Zone => VariableDeclaration::Zone,
            VariableScope::Matrix => VariableDeclaration::Matrix,
            VariableScope::Constant => {
                return Err(CompileError::InvalidModelSpec(format!(
                    "constant '{name}' must be declared with a value"
                )))
            }
        };
        self.declarations.insert(name.to_string(), declaration);
        Ok(())
    }

    pub fn declare_constant(&mut self, name: &str, value: f64) -> Result<(), CompileError> {
        self.check_name(name)?;
        if !value.is_finite() {
            return Err(CompileError::InvalidModelSpec(format!(
                "constant '{name}' has non-finite value {value}"
            )));
        }
        self.declarations
            .insert(name.to_string(), VariableDeclaration::Constant { value });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&VariableDeclaration> {
        self.declarations.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.declarations.contains_key(name)
    }

    /// scalar variable names, ordered by slot
    pub fn scalar_names(&self) -> &[String] {
        &self.scalar_names
    }

    /// alternative-indexed variable names, ordered by slot
    pub fn alternative_names(&self) -> &[String] {
        &self.alternative_names
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &VariableDeclaration)> {
        self.declarations.iter()
    }

    fn check_name(&self, name: &str) -> Result<(), CompileError> {
        let mut chars = name.chars();
        let valid = match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            _ => false,
        };
        if !valid {
            return Err(CompileError::InvalidModelSpec(format!(
                "'{name}' is not a valid variable name"
            )));
        }
        if self.declarations.contains_key(name) {
            return Err(CompileError::DuplicateVariable(name.to_string()));
        }
        Ok(())
    }
}
