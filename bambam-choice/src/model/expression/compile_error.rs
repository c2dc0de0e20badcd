use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("syntax error at position {position}: {message}")]
    SyntaxError { position: usize, message: String },
    #[error("unknown variable '{name}' at position {position}, not declared in the variable schema")]
    UnknownVariable { name: String, position: usize },
    #[error("nest '{nest}' has scale parameter {theta}, which must be within (0, 1]")]
    InvalidNestParameter { nest: String, theta: f64 },
    #[error("variable '{0}' is declared more than once")]
    DuplicateVariable(String),
    #[error("invalid model specification: {0}")]
    InvalidModelSpec(String),
    #[error("failure compiling {field} of alternative '{alternative}': {source}")]
    AlternativeExpression {
        alternative: String,
        field: String,
        source: Box<CompileError>,
    },
}

impl CompileError {
    pub fn syntax(position: usize, message: impl Into<String>) -> CompileError {
        CompileError::SyntaxError {
            position,
            message: message.into(),
        }
    }

    /// wraps this error with the alternative and field it was raised for.
    pub fn in_alternative(self, alternative: &str, field: &str) -> CompileError {
        CompileError::AlternativeExpression {
            alternative: alternative.to_string(),
            field: field.to_string(),
            source: Box::new(self),
        }
    }

    /// the innermost error, with any alternative context removed.
    pub fn root_cause(&self) -> &CompileError {
        match self {
            CompileError::AlternativeExpression { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
