mod variable_schema;
mod variable_scope;

pub use variable_schema::{VariableDeclaration, VariableSchema};
pub use variable_scope::VariableScope;
