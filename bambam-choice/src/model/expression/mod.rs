//! compiles human-authored utility expressions into an immutable tree whose
//! variable leaves are already resolved against a [`VariableSchema`]. the
//! pipeline is tokenize -> recursive descent parse -> resolve (+ constant folding).
mod ast;
mod compile_error;
mod compiled_expression;
mod function;
mod parser;
mod token;

pub use ast::{BinaryOp, Expr, IndexArg, UnaryOp};
pub use compile_error::CompileError;
pub use compiled_expression::{CompiledExpression, PeriodRef, ResolvedVariable, ZoneRef};
pub use function::BuiltinFunction;
pub use parser::parse;
pub use token::{tokenize, Token, TokenKind};

use crate::model::schema::VariableSchema;

/// compiles an expression against a variable schema. every variable referenced
/// by the expression must be declared in the schema.
pub fn compile(text: &str, schema: &VariableSchema) -> Result<CompiledExpression, CompileError> {
    CompiledExpression::compile(text, schema)
}
