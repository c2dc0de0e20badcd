use crate::model::{context::ContextError, expression::CompileError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChoiceAppError {
    #[error("failure reading run configuration: {0}")]
    ConfigurationError(String),
    #[error("failure compiling model specification: {source}")]
    CompileError {
        #[from]
        source: CompileError,
    },
    #[error("invalid model data: {source}")]
    ContextError {
        #[from]
        source: ContextError,
    },
    #[error("failure reading or writing file: {source}")]
    StdIoError {
        #[from]
        source: std::io::Error,
    },
    #[error("failure reading or writing CSV: {source}")]
    CsvError {
        #[from]
        source: csv::Error,
    },
    #[error("invalid input in {file}: {message}")]
    InvalidInput { file: String, message: String },
    #[error("{0}")]
    InternalError(String),
}
