mod utility_ops;
mod utility_trace;
mod utility_vector;

pub use utility_ops::{
    evaluate, evaluate_availability, evaluate_utilities, evaluate_utility, trace_utilities,
};
pub use utility_trace::{AlternativeTrace, TermTrace, UtilityTrace, TRACE_TARGET};
pub use utility_vector::UtilityVector;
