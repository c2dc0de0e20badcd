mod choice_error;
mod choice_model;
mod choice_output_mode;
mod choice_result;

pub use choice_error::ChoiceError;
pub use choice_model::{ChoiceModel, EvaluatedChoice};
pub use choice_output_mode::ChoiceOutputMode;
pub use choice_result::ChoiceResult;
