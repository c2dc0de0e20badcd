pub mod batch;
pub mod io;
pub mod run;

mod choice_app_error;

pub use choice_app_error::ChoiceAppError;
