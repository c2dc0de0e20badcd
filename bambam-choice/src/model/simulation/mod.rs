mod choice_seed;
mod choice_simulator;

pub use choice_seed::derive_seed;
pub use choice_simulator::{select_alternative, ChoiceSimulator, NORMALIZATION_TOLERANCE};
