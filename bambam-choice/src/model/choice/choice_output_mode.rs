use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// what a choice model produces for each decision maker.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ChoiceOutputMode {
    /// a simulated choice
    #[default]
    Choice,
    /// the probability of every alternative
    Probabilities,
    /// only the root logsum, for use as an accessibility measure upstream
    Logsum,
    /// the choice, probabilities and logsum
    All,
}

impl ChoiceOutputMode {
    pub fn includes_choice(&self) -> bool {
        matches!(self, ChoiceOutputMode::Choice | ChoiceOutputMode::All)
    }

    pub fn includes_probabilities(&self) -> bool {
        matches!(self, ChoiceOutputMode::Probabilities | ChoiceOutputMode::All)
    }

    pub fn includes_logsum(&self) -> bool {
        matches!(self, ChoiceOutputMode::Logsum | ChoiceOutputMode::All)
    }
}

impl Display for ChoiceOutputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ChoiceOutputMode::Choice => "choice",
            ChoiceOutputMode::Probabilities => "probabilities",
            ChoiceOutputMode::Logsum => "logsum",
            ChoiceOutputMode::All => "all",
        };
        write!(f, "{s}")
    }
}
