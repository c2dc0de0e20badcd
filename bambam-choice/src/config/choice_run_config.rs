use super::read_config_file;
use crate::{
    app::{batch::BatchOptions, ChoiceAppError},
    model::{choice::ChoiceOutputMode, DecisionMakerId},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// inputs, outputs and execution parameters of a batch choice run. relative
/// file paths are resolved against the directory of the configuration file.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct ChoiceRunConfig {
    pub model_spec_file: String,
    pub population_file: String,
    #[serde(default)]
    pub matrices_file: Option<String>,
    #[serde(default)]
    pub zones_file: Option<String>,
    pub output_file: String,
    #[serde(default)]
    pub failures_file: Option<String>,
    #[serde(default)]
    pub output_mode: ChoiceOutputMode,
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// decision makers whose utility breakdown is logged and attached to their result
    #[serde(default)]
    pub trace_decision_makers: Vec<DecisionMakerId>,
    #[serde(default)]
    pub show_progress: bool,
}

impl ChoiceRunConfig {
    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            output_mode: self.output_mode,
            batch_size: self.batch_size,
            parallelism: self.parallelism,
            show_progress: self.show_progress,
        }
    }

    /// rewrites relative file paths to be relative to `base`
    pub fn resolve_paths(mut self, base: &Path) -> ChoiceRunConfig {
        let resolve = |f: &String| {
            let path = Path::new(f);
            if path.is_absolute() {
                f.clone()
            } else {
                base.join(path).to_string_lossy().to_string()
            }
        };
        self.model_spec_file = resolve(&self.model_spec_file);
        self.population_file = resolve(&self.population_file);
        self.output_file = resolve(&self.output_file);
        self.matrices_file = self.matrices_file.as_ref().map(resolve);
        self.zones_file = self.zones_file.as_ref().map(resolve);
        self.failures_file = self.failures_file.as_ref().map(resolve);
        self
    }
}

fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn default_batch_size() -> usize {
    1000
}

impl TryFrom<&String> for ChoiceRunConfig {
    type Error = ChoiceAppError;

    fn try_from(f: &String) -> Result<Self, Self::Error> {
        let config: ChoiceRunConfig = read_config_file(f)?;
        if config.batch_size == 0 {
            return Err(ChoiceAppError::ConfigurationError(format!(
                "batch_size in {f} must be positive"
            )));
        }
        let base = Path::new(f).parent().unwrap_or_else(|| Path::new(""));
        Ok(config.resolve_paths(base))
    }
}
