mod choice_run_config;
mod config_ops;

pub use choice_run_config::ChoiceRunConfig;
pub use config_ops::read_config_file;
