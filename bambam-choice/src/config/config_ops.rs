use crate::app::ChoiceAppError;
use serde::de::DeserializeOwned;

/// reads a `.toml` or `.json` file into a configuration type, by file extension.
pub fn read_config_file<T: DeserializeOwned>(f: &str) -> Result<T, ChoiceAppError> {
    let read = || {
        std::fs::read_to_string(f)
            .map_err(|e| ChoiceAppError::ConfigurationError(format!("failure reading {f}: {e}")))
    };
    if f.ends_with(".toml") {
        let s = read()?;
        toml::from_str(&s)
            .map_err(|e| ChoiceAppError::ConfigurationError(format!("failure decoding {f}: {e}")))
    } else if f.ends_with(".json") {
        let s = read()?;
        serde_json::from_str(&s)
            .map_err(|e| ChoiceAppError::ConfigurationError(format!("failure decoding {f}: {e}")))
    } else {
        Err(ChoiceAppError::ConfigurationError(format!(
            "unsupported file type: {f}"
        )))
    }
}
