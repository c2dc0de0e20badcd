use crate::{
    app::{batch::DecisionMakerFailure, ChoiceAppError},
    model::{
        choice::{ChoiceOutputMode, ChoiceResult},
        spec::ModelSpec,
    },
};
use std::{fs::File, io::Write};

pub fn write_results_file(
    path: &str,
    spec: &ModelSpec,
    mode: ChoiceOutputMode,
    results: &[ChoiceResult],
) -> Result<(), ChoiceAppError> {
    log::info!("writing {} results to {path}", results.len());
    let file = File::create(path)?;
    write_results(file, spec, mode, results)
}

/// writes one row per decision maker: its id, then the chosen alternative id,
/// the logsum and one `p_<alternative name>` column per alternative, as
/// selected by `mode`.
pub fn write_results<W: Write>(
    writer: W,
    spec: &ModelSpec,
    mode: ChoiceOutputMode,
    results: &[ChoiceResult],
) -> Result<(), ChoiceAppError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    let mut header = vec![String::from("decision_maker_id")];
    if mode.includes_choice() {
        header.push(String::from("chosen"));
    }
    if mode.includes_logsum() {
        header.push(String::from("logsum"));
    }
    if mode.includes_probabilities() {
        header.extend(spec.alternatives().iter().map(|a| format!("p_{}", a.name)));
    }
    csv_writer.write_record(&header)?;
    for result in results.iter() {
        let mut row = vec![result.decision_maker_id.to_string()];
        if mode.includes_choice() {
            row.push(result.chosen.map(|c| c.to_string()).unwrap_or_default());
        }
        if mode.includes_logsum() {
            row.push(result.logsum.map(|l| l.to_string()).unwrap_or_default());
        }
        if mode.includes_probabilities() {
            match &result.probabilities {
                Some(probabilities) => row.extend(probabilities.iter().map(|p| p.to_string())),
                None => row.extend(std::iter::repeat_n(String::new(), spec.len())),
            }
        }
        csv_writer.write_record(&row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_failures_file(path: &str, failures: &[DecisionMakerFailure]) -> Result<(), ChoiceAppError> {
    log::info!("writing {} failures to {path}", failures.len());
    let file = File::create(path)?;
    write_failures(file, failures)
}

pub fn write_failures<W: Write>(
    writer: W,
    failures: &[DecisionMakerFailure],
) -> Result<(), ChoiceAppError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for failure in failures.iter() {
        csv_writer.serialize(failure)?;
    }
    csv_writer.flush()?;
    Ok(())
}
