use crate::{
    app::{
        batch::{run_batch, BatchReport},
        io, ChoiceAppError,
    },
    config::{read_config_file, ChoiceRunConfig},
    model::{
        choice::ChoiceModel,
        context::{InMemoryMatrixProvider, InMemoryZoneData, ModelData},
        spec::{ModelSpec, ModelSpecConfig},
    },
};
use std::sync::{atomic::AtomicBool, Arc};

/// compiles the model, loads the population and model data, runs every
/// decision maker and writes the results.
pub fn run(config: &ChoiceRunConfig) -> Result<BatchReport, ChoiceAppError> {
    run_with_cancellation(config, &AtomicBool::new(false))
}

pub fn run_with_cancellation(
    config: &ChoiceRunConfig,
    cancel: &AtomicBool,
) -> Result<BatchReport, ChoiceAppError> {
    let spec = validate(&config.model_spec_file)?;
    let model = ChoiceModel::new(spec, config.seed)
        .with_trace(config.trace_decision_makers.iter().copied());

    let matrices = match &config.matrices_file {
        Some(f) => io::read_matrix_file(f)?,
        None => InMemoryMatrixProvider::default(),
    };
    let zones = match &config.zones_file {
        Some(f) => io::read_zone_file(f)?,
        None => InMemoryZoneData::default(),
    };
    let data = ModelData::new(Arc::new(matrices), Arc::new(zones));
    let records = io::read_population_file(&config.population_file)?;

    let report = run_batch(&model, &data, &records, &config.batch_options(), cancel)?;
    io::write_results_file(
        &config.output_file,
        model.spec(),
        config.output_mode,
        &report.results,
    )?;
    match &config.failures_file {
        Some(f) => io::write_failures_file(f, &report.failures)?,
        None if !report.failures.is_empty() => log::warn!(
            "{} decision makers failed, set failures_file to record them",
            report.failures.len()
        ),
        None => {}
    }
    Ok(report)
}

/// reads and compiles a model specification file, logging a summary.
pub fn validate(model_spec_file: &str) -> Result<ModelSpec, ChoiceAppError> {
    log::info!("reading model specification from {model_spec_file}");
    let config: ModelSpecConfig = read_config_file(model_spec_file)?;
    let spec = ModelSpec::compile(&config)?;
    for alt in spec.alternatives().iter() {
        log::info!(
            "  alternative {} '{}': {} utility terms{}",
            alt.id,
            alt.name,
            alt.terms.len(),
            if alt.availability.is_some() {
                ", with availability"
            } else {
                ""
            }
        );
    }
    for nest in spec.nests().nests().iter() {
        log::info!(
            "  nest '{}' theta={} with {} children",
            nest.name,
            nest.theta,
            nest.children.len()
        );
    }
    Ok(spec)
}
