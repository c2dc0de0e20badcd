use super::{BatchReport, DecisionMakerFailure, DecisionMakerRecord};
use crate::{
    app::ChoiceAppError,
    model::{
        choice::{ChoiceModel, ChoiceOutputMode, ChoiceResult},
        context::ModelData,
    },
};
use kdam::{Bar, BarExt};
use rayon::prelude::*;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

#[derive(Clone, Debug)]
pub struct BatchOptions {
    pub output_mode: ChoiceOutputMode,
    /// decision makers per unit of parallel work, and the granularity of cancellation
    pub batch_size: usize,
    pub parallelism: usize,
    pub show_progress: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            output_mode: ChoiceOutputMode::default(),
            batch_size: 1000,
            parallelism: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            show_progress: false,
        }
    }
}

/// runs a choice model over a population in parallel chunks of
/// `batch_size` decision makers. a decision maker that fails is reported in
/// [`BatchReport::failures`] and does not stop the batch. once `cancel` is set
/// no new chunk is started, and the records of unstarted chunks are counted as
/// skipped. results keep the order of `records`.
pub fn run_batch(
    model: &ChoiceModel,
    data: &ModelData,
    records: &[DecisionMakerRecord],
    options: &BatchOptions,
    cancel: &AtomicBool,
) -> Result<BatchReport, ChoiceAppError> {
    let batch_size = options.batch_size.max(1);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.parallelism.max(1))
        .build()
        .map_err(|e| ChoiceAppError::InternalError(format!("failure building thread pool: {e}")))?;
    let bar = if options.show_progress {
        let bar = Bar::builder()
            .desc(format!("model {}", model.spec().name()))
            .total(records.len())
            .build()
            .map_err(|e| ChoiceAppError::InternalError(format!("error building progress bar: {e}")))?;
        Some(Arc::new(Mutex::new(bar)))
    } else {
        None
    };

    log::info!(
        "running model '{}' for {} decision makers in chunks of {batch_size} on {} threads",
        model.spec().name(),
        records.len(),
        pool.current_num_threads()
    );
    let outcomes: Vec<Option<Vec<Result<ChoiceResult, DecisionMakerFailure>>>> = pool.install(|| {
        records
            .par_chunks(batch_size)
            .map(|chunk| {
                if cancel.load(Ordering::Relaxed) {
                    return None;
                }
                let chunk_outcomes = chunk
                    .iter()
                    .map(|record| run_one(model, data, record, options.output_mode))
                    .collect::<Vec<_>>();
                if let Some(bar) = &bar {
                    if let Ok(mut bar) = bar.lock() {
                        let _ = bar.update(chunk.len());
                    }
                }
                Some(chunk_outcomes)
            })
            .collect()
    });
    if bar.is_some() {
        eprintln!();
    }

    let mut report = BatchReport::default();
    for (chunk, chunk_outcomes) in records.chunks(batch_size).zip(outcomes) {
        match chunk_outcomes {
            None => report.skipped += chunk.len(),
            Some(chunk_outcomes) => {
                for outcome in chunk_outcomes {
                    match outcome {
                        Ok(result) => report.results.push(result),
                        Err(failure) => report.failures.push(failure),
                    }
                }
            }
        }
    }
    log::info!(
        "model '{}' finished with {} results, {} failures and {} skipped",
        model.spec().name(),
        report.results.len(),
        report.failures.len(),
        report.skipped
    );
    Ok(report)
}

fn run_one(
    model: &ChoiceModel,
    data: &ModelData,
    record: &DecisionMakerRecord,
    mode: ChoiceOutputMode,
) -> Result<ChoiceResult, DecisionMakerFailure> {
    let context = record.bind(model.spec(), data);
    model.run(&context, mode).map_err(|e| {
        log::warn!("decision maker {} failed: {e}", record.id);
        DecisionMakerFailure {
            decision_maker_id: record.id,
            model: model.spec().name().to_string(),
            message: e.to_string(),
        }
    })
}
