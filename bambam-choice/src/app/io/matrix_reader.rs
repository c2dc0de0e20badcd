use crate::{
    app::ChoiceAppError,
    model::{
        context::{InMemoryMatrixProvider, SkimMatrix},
        TimePeriod, ZoneId,
    },
};
use itertools::Itertools;
use serde::Deserialize;
use std::{fs::File, io::Read};

#[derive(Debug, Deserialize)]
struct MatrixRow {
    matrix: String,
    #[serde(default)]
    period: Option<TimePeriod>,
    origin: ZoneId,
    destination: ZoneId,
    value: f64,
}

pub fn read_matrix_file(path: &str) -> Result<InMemoryMatrixProvider, ChoiceAppError> {
    log::info!("reading skim matrices from {path}");
    let file = File::open(path)?;
    read_matrices(file)
}

/// reads skim matrices in long format, one `matrix,period,origin,destination,value`
/// row per cell. an empty period is the period-independent table.
pub fn read_matrices<R: Read>(reader: R) -> Result<InMemoryMatrixProvider, ChoiceAppError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let rows = csv_reader
        .deserialize::<MatrixRow>()
        .collect::<Result<Vec<_>, _>>()?;
    let tables = rows
        .into_iter()
        .into_group_map_by(|row| (row.matrix.clone(), row.period));
    let mut provider = InMemoryMatrixProvider::default();
    for ((name, period), cells) in tables.into_iter().sorted_by(|a, b| a.0.cmp(&b.0)) {
        let entries = cells
            .iter()
            .map(|c| (c.origin, c.destination, c.value))
            .collect_vec();
        let matrix = SkimMatrix::from_entries(&entries)?;
        log::debug!(
            "matrix '{name}' period {period:?}: {} zones, {} cells",
            matrix.zone_count(),
            entries.len()
        );
        provider.insert(&name, period, matrix);
    }
    Ok(provider)
}
