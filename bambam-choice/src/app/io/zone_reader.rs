use crate::{
    app::ChoiceAppError,
    model::{context::InMemoryZoneData, ZoneId},
};
use std::{fs::File, io::Read};

pub fn read_zone_file(path: &str) -> Result<InMemoryZoneData, ChoiceAppError> {
    log::info!("reading zone data from {path}");
    let file = File::open(path)?;
    read_zones(file, path)
}

/// reads zone attributes in wide format: a `zone` column and one column per field.
pub fn read_zones<R: Read>(reader: R, source: &str) -> Result<InMemoryZoneData, ChoiceAppError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let zone_index = headers
        .iter()
        .position(|h| h == "zone")
        .ok_or_else(|| ChoiceAppError::InvalidInput {
            file: source.to_string(),
            message: String::from("missing 'zone' column"),
        })?;
    let mut zones = InMemoryZoneData::default();
    for (row, result) in csv_reader.records().enumerate() {
        let record = result?;
        let zone = record
            .get(zone_index)
            .unwrap_or_default()
            .parse::<ZoneId>()
            .map_err(|e| ChoiceAppError::InvalidInput {
                file: source.to_string(),
                message: format!("row {row}: invalid zone: {e}"),
            })?;
        for (i, (field, cell)) in headers.iter().zip(record.iter()).enumerate() {
            if i == zone_index || cell.is_empty() {
                continue;
            }
            let value = cell.parse::<f64>().map_err(|e| ChoiceAppError::InvalidInput {
                file: source.to_string(),
                message: format!("row {row}: failure parsing '{field}' value '{cell}': {e}"),
            })?;
            zones.insert(field, zone, value);
        }
    }
    Ok(zones)
}
