use crate::{
    app::{batch::DecisionMakerRecord, ChoiceAppError},
    model::{AlternativeId, DecisionMakerId, TimePeriod, ZoneId},
};
use std::{fs::File, io::Read};

enum Column {
    Id,
    Origin,
    Destination,
    Period,
    Scalar(String),
    Alternative(String, AlternativeId),
}

impl Column {
    /// `name[3]` is the value of `name` for alternative 3
    fn from_header(header: &str) -> Column {
        match header {
            "id" => Column::Id,
            "origin" => Column::Origin,
            "destination" => Column::Destination,
            "period" => Column::Period,
            _ => {
                let indexed = header
                    .strip_suffix(']')
                    .and_then(|h| h.split_once('['))
                    .and_then(|(name, alt)| alt.trim().parse::<AlternativeId>().ok().map(|a| (name, a)));
                match indexed {
                    Some((name, alternative)) => Column::Alternative(name.trim().to_string(), alternative),
                    None => Column::Scalar(header.to_string()),
                }
            }
        }
    }
}

pub fn read_population_file(path: &str) -> Result<Vec<DecisionMakerRecord>, ChoiceAppError> {
    log::info!("reading population from {path}");
    let file = File::open(path)?;
    read_population(file, path)
}

/// reads a population CSV with an `id` column, optional `origin`,
/// `destination` and `period` columns, and one column per attribute. empty
/// cells are missing values.
pub fn read_population<R: Read>(
    reader: R,
    source: &str,
) -> Result<Vec<DecisionMakerRecord>, ChoiceAppError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let columns: Vec<Column> = csv_reader.headers()?.iter().map(Column::from_header).collect();
    if !columns.iter().any(|c| matches!(c, Column::Id)) {
        return Err(invalid(source, String::from("missing 'id' column")));
    }
    let mut records = vec![];
    for (row, result) in csv_reader.records().enumerate() {
        let row_values = result?;
        let mut record = DecisionMakerRecord::default();
        let mut id = None;
        for (column, cell) in columns.iter().zip(row_values.iter()) {
            if cell.is_empty() {
                continue;
            }
            let parse_error = |e: &dyn std::fmt::Display| {
                invalid(source, format!("row {row}: failure parsing '{cell}': {e}"))
            };
            match column {
                Column::Id => {
                    id = Some(
                        cell.parse::<DecisionMakerId>()
                            .map_err(|e| parse_error(&e))?,
                    )
                }
                Column::Origin => {
                    record.origin = Some(cell.parse::<ZoneId>().map_err(|e| parse_error(&e))?)
                }
                Column::Destination => {
                    record.destination = Some(cell.parse::<ZoneId>().map_err(|e| parse_error(&e))?)
                }
                Column::Period => {
                    record.time_period = Some(cell.parse::<TimePeriod>().map_err(|e| parse_error(&e))?)
                }
                Column::Scalar(name) => {
                    let value = cell.parse::<f64>().map_err(|e| parse_error(&e))?;
                    record.attributes.insert_scalar(name, value);
                }
                Column::Alternative(name, alternative) => {
                    let value = cell.parse::<f64>().map_err(|e| parse_error(&e))?;
                    record.attributes.insert_alternative(name, *alternative, value);
                }
            }
        }
        record.id = id.ok_or_else(|| invalid(source, format!("row {row}: missing id")))?;
        records.push(record);
    }
    log::info!("read {} decision makers from {source}", records.len());
    Ok(records)
}

fn invalid(file: &str, message: String) -> ChoiceAppError {
    ChoiceAppError::InvalidInput {
        file: file.to_string(),
        message,
    }
}
