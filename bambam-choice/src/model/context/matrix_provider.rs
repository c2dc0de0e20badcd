use super::ContextError;
use crate::model::{TimePeriod, ZoneId};
use std::collections::HashMap;

/// read-only access to zone-to-zone skim matrices. implementations are
/// shared across worker threads.
pub trait MatrixProvider: Send + Sync {
    /// value of `matrix_name` from `origin` to `destination`. when a time period
    /// is given and the matrix has no table for it, the period-independent
    /// table is used.
    fn lookup(
        &self,
        matrix_name: &str,
        origin: ZoneId,
        destination: ZoneId,
        time_period: Option<TimePeriod>,
    ) -> Option<f64>;
}

/// a dense square matrix over a set of zones, stored row-major by origin.
#[derive(Clone, Debug)]
pub struct SkimMatrix {
    zone_index: HashMap<ZoneId, usize>,
    values: Vec<f64>,
}

impl SkimMatrix {
    /// builds a matrix from the zone list and `zones.len()^2` row-major values.
    pub fn new(zones: &[ZoneId], values: Vec<f64>) -> Result<SkimMatrix, ContextError> {
        let n = zones.len();
        if values.len() != n * n {
            return Err(ContextError::InvalidData(format!(
                "skim matrix over {n} zones expects {} values, found {}",
                n * n,
                values.len()
            )));
        }
        let mut zone_index = HashMap::with_capacity(n);
        for (i, zone) in zones.iter().enumerate() {
            if zone_index.insert(*zone, i).is_some() {
                return Err(ContextError::InvalidData(format!(
                    "zone {zone} appears more than once in skim matrix"
                )));
            }
        }
        Ok(SkimMatrix { zone_index, values })
    }

    /// builds a matrix from sparse `(origin, destination, value)` entries. cells
    /// without an entry are absent.
    pub fn from_entries(entries: &[(ZoneId, ZoneId, f64)]) -> Result<SkimMatrix, ContextError> {
        let mut zones: Vec<ZoneId> = entries.iter().flat_map(|(o, d, _)| [*o, *d]).collect();
        zones.sort_unstable();
        zones.dedup();
        let n = zones.len();
        let mut values = vec![f64::NAN; n * n];
        let index: HashMap<ZoneId, usize> = zones.iter().enumerate().map(|(i, z)| (*z, i)).collect();
        for (origin, destination, value) in entries.iter() {
            let (Some(o), Some(d)) = (index.get(origin), index.get(destination)) else {
                continue;
            };
            values[o * n + d] = *value;
        }
        SkimMatrix::new(&zones, values)
    }

    pub fn zone_count(&self) -> usize {
        self.zone_index.len()
    }

    /// the cell value, or None if either zone is not in the matrix or the cell is empty
    pub fn get(&self, origin: ZoneId, destination: ZoneId) -> Option<f64> {
        let o = self.zone_index.get(&origin)?;
        let d = self.zone_index.get(&destination)?;
        let value = *self.values.get(o * self.zone_count() + d)?;
        if value.is_nan() {
            None
        } else {
            Some(value)
        }
    }
}

/// skim matrices keyed by name and optional time period.
#[derive(Clone, Debug, Default)]
pub struct InMemoryMatrixProvider {
    matrices: HashMap<String, HashMap<Option<TimePeriod>, SkimMatrix>>,
}

impl InMemoryMatrixProvider {
    pub fn insert(&mut self, name: &str, time_period: Option<TimePeriod>, matrix: SkimMatrix) {
        self.matrices
            .entry(name.to_string())
            .or_default()
            .insert(time_period, matrix);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.matrices.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.matrices.values().map(|m| m.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }
}

impl MatrixProvider for InMemoryMatrixProvider {
    fn lookup(
        &self,
        matrix_name: &str,
        origin: ZoneId,
        destination: ZoneId,
        time_period: Option<TimePeriod>,
    ) -> Option<f64> {
        let tables = self.matrices.get(matrix_name)?;
        let table = match time_period {
            Some(_) => tables.get(&time_period).or_else(|| tables.get(&None)),
            None => tables.get(&None),
        }?;
        table.get(origin, destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skim_dimensions_checked() {
        let result = SkimMatrix::new(&[1, 2, 3], vec![0.0; 8]);
        assert!(matches!(result, Err(ContextError::InvalidData(_))));
    }

    #[test]
    fn test_sparse_entries() {
        let skim = SkimMatrix::from_entries(&[(10, 20, 5.0), (20, 10, 6.0), (10, 10, 1.0)])
            .expect("test invariant failed");
        assert_eq!(skim.get(10, 20), Some(5.0));
        assert_eq!(skim.get(20, 10), Some(6.0));
        assert_eq!(skim.get(20, 20), None);
        assert_eq!(skim.get(30, 10), None);
    }

    #[test]
    fn test_period_falls_back_to_default_table() {
        let mut provider = InMemoryMatrixProvider::default();
        let all_day = SkimMatrix::new(&[1, 2], vec![0.0, 10.0, 10.0, 0.0]).expect("test invariant failed");
        let am = SkimMatrix::new(&[1, 2], vec![0.0, 15.0, 12.0, 0.0]).expect("test invariant failed");
        provider.insert("sov_time", None, all_day);
        provider.insert("sov_time", Some(1), am);

        assert_eq!(provider.lookup("sov_time", 1, 2, Some(1)), Some(15.0));
        assert_eq!(provider.lookup("sov_time", 1, 2, Some(3)), Some(10.0));
        assert_eq!(provider.lookup("sov_time", 1, 2, None), Some(10.0));
        assert_eq!(provider.lookup("transit_time", 1, 2, None), None);
    }
}
