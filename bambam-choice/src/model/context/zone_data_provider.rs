use crate::model::ZoneId;
use std::collections::HashMap;

/// read-only access to per-zone attributes such as parking cost or employment.
pub trait ZoneDataProvider: Send + Sync {
    fn lookup(&self, field: &str, zone: ZoneId) -> Option<f64>;
}

#[derive(Clone, Debug, Default)]
pub struct InMemoryZoneData {
    fields: HashMap<String, HashMap<ZoneId, f64>>,
}

impl InMemoryZoneData {
    pub fn insert(&mut self, field: &str, zone: ZoneId, value: f64) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .insert(zone, value);
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(|k| k.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl ZoneDataProvider for InMemoryZoneData {
    fn lookup(&self, field: &str, zone: ZoneId) -> Option<f64> {
        self.fields
            .get(field)
            .and_then(|zones| zones.get(&zone))
            .copied()
            .filter(|v| !v.is_nan())
    }
}
