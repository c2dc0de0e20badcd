use crate::model::AlternativeId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// source of decision-maker attributes read when binding a [`super::DecisionContext`].
pub trait AttributeProvider {
    /// value of a decision-maker level attribute
    fn scalar(&self, name: &str) -> Option<f64>;

    /// value of an attribute that varies by alternative
    fn alternative(&self, _name: &str, _alternative: AlternativeId) -> Option<f64> {
        None
    }
}

/// attributes of a single decision maker held in memory.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AttributeSet {
    #[serde(default)]
    pub scalars: HashMap<String, f64>,
    #[serde(default)]
    pub alternatives: HashMap<String, HashMap<AlternativeId, f64>>,
}

impl AttributeSet {
    pub fn new() -> AttributeSet {
        AttributeSet::default()
    }

    pub fn with_scalar(mut self, name: &str, value: f64) -> AttributeSet {
        self.insert_scalar(name, value);
        self
    }

    pub fn with_alternative(mut self, name: &str, alternative: AlternativeId, value: f64) -> AttributeSet {
        self.insert_alternative(name, alternative, value);
        self
    }

    pub fn insert_scalar(&mut self, name: &str, value: f64) {
        self.scalars.insert(name.to_string(), value);
    }

    pub fn insert_alternative(&mut self, name: &str, alternative: AlternativeId, value: f64) {
        self.alternatives
            .entry(name.to_string())
            .or_default()
            .insert(alternative, value);
    }

    pub fn is_empty(&self) -> bool {
        self.scalars.is_empty() && self.alternatives.is_empty()
    }
}

impl AttributeProvider for AttributeSet {
    fn scalar(&self, name: &str) -> Option<f64> {
        self.scalars.get(name).copied()
    }

    fn alternative(&self, name: &str, alternative: AlternativeId) -> Option<f64> {
        self.alternatives
            .get(name)
            .and_then(|values| values.get(&alternative))
            .copied()
    }
}

impl AttributeProvider for HashMap<String, f64> {
    fn scalar(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}
