use crate::model::DecisionMakerId;

/// one utility per alternative in model order, with an availability mask.
/// unavailable entries hold NaN and are excluded from probabilities.
#[derive(Clone, Debug, PartialEq)]
pub struct UtilityVector {
    decision_maker_id: DecisionMakerId,
    utilities: Vec<f64>,
    available: Vec<bool>,
}

impl UtilityVector {
    /// builds the vector, marking any alternative with a non-finite utility
    /// as unavailable.
    pub fn new(
        decision_maker_id: DecisionMakerId,
        utilities: Vec<f64>,
        available: Vec<bool>,
    ) -> UtilityVector {
        let available: Vec<bool> = utilities
            .iter()
            .zip(available.iter().chain(std::iter::repeat(&false)))
            .map(|(u, a)| *a && u.is_finite())
            .collect();
        let utilities = utilities
            .iter()
            .zip(available.iter())
            .map(|(u, a)| if *a { *u } else { f64::NAN })
            .collect();
        UtilityVector {
            decision_maker_id,
            utilities,
            available,
        }
    }

    /// every finite utility available
    pub fn from_utilities(decision_maker_id: DecisionMakerId, utilities: Vec<f64>) -> UtilityVector {
        let available = vec![true; utilities.len()];
        UtilityVector::new(decision_maker_id, utilities, available)
    }

    pub fn decision_maker_id(&self) -> DecisionMakerId {
        self.decision_maker_id
    }

    /// the utility of an available alternative
    pub fn utility(&self, position: usize) -> Option<f64> {
        if self.is_available(position) {
            self.utilities.get(position).copied()
        } else {
            None
        }
    }

    pub fn is_available(&self, position: usize) -> bool {
        self.available.get(position).copied().unwrap_or(false)
    }

    pub fn available_count(&self) -> usize {
        self.available.iter().filter(|a| **a).count()
    }

    /// `(position, utility)` of each available alternative
    pub fn iter_available(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.utilities
            .iter()
            .zip(self.available.iter())
            .enumerate()
            .filter(|(_, (_, a))| **a)
            .map(|(i, (u, _))| (i, *u))
    }

    pub fn utilities(&self) -> &[f64] {
        &self.utilities
    }

    pub fn len(&self) -> usize {
        self.utilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utilities.is_empty()
    }
}
