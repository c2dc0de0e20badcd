use super::derive_seed;
use crate::model::{choice::ChoiceError, DecisionMakerId};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// probabilities whose sum is further than this from 1 are renormalized.
pub const NORMALIZATION_TOLERANCE: f64 = 1e-9;

/// draws alternatives from probability vectors. the stream of draws for a
/// decision maker is keyed by the run seed, the decision maker id and the
/// model name, so repeated runs choose identically regardless of threading.
#[derive(Clone, Debug)]
pub struct ChoiceSimulator {
    seed: u64,
    model_name: String,
}

impl ChoiceSimulator {
    pub fn new(seed: u64, model_name: &str) -> ChoiceSimulator {
        ChoiceSimulator {
            seed,
            model_name: model_name.to_string(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// the random stream of one decision maker
    pub fn rng(&self, decision_maker_id: DecisionMakerId) -> ChaCha8Rng {
        ChaCha8Rng::from_seed(derive_seed(self.seed, decision_maker_id, &self.model_name))
    }

    /// the first uniform draw in `[0, 1)` of a decision maker's stream
    pub fn draw(&self, decision_maker_id: DecisionMakerId) -> f64 {
        self.rng(decision_maker_id).random::<f64>()
    }

    /// chooses the position of an alternative from aligned probabilities.
    pub fn simulate(
        &self,
        probabilities: &[f64],
        decision_maker_id: DecisionMakerId,
    ) -> Result<usize, ChoiceError> {
        select_alternative(probabilities, self.draw(decision_maker_id), decision_maker_id)
    }

    /// `n` successive choices from the same keyed stream. the first equals
    /// [`ChoiceSimulator::simulate`].
    pub fn resample(
        &self,
        probabilities: &[f64],
        decision_maker_id: DecisionMakerId,
        n: usize,
    ) -> Result<Vec<usize>, ChoiceError> {
        let mut rng = self.rng(decision_maker_id);
        (0..n)
            .map(|_| select_alternative(probabilities, rng.random::<f64>(), decision_maker_id))
            .collect()
    }
}

/// inverse-CDF selection in the given order: the first alternative with
/// non-zero probability whose cumulative mass reaches `draw`.
pub fn select_alternative(
    probabilities: &[f64],
    draw: f64,
    decision_maker_id: DecisionMakerId,
) -> Result<usize, ChoiceError> {
    let mut total = 0.0;
    for (position, p) in probabilities.iter().enumerate() {
        if !p.is_finite() || *p < 0.0 {
            return Err(ChoiceError::InvalidProbability {
                position,
                value: *p,
            });
        }
        total += p;
    }
    if total <= 0.0 {
        return Err(ChoiceError::ZeroProbabilityMass);
    }
    let scale = if (total - 1.0).abs() > NORMALIZATION_TOLERANCE {
        log::warn!(
            "probabilities for decision maker {decision_maker_id} sum to {total}, renormalizing"
        );
        total
    } else {
        1.0
    };
    let mut cumulative = 0.0;
    let mut last_positive = None;
    for (position, p) in probabilities.iter().enumerate() {
        if *p <= 0.0 {
            continue;
        }
        cumulative += p / scale;
        last_positive = Some(position);
        if draw <= cumulative {
            return Ok(position);
        }
    }
    // floating residue left the draw above the final cumulative mass
    last_positive.ok_or(ChoiceError::ZeroProbabilityMass)
}
