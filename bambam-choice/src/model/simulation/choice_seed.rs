use crate::model::DecisionMakerId;
use sha2::{Digest, Sha256};

/// derives the 32-byte generator seed for one decision from the run seed, the
/// decision maker and the model name. the result depends only on these inputs,
/// never on scheduling.
pub fn derive_seed(seed: u64, decision_maker_id: DecisionMakerId, model_name: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(seed.to_le_bytes());
    hasher.update(decision_maker_id.to_le_bytes());
    hasher.update(model_name.as_bytes());
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}
