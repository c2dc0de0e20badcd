use super::log_sum_exp;
use crate::model::{
    choice::ChoiceError,
    evaluation::UtilityVector,
    spec::{NestChild, NestTree},
};

/// the root logsum of a nested logit model. probabilities are not computed.
pub fn nested_logsum(tree: &NestTree, utilities: &UtilityVector) -> Result<f64, ChoiceError> {
    let composites = composite_utilities(tree, utilities);
    composites
        .get(NestTree::ROOT)
        .copied()
        .flatten()
        .ok_or(ChoiceError::NoAvailableAlternatives {
            decision_maker_id: utilities.decision_maker_id(),
        })
}

/// unconditional alternative probabilities of a nested logit model, aligned
/// with the utility vector, along with the root logsum. each probability is
/// the product of the conditional probabilities of the branches leading to
/// the alternative.
pub fn nested_probabilities(
    tree: &NestTree,
    utilities: &UtilityVector,
) -> Result<(Vec<f64>, f64), ChoiceError> {
    let composites = composite_utilities(tree, utilities);
    let logsum = composites
        .get(NestTree::ROOT)
        .copied()
        .flatten()
        .ok_or(ChoiceError::NoAvailableAlternatives {
            decision_maker_id: utilities.decision_maker_id(),
        })?;
    let mut probabilities = vec![0.0; utilities.len()];
    let mut nest_probabilities = vec![0.0; tree.len()];
    nest_probabilities[NestTree::ROOT] = 1.0;
    // parents precede their children in the arena
    for (index, nest) in tree.nests().iter().enumerate() {
        let reach = nest_probabilities[index];
        if reach == 0.0 {
            continue;
        }
        let members = member_values(&nest.children, utilities, &composites);
        let scaled: Vec<f64> = members.iter().map(|(_, v)| nest.theta * v).collect();
        let Some(denominator) = log_sum_exp(&scaled) else {
            continue;
        };
        for ((child, _), s) in members.iter().zip(scaled.iter()) {
            let probability = reach * (s - denominator).exp();
            match child {
                NestChild::Alternative(position) => probabilities[*position] = probability,
                NestChild::Nest(child_index) => nest_probabilities[*child_index] = probability,
            }
        }
    }
    Ok((probabilities, logsum))
}

/// composite utility `L_n = (1/θ_n) · ln Σ exp(θ_n · V_i)` of every nest, or
/// None for a nest with no available member.
fn composite_utilities(tree: &NestTree, utilities: &UtilityVector) -> Vec<Option<f64>> {
    let mut composites: Vec<Option<f64>> = vec![None; tree.len()];
    // children follow their parents, so visit in reverse
    for (index, nest) in tree.nests().iter().enumerate().rev() {
        let scaled: Vec<f64> = member_values(&nest.children, utilities, &composites)
            .into_iter()
            .map(|(_, v)| nest.theta * v)
            .collect();
        composites[index] = log_sum_exp(&scaled).map(|lse| lse / nest.theta);
    }
    composites
}

/// the available members of a nest with their utility or composite utility
fn member_values(
    children: &[NestChild],
    utilities: &UtilityVector,
    composites: &[Option<f64>],
) -> Vec<(NestChild, f64)> {
    children
        .iter()
        .filter_map(|child| {
            let value = match child {
                NestChild::Alternative(position) => utilities.utility(*position),
                NestChild::Nest(index) => composites.get(*index).copied().flatten(),
            };
            value.map(|v| (*child, v))
        })
        .collect()
}
