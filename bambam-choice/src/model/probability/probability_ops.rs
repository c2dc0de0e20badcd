use super::{mnl_logsum, mnl_probabilities, nested_logsum, nested_probabilities};
use crate::model::{choice::ChoiceError, evaluation::UtilityVector, spec::NestTree};

/// alternative probabilities and root logsum, using flat multinomial logit
/// when the tree has a single unit-scale nest.
pub fn probabilities(
    tree: &NestTree,
    utilities: &UtilityVector,
) -> Result<(Vec<f64>, f64), ChoiceError> {
    if tree.is_flat() {
        let p = mnl_probabilities(utilities)?;
        let logsum = mnl_logsum(utilities)?;
        Ok((p, logsum))
    } else {
        nested_probabilities(tree, utilities)
    }
}

/// root logsum only, without normalizing probabilities.
pub fn logsum(tree: &NestTree, utilities: &UtilityVector) -> Result<f64, ChoiceError> {
    if tree.is_flat() {
        mnl_logsum(utilities)
    } else {
        nested_logsum(tree, utilities)
    }
}
