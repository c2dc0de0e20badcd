mod logit_ops;
mod nested_logit_ops;
mod probability_ops;

pub use logit_ops::{log_sum_exp, mnl_logsum, mnl_probabilities};
pub use nested_logit_ops::{nested_logsum, nested_probabilities};
pub use probability_ops::{logsum, probabilities};
