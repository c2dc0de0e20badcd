mod alternative_spec;
mod model_spec;
mod model_spec_config;
mod nest_tree;

pub use alternative_spec::{AlternativeSpec, UtilityTerm};
pub use model_spec::ModelSpec;
pub use model_spec_config::{
    AlternativeConfig, CoefficientConfig, ModelSpecConfig, NestChildConfig, NestConfig,
    UtilityTermConfig,
};
pub use nest_tree::{Nest, NestChild, NestTree};
