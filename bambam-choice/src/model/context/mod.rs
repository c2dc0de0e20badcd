mod attribute_provider;
mod context_error;
mod decision_context;
mod matrix_provider;
mod model_data;
mod zone_data_provider;

pub use attribute_provider::{AttributeProvider, AttributeSet};
pub use context_error::ContextError;
pub use decision_context::{DecisionContext, DecisionContextBuilder};
pub use matrix_provider::{InMemoryMatrixProvider, MatrixProvider, SkimMatrix};
pub use model_data::ModelData;
pub use zone_data_provider::{InMemoryZoneData, ZoneDataProvider};
