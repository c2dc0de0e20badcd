use super::{InMemoryMatrixProvider, InMemoryZoneData, MatrixProvider, ZoneDataProvider};
use std::sync::Arc;

/// the shared, read-only data a decision context looks up zone and matrix
/// variables from.
#[derive(Clone)]
pub struct ModelData {
    matrices: Arc<dyn MatrixProvider>,
    zones: Arc<dyn ZoneDataProvider>,
}

impl ModelData {
    pub fn new(matrices: Arc<dyn MatrixProvider>, zones: Arc<dyn ZoneDataProvider>) -> ModelData {
        ModelData { matrices, zones }
    }

    pub fn matrices(&self) -> &dyn MatrixProvider {
        self.matrices.as_ref()
    }

    pub fn zones(&self) -> &dyn ZoneDataProvider {
        self.zones.as_ref()
    }
}

impl Default for ModelData {
    fn default() -> Self {
        ModelData::new(
            Arc::new(InMemoryMatrixProvider::default()),
            Arc::new(InMemoryZoneData::default()),
        )
    }
}
