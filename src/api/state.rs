use std::sync::Arc;

use crate::calculate::ScoreEngine;
use crate::models::{Dataset, EngineFeatures};
use crate::storage::{DatasetInfo, LoadedDataset};

#[derive(Clone)]
pub struct AppState {
    pub dataset: Arc<Dataset>,
    pub info: Arc<DatasetInfo>,
    pub features: EngineFeatures,
}

impl AppState {
    pub fn new(loaded: LoadedDataset, features: EngineFeatures) -> Self {
        Self {
            dataset: loaded.dataset,
            info: Arc::new(loaded.info),
            features,
        }
    }

    /// Fresh engine over the shared dataset, with default selection.
    pub fn engine(&self) -> ScoreEngine {
        ScoreEngine::with_dataset(Arc::clone(&self.dataset), self.features)
    }
}
