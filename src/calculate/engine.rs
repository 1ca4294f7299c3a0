//! Score aggregation engine.
//!
//! Holds the loaded dataset, the analyst's current selection and the enabled
//! features. Setters change the selection; every `compute_*` call derives
//! fresh results from scratch.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::models::{
    AverageRow, BeatmapId, CustomLeaderboard, Dashboard, Dataset, DropCount, EngineFeatures,
    MapLeaderboard, Selection, UserId,
};

use super::averages::{averages_from, compute_averages};
use super::custom::compute_custom_leaderboard;
use super::drop::compute_dropped;
use super::leaderboard::{
    compute_active_leaderboards, compute_dropped_leaderboards, map_leaderboards, DropSide,
};
use super::player_filter;

/// Engine errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("No dataset loaded")]
    NotLoaded,
}

#[derive(Debug, Clone, Default)]
pub struct ScoreEngine {
    dataset: Option<Arc<Dataset>>,
    selection: Selection,
    features: EngineFeatures,
}

impl ScoreEngine {
    pub fn new(features: EngineFeatures) -> Self {
        Self {
            dataset: None,
            selection: Selection::default(),
            features,
        }
    }

    /// Create an engine with a dataset already installed.
    pub fn with_dataset(dataset: Arc<Dataset>, features: EngineFeatures) -> Self {
        let mut engine = Self::new(features);
        engine.load(dataset);
        engine
    }

    /// Install the dataset. Player and map selections reset to their
    /// defaults (every player, no custom maps); the drop count is kept.
    pub fn load(&mut self, dataset: Arc<Dataset>) {
        info!(
            "Loaded dataset: {} users, {} maps, {} players",
            dataset.users.len(),
            dataset.maps.len(),
            dataset.players.len()
        );
        self.dataset = Some(dataset);
        self.selection.players = None;
        self.selection.maps.clear();
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_deref()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn features(&self) -> &EngineFeatures {
        &self.features
    }

    /// Set the per-player drop count. Negative values clamp to zero.
    pub fn set_drop_count(&mut self, count: i64) {
        self.set_drop(DropCount::from_signed(count));
    }

    pub fn set_drop(&mut self, drop_count: DropCount) {
        self.selection.drop_count = drop_count;
        debug!("Drop count set to {}", drop_count);
    }

    pub fn set_selected_players(&mut self, ids: impl IntoIterator<Item = UserId>) {
        self.selection.players = Some(ids.into_iter().collect());
    }

    /// Clear the player filter so every player is selected.
    pub fn select_all_players(&mut self) {
        self.selection.players = None;
    }

    pub fn set_selected_maps(&mut self, ids: impl IntoIterator<Item = BeatmapId>) {
        self.selection.maps = ids.into_iter().collect();
    }

    fn loaded(&self) -> Result<&Dataset, EngineError> {
        self.dataset.as_deref().ok_or(EngineError::NotLoaded)
    }

    pub fn compute_active_leaderboards(&self) -> Result<Vec<MapLeaderboard>, EngineError> {
        let dataset = self.loaded()?;
        Ok(compute_active_leaderboards(dataset, &self.selection, &self.features))
    }

    pub fn compute_dropped_leaderboards(&self) -> Result<Vec<MapLeaderboard>, EngineError> {
        let dataset = self.loaded()?;
        Ok(compute_dropped_leaderboards(dataset, &self.selection, &self.features))
    }

    pub fn compute_averages(&self) -> Result<Vec<AverageRow>, EngineError> {
        let dataset = self.loaded()?;
        Ok(compute_averages(dataset, &self.selection, &self.features))
    }

    /// `Ok(None)` when the custom leaderboard is not shown.
    pub fn compute_custom_leaderboard(&self) -> Result<Option<CustomLeaderboard>, EngineError> {
        let dataset = self.loaded()?;
        Ok(compute_custom_leaderboard(dataset, &self.selection, &self.features))
    }

    /// Every enabled section, sharing one drop computation.
    pub fn compute_dashboard(&self) -> Result<Dashboard, EngineError> {
        let dataset = self.loaded()?;
        let selection = &self.selection;
        let features = &self.features;

        let dropped = compute_dropped(
            dataset,
            selection.drop_count,
            player_filter(selection, features),
        );

        let active = map_leaderboards(dataset, selection, features, &dropped, DropSide::Kept);
        let dropped_boards = features
            .include_dropped_row
            .then(|| map_leaderboards(dataset, selection, features, &dropped, DropSide::Dropped));
        let averages = averages_from(
            dataset,
            selection,
            features,
            &dropped,
            features.enable_placement_ranking.then_some(active.as_slice()),
        );
        let custom = compute_custom_leaderboard(dataset, selection, features);

        debug!(
            "Dashboard computed: {} dropped scores, {} averaged players",
            dropped.len(),
            averages.len()
        );

        Ok(Dashboard {
            drop_count: selection.drop_count,
            active,
            dropped: dropped_boards,
            averages,
            custom,
        })
    }
}
