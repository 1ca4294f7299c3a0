//! Derived standings produced by the aggregation engine.

use serde::Serialize;

use super::{BeatmapId, DropCount, UserId};

/// One row of a per-map leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub user_id: UserId,
    pub username: String,
    pub score: u64,

    /// Omitted when the accuracy column is disabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
}

/// Scores on a single map, best first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapLeaderboard {
    pub beatmap_id: BeatmapId,
    pub slot: String,
    pub entries: Vec<LeaderboardEntry>,
}

impl MapLeaderboard {
    /// True when the table should render as a "no data" placeholder.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 1-indexed position of a player on this map.
    pub fn placement_of(&self, user_id: UserId) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.user_id == user_id)
            .map(|i| i + 1)
    }
}

/// A player's averages over their kept scores.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AverageRow {
    pub user_id: UserId,
    pub username: String,

    /// Mean raw score at full precision
    pub avg_score: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_acc: Option<f64>,

    /// Mean 1-indexed placement across maps; `None` when placement ranking
    /// is disabled or the player placed nowhere.
    pub avg_placement: Option<f64>,

    /// Slots of dropped scores, in score order
    pub skipped_labels: Vec<String>,

    /// Slots of kept scores, in score order
    pub kept_labels: Vec<String>,
}

/// A player's averages over the maps picked for the custom leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomRow {
    pub user_id: UserId,
    pub username: String,
    pub avg_score: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_acc: Option<f64>,

    pub maps_played: usize,
}

/// Leaderboard restricted to a hand-picked set of maps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomLeaderboard {
    /// Slots of the picked maps in display order
    pub slots: Vec<String>,
    pub rows: Vec<CustomRow>,
}

/// Every section of the dashboard for one selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub drop_count: DropCount,
    pub active: Vec<MapLeaderboard>,

    /// Present only when the dropped row is enabled
    pub dropped: Option<Vec<MapLeaderboard>>,

    pub averages: Vec<AverageRow>,

    /// Present only when filters are enabled and maps are picked
    pub custom: Option<CustomLeaderboard>,
}
