//! Request-scoped selection state and engine feature flags.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{BeatmapId, UserId};

/// Number of worst scores discarded per player.
///
/// Always non-negative: invalid input clamps to zero instead of failing so
/// the dashboard stays usable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DropCount(usize);

impl DropCount {
    pub const NONE: DropCount = DropCount(0);

    pub fn new(count: usize) -> Self {
        Self(count)
    }

    /// Negative values clamp to zero.
    pub fn from_signed(count: i64) -> Self {
        Self(usize::try_from(count).unwrap_or(0))
    }

    /// Parse user input. Anything that is not an integer (including
    /// fractional values) yields zero; integers too large to represent
    /// saturate so every score is dropped.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if let Ok(n) = s.parse::<u64>() {
            return Self(usize::try_from(n).unwrap_or(usize::MAX));
        }
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            return Self(usize::MAX);
        }
        s.parse::<i64>().map(Self::from_signed).unwrap_or(Self::NONE)
    }

    pub fn get(self) -> usize {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl From<usize> for DropCount {
    fn from(count: usize) -> Self {
        Self(count)
    }
}

impl std::fmt::Display for DropCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the analyst currently has selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub drop_count: DropCount,

    /// Selected players; `None` selects every player in the dataset.
    pub players: Option<BTreeSet<UserId>>,

    /// Maps picked for the custom leaderboard.
    pub maps: BTreeSet<BeatmapId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the drop count.
    pub fn with_drop_count(mut self, drop_count: impl Into<DropCount>) -> Self {
        self.drop_count = drop_count.into();
        self
    }

    /// Builder method to restrict the selected players.
    pub fn with_players(mut self, players: impl IntoIterator<Item = UserId>) -> Self {
        self.players = Some(players.into_iter().collect());
        self
    }

    /// Builder method to pick maps for the custom leaderboard.
    pub fn with_maps(mut self, maps: impl IntoIterator<Item = BeatmapId>) -> Self {
        self.maps = maps.into_iter().collect();
        self
    }
}

/// Optional dashboard features.
///
/// Each combination reproduces one flavour of the dashboard: with or without
/// the accuracy column, the dropped-scores row, player/map filtering and
/// placement-based ranking of the averages table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineFeatures {
    #[serde(default = "default_true")]
    pub include_accuracy_column: bool,

    #[serde(default = "default_true")]
    pub include_dropped_row: bool,

    #[serde(default = "default_true")]
    pub enable_player_map_filters: bool,

    #[serde(default)]
    pub enable_placement_ranking: bool,
}

fn default_true() -> bool {
    true
}

impl Default for EngineFeatures {
    fn default() -> Self {
        Self {
            include_accuracy_column: true,
            include_dropped_row: true,
            enable_player_map_filters: true,
            enable_placement_ranking: false,
        }
    }
}

impl EngineFeatures {
    /// Every feature switched on.
    pub fn all() -> Self {
        Self {
            include_accuracy_column: true,
            include_dropped_row: true,
            enable_player_map_filters: true,
            enable_placement_ranking: true,
        }
    }
}
