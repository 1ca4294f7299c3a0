//! Drop selection: which scores each player discards.

use std::collections::{BTreeSet, HashSet};

use crate::models::{BeatmapId, Dataset, DropCount, Score, UserId};

/// Set of dropped (player, beatmap) pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DroppedSet(HashSet<(UserId, BeatmapId)>);

impl DroppedSet {
    pub fn contains(&self, user_id: UserId, beatmap_id: BeatmapId) -> bool {
        self.0.contains(&(user_id, beatmap_id))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn insert(&mut self, user_id: UserId, beatmap_id: BeatmapId) {
        self.0.insert((user_id, beatmap_id));
    }
}

/// Mark each player's `drop_count` lowest scores as dropped.
///
/// Only players in `player_filter` are considered (all players when `None`).
/// Equal scores keep their recorded order, so the earlier one is dropped
/// first and repeated calls always agree.
pub fn compute_dropped(
    dataset: &Dataset,
    drop_count: DropCount,
    player_filter: Option<&BTreeSet<UserId>>,
) -> DroppedSet {
    let mut dropped = DroppedSet::default();
    if drop_count.is_zero() {
        return dropped;
    }

    let players = dataset
        .players
        .values()
        .filter(|p| player_filter.map_or(true, |f| f.contains(&p.user_id)));

    for player in players {
        let mut ascending: Vec<&Score> = player.scores.iter().collect();
        // sort_by_key is stable
        ascending.sort_by_key(|s| s.score);

        for score in ascending.into_iter().take(drop_count.get()) {
            dropped.insert(player.user_id, score.beatmap_id);
        }
    }

    dropped
}
