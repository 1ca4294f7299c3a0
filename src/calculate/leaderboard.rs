//! Per-map leaderboards of kept and dropped scores.

use crate::models::{Dataset, EngineFeatures, LeaderboardEntry, MapLeaderboard, Selection};

use super::drop::{compute_dropped, DroppedSet};
use super::ordering::ordered_maps;
use super::{player_filter, selected_players};

/// Which side of the drop split a leaderboard shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropSide {
    Kept,
    Dropped,
}

/// Leaderboards of kept scores, one per map in display order.
pub fn compute_active_leaderboards(
    dataset: &Dataset,
    selection: &Selection,
    features: &EngineFeatures,
) -> Vec<MapLeaderboard> {
    let filter = player_filter(selection, features);
    let dropped = compute_dropped(dataset, selection.drop_count, filter);
    map_leaderboards(dataset, selection, features, &dropped, DropSide::Kept)
}

/// Leaderboards of dropped scores, one per map in display order.
pub fn compute_dropped_leaderboards(
    dataset: &Dataset,
    selection: &Selection,
    features: &EngineFeatures,
) -> Vec<MapLeaderboard> {
    let filter = player_filter(selection, features);
    let dropped = compute_dropped(dataset, selection.drop_count, filter);
    map_leaderboards(dataset, selection, features, &dropped, DropSide::Dropped)
}

/// Build one leaderboard per map from an already computed drop set.
///
/// Each selected player contributes their first score on the map if it is on
/// the requested side of the split. Entries sort by score descending; the
/// sort is stable so equal scores keep player order.
pub fn map_leaderboards(
    dataset: &Dataset,
    selection: &Selection,
    features: &EngineFeatures,
    dropped: &DroppedSet,
    side: DropSide,
) -> Vec<MapLeaderboard> {
    let filter = player_filter(selection, features);

    ordered_maps(dataset)
        .into_iter()
        .map(|map| {
            let mut entries: Vec<LeaderboardEntry> = selected_players(dataset, filter)
                .filter_map(|player| {
                    let score = player.score_on(map.beatmap_id)?;
                    let is_dropped = dropped.contains(player.user_id, map.beatmap_id);
                    let wanted = match side {
                        DropSide::Kept => !is_dropped,
                        DropSide::Dropped => is_dropped,
                    };
                    wanted.then(|| LeaderboardEntry {
                        user_id: player.user_id,
                        username: dataset.username(player.user_id).to_string(),
                        score: score.score,
                        accuracy: features.include_accuracy_column.then_some(score.accuracy),
                    })
                })
                .collect();

            entries.sort_by(|a, b| b.score.cmp(&a.score));

            MapLeaderboard {
                beatmap_id: map.beatmap_id,
                slot: map.slot.clone(),
                entries,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DropCount, Score};
    use pretty_assertions::assert_eq;

    fn two_player_dataset() -> Dataset {
        Dataset::default()
            .with_user(1, "P1")
            .with_user(2, "P2")
            .with_map(100, "NM1")
            .with_score(1, Score::new(100, 100, 90.0))
            .with_score(2, Score::new(100, 200, 95.0))
    }

    fn names_and_scores(board: &MapLeaderboard) -> Vec<(String, u64)> {
        board
            .entries
            .iter()
            .map(|e| (e.username.clone(), e.score))
            .collect()
    }

    #[test]
    fn test_active_leaderboard_sorted_descending() {
        let ds = two_player_dataset();
        let boards =
            compute_active_leaderboards(&ds, &Selection::new(), &EngineFeatures::default());

        assert_eq!(boards.len(), 1);
        assert_eq!(
            names_and_scores(&boards[0]),
            vec![("P2".to_string(), 200), ("P1".to_string(), 100)]
        );
        assert_eq!(boards[0].entries[0].accuracy, Some(95.0));
    }

    #[test]
    fn test_zero_drop_splits_into_full_and_empty() {
        let ds = two_player_dataset();
        let features = EngineFeatures::default();
        let dropped = compute_dropped_leaderboards(&ds, &Selection::new(), &features);

        assert_eq!(dropped.len(), 1);
        assert!(dropped[0].is_empty());
    }

    #[test]
    fn test_dropping_only_score_moves_everyone_to_dropped() {
        let ds = two_player_dataset();
        let features = EngineFeatures::default();
        let selection = Selection::new().with_drop_count(DropCount::new(1));

        let active = compute_active_leaderboards(&ds, &selection, &features);
        let dropped = compute_dropped_leaderboards(&ds, &selection, &features);

        assert!(active[0].is_empty());
        assert_eq!(
            names_and_scores(&dropped[0]),
            vec![("P2".to_string(), 200), ("P1".to_string(), 100)]
        );
    }

    #[test]
    fn test_equal_scores_keep_player_order() {
        let ds = Dataset::default()
            .with_map(5, "HD1")
            .with_score(3, Score::new(5, 700, 90.0))
            .with_score(8, Score::new(5, 700, 91.0))
            .with_score(9, Score::new(5, 800, 92.0));

        let boards =
            compute_active_leaderboards(&ds, &Selection::new(), &EngineFeatures::default());
        let ids: Vec<u64> = boards[0].entries.iter().map(|e| e.user_id).collect();

        assert_eq!(ids, vec![9, 3, 8]);
    }

    #[test]
    fn test_unknown_map_scores_and_missing_users() {
        let ds = Dataset::default()
            .with_map(1, "NM1")
            .with_score(4, Score::new(1, 10, 50.0))
            .with_score(4, Score::new(999, 20, 60.0));

        let boards =
            compute_active_leaderboards(&ds, &Selection::new(), &EngineFeatures::default());

        assert_eq!(boards.len(), 1);
        assert_eq!(boards[0].entries.len(), 1);
        assert_eq!(boards[0].entries[0].username, "Unknown");
    }

    #[test]
    fn test_player_filter_and_accuracy_flag() {
        let ds = two_player_dataset();
        let features = EngineFeatures {
            include_accuracy_column: false,
            ..EngineFeatures::default()
        };
        let selection = Selection::new().with_players([1]);

        let boards = compute_active_leaderboards(&ds, &selection, &features);

        assert_eq!(boards[0].entries.len(), 1);
        assert_eq!(boards[0].entries[0].user_id, 1);
        assert_eq!(boards[0].entries[0].accuracy, None);
    }

    #[test]
    fn test_player_filter_ignored_when_filters_disabled() {
        let ds = two_player_dataset();
        let features = EngineFeatures {
            enable_player_map_filters: false,
            ..EngineFeatures::default()
        };
        let selection = Selection::new().with_players([1]);

        let boards = compute_active_leaderboards(&ds, &selection, &features);
        assert_eq!(boards[0].entries.len(), 2);
    }

    #[test]
    fn test_maps_in_display_order_with_placeholders() {
        let ds = two_player_dataset().with_map(50, "TB").with_map(70, "NM10");
        let boards =
            compute_active_leaderboards(&ds, &Selection::new(), &EngineFeatures::default());

        let slots: Vec<&str> = boards.iter().map(|b| b.slot.as_str()).collect();
        assert_eq!(slots, vec!["NM1", "NM10", "TB"]);
        assert!(boards[1].is_empty());
        assert!(boards[2].is_empty());
    }
}
