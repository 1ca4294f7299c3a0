//! Per-player averages over kept scores, optionally ranked by placement.

use std::cmp::Ordering;

use crate::models::{AverageRow, Dataset, EngineFeatures, MapLeaderboard, Selection};

use super::drop::{compute_dropped, DroppedSet};
use super::leaderboard::{map_leaderboards, DropSide};
use super::{mean, player_filter, selected_players};

/// Averages table for the current selection.
pub fn compute_averages(
    dataset: &Dataset,
    selection: &Selection,
    features: &EngineFeatures,
) -> Vec<AverageRow> {
    let filter = player_filter(selection, features);
    let dropped = compute_dropped(dataset, selection.drop_count, filter);
    let active = features
        .enable_placement_ranking
        .then(|| map_leaderboards(dataset, selection, features, &dropped, DropSide::Kept));

    averages_from(dataset, selection, features, &dropped, active.as_deref())
}

/// Build the averages table from an already computed drop set.
///
/// `active` holds the kept-score leaderboards used for placements; pass
/// `None` when placement ranking is disabled.
///
/// Every score of a selected player is visited in recorded order. Scores on
/// maps missing from the dataset count as neither kept nor skipped. Players
/// with nothing kept are left out.
pub fn averages_from(
    dataset: &Dataset,
    selection: &Selection,
    features: &EngineFeatures,
    dropped: &DroppedSet,
    active: Option<&[MapLeaderboard]>,
) -> Vec<AverageRow> {
    let filter = player_filter(selection, features);

    let mut rows: Vec<AverageRow> = selected_players(dataset, filter)
        .filter_map(|player| {
            let mut kept = Vec::new();
            let mut kept_labels = Vec::new();
            let mut skipped_labels = Vec::new();

            for score in &player.scores {
                let Some(map) = dataset.map(score.beatmap_id) else {
                    continue;
                };
                if dropped.contains(player.user_id, score.beatmap_id) {
                    skipped_labels.push(map.slot.clone());
                } else {
                    kept_labels.push(map.slot.clone());
                    kept.push(score);
                }
            }

            let avg_score = mean(kept.iter().map(|s| s.score as f64))?;
            let avg_acc = mean(kept.iter().map(|s| s.accuracy))?;
            let avg_placement = active.and_then(|boards| {
                mean(
                    boards
                        .iter()
                        .filter_map(|board| board.placement_of(player.user_id))
                        .map(|rank| rank as f64),
                )
            });

            Some(AverageRow {
                user_id: player.user_id,
                username: dataset.username(player.user_id).to_string(),
                avg_score,
                avg_acc: features.include_accuracy_column.then_some(avg_acc),
                avg_placement,
                skipped_labels,
                kept_labels,
            })
        })
        .collect();

    if active.is_some() {
        rows.sort_by(|a, b| cmp_placement(a.avg_placement, b.avg_placement));
    } else {
        rows.sort_by(|a, b| b.avg_score.total_cmp(&a.avg_score));
    }

    rows
}

/// Ascending, with missing placements last.
fn cmp_placement(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
