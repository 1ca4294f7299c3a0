//! Leaderboard over a hand-picked subset of maps.

use crate::models::{CustomLeaderboard, CustomRow, Dataset, EngineFeatures, Score, Selection};

use super::ordering::ordered_maps;
use super::{mean, player_filter, selected_players};

/// Custom leaderboard for the picked maps.
///
/// Returns `None` when no maps are picked or filtering is disabled. Drops do
/// not apply here: every score a selected player set on a picked map counts.
pub fn compute_custom_leaderboard(
    dataset: &Dataset,
    selection: &Selection,
    features: &EngineFeatures,
) -> Option<CustomLeaderboard> {
    if !features.enable_player_map_filters || selection.maps.is_empty() {
        return None;
    }

    let filter = player_filter(selection, features);

    let slots = ordered_maps(dataset)
        .into_iter()
        .filter(|m| selection.maps.contains(&m.beatmap_id))
        .map(|m| m.slot.clone())
        .collect();

    let mut rows: Vec<CustomRow> = selected_players(dataset, filter)
        .filter_map(|player| {
            let matched: Vec<&Score> = player
                .scores
                .iter()
                .filter(|s| selection.maps.contains(&s.beatmap_id))
                .collect();

            let avg_score = mean(matched.iter().map(|s| s.score as f64))?;
            let avg_acc = mean(matched.iter().map(|s| s.accuracy))?;

            Some(CustomRow {
                user_id: player.user_id,
                username: dataset.username(player.user_id).to_string(),
                avg_score,
                avg_acc: features.include_accuracy_column.then_some(avg_acc),
                maps_played: matched.len(),
            })
        })
        .collect();

    rows.sort_by(|a, b| b.avg_score.total_cmp(&a.avg_score));

    Some(CustomLeaderboard { slots, rows })
}
