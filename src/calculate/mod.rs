//! Score aggregation.
//!
//! Pure derivations over a [`Dataset`](crate::models::Dataset):
//! - Map display ordering
//! - Drop selection (each player's worst N scores)
//! - Per-map leaderboards of kept and dropped scores
//! - Per-player averages, optionally ranked by placement
//! - Custom leaderboards over picked maps
//!
//! [`ScoreEngine`] wraps these behind a load/select/compute surface.

use std::collections::BTreeSet;

use crate::models::{Dataset, EngineFeatures, Player, Selection, UserId};

pub mod averages;
pub mod custom;
pub mod drop;
pub mod engine;
pub mod leaderboard;
pub mod ordering;

pub use averages::compute_averages;
pub use custom::compute_custom_leaderboard;
pub use drop::{compute_dropped, DroppedSet};
pub use engine::{EngineError, ScoreEngine};
pub use leaderboard::{compute_active_leaderboards, compute_dropped_leaderboards, DropSide};
pub use ordering::{compare_maps, compare_slots, ordered_maps, slot_tier};

/// Player filter in effect: `None` means every player.
fn player_filter<'a>(
    selection: &'a Selection,
    features: &EngineFeatures,
) -> Option<&'a BTreeSet<UserId>> {
    if features.enable_player_map_filters {
        selection.players.as_ref()
    } else {
        None
    }
}

/// Players passing the filter, in dataset order.
fn selected_players<'a>(
    dataset: &'a Dataset,
    filter: Option<&'a BTreeSet<UserId>>,
) -> impl Iterator<Item = &'a Player> + 'a {
    dataset
        .players
        .values()
        .filter(move |p| filter.map_or(true, |f| f.contains(&p.user_id)))
}

/// Arithmetic mean; `None` for an empty input.
fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
