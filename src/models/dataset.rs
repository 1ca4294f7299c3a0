//! Results dataset model.
//!
//! The dataset is the immutable snapshot the dashboard reads once at
//! startup. Object keys in the JSON document are decimal id strings; they are
//! held in `BTreeMap`s so users, maps and players always enumerate in
//! ascending numeric id order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{BeatmapId, UserId};

/// Display name used for players without a user entry.
pub const UNKNOWN_USERNAME: &str = "Unknown";

/// A registered user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    pub username: String,
}

impl User {
    pub fn new(user_id: UserId, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
        }
    }
}

/// A pooled beatmap and the slot it occupies (e.g. "NM1", "TB").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Map {
    pub beatmap_id: BeatmapId,
    pub slot: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Difficulty (version) name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
}

impl Map {
    pub fn new(beatmap_id: BeatmapId, slot: impl Into<String>) -> Self {
        Self {
            beatmap_id,
            slot: slot.into(),
            artist: None,
            title: None,
            difficulty: None,
        }
    }

    /// Builder method to set artist, title and difficulty name.
    pub fn with_metadata(
        mut self,
        artist: impl Into<String>,
        title: impl Into<String>,
        difficulty: impl Into<String>,
    ) -> Self {
        self.artist = Some(artist.into());
        self.title = Some(title.into());
        self.difficulty = Some(difficulty.into());
        self
    }
}

/// One score set by a player on a beatmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub beatmap_id: BeatmapId,
    pub score: u64,

    /// Accuracy in percent (0.0 to 100.0)
    pub accuracy: f64,

    /// Multiplayer match the score came from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_id: Option<u64>,

    /// Index of the game within the match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_id: Option<u32>,

    /// Enabled mods bitmask
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mods: Option<u32>,
}

impl Score {
    pub fn new(beatmap_id: BeatmapId, score: u64, accuracy: f64) -> Self {
        Self {
            beatmap_id,
            score,
            accuracy,
            match_id: None,
            game_id: None,
            mods: None,
        }
    }

    /// Builder method to record where the score was played.
    pub fn with_source(mut self, match_id: u64, game_id: u32, mods: u32) -> Self {
        self.match_id = Some(match_id);
        self.game_id = Some(game_id);
        self.mods = Some(mods);
        self
    }
}

/// A player and their scores, in the order they were recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub user_id: UserId,

    /// Copy of the username written by the exporter. Display lookups go
    /// through `Dataset::username` instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default)]
    pub scores: Vec<Score>,
}

impl Player {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            username: None,
            scores: Vec::new(),
        }
    }

    /// First score recorded on the given beatmap.
    pub fn score_on(&self, beatmap_id: BeatmapId) -> Option<&Score> {
        self.scores.iter().find(|s| s.beatmap_id == beatmap_id)
    }
}

/// The full results snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub users: BTreeMap<UserId, User>,
    pub maps: BTreeMap<BeatmapId, Map>,
    pub players: BTreeMap<UserId, Player>,
}

impl Dataset {
    /// Parse a dataset document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Display name for a user id, falling back to [`UNKNOWN_USERNAME`].
    pub fn username(&self, user_id: UserId) -> &str {
        self.users
            .get(&user_id)
            .map(|u| u.username.as_str())
            .unwrap_or(UNKNOWN_USERNAME)
    }

    pub fn map(&self, beatmap_id: BeatmapId) -> Option<&Map> {
        self.maps.get(&beatmap_id)
    }

    /// Total number of scores across all players.
    pub fn score_count(&self) -> usize {
        self.players.values().map(|p| p.scores.len()).sum()
    }

    /// Builder method to add a user.
    pub fn with_user(mut self, user_id: UserId, username: &str) -> Self {
        self.users.insert(user_id, User::new(user_id, username));
        self
    }

    /// Builder method to add a map.
    pub fn with_map(mut self, beatmap_id: BeatmapId, slot: &str) -> Self {
        self.maps.insert(beatmap_id, Map::new(beatmap_id, slot));
        self
    }

    /// Builder method to append a score to a player, creating the player
    /// entry if needed.
    pub fn with_score(mut self, user_id: UserId, score: Score) -> Self {
        self.players
            .entry(user_id)
            .or_insert_with(|| Player::new(user_id))
            .scores
            .push(score);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "users": {
            "2": { "user_id": 2, "username": "bob" },
            "10": { "user_id": 10, "username": "alice" }
        },
        "maps": {
            "500": { "beatmap_id": 500, "slot": "NM1", "artist": "a", "title": "t", "difficulty": "Insane" },
            "400": { "beatmap_id": 400, "slot": "HD1" }
        },
        "players": {
            "10": {
                "user_id": 10,
                "username": "alice",
                "scores": [
                    { "match_id": 1, "game_id": 0, "beatmap_id": 500, "score": 1000, "accuracy": 98.5, "mods": 0 }
                ]
            },
            "2": {
                "user_id": 2,
                "scores": [
                    { "beatmap_id": 400, "score": 700, "accuracy": 91.0 },
                    { "beatmap_id": 400, "score": 900, "accuracy": 93.0 }
                ]
            },
            "77": { "user_id": 77, "scores": [] }
        }
    }"#;

    #[test]
    fn test_parse_dataset() {
        let ds = Dataset::from_json(SAMPLE).unwrap();

        assert_eq!(ds.users.len(), 2);
        assert_eq!(ds.maps.len(), 2);
        assert_eq!(ds.players.len(), 3);
        assert_eq!(ds.score_count(), 3);

        let map = ds.map(500).unwrap();
        assert_eq!(map.slot, "NM1");
        assert_eq!(map.difficulty.as_deref(), Some("Insane"));
        assert_eq!(ds.players[&10].scores[0].match_id, Some(1));
    }

    #[test]
    fn test_players_enumerate_in_numeric_order() {
        let ds = Dataset::from_json(SAMPLE).unwrap();
        let ids: Vec<UserId> = ds.players.keys().copied().collect();
        assert_eq!(ids, vec![2, 10, 77]);
    }

    #[test]
    fn test_unknown_username() {
        let ds = Dataset::from_json(SAMPLE).unwrap();
        assert_eq!(ds.username(10), "alice");
        assert_eq!(ds.username(77), UNKNOWN_USERNAME);
    }

    #[test]
    fn test_score_on_returns_first_match() {
        let ds = Dataset::from_json(SAMPLE).unwrap();
        let score = ds.players[&2].score_on(400).unwrap();
        assert_eq!(score.score, 700);
        assert!(ds.players[&2].score_on(500).is_none());
    }

    #[test]
    fn test_missing_section_is_an_error() {
        assert!(Dataset::from_json(r#"{ "users": {}, "maps": {} }"#).is_err());
        assert!(Dataset::from_json("not json").is_err());
    }

    #[test]
    fn test_serialization_keeps_string_keys() {
        let ds = Dataset::default()
            .with_user(5, "eve")
            .with_map(9, "TB")
            .with_score(5, Score::new(9, 123, 99.0));

        let json = serde_json::to_value(&ds).unwrap();
        assert_eq!(json["users"]["5"]["username"], "eve");
        assert_eq!(json["players"]["5"]["scores"][0]["score"], 123);
        assert!(json["players"]["5"]["scores"][0].get("match_id").is_none());

        let back: Dataset = serde_json::from_value(json).unwrap();
        assert_eq!(back, ds);
    }
}
