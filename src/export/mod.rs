//! Dataset exporter.
//!
//! Builds the results document from multiplayer match history: every pooled
//! beatmap becomes a map, and every score set on a pooled beatmap in one of
//! the listed matches is recorded, keeping each player's best score per map.

pub mod osu;

use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::{BeatmapId, Dataset, Map, Player, Score, User, UserId};

use self::osu::{GameScore, OsuApi};

/// Errors that can occur while exporting.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("osu! API {endpoint} returned HTTP {status}")]
    ApiStatus { endpoint: String, status: u16 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Couldn't find beatmap with id {0}")]
    BeatmapNotFound(BeatmapId),

    #[error("Invalid mappool entry {slot}: {value}")]
    InvalidMappool { slot: String, value: String },

    #[error("Invalid number in {field}: '{value}'")]
    InvalidNumber { field: &'static str, value: String },
}

fn match_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)$").unwrap())
}

/// Match id at the end of an mp link (e.g. `.../community/matches/111534249`).
pub fn extract_match_id(link: &str) -> Option<u64> {
    match_id_regex()
        .captures(link.trim())
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Non-empty, non-comment lines of an mp links file.
pub fn parse_mp_links(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

/// Parse a mappool document: a JSON object of slot to beatmap id, where ids
/// may be numbers or numeric strings. Entries come back sorted by slot.
pub fn parse_mappool(contents: &str) -> Result<Vec<(String, BeatmapId)>, ExportError> {
    let raw: serde_json::Map<String, serde_json::Value> = serde_json::from_str(contents)?;

    raw.into_iter()
        .map(|(slot, value)| {
            let id = match &value {
                serde_json::Value::Number(n) => n.as_u64(),
                serde_json::Value::String(s) => s.trim().parse().ok(),
                _ => None,
            };
            match id {
                Some(id) => Ok((slot, id)),
                None => Err(ExportError::InvalidMappool {
                    slot,
                    value: value.to_string(),
                }),
            }
        })
        .collect()
}

/// Accuracy in percent from hit counts, rounded to two decimals.
pub fn calc_accuracy(count50: u64, count100: u64, count300: u64, countmiss: u64) -> f64 {
    let total_hits = count50 + count100 + count300 + countmiss;
    if total_hits == 0 {
        return 0.0;
    }
    let weighted = (count50 * 50 + count100 * 100 + count300 * 300) as f64;
    let acc = weighted / (total_hits as f64 * 300.0) * 100.0;
    (acc * 100.0).round() / 100.0
}

fn parse_num(field: &'static str, value: &str) -> Result<u64, ExportError> {
    value.trim().parse().map_err(|_| ExportError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

/// Accumulates the dataset, keeping the best score per (player, map).
#[derive(Debug, Default)]
pub struct DatasetBuilder {
    dataset: Dataset,
}

impl DatasetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_map(&mut self, map: Map) {
        self.dataset.maps.insert(map.beatmap_id, map);
    }

    pub fn has_map(&self, beatmap_id: BeatmapId) -> bool {
        self.dataset.maps.contains_key(&beatmap_id)
    }

    pub fn has_user(&self, user_id: UserId) -> bool {
        self.dataset.users.contains_key(&user_id)
    }

    pub fn add_user(&mut self, user: User) {
        self.dataset.users.insert(user.user_id, user);
    }

    /// Record a score. A later score on the same map replaces the earlier
    /// one in place only if it is strictly higher.
    pub fn record_score(&mut self, user_id: UserId, score: Score) {
        let username = self.dataset.users.get(&user_id).map(|u| u.username.clone());
        let player = self.dataset.players.entry(user_id).or_insert_with(|| Player {
            username,
            ..Player::new(user_id)
        });

        match player
            .scores
            .iter_mut()
            .find(|s| s.beatmap_id == score.beatmap_id)
        {
            Some(current) if score.score > current.score => *current = score,
            Some(_) => {}
            None => player.scores.push(score),
        }
    }

    pub fn build(self) -> Dataset {
        self.dataset
    }
}

/// Drives the osu! API to build a dataset.
pub struct Exporter<A> {
    api: A,
    request_delay: Duration,
}

impl<A: OsuApi> Exporter<A> {
    pub fn new(api: A, request_delay: Duration) -> Self {
        Self { api, request_delay }
    }

    async fn pause(&self) {
        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }
    }

    /// Fetch the pool and all listed matches.
    pub async fn build(
        &self,
        mp_links: &[String],
        mappool: &[(String, BeatmapId)],
    ) -> Result<Dataset, ExportError> {
        let mut builder = DatasetBuilder::new();

        for (slot, beatmap_id) in mappool {
            info!("Processing beatmap {} ({})", beatmap_id, slot);
            let info = self
                .api
                .get_beatmap(*beatmap_id)
                .await?
                .ok_or(ExportError::BeatmapNotFound(*beatmap_id))?;
            builder.add_map(
                Map::new(*beatmap_id, slot.as_str()).with_metadata(
                    info.artist,
                    info.title,
                    info.version,
                ),
            );
            self.pause().await;
        }

        for link in mp_links {
            let Some(match_id) = extract_match_id(link) else {
                warn!("Skipping link without a match id: {}", link);
                continue;
            };

            info!("Processing match {}", match_id);
            let response = self.api.get_match(match_id).await?;

            for (game_id, game) in response.games.iter().enumerate() {
                let beatmap_id = parse_num("beatmap_id", &game.beatmap_id)?;
                if !builder.has_map(beatmap_id) {
                    continue;
                }

                for game_score in &game.scores {
                    let user_id = parse_num("user_id", &game_score.user_id)?;
                    if !builder.has_user(user_id) {
                        let username = self
                            .api
                            .get_username(user_id)
                            .await?
                            .unwrap_or_else(|| format!("Unknown user {}", user_id));
                        builder.add_user(User::new(user_id, username));
                        self.pause().await;
                    }

                    let score = to_score(match_id, game_id as u32, beatmap_id, game_score)?;
                    builder.record_score(user_id, score);
                }
            }

            self.pause().await;
        }

        let dataset = builder.build();
        info!(
            "Exported {} maps, {} players, {} scores",
            dataset.maps.len(),
            dataset.players.len(),
            dataset.score_count()
        );
        Ok(dataset)
    }
}

fn to_score(
    match_id: u64,
    game_id: u32,
    beatmap_id: BeatmapId,
    s: &GameScore,
) -> Result<Score, ExportError> {
    let accuracy = calc_accuracy(
        parse_num("count50", &s.count50)?,
        parse_num("count100", &s.count100)?,
        parse_num("count300", &s.count300)?,
        parse_num("countmiss", &s.countmiss)?,
    );
    let mods = match s.enabled_mods.as_deref() {
        Some(m) if !m.trim().is_empty() => u32::try_from(parse_num("enabled_mods", m)?)
            .map_err(|_| ExportError::InvalidNumber {
                field: "enabled_mods",
                value: m.to_string(),
            })?,
        _ => 0,
    };

    Ok(Score::new(beatmap_id, parse_num("score", &s.score)?, accuracy)
        .with_source(match_id, game_id, mods))
}

/// Write the dataset as pretty JSON, creating parent directories.
pub fn write_dataset(path: &Path, dataset: &Dataset) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(dataset)?;
    std::fs::write(path, json)?;
    info!("Wrote to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::osu::{BeatmapInfo, Game, MatchResponse};
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use tempfile::TempDir;

    struct MockApi {
        matches: HashMap<u64, MatchResponse>,
        beatmaps: HashMap<u64, BeatmapInfo>,
        users: HashMap<u64, String>,
    }

    #[async_trait]
    impl OsuApi for MockApi {
        async fn get_match(&self, match_id: u64) -> Result<MatchResponse, ExportError> {
            self.matches
                .get(&match_id)
                .cloned()
                .ok_or(ExportError::ApiStatus {
                    endpoint: "get_match".to_string(),
                    status: 404,
                })
        }

        async fn get_beatmap(&self, beatmap_id: u64) -> Result<Option<BeatmapInfo>, ExportError> {
            Ok(self.beatmaps.get(&beatmap_id).cloned())
        }

        async fn get_username(&self, user_id: u64) -> Result<Option<String>, ExportError> {
            Ok(self.users.get(&user_id).cloned())
        }
    }

    fn game_score(user_id: u64, score: u64) -> GameScore {
        GameScore {
            user_id: user_id.to_string(),
            score: score.to_string(),
            count50: "0".to_string(),
            count100: "0".to_string(),
            count300: "100".to_string(),
            countmiss: "0".to_string(),
            enabled_mods: None,
        }
    }

    fn beatmap(title: &str) -> BeatmapInfo {
        BeatmapInfo {
            artist: "artist".to_string(),
            title: title.to_string(),
            version: "Insane".to_string(),
        }
    }

    fn mock_api() -> MockApi {
        let first = MatchResponse {
            games: vec![
                Game {
                    beatmap_id: "100".to_string(),
                    scores: vec![game_score(1, 500), game_score(2, 700)],
                },
                Game {
                    beatmap_id: "999".to_string(),
                    scores: vec![game_score(1, 1_000_000)],
                },
                Game {
                    beatmap_id: "200".to_string(),
                    scores: vec![game_score(1, 300)],
                },
            ],
        };
        let rematch = MatchResponse {
            games: vec![Game {
                beatmap_id: "100".to_string(),
                scores: vec![game_score(1, 800), game_score(2, 600)],
            }],
        };

        MockApi {
            matches: HashMap::from([(111, first), (222, rematch)]),
            beatmaps: HashMap::from([(100, beatmap("first")), (200, beatmap("second"))]),
            users: HashMap::from([(1, "alice".to_string())]),
        }
    }

    #[test]
    fn test_extract_match_id() {
        assert_eq!(
            extract_match_id("https://osu.ppy.sh/community/matches/111534249"),
            Some(111534249)
        );
        assert_eq!(extract_match_id("https://osu.ppy.sh/mp/42  "), Some(42));
        assert_eq!(extract_match_id("https://osu.ppy.sh/community/matches/"), None);
    }

    #[test]
    fn test_parse_mp_links() {
        let links = parse_mp_links("# qualifiers\nhttps://a/1\n\n  https://a/2  \n#https://a/3\n");
        assert_eq!(links, vec!["https://a/1", "https://a/2"]);
    }

    #[test]
    fn test_parse_mappool() {
        let pool = parse_mappool(r#"{ "NM1": 100, "HD1": "200", "TB": 300 }"#).unwrap();
        assert_eq!(
            pool,
            vec![
                ("HD1".to_string(), 200),
                ("NM1".to_string(), 100),
                ("TB".to_string(), 300),
            ]
        );

        assert!(matches!(
            parse_mappool(r#"{ "NM1": "abc" }"#),
            Err(ExportError::InvalidMappool { .. })
        ));
        assert!(parse_mappool("[]").is_err());
    }

    #[test]
    fn test_calc_accuracy() {
        assert_eq!(calc_accuracy(0, 0, 0, 0), 0.0);
        assert_eq!(calc_accuracy(0, 0, 100, 0), 100.0);
        // (100*10 + 300*90) / (300*100) = 93.333..
        assert_eq!(calc_accuracy(0, 10, 90, 0), 93.33);
        assert_eq!(calc_accuracy(1, 1, 1, 1), 37.5);
    }

    #[test]
    fn test_to_score_reads_mods() {
        let mut hd = game_score(1, 500);
        hd.enabled_mods = Some("8".to_string());
        let score = to_score(111, 0, 100, &hd).unwrap();
        assert_eq!(score.mods, Some(8));

        let score = to_score(111, 0, 100, &game_score(1, 500)).unwrap();
        assert_eq!(score.mods, Some(0));
    }

    #[test]
    fn test_to_score_rejects_out_of_range_mods() {
        let mut gs = game_score(1, 500);
        gs.enabled_mods = Some("4294967296".to_string());
        let err = to_score(111, 0, 100, &gs).unwrap_err();
        assert!(matches!(
            err,
            ExportError::InvalidNumber {
                field: "enabled_mods",
                ..
            }
        ));
    }

    #[test]
    fn test_record_score_keeps_best_in_place() {
        let mut builder = DatasetBuilder::new();
        builder.add_user(User::new(1, "alice"));
        builder.record_score(1, Score::new(10, 100, 90.0));
        builder.record_score(1, Score::new(20, 50, 90.0));
        builder.record_score(1, Score::new(10, 300, 95.0));
        builder.record_score(1, Score::new(10, 200, 99.0));

        let ds = builder.build();
        let player = &ds.players[&1];
        let scores: Vec<(u64, u64)> = player.scores.iter().map(|s| (s.beatmap_id, s.score)).collect();
        assert_eq!(scores, vec![(10, 300), (20, 50)]);
        assert_eq!(player.username.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn test_export_builds_dataset() {
        let exporter = Exporter::new(mock_api(), Duration::ZERO);
        let links = vec![
            "https://osu.ppy.sh/community/matches/111".to_string(),
            "not a match link".to_string(),
            "https://osu.ppy.sh/community/matches/222".to_string(),
        ];
        let pool = vec![("NM1".to_string(), 100), ("HD1".to_string(), 200)];

        let ds = exporter.build(&links, &pool).await.unwrap();

        assert_eq!(ds.maps.len(), 2);
        assert_eq!(ds.maps[&100].title.as_deref(), Some("first"));
        assert_eq!(ds.username(1), "alice");
        assert_eq!(ds.username(2), "Unknown user 2");

        let alice: Vec<(u64, u64)> = ds.players[&1]
            .scores
            .iter()
            .map(|s| (s.beatmap_id, s.score))
            .collect();
        assert_eq!(alice, vec![(100, 800), (200, 300)]);

        let bob = &ds.players[&2].scores;
        assert_eq!(bob.len(), 1);
        assert_eq!(bob[0].score, 700);
        assert_eq!(bob[0].match_id, Some(111));
        assert_eq!(bob[0].game_id, Some(0));
        assert_eq!(bob[0].accuracy, 100.0);
    }

    #[tokio::test]
    async fn test_export_missing_beatmap() {
        let exporter = Exporter::new(mock_api(), Duration::ZERO);
        let pool = vec![("NM1".to_string(), 404)];

        let result = exporter.build(&[], &pool).await;
        assert!(matches!(result, Err(ExportError::BeatmapNotFound(404))));
    }

    #[test]
    fn test_write_dataset_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data").join("osu_scores.json");
        let ds = Dataset::default()
            .with_user(1, "alice")
            .with_map(10, "NM1")
            .with_score(1, Score::new(10, 5, 50.0));

        write_dataset(&path, &ds).unwrap();

        let back = Dataset::from_json(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, ds);
    }
}
