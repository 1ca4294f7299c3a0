//! Identifier types shared across the dataset and selections.

use thiserror::Error;

/// osu! user id. Also identifies the player entry for that user.
pub type UserId = u64;

/// osu! beatmap id.
pub type BeatmapId = u64;

/// A comma-separated id list contained something that is not an id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid id '{0}' in list")]
pub struct InvalidIdError(pub String);

/// Parse a comma-separated list of numeric ids (e.g. `"123,456"`).
///
/// Whitespace around entries and empty segments are ignored, so `""` yields
/// an empty list.
pub fn parse_id_list(s: &str) -> Result<Vec<u64>, InvalidIdError> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u64>()
                .map_err(|_| InvalidIdError(part.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_list() {
        assert_eq!(parse_id_list("1,22,333"), Ok(vec![1, 22, 333]));
    }

    #[test]
    fn test_parse_id_list_whitespace_and_empty_segments() {
        assert_eq!(parse_id_list(" 7 , ,8,"), Ok(vec![7, 8]));
        assert_eq!(parse_id_list(""), Ok(vec![]));
    }

    #[test]
    fn test_parse_id_list_rejects_garbage() {
        assert_eq!(
            parse_id_list("1,abc"),
            Err(InvalidIdError("abc".to_string()))
        );
        assert!(parse_id_list("-4").is_err());
    }
}
