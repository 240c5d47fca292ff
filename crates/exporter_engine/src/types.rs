use std::fmt;

use serde::Deserialize;
use thiserror::Error;

/// Opaque handle to one player-month of games: the archive URL returned by
/// the listing endpoint, whose trailing path segments encode
/// `{player}/games/{year}/{month}`.
///
/// Parsing the derived views never fails; a malformed identifier degrades
/// to sentinel values instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct ArchiveId(String);

impl ArchiveId {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Year encoded in the identifier, `-1` when malformed.
    pub fn year(&self) -> i32 {
        self.segment_from_end(1)
            .and_then(|segment| segment.parse().ok())
            .unwrap_or(-1)
    }

    /// Month encoded in the identifier, `-1` when malformed.
    pub fn month(&self) -> i32 {
        self.segment_from_end(0)
            .and_then(|segment| segment.parse().ok())
            .unwrap_or(-1)
    }

    /// Player name encoded in the identifier, empty when malformed.
    pub fn player(&self) -> &str {
        self.segment_from_end(3).unwrap_or("")
    }

    fn segment_from_end(&self, offset: usize) -> Option<&str> {
        let segments: Vec<&str> = self.0.split('/').collect();
        segments
            .len()
            .checked_sub(offset + 1)
            .map(|index| segments[index])
    }
}

impl fmt::Display for ArchiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ArchiveId {
    fn from(url: &str) -> Self {
        Self(url.to_string())
    }
}

/// Response of the archive listing endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ArchiveList {
    #[serde(default)]
    pub archives: Vec<ArchiveId>,
}

/// One monthly archive document: the games recorded that month, in the
/// order the service returns them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MonthlyGames {
    #[serde(default)]
    pub games: Vec<Game>,
}

/// One recorded game. Only `pgn` feeds the export artifact; the remaining
/// fields are display metadata. The service omits fields for some game
/// types, so everything defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Game {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub pgn: String,
    #[serde(default)]
    pub end_time: i64,
    #[serde(default)]
    pub rated: bool,
    #[serde(default)]
    pub time_class: String,
    #[serde(default)]
    pub rules: String,
    #[serde(default)]
    pub white: GamePlayer,
    #[serde(default)]
    pub black: GamePlayer,
}

/// One side of a recorded game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GamePlayer {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub rating: i32,
    #[serde(default)]
    pub result: String,
    #[serde(rename = "@id", default)]
    pub url: String,
}

/// Failures from the remote service. The pipeline skips an archive whose
/// fetch failed; a failed listing surfaces as an empty archive list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("http status {0}")]
    Status(u16),
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Events the engine worker reports back to the frontend loop.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportEvent {
    ArchivesListed {
        player: String,
        result: Result<Vec<ArchiveId>, ApiError>,
    },
    ExportProgress(f32),
    ExportFinished(ExportOutcome),
}

/// Terminal state of one export run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Completed,
    Aborted,
    Failed(String),
}
