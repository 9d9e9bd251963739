use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Grid, Phrase, PuzzleConfig, TranslationSubmission};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartSessionRequest {
    pub token: String,
    pub nickname: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartSessionResponse {
    pub session_token: String,
    pub grid: Grid,
    pub phrases: Vec<Phrase>,
    /// Overrides the puzzle set config for this play when present
    #[serde(default)]
    pub config: Option<PuzzleConfig>,
    #[serde(default)]
    pub puzzle_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompleteSessionRequest {
    pub session_token: String,
    pub phrases_found: usize,
    pub duration_seconds: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation_submissions: Option<Vec<TranslationSubmission>>,
}

/// One started play-through. Never persisted.
#[derive(Debug, Clone)]
pub struct Session {
    pub session_token: String,
    pub config: PuzzleConfig,
    pub puzzle_name: String,
    pub nickname: String,
    pub started_at: DateTime<Utc>,
}
