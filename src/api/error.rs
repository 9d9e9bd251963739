use serde::Deserialize;
use std::fmt;

/// Error codes the backend uses when a hotlinked puzzle cannot be played
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum PuzzleErrorCode {
    #[serde(rename = "SET_NOT_FOUND")]
    NotFound,
    #[serde(rename = "SET_EXPIRED")]
    Expired,
    #[serde(rename = "SET_INACTIVE")]
    Inactive,
    #[serde(rename = "MAX_PLAYS_REACHED")]
    MaxPlaysReached,
    #[serde(rename = "AUTH_REQUIRED")]
    AuthRequired,
    #[serde(other)]
    Unknown,
}

impl PuzzleErrorCode {
    /// Message shown to the player
    pub fn user_message(&self) -> &'static str {
        match self {
            PuzzleErrorCode::NotFound => {
                "This puzzle could not be found. Please check the link you were given."
            }
            PuzzleErrorCode::Expired => "This puzzle has expired and can no longer be played.",
            PuzzleErrorCode::Inactive => "This puzzle is not active right now.",
            PuzzleErrorCode::MaxPlaysReached => {
                "This puzzle has reached its maximum number of plays."
            }
            PuzzleErrorCode::AuthRequired => "You need to log in to play this puzzle.",
            PuzzleErrorCode::Unknown => "This puzzle is not available.",
        }
    }

    fn as_code(&self) -> &'static str {
        match self {
            PuzzleErrorCode::NotFound => "SET_NOT_FOUND",
            PuzzleErrorCode::Expired => "SET_EXPIRED",
            PuzzleErrorCode::Inactive => "SET_INACTIVE",
            PuzzleErrorCode::MaxPlaysReached => "MAX_PLAYS_REACHED",
            PuzzleErrorCode::AuthRequired => "AUTH_REQUIRED",
            PuzzleErrorCode::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for PuzzleErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

/// Error body returned by the backend on failure
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error_code: Option<PuzzleErrorCode>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("puzzle unavailable: {0}")]
    Puzzle(PuzzleErrorCode),
    #[error("request failed with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Build an error from a non-success status and its raw body.
    /// A recognised error code wins; bare 404/401/403 are mapped to the
    /// matching puzzle codes.
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed = serde_json::from_str::<ErrorBody>(body).ok();

        if let Some(code) = parsed.as_ref().and_then(|b| b.error_code.clone()) {
            return ApiError::Puzzle(code);
        }

        match status {
            404 => ApiError::Puzzle(PuzzleErrorCode::NotFound),
            401 | 403 => ApiError::Puzzle(PuzzleErrorCode::AuthRequired),
            _ => ApiError::Status {
                status,
                message: parsed
                    .and_then(|b| b.message)
                    .unwrap_or_else(|| body.trim().to_string()),
            },
        }
    }

    pub fn puzzle_code(&self) -> Option<&PuzzleErrorCode> {
        match self {
            ApiError::Puzzle(code) => Some(code),
            _ => None,
        }
    }
}
