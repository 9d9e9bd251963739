pub mod client;
pub mod error;

use async_trait::async_trait;

use crate::models::{
    CompleteSessionRequest, Profile, PuzzleSet, StartSessionRequest, StartSessionResponse,
};

pub use client::ApiClient;
pub use error::{ApiError, PuzzleErrorCode};

/// Backend operations the puzzle session depends on.
/// The state machine only knows this trait.
#[async_trait]
pub trait PuzzleApi: Send + Sync {
    /// `GET /puzzle-set-by-token`
    async fn puzzle_set_by_token(&self, token: &str) -> Result<PuzzleSet, ApiError>;

    /// `POST /puzzle-session/start`
    async fn start_session(
        &self,
        request: &StartSessionRequest,
        bearer: Option<&str>,
    ) -> Result<StartSessionResponse, ApiError>;

    /// `POST /puzzle-session/complete`
    async fn complete_session(&self, request: &CompleteSessionRequest) -> Result<(), ApiError>;

    /// `GET /profile`
    async fn profile(&self, bearer: &str) -> Result<Profile, ApiError>;
}
