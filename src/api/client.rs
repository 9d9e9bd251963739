use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::{ApiError, PuzzleApi};
use crate::models::{
    CompleteSessionRequest, Profile, PuzzleSet, StartSessionRequest, StartSessionResponse,
};

/// reqwest-backed client for the puzzle backend
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    /// Build a client with its own connection pool and request timeout
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::new(http, base_url))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a response into `T`, mapping failures through the error body
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!("Puzzle API returned {} - {}", status, body);
            return Err(ApiError::from_response(status.as_u16(), &body));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl PuzzleApi for ApiClient {
    async fn puzzle_set_by_token(&self, token: &str) -> Result<PuzzleSet, ApiError> {
        tracing::debug!("Fetching puzzle set for token");

        let response = self
            .http
            .get(self.url("/puzzle-set-by-token"))
            .query(&[("token", token)])
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn start_session(
        &self,
        request: &StartSessionRequest,
        bearer: Option<&str>,
    ) -> Result<StartSessionResponse, ApiError> {
        tracing::debug!("Starting puzzle session for {}", request.nickname);

        let mut builder = self.http.post(self.url("/puzzle-session/start")).json(request);
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }

        Self::decode(builder.send().await?).await
    }

    async fn complete_session(&self, request: &CompleteSessionRequest) -> Result<(), ApiError> {
        let response = self
            .http
            .post(self.url("/puzzle-session/complete"))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(ApiError::from_response(status.as_u16(), &body));
        }

        Ok(())
    }

    async fn profile(&self, bearer: &str) -> Result<Profile, ApiError> {
        let response = self
            .http
            .get(self.url("/profile"))
            .bearer_auth(bearer)
            .send()
            .await?;

        Self::decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::PuzzleErrorCode;
    use axum::{
        extract::{Query, State},
        http::{HeaderMap, StatusCode},
        routing::{get, post},
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::{
        collections::HashMap,
        sync::{Arc, Mutex},
    };
    use tokio_test::{assert_err, assert_ok};

    type Captured = Arc<Mutex<Vec<Value>>>;

    async fn puzzle_set(Query(params): Query<HashMap<String, String>>) -> (StatusCode, Json<Value>) {
        match params.get("token").map(String::as_str) {
            Some("good") => (
                StatusCode::OK,
                Json(json!({
                    "name": "Animals",
                    "description": "Find the animals",
                    "config": { "grid_size": 8, "require_translation_input": true }
                })),
            ),
            Some("old") => (
                StatusCode::GONE,
                Json(json!({ "error_code": "SET_EXPIRED", "message": "expired" })),
            ),
            _ => (StatusCode::NOT_FOUND, Json(json!({}))),
        }
    }

    async fn start(
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        let bearer = headers
            .get("authorization")
            .and_then(|h| h.to_str().ok())
            .map(str::to_string);
        (
            StatusCode::OK,
            Json(json!({
                "session_token": format!("session-for-{}", body["nickname"].as_str().unwrap_or("")),
                "grid": [["C","A","T"]],
                "phrases": [{ "phrase": "cat", "translation": "gato" }],
                "puzzle_name": bearer,
            })),
        )
    }

    async fn complete(State(captured): State<Captured>, Json(body): Json<Value>) -> StatusCode {
        captured.lock().unwrap().push(body);
        StatusCode::NO_CONTENT
    }

    async fn profile(headers: HeaderMap) -> (StatusCode, Json<Value>) {
        match headers.get("authorization").and_then(|h| h.to_str().ok()) {
            Some("Bearer valid") => (
                StatusCode::OK,
                Json(json!({ "username": "jdoe", "nickname": "Jane" })),
            ),
            _ => (StatusCode::UNAUTHORIZED, Json(json!({}))),
        }
    }

    /// Serve a fake backend on an ephemeral port and return its base URL
    async fn spawn_backend() -> (String, Captured) {
        let captured: Captured = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/api/puzzle-set-by-token", get(puzzle_set))
            .route("/api/puzzle-session/start", post(start))
            .route("/api/puzzle-session/complete", post(complete))
            .route("/api/profile", get(profile))
            .with_state(captured.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}/api/", addr), captured)
    }

    fn client(base_url: &str) -> ApiClient {
        ApiClient::with_timeout(base_url, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_puzzle_set_by_token() {
        let (base_url, _) = spawn_backend().await;
        let set = assert_ok!(client(&base_url).puzzle_set_by_token("good").await);

        assert_eq!(set.name, "Animals");
        assert_eq!(set.config.grid_size, 8);
        assert!(set.config.require_translation_input);
    }

    #[tokio::test]
    async fn test_puzzle_set_error_codes() {
        let (base_url, _) = spawn_backend().await;
        let api = client(&base_url);

        let err = assert_err!(api.puzzle_set_by_token("old").await);
        assert_eq!(err.puzzle_code(), Some(&PuzzleErrorCode::Expired));

        let err = assert_err!(api.puzzle_set_by_token("missing").await);
        assert_eq!(err.puzzle_code(), Some(&PuzzleErrorCode::NotFound));
    }

    #[tokio::test]
    async fn test_start_session_sends_nickname_and_bearer() {
        let (base_url, _) = spawn_backend().await;
        let request = StartSessionRequest {
            token: "good".to_string(),
            nickname: "Jane".to_string(),
        };

        let response = assert_ok!(client(&base_url).start_session(&request, Some("abc")).await);
        assert_eq!(response.session_token, "session-for-Jane");
        assert_eq!(response.grid, vec![vec!['C', 'A', 'T']]);
        assert_eq!(response.puzzle_name.as_deref(), Some("Bearer abc"));

        let response = assert_ok!(client(&base_url).start_session(&request, None).await);
        assert_eq!(response.puzzle_name, None);
    }

    #[tokio::test]
    async fn test_complete_session_posts_report() {
        let (base_url, captured) = spawn_backend().await;
        let request = CompleteSessionRequest {
            session_token: "s-1".to_string(),
            phrases_found: 3,
            duration_seconds: 61,
            translation_submissions: None,
        };

        assert_ok!(client(&base_url).complete_session(&request).await);

        let bodies = captured.lock().unwrap().clone();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0]["session_token"], "s-1");
        assert_eq!(bodies[0]["phrases_found"], 3);
        assert_eq!(bodies[0]["duration_seconds"], 61);
    }

    #[tokio::test]
    async fn test_profile_requires_valid_bearer() {
        let (base_url, _) = spawn_backend().await;
        let api = client(&base_url);

        let profile = assert_ok!(api.profile("valid").await);
        assert_eq!(profile.display_name(), "Jane");

        let err = assert_err!(api.profile("stale").await);
        assert_eq!(err.puzzle_code(), Some(&PuzzleErrorCode::AuthRequired));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_a_transport_error() {
        let api = ApiClient::with_timeout("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = assert_err!(api.puzzle_set_by_token("good").await);
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
