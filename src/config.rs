use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::time::Duration;

/// Hints available to every new session
pub const DEFAULT_HINT_BUDGET: u32 = 3;
/// How long a fully revealed hint stays on screen
pub const DEFAULT_HINT_RESET: Duration = Duration::from_secs(3);
/// Upper bound on the initial puzzle lookup before giving up
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub player: PlayerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub load_timeout: Duration,
    pub hint_budget: u32,
    pub hint_reset_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            load_timeout: DEFAULT_LOAD_TIMEOUT,
            hint_budget: DEFAULT_HINT_BUDGET,
            hint_reset_delay: DEFAULT_HINT_RESET,
        }
    }
}

/// Who is playing what. All optional; the terminal asks for what is missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerConfig {
    pub access_token: Option<String>,
    pub nickname: Option<String>,
    pub auth_token: Option<String>,
}

fn secs_var(name: &str, default: u64) -> Result<Duration> {
    let secs: u64 = env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .with_context(|| format!("{} must be a number of seconds", name))?;
    Ok(Duration::from_secs(secs))
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api = ApiConfig {
            base_url: env::var("PUZZLE_API_URL")
                .unwrap_or_else(|_| "http://localhost:8000/api".to_string()),
            request_timeout: secs_var("PUZZLE_REQUEST_TIMEOUT_SECS", 30)?,
        };

        let session = SessionConfig {
            load_timeout: secs_var(
                "PUZZLE_LOAD_TIMEOUT_SECS",
                DEFAULT_LOAD_TIMEOUT.as_secs(),
            )?,
            hint_budget: env::var("PUZZLE_HINT_BUDGET")
                .unwrap_or_else(|_| DEFAULT_HINT_BUDGET.to_string())
                .parse()
                .context("PUZZLE_HINT_BUDGET must be a number")?,
            hint_reset_delay: secs_var("PUZZLE_HINT_RESET_SECS", DEFAULT_HINT_RESET.as_secs())?,
        };

        // The first CLI argument wins over the environment
        let player = PlayerConfig {
            access_token: env::args()
                .nth(1)
                .or_else(|| optional_var("PUZZLE_ACCESS_TOKEN")),
            nickname: optional_var("PUZZLE_NICKNAME"),
            auth_token: optional_var("PUZZLE_AUTH_TOKEN"),
        };

        Ok(Config {
            api,
            session,
            player,
        })
    }
}
