mod api;
mod auth;
mod config;
mod game;
mod models;
mod session;
mod storage;
mod terminal;

use std::sync::Arc;

use anyhow::Result;
use api::ApiClient;
use config::Config;
use session::PuzzleSession;
use storage::{MemoryStorage, SessionStorage, AUTH_TOKEN_KEY};
use terminal::Terminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they stay out of the board
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "puzzle_session_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env()?;
    tracing::info!("Configuration loaded, backend at {}", config.api.base_url);

    let api = ApiClient::with_timeout(&config.api.base_url, config.api.request_timeout)?;

    let storage = Arc::new(MemoryStorage::new());
    if let Some(token) = &config.player.auth_token {
        storage.set(AUTH_TOKEN_KEY, token);
    }

    let access_token = config.player.access_token.clone().unwrap_or_default();
    if access_token.is_empty() {
        tracing::warn!("No puzzle token given; pass it as the first argument or PUZZLE_ACCESS_TOKEN");
    }

    let (session, events) = PuzzleSession::new(
        Arc::new(api),
        storage,
        config.session.clone(),
        access_token,
    );

    let terminal = Terminal::new(session, events, config.player.nickname.clone());
    let mut session = terminal.run().await?;

    // Give an in-flight completion report the chance to land
    session.wait_for_report().await;
    tracing::info!("Goodbye");

    Ok(())
}
