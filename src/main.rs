//! Number Guess Server
//!
//! Serves the guessing game API (and, if configured, the built front end).

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use number_guess::{
    GameServer, GameSession, RandomSecrets, ServerConfig, SharedSession, MAX_ATTEMPTS, SECRET_MAX,
    SECRET_MIN, VERSION,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Number Guess Server v{}", VERSION);
    info!(
        "Secrets in [{}, {}], {} attempts per round",
        SECRET_MIN, SECRET_MAX, MAX_ATTEMPTS
    );

    let config = ServerConfig::from_env().context("reading configuration")?;
    if let Some(root) = &config.static_root {
        info!("Serving front end from {}", root.display());
    }

    let session = SharedSession::new(GameSession::new(Box::new(RandomSecrets::from_entropy())));
    let server = GameServer::new(config, session);

    tokio::select! {
        result = server.run() => result.context("server stopped")?,
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl-C received, shutting down");
            server.shutdown();
        }
    }

    Ok(())
}
