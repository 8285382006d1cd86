//! Cartera server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) and `CARTERA_*`
//! environment variables, opens the SQLite store and serves the webhook,
//! tools API and health check over HTTP.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::{Context as _, anyhow};
use cartera_bot::{AppState, ServerConfig, auth::AuthConfig, telegram::TelegramClient};
use cartera_store_sqlite::SqliteStore;
use cartera_tools::Toolbox;
use chrono_tz::Tz;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Cartera finance bot server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("CARTERA"))
    .build()
    .context("failed to read configuration")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let zone: Tz = server_cfg
    .timezone
    .parse()
    .map_err(|e| anyhow!("invalid timezone {:?}: {e}", server_cfg.timezone))?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let telegram = TelegramClient::new(&server_cfg.telegram_api_base, server_cfg.bot_token.clone())
    .context("failed to build Telegram client")?;
  if server_cfg.production && server_cfg.bot_token.is_none() {
    tracing::warn!("production mode without a bot token; replies will be dropped");
  }

  let state = AppState {
    tools: Arc::new(Toolbox::new(Arc::new(store), Arc::new(zone))),
    auth: Arc::new(AuthConfig::new(
      server_cfg.webhook_secret.clone(),
      server_cfg.tools_api_key.clone(),
      server_cfg.production,
    )),
    telegram,
    production: server_cfg.production,
  };

  let app = cartera_bot::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!(%zone, production = server_cfg.production, "Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
