//! Telegram front end for Cartera.
//!
//! Exposes an axum [`Router`] with the Telegram webhook, the key-protected
//! tools API and a health check, backed by any [`FinanceStore`].

pub mod auth;
pub mod command;
pub mod error;
pub mod format;
pub mod router;
pub mod telegram;
pub mod update;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Json, Router,
  extract::State,
  http::HeaderMap,
  middleware,
  routing::{get, post},
};
use bytes::Bytes;
use cartera_core::store::FinanceStore;
use cartera_tools::{Toolbox, tools_router};
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

use auth::AuthConfig;
use router::Incoming;
use telegram::TelegramClient;
use update::Update;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `CARTERA_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:              String,
  #[serde(default = "default_port")]
  pub port:              u16,
  #[serde(default = "default_store_path")]
  pub store_path:        PathBuf,
  /// IANA zone used to read dates out of message timestamps.
  #[serde(default = "default_timezone")]
  pub timezone:          String,
  /// Send replies through Telegram and require a webhook secret.
  #[serde(default)]
  pub production:        bool,
  pub webhook_secret:    Option<String>,
  pub tools_api_key:     Option<String>,
  pub bot_token:         Option<String>,
  #[serde(default = "default_api_base")]
  pub telegram_api_base: String,
}

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("cartera.db") }
fn default_timezone() -> String { "America/Mexico_City".to_owned() }
fn default_api_base() -> String { telegram::DEFAULT_API_BASE.to_owned() }

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub tools:      Arc<Toolbox<S>>,
  pub auth:       Arc<AuthConfig>,
  pub telegram:   TelegramClient,
  pub production: bool,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      tools:      Arc::clone(&self.tools),
      auth:       Arc::clone(&self.auth),
      telegram:   self.telegram.clone(),
      production: self.production,
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the HTTP router.
///
/// | Route | Method |
/// |-------|--------|
/// | `/telegram/webhook` | POST |
/// | `/tools/{name}` | POST, requires `x-tools-key` |
/// | `/health` | GET |
pub fn router<S>(state: AppState<S>) -> Router
where
  S: FinanceStore + 'static,
{
  let tools = tools_router(Arc::clone(&state.tools)).layer(middleware::from_fn_with_state(
    Arc::clone(&state.auth),
    auth::require_tools_key,
  ));

  Router::new()
    .route("/telegram/webhook", post(webhook::<S>))
    .route("/health", get(health::<S>))
    .with_state(state)
    .nest("/tools", tools)
    .layer(TraceLayer::new_for_http())
}

// ─── Handlers ────────────────────────────────────────────────────────────────

fn ack() -> Json<Value> { Json(json!({ "ok": true })) }

async fn webhook<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
  body: Bytes,
) -> Result<Json<Value>, Error>
where
  S: FinanceStore + 'static,
{
  state.auth.verify_webhook(&headers)?;

  let Ok(update) = serde_json::from_slice::<Update>(&body) else {
    tracing::debug!("ignoring unreadable update");
    return Ok(ack());
  };
  let Some(message) = update.text_message() else { return Ok(ack()) };
  let Some(chat_id) = message.chat_id() else { return Ok(ack()) };

  let incoming = Incoming {
    user_id:   message.sender(),
    thread_id: chat_id.to_string(),
    text:      message.text().unwrap_or_default().to_owned(),
    now_iso:   Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
  };
  let reply = router::handle_text(&state.tools, &incoming).await;

  if !state.production {
    return Ok(Json(json!({ "ok": true, "reply": reply })));
  }
  state.telegram.send_message(chat_id, &reply).await;
  Ok(ack())
}

async fn health<S>(State(state): State<AppState<S>>) -> Result<Json<Value>, Error>
where
  S: FinanceStore + 'static,
{
  state.tools.store().ping().await.map_err(|e| Error::Store(Box::new(e)))?;
  Ok(ack())
}

#[cfg(test)]
mod tests;
