//! Outbound Telegram Bot API client.

use std::time::Duration;

use reqwest::Client;
use serde_json::json;
use tracing::{error, info, warn};

use crate::error::Result;

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Sends replies with `sendMessage`.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based. Without a
/// token every send is logged and skipped.
#[derive(Clone)]
pub struct TelegramClient {
  client:   Client,
  api_base: String,
  token:    Option<String>,
}

impl TelegramClient {
  pub fn new(api_base: impl Into<String>, token: Option<String>) -> Result<Self> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self { client, api_base: api_base.into(), token })
  }

  fn url(&self, token: &str, method: &str) -> String {
    format!("{}/bot{token}/{method}", self.api_base.trim_end_matches('/'))
  }

  /// `POST /bot{token}/sendMessage`. Failures are logged, never returned.
  pub async fn send_message(&self, chat_id: i64, text: &str) {
    let Some(token) = self.token.as_deref() else {
      error!("bot token is not configured, dropping reply");
      return;
    };

    let resp = self
      .client
      .post(self.url(token, "sendMessage"))
      .json(&json!({ "chat_id": chat_id, "text": text }))
      .send()
      .await;

    match resp {
      Ok(r) if r.status().is_success() => info!(chat_id, "reply sent"),
      Ok(r) => warn!(chat_id, status = %r.status(), "sendMessage rejected"),
      Err(e) => warn!(chat_id, error = %e, "sendMessage failed"),
    }
  }
}
