//! Shared-secret checks for the webhook and the tools API.

use std::sync::Arc;

use axum::{
  extract::{Request, State},
  http::HeaderMap,
  middleware::Next,
  response::{IntoResponse, Response},
};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

pub const WEBHOOK_SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";
pub const TOOLS_KEY_HEADER: &str = "x-tools-key";

/// Configured secrets. Empty strings count as unset.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
  pub webhook_secret: Option<String>,
  pub tools_api_key:  Option<String>,
  /// A missing webhook secret is an error instead of an open webhook.
  pub production:     bool,
}

impl AuthConfig {
  pub fn new(webhook_secret: Option<String>, tools_api_key: Option<String>, production: bool) -> Self {
    let set = |s: Option<String>| s.filter(|v| !v.is_empty());
    Self { webhook_secret: set(webhook_secret), tools_api_key: set(tools_api_key), production }
  }

  pub fn verify_webhook(&self, headers: &HeaderMap) -> Result<()> {
    match self.webhook_secret.as_deref() {
      None if self.production => Err(Error::MissingWebhookSecret),
      None => Ok(()),
      Some(secret) => check(secret, header(headers, WEBHOOK_SECRET_HEADER)),
    }
  }

  /// Without a configured key the tools API is closed.
  pub fn verify_tools_key(&self, headers: &HeaderMap) -> Result<()> {
    let key = self.tools_api_key.as_deref().ok_or(Error::Unauthorized)?;
    check(key, header(headers, TOOLS_KEY_HEADER))
  }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
  headers.get(name).and_then(|v| v.to_str().ok())
}

/// Compare digests so the comparison time does not depend on where the
/// strings first differ.
fn check(expected: &str, provided: Option<&str>) -> Result<()> {
  let provided = provided.ok_or(Error::Unauthorized)?;
  if Sha256::digest(expected.as_bytes()) == Sha256::digest(provided.as_bytes()) {
    Ok(())
  } else {
    Err(Error::Unauthorized)
  }
}

/// Middleware guarding the tools router.
pub async fn require_tools_key(
  State(auth): State<Arc<AuthConfig>>,
  req: Request,
  next: Next,
) -> Response {
  match auth.verify_tools_key(req.headers()) {
    Ok(()) => next.run(req).await,
    Err(e) => {
      tracing::warn!("tools request rejected");
      e.into_response()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::http::HeaderValue;

  fn headers(name: &'static str, value: &str) -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(name, HeaderValue::from_str(value).unwrap());
    h
  }

  #[test]
  fn webhook_open_without_secret_outside_production() {
    let auth = AuthConfig::new(None, None, false);
    assert!(auth.verify_webhook(&HeaderMap::new()).is_ok());
  }

  #[test]
  fn webhook_without_secret_in_production_fails() {
    let auth = AuthConfig::new(Some(String::new()), None, true);
    assert!(matches!(auth.verify_webhook(&HeaderMap::new()), Err(Error::MissingWebhookSecret)));
  }

  #[test]
  fn webhook_secret_must_match() {
    let auth = AuthConfig::new(Some("s3cret".into()), None, true);
    assert!(auth.verify_webhook(&headers(WEBHOOK_SECRET_HEADER, "s3cret")).is_ok());
    assert!(matches!(
      auth.verify_webhook(&headers(WEBHOOK_SECRET_HEADER, "nope")),
      Err(Error::Unauthorized)
    ));
    assert!(matches!(auth.verify_webhook(&HeaderMap::new()), Err(Error::Unauthorized)));
  }

  #[test]
  fn tools_closed_without_key() {
    let auth = AuthConfig::new(None, None, false);
    assert!(matches!(
      auth.verify_tools_key(&headers(TOOLS_KEY_HEADER, "anything")),
      Err(Error::Unauthorized)
    ));
  }

  #[test]
  fn tools_key_must_match() {
    let auth = AuthConfig::new(None, Some("k".into()), false);
    assert!(auth.verify_tools_key(&headers(TOOLS_KEY_HEADER, "k")).is_ok());
    assert!(auth.verify_tools_key(&headers(TOOLS_KEY_HEADER, "K")).is_err());
  }
}
