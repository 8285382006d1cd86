//! Transport errors and their HTTP responses.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use cartera_tools::{ErrorCode, ToolError, error::envelope};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unauthorized")]
  Unauthorized,
  #[error("webhook secret is not configured")]
  MissingWebhookSecret,
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
  #[error("http client error: {0}")]
  Client(#[from] reqwest::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

fn auth_failure(status: StatusCode, message: &str) -> Response {
  let body = envelope::<()>(Err(ToolError::new(ErrorCode::AuthError, message)));
  (status, Json(body)).into_response()
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::Unauthorized => auth_failure(StatusCode::UNAUTHORIZED, "Unauthorized"),
      Error::MissingWebhookSecret => {
        auth_failure(StatusCode::INTERNAL_SERVER_ERROR, "Missing webhook secret")
      }
      Error::Store(e) => {
        tracing::error!(error = %e, "store unavailable");
        (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "ok": false, "error": e.to_string() })))
          .into_response()
      }
      Error::Client(e) => {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "ok": false, "error": e.to_string() })))
          .into_response()
      }
    }
  }
}
