//! Tool error type and the JSON envelope every tool reply is wrapped in.

use serde::Serialize;
use serde_json::{Value, json};
use strum::Display;
use thiserror::Error;
use tracing::warn;

/// Machine-readable failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
  ValidationError,
  NotFound,
  AuthError,
  DbError,
  /// Reserved; no tool produces it today.
  Conflict,
}

/// A failed tool call. `details` carries structured context such as the
/// offending `field`.
#[derive(Debug, Clone, Error, Serialize)]
#[error("{code}: {message}")]
pub struct ToolError {
  pub code:    ErrorCode,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub details: Option<Value>,
}

pub type ToolResult<T> = Result<T, ToolError>;

impl ToolError {
  pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
    Self { code, message: message.into(), details: None }
  }

  pub fn with_details(mut self, details: Value) -> Self {
    self.details = Some(details);
    self
  }

  /// Invalid or missing input; `field` names the offending path.
  pub fn validation(field: &str, message: impl Into<String>) -> Self {
    Self::new(ErrorCode::ValidationError, message).with_details(json!({ "field": field }))
  }

  pub fn not_found(message: impl Into<String>) -> Self {
    Self::new(ErrorCode::NotFound, message)
  }

  /// A body that did not deserialize into the tool's input shape.
  pub fn malformed(err: &serde_json::Error) -> Self {
    Self::new(ErrorCode::ValidationError, format!("invalid input: {err}"))
  }

  /// Log a storage failure and hide its details from the caller.
  pub fn store(context: &str, err: impl std::error::Error) -> Self {
    warn!(error = %err, "{context}");
    Self::new(ErrorCode::DbError, context)
  }
}

/// Wrap a tool outcome as `{"ok":true,"data":..}` or
/// `{"ok":false,"error":{..}}`.
pub fn envelope<T: Serialize>(result: ToolResult<T>) -> Value {
  match result.and_then(|data| {
    serde_json::to_value(data).map_err(|e| ToolError::new(ErrorCode::DbError, e.to_string()))
  }) {
    Ok(data) => json!({ "ok": true, "data": data }),
    Err(error) => json!({ "ok": false, "error": error }),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn validation_error_names_the_field() {
    let value = envelope::<()>(Err(ToolError::validation("month", "month is invalid")));
    assert_eq!(value, json!({
      "ok": false,
      "error": {
        "code": "VALIDATION_ERROR",
        "message": "month is invalid",
        "details": { "field": "month" },
      },
    }));
  }

  #[test]
  fn success_wraps_data() {
    assert_eq!(envelope(Ok(3)), json!({ "ok": true, "data": 3 }));
  }

  #[test]
  fn codes_render_in_wire_form() {
    assert_eq!(ErrorCode::DbError.to_string(), "DB_ERROR");
    assert_eq!(ToolError::not_found("x").to_string(), "NOT_FOUND: x");
  }
}
