//! Field validation shared by the tools.
//!
//! Each helper returns the parsed value or a `VALIDATION_ERROR` naming the
//! field it was given.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};

use cartera_core::{
  calendar::{YearMonth, parse_date, parse_instant},
  money::Cents,
  store::Scope,
};

use crate::error::{ToolError, ToolResult};

/// `user_id` and `thread_id`, present on every tool input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScopeInput {
  pub user_id:   Option<String>,
  pub thread_id: Option<String>,
}

impl ScopeInput {
  pub fn new(user_id: impl Into<String>, thread_id: impl Into<String>) -> Self {
    Self { user_id: Some(user_id.into()), thread_id: Some(thread_id.into()) }
  }

  pub fn require(&self) -> ToolResult<Scope> {
    let user_id   = non_empty("user_id", self.user_id.as_deref())?;
    let thread_id = non_empty("thread_id", self.thread_id.as_deref())?;
    Ok(Scope::new(user_id, thread_id))
  }
}

pub fn non_empty<'a>(field: &str, value: Option<&'a str>) -> ToolResult<&'a str> {
  value
    .filter(|v| !v.trim().is_empty())
    .ok_or_else(|| ToolError::validation(field, format!("{} is required", leaf(field))))
}

pub fn non_negative(field: &str, value: Option<Cents>) -> ToolResult<Cents> {
  value
    .filter(|v| *v >= 0)
    .ok_or_else(|| {
      ToolError::validation(field, format!("{} must be a non-negative integer", leaf(field)))
    })
}

/// Like [`non_negative`], but absence is allowed.
pub fn optional_non_negative(field: &str, value: Option<Cents>) -> ToolResult<Option<Cents>> {
  value.map(|v| non_negative(field, Some(v))).transpose()
}

pub fn month(field: &str, value: Option<&str>) -> ToolResult<YearMonth> {
  value
    .and_then(|v| v.parse().ok())
    .ok_or_else(|| {
      ToolError::validation(field, format!("{} is invalid (expected YYYY-MM)", leaf(field)))
    })
}

pub fn date(field: &str, value: Option<&str>) -> ToolResult<NaiveDate> {
  value
    .and_then(|v| parse_date(v).ok())
    .ok_or_else(|| {
      ToolError::validation(field, format!("{} is invalid (expected YYYY-MM-DD)", leaf(field)))
    })
}

pub fn instant(field: &str, value: &str) -> ToolResult<DateTime<Utc>> {
  parse_instant(value)
    .map_err(|_| ToolError::validation(field, format!("{} is invalid", leaf(field))))
}

/// Deserialize a field so that an explicit `null` is `Some(None)` and an
/// absent field is `None`. Pair with `#[serde(default)]`.
pub fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  Option::<T>::deserialize(deserializer).map(Some)
}

fn leaf(field: &str) -> &str { field.rsplit('.').next().unwrap_or(field) }
