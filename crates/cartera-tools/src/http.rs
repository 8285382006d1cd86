//! `POST /{name}`: run one tool on a JSON body.
//!
//! | Outcome | Status | Body |
//! |---------|--------|------|
//! | tool ran (success or tool error) | 200 | envelope |
//! | body is not JSON | 400 | `VALIDATION_ERROR` envelope |
//! | unknown tool | 404 | `NOT_FOUND` envelope |

use std::sync::Arc;

use axum::{
  Json, Router,
  body::Bytes,
  extract::{Path, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  routing::post,
};
use cartera_core::store::FinanceStore;
use serde_json::Value;

use crate::{
  Toolbox,
  error::{ErrorCode, ToolError, envelope},
};

/// Build the tool router. Nest it under a prefix, e.g. `/tools`.
pub fn tools_router<S>(tools: Arc<Toolbox<S>>) -> Router<()>
where
  S: FinanceStore + 'static,
{
  Router::new().route("/{name}", post(call::<S>)).with_state(tools)
}

async fn call<S>(
  State(tools): State<Arc<Toolbox<S>>>,
  Path(name): Path<String>,
  body: Bytes,
) -> Response
where
  S: FinanceStore + 'static,
{
  let body: Value = if body.is_empty() {
    Value::Object(Default::default())
  } else {
    match serde_json::from_slice(&body) {
      Ok(v) => v,
      Err(e) => return reject(StatusCode::BAD_REQUEST, ToolError::malformed(&e)),
    }
  };

  match tools.dispatch(&name, body).await {
    Some(reply) => Json(reply).into_response(),
    None => reject(StatusCode::NOT_FOUND, ToolError::new(ErrorCode::NotFound, "Tool not found")),
  }
}

fn reject(status: StatusCode, error: ToolError) -> Response {
  (status, Json(envelope::<()>(Err(error)))).into_response()
}
