use std::sync::Arc;

use axum::{
  body::Body,
  http::{Request, StatusCode},
};
use cartera_core::calendar::DEFAULT_ZONE;
use cartera_store_sqlite::SqliteStore;
use cartera_tools::Toolbox;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use super::*;
use crate::{
  auth::{TOOLS_KEY_HEADER, WEBHOOK_SECRET_HEADER},
  format::HELP,
  router::handle_text,
  telegram::DEFAULT_API_BASE,
};

const NOW: &str = "2026-02-05T16:00:00Z";

async fn toolbox() -> Toolbox<SqliteStore> {
  let store = SqliteStore::open_in_memory().await.unwrap();
  Toolbox::new(Arc::new(store), Arc::new(DEFAULT_ZONE))
}

fn msg(text: &str) -> Incoming {
  Incoming {
    user_id:   "42".into(),
    thread_id: "1001".into(),
    text:      text.into(),
    now_iso:   NOW.into(),
  }
}

async fn say(tools: &Toolbox<SqliteStore>, text: &str) -> String {
  handle_text(tools, &msg(text)).await
}

// ─── Commands ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn start_and_help_match() {
  let tools = toolbox().await;
  assert_eq!(say(&tools, "/start").await, HELP);
  assert_eq!(say(&tools, "help").await, HELP);
  assert_eq!(say(&tools, "  ").await, "Mensaje vacio.");
}

#[tokio::test]
async fn implicit_expense_uses_reference_date() {
  let tools = toolbox().await;
  assert_eq!(
    say(&tools, "gasto 87 openai").await,
    "Registrado: gasto $87.00 MXN en Openai (2026-02-05)."
  );
}

#[tokio::test]
async fn reference_date_is_local() {
  let tools = toolbox().await;
  let mut late = msg("ingreso 15,000 \"nomina\"");
  late.now_iso = "2026-02-05T03:30:00Z".into();
  assert_eq!(
    handle_text(&tools, &late).await,
    "Registrado: ingreso $15000.00 MXN en Nomina (2026-02-04)."
  );
}

#[tokio::test]
async fn missing_amount_is_named() {
  let tools = toolbox().await;
  let reply = say(&tools, "gasto comida").await;
  assert!(reply.starts_with("Necesito mas datos"), "{reply}");
  assert!(reply.contains("Falta: monto."), "{reply}");
}

#[tokio::test]
async fn balance_set_then_shown() {
  let tools = toolbox().await;
  assert_eq!(say(&tools, "saldo").await, "Aun no hay saldo registrado. Usa: saldo 12,500.");
  assert_eq!(say(&tools, "set balance 12,500.5").await, "Saldo actualizado: $12500.50 MXN.");
  assert_eq!(say(&tools, "balance").await, "Saldo actual: $12500.50 MXN (al 2026-02-05).");
  assert_eq!(say(&tools, "saldo mucho").await, "No pude leer el monto de saldo.");
}

#[tokio::test]
async fn budget_month_token_is_not_the_amount() {
  let tools = toolbox().await;
  assert_eq!(
    say(&tools, "presupuesto 2026-03 4,500").await,
    "Presupuesto establecido para 2026-03: $4500.00 MXN."
  );
  assert_eq!(
    say(&tools, "budget 3k").await,
    "Presupuesto establecido para 2026-02: $3000.00 MXN."
  );
}

#[tokio::test]
async fn debt_validation_messages() {
  let tools = toolbox().await;
  assert_eq!(say(&tools, "debt").await, "Falta el nombre de la deuda.");
  assert_eq!(say(&tools, "debt Visa min=500").await, "Falta prioridad (priority=... ).");
  assert_eq!(say(&tools, "debt Visa balance=abc priority=alta").await, "No pude leer balance=.");
  assert_eq!(say(&tools, "debt Visa min=x priority=alta").await, "No pude leer min=.");
  assert_eq!(
    say(&tools, "debt Visa due=32 priority=alta").await,
    "due= debe ser un numero entre 1 y 31."
  );
  assert_eq!(say(&tools, "deudas").await, "No tienes deudas registradas.");
}

#[tokio::test]
async fn debt_saved_and_listed() {
  let tools = toolbox().await;
  assert_eq!(
    say(&tools, "set debt Tarjeta Visa min=500 due=15 priority=alta dna=TRUE").await,
    "Deuda guardada: Tarjeta Visa."
  );
  assert_eq!(
    say(&tools, "deudas").await,
    "Deudas:\n- Tarjeta Visa: saldo sin dato, minimo $500.00 MXN, vence dia 15, prioridad alta (no acelerar)"
  );
}

#[tokio::test]
async fn due_day_accepts_integral_numbers() {
  let tools = toolbox().await;
  assert_eq!(say(&tools, "debt Visa due=15.0 priority=alta").await, "Deuda guardada: Visa.");
  assert_eq!(say(&tools, "debt Amex due=+3 priority=baja").await, "Deuda guardada: Amex.");
  assert_eq!(
    say(&tools, "debt Visa due=15.5 priority=alta").await,
    "due= debe ser un numero entre 1 y 31."
  );
  assert_eq!(say(&tools, "debt Visa due=-1 priority=alta").await, "due= debe ser un numero entre 1 y 31.");
  let listed = say(&tools, "deudas").await;
  assert!(listed.contains("Visa: saldo sin dato, minimo sin dato, vence dia 15"), "{listed}");
  assert!(listed.contains("Amex: saldo sin dato, minimo sin dato, vence dia 3"), "{listed}");
}

#[tokio::test]
async fn simulate_needs_category_and_balance() {
  let tools = toolbox().await;
  assert_eq!(say(&tools, "simulate 100").await, "Falta categoria (usa comillas o cat:).");
  assert_eq!(say(&tools, "simulate \"tacos\"").await, "No pude leer el monto.");
  assert_eq!(say(&tools, "puedo comprar 100 \"tacos\"").await, "Error: Bank balance is not set");
}

#[tokio::test]
async fn simulate_reports_verdict_and_obligations() {
  let tools = toolbox().await;
  say(&tools, "saldo 5000").await;
  say(&tools, "debt Visa min=500 due=15 priority=alta").await;

  assert_eq!(
    say(&tools, "can i buy 100 cat: tacos").await,
    "Asequible: Si. Disponible variable: $5900.00 MXN. Obligaciones: Visa: $500.00 MXN (2026-02-15)"
  );

  let reply = say(&tools, "puedo comprar 7000 \"pantalla\" 2026-02-20").await;
  assert!(reply.starts_with("Asequible: No. Razones: Would exceed"), "{reply}");
  assert!(reply.contains("Visa: $500.00 MXN (2026-03-15)"), "{reply}");
}

#[tokio::test]
async fn summary_lists_categories_by_total() {
  let tools = toolbox().await;
  say(&tools, "gasto 100 tacos").await;
  say(&tools, "gasto 300 super").await;
  say(&tools, "ingreso 1000 nomina").await;

  assert_eq!(
    say(&tools, "resumen").await,
    "Resumen 2026-02: Ingresos $1000.00 MXN, Gastos $400.00 MXN, Variable restante $5600.00 MXN. \
     Categorias: Super (VARIABLE): $300.00 MXN | Tacos (VARIABLE): $100.00 MXN"
  );
  assert_eq!(
    say(&tools, "summary 2026-01").await,
    "Resumen 2026-01: Ingresos $0.00 MXN, Gastos $0.00 MXN, Variable restante $6000.00 MXN."
  );
}

#[tokio::test]
async fn huge_expenses_summarize_without_overflow() {
  let tools = toolbox().await;
  say(&tools, "gasto 90000000000000000 tacos").await;
  say(&tools, "gasto 90000000000000000 tacos").await;

  let reply = say(&tools, "resumen").await;
  assert!(
    reply.starts_with(
      "Resumen 2026-02: Ingresos $0.00 MXN, Gastos $92233720368547758.07 MXN, Variable restante $0.00 MXN."
    ),
    "{reply}"
  );
}

#[tokio::test]
async fn huge_minimums_block_a_small_purchase() {
  let tools = toolbox().await;
  say(&tools, "saldo 100").await;
  say(&tools, "debt A priority=x min=90000000000000000").await;
  say(&tools, "debt B priority=x min=90000000000000000").await;

  let reply = say(&tools, "simulate 1 \"x\"").await;
  assert!(reply.starts_with("Asequible: No. Razones:"), "{reply}");
}

#[tokio::test]
async fn correct_and_undo_last() {
  let tools = toolbox().await;
  assert_eq!(say(&tools, "deshacer").await, "No hay transacciones para deshacer.");
  assert_eq!(say(&tools, "corregir 95").await, "No hay transaccion para corregir.");

  say(&tools, "gasto 87 openai").await;
  assert_eq!(
    say(&tools, "corregir 95 \"cafe\"").await,
    "Corregido: gasto $95.00 MXN en Cafe (2026-02-05)."
  );
  assert!(say(&tools, "fix").await.starts_with("Dime que corregir"));
  assert_eq!(say(&tools, "undo").await, "Eliminado: gasto $95.00 MXN en Cafe (2026-02-05).");
  assert_eq!(say(&tools, "borrar").await, "No hay transacciones para deshacer.");
}

// ─── HTTP ────────────────────────────────────────────────────────────────────

async fn app(auth: AuthConfig) -> Router {
  router(AppState {
    tools:      Arc::new(toolbox().await),
    auth:       Arc::new(auth),
    telegram:   TelegramClient::new(DEFAULT_API_BASE, None).unwrap(),
    production: false,
  })
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
  let resp   = app.oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes  = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  (status, serde_json::from_slice(&bytes).unwrap())
}

fn request(uri: &str, headers: &[(&str, &str)], body: &str) -> Request<Body> {
  let mut req = Request::builder().method("POST").uri(uri);
  for (k, v) in headers {
    req = req.header(*k, *v);
  }
  req.body(Body::from(body.to_string())).unwrap()
}

const HELP_UPDATE: &str = r#"{"update_id":1,"message":{"text":"/start","chat":{"id":1001},"from":{"id":42}}}"#;

#[tokio::test]
async fn webhook_replies_inline_outside_production() {
  let (status, body) =
    send(app(AuthConfig::default()).await, request("/telegram/webhook", &[], HELP_UPDATE)).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "ok": true, "reply": HELP }));
}

#[tokio::test]
async fn webhook_acknowledges_unusable_updates() {
  let app = app(AuthConfig::default()).await;
  for body in ["not json", "{}", r#"{"message":{"text":"hola"}}"#] {
    let (status, reply) = send(app.clone(), request("/telegram/webhook", &[], body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply, json!({ "ok": true }));
  }
}

#[tokio::test]
async fn webhook_rejects_wrong_secret() {
  let auth = AuthConfig::new(Some("s3cret".into()), None, false);
  let (status, body) = send(
    app(auth).await,
    request("/telegram/webhook", &[(WEBHOOK_SECRET_HEADER, "guess")], HELP_UPDATE),
  )
  .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert_eq!(body["error"]["code"], "AUTH_ERROR");
  assert_eq!(body["error"]["message"], "Unauthorized");
}

#[tokio::test]
async fn webhook_in_production_without_secret_is_500() {
  let auth = AuthConfig::new(None, None, true);
  let (status, body) = send(app(auth).await, request("/telegram/webhook", &[], HELP_UPDATE)).await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(body["ok"], false);
}

#[tokio::test]
async fn tools_require_key() {
  let auth = AuthConfig::new(None, Some("k3y".into()), false);
  let app  = app(auth).await;
  let body = r#"{"user_id":"42","thread_id":"1001"}"#;

  let (status, _) = send(app.clone(), request("/tools/get_debts", &[], body)).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  let (status, reply) =
    send(app, request("/tools/get_debts", &[(TOOLS_KEY_HEADER, "k3y")], body)).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(reply, json!({ "ok": true, "data": { "debts": [] } }));
}

#[tokio::test]
async fn health_reads_store() {
  let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
  let (status, body) = send(app(AuthConfig::default()).await, req).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "ok": true }));
}
