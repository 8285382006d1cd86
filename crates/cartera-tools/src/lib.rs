//! Validated finance operations ("tools") over any
//! [`cartera_core::store::FinanceStore`].
//!
//! Every tool takes a JSON-shaped input, checks it field by field and returns
//! a [`ToolResult`]. The same tools back the chat router and the
//! `POST /tools/{name}` HTTP surface.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/tools", cartera_tools::tools_router(toolbox.clone()))
//! ```

pub mod balance;
pub mod budget;
pub mod debts;
pub mod error;
pub mod http;
pub mod simulate;
pub mod summary;
pub mod transactions;
pub mod validate;

use std::{future::Future, sync::Arc};

use cartera_core::{
  calendar::{CivilClock, localize_iso},
  store::FinanceStore,
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use strum::EnumString;

pub use error::{ErrorCode, ToolError, ToolResult};
pub use http::tools_router;
pub use validate::ScopeInput;

// ─── Toolbox ─────────────────────────────────────────────────────────────────

/// The tools, bound to a store and the civil clock used to interpret
/// `now_iso` references.
pub struct Toolbox<S> {
  store: Arc<S>,
  clock: Arc<dyn CivilClock>,
}

impl<S> Clone for Toolbox<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), clock: Arc::clone(&self.clock) }
  }
}

impl<S: FinanceStore> Toolbox<S> {
  pub fn new(store: Arc<S>, clock: Arc<dyn CivilClock>) -> Self { Self { store, clock } }

  pub fn store(&self) -> &S { &self.store }

  /// `now_iso` rendered as local `YYYY-MM-DDTHH:MM:SS+HH:MM`, or `None` if it
  /// is not a valid instant.
  pub fn local_reference(&self, now_iso: &str) -> Option<String> {
    localize_iso(self.clock.as_ref(), now_iso)
  }

  /// Run the tool called `name` on a JSON body and wrap the outcome in the
  /// response envelope. Returns `None` for an unknown tool.
  pub async fn dispatch(&self, name: &str, body: Value) -> Option<Value> {
    let tool: Tool = name.parse().ok()?;
    tracing::debug!(%tool, "dispatching tool");

    let reply = match tool {
      Tool::GetBankBalance => run(body, |i| self.get_bank_balance(i)).await,
      Tool::SetBankBalance => run(body, |i| self.set_bank_balance(i)).await,
      Tool::SetBudgetCap => run(body, |i| self.set_budget_cap(i)).await,
      Tool::GetDebts => run(body, |i| self.get_debts(i)).await,
      Tool::AddOrUpdateDebt => run(body, |i| self.add_or_update_debt(i)).await,
      Tool::ParseTransactionFromText => run(body, |i| async move {
        self.parse_transaction_from_text(i)
      })
      .await,
      Tool::AddTransaction => run(body, |i| self.add_transaction(i)).await,
      Tool::UpdateLastTransaction => run(body, |i| self.update_last_transaction(i)).await,
      Tool::DeleteLastTransaction => run(body, |i| self.delete_last_transaction(i)).await,
      Tool::GetMonthSummary => run(body, |i| self.get_month_summary(i)).await,
      Tool::GetCategorySummary => run(body, |i| self.get_category_summary(i)).await,
      Tool::SimulatePurchase => run(body, |i| self.simulate_purchase(i)).await,
    };
    Some(reply)
  }
}

/// Tool names as they appear in `POST /tools/{name}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Tool {
  GetBankBalance,
  SetBankBalance,
  SetBudgetCap,
  GetDebts,
  AddOrUpdateDebt,
  ParseTransactionFromText,
  AddTransaction,
  UpdateLastTransaction,
  DeleteLastTransaction,
  GetMonthSummary,
  GetCategorySummary,
  SimulatePurchase,
}

async fn run<I, O, F, Fut>(body: Value, tool: F) -> Value
where
  I: DeserializeOwned,
  O: Serialize,
  F: FnOnce(I) -> Fut,
  Fut: Future<Output = ToolResult<O>>,
{
  let result = match serde_json::from_value::<I>(body) {
    Ok(input) => tool(input).await,
    Err(e) => Err(ToolError::malformed(&e)),
  };
  error::envelope(result)
}

/// `{"stored": ..}` wrapper used by the write tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stored<T> {
  pub stored: T,
}
