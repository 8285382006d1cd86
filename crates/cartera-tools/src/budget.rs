//! `set_budget_cap`.

use cartera_core::{ledger::Budget, money::Cents, store::FinanceStore};
use serde::Deserialize;
use tracing::info;

use crate::{
  Toolbox,
  error::{ToolError, ToolResult},
  validate::{self, ScopeInput},
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetBudgetCapInput {
  #[serde(flatten)]
  pub scope:                  ScopeInput,
  pub variable_cap_mxn_cents: Option<Cents>,
  pub effective_month:        Option<String>,
}

impl<S: FinanceStore> Toolbox<S> {
  /// Insert or replace the variable cap for one month.
  pub async fn set_budget_cap(&self, input: SetBudgetCapInput) -> ToolResult<Budget> {
    let scope = input.scope.require()?;
    let cap   = validate::non_negative("variable_cap_mxn_cents", input.variable_cap_mxn_cents)?;
    let month = validate::month("effective_month", input.effective_month.as_deref())?;

    let budget = self
      .store
      .upsert_budget(&scope, month, cap)
      .await
      .map_err(|e| ToolError::store("Failed to set budget cap", e))?;

    info!(thread = %scope.thread_id, %month, cap, "budget cap set");
    Ok(budget)
  }
}
