//! `get_bank_balance` and `set_bank_balance`.

use cartera_core::{ledger::BankBalance, money::Cents, store::FinanceStore};
use serde::Deserialize;
use tracing::info;

use crate::{
  Stored, Toolbox,
  error::{ToolError, ToolResult},
  validate::{self, ScopeInput},
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetBankBalanceInput {
  #[serde(flatten)]
  pub scope: ScopeInput,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetBankBalanceInput {
  #[serde(flatten)]
  pub scope:                  ScopeInput,
  pub bank_balance_mxn_cents: Option<Cents>,
  /// Explicit snapshot time. Takes precedence over `now_iso`.
  pub as_of_iso:              Option<String>,
  pub now_iso:                Option<String>,
}

impl<S: FinanceStore> Toolbox<S> {
  /// The most recent snapshot, or `NOT_FOUND`.
  pub async fn get_bank_balance(&self, input: GetBankBalanceInput) -> ToolResult<BankBalance> {
    let scope = input.scope.require()?;
    self
      .store
      .latest_bank_balance(&scope)
      .await
      .map_err(|e| ToolError::store("Failed to fetch bank balance", e))?
      .ok_or_else(|| ToolError::not_found("No bank balance snapshot found"))
  }

  /// Append a snapshot at `as_of_iso`, or at `now_iso` when that is absent.
  pub async fn set_bank_balance(
    &self,
    input: SetBankBalanceInput,
  ) -> ToolResult<Stored<BankBalance>> {
    let scope  = input.scope.require()?;
    let amount = validate::non_negative("bank_balance_mxn_cents", input.bank_balance_mxn_cents)?;

    let as_of_iso = input.as_of_iso.as_deref().filter(|s| !s.trim().is_empty());
    let now_iso   = input.now_iso.as_deref().filter(|s| !s.trim().is_empty());
    let as_of = match (as_of_iso, now_iso) {
      (Some(as_of), _) => validate::instant("as_of_iso", as_of)?,
      (None, Some(now)) => validate::instant("now_iso", now)?,
      (None, None) => {
        return Err(ToolError::validation("as_of_iso", "as_of_iso or now_iso is required"));
      }
    };

    let stored = self
      .store
      .append_bank_balance(&scope, amount, as_of)
      .await
      .map_err(|e| ToolError::store("Failed to set bank balance", e))?;

    info!(thread = %scope.thread_id, amount, "bank balance set");
    Ok(Stored { stored })
  }
}
