//! `get_debts` and `add_or_update_debt`.

use cartera_core::{
  debt::{Debt, NewDebt, valid_due_day},
  money::Cents,
  store::FinanceStore,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
  Stored, Toolbox,
  error::{ToolError, ToolResult},
  validate::{self, ScopeInput},
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetDebtsInput {
  #[serde(flatten)]
  pub scope: ScopeInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebtList {
  pub debts: Vec<Debt>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DebtInput {
  pub name:                      Option<String>,
  pub balance_mxn_cents:         Option<Cents>,
  pub minimum_payment_mxn_cents: Option<Cents>,
  pub due_day_of_month:          Option<i64>,
  pub priority:                  Option<String>,
  pub do_not_accelerate:         Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddOrUpdateDebtInput {
  #[serde(flatten)]
  pub scope: ScopeInput,
  pub debt:  Option<DebtInput>,
}

impl<S: FinanceStore> Toolbox<S> {
  /// All debts in the order they were first created.
  pub async fn get_debts(&self, input: GetDebtsInput) -> ToolResult<DebtList> {
    let scope = input.scope.require()?;
    let debts = self
      .store
      .list_debts(&scope)
      .await
      .map_err(|e| ToolError::store("Failed to fetch debts", e))?;
    Ok(DebtList { debts })
  }

  /// Upsert a debt by name. Omitted optional fields are stored as unset.
  pub async fn add_or_update_debt(&self, input: AddOrUpdateDebtInput) -> ToolResult<Stored<Debt>> {
    let scope = input.scope.require()?;
    let debt  = input.debt.ok_or_else(|| ToolError::validation("debt", "debt is required"))?;

    let name     = validate::non_empty("debt.name", debt.name.as_deref())?.trim().to_owned();
    let priority = validate::non_empty("debt.priority", debt.priority.as_deref())?.trim().to_owned();
    let balance  = validate::optional_non_negative("debt.balance_mxn_cents", debt.balance_mxn_cents)?;
    let minimum  = validate::optional_non_negative(
      "debt.minimum_payment_mxn_cents",
      debt.minimum_payment_mxn_cents,
    )?;
    let due_day = debt
      .due_day_of_month
      .map(|day| {
        u32::try_from(day).ok().filter(|d| valid_due_day(*d)).ok_or_else(|| {
          ToolError::validation("debt.due_day_of_month", "due_day_of_month must be between 1 and 31")
        })
      })
      .transpose()?;

    let new = NewDebt {
      name,
      balance,
      minimum_payment: minimum,
      due_day_of_month: due_day,
      priority,
      do_not_accelerate: debt.do_not_accelerate.unwrap_or(false),
    };

    let stored = self
      .store
      .upsert_debt(&scope, new)
      .await
      .map_err(|e| ToolError::store("Failed to add or update debt", e))?;

    info!(thread = %scope.thread_id, debt = %stored.name, "debt saved");
    Ok(Stored { stored })
  }
}
