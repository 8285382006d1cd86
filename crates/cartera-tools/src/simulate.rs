//! `simulate_purchase`: reads the state the affordability decision needs and
//! hands it to [`cartera_core::simulate::evaluate`].

use cartera_core::{
  calendar::YearMonth,
  money::Cents,
  simulate::{Affordability, CashDefinition, Purchase, evaluate},
  store::FinanceStore,
  text::title_case,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::{
  Toolbox,
  error::{ToolError, ToolResult},
  validate::{self, ScopeInput},
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PurchaseInput {
  pub amount_mxn_cents: Option<Cents>,
  pub date_iso:         Option<String>,
  pub category:         Option<String>,
  pub description:      Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Assumptions {
  pub cash_available_definition: Option<String>,
  pub include_cash:              Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SimulatePurchaseInput {
  #[serde(flatten)]
  pub scope:       ScopeInput,
  pub purchase:    Option<PurchaseInput>,
  pub assumptions: Option<Assumptions>,
}

impl<S: FinanceStore> Toolbox<S> {
  /// Decide whether a hypothetical purchase is affordable. Never writes.
  pub async fn simulate_purchase(&self, input: SimulatePurchaseInput) -> ToolResult<Affordability> {
    let scope    = input.scope.require()?;
    let purchase = input
      .purchase
      .ok_or_else(|| ToolError::validation("purchase", "purchase is required"))?;

    let assumptions = input.assumptions.unwrap_or_default();
    if let Some(definition) = assumptions.cash_available_definition.as_deref() {
      definition.parse::<CashDefinition>().map_err(|_| {
        ToolError::validation(
          "assumptions.cash_available_definition",
          "cash_available_definition must be BANK_BALANCE_ONLY",
        )
      })?;
    }
    if assumptions.include_cash == Some(true) {
      return Err(ToolError::validation("assumptions.include_cash", "include_cash must be false"));
    }

    let amount   = validate::non_negative("purchase.amount_mxn_cents", purchase.amount_mxn_cents)?;
    let date     = validate::date("purchase.date_iso", purchase.date_iso.as_deref())?;
    let category = title_case(validate::non_empty("purchase.category", purchase.category.as_deref())?);

    let balance = self
      .store
      .latest_bank_balance(&scope)
      .await
      .map_err(|e| ToolError::store("Failed to read bank balance", e))?
      .ok_or_else(|| {
        ToolError::not_found("Bank balance is not set")
          .with_details(json!({ "missing": ["bank_balance_mxn_cents"] }))
      })?;

    let month   = self.month_summary(&scope, YearMonth::of(date)).await?;
    let debts   = self
      .store
      .list_debts(&scope)
      .await
      .map_err(|e| ToolError::store("Failed to fetch debts", e))?;

    let purchase = Purchase { amount, date, category };
    let result   = evaluate(&purchase, balance.amount, &month, &debts);

    info!(
      thread = %scope.thread_id,
      amount,
      category = %purchase.category,
      affordable = result.affordable,
      "purchase simulated"
    );
    Ok(result)
  }
}
