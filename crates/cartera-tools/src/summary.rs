//! `get_month_summary` and `get_category_summary`.

use cartera_core::{
  calendar::YearMonth,
  ledger::{CategoryTotal, MonthSummary, category_totals},
  store::{FinanceStore, Scope},
};
use serde::{Deserialize, Serialize};

use crate::{
  Toolbox,
  error::{ToolError, ToolResult},
  validate::{self, ScopeInput},
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MonthInput {
  #[serde(flatten)]
  pub scope: ScopeInput,
  pub month: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
  pub month:      YearMonth,
  pub categories: Vec<CategoryTotal>,
}

impl<S: FinanceStore> Toolbox<S> {
  pub async fn get_month_summary(&self, input: MonthInput) -> ToolResult<MonthSummary> {
    let scope = input.scope.require()?;
    let month = validate::month("month", input.month.as_deref())?;
    self.month_summary(&scope, month).await
  }

  /// Expense totals per `(category, category_type)`, largest first.
  pub async fn get_category_summary(&self, input: MonthInput) -> ToolResult<CategorySummary> {
    let scope = input.scope.require()?;
    let month = validate::month("month", input.month.as_deref())?;

    let transactions = self
      .store
      .list_transactions(&scope, month)
      .await
      .map_err(|e| ToolError::store("Failed to fetch category summary", e))?;

    Ok(CategorySummary { month, categories: category_totals(&transactions) })
  }

  pub(crate) async fn month_summary(&self, scope: &Scope, month: YearMonth) -> ToolResult<MonthSummary> {
    let transactions = self
      .store
      .list_transactions(scope, month)
      .await
      .map_err(|e| ToolError::store("Failed to fetch transactions", e))?;
    let budget = self
      .store
      .get_budget(scope, month)
      .await
      .map_err(|e| ToolError::store("Failed to fetch budget cap", e))?;

    Ok(MonthSummary::compute(month, budget.map(|b| b.variable_cap), &transactions))
  }
}
