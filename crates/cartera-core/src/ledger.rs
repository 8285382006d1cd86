//! Balances, budgets and transactions, plus the derived monthly summaries.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{Error, Result, calendar::YearMonth, money::Cents};

/// Variable-spending cap applied to a month with no budget row.
pub const DEFAULT_VARIABLE_CAP: Cents = 600_000;

// ─── Classification ──────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
  Expense,
  Income,
}

impl TransactionKind {
  /// The bucket a transaction of this kind lands in when the user does not
  /// name one.
  pub fn default_category_type(self) -> CategoryType {
    match self {
      Self::Expense => CategoryType::Variable,
      Self::Income => CategoryType::Income,
    }
  }
}

/// The closed set of budget buckets.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CategoryType {
  Income,
  Fixed,
  Variable,
  Debt,
  Donation,
  Savings,
}

impl CategoryType {
  /// `INCOME` pairs only with income; every other bucket pairs only with
  /// expenses.
  pub fn is_consistent_with(self, kind: TransactionKind) -> bool {
    match kind {
      TransactionKind::Income => self == Self::Income,
      TransactionKind::Expense => self != Self::Income,
    }
  }
}

// ─── Bank balance ────────────────────────────────────────────────────────────

/// One snapshot in a thread's append-only balance history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankBalance {
  #[serde(rename = "bank_balance_mxn_cents")]
  pub amount: Cents,
  #[serde(rename = "as_of_iso")]
  pub as_of:  DateTime<Utc>,
}

// ─── Budget ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
  pub effective_month: YearMonth,
  #[serde(rename = "variable_cap_mxn_cents")]
  pub variable_cap:    Cents,
}

// ─── Transactions ────────────────────────────────────────────────────────────

/// Input to [`crate::store::FinanceStore::insert_transaction`] and
/// [`crate::store::FinanceStore::update_transaction`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTransaction {
  #[serde(rename = "type")]
  pub kind:          TransactionKind,
  #[serde(rename = "amount_mxn_cents")]
  pub amount:        Cents,
  pub category_type: CategoryType,
  pub category:      String,
  pub description:   Option<String>,
  #[serde(rename = "date_iso")]
  pub date:          NaiveDate,
}

impl NewTransaction {
  /// Check the kind/bucket pairing.
  pub fn check_consistency(&self) -> Result<()> {
    if self.category_type.is_consistent_with(self.kind) {
      Ok(())
    } else {
      Err(Error::InconsistentCategoryType {
        kind:          self.kind,
        category_type: self.category_type,
      })
    }
  }
}

/// A stored transaction. `id` is opaque; `created_at` orders "last".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
  #[serde(rename = "transaction_id")]
  pub id:            String,
  pub created_at:    DateTime<Utc>,
  #[serde(rename = "type")]
  pub kind:          TransactionKind,
  #[serde(rename = "amount_mxn_cents")]
  pub amount:        Cents,
  pub category_type: CategoryType,
  pub category:      String,
  pub description:   Option<String>,
  #[serde(rename = "date_iso")]
  pub date:          NaiveDate,
}

impl Transaction {
  /// The editable part of the row.
  pub fn entry(&self) -> NewTransaction {
    NewTransaction {
      kind:          self.kind,
      amount:        self.amount,
      category_type: self.category_type,
      category:      self.category.clone(),
      description:   self.description.clone(),
      date:          self.date,
    }
  }
}

// ─── Summaries ───────────────────────────────────────────────────────────────

/// Derived totals for one month; never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthSummary {
  pub month:              YearMonth,
  #[serde(rename = "income_total_mxn_cents")]
  pub income_total:       Cents,
  #[serde(rename = "expense_total_mxn_cents")]
  pub expense_total:      Cents,
  #[serde(rename = "variable_cap_mxn_cents")]
  pub variable_cap:       Cents,
  #[serde(rename = "variable_spend_mxn_cents")]
  pub variable_spend:     Cents,
  #[serde(rename = "variable_remaining_mxn_cents")]
  pub variable_remaining: Cents,
}

impl MonthSummary {
  /// Fold a month's transactions against its cap (or the default cap).
  /// Totals saturate at `Cents::MAX`.
  pub fn compute(month: YearMonth, cap: Option<Cents>, transactions: &[Transaction]) -> Self {
    let mut income_total:   Cents = 0;
    let mut expense_total:  Cents = 0;
    let mut variable_spend: Cents = 0;

    for tx in transactions {
      match tx.kind {
        TransactionKind::Income => income_total = income_total.saturating_add(tx.amount),
        TransactionKind::Expense => {
          expense_total = expense_total.saturating_add(tx.amount);
          if tx.category_type == CategoryType::Variable {
            variable_spend = variable_spend.saturating_add(tx.amount);
          }
        }
      }
    }

    let variable_cap = cap.unwrap_or(DEFAULT_VARIABLE_CAP);
    Self {
      month,
      income_total,
      expense_total,
      variable_cap,
      variable_spend,
      variable_remaining: variable_cap.saturating_sub(variable_spend).max(0),
    }
  }
}

/// Expense total for one `(category, category_type)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
  pub category:      String,
  pub category_type: CategoryType,
  #[serde(rename = "expense_total_mxn_cents")]
  pub expense_total: Cents,
}

/// Per-category expense totals, largest first. Ties keep the order in which
/// the categories first appear.
pub fn category_totals(transactions: &[Transaction]) -> Vec<CategoryTotal> {
  let mut totals: Vec<CategoryTotal> = Vec::new();
  for tx in transactions.iter().filter(|t| t.kind == TransactionKind::Expense) {
    match totals
      .iter_mut()
      .find(|c| c.category == tx.category && c.category_type == tx.category_type)
    {
      Some(existing) => {
        existing.expense_total = existing.expense_total.saturating_add(tx.amount);
      }
      None => totals.push(CategoryTotal {
        category:      tx.category.clone(),
        category_type: tx.category_type,
        expense_total: tx.amount,
      }),
    }
  }
  totals.sort_by(|a, b| b.expense_total.cmp(&a.expense_total));
  totals
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::calendar::parse_date;

  fn tx(kind: TransactionKind, category_type: CategoryType, category: &str, amount: Cents) -> Transaction {
    Transaction {
      id: format!("{category}-{amount}"),
      created_at: Utc::now(),
      kind,
      amount,
      category_type,
      category: category.into(),
      description: None,
      date: parse_date("2026-02-10").unwrap(),
    }
  }

  fn feb() -> YearMonth { "2026-02".parse().unwrap() }

  #[test]
  fn consistency_rules() {
    assert!(CategoryType::Income.is_consistent_with(TransactionKind::Income));
    assert!(!CategoryType::Savings.is_consistent_with(TransactionKind::Income));
    assert!(CategoryType::Debt.is_consistent_with(TransactionKind::Expense));
    assert!(!CategoryType::Income.is_consistent_with(TransactionKind::Expense));
  }

  #[test]
  fn enums_use_screaming_wire_names() {
    assert_eq!(CategoryType::Donation.to_string(), "DONATION");
    assert_eq!("VARIABLE".parse::<CategoryType>().unwrap(), CategoryType::Variable);
    assert_eq!(serde_json::to_string(&TransactionKind::Expense).unwrap(), "\"EXPENSE\"");
  }

  #[test]
  fn summary_without_budget_uses_default_cap() {
    let txs = [
      tx(TransactionKind::Expense, CategoryType::Variable, "Tacos", 10_000),
      tx(TransactionKind::Expense, CategoryType::Fixed, "Renta", 500_000),
      tx(TransactionKind::Income, CategoryType::Income, "Sueldo", 2_000_000),
    ];
    let s = MonthSummary::compute(feb(), None, &txs);
    assert_eq!(s.income_total, 2_000_000);
    assert_eq!(s.expense_total, 510_000);
    assert_eq!(s.variable_cap, DEFAULT_VARIABLE_CAP);
    assert_eq!(s.variable_spend, 10_000);
    assert_eq!(s.variable_remaining, 590_000);
  }

  #[test]
  fn remaining_never_goes_negative() {
    let txs = [tx(TransactionKind::Expense, CategoryType::Variable, "Ropa", 9_000)];
    let s = MonthSummary::compute(feb(), Some(5_000), &txs);
    assert_eq!(s.variable_remaining, 0);
  }

  #[test]
  fn category_totals_sorted_descending() {
    let txs = [
      tx(TransactionKind::Expense, CategoryType::Variable, "Tacos", 1_000),
      tx(TransactionKind::Expense, CategoryType::Fixed, "Renta", 50_000),
      tx(TransactionKind::Expense, CategoryType::Variable, "Tacos", 2_500),
      tx(TransactionKind::Income, CategoryType::Income, "Sueldo", 99_000),
    ];
    let totals = category_totals(&txs);
    assert_eq!(totals.len(), 2);
    assert_eq!(totals[0].category, "Renta");
    assert_eq!(totals[1].category, "Tacos");
    assert_eq!(totals[1].expense_total, 3_500);
  }

  #[test]
  fn huge_totals_saturate() {
    let huge = 9_000_000_000_000_000_000;
    let txs = [
      tx(TransactionKind::Expense, CategoryType::Variable, "Tacos", huge),
      tx(TransactionKind::Expense, CategoryType::Variable, "Tacos", huge),
      tx(TransactionKind::Income, CategoryType::Income, "Sueldo", huge),
      tx(TransactionKind::Income, CategoryType::Income, "Sueldo", huge),
    ];
    let s = MonthSummary::compute(feb(), Some(5_000), &txs);
    assert_eq!(s.income_total, Cents::MAX);
    assert_eq!(s.expense_total, Cents::MAX);
    assert_eq!(s.variable_spend, Cents::MAX);
    assert_eq!(s.variable_remaining, 0);

    let totals = category_totals(&txs);
    assert_eq!(totals.len(), 1);
    assert_eq!(totals[0].expense_total, Cents::MAX);
  }
}
