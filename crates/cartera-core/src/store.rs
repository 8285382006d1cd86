//! The `FinanceStore` trait.
//!
//! Backends (e.g. `cartera-store-sqlite`) implement it; the tool layer and
//! the bot depend only on this abstraction.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{
  calendar::YearMonth,
  debt::{Debt, NewDebt},
  ledger::{BankBalance, Budget, NewTransaction, Transaction},
  money::Cents,
};

// ─── Scope ───────────────────────────────────────────────────────────────────

/// The `(user, thread)` pair that partitions all persistent state. Nothing
/// written under one scope is visible from another.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Scope {
  pub user_id:   String,
  pub thread_id: String,
}

impl Scope {
  pub fn new(user_id: impl Into<String>, thread_id: impl Into<String>) -> Self {
    Self { user_id: user_id.into(), thread_id: thread_id.into() }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Persistence for balances, budgets, debts and transactions.
///
/// Balance history is append-only. Budgets are unique per month and debts per
/// case-insensitive name; both are upserted. Transactions are the only rows
/// that are edited or deleted, and only by id.
pub trait FinanceStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Cheap read used by health checks.
  fn ping(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Bank balance ──────────────────────────────────────────────────────

  /// The snapshot with the greatest `as_of`; ties go to the later insert.
  fn latest_bank_balance<'a>(
    &'a self,
    scope: &'a Scope,
  ) -> impl Future<Output = Result<Option<BankBalance>, Self::Error>> + Send + 'a;

  fn append_bank_balance<'a>(
    &'a self,
    scope: &'a Scope,
    amount: Cents,
    as_of: DateTime<Utc>,
  ) -> impl Future<Output = Result<BankBalance, Self::Error>> + Send + 'a;

  // ── Budgets ───────────────────────────────────────────────────────────

  fn get_budget<'a>(
    &'a self,
    scope: &'a Scope,
    month: YearMonth,
  ) -> impl Future<Output = Result<Option<Budget>, Self::Error>> + Send + 'a;

  /// Insert or replace the cap for `month`.
  fn upsert_budget<'a>(
    &'a self,
    scope: &'a Scope,
    month: YearMonth,
    variable_cap: Cents,
  ) -> impl Future<Output = Result<Budget, Self::Error>> + Send + 'a;

  // ── Debts ─────────────────────────────────────────────────────────────

  /// All debts in creation order.
  fn list_debts<'a>(
    &'a self,
    scope: &'a Scope,
  ) -> impl Future<Output = Result<Vec<Debt>, Self::Error>> + Send + 'a;

  /// Insert a debt, or overwrite the one whose name matches ignoring case.
  /// The existing row keeps its id and creation time.
  fn upsert_debt<'a>(
    &'a self,
    scope: &'a Scope,
    debt: NewDebt,
  ) -> impl Future<Output = Result<Debt, Self::Error>> + Send + 'a;

  // ── Transactions ──────────────────────────────────────────────────────

  /// Transactions whose date falls in `month`, oldest first.
  fn list_transactions<'a>(
    &'a self,
    scope: &'a Scope,
    month: YearMonth,
  ) -> impl Future<Output = Result<Vec<Transaction>, Self::Error>> + Send + 'a;

  fn insert_transaction<'a>(
    &'a self,
    scope: &'a Scope,
    entry: NewTransaction,
  ) -> impl Future<Output = Result<Transaction, Self::Error>> + Send + 'a;

  /// The most recently created transaction, regardless of its date.
  fn last_transaction<'a>(
    &'a self,
    scope: &'a Scope,
  ) -> impl Future<Output = Result<Option<Transaction>, Self::Error>> + Send + 'a;

  /// Replace the editable fields of transaction `id` within `scope`.
  /// Returns `None` when no such row exists.
  fn update_transaction<'a>(
    &'a self,
    scope: &'a Scope,
    id: &'a str,
    entry: NewTransaction,
  ) -> impl Future<Output = Result<Option<Transaction>, Self::Error>> + Send + 'a;

  /// Returns whether a row was removed.
  fn delete_transaction<'a>(
    &'a self,
    scope: &'a Scope,
    id: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;
}
