//! [`SqliteStore`]: the SQLite implementation of [`FinanceStore`].

use std::path::Path;

use chrono::{DateTime, SubsecRound as _, Utc};
use rusqlite::OptionalExtension as _;
use tracing::debug;

use cartera_core::{
  calendar::YearMonth,
  debt::{Debt, NewDebt},
  ledger::{BankBalance, Budget, NewTransaction, Transaction},
  money::Cents,
  store::{FinanceStore, Scope},
  text::title_case,
};

use crate::{
  Result,
  encode::{
    DEBT_COLUMNS, RawBalance, RawBudget, RawDebt, RawTransaction, TRANSACTION_COLUMNS,
    encode_date, encode_dt, month_pattern, new_id, now,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A finance store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Category and description as they are written to disk.
fn normalized(entry: NewTransaction) -> NewTransaction {
  NewTransaction {
    category: title_case(&entry.category),
    description: entry
      .description
      .map(|d| d.trim().to_owned())
      .filter(|d| !d.is_empty()),
    ..entry
  }
}

// ─── FinanceStore impl ───────────────────────────────────────────────────────

impl FinanceStore for SqliteStore {
  type Error = crate::Error;

  async fn ping(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Bank balance ──────────────────────────────────────────────────────────

  async fn latest_bank_balance(&self, scope: &Scope) -> Result<Option<BankBalance>> {
    let Scope { user_id, thread_id } = scope.clone();

    let raw: Option<RawBalance> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT amount_cents, as_of FROM bank_balances
             WHERE user_id = ?1 AND thread_id = ?2
             ORDER BY as_of DESC, rowid DESC
             LIMIT 1",
            rusqlite::params![user_id, thread_id],
            |row| Ok(RawBalance { amount_cents: row.get(0)?, as_of: row.get(1)? }),
          )
          .optional()?)
      })
      .await?;

    raw.map(RawBalance::into_balance).transpose()
  }

  async fn append_bank_balance(
    &self,
    scope:  &Scope,
    amount: Cents,
    as_of:  DateTime<Utc>,
  ) -> Result<BankBalance> {
    let Scope { user_id, thread_id } = scope.clone();
    let as_of     = as_of.trunc_subsecs(6);
    let id_str    = new_id();
    let as_of_str = encode_dt(as_of);
    let now_str   = encode_dt(now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO bank_balances (balance_id, user_id, thread_id, amount_cents, as_of, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, user_id, thread_id, amount, as_of_str, now_str],
        )?;
        Ok(())
      })
      .await?;

    debug!(amount, %as_of, "appended bank balance");
    Ok(BankBalance { amount, as_of })
  }

  // ── Budgets ───────────────────────────────────────────────────────────────

  async fn get_budget(&self, scope: &Scope, month: YearMonth) -> Result<Option<Budget>> {
    let Scope { user_id, thread_id } = scope.clone();
    let month_str = month.to_string();

    let raw: Option<RawBudget> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT effective_month, variable_cap_cents FROM budgets
             WHERE user_id = ?1 AND thread_id = ?2 AND effective_month = ?3",
            rusqlite::params![user_id, thread_id, month_str],
            |row| {
              Ok(RawBudget { effective_month: row.get(0)?, variable_cap_cents: row.get(1)? })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawBudget::into_budget).transpose()
  }

  async fn upsert_budget(
    &self,
    scope:        &Scope,
    month:        YearMonth,
    variable_cap: Cents,
  ) -> Result<Budget> {
    let Scope { user_id, thread_id } = scope.clone();
    let id_str    = new_id();
    let month_str = month.to_string();
    let now_str   = encode_dt(now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO budgets (
             budget_id, user_id, thread_id, effective_month, variable_cap_cents,
             created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
           ON CONFLICT (user_id, thread_id, effective_month) DO UPDATE SET
             variable_cap_cents = excluded.variable_cap_cents,
             updated_at         = excluded.updated_at",
          rusqlite::params![id_str, user_id, thread_id, month_str, variable_cap, now_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(Budget { effective_month: month, variable_cap })
  }

  // ── Debts ─────────────────────────────────────────────────────────────────

  async fn list_debts(&self, scope: &Scope) -> Result<Vec<Debt>> {
    let Scope { user_id, thread_id } = scope.clone();

    let raws: Vec<RawDebt> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {DEBT_COLUMNS} FROM debts
           WHERE user_id = ?1 AND thread_id = ?2
           ORDER BY created_at, rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![user_id, thread_id], RawDebt::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDebt::into_debt).collect()
  }

  async fn upsert_debt(&self, scope: &Scope, debt: NewDebt) -> Result<Debt> {
    let Scope { user_id, thread_id } = scope.clone();
    let id_str  = new_id();
    let now_str = encode_dt(now());
    let name    = debt.name.trim().to_owned();
    let due_day = debt.due_day_of_month.map(i64::from);

    let raw: RawDebt = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          &format!(
            "INSERT INTO debts (
               debt_id, user_id, thread_id, name, balance_cents, min_payment_cents,
               due_day, priority, do_not_accelerate, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
             ON CONFLICT (user_id, thread_id, name) DO UPDATE SET
               name              = excluded.name,
               balance_cents     = excluded.balance_cents,
               min_payment_cents = excluded.min_payment_cents,
               due_day           = excluded.due_day,
               priority          = excluded.priority,
               do_not_accelerate = excluded.do_not_accelerate,
               updated_at        = excluded.updated_at
             RETURNING {DEBT_COLUMNS}"
          ),
          rusqlite::params![
            id_str,
            user_id,
            thread_id,
            name,
            debt.balance,
            debt.minimum_payment,
            due_day,
            debt.priority,
            debt.do_not_accelerate,
            now_str,
          ],
          RawDebt::from_row,
        )?)
      })
      .await?;

    raw.into_debt()
  }

  // ── Transactions ──────────────────────────────────────────────────────────

  async fn list_transactions(&self, scope: &Scope, month: YearMonth) -> Result<Vec<Transaction>> {
    let Scope { user_id, thread_id } = scope.clone();
    let pattern = month_pattern(month);

    let raws: Vec<RawTransaction> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {TRANSACTION_COLUMNS} FROM transactions
           WHERE user_id = ?1 AND thread_id = ?2 AND date LIKE ?3
           ORDER BY date, created_at, rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![user_id, thread_id, pattern], RawTransaction::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTransaction::into_transaction).collect()
  }

  async fn insert_transaction(&self, scope: &Scope, entry: NewTransaction) -> Result<Transaction> {
    entry.check_consistency()?;
    let entry = normalized(entry);

    let tx = Transaction {
      id:            new_id(),
      created_at:    now(),
      kind:          entry.kind,
      amount:        entry.amount,
      category_type: entry.category_type,
      category:      entry.category,
      description:   entry.description,
      date:          entry.date,
    };

    let Scope { user_id, thread_id } = scope.clone();
    let id_str       = tx.id.clone();
    let at_str       = encode_dt(tx.created_at);
    let kind_str     = tx.kind.to_string();
    let amount       = tx.amount;
    let cat_type_str = tx.category_type.to_string();
    let category     = tx.category.clone();
    let description  = tx.description.clone();
    let date_str     = encode_date(tx.date);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO transactions (
             transaction_id, user_id, thread_id, kind, amount_cents,
             category_type, category, description, date, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            id_str,
            user_id,
            thread_id,
            kind_str,
            amount,
            cat_type_str,
            category,
            description,
            date_str,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(tx)
  }

  async fn last_transaction(&self, scope: &Scope) -> Result<Option<Transaction>> {
    let Scope { user_id, thread_id } = scope.clone();

    let raw: Option<RawTransaction> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {TRANSACTION_COLUMNS} FROM transactions
               WHERE user_id = ?1 AND thread_id = ?2
               ORDER BY created_at DESC, rowid DESC
               LIMIT 1"
            ),
            rusqlite::params![user_id, thread_id],
            RawTransaction::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawTransaction::into_transaction).transpose()
  }

  async fn update_transaction(
    &self,
    scope: &Scope,
    id:    &str,
    entry: NewTransaction,
  ) -> Result<Option<Transaction>> {
    entry.check_consistency()?;
    let entry = normalized(entry);

    let Scope { user_id, thread_id } = scope.clone();
    let id_str       = id.to_owned();
    let kind_str     = entry.kind.to_string();
    let cat_type_str = entry.category_type.to_string();
    let date_str     = encode_date(entry.date);

    let raw: Option<RawTransaction> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "UPDATE transactions SET
                 kind = ?4, amount_cents = ?5, category_type = ?6,
                 category = ?7, description = ?8, date = ?9
               WHERE transaction_id = ?1 AND user_id = ?2 AND thread_id = ?3
               RETURNING {TRANSACTION_COLUMNS}"
            ),
            rusqlite::params![
              id_str,
              user_id,
              thread_id,
              kind_str,
              entry.amount,
              cat_type_str,
              entry.category,
              entry.description,
              date_str,
            ],
            RawTransaction::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawTransaction::into_transaction).transpose()
  }

  async fn delete_transaction(&self, scope: &Scope, id: &str) -> Result<bool> {
    let Scope { user_id, thread_id } = scope.clone();
    let id_str = id.to_owned();

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM transactions
           WHERE transaction_id = ?1 AND user_id = ?2 AND thread_id = ?3",
          rusqlite::params![id_str, user_id, thread_id],
        )?)
      })
      .await?;

    Ok(removed > 0)
  }
}
