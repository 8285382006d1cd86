//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are fixed-width RFC 3339 UTC strings so that lexical order is
//! chronological. Dates are `YYYY-MM-DD`; enums use their wire names.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound as _, Utc};
use uuid::Uuid;

use cartera_core::{
  calendar::{YearMonth, parse_date},
  debt::Debt,
  ledger::{BankBalance, Budget, CategoryType, Transaction, TransactionKind},
};

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn new_id() -> String { Uuid::new_v4().hyphenated().to_string() }

/// The current instant at the precision timestamps are stored with.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(column: &'static str, s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|_| decode_error(column, s))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  parse_date(s).map_err(|_| decode_error("date", s))
}

/// `LIKE` pattern matching every date in `month`.
pub fn month_pattern(month: YearMonth) -> String { format!("{month}-%") }

fn decode_enum<T: FromStr>(column: &'static str, s: &str) -> Result<T> {
  s.parse().map_err(|_| decode_error(column, s))
}

fn decode_error(column: &'static str, value: &str) -> Error {
  Error::Decode { column, value: value.to_owned() }
}

fn decode_due_day(day: Option<i64>) -> Result<Option<u32>> {
  day
    .map(|d| u32::try_from(d).map_err(|_| decode_error("due_day", &d.to_string())))
    .transpose()
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub struct RawBalance {
  pub amount_cents: i64,
  pub as_of:        String,
}

impl RawBalance {
  pub fn into_balance(self) -> Result<BankBalance> {
    Ok(BankBalance { amount: self.amount_cents, as_of: decode_dt("as_of", &self.as_of)? })
  }
}

pub struct RawBudget {
  pub effective_month:    String,
  pub variable_cap_cents: i64,
}

impl RawBudget {
  pub fn into_budget(self) -> Result<Budget> {
    let effective_month = self
      .effective_month
      .parse()
      .map_err(|_| decode_error("effective_month", &self.effective_month))?;
    Ok(Budget { effective_month, variable_cap: self.variable_cap_cents })
  }
}

pub const DEBT_COLUMNS: &str = "debt_id, created_at, name, balance_cents, min_payment_cents, \
                                due_day, priority, do_not_accelerate";

pub struct RawDebt {
  pub debt_id:           String,
  pub created_at:        String,
  pub name:              String,
  pub balance_cents:     Option<i64>,
  pub min_payment_cents: Option<i64>,
  pub due_day:           Option<i64>,
  pub priority:          String,
  pub do_not_accelerate: bool,
}

impl RawDebt {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      debt_id:           row.get(0)?,
      created_at:        row.get(1)?,
      name:              row.get(2)?,
      balance_cents:     row.get(3)?,
      min_payment_cents: row.get(4)?,
      due_day:           row.get(5)?,
      priority:          row.get(6)?,
      do_not_accelerate: row.get(7)?,
    })
  }

  pub fn into_debt(self) -> Result<Debt> {
    Ok(Debt {
      id:                self.debt_id,
      created_at:        decode_dt("created_at", &self.created_at)?,
      name:              self.name,
      balance:           self.balance_cents,
      minimum_payment:   self.min_payment_cents,
      due_day_of_month:  decode_due_day(self.due_day)?,
      priority:          self.priority,
      do_not_accelerate: self.do_not_accelerate,
    })
  }
}

pub const TRANSACTION_COLUMNS: &str = "transaction_id, created_at, kind, amount_cents, \
                                       category_type, category, description, date";

pub struct RawTransaction {
  pub transaction_id: String,
  pub created_at:     String,
  pub kind:           String,
  pub amount_cents:   i64,
  pub category_type:  String,
  pub category:       String,
  pub description:    Option<String>,
  pub date:           String,
}

impl RawTransaction {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      transaction_id: row.get(0)?,
      created_at:     row.get(1)?,
      kind:           row.get(2)?,
      amount_cents:   row.get(3)?,
      category_type:  row.get(4)?,
      category:       row.get(5)?,
      description:    row.get(6)?,
      date:           row.get(7)?,
    })
  }

  pub fn into_transaction(self) -> Result<Transaction> {
    Ok(Transaction {
      id:            self.transaction_id,
      created_at:    decode_dt("created_at", &self.created_at)?,
      kind:          decode_enum::<TransactionKind>("kind", &self.kind)?,
      amount:        self.amount_cents,
      category_type: decode_enum::<CategoryType>("category_type", &self.category_type)?,
      category:      self.category,
      description:   self.description,
      date:          decode_date(&self.date)?,
    })
  }
}
