//! Debts the user is paying down.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Cents;

/// Fields of a debt as supplied by the user. Upserting the same `name` in the
/// same thread replaces these fields on the existing row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDebt {
  pub name:              String,
  #[serde(rename = "balance_mxn_cents")]
  pub balance:           Option<Cents>,
  #[serde(rename = "minimum_payment_mxn_cents")]
  pub minimum_payment:   Option<Cents>,
  /// Day of month the minimum payment is due (1-31), if known.
  pub due_day_of_month:  Option<u32>,
  /// Free-form ranking label, e.g. `"alta"`.
  pub priority:          String,
  #[serde(default)]
  pub do_not_accelerate: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Debt {
  #[serde(rename = "debt_id")]
  pub id:                String,
  pub created_at:        DateTime<Utc>,
  pub name:              String,
  #[serde(rename = "balance_mxn_cents")]
  pub balance:           Option<Cents>,
  #[serde(rename = "minimum_payment_mxn_cents")]
  pub minimum_payment:   Option<Cents>,
  pub due_day_of_month:  Option<u32>,
  pub priority:          String,
  pub do_not_accelerate: bool,
}

impl Debt {
  /// The minimum payment, when it is positive.
  pub fn payable_minimum(&self) -> Option<Cents> {
    self.minimum_payment.filter(|m| *m > 0)
  }
}

/// Whether `day` is a usable due day.
pub fn valid_due_day(day: u32) -> bool { (1..=31).contains(&day) }
