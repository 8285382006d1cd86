//! The affordability decision.
//!
//! [`evaluate`] is a pure function over already-read state: the latest bank
//! balance, the purchase month's summary and the thread's debts. Reading that
//! state is the caller's job.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};

use crate::{
  Error, Result,
  calendar::next_due_date,
  debt::Debt,
  ledger::MonthSummary,
  money::Cents,
};

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Which money counts as available. Only the bank balance is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CashDefinition {
  #[default]
  BankBalanceOnly,
}

impl FromStr for CashDefinition {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "BANK_BALANCE_ONLY" => Ok(Self::BankBalanceOnly),
      other => Err(Error::UnknownCashDefinition(other.to_owned())),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Purchase {
  pub amount:   Cents,
  pub date:     NaiveDate,
  pub category: String,
}

// ─── Outputs ─────────────────────────────────────────────────────────────────

/// An upcoming minimum payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obligation {
  pub name:     String,
  #[serde(rename = "amount_mxn_cents")]
  pub amount:   Cents,
  #[serde(rename = "due_date_iso")]
  pub due_date: Option<NaiveDate>,
}

impl Obligation {
  /// Undated obligations always count; dated ones count from the purchase
  /// date on.
  pub fn counts_against(&self, purchase_date: NaiveDate) -> bool {
    self.due_date.is_none_or(|due| due >= purchase_date)
  }
}

/// Why a purchase is not affordable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
  ExceedsVariableCap,
  BelowObligations,
}

impl Reason {
  pub fn message(self) -> &'static str {
    match self {
      Self::ExceedsVariableCap => "Would exceed variable spending cap for the month",
      Self::BelowObligations => {
        "Would reduce cash available below upcoming mandatory obligations"
      }
    }
  }
}

impl fmt::Display for Reason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.message()) }
}

impl Serialize for Reason {
  fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(self.message())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Affordability {
  pub affordable:         bool,
  pub reasons:            Vec<Reason>,
  #[serde(rename = "variable_cap_mxn_cents")]
  pub variable_cap:       Cents,
  #[serde(rename = "variable_remaining_mxn_cents")]
  pub variable_remaining: Cents,
  pub next_obligations:   Vec<Obligation>,
}

// ─── Decision ────────────────────────────────────────────────────────────────

/// Every debt with a positive minimum payment, with its next due date on or
/// after `from`. Debts without a due day get no date.
pub fn obligations(debts: &[Debt], from: NaiveDate) -> Vec<Obligation> {
  debts
    .iter()
    .filter_map(|debt| {
      let amount = debt.payable_minimum()?;
      Some(Obligation {
        name: debt.name.clone(),
        amount,
        due_date: debt.due_day_of_month.map(|day| next_due_date(from, day)),
      })
    })
    .collect()
}

/// Decide whether `purchase` is affordable.
///
/// `month` must be the summary of the month containing the purchase date.
/// The returned obligation list is unfiltered; only obligations that
/// [count against](Obligation::counts_against) the purchase date enter the
/// cash check.
pub fn evaluate(
  purchase: &Purchase,
  bank_balance: Cents,
  month: &MonthSummary,
  debts: &[Debt],
) -> Affordability {
  let remaining_after = month.variable_remaining.saturating_sub(purchase.amount);

  let next_obligations = obligations(debts, purchase.date);
  let obligations_total: Cents = next_obligations
    .iter()
    .filter(|o| o.counts_against(purchase.date))
    .fold(0, |total: Cents, o| total.saturating_add(o.amount));
  let cash_after = bank_balance.saturating_sub(purchase.amount);

  let mut reasons = Vec::new();
  if remaining_after < 0 {
    reasons.push(Reason::ExceedsVariableCap);
  }
  if cash_after < obligations_total {
    reasons.push(Reason::BelowObligations);
  }

  Affordability {
    affordable: reasons.is_empty(),
    reasons,
    variable_cap: month.variable_cap,
    variable_remaining: remaining_after.max(0),
    next_obligations,
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;
  use crate::{calendar::parse_date, calendar::YearMonth, ledger::DEFAULT_VARIABLE_CAP};

  fn date(s: &str) -> NaiveDate { parse_date(s).unwrap() }

  fn debt(name: &str, minimum: Option<Cents>, due: Option<u32>) -> Debt {
    Debt {
      id: name.into(),
      created_at: Utc::now(),
      name: name.into(),
      balance: Some(1_000_000),
      minimum_payment: minimum,
      due_day_of_month: due,
      priority: "alta".into(),
      do_not_accelerate: false,
    }
  }

  fn empty_february() -> MonthSummary {
    MonthSummary::compute("2026-02".parse::<YearMonth>().unwrap(), None, &[])
  }

  fn purchase(amount: Cents, on: &str) -> Purchase {
    Purchase { amount, date: date(on), category: "Tacos".into() }
  }

  #[test]
  fn small_purchase_is_affordable() {
    let debts = [debt("Visa", Some(50_000), Some(15))];
    let result = evaluate(&purchase(10_000, "2026-02-05"), 500_000, &empty_february(), &debts);

    assert!(result.affordable);
    assert!(result.reasons.is_empty());
    assert_eq!(result.variable_cap, DEFAULT_VARIABLE_CAP);
    assert_eq!(result.variable_remaining, DEFAULT_VARIABLE_CAP - 10_000);
    assert_eq!(result.next_obligations, vec![Obligation {
      name:     "Visa".into(),
      amount:   50_000,
      due_date: Some(date("2026-02-15")),
    }]);
  }

  #[test]
  fn exceeding_the_cap_gives_only_the_cap_reason() {
    let debts = [debt("Visa", Some(50_000), Some(15))];
    let result =
      evaluate(&purchase(600_001, "2026-02-05"), 5_000_000, &empty_february(), &debts);

    assert!(!result.affordable);
    assert_eq!(result.reasons, vec![Reason::ExceedsVariableCap]);
    assert_eq!(result.variable_remaining, 0);
  }

  #[test]
  fn obligations_can_block_a_purchase_within_budget() {
    let debts = [debt("Visa", Some(50_000), Some(15))];
    let result = evaluate(&purchase(460_000, "2026-02-05"), 500_000, &empty_february(), &debts);

    assert_eq!(result.reasons, vec![Reason::BelowObligations]);
  }

  #[test]
  fn both_reasons_are_reported_in_order() {
    let debts = [debt("Visa", Some(50_000), None)];
    let result = evaluate(&purchase(700_000, "2026-02-05"), 100_000, &empty_february(), &debts);

    assert_eq!(result.reasons, vec![Reason::ExceedsVariableCap, Reason::BelowObligations]);
  }

  #[test]
  fn huge_minimums_still_block_the_purchase() {
    let debts = [
      debt("A", Some(9_000_000_000_000_000_000), None),
      debt("B", Some(9_000_000_000_000_000_000), None),
    ];
    let result = evaluate(&purchase(100, "2026-02-05"), 10_000, &empty_february(), &debts);

    assert!(!result.affordable);
    assert_eq!(result.reasons, vec![Reason::BelowObligations]);
  }

  #[test]
  fn debts_without_positive_minimum_are_not_obligations() {
    let debts = [
      debt("Sin minimo", None, Some(10)),
      debt("Cero", Some(0), Some(10)),
      debt("Auto", Some(30_000), None),
    ];
    let list = obligations(&debts, date("2026-02-05"));
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].name, "Auto");
    assert_eq!(list[0].due_date, None);
  }

  #[test]
  fn projected_due_dates_never_precede_the_purchase() {
    let debts = [debt("Visa", Some(1), Some(3))];
    let list = obligations(&debts, date("2026-02-05"));
    assert_eq!(list[0].due_date, Some(date("2026-03-03")));
    assert!(list[0].counts_against(date("2026-02-05")));
  }

  #[test]
  fn cash_definition_accepts_only_bank_balance() {
    assert_eq!("BANK_BALANCE_ONLY".parse::<CashDefinition>().unwrap(), CashDefinition::BankBalanceOnly);
    assert!("CASH_AND_BANK".parse::<CashDefinition>().is_err());
  }

  #[test]
  fn reasons_serialize_as_messages() {
    let json = serde_json::to_string(&Reason::ExceedsVariableCap).unwrap();
    assert_eq!(json, "\"Would exceed variable spending cap for the month\"");
  }
}
