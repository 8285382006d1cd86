//! Transaction tools: free-text parsing, add, and undo/fix of the last entry.

use cartera_core::{
  calendar::parse_date,
  ledger::{CategoryType, NewTransaction, Transaction, TransactionKind},
  money::{Cents, locate_amount, parse_amount},
  store::FinanceStore,
  text::{
    explicit_date, extract_date, normalize_command, quoted, squash_whitespace,
    strip_date_tokens, title_case,
  },
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
  Stored, Toolbox,
  error::{ToolError, ToolResult},
  validate::{self, ScopeInput},
};

// ─── Free-text parsing ───────────────────────────────────────────────────────

/// A field of a transaction candidate, as reported in `inferred_fields` and
/// `missing_fields`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateField {
  Type,
  Amount,
  CategoryType,
  Category,
  Date,
}

/// Whatever could be read out of a message; `None` where nothing was found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransactionCandidate {
  #[serde(rename = "type")]
  pub kind:             Option<TransactionKind>,
  pub amount_mxn_cents: Option<Cents>,
  pub category_type:    Option<CategoryType>,
  pub category:         Option<String>,
  pub description:      Option<String>,
  pub date_iso:         Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedTransaction {
  pub candidate:       TransactionCandidate,
  pub inferred_fields: Vec<CandidateField>,
  pub missing_fields:  Vec<CandidateField>,
}

impl ParsedTransaction {
  /// The candidate as a storable entry, when nothing is missing.
  pub fn complete(&self) -> Option<NewTransaction> {
    let c = &self.candidate;
    Some(NewTransaction {
      kind:          c.kind?,
      amount:        c.amount_mxn_cents?,
      category_type: c.category_type?,
      category:      c.category.clone()?,
      description:   c.description.clone(),
      date:          c.date_iso?,
    })
  }
}

/// Read a transaction out of a message such as `"gasto 87 openai"`.
///
/// A leading `gasto`/`expense` or `ingreso`/`income` fixes the type; without
/// one the message is an expense. The category is a quoted substring, or
/// whatever text is left once the amount and any date are removed.
/// `reference` is the local ISO timestamp dates fall back to.
pub fn parse_transaction_text(text: &str, reference: Option<&str>) -> ParsedTransaction {
  let mut inferred = Vec::new();
  let mut missing  = Vec::new();

  let (keyword, rest) = normalize_command(text);
  let (kind, body) = match keyword.as_str() {
    "gasto" | "expense" => (TransactionKind::Expense, rest),
    "ingreso" | "income" => (TransactionKind::Income, rest),
    _ => {
      inferred.push(CandidateField::Type);
      (TransactionKind::Expense, text.trim().to_owned())
    }
  };
  inferred.push(CandidateField::CategoryType);

  if explicit_date(&body).is_none() {
    inferred.push(CandidateField::Date);
  }
  let date = extract_date(&body, reference).and_then(|d| parse_date(&d).ok());

  let undated = strip_date_tokens(&body);
  let amount  = parse_amount(&undated);

  let category = match quoted(&body) {
    Some(q) => Some(title_case(q)),
    None => {
      let mut leftover = undated.clone();
      if let Some(span) = locate_amount(&undated) {
        leftover.replace_range(span, " ");
      }
      Some(title_case(&squash_whitespace(&leftover))).filter(|c| !c.is_empty())
    }
  };

  if amount.is_none() {
    missing.push(CandidateField::Amount);
  }
  if category.is_none() {
    missing.push(CandidateField::Category);
  }
  if date.is_none() {
    inferred.retain(|f| *f != CandidateField::Date);
    missing.push(CandidateField::Date);
  }

  ParsedTransaction {
    candidate: TransactionCandidate {
      kind: Some(kind),
      amount_mxn_cents: amount,
      category_type: Some(kind.default_category_type()),
      category,
      description: None,
      date_iso: date,
    },
    inferred_fields: inferred,
    missing_fields: missing,
  }
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParseTransactionInput {
  #[serde(flatten)]
  pub scope:   ScopeInput,
  pub text:    Option<String>,
  pub now_iso: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionInput {
  #[serde(rename = "type")]
  pub kind:             Option<String>,
  pub amount_mxn_cents: Option<Cents>,
  pub category_type:    Option<String>,
  pub category:         Option<String>,
  pub description:      Option<String>,
  pub date_iso:         Option<String>,
}

impl From<NewTransaction> for TransactionInput {
  fn from(entry: NewTransaction) -> Self {
    Self {
      kind:             Some(entry.kind.to_string()),
      amount_mxn_cents: Some(entry.amount),
      category_type:    Some(entry.category_type.to_string()),
      category:         Some(entry.category),
      description:      entry.description,
      date_iso:         Some(entry.date.to_string()),
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddTransactionInput {
  #[serde(flatten)]
  pub scope:       ScopeInput,
  pub transaction: Option<TransactionInput>,
}

/// Fields to overwrite on the last transaction. Absent fields keep their
/// value; `"description": null` clears the description.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionPatch {
  #[serde(rename = "type")]
  pub kind:             Option<String>,
  pub amount_mxn_cents: Option<Cents>,
  pub category_type:    Option<String>,
  pub category:         Option<String>,
  #[serde(default, deserialize_with = "validate::explicit_null")]
  pub description:      Option<Option<String>>,
  pub date_iso:         Option<String>,
}

impl TransactionPatch {
  pub fn is_empty(&self) -> bool {
    self.kind.is_none()
      && self.amount_mxn_cents.is_none()
      && self.category_type.is_none()
      && self.category.is_none()
      && self.description.is_none()
      && self.date_iso.is_none()
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateLastTransactionInput {
  #[serde(flatten)]
  pub scope: ScopeInput,
  pub patch: Option<TransactionPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteLastTransactionInput {
  #[serde(flatten)]
  pub scope: ScopeInput,
}

// ─── Outputs ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdatedTransaction {
  pub transaction_id: String,
  pub previous:       Transaction,
  pub current:        Transaction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletedTransaction {
  pub deleted_transaction_id: String,
  pub deleted:                Transaction,
}

// ─── Tools ───────────────────────────────────────────────────────────────────

impl<S: FinanceStore> Toolbox<S> {
  /// Parse free text into a candidate without storing anything.
  pub fn parse_transaction_from_text(
    &self,
    input: ParseTransactionInput,
  ) -> ToolResult<ParsedTransaction> {
    let text    = validate::non_empty("text", input.text.as_deref())?;
    let now_iso = validate::non_empty("now_iso", input.now_iso.as_deref())?;
    let reference = self.local_reference(now_iso);
    Ok(parse_transaction_text(text, reference.as_deref()))
  }

  pub async fn add_transaction(&self, input: AddTransactionInput) -> ToolResult<Stored<Transaction>> {
    let scope = input.scope.require()?;
    let tx = input
      .transaction
      .ok_or_else(|| ToolError::validation("transaction", "transaction is required"))?;

    let kind = parse_kind("transaction.type", tx.kind.as_deref())?
      .ok_or_else(|| ToolError::validation("transaction.type", "type is required"))?;
    let amount = validate::non_negative("transaction.amount_mxn_cents", tx.amount_mxn_cents)?;
    let category_type = parse_category_type("transaction.category_type", tx.category_type.as_deref())?
      .ok_or_else(|| ToolError::validation("transaction.category_type", "category_type is required"))?;
    let entry = NewTransaction {
      kind,
      amount,
      category_type,
      category: validate::non_empty("transaction.category", tx.category.as_deref())?.to_owned(),
      description: tx.description,
      date: validate::date("transaction.date_iso", tx.date_iso.as_deref())?,
    };
    check_consistency("transaction.category_type", &entry)?;

    let stored = self
      .store
      .insert_transaction(&scope, entry)
      .await
      .map_err(|e| ToolError::store("Failed to add transaction", e))?;

    info!(
      thread = %scope.thread_id,
      kind = %stored.kind,
      amount = stored.amount,
      category = %stored.category,
      "transaction added"
    );
    Ok(Stored { stored })
  }

  /// Merge `patch` over the most recent transaction and store the result.
  pub async fn update_last_transaction(
    &self,
    input: UpdateLastTransactionInput,
  ) -> ToolResult<UpdatedTransaction> {
    let scope = input.scope.require()?;
    let patch = input.patch.ok_or_else(|| ToolError::validation("patch", "patch is required"))?;

    let last = self
      .store
      .last_transaction(&scope)
      .await
      .map_err(|e| ToolError::store("Failed to load last transaction", e))?
      .ok_or_else(|| ToolError::not_found("No last transaction found to update"))?;

    let entry = NewTransaction {
      kind: parse_kind("patch.type", patch.kind.as_deref())?.unwrap_or(last.kind),
      amount: validate::non_negative(
        "patch.amount_mxn_cents",
        Some(patch.amount_mxn_cents.unwrap_or(last.amount)),
      )?,
      category_type: parse_category_type("patch.category_type", patch.category_type.as_deref())?
        .unwrap_or(last.category_type),
      category: validate::non_empty(
        "patch.category",
        Some(patch.category.as_deref().unwrap_or(&last.category)),
      )?
      .to_owned(),
      description: patch.description.unwrap_or_else(|| last.description.clone()),
      date: match patch.date_iso.as_deref() {
        Some(d) => validate::date("patch.date_iso", Some(d))?,
        None => last.date,
      },
    };
    check_consistency("patch.category_type", &entry)?;

    let current = self
      .store
      .update_transaction(&scope, &last.id, entry)
      .await
      .map_err(|e| ToolError::store("Failed to update transaction", e))?
      .ok_or_else(|| ToolError::not_found("No last transaction found to update"))?;

    info!(thread = %scope.thread_id, id = %current.id, "last transaction updated");
    Ok(UpdatedTransaction { transaction_id: current.id.clone(), previous: last, current })
  }

  pub async fn delete_last_transaction(
    &self,
    input: DeleteLastTransactionInput,
  ) -> ToolResult<DeletedTransaction> {
    let scope = input.scope.require()?;

    let last = self
      .store
      .last_transaction(&scope)
      .await
      .map_err(|e| ToolError::store("Failed to load last transaction", e))?
      .ok_or_else(|| ToolError::not_found("No last transaction found to delete"))?;

    let removed = self
      .store
      .delete_transaction(&scope, &last.id)
      .await
      .map_err(|e| ToolError::store("Failed to delete transaction", e))?;
    if !removed {
      return Err(ToolError::not_found("No last transaction found to delete"));
    }

    info!(thread = %scope.thread_id, id = %last.id, "last transaction deleted");
    Ok(DeletedTransaction { deleted_transaction_id: last.id.clone(), deleted: last })
  }
}

fn parse_kind(field: &str, value: Option<&str>) -> ToolResult<Option<TransactionKind>> {
  value
    .map(|v| {
      v.parse()
        .map_err(|_| ToolError::validation(field, "type must be EXPENSE or INCOME"))
    })
    .transpose()
}

fn parse_category_type(field: &str, value: Option<&str>) -> ToolResult<Option<CategoryType>> {
  value
    .map(|v| {
      v.parse().map_err(|_| {
        ToolError::validation(
          field,
          "category_type must be one of INCOME, FIXED, VARIABLE, DEBT, DONATION, SAVINGS",
        )
      })
    })
    .transpose()
}

fn check_consistency(field: &str, entry: &NewTransaction) -> ToolResult<()> {
  entry
    .check_consistency()
    .map_err(|_| ToolError::validation(field, "type and category_type are inconsistent"))
}
