//! Error types for `cartera-core`.

use thiserror::Error;

use crate::ledger::{CategoryType, TransactionKind};

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid month (expected YYYY-MM): {0:?}")]
  InvalidMonth(String),

  #[error("invalid date (expected YYYY-MM-DD): {0:?}")]
  InvalidDate(String),

  #[error("invalid timestamp: {0:?}")]
  InvalidTimestamp(String),

  #[error("unknown cash definition: {0:?}")]
  UnknownCashDefinition(String),

  #[error("type {kind} is inconsistent with category type {category_type}")]
  InconsistentCategoryType {
    kind:          TransactionKind,
    category_type: CategoryType,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
