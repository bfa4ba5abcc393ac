//! Error types for `people-core`.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A column guarded by a unique index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UniqueField {
  Email,
  Document,
}

impl UniqueField {
  /// The business-rule message reported when this field collides.
  pub fn violation_message(self) -> &'static str {
    match self {
      UniqueField::Email => "Email already exists",
      UniqueField::Document => "Document already exists",
    }
  }
}

impl fmt::Display for UniqueField {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      UniqueField::Email => f.write_str("email"),
      UniqueField::Document => f.write_str("document"),
    }
  }
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("operation was cancelled")]
  Cancelled,

  #[error("unique constraint violated on {0}")]
  Conflict(UniqueField),

  #[error("a transaction is already active")]
  TransactionActive,

  /// A staged update matched no row: the record was deleted after it was
  /// loaded.
  #[error("person {0} no longer exists")]
  Vanished(uuid::Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
