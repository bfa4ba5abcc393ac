//! Error type for `people-store-sqlite`.

use people_core::{error::UniqueField, store::StoreFailure};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] people_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),
}

impl Error {
  /// Recognise a unique-index rejection from SQLite and name the column.
  pub(crate) fn classify(e: tokio_rusqlite::Error) -> Self {
    if let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(
      ref err,
      Some(ref msg),
    )) = e
      && err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    {
      if msg.contains("people.email") {
        return people_core::Error::Conflict(UniqueField::Email).into();
      }
      if msg.contains("people.document") {
        return people_core::Error::Conflict(UniqueField::Document).into();
      }
    }
    Error::Database(e)
  }
}

impl StoreFailure for Error {
  fn unique_violation(&self) -> Option<UniqueField> {
    match self {
      Error::Core(e) => e.unique_violation(),
      _ => None,
    }
  }

  fn is_cancelled(&self) -> bool {
    matches!(self, Error::Core(people_core::Error::Cancelled))
  }

  fn is_vanished(&self) -> bool {
    matches!(self, Error::Core(people_core::Error::Vanished(_)))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
