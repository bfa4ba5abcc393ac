//! Storage traits: [`PersonRepository`], [`UnitOfWork`] and [`PersonStore`].
//!
//! The traits are implemented by storage backends (e.g.
//! `people-store-sqlite`). Handlers and the HTTP layer depend on this
//! abstraction, not on any concrete backend.
//!
//! Every operation takes a [`CancellationToken`]. A cancelled token makes the
//! operation fail with an error whose [`StoreFailure::is_cancelled`] is true.

use std::future::Future;

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{error::UniqueField, person::Person};

// ─── Error classification ────────────────────────────────────────────────────

/// Implemented by every backend error so handlers can recognise the two
/// conditions they react to without knowing the concrete type.
pub trait StoreFailure: std::error::Error + Send + Sync + 'static {
  /// The field whose unique index rejected a write, if that is what failed.
  fn unique_violation(&self) -> Option<UniqueField>;

  /// Whether the operation was aborted through its cancellation token.
  fn is_cancelled(&self) -> bool;

  /// Whether a staged update found its row already gone at commit time.
  fn is_vanished(&self) -> bool;
}

impl StoreFailure for crate::Error {
  fn unique_violation(&self) -> Option<UniqueField> {
    match self {
      crate::Error::Conflict(field) => Some(*field),
      _ => None,
    }
  }

  fn is_cancelled(&self) -> bool { matches!(self, crate::Error::Cancelled) }

  fn is_vanished(&self) -> bool { matches!(self, crate::Error::Vanished(_)) }
}

// ─── Repository ──────────────────────────────────────────────────────────────

/// CRUD and existence queries over the person table.
///
/// Reads go straight to storage. Writes (`add`, `update`, `delete`) are only
/// staged; they become durable when the owning [`UnitOfWork`] saves. Reads
/// never observe staged changes.
pub trait PersonRepository: Send + Sync {
  type Error: StoreFailure;

  fn get_by_id<'a>(
    &'a self,
    id: Uuid,
    cancel: &'a CancellationToken,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + 'a;

  fn get_by_email<'a>(
    &'a self,
    email: &'a str,
    cancel: &'a CancellationToken,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + 'a;

  fn get_by_document<'a>(
    &'a self,
    document: &'a str,
    cancel: &'a CancellationToken,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + 'a;

  /// Every record, in no particular order.
  fn get_all<'a>(
    &'a self,
    cancel: &'a CancellationToken,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + 'a;

  /// Records whose `active` flag is set.
  fn get_active<'a>(
    &'a self,
    cancel: &'a CancellationToken,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + 'a;

  /// Stage an insert.
  fn add<'a>(
    &'a self,
    person: Person,
    cancel: &'a CancellationToken,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Stage a full-row update.
  fn update<'a>(
    &'a self,
    person: Person,
    cancel: &'a CancellationToken,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Stage a removal. Deleting an id that does not exist is not an error.
  fn delete<'a>(
    &'a self,
    id: Uuid,
    cancel: &'a CancellationToken,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn exists<'a>(
    &'a self,
    id: Uuid,
    cancel: &'a CancellationToken,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// True if any record other than `exclude_id` uses `email`.
  fn email_exists<'a>(
    &'a self,
    email: &'a str,
    exclude_id: Option<Uuid>,
    cancel: &'a CancellationToken,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// True if any record other than `exclude_id` uses `document`.
  fn document_exists<'a>(
    &'a self,
    document: &'a str,
    exclude_id: Option<Uuid>,
    cancel: &'a CancellationToken,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;
}

// ─── Unit of work ────────────────────────────────────────────────────────────

/// Groups the writes staged through [`UnitOfWork::people`] into one atomic
/// commit.
///
/// Without an explicit transaction, [`save_changes`](Self::save_changes)
/// commits immediately. Between [`begin_transaction`](Self::begin_transaction)
/// and [`commit_transaction`](Self::commit_transaction) saved changes are held
/// and committed together; [`rollback_transaction`](Self::rollback_transaction)
/// discards them.
pub trait UnitOfWork: Send + Sync {
  type Error: StoreFailure;
  type Repository: PersonRepository<Error = Self::Error>;

  fn people(&self) -> &Self::Repository;

  /// Persist staged changes and return how many were applied (or, inside a
  /// transaction, how many were queued for commit).
  fn save_changes<'a>(
    &'a self,
    cancel: &'a CancellationToken,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;

  /// Fails if a transaction is already active.
  fn begin_transaction<'a>(
    &'a self,
    cancel: &'a CancellationToken,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// No-op without an active transaction.
  fn commit_transaction<'a>(
    &'a self,
    cancel: &'a CancellationToken,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// No-op without an active transaction.
  fn rollback_transaction<'a>(
    &'a self,
    cancel: &'a CancellationToken,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A backend that hands out one [`UnitOfWork`] per use case.
pub trait PersonStore: Send + Sync {
  type Error: StoreFailure;
  type UnitOfWork: UnitOfWork<Error = Self::Error>;

  fn unit_of_work(&self) -> Self::UnitOfWork;
}
