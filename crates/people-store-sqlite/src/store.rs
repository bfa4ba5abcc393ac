//! [`SqliteStore`]: the SQLite implementation of [`PersonStore`].

use std::{
  mem,
  path::Path,
  sync::{Arc, Mutex, PoisonError},
};

use people_core::{
  Person,
  store::{PersonRepository, PersonStore, UnitOfWork},
};
use rusqlite::OptionalExtension as _;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{RawPerson, decode_uuid, encode_uuid},
  schema::{COLUMNS, SCHEMA},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A people store backed by a single SQLite file.
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

  /// Open an in-memory store, mostly for tests.
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

impl PersonStore for SqliteStore {
  type Error = Error;
  type UnitOfWork = SqliteUnitOfWork;

  fn unit_of_work(&self) -> SqliteUnitOfWork {
    let staged = Arc::new(Mutex::new(Vec::new()));
    SqliteUnitOfWork {
      conn:   self.conn.clone(),
      people: SqlitePersonRepository {
        conn:   self.conn.clone(),
        staged: staged.clone(),
      },
      staged,
      held:   Mutex::new(None),
    }
  }
}

// ─── Staged writes ───────────────────────────────────────────────────────────

/// A write waiting for the unit of work to flush it.
#[derive(Debug)]
enum Change {
  Insert(RawPerson),
  Update(RawPerson),
  Delete(String),
}

impl Change {
  fn apply(&self, tx: &rusqlite::Transaction<'_>) -> rusqlite::Result<usize> {
    match self {
      Change::Insert(p) => tx.execute(
        "INSERT INTO people (
           id, first_name, last_name, email, birth_date,
           document, active, created_at, updated_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        rusqlite::params![
          p.id,
          p.first_name,
          p.last_name,
          p.email,
          p.birth_date,
          p.document,
          p.active,
          p.created_at,
          p.updated_at,
        ],
      ),
      Change::Update(p) => tx.execute(
        "UPDATE people SET
           first_name = ?2, last_name = ?3, email = ?4, birth_date = ?5,
           document = ?6, active = ?7, created_at = ?8, updated_at = ?9
         WHERE id = ?1",
        rusqlite::params![
          p.id,
          p.first_name,
          p.last_name,
          p.email,
          p.birth_date,
          p.document,
          p.active,
          p.created_at,
          p.updated_at,
        ],
      ),
      Change::Delete(id) => {
        tx.execute("DELETE FROM people WHERE id = ?1", rusqlite::params![id])
      }
    }
  }
}

type Staged = Arc<Mutex<Vec<Change>>>;

// The lists are only ever pushed to or swapped out whole, so a poisoned lock
// still guards a consistent value.
fn take(staged: &Mutex<Vec<Change>>) -> Vec<Change> {
  mem::take(&mut *staged.lock().unwrap_or_else(PoisonError::into_inner))
}

fn ensure_live(cancel: &CancellationToken) -> Result<()> {
  if cancel.is_cancelled() {
    return Err(people_core::Error::Cancelled.into());
  }
  Ok(())
}

/// Run a read on the connection thread, giving up as soon as `cancel` fires.
async fn read<F, R>(
  conn: &tokio_rusqlite::Connection,
  cancel: &CancellationToken,
  f: F,
) -> Result<R>
where
  F: FnOnce(&mut rusqlite::Connection) -> tokio_rusqlite::Result<R> + Send + 'static,
  R: Send + 'static,
{
  tokio::select! {
    biased;
    () = cancel.cancelled() => Err(people_core::Error::Cancelled.into()),
    res = conn.call(f) => Ok(res?),
  }
}

// ─── Repository ──────────────────────────────────────────────────────────────

/// Reads hit the database directly; writes land in the owning unit of
/// work's staging list.
pub struct SqlitePersonRepository {
  conn:   tokio_rusqlite::Connection,
  staged: Staged,
}

impl SqlitePersonRepository {
  fn stage(&self, change: Change) {
    self
      .staged
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .push(change);
  }

  async fn find_one(
    &self,
    column: &'static str,
    value: String,
    cancel: &CancellationToken,
  ) -> Result<Option<Person>> {
    let raw: Option<RawPerson> = read(&self.conn, cancel, move |conn| {
      Ok(
        conn
          .query_row(
            &format!("SELECT {COLUMNS} FROM people WHERE {column} = ?1"),
            rusqlite::params![value],
            RawPerson::from_row,
          )
          .optional()?,
      )
    })
    .await?;

    raw.map(RawPerson::into_person).transpose()
  }

  async fn find_many(
    &self,
    filter: &'static str,
    cancel: &CancellationToken,
  ) -> Result<Vec<Person>> {
    let raws: Vec<RawPerson> = read(&self.conn, cancel, move |conn| {
      let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM people {filter}"))?;
      let rows = stmt
        .query_map([], RawPerson::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
      Ok(rows)
    })
    .await?;

    raws.into_iter().map(RawPerson::into_person).collect()
  }

  async fn value_taken(
    &self,
    column: &'static str,
    value: String,
    exclude_id: Option<Uuid>,
    cancel: &CancellationToken,
  ) -> Result<bool> {
    let exclude = exclude_id.map(encode_uuid);
    read(&self.conn, cancel, move |conn| {
      Ok(conn.query_row(
        &format!(
          "SELECT EXISTS (
             SELECT 1 FROM people
             WHERE {column} = ?1 AND (?2 IS NULL OR id <> ?2)
           )"
        ),
        rusqlite::params![value, exclude],
        |row| row.get(0),
      )?)
    })
    .await
  }
}

impl PersonRepository for SqlitePersonRepository {
  type Error = Error;

  async fn get_by_id(&self, id: Uuid, cancel: &CancellationToken) -> Result<Option<Person>> {
    self.find_one("id", encode_uuid(id), cancel).await
  }

  async fn get_by_email(
    &self,
    email: &str,
    cancel: &CancellationToken,
  ) -> Result<Option<Person>> {
    self.find_one("email", email.to_owned(), cancel).await
  }

  async fn get_by_document(
    &self,
    document: &str,
    cancel: &CancellationToken,
  ) -> Result<Option<Person>> {
    self.find_one("document", document.to_owned(), cancel).await
  }

  async fn get_all(&self, cancel: &CancellationToken) -> Result<Vec<Person>> {
    self.find_many("", cancel).await
  }

  async fn get_active(&self, cancel: &CancellationToken) -> Result<Vec<Person>> {
    self.find_many("WHERE active = 1", cancel).await
  }

  async fn add(&self, person: Person, cancel: &CancellationToken) -> Result<()> {
    ensure_live(cancel)?;
    self.stage(Change::Insert(RawPerson::from(&person)));
    Ok(())
  }

  async fn update(&self, person: Person, cancel: &CancellationToken) -> Result<()> {
    ensure_live(cancel)?;
    self.stage(Change::Update(RawPerson::from(&person)));
    Ok(())
  }

  async fn delete(&self, id: Uuid, cancel: &CancellationToken) -> Result<()> {
    ensure_live(cancel)?;
    self.stage(Change::Delete(encode_uuid(id)));
    Ok(())
  }

  async fn exists(&self, id: Uuid, cancel: &CancellationToken) -> Result<bool> {
    self.value_taken("id", encode_uuid(id), None, cancel).await
  }

  async fn email_exists(
    &self,
    email: &str,
    exclude_id: Option<Uuid>,
    cancel: &CancellationToken,
  ) -> Result<bool> {
    self
      .value_taken("email", email.to_owned(), exclude_id, cancel)
      .await
  }

  async fn document_exists(
    &self,
    document: &str,
    exclude_id: Option<Uuid>,
    cancel: &CancellationToken,
  ) -> Result<bool> {
    self
      .value_taken("document", document.to_owned(), exclude_id, cancel)
      .await
  }
}

// ─── Unit of work ────────────────────────────────────────────────────────────

/// One use case's worth of writes against a [`SqliteStore`].
///
/// The connection is shared by every request, so an explicit transaction is
/// not held open on it across awaits. Saved changes are queued instead and
/// flushed inside a single SQLite transaction on commit.
pub struct SqliteUnitOfWork {
  conn:   tokio_rusqlite::Connection,
  people: SqlitePersonRepository,
  staged: Staged,
  /// `Some` while an explicit transaction is open.
  held:   Mutex<Option<Vec<Change>>>,
}

impl SqliteUnitOfWork {
  fn held(&self) -> std::sync::MutexGuard<'_, Option<Vec<Change>>> {
    self.held.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Write `changes` atomically. Cancellation is only honoured before the
  /// batch is dispatched; once SQLite has it, the commit runs to completion
  /// so the reported result matches what is durable. An update that matches
  /// no row aborts the batch with [`people_core::Error::Vanished`].
  async fn flush(&self, changes: Vec<Change>, cancel: &CancellationToken) -> Result<usize> {
    ensure_live(cancel)?;
    if changes.is_empty() {
      return Ok(0);
    }

    let count = changes.len();
    let written = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut rows = 0;
        for change in &changes {
          let applied = change.apply(&tx)?;
          // Dropping `tx` unfinished rolls the whole batch back.
          if applied == 0
            && let Change::Update(p) = change
          {
            return Ok(Err(p.id.clone()));
          }
          rows += applied;
        }
        tx.commit()?;
        Ok(Ok(rows))
      })
      .await
      .map_err(Error::classify)?;

    match written {
      Ok(rows) => {
        tracing::debug!(changes = count, rows, "committed people changes");
        Ok(count)
      }
      Err(id) => {
        tracing::debug!(%id, "update matched no row, rolled back");
        Err(people_core::Error::Vanished(decode_uuid(&id)?).into())
      }
    }
  }
}

impl UnitOfWork for SqliteUnitOfWork {
  type Error = Error;
  type Repository = SqlitePersonRepository;

  fn people(&self) -> &SqlitePersonRepository { &self.people }

  async fn save_changes(&self, cancel: &CancellationToken) -> Result<usize> {
    ensure_live(cancel)?;
    let changes = take(&self.staged);
    let count = changes.len();

    {
      let mut held = self.held();
      if let Some(queue) = held.as_mut() {
        queue.extend(changes);
        return Ok(count);
      }
    }

    self.flush(changes, cancel).await
  }

  async fn begin_transaction(&self, cancel: &CancellationToken) -> Result<()> {
    ensure_live(cancel)?;
    let mut held = self.held();
    if held.is_some() {
      return Err(people_core::Error::TransactionActive.into());
    }
    *held = Some(Vec::new());
    Ok(())
  }

  async fn commit_transaction(&self, cancel: &CancellationToken) -> Result<()> {
    let queued = self.held().take();
    if let Some(changes) = queued {
      self.flush(changes, cancel).await?;
    }
    Ok(())
  }

  async fn rollback_transaction(&self, cancel: &CancellationToken) -> Result<()> {
    ensure_live(cancel)?;
    let discarded = self.held().take().map_or(0, |changes| changes.len());
    let discarded = discarded + take(&self.staged).len();
    if discarded > 0 {
      tracing::debug!(changes = discarded, "rolled back people changes");
    }
    Ok(())
  }
}
