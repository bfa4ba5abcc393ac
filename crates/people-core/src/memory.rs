//! In-memory [`PersonStore`] used by the handler tests.
//!
//! Mirrors the SQLite backend's contract: reads ignore staged changes, saves
//! are atomic, and the email and document columns behave like unique
//! indexes at commit time.

use std::{
  collections::HashMap,
  mem,
  sync::{Arc, Mutex, MutexGuard},
};

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
  Error, Result,
  error::UniqueField,
  person::Person,
  store::{PersonRepository, PersonStore, UnitOfWork},
};

#[derive(Default)]
struct Shared {
  rows:         HashMap<Uuid, Person>,
  commits:      usize,
  blind_checks: bool,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
  shared: Arc<Mutex<Shared>>,
}

impl MemoryStore {
  fn lock(&self) -> MutexGuard<'_, Shared> { self.shared.lock().unwrap() }

  /// Seed a row directly, bypassing the unit of work.
  pub fn insert(&self, person: Person) { self.lock().rows.insert(person.id(), person); }

  pub fn get(&self, id: Uuid) -> Option<Person> { self.lock().rows.get(&id).cloned() }

  pub fn len(&self) -> usize { self.lock().rows.len() }

  /// Number of successful saves.
  pub fn commits(&self) -> usize { self.lock().commits }

  /// Make `email_exists` / `document_exists` always answer `false`, so only
  /// the commit-time check can catch a duplicate.
  pub fn blind_uniqueness_checks(&self) { self.lock().blind_checks = true; }

  /// Drop a row directly, as a concurrent request's committed delete would.
  pub fn remove(&self, id: Uuid) { self.lock().rows.remove(&id); }
}

impl PersonStore for MemoryStore {
  type Error = Error;
  type UnitOfWork = MemoryUnitOfWork;

  fn unit_of_work(&self) -> MemoryUnitOfWork {
    MemoryUnitOfWork {
      repo: MemoryRepository {
        shared: self.shared.clone(),
        staged: Mutex::default(),
      },
      held: Mutex::default(),
    }
  }
}

enum Change {
  Add(Person),
  Update(Person),
  Delete(Uuid),
}

fn check(cancel: &CancellationToken) -> Result<()> {
  if cancel.is_cancelled() { Err(Error::Cancelled) } else { Ok(()) }
}

fn collides(rows: &HashMap<Uuid, Person>, p: &Person) -> Option<UniqueField> {
  let others = || rows.values().filter(|o| o.id() != p.id());
  if others().any(|o| o.email() == p.email()) {
    return Some(UniqueField::Email);
  }
  if others().any(|o| o.document() == p.document()) {
    return Some(UniqueField::Document);
  }
  None
}

// ─── Repository ──────────────────────────────────────────────────────────────

pub struct MemoryRepository {
  shared: Arc<Mutex<Shared>>,
  staged: Mutex<Vec<Change>>,
}

impl MemoryRepository {
  fn rows(&self) -> MutexGuard<'_, Shared> { self.shared.lock().unwrap() }

  fn find(&self, pred: impl Fn(&Person) -> bool) -> Option<Person> {
    self.rows().rows.values().find(|p| pred(p)).cloned()
  }

  fn stage(&self, change: Change) { self.staged.lock().unwrap().push(change); }

  fn any_other(
    &self,
    exclude_id: Option<Uuid>,
    pred: impl Fn(&Person) -> bool,
  ) -> bool {
    let shared = self.rows();
    if shared.blind_checks {
      return false;
    }
    shared
      .rows
      .values()
      .any(|p| Some(p.id()) != exclude_id && pred(p))
  }
}

impl PersonRepository for MemoryRepository {
  type Error = Error;

  async fn get_by_id(&self, id: Uuid, cancel: &CancellationToken) -> Result<Option<Person>> {
    check(cancel)?;
    Ok(self.find(|p| p.id() == id))
  }

  async fn get_by_email(&self, email: &str, cancel: &CancellationToken) -> Result<Option<Person>> {
    check(cancel)?;
    Ok(self.find(|p| p.email() == email))
  }

  async fn get_by_document(
    &self,
    document: &str,
    cancel: &CancellationToken,
  ) -> Result<Option<Person>> {
    check(cancel)?;
    Ok(self.find(|p| p.document() == document))
  }

  async fn get_all(&self, cancel: &CancellationToken) -> Result<Vec<Person>> {
    check(cancel)?;
    Ok(self.rows().rows.values().cloned().collect())
  }

  async fn get_active(&self, cancel: &CancellationToken) -> Result<Vec<Person>> {
    check(cancel)?;
    Ok(self.rows().rows.values().filter(|p| p.is_active()).cloned().collect())
  }

  async fn add(&self, person: Person, cancel: &CancellationToken) -> Result<()> {
    check(cancel)?;
    self.stage(Change::Add(person));
    Ok(())
  }

  async fn update(&self, person: Person, cancel: &CancellationToken) -> Result<()> {
    check(cancel)?;
    self.stage(Change::Update(person));
    Ok(())
  }

  async fn delete(&self, id: Uuid, cancel: &CancellationToken) -> Result<()> {
    check(cancel)?;
    self.stage(Change::Delete(id));
    Ok(())
  }

  async fn exists(&self, id: Uuid, cancel: &CancellationToken) -> Result<bool> {
    check(cancel)?;
    Ok(self.rows().rows.contains_key(&id))
  }

  async fn email_exists(
    &self,
    email: &str,
    exclude_id: Option<Uuid>,
    cancel: &CancellationToken,
  ) -> Result<bool> {
    check(cancel)?;
    Ok(self.any_other(exclude_id, |p| p.email() == email))
  }

  async fn document_exists(
    &self,
    document: &str,
    exclude_id: Option<Uuid>,
    cancel: &CancellationToken,
  ) -> Result<bool> {
    check(cancel)?;
    Ok(self.any_other(exclude_id, |p| p.document() == document))
  }
}

// ─── Unit of work ────────────────────────────────────────────────────────────

pub struct MemoryUnitOfWork {
  repo: MemoryRepository,
  /// `Some` while an explicit transaction is open.
  held: Mutex<Option<Vec<Change>>>,
}

impl MemoryUnitOfWork {
  fn flush(&self, changes: Vec<Change>) -> Result<()> {
    let mut shared = self.repo.rows();
    let mut rows = shared.rows.clone();
    for change in changes {
      match change {
        Change::Add(p) => {
          if let Some(field) = collides(&rows, &p) {
            return Err(Error::Conflict(field));
          }
          rows.insert(p.id(), p);
        }
        Change::Update(p) => {
          if !rows.contains_key(&p.id()) {
            return Err(Error::Vanished(p.id()));
          }
          if let Some(field) = collides(&rows, &p) {
            return Err(Error::Conflict(field));
          }
          rows.insert(p.id(), p);
        }
        Change::Delete(id) => {
          rows.remove(&id);
        }
      }
    }
    shared.rows = rows;
    shared.commits += 1;
    Ok(())
  }
}

impl UnitOfWork for MemoryUnitOfWork {
  type Error = Error;
  type Repository = MemoryRepository;

  fn people(&self) -> &MemoryRepository { &self.repo }

  async fn save_changes(&self, cancel: &CancellationToken) -> Result<usize> {
    check(cancel)?;
    let staged = mem::take(&mut *self.repo.staged.lock().unwrap());
    let count = staged.len();
    if let Some(queue) = self.held.lock().unwrap().as_mut() {
      queue.extend(staged);
      return Ok(count);
    }
    self.flush(staged)?;
    Ok(count)
  }

  async fn begin_transaction(&self, cancel: &CancellationToken) -> Result<()> {
    check(cancel)?;
    let mut held = self.held.lock().unwrap();
    if held.is_some() {
      return Err(Error::TransactionActive);
    }
    *held = Some(Vec::new());
    Ok(())
  }

  async fn commit_transaction(&self, cancel: &CancellationToken) -> Result<()> {
    check(cancel)?;
    let queued = self.held.lock().unwrap().take();
    match queued {
      Some(changes) => self.flush(changes),
      None => Ok(()),
    }
  }

  async fn rollback_transaction(&self, cancel: &CancellationToken) -> Result<()> {
    check(cancel)?;
    self.held.lock().unwrap().take();
    self.repo.staged.lock().unwrap().clear();
    Ok(())
  }
}
