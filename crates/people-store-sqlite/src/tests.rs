//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use people_core::{
  Person,
  error::UniqueField,
  handlers::{CreatePerson, GetPerson, UpdatePerson},
  store::{PersonRepository, PersonStore, StoreFailure, UnitOfWork},
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn person(email: &str, document: &str) -> Person {
  Person::new(
    "Alice",
    "Liddell",
    email,
    NaiveDate::from_ymd_opt(1990, 5, 15).unwrap(),
    document,
  )
}

async fn insert(s: &SqliteStore, p: &Person) {
  let cancel = CancellationToken::new();
  let uow = s.unit_of_work();
  uow.people().add(p.clone(), &cancel).await.unwrap();
  assert_eq!(uow.save_changes(&cancel).await.unwrap(), 1);
}

// ─── Reads ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_by_id() {
  let s = store().await;
  let p = person("alice@example.com", "111");
  insert(&s, &p).await;

  let uow = s.unit_of_work();
  let fetched = uow
    .people()
    .get_by_id(p.id(), &CancellationToken::new())
    .await
    .unwrap()
    .expect("person should exist");
  assert_eq!(fetched, p);
}

#[tokio::test]
async fn get_missing_returns_none() {
  let s = store().await;
  let uow = s.unit_of_work();
  let result = uow
    .people()
    .get_by_id(Uuid::new_v4(), &CancellationToken::new())
    .await
    .unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn get_by_email_and_document() {
  let s = store().await;
  let cancel = CancellationToken::new();
  let p = person("alice@example.com", "111");
  insert(&s, &p).await;

  let uow = s.unit_of_work();
  let by_email = uow.people().get_by_email("alice@example.com", &cancel).await.unwrap();
  assert_eq!(by_email.map(|p| p.id()), Some(p.id()));

  let by_doc = uow.people().get_by_document("111", &cancel).await.unwrap();
  assert_eq!(by_doc.map(|p| p.id()), Some(p.id()));

  // Email comparison is case-sensitive.
  let upper = uow.people().get_by_email("ALICE@example.com", &cancel).await.unwrap();
  assert!(upper.is_none());
}

#[tokio::test]
async fn staged_changes_are_invisible_until_saved() {
  let s = store().await;
  let cancel = CancellationToken::new();
  let p = person("alice@example.com", "111");

  let uow = s.unit_of_work();
  uow.people().add(p.clone(), &cancel).await.unwrap();
  assert!(!uow.people().exists(p.id(), &cancel).await.unwrap());

  uow.save_changes(&cancel).await.unwrap();
  assert!(uow.people().exists(p.id(), &cancel).await.unwrap());
}

#[tokio::test]
async fn get_active_filters_inactive() {
  let s = store().await;
  let cancel = CancellationToken::new();
  let mut inactive = person("b@example.com", "2");
  inactive.deactivate();
  insert(&s, &person("a@example.com", "1")).await;
  insert(&s, &inactive).await;

  let uow = s.unit_of_work();
  assert_eq!(uow.people().get_all(&cancel).await.unwrap().len(), 2);

  let active = uow.people().get_active(&cancel).await.unwrap();
  assert_eq!(active.len(), 1);
  assert!(active.iter().all(Person::is_active));
}

#[tokio::test]
async fn existence_checks_honour_exclusion() {
  let s = store().await;
  let cancel = CancellationToken::new();
  let p = person("alice@example.com", "111");
  insert(&s, &p).await;

  let uow = s.unit_of_work();
  let repo = uow.people();
  assert!(repo.email_exists("alice@example.com", None, &cancel).await.unwrap());
  assert!(!repo.email_exists("alice@example.com", Some(p.id()), &cancel).await.unwrap());
  assert!(repo.email_exists("alice@example.com", Some(Uuid::new_v4()), &cancel).await.unwrap());
  assert!(!repo.email_exists("nobody@example.com", None, &cancel).await.unwrap());

  assert!(repo.document_exists("111", None, &cancel).await.unwrap());
  assert!(!repo.document_exists("111", Some(p.id()), &cancel).await.unwrap());
  assert!(!repo.document_exists("222", None, &cancel).await.unwrap());
}

// ─── Writes ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_persists_full_row() {
  let s = store().await;
  let cancel = CancellationToken::new();
  let mut p = person("alice@example.com", "111");
  insert(&s, &p).await;

  p.update_personal_info(
    "Alicia",
    "Liddell-Hargreaves",
    "alicia@example.com",
    NaiveDate::from_ymd_opt(1991, 6, 1).unwrap(),
  );
  let uow = s.unit_of_work();
  uow.people().update(p.clone(), &cancel).await.unwrap();
  uow.save_changes(&cancel).await.unwrap();

  let stored = uow.people().get_by_id(p.id(), &cancel).await.unwrap().unwrap();
  assert_eq!(stored, p);
  assert!(stored.updated_at().unwrap() >= stored.created_at());
}

#[tokio::test]
async fn delete_missing_id_is_a_no_op() {
  let s = store().await;
  let cancel = CancellationToken::new();
  insert(&s, &person("a@example.com", "1")).await;

  let uow = s.unit_of_work();
  uow.people().delete(Uuid::new_v4(), &cancel).await.unwrap();
  uow.save_changes(&cancel).await.unwrap();
  assert_eq!(uow.people().get_all(&cancel).await.unwrap().len(), 1);
}

#[tokio::test]
async fn unique_index_rejects_duplicate_email() {
  let s = store().await;
  let cancel = CancellationToken::new();
  insert(&s, &person("alice@example.com", "111")).await;

  let uow = s.unit_of_work();
  uow
    .people()
    .add(person("alice@example.com", "222"), &cancel)
    .await
    .unwrap();
  let err = uow.save_changes(&cancel).await.unwrap_err();
  assert_eq!(err.unique_violation(), Some(UniqueField::Email));
}

#[tokio::test]
async fn unique_index_rejects_duplicate_document() {
  let s = store().await;
  let cancel = CancellationToken::new();
  insert(&s, &person("alice@example.com", "111")).await;

  let uow = s.unit_of_work();
  uow
    .people()
    .add(person("bob@example.com", "111"), &cancel)
    .await
    .unwrap();
  let err = uow.save_changes(&cancel).await.unwrap_err();
  assert_eq!(err.unique_violation(), Some(UniqueField::Document));
}

#[tokio::test]
async fn failed_save_writes_nothing() {
  let s = store().await;
  let cancel = CancellationToken::new();
  insert(&s, &person("alice@example.com", "111")).await;

  let uow = s.unit_of_work();
  uow.people().add(person("new@example.com", "999"), &cancel).await.unwrap();
  uow.people().add(person("alice@example.com", "333"), &cancel).await.unwrap();
  assert!(uow.save_changes(&cancel).await.is_err());

  assert!(!uow.people().email_exists("new@example.com", None, &cancel).await.unwrap());
}

#[tokio::test]
async fn update_after_concurrent_delete_is_rejected() {
  let s = store().await;
  let cancel = CancellationToken::new();
  let p = person("alice@example.com", "111");
  let bystander = person("bob@example.com", "222");
  insert(&s, &p).await;

  let writer = s.unit_of_work();
  let mut loaded = writer.people().get_by_id(p.id(), &cancel).await.unwrap().unwrap();

  let deleter = s.unit_of_work();
  deleter.people().delete(p.id(), &cancel).await.unwrap();
  deleter.save_changes(&cancel).await.unwrap();

  loaded.deactivate();
  writer.people().add(bystander.clone(), &cancel).await.unwrap();
  writer.people().update(loaded, &cancel).await.unwrap();
  let err = writer.save_changes(&cancel).await.unwrap_err();

  assert!(err.is_vanished());
  assert!(matches!(
    err,
    crate::Error::Core(people_core::Error::Vanished(id)) if id == p.id()
  ));
  assert!(writer.people().get_by_id(p.id(), &cancel).await.unwrap().is_none());
  // The insert in the same batch was rolled back with it.
  assert!(!writer.people().exists(bystander.id(), &cancel).await.unwrap());
}

// ─── Transactions ────────────────────────────────────────────────────────────

#[tokio::test]
async fn explicit_transaction_commits_together() {
  let s = store().await;
  let cancel = CancellationToken::new();
  let uow = s.unit_of_work();

  uow.begin_transaction(&cancel).await.unwrap();
  uow.people().add(person("a@example.com", "1"), &cancel).await.unwrap();
  uow.save_changes(&cancel).await.unwrap();
  uow.people().add(person("b@example.com", "2"), &cancel).await.unwrap();
  uow.save_changes(&cancel).await.unwrap();
  assert!(uow.people().get_all(&cancel).await.unwrap().is_empty());

  uow.commit_transaction(&cancel).await.unwrap();
  assert_eq!(uow.people().get_all(&cancel).await.unwrap().len(), 2);
}

#[tokio::test]
async fn rollback_discards_saved_changes() {
  let s = store().await;
  let cancel = CancellationToken::new();
  let uow = s.unit_of_work();

  uow.begin_transaction(&cancel).await.unwrap();
  uow.people().add(person("a@example.com", "1"), &cancel).await.unwrap();
  uow.save_changes(&cancel).await.unwrap();
  uow.rollback_transaction(&cancel).await.unwrap();

  // Commit after rollback has nothing to do.
  uow.commit_transaction(&cancel).await.unwrap();
  assert!(uow.people().get_all(&cancel).await.unwrap().is_empty());
}

#[tokio::test]
async fn nested_begin_is_rejected() {
  let s = store().await;
  let cancel = CancellationToken::new();
  let uow = s.unit_of_work();

  uow.begin_transaction(&cancel).await.unwrap();
  let err = uow.begin_transaction(&cancel).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(people_core::Error::TransactionActive)
  ));
}

// ─── Cancellation ────────────────────────────────────────────────────────────

#[tokio::test]
async fn cancelled_token_fails_reads_and_writes() {
  let s = store().await;
  let cancel = CancellationToken::new();
  cancel.cancel();

  let uow = s.unit_of_work();
  let err = uow.people().get_all(&cancel).await.unwrap_err();
  assert!(err.is_cancelled());

  let err = uow
    .people()
    .add(person("a@example.com", "1"), &cancel)
    .await
    .unwrap_err();
  assert!(err.is_cancelled());

  let err = uow.save_changes(&cancel).await.unwrap_err();
  assert!(err.is_cancelled());
}

// ─── Handlers over SQLite ────────────────────────────────────────────────────

fn create(email: &str, document: &str) -> CreatePerson {
  CreatePerson {
    first_name: "João".into(),
    last_name:  "Silva".into(),
    email:      email.into(),
    birth_date: NaiveDate::from_ymd_opt(1990, 5, 15).unwrap(),
    document:   document.into(),
  }
}

#[tokio::test]
async fn create_handler_round_trips_through_sqlite() {
  let s = store().await;
  let cancel = CancellationToken::new();

  let created = create("joao@x.com", "111")
    .handle(&s.unit_of_work(), &cancel)
    .await
    .unwrap()
    .success()
    .unwrap();

  let fetched = GetPerson { id: created.id }
    .handle(&s.unit_of_work(), &cancel)
    .await
    .unwrap()
    .success()
    .unwrap();
  assert_eq!(fetched, created);

  let dup = create("joao@x.com", "222")
    .handle(&s.unit_of_work(), &cancel)
    .await
    .unwrap()
    .failure()
    .unwrap();
  assert_eq!(dup.errors, ["Email already exists"]);
}

#[tokio::test]
async fn update_handler_allows_own_email() {
  let s = store().await;
  let cancel = CancellationToken::new();
  let p = person("alice@example.com", "111");
  insert(&s, &p).await;

  let view = UpdatePerson {
    id:         p.id(),
    first_name: "Alicia".into(),
    last_name:  "Liddell".into(),
    email:      "alice@example.com".into(),
    birth_date: p.birth_date(),
  }
  .handle(&s.unit_of_work(), &cancel)
  .await
  .unwrap()
  .success()
  .unwrap();

  assert_eq!(view.full_name, "Alicia Liddell");
  assert_eq!(view.document, "111");
}
