//! Person, the single aggregate of the service.
//!
//! Fields are private; every mutation goes through a method that stamps
//! `updated_at`. No validation happens here: input rules are enforced before a
//! use case runs, and uniqueness is the handlers' concern.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person {
  id:         Uuid,
  first_name: String,
  last_name:  String,
  email:      String,
  birth_date: NaiveDate,
  document:   String,
  active:     bool,
  created_at: DateTime<Utc>,
  updated_at: Option<DateTime<Utc>>,
}

impl Person {
  /// Create a new, active person with a fresh id.
  pub fn new(
    first_name: impl Into<String>,
    last_name: impl Into<String>,
    email: impl Into<String>,
    birth_date: NaiveDate,
    document: impl Into<String>,
  ) -> Self {
    Self {
      id: Uuid::new_v4(),
      first_name: first_name.into(),
      last_name: last_name.into(),
      email: email.into(),
      birth_date,
      document: document.into(),
      active: true,
      created_at: Utc::now(),
      updated_at: None,
    }
  }

  /// Rebuild a person from stored columns.
  #[allow(clippy::too_many_arguments)]
  pub fn from_parts(
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    birth_date: NaiveDate,
    document: String,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
  ) -> Self {
    Self {
      id,
      first_name,
      last_name,
      email,
      birth_date,
      document,
      active,
      created_at,
      updated_at,
    }
  }

  pub fn id(&self) -> Uuid { self.id }

  pub fn first_name(&self) -> &str { &self.first_name }

  pub fn last_name(&self) -> &str { &self.last_name }

  pub fn email(&self) -> &str { &self.email }

  pub fn birth_date(&self) -> NaiveDate { self.birth_date }

  pub fn document(&self) -> &str { &self.document }

  pub fn is_active(&self) -> bool { self.active }

  pub fn created_at(&self) -> DateTime<Utc> { self.created_at }

  pub fn updated_at(&self) -> Option<DateTime<Utc>> { self.updated_at }

  // ── Mutations ─────────────────────────────────────────────────────────────

  /// Overwrite the editable fields. The document and the active flag are
  /// left as they are.
  pub fn update_personal_info(
    &mut self,
    first_name: impl Into<String>,
    last_name: impl Into<String>,
    email: impl Into<String>,
    birth_date: NaiveDate,
  ) {
    self.first_name = first_name.into();
    self.last_name = last_name.into();
    self.email = email.into();
    self.birth_date = birth_date;
    self.touch();
  }

  pub fn activate(&mut self) {
    self.active = true;
    self.touch();
  }

  pub fn deactivate(&mut self) {
    self.active = false;
    self.touch();
  }

  // `updated_at` never precedes `created_at`, even across clock skew.
  fn touch(&mut self) { self.updated_at = Some(Utc::now().max(self.created_at)); }

  // ── Derived ───────────────────────────────────────────────────────────────

  pub fn full_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
  }

  /// Age in whole years as of today's UTC date.
  pub fn age(&self) -> i32 { self.age_on(Utc::now().date_naive()) }

  /// Age in whole years on `today`: one less than the year difference until
  /// the birthday has been reached this year.
  pub fn age_on(&self, today: NaiveDate) -> i32 {
    let mut age = today.year() - self.birth_date.year();
    if (today.month(), today.day())
      < (self.birth_date.month(), self.birth_date.day())
    {
      age -= 1;
    }
    age
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
