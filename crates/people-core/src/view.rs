//! [`PersonView`], the projection returned to callers.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::person::Person;

/// Every stored field of a [`Person`] plus the computed `full_name` and
/// `age`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonView {
  pub id:         Uuid,
  pub first_name: String,
  pub last_name:  String,
  pub email:      String,
  pub birth_date: NaiveDate,
  pub document:   String,
  pub active:     bool,
  pub full_name:  String,
  pub age:        i32,
  pub created_at: DateTime<Utc>,
  pub updated_at: Option<DateTime<Utc>>,
}

impl From<&Person> for PersonView {
  fn from(p: &Person) -> Self {
    PersonView {
      id:         p.id(),
      first_name: p.first_name().to_owned(),
      last_name:  p.last_name().to_owned(),
      email:      p.email().to_owned(),
      birth_date: p.birth_date(),
      document:   p.document().to_owned(),
      active:     p.is_active(),
      full_name:  p.full_name(),
      age:        p.age(),
      created_at: p.created_at(),
      updated_at: p.updated_at(),
    }
  }
}

impl From<Person> for PersonView {
  fn from(p: Person) -> Self { PersonView::from(&p) }
}
