//! Encoding and decoding helpers between [`Person`] and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, birth dates as `YYYY-MM-DD`,
//! and UUIDs as hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, Utc};
use people_core::Person;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ────────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Row type ─────────────────────────────────────────────────────────────────

/// A `people` row as SQLite sees it. Used in both directions: decoded into a
/// [`Person`] after a `SELECT`, and built from one before a write.
#[derive(Debug, Clone)]
pub struct RawPerson {
  pub id:         String,
  pub first_name: String,
  pub last_name:  String,
  pub email:      String,
  pub birth_date: String,
  pub document:   String,
  pub active:     bool,
  pub created_at: String,
  pub updated_at: Option<String>,
}

impl RawPerson {
  /// Read a row selected with [`COLUMNS`](crate::schema::COLUMNS).
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawPerson {
      id:         row.get(0)?,
      first_name: row.get(1)?,
      last_name:  row.get(2)?,
      email:      row.get(3)?,
      birth_date: row.get(4)?,
      document:   row.get(5)?,
      active:     row.get(6)?,
      created_at: row.get(7)?,
      updated_at: row.get(8)?,
    })
  }

  pub fn into_person(self) -> Result<Person> {
    Ok(Person::from_parts(
      decode_uuid(&self.id)?,
      self.first_name,
      self.last_name,
      self.email,
      decode_date(&self.birth_date)?,
      self.document,
      self.active,
      decode_dt(&self.created_at)?,
      self.updated_at.as_deref().map(decode_dt).transpose()?,
    ))
  }
}

impl From<&Person> for RawPerson {
  fn from(p: &Person) -> Self {
    RawPerson {
      id:         encode_uuid(p.id()),
      first_name: p.first_name().to_owned(),
      last_name:  p.last_name().to_owned(),
      email:      p.email().to_owned(),
      birth_date: encode_date(p.birth_date()),
      document:   p.document().to_owned(),
      active:     p.is_active(),
      created_at: encode_dt(p.created_at()),
      updated_at: p.updated_at().map(encode_dt),
    }
  }
}
