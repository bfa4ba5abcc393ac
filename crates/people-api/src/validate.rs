//! Request bodies and the field rules checked before a use case runs.
//!
//! Every field is optional at the serde level so a missing or `null` value is
//! reported as a validation message rather than a deserialisation error.
//! Each field reports its first failing rule; all fields are checked.

use std::sync::LazyLock;

use chrono::{Months, NaiveDate};
use people_core::handlers::{CreatePerson, UpdatePerson};
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use uuid::Uuid;

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_EMAIL_LEN: usize = 255;
pub const MAX_DOCUMENT_LEN: usize = 20;
pub const MAX_AGE_YEARS: u32 = 120;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
  RegexBuilder::new(
    r"^[a-zA-Z0-9]+([a-zA-Z0-9._+-]*[a-zA-Z0-9])?@[a-zA-Z0-9]+([a-zA-Z0-9.-]*[a-zA-Z0-9])?\.[a-zA-Z]{2,}$",
  )
  .case_insensitive(true)
  .build()
  .expect("email pattern is a valid regex")
});

// ─── Bodies ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /people`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePersonBody {
  pub first_name: Option<String>,
  pub last_name:  Option<String>,
  pub email:      Option<String>,
  pub birth_date: Option<NaiveDate>,
  pub document:   Option<String>,
}

/// JSON body accepted by `PUT /people/{id}`. There is no document: it cannot
/// change after creation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePersonBody {
  pub first_name: Option<String>,
  pub last_name:  Option<String>,
  pub email:      Option<String>,
  pub birth_date: Option<NaiveDate>,
}

impl CreatePersonBody {
  /// Check every field against `today` and build the command, or return all
  /// messages in field order.
  pub fn validate(self, today: NaiveDate) -> Result<CreatePerson, Vec<String>> {
    let mut errors = Vec::new();
    let first_name = check_text(&mut errors, self.first_name, "First name", MAX_NAME_LEN);
    let last_name = check_text(&mut errors, self.last_name, "Last name", MAX_NAME_LEN);
    let email = check_email(&mut errors, self.email);
    let birth_date = check_birth_date(&mut errors, self.birth_date, today);
    let document = check_text(&mut errors, self.document, "Document", MAX_DOCUMENT_LEN);

    match (first_name, last_name, email, birth_date, document) {
      (Some(first_name), Some(last_name), Some(email), Some(birth_date), Some(document)) => {
        Ok(CreatePerson { first_name, last_name, email, birth_date, document })
      }
      _ => Err(errors),
    }
  }
}

impl UpdatePersonBody {
  pub fn validate(self, id: Uuid, today: NaiveDate) -> Result<UpdatePerson, Vec<String>> {
    let mut errors = Vec::new();
    let first_name = check_text(&mut errors, self.first_name, "First name", MAX_NAME_LEN);
    let last_name = check_text(&mut errors, self.last_name, "Last name", MAX_NAME_LEN);
    let email = check_email(&mut errors, self.email);
    let birth_date = check_birth_date(&mut errors, self.birth_date, today);

    match (first_name, last_name, email, birth_date) {
      (Some(first_name), Some(last_name), Some(email), Some(birth_date)) => {
        Ok(UpdatePerson { id, first_name, last_name, email, birth_date })
      }
      _ => Err(errors),
    }
  }
}

// ─── Field rules ──────────────────────────────────────────────────────────────

fn is_blank(value: &Option<String>) -> bool {
  value.as_deref().is_none_or(|s| s.trim().is_empty())
}

fn check_text(
  errors: &mut Vec<String>,
  value: Option<String>,
  label: &str,
  max: usize,
) -> Option<String> {
  if is_blank(&value) {
    errors.push(format!("{label} is required"));
    return None;
  }
  let value = value?;
  if value.chars().count() > max {
    errors.push(format!("{label} must not exceed {max} characters"));
    return None;
  }
  Some(value)
}

fn check_email(errors: &mut Vec<String>, value: Option<String>) -> Option<String> {
  if is_blank(&value) {
    errors.push("Email is required".to_owned());
    return None;
  }
  let value = value?;
  if value.chars().count() > MAX_EMAIL_LEN {
    errors.push(format!("Email must not exceed {MAX_EMAIL_LEN} characters"));
    return None;
  }
  if !is_valid_email(&value) {
    errors.push("Email must be a valid address".to_owned());
    return None;
  }
  Some(value)
}

fn check_birth_date(
  errors: &mut Vec<String>,
  value: Option<NaiveDate>,
  today: NaiveDate,
) -> Option<NaiveDate> {
  let Some(date) = value else {
    errors.push("Birth date is required".to_owned());
    return None;
  };
  if date >= today {
    errors.push("Birth date must be in the past".to_owned());
    return None;
  }
  // 29 February minus whole years lands on 28 February.
  if let Some(oldest) = today.checked_sub_months(Months::new(MAX_AGE_YEARS * 12))
    && date <= oldest
  {
    errors.push(format!(
      "Birth date must be within the last {MAX_AGE_YEARS} years"
    ));
    return None;
  }
  Some(date)
}

/// Structural checks first, then the pattern.
pub fn is_valid_email(email: &str) -> bool {
  if email.trim().is_empty() || email.chars().count() > MAX_EMAIL_LEN {
    return false;
  }
  if email.contains("..") {
    return false;
  }
  if email.starts_with(['.', '@']) || email.ends_with(['.', '@']) {
    return false;
  }
  match email.split_once('@') {
    Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
      if domain.contains('@') {
        return false;
      }
    }
    _ => return false,
  }
  EMAIL_PATTERN.is_match(email)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
