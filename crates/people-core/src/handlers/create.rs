use chrono::NaiveDate;
use tokio_util::sync::CancellationToken;

use super::{DOCUMENT_EXISTS, EMAIL_EXISTS, save};
use crate::{
  outcome::{Failure, Outcome},
  person::Person,
  store::{PersonRepository, UnitOfWork},
  view::PersonView,
};

/// Register a new person after checking both uniqueness rules.
#[derive(Debug, Clone)]
pub struct CreatePerson {
  pub first_name: String,
  pub last_name:  String,
  pub email:      String,
  pub birth_date: NaiveDate,
  pub document:   String,
}

impl CreatePerson {
  /// Both rules are checked before failing, so a caller colliding on email
  /// and document sees both errors, email first.
  pub async fn handle<U: UnitOfWork>(
    self,
    uow: &U,
    cancel: &CancellationToken,
  ) -> Result<Outcome<PersonView>, U::Error> {
    let people = uow.people();
    let mut errors = Vec::new();

    if people.email_exists(&self.email, None, cancel).await? {
      errors.push(EMAIL_EXISTS.to_owned());
    }
    if people.document_exists(&self.document, None, cancel).await? {
      errors.push(DOCUMENT_EXISTS.to_owned());
    }
    if !errors.is_empty() {
      return Ok(Outcome::Failure(Failure::rules(errors)));
    }

    let person = Person::new(
      self.first_name,
      self.last_name,
      self.email,
      self.birth_date,
      self.document,
    );
    let view = PersonView::from(&person);

    people.add(person, cancel).await?;
    if let Some(failure) = save(uow, cancel).await? {
      return Ok(Outcome::Failure(failure));
    }

    Ok(Outcome::Success(view))
  }
}
