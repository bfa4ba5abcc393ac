use chrono::NaiveDate;
use uuid::Uuid;
use tokio_util::sync::CancellationToken;

use super::{EMAIL_EXISTS, PERSON_NOT_FOUND, save};
use crate::{
  outcome::{Failure, Outcome},
  store::{PersonRepository, UnitOfWork},
  view::PersonView,
};

/// Replace a person's editable fields. The document is immutable and is not
/// part of the command.
#[derive(Debug, Clone)]
pub struct UpdatePerson {
  pub id:         Uuid,
  pub first_name: String,
  pub last_name:  String,
  pub email:      String,
  pub birth_date: NaiveDate,
}

impl UpdatePerson {
  pub async fn handle<U: UnitOfWork>(
    self,
    uow: &U,
    cancel: &CancellationToken,
  ) -> Result<Outcome<PersonView>, U::Error> {
    let people = uow.people();

    let Some(mut person) = people.get_by_id(self.id, cancel).await? else {
      return Ok(Outcome::Failure(Failure::not_found(PERSON_NOT_FOUND)));
    };

    // A person keeping their own address is not a collision.
    if people.email_exists(&self.email, Some(self.id), cancel).await? {
      return Ok(Outcome::Failure(Failure::rule(EMAIL_EXISTS)));
    }

    person.update_personal_info(
      self.first_name,
      self.last_name,
      self.email,
      self.birth_date,
    );
    let view = PersonView::from(&person);

    people.update(person, cancel).await?;
    if let Some(failure) = save(uow, cancel).await? {
      return Ok(Outcome::Failure(failure));
    }

    Ok(Outcome::Success(view))
  }
}
