use uuid::Uuid;
use tokio_util::sync::CancellationToken;

use super::{PERSON_NOT_FOUND, save};
use crate::{
  outcome::{Failure, Outcome},
  store::{PersonRepository, UnitOfWork},
  view::PersonView,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
  Activate,
  Deactivate,
}

/// Flip the `active` flag. Repeating a change is allowed and still refreshes
/// `updated_at`.
#[derive(Debug, Clone, Copy)]
pub struct SetPersonStatus {
  pub id:     Uuid,
  pub change: StatusChange,
}

impl SetPersonStatus {
  pub async fn handle<U: UnitOfWork>(
    self,
    uow: &U,
    cancel: &CancellationToken,
  ) -> Result<Outcome<PersonView>, U::Error> {
    let people = uow.people();

    let Some(mut person) = people.get_by_id(self.id, cancel).await? else {
      return Ok(Outcome::Failure(Failure::not_found(PERSON_NOT_FOUND)));
    };

    match self.change {
      StatusChange::Activate => person.activate(),
      StatusChange::Deactivate => person.deactivate(),
    }
    let view = PersonView::from(&person);

    people.update(person, cancel).await?;
    if let Some(failure) = save(uow, cancel).await? {
      return Ok(Outcome::Failure(failure));
    }

    Ok(Outcome::Success(view))
  }
}
