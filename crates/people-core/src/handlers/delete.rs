use uuid::Uuid;
use tokio_util::sync::CancellationToken;

use super::{PERSON_NOT_FOUND, save};
use crate::{
  outcome::{Failure, Outcome},
  store::{PersonRepository, UnitOfWork},
};

/// Permanently remove a person, whatever their `active` flag.
#[derive(Debug, Clone, Copy)]
pub struct DeletePerson {
  pub id: Uuid,
}

impl DeletePerson {
  pub async fn handle<U: UnitOfWork>(
    self,
    uow: &U,
    cancel: &CancellationToken,
  ) -> Result<Outcome<bool>, U::Error> {
    let people = uow.people();

    if people.get_by_id(self.id, cancel).await?.is_none() {
      return Ok(Outcome::Failure(Failure::not_found(PERSON_NOT_FOUND)));
    }

    people.delete(self.id, cancel).await?;
    if let Some(failure) = save(uow, cancel).await? {
      return Ok(Outcome::Failure(failure));
    }

    Ok(Outcome::Success(true))
  }
}
