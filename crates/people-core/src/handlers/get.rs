use uuid::Uuid;
use tokio_util::sync::CancellationToken;

use super::PERSON_NOT_FOUND;
use crate::{
  outcome::{Failure, Outcome},
  store::{PersonRepository, UnitOfWork},
  view::PersonView,
};

#[derive(Debug, Clone, Copy)]
pub struct GetPerson {
  pub id: Uuid,
}

impl GetPerson {
  pub async fn handle<U: UnitOfWork>(
    self,
    uow: &U,
    cancel: &CancellationToken,
  ) -> Result<Outcome<PersonView>, U::Error> {
    Ok(match uow.people().get_by_id(self.id, cancel).await? {
      Some(person) => Outcome::Success(PersonView::from(person)),
      None => Outcome::Failure(Failure::not_found(PERSON_NOT_FOUND)),
    })
  }
}
