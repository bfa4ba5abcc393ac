use tokio_util::sync::CancellationToken;

use crate::{
  store::{PersonRepository, UnitOfWork},
  view::PersonView,
};

/// List everyone, or only active people. Never fails at the business level.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListPeople {
  pub active_only: bool,
}

impl ListPeople {
  pub async fn handle<U: UnitOfWork>(
    self,
    uow: &U,
    cancel: &CancellationToken,
  ) -> Result<Vec<PersonView>, U::Error> {
    let people = if self.active_only {
      uow.people().get_active(cancel).await?
    } else {
      uow.people().get_all(cancel).await?
    };
    Ok(people.iter().map(PersonView::from).collect())
  }
}
