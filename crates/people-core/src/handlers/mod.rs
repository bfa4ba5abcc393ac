//! Use-case handlers, one per command or query.
//!
//! | Handler | Returns |
//! |---------|---------|
//! | [`CreatePerson`] | `Outcome<PersonView>` |
//! | [`UpdatePerson`] | `Outcome<PersonView>` |
//! | [`DeletePerson`] | `Outcome<bool>` |
//! | [`GetPerson`] | `Outcome<PersonView>` |
//! | [`ListPeople`] | `Vec<PersonView>` |
//! | [`SetPersonStatus`] | `Outcome<PersonView>` |
//!
//! Each handler runs against a single [`UnitOfWork`] and commits at most
//! once. Business failures come back as [`Outcome::Failure`](crate::Outcome);
//! anything the store reports is returned as `Err` untouched, except two
//! commit-time rejections: a unique index violation, folded into the same
//! failure the pre-check would have produced, and an update whose row was
//! deleted after loading, reported as not found.

mod create;
mod delete;
mod get;
mod list;
mod status;
mod update;

pub use create::CreatePerson;
pub use delete::DeletePerson;
pub use get::GetPerson;
pub use list::ListPeople;
pub use status::{SetPersonStatus, StatusChange};
pub use update::UpdatePerson;

use tokio_util::sync::CancellationToken;

use crate::{
  outcome::Failure,
  store::{StoreFailure, UnitOfWork},
};

pub const PERSON_NOT_FOUND: &str = "Person not found";
pub const EMAIL_EXISTS: &str = "Email already exists";
pub const DOCUMENT_EXISTS: &str = "Document already exists";

/// Save the unit of work. A unique-index rejection becomes a rule failure and
/// an update whose row was deleted meanwhile becomes "not found".
async fn save<U: UnitOfWork>(
  uow: &U,
  cancel: &CancellationToken,
) -> Result<Option<Failure>, U::Error> {
  match uow.save_changes(cancel).await {
    Ok(_) => Ok(None),
    Err(e) if e.is_vanished() => Ok(Some(Failure::not_found(PERSON_NOT_FOUND))),
    Err(e) => match e.unique_violation() {
      Some(field) => Ok(Some(Failure::rule(field.violation_message()))),
      None => Err(e),
    },
  }
}
