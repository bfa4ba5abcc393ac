//! Handlers for `/people` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/people` | Optional `?activeOnly=true` |
//! | `GET`    | `/people/{id}` | 404 if not found |
//! | `POST`   | `/people` | 201 with `Location` |
//! | `PUT`    | `/people/{id}` | Document cannot change |
//! | `DELETE` | `/people/{id}` | 204 |
//! | `POST`   | `/people/{id}/activate` | |
//! | `POST`   | `/people/{id}/deactivate` | |

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
  http::{StatusCode, header},
  response::IntoResponse,
};
use chrono::Utc;
use people_core::{
  Outcome, PersonView,
  handlers::{DeletePerson, GetPerson, ListPeople, SetPersonStatus, StatusChange},
  store::PersonStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  AppState,
  cancel::RequestCancel,
  error::ApiError,
  validate::{CreatePersonBody, UpdatePersonBody},
};

const FETCH_ALL_FAILED: &str = "An error occurred while fetching people";
const FETCH_ONE_FAILED: &str = "An error occurred while fetching the person";
const CREATE_FAILED: &str = "An internal error occurred while creating the person";
const UPDATE_FAILED: &str = "An internal error occurred while updating the person";
const DELETE_FAILED: &str = "An internal error occurred while deleting the person";
const STATUS_FAILED: &str = "An internal error occurred while changing the person's status";

// ─── Extraction helpers ──────────────────────────────────────────────────────

fn path_id(path: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, ApiError> {
  path
    .map(|Path(id)| id)
    .map_err(|r| ApiError::validation(vec![r.body_text()]))
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
  body
    .map(|Json(body)| body)
    .map_err(|r| ApiError::validation(vec![r.body_text()]))
}

/// Unwrap a use-case outcome, turning a business failure into its response.
fn settle<T>(outcome: Outcome<T>) -> Result<T, ApiError> {
  match outcome {
    Outcome::Success(value) => Ok(value),
    Outcome::Failure(failure) => {
      tracing::warn!(kind = ?failure.kind, message = %failure.message, "request declined");
      Err(failure.into())
    }
  }
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
  #[serde(default)]
  pub active_only: bool,
}

/// `GET /people[?activeOnly=true]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  cancel: RequestCancel,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<PersonView>>, ApiError>
where
  S: PersonStore + Clone + 'static,
{
  let Query(params) = params.map_err(|r| ApiError::validation(vec![r.body_text()]))?;

  let people = ListPeople { active_only: params.active_only }
    .handle(&state.store.unit_of_work(), cancel.token())
    .await
    .map_err(|e| ApiError::internal(FETCH_ALL_FAILED, e))?;
  Ok(Json(people))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /people/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  cancel: RequestCancel,
  id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<PersonView>, ApiError>
where
  S: PersonStore + Clone + 'static,
{
  let id = path_id(id)?;

  let outcome = GetPerson { id }
    .handle(&state.store.unit_of_work(), cancel.token())
    .await
    .map_err(|e| ApiError::internal(FETCH_ONE_FAILED, e))?;
  Ok(Json(settle(outcome)?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /people`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  cancel: RequestCancel,
  body: Result<Json<CreatePersonBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PersonStore + Clone + 'static,
{
  let command = json_body(body)?
    .validate(Utc::now().date_naive())
    .map_err(ApiError::validation)?;

  let outcome = command
    .handle(&state.store.unit_of_work(), cancel.token())
    .await
    .map_err(|e| ApiError::internal(CREATE_FAILED, e))?;
  let view = settle(outcome)?;

  tracing::info!(id = %view.id, "person created");
  let location = format!("/api/people/{}", view.id);
  Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(view)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /people/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  cancel: RequestCancel,
  id: Result<Path<Uuid>, PathRejection>,
  body: Result<Json<UpdatePersonBody>, JsonRejection>,
) -> Result<Json<PersonView>, ApiError>
where
  S: PersonStore + Clone + 'static,
{
  let id = path_id(id)?;
  let command = json_body(body)?
    .validate(id, Utc::now().date_naive())
    .map_err(ApiError::validation)?;

  let outcome = command
    .handle(&state.store.unit_of_work(), cancel.token())
    .await
    .map_err(|e| ApiError::internal(UPDATE_FAILED, e))?;
  let view = settle(outcome)?;

  tracing::info!(%id, "person updated");
  Ok(Json(view))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /people/{id}`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  cancel: RequestCancel,
  id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError>
where
  S: PersonStore + Clone + 'static,
{
  let id = path_id(id)?;

  let outcome = DeletePerson { id }
    .handle(&state.store.unit_of_work(), cancel.token())
    .await
    .map_err(|e| ApiError::internal(DELETE_FAILED, e))?;
  settle(outcome)?;

  tracing::info!(%id, "person deleted");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Status ───────────────────────────────────────────────────────────────────

async fn set_status<S>(
  state: &AppState<S>,
  cancel: &RequestCancel,
  id: Result<Path<Uuid>, PathRejection>,
  change: StatusChange,
) -> Result<Json<PersonView>, ApiError>
where
  S: PersonStore + Clone + 'static,
{
  let id = path_id(id)?;

  let outcome = SetPersonStatus { id, change }
    .handle(&state.store.unit_of_work(), cancel.token())
    .await
    .map_err(|e| ApiError::internal(STATUS_FAILED, e))?;
  let view = settle(outcome)?;

  tracing::info!(%id, ?change, "person status changed");
  Ok(Json(view))
}

/// `POST /people/{id}/activate`
pub async fn activate<S>(
  State(state): State<AppState<S>>,
  cancel: RequestCancel,
  id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<PersonView>, ApiError>
where
  S: PersonStore + Clone + 'static,
{
  set_status(&state, &cancel, id, StatusChange::Activate).await
}

/// `POST /people/{id}/deactivate`
pub async fn deactivate<S>(
  State(state): State<AppState<S>>,
  cancel: RequestCancel,
  id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<PersonView>, ApiError>
where
  S: PersonStore + Clone + 'static,
{
  set_status(&state, &cancel, id, StatusChange::Deactivate).await
}
