//! Per-request cancellation.
//!
//! Every request gets a child of the server's shutdown token. It is cancelled
//! when the server shuts down, when the configured request timeout elapses,
//! or when the request future is dropped (client gone).

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use people_core::store::PersonStore;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::AppState;

/// Extractor holding the cancellation token for the current request.
pub struct RequestCancel {
  token:  CancellationToken,
  _guard: DropGuard,
}

impl RequestCancel {
  pub fn token(&self) -> &CancellationToken { &self.token }
}

impl<S> FromRequestParts<AppState<S>> for RequestCancel
where
  S: PersonStore + Clone + 'static,
{
  type Rejection = Infallible;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = state.shutdown.child_token();
    let timeout = state.config.request_timeout();

    let timer = token.clone();
    let path = parts.uri.path().to_owned();
    tokio::spawn(async move {
      tokio::select! {
        () = timer.cancelled() => {}
        () = tokio::time::sleep(timeout) => {
          tracing::warn!(%path, ?timeout, "request timed out, cancelling");
          timer.cancel();
        }
      }
    });

    Ok(Self { _guard: token.clone().drop_guard(), token })
  }
}
