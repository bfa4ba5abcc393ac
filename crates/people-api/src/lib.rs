//! JSON REST API for the people service.
//!
//! Exposes an axum [`Router`] backed by any [`PersonStore`]. Requests are
//! validated here; the use cases themselves live in `people_core::handlers`.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = people_api::router(AppState::new(store, config, shutdown));
//! ```

pub mod cancel;
pub mod error;
pub mod people;
pub mod settings;
pub mod validate;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use people_core::store::PersonStore;
use tokio_util::sync::CancellationToken;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

pub use error::ApiError;
pub use settings::ServerConfig;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: PersonStore> {
  pub store:    Arc<S>,
  pub config:   Arc<ServerConfig>,
  /// Parent of every request's cancellation token.
  pub shutdown: CancellationToken,
}

impl<S: PersonStore> AppState<S> {
  pub fn new(store: S, config: ServerConfig, shutdown: CancellationToken) -> Self {
    Self {
      store: Arc::new(store),
      config: Arc::new(config),
      shutdown,
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The `/people` routes, still waiting for their state.
pub fn api_router<S>() -> Router<AppState<S>>
where
  S: PersonStore + Clone + 'static,
{
  Router::new()
    .route("/people", get(people::list::<S>).post(people::create::<S>))
    .route(
      "/people/{id}",
      get(people::get_one::<S>)
        .put(people::update::<S>)
        .delete(people::delete::<S>),
    )
    .route("/people/{id}/activate", post(people::activate::<S>))
    .route("/people/{id}/deactivate", post(people::deactivate::<S>))
}

/// Build the full application: the API under `/api`, wrapped in request
/// tracing and a panic guard that still answers with a JSON 500.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: PersonStore + Clone + 'static,
{
  with_layers(Router::new().nest("/api", api_router::<S>())).with_state(state)
}

fn with_layers<T>(app: Router<T>) -> Router<T>
where
  T: Clone + Send + Sync + 'static,
{
  app
    .layer(CatchPanicLayer::custom(error::panic_response))
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────
