//! JSON REST API for the carshop marketplace.
//!
//! Exposes an axum [`Router`] backed by any
//! [`carshop_core::store::CarShopStore`]. TLS and process concerns are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = carshop_api::router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod cars;
pub mod error;
pub mod images;
pub mod people;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
  routing::{get, put},
};
use carshop_core::{
  session::Session,
  store::{CarShopStore, UnitOfWork},
};

pub use error::ApiError;
pub use images::FsImageStore;

/// Path prefix of every route.
pub const BASE_PATH: &str = "/carshop/v2";

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S> {
  pub store:      Arc<S>,
  pub images:     Arc<FsImageStore>,
  /// Directory below which uploaded images are kept (in `images/`).
  pub image_root: Arc<PathBuf>,
}

impl<S> AppState<S> {
  pub fn new(store: S, image_root: impl Into<PathBuf>) -> Self {
    Self {
      store:      Arc::new(store),
      images:     Arc::new(FsImageStore),
      image_root: Arc::new(image_root.into()),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router for `state`, mounted below [`BASE_PATH`].
pub fn router<S>(state: AppState<S>) -> Router
where
  S: CarShopStore + Clone + 'static,
{
  let api = Router::new()
    // People
    .route("/people", get(people::list::<S>).post(people::create::<S>))
    .route("/people/name", get(people::by_name::<S>))
    .route(
      "/people/{id}",
      get(people::get_one::<S>)
        .put(people::update::<S>)
        .delete(people::delete::<S>),
    )
    .route("/people/{id}/with-cars", get(people::get_with_cars::<S>))
    // Cars
    .route("/cars", get(cars::list::<S>))
    .route("/cars/attributes", get(cars::by_attributes::<S>))
    .route("/cars/{id}", get(cars::get_one::<S>))
    .route(
      "/people/{id}/cars",
      get(cars::by_person::<S>).post(cars::create::<S>),
    )
    .route(
      "/people/{id}/cars/{car_id}",
      put(cars::update::<S>).delete(cars::delete::<S>),
    )
    .route("/people/{id}/cars/{car_id}/image", put(cars::set_image::<S>))
    // Images
    .route("/images", axum::routing::post(images::upload::<S>))
    .route(
      "/images/{filename}",
      get(images::download::<S>).delete(images::delete::<S>),
    )
    .route("/images/exists/{filename}", get(images::exists::<S>))
    .with_state(state);

  Router::new().nest(BASE_PATH, api)
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

/// Commit `session`, mapping store failures onto HTTP errors.
pub(crate) async fn save<S>(
  store: &S,
  session: Session,
  label: &str,
) -> Result<bool, ApiError>
where
  S: UnitOfWork,
{
  store
    .commit(session, Some(label))
    .await
    .map_err(ApiError::store)
}

/// `201 Created` with a `Location` header pointing at `path` below
/// [`BASE_PATH`].
pub(crate) fn created(path: &str, body: impl IntoResponse) -> Response {
  let location = format!("{BASE_PATH}{path}");
  let mut res = (StatusCode::CREATED, body).into_response();
  if let Ok(value) = HeaderValue::from_str(&location) {
    res.headers_mut().insert(header::LOCATION, value);
  }
  res
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests;
