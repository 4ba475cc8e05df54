//! Handlers for `/people` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/people` | All people |
//! | `GET`    | `/people/name?name=` | Substring match on last name; everyone when blank |
//! | `GET`    | `/people/{id}` | 404 if not found |
//! | `GET`    | `/people/{id}/with-cars` | Person plus owned cars |
//! | `POST`   | `/people` | Body: [`PersonDto`]; 201, or 409 if the id is taken |
//! | `PUT`    | `/people/{id}` | Body: [`PersonDto`]; 400 on id mismatch |
//! | `DELETE` | `/people/{id}` | 204; owned cars become unowned |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use carshop_core::{
  Entity, Person,
  dto::{PersonDto, PersonWithCarsDto},
  error::ensure_same_id,
  session::Session,
  store::{CarShopStore, PeopleRepository, Repository},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, created, error::ApiError, save};

async fn find<S>(store: &S, id: Uuid) -> Result<Person, ApiError>
where
  S: CarShopStore,
{
  Repository::<Person>::find_by_id(store, id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("person {id} not found")))
}

// ─── Reads ────────────────────────────────────────────────────────────────────

/// `GET /people`
pub async fn list<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<PersonDto>>, ApiError>
where
  S: CarShopStore + Clone + 'static,
{
  let people: Vec<Person> = Repository::<Person>::select_all(state.store.as_ref())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(people.iter().map(PersonDto::from).collect()))
}

/// `GET /people/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<PersonDto>, ApiError>
where
  S: CarShopStore + Clone + 'static,
{
  let person = find(state.store.as_ref(), id).await?;
  Ok(Json(PersonDto::from(&person)))
}

/// `GET /people/{id}/with-cars`
pub async fn get_with_cars<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<PersonWithCarsDto>, ApiError>
where
  S: CarShopStore + Clone + 'static,
{
  let person = state
    .store
    .find_by_id_with_cars(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("person {id} not found")))?;
  Ok(Json(PersonWithCarsDto::from(&person)))
}

#[derive(Debug, Deserialize)]
pub struct NameParams {
  #[serde(default)]
  pub name: String,
}

/// `GET /people/name?name=<pattern>`
pub async fn by_name<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<NameParams>,
) -> Result<Json<Vec<PersonDto>>, ApiError>
where
  S: CarShopStore + Clone + 'static,
{
  let people = state
    .store
    .select_by_name(&params.name)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(people.iter().map(PersonDto::from).collect()))
}

// ─── Writes ───────────────────────────────────────────────────────────────────

/// `POST /people`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<PersonDto>,
) -> Result<Response, ApiError>
where
  S: CarShopStore + Clone + 'static,
{
  let person = Person::from(body);

  let mut session = Session::new();
  session.add(person.clone());
  save(state.store.as_ref(), session, "Create Person").await?;

  Ok(created(
    &format!("/people/{}", person.id()),
    Json(PersonDto::from(&person)),
  ))
}

/// `PUT /people/{id}`. Names are replaced, email and phone only when given.
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<PersonDto>,
) -> Result<Json<PersonDto>, ApiError>
where
  S: CarShopStore + Clone + 'static,
{
  ensure_same_id(id, body.id)?;

  let mut person = find(state.store.as_ref(), id).await?;
  person.update(body.into());

  let mut session = Session::new();
  session.update(person.clone());
  save(state.store.as_ref(), session, "Update Person").await?;

  Ok(Json(PersonDto::from(&person)))
}

/// `DELETE /people/{id}`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CarShopStore + Clone + 'static,
{
  let person = find(state.store.as_ref(), id).await?;

  let mut session = Session::new();
  session.remove(&person);
  save(state.store.as_ref(), session, "Delete Person").await?;

  Ok(StatusCode::NO_CONTENT)
}
