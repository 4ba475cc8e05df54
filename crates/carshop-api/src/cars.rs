//! Handlers for car endpoints.
//!
//! Cars are read at `/cars` and written through their owner at
//! `/people/{id}/cars`. Writes go through [`Person::add_car`] and
//! [`Person::remove_car`] so ownership stays consistent on both sides.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use carshop_core::{
  Car, Entity, Person,
  dto::{CarDto, CarUpdateDto, ImageUrlDto},
  error::ensure_same_id,
  session::Session,
  store::{CarQuery, CarShopStore, CarsRepository, PeopleRepository, Repository},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, created, error::ApiError, save};

async fn find_person<S>(store: &S, id: Uuid) -> Result<Person, ApiError>
where
  S: CarShopStore,
{
  Repository::<Person>::find_by_id(store, id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("person {id} not found")))
}

/// The car `car_id`, provided it belongs to `person_id`.
async fn find_owned_car<S>(
  store: &S,
  person_id: Uuid,
  car_id: Uuid,
) -> Result<Car, ApiError>
where
  S: CarShopStore,
{
  find_person(store, person_id).await?;
  Repository::<Car>::find_by_id(store, car_id)
    .await
    .map_err(ApiError::store)?
    .filter(|car| car.owner().is_owned_by(person_id))
    .ok_or_else(|| {
      ApiError::NotFound(format!("car {car_id} not found for person {person_id}"))
    })
}

fn to_dtos(cars: &[Car]) -> Vec<CarDto> { cars.iter().map(CarDto::from).collect() }

// ─── Reads ────────────────────────────────────────────────────────────────────

/// `GET /cars`
pub async fn list<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<CarDto>>, ApiError>
where
  S: CarShopStore + Clone + 'static,
{
  let cars: Vec<Car> = Repository::<Car>::select_all(state.store.as_ref())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(to_dtos(&cars)))
}

/// `GET /cars/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<CarDto>, ApiError>
where
  S: CarShopStore + Clone + 'static,
{
  let car = Repository::<Car>::find_by_id(state.store.as_ref(), id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("car {id} not found")))?;
  Ok(Json(CarDto::from(&car)))
}

/// Query string of `GET /cars/attributes`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeParams {
  pub maker:     Option<String>,
  pub model:     Option<String>,
  pub year_min:  Option<i32>,
  pub year_max:  Option<i32>,
  pub price_min: Option<Decimal>,
  pub price_max: Option<Decimal>,
}

impl From<AttributeParams> for CarQuery {
  fn from(p: AttributeParams) -> Self {
    CarQuery {
      maker:     p.maker,
      model:     p.model,
      year_min:  p.year_min,
      year_max:  p.year_max,
      price_min: p.price_min,
      price_max: p.price_max,
    }
    .normalized()
  }
}

/// `GET /cars/attributes?maker=&model=&yearMin=&yearMax=&priceMin=&priceMax=`
pub async fn by_attributes<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<AttributeParams>,
) -> Result<Json<Vec<CarDto>>, ApiError>
where
  S: CarShopStore + Clone + 'static,
{
  let query = CarQuery::from(params);
  let cars = state
    .store
    .select_by_attributes(&query)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(to_dtos(&cars)))
}

/// `GET /people/{id}/cars`
pub async fn by_person<S>(
  State(state): State<AppState<S>>,
  Path(person_id): Path<Uuid>,
) -> Result<Json<Vec<CarDto>>, ApiError>
where
  S: CarShopStore + Clone + 'static,
{
  let cars = state
    .store
    .select_by_person_id(person_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(to_dtos(&cars)))
}

// ─── Writes ───────────────────────────────────────────────────────────────────

/// `POST /people/{id}/cars`. The new car is owned by the person in the path,
/// whatever `personId` the body carries.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Path(person_id): Path<Uuid>,
  Json(body): Json<CarDto>,
) -> Result<Response, ApiError>
where
  S: CarShopStore + Clone + 'static,
{
  let mut person = find_person(state.store.as_ref(), person_id).await?;
  let car = person.add_car(Car::from(body)).clone();

  let mut session = Session::new();
  session.add(car.clone());
  save(state.store.as_ref(), session, "Create Car").await?;

  Ok(created(&format!("/cars/{}", car.id()), Json(CarDto::from(&car))))
}

/// `PUT /people/{id}/cars/{car_id}`. Only the fields present in the body are
/// changed.
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Path((person_id, car_id)): Path<(Uuid, Uuid)>,
  Json(body): Json<CarUpdateDto>,
) -> Result<Json<CarDto>, ApiError>
where
  S: CarShopStore + Clone + 'static,
{
  ensure_same_id(car_id, body.id)?;

  let mut car = find_owned_car(state.store.as_ref(), person_id, car_id).await?;
  body.apply_to(&mut car);

  let mut session = Session::new();
  session.update(car.clone());
  save(state.store.as_ref(), session, "Update Car").await?;

  Ok(Json(CarDto::from(&car)))
}

/// `PUT /people/{id}/cars/{car_id}/image`
pub async fn set_image<S>(
  State(state): State<AppState<S>>,
  Path((person_id, car_id)): Path<(Uuid, Uuid)>,
  Json(body): Json<ImageUrlDto>,
) -> Result<Json<CarDto>, ApiError>
where
  S: CarShopStore + Clone + 'static,
{
  let mut car = find_owned_car(state.store.as_ref(), person_id, car_id).await?;
  car.set_image_url(body.image_url);

  let mut session = Session::new();
  session.update(car.clone());
  save(state.store.as_ref(), session, "Update Car Image").await?;

  Ok(Json(CarDto::from(&car)))
}

/// `DELETE /people/{id}/cars/{car_id}`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  Path((person_id, car_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CarShopStore + Clone + 'static,
{
  let mut person = state
    .store
    .find_by_id_with_cars(person_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("person {person_id} not found")))?;
  let car = person.remove_car(car_id).ok_or_else(|| {
    ApiError::NotFound(format!("car {car_id} not found for person {person_id}"))
  })?;

  let mut session = Session::new();
  session.remove(&car);
  save(state.store.as_ref(), session, "Delete Car").await?;

  Ok(StatusCode::NO_CONTENT)
}
