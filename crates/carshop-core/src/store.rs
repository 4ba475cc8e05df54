//! Repository and unit-of-work traits, plus the car filter type.
//!
//! The traits are implemented by storage backends (e.g.
//! `carshop-store-sqlite`). The HTTP layer depends on this abstraction, not on
//! any concrete backend.

use std::future::Future;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{car::Car, entity::Entity, person::Person, session::Session};

// ─── Error classification ────────────────────────────────────────────────────

/// Backend-independent classification of a store failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
  /// An insert collided with an existing identifier.
  Conflict,
  /// An update or delete found no row with the staged identifier.
  TargetMissing,
  /// A car references a person that does not exist.
  OwnerMissing,
  Other,
}

/// Implemented by backend error types so callers can react to conflicts and
/// missing targets without knowing the backend.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn failure(&self) -> Failure;
}

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`CarsRepository::select_by_attributes`].
///
/// Every predicate is optional and they combine with AND. An absent predicate
/// imposes no restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CarQuery {
  /// Exact maker match.
  pub maker:     Option<String>,
  /// Exact model match.
  pub model:     Option<String>,
  pub year_min:  Option<i32>,
  pub year_max:  Option<i32>,
  pub price_min: Option<Decimal>,
  pub price_max: Option<Decimal>,
}

impl CarQuery {
  /// Treat empty maker/model strings as absent.
  pub fn normalized(mut self) -> Self {
    self.maker = self.maker.filter(|m| !m.is_empty());
    self.model = self.model.filter(|m| !m.is_empty());
    self
  }

  /// Whether `car` satisfies every present predicate.
  pub fn matches(&self, car: &Car) -> bool {
    self.maker.as_deref().is_none_or(|m| car.maker() == m)
      && self.model.as_deref().is_none_or(|m| car.model() == m)
      && self.year_min.is_none_or(|y| car.year() >= y)
      && self.year_max.is_none_or(|y| car.year() <= y)
      && self.price_min.is_none_or(|p| car.price() >= p)
      && self.price_max.is_none_or(|p| car.price() <= p)
  }
}

// ─── Traits ──────────────────────────────────────────────────────────────────

/// Common base of every repository trait; fixes the backend error type.
pub trait Store: Send + Sync {
  type Error: StoreError;
}

/// Lookups shared by every entity type.
///
/// All methods return `Send` futures so the traits can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait Repository<E: Entity>: Store {
  /// Exact-match lookup. Returns `None` if not found.
  fn find_by_id(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<E>, Self::Error>> + Send + '_;

  /// Every stored entity of this type.
  fn select_all(
    &self,
  ) -> impl Future<Output = Result<Vec<E>, Self::Error>> + Send + '_;
}

/// Person-specific queries.
pub trait PeopleRepository: Repository<Person> {
  /// People whose last name contains `pattern` (SQL `LIKE`, case-insensitive
  /// for ASCII). A blank pattern imposes no constraint and yields everyone.
  fn select_by_name<'a>(
    &'a self,
    pattern: &'a str,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + 'a;

  /// Like [`Repository::find_by_id`] but with the person's cars loaded.
  fn find_by_id_with_cars(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;
}

/// Car-specific queries.
pub trait CarsRepository: Repository<Car> {
  fn select_by_attributes<'a>(
    &'a self,
    query: &'a CarQuery,
  ) -> impl Future<Output = Result<Vec<Car>, Self::Error>> + Send + 'a;

  /// Cars currently owned by `person_id`; empty when there are none or the
  /// person does not exist.
  fn select_by_person_id(
    &self,
    person_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Car>, Self::Error>> + Send + '_;
}

/// Applies a [`Session`] atomically.
pub trait UnitOfWork: Store {
  /// Apply every staged change in one transaction.
  ///
  /// Returns `true` if at least one row was affected. On error nothing is
  /// applied. `label` only tags log output.
  fn commit<'a>(
    &'a self,
    session: Session,
    label: Option<&'a str>,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;
}

/// Everything the HTTP layer needs from a backend.
pub trait CarShopStore: PeopleRepository + CarsRepository + UnitOfWork {}

impl<T> CarShopStore for T where T: PeopleRepository + CarsRepository + UnitOfWork {}
