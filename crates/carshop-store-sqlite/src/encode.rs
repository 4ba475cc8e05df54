//! Encoding and decoding helpers between the entity types and the plain-text
//! representations stored in SQLite columns.
//!
//! UUIDs are stored as hyphenated lowercase strings. Prices are stored as
//! exact decimal strings so no precision is lost.

use carshop_core::{Car, Entity, EntityKind, Owner, Person};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::Result;

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── Decimal ─────────────────────────────────────────────────────────────────

pub fn encode_price(price: Decimal) -> String { price.to_string() }

pub fn decode_price(s: &str) -> Result<Decimal> { Ok(s.parse::<Decimal>()?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw column values of a `people` row.
#[derive(Debug, Clone)]
pub struct RawPerson {
  pub person_id:  String,
  pub first_name: String,
  pub last_name:  String,
  pub email:      Option<String>,
  pub phone:      Option<String>,
}

impl RawPerson {
  pub fn into_person(self) -> Result<Person> {
    Ok(Person::new(
      decode_uuid(&self.person_id)?,
      self.first_name,
      self.last_name,
      self.email,
      self.phone,
    ))
  }
}

impl From<&Person> for RawPerson {
  fn from(p: &Person) -> Self {
    Self {
      person_id:  encode_uuid(p.id()),
      first_name: p.first_name().to_owned(),
      last_name:  p.last_name().to_owned(),
      email:      p.email().map(str::to_owned),
      phone:      p.phone().map(str::to_owned),
    }
  }
}

/// Raw column values of a `cars` row.
#[derive(Debug, Clone)]
pub struct RawCar {
  pub car_id:    String,
  pub maker:     String,
  pub model:     String,
  pub year:      i32,
  pub price:     String,
  pub image_url: Option<String>,
  pub person_id: Option<String>,
}

impl RawCar {
  pub fn into_car(self) -> Result<Car> {
    let owner = self
      .person_id
      .as_deref()
      .map(decode_uuid)
      .transpose()?;

    Ok(
      Car::new(
        decode_uuid(&self.car_id)?,
        self.maker,
        self.model,
        self.year,
        decode_price(&self.price)?,
      )
      .with_image_url(self.image_url)
      .with_owner(Owner::from(owner)),
    )
  }
}

impl From<&Car> for RawCar {
  fn from(c: &Car) -> Self {
    Self {
      car_id:    encode_uuid(c.id()),
      maker:     c.maker().to_owned(),
      model:     c.model().to_owned(),
      year:      c.year(),
      price:     encode_price(c.price()),
      image_url: c.image_url().map(str::to_owned),
      person_id: c.owner().person_id().map(encode_uuid),
    }
  }
}

// ─── SqlEntity ───────────────────────────────────────────────────────────────

/// Table metadata and row mapping for an entity type. Lets one generic
/// implementation serve every [`carshop_core::store::Repository`].
pub trait SqlEntity: Entity + Sized {
  const TABLE: &'static str;
  const ID_COLUMN: &'static str;
  /// Column list in the order [`SqlEntity::read_row`] expects.
  const COLUMNS: &'static str;

  type Raw: Send + 'static;

  fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self::Raw>;

  fn from_raw(raw: Self::Raw) -> Result<Self>;
}

impl SqlEntity for Person {
  const TABLE: &'static str = "people";
  const ID_COLUMN: &'static str = "person_id";
  const COLUMNS: &'static str = "person_id, first_name, last_name, email, phone";

  type Raw = RawPerson;

  fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawPerson> {
    Ok(RawPerson {
      person_id:  row.get(0)?,
      first_name: row.get(1)?,
      last_name:  row.get(2)?,
      email:      row.get(3)?,
      phone:      row.get(4)?,
    })
  }

  fn from_raw(raw: RawPerson) -> Result<Self> { raw.into_person() }
}

impl SqlEntity for Car {
  const TABLE: &'static str = "cars";
  const ID_COLUMN: &'static str = "car_id";
  const COLUMNS: &'static str =
    "car_id, maker, model, year, price, image_url, person_id";

  type Raw = RawCar;

  fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawCar> {
    Ok(RawCar {
      car_id:    row.get(0)?,
      maker:     row.get(1)?,
      model:     row.get(2)?,
      year:      row.get(3)?,
      price:     row.get(4)?,
      image_url: row.get(5)?,
      person_id: row.get(6)?,
    })
  }

  fn from_raw(raw: RawCar) -> Result<Self> { raw.into_car() }
}

/// Table and id column for an entity kind.
pub fn table_of(kind: EntityKind) -> (&'static str, &'static str) {
  match kind {
    EntityKind::Person => (Person::TABLE, Person::ID_COLUMN),
    EntityKind::Car => (Car::TABLE, Car::ID_COLUMN),
  }
}
