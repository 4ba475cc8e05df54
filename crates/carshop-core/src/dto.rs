//! Transfer objects and the pure mapping between them and the entities.
//!
//! The transfer objects are flat: a car carries its owner's id, never the
//! owner itself, so serialising a person with cars cannot recurse.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  car::{Car, Owner},
  entity::Entity,
  person::{Person, PersonUpdate},
};

// ─── Person ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonDto {
  pub id:         Uuid,
  pub first_name: String,
  pub last_name:  String,
  pub email:      Option<String>,
  pub phone:      Option<String>,
}

impl From<&Person> for PersonDto {
  fn from(p: &Person) -> Self {
    Self {
      id:         p.id(),
      first_name: p.first_name().to_owned(),
      last_name:  p.last_name().to_owned(),
      email:      p.email().map(str::to_owned),
      phone:      p.phone().map(str::to_owned),
    }
  }
}

impl From<PersonDto> for Person {
  fn from(dto: PersonDto) -> Self {
    Person::new(dto.id, dto.first_name, dto.last_name, dto.email, dto.phone)
  }
}

impl From<PersonDto> for PersonUpdate {
  fn from(dto: PersonDto) -> Self {
    PersonUpdate {
      first_name: dto.first_name,
      last_name:  dto.last_name,
      email:      dto.email,
      phone:      dto.phone,
    }
  }
}

/// A person together with the cars it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonWithCarsDto {
  #[serde(flatten)]
  pub person: PersonDto,
  pub cars:   Vec<CarDto>,
}

impl From<&Person> for PersonWithCarsDto {
  fn from(p: &Person) -> Self {
    Self {
      person: PersonDto::from(p),
      cars:   p.cars().iter().map(CarDto::from).collect(),
    }
  }
}

// ─── Car ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarDto {
  pub id:        Uuid,
  pub maker:     String,
  pub model:     String,
  pub year:      i32,
  pub price:     Decimal,
  pub image_url: Option<String>,
  /// `None` when the car is unowned.
  pub person_id: Option<Uuid>,
}

impl From<&Car> for CarDto {
  fn from(car: &Car) -> Self {
    Self {
      id:        car.id(),
      maker:     car.maker().to_owned(),
      model:     car.model().to_owned(),
      year:      car.year(),
      price:     car.price(),
      image_url: car.image_url().map(str::to_owned),
      person_id: car.owner().person_id(),
    }
  }
}

impl From<CarDto> for Car {
  fn from(dto: CarDto) -> Self {
    Car::new(dto.id, dto.maker, dto.model, dto.year, dto.price)
      .with_image_url(dto.image_url)
      .with_owner(Owner::from(dto.person_id))
  }
}

/// Partial car payload for updates; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarUpdateDto {
  pub id:    Uuid,
  pub maker: Option<String>,
  pub model: Option<String>,
  pub year:  Option<i32>,
  pub price: Option<Decimal>,
}

impl CarUpdateDto {
  /// Apply the present fields of this payload to `car`.
  pub fn apply_to(self, car: &mut Car) {
    car.update(self.maker, self.model, self.year, self.price);
  }
}

/// Payload for replacing a car's image URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUrlDto {
  pub image_url: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn owned_car() -> Car {
    let mut person = Person::new(Uuid::new_v4(), "Benno", "Bauer", None, None);
    person
      .add_car(
        Car::new(Uuid::new_v4(), "VW", "Golf", 2012, Decimal::new(10_500, 0))
          .with_image_url(Some("http://localhost/images/golf.jpg".into())),
      )
      .clone()
  }

  #[test]
  fn car_dto_carries_owner_id_only() {
    let car = owned_car();
    let dto = CarDto::from(&car);
    assert_eq!(dto.person_id, car.owner().person_id());
    assert!(dto.person_id.is_some());
  }

  #[test]
  fn car_mapping_round_trip() {
    for car in [
      owned_car(),
      Car::new(Uuid::new_v4(), "Opel", "Mokka", 2022, Decimal::new(2_099_999, 2)),
    ] {
      let dto = CarDto::from(&car);
      let back = CarDto::from(&Car::from(dto.clone()));
      assert_eq!(back, dto);
    }
  }

  #[test]
  fn person_mapping_round_trip() {
    let p = Person::new(
      Uuid::new_v4(),
      "Max",
      "Mustermann",
      Some("max.mustermann@gmail.com".into()),
      None,
    );
    let dto = PersonDto::from(&p);
    assert_eq!(Person::from(dto.clone()), p);
    assert_eq!(PersonDto::from(&Person::from(dto.clone())), dto);
  }

  #[test]
  fn dto_uses_camel_case_on_the_wire() {
    let dto = CarDto::from(&owned_car());
    let json = serde_json::to_value(&dto).unwrap();
    assert!(json.get("imageUrl").is_some());
    assert!(json.get("personId").is_some());

    let p = PersonDto::from(&Person::new(Uuid::nil(), "A", "B", None, None));
    let json = serde_json::to_value(&p).unwrap();
    assert_eq!(json["firstName"], "A");
    assert_eq!(json["lastName"], "B");
  }

  #[test]
  fn car_dto_accepts_numeric_price() {
    let json = serde_json::json!({
      "id": Uuid::nil(),
      "maker": "VW",
      "model": "Golf",
      "year": 2018,
      "price": 15000,
      "imageUrl": null,
      "personId": null,
    });
    let dto: CarDto = serde_json::from_value(json).unwrap();
    assert_eq!(dto.price, Decimal::new(15_000, 0));
  }

  #[test]
  fn update_dto_missing_fields_deserialise_as_none() {
    let json = serde_json::json!({ "id": Uuid::nil(), "year": 2019 });
    let dto: CarUpdateDto = serde_json::from_value(json).unwrap();
    assert_eq!(dto.year, Some(2019));
    assert!(dto.maker.is_none() && dto.model.is_none() && dto.price.is_none());
  }

  #[test]
  fn person_with_cars_flattens_person_fields() {
    let mut p = Person::new(Uuid::new_v4(), "Arno", "Arndt", None, None);
    p.add_car(Car::new(Uuid::new_v4(), "BMW", "X5", 2021, Decimal::new(49_500, 0)));
    let json = serde_json::to_value(PersonWithCarsDto::from(&p)).unwrap();
    assert_eq!(json["lastName"], "Arndt");
    assert_eq!(json["cars"].as_array().unwrap().len(), 1);
    assert_eq!(json["cars"][0]["personId"], serde_json::json!(p.id()));
  }
}
