//! Demonstration data: four people and eight cars.
//!
//! Identifiers are fixed so tests and clients can refer to them.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{car::Car, person::Person, session::Session};

pub const ERIKA: Uuid = Uuid::from_u128(0x1000_0000_0000_0000_0000_0000_0000_0000);
pub const MAX: Uuid = Uuid::from_u128(0x2000_0000_0000_0000_0000_0000_0000_0000);
pub const ARNO: Uuid = Uuid::from_u128(0x3000_0000_0000_0000_0000_0000_0000_0000);
pub const BENNO: Uuid = Uuid::from_u128(0x4000_0000_0000_0000_0000_0000_0000_0000);

/// Car `n` (1-based) has id `00n00000-0000-…`.
pub const fn car_id(n: u8) -> Uuid {
  Uuid::from_u128((n as u128) << 116)
}

pub fn people() -> Vec<Person> {
  vec![
    Person::new(
      ERIKA,
      "Erika",
      "Mustermann",
      Some("erika.mustermann@t-online.de".into()),
      Some("05826 1234 5678".into()),
    ),
    Person::new(
      MAX,
      "Max",
      "Mustermann",
      Some("max.mustermann@gmail.com".into()),
      Some("05826 1234 5678".into()),
    ),
    Person::new(
      ARNO,
      "Arno",
      "Arndt",
      Some("a.arndt@t-online.de".into()),
      Some("04131 9876 5432".into()),
    ),
    Person::new(
      BENNO,
      "Benno",
      "Bauer",
      Some("b.bauer@gmail.com".into()),
      Some("05141 4321 9876".into()),
    ),
  ]
}

/// The eight seed cars, all unowned.
pub fn cars() -> Vec<Car> {
  let price = |p: i64| Decimal::new(p, 0);
  vec![
    Car::new(car_id(1), "VW", "Golf", 2018, price(15_000)),
    Car::new(car_id(2), "BMW", "520", 2020, price(29_000)),
    Car::new(car_id(3), "Opel", "Mokka", 2022, price(21_000)),
    Car::new(car_id(4), "VW", "Golf", 2015, price(13_000)),
    Car::new(car_id(5), "BMW", "X5", 2021, price(49_500)),
    Car::new(car_id(6), "Hyundai", "Tucson", 2021, price(24_500)),
    Car::new(car_id(7), "VW", "Golf", 2010, price(9_500)),
    Car::new(car_id(8), "VW", "Golf", 2012, price(10_500)),
  ]
}

/// People with their cars attached: Erika 1–2, Max 3–4, Arno 5–7, Benno 8.
pub fn people_with_cars() -> Vec<Person> {
  let mut people = people();
  let owners = [0, 0, 1, 1, 2, 2, 2, 3];
  for (car, owner) in cars().into_iter().zip(owners) {
    people[owner].add_car(car);
  }
  people
}

/// A session inserting every seed person and car.
pub fn session() -> Session {
  let mut session = Session::new();
  let people = people_with_cars();
  for person in &people {
    session.add(person.clone());
  }
  for car in people.iter().flat_map(Person::cars) {
    session.add(car.clone());
  }
  session
}
