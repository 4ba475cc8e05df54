//! Person: the aggregate root that owns cars.

use uuid::Uuid;

use crate::{
  car::{Car, Owner},
  entity::{Entity, EntityKind},
};

/// New values for [`Person::update`].
#[derive(Debug, Clone, Default)]
pub struct PersonUpdate {
  pub first_name: String,
  pub last_name:  String,
  pub email:      Option<String>,
  pub phone:      Option<String>,
}

/// A person who may own cars.
///
/// `cars` is only populated when the person was loaded together with its cars
/// (see [`crate::store::PeopleRepository::find_by_id_with_cars`]) or when cars
/// were attached with [`Person::add_car`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
  id:         Uuid,
  first_name: String,
  last_name:  String,
  email:      Option<String>,
  phone:      Option<String>,
  cars:       Vec<Car>,
}

impl Person {
  pub fn new(
    id: Uuid,
    first_name: impl Into<String>,
    last_name: impl Into<String>,
    email: Option<String>,
    phone: Option<String>,
  ) -> Self {
    Self {
      id,
      first_name: first_name.into(),
      last_name: last_name.into(),
      email,
      phone,
      cars: Vec::new(),
    }
  }

  pub fn first_name(&self) -> &str { &self.first_name }

  pub fn last_name(&self) -> &str { &self.last_name }

  pub fn email(&self) -> Option<&str> { self.email.as_deref() }

  pub fn phone(&self) -> Option<&str> { self.phone.as_deref() }

  pub fn cars(&self) -> &[Car] { &self.cars }

  pub fn owns(&self, car_id: Uuid) -> bool {
    self.cars.iter().any(|c| c.id() == car_id)
  }

  /// Names are always overwritten; email and phone only when present.
  pub fn update(&mut self, update: PersonUpdate) {
    self.first_name = update.first_name;
    self.last_name = update.last_name;
    self.set_contact(update.email, update.phone);
  }

  /// Overwrite email and/or phone, leaving absent values untouched.
  pub fn set_contact(&mut self, email: Option<String>, phone: Option<String>) {
    if let Some(email) = email {
      self.email = Some(email);
    }
    if let Some(phone) = phone {
      self.phone = Some(phone);
    }
  }

  /// Take ownership of `car` and return the stored member.
  ///
  /// A car with the same id that is already a member is replaced, so a car
  /// appears at most once in the collection.
  pub fn add_car(&mut self, mut car: Car) -> &Car {
    car.set_owner(Owner::Owned(self.id));
    let index = match self.cars.iter().position(|c| c.id() == car.id()) {
      Some(index) => {
        self.cars[index] = car;
        index
      }
      None => {
        self.cars.push(car);
        self.cars.len() - 1
      }
    };
    &self.cars[index]
  }

  /// Remove the car with `car_id` and return it, now unowned.
  ///
  /// Returns `None` and changes nothing if the car is not a member.
  pub fn remove_car(&mut self, car_id: Uuid) -> Option<Car> {
    let index = self.cars.iter().position(|c| c.id() == car_id)?;
    let mut car = self.cars.remove(index);
    car.release();
    Some(car)
  }
}

impl Entity for Person {
  const KIND: EntityKind = EntityKind::Person;

  fn id(&self) -> Uuid { self.id }
}
