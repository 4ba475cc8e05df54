//! Car: the owned side of the Person/Car relationship.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::entity::{Entity, EntityKind};

// ─── Owner ───────────────────────────────────────────────────────────────────

/// Who a car belongs to. Replaces a nullable owner reference: a car is either
/// owned by exactly one person or explicitly unowned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Owner {
  Owned(Uuid),
  #[default]
  Unowned,
}

impl Owner {
  pub fn person_id(&self) -> Option<Uuid> {
    match self {
      Self::Owned(id) => Some(*id),
      Self::Unowned => None,
    }
  }

  pub fn is_owned_by(&self, person_id: Uuid) -> bool {
    matches!(self, Self::Owned(id) if *id == person_id)
  }
}

impl From<Option<Uuid>> for Owner {
  fn from(id: Option<Uuid>) -> Self {
    id.map_or(Self::Unowned, Self::Owned)
  }
}

// ─── Car ─────────────────────────────────────────────────────────────────────

/// A car offered on the marketplace.
///
/// The owner is only changed through [`crate::Person::add_car`],
/// [`crate::Person::remove_car`] or [`Car::release`], so the back-reference
/// and the owner's collection cannot drift apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Car {
  id:        Uuid,
  maker:     String,
  model:     String,
  /// Year of first registration.
  year:      i32,
  price:     Decimal,
  image_url: Option<String>,
  owner:     Owner,
}

impl Car {
  /// A new unowned car without an image.
  pub fn new(
    id: Uuid,
    maker: impl Into<String>,
    model: impl Into<String>,
    year: i32,
    price: Decimal,
  ) -> Self {
    Self {
      id,
      maker: maker.into(),
      model: model.into(),
      year,
      price,
      image_url: None,
      owner: Owner::Unowned,
    }
  }

  pub fn with_image_url(mut self, image_url: Option<String>) -> Self {
    self.image_url = image_url;
    self
  }

  /// Rehydrate the owner column of a stored or transferred car.
  pub fn with_owner(mut self, owner: Owner) -> Self {
    self.owner = owner;
    self
  }

  pub fn maker(&self) -> &str { &self.maker }

  pub fn model(&self) -> &str { &self.model }

  pub fn year(&self) -> i32 { self.year }

  pub fn price(&self) -> Decimal { self.price }

  pub fn image_url(&self) -> Option<&str> { self.image_url.as_deref() }

  pub fn owner(&self) -> Owner { self.owner }

  /// Partial update: every field is overwritten only when a value is given.
  pub fn update(
    &mut self,
    maker: Option<String>,
    model: Option<String>,
    year: Option<i32>,
    price: Option<Decimal>,
  ) {
    if let Some(maker) = maker {
      self.maker = maker;
    }
    if let Some(model) = model {
      self.model = model;
    }
    if let Some(year) = year {
      self.year = year;
    }
    if let Some(price) = price {
      self.price = price;
    }
  }

  pub fn set_image_url(&mut self, image_url: impl Into<String>) {
    self.image_url = Some(image_url.into());
  }

  /// Detach the car from whoever owns it.
  pub fn release(&mut self) { self.owner = Owner::Unowned; }

  pub(crate) fn set_owner(&mut self, owner: Owner) { self.owner = owner; }
}

impl Entity for Car {
  const KIND: EntityKind = EntityKind::Car;

  fn id(&self) -> Uuid { self.id }
}
