//! The [`Entity`] trait shared by every persisted aggregate.

use std::fmt;

use uuid::Uuid;

/// Discriminant naming a persisted entity type. Used in diagnostics and in
/// staged [`crate::session::Change`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
  Person,
  Car,
}

impl EntityKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Person => "person",
      Self::Car => "car",
    }
  }
}

impl fmt::Display for EntityKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A persisted value identified by a caller-supplied UUID that never changes.
pub trait Entity: Clone + Send + Sync + 'static {
  const KIND: EntityKind;

  fn id(&self) -> Uuid;
}
