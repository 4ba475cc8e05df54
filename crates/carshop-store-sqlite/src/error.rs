//! Error type for `carshop-store-sqlite`.

use carshop_core::{
  EntityKind,
  store::{Failure, StoreError},
};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] carshop_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("decimal parse error: {0}")]
  Decimal(#[from] rust_decimal::Error),

  /// An insert hit the primary key of an existing row.
  #[error("{kind} {id} already exists")]
  Conflict { kind: EntityKind, id: Uuid },

  /// An update or delete matched no row.
  #[error("{kind} {id} not found")]
  TargetMissing { kind: EntityKind, id: Uuid },

  /// A car references a person that does not exist.
  #[error("owner {0} not found")]
  OwnerMissing(Uuid),
}

impl StoreError for Error {
  fn failure(&self) -> Failure {
    match self {
      Error::Conflict { .. } => Failure::Conflict,
      Error::TargetMissing { .. } => Failure::TargetMissing,
      Error::OwnerMissing(_) => Failure::OwnerMissing,
      _ => Failure::Other,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
