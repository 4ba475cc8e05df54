//! Error types for `carshop-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// The identifier in the request path and the one in the payload differ.
  #[error("id in the path ({path}) and in the body ({body}) do not match")]
  IdMismatch { path: Uuid, body: Uuid },

  #[error("unsupported media type: {0}")]
  UnsupportedMediaType(String),

  #[error("invalid image file name: {0:?}")]
  InvalidFileName(String),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Reject a payload whose identifier disagrees with the path identifier.
pub fn ensure_same_id(path: Uuid, body: Uuid) -> Result<()> {
  if path == body {
    Ok(())
  } else {
    Err(Error::IdMismatch { path, body })
  }
}
