//! Image attachment contract and media-type helpers.
//!
//! Images live on disk, not in the database; a car only stores the URL.

use std::{future::Future, path::Path};

use crate::{Error, Result};

/// Supported media types and their canonical file extensions.
pub const MEDIA_TYPES: &[(&str, &str)] = &[
  ("image/jpeg", "jpg"),
  ("image/png", "png"),
  ("image/gif", "gif"),
  ("image/bmp", "bmp"),
  ("image/tiff", "tiff"),
  ("image/webp", "webp"),
];

/// Canonical extension for `media_type`, ignoring any parameters.
pub fn extension_for(media_type: &str) -> Option<&'static str> {
  let essence = media_type.split(';').next()?.trim();
  MEDIA_TYPES
    .iter()
    .find(|(mt, _)| mt.eq_ignore_ascii_case(essence))
    .map(|(_, ext)| *ext)
}

/// Media type for a file extension (with or without the leading dot).
pub fn media_type_for(extension: &str) -> Option<&'static str> {
  let ext = extension.trim_start_matches('.');
  let ext = if ext.eq_ignore_ascii_case("jpeg") { "jpg" } else { ext };
  MEDIA_TYPES
    .iter()
    .find(|(_, e)| e.eq_ignore_ascii_case(ext))
    .map(|(mt, _)| *mt)
}

/// Accept only a bare file name: no separators, no parent references and no
/// percent escapes.
pub fn validate_file_name(name: &str) -> Result<&str> {
  let invalid = name.is_empty()
    || name.contains(['/', '\\'])
    || name == "."
    || name.contains("..")
    || is_percent_encoded(name);
  if invalid {
    Err(Error::InvalidFileName(name.to_owned()))
  } else {
    Ok(name)
  }
}

fn is_percent_encoded(name: &str) -> bool {
  name
    .as_bytes()
    .windows(3)
    .any(|w| w[0] == b'%' && w[1].is_ascii_hexdigit() && w[2].is_ascii_hexdigit())
}

/// An image read back from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
  pub bytes:        Vec<u8>,
  pub content_type: String,
  pub file_name:    String,
}

/// Storage for uploaded images.
pub trait ImageStore: Send + Sync {
  /// Read the file at `path` and pair it with `content_type`.
  fn load_image_file<'a>(
    &'a self,
    path: &'a Path,
    content_type: &'a str,
  ) -> impl Future<Output = Result<ImageFile>> + Send + 'a;

  /// Write `bytes` below `root` under a generated file name with
  /// `extension`. Returns `None` when there is nothing to store.
  fn store_image_file<'a>(
    &'a self,
    root: &'a Path,
    bytes: &'a [u8],
    extension: &'a str,
  ) -> impl Future<Output = Result<Option<String>>> + Send + 'a;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn extension_lookup_ignores_parameters_and_case() {
    assert_eq!(extension_for("image/png"), Some("png"));
    assert_eq!(extension_for("IMAGE/JPEG; charset=binary"), Some("jpg"));
    assert_eq!(extension_for("text/plain"), None);
  }

  #[test]
  fn media_type_lookup() {
    assert_eq!(media_type_for(".webp"), Some("image/webp"));
    assert_eq!(media_type_for("jpeg"), Some("image/jpeg"));
    assert_eq!(media_type_for("exe"), None);
  }

  #[test]
  fn file_name_validation() {
    assert!(validate_file_name("abc.png").is_ok());
    assert!(validate_file_name("").is_err());
    assert!(validate_file_name("../secret").is_err());
    assert!(validate_file_name("a/b.png").is_err());
    assert!(validate_file_name("a%2Fb.png").is_err());
    assert!(validate_file_name("100%.png").is_ok());
  }
}
