//! Image upload and download.
//!
//! Uploads take the raw request body; the `Content-Type` header picks the
//! file extension. Files are content-addressed, so uploading the same bytes
//! twice yields the same name.

use std::path::{Path, PathBuf};

use axum::{
  Json,
  extract::{Path as UrlPath, State},
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
};
use bytes::Bytes;
use carshop_core::{
  Result as CoreResult,
  images::{
    ImageFile, ImageStore, extension_for, media_type_for, validate_file_name,
  },
};
use serde::Serialize;
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::{AppState, BASE_PATH, created, error::ApiError};

const IMAGE_DIR: &str = "images";
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

// ─── Filesystem store ─────────────────────────────────────────────────────────

/// [`ImageStore`] backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsImageStore;

impl FsImageStore {
  /// Where `file_name` lives below `root`.
  pub fn path_of(root: &Path, file_name: &str) -> PathBuf {
    root.join(IMAGE_DIR).join(file_name)
  }
}

impl ImageStore for FsImageStore {
  async fn load_image_file(
    &self,
    path: &Path,
    content_type: &str,
  ) -> CoreResult<ImageFile> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_default();
    Ok(ImageFile {
      bytes,
      content_type: content_type.to_owned(),
      file_name,
    })
  }

  async fn store_image_file(
    &self,
    root: &Path,
    bytes: &[u8],
    extension: &str,
  ) -> CoreResult<Option<String>> {
    if bytes.is_empty() {
      return Ok(None);
    }

    let digest = hex::encode(Sha256::digest(bytes));
    let file_name = format!("{digest}.{extension}");

    tokio::fs::create_dir_all(root.join(IMAGE_DIR)).await?;
    tokio::fs::write(Self::path_of(root, &file_name), bytes).await?;

    tracing::info!(file = %file_name, size = bytes.len(), "stored image");
    Ok(Some(file_name))
  }
}

// ─── Handlers ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Uploaded {
  pub file_name: String,
  pub url:       String,
}

/// `POST /images`: raw body, `Content-Type` required.
pub async fn upload<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
  body: Bytes,
) -> Result<Response, ApiError>
where
  S: Send + Sync + Clone + 'static,
{
  let media_type = headers
    .get(header::CONTENT_TYPE)
    .and_then(|v| v.to_str().ok())
    .unwrap_or_default();
  let extension = extension_for(media_type).ok_or_else(|| {
    ApiError::from(carshop_core::Error::UnsupportedMediaType(
      media_type.to_owned(),
    ))
  })?;

  let file_name = state
    .images
    .store_image_file(&state.image_root, &body, extension)
    .await?
    .ok_or_else(|| ApiError::BadRequest("empty image".to_owned()))?;

  let path = format!("/images/{file_name}");
  let body = Uploaded {
    url: format!("{BASE_PATH}{path}"),
    file_name,
  };
  Ok(created(&path, Json(body)))
}

/// `GET /images/{filename}`
pub async fn download<S>(
  State(state): State<AppState<S>>,
  UrlPath(file_name): UrlPath<String>,
) -> Result<Response, ApiError>
where
  S: Send + Sync + Clone + 'static,
{
  let file_name = validate_file_name(&file_name)?;
  let content_type = Path::new(file_name)
    .extension()
    .and_then(|e| e.to_str())
    .and_then(media_type_for)
    .unwrap_or(FALLBACK_CONTENT_TYPE);

  let path = FsImageStore::path_of(&state.image_root, file_name);
  let file = state.images.load_image_file(&path, content_type).await?;

  Ok(([(header::CONTENT_TYPE, file.content_type)], file.bytes).into_response())
}

/// `GET /images/exists/{filename}`
pub async fn exists<S>(
  State(state): State<AppState<S>>,
  UrlPath(file_name): UrlPath<String>,
) -> Result<Response, ApiError>
where
  S: Send + Sync + Clone + 'static,
{
  let file_name = validate_file_name(&file_name)?;
  let path = FsImageStore::path_of(&state.image_root, file_name);
  let found = tokio::fs::try_exists(&path)
    .await
    .map_err(carshop_core::Error::from)?;

  let status = if found { StatusCode::OK } else { StatusCode::NOT_FOUND };
  Ok((status, Json(json!({ "exists": found }))).into_response())
}

/// `DELETE /images/{filename}`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  UrlPath(file_name): UrlPath<String>,
) -> Result<impl IntoResponse, ApiError>
where
  S: Send + Sync + Clone + 'static,
{
  let file_name = validate_file_name(&file_name)?;
  let path = FsImageStore::path_of(&state.image_root, file_name);
  tokio::fs::remove_file(&path)
    .await
    .map_err(carshop_core::Error::from)?;

  tracing::info!(file = %file_name, "deleted image");
  Ok(StatusCode::NO_CONTENT)
}
