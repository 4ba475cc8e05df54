//! Server configuration: an optional TOML file overlaid with `CARSHOP_*`
//! environment variables.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Store path that selects an in-memory database.
pub const IN_MEMORY: &str = ":memory:";

/// Runtime server configuration. Every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  /// SQLite file, or `:memory:`.
  pub store_path: PathBuf,
  /// Uploaded images are written to `<image_root>/images/`.
  pub image_root: PathBuf,
  /// Insert the seed people and cars at startup.
  pub seed:       bool,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       "127.0.0.1".to_owned(),
      port:       8080,
      store_path: PathBuf::from("carshop.db"),
      image_root: PathBuf::from("."),
      seed:       false,
    }
  }
}

impl ServerConfig {
  /// Read `path` (if it exists) and the environment.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    let mut cfg: ServerConfig = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("CARSHOP").try_parsing(true))
      .build()?
      .try_deserialize()?;

    cfg.store_path = expand_tilde(&cfg.store_path);
    cfg.image_root = expand_tilde(&cfg.image_root);
    Ok(cfg)
  }

  pub fn in_memory(&self) -> bool { self.store_path == Path::new(IN_MEMORY) }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
