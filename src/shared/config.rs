use std::env;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Missing required environment variable {0}")]
  Missing(&'static str),
  #[error("Invalid value for environment variable {0}: {1}")]
  Invalid(&'static str, String),
}

#[derive(Clone, Debug)]
pub struct Config {
  pub host: String,
  pub port: u16,
  pub mongo_uri: String,
  pub database_name: String,
  pub jwt_secret: String,
  pub uploads_dir: PathBuf,
  pub hash_threads: usize,
}

impl Config {
  /// Reads the process environment once at start-up. `MONGO_URI` and
  /// `SECRET` have no fallback.
  pub fn from_env() -> Result<Self, ConfigError> {
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = parse_or("PORT", 3000)?;
    let mongo_uri = required("MONGO_URI")?;
    let database_name =
      env::var("DATABASE_NAME").unwrap_or_else(|_| "storefront".to_string());
    let jwt_secret = required("SECRET")?;
    let uploads_dir = env::var("UPLOADS_DIR")
      .map(PathBuf::from)
      .unwrap_or_else(|_| PathBuf::from("uploads"));
    let hash_threads = parse_or("HASH_THREADS", 4)?;
    Ok(Self {
      host,
      port,
      mongo_uri,
      database_name,
      jwt_secret,
      uploads_dir,
      hash_threads,
    })
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.host, self.port)
  }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
  match env::var(name) {
    Ok(value) if !value.trim().is_empty() => Ok(value),
    _ => Err(ConfigError::Missing(name)),
  }
}

fn parse_or<T: std::str::FromStr>(
  name: &'static str,
  default: T,
) -> Result<T, ConfigError> {
  match env::var(name) {
    Ok(value) => value
      .trim()
      .parse()
      .map_err(|_| ConfigError::Invalid(name, value)),
    Err(_) => Ok(default),
  }
}
