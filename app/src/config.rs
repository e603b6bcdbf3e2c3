// app/src/config.rs

use crate::errors::{AppError, Result};
use secrecy::SecretString;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
  Postgres,
  Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Pretty,
  Json,
}

/// What the token service needs: the signing secret and token lifetime.
#[derive(Debug, Clone)]
pub struct AuthConfig {
  pub jwt_secret: SecretString,
  pub token_ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub storage: StorageBackend,
  /// Present whenever `storage` is `Postgres`.
  pub database_url: Option<SecretString>,
  pub db_max_connections: u32,
  pub auth: AuthConfig,
  pub checkout_timeout: Duration,
  pub seed_db: bool,
  pub log_format: LogFormat,
}

impl AppConfig {
  /// Reads the process environment, after loading `.env` if one exists.
  pub fn from_env() -> Result<Self> {
    dotenvy::dotenv().ok();
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  /// Builds the config from any key lookup. Blank values count as unset.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    let require = |key: &str| get(key).ok_or_else(|| AppError::Config(format!("Missing environment variable '{key}'")));

    let server_host = get("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
    let server_port = parse_or(get("SERVER_PORT"), "SERVER_PORT", 8080u16)?;

    let storage = match get("STORAGE_BACKEND").as_deref().map(str::to_ascii_lowercase).as_deref() {
      None | Some("postgres") => StorageBackend::Postgres,
      Some("memory") => StorageBackend::Memory,
      Some(other) => {
        return Err(AppError::Config(format!(
          "Invalid STORAGE_BACKEND '{other}', expected 'postgres' or 'memory'"
        )))
      }
    };
    let database_url = match storage {
      StorageBackend::Postgres => Some(SecretString::from(require("DATABASE_URL")?)),
      StorageBackend::Memory => get("DATABASE_URL").map(SecretString::from),
    };
    let db_max_connections = parse_or(get("DB_MAX_CONNECTIONS"), "DB_MAX_CONNECTIONS", 10u32)?;
    if db_max_connections == 0 {
      return Err(AppError::Config("DB_MAX_CONNECTIONS must be at least 1".to_string()));
    }

    let jwt_secret = SecretString::from(require("JWT_SECRET")?);
    let token_ttl_secs = parse_or(get("JWT_EXP"), "JWT_EXP", 604_800u64)?;
    if token_ttl_secs == 0 {
      return Err(AppError::Config("JWT_EXP must be greater than zero".to_string()));
    }

    let checkout_timeout_ms = parse_or(get("CHECKOUT_TIMEOUT_MS"), "CHECKOUT_TIMEOUT_MS", 5_000u64)?;
    let seed_db = parse_or(get("SEED_DB"), "SEED_DB", false)?;

    let log_format = match get("LOG_FORMAT").as_deref().map(str::to_ascii_lowercase).as_deref() {
      None | Some("pretty") => LogFormat::Pretty,
      Some("json") => LogFormat::Json,
      Some(other) => {
        return Err(AppError::Config(format!(
          "Invalid LOG_FORMAT '{other}', expected 'pretty' or 'json'"
        )))
      }
    };

    Ok(Self {
      server_host,
      server_port,
      storage,
      database_url,
      db_max_connections,
      auth: AuthConfig {
        jwt_secret,
        token_ttl: Duration::from_secs(token_ttl_secs),
      },
      checkout_timeout: Duration::from_millis(checkout_timeout_ms),
      seed_db,
      log_format,
    })
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> Result<T>
where
  T: std::str::FromStr,
  T::Err: std::fmt::Display,
{
  match raw {
    None => Ok(default),
    Some(value) => value
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {key} value '{value}': {e}"))),
  }
}
