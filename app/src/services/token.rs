// app/src/services/token.rs

//! HS256 JSON Web Tokens carrying the user id and an expiry.
//!
//! Claims are `{"userID": "<uuid>", "expiredAt": <unix seconds>}`.

use crate::config::AuthConfig;
use crate::errors::AppError;
use crate::models::UserId;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{debug, instrument, warn};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Serialize, Deserialize)]
struct Header {
  alg: String,
  typ: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
  #[serde(rename = "userID")]
  pub user_id: UserId,
  #[serde(rename = "expiredAt")]
  pub expired_at: i64,
}

fn invalid() -> AppError {
  AppError::Auth("Invalid or expired token.".to_string())
}

fn encode_part<T: Serialize>(value: &T) -> Result<String, AppError> {
  let bytes = serde_json::to_vec(value).map_err(|e| AppError::Internal(format!("Token encoding failed: {e}")))?;
  Ok(URL_SAFE_NO_PAD.encode(bytes))
}

fn mac_for(auth: &AuthConfig) -> Result<HmacSha256, AppError> {
  HmacSha256::new_from_slice(auth.jwt_secret.expose_secret().as_bytes())
    .map_err(|e| AppError::Config(format!("Unusable JWT secret: {e}")))
}

pub fn issue_token(auth: &AuthConfig, user_id: UserId) -> Result<String, AppError> {
  issue_token_at(auth, user_id, Utc::now())
}

#[instrument(name = "token::issue", skip(auth), err(Display))]
pub fn issue_token_at(auth: &AuthConfig, user_id: UserId, now: DateTime<Utc>) -> Result<String, AppError> {
  let ttl = i64::try_from(auth.token_ttl.as_secs()).map_err(|_| AppError::Config("JWT_EXP is too large".to_string()))?;
  let claims = Claims {
    user_id,
    expired_at: now.timestamp().saturating_add(ttl),
  };
  let header = Header {
    alg: "HS256".to_string(),
    typ: "JWT".to_string(),
  };

  let signing_input = format!("{}.{}", encode_part(&header)?, encode_part(&claims)?);

  let mut mac = mac_for(auth)?;
  mac.update(signing_input.as_bytes());
  let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
  debug!(expired_at = claims.expired_at, "Token issued.");
  Ok(format!("{signing_input}.{signature}"))
}

pub fn verify_token(auth: &AuthConfig, token: &str) -> Result<UserId, AppError> {
  verify_token_at(auth, token, Utc::now())
}

/// Checks signature, algorithm and expiry. Every failure is the same `Auth` error.
///
/// No segment is decoded until the signature over the first two has been
/// verified in constant time.
#[instrument(name = "token::verify", skip_all, err(Display))]
pub fn verify_token_at(auth: &AuthConfig, token: &str, now: DateTime<Utc>) -> Result<UserId, AppError> {
  let mut parts = token.split('.');
  let (Some(header_b64), Some(claims_b64), Some(sig_b64), None) = (parts.next(), parts.next(), parts.next(), parts.next())
  else {
    warn!("Malformed token.");
    return Err(invalid());
  };

  let signature = URL_SAFE_NO_PAD.decode(sig_b64).map_err(|_| invalid())?;
  let mut mac = mac_for(auth)?;
  mac.update(header_b64.as_bytes());
  mac.update(b".");
  mac.update(claims_b64.as_bytes());
  if mac.verify_slice(&signature).is_err() {
    warn!("Token signature mismatch.");
    return Err(invalid());
  }

  let header: Header = decode_part(header_b64)?;
  if header.alg != "HS256" || header.typ != "JWT" {
    warn!(alg = %header.alg, typ = %header.typ, "Unexpected token header.");
    return Err(invalid());
  }

  let claims: Claims = decode_part(claims_b64)?;
  if claims.expired_at <= now.timestamp() {
    debug!(expired_at = claims.expired_at, "Token expired.");
    return Err(invalid());
  }
  Ok(claims.user_id)
}

fn decode_part<T: for<'de> Deserialize<'de>>(part: &str) -> Result<T, AppError> {
  let bytes = URL_SAFE_NO_PAD.decode(part).map_err(|_| invalid())?;
  serde_json::from_slice(&bytes).map_err(|_| invalid())
}

/// Strips an optional `Bearer ` prefix from an `Authorization` header value.
pub fn bearer_token(header_value: &str) -> &str {
  let trimmed = header_value.trim();
  match trimmed.split_once(' ') {
    Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
    _ => trimmed,
  }
}
