// app/src/models/user.rs

use super::UserId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
  pub id: UserId,
  pub first_name: String,
  pub last_name: String,
  pub email: String,
  #[serde(skip_serializing)] // Never send the hash to a client
  pub password_hash: String,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
  pub first_name: String,
  pub last_name: String,
  pub email: String,
  pub password_hash: String,
}
