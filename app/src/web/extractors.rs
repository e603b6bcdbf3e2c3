// app/src/web/extractors.rs

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::errors::AppError;
use crate::models::UserId;
use crate::services::token;
use crate::state::AppState;

/// The caller identified by the request's bearer token.
///
/// The token must verify and its user must still exist.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
  pub user_id: UserId,
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let state = req.app_data::<web::Data<AppState>>().cloned();
    let header = req
      .headers()
      .get(AUTHORIZATION)
      .and_then(|v| v.to_str().ok())
      .map(str::to_owned);

    Box::pin(async move {
      let state = state.ok_or_else(|| AppError::Internal("Application state is not configured.".to_string()))?;
      let Some(header) = header else {
        warn!("Request without an Authorization header.");
        return Err(AppError::Auth("Missing Authorization header.".to_string()));
      };

      let user_id = token::verify_token(&state.config.auth, token::bearer_token(&header))?;
      match state.store.user_by_id(user_id).await? {
        Some(user) => Ok(AuthenticatedUser { user_id: user.id }),
        None => {
          warn!(%user_id, "Token for a user that no longer exists.");
          Err(AppError::Auth("Invalid or expired token.".to_string()))
        }
      }
    })
  }
}
