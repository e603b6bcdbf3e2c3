// app/src/web/handlers/checkout_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::instrument;

use crate::checkout::{self, Cart};
use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[derive(Deserialize, Debug)]
pub struct CheckoutRequestPayload {
  #[serde(default)]
  pub items: Cart,
  #[serde(default)]
  pub address: String,
}

#[instrument(name = "handler::checkout", skip_all, fields(user_id = %auth_user.user_id))]
pub async fn checkout_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  req_payload: web::Json<CheckoutRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let confirmation = checkout::checkout(app_state.get_ref(), auth_user.user_id, payload.items, payload.address).await?;
  Ok(HttpResponse::Ok().json(confirmation))
}
