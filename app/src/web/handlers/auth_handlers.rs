// app/src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::pipelines::contexts::{SigninCtxData, SignupCtxData};
use crate::state::AppState;
use orderflow::{ContextData, PipelineResult};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequestPayload {
  #[serde(alias = "first_name")]
  pub first_name: String,
  #[serde(alias = "last_name", alias = "LastName")]
  pub last_name: String,
  pub email: String,
  pub password: SecretString,
}

#[derive(Deserialize)]
pub struct LoginRequestPayload {
  pub email: String,
  pub password: SecretString,
}

#[instrument(name = "handler::register", skip_all, fields(req_email = %req_payload.email))]
pub async fn register_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<RegisterRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let ctx = ContextData::new(SignupCtxData {
    app_state: app_state.get_ref().clone(),
    first_name: payload.first_name,
    last_name: payload.last_name,
    email: payload.email,
    password: payload.password,
    password_hash: None,
    created_user_id: None,
  });

  match app_state.flows.run(ctx.clone()).await? {
    PipelineResult::Completed => {
      let user_id = ctx.with(|c| c.created_user_id).ok_or_else(|| {
        warn!("Signup pipeline completed without a user id.");
        AppError::Internal("Signup completed without creating a user.".to_string())
      })?;
      info!(%user_id, "Registration complete.");
      Ok(HttpResponse::Created().json(json!({
        "message": "User created successfully.",
        "userId": user_id,
      })))
    }
    PipelineResult::Stopped => Err(AppError::PipelineHaltedByHandler),
  }
}

#[instrument(name = "handler::login", skip_all, fields(req_email = %req_payload.email))]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<LoginRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let ctx = ContextData::new(SigninCtxData {
    app_state: app_state.get_ref().clone(),
    email: payload.email,
    password: payload.password,
    user: None,
    token: None,
  });

  match app_state.flows.run(ctx.clone()).await? {
    PipelineResult::Completed => {
      let token = ctx
        .with(|c| c.token.clone())
        .ok_or_else(|| AppError::Internal("Signin completed without a token.".to_string()))?;
      Ok(HttpResponse::Ok().json(json!({ "token": token })))
    }
    PipelineResult::Stopped => Err(AppError::PipelineHaltedByHandler),
  }
}
