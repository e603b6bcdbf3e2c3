// app/src/pipelines/signin_pipeline.rs

use crate::errors::AppError;
use crate::pipelines::contexts::SigninCtxData;
use crate::services::{password, token};
use orderflow::{ContextData, Pipeline, PipelineControl, Registry};
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::{event, info, warn, Level};

/// Unknown email and wrong password must be indistinguishable to the caller.
fn bad_credentials() -> AppError {
  AppError::Auth("Invalid email or password.".to_string())
}

pub fn register_signin_pipeline(registry: &Registry<AppError>) {
  let mut p = Pipeline::<SigninCtxData, AppError>::new(&[
    ("validate_signin_input", false, None),
    ("fetch_user", false, None),
    ("verify_password", false, None),
    ("issue_token", false, None),
  ]);

  p.on("validate_signin_input", |ctx_data: ContextData<SigninCtxData>| async move {
    ctx_data.update(|c| c.email = c.email.trim().to_lowercase());
    let (email_ok, password_given) =
      ctx_data.with(|c| (c.email.contains('@'), !c.password.expose_secret().is_empty()));
    if !email_ok || !password_given {
      return Err(AppError::Validation("Email and password are required.".to_string()));
    }
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  p.on("fetch_user", |ctx_data: ContextData<SigninCtxData>| async move {
    let (store, email) = ctx_data.with(|c| (Arc::clone(&c.app_state.store), c.email.clone()));
    let Some(user) = store.user_by_email(&email).await? else {
      event!(Level::INFO, %email, "Signin for unknown email.");
      return Err(bad_credentials());
    };
    ctx_data.write().user = Some(user);
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  p.on("verify_password", |ctx_data: ContextData<SigninCtxData>| async move {
    let matches = ctx_data.with(|c| match &c.user {
      Some(user) => password::verify_password(&user.password_hash, c.password.expose_secret()),
      None => Err(bad_credentials()),
    })?;
    if !matches {
      warn!("Signin with wrong password.");
      return Err(bad_credentials());
    }
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  p.on("issue_token", |ctx_data: ContextData<SigninCtxData>| async move {
    let issued = ctx_data.with(|c| match &c.user {
      Some(user) => token::issue_token(&c.app_state.config.auth, user.id).map(|t| (user.id, t)),
      None => Err(bad_credentials()),
    })?;
    let (user_id, session_token) = issued;
    info!(%user_id, "Signin successful.");
    ctx_data.write().token = Some(session_token);
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  registry.register_pipeline(p);
}
