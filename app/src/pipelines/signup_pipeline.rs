// app/src/pipelines/signup_pipeline.rs

use crate::errors::AppError;
use crate::models::NewUser;
use crate::pipelines::contexts::SignupCtxData;
use crate::services::password;
use orderflow::{ContextData, Pipeline, PipelineControl, Registry};
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::{event, info, warn, Level};

pub const PASSWORD_MIN_CHARS: usize = 3;
pub const PASSWORD_MAX_CHARS: usize = 130;

/// Registers the account registration pipeline.
pub fn register_signup_pipeline(registry: &Registry<AppError>) {
  let mut signup_p = Pipeline::<SignupCtxData, AppError>::new(&[
    ("validate_signup_input", false, None),
    ("ensure_email_unused", false, None),
    ("hash_user_password", false, None),
    ("create_user", false, None),
  ]);

  signup_p.on("validate_signup_input", |ctx_data: ContextData<SignupCtxData>| async move {
    ctx_data.update(|c| {
      c.first_name = c.first_name.trim().to_string();
      c.last_name = c.last_name.trim().to_string();
      c.email = c.email.trim().to_lowercase();
    });
    let (first_blank, last_blank, email, password_chars) = ctx_data.with(|c| {
      (
        c.first_name.is_empty(),
        c.last_name.is_empty(),
        c.email.clone(),
        c.password.expose_secret().chars().count(),
      )
    });

    event!(Level::DEBUG, %email, "Validating signup input.");
    if first_blank || last_blank {
      return Err(AppError::Validation("First and last name are required.".to_string()));
    }
    if !email.contains('@') {
      return Err(AppError::Validation("A valid email is required.".to_string()));
    }
    if !(PASSWORD_MIN_CHARS..=PASSWORD_MAX_CHARS).contains(&password_chars) {
      warn!(password_chars, "Rejected signup password length.");
      return Err(AppError::Validation(format!(
        "Password must be between {PASSWORD_MIN_CHARS} and {PASSWORD_MAX_CHARS} characters."
      )));
    }
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  signup_p.on("ensure_email_unused", |ctx_data: ContextData<SignupCtxData>| async move {
    let (store, email) = ctx_data.with(|c| (Arc::clone(&c.app_state.store), c.email.clone()));
    if store.user_by_email(&email).await?.is_some() {
      warn!(%email, "Signup with an existing email.");
      return Err(AppError::Conflict("An account with this email already exists.".to_string()));
    }
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  signup_p.on("hash_user_password", |ctx_data: ContextData<SignupCtxData>| async move {
    let hash = ctx_data.with(|c| password::hash_password(c.password.expose_secret()))?;
    ctx_data.write().password_hash = Some(hash);
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  signup_p.on("create_user", |ctx_data: ContextData<SignupCtxData>| async move {
    let (store, new_user) = ctx_data.with(|c| {
      let new_user = c.password_hash.clone().map(|password_hash| NewUser {
        first_name: c.first_name.clone(),
        last_name: c.last_name.clone(),
        email: c.email.clone(),
        password_hash,
      });
      (Arc::clone(&c.app_state.store), new_user)
    });
    let new_user = new_user.ok_or_else(|| AppError::Internal("Password was not hashed before user creation.".to_string()))?;

    // A concurrent signup can still win the race; the store reports that as a conflict.
    let user = store.create_user(new_user).await.map_err(|e| match e {
      crate::store::StoreError::Conflict(m) => AppError::Conflict(m),
      other => AppError::Store(other),
    })?;
    info!(user_id = %user.id, "User created.");
    ctx_data.write().created_user_id = Some(user.id);
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  registry.register_pipeline(signup_p);
}
