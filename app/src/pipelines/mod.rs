// app/src/pipelines/mod.rs

//! Pipelines for the storefront workflows, one per context type.

use crate::errors::AppError;
use orderflow::Registry;

pub mod contexts;

pub mod checkout_pipeline;
pub mod signin_pipeline;
pub mod signup_pipeline;

/// Registers every application pipeline. Called once per `AppState`.
pub fn register_all_pipelines(registry: &Registry<AppError>) {
  signup_pipeline::register_signup_pipeline(registry);
  signin_pipeline::register_signin_pipeline(registry);
  checkout_pipeline::register_checkout_pipeline(registry);
  tracing::info!("All application pipelines registered.");
}
