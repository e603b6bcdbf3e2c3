// app/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use anyhow::Context;
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;

use storefront::config::{AppConfig, StorageBackend};
use storefront::state::AppState;
use storefront::store::{seed, CommerceStore, MemoryStore, PgStore};
use storefront::{telemetry, web};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  let app_config = Arc::new(AppConfig::from_env().context("loading configuration")?);
  telemetry::init_tracing(app_config.log_format);
  tracing::info!(backend = ?app_config.storage, "Starting storefront server...");

  let store: Arc<dyn CommerceStore> = match app_config.storage {
    StorageBackend::Postgres => {
      let url = app_config
        .database_url
        .as_ref()
        .context("DATABASE_URL is required for the postgres backend")?;
      let pool = PgPoolOptions::new()
        .max_connections(app_config.db_max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(url.expose_secret())
        .await
        .context("connecting to the database")?;
      tracing::info!("Connected to the database.");
      Arc::new(PgStore::new(pool))
    }
    StorageBackend::Memory => {
      tracing::warn!("Using the in-memory store; data is lost on restart.");
      Arc::new(MemoryStore::new())
    }
  };

  if app_config.seed_db {
    seed::seed_catalog(store.as_ref()).await.context("seeding the catalog")?;
  }

  let app_state = AppState::new(store, Arc::clone(&app_config));

  let server_address = app_config.bind_address();
  tracing::info!("Binding server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(web::configure_app_routes)
  })
  .bind(&server_address)
  .with_context(|| format!("binding {server_address}"))?
  .run()
  .await?;

  Ok(())
}
