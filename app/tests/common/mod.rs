// tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use storefront::config::AppConfig;
use storefront::models::{NewProduct, NewUser, Product, ProductId, User, UserId};
use storefront::state::AppState;
use storefront::store::{CatalogReader, CheckoutTx, CommerceStore, MemoryStore, StoreError, StoreResult, UserStore};
use tracing::Level;

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

pub const TEST_SECRET: &str = "test-signing-secret";

pub fn test_config(checkout_timeout_ms: u64) -> AppConfig {
  let timeout = checkout_timeout_ms.to_string();
  AppConfig::from_lookup(move |key| match key {
    "STORAGE_BACKEND" => Some("memory".to_string()),
    "JWT_SECRET" => Some(TEST_SECRET.to_string()),
    "CHECKOUT_TIMEOUT_MS" => Some(timeout.clone()),
    _ => None,
  })
  .expect("test config is valid")
}

/// State over a fresh in-memory store; the store handle is returned for
/// seeding, fault injection and inspection.
pub fn memory_state() -> (AppState, MemoryStore) {
  memory_state_with_timeout(2_000)
}

pub fn memory_state_with_timeout(checkout_timeout_ms: u64) -> (AppState, MemoryStore) {
  setup_tracing();
  let store = MemoryStore::new();
  let state = AppState::new(Arc::new(store.clone()), Arc::new(test_config(checkout_timeout_ms)));
  (state, store)
}

pub fn dec(s: &str) -> Decimal {
  Decimal::from_str(s).expect("valid decimal literal")
}

pub async fn add_product(store: &dyn CommerceStore, name: &str, price: &str, quantity: i32) -> Product {
  store
    .add_product(NewProduct::new(name, dec(price), quantity))
    .await
    .expect("product inserted")
}

pub async fn add_user(store: &dyn UserStore, email: &str) -> User {
  store
    .create_user(NewUser {
      first_name: "Test".to_string(),
      last_name: "Buyer".to_string(),
      email: email.to_string(),
      password_hash: "unused".to_string(),
    })
    .await
    .expect("user inserted")
}

pub async fn stock_of(store: &dyn CommerceStore, product: &Product) -> i32 {
  store
    .product_by_id(product.id)
    .await
    .expect("lookup works")
    .expect("product exists")
    .quantity
}

/// Detail carried by the failing batch read; it must never reach a client.
pub const LOOKUP_FAILURE_DETAIL: &str = "connection reset by db-primary-7:5432";

/// Delegates to a `MemoryStore` except for `products_by_ids`, which always
/// fails the way a dropped database connection would.
#[derive(Clone)]
pub struct UnreadableCatalog {
  pub inner: MemoryStore,
}

#[async_trait]
impl CatalogReader for UnreadableCatalog {
  async fn list_products(&self) -> StoreResult<Vec<Product>> {
    self.inner.list_products().await
  }

  async fn products_by_ids(&self, _ids: &[ProductId]) -> StoreResult<Vec<Product>> {
    Err(StoreError::Backend(LOOKUP_FAILURE_DETAIL.to_string()))
  }

  async fn product_by_id(&self, id: ProductId) -> StoreResult<Option<Product>> {
    self.inner.product_by_id(id).await
  }
}

#[async_trait]
impl UserStore for UnreadableCatalog {
  async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
    self.inner.user_by_email(email).await
  }

  async fn user_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
    self.inner.user_by_id(id).await
  }

  async fn create_user(&self, user: NewUser) -> StoreResult<User> {
    self.inner.create_user(user).await
  }
}

#[async_trait]
impl CommerceStore for UnreadableCatalog {
  async fn begin_checkout(&self) -> StoreResult<Box<dyn CheckoutTx>> {
    self.inner.begin_checkout().await
  }

  async fn add_product(&self, product: NewProduct) -> StoreResult<Product> {
    self.inner.add_product(product).await
  }

  async fn ping(&self) -> StoreResult<()> {
    self.inner.ping().await
  }
}

/// State whose catalog batch reads fail, plus the backing store for
/// seeding and inspection.
pub fn unreadable_catalog_state() -> (AppState, MemoryStore) {
  setup_tracing();
  let store = MemoryStore::new();
  let wrapper = UnreadableCatalog { inner: store.clone() };
  let state = AppState::new(Arc::new(wrapper), Arc::new(test_config(2_000)));
  (state, store)
}
