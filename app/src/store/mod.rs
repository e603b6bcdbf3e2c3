// app/src/store/mod.rs

//! Storage capabilities used by the checkout and auth workflows.
//!
//! Reads go through [`CommerceStore`]. Every write that checkout performs goes
//! through a [`CheckoutTx`] obtained from `begin_checkout`, so inventory and
//! order records are committed together or not at all.

pub mod memory;
pub mod postgres;
pub mod seed;

pub use memory::{FailPoint, MemoryStore};
pub use postgres::PgStore;

use crate::models::{
  is_storable_money, NewOrder, NewOrderItem, NewProduct, NewUser, Order, OrderItem, Product, ProductId, User, UserId,
  MONEY_SCALE,
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("{0}")]
  Conflict(String),

  #[error("quantity of product {product_id} cannot be set to {quantity}")]
  NegativeQuantity { product_id: ProductId, quantity: i32 },

  #[error("price of product {product_id} must be between 0 and 9999999999.99 with at most {MONEY_SCALE} decimal places, got {price}")]
  InvalidPrice { product_id: ProductId, price: Decimal },

  #[error("storage operation timed out")]
  Timeout,

  #[error("storage backend error: {0}")]
  Backend(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Rules every backend applies before inserting `product` under `product_id`.
pub(crate) fn validate_new_product(product_id: ProductId, product: &NewProduct) -> StoreResult<()> {
  if product.quantity < 0 {
    return Err(StoreError::NegativeQuantity {
      product_id,
      quantity: product.quantity,
    });
  }
  if !is_storable_money(product.price) {
    return Err(StoreError::InvalidPrice {
      product_id,
      price: product.price,
    });
  }
  Ok(())
}

/// Result of a guarded `quantity = quantity - amount` update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecrementOutcome {
  Applied { remaining: i32 },
  /// The guard failed; `available` is the live quantity at that moment.
  Insufficient { available: i32 },
  Missing,
}

#[async_trait]
pub trait CatalogReader: Send + Sync {
  async fn list_products(&self) -> StoreResult<Vec<Product>>;

  /// Ids with no matching product are simply absent from the result.
  async fn products_by_ids(&self, ids: &[ProductId]) -> StoreResult<Vec<Product>>;

  async fn product_by_id(&self, id: ProductId) -> StoreResult<Option<Product>>;
}

#[async_trait]
pub trait CatalogWriter: Send {
  /// Fails with `NegativeQuantity` for values below zero.
  async fn update_product_quantity(&mut self, id: ProductId, quantity: i32) -> StoreResult<()>;

  /// Subtracts `amount` only when at least `amount` is in stock.
  async fn decrement_quantity(&mut self, id: ProductId, amount: i32) -> StoreResult<DecrementOutcome>;
}

#[async_trait]
pub trait OrderWriter: Send {
  async fn create_order(&mut self, order: NewOrder) -> StoreResult<Order>;

  async fn create_order_item(&mut self, item: NewOrderItem) -> StoreResult<OrderItem>;
}

/// A unit of work over catalog and order writes.
///
/// Dropping a handle without calling `commit` discards everything it wrote.
#[async_trait]
pub trait CheckoutTx: CatalogWriter + OrderWriter {
  async fn commit(self: Box<Self>) -> StoreResult<()>;

  async fn rollback(self: Box<Self>) -> StoreResult<()>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
  async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

  async fn user_by_id(&self, id: UserId) -> StoreResult<Option<User>>;

  /// Fails with `Conflict` when the email is already registered.
  async fn create_user(&self, user: NewUser) -> StoreResult<User>;
}

#[async_trait]
pub trait CommerceStore: CatalogReader + UserStore {
  async fn begin_checkout(&self) -> StoreResult<Box<dyn CheckoutTx>>;

  /// Fails with `NegativeQuantity` or `InvalidPrice` before anything is written.
  async fn add_product(&self, product: NewProduct) -> StoreResult<Product>;

  async fn ping(&self) -> StoreResult<()>;
}
