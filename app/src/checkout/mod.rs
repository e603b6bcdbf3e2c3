// app/src/checkout/mod.rs

//! Cart-to-order checkout.
//!
//! The pure pieces (cart aggregation, stock checks, pricing) live here; the
//! ordered workflow that ties them to storage is the checkout pipeline in
//! `crate::pipelines::checkout_pipeline`.

pub mod cart;
pub mod ledger;
pub mod pricing;

pub use cart::{Cart, CartItem};
pub use pricing::PricedLine;

use crate::errors::AppError;
use crate::models::{OrderId, Product, ProductId, UserId};
use crate::pipelines::contexts::CheckoutCtxData;
use crate::state::AppState;
use crate::store::StoreError;
use orderflow::{ContextData, PipelineResult};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{info, instrument, warn};

/// Product snapshots keyed by id, as read at the start of a checkout.
pub type Snapshots = BTreeMap<ProductId, Product>;

#[derive(Debug, Error)]
pub enum CheckoutError {
  #[error("invalid input: {0}")]
  InvalidInput(String),

  #[error("product {0} is not available")]
  ProductUnavailable(ProductId),

  #[error("insufficient stock for {name}: requested {requested}, available {available}")]
  InsufficientStock {
    product_id: ProductId,
    name: String,
    requested: i32,
    available: i32,
  },

  #[error("product lookup failed: {0}")]
  LookupFailure(#[source] StoreError),

  #[error("order could not be persisted: {0}")]
  PersistenceFailure(#[source] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckoutConfirmation {
  pub order_id: OrderId,
  #[serde(rename = "total_price")]
  pub total: Decimal,
}

/// Turns `cart` into a pending order owned by `user_id`.
///
/// Either the inventory decrements, the order and all of its items are
/// committed together, or nothing is.
#[instrument(name = "checkout", skip_all, fields(%user_id, lines = cart.len()), err(Display))]
pub async fn checkout(state: &AppState, user_id: UserId, cart: Cart, address: String) -> Result<CheckoutConfirmation, AppError> {
  let ctx = ContextData::new(CheckoutCtxData::new(state.clone(), user_id, cart, address));

  match state.flows.run(ctx.clone()).await? {
    PipelineResult::Completed => {
      let (order_id, total) = ctx.with(|c| (c.order_id, c.total));
      let order_id = order_id.ok_or_else(|| {
        warn!("Checkout pipeline completed without recording an order id.");
        AppError::Internal("Checkout completed without an order.".to_string())
      })?;
      info!(%order_id, %total, "Checkout committed.");
      Ok(CheckoutConfirmation { order_id, total })
    }
    PipelineResult::Stopped => {
      warn!("Checkout pipeline was stopped by a handler.");
      Err(AppError::PipelineHaltedByHandler)
    }
  }
}
