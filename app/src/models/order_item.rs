// app/src/models/order_item.rs

use super::{OrderId, OrderItemId, ProductId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

/// One purchased line. `price` is the unit price at the time of purchase and
/// does not follow later catalog changes.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct OrderItem {
  pub id: OrderItemId,
  pub order_id: OrderId,
  pub product_id: ProductId,
  pub quantity: i32,
  pub price: Decimal,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewOrderItem {
  pub order_id: OrderId,
  pub product_id: ProductId,
  pub quantity: i32,
  pub price: Decimal,
}
