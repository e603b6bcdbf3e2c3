// app/src/models/product.rs

use super::ProductId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

/// Decimal places kept by every money column (`NUMERIC(12, 2)`).
pub const MONEY_SCALE: u32 = 2;

/// Largest amount a money column can hold: 9,999,999,999.99.
pub fn max_money() -> Decimal {
  Decimal::new(999_999_999_999, MONEY_SCALE)
}

/// True when `amount` is non-negative and fits a money column without rounding.
pub fn is_storable_money(amount: Decimal) -> bool {
  !amount.is_sign_negative() && amount.normalize().scale() <= MONEY_SCALE && amount <= max_money()
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Product {
  pub id: ProductId,
  pub name: String,
  pub description: String,
  pub image: String,
  pub price: Decimal,
  pub quantity: i32,
  pub created_at: DateTime<Utc>,
}

/// A catalog entry before the store assigns its id and timestamp.
#[derive(Debug, Clone)]
pub struct NewProduct {
  pub name: String,
  pub description: String,
  pub image: String,
  pub price: Decimal,
  pub quantity: i32,
}

impl NewProduct {
  pub fn new(name: impl Into<String>, price: Decimal, quantity: i32) -> Self {
    Self {
      name: name.into(),
      description: String::new(),
      image: String::new(),
      price,
      quantity,
    }
  }

  pub fn into_product(self) -> Product {
    Product {
      id: ProductId::new(),
      name: self.name,
      description: self.description,
      image: self.image,
      price: self.price,
      quantity: self.quantity,
      created_at: Utc::now(),
    }
  }
}
