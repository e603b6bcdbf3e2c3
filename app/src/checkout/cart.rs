// app/src/checkout/cart.rs

use crate::models::ProductId;
use serde::Deserialize;

/// One requested line. Accepts `productID` or `product_id` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CartItem {
  #[serde(rename = "productID", alias = "product_id")]
  pub product_id: ProductId,
  pub quantity: i32,
}

impl CartItem {
  pub fn new(product_id: ProductId, quantity: i32) -> Self {
    Self { product_id, quantity }
  }
}

/// Requested lines in submission order. The same product may appear more than once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Cart(Vec<CartItem>);

impl Cart {
  pub fn new(items: Vec<CartItem>) -> Self {
    Self(items)
  }

  pub fn items(&self) -> &[CartItem] {
    &self.0
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

impl From<Vec<CartItem>> for Cart {
  fn from(items: Vec<CartItem>) -> Self {
    Self(items)
  }
}

impl FromIterator<CartItem> for Cart {
  fn from_iter<I: IntoIterator<Item = CartItem>>(iter: I) -> Self {
    Self(iter.into_iter().collect())
  }
}
