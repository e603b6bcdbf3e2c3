// app/src/checkout/pricing.rs

use super::{Cart, CheckoutError, Snapshots};
use crate::models::{max_money, ProductId};
use rust_decimal::Decimal;

/// A cart line priced at the snapshot's unit price. One per cart item, in cart order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedLine {
  pub product_id: ProductId,
  pub quantity: i32,
  pub unit_price: Decimal,
}

impl PricedLine {
  pub fn line_total(&self) -> Option<Decimal> {
    self.unit_price.checked_mul(Decimal::from(self.quantity))
  }
}

pub fn price_lines(cart: &Cart, snapshots: &Snapshots) -> Result<Vec<PricedLine>, CheckoutError> {
  cart
    .items()
    .iter()
    .map(|item| {
      let product = snapshots
        .get(&item.product_id)
        .ok_or(CheckoutError::ProductUnavailable(item.product_id))?;
      Ok(PricedLine {
        product_id: item.product_id,
        quantity: item.quantity,
        unit_price: product.price,
      })
    })
    .collect()
}

/// Sum of `line_total` over exactly the given lines.
///
/// A total that the order table could not store is the caller's input
/// problem, not a persistence failure.
pub fn order_total(lines: &[PricedLine]) -> Result<Decimal, CheckoutError> {
  let out_of_range = || CheckoutError::InvalidInput(format!("order total exceeds the maximum of {}", max_money()));
  let total = lines.iter().try_fold(Decimal::ZERO, |acc, line| {
    line.line_total().and_then(|t| acc.checked_add(t)).ok_or_else(out_of_range)
  })?;
  if total > max_money() {
    return Err(out_of_range());
  }
  Ok(total)
}

pub fn compute_total(cart: &Cart, snapshots: &Snapshots) -> Result<Decimal, CheckoutError> {
  order_total(&price_lines(cart, snapshots)?)
}
