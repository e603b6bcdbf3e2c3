// app/src/checkout/ledger.rs

//! Inventory rules for a checkout: how much of each product a cart asks for,
//! whether the catalog can cover it, and the guarded decrement.

use super::{Cart, CheckoutError, Snapshots};
use crate::models::ProductId;
use crate::store::{CheckoutTx, DecrementOutcome};
use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

/// Total requested quantity per distinct product, in product-id order.
pub type Requested = BTreeMap<ProductId, i32>;

/// Validates every line and sums duplicate lines per product.
pub fn aggregate(cart: &Cart) -> Result<Requested, CheckoutError> {
  if cart.is_empty() {
    return Err(CheckoutError::InvalidInput("cart is empty".to_string()));
  }

  let mut requested = Requested::new();
  for item in cart.items() {
    if item.quantity <= 0 {
      return Err(CheckoutError::InvalidInput(format!(
        "quantity for product {} must be greater than zero, got {}",
        item.product_id, item.quantity
      )));
    }
    let entry = requested.entry(item.product_id).or_insert(0);
    *entry = entry.checked_add(item.quantity).ok_or_else(|| {
      CheckoutError::InvalidInput(format!("quantity for product {} is too large", item.product_id))
    })?;
  }
  Ok(requested)
}

/// Checks `requested` against `snapshots`, walking products in the order they
/// first appear in `cart`.
///
/// Every product must exist before any quantity is compared, so a cart with
/// both an unknown product and a short one reports `ProductUnavailable`.
/// Never touches storage.
pub fn check_stock(cart: &Cart, requested: &Requested, snapshots: &Snapshots) -> Result<(), CheckoutError> {
  let mut in_cart_order: Vec<ProductId> = Vec::with_capacity(requested.len());
  for item in cart.items() {
    if !in_cart_order.contains(&item.product_id) {
      in_cart_order.push(item.product_id);
    }
  }

  if let Some(missing) = in_cart_order.iter().find(|id| !snapshots.contains_key(id)) {
    return Err(CheckoutError::ProductUnavailable(*missing));
  }

  for product_id in &in_cart_order {
    let (Some(&amount), Some(product)) = (requested.get(product_id), snapshots.get(product_id)) else {
      continue;
    };
    if amount > product.quantity {
      return Err(CheckoutError::InsufficientStock {
        product_id: *product_id,
        name: product.name.clone(),
        requested: amount,
        available: product.quantity,
      });
    }
  }
  Ok(())
}

/// Applies one guarded decrement inside `tx` and returns the remaining stock.
///
/// A failed guard means another checkout took the stock after our snapshot
/// was read; it is reported with the live quantity the store observed.
#[instrument(name = "ledger::decrement", skip_all, fields(%product_id, amount))]
pub async fn decrement(
  tx: &mut dyn CheckoutTx,
  product_id: ProductId,
  name: &str,
  amount: i32,
) -> Result<i32, CheckoutError> {
  match tx.decrement_quantity(product_id, amount).await {
    Ok(DecrementOutcome::Applied { remaining }) => {
      debug!(remaining, "Stock reserved.");
      Ok(remaining)
    }
    Ok(DecrementOutcome::Insufficient { available }) => {
      warn!(available, "Stock changed since the snapshot was read.");
      Err(CheckoutError::InsufficientStock {
        product_id,
        name: name.to_string(),
        requested: amount,
        available,
      })
    }
    Ok(DecrementOutcome::Missing) => Err(CheckoutError::ProductUnavailable(product_id)),
    Err(e) => Err(CheckoutError::PersistenceFailure(e)),
  }
}
