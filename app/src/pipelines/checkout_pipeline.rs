// app/src/pipelines/checkout_pipeline.rs

//! validate_cart -> load_product_snapshots -> check_stock -> price_cart -> commit_order
//!
//! Only `commit_order` writes. Everything before it fails without touching
//! storage; `commit_order` runs its writes in one transaction under the
//! configured checkout timeout.

use crate::checkout::{ledger, pricing, CheckoutError, PricedLine, Snapshots};
use crate::errors::AppError;
use crate::models::{NewOrder, NewOrderItem, OrderId, OrderStatus, ProductId, UserId};
use crate::pipelines::contexts::CheckoutCtxData;
use crate::store::{CheckoutTx, CommerceStore};
use orderflow::{ContextData, Pipeline, PipelineControl, Registry};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{event, info, instrument, warn, Level};

pub fn register_checkout_pipeline(registry: &Registry<AppError>) {
  let mut p = Pipeline::<CheckoutCtxData, AppError>::new(&[
    ("validate_cart", false, None),
    ("load_product_snapshots", false, None),
    ("check_stock", false, None),
    ("price_cart", false, None),
    ("commit_order", false, None),
  ]);

  // Step 1: cart shape and address
  p.on("validate_cart", |ctx_data: ContextData<CheckoutCtxData>| async move {
    let requested = ctx_data.with(|c| ledger::aggregate(&c.cart))?;
    let address_blank = ctx_data.with(|c| c.address.trim().is_empty());
    if address_blank {
      return Err(CheckoutError::InvalidInput("shipping address is required".to_string()));
    }
    event!(Level::DEBUG, distinct_products = requested.len(), "Cart validated.");
    ctx_data.write().requested = requested;
    Ok::<_, CheckoutError>(PipelineControl::Continue)
  });

  // Step 2: one read of every distinct product
  p.on("load_product_snapshots", |ctx_data: ContextData<CheckoutCtxData>| async move {
    let (store, ids) = ctx_data.with(|c| {
      let ids: Vec<ProductId> = c.requested.keys().copied().collect();
      (Arc::clone(&c.app_state.store), ids)
    });

    let products = store
      .products_by_ids(&ids)
      .await
      .map_err(CheckoutError::LookupFailure)?;
    let snapshots: Snapshots = products.into_iter().map(|p| (p.id, p)).collect();
    event!(Level::DEBUG, requested = ids.len(), found = snapshots.len(), "Snapshots loaded.");

    ctx_data.write().snapshots = snapshots;
    Ok::<_, CheckoutError>(PipelineControl::Continue)
  });

  // Step 3: pure availability check against the snapshots
  p.on("check_stock", |ctx_data: ContextData<CheckoutCtxData>| async move {
    ctx_data.with(|c| ledger::check_stock(&c.cart, &c.requested, &c.snapshots))?;
    Ok::<_, CheckoutError>(PipelineControl::Continue)
  });

  // Step 4: price every cart line at its snapshot price
  p.on("price_cart", |ctx_data: ContextData<CheckoutCtxData>| async move {
    let (lines, total) = ctx_data.with(|c| -> Result<_, CheckoutError> {
      let lines = pricing::price_lines(&c.cart, &c.snapshots)?;
      let total = pricing::order_total(&lines)?;
      Ok((lines, total))
    })?;
    event!(Level::DEBUG, %total, lines = lines.len(), "Cart priced.");
    ctx_data.update(|c| {
      c.lines = lines;
      c.total = total;
    });
    Ok::<_, CheckoutError>(PipelineControl::Continue)
  });

  // Step 5: decrement, create order and items, commit
  p.on("commit_order", commit_order);

  registry.register_pipeline(p);
}

/// Everything the persistence phase needs, copied out of the context so no
/// lock is held while awaiting the store.
struct OrderPlan {
  user_id: UserId,
  address: String,
  total: Decimal,
  decrements: Vec<(ProductId, String, i32)>,
  lines: Vec<PricedLine>,
}

async fn commit_order(ctx_data: ContextData<CheckoutCtxData>) -> Result<PipelineControl, CheckoutError> {
  let (store, timeout, plan) = ctx_data.with(|c| {
    let decrements = c
      .requested
      .iter()
      .map(|(id, &amount)| {
        let name = c.snapshots.get(id).map(|p| p.name.clone()).unwrap_or_default();
        (*id, name, amount)
      })
      .collect();
    let plan = OrderPlan {
      user_id: c.user_id,
      address: c.address.trim().to_string(),
      total: c.total,
      decrements,
      lines: c.lines.clone(),
    };
    (Arc::clone(&c.app_state.store), c.app_state.config.checkout_timeout, plan)
  });

  let order_id = match tokio::time::timeout(timeout, persist_order(store.as_ref(), &plan)).await {
    Ok(result) => result?,
    Err(_elapsed) => {
      // The dropped future drops the transaction handle, which rolls it back.
      warn!(?timeout, "Checkout persistence timed out.");
      return Err(CheckoutError::PersistenceFailure(crate::store::StoreError::Timeout));
    }
  };

  ctx_data.write().order_id = Some(order_id);
  Ok(PipelineControl::Continue)
}

#[instrument(name = "checkout::persist_order", skip_all, fields(user_id = %plan.user_id, total = %plan.total))]
async fn persist_order(store: &dyn CommerceStore, plan: &OrderPlan) -> Result<OrderId, CheckoutError> {
  let mut tx = store.begin_checkout().await.map_err(CheckoutError::PersistenceFailure)?;

  match write_order(tx.as_mut(), plan).await {
    Ok(order_id) => {
      tx.commit().await.map_err(CheckoutError::PersistenceFailure)?;
      info!(%order_id, "Order committed.");
      Ok(order_id)
    }
    Err(e) => {
      if let Err(rollback_err) = tx.rollback().await {
        warn!(error = %rollback_err, "Rollback failed; the transaction is discarded on drop.");
      }
      Err(e)
    }
  }
}

async fn write_order(tx: &mut dyn CheckoutTx, plan: &OrderPlan) -> Result<OrderId, CheckoutError> {
  for (product_id, name, amount) in &plan.decrements {
    ledger::decrement(tx, *product_id, name, *amount).await?;
  }

  let order = tx
    .create_order(NewOrder {
      user_id: plan.user_id,
      total_price: plan.total,
      status: OrderStatus::Pending,
      address: plan.address.clone(),
    })
    .await
    .map_err(CheckoutError::PersistenceFailure)?;

  for line in &plan.lines {
    tx.create_order_item(NewOrderItem {
      order_id: order.id,
      product_id: line.product_id,
      quantity: line.quantity,
      price: line.unit_price,
    })
    .await
    .map_err(CheckoutError::PersistenceFailure)?;
  }

  Ok(order.id)
}
