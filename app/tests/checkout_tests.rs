// tests/checkout_tests.rs
mod common;

use async_trait::async_trait;
use common::*;
use std::sync::Arc;
use std::time::Duration;
use storefront::checkout::{checkout, Cart, CartItem, CheckoutError};
use storefront::errors::AppError;
use storefront::models::{NewProduct, NewUser, OrderStatus, Product, ProductId, User, UserId};
use storefront::state::AppState;
use storefront::store::{
  CatalogReader, CatalogWriter, CheckoutTx, CommerceStore, FailPoint, MemoryStore, StoreError, StoreResult, UserStore,
};

const ADDRESS: &str = "12 Harbour Road, Leith";

fn cart(lines: &[(&Product, i32)]) -> Cart {
  lines.iter().map(|(p, q)| CartItem::new(p.id, *q)).collect()
}

async fn assert_untouched(store: &MemoryStore, products: &[(&Product, i32)]) {
  assert!(store.orders().await.is_empty(), "no order may be committed");
  assert!(store.order_items().await.is_empty(), "no order item may be committed");
  for (product, expected) in products {
    assert_eq!(stock_of(store, product).await, *expected, "stock of {}", product.name);
  }
}

#[tokio::test]
async fn sufficient_stock_commits_order_items_and_decrements() {
  let (state, store) = memory_state();
  let mug = add_product(&store, "Mug", "10.00", 5).await;
  let tote = add_product(&store, "Tote", "2.50", 10).await;
  let buyer = add_user(&store, "buyer@example.com").await;

  let confirmation = checkout(
    &state,
    buyer.id,
    cart(&[(&mug, 2), (&tote, 4), (&mug, 1)]),
    ADDRESS.to_string(),
  )
  .await
  .unwrap();

  assert_eq!(confirmation.total, dec("40.00"));
  assert_eq!(stock_of(&store, &mug).await, 2);
  assert_eq!(stock_of(&store, &tote).await, 6);

  let orders = store.orders().await;
  assert_eq!(orders.len(), 1);
  let order = &orders[0];
  assert_eq!(order.id, confirmation.order_id);
  assert_eq!(order.user_id, buyer.id);
  assert_eq!(order.status, OrderStatus::Pending);
  assert_eq!(order.address, ADDRESS);
  assert_eq!(order.total_price, dec("40.00"));

  let items = store.order_items().await;
  assert_eq!(items.len(), 3, "one item per cart line");
  assert!(items.iter().all(|i| i.order_id == order.id));
  let items_total: rust_decimal::Decimal = items.iter().map(|i| i.price * rust_decimal::Decimal::from(i.quantity)).sum();
  assert_eq!(items_total, order.total_price);
}

#[tokio::test]
async fn empty_cart_is_invalid_and_changes_nothing() {
  let (state, store) = memory_state();
  let mug = add_product(&store, "Mug", "10.00", 5).await;

  let result = checkout(&state, UserId::new(), Cart::default(), ADDRESS.to_string()).await;

  assert!(matches!(result, Err(AppError::Checkout(CheckoutError::InvalidInput(_)))));
  assert_untouched(&store, &[(&mug, 5)]).await;
}

#[tokio::test]
async fn non_positive_quantity_is_rejected_before_any_write() {
  let (state, store) = memory_state();
  let mug = add_product(&store, "Mug", "10.00", 5).await;
  let tote = add_product(&store, "Tote", "2.50", 10).await;

  for bad in [0, -1] {
    let result = checkout(&state, UserId::new(), cart(&[(&tote, 1), (&mug, bad)]), ADDRESS.to_string()).await;
    match result {
      Err(AppError::Checkout(CheckoutError::InvalidInput(msg))) => assert!(msg.contains(&mug.id.to_string())),
      other => panic!("expected InvalidInput, got {other:?}"),
    }
  }
  assert_untouched(&store, &[(&mug, 5), (&tote, 10)]).await;
}

#[tokio::test]
async fn blank_address_is_invalid() {
  let (state, store) = memory_state();
  let mug = add_product(&store, "Mug", "10.00", 5).await;

  let result = checkout(&state, UserId::new(), cart(&[(&mug, 1)]), "   ".to_string()).await;

  assert!(matches!(result, Err(AppError::Checkout(CheckoutError::InvalidInput(_)))));
  assert_untouched(&store, &[(&mug, 5)]).await;
}

#[tokio::test]
async fn unknown_product_is_unavailable() {
  let (state, store) = memory_state();
  let mug = add_product(&store, "Mug", "10.00", 5).await;
  let ghost = ProductId::new();

  let mut items = vec![CartItem::new(mug.id, 1)];
  items.push(CartItem::new(ghost, 1));
  let result = checkout(&state, UserId::new(), Cart::new(items), ADDRESS.to_string()).await;

  assert!(matches!(
    result,
    Err(AppError::Checkout(CheckoutError::ProductUnavailable(id))) if id == ghost
  ));
  assert_untouched(&store, &[(&mug, 5)]).await;
}

#[tokio::test]
async fn unknown_product_is_reported_before_a_shortage_elsewhere_in_the_cart() {
  let (state, store) = memory_state();
  let mug = add_product(&store, "Mug", "10.00", 1).await;
  let ghost = ProductId::new();

  let items = vec![CartItem::new(ghost, 1), CartItem::new(mug.id, 5)];
  let result = checkout(&state, UserId::new(), Cart::new(items), ADDRESS.to_string()).await;

  assert!(matches!(
    result,
    Err(AppError::Checkout(CheckoutError::ProductUnavailable(id))) if id == ghost
  ));
  assert_untouched(&store, &[(&mug, 1)]).await;
}

#[tokio::test]
async fn failed_catalog_read_is_a_lookup_failure() {
  let (state, store) = unreadable_catalog_state();
  let mug = add_product(&store, "Mug", "10.00", 5).await;

  let result = checkout(&state, UserId::new(), cart(&[(&mug, 2)]), ADDRESS.to_string()).await;

  match result {
    Err(AppError::Checkout(CheckoutError::LookupFailure(StoreError::Backend(detail)))) => {
      assert_eq!(detail, LOOKUP_FAILURE_DETAIL)
    }
    other => panic!("expected LookupFailure, got {other:?}"),
  }
  assert_untouched(&store, &[(&mug, 5)]).await;
}

#[tokio::test]
async fn requesting_more_than_stock_is_insufficient() {
  let (state, store) = memory_state();
  let mug = add_product(&store, "Mug", "10.00", 2).await;

  let result = checkout(&state, UserId::new(), cart(&[(&mug, 5)]), ADDRESS.to_string()).await;

  match result {
    Err(AppError::Checkout(CheckoutError::InsufficientStock {
      product_id,
      name,
      requested,
      available,
    })) => {
      assert_eq!(product_id, mug.id);
      assert_eq!(name, "Mug");
      assert_eq!(requested, 5);
      assert_eq!(available, 2);
    }
    other => panic!("expected InsufficientStock, got {other:?}"),
  }
  assert_untouched(&store, &[(&mug, 2)]).await;
}

#[tokio::test]
async fn concurrent_checkouts_for_the_whole_stock_have_one_winner() {
  let (state, store) = memory_state();
  let lamp = add_product(&store, "Lamp", "45.00", 3).await;

  let (first, second) = tokio::join!(
    checkout(&state, UserId::new(), cart(&[(&lamp, 3)]), ADDRESS.to_string()),
    checkout(&state, UserId::new(), cart(&[(&lamp, 3)]), ADDRESS.to_string()),
  );

  let outcomes = [first, second];
  assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
  assert!(outcomes.iter().any(|r| matches!(
    r,
    Err(AppError::Checkout(CheckoutError::InsufficientStock { .. }))
  )));
  assert_eq!(stock_of(&store, &lamp).await, 0);
  assert_eq!(store.orders().await.len(), 1);
}

/// Serves product reads from a snapshot frozen at construction, so every
/// checkout passes the stock pre-check and only the guarded decrement can
/// stop an oversell.
struct StaleCatalog {
  inner: MemoryStore,
  frozen: Vec<Product>,
}

#[async_trait]
impl CatalogReader for StaleCatalog {
  async fn list_products(&self) -> StoreResult<Vec<Product>> {
    Ok(self.frozen.clone())
  }

  async fn products_by_ids(&self, ids: &[ProductId]) -> StoreResult<Vec<Product>> {
    Ok(self.frozen.iter().filter(|p| ids.contains(&p.id)).cloned().collect())
  }

  async fn product_by_id(&self, id: ProductId) -> StoreResult<Option<Product>> {
    Ok(self.frozen.iter().find(|p| p.id == id).cloned())
  }
}

#[async_trait]
impl UserStore for StaleCatalog {
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
impl CommerceStore for StaleCatalog {
  async fn begin_checkout(&self) -> StoreResult<Box<dyn CheckoutTx>> {
    self.inner.begin_checkout().await
  }

  async fn add_product(&self, product: NewProduct) -> StoreResult<Product> {
    self.inner.add_product(product).await
  }

  async fn ping(&self) -> StoreResult<()> {
    Ok(())
  }
}

#[tokio::test]
async fn stale_snapshot_cannot_oversell() {
  setup_tracing();
  let store = MemoryStore::new();
  let lamp = add_product(&store, "Lamp", "45.00", 3).await;
  let stale = StaleCatalog {
    inner: store.clone(),
    frozen: vec![lamp.clone()],
  };
  let state = AppState::new(Arc::new(stale), Arc::new(test_config(2_000)));

  let (first, second) = tokio::join!(
    checkout(&state, UserId::new(), cart(&[(&lamp, 3)]), ADDRESS.to_string()),
    checkout(&state, UserId::new(), cart(&[(&lamp, 3)]), ADDRESS.to_string()),
  );

  let outcomes = [first, second];
  assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
  let loser = outcomes.iter().find(|r| r.is_err()).unwrap();
  assert!(matches!(
    loser,
    Err(AppError::Checkout(CheckoutError::InsufficientStock { available: 0, requested: 3, .. }))
  ));
  assert_eq!(stock_of(&store, &lamp).await, 0);
  assert_eq!(store.orders().await.len(), 1);
  assert_eq!(store.order_items().await.len(), 1);
}

#[tokio::test]
async fn persisted_unit_price_ignores_later_catalog_changes() {
  let (state, store) = memory_state();
  let mug = add_product(&store, "Mug", "10.0", 4).await;

  let confirmation = checkout(&state, UserId::new(), cart(&[(&mug, 2)]), ADDRESS.to_string())
    .await
    .unwrap();
  assert_eq!(confirmation.total, dec("20.0"));

  store.set_price(mug.id, dec("99.99")).await.unwrap();

  let items = store.order_items().await;
  assert_eq!(items.len(), 1);
  assert_eq!(items[0].price, dec("10.0"));
  assert_eq!(items[0].quantity, 2);
  assert_eq!(store.orders().await[0].total_price, dec("20.0"));
}

#[tokio::test]
async fn failure_while_writing_items_rolls_everything_back() {
  let (state, store) = memory_state();
  let mug = add_product(&store, "Mug", "10.00", 5).await;
  let tote = add_product(&store, "Tote", "2.50", 10).await;
  store.fail_at(FailPoint::CreateOrderItem);

  let result = checkout(&state, UserId::new(), cart(&[(&mug, 2), (&tote, 1)]), ADDRESS.to_string()).await;

  assert!(matches!(
    result,
    Err(AppError::Checkout(CheckoutError::PersistenceFailure(StoreError::Backend(_))))
  ));
  assert_untouched(&store, &[(&mug, 5), (&tote, 10)]).await;
}

#[tokio::test]
async fn failing_second_decrement_restores_the_first() {
  let (state, store) = memory_state();
  let mug = add_product(&store, "Mug", "10.00", 5).await;
  let tote = add_product(&store, "Tote", "2.50", 10).await;
  store.fail_after(FailPoint::Decrement, 1);

  let result = checkout(&state, UserId::new(), cart(&[(&mug, 2), (&tote, 3)]), ADDRESS.to_string()).await;

  assert!(matches!(
    result,
    Err(AppError::Checkout(CheckoutError::PersistenceFailure(StoreError::Backend(_))))
  ));
  assert_untouched(&store, &[(&mug, 5), (&tote, 10)]).await;
}

#[tokio::test]
async fn stock_can_be_set_inside_a_transaction_but_never_below_zero() {
  let store = MemoryStore::new();
  let mug = add_product(&store, "Mug", "10.00", 5).await;

  let mut tx = store.begin_checkout().await.unwrap();
  match tx.update_product_quantity(mug.id, -1).await {
    Err(StoreError::NegativeQuantity { product_id, quantity }) => {
      assert_eq!(product_id, mug.id);
      assert_eq!(quantity, -1);
    }
    other => panic!("expected NegativeQuantity, got {other:?}"),
  }
  tx.update_product_quantity(mug.id, 7).await.unwrap();
  drop(tx);
  assert_eq!(stock_of(&store, &mug).await, 5, "dropped transaction discards the update");

  let mut tx = store.begin_checkout().await.unwrap();
  tx.update_product_quantity(mug.id, 0).await.unwrap();
  tx.commit().await.unwrap();
  assert_eq!(stock_of(&store, &mug).await, 0);
}

#[tokio::test]
async fn catalog_rejects_prices_a_money_column_would_round() {
  let store = MemoryStore::new();

  for bad in ["1.005", "-1.00", "10000000000.00"] {
    match store.add_product(NewProduct::new("Odd", dec(bad), 1)).await {
      Err(StoreError::InvalidPrice { price, .. }) => assert_eq!(price, dec(bad)),
      other => panic!("expected InvalidPrice for {bad}, got {other:?}"),
    }
  }
  assert!(store.list_products().await.unwrap().is_empty());

  let mug = add_product(&store, "Mug", "10.000", 1).await;
  assert_eq!(mug.price, dec("10.00"));
}

#[tokio::test]
async fn order_total_beyond_the_money_column_is_rejected_before_any_write() {
  let (state, store) = memory_state();
  let safe = add_product(&store, "Safe", "6000000000.00", 2).await;

  let result = checkout(&state, UserId::new(), cart(&[(&safe, 2)]), ADDRESS.to_string()).await;

  assert!(matches!(result, Err(AppError::Checkout(CheckoutError::InvalidInput(_)))));
  assert_untouched(&store, &[(&safe, 2)]).await;
}

#[tokio::test]
async fn failure_at_commit_leaves_no_trace() {
  let (state, store) = memory_state();
  let mug = add_product(&store, "Mug", "10.00", 5).await;
  store.fail_at(FailPoint::Commit);

  let result = checkout(&state, UserId::new(), cart(&[(&mug, 1)]), ADDRESS.to_string()).await;

  assert!(matches!(result, Err(AppError::Checkout(CheckoutError::PersistenceFailure(_)))));
  assert_untouched(&store, &[(&mug, 5)]).await;
}

#[tokio::test]
async fn persistence_timeout_rolls_back_and_releases_the_store() {
  let (state, store) = memory_state_with_timeout(50);
  let mug = add_product(&store, "Mug", "10.00", 5).await;
  store.stall_at(FailPoint::CreateOrder, Duration::from_millis(500));

  let result = checkout(&state, UserId::new(), cart(&[(&mug, 2)]), ADDRESS.to_string()).await;

  assert!(matches!(
    result,
    Err(AppError::Checkout(CheckoutError::PersistenceFailure(StoreError::Timeout)))
  ));
  assert_untouched(&store, &[(&mug, 5)]).await;

  store.clear_faults();
  let retry = checkout(&state, UserId::new(), cart(&[(&mug, 2)]), ADDRESS.to_string()).await;
  assert!(retry.is_ok());
  assert_eq!(stock_of(&store, &mug).await, 3);
}
