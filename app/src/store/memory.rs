// app/src/store/memory.rs

//! In-process store with the same transactional contract as Postgres.
//!
//! A checkout transaction holds the table lock for its whole lifetime and
//! writes into a staged copy; `commit` swaps the copy in, dropping discards it.
//! Fault hooks let tests fail or stall a specific write.

use super::{
  validate_new_product, CatalogReader, CatalogWriter, CheckoutTx, CommerceStore, DecrementOutcome, OrderWriter, StoreError, StoreResult,
  UserStore,
};
use crate::models::{
  NewOrder, NewOrderItem, NewProduct, NewUser, Order, OrderId, OrderItem, OrderItemId, Product, ProductId, User, UserId,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone, Default)]
struct Tables {
  products: HashMap<ProductId, Product>,
  users: HashMap<UserId, User>,
  orders: Vec<Order>,
  order_items: Vec<OrderItem>,
}

/// Writes inside a checkout transaction that tests can sabotage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
  Decrement,
  CreateOrder,
  CreateOrderItem,
  Commit,
}

#[derive(Debug, Clone, Default)]
struct FaultPlan {
  /// Fail at this point once it has been passed `skip` times.
  fail_at: Option<(FailPoint, usize)>,
  stall: Option<(FailPoint, Duration)>,
  /// Per-transaction count of writes that reached `fail_at`'s point.
  hits: usize,
}

impl FaultPlan {
  async fn check(&mut self, point: FailPoint) -> StoreResult<()> {
    if let Some((stall_at, pause)) = self.stall {
      if stall_at == point {
        debug!(?point, ?pause, "Stalling injected write.");
        tokio::time::sleep(pause).await;
      }
    }
    if let Some((fail_at, skip)) = self.fail_at {
      if fail_at == point {
        self.hits += 1;
        if self.hits > skip {
          warn!(?point, hit = self.hits, "Injected store failure.");
          return Err(StoreError::Backend(format!("injected failure at {point:?}")));
        }
      }
    }
    Ok(())
  }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
  tables: Arc<Mutex<Tables>>,
  faults: Arc<parking_lot::Mutex<FaultPlan>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Makes the next transactions fail at `point` until cleared.
  pub fn fail_at(&self, point: FailPoint) {
    self.fail_after(point, 0);
  }

  /// Lets each transaction pass `point` `successes` times, then fails it.
  pub fn fail_after(&self, point: FailPoint, successes: usize) {
    self.faults.lock().fail_at = Some((point, successes));
  }

  /// Makes the next transactions sleep for `pause` before the write at `point`.
  pub fn stall_at(&self, point: FailPoint, pause: Duration) {
    self.faults.lock().stall = Some((point, pause));
  }

  pub fn clear_faults(&self) {
    *self.faults.lock() = FaultPlan::default();
  }

  pub async fn orders(&self) -> Vec<Order> {
    self.tables.lock().await.orders.clone()
  }

  pub async fn order_items(&self) -> Vec<OrderItem> {
    self.tables.lock().await.order_items.clone()
  }

  /// Changes a catalog price outside of any checkout.
  pub async fn set_price(&self, id: ProductId, price: rust_decimal::Decimal) -> StoreResult<()> {
    let mut tables = self.tables.lock().await;
    let product = tables
      .products
      .get_mut(&id)
      .ok_or_else(|| StoreError::Backend(format!("product {id} does not exist")))?;
    product.price = price;
    Ok(())
  }
}

#[async_trait]
impl CatalogReader for MemoryStore {
  async fn list_products(&self) -> StoreResult<Vec<Product>> {
    let tables = self.tables.lock().await;
    let mut products: Vec<Product> = tables.products.values().cloned().collect();
    products.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.name.cmp(&b.name)));
    Ok(products)
  }

  #[instrument(name = "memory::products_by_ids", skip(self, ids), fields(count = ids.len()))]
  async fn products_by_ids(&self, ids: &[ProductId]) -> StoreResult<Vec<Product>> {
    let tables = self.tables.lock().await;
    Ok(ids.iter().filter_map(|id| tables.products.get(id).cloned()).collect())
  }

  async fn product_by_id(&self, id: ProductId) -> StoreResult<Option<Product>> {
    Ok(self.tables.lock().await.products.get(&id).cloned())
  }
}

#[async_trait]
impl UserStore for MemoryStore {
  async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
    let tables = self.tables.lock().await;
    Ok(tables.users.values().find(|u| u.email == email).cloned())
  }

  async fn user_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
    Ok(self.tables.lock().await.users.get(&id).cloned())
  }

  #[instrument(name = "memory::create_user", skip(self, user))]
  async fn create_user(&self, user: NewUser) -> StoreResult<User> {
    let mut tables = self.tables.lock().await;
    if tables.users.values().any(|u| u.email == user.email) {
      return Err(StoreError::Conflict("An account with this email already exists.".to_string()));
    }
    let created = User {
      id: UserId::new(),
      first_name: user.first_name,
      last_name: user.last_name,
      email: user.email,
      password_hash: user.password_hash,
      created_at: Utc::now(),
    };
    tables.users.insert(created.id, created.clone());
    Ok(created)
  }
}

#[async_trait]
impl CommerceStore for MemoryStore {
  async fn begin_checkout(&self) -> StoreResult<Box<dyn CheckoutTx>> {
    let guard = Arc::clone(&self.tables).lock_owned().await;
    let staged = guard.clone();
    let faults = self.faults.lock().clone();
    Ok(Box::new(MemoryCheckoutTx { guard, staged, faults }))
  }

  async fn add_product(&self, product: NewProduct) -> StoreResult<Product> {
    let product_id = ProductId::new();
    validate_new_product(product_id, &product)?;
    let product = Product {
      id: product_id,
      ..product.into_product()
    };
    self.tables.lock().await.products.insert(product.id, product.clone());
    Ok(product)
  }

  async fn ping(&self) -> StoreResult<()> {
    Ok(())
  }
}

pub struct MemoryCheckoutTx {
  guard: OwnedMutexGuard<Tables>,
  staged: Tables,
  faults: FaultPlan,
}

#[async_trait]
impl CatalogWriter for MemoryCheckoutTx {
  async fn update_product_quantity(&mut self, id: ProductId, quantity: i32) -> StoreResult<()> {
    if quantity < 0 {
      return Err(StoreError::NegativeQuantity { product_id: id, quantity });
    }
    let product = self
      .staged
      .products
      .get_mut(&id)
      .ok_or_else(|| StoreError::Backend(format!("product {id} does not exist")))?;
    product.quantity = quantity;
    Ok(())
  }

  #[instrument(name = "memory::decrement_quantity", skip(self))]
  async fn decrement_quantity(&mut self, id: ProductId, amount: i32) -> StoreResult<DecrementOutcome> {
    self.faults.check(FailPoint::Decrement).await?;
    let Some(product) = self.staged.products.get_mut(&id) else {
      return Ok(DecrementOutcome::Missing);
    };
    if product.quantity < amount {
      return Ok(DecrementOutcome::Insufficient {
        available: product.quantity,
      });
    }
    product.quantity -= amount;
    Ok(DecrementOutcome::Applied {
      remaining: product.quantity,
    })
  }
}

#[async_trait]
impl OrderWriter for MemoryCheckoutTx {
  async fn create_order(&mut self, order: NewOrder) -> StoreResult<Order> {
    self.faults.check(FailPoint::CreateOrder).await?;
    let created = Order {
      id: OrderId::new(),
      user_id: order.user_id,
      total_price: order.total_price,
      status: order.status,
      address: order.address,
      created_at: Utc::now(),
    };
    self.staged.orders.push(created.clone());
    Ok(created)
  }

  async fn create_order_item(&mut self, item: NewOrderItem) -> StoreResult<OrderItem> {
    self.faults.check(FailPoint::CreateOrderItem).await?;
    if !self.staged.orders.iter().any(|o| o.id == item.order_id) {
      return Err(StoreError::Backend(format!("order {} does not exist", item.order_id)));
    }
    let created = OrderItem {
      id: OrderItemId::new(),
      order_id: item.order_id,
      product_id: item.product_id,
      quantity: item.quantity,
      price: item.price,
      created_at: Utc::now(),
    };
    self.staged.order_items.push(created.clone());
    Ok(created)
  }
}

#[async_trait]
impl CheckoutTx for MemoryCheckoutTx {
  async fn commit(self: Box<Self>) -> StoreResult<()> {
    let MemoryCheckoutTx {
      mut guard,
      staged,
      mut faults,
    } = *self;
    faults.check(FailPoint::Commit).await?;
    *guard = staged;
    Ok(())
  }

  async fn rollback(self: Box<Self>) -> StoreResult<()> {
    Ok(())
  }
}
