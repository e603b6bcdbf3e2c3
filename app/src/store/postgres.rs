// app/src/store/postgres.rs

use super::{
  validate_new_product, CatalogReader, CatalogWriter, CheckoutTx, CommerceStore, DecrementOutcome, OrderWriter, StoreError, StoreResult,
  UserStore,
};
use crate::models::{
  NewOrder, NewOrderItem, NewProduct, NewUser, Order, OrderId, OrderItem, OrderItemId, Product, ProductId, User, UserId,
};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

const PRODUCT_COLUMNS: &str = "id, name, description, image, price, quantity, created_at";
const USER_COLUMNS: &str = "id, first_name, last_name, email, password_hash, created_at";

fn map_sqlx(err: sqlx::Error) -> StoreError {
  match err {
    sqlx::Error::PoolTimedOut => StoreError::Timeout,
    other => StoreError::Database(other),
  }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
  err
    .as_database_error()
    .map(|db_err| db_err.is_unique_violation())
    .unwrap_or(false)
}

#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  pub fn pool(&self) -> &PgPool {
    &self.pool
  }
}

#[async_trait]
impl CatalogReader for PgStore {
  #[instrument(name = "pg::list_products", skip(self), err(Display))]
  async fn list_products(&self) -> StoreResult<Vec<Product>> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at, name");
    sqlx::query_as::<_, Product>(&sql)
      .fetch_all(&self.pool)
      .await
      .map_err(map_sqlx)
  }

  #[instrument(name = "pg::products_by_ids", skip(self, ids), fields(count = ids.len()), err(Display))]
  async fn products_by_ids(&self, ids: &[ProductId]) -> StoreResult<Vec<Product>> {
    let raw_ids: Vec<Uuid> = ids.iter().map(ProductId::as_uuid).collect();
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ANY($1)");
    sqlx::query_as::<_, Product>(&sql)
      .bind(raw_ids)
      .fetch_all(&self.pool)
      .await
      .map_err(map_sqlx)
  }

  #[instrument(name = "pg::product_by_id", skip(self), err(Display))]
  async fn product_by_id(&self, id: ProductId) -> StoreResult<Option<Product>> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
    sqlx::query_as::<_, Product>(&sql)
      .bind(id)
      .fetch_optional(&self.pool)
      .await
      .map_err(map_sqlx)
  }
}

#[async_trait]
impl UserStore for PgStore {
  #[instrument(name = "pg::user_by_email", skip(self, email), err(Display))]
  async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
    sqlx::query_as::<_, User>(&sql)
      .bind(email)
      .fetch_optional(&self.pool)
      .await
      .map_err(map_sqlx)
  }

  #[instrument(name = "pg::user_by_id", skip(self), err(Display))]
  async fn user_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
    sqlx::query_as::<_, User>(&sql)
      .bind(id)
      .fetch_optional(&self.pool)
      .await
      .map_err(map_sqlx)
  }

  #[instrument(name = "pg::create_user", skip(self, user), err(Display))]
  async fn create_user(&self, user: NewUser) -> StoreResult<User> {
    let sql = format!(
      "INSERT INTO users (id, first_name, last_name, email, password_hash) VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
    );
    sqlx::query_as::<_, User>(&sql)
      .bind(UserId::new())
      .bind(&user.first_name)
      .bind(&user.last_name)
      .bind(&user.email)
      .bind(&user.password_hash)
      .fetch_one(&self.pool)
      .await
      .map_err(|e| {
        if is_unique_violation(&e) {
          StoreError::Conflict("An account with this email already exists.".to_string())
        } else {
          map_sqlx(e)
        }
      })
  }
}

#[async_trait]
impl CommerceStore for PgStore {
  #[instrument(name = "pg::begin_checkout", skip(self), err(Display))]
  async fn begin_checkout(&self) -> StoreResult<Box<dyn CheckoutTx>> {
    let tx = self.pool.begin().await.map_err(map_sqlx)?;
    Ok(Box::new(PgCheckoutTx { tx }))
  }

  #[instrument(name = "pg::add_product", skip(self, product), fields(name = %product.name), err(Display))]
  async fn add_product(&self, product: NewProduct) -> StoreResult<Product> {
    let product_id = ProductId::new();
    validate_new_product(product_id, &product)?;
    let sql = format!(
      "INSERT INTO products (id, name, description, image, price, quantity) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {PRODUCT_COLUMNS}"
    );
    sqlx::query_as::<_, Product>(&sql)
      .bind(product_id)
      .bind(&product.name)
      .bind(&product.description)
      .bind(&product.image)
      .bind(product.price)
      .bind(product.quantity)
      .fetch_one(&self.pool)
      .await
      .map_err(map_sqlx)
  }

  async fn ping(&self) -> StoreResult<()> {
    sqlx::query("SELECT 1").execute(&self.pool).await.map_err(map_sqlx)?;
    Ok(())
  }
}

/// Wraps a live Postgres transaction. sqlx rolls it back when dropped uncommitted.
pub struct PgCheckoutTx {
  tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl CatalogWriter for PgCheckoutTx {
  #[instrument(name = "pg::update_product_quantity", skip(self), err(Display))]
  async fn update_product_quantity(&mut self, id: ProductId, quantity: i32) -> StoreResult<()> {
    if quantity < 0 {
      return Err(StoreError::NegativeQuantity { product_id: id, quantity });
    }
    let result = sqlx::query("UPDATE products SET quantity = $1 WHERE id = $2")
      .bind(quantity)
      .bind(id)
      .execute(&mut *self.tx)
      .await
      .map_err(map_sqlx)?;
    if result.rows_affected() == 0 {
      return Err(StoreError::Backend(format!("product {id} does not exist")));
    }
    Ok(())
  }

  #[instrument(name = "pg::decrement_quantity", skip(self), err(Display))]
  async fn decrement_quantity(&mut self, id: ProductId, amount: i32) -> StoreResult<DecrementOutcome> {
    let remaining: Option<i32> = sqlx::query_scalar(
      "UPDATE products SET quantity = quantity - $1 WHERE id = $2 AND quantity >= $1 RETURNING quantity",
    )
    .bind(amount)
    .bind(id)
    .fetch_optional(&mut *self.tx)
    .await
    .map_err(map_sqlx)?;

    if let Some(remaining) = remaining {
      debug!(remaining, "Stock decremented.");
      return Ok(DecrementOutcome::Applied { remaining });
    }

    let live: Option<i32> = sqlx::query_scalar("SELECT quantity FROM products WHERE id = $1")
      .bind(id)
      .fetch_optional(&mut *self.tx)
      .await
      .map_err(map_sqlx)?;
    match live {
      Some(available) => {
        warn!(available, "Conditional decrement rejected.");
        Ok(DecrementOutcome::Insufficient { available })
      }
      None => Ok(DecrementOutcome::Missing),
    }
  }
}

#[async_trait]
impl OrderWriter for PgCheckoutTx {
  #[instrument(name = "pg::create_order", skip(self, order), fields(user_id = %order.user_id), err(Display))]
  async fn create_order(&mut self, order: NewOrder) -> StoreResult<Order> {
    sqlx::query_as::<_, Order>(
      "INSERT INTO orders (id, user_id, total_price, status, address) VALUES ($1, $2, $3, $4, $5) \
       RETURNING id, user_id, total_price, status, address, created_at",
    )
    .bind(OrderId::new())
    .bind(order.user_id)
    .bind(order.total_price)
    .bind(order.status)
    .bind(&order.address)
    .fetch_one(&mut *self.tx)
    .await
    .map_err(map_sqlx)
  }

  #[instrument(name = "pg::create_order_item", skip(self, item), fields(order_id = %item.order_id, product_id = %item.product_id), err(Display))]
  async fn create_order_item(&mut self, item: NewOrderItem) -> StoreResult<OrderItem> {
    sqlx::query_as::<_, OrderItem>(
      "INSERT INTO order_items (id, order_id, product_id, quantity, price) VALUES ($1, $2, $3, $4, $5) \
       RETURNING id, order_id, product_id, quantity, price, created_at",
    )
    .bind(OrderItemId::new())
    .bind(item.order_id)
    .bind(item.product_id)
    .bind(item.quantity)
    .bind(item.price)
    .fetch_one(&mut *self.tx)
    .await
    .map_err(map_sqlx)
  }
}

#[async_trait]
impl CheckoutTx for PgCheckoutTx {
  async fn commit(self: Box<Self>) -> StoreResult<()> {
    self.tx.commit().await.map_err(map_sqlx)
  }

  async fn rollback(self: Box<Self>) -> StoreResult<()> {
    self.tx.rollback().await.map_err(map_sqlx)
  }
}
