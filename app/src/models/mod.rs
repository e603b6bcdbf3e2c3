// app/src/models/mod.rs

//! Records stored by the catalog, order and user tables.

pub mod ids;
pub mod order;
pub mod order_item;
pub mod product;
pub mod user;

pub use ids::{OrderId, OrderItemId, ProductId, UserId};
pub use order::{NewOrder, Order, OrderStatus};
pub use order_item::{NewOrderItem, OrderItem};
pub use product::{is_storable_money, max_money, NewProduct, Product, MONEY_SCALE};
pub use user::{NewUser, User};
