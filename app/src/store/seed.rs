// app/src/store/seed.rs

use super::{CommerceStore, StoreResult};
use crate::models::NewProduct;
use rust_decimal::Decimal;
use tracing::{info, instrument};

fn demo_product(name: &str, description: &str, cents: i64, quantity: i32) -> NewProduct {
  NewProduct {
    name: name.to_string(),
    description: description.to_string(),
    image: format!("https://picsum.photos/seed/{}/400", name.to_lowercase().replace(' ', "-")),
    price: Decimal::new(cents, 2),
    quantity,
  }
}

/// Inserts a handful of demo products, but only into an empty catalog.
/// Returns how many were inserted.
#[instrument(name = "store::seed_catalog", skip(store), err(Display))]
pub async fn seed_catalog(store: &dyn CommerceStore) -> StoreResult<usize> {
  if !store.list_products().await?.is_empty() {
    info!("Catalog already has products, skipping seed.");
    return Ok(0);
  }

  let products = [
    demo_product("Canvas Tote", "Heavy cotton tote bag.", 1800, 40),
    demo_product("Enamel Mug", "Camp mug, 350ml.", 1250, 25),
    demo_product("Wool Beanie", "Merino, one size.", 2400, 15),
    demo_product("Notebook", "A5 dotted, 120 pages.", 900, 60),
  ];
  let count = products.len();
  for product in products {
    store.add_product(product).await?;
  }
  info!(count, "Seeded demo catalog.");
  Ok(count)
}
