// storefront/src/services/seed.rs

use sqlx::types::Json;
use tracing::info;

use crate::errors::Result as AppResult;
use crate::models::{Product, ProductOption};
use crate::services::catalog::CatalogStore;

fn option(title: &str, additional_price: i64) -> ProductOption {
  ProductOption {
    title: title.to_string(),
    additional_price,
  }
}

pub fn demo_products() -> Vec<Product> {
  vec![
    Product {
      id: "nasi-goreng".to_string(),
      title: "Nasi Goreng Spesial".to_string(),
      description: Some("Fried rice with egg, chicken and prawn crackers.".to_string()),
      price: 25000,
      stock: 40,
      category: "makanan".to_string(),
      options: Json(vec![option("Biasa", 0), option("Pedas", 0), option("Jumbo", 10000)]),
    },
    Product {
      id: "sate-ayam".to_string(),
      title: "Sate Ayam".to_string(),
      description: Some("Ten skewers with peanut sauce.".to_string()),
      price: 30000,
      stock: 25,
      category: "makanan".to_string(),
      options: Json(vec![option("Lontong", 5000)]),
    },
    Product {
      id: "es-teh".to_string(),
      title: "Es Teh Manis".to_string(),
      description: None,
      price: 8000,
      stock: 100,
      category: "minuman".to_string(),
      options: Json(vec![]),
    },
  ]
}

pub async fn seed_demo_catalog(catalog: &dyn CatalogStore) -> AppResult<()> {
  let products = demo_products();
  let count = products.len();
  for product in products {
    catalog.insert(product).await?;
  }
  info!(count, "Demo catalog seeded.");
  Ok(())
}
