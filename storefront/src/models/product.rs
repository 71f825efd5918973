// storefront/src/models/product.rs

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A purchasable variant of a product that adds to its base price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOption {
  pub title: String,
  pub additional_price: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
  pub id: String,
  pub title: String,
  pub description: Option<String>,
  pub price: i64,
  pub stock: i32,
  /// Category slug.
  pub category: String,
  pub options: Json<Vec<ProductOption>>,
}

impl Product {
  /// Price of one unit with `option` applied; `None` if the option does not exist.
  pub fn unit_price(&self, option: Option<&str>) -> Option<i64> {
    match option {
      None => Some(self.price),
      Some(label) => self
        .options
        .iter()
        .find(|o| o.title == label)
        .map(|o| self.price + o.additional_price),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn pizza() -> Product {
    Product {
      id: "pizza-margherita".to_string(),
      title: "Margherita".to_string(),
      description: None,
      price: 45000,
      stock: 10,
      category: "pizzas".to_string(),
      options: Json(vec![
        ProductOption {
          title: "Small".to_string(),
          additional_price: 0,
        },
        ProductOption {
          title: "Large".to_string(),
          additional_price: 20000,
        },
      ]),
    }
  }

  #[test]
  fn unit_price_adds_option_surcharge() {
    let p = pizza();
    assert_eq!(p.unit_price(None), Some(45000));
    assert_eq!(p.unit_price(Some("Small")), Some(45000));
    assert_eq!(p.unit_price(Some("Large")), Some(65000));
    assert_eq!(p.unit_price(Some("Family")), None);
  }
}
