use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::products::model::product::Product;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductRto {
  #[serde(rename = "_id")]
  pub id: String,
  pub product: String,
  pub description: String,
  pub price: f64,
  pub image: String,
  pub category: String,
  #[serde(rename = "dateCreate")]
  pub date_create: DateTime<Utc>,
  #[serde(rename = "createdAt")]
  pub created_at: DateTime<Utc>,
  #[serde(rename = "updatedAt")]
  pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductRto {
  fn from(product: Product) -> Self {
    Self {
      id: product.id.to_hex(),
      product: product.product,
      description: product.description,
      price: product.price,
      image: product.image,
      category: product.category,
      date_create: product.date_create,
      created_at: product.created_at,
      updated_at: product.updated_at,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductMessageRto {
  pub message: String,
  pub product: ProductRto,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductListRto {
  pub message: String,
  pub products: Vec<ProductRto>,
}
