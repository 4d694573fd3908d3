use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator_derive::Validate;

use crate::shared::validation::validate_not_future;

/// Stored product document. `image` is the generated file name inside the
/// `products` uploads folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Product {
  #[serde(rename = "_id")]
  pub id: ObjectId,
  #[validate(length(min = 3, max = 100))]
  pub product: String,
  #[validate(length(min = 5, max = 500))]
  pub description: String,
  #[validate(range(min = 0.0))]
  pub price: f64,
  #[validate(length(min = 1, message = "You must select an image for the product"))]
  pub image: String,
  #[validate(length(min = 1, message = "The field category is required"))]
  pub category: String,
  #[serde(rename = "dateCreate", with = "chrono_datetime_as_bson_datetime")]
  #[validate(custom(function = "validate_not_future"))]
  pub date_create: DateTime<Utc>,
  #[serde(rename = "createdAt", with = "chrono_datetime_as_bson_datetime")]
  pub created_at: DateTime<Utc>,
  #[serde(rename = "updatedAt", with = "chrono_datetime_as_bson_datetime")]
  pub updated_at: DateTime<Utc>,
}
