use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};
use validator_derive::Validate;

use crate::orders::model::order::validate_order_status;

const EMPTY_ORDER: &str = "The order must contain at least one product";

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct LineItemDto {
  #[validate(required(message = "Every line item needs a product"))]
  pub product: Option<String>,
  #[validate(required, range(min = 1))]
  pub quantity: Option<i64>,
  #[validate(required, range(min = 0.0))]
  pub price: Option<f64>,
}

/// Body of `POST /api/orders`. `user` defaults to the caller.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOrderDto {
  pub user: Option<String>,
  #[validate(
    required(message = "The order must contain at least one product"),
    custom(function = "validate_has_items"),
    nested
  )]
  pub products: Option<Vec<LineItemDto>>,
  #[validate(required, range(min = 0.0))]
  pub total: Option<f64>,
  #[validate(custom(function = "validate_order_status"))]
  pub status: Option<String>,
}

fn validate_has_items(items: &[LineItemDto]) -> Result<(), ValidationError> {
  if items.is_empty() {
    return Err(
      ValidationError::new("products").with_message(Cow::from(EMPTY_ORDER)),
    );
  }
  Ok(())
}
