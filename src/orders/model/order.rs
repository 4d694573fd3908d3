use std::borrow::Cow;
use std::str::FromStr;

use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};
use validator_derive::Validate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  #[default]
  Pending,
  Completed,
  Canceled,
}

impl OrderStatus {
  pub const ALL: [OrderStatus; 3] =
    [OrderStatus::Pending, OrderStatus::Completed, OrderStatus::Canceled];

  pub fn as_str(&self) -> &'static str {
    match self {
      OrderStatus::Pending => "pending",
      OrderStatus::Completed => "completed",
      OrderStatus::Canceled => "canceled",
    }
  }
}

#[derive(Debug, PartialEq, Eq)]
pub struct UnknownOrderStatus;

impl FromStr for OrderStatus {
  type Err = UnknownOrderStatus;

  fn from_str(value: &str) -> Result<Self, Self::Err> {
    OrderStatus::ALL
      .into_iter()
      .find(|status| status.as_str() == value)
      .ok_or(UnknownOrderStatus)
  }
}

pub fn validate_order_status(value: &str) -> Result<(), ValidationError> {
  value.parse::<OrderStatus>().map(|_| ()).map_err(|_| {
    ValidationError::new("status").with_message(Cow::from(format!(
      "{} is not a valid order status",
      value
    )))
  })
}

/// Product reference with the quantity and the price paid at order time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct LineItem {
  pub product: ObjectId,
  #[validate(range(min = 1))]
  pub quantity: i64,
  #[validate(range(min = 0.0))]
  pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Order {
  #[serde(rename = "_id")]
  pub id: ObjectId,
  pub user: ObjectId,
  #[validate(length(min = 1), nested)]
  pub products: Vec<LineItem>,
  #[validate(range(min = 0.0))]
  pub total: f64,
  pub status: OrderStatus,
  #[serde(rename = "createdAt", with = "chrono_datetime_as_bson_datetime")]
  pub created_at: DateTime<Utc>,
  #[serde(rename = "updatedAt", with = "chrono_datetime_as_bson_datetime")]
  pub updated_at: DateTime<Utc>,
}
