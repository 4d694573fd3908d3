use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::orders::model::order::{LineItem, Order, OrderStatus};
use crate::products::model::product::Product;
use crate::users::model::user::User;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItemRto<P> {
  pub product: P,
  pub quantity: i64,
  pub price: f64,
}

/// An order as returned to clients. `U` and `P` are either plain ids or the
/// expanded user / product summaries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderRto<U, P> {
  #[serde(rename = "_id")]
  pub id: String,
  pub user: U,
  pub products: Vec<LineItemRto<P>>,
  pub total: f64,
  pub status: OrderStatus,
  #[serde(rename = "createdAt")]
  pub created_at: DateTime<Utc>,
  #[serde(rename = "updatedAt")]
  pub updated_at: DateTime<Utc>,
}

pub type CreatedOrderRto = OrderRto<String, String>;
pub type ExpandedOrderRto =
  OrderRto<Option<OrderUserRto>, Option<OrderProductRto>>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderUserRto {
  #[serde(rename = "_id")]
  pub id: String,
  pub name: String,
  pub email: String,
}

impl From<&User> for OrderUserRto {
  fn from(user: &User) -> Self {
    Self {
      id: user.id.to_hex(),
      name: user.name.clone(),
      email: user.email.clone(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderProductRto {
  #[serde(rename = "_id")]
  pub id: String,
  pub product: String,
  pub price: f64,
  pub image: String,
}

impl From<&Product> for OrderProductRto {
  fn from(product: &Product) -> Self {
    Self {
      id: product.id.to_hex(),
      product: product.product.clone(),
      price: product.price,
      image: product.image.clone(),
    }
  }
}

impl<U, P> OrderRto<U, P> {
  /// Builds the response shape, resolving the owner and every line item
  /// product through the given lookups.
  pub fn map(
    order: Order,
    user: impl FnOnce(&Order) -> U,
    mut product: impl FnMut(&LineItem) -> P,
  ) -> Self {
    let user = user(&order);
    Self {
      id: order.id.to_hex(),
      user,
      products: order
        .products
        .iter()
        .map(|item| LineItemRto {
          product: product(item),
          quantity: item.quantity,
          price: item.price,
        })
        .collect(),
      total: order.total,
      status: order.status,
      created_at: order.created_at,
      updated_at: order.updated_at,
    }
  }
}

impl From<Order> for CreatedOrderRto {
  fn from(order: Order) -> Self {
    OrderRto::map(
      order,
      |order| order.user.to_hex(),
      |item| item.product.to_hex(),
    )
  }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderMessageRto {
  pub message: String,
  pub order: CreatedOrderRto,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderListRto {
  pub message: String,
  pub orders: Vec<ExpandedOrderRto>,
}
