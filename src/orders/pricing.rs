use std::collections::HashMap;

use bson::oid::ObjectId;

use crate::orders::model::order::LineItem;
use crate::products::repository::product_repository::ProductRepository;
use crate::shared::api_error::ApiError;

/// Every line item must reference an existing product and carry exactly its
/// current price. Items are checked in order and the first failure is
/// reported.
pub async fn check_order_prices(
  products: &dyn ProductRepository,
  items: &[LineItem],
) -> Result<(), ApiError> {
  let mut ids: Vec<ObjectId> = items.iter().map(|item| item.product).collect();
  ids.sort();
  ids.dedup();

  let current: HashMap<ObjectId, f64> = products
    .find_many(&ids)
    .await?
    .into_iter()
    .map(|product| (product.id, product.price))
    .collect();

  for item in items {
    match current.get(&item.product) {
      None => return Err(product_not_found(&item.product.to_hex())),
      Some(price) if *price != item.price => {
        tracing::info!(
          product_id = %item.product,
          submitted = item.price,
          current = *price,
          "Order price mismatch"
        );
        return Err(ApiError::BadRequest(format!(
          "Price mismatch for product with ID {}",
          item.product
        )));
      }
      Some(_) => {}
    }
  }
  Ok(())
}

pub fn product_not_found(id: &str) -> ApiError {
  ApiError::BadRequest(format!("Product with ID {} not found", id))
}
