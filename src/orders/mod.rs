pub mod dto;
pub mod model;
pub mod pricing;
pub mod repository;
pub mod rto;
pub mod scope;

use std::collections::HashMap;

use actix_web::{web, HttpResponse};
use bson::oid::ObjectId;
use chrono::Utc;
use dto::create_order_dto::CreateOrderDto;
use model::order::{LineItem, Order};
use pricing::{check_order_prices, product_not_found};
use rto::order_rto::{
  CreatedOrderRto, ExpandedOrderRto, OrderListRto, OrderMessageRto,
  OrderProductRto, OrderUserRto,
};
use scope::OrderScope;
use validator::Validate;

use crate::auth::token::Claims;
use crate::shared::api_error::ApiError;
use crate::shared::database::parse_object_id;
use crate::AppState;

pub async fn list_orders(
  data: web::Data<AppState>,
  scope: OrderScope,
) -> Result<HttpResponse, ApiError> {
  let orders = data.order_repository.find(scope).await?;

  let user_ids = unique(orders.iter().map(|order| order.user));
  let product_ids = unique(
    orders
      .iter()
      .flat_map(|order| order.products.iter().map(|item| item.product)),
  );

  let users: HashMap<ObjectId, OrderUserRto> = data
    .user_repository
    .find_many(&user_ids)
    .await?
    .iter()
    .map(|user| (user.id, OrderUserRto::from(user)))
    .collect();
  let products: HashMap<ObjectId, OrderProductRto> = data
    .product_repository
    .find_many(&product_ids)
    .await?
    .iter()
    .map(|product| (product.id, OrderProductRto::from(product)))
    .collect();

  let orders: Vec<ExpandedOrderRto> = orders
    .into_iter()
    .map(|order| {
      ExpandedOrderRto::map(
        order,
        |order| users.get(&order.user).cloned(),
        |item| products.get(&item.product).cloned(),
      )
    })
    .collect();

  Ok(HttpResponse::Ok().json(OrderListRto {
    message: String::from("Orders retrieved successfully"),
    orders,
  }))
}

pub async fn create_order(
  data: web::Data<AppState>,
  claims: Claims,
  dto: web::Json<CreateOrderDto>,
) -> Result<HttpResponse, ApiError> {
  let dto = dto.into_inner();
  dto.validate()?;

  let caller = claims
    .user_id()
    .ok_or_else(|| ApiError::Unauthorized(String::from("Invalid token")))?;
  let owner = match dto.user.as_deref() {
    None => caller,
    Some(user) => parse_object_id(user).ok_or_else(|| {
      ApiError::BadRequest(format!("User with ID {} not found", user))
    })?,
  };
  if owner != caller && !claims.is_admin() {
    return Err(ApiError::Forbidden(String::from(
      "You cannot create orders for another user",
    )));
  }

  let items = line_items(dto.products.unwrap_or_default())?;
  check_order_prices(data.product_repository.as_ref(), &items).await?;

  let now = Utc::now();
  let order = Order {
    id: ObjectId::new(),
    user: owner,
    products: items,
    total: dto.total.unwrap_or_default(),
    // Checked by the DTO validation.
    status: dto
      .status
      .as_deref()
      .and_then(|status| status.parse().ok())
      .unwrap_or_default(),
    created_at: now,
    updated_at: now,
  };
  data.order_repository.create(&order).await?;

  tracing::info!(order_id = %order.id, user_id = %order.user, "Order created");
  Ok(HttpResponse::Created().json(OrderMessageRto {
    message: String::from("Order created successfully"),
    order: CreatedOrderRto::from(order),
  }))
}

fn line_items(
  items: Vec<dto::create_order_dto::LineItemDto>,
) -> Result<Vec<LineItem>, ApiError> {
  items
    .into_iter()
    .map(|item| {
      let raw_id = item.product.unwrap_or_default();
      let product =
        parse_object_id(&raw_id).ok_or_else(|| product_not_found(&raw_id))?;
      Ok(LineItem {
        product,
        quantity: item.quantity.unwrap_or_default(),
        price: item.price.unwrap_or_default(),
      })
    })
    .collect()
}

fn unique(ids: impl Iterator<Item = ObjectId>) -> Vec<ObjectId> {
  let mut ids: Vec<ObjectId> = ids.collect();
  ids.sort();
  ids.dedup();
  ids
}

#[cfg(test)]
mod tests {
  use actix_web::http::StatusCode;
  use actix_web::{test, App};

  use super::*;
  use crate::configure;
  use crate::helpers::tests::TestContext;
  use crate::orders::model::order::OrderStatus;
  use crate::shared::http_error::HttpError;
  use crate::shared::middleware::access_control::TOKEN_HEADER;
  use crate::shared::role::Role;

  #[actix_web::test]
  async fn test_create_order_with_current_prices() {
    let context = TestContext::new();
    let user = context
      .insert_user("ana@example.com", "Secret#123", Role::User)
      .await;
    let mug = context.insert_product(10.0).await;
    let app = test::init_service(
      App::new().app_data(context.state.clone()).configure(configure),
    )
    .await;

    let request = test::TestRequest::post()
      .uri("/api/orders")
      .insert_header((TOKEN_HEADER, context.token_for(&user)))
      .set_json(serde_json::json!({
        "products": [{ "product": mug.id.to_hex(), "quantity": 2, "price": 10.0 }],
        "total": 20.0
      }))
      .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: OrderMessageRto = test::read_body_json(response).await;

    assert_eq!(body.order.user, user.id.to_hex());
    assert_eq!(body.order.status, OrderStatus::Pending);
    assert_eq!(body.order.products[0].product, mug.id.to_hex());
    assert_eq!(context.orders.orders.read().unwrap().len(), 1);
  }

  #[actix_web::test]
  async fn test_price_mismatch_persists_nothing() {
    let context = TestContext::new();
    let user = context
      .insert_user("ana@example.com", "Secret#123", Role::User)
      .await;
    let mug = context.insert_product(10.0).await;
    let app = test::init_service(
      App::new().app_data(context.state.clone()).configure(configure),
    )
    .await;

    let request = test::TestRequest::post()
      .uri("/api/orders")
      .insert_header((TOKEN_HEADER, context.token_for(&user)))
      .set_json(serde_json::json!({
        "products": [{ "product": mug.id.to_hex(), "quantity": 1, "price": 8.0 }],
        "total": 8.0
      }))
      .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: HttpError = test::read_body_json(response).await;
    assert!(body.message.contains(&mug.id.to_hex()));
    assert!(context.orders.orders.read().unwrap().is_empty());
  }

  #[actix_web::test]
  async fn test_unknown_status_is_rejected_per_field() {
    let context = TestContext::new();
    let user = context
      .insert_user("ana@example.com", "Secret#123", Role::User)
      .await;
    let mug = context.insert_product(10.0).await;
    let app = test::init_service(
      App::new().app_data(context.state.clone()).configure(configure),
    )
    .await;

    let request = test::TestRequest::post()
      .uri("/api/orders")
      .insert_header((TOKEN_HEADER, context.token_for(&user)))
      .set_json(serde_json::json!({
        "products": [{ "product": mug.id.to_hex(), "quantity": 1, "price": 10.0 }],
        "total": 10.0,
        "status": "shipped"
      }))
      .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: HttpError = test::read_body_json(response).await;
    assert_eq!(body.message, "Validation error");
    assert_eq!(
      body.errors,
      vec![String::from("shipped is not a valid order status")]
    );
    assert!(context.orders.orders.read().unwrap().is_empty());
  }

  #[actix_web::test]
  async fn test_unknown_product_persists_nothing() {
    let context = TestContext::new();
    let user = context
      .insert_user("ana@example.com", "Secret#123", Role::User)
      .await;
    let mug = context.insert_product(10.0).await;
    let missing = ObjectId::new();
    let app = test::init_service(
      App::new().app_data(context.state.clone()).configure(configure),
    )
    .await;

    for product in [missing.to_hex(), String::from("not-an-id")] {
      let request = test::TestRequest::post()
        .uri("/api/orders")
        .insert_header((TOKEN_HEADER, context.token_for(&user)))
        .set_json(serde_json::json!({
          "products": [
            { "product": mug.id.to_hex(), "quantity": 1, "price": 10.0 },
            { "product": product, "quantity": 1, "price": 1.0 }
          ],
          "total": 11.0
        }))
        .to_request();
      let response = test::call_service(&app, request).await;
      assert_eq!(response.status(), StatusCode::BAD_REQUEST);
      let body: HttpError = test::read_body_json(response).await;
      assert_eq!(body.message, format!("Product with ID {} not found", product));
    }
    assert!(context.orders.orders.read().unwrap().is_empty());
  }

  #[actix_web::test]
  async fn test_user_cannot_order_for_someone_else() {
    let context = TestContext::new();
    let user = context
      .insert_user("ana@example.com", "Secret#123", Role::User)
      .await;
    let other = context
      .insert_user("bruno@example.com", "Secret#123", Role::User)
      .await;
    let admin = context
      .insert_user("root@example.com", "Secret#123", Role::Admin)
      .await;
    let mug = context.insert_product(10.0).await;
    let app = test::init_service(
      App::new().app_data(context.state.clone()).configure(configure),
    )
    .await;
    let body = serde_json::json!({
      "user": other.id.to_hex(),
      "products": [{ "product": mug.id.to_hex(), "quantity": 1, "price": 10.0 }],
      "total": 10.0
    });

    let request = test::TestRequest::post()
      .uri("/api/orders")
      .insert_header((TOKEN_HEADER, context.token_for(&user)))
      .set_json(&body)
      .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let request = test::TestRequest::post()
      .uri("/api/orders")
      .insert_header((TOKEN_HEADER, context.token_for(&admin)))
      .set_json(&body)
      .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(context.orders.orders.read().unwrap()[0].user, other.id);
  }

  #[actix_web::test]
  async fn test_order_list_is_scoped_by_role() {
    let context = TestContext::new();
    let ana = context
      .insert_user("ana@example.com", "Secret#123", Role::User)
      .await;
    let bruno = context
      .insert_user("bruno@example.com", "Secret#123", Role::User)
      .await;
    let admin = context
      .insert_user("root@example.com", "Secret#123", Role::Admin)
      .await;
    let mug = context.insert_product(10.0).await;
    context.insert_order(&ana, &mug, 1).await;
    context.insert_order(&bruno, &mug, 2).await;
    context.insert_order(&ana, &mug, 3).await;
    let app = test::init_service(
      App::new().app_data(context.state.clone()).configure(configure),
    )
    .await;

    let request = test::TestRequest::get()
      .uri("/api/orders")
      .insert_header((TOKEN_HEADER, context.token_for(&ana)))
      .to_request();
    let body: OrderListRto = test::call_and_read_body_json(&app, request).await;
    assert_eq!(body.orders.len(), 2);
    for order in &body.orders {
      let user = order.user.as_ref().unwrap();
      assert_eq!(user.id, ana.id.to_hex());
      assert_eq!(user.email, "ana@example.com");
      let product = order.products[0].product.as_ref().unwrap();
      assert_eq!(product.product, mug.product);
      assert_eq!(product.image, mug.image);
    }
    // Newest first.
    assert_eq!(body.orders[0].products[0].quantity, 3);

    let request = test::TestRequest::get()
      .uri("/api/orders")
      .insert_header((TOKEN_HEADER, context.token_for(&admin)))
      .to_request();
    let body: OrderListRto = test::call_and_read_body_json(&app, request).await;
    assert_eq!(body.orders.len(), 3);

    let request = test::TestRequest::get().uri("/api/orders").to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
  }

  #[actix_web::test]
  async fn test_deleted_product_expands_to_null() {
    let context = TestContext::new();
    let ana = context
      .insert_user("ana@example.com", "Secret#123", Role::User)
      .await;
    let mug = context.insert_product(10.0).await;
    context.insert_order(&ana, &mug, 1).await;
    context.products.products.write().unwrap().clear();
    let app = test::init_service(
      App::new().app_data(context.state.clone()).configure(configure),
    )
    .await;

    let request = test::TestRequest::get()
      .uri("/api/orders")
      .insert_header((TOKEN_HEADER, context.token_for(&ana)))
      .to_request();
    let body: serde_json::Value =
      test::call_and_read_body_json(&app, request).await;
    assert!(body["orders"][0]["products"][0]["product"].is_null());
    assert_eq!(body["orders"][0]["products"][0]["price"], 10.0);
  }
}
