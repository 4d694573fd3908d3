pub mod dto;
pub mod model;
pub mod repository;
pub mod rto;

use actix_multipart::Multipart;
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use dto::product_list_query::ProductListQuery;
use model::product::Product;
use rto::product_rto::{ProductListRto, ProductMessageRto, ProductRto};
use validator::Validate;

use crate::shared::api_error::ApiError;
use crate::shared::database::parse_object_id;
use crate::shared::rto::message_rto::MessageRto;
use crate::shared::upload::{receive_upload, remove_image, UploadForm};
use crate::shared::validation::parse_date;
use crate::AppState;

/// Uploads folder holding product images.
pub const IMAGE_CATEGORY: &str = "products";
const MIN_DESCRIPTION_LENGTH: usize = 5;

pub async fn list_products(
  data: web::Data<AppState>,
  query: web::Query<ProductListQuery>,
) -> Result<HttpResponse, ApiError> {
  let products = data
    .product_repository
    .find_page(query.page(), query.limit())
    .await?;

  Ok(HttpResponse::Ok().json(ProductListRto {
    message: String::from("Products retrieved successfully"),
    products: products.into_iter().map(ProductRto::from).collect(),
  }))
}

pub async fn get_product(
  data: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
  let product = match parse_object_id(&path) {
    Some(id) => data.product_repository.find_one(id).await?,
    None => None,
  };
  let product = product.ok_or_else(|| {
    ApiError::NotFound(String::from("The product was not found"))
  })?;
  Ok(HttpResponse::Ok().json(ProductRto::from(product)))
}

pub async fn create_product(
  req: HttpRequest,
  data: web::Data<AppState>,
  payload: Multipart,
) -> Result<HttpResponse, ApiError> {
  let form =
    receive_upload(payload, req.path(), &data.config.uploads_dir).await?;

  let product = match insert_product(&data, &form).await {
    Ok(product) => product,
    Err(error) => {
      form.discard().await;
      return Err(error);
    }
  };

  tracing::info!(
    product_id = %product.id,
    image = %product.image,
    "Product created"
  );
  Ok(
    HttpResponse::Created()
      .append_header((header::LOCATION, format!("/api/products/{}", product.id)))
      .json(ProductMessageRto {
        message: String::from("Product created successfully"),
        product: ProductRto::from(product),
      }),
  )
}

async fn insert_product(
  data: &AppState,
  form: &UploadForm,
) -> Result<Product, ApiError> {
  let product = required(form, "product", "The product name is required")?;
  let description =
    required(form, "description", "The product description is required")?;
  let price = required(form, "price", "The product price is required")?;
  let category = required(form, "category", "The product category is required")?;
  let date_create =
    required(form, "dateCreate", "The product creation date is required")?;

  if description.chars().count() < MIN_DESCRIPTION_LENGTH {
    return Err(ApiError::BadRequest(String::from(
      "The description must be at least 5 characters",
    )));
  }
  let image = form.image.as_ref().ok_or_else(|| {
    ApiError::BadRequest(String::from("You must select an image for the product"))
  })?;

  let now = Utc::now();
  let product = Product {
    id: ObjectId::new(),
    product: product.to_string(),
    description: description.to_string(),
    price: parse_price(price)?,
    image: image.file_name.clone(),
    category: category.to_string(),
    date_create: parse_date_create(date_create)?,
    created_at: now,
    updated_at: now,
  };
  data.product_repository.create(&product).await?;
  Ok(product)
}

pub async fn update_product(
  req: HttpRequest,
  data: web::Data<AppState>,
  path: web::Path<String>,
  payload: Multipart,
) -> Result<HttpResponse, ApiError> {
  let form =
    receive_upload(payload, req.path(), &data.config.uploads_dir).await?;

  let product = match apply_update(&data, &path, &form).await {
    Ok(product) => product,
    Err(error) => {
      form.discard().await;
      return Err(error);
    }
  };

  tracing::info!(product_id = %product.id, "Product updated");
  Ok(HttpResponse::Ok().json(ProductMessageRto {
    message: String::from("Product updated successfully"),
    product: ProductRto::from(product),
  }))
}

/// Merges the submitted fields into the stored product, validates the result
/// and replaces the previous image when a new one was uploaded.
async fn apply_update(
  data: &AppState,
  id: &str,
  form: &UploadForm,
) -> Result<Product, ApiError> {
  let stored = match parse_object_id(id) {
    Some(id) => data.product_repository.find_one(id).await?,
    None => None,
  };
  let mut product = stored.ok_or_else(product_not_updated)?;
  let previous_image = product.image.clone();

  if let Some(name) = form.text("product") {
    product.product = name.to_string();
  }
  if let Some(description) = form.text("description") {
    product.description = description.to_string();
  }
  if let Some(price) = form.text("price") {
    product.price = parse_price(price)?;
  }
  if let Some(category) = form.text("category") {
    product.category = category.to_string();
  }
  if let Some(date_create) = form.text("dateCreate") {
    product.date_create = parse_date_create(date_create)?;
  }
  if let Some(image) = &form.image {
    product.image = image.file_name.clone();
  }
  product.updated_at = Utc::now();

  product.validate()?;

  if form.image.is_some() && !previous_image.is_empty() {
    remove_image(&data.config.uploads_dir, IMAGE_CATEGORY, &previous_image)
      .await;
  }

  data
    .product_repository
    .replace(&product)
    .await?
    .ok_or_else(product_not_updated)
}

pub async fn delete_product(
  data: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
  let product = match parse_object_id(&path) {
    Some(id) => data.product_repository.find_one(id).await?,
    None => None,
  };
  let product = product.ok_or_else(|| {
    ApiError::NotFound(String::from("The product could not be deleted"))
  })?;

  if !product.image.is_empty() {
    remove_image(&data.config.uploads_dir, IMAGE_CATEGORY, &product.image)
      .await;
  }
  let deleted = data
    .product_repository
    .delete(product.id)
    .await?
    .ok_or_else(|| {
      ApiError::NotFound(String::from("The product could not be deleted"))
    })?;

  tracing::info!(product_id = %deleted.id, "Product deleted");
  Ok(HttpResponse::Ok().json(MessageRto::from(format!(
    "The product {} was deleted successfully",
    deleted.product
  ))))
}

fn required<'a>(
  form: &'a UploadForm,
  field: &str,
  message: &str,
) -> Result<&'a str, ApiError> {
  form
    .text(field)
    .ok_or_else(|| ApiError::BadRequest(message.to_string()))
}

fn parse_price(value: &str) -> Result<f64, ApiError> {
  value
    .parse::<f64>()
    .ok()
    .filter(|price| price.is_finite())
    .ok_or_else(|| {
      ApiError::validation(vec![String::from("The price must be a number")])
    })
}

fn parse_date_create(value: &str) -> Result<DateTime<Utc>, ApiError> {
  parse_date(value).ok_or_else(|| {
    ApiError::validation(vec![String::from("The date is not a valid date")])
  })
}

fn product_not_updated() -> ApiError {
  ApiError::NotFound(String::from("The product could not be updated"))
}

#[cfg(test)]
mod tests {
  use actix_web::http::StatusCode;
  use actix_web::{test, App};
  use chrono::Duration;

  use super::*;
  use crate::configure;
  use crate::helpers::tests::TestContext;
  use crate::shared::http_error::HttpError;
  use crate::shared::upload::tests::MultipartBody;
  use crate::shared::upload::upload_category;

  const JPEG: &[u8] = b"\xFF\xD8\xFF\xE0 fake jpeg";

  fn mug_form() -> MultipartBody {
    MultipartBody::new()
      .text("product", "Mug")
      .text("description", "A plain mug")
      .text("price", "10")
      .text("category", "kitchen")
      .text("dateCreate", "2024-01-15")
  }

  fn stored_images(context: &TestContext) -> usize {
    std::fs::read_dir(context.uploads_dir().join(IMAGE_CATEGORY))
      .map(|entries| entries.count())
      .unwrap_or(0)
  }

  #[actix_web::test]
  async fn test_image_category_matches_upload_routing() {
    assert_eq!(upload_category("/api/products"), IMAGE_CATEGORY);
  }

  #[actix_web::test]
  async fn test_create_then_get_product() {
    let context = TestContext::new();
    let app = test::init_service(
      App::new().app_data(context.state.clone()).configure(configure),
    )
    .await;

    let request = test::TestRequest::post()
      .uri("/api/products")
      .insert_header(MultipartBody::content_type())
      .set_payload(
        mug_form()
          .file("image", "mug.jpg", "image/jpeg", JPEG)
          .build(),
      )
      .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: ProductMessageRto = test::read_body_json(response).await;
    assert_ne!(created.product.image, "mug.jpg");
    assert!(created.product.image.ends_with(".jpg"));
    assert_eq!(stored_images(&context), 1);

    let request = test::TestRequest::get()
      .uri(&format!("/api/products/{}", created.product.id))
      .to_request();
    let fetched: ProductRto = test::call_and_read_body_json(&app, request).await;
    assert_eq!(fetched.product, "Mug");
    assert_eq!(fetched.description, "A plain mug");
    assert_eq!(fetched.price, 10.0);
    assert_eq!(fetched.category, "kitchen");
    assert_eq!(fetched.image, created.product.image);
    assert_eq!(fetched.date_create, created.product.date_create);
  }

  #[actix_web::test]
  async fn test_unsupported_image_type_creates_nothing() {
    let context = TestContext::new();
    let app = test::init_service(
      App::new().app_data(context.state.clone()).configure(configure),
    )
    .await;

    let request = test::TestRequest::post()
      .uri("/api/products")
      .insert_header(MultipartBody::content_type())
      .set_payload(
        mug_form()
          .file("image", "mug.pdf", "application/pdf", b"%PDF-1.4")
          .build(),
      )
      .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: HttpError = test::read_body_json(response).await;
    assert!(body.message.starts_with("Unsupported file type"));

    assert!(context.products.products.read().unwrap().is_empty());
    assert_eq!(stored_images(&context), 0);
  }

  #[actix_web::test]
  async fn test_create_checks_required_fields_in_order() {
    let context = TestContext::new();
    let app = test::init_service(
      App::new().app_data(context.state.clone()).configure(configure),
    )
    .await;

    let request = test::TestRequest::post()
      .uri("/api/products")
      .insert_header(MultipartBody::content_type())
      .set_payload(
        MultipartBody::new()
          .text("price", "10")
          .file("image", "mug.jpg", "image/jpeg", JPEG)
          .build(),
      )
      .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: HttpError = test::read_body_json(response).await;
    assert_eq!(body.message, "The product name is required");
    // The uploaded image is discarded with the rejected request.
    assert_eq!(stored_images(&context), 0);

    let request = test::TestRequest::post()
      .uri("/api/products")
      .insert_header(MultipartBody::content_type())
      .set_payload(
        MultipartBody::new()
          .text("product", "Mug")
          .text("description", "Mug")
          .text("price", "10")
          .text("category", "kitchen")
          .text("dateCreate", "2024-01-15")
          .file("image", "mug.jpg", "image/jpeg", JPEG)
          .build(),
      )
      .to_request();
    let body: HttpError = test::call_and_read_body_json(&app, request).await;
    assert_eq!(body.message, "The description must be at least 5 characters");

    let request = test::TestRequest::post()
      .uri("/api/products")
      .insert_header(MultipartBody::content_type())
      .set_payload(mug_form().build())
      .to_request();
    let body: HttpError = test::call_and_read_body_json(&app, request).await;
    assert_eq!(body.message, "You must select an image for the product");
  }

  #[actix_web::test]
  async fn test_create_reports_schema_violations() {
    let context = TestContext::new();
    let app = test::init_service(
      App::new().app_data(context.state.clone()).configure(configure),
    )
    .await;

    let future = (Utc::now() + Duration::days(3)).format("%Y-%m-%d").to_string();
    let request = test::TestRequest::post()
      .uri("/api/products")
      .insert_header(MultipartBody::content_type())
      .set_payload(
        MultipartBody::new()
          .text("product", "Mu")
          .text("description", "A plain mug")
          .text("price", "-3")
          .text("category", "kitchen")
          .text("dateCreate", &future)
          .file("image", "mug.webp", "image/webp", b"RIFF")
          .build(),
      )
      .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: HttpError = test::read_body_json(response).await;
    assert_eq!(body.message, "Validation error");
    assert!(body
      .errors
      .contains(&String::from("The field product must be at least 3 characters")));
    assert!(body
      .errors
      .contains(&String::from("The date cannot be in the future")));
    assert_eq!(stored_images(&context), 0);
  }

  #[actix_web::test]
  async fn test_list_products_paginates_oldest_first() {
    let context = TestContext::new();
    let first = context.insert_product(5.0).await;
    let second = context.insert_product(7.5).await;
    let third = context.insert_product(9.0).await;
    let app = test::init_service(
      App::new().app_data(context.state.clone()).configure(configure),
    )
    .await;

    let request = test::TestRequest::get()
      .uri("/api/products?page=0&limit=2")
      .to_request();
    let body: ProductListRto = test::call_and_read_body_json(&app, request).await;
    let ids: Vec<_> = body.products.iter().map(|p| p.id.clone()).collect();
    assert_eq!(ids, vec![first.id.to_hex(), second.id.to_hex()]);

    let request = test::TestRequest::get()
      .uri("/api/products?page=1&limit=2")
      .to_request();
    let body: ProductListRto = test::call_and_read_body_json(&app, request).await;
    assert_eq!(body.products.len(), 1);
    assert_eq!(body.products[0].id, third.id.to_hex());

    let request = test::TestRequest::get()
      .uri("/api/products?page=abc&limit=0")
      .to_request();
    let body: ProductListRto = test::call_and_read_body_json(&app, request).await;
    assert_eq!(body.products.len(), 3);
  }

  #[actix_web::test]
  async fn test_delete_removes_image_then_product() {
    let context = TestContext::new();
    let product = context.insert_product(12.0).await;
    let image_path = context
      .uploads_dir()
      .join(IMAGE_CATEGORY)
      .join(&product.image);
    assert!(image_path.exists());
    let app = test::init_service(
      App::new().app_data(context.state.clone()).configure(configure),
    )
    .await;

    let request = test::TestRequest::delete()
      .uri(&format!("/api/products/{}", product.id))
      .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!image_path.exists());

    let request = test::TestRequest::get()
      .uri(&format!("/api/products/{}", product.id))
      .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let request = test::TestRequest::delete()
      .uri(&format!("/api/products/{}", product.id))
      .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
  }

  #[actix_web::test]
  async fn test_update_replaces_image_and_merges_fields() {
    let context = TestContext::new();
    let product = context.insert_product(12.0).await;
    let old_image = context
      .uploads_dir()
      .join(IMAGE_CATEGORY)
      .join(&product.image);
    let app = test::init_service(
      App::new().app_data(context.state.clone()).configure(configure),
    )
    .await;

    let request = test::TestRequest::put()
      .uri(&format!("/api/products/{}", product.id))
      .insert_header(MultipartBody::content_type())
      .set_payload(
        MultipartBody::new()
          .text("price", "15.5")
          .file("image", "new.gif", "image/gif", b"GIF89a")
          .build(),
      )
      .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: ProductMessageRto = test::read_body_json(response).await;

    assert_eq!(body.product.price, 15.5);
    assert_eq!(body.product.product, product.product);
    assert_ne!(body.product.image, product.image);
    assert!(!old_image.exists());
    assert!(context
      .uploads_dir()
      .join(IMAGE_CATEGORY)
      .join(&body.product.image)
      .exists());
  }

  #[actix_web::test]
  async fn test_invalid_update_keeps_stored_product() {
    let context = TestContext::new();
    let product = context.insert_product(12.0).await;
    let app = test::init_service(
      App::new().app_data(context.state.clone()).configure(configure),
    )
    .await;

    let request = test::TestRequest::put()
      .uri(&format!("/api/products/{}", product.id))
      .insert_header(MultipartBody::content_type())
      .set_payload(
        MultipartBody::new()
          .text("description", "tiny")
          .file("image", "new.png", "image/png", b"\x89PNG")
          .build(),
      )
      .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let stored = context.products.products.read().unwrap()[0].clone();
    assert_eq!(stored, product);
    // Old image kept, new one discarded.
    assert_eq!(stored_images(&context), 1);

    let request = test::TestRequest::put()
      .uri(&format!("/api/products/{}", ObjectId::new()))
      .insert_header(MultipartBody::content_type())
      .set_payload(MultipartBody::new().text("price", "1").build())
      .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
  }
}
