mod auth;
mod orders;
mod products;
mod shared;
mod users;

use std::sync::Arc;

use actix_web::middleware::{from_fn, Logger};
use actix_web::{guard, web, App, HttpServer};
use auth::auth_login;
use orders::repository::order_repository::{
  MongoOrderRepositoryImpl, OrderRepository,
};
use orders::{create_order, list_orders};
use products::repository::product_repository::{
  MongoProductRepositoryImpl, ProductRepository,
};
use products::{
  create_product, delete_product, get_product, list_products, update_product,
};
use shared::api_error::ApiError;
use shared::config::Config;
use shared::database::MongoDatabase;
use shared::hash_worker::{HashWorker, Hasher};
use shared::middleware::access_control::{require_admin, require_auth};
use shared::static_files::serve_upload;
use tracing_subscriber::EnvFilter;
use users::repository::user_repository::{
  MongoUserRepositoryImpl, UserRepository,
};
use users::{create_user, delete_user, get_user, list_users, update_user};

// This struct represents state
pub struct AppState {
  pub config: Config,
  pub user_repository: Arc<dyn UserRepository>,
  pub product_repository: Arc<dyn ProductRepository>,
  pub order_repository: Arc<dyn OrderRepository>,
  pub hasher: Arc<dyn Hasher>,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  let _ = dotenvy::dotenv();
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info")),
    )
    .init();

  let config = Config::from_env()?;
  let database = MongoDatabase::connect(&config).await?;
  tokio::fs::create_dir_all(&config.uploads_dir).await?;

  let state = web::Data::new(AppState {
    user_repository: Arc::new(MongoUserRepositoryImpl::init(&database).await?),
    product_repository: Arc::new(MongoProductRepositoryImpl::new(&database)),
    order_repository: Arc::new(MongoOrderRepositoryImpl::new(&database)),
    hasher: Arc::new(HashWorker::new(config.hash_threads)?),
    config: config.clone(),
  });

  let server_address = config.bind_address();
  tracing::info!("Listening on http://{}", server_address);
  HttpServer::new(move || {
    App::new()
      .wrap(Logger::default())
      .app_data(state.clone())
      .configure(configure)
  })
  .bind(server_address)?
  .run()
  .await?;
  Ok(())
}

// Function to initialize the App
pub fn configure(config: &mut web::ServiceConfig) {
  config
    .app_data(web::JsonConfig::default().error_handler(|error, _| {
      tracing::debug!(%error, "Rejected JSON body");
      ApiError::BadRequest(String::from("The request body is not valid JSON"))
        .into()
    }))
    .service(
      web::scope("/api")
        .route("/login", web::post().to(auth_login))
        .service(
          web::resource("/users")
            .guard(guard::Get())
            .route(web::get().to(list_users)),
        )
        .service(
          web::resource("/users")
            .guard(guard::Post())
            .wrap(from_fn(require_admin))
            .route(web::post().to(create_user)),
        )
        .service(
          web::resource("/users/{id}")
            .guard(guard::Get())
            .route(web::get().to(get_user)),
        )
        .service(
          web::resource("/users/{id}")
            .guard(guard::Any(guard::Put()).or(guard::Delete()))
            .wrap(from_fn(require_admin))
            .route(web::put().to(update_user))
            .route(web::delete().to(delete_user)),
        )
        .service(
          web::resource("/products")
            .route(web::get().to(list_products))
            .route(web::post().to(create_product)),
        )
        .service(
          web::resource("/products/{id}")
            .route(web::get().to(get_product))
            .route(web::put().to(update_product))
            .route(web::delete().to(delete_product)),
        )
        .service(
          web::resource("/orders")
            .wrap(from_fn(require_auth))
            .route(web::get().to(list_orders))
            .route(web::post().to(create_order)),
        ),
    )
    .route("/uploads/{path:.*}", web::get().to(serve_upload));
}
