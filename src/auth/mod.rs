use actix_web::{web, HttpResponse};
use dto::login_dto::LoginDto;
use rto::login_rto::LoginRto;
use token::{issue_token, Claims};
use validator::Validate;

use crate::shared::api_error::ApiError;
use crate::users::repository::user_repository::FindOneProperty;
use crate::users::rto::user_rto::UserRto;
use crate::AppState;

pub mod dto;
pub mod rto;
pub mod token;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Unknown e-mail and wrong password produce the same response.
pub async fn auth_login(
  data: web::Data<AppState>,
  dto: web::Json<LoginDto>,
) -> Result<HttpResponse, ApiError> {
  let dto = dto.into_inner();
  let (email, password) = match (dto.validate(), dto.email, dto.password) {
    (Ok(()), Some(email), Some(password)) => {
      (email.trim().to_lowercase(), password)
    }
    _ => {
      return Err(ApiError::BadRequest(String::from(
        "Email and password are required",
      )))
    }
  };

  let user = data
    .user_repository
    .find_one(FindOneProperty::Email(&email))
    .await?;

  let verified = match &user {
    Some(user) => data
      .hasher
      .verify_password(&password, &user.password_hash)
      .await
      .unwrap_or_else(|error| {
        tracing::warn!(%error, user_id = %user.id, "Stored password hash is unreadable");
        false
      }),
    None => {
      // Spend the same bcrypt work as a real comparison.
      let _ = data.hasher.hash_password(&password).await;
      false
    }
  };

  let user = match user {
    Some(user) if verified => user,
    _ => {
      tracing::info!(email = %email, "Rejected login attempt");
      return Err(ApiError::NotFound(String::from(INVALID_CREDENTIALS)));
    }
  };

  let user = UserRto::from(user);
  let token = issue_token(&Claims::new(user.clone()), &data.config.jwt_secret)
    .map_err(|error| ApiError::internal("Could not complete the login", error))?;

  tracing::info!(user_id = %user.id, "User logged in");
  Ok(HttpResponse::Ok().json(LoginRto {
    message: String::from("Login successful"),
    user,
    token,
  }))
}
