use std::future::{ready, Ready};

use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{Payload, ServiceRequest, ServiceResponse};
use actix_web::middleware::Next;
use actix_web::{web, Error, FromRequest, HttpMessage, HttpRequest};

use crate::auth::token::{verify_token, Claims};
use crate::shared::api_error::ApiError;
use crate::AppState;

/// Request header carrying the signed session token.
pub const TOKEN_HEADER: &str = "access_token";

/// Rejects the request with 401 unless it carries a valid token, then makes
/// the decoded `Claims` available to the handler.
pub async fn require_auth<B: MessageBody + 'static>(
  req: ServiceRequest,
  next: Next<B>,
) -> Result<ServiceResponse<BoxBody>, Error> {
  match authenticate(&req) {
    Ok(claims) => {
      req.extensions_mut().insert(claims);
      next.call(req).await.map(ServiceResponse::map_into_boxed_body)
    }
    Err(error) => Ok(req.error_response(error)),
  }
}

/// Same as `require_auth`, plus 403 for anyone who is not an admin.
pub async fn require_admin<B: MessageBody + 'static>(
  req: ServiceRequest,
  next: Next<B>,
) -> Result<ServiceResponse<BoxBody>, Error> {
  let claims = match authenticate(&req) {
    Ok(claims) => claims,
    Err(error) => return Ok(req.error_response(error)),
  };
  if !claims.is_admin() {
    tracing::info!(user_id = %claims.user.id, path = req.path(), "Admin route refused");
    return Ok(req.error_response(ApiError::Forbidden(String::from(
      "You do not have permission to access this route",
    ))));
  }
  req.extensions_mut().insert(claims);
  next.call(req).await.map(ServiceResponse::map_into_boxed_body)
}

fn authenticate(req: &ServiceRequest) -> Result<Claims, ApiError> {
  let data = req.app_data::<web::Data<AppState>>().ok_or_else(|| {
    ApiError::Internal(String::from("Application state is not configured"))
  })?;

  let token = req
    .headers()
    .get(TOKEN_HEADER)
    .and_then(|value| value.to_str().ok())
    .map(str::trim)
    .filter(|token| !token.is_empty())
    .ok_or_else(|| {
      ApiError::Unauthorized(String::from("You do not have access to this route"))
    })?;

  verify_token(token, &data.config.jwt_secret).map_err(|error| {
    tracing::debug!(%error, "Rejected session token");
    ApiError::Unauthorized(String::from("Invalid token"))
  })
}

/// Claims placed in the request by `require_auth` / `require_admin`.
impl FromRequest for Claims {
  type Error = ApiError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
    ready(req.extensions().get::<Claims>().cloned().ok_or_else(|| {
      ApiError::Unauthorized(String::from("You do not have access to this route"))
    }))
  }
}
