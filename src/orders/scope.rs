use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use bson::oid::ObjectId;
use bson::{doc, Document};

use crate::auth::token::Claims;
use crate::orders::model::order::Order;
use crate::shared::api_error::ApiError;

/// Which orders the caller may see. Resolved from the session claims so the
/// list handler never looks at roles itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderScope {
  All,
  OwnedBy(ObjectId),
}

impl OrderScope {
  pub fn for_claims(claims: &Claims) -> Result<Self, ApiError> {
    if claims.is_admin() {
      return Ok(OrderScope::All);
    }
    claims
      .user_id()
      .map(OrderScope::OwnedBy)
      .ok_or_else(|| ApiError::Unauthorized(String::from("Invalid token")))
  }

  pub fn to_mongo_filter(self) -> Document {
    match self {
      OrderScope::All => doc! {},
      OrderScope::OwnedBy(user) => doc! { "user": user },
    }
  }

  pub fn includes(self, order: &Order) -> bool {
    match self {
      OrderScope::All => true,
      OrderScope::OwnedBy(user) => order.user == user,
    }
  }
}

/// Requires `require_auth` on the route.
impl FromRequest for OrderScope {
  type Error = ApiError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
    let scope = match req.extensions().get::<Claims>() {
      Some(claims) => OrderScope::for_claims(claims),
      None => Err(ApiError::Unauthorized(String::from(
        "You do not have access to this route",
      ))),
    };
    ready(scope)
  }
}
