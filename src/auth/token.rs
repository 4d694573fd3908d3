use bson::oid::ObjectId;
use chrono::Utc;
use jsonwebtoken::{
  decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::role::Role;
use crate::users::rto::user_rto::UserRto;

pub const TOKEN_EXPIRY: u64 = 3 * 60 * 60; // 3 hours in seconds
const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Error)]
pub enum TokenError {
  #[error("Invalid token: {0}")]
  InvalidToken(#[source] jsonwebtoken::errors::Error),
  #[error("Could not sign token: {0}")]
  Signing(#[source] jsonwebtoken::errors::Error),
}

/// Session token payload: the sanitized user record plus timing claims.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
  #[serde(flatten)]
  pub user: UserRto,
  pub iat: u64,
  pub exp: u64,
}

impl Claims {
  pub fn new(user: UserRto) -> Self {
    let now = Utc::now().timestamp() as u64;
    Self {
      user,
      iat: now,
      exp: now + TOKEN_EXPIRY,
    }
  }

  pub fn is_admin(&self) -> bool {
    self.user.role == Role::Admin
  }

  pub fn user_id(&self) -> Option<ObjectId> {
    ObjectId::parse_str(&self.user.id).ok()
  }
}

pub fn issue_token(claims: &Claims, secret: &str) -> Result<String, TokenError> {
  encode(
    &Header::new(TOKEN_ALGORITHM),
    claims,
    &EncodingKey::from_secret(secret.as_bytes()),
  )
  .map_err(TokenError::Signing)
}

/// Fails on a bad signature, a malformed token or an expired `exp`.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
  decode::<Claims>(
    token,
    &DecodingKey::from_secret(secret.as_bytes()),
    &Validation::new(TOKEN_ALGORITHM),
  )
  .map(|token_data| token_data.claims)
  .map_err(TokenError::InvalidToken)
}
