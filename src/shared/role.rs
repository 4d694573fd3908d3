use std::borrow::Cow;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::ValidationError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum Role {
  #[default]
  #[serde(rename = "user")]
  User,
  #[serde(rename = "admin")]
  Admin,
}

impl Role {
  pub fn as_str(&self) -> &'static str {
    match self {
      Role::User => "user",
      Role::Admin => "admin",
    }
  }
}

#[derive(Debug, PartialEq, Eq)]
pub struct UnknownRole;

impl FromStr for Role {
  type Err = UnknownRole;

  fn from_str(value: &str) -> Result<Self, Self::Err> {
    [Role::User, Role::Admin]
      .into_iter()
      .find(|role| role.as_str() == value)
      .ok_or(UnknownRole)
  }
}

pub fn validate_role(value: &str) -> Result<(), ValidationError> {
  value.parse::<Role>().map(|_| ()).map_err(|_| {
    ValidationError::new("role")
      .with_message(Cow::from(format!("{} is not a valid role", value)))
  })
}
