use std::borrow::Cow;

use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::ValidationError;
use validator_derive::Validate;

use super::department::Department;
use crate::shared::role::Role;

/// Stored user document. `password_hash` never leaves the store layer.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct User {
  #[serde(rename = "_id")]
  pub id: ObjectId,
  #[validate(
    length(min = 3, max = 35, message = "The name must be between 3 and 35 characters"),
    custom(function = "validate_name")
  )]
  pub name: String,
  #[validate(
    length(min = 5, max = 100, message = "The email must be between 5 and 100 characters"),
    email(message = "The email is not a valid email address")
  )]
  pub email: String,
  #[serde(rename = "password")]
  pub password_hash: String,
  pub department: Department,
  #[serde(rename = "birthDate", with = "chrono_datetime_as_bson_datetime")]
  pub birth_date: DateTime<Utc>,
  pub role: Role,
  #[serde(rename = "createdAt", with = "chrono_datetime_as_bson_datetime")]
  pub created_at: DateTime<Utc>,
  #[serde(rename = "updatedAt", with = "chrono_datetime_as_bson_datetime")]
  pub updated_at: DateTime<Utc>,
}

pub fn validate_name(value: &str) -> Result<(), ValidationError> {
  if value.chars().all(|c| c.is_ascii_alphabetic() || c == ' ') {
    return Ok(());
  }
  Err(
    ValidationError::new("name")
      .with_message(Cow::from(format!(
        "{} is not valid. The name can only contain letters",
        value
      ))),
  )
}

/// At least one uppercase letter, one lowercase letter, one digit and one
/// special character; no whitespace.
pub fn validate_password(value: &str) -> Result<(), ValidationError> {
  let has_upper = value.chars().any(|c| c.is_ascii_uppercase());
  let has_lower = value.chars().any(|c| c.is_ascii_lowercase());
  let has_digit = value.chars().any(|c| c.is_ascii_digit());
  let has_special = value
    .chars()
    .any(|c| !c.is_alphanumeric() && c != '_' && c != ':' && !c.is_whitespace());
  let has_whitespace = value.chars().any(char::is_whitespace);

  if has_upper && has_lower && has_digit && has_special && !has_whitespace {
    return Ok(());
  }
  Err(ValidationError::new("password").with_message(Cow::from(
    "The password must contain at least one uppercase letter, one lowercase letter, one number and one special character",
  )))
}

pub fn validate_department(value: &str) -> Result<(), ValidationError> {
  value.parse::<Department>().map(|_| ()).map_err(|_| {
    ValidationError::new("department")
      .with_message(Cow::from(format!("{} is not a valid department", value)))
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_password_rules() {
    assert!(validate_password("Secret#123").is_ok());
    assert!(validate_password("secret#123").is_err(), "no uppercase");
    assert!(validate_password("SECRET#123").is_err(), "no lowercase");
    assert!(validate_password("Secret#abc").is_err(), "no digit");
    assert!(validate_password("Secret1234").is_err(), "no special");
    assert!(validate_password("Secret_123").is_err(), "underscore is a word char");
    assert!(validate_password("Secret# 123").is_err(), "whitespace");
  }

  #[test]
  fn test_name_rules() {
    assert!(validate_name("Ana Maria").is_ok());
    assert!(validate_name("Ana2").is_err());
    assert!(validate_name("José").is_err());
  }

  #[test]
  fn test_department_rules() {
    assert!(validate_department("montevideo").is_ok());
    assert!(validate_department("General").is_ok());
    assert!(validate_department("Montevideo").is_err());
  }
}
