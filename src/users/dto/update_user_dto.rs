use serde::Deserialize;
use validator_derive::Validate;

use crate::shared::role::validate_role;
use crate::shared::validation::validate_past_date;
use crate::users::model::user::{validate_department, validate_name};

/// Partial update. Has no `password` field, so a password sent to this
/// endpoint is dropped during deserialization.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUserDto {
  #[validate(
    length(min = 3, max = 35, message = "The name must be between 3 and 35 characters"),
    custom(function = "validate_name")
  )]
  pub name: Option<String>,
  #[validate(
    length(min = 5, max = 100, message = "The email must be between 5 and 100 characters"),
    email(message = "The email is not a valid email address")
  )]
  pub email: Option<String>,
  #[validate(custom(function = "validate_department"))]
  pub department: Option<String>,
  #[validate(custom(function = "validate_past_date"))]
  #[serde(rename = "birthDate")]
  pub birth_date: Option<String>,
  #[validate(custom(function = "validate_role"))]
  pub role: Option<String>,
}

impl UpdateUserDto {
  pub fn normalized(mut self) -> Self {
    self.name = self.name.map(|name| name.trim().to_string());
    self.email = self.email.map(|email| email.trim().to_lowercase());
    self.department = self
      .department
      .map(|department| department.trim().to_string());
    self.role = self.role.map(|role| role.trim().to_string());
    self
  }
}
