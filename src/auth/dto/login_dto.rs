use serde::Deserialize;
use validator_derive::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginDto {
  #[validate(required, length(min = 1))]
  pub email: Option<String>,
  #[validate(required, length(min = 1))]
  pub password: Option<String>,
}
