use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::role::Role;
use crate::users::model::department::Department;
use crate::users::model::user::User;

/// A user as returned to clients and embedded in session tokens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRto {
  #[serde(rename = "_id")]
  pub id: String,
  pub name: String,
  pub email: String,
  pub department: Department,
  #[serde(rename = "birthDate")]
  pub birth_date: DateTime<Utc>,
  pub role: Role,
  #[serde(rename = "createdAt")]
  pub created_at: DateTime<Utc>,
  #[serde(rename = "updatedAt")]
  pub updated_at: DateTime<Utc>,
}

impl From<User> for UserRto {
  fn from(user: User) -> Self {
    Self {
      id: user.id.to_hex(),
      name: user.name,
      email: user.email,
      department: user.department,
      birth_date: user.birth_date,
      role: user.role,
      created_at: user.created_at,
      updated_at: user.updated_at,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserMessageRto {
  pub message: String,
  pub user: UserRto,
}
