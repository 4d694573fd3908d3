use serde::{Deserialize, Serialize};

use crate::users::rto::user_rto::UserRto;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginRto {
  pub message: String,
  pub user: UserRto,
  pub token: String,
}
