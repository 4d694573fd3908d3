use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageRto {
  pub message: String,
}

impl From<String> for MessageRto {
  fn from(message: String) -> Self {
    Self { message }
  }
}

impl From<&str> for MessageRto {
  fn from(message: &str) -> Self {
    Self {
      message: message.to_string(),
    }
  }
}
