use serde::{Deserialize, Serialize};

/// JSON body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpError {
  pub message: String,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub errors: Vec<String>,
}

impl From<&str> for HttpError {
  fn from(message: &str) -> Self {
    Self {
      message: message.to_string(),
      errors: Vec::new(),
    }
  }
}

impl From<String> for HttpError {
  fn from(message: String) -> Self {
    Self {
      message,
      errors: Vec::new(),
    }
  }
}
