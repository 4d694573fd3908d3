use mongodb::error::{ErrorKind, WriteFailure};
use thiserror::Error;

const DUPLICATE_KEY_CODE: i32 = 11000;

/// Error returned by every entity store.
#[derive(Debug, Error)]
pub enum RepositoryError {
  #[error("Duplicate value for unique field {field}")]
  Duplicate { field: &'static str },

  #[error("Validation failed: {0}")]
  Validation(#[from] validator::ValidationErrors),

  #[error("Database error: {0}")]
  Database(#[from] mongodb::error::Error),

  #[error("Serialization error: {0}")]
  Serialization(#[from] bson::ser::Error),
}

impl RepositoryError {
  /// Turns a unique-index violation into `Duplicate`, keeps anything else as
  /// a database error.
  pub fn from_write(error: mongodb::error::Error, field: &'static str) -> Self {
    if is_duplicate_key(&error) {
      RepositoryError::Duplicate { field }
    } else {
      RepositoryError::Database(error)
    }
  }
}

fn is_duplicate_key(error: &mongodb::error::Error) -> bool {
  match error.kind.as_ref() {
    ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
      write_error.code == DUPLICATE_KEY_CODE
    }
    ErrorKind::Command(command_error) => {
      command_error.code == DUPLICATE_KEY_CODE
    }
    _ => false,
  }
}
