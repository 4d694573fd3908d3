use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, Utc};
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

use super::api_error::ApiError;

/// Flattens field errors into readable messages, ordered by field name.
/// Nested structs and lists are reported as `field.inner` / `field[i].inner`.
pub fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
  let mut messages = Vec::new();
  collect_messages("", errors, &mut messages);
  messages
}

fn collect_messages(
  prefix: &str,
  errors: &ValidationErrors,
  messages: &mut Vec<String>,
) {
  let mut fields: Vec<_> = errors.errors().iter().collect();
  fields.sort_by(|(left, _), (right, _)| left.cmp(right));

  for (field, kind) in fields {
    let path = if prefix.is_empty() {
      field.to_string()
    } else {
      format!("{}.{}", prefix, field)
    };
    match kind {
      ValidationErrorsKind::Field(field_errors) => messages
        .extend(field_errors.iter().map(|error| describe(&path, error))),
      ValidationErrorsKind::Struct(inner) => {
        collect_messages(&path, inner, messages)
      }
      ValidationErrorsKind::List(items) => {
        for (index, inner) in items {
          collect_messages(&format!("{}[{}]", path, index), inner, messages);
        }
      }
    }
  }
}

fn describe(field: &str, error: &ValidationError) -> String {
  if let Some(message) = &error.message {
    return message.to_string();
  }
  let param = |name: &str| error.params.get(name).map(|value| value.to_string());
  match &*error.code {
    "length" => {
      let length = error
        .params
        .get("value")
        .and_then(|value| value.as_str())
        .map(|value| value.chars().count());
      match (param("min"), param("max"), length) {
        (Some(min), _, Some(length))
          if min.parse::<usize>().is_ok_and(|min| length < min) =>
        {
          format!("The field {} must be at least {} characters", field, min)
        }
        (_, Some(max), _) => {
          format!("The field {} cannot exceed {} characters", field, max)
        }
        (Some(min), None, _) => {
          format!("The field {} must be at least {} characters", field, min)
        }
        _ => format!("The field {} has an invalid length", field),
      }
    }
    "range" => match param("min") {
      Some(min) => format!("The field {} must be at least {}", field, min),
      None => format!("The field {} is out of range", field),
    },
    "required" => format!("The field {} is required", field),
    _ => format!("Error in field {}: invalid value", field),
  }
}

impl From<ValidationErrors> for ApiError {
  fn from(errors: ValidationErrors) -> Self {
    ApiError::validation(validation_messages(&errors))
  }
}

/// Accepts RFC 3339 timestamps and plain `YYYY-MM-DD` dates.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
  let value = value.trim();
  if let Ok(date_time) = DateTime::parse_from_rfc3339(value) {
    return Some(date_time.with_timezone(&Utc));
  }
  NaiveDate::parse_from_str(value, "%Y-%m-%d")
    .ok()
    .and_then(|date| date.and_hms_opt(0, 0, 0))
    .map(|date_time| date_time.and_utc())
}

pub fn validate_not_future(
  value: &DateTime<Utc>,
) -> Result<(), ValidationError> {
  if *value <= Utc::now() {
    return Ok(());
  }
  Err(
    ValidationError::new("future_date")
      .with_message(Cow::from("The date cannot be in the future")),
  )
}

pub fn validate_past_date(value: &str) -> Result<(), ValidationError> {
  match parse_date(value) {
    Some(date) => validate_not_future(&date),
    None => Err(
      ValidationError::new("date")
        .with_message(Cow::from("The date is not a valid date")),
    ),
  }
}
