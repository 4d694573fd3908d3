use std::collections::HashMap;
use std::path::{Path, PathBuf};

use actix_multipart::{Field, Multipart, MultipartError};
use futures_util::TryStreamExt;
use mime::Mime;
use nanoid::nanoid;

use super::api_error::ApiError;

pub const MAX_IMAGE_SIZE: usize = 5 * 1024 * 1024; // 5 MiB
pub const IMAGE_FIELD: &str = "image";
const MAX_TEXT_FIELD_SIZE: usize = 64 * 1024;
const ALLOWED_IMAGE_SUBTYPES: [&str; 4] = ["jpeg", "png", "gif", "webp"];

/// An image that was written to disk during intake.
#[derive(Debug, Clone)]
pub struct StoredImage {
  pub file_name: String,
  pub path: PathBuf,
}

/// Text fields of a multipart request plus the optional stored image.
#[derive(Debug, Default)]
pub struct UploadForm {
  fields: HashMap<String, String>,
  pub image: Option<StoredImage>,
}

impl UploadForm {
  /// Trimmed value of a text field; blank values count as absent.
  pub fn text(&self, name: &str) -> Option<&str> {
    self
      .fields
      .get(name)
      .map(|value| value.trim())
      .filter(|value| !value.is_empty())
  }

  /// Removes the stored image again, used when the handler rejects the
  /// request after intake succeeded.
  pub async fn discard(self) {
    if let Some(image) = self.image {
      remove_file(&image.path).await;
    }
  }
}

/// Sub-directory of the uploads folder chosen from the request path.
pub fn upload_category(request_path: &str) -> &'static str {
  if request_path.contains("/products") {
    "products"
  } else if request_path.contains("/users") {
    "users"
  } else {
    "others"
  }
}

/// Reads the whole multipart body. At most one file is accepted and only in
/// the `image` field. On failure nothing is left on disk.
pub async fn receive_upload(
  mut payload: Multipart,
  request_path: &str,
  uploads_dir: &Path,
) -> Result<UploadForm, ApiError> {
  let mut form = UploadForm::default();
  let directory = uploads_dir.join(upload_category(request_path));

  match read_fields(&mut payload, &directory, &mut form).await {
    Ok(()) => Ok(form),
    Err(error) => {
      form.discard().await;
      Err(error)
    }
  }
}

async fn read_fields(
  payload: &mut Multipart,
  directory: &Path,
  form: &mut UploadForm,
) -> Result<(), ApiError> {
  while let Some(mut field) = payload.try_next().await.map_err(malformed)? {
    let name = field.name().unwrap_or_default().to_string();
    let file_name = field
      .content_disposition()
      .and_then(|disposition| disposition.get_filename())
      .map(str::to_string);

    let Some(file_name) = file_name else {
      let value = read_text(&mut field, &name).await?;
      form.fields.insert(name, value);
      continue;
    };

    // Browsers send an empty file part when no file was picked.
    if file_name.is_empty() {
      while field.try_next().await.map_err(malformed)?.is_some() {}
      continue;
    }
    if name != IMAGE_FIELD {
      return Err(ApiError::BadRequest(format!(
        "Unexpected file field {}",
        name
      )));
    }
    if form.image.is_some() {
      return Err(ApiError::BadRequest(String::from(
        "Only one image can be uploaded per request",
      )));
    }

    let content_type = field.content_type().cloned();
    let subtype = allowed_subtype(content_type.as_ref()).ok_or_else(|| {
      tracing::info!(content_type = ?content_type, "Rejected upload type");
      ApiError::UnsupportedMediaType(String::from(
        "Unsupported file type. Only images are allowed (JPEG, PNG, GIF, WEBP)",
      ))
    })?;
    let bytes = read_limited(&mut field, MAX_IMAGE_SIZE).await?.ok_or_else(|| {
      ApiError::PayloadTooLarge(String::from(
        "The image is too large. The maximum size is 5 MB",
      ))
    })?;

    let stored_name = format!(
      "{}.{}",
      nanoid!(),
      sanitized_extension(&file_name).unwrap_or_else(|| subtype.to_string())
    );
    let path = directory.join(&stored_name);
    write_file(directory, &path, &bytes).await?;
    tracing::debug!(
      file = %path.display(),
      upload = %file_name,
      size = bytes.len(),
      "Stored upload"
    );

    form.image = Some(StoredImage {
      file_name: stored_name,
      path,
    });
  }
  Ok(())
}

async fn read_text(field: &mut Field, name: &str) -> Result<String, ApiError> {
  let bytes = read_limited(field, MAX_TEXT_FIELD_SIZE)
    .await?
    .ok_or_else(|| ApiError::BadRequest(format!("The field {} is too large", name)))?;
  String::from_utf8(bytes)
    .map_err(|_| ApiError::BadRequest(format!("The field {} is not valid text", name)))
}

/// `None` when the field is larger than `limit`.
async fn read_limited(
  field: &mut Field,
  limit: usize,
) -> Result<Option<Vec<u8>>, ApiError> {
  let mut bytes = Vec::new();
  while let Some(chunk) = field.try_next().await.map_err(malformed)? {
    if bytes.len() + chunk.len() > limit {
      return Ok(None);
    }
    bytes.extend_from_slice(&chunk);
  }
  Ok(Some(bytes))
}

fn allowed_subtype(content_type: Option<&Mime>) -> Option<&'static str> {
  let content_type = content_type?;
  if content_type.type_() != mime::IMAGE {
    return None;
  }
  ALLOWED_IMAGE_SUBTYPES
    .into_iter()
    .find(|subtype| content_type.subtype().as_str() == *subtype)
}

fn sanitized_extension(file_name: &str) -> Option<String> {
  let extension: String = Path::new(file_name)
    .extension()?
    .to_str()?
    .chars()
    .filter(char::is_ascii_alphanumeric)
    .collect::<String>()
    .to_lowercase();
  (!extension.is_empty()).then_some(extension)
}

async fn write_file(
  directory: &Path,
  path: &Path,
  bytes: &[u8],
) -> Result<(), ApiError> {
  tokio::fs::create_dir_all(directory)
    .await
    .map_err(|error| ApiError::internal("Could not store the image", error))?;
  tokio::fs::write(path, bytes)
    .await
    .map_err(|error| ApiError::internal("Could not store the image", error))
}

/// Deletes `<uploads_dir>/<category>/<file_name>` if it exists. Only the final
/// component of `file_name` is used.
pub async fn remove_image(uploads_dir: &Path, category: &str, file_name: &str) {
  let Some(file_name) = Path::new(file_name).file_name() else {
    return;
  };
  remove_file(&uploads_dir.join(category).join(file_name)).await;
}

async fn remove_file(path: &Path) {
  match tokio::fs::remove_file(path).await {
    Ok(()) => tracing::debug!(file = %path.display(), "Removed image"),
    Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
    Err(error) => {
      tracing::warn!(%error, file = %path.display(), "Could not remove image")
    }
  }
}

fn malformed(error: MultipartError) -> ApiError {
  tracing::debug!(%error, "Malformed multipart body");
  ApiError::BadRequest(String::from("The request body is not a valid form"))
}
