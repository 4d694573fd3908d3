use actix_web::{http::header, web, HttpResponse};
use path_clean::clean;

use super::api_error::ApiError;
use crate::AppState;

/// Serves a previously uploaded file from the uploads directory.
///
/// # Errors
///
/// - `ApiError::NotFound` when the file does not exist or the path tries to
///   leave the uploads directory.
/// - `ApiError::Internal` when the file exists but cannot be read.
pub async fn serve_upload(
  data: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
  let uploads_dir = clean(&data.config.uploads_dir);
  let cleaned_path = clean(uploads_dir.join(path.as_str()));

  if !cleaned_path.starts_with(&uploads_dir) || cleaned_path == uploads_dir {
    tracing::warn!(path = %path, "Blocked directory traversal attempt");
    return Err(upload_not_found());
  }

  match tokio::fs::metadata(&cleaned_path).await {
    Ok(metadata) if metadata.is_file() => {}
    _ => return Err(upload_not_found()),
  }

  let bytes = tokio::fs::read(&cleaned_path)
    .await
    .map_err(|error| ApiError::internal("Could not read the file", error))?;
  let mime_type = mime_guess::from_path(&cleaned_path).first_or_octet_stream();

  Ok(
    HttpResponse::Ok()
      .content_type(mime_type.as_ref())
      .insert_header((header::CACHE_CONTROL, "public, max-age=86400"))
      .body(bytes),
  )
}

fn upload_not_found() -> ApiError {
  ApiError::NotFound(String::from("The file was not found"))
}

#[cfg(test)]
mod tests {
  use actix_web::http::StatusCode;
  use actix_web::{test, App};

  use crate::configure;
  use crate::helpers::tests::TestContext;

  #[actix_web::test]
  async fn test_serves_stored_upload_with_guessed_type() {
    let context = TestContext::new();
    let directory = context.uploads_dir().join("products");
    std::fs::create_dir_all(&directory).unwrap();
    std::fs::write(directory.join("abc.png"), b"\x89PNG").unwrap();
    let app = test::init_service(
      App::new().app_data(context.state.clone()).configure(configure),
    )
    .await;

    let request = test::TestRequest::get()
      .uri("/uploads/products/abc.png")
      .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
      response.headers().get("content-type").unwrap(),
      "image/png"
    );
    let body = test::read_body(response).await;
    assert_eq!(&body[..], &b"\x89PNG"[..]);
  }

  #[actix_web::test]
  async fn test_missing_and_escaping_paths_are_not_found() {
    let context = TestContext::new();
    let app = test::init_service(
      App::new().app_data(context.state.clone()).configure(configure),
    )
    .await;

    std::fs::write(context.uploads_dir().join("../secret.txt"), b"x").unwrap();
    for uri in ["/uploads/products/missing.png", "/uploads/../secret.txt"] {
      let request = test::TestRequest::get().uri(uri).to_request();
      let response = test::call_service(&app, request).await;
      assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
    }
  }
}
