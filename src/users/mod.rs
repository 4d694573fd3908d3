pub mod dto;
pub mod model;
pub mod repository;
pub mod rto;

use actix_web::http::header;
use actix_web::{web, HttpResponse};
use bson::oid::ObjectId;
use chrono::Utc;
use dto::create_user_dto::CreateUserDto;
use dto::update_user_dto::UpdateUserDto;
use model::department::Department;
use model::user::User;
use repository::user_repository::{FindOneProperty, UserChanges};
use rto::user_rto::{UserMessageRto, UserRto};
use validator::Validate;

use crate::shared::api_error::ApiError;
use crate::shared::database::parse_object_id;
use crate::shared::repository_error::RepositoryError;
use crate::shared::role::Role;
use crate::shared::rto::message_rto::MessageRto;
use crate::shared::validation::parse_date;
use crate::AppState;

pub async fn list_users(
  data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
  let users = data.user_repository.find_all().await?;
  let users: Vec<UserRto> = users.into_iter().map(UserRto::from).collect();
  Ok(HttpResponse::Ok().json(users))
}

pub async fn get_user(
  data: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
  let user = match parse_object_id(&path) {
    Some(id) => data.user_repository.find_one(FindOneProperty::Id(id)).await?,
    None => None,
  };
  let user = user.ok_or_else(user_not_found)?;

  Ok(HttpResponse::Ok().json(UserMessageRto {
    message: String::from("User retrieved successfully"),
    user: UserRto::from(user),
  }))
}

pub async fn create_user(
  data: web::Data<AppState>,
  dto: web::Json<CreateUserDto>,
) -> Result<HttpResponse, ApiError> {
  let dto = dto.into_inner().normalized();
  dto.validate()?;

  let password = dto.password.as_deref().unwrap_or_default();
  let password_hash = data
    .hasher
    .hash_password(password)
    .await
    .map_err(|error| ApiError::internal("Could not create the user", error))?;

  let user = User::from_create_dto(dto, password_hash)?;
  data
    .user_repository
    .create(&user)
    .await
    .map_err(email_taken)?;

  tracing::info!(user_id = %user.id, "User created");
  Ok(
    HttpResponse::Created()
      .append_header((header::LOCATION, format!("/api/users/{}", user.id)))
      .json(UserMessageRto {
        message: String::from("User created successfully"),
        user: UserRto::from(user),
      }),
  )
}

pub async fn delete_user(
  data: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
  let deleted = match parse_object_id(&path) {
    Some(id) => data.user_repository.delete(id).await?,
    None => None,
  };
  let deleted = deleted.ok_or_else(|| {
    ApiError::NotFound(String::from("The user could not be deleted"))
  })?;

  tracing::info!(user_id = %deleted.id, "User deleted");
  Ok(HttpResponse::Ok().json(MessageRto::from(format!(
    "The user {} was deleted successfully",
    deleted.name
  ))))
}

pub async fn update_user(
  data: web::Data<AppState>,
  path: web::Path<String>,
  dto: web::Json<UpdateUserDto>,
) -> Result<HttpResponse, ApiError> {
  let dto = dto.into_inner().normalized();
  dto.validate()?;

  let updated = match parse_object_id(&path) {
    Some(id) => data
      .user_repository
      .update(id, UserChanges::from(dto))
      .await
      .map_err(email_taken)?,
    None => None,
  };
  let updated = updated.ok_or_else(|| {
    ApiError::NotFound(String::from("The user could not be updated"))
  })?;

  tracing::info!(user_id = %updated.id, "User updated");
  Ok(HttpResponse::Ok().json(UserMessageRto {
    message: String::from("User updated successfully"),
    user: UserRto::from(updated),
  }))
}

fn user_not_found() -> ApiError {
  ApiError::NotFound(String::from("The user was not found"))
}

fn email_taken(error: RepositoryError) -> ApiError {
  match error {
    RepositoryError::Duplicate { .. } => {
      ApiError::Conflict(String::from("The email is already registered"))
    }
    other => ApiError::from(other),
  }
}

impl User {
  /// Builds the stored document from a validated create request.
  fn from_create_dto(
    dto: CreateUserDto,
    password_hash: String,
  ) -> Result<Self, ApiError> {
    let now = Utc::now();
    let birth_date = dto
      .birth_date
      .as_deref()
      .and_then(parse_date)
      .ok_or_else(|| ApiError::validation(vec![String::from("The birth date is required")]))?;
    let department = match dto.department.as_deref() {
      Some(department) => department.parse().map_err(|_| {
        ApiError::validation(vec![format!("{} is not a valid department", department)])
      })?,
      None => Department::default(),
    };
    let role = match dto.role.as_deref() {
      Some(role) => role.parse().map_err(|_| {
        ApiError::validation(vec![format!("{} is not a valid role", role)])
      })?,
      None => Role::default(),
    };
    Ok(Self {
      id: ObjectId::new(),
      name: dto.name.unwrap_or_default(),
      email: dto.email.unwrap_or_default(),
      password_hash,
      department,
      birth_date,
      role,
      created_at: now,
      updated_at: now,
    })
  }
}

impl From<UpdateUserDto> for UserChanges {
  fn from(dto: UpdateUserDto) -> Self {
    Self {
      name: dto.name,
      email: dto.email,
      // Checked by the DTO validation.
      department: dto
        .department
        .and_then(|department| department.parse().ok()),
      birth_date: dto.birth_date.as_deref().and_then(parse_date),
      role: dto.role.and_then(|role| role.parse().ok()),
      updated_at: Utc::now(),
    }
  }
}
