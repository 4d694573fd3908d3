use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{doc, Document};
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::options::{
  Collation, CollationAlternate, CollationStrength, IndexOptions,
  ReturnDocument,
};
use mongodb::{Collection, IndexModel};
use validator::Validate;

use crate::shared::database::MongoDatabase;
use crate::shared::repository_error::RepositoryError;
use crate::shared::role::Role;
use crate::users::model::department::Department;
use crate::users::model::user::User;

#[derive(Debug, Clone, Copy)]
pub enum FindOneProperty<'a> {
  Id(ObjectId),
  Email(&'a str),
}

impl FindOneProperty<'_> {
  fn to_mongo_key_value(&self) -> Document {
    match self {
      FindOneProperty::Id(id) => doc! { "_id": *id },
      FindOneProperty::Email(email) => doc! { "email": *email },
    }
  }
}

/// Fields an update may touch. The password hash is not among them.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
  pub name: Option<String>,
  pub email: Option<String>,
  pub department: Option<Department>,
  pub birth_date: Option<DateTime<Utc>>,
  pub role: Option<Role>,
  pub updated_at: DateTime<Utc>,
}

impl UserChanges {
  pub fn apply(&self, user: &mut User) {
    if let Some(name) = &self.name {
      user.name = name.clone();
    }
    if let Some(email) = &self.email {
      user.email = email.clone();
    }
    if let Some(department) = self.department {
      user.department = department;
    }
    if let Some(birth_date) = self.birth_date {
      user.birth_date = birth_date;
    }
    if let Some(role) = self.role {
      user.role = role;
    }
    user.updated_at = self.updated_at;
  }

  fn to_mongo_update(&self) -> Result<Document, RepositoryError> {
    let mut set = doc! {
      "updatedAt": bson::DateTime::from_chrono(self.updated_at),
    };
    if let Some(name) = &self.name {
      set.insert("name", name.clone());
    }
    if let Some(email) = &self.email {
      set.insert("email", email.clone());
    }
    if let Some(department) = self.department {
      set.insert("department", bson::to_bson(&department)?);
    }
    if let Some(birth_date) = self.birth_date {
      set.insert("birthDate", bson::DateTime::from_chrono(birth_date));
    }
    if let Some(role) = self.role {
      set.insert("role", bson::to_bson(&role)?);
    }
    Ok(doc! { "$set": set })
  }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
  /// Every user, ordered by name with Spanish, accent-aware and
  /// case-insensitive collation.
  async fn find_all(&self) -> Result<Vec<User>, RepositoryError>;
  async fn find_one(
    &self,
    property: FindOneProperty<'_>,
  ) -> Result<Option<User>, RepositoryError>;
  async fn find_many(
    &self,
    ids: &[ObjectId],
  ) -> Result<Vec<User>, RepositoryError>;
  async fn create(&self, user: &User) -> Result<(), RepositoryError>;
  async fn update(
    &self,
    id: ObjectId,
    changes: UserChanges,
  ) -> Result<Option<User>, RepositoryError>;
  async fn delete(&self, id: ObjectId) -> Result<Option<User>, RepositoryError>;
}

// ### MongoDB implementation ###

pub struct MongoUserRepositoryImpl {
  collection: Collection<User>,
}

impl MongoUserRepositoryImpl {
  /// Creates the repository and makes sure the unique e-mail index exists.
  pub async fn init(database: &MongoDatabase) -> Result<Self, RepositoryError> {
    let collection = database.database.collection::<User>("users");
    let email_index = IndexModel::builder()
      .keys(doc! { "email": 1 })
      .options(IndexOptions::builder().unique(true).build())
      .build();
    collection.create_index(email_index).await?;
    Ok(Self { collection })
  }

  fn name_collation() -> Collation {
    Collation::builder()
      .locale("es".to_string())
      .strength(CollationStrength::Secondary)
      .alternate(CollationAlternate::Shifted)
      .build()
  }
}

#[async_trait]
impl UserRepository for MongoUserRepositoryImpl {
  async fn find_all(&self) -> Result<Vec<User>, RepositoryError> {
    let users = self
      .collection
      .find(doc! {})
      .sort(doc! { "name": 1 })
      .collation(Self::name_collation())
      .await?
      .try_collect()
      .await?;
    Ok(users)
  }

  async fn find_one(
    &self,
    property: FindOneProperty<'_>,
  ) -> Result<Option<User>, RepositoryError> {
    let user = self
      .collection
      .find_one(property.to_mongo_key_value())
      .await?;
    Ok(user)
  }

  async fn find_many(
    &self,
    ids: &[ObjectId],
  ) -> Result<Vec<User>, RepositoryError> {
    if ids.is_empty() {
      return Ok(Vec::new());
    }
    let users = self
      .collection
      .find(doc! { "_id": { "$in": ids.to_vec() } })
      .await?
      .try_collect()
      .await?;
    Ok(users)
  }

  async fn create(&self, user: &User) -> Result<(), RepositoryError> {
    user.validate()?;
    self
      .collection
      .insert_one(user)
      .await
      .map_err(|error| RepositoryError::from_write(error, "email"))?;
    Ok(())
  }

  async fn update(
    &self,
    id: ObjectId,
    changes: UserChanges,
  ) -> Result<Option<User>, RepositoryError> {
    let user = self
      .collection
      .find_one_and_update(doc! { "_id": id }, changes.to_mongo_update()?)
      .return_document(ReturnDocument::After)
      .await
      .map_err(|error| RepositoryError::from_write(error, "email"))?;
    Ok(user)
  }

  async fn delete(&self, id: ObjectId) -> Result<Option<User>, RepositoryError> {
    let user = self.collection.find_one_and_delete(doc! { "_id": id }).await?;
    Ok(user)
  }
}
