use async_trait::async_trait;
use bson::doc;
use bson::oid::ObjectId;
use futures_util::TryStreamExt;
use mongodb::options::ReturnDocument;
use mongodb::Collection;
use validator::Validate;

use crate::products::model::product::Product;
use crate::shared::database::MongoDatabase;
use crate::shared::repository_error::RepositoryError;

#[async_trait]
pub trait ProductRepository: Send + Sync {
  /// One page of products, oldest first. `page` starts at 0.
  async fn find_page(
    &self,
    page: u64,
    limit: u64,
  ) -> Result<Vec<Product>, RepositoryError>;
  async fn find_one(&self, id: ObjectId)
    -> Result<Option<Product>, RepositoryError>;
  async fn find_many(
    &self,
    ids: &[ObjectId],
  ) -> Result<Vec<Product>, RepositoryError>;
  async fn create(&self, product: &Product) -> Result<(), RepositoryError>;
  /// Replaces the stored document with the same id. `None` if it is gone.
  async fn replace(
    &self,
    product: &Product,
  ) -> Result<Option<Product>, RepositoryError>;
  async fn delete(&self, id: ObjectId)
    -> Result<Option<Product>, RepositoryError>;
}

// ### MongoDB implementation ###

pub struct MongoProductRepositoryImpl {
  collection: Collection<Product>,
}

impl MongoProductRepositoryImpl {
  pub fn new(database: &MongoDatabase) -> Self {
    Self {
      collection: database.database.collection::<Product>("products"),
    }
  }
}

#[async_trait]
impl ProductRepository for MongoProductRepositoryImpl {
  async fn find_page(
    &self,
    page: u64,
    limit: u64,
  ) -> Result<Vec<Product>, RepositoryError> {
    let products = self
      .collection
      .find(doc! {})
      .sort(doc! { "createdAt": 1 })
      .skip(page.saturating_mul(limit))
      .limit(i64::try_from(limit).unwrap_or(i64::MAX))
      .await?
      .try_collect()
      .await?;
    Ok(products)
  }

  async fn find_one(
    &self,
    id: ObjectId,
  ) -> Result<Option<Product>, RepositoryError> {
    let product = self.collection.find_one(doc! { "_id": id }).await?;
    Ok(product)
  }

  async fn find_many(
    &self,
    ids: &[ObjectId],
  ) -> Result<Vec<Product>, RepositoryError> {
    if ids.is_empty() {
      return Ok(Vec::new());
    }
    let products = self
      .collection
      .find(doc! { "_id": { "$in": ids.to_vec() } })
      .await?
      .try_collect()
      .await?;
    Ok(products)
  }

  async fn create(&self, product: &Product) -> Result<(), RepositoryError> {
    product.validate()?;
    self.collection.insert_one(product).await?;
    Ok(())
  }

  async fn replace(
    &self,
    product: &Product,
  ) -> Result<Option<Product>, RepositoryError> {
    product.validate()?;
    let product = self
      .collection
      .find_one_and_replace(doc! { "_id": product.id }, product)
      .return_document(ReturnDocument::After)
      .await?;
    Ok(product)
  }

  async fn delete(
    &self,
    id: ObjectId,
  ) -> Result<Option<Product>, RepositoryError> {
    let product = self.collection.find_one_and_delete(doc! { "_id": id }).await?;
    Ok(product)
  }
}
