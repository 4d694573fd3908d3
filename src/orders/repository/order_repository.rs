use async_trait::async_trait;
use bson::doc;
use futures_util::TryStreamExt;
use mongodb::Collection;
use validator::Validate;

use crate::orders::model::order::Order;
use crate::orders::scope::OrderScope;
use crate::shared::database::MongoDatabase;
use crate::shared::repository_error::RepositoryError;

#[async_trait]
pub trait OrderRepository: Send + Sync {
  /// Orders visible in `scope`, newest first.
  async fn find(&self, scope: OrderScope) -> Result<Vec<Order>, RepositoryError>;
  async fn create(&self, order: &Order) -> Result<(), RepositoryError>;
}

// ### MongoDB implementation ###

pub struct MongoOrderRepositoryImpl {
  collection: Collection<Order>,
}

impl MongoOrderRepositoryImpl {
  pub fn new(database: &MongoDatabase) -> Self {
    Self {
      collection: database.database.collection::<Order>("orders"),
    }
  }
}

#[async_trait]
impl OrderRepository for MongoOrderRepositoryImpl {
  async fn find(&self, scope: OrderScope) -> Result<Vec<Order>, RepositoryError> {
    let orders = self
      .collection
      .find(scope.to_mongo_filter())
      .sort(doc! { "createdAt": -1 })
      .await?
      .try_collect()
      .await?;
    Ok(orders)
  }

  async fn create(&self, order: &Order) -> Result<(), RepositoryError> {
    order.validate()?;
    self.collection.insert_one(order).await?;
    Ok(())
  }
}

#[cfg(test)]
pub mod tests {
  use super::*;
  use std::sync::{Arc, RwLock};

  #[derive(Clone, Default)]
  pub struct InMemoryOrderRepository {
    pub orders: Arc<RwLock<Vec<Order>>>,
  }

  #[async_trait]
  impl OrderRepository for InMemoryOrderRepository {
    async fn find(
      &self,
      scope: OrderScope,
    ) -> Result<Vec<Order>, RepositoryError> {
      let mut orders: Vec<Order> = self
        .orders
        .read()
        .unwrap()
        .iter()
        .filter(|order| scope.includes(order))
        .cloned()
        .collect();
      orders.sort_by(|left, right| right.created_at.cmp(&left.created_at));
      Ok(orders)
    }

    async fn create(&self, order: &Order) -> Result<(), RepositoryError> {
      order.validate()?;
      self.orders.write().unwrap().push(order.clone());
      Ok(())
    }
  }
}
