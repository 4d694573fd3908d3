use bson::oid::ObjectId;
use mongodb::{Client, Database};

use super::config::Config;

#[derive(Clone, Debug)]
pub struct MongoDatabase {
  pub database: Database,
}

impl MongoDatabase {
  pub async fn connect(config: &Config) -> Result<Self, mongodb::error::Error> {
    let client = Client::with_uri_str(&config.mongo_uri).await?;
    let database = client.database(&config.database_name);
    tracing::info!(database = %config.database_name, "Connected to MongoDB");
    Ok(Self { database })
  }
}

/// Ids arrive as hex strings; anything unparsable is treated as a missing
/// document by the handlers.
pub fn parse_object_id(value: &str) -> Option<ObjectId> {
  ObjectId::parse_str(value.trim()).ok()
}
