//! SeaORM implementation of NetworkRepository

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, EntityTrait};

use crate::domain::{DomainError, NetworkFilter, NetworkRepository, NetworkUpdate, NewNetwork};
use crate::models::network::{self, Entity as NetworkEntity};
use crate::services::network_service;

/// SeaORM-based implementation of NetworkRepository
pub struct SeaOrmNetworkRepository {
    db: DatabaseConnection,
}

impl SeaOrmNetworkRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NetworkRepository for SeaOrmNetworkRepository {
    async fn find_all(&self, filter: NetworkFilter) -> Result<Vec<network::Model>, DomainError> {
        network_service::list_networks(&self.db, filter).await
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<network::Model>, DomainError> {
        Ok(NetworkEntity::find_by_id(id).one(&self.db).await?)
    }

    async fn create(&self, input: NewNetwork) -> Result<network::Model, DomainError> {
        network_service::create_network(&self.db, input).await
    }

    async fn update(&self, id: i32, input: NetworkUpdate) -> Result<network::Model, DomainError> {
        network_service::update_network(&self.db, id, input).await
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        network_service::delete_network(&self.db, id).await
    }

    async fn ancestors(&self, id: i32) -> Result<Vec<network::Model>, DomainError> {
        network_service::ancestors(&self.db, id).await
    }

    async fn children(&self, id: i32) -> Result<Vec<network::Model>, DomainError> {
        network_service::children(&self.db, id).await
    }
}
