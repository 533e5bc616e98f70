//! SeaORM implementation of IpRepository

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, EntityTrait};

use crate::domain::{
    DomainError, IpFilter, IpPatch, IpRecord, IpRepository, NewIp, PaginatedIps,
};
use crate::models::ip::{self, Entity as IpEntity};
use crate::services::ip_service;

/// SeaORM-based implementation of IpRepository
pub struct SeaOrmIpRepository {
    db: DatabaseConnection,
}

impl SeaOrmIpRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn record(&self, model: ip::Model) -> Result<IpRecord, DomainError> {
        ip_service::ip_record(&self.db, model).await
    }
}

#[async_trait]
impl IpRepository for SeaOrmIpRepository {
    async fn find_all(&self, filter: IpFilter) -> Result<PaginatedIps, DomainError> {
        let (limit, offset) = ip_service::page_window(&filter)?;
        let (models, total) = ip_service::list_ips(&self.db, filter).await?;

        let mut objects = Vec::with_capacity(models.len());
        for model in models {
            objects.push(self.record(model).await?);
        }

        Ok(PaginatedIps {
            objects,
            total,
            limit,
            offset,
        })
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<IpRecord>, DomainError> {
        match IpEntity::find_by_id(id).one(&self.db).await? {
            Some(model) => Ok(Some(self.record(model).await?)),
            None => Ok(None),
        }
    }

    async fn create(&self, input: NewIp) -> Result<IpRecord, DomainError> {
        let model = ip_service::create_ip(&self.db, input).await?;
        self.record(model).await
    }

    async fn replace(&self, id: i32, input: NewIp) -> Result<IpRecord, DomainError> {
        let model = ip_service::replace_ip(&self.db, id, input).await?;
        self.record(model).await
    }

    async fn update(&self, id: i32, patch: IpPatch) -> Result<IpRecord, DomainError> {
        let model = ip_service::update_ip(&self.db, id, patch).await?;
        self.record(model).await
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        ip_service::delete_ip(&self.db, id).await
    }

    async fn link(&self, a: i32, b: i32) -> Result<(), DomainError> {
        ip_service::link_ip(&self.db, a, b).await
    }

    async fn unlink(&self, a: i32, b: i32) -> Result<(), DomainError> {
        ip_service::unlink_ip(&self.db, a, b).await
    }

    async fn linked(&self, id: i32) -> Result<Vec<ip::Model>, DomainError> {
        ip_service::linked_ips(&self.db, id).await
    }
}
