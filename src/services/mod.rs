//! Services Layer
//!
//! Business operations over the address space model. Every mutating function
//! opens one transaction that covers its checks and its writes; helpers that
//! take a generic connection run inside the caller's transaction.

pub mod asset_service;
pub mod client_service;
pub mod custom_field_service;
pub mod dns_service;
pub mod ip_service;
pub mod line_service;
pub mod network_service;
pub mod organization_service;
pub mod segment_service;
pub mod tag_service;
pub mod user_service;

use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PrimaryKeyTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

use crate::domain::{DomainError, DomainResult, EntityType};
use crate::models::{asset, client, dns_server_group, ip, line, network, site, vlan, vrf};

pub(crate) fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Load a row that the caller addressed directly; missing rows are `NotFound`.
pub(crate) async fn fetch<E, C>(conn: &C, id: i32, entity: &'static str) -> DomainResult<E::Model>
where
    E: EntityTrait,
    C: ConnectionTrait,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<i32>,
{
    E::find_by_id(id)
        .one(conn)
        .await?
        .ok_or(DomainError::not_found(entity, id))
}

/// Resolve an optional reference taken from input; dangling ids are a
/// validation failure rather than a missing resource.
pub(crate) async fn check_ref<E, C>(
    conn: &C,
    id: Option<i32>,
    entity: &'static str,
) -> DomainResult<Option<E::Model>>
where
    E: EntityTrait,
    C: ConnectionTrait,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<i32>,
{
    let Some(id) = id else {
        return Ok(None);
    };
    match E::find_by_id(id).one(conn).await? {
        Some(model) => Ok(Some(model)),
        None => Err(DomainError::validation(format!(
            "{} {} does not exist",
            entity, id
        ))),
    }
}

/// Whether the target of a polymorphic reference exists.
pub(crate) async fn entity_exists<C: ConnectionTrait>(
    conn: &C,
    entity_type: EntityType,
    id: i32,
) -> DomainResult<bool> {
    let found = match entity_type {
        EntityType::Network => network::Entity::find_by_id(id).one(conn).await?.is_some(),
        EntityType::Ip => ip::Entity::find_by_id(id).one(conn).await?.is_some(),
        EntityType::Vlan => vlan::Entity::find_by_id(id).one(conn).await?.is_some(),
        EntityType::Vrf => vrf::Entity::find_by_id(id).one(conn).await?.is_some(),
        EntityType::Asset => asset::Entity::find_by_id(id).one(conn).await?.is_some(),
        EntityType::Line => line::Entity::find_by_id(id).one(conn).await?.is_some(),
        EntityType::Site => site::Entity::find_by_id(id).one(conn).await?.is_some(),
        EntityType::DnsServerGroup => dns_server_group::Entity::find_by_id(id)
            .one(conn)
            .await?
            .is_some(),
    };
    Ok(found)
}

/// Drop the tag and custom-field rows of deleted entities. These side tables
/// have no foreign key to their owner, so every delete path calls this.
pub(crate) async fn purge_polymorphic<C: ConnectionTrait>(
    conn: &C,
    entity_type: EntityType,
    ids: &[i32],
) -> DomainResult<()> {
    if ids.is_empty() {
        return Ok(());
    }
    tag_service::purge(conn, entity_type, ids).await?;
    custom_field_service::purge(conn, entity_type, ids).await?;
    Ok(())
}

/// Validate a list of client ids taken from input and return it deduplicated.
pub(crate) async fn check_clients<C: ConnectionTrait>(
    conn: &C,
    client_ids: &[i32],
) -> DomainResult<Vec<i32>> {
    let mut ids = client_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    for id in &ids {
        check_ref::<client::Entity, _>(conn, Some(*id), "client").await?;
    }
    Ok(ids)
}

/// Ids on the far side of a many-to-many join table for one owner row.
pub(crate) async fn linked_ids<J, C>(
    conn: &C,
    owner: J::Column,
    owner_id: i32,
    target: J::Column,
) -> DomainResult<Vec<i32>>
where
    J: EntityTrait,
    C: ConnectionTrait,
{
    Ok(J::find()
        .select_only()
        .column(target)
        .filter(owner.eq(owner_id))
        .order_by_asc(target)
        .into_tuple()
        .all(conn)
        .await?)
}
