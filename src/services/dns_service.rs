//! DNS Service - DNS server groups and DNS servers

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Deserialize;

use super::{check_clients, fetch, linked_ids, now, purge_polymorphic};
use crate::domain::address::parse_address;
use crate::domain::validation::{optional, required};
use crate::domain::{DomainError, DomainResult, EntityType};
use crate::models::dns_server::{self, Entity as DnsServer};
use crate::models::dns_server_clients;
use crate::models::dns_server_group::{self, Entity as DnsServerGroup};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewDnsServerGroup {
    pub name: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewDnsServer {
    pub ip_address: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub client_ids: Vec<i32>,
}

// ============ Groups ============

pub async fn create_dns_server_group(
    db: &DatabaseConnection,
    input: NewDnsServerGroup,
) -> DomainResult<dns_server_group::Model> {
    let model = dns_server_group::ActiveModel {
        name: Set(required("DNS server group name", &input.name)?),
        comment: Set(optional(input.comment)),
        description: Set(optional(input.description)),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!("Created DNS server group '{}'", model.name);
    Ok(model)
}

pub async fn update_dns_server_group(
    db: &DatabaseConnection,
    id: i32,
    input: NewDnsServerGroup,
) -> DomainResult<dns_server_group::Model> {
    let name = required("DNS server group name", &input.name)?;
    let existing = fetch::<DnsServerGroup, _>(db, id, "DNS server group").await?;

    let mut active: dns_server_group::ActiveModel = existing.into();
    active.name = Set(name);
    active.comment = Set(optional(input.comment));
    active.description = Set(optional(input.description));
    Ok(active.update(db).await?)
}

pub async fn list_dns_server_groups(
    db: &DatabaseConnection,
) -> DomainResult<Vec<dns_server_group::Model>> {
    Ok(DnsServerGroup::find()
        .order_by_asc(dns_server_group::Column::Name)
        .all(db)
        .await?)
}

/// Networks using the group keep existing with the reference cleared.
pub async fn delete_dns_server_group(db: &DatabaseConnection, id: i32) -> DomainResult<()> {
    let txn = db.begin().await?;
    fetch::<DnsServerGroup, _>(&txn, id, "DNS server group").await?;

    purge_polymorphic(&txn, EntityType::DnsServerGroup, &[id]).await?;
    DnsServerGroup::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;
    Ok(())
}

// ============ Servers ============

/// Register a DNS server. Addresses are stored canonically and are unique
/// across all clients.
pub async fn create_dns_server(
    db: &DatabaseConnection,
    input: NewDnsServer,
) -> DomainResult<dns_server::Model> {
    let ip_address = parse_address(&input.ip_address)?.to_string();

    let txn = db.begin().await?;
    let client_ids = check_clients(&txn, &input.client_ids).await?;
    ensure_address_free(&txn, &ip_address, None).await?;

    let now = now();
    let model = dns_server::ActiveModel {
        ip_address: Set(ip_address),
        name: Set(optional(input.name)),
        comment: Set(optional(input.comment)),
        description: Set(optional(input.description)),
        disabled: Set(input.disabled),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    link_clients(&txn, model.id, client_ids).await?;

    txn.commit().await?;
    tracing::info!("Created DNS server {} (id {})", model.ip_address, model.id);
    Ok(model)
}

/// Replace every field of a DNS server, including the clients it serves.
pub async fn update_dns_server(
    db: &DatabaseConnection,
    id: i32,
    input: NewDnsServer,
) -> DomainResult<dns_server::Model> {
    let ip_address = parse_address(&input.ip_address)?.to_string();

    let txn = db.begin().await?;
    let existing = fetch::<DnsServer, _>(&txn, id, "DNS server").await?;
    let client_ids = check_clients(&txn, &input.client_ids).await?;
    ensure_address_free(&txn, &ip_address, Some(id)).await?;

    let mut active: dns_server::ActiveModel = existing.into();
    active.ip_address = Set(ip_address);
    active.name = Set(optional(input.name));
    active.comment = Set(optional(input.comment));
    active.description = Set(optional(input.description));
    active.disabled = Set(input.disabled);
    active.updated_at = Set(now());
    let model = active.update(&txn).await?;
    link_clients(&txn, id, client_ids).await?;

    txn.commit().await?;
    tracing::info!("Updated DNS server {} (id {})", model.ip_address, id);
    Ok(model)
}

pub async fn dns_server_client_ids(db: &DatabaseConnection, id: i32) -> DomainResult<Vec<i32>> {
    linked_ids::<dns_server_clients::Entity, _>(
        db,
        dns_server_clients::Column::DnsServerId,
        id,
        dns_server_clients::Column::ClientId,
    )
    .await
}

async fn ensure_address_free<C: ConnectionTrait>(
    conn: &C,
    ip_address: &str,
    except: Option<i32>,
) -> DomainResult<()> {
    let mut query = DnsServer::find().filter(dns_server::Column::IpAddress.eq(ip_address));
    if let Some(id) = except {
        query = query.filter(dns_server::Column::Id.ne(id));
    }
    if query.one(conn).await?.is_some() {
        return Err(DomainError::duplicate(
            "dns_servers.ip_address",
            format!("DNS server {} already exists", ip_address),
        ));
    }
    Ok(())
}

async fn link_clients<C: ConnectionTrait>(
    conn: &C,
    dns_server_id: i32,
    client_ids: Vec<i32>,
) -> DomainResult<()> {
    dns_server_clients::Entity::delete_many()
        .filter(dns_server_clients::Column::DnsServerId.eq(dns_server_id))
        .exec(conn)
        .await?;
    for client_id in client_ids {
        dns_server_clients::ActiveModel {
            dns_server_id: Set(dns_server_id),
            client_id: Set(client_id),
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

/// DNS servers, optionally restricted to those shared with one client.
pub async fn list_dns_servers(
    db: &DatabaseConnection,
    client_id: Option<i32>,
) -> DomainResult<Vec<dns_server::Model>> {
    let mut query = DnsServer::find();
    if let Some(client_id) = client_id {
        let ids: Vec<i32> = dns_server_clients::Entity::find()
            .select_only()
            .column(dns_server_clients::Column::DnsServerId)
            .filter(dns_server_clients::Column::ClientId.eq(client_id))
            .into_tuple()
            .all(db)
            .await?;
        query = query.filter(dns_server::Column::Id.is_in(ids));
    }
    Ok(query.order_by_asc(dns_server::Column::Id).all(db).await?)
}

pub async fn delete_dns_server(db: &DatabaseConnection, id: i32) -> DomainResult<()> {
    let existing = fetch::<DnsServer, _>(db, id, "DNS server").await?;
    DnsServer::delete_by_id(id).exec(db).await?;
    tracing::info!("Deleted DNS server {}", existing.ip_address);
    Ok(())
}
