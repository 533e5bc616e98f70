//! Client Service - tenancy roots
//!
//! Deleting a client removes everything it owns. Storage-level cascades take
//! care of rows with foreign keys; tag and custom-field rows are purged here.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};

use super::{fetch, now, purge_polymorphic};
use crate::domain::validation::required;
use crate::domain::{DomainResult, EntityType};
use crate::models::client::{self, Entity as Client};
use crate::models::{ip, line, network, vlan, vrf};

pub async fn create_client(db: &DatabaseConnection, name: &str) -> DomainResult<client::Model> {
    let name = required("client name", name)?;
    let now = now();

    let model = client::ActiveModel {
        name: Set(name),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!("Created client {} ({})", model.name, model.id);
    Ok(model)
}

pub async fn list_clients(db: &DatabaseConnection) -> DomainResult<Vec<client::Model>> {
    Ok(Client::find()
        .order_by_asc(client::Column::Name)
        .all(db)
        .await?)
}

pub async fn get_client(db: &DatabaseConnection, id: i32) -> DomainResult<client::Model> {
    fetch::<Client, _>(db, id, "client").await
}

pub async fn rename_client(
    db: &DatabaseConnection,
    id: i32,
    name: &str,
) -> DomainResult<client::Model> {
    let name = required("client name", name)?;
    let existing = fetch::<Client, _>(db, id, "client").await?;

    let mut active: client::ActiveModel = existing.into();
    active.name = Set(name);
    active.updated_at = Set(now());
    Ok(active.update(db).await?)
}

/// Delete a client and everything scoped to it.
pub async fn delete_client(db: &DatabaseConnection, id: i32) -> DomainResult<()> {
    let txn = db.begin().await?;
    let client = fetch::<Client, _>(&txn, id, "client").await?;

    let network_ids: Vec<i32> = network::Entity::find()
        .select_only()
        .column(network::Column::Id)
        .filter(network::Column::ClientId.eq(id))
        .into_tuple()
        .all(&txn)
        .await?;

    let ip_ids: Vec<i32> = if network_ids.is_empty() {
        Vec::new()
    } else {
        ip::Entity::find()
            .select_only()
            .column(ip::Column::Id)
            .filter(ip::Column::NetworkId.is_in(network_ids.clone()))
            .into_tuple()
            .all(&txn)
            .await?
    };

    let vlan_ids: Vec<i32> = vlan::Entity::find()
        .select_only()
        .column(vlan::Column::Id)
        .filter(vlan::Column::ClientId.eq(id))
        .into_tuple()
        .all(&txn)
        .await?;

    let vrf_ids: Vec<i32> = vrf::Entity::find()
        .select_only()
        .column(vrf::Column::Id)
        .filter(vrf::Column::ClientId.eq(id))
        .into_tuple()
        .all(&txn)
        .await?;

    let line_ids: Vec<i32> = line::Entity::find()
        .select_only()
        .column(line::Column::Id)
        .filter(line::Column::ClientId.eq(id))
        .into_tuple()
        .all(&txn)
        .await?;

    purge_polymorphic(&txn, EntityType::Ip, &ip_ids).await?;
    purge_polymorphic(&txn, EntityType::Network, &network_ids).await?;
    purge_polymorphic(&txn, EntityType::Vlan, &vlan_ids).await?;
    purge_polymorphic(&txn, EntityType::Vrf, &vrf_ids).await?;
    purge_polymorphic(&txn, EntityType::Line, &line_ids).await?;

    Client::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(
        "Deleted client {} with {} networks, {} IPs, {} VLANs, {} VRFs, {} lines",
        client.name,
        network_ids.len(),
        ip_ids.len(),
        vlan_ids.len(),
        vrf_ids.len(),
        line_ids.len()
    );
    Ok(())
}
