//! Segment Service - VLANs and VRFs
//!
//! Both are owned by one client. VLAN numbers and VRF names are unique per
//! client.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;

use super::{check_ref, fetch, now, purge_polymorphic};
use crate::domain::validation::{optional, required, route_distinguisher, vlan_number};
use crate::domain::{DomainError, DomainResult, EntityType};
use crate::models::vlan::{self, Entity as Vlan};
use crate::models::vrf::{self, Entity as Vrf};
use crate::models::{client, company, network};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewVlan {
    pub client_id: i32,
    pub number: i32,
    pub name: String,
    #[serde(default)]
    pub provider_id: Option<i32>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Fields left as `None` are kept.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VlanUpdate {
    pub number: Option<i32>,
    pub name: Option<String>,
    pub comment: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewVrf {
    pub client_id: i32,
    pub name: String,
    pub rd: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

// ============ VLANs ============

pub async fn create_vlan(db: &DatabaseConnection, input: NewVlan) -> DomainResult<vlan::Model> {
    let number = vlan_number(input.number)?;
    let name = required("VLAN name", &input.name)?;

    let txn = db.begin().await?;
    check_ref::<client::Entity, _>(&txn, Some(input.client_id), "client").await?;
    check_ref::<company::Entity, _>(&txn, input.provider_id, "provider").await?;
    ensure_vlan_number_free(&txn, input.client_id, number, None).await?;

    let now = now();
    let model = vlan::ActiveModel {
        client_id: Set(input.client_id),
        provider_id: Set(input.provider_id),
        number: Set(number),
        name: Set(name),
        comment: Set(optional(input.comment)),
        description: Set(optional(input.description)),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    tracing::info!(
        "Created VLAN {} '{}' for client {}",
        model.number,
        model.name,
        model.client_id
    );
    Ok(model)
}

pub async fn update_vlan(
    db: &DatabaseConnection,
    id: i32,
    input: VlanUpdate,
) -> DomainResult<vlan::Model> {
    let txn = db.begin().await?;
    let existing = fetch::<Vlan, _>(&txn, id, "VLAN").await?;
    let client_id = existing.client_id;

    let mut active: vlan::ActiveModel = existing.into();
    if let Some(number) = input.number {
        let number = vlan_number(number)?;
        ensure_vlan_number_free(&txn, client_id, number, Some(id)).await?;
        active.number = Set(number);
    }
    if let Some(name) = input.name {
        active.name = Set(required("VLAN name", &name)?);
    }
    if input.comment.is_some() {
        active.comment = Set(optional(input.comment));
    }
    if input.description.is_some() {
        active.description = Set(optional(input.description));
    }
    active.updated_at = Set(now());

    let model = active.update(&txn).await?;
    txn.commit().await?;
    Ok(model)
}

pub async fn list_vlans(
    db: &DatabaseConnection,
    client_id: Option<i32>,
) -> DomainResult<Vec<vlan::Model>> {
    let mut query = Vlan::find();
    if let Some(client_id) = client_id {
        query = query.filter(vlan::Column::ClientId.eq(client_id));
    }
    Ok(query
        .order_by_asc(vlan::Column::ClientId)
        .order_by_asc(vlan::Column::Number)
        .all(db)
        .await?)
}

pub async fn get_vlan(db: &DatabaseConnection, id: i32) -> DomainResult<vlan::Model> {
    fetch::<Vlan, _>(db, id, "VLAN").await
}

/// Networks on the VLAN keep existing with their VLAN cleared.
pub async fn delete_vlan(db: &DatabaseConnection, id: i32) -> DomainResult<()> {
    let txn = db.begin().await?;
    let existing = fetch::<Vlan, _>(&txn, id, "VLAN").await?;

    purge_polymorphic(&txn, EntityType::Vlan, &[id]).await?;
    Vlan::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!("Deleted VLAN {} (id {})", existing.number, id);
    Ok(())
}

async fn ensure_vlan_number_free<C: sea_orm::ConnectionTrait>(
    conn: &C,
    client_id: i32,
    number: i32,
    except: Option<i32>,
) -> DomainResult<()> {
    let mut query = Vlan::find()
        .filter(vlan::Column::ClientId.eq(client_id))
        .filter(vlan::Column::Number.eq(number));
    if let Some(id) = except {
        query = query.filter(vlan::Column::Id.ne(id));
    }
    if query.one(conn).await?.is_some() {
        return Err(DomainError::duplicate(
            "vlans.client_id, vlans.number",
            format!("VLAN {} already exists for client {}", number, client_id),
        ));
    }
    Ok(())
}

// ============ VRFs ============

pub async fn create_vrf(db: &DatabaseConnection, input: NewVrf) -> DomainResult<vrf::Model> {
    let name = required("VRF name", &input.name)?;
    let rd = route_distinguisher(&input.rd)?;

    let txn = db.begin().await?;
    check_ref::<client::Entity, _>(&txn, Some(input.client_id), "client").await?;
    ensure_vrf_name_free(&txn, input.client_id, &name, None).await?;

    let now = now();
    let model = vrf::ActiveModel {
        client_id: Set(input.client_id),
        name: Set(name),
        rd: Set(rd),
        comment: Set(optional(input.comment)),
        description: Set(optional(input.description)),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    tracing::info!(
        "Created VRF '{}' rd {} for client {}",
        model.name,
        model.rd,
        model.client_id
    );
    Ok(model)
}

/// Replace the name, RD and descriptive fields of a VRF. A VRF stays with the
/// client that owns it.
pub async fn update_vrf(db: &DatabaseConnection, id: i32, input: NewVrf) -> DomainResult<vrf::Model> {
    let name = required("VRF name", &input.name)?;
    let rd = route_distinguisher(&input.rd)?;

    let txn = db.begin().await?;
    let existing = fetch::<Vrf, _>(&txn, id, "VRF").await?;
    if input.client_id != existing.client_id {
        return Err(DomainError::validation(format!(
            "VRF '{}' cannot move to another client",
            existing.name
        )));
    }
    ensure_vrf_name_free(&txn, existing.client_id, &name, Some(id)).await?;

    let mut active: vrf::ActiveModel = existing.into();
    active.name = Set(name);
    active.rd = Set(rd);
    active.comment = Set(optional(input.comment));
    active.description = Set(optional(input.description));
    active.updated_at = Set(now());

    let model = active.update(&txn).await?;
    txn.commit().await?;
    tracing::info!("Updated VRF '{}' rd {}", model.name, model.rd);
    Ok(model)
}

async fn ensure_vrf_name_free<C: sea_orm::ConnectionTrait>(
    conn: &C,
    client_id: i32,
    name: &str,
    except: Option<i32>,
) -> DomainResult<()> {
    let mut query = Vrf::find()
        .filter(vrf::Column::ClientId.eq(client_id))
        .filter(vrf::Column::Name.eq(name));
    if let Some(id) = except {
        query = query.filter(vrf::Column::Id.ne(id));
    }
    if query.one(conn).await?.is_some() {
        return Err(DomainError::duplicate(
            "vrfs.client_id, vrfs.name",
            format!("VRF '{}' already exists for client {}", name, client_id),
        ));
    }
    Ok(())
}

pub async fn list_vrfs(
    db: &DatabaseConnection,
    client_id: Option<i32>,
) -> DomainResult<Vec<vrf::Model>> {
    let mut query = Vrf::find();
    if let Some(client_id) = client_id {
        query = query.filter(vrf::Column::ClientId.eq(client_id));
    }
    Ok(query.order_by_asc(vrf::Column::Name).all(db).await?)
}

pub async fn get_vrf(db: &DatabaseConnection, id: i32) -> DomainResult<vrf::Model> {
    fetch::<Vrf, _>(db, id, "VRF").await
}

/// Refused while networks are members of the VRF. Networks that only use it
/// as their RD owner have that reference cleared.
pub async fn delete_vrf(db: &DatabaseConnection, id: i32) -> DomainResult<()> {
    let txn = db.begin().await?;
    let existing = fetch::<Vrf, _>(&txn, id, "VRF").await?;

    let members = network::Entity::find()
        .filter(network::Column::VrfId.eq(id))
        .count(&txn)
        .await?;
    if members > 0 {
        return Err(DomainError::ReferentialIntegrity(format!(
            "VRF '{}' still has {} member networks",
            existing.name, members
        )));
    }

    purge_polymorphic(&txn, EntityType::Vrf, &[id]).await?;
    Vrf::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!("Deleted VRF '{}' (id {})", existing.name, id);
    Ok(())
}
