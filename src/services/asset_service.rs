//! Asset Service - assets and their SNMP / vendor catalogue

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;

use super::network_service::recompute_utilization;
use super::{check_clients, check_ref, fetch, linked_ids, now, purge_polymorphic};
use crate::domain::validation::{optional, required, snmp_credentials, SnmpCredentials};
use crate::domain::{DomainError, DomainResult, EntityType};
use crate::models::asset::{self, Entity as Asset};
use crate::models::{
    app_image, asset_clients, host_category, ip, manufacturer, network, operating_system, site,
    snmp_group, snmp_group_clients,
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewSnmpGroup {
    pub name: String,
    pub version: i16,
    pub comment: Option<String>,
    pub community: Option<String>,
    pub security_level: Option<String>,
    pub auth_algorithm: Option<String>,
    pub auth_password: Option<String>,
    pub priv_algorithm: Option<String>,
    pub priv_password: Option<String>,
    pub client_ids: Vec<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewAsset {
    pub name: String,
    pub hostname: Option<String>,
    pub site_id: Option<i32>,
    pub category_id: Option<i32>,
    pub snmp_group_id: Option<i32>,
    pub manufacturer_id: Option<i32>,
    pub os_id: Option<i32>,
    pub serial_number: Option<String>,
    pub comment: Option<String>,
    pub description: Option<String>,
    pub descr_snmp: Option<String>,
    pub client_ids: Vec<i32>,
}

/// Name, stored image path and comment shared by the vendor catalogue tables.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogEntry {
    pub name: String,
    pub image: Option<String>,
    pub comment: Option<String>,
}

// ============ SNMP groups ============

pub async fn create_snmp_group(
    db: &DatabaseConnection,
    input: NewSnmpGroup,
) -> DomainResult<snmp_group::Model> {
    let name = required("SNMP group name", &input.name)?;
    let creds = snmp_credentials(SnmpCredentials {
        version: input.version,
        community: input.community,
        security_level: input.security_level,
        auth_algorithm: input.auth_algorithm,
        auth_password: input.auth_password,
        priv_algorithm: input.priv_algorithm,
        priv_password: input.priv_password,
    })?;

    let txn = db.begin().await?;
    let client_ids = check_clients(&txn, &input.client_ids).await?;
    ensure_snmp_name_free(&txn, &name, None).await?;

    let model = snmp_group::ActiveModel {
        name: Set(name),
        version: Set(creds.version),
        comment: Set(optional(input.comment)),
        community: Set(creds.community),
        security_level: Set(creds.security_level),
        auth_algorithm: Set(creds.auth_algorithm),
        auth_password: Set(creds.auth_password),
        priv_algorithm: Set(creds.priv_algorithm),
        priv_password: Set(creds.priv_password),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    link_snmp_group_clients(&txn, model.id, client_ids).await?;

    txn.commit().await?;
    tracing::info!("Created SNMPv{} group '{}'", model.version, model.name);
    Ok(model)
}

/// Replace the settings of an SNMP group. The credentials are checked again
/// against the version; a password left out keeps the stored one.
pub async fn update_snmp_group(
    db: &DatabaseConnection,
    id: i32,
    input: NewSnmpGroup,
) -> DomainResult<snmp_group::Model> {
    let name = required("SNMP group name", &input.name)?;

    let txn = db.begin().await?;
    let existing = fetch::<snmp_group::Entity, _>(&txn, id, "SNMP group").await?;
    let creds = snmp_credentials(SnmpCredentials {
        version: input.version,
        community: input.community,
        security_level: input.security_level,
        auth_algorithm: input.auth_algorithm,
        auth_password: optional(input.auth_password).or(existing.auth_password.clone()),
        priv_algorithm: input.priv_algorithm,
        priv_password: optional(input.priv_password).or(existing.priv_password.clone()),
    })?;
    let client_ids = check_clients(&txn, &input.client_ids).await?;
    ensure_snmp_name_free(&txn, &name, Some(id)).await?;

    let mut active: snmp_group::ActiveModel = existing.into();
    active.name = Set(name);
    active.version = Set(creds.version);
    active.comment = Set(optional(input.comment));
    active.community = Set(creds.community);
    active.security_level = Set(creds.security_level);
    active.auth_algorithm = Set(creds.auth_algorithm);
    active.auth_password = Set(creds.auth_password);
    active.priv_algorithm = Set(creds.priv_algorithm);
    active.priv_password = Set(creds.priv_password);

    let model = active.update(&txn).await?;
    link_snmp_group_clients(&txn, id, client_ids).await?;
    txn.commit().await?;

    tracing::info!("Updated SNMPv{} group '{}'", model.version, model.name);
    Ok(model)
}

pub async fn snmp_group_client_ids(db: &DatabaseConnection, id: i32) -> DomainResult<Vec<i32>> {
    linked_ids::<snmp_group_clients::Entity, _>(
        db,
        snmp_group_clients::Column::SnmpGroupId,
        id,
        snmp_group_clients::Column::ClientId,
    )
    .await
}

async fn ensure_snmp_name_free<C: ConnectionTrait>(
    conn: &C,
    name: &str,
    except: Option<i32>,
) -> DomainResult<()> {
    let mut query = snmp_group::Entity::find().filter(snmp_group::Column::Name.eq(name));
    if let Some(id) = except {
        query = query.filter(snmp_group::Column::Id.ne(id));
    }
    if query.one(conn).await?.is_some() {
        return Err(DomainError::duplicate(
            "snmp_groups.name",
            format!("SNMP group '{}' already exists", name),
        ));
    }
    Ok(())
}

async fn link_snmp_group_clients<C: ConnectionTrait>(
    conn: &C,
    snmp_group_id: i32,
    client_ids: Vec<i32>,
) -> DomainResult<()> {
    snmp_group_clients::Entity::delete_many()
        .filter(snmp_group_clients::Column::SnmpGroupId.eq(snmp_group_id))
        .exec(conn)
        .await?;
    for client_id in client_ids {
        snmp_group_clients::ActiveModel {
            snmp_group_id: Set(snmp_group_id),
            client_id: Set(client_id),
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

pub async fn list_snmp_groups(db: &DatabaseConnection) -> DomainResult<Vec<snmp_group::Model>> {
    Ok(snmp_group::Entity::find()
        .order_by_asc(snmp_group::Column::Name)
        .all(db)
        .await?)
}

pub async fn delete_snmp_group(db: &DatabaseConnection, id: i32) -> DomainResult<()> {
    fetch::<snmp_group::Entity, _>(db, id, "SNMP group").await?;
    snmp_group::Entity::delete_by_id(id).exec(db).await?;
    Ok(())
}

// ============ Vendor catalogue ============

pub async fn create_manufacturer(
    db: &DatabaseConnection,
    entry: CatalogEntry,
) -> DomainResult<manufacturer::Model> {
    let name = required("manufacturer", &entry.name)?;
    let taken = manufacturer::Entity::find()
        .filter(manufacturer::Column::Name.eq(name.as_str()))
        .one(db)
        .await?;
    if taken.is_some() {
        return Err(DomainError::duplicate(
            "manufacturers.name",
            format!("manufacturer '{}' already exists", name),
        ));
    }

    Ok(manufacturer::ActiveModel {
        name: Set(name),
        image: Set(optional(entry.image)),
        comment: Set(optional(entry.comment)),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

pub async fn update_manufacturer(
    db: &DatabaseConnection,
    id: i32,
    entry: CatalogEntry,
) -> DomainResult<manufacturer::Model> {
    let name = required("manufacturer", &entry.name)?;
    let existing = fetch::<manufacturer::Entity, _>(db, id, "manufacturer").await?;
    let taken = manufacturer::Entity::find()
        .filter(manufacturer::Column::Name.eq(name.as_str()))
        .filter(manufacturer::Column::Id.ne(id))
        .one(db)
        .await?;
    if taken.is_some() {
        return Err(DomainError::duplicate(
            "manufacturers.name",
            format!("manufacturer '{}' already exists", name),
        ));
    }

    let mut active: manufacturer::ActiveModel = existing.into();
    active.name = Set(name);
    active.image = Set(optional(entry.image));
    active.comment = Set(optional(entry.comment));
    Ok(active.update(db).await?)
}

pub async fn list_manufacturers(db: &DatabaseConnection) -> DomainResult<Vec<manufacturer::Model>> {
    Ok(manufacturer::Entity::find()
        .order_by_asc(manufacturer::Column::Name)
        .all(db)
        .await?)
}

pub async fn delete_manufacturer(db: &DatabaseConnection, id: i32) -> DomainResult<()> {
    fetch::<manufacturer::Entity, _>(db, id, "manufacturer").await?;
    manufacturer::Entity::delete_by_id(id).exec(db).await?;
    Ok(())
}

pub async fn create_operating_system(
    db: &DatabaseConnection,
    entry: CatalogEntry,
) -> DomainResult<operating_system::Model> {
    let name = required("operating system", &entry.name)?;
    let taken = operating_system::Entity::find()
        .filter(operating_system::Column::Name.eq(name.as_str()))
        .one(db)
        .await?;
    if taken.is_some() {
        return Err(DomainError::duplicate(
            "operating_systems.name",
            format!("operating system '{}' already exists", name),
        ));
    }

    Ok(operating_system::ActiveModel {
        name: Set(name),
        image: Set(optional(entry.image)),
        comment: Set(optional(entry.comment)),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

pub async fn update_operating_system(
    db: &DatabaseConnection,
    id: i32,
    entry: CatalogEntry,
) -> DomainResult<operating_system::Model> {
    let name = required("operating system", &entry.name)?;
    let existing = fetch::<operating_system::Entity, _>(db, id, "operating system").await?;
    let taken = operating_system::Entity::find()
        .filter(operating_system::Column::Name.eq(name.as_str()))
        .filter(operating_system::Column::Id.ne(id))
        .one(db)
        .await?;
    if taken.is_some() {
        return Err(DomainError::duplicate(
            "operating_systems.name",
            format!("operating system '{}' already exists", name),
        ));
    }

    let mut active: operating_system::ActiveModel = existing.into();
    active.name = Set(name);
    active.image = Set(optional(entry.image));
    active.comment = Set(optional(entry.comment));
    Ok(active.update(db).await?)
}

pub async fn list_operating_systems(
    db: &DatabaseConnection,
) -> DomainResult<Vec<operating_system::Model>> {
    Ok(operating_system::Entity::find()
        .order_by_asc(operating_system::Column::Name)
        .all(db)
        .await?)
}

pub async fn delete_operating_system(db: &DatabaseConnection, id: i32) -> DomainResult<()> {
    fetch::<operating_system::Entity, _>(db, id, "operating system").await?;
    operating_system::Entity::delete_by_id(id).exec(db).await?;
    Ok(())
}

pub async fn create_app_image(
    db: &DatabaseConnection,
    entry: CatalogEntry,
) -> DomainResult<app_image::Model> {
    let name = required("image name", &entry.name)?;
    let taken = app_image::Entity::find()
        .filter(app_image::Column::Name.eq(name.as_str()))
        .one(db)
        .await?;
    if taken.is_some() {
        return Err(DomainError::duplicate(
            "app_images.name",
            format!("image '{}' already exists", name),
        ));
    }

    Ok(app_image::ActiveModel {
        name: Set(name),
        image: Set(optional(entry.image)),
        comment: Set(optional(entry.comment)),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

pub async fn update_app_image(
    db: &DatabaseConnection,
    id: i32,
    entry: CatalogEntry,
) -> DomainResult<app_image::Model> {
    let name = required("image name", &entry.name)?;
    let existing = fetch::<app_image::Entity, _>(db, id, "image").await?;
    let taken = app_image::Entity::find()
        .filter(app_image::Column::Name.eq(name.as_str()))
        .filter(app_image::Column::Id.ne(id))
        .one(db)
        .await?;
    if taken.is_some() {
        return Err(DomainError::duplicate(
            "app_images.name",
            format!("image '{}' already exists", name),
        ));
    }

    let mut active: app_image::ActiveModel = existing.into();
    active.name = Set(name);
    active.image = Set(optional(entry.image));
    active.comment = Set(optional(entry.comment));
    Ok(active.update(db).await?)
}

pub async fn list_app_images(db: &DatabaseConnection) -> DomainResult<Vec<app_image::Model>> {
    Ok(app_image::Entity::find()
        .order_by_asc(app_image::Column::Name)
        .all(db)
        .await?)
}

pub async fn delete_app_image(db: &DatabaseConnection, id: i32) -> DomainResult<()> {
    fetch::<app_image::Entity, _>(db, id, "image").await?;
    app_image::Entity::delete_by_id(id).exec(db).await?;
    Ok(())
}

// ============ Assets ============

pub async fn create_asset(db: &DatabaseConnection, input: NewAsset) -> DomainResult<asset::Model> {
    let name = required("asset name", &input.name)?;

    let txn = db.begin().await?;
    let client_ids = check_clients(&txn, &input.client_ids).await?;
    check_asset_refs(&txn, &input).await?;
    ensure_asset_name_free(&txn, &name, None).await?;

    let now = now();
    let model = asset::ActiveModel {
        name: Set(name),
        site_id: Set(input.site_id),
        hostname: Set(optional(input.hostname)),
        category_id: Set(input.category_id),
        snmp_group_id: Set(input.snmp_group_id),
        manufacturer_id: Set(input.manufacturer_id),
        os_id: Set(input.os_id),
        serial_number: Set(optional(input.serial_number)),
        comment: Set(optional(input.comment)),
        description: Set(optional(input.description)),
        descr_snmp: Set(optional(input.descr_snmp)),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    link_asset_clients(&txn, model.id, client_ids).await?;

    txn.commit().await?;
    tracing::info!("Created asset '{}' (id {})", model.name, model.id);
    Ok(model)
}

/// Replace every field of an asset. Narrowing its clients is refused while it
/// holds addresses of a client left out.
pub async fn update_asset(
    db: &DatabaseConnection,
    id: i32,
    input: NewAsset,
) -> DomainResult<asset::Model> {
    let name = required("asset name", &input.name)?;

    let txn = db.begin().await?;
    let existing = fetch::<Asset, _>(&txn, id, "asset").await?;
    let client_ids = check_clients(&txn, &input.client_ids).await?;
    check_asset_refs(&txn, &input).await?;
    ensure_asset_name_free(&txn, &name, Some(id)).await?;

    if !client_ids.is_empty() {
        let held = ip::Entity::find()
            .filter(ip::Column::AssetId.eq(id))
            .find_also_related(network::Entity)
            .all(&txn)
            .await?;
        if let Some((ip, _)) = held
            .iter()
            .find(|(_, net)| net.as_ref().is_some_and(|n| !client_ids.contains(&n.client_id)))
        {
            return Err(DomainError::validation(format!(
                "asset '{}' holds {} of a client it would no longer be shared with",
                existing.name, ip.ip_address
            )));
        }
    }

    let mut active: asset::ActiveModel = existing.into();
    active.name = Set(name);
    active.site_id = Set(input.site_id);
    active.hostname = Set(optional(input.hostname));
    active.category_id = Set(input.category_id);
    active.snmp_group_id = Set(input.snmp_group_id);
    active.manufacturer_id = Set(input.manufacturer_id);
    active.os_id = Set(input.os_id);
    active.serial_number = Set(optional(input.serial_number));
    active.comment = Set(optional(input.comment));
    active.description = Set(optional(input.description));
    active.descr_snmp = Set(optional(input.descr_snmp));
    active.updated_at = Set(now());

    let model = active.update(&txn).await?;
    link_asset_clients(&txn, id, client_ids).await?;
    txn.commit().await?;

    tracing::info!("Updated asset '{}' (id {})", model.name, id);
    Ok(model)
}

pub async fn asset_client_ids(db: &DatabaseConnection, id: i32) -> DomainResult<Vec<i32>> {
    linked_ids::<asset_clients::Entity, _>(
        db,
        asset_clients::Column::AssetId,
        id,
        asset_clients::Column::ClientId,
    )
    .await
}

async fn check_asset_refs<C: ConnectionTrait>(conn: &C, input: &NewAsset) -> DomainResult<()> {
    check_ref::<site::Entity, _>(conn, input.site_id, "site").await?;
    check_ref::<host_category::Entity, _>(conn, input.category_id, "host category").await?;
    check_ref::<snmp_group::Entity, _>(conn, input.snmp_group_id, "SNMP group").await?;
    check_ref::<manufacturer::Entity, _>(conn, input.manufacturer_id, "manufacturer").await?;
    check_ref::<operating_system::Entity, _>(conn, input.os_id, "operating system").await?;
    Ok(())
}

async fn ensure_asset_name_free<C: ConnectionTrait>(
    conn: &C,
    name: &str,
    except: Option<i32>,
) -> DomainResult<()> {
    let mut query = Asset::find().filter(asset::Column::Name.eq(name));
    if let Some(id) = except {
        query = query.filter(asset::Column::Id.ne(id));
    }
    if query.one(conn).await?.is_some() {
        return Err(DomainError::duplicate(
            "assets.name",
            format!("asset '{}' already exists", name),
        ));
    }
    Ok(())
}

async fn link_asset_clients<C: ConnectionTrait>(
    conn: &C,
    asset_id: i32,
    client_ids: Vec<i32>,
) -> DomainResult<()> {
    asset_clients::Entity::delete_many()
        .filter(asset_clients::Column::AssetId.eq(asset_id))
        .exec(conn)
        .await?;
    for client_id in client_ids {
        asset_clients::ActiveModel {
            asset_id: Set(asset_id),
            client_id: Set(client_id),
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

pub async fn list_assets(db: &DatabaseConnection) -> DomainResult<Vec<asset::Model>> {
    Ok(Asset::find().order_by_asc(asset::Column::Name).all(db).await?)
}

pub async fn get_asset(db: &DatabaseConnection, id: i32) -> DomainResult<asset::Model> {
    fetch::<Asset, _>(db, id, "asset").await
}

/// Delete an asset together with the IP records it holds.
pub async fn delete_asset(db: &DatabaseConnection, id: i32) -> DomainResult<()> {
    let txn = db.begin().await?;
    let existing = fetch::<Asset, _>(&txn, id, "asset").await?;

    let held = ip::Entity::find()
        .filter(ip::Column::AssetId.eq(id))
        .all(&txn)
        .await?;
    let ip_ids: Vec<i32> = held.iter().map(|i| i.id).collect();
    let mut network_ids: Vec<i32> = held.iter().map(|i| i.network_id).collect();
    network_ids.sort_unstable();
    network_ids.dedup();

    purge_polymorphic(&txn, EntityType::Ip, &ip_ids).await?;
    purge_polymorphic(&txn, EntityType::Asset, &[id]).await?;
    Asset::delete_by_id(id).exec(&txn).await?;

    for network_id in network_ids {
        recompute_utilization(&txn, network_id).await?;
    }
    txn.commit().await?;

    tracing::info!(
        "Deleted asset '{}' with {} IP records",
        existing.name,
        ip_ids.len()
    );
    Ok(())
}
