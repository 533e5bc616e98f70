//! IP Service - addresses inside networks
//!
//! An IP record always lies inside its network and is unique there. Records
//! created through `assign_ip` are bare reservations; fully described records
//! carry a hostname or a DNS name.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use super::network_service::recompute_utilization;
use super::{check_ref, custom_field_service, fetch, now, purge_polymorphic, tag_service};
use crate::domain::address;
use crate::domain::validation::optional;
use crate::domain::{DomainError, DomainResult, EntityType, IpFilter, IpPatch, IpRecord, NewIp};
use crate::models::ip::{self, Entity as Ip};
use crate::models::{
    asset, asset_clients, host_category, linked_ip, manufacturer, network, operating_system,
    site, snmp_group,
};

const UNIQUE_IN_NETWORK: &str = "ips.network_id, ips.ip_address";

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 1000;

/// Reserve an address in a network without describing it further.
pub async fn assign_ip(
    db: &DatabaseConnection,
    network_id: i32,
    ip_address: &str,
) -> DomainResult<ip::Model> {
    let txn = db.begin().await?;
    let parent = fetch::<network::Entity, _>(&txn, network_id, "network").await?;
    let ip_address = place_address(&txn, &parent, ip_address, None).await?;

    let now = now();
    let model = ip::ActiveModel {
        network_id: Set(network_id),
        ip_address: Set(ip_address),
        cm_enabled: Set(false),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    recompute_utilization(&txn, network_id).await?;
    txn.commit().await?;

    tracing::info!(
        "Assigned {} in network {} (id {})",
        model.ip_address,
        parent.cidr(),
        model.id
    );
    Ok(model)
}

/// Create a fully described IP record.
pub async fn create_ip(db: &DatabaseConnection, input: NewIp) -> DomainResult<ip::Model> {
    require_name(&input.hostname, &input.dns_name)?;

    let txn = db.begin().await?;
    let parent =
        check_ref::<network::Entity, _>(&txn, Some(input.network_id), "network").await?;
    let Some(parent) = parent else {
        return Err(DomainError::validation("network is required"));
    };
    let ip_address = place_address(&txn, &parent, &input.ip_address, None).await?;
    check_asset_tenancy(&txn, input.asset_id, parent.client_id).await?;
    check_descriptive_refs(
        &txn,
        input.site_id,
        input.category_id,
        input.snmp_group_id,
        input.manufacturer_id,
        input.os_id,
    )
    .await?;

    let mac = match optional(input.mac) {
        Some(raw) => Some(address::normalize_mac(&raw)?),
        None => None,
    };
    let ping_last_checked = checked_date(optional(input.ping_last_checked))?;

    let now = now();
    let model = ip::ActiveModel {
        network_id: Set(input.network_id),
        asset_id: Set(input.asset_id),
        site_id: Set(input.site_id),
        category_id: Set(input.category_id),
        snmp_group_id: Set(input.snmp_group_id),
        manufacturer_id: Set(input.manufacturer_id),
        os_id: Set(input.os_id),
        ip_address: Set(ip_address),
        hostname: Set(optional(input.hostname)),
        dns_name: Set(optional(input.dns_name)),
        domain: Set(optional(input.domain)),
        cnames: Set(optional(input.cnames)),
        mac: Set(mac),
        serial_number: Set(optional(input.serial_number)),
        description: Set(optional(input.description)),
        comment: Set(optional(input.comment)),
        url: Set(optional(input.url)),
        if_alias: Set(optional(input.if_alias)),
        if_descr: Set(optional(input.if_descr)),
        cm_enabled: Set(input.cm_enabled),
        ping_status: Set(input.ping_status),
        ping_last_checked: Set(ping_last_checked),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    recompute_utilization(&txn, model.network_id).await?;
    txn.commit().await?;

    tracing::info!(
        "Created IP {} ({:?}) in network {}",
        model.ip_address,
        model.hostname.as_ref().or(model.dns_name.as_ref()),
        parent.cidr()
    );
    Ok(model)
}

/// Full replacement of an IP record; the result must carry a name.
pub async fn replace_ip(
    db: &DatabaseConnection,
    id: i32,
    input: NewIp,
) -> DomainResult<ip::Model> {
    require_name(&input.hostname, &input.dns_name)?;
    update_ip(db, id, input.into()).await
}

/// Apply a partial update. Moving a record re-checks containment and
/// uniqueness, and refreshes utilization on both networks.
pub async fn update_ip(db: &DatabaseConnection, id: i32, patch: IpPatch) -> DomainResult<ip::Model> {
    let txn = db.begin().await?;
    let existing = fetch::<Ip, _>(&txn, id, "IP").await?;
    let was_named = existing.hostname.is_some() || existing.dns_name.is_some();

    let network_id = patch.network_id.unwrap_or(existing.network_id);
    let parent = if network_id == existing.network_id {
        fetch::<network::Entity, _>(&txn, network_id, "network").await?
    } else {
        check_ref::<network::Entity, _>(&txn, Some(network_id), "network")
            .await?
            .ok_or_else(|| DomainError::validation("network is required"))?
    };

    let moved = network_id != existing.network_id || patch.ip_address.is_some();
    let ip_address = if moved {
        let raw = patch
            .ip_address
            .clone()
            .unwrap_or_else(|| existing.ip_address.clone());
        place_address(&txn, &parent, &raw, Some(id)).await?
    } else {
        existing.ip_address.clone()
    };

    let hostname = patch.hostname.map(optional).unwrap_or(existing.hostname.clone());
    let dns_name = patch.dns_name.map(optional).unwrap_or(existing.dns_name.clone());
    if was_named && hostname.is_none() && dns_name.is_none() {
        return Err(DomainError::validation(
            "an IP record needs a hostname or a DNS name",
        ));
    }

    let asset_id = patch.asset_id.unwrap_or(existing.asset_id);
    check_asset_tenancy(&txn, asset_id, parent.client_id).await?;
    check_descriptive_refs(
        &txn,
        patch.site_id.flatten(),
        patch.category_id.flatten(),
        patch.snmp_group_id.flatten(),
        patch.manufacturer_id.flatten(),
        patch.os_id.flatten(),
    )
    .await?;

    let old_network_id = existing.network_id;
    let mut active: ip::ActiveModel = existing.into();
    active.network_id = Set(network_id);
    active.ip_address = Set(ip_address);
    active.hostname = Set(hostname);
    active.dns_name = Set(dns_name);
    active.asset_id = Set(asset_id);

    if let Some(mac) = patch.mac {
        active.mac = Set(match optional(mac) {
            Some(raw) => Some(address::normalize_mac(&raw)?),
            None => None,
        });
    }
    if let Some(ts) = patch.ping_last_checked {
        active.ping_last_checked = Set(checked_date(optional(ts))?);
    }
    if let Some(v) = patch.site_id {
        active.site_id = Set(v);
    }
    if let Some(v) = patch.category_id {
        active.category_id = Set(v);
    }
    if let Some(v) = patch.snmp_group_id {
        active.snmp_group_id = Set(v);
    }
    if let Some(v) = patch.manufacturer_id {
        active.manufacturer_id = Set(v);
    }
    if let Some(v) = patch.os_id {
        active.os_id = Set(v);
    }
    if let Some(v) = patch.domain {
        active.domain = Set(optional(v));
    }
    if let Some(v) = patch.cnames {
        active.cnames = Set(optional(v));
    }
    if let Some(v) = patch.serial_number {
        active.serial_number = Set(optional(v));
    }
    if let Some(v) = patch.description {
        active.description = Set(optional(v));
    }
    if let Some(v) = patch.comment {
        active.comment = Set(optional(v));
    }
    if let Some(v) = patch.url {
        active.url = Set(optional(v));
    }
    if let Some(v) = patch.if_alias {
        active.if_alias = Set(optional(v));
    }
    if let Some(v) = patch.if_descr {
        active.if_descr = Set(optional(v));
    }
    if let Some(v) = patch.cm_enabled {
        active.cm_enabled = Set(v);
    }
    if let Some(v) = patch.ping_status {
        active.ping_status = Set(v);
    }
    active.updated_at = Set(now());

    let model = active.update(&txn).await?;

    if old_network_id != network_id {
        recompute_utilization(&txn, old_network_id).await?;
        recompute_utilization(&txn, network_id).await?;
    }
    txn.commit().await?;

    tracing::info!("Updated IP {} (id {})", model.ip_address, model.id);
    Ok(model)
}

pub async fn delete_ip(db: &DatabaseConnection, id: i32) -> DomainResult<()> {
    let txn = db.begin().await?;
    let existing = fetch::<Ip, _>(&txn, id, "IP").await?;

    purge_polymorphic(&txn, EntityType::Ip, &[id]).await?;
    Ip::delete_by_id(id).exec(&txn).await?;
    recompute_utilization(&txn, existing.network_id).await?;
    txn.commit().await?;

    tracing::info!("Deleted IP {} (id {})", existing.ip_address, id);
    Ok(())
}

pub async fn get_ip(db: &DatabaseConnection, id: i32) -> DomainResult<ip::Model> {
    fetch::<Ip, _>(db, id, "IP").await
}

/// One page of IP records plus the total number of matches.
pub async fn list_ips(
    db: &DatabaseConnection,
    filter: IpFilter,
) -> DomainResult<(Vec<ip::Model>, u64)> {
    let mut query = Ip::find();

    if let Some(network_id) = filter.network {
        query = query.filter(ip::Column::NetworkId.eq(network_id));
    }
    if let Some(hostname) = filter.hostname.clone() {
        query = query.filter(ip::Column::Hostname.eq(hostname));
    }

    let (limit, offset) = page_window(&filter)?;
    let total = query.clone().count(db).await?;

    let objects = query
        .order_by_asc(ip::Column::NetworkId)
        .order_by_asc(ip::Column::Id)
        .limit(limit)
        .offset(offset)
        .all(db)
        .await?;

    Ok((objects, total))
}

/// Effective page size and offset of a list request. Both are bound as signed
/// 64-bit integers, so larger offsets are refused.
pub fn page_window(filter: &IpFilter) -> DomainResult<(u64, u64)> {
    let limit = filter.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);
    let offset = filter.offset.unwrap_or(0);
    if offset > i64::MAX as u64 {
        return Err(DomainError::validation(format!(
            "offset {} is out of range",
            offset
        )));
    }
    Ok((limit, offset))
}

/// Link two IP records. Linking is symmetric and idempotent.
pub async fn link_ip(db: &DatabaseConnection, a: i32, b: i32) -> DomainResult<()> {
    if a == b {
        return Err(DomainError::validation("an IP record cannot be linked to itself"));
    }
    let (low, high) = if a < b { (a, b) } else { (b, a) };

    let txn = db.begin().await?;
    fetch::<Ip, _>(&txn, a, "IP").await?;
    fetch::<Ip, _>(&txn, b, "IP").await?;

    let existing = linked_ip::Entity::find_by_id((low, high)).one(&txn).await?;
    if existing.is_none() {
        linked_ip::ActiveModel {
            ip_id_a: Set(low),
            ip_id_b: Set(high),
        }
        .insert(&txn)
        .await?;
        tracing::info!("Linked IP {} <-> {}", low, high);
    }

    txn.commit().await?;
    Ok(())
}

pub async fn unlink_ip(db: &DatabaseConnection, a: i32, b: i32) -> DomainResult<()> {
    let (low, high) = if a < b { (a, b) } else { (b, a) };
    let result = linked_ip::Entity::delete_by_id((low, high)).exec(db).await?;
    if result.rows_affected > 0 {
        tracing::info!("Unlinked IP {} <-> {}", low, high);
    }
    Ok(())
}

/// IP records linked to `id`, ordered by id.
pub async fn linked_ips(db: &DatabaseConnection, id: i32) -> DomainResult<Vec<ip::Model>> {
    fetch::<Ip, _>(db, id, "IP").await?;
    let peers = peer_ids(db, id).await?;
    if peers.is_empty() {
        return Ok(Vec::new());
    }
    Ok(Ip::find()
        .filter(ip::Column::Id.is_in(peers))
        .order_by_asc(ip::Column::Id)
        .all(db)
        .await?)
}

/// Expand an IP row into its REST representation.
pub async fn ip_record<C: ConnectionTrait>(conn: &C, model: ip::Model) -> DomainResult<IpRecord> {
    let linked_ip = peer_ids(conn, model.id).await?;
    let tags = tag_service::tags_for(conn, EntityType::Ip, model.id)
        .await?
        .into_iter()
        .map(|t| t.tag)
        .collect();
    let custom_fields = custom_field_service::values_for(conn, EntityType::Ip, model.id).await?;

    Ok(IpRecord {
        ip: model,
        linked_ip,
        tags,
        custom_fields,
    })
}

async fn peer_ids<C: ConnectionTrait>(conn: &C, id: i32) -> DomainResult<Vec<i32>> {
    let links = linked_ip::Entity::find()
        .filter(
            Condition::any()
                .add(linked_ip::Column::IpIdA.eq(id))
                .add(linked_ip::Column::IpIdB.eq(id)),
        )
        .all(conn)
        .await?;

    let mut peers: Vec<i32> = links.iter().map(|l| l.peer_of(id)).collect();
    peers.sort_unstable();
    Ok(peers)
}

/// Canonicalise an address, check it lies inside `parent` and is not taken.
async fn place_address<C: ConnectionTrait>(
    conn: &C,
    parent: &network::Model,
    raw: &str,
    except: Option<i32>,
) -> DomainResult<String> {
    let addr = address::parse_address(raw)?;
    let net = parent.prefix().ok_or_else(|| {
        DomainError::Database(format!("network {} has an unparsable prefix", parent.id))
    })?;

    if !net.contains(&addr) {
        return Err(DomainError::validation(format!(
            "{} is outside network {}",
            addr,
            parent.cidr()
        )));
    }
    let ip_address = addr.to_string();
    let mut query = Ip::find()
        .filter(ip::Column::NetworkId.eq(parent.id))
        .filter(ip::Column::IpAddress.eq(ip_address.as_str()));
    if let Some(id) = except {
        query = query.filter(ip::Column::Id.ne(id));
    }
    if query.one(conn).await?.is_some() {
        return Err(DomainError::duplicate(
            UNIQUE_IN_NETWORK,
            format!("{} already exists in network {}", ip_address, parent.cidr()),
        ));
    }

    Ok(ip_address)
}

fn require_name(hostname: &Option<String>, dns_name: &Option<String>) -> DomainResult<()> {
    let named = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
    if !named(hostname) && !named(dns_name) {
        return Err(DomainError::validation(
            "an IP record needs a hostname or a DNS name",
        ));
    }
    Ok(())
}

/// Last ping check date, stored as `YYYY-MM-DD`. A full RFC 3339 timestamp is
/// accepted and cut down to its date.
fn checked_date(value: Option<String>) -> DomainResult<Option<String>> {
    let Some(raw) = value else {
        return Ok(None);
    };
    let date = chrono::NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .or_else(|_| chrono::DateTime::parse_from_rfc3339(&raw).map(|ts| ts.date_naive()))
        .map_err(|_| DomainError::validation(format!("'{}' is not a date (YYYY-MM-DD)", raw)))?;
    Ok(Some(date.format("%Y-%m-%d").to_string()))
}

/// An asset shared with specific clients may only hold addresses of those
/// clients' networks. Assets without clients are unrestricted.
async fn check_asset_tenancy<C: ConnectionTrait>(
    conn: &C,
    asset_id: Option<i32>,
    client_id: i32,
) -> DomainResult<()> {
    let Some(found) = check_ref::<asset::Entity, _>(conn, asset_id, "asset").await? else {
        return Ok(());
    };

    let clients: Vec<i32> = asset_clients::Entity::find()
        .select_only()
        .column(asset_clients::Column::ClientId)
        .filter(asset_clients::Column::AssetId.eq(found.id))
        .into_tuple()
        .all(conn)
        .await?;

    if !clients.is_empty() && !clients.contains(&client_id) {
        return Err(DomainError::validation(format!(
            "asset {} is not shared with client {}",
            found.name, client_id
        )));
    }
    Ok(())
}

async fn check_descriptive_refs<C: ConnectionTrait>(
    conn: &C,
    site_id: Option<i32>,
    category_id: Option<i32>,
    snmp_group_id: Option<i32>,
    manufacturer_id: Option<i32>,
    os_id: Option<i32>,
) -> DomainResult<()> {
    check_ref::<site::Entity, _>(conn, site_id, "site").await?;
    check_ref::<host_category::Entity, _>(conn, category_id, "host category").await?;
    check_ref::<snmp_group::Entity, _>(conn, snmp_group_id, "SNMP group").await?;
    check_ref::<manufacturer::Entity, _>(conn, manufacturer_id, "manufacturer").await?;
    check_ref::<operating_system::Entity, _>(conn, os_id, "operating system").await?;
    Ok(())
}
