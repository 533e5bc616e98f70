//! Network Service - the address space hierarchy
//!
//! Networks are scoped by (client, vrf, address family). Within a scope the
//! hierarchy is implied by prefix containment; rootnets anchor it and never
//! nest inside each other.

use ipnet::IpNet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use super::{check_ref, custom_field_service, fetch, now, purge_polymorphic, tag_service};
use crate::domain::address::{self, is_strict_supernet, overlaps};
use crate::domain::validation::optional;
use crate::domain::{
    DomainError, DomainResult, EntityType, NetworkFilter, NetworkRecord, NetworkUpdate,
    NewNetwork,
};
use crate::models::network::{self, Entity as Network};
use crate::models::{
    client, dns_server_group, ip, network_category, site, vlan, vrf,
};

const SCOPE_CONSTRAINT: &str =
    "networks.client_id, networks.vrf_id, networks.ip_address, networks.mask";

/// Create a network after checking its address, its references and the
/// rootnet rules of its scope.
pub async fn create_network(
    db: &DatabaseConnection,
    input: NewNetwork,
) -> DomainResult<network::Model> {
    let net = address::parse_network(&input.ip_address, input.mask)?;
    let txn = db.begin().await?;

    check_ref::<client::Entity, _>(&txn, Some(input.client_id), "client").await?;
    check_client_refs(&txn, input.client_id, input.vrf_id, input.rd_vrf_id, input.vlan_id).await?;
    check_ref::<dns_server_group::Entity, _>(&txn, input.dns_server_group_id, "DNS server group")
        .await?;
    check_ref::<site::Entity, _>(&txn, input.site_id, "site").await?;
    check_ref::<network_category::Entity, _>(&txn, input.category_id, "network category").await?;

    let ip_address = net.network().to_string();
    let duplicate = scoped(input.client_id, input.vrf_id)
        .filter(network::Column::IpAddress.eq(ip_address.as_str()))
        .filter(network::Column::Mask.eq(input.mask))
        .one(&txn)
        .await?;
    if duplicate.is_some() {
        return Err(DomainError::duplicate(
            SCOPE_CONSTRAINT,
            format!("{}/{} already exists for this client and VRF", ip_address, input.mask),
        ));
    }

    let version = address::ip_version(&net.addr());
    let siblings = scope(&txn, input.client_id, input.vrf_id, version).await?;
    check_rootnet_rules(&net, input.rootnet, &siblings)?;

    let now = now();
    let model = network::ActiveModel {
        client_id: Set(input.client_id),
        vlan_id: Set(input.vlan_id),
        dns_server_group_id: Set(input.dns_server_group_id),
        site_id: Set(input.site_id),
        category_id: Set(input.category_id),
        vrf_id: Set(input.vrf_id),
        rd_vrf_id: Set(input.rd_vrf_id),
        ip_address: Set(ip_address),
        mask: Set(input.mask),
        ip_version: Set(version),
        rootnet: Set(input.rootnet),
        utilization: Set(0),
        description: Set(optional(input.description)),
        comment: Set(optional(input.comment)),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    tracing::info!(
        "Created network {} (id {}, client {}, vrf {:?}, rootnet {})",
        model.cidr(),
        model.id,
        model.client_id,
        model.vrf_id,
        model.rootnet
    );
    Ok(model)
}

pub async fn list_networks(
    db: &DatabaseConnection,
    filter: NetworkFilter,
) -> DomainResult<Vec<network::Model>> {
    let mut query = Network::find();

    if let Some(client_id) = filter.client_id {
        query = query.filter(network::Column::ClientId.eq(client_id));
    }
    if let Some(vrf_id) = filter.vrf_id {
        query = query.filter(network::Column::VrfId.eq(vrf_id));
    }
    if let Some(rootnet) = filter.rootnet {
        query = query.filter(network::Column::Rootnet.eq(rootnet));
    }

    Ok(query.order_by_asc(network::Column::Id).all(db).await?)
}

pub async fn get_network(db: &DatabaseConnection, id: i32) -> DomainResult<network::Model> {
    fetch::<Network, _>(db, id, "network").await
}

/// A network together with its tags and custom field values.
pub async fn network_record(db: &DatabaseConnection, id: i32) -> DomainResult<NetworkRecord> {
    let network = fetch::<Network, _>(db, id, "network").await?;
    let tags = tag_service::tags_for(db, EntityType::Network, id)
        .await?
        .into_iter()
        .map(|t| t.tag)
        .collect();
    let custom_fields = custom_field_service::values_for(db, EntityType::Network, id).await?;

    Ok(NetworkRecord {
        network,
        tags,
        custom_fields,
    })
}

/// Update the descriptive side of a network. Address and VRF membership stay.
pub async fn update_network(
    db: &DatabaseConnection,
    id: i32,
    input: NetworkUpdate,
) -> DomainResult<network::Model> {
    let txn = db.begin().await?;
    let existing = fetch::<Network, _>(&txn, id, "network").await?;

    let rd_vrf_id = input.rd_vrf_id.unwrap_or(existing.rd_vrf_id);
    let vlan_id = input.vlan_id.unwrap_or(existing.vlan_id);
    check_client_refs(&txn, existing.client_id, None, rd_vrf_id, vlan_id).await?;

    if let Some(Some(group)) = input.dns_server_group_id {
        check_ref::<dns_server_group::Entity, _>(&txn, Some(group), "DNS server group").await?;
    }
    if let Some(Some(site)) = input.site_id {
        check_ref::<site::Entity, _>(&txn, Some(site), "site").await?;
    }
    if let Some(Some(category)) = input.category_id {
        check_ref::<network_category::Entity, _>(&txn, Some(category), "network category")
            .await?;
    }

    if input.rootnet == Some(true) && !existing.rootnet {
        let net = prefix_of(&existing)?;
        let siblings: Vec<network::Model> =
            scope(&txn, existing.client_id, existing.vrf_id, existing.ip_version)
                .await?
                .into_iter()
                .filter(|n| n.id != existing.id)
                .collect();
        check_rootnet_rules(&net, true, &siblings)?;
    }

    let mut active: network::ActiveModel = existing.into();
    if let Some(rootnet) = input.rootnet {
        active.rootnet = Set(rootnet);
    }
    active.rd_vrf_id = Set(rd_vrf_id);
    active.vlan_id = Set(vlan_id);
    if let Some(group) = input.dns_server_group_id {
        active.dns_server_group_id = Set(group);
    }
    if let Some(site) = input.site_id {
        active.site_id = Set(site);
    }
    if let Some(category) = input.category_id {
        active.category_id = Set(category);
    }
    if let Some(description) = input.description {
        active.description = Set(optional(description));
    }
    if let Some(comment) = input.comment {
        active.comment = Set(optional(comment));
    }
    active.updated_at = Set(now());

    let model = active.update(&txn).await?;
    txn.commit().await?;

    tracing::info!("Updated network {} (id {})", model.cidr(), model.id);
    Ok(model)
}

/// Delete an empty network. Networks that still hold IP records are kept.
pub async fn delete_network(db: &DatabaseConnection, id: i32) -> DomainResult<()> {
    let txn = db.begin().await?;
    let existing = fetch::<Network, _>(&txn, id, "network").await?;

    let held = ip::Entity::find()
        .filter(ip::Column::NetworkId.eq(id))
        .count(&txn)
        .await?;
    if held > 0 {
        return Err(DomainError::ReferentialIntegrity(format!(
            "network {} still holds {} IP records",
            existing.cidr(),
            held
        )));
    }

    purge_polymorphic(&txn, EntityType::Network, &[id]).await?;
    Network::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!("Deleted network {} (id {})", existing.cidr(), id);
    Ok(())
}

/// Supernets of a network within its (client, vrf, family) scope, nearest first.
pub async fn ancestors(db: &DatabaseConnection, id: i32) -> DomainResult<Vec<network::Model>> {
    let target = fetch::<Network, _>(db, id, "network").await?;
    let net = prefix_of(&target)?;

    let mut found: Vec<(IpNet, network::Model)> =
        scope(db, target.client_id, target.vrf_id, target.ip_version)
            .await?
            .into_iter()
            .filter_map(|n| n.prefix().map(|p| (p, n)))
            .filter(|(p, _)| is_strict_supernet(p, &net))
            .collect();

    found.sort_by(|(a, _), (b, _)| b.prefix_len().cmp(&a.prefix_len()));
    Ok(found.into_iter().map(|(_, n)| n).collect())
}

/// Nearest supernet, if any.
pub async fn parent(db: &DatabaseConnection, id: i32) -> DomainResult<Option<network::Model>> {
    Ok(ancestors(db, id).await?.into_iter().next())
}

/// Subnets whose nearest supernet is this network.
pub async fn children(db: &DatabaseConnection, id: i32) -> DomainResult<Vec<network::Model>> {
    let target = fetch::<Network, _>(db, id, "network").await?;
    let net = prefix_of(&target)?;

    let descendants: Vec<(IpNet, network::Model)> =
        scope(db, target.client_id, target.vrf_id, target.ip_version)
            .await?
            .into_iter()
            .filter_map(|n| n.prefix().map(|p| (p, n)))
            .filter(|(p, _)| is_strict_supernet(&net, p))
            .collect();

    let direct = descendants
        .iter()
        .filter(|(p, _)| {
            !descendants
                .iter()
                .any(|(other, _)| is_strict_supernet(other, p))
        })
        .map(|(_, n)| n.clone())
        .collect();

    Ok(direct)
}

/// The rootnet anchoring a network: itself when flagged, otherwise the one
/// rootnet among its ancestors.
pub async fn rootnet_of(db: &DatabaseConnection, id: i32) -> DomainResult<Option<network::Model>> {
    let target = fetch::<Network, _>(db, id, "network").await?;
    if target.rootnet {
        return Ok(Some(target));
    }
    Ok(ancestors(db, id).await?.into_iter().find(|n| n.rootnet))
}

/// Refresh the stored utilization from the current IP record count.
pub(crate) async fn recompute_utilization<C: ConnectionTrait>(
    conn: &C,
    network_id: i32,
) -> DomainResult<()> {
    let Some(existing) = Network::find_by_id(network_id).one(conn).await? else {
        return Ok(());
    };
    let net = prefix_of(&existing)?;

    let used = ip::Entity::find()
        .filter(ip::Column::NetworkId.eq(network_id))
        .count(conn)
        .await?;
    let utilization = address::utilization_percent(used, &net);

    if utilization != existing.utilization {
        tracing::debug!(
            "Network {} utilization {}% -> {}%",
            existing.cidr(),
            existing.utilization,
            utilization
        );
        let mut active: network::ActiveModel = existing.into();
        active.utilization = Set(utilization);
        active.update(conn).await?;
    }
    Ok(())
}

fn prefix_of(model: &network::Model) -> DomainResult<IpNet> {
    model.prefix().ok_or_else(|| {
        DomainError::Database(format!("network {} has an unparsable prefix", model.id))
    })
}

fn scoped(client_id: i32, vrf_id: Option<i32>) -> sea_orm::Select<Network> {
    let query = Network::find().filter(network::Column::ClientId.eq(client_id));
    match vrf_id {
        Some(vrf_id) => query.filter(network::Column::VrfId.eq(vrf_id)),
        None => query.filter(network::Column::VrfId.is_null()),
    }
}

async fn scope<C: ConnectionTrait>(
    conn: &C,
    client_id: i32,
    vrf_id: Option<i32>,
    ip_version: i32,
) -> DomainResult<Vec<network::Model>> {
    Ok(scoped(client_id, vrf_id)
        .filter(network::Column::IpVersion.eq(ip_version))
        .all(conn)
        .await?)
}

/// VRF membership, RD owner and VLAN must all belong to the network's client.
async fn check_client_refs<C: ConnectionTrait>(
    conn: &C,
    client_id: i32,
    vrf_id: Option<i32>,
    rd_vrf_id: Option<i32>,
    vlan_id: Option<i32>,
) -> DomainResult<()> {
    for (label, id) in [("VRF", vrf_id), ("RD VRF", rd_vrf_id)] {
        if let Some(found) = check_ref::<vrf::Entity, _>(conn, id, label).await?
            && found.client_id != client_id
        {
            return Err(DomainError::validation(format!(
                "{} {} belongs to client {}, not client {}",
                label, found.name, found.client_id, client_id
            )));
        }
    }

    if let Some(found) = check_ref::<vlan::Entity, _>(conn, vlan_id, "VLAN").await?
        && found.client_id != client_id
    {
        return Err(DomainError::validation(format!(
            "VLAN {} belongs to client {}, not client {}",
            found.number, found.client_id, client_id
        )));
    }
    Ok(())
}

/// A rootnet may not overlap another rootnet nor sit under any network of its
/// scope; a plain network may not swallow a rootnet.
fn check_rootnet_rules(
    net: &IpNet,
    rootnet: bool,
    siblings: &[network::Model],
) -> DomainResult<()> {
    for other in siblings {
        let Some(other_net) = other.prefix() else {
            continue;
        };

        if rootnet {
            if other.rootnet && overlaps(net, &other_net) {
                return Err(DomainError::validation(format!(
                    "rootnet {} overlaps rootnet {}",
                    net,
                    other.cidr()
                )));
            }
            if is_strict_supernet(&other_net, net) {
                return Err(DomainError::validation(format!(
                    "rootnet {} cannot sit inside network {}",
                    net,
                    other.cidr()
                )));
            }
        } else if other.rootnet && is_strict_supernet(net, &other_net) {
            return Err(DomainError::validation(format!(
                "network {} would contain rootnet {}",
                net,
                other.cidr()
            )));
        }
    }
    Ok(())
}
