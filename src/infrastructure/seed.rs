use sea_orm::*;

use crate::auth::{hash_password, ROLE_ADMIN};
use crate::domain::{DomainError, DomainResult, NewIp, NewNetwork};
use crate::models::{client, user};
use crate::services::{client_service, ip_service, network_service, segment_service};

/// Create the bootstrap admin account unless it already exists.
pub async fn ensure_admin(db: &DatabaseConnection, username: &str, password: &str) -> DomainResult<()> {
    let existing = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?;
    if existing.is_some() {
        return Ok(());
    }

    let password_hash = hash_password(password).map_err(DomainError::Database)?;
    let now = chrono::Utc::now().to_rfc3339();

    user::ActiveModel {
        username: Set(username.to_owned()),
        password_hash: Set(password_hash),
        role: Set(ROLE_ADMIN.to_owned()),
        permissions: Set("[]".to_owned()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!("Created admin account '{}'", username);
    Ok(())
}

/// Load a small demo address space. Skipped when the demo client exists.
pub async fn seed_demo_data(db: &DatabaseConnection) -> DomainResult<()> {
    let present = client::Entity::find()
        .filter(client::Column::Name.eq("Acme"))
        .one(db)
        .await?;
    if present.is_some() {
        tracing::debug!("Demo data already present");
        return Ok(());
    }

    let acme = client_service::create_client(db, "Acme").await?;

    let vrf = segment_service::create_vrf(
        db,
        segment_service::NewVrf {
            client_id: acme.id,
            name: "core".to_owned(),
            rd: "65000:1".to_owned(),
            ..Default::default()
        },
    )
    .await?;

    let vlan = segment_service::create_vlan(
        db,
        segment_service::NewVlan {
            client_id: acme.id,
            number: 100,
            name: "servers".to_owned(),
            ..Default::default()
        },
    )
    .await?;

    network_service::create_network(db, NewNetwork::new(acme.id, "10.0.0.0", 8).rootnet())
        .await?;
    let servers = network_service::create_network(
        db,
        NewNetwork {
            vlan_id: Some(vlan.id),
            description: Some("Server farm".to_owned()),
            ..NewNetwork::new(acme.id, "10.0.0.0", 24)
        },
    )
    .await?;
    network_service::create_network(
        db,
        NewNetwork::new(acme.id, "172.16.0.0", 16)
            .in_vrf(vrf.id)
            .rootnet(),
    )
    .await?;
    network_service::create_network(db, NewNetwork::new(acme.id, "2001:db8::", 32).rootnet())
        .await?;

    for (address, hostname) in [("10.0.0.1", "gw"), ("10.0.0.10", "db01"), ("10.0.0.11", "db02")] {
        ip_service::create_ip(
            db,
            NewIp {
                network_id: servers.id,
                ip_address: address.to_owned(),
                hostname: Some(hostname.to_owned()),
                domain: Some("acme.example".to_owned()),
                ..Default::default()
            },
        )
        .await?;
    }

    tracing::info!("Demo address space loaded for client {}", acme.name);
    Ok(())
}
