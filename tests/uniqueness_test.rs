use gestioip::db;
use gestioip::domain::{DomainError, NewIp, NewNetwork};
use gestioip::services::{
    asset_service, client_service, dns_service, ip_service, line_service, network_service,
    segment_service, tag_service,
};
use sea_orm::DatabaseConnection;

async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

fn constraint_of(err: DomainError) -> String {
    match err {
        DomainError::UniquenessViolation { constraint, .. } => constraint,
        other => panic!("expected a uniqueness violation, got {:?}", other),
    }
}

#[tokio::test]
async fn test_same_prefix_twice_in_one_scope() {
    let db = setup_test_db().await;
    network_service::create_network(&db, NewNetwork::new(1, "192.0.2.0", 24))
        .await
        .unwrap();

    let err = network_service::create_network(&db, NewNetwork::new(1, "192.0.2.0", 24))
        .await
        .unwrap_err();
    assert_eq!(
        constraint_of(err),
        "networks.client_id, networks.vrf_id, networks.ip_address, networks.mask"
    );

    // Another client owns its own copy of the prefix
    let other = client_service::create_client(&db, "Other").await.unwrap();
    network_service::create_network(&db, NewNetwork::new(other.id, "192.0.2.0", 24))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_same_address_twice_in_one_network() {
    let db = setup_test_db().await;
    let net = network_service::create_network(&db, NewNetwork::new(1, "192.0.2.0", 24))
        .await
        .unwrap();
    ip_service::assign_ip(&db, net.id, "192.0.2.10").await.unwrap();

    let err = ip_service::create_ip(
        &db,
        NewIp {
            network_id: net.id,
            ip_address: "192.0.2.10".to_string(),
            hostname: Some("dup".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert_eq!(constraint_of(err), "ips.network_id, ips.ip_address");
}

#[tokio::test]
async fn test_vlan_numbers_are_unique_per_client() {
    let db = setup_test_db().await;
    let vlan = |client_id: i32| segment_service::NewVlan {
        client_id,
        number: 42,
        name: "users".to_string(),
        ..Default::default()
    };

    segment_service::create_vlan(&db, vlan(1)).await.unwrap();
    let err = segment_service::create_vlan(&db, vlan(1)).await.unwrap_err();
    assert_eq!(constraint_of(err), "vlans.client_id, vlans.number");

    let other = client_service::create_client(&db, "Other").await.unwrap();
    segment_service::create_vlan(&db, vlan(other.id)).await.unwrap();
}

#[tokio::test]
async fn test_vlan_number_out_of_range() {
    let db = setup_test_db().await;
    let err = segment_service::create_vlan(
        &db,
        segment_service::NewVlan {
            client_id: 1,
            number: 5000,
            name: "too-high".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn test_vrf_names_are_unique_per_client() {
    let db = setup_test_db().await;
    let vrf = segment_service::NewVrf {
        client_id: 1,
        name: "mgmt".to_string(),
        rd: "65000:1".to_string(),
        ..Default::default()
    };

    segment_service::create_vrf(&db, vrf.clone()).await.unwrap();
    let err = segment_service::create_vrf(&db, vrf).await.unwrap_err();
    assert_eq!(constraint_of(err), "vrfs.client_id, vrfs.name");
}

#[tokio::test]
async fn test_malformed_route_distinguisher() {
    let db = setup_test_db().await;
    let err = segment_service::create_vrf(
        &db,
        segment_service::NewVrf {
            client_id: 1,
            name: "bad".to_string(),
            rd: "not-an-rd".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn test_dns_server_addresses_are_globally_unique() {
    let db = setup_test_db().await;
    let other = client_service::create_client(&db, "Other").await.unwrap();

    dns_service::create_dns_server(
        &db,
        dns_service::NewDnsServer {
            ip_address: "192.0.2.53".to_string(),
            client_ids: vec![1],
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let err = dns_service::create_dns_server(
        &db,
        dns_service::NewDnsServer {
            ip_address: "192.0.2.53".to_string(),
            client_ids: vec![other.id],
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert_eq!(constraint_of(err), "dns_servers.ip_address");
}

#[tokio::test]
async fn test_asset_names_tags_and_lines_are_unique() {
    let db = setup_test_db().await;

    let asset = asset_service::NewAsset {
        name: "core-sw-01".to_string(),
        client_ids: vec![1],
        ..Default::default()
    };
    asset_service::create_asset(&db, asset.clone()).await.unwrap();
    let err = asset_service::create_asset(&db, asset).await.unwrap_err();
    assert_eq!(constraint_of(err), "assets.name");

    tag_service::create_tag(&db, "critical", None).await.unwrap();
    let err = tag_service::create_tag(&db, "critical", None).await.unwrap_err();
    assert_eq!(constraint_of(err), "custom_tags.tag");

    let line = line_service::NewLine {
        client_id: 1,
        number: 7,
        name: "uplink".to_string(),
        ..Default::default()
    };
    line_service::create_line(&db, line.clone()).await.unwrap();
    let err = line_service::create_line(&db, line).await.unwrap_err();
    assert_eq!(constraint_of(err), "lines.number");
}
