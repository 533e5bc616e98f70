use gestioip::db;
use gestioip::domain::{DomainError, NetworkUpdate, NewIp, NewNetwork};
use gestioip::services::{client_service, ip_service, network_service, segment_service};
use sea_orm::DatabaseConnection;

// Helper to create a test database
async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

// Helper to create a client with a 10.0.0.0/8 rootnet and a 10.0.0.0/24 below it
async fn setup_acme(db: &DatabaseConnection) -> (i32, i32, i32) {
    let acme = client_service::create_client(db, "Acme")
        .await
        .expect("Failed to create client");
    let root = network_service::create_network(db, NewNetwork::new(acme.id, "10.0.0.0", 8).rootnet())
        .await
        .expect("Failed to create rootnet");
    let lan = network_service::create_network(db, NewNetwork::new(acme.id, "10.0.0.0", 24))
        .await
        .expect("Failed to create network");
    (acme.id, root.id, lan.id)
}

fn named(network_id: i32, address: &str, hostname: &str) -> NewIp {
    NewIp {
        network_id,
        ip_address: address.to_string(),
        hostname: Some(hostname.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_fresh_database_has_default_client() {
    let db = setup_test_db().await;

    let default = client_service::get_client(&db, 1).await.unwrap();
    assert_eq!(default.name, "DEFAULT");
}

#[tokio::test]
async fn test_ip_must_lie_inside_its_network() {
    let db = setup_test_db().await;
    let (_, _, lan) = setup_acme(&db).await;

    let ok = ip_service::create_ip(&db, named(lan, "10.0.0.5", "web01")).await.unwrap();
    assert_eq!(ok.ip_address, "10.0.0.5");
    assert_eq!(ok.network_id, lan);

    let err = ip_service::create_ip(&db, named(lan, "10.0.1.5", "web02"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_every_address_of_the_prefix_can_be_assigned() {
    let db = setup_test_db().await;
    let (_, _, lan) = setup_acme(&db).await;

    // Network and broadcast addresses included
    for address in ["10.0.0.0", "10.0.0.1", "10.0.0.255"] {
        let ip = ip_service::assign_ip(&db, lan, address).await.unwrap();
        assert_eq!(ip.ip_address, address);
    }

    let net = network_service::get_network(&db, lan).await.unwrap();
    assert_eq!(net.utilization, 1);
}

#[tokio::test]
async fn test_assign_inside_a_vrf_rootnet() {
    let db = setup_test_db().await;
    let acme = client_service::create_client(&db, "Acme").await.unwrap();
    let vrf = segment_service::create_vrf(
        &db,
        segment_service::NewVrf {
            client_id: acme.id,
            name: "default".to_string(),
            rd: "65000:1".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let net = network_service::create_network(
        &db,
        NewNetwork::new(acme.id, "10.0.0.0", 24).in_vrf(vrf.id).rootnet(),
    )
    .await
    .unwrap();
    assert_eq!(net.vrf_id, Some(vrf.id));
    assert!(net.rootnet);

    let ip = ip_service::assign_ip(&db, net.id, "10.0.0.5").await.unwrap();
    assert_eq!(ip.network_id, net.id);
    assert_eq!(ip.ip_address, "10.0.0.5");

    let err = ip_service::assign_ip(&db, net.id, "10.0.1.5").await.unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)), "got {:?}", err);

    let err = ip_service::assign_ip(&db, net.id, "10.0.0.5").await.unwrap_err();
    assert!(matches!(err, DomainError::UniquenessViolation { .. }), "got {:?}", err);
}

#[tokio::test]
async fn test_ipv6_addresses_are_canonicalised() {
    let db = setup_test_db().await;
    let net = network_service::create_network(&db, NewNetwork::new(1, "2001:db8::", 64).rootnet())
        .await
        .unwrap();

    let ip = ip_service::assign_ip(&db, net.id, "2001:0DB8:0000:0000:0000:0000:0000:0001")
        .await
        .unwrap();
    assert_eq!(ip.ip_address, "2001:db8::1");
}

#[tokio::test]
async fn test_network_with_host_bits_is_rejected() {
    let db = setup_test_db().await;

    let err = network_service::create_network(&db, NewNetwork::new(1, "192.168.1.7", 24))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    let err = network_service::create_network(&db, NewNetwork::new(1, "192.168.1.0", 33))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn test_hierarchy_follows_prefix_containment() {
    let db = setup_test_db().await;
    let (acme, root, lan) = setup_acme(&db).await;
    let half = network_service::create_network(&db, NewNetwork::new(acme, "10.0.0.0", 16))
        .await
        .unwrap();
    let other = network_service::create_network(&db, NewNetwork::new(acme, "10.1.0.0", 16))
        .await
        .unwrap();

    let ancestors: Vec<i32> = network_service::ancestors(&db, lan)
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.id)
        .collect();
    assert_eq!(ancestors, vec![half.id, root]);

    let parent = network_service::parent(&db, lan).await.unwrap().unwrap();
    assert_eq!(parent.id, half.id);

    let mut children: Vec<i32> = network_service::children(&db, root)
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.id)
        .collect();
    children.sort();
    assert_eq!(children, vec![half.id, other.id]);

    let rootnet = network_service::rootnet_of(&db, lan).await.unwrap().unwrap();
    assert_eq!(rootnet.id, root);
    assert!(network_service::parent(&db, root).await.unwrap().is_none());
}

#[tokio::test]
async fn test_rootnets_may_not_overlap() {
    let db = setup_test_db().await;
    let (acme, _, _) = setup_acme(&db).await;

    let err = network_service::create_network(&db, NewNetwork::new(acme, "10.5.0.0", 16).rootnet())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)), "got {:?}", err);

    // A disjoint rootnet is fine
    network_service::create_network(&db, NewNetwork::new(acme, "192.168.0.0", 16).rootnet())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_plain_network_cannot_contain_a_rootnet() {
    let db = setup_test_db().await;
    let (acme, _, _) = setup_acme(&db).await;

    let err = network_service::create_network(&db, NewNetwork::new(acme, "0.0.0.0", 0))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn test_promoting_a_nested_network_to_rootnet_fails() {
    let db = setup_test_db().await;
    let (_, _, lan) = setup_acme(&db).await;

    let err = network_service::update_network(
        &db,
        lan,
        NetworkUpdate {
            rootnet: Some(true),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn test_vrfs_isolate_overlapping_space() {
    let db = setup_test_db().await;
    let (acme, _, _) = setup_acme(&db).await;
    let vrf = segment_service::create_vrf(
        &db,
        segment_service::NewVrf {
            client_id: acme,
            name: "blue".to_string(),
            rd: "65000:10".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    // Same prefix as the global rootnet, but inside the VRF
    let in_vrf = network_service::create_network(
        &db,
        NewNetwork::new(acme, "10.0.0.0", 8).in_vrf(vrf.id).rootnet(),
    )
    .await
    .unwrap();
    assert_eq!(in_vrf.vrf_id, Some(vrf.id));

    let err = network_service::create_network(
        &db,
        NewNetwork::new(acme, "10.0.0.0", 8).in_vrf(vrf.id),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::UniquenessViolation { .. }));

    // The VRF rootnet is not an ancestor of global networks
    let global = network_service::create_network(&db, NewNetwork::new(acme, "10.9.0.0", 16))
        .await
        .unwrap();
    let ancestors = network_service::ancestors(&db, global.id).await.unwrap();
    assert!(ancestors.iter().all(|n| n.vrf_id.is_none()));
}

#[tokio::test]
async fn test_vrf_of_another_client_is_rejected() {
    let db = setup_test_db().await;
    let (acme, _, _) = setup_acme(&db).await;
    let vrf = segment_service::create_vrf(
        &db,
        segment_service::NewVrf {
            client_id: acme,
            name: "red".to_string(),
            rd: "65000:20".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let err = network_service::create_network(&db, NewNetwork::new(1, "172.16.0.0", 12).in_vrf(vrf.id))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn test_utilization_tracks_ip_records() {
    let db = setup_test_db().await;
    let net = network_service::create_network(&db, NewNetwork::new(1, "192.168.10.0", 30))
        .await
        .unwrap();
    assert_eq!(net.utilization, 0);

    let first = ip_service::assign_ip(&db, net.id, "192.168.10.1").await.unwrap();
    let net_after = network_service::get_network(&db, net.id).await.unwrap();
    assert_eq!(net_after.utilization, 50);

    ip_service::assign_ip(&db, net.id, "192.168.10.2").await.unwrap();
    let full = network_service::get_network(&db, net.id).await.unwrap();
    assert_eq!(full.utilization, 100);

    ip_service::delete_ip(&db, first.id).await.unwrap();
    let half = network_service::get_network(&db, net.id).await.unwrap();
    assert_eq!(half.utilization, 50);
}

#[tokio::test]
async fn test_moving_an_ip_rechecks_its_new_network() {
    let db = setup_test_db().await;
    let (acme, _, lan) = setup_acme(&db).await;
    let other = network_service::create_network(&db, NewNetwork::new(acme, "10.0.1.0", 24))
        .await
        .unwrap();
    let ip = ip_service::create_ip(&db, named(lan, "10.0.0.5", "web01")).await.unwrap();

    // Same address is outside the new network
    let err = ip_service::update_ip(
        &db,
        ip.id,
        gestioip::domain::IpPatch {
            network_id: Some(other.id),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    let moved = ip_service::update_ip(
        &db,
        ip.id,
        gestioip::domain::IpPatch {
            network_id: Some(other.id),
            ip_address: Some("10.0.1.5".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(moved.network_id, other.id);

    let old = network_service::get_network(&db, lan).await.unwrap();
    assert_eq!(old.utilization, 0);
}

#[tokio::test]
async fn test_named_record_cannot_lose_both_names() {
    let db = setup_test_db().await;
    let (_, _, lan) = setup_acme(&db).await;
    let ip = ip_service::create_ip(&db, named(lan, "10.0.0.8", "db01")).await.unwrap();

    let err = ip_service::update_ip(
        &db,
        ip.id,
        gestioip::domain::IpPatch {
            hostname: Some(None),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    let err = ip_service::create_ip(
        &db,
        NewIp {
            network_id: lan,
            ip_address: "10.0.0.9".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn test_links_are_symmetric_and_idempotent() {
    let db = setup_test_db().await;
    let (_, _, lan) = setup_acme(&db).await;
    let a = ip_service::create_ip(&db, named(lan, "10.0.0.10", "a")).await.unwrap();
    let b = ip_service::create_ip(&db, named(lan, "10.0.0.11", "b")).await.unwrap();

    ip_service::link_ip(&db, b.id, a.id).await.unwrap();
    ip_service::link_ip(&db, a.id, b.id).await.unwrap();

    let from_a = ip_service::linked_ips(&db, a.id).await.unwrap();
    let from_b = ip_service::linked_ips(&db, b.id).await.unwrap();
    assert_eq!(from_a.len(), 1);
    assert_eq!(from_a[0].id, b.id);
    assert_eq!(from_b[0].id, a.id);

    let err = ip_service::link_ip(&db, a.id, a.id).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    ip_service::unlink_ip(&db, a.id, b.id).await.unwrap();
    ip_service::unlink_ip(&db, a.id, b.id).await.unwrap();
    assert!(ip_service::linked_ips(&db, a.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_ips_pages_and_filters() {
    let db = setup_test_db().await;
    let (_, _, lan) = setup_acme(&db).await;
    for i in 1..=5 {
        ip_service::create_ip(&db, named(lan, &format!("10.0.0.{}", i), &format!("h{}", i)))
            .await
            .unwrap();
    }

    let (page, total) = ip_service::list_ips(
        &db,
        gestioip::domain::IpFilter {
            network: Some(lan),
            limit: Some(2),
            offset: Some(2),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(total, 5);
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].ip_address, "10.0.0.3");

    let (page, total) = ip_service::list_ips(
        &db,
        gestioip::domain::IpFilter {
            hostname: Some("h4".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(total, 1);
    assert_eq!(page[0].ip_address, "10.0.0.4");
}

#[tokio::test]
async fn test_list_ips_rejects_offsets_beyond_i64() {
    let db = setup_test_db().await;
    let (_, _, lan) = setup_acme(&db).await;
    ip_service::assign_ip(&db, lan, "10.0.0.1").await.unwrap();

    let err = ip_service::list_ips(
        &db,
        gestioip::domain::IpFilter {
            offset: Some(u64::MAX),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)), "got {:?}", err);

    // The largest bindable offset is simply past the end
    let (page, total) = ip_service::list_ips(
        &db,
        gestioip::domain::IpFilter {
            offset: Some(i64::MAX as u64),
            limit: Some(u64::MAX),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(total, 1);
    assert!(page.is_empty());
}

#[tokio::test]
async fn test_ping_last_checked_is_a_date() {
    let db = setup_test_db().await;
    let (_, _, lan) = setup_acme(&db).await;

    let ip = ip_service::create_ip(
        &db,
        NewIp {
            ping_last_checked: Some("2024-05-17".to_string()),
            ..named(lan, "10.0.0.30", "pinged")
        },
    )
    .await
    .unwrap();
    assert_eq!(ip.ping_last_checked.as_deref(), Some("2024-05-17"));

    // A full timestamp keeps only its date
    let ip = ip_service::update_ip(
        &db,
        ip.id,
        gestioip::domain::IpPatch {
            ping_last_checked: Some(Some("2024-06-01T08:30:00+00:00".to_string())),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(ip.ping_last_checked.as_deref(), Some("2024-06-01"));

    let err = ip_service::create_ip(
        &db,
        NewIp {
            ping_last_checked: Some("last tuesday".to_string()),
            ..named(lan, "10.0.0.31", "never")
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}
