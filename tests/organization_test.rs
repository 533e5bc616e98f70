use gestioip::db;
use gestioip::domain::{DomainError, NewIp, NewNetwork};
use gestioip::services::{
    asset_service, client_service, dns_service, ip_service, line_service, network_service,
    organization_service, segment_service, tag_service,
};
use sea_orm::DatabaseConnection;

async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

fn v3_group(name: &str) -> asset_service::NewSnmpGroup {
    asset_service::NewSnmpGroup {
        name: name.to_string(),
        version: 3,
        security_level: Some("authPriv".to_string()),
        auth_algorithm: Some("sha".to_string()),
        auth_password: Some("auth-secret".to_string()),
        priv_algorithm: Some("aes".to_string()),
        priv_password: Some("priv-secret".to_string()),
        client_ids: vec![1],
        ..Default::default()
    }
}

#[tokio::test]
async fn test_contact_needs_a_name_or_a_surname() {
    let db = setup_test_db().await;

    let err = organization_service::create_contact(
        &db,
        organization_service::NewContact {
            email: Some("noc@example.com".to_string()),
            name: Some("   ".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)), "got {:?}", err);

    // A surname alone is enough
    let contact = organization_service::create_contact(
        &db,
        organization_service::NewContact {
            surname: Some("Lovelace".to_string()),
            client_ids: vec![1, 1],
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(contact.name, None);
    assert_eq!(contact.surname.as_deref(), Some("Lovelace"));
    assert_eq!(
        organization_service::contact_client_ids(&db, contact.id).await.unwrap(),
        vec![1]
    );

    let err = organization_service::create_contact(
        &db,
        organization_service::NewContact {
            name: Some("Ada".to_string()),
            email: Some("not-an-email".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn test_contact_update_rechecks_fields_and_replaces_clients() {
    let db = setup_test_db().await;
    let other = client_service::create_client(&db, "Other").await.unwrap();
    let contact = organization_service::create_contact(
        &db,
        organization_service::NewContact {
            name: Some("Grace".to_string()),
            client_ids: vec![1],
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let err = organization_service::update_contact(
        &db,
        contact.id,
        organization_service::NewContact::default(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    let updated = organization_service::update_contact(
        &db,
        contact.id,
        organization_service::NewContact {
            name: Some("Grace".to_string()),
            surname: Some("Hopper".to_string()),
            phone_number: Some("+41791234567".to_string()),
            client_ids: vec![other.id],
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.surname.as_deref(), Some("Hopper"));
    assert_eq!(updated.created_at, contact.created_at);
    assert_eq!(
        organization_service::contact_client_ids(&db, contact.id).await.unwrap(),
        vec![other.id]
    );

    let err = organization_service::update_contact(
        &db,
        9999,
        organization_service::NewContact {
            name: Some("Nobody".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn test_company_phone_and_fax_are_checked() {
    let db = setup_test_db().await;

    let err = organization_service::create_company(
        &db,
        organization_service::NewCompany {
            name: "Telco".to_string(),
            phone_number: Some("call us".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    let err = organization_service::create_company(
        &db,
        organization_service::NewCompany {
            name: "Telco".to_string(),
            fax_number: Some("12-34".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    let isp = organization_service::create_company_type(&db, "ISP-Test", None)
        .await
        .unwrap();
    let company = organization_service::create_company(
        &db,
        organization_service::NewCompany {
            name: "Telco".to_string(),
            phone_number: Some("+41211234567".to_string()),
            fax_number: Some("+41211234568".to_string()),
            client_ids: vec![1],
            company_type_ids: vec![isp.id],
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(company.fax_number.as_deref(), Some("+41211234568"));

    // Updates run the same checks and replace the links
    let err = organization_service::update_company(
        &db,
        company.id,
        organization_service::NewCompany {
            name: "Telco".to_string(),
            fax_number: Some("fax".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    organization_service::update_company(
        &db,
        company.id,
        organization_service::NewCompany {
            name: "Telco AG".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let (clients, contacts, types) = organization_service::company_links(&db, company.id)
        .await
        .unwrap();
    assert!(clients.is_empty() && contacts.is_empty() && types.is_empty());
}

#[tokio::test]
async fn test_snmp_group_credentials_follow_the_version() {
    let db = setup_test_db().await;

    let err = asset_service::create_snmp_group(
        &db,
        asset_service::NewSnmpGroup {
            name: "v2-without-community".to_string(),
            version: 2,
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    let v2 = asset_service::create_snmp_group(
        &db,
        asset_service::NewSnmpGroup {
            name: "public".to_string(),
            version: 2,
            community: Some("public".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(v2.community.as_deref(), Some("public"));

    let err = asset_service::create_snmp_group(
        &db,
        asset_service::NewSnmpGroup {
            priv_password: None,
            ..v3_group("missing-priv")
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    let v3 = asset_service::create_snmp_group(&db, v3_group("core")).await.unwrap();
    assert_eq!(v3.auth_algorithm.as_deref(), Some("SHA"));
    assert_eq!(v3.priv_algorithm.as_deref(), Some("AES"));
    assert_eq!(
        asset_service::snmp_group_client_ids(&db, v3.id).await.unwrap(),
        vec![1]
    );

    let err = asset_service::create_snmp_group(&db, v3_group("core")).await.unwrap_err();
    assert!(matches!(err, DomainError::UniquenessViolation { .. }));
}

#[tokio::test]
async fn test_snmp_group_update_keeps_stored_passwords() {
    let db = setup_test_db().await;
    let group = asset_service::create_snmp_group(&db, v3_group("edge")).await.unwrap();

    // Passwords left out are kept, so the v3 check still passes
    let updated = asset_service::update_snmp_group(
        &db,
        group.id,
        asset_service::NewSnmpGroup {
            auth_password: None,
            priv_password: None,
            comment: Some("rotated".to_string()),
            ..v3_group("edge")
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.comment.as_deref(), Some("rotated"));
    assert_eq!(updated.auth_password.as_deref(), Some("auth-secret"));

    let err = asset_service::update_snmp_group(
        &db,
        group.id,
        asset_service::NewSnmpGroup {
            auth_algorithm: Some("CRC32".to_string()),
            ..v3_group("edge")
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn test_vrf_update_keeps_name_unique_and_owner_fixed() {
    let db = setup_test_db().await;
    let vrf = |name: &str| segment_service::NewVrf {
        client_id: 1,
        name: name.to_string(),
        rd: "65000:1".to_string(),
        ..Default::default()
    };
    segment_service::create_vrf(&db, vrf("red")).await.unwrap();
    let blue = segment_service::create_vrf(&db, vrf("blue")).await.unwrap();

    let err = segment_service::update_vrf(&db, blue.id, vrf("red")).await.unwrap_err();
    assert!(matches!(err, DomainError::UniquenessViolation { .. }));

    let err = segment_service::update_vrf(
        &db,
        blue.id,
        segment_service::NewVrf {
            rd: "garbage".to_string(),
            ..vrf("blue")
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    let other = client_service::create_client(&db, "Other").await.unwrap();
    let err = segment_service::update_vrf(
        &db,
        blue.id,
        segment_service::NewVrf {
            client_id: other.id,
            ..vrf("blue")
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    let renamed = segment_service::update_vrf(
        &db,
        blue.id,
        segment_service::NewVrf {
            rd: "192.0.2.1:9".to_string(),
            ..vrf("azure")
        },
    )
    .await
    .unwrap();
    assert_eq!(renamed.name, "azure");
    assert_eq!(renamed.rd, "192.0.2.1:9");
    assert_eq!(segment_service::get_vrf(&db, blue.id).await.unwrap().name, "azure");
}

#[tokio::test]
async fn test_asset_update_respects_held_addresses() {
    let db = setup_test_db().await;
    let other = client_service::create_client(&db, "Other").await.unwrap();
    let net = network_service::create_network(&db, NewNetwork::new(1, "10.60.0.0", 24))
        .await
        .unwrap();
    let asset = asset_service::create_asset(
        &db,
        asset_service::NewAsset {
            name: "lb01".to_string(),
            client_ids: vec![1],
            ..Default::default()
        },
    )
    .await
    .unwrap();
    ip_service::create_ip(
        &db,
        NewIp {
            network_id: net.id,
            ip_address: "10.60.0.10".to_string(),
            hostname: Some("lb01".to_string()),
            asset_id: Some(asset.id),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let err = asset_service::update_asset(
        &db,
        asset.id,
        asset_service::NewAsset {
            name: "lb01".to_string(),
            client_ids: vec![other.id],
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)), "got {:?}", err);

    let updated = asset_service::update_asset(
        &db,
        asset.id,
        asset_service::NewAsset {
            name: "lb01".to_string(),
            serial_number: Some("SN-42".to_string()),
            client_ids: vec![1, other.id],
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.serial_number.as_deref(), Some("SN-42"));
    assert_eq!(
        asset_service::asset_client_ids(&db, asset.id).await.unwrap(),
        vec![1, other.id]
    );
    assert_eq!(
        asset_service::get_asset(&db, asset.id).await.unwrap().serial_number.as_deref(),
        Some("SN-42")
    );
}

#[tokio::test]
async fn test_catalogue_lines_tags_and_dns_updates_stay_unique() {
    let db = setup_test_db().await;

    let cisco = asset_service::create_manufacturer(
        &db,
        asset_service::CatalogEntry {
            name: "Cisco".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let juniper = asset_service::create_manufacturer(
        &db,
        asset_service::CatalogEntry {
            name: "Juniper".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let err = asset_service::update_manufacturer(
        &db,
        juniper.id,
        asset_service::CatalogEntry {
            name: "Cisco".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::UniquenessViolation { .. }));
    // Keeping its own name is not a conflict
    asset_service::update_manufacturer(
        &db,
        cisco.id,
        asset_service::CatalogEntry {
            name: "Cisco".to_string(),
            comment: Some("switching".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let line = |number: i32, name: &str| line_service::NewLine {
        client_id: 1,
        number,
        name: name.to_string(),
        ..Default::default()
    };
    line_service::create_line(&db, line(1, "primary")).await.unwrap();
    let backup = line_service::create_line(&db, line(2, "backup")).await.unwrap();
    let err = line_service::update_line(&db, backup.id, line(1, "backup"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::UniquenessViolation { .. }));
    let moved = line_service::update_line(&db, backup.id, line(3, "backup"))
        .await
        .unwrap();
    assert_eq!(moved.number, 3);

    tag_service::create_tag(&db, "prod", None).await.unwrap();
    let lab = tag_service::create_tag(&db, "lab", None).await.unwrap();
    let err = tag_service::update_tag(&db, lab.id, "prod", None).await.unwrap_err();
    assert!(matches!(err, DomainError::UniquenessViolation { .. }));

    dns_service::create_dns_server(
        &db,
        dns_service::NewDnsServer {
            ip_address: "192.0.2.53".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let second = dns_service::create_dns_server(
        &db,
        dns_service::NewDnsServer {
            ip_address: "192.0.2.54".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let err = dns_service::update_dns_server(
        &db,
        second.id,
        dns_service::NewDnsServer {
            ip_address: "192.0.2.53".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::UniquenessViolation { .. }));

    let disabled = dns_service::update_dns_server(
        &db,
        second.id,
        dns_service::NewDnsServer {
            ip_address: "192.0.2.54".to_string(),
            disabled: true,
            client_ids: vec![1],
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert!(disabled.disabled);
    assert_eq!(
        dns_service::dns_server_client_ids(&db, second.id).await.unwrap(),
        vec![1]
    );
}
