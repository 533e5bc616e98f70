use gestioip::db;
use gestioip::domain::{AttributeValue, DomainError, EntityType, NewIp, NewNetwork};
use gestioip::services::{custom_field_service, ip_service, network_service, tag_service};
use sea_orm::DatabaseConnection;

async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

async fn create_network(db: &DatabaseConnection) -> i32 {
    network_service::create_network(db, NewNetwork::new(1, "198.51.100.0", 24).rootnet())
        .await
        .expect("Failed to create network")
        .id
}

#[tokio::test]
async fn test_text_field_on_network() {
    let db = setup_test_db().await;
    let net = create_network(&db).await;

    let field = custom_field_service::add_field(&db, EntityType::Network, "rack_position", "TEXT")
        .await
        .unwrap();
    assert_eq!(field.datatype, "TEXT");

    custom_field_service::set_value(&db, field.id, net, AttributeValue::Text("R12-U4".into()))
        .await
        .unwrap();
    let value = custom_field_service::get_value(&db, field.id, net).await.unwrap();
    assert_eq!(value, Some(AttributeValue::Text("R12-U4".into())));

    // Setting again replaces the value
    custom_field_service::set_value(&db, field.id, net, AttributeValue::Text("R1-U1".into()))
        .await
        .unwrap();
    let values = custom_field_service::values_for(&db, EntityType::Network, net)
        .await
        .unwrap();
    assert_eq!(values.len(), 1);
    assert_eq!(values["rack_position"], AttributeValue::Text("R1-U1".into()));
}

#[tokio::test]
async fn test_unknown_type_token_is_rejected() {
    let db = setup_test_db().await;

    let err = custom_field_service::add_field(&db, EntityType::Network, "weird", "BOGUS")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidFieldType(_)), "got {:?}", err);

    // Tokens are case-insensitive
    custom_field_service::add_field(&db, EntityType::Ip, "weight", "float")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_fields_only_on_networks_and_ips() {
    let db = setup_test_db().await;

    let err = custom_field_service::add_field(&db, EntityType::Vlan, "colour", "TEXT")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn test_value_must_match_datatype() {
    let db = setup_test_db().await;
    let net = create_network(&db).await;
    let ip = ip_service::create_ip(
        &db,
        NewIp {
            network_id: net,
            ip_address: "198.51.100.20".to_string(),
            hostname: Some("nas".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let disks = custom_field_service::add_field(&db, EntityType::Ip, "disks", "INT")
        .await
        .unwrap();
    let err = custom_field_service::set_value(&db, disks.id, ip.id, AttributeValue::Text("four".into()))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    custom_field_service::set_value(&db, disks.id, ip.id, AttributeValue::Int(4))
        .await
        .unwrap();

    let installed = custom_field_service::add_field(&db, EntityType::Ip, "installed", "DATE")
        .await
        .unwrap();
    let err = custom_field_service::set_value(
        &db,
        installed.id,
        ip.id,
        AttributeValue::Text("yesterday".into()),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
    custom_field_service::set_value(
        &db,
        installed.id,
        ip.id,
        AttributeValue::Text("2024-03-01".into()),
    )
    .await
    .unwrap();

    let record = ip_service::ip_record(&db, ip).await.unwrap();
    assert_eq!(record.custom_fields["disks"], AttributeValue::Int(4));
    assert_eq!(
        record.custom_fields["installed"],
        AttributeValue::Text("2024-03-01".into())
    );
}

#[tokio::test]
async fn test_duplicate_field_name_per_entity_type() {
    let db = setup_test_db().await;
    custom_field_service::add_field(&db, EntityType::Network, "owner", "TEXT")
        .await
        .unwrap();

    let err = custom_field_service::add_field(&db, EntityType::Network, "owner", "TEXT")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::UniquenessViolation { .. }));

    // Same name on another entity type is allowed
    custom_field_service::add_field(&db, EntityType::Ip, "owner", "TEXT")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_tags_attach_and_follow_deletion() {
    let db = setup_test_db().await;
    let net = create_network(&db).await;
    let ip = ip_service::assign_ip(&db, net, "198.51.100.7").await.unwrap();
    let tag = tag_service::create_tag(&db, "dmz", Some("Exposed hosts".into()))
        .await
        .unwrap();

    tag_service::tag_entity(&db, tag.id, EntityType::Ip, ip.id).await.unwrap();
    tag_service::tag_entity(&db, tag.id, EntityType::Ip, ip.id).await.unwrap();
    tag_service::tag_entity(&db, tag.id, EntityType::Network, net).await.unwrap();

    let tags = tag_service::tags_for(&db, EntityType::Ip, ip.id).await.unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].tag, "dmz");

    let err = tag_service::tag_entity(&db, tag.id, EntityType::Ip, 9999)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    ip_service::delete_ip(&db, ip.id).await.unwrap();
    let tagged = tag_service::entities_tagged(&db, tag.id, EntityType::Ip).await.unwrap();
    assert!(tagged.is_empty());
    let tagged = tag_service::entities_tagged(&db, tag.id, EntityType::Network)
        .await
        .unwrap();
    assert_eq!(tagged, vec![net]);

    tag_service::untag_entity(&db, tag.id, EntityType::Network, net)
        .await
        .unwrap();
    assert!(tag_service::tags_for(&db, EntityType::Network, net)
        .await
        .unwrap()
        .is_empty());
}
