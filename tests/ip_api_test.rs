use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use gestioip::auth::{create_jwt, IP_ADD, IP_CHANGE, IP_DELETE, IP_VIEW, ROLE_ADMIN};
use gestioip::db;
use gestioip::domain::NewNetwork;
use gestioip::server::build_router;
use gestioip::services::network_service;
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot`

// Router over a fresh database holding one 10.0.0.0/24 network
async fn setup_app() -> (Router, i32) {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    let net = network_service::create_network(&db, NewNetwork::new(1, "10.0.0.0", 24).rootnet())
        .await
        .expect("Failed to create network");
    (build_router(db), net.id)
}

fn token(permissions: &[&str]) -> String {
    create_jwt(
        "operator",
        "user",
        permissions.iter().map(|p| p.to_string()).collect(),
    )
    .expect("Failed to create JWT")
}

fn admin_token() -> String {
    create_jwt("root", ROLE_ADMIN, vec![]).expect("Failed to create JWT")
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_health_is_public() {
    let (app, _) = setup_app().await;
    let (status, body) = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "gestioip");
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let (app, _) = setup_app().await;
    let (status, _) = send(&app, "GET", "/api/v1/IP/", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/v1/IP/", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_missing_permission_is_forbidden() {
    let (app, net) = setup_app().await;
    let viewer = token(&[IP_VIEW]);

    let (status, _) = send(&app, "GET", "/api/v1/IP/", Some(&viewer), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/IP/",
        Some(&viewer),
        Some(json!({ "network_id": net, "ip_address": "10.0.0.5", "hostname": "web" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_list_and_fetch() {
    let (app, net) = setup_app().await;
    let writer = token(&[IP_VIEW, IP_ADD]);

    let (status, created) = send(
        &app,
        "POST",
        "/api/v1/IP/",
        Some(&writer),
        Some(json!({
            "network_id": net,
            "ip_address": "10.0.0.5",
            "hostname": "web01",
            "mac": "00-11-22-AA-BB-CC"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["ip_address"], "10.0.0.5");
    assert_eq!(created["mac"], "00:11:22:aa:bb:cc");
    assert_eq!(created["linked_ip"], json!([]));
    let id = created["id"].as_i64().unwrap();

    let (status, page) = send(&app, "GET", "/api/v1/IP/?hostname=web01", Some(&writer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["meta"]["total_count"], 1);
    assert_eq!(page["meta"]["limit"], 20);
    assert_eq!(page["objects"][0]["id"], id);

    let (status, fetched) =
        send(&app, "GET", &format!("/api/v1/IP/{}", id), Some(&writer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["hostname"], "web01");

    let (status, _) = send(&app, "GET", "/api/v1/IP/9999", Some(&writer), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duplicate_and_invalid_addresses() {
    let (app, net) = setup_app().await;
    let writer = token(&[IP_ADD]);
    let body = json!({ "network_id": net, "ip_address": "10.0.0.5", "hostname": "web01" });

    let (status, _) = send(&app, "POST", "/api/v1/IP/", Some(&writer), Some(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, err) = send(&app, "POST", "/api/v1/IP/", Some(&writer), Some(body)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["kind"], "uniqueness_violation");
    assert_eq!(err["constraint"], "ips.network_id, ips.ip_address");

    let (status, err) = send(
        &app,
        "POST",
        "/api/v1/IP/",
        Some(&writer),
        Some(json!({ "network_id": net, "ip_address": "10.0.1.5", "hostname": "far" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["kind"], "validation_error");
}

#[tokio::test]
async fn test_patch_put_and_delete() {
    let (app, net) = setup_app().await;
    let full = token(&[IP_VIEW, IP_ADD, IP_CHANGE, IP_DELETE]);

    let (_, created) = send(
        &app,
        "POST",
        "/api/v1/IP/",
        Some(&full),
        Some(json!({
            "network_id": net,
            "ip_address": "10.0.0.7",
            "hostname": "app",
            "comment": "first"
        })),
    )
    .await;
    let uri = format!("/api/v1/IP/{}", created["id"]);

    // PATCH leaves absent fields alone and clears explicit nulls
    let (status, patched) = send(
        &app,
        "PATCH",
        &uri,
        Some(&full),
        Some(json!({ "description": "primary", "comment": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["hostname"], "app");
    assert_eq!(patched["description"], "primary");
    assert_eq!(patched["comment"], Value::Null);

    // PUT replaces the whole record
    let (status, replaced) = send(
        &app,
        "PUT",
        &uri,
        Some(&full),
        Some(json!({ "network_id": net, "ip_address": "10.0.0.8", "dns_name": "app.example" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replaced["ip_address"], "10.0.0.8");
    assert_eq!(replaced["hostname"], Value::Null);
    assert_eq!(replaced["description"], Value::Null);

    let (status, _) = send(&app, "PUT", &uri, Some(&full), Some(json!({ "network_id": net, "ip_address": "10.0.0.8" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "DELETE", &uri, Some(&full), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &uri, Some(&full), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_links_through_the_api() {
    let (app, net) = setup_app().await;
    let full = token(&[IP_VIEW, IP_ADD, IP_CHANGE]);

    let mut ids = Vec::new();
    for (address, host) in [("10.0.0.20", "a"), ("10.0.0.21", "b")] {
        let (_, created) = send(
            &app,
            "POST",
            "/api/v1/IP/",
            Some(&full),
            Some(json!({ "network_id": net, "ip_address": address, "hostname": host })),
        )
        .await;
        ids.push(created["id"].as_i64().unwrap());
    }

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/v1/IP/{}/links", ids[0]),
        Some(&full),
        Some(json!({ "ip_id": ids[1] })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, record) = send(&app, "GET", &format!("/api/v1/IP/{}", ids[1]), Some(&full), None).await;
    assert_eq!(record["linked_ip"], json!([ids[0]]));

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/v1/IP/{}/links/{}", ids[1], ids[0]),
        Some(&full),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, links) = send(&app, "GET", &format!("/api/v1/IP/{}/links", ids[0]), Some(&full), None).await;
    assert_eq!(links["objects"], json!([]));
}

#[tokio::test]
async fn test_admin_surface_requires_admin_role() {
    let (app, net) = setup_app().await;
    let operator = token(&[IP_VIEW, IP_ADD, IP_CHANGE, IP_DELETE]);
    let admin = admin_token();

    let (status, _) = send(&app, "GET", "/api/admin/", Some(&operator), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, index) = send(&app, "GET", "/api/admin/", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(index["models"]
        .as_array()
        .unwrap()
        .iter()
        .any(|m| m["name"] == "networks"));

    let (status, vlan) = send(
        &app,
        "POST",
        "/api/admin/vlans",
        Some(&admin),
        Some(json!({ "client_id": 1, "number": 12, "name": "lab" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(vlan["number"], 12);

    let (status, child) = send(
        &app,
        "POST",
        "/api/admin/networks",
        Some(&admin),
        Some(json!({ "client_id": 1, "ip_address": "10.0.0.0", "mask": 26, "vlan_id": vlan["id"] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, ancestors) = send(
        &app,
        "GET",
        &format!("/api/admin/networks/{}/ancestors", child["id"]),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ancestors[0]["id"], net);

    let (status, _) = send(&app, "GET", "/api/admin/nonsense", Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, err) = send(&app, "DELETE", &format!("/api/admin/networks/{}", net), Some(&admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT, "{}", err);
}

#[tokio::test]
async fn test_malformed_bodies_and_queries_use_the_error_envelope() {
    let (app, _) = setup_app().await;
    let writer = token(&[IP_VIEW, IP_ADD]);

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/IP/")
        .header("Authorization", format!("Bearer {}", writer))
        .header("Content-Type", "application/json")
        .body(Body::from("{\"network_id\": 1, \"ip_address\": "))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let err: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(err["kind"], "validation_error");
    assert!(err["error"].is_string());

    // Well-formed JSON of the wrong shape
    let (status, err) = send(
        &app,
        "POST",
        "/api/v1/IP/",
        Some(&writer),
        Some(json!({ "network_id": "ten", "ip_address": "10.0.0.5" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["kind"], "validation_error");

    let (status, err) = send(&app, "GET", "/api/v1/IP/?offset=abc", Some(&writer), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["kind"], "validation_error");

    let (status, err) = send(
        &app,
        "GET",
        "/api/v1/IP/?offset=18446744073709551615",
        Some(&writer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["kind"], "validation_error");
}

#[tokio::test]
async fn test_admin_patch_merges_into_the_current_row() {
    let (app, _) = setup_app().await;
    let admin = admin_token();

    let (status, contact) = send(
        &app,
        "POST",
        "/api/admin/contacts",
        Some(&admin),
        Some(json!({ "name": "Ada", "email": "ada@example.com", "client_ids": [1] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/api/admin/contacts/{}", contact["id"]);

    let (status, patched) = send(&app, "PATCH", &uri, Some(&admin), Some(json!({ "surname": "Lovelace" }))).await;
    assert_eq!(status, StatusCode::OK, "{}", patched);
    assert_eq!(patched["name"], "Ada");
    assert_eq!(patched["surname"], "Lovelace");
    assert_eq!(patched["email"], "ada@example.com");

    let (status, detail) = send(&app, "GET", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["client_ids"], json!([1]));

    // Clearing both names breaks the contact rule
    let (status, err) = send(
        &app,
        "PATCH",
        &uri,
        Some(&admin),
        Some(json!({ "name": null, "surname": null })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["kind"], "validation_error");

    let (status, _) = send(&app, "PATCH", &uri, Some(&admin), Some(json!([1, 2]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, vrf) = send(
        &app,
        "POST",
        "/api/admin/vrfs",
        Some(&admin),
        Some(json!({ "client_id": 1, "name": "red", "rd": "65000:1" })),
    )
    .await;
    let (status, renamed) = send(
        &app,
        "PATCH",
        &format!("/api/admin/vrfs/{}", vrf["id"]),
        Some(&admin),
        Some(json!({ "name": "blue" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", renamed);
    assert_eq!(renamed["name"], "blue");
    assert_eq!(renamed["rd"], "65000:1");

    let (_, asset) = send(
        &app,
        "POST",
        "/api/admin/assets",
        Some(&admin),
        Some(json!({ "name": "sw01", "client_ids": [1] })),
    )
    .await;
    let (status, updated) = send(
        &app,
        "PATCH",
        &format!("/api/admin/assets/{}", asset["id"]),
        Some(&admin),
        Some(json!({ "serial_number": "FOC1234" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", updated);
    assert_eq!(updated["name"], "sw01");
    assert_eq!(updated["serial_number"], "FOC1234");

    let (status, _) = send(&app, "PATCH", "/api/admin/assets/9999", Some(&admin), Some(json!({ "name": "x" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_network_detail_carries_tags_and_fields() {
    let (app, net) = setup_app().await;
    let admin = admin_token();

    let (_, tag) = send(
        &app,
        "POST",
        "/api/admin/custom_tags",
        Some(&admin),
        Some(json!({ "tag": "core" })),
    )
    .await;
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/admin/custom_tags/{}/network", tag["id"]),
        Some(&admin),
        Some(json!({ "entity_id": net })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, field) = send(
        &app,
        "POST",
        "/api/admin/custom_fields",
        Some(&admin),
        Some(json!({ "entity_type": "network", "name": "site_code", "type": "TEXT" })),
    )
    .await;
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/admin/custom_fields/{}/values", field["id"]),
        Some(&admin),
        Some(json!({ "entity_id": net, "value": "ZRH1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/api/admin/networks/{}", net);
    let (status, detail) = send(&app, "GET", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["ip_address"], "10.0.0.0");
    assert_eq!(detail["tags"], json!(["core"]));
    assert_eq!(detail["custom_fields"]["site_code"], "ZRH1");

    let (status, updated) = send(&app, "PATCH", &uri, Some(&admin), Some(json!({ "description": "lab" }))).await;
    assert_eq!(status, StatusCode::OK, "{}", updated);
    assert_eq!(updated["description"], "lab");
    assert_eq!(updated["tags"], json!(["core"]));
}
