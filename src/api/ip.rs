//! IP resource handlers using repository pattern
//!
//! Responses follow the `{"meta": ..., "objects": [...]}` list envelope of the
//! v1 API.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use super::error::{ApiJson, ApiQuery};
use crate::auth::{Claims, IP_ADD, IP_CHANGE, IP_DELETE, IP_VIEW};
use crate::domain::{DomainError, IpFilter, IpPatch, NewIp};
use crate::infrastructure::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/IP/",
    params(
        ("network" = Option<i32>, Query, description = "Only records of this network"),
        ("hostname" = Option<String>, Query, description = "Exact hostname"),
        ("limit" = Option<u64>, Query, description = "Page size (default 20)"),
        ("offset" = Option<u64>, Query, description = "Records to skip")
    ),
    responses(
        (status = 200, description = "Page of IP records"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Missing ip.view")
    )
)]
pub async fn list_ips(
    claims: Claims,
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<IpFilter>,
) -> impl IntoResponse {
    if let Err(rejection) = claims.require(IP_VIEW) {
        return rejection.into_response();
    }

    match state.ip_repo.find_all(filter).await {
        Ok(page) => Json(json!({
            "meta": {
                "limit": page.limit,
                "offset": page.offset,
                "total_count": page.total,
            },
            "objects": page.objects,
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/IP/",
    responses(
        (status = 201, description = "IP record created"),
        (status = 400, description = "Invalid address, address outside its network or no name"),
        (status = 409, description = "Address already present in the network")
    )
)]
pub async fn create_ip(
    claims: Claims,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<NewIp>,
) -> impl IntoResponse {
    if let Err(rejection) = claims.require(IP_ADD) {
        return rejection.into_response();
    }

    match state.ip_repo.create(payload).await {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/IP/{id}",
    params(("id" = i32, Path, description = "IP record id")),
    responses(
        (status = 200, description = "IP record"),
        (status = 404, description = "No such record")
    )
)]
pub async fn get_ip(
    claims: Claims,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    if let Err(rejection) = claims.require(IP_VIEW) {
        return rejection.into_response();
    }

    match state.ip_repo.find_by_id(id).await {
        Ok(Some(record)) => Json(record).into_response(),
        Ok(None) => DomainError::not_found("IP", id).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/api/v1/IP/{id}",
    params(("id" = i32, Path, description = "IP record id")),
    responses(
        (status = 200, description = "IP record replaced"),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "No such record")
    )
)]
pub async fn replace_ip(
    claims: Claims,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ApiJson(payload): ApiJson<NewIp>,
) -> impl IntoResponse {
    if let Err(rejection) = claims.require(IP_CHANGE) {
        return rejection.into_response();
    }

    match state.ip_repo.replace(id, payload).await {
        Ok(record) => Json(record).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    patch,
    path = "/api/v1/IP/{id}",
    params(("id" = i32, Path, description = "IP record id")),
    responses(
        (status = 200, description = "IP record updated"),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "No such record")
    )
)]
pub async fn patch_ip(
    claims: Claims,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ApiJson(payload): ApiJson<IpPatch>,
) -> impl IntoResponse {
    if let Err(rejection) = claims.require(IP_CHANGE) {
        return rejection.into_response();
    }

    match state.ip_repo.update(id, payload).await {
        Ok(record) => Json(record).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/IP/{id}",
    params(("id" = i32, Path, description = "IP record id")),
    responses(
        (status = 204, description = "IP record deleted"),
        (status = 404, description = "No such record")
    )
)]
pub async fn delete_ip(
    claims: Claims,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    if let Err(rejection) = claims.require(IP_DELETE) {
        return rejection.into_response();
    }

    match state.ip_repo.delete(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Request DTO for linking two records
#[derive(Debug, Deserialize)]
pub struct LinkRequest {
    pub ip_id: i32,
}

pub async fn list_links(
    claims: Claims,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    if let Err(rejection) = claims.require(IP_VIEW) {
        return rejection.into_response();
    }

    match state.ip_repo.linked(id).await {
        Ok(linked) => Json(json!({ "objects": linked })).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn add_link(
    claims: Claims,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ApiJson(payload): ApiJson<LinkRequest>,
) -> impl IntoResponse {
    if let Err(rejection) = claims.require(IP_CHANGE) {
        return rejection.into_response();
    }

    match state.ip_repo.link(id, payload.ip_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn remove_link(
    claims: Claims,
    State(state): State<AppState>,
    Path((id, other)): Path<(i32, i32)>,
) -> impl IntoResponse {
    if let Err(rejection) = claims.require(IP_CHANGE) {
        return rejection.into_response();
    }

    match state.ip_repo.unlink(id, other).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
