use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::error::ApiJson;
use crate::auth::{create_jwt, Claims};
use crate::services::user_service::{self, NewUser};

#[derive(Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    token: String,
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    responses(
        (status = 200, description = "Bearer token valid for 24 hours"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(db): State<DatabaseConnection>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> impl IntoResponse {
    tracing::info!("Login attempt for user: {}", payload.username);

    let user = match user_service::authenticate(&db, &payload.username, &payload.password).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Invalid credentials" })),
            )
                .into_response();
        }
        Err(e) => return e.into_response(),
    };

    let permissions = user_service::permissions_of(&user);
    match create_jwt(&user.username, &user.role, permissions) {
        Ok(token) => (StatusCode::OK, Json(LoginResponse { token })).into_response(),
        Err(e) => {
            tracing::error!("Failed to issue token: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to issue token" })),
            )
                .into_response()
        }
    }
}

/// Create an API account. Admin only.
pub async fn create_user(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    ApiJson(payload): ApiJson<NewUser>,
) -> impl IntoResponse {
    if let Err(rejection) = claims.require_admin() {
        return rejection.into_response();
    }

    match user_service::create_user(&db, payload).await {
        Ok(user) => (StatusCode::CREATED, Json(user)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Identity of the current token.
pub async fn get_me(claims: Claims) -> impl IntoResponse {
    Json(json!({
        "username": claims.sub,
        "role": claims.role,
        "permissions": claims.permissions,
    }))
}
