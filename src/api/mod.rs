pub mod admin;
pub mod auth;
pub mod error;
pub mod health;
pub mod ip;

use axum::{
    routing::{get, post},
    Router,
};

use crate::infrastructure::AppState;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Auth
        .route("/auth/login", post(auth::login))
        .route("/auth/users", post(auth::create_user))
        .route("/auth/me", get(auth::get_me))
        // IP resource (v1)
        .route("/v1/IP", get(ip::list_ips).post(ip::create_ip))
        .route("/v1/IP/", get(ip::list_ips).post(ip::create_ip))
        .route(
            "/v1/IP/:id",
            get(ip::get_ip)
                .put(ip::replace_ip)
                .patch(ip::patch_ip)
                .delete(ip::delete_ip),
        )
        .route("/v1/IP/:id/links", get(ip::list_links).post(ip::add_link))
        .route(
            "/v1/IP/:id/links/:other",
            axum::routing::delete(ip::remove_link),
        )
        // Admin
        .route("/admin", get(admin::index))
        .route("/admin/", get(admin::index))
        .route("/admin/:model", get(admin::list).post(admin::create))
        .route(
            "/admin/:model/:id",
            get(admin::detail)
                .patch(admin::update)
                .delete(admin::delete),
        )
        .route(
            "/admin/:model/:id/:relation",
            get(admin::relation).post(admin::attach_relation),
        )
        .with_state(state)
}
