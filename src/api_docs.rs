use crate::api;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::auth::login,
        api::ip::list_ips,
        api::ip::create_ip,
        api::ip::get_ip,
        api::ip::replace_ip,
        api::ip::patch_ip,
        api::ip::delete_ip,
    ),
    tags(
        (name = "gestioip", description = "GestioIP address space API")
    )
)]
pub struct ApiDoc;
