//! OpenAPI 3.0 specification for the editor bridge

use utoipa::OpenApi;

use crate::api::handlers::{
    commands::{ApiError, CommandResponse, PasteRequest, SelectRequest},
    health::HealthResponse,
};
use crate::commands::{Notification, NotificationLevel, ProgressReport};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "COS-Paste Bridge API",
        version = "1.0.0",
        description = "Local bridge that uploads images to Tencent Cloud COS and inserts markdown links into the active document",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "/", description = "Current server")
    ),
    tags(
        (name = "system", description = "System health and status endpoints"),
        (name = "commands", description = "Editor commands")
    ),
    paths(
        crate::api::handlers::health::health_check,
        crate::api::handlers::commands::paste_upload,
        crate::api::handlers::commands::select_upload,
    ),
    components(
        schemas(
            HealthResponse,
            PasteRequest,
            SelectRequest,
            CommandResponse,
            ApiError,
            Notification,
            NotificationLevel,
            ProgressReport,
        )
    )
)]
pub struct ApiDoc;
