//! Editor command endpoints
//!
//! Each request is one command invocation. The request names the active
//! document and cursor; the response carries the outcome together with every
//! notification and progress report the command produced.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::AppState;
use crate::commands::{
    CommandError, CommandOutcome, FileEditor, Notification, ProgressReport, SessionLog,
};

/// Request body for paste-upload
#[derive(Debug, Deserialize, ToSchema)]
pub struct PasteRequest {
    /// Active document; absent when no editor is open
    #[schema(value_type = Option<String>)]
    pub document: Option<PathBuf>,
    /// Cursor position as a character offset
    #[serde(default)]
    pub cursor: usize,
}

/// Request body for select-upload
#[derive(Debug, Deserialize, ToSchema)]
pub struct SelectRequest {
    #[schema(value_type = Option<String>)]
    pub document: Option<PathBuf>,
    #[serde(default)]
    pub cursor: usize,
    /// File picker result; absent when the picker was dismissed
    #[schema(value_type = Option<String>)]
    pub file: Option<PathBuf>,
}

/// Response for both commands
#[derive(Debug, Serialize, ToSchema)]
pub struct CommandResponse {
    pub success: bool,
    pub command_id: Uuid,
    /// `inserted`, `no_image`, `cancelled` or `failed`
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub notifications: Vec<Notification>,
    pub progress: Vec<ProgressReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

/// POST /api/v1/commands/paste - Upload the clipboard image
#[utoipa::path(
    post,
    path = "/api/v1/commands/paste",
    tag = "commands",
    request_body = PasteRequest,
    responses(
        (status = 200, description = "Link inserted, or clipboard held no image", body = CommandResponse),
        (status = 400, description = "No active editor or invalid configuration", body = CommandResponse),
        (status = 500, description = "Capture, folder, upload or insert failure", body = CommandResponse)
    )
)]
pub async fn paste_upload(
    state: web::Data<AppState>,
    body: web::Json<PasteRequest>,
) -> HttpResponse {
    let start = Instant::now();
    let command_id = Uuid::new_v4();
    let body = body.into_inner();

    info!(%command_id, document = ?body.document, cursor = body.cursor, "Running paste-upload");

    let editor = FileEditor::new(body.document, body.cursor);
    let result = state.commands.paste_upload(&editor).await;

    respond(command_id, start, result, editor.into_log())
}

/// POST /api/v1/commands/select - Upload a picked file
#[utoipa::path(
    post,
    path = "/api/v1/commands/select",
    tag = "commands",
    request_body = SelectRequest,
    responses(
        (status = 200, description = "Link inserted, or picker dismissed", body = CommandResponse),
        (status = 400, description = "No active editor or invalid configuration", body = CommandResponse),
        (status = 500, description = "Upload or insert failure", body = CommandResponse)
    )
)]
pub async fn select_upload(
    state: web::Data<AppState>,
    body: web::Json<SelectRequest>,
) -> HttpResponse {
    let start = Instant::now();
    let command_id = Uuid::new_v4();
    let body = body.into_inner();

    info!(%command_id, document = ?body.document, file = ?body.file, "Running select-upload");

    let editor = FileEditor::new(body.document, body.cursor);
    let result = state
        .commands
        .select_upload(&editor, body.file.as_deref())
        .await;

    respond(command_id, start, result, editor.into_log())
}

fn respond(
    command_id: Uuid,
    start: Instant,
    result: Result<CommandOutcome, CommandError>,
    log: SessionLog,
) -> HttpResponse {
    let elapsed_ms = start.elapsed().as_millis() as u64;

    let mut response = CommandResponse {
        success: true,
        command_id,
        outcome: "",
        markdown: None,
        url: None,
        notifications: log.notifications,
        progress: log.progress,
        error: None,
    };

    match result {
        Ok(CommandOutcome::Inserted { markdown, url }) => {
            info!(%command_id, elapsed_ms, "Command completed");
            response.outcome = "inserted";
            response.markdown = Some(markdown);
            response.url = Some(url);
            HttpResponse::Ok().json(response)
        }
        Ok(CommandOutcome::NoImage) => {
            response.outcome = "no_image";
            HttpResponse::Ok().json(response)
        }
        Ok(CommandOutcome::Cancelled) => {
            response.outcome = "cancelled";
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            error!(%command_id, elapsed_ms, code = e.code(), error = %e, "Command failed");
            response.success = false;
            response.outcome = "failed";
            response.error = Some(ApiError {
                code: e.code().to_string(),
                message: e.to_string(),
            });

            if e.is_client_error() {
                HttpResponse::BadRequest().json(response)
            } else {
                HttpResponse::InternalServerError().json(response)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::configure_routes;
    use crate::config::{valid_cos_settings, CosSettings};
    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};

    async fn call(cos: CosSettings, uri: &str, payload: Value) -> (StatusCode, Value) {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(crate::test_state(cos)))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post().uri(uri).set_json(payload).to_request();
        let resp = test::call_service(&app, req).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }

    #[actix_web::test]
    async fn test_paste_inserts_markdown() {
        let tmp = tempfile::tempdir().unwrap();
        let doc = tmp.path().join("post.md");
        std::fs::write(&doc, "# Title\n").unwrap();

        let (status, body) = call(
            valid_cos_settings(),
            "/api/v1/commands/paste",
            json!({ "document": doc, "cursor": 8 }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "inserted");
        let markdown = body["markdown"].as_str().unwrap().to_string();
        assert!(markdown.starts_with("![](https://notes-1250000000.cos.ap-guangzhou.myqcloud.com/"));
        assert_eq!(std::fs::read_to_string(&doc).unwrap(), format!("# Title\n{}", markdown));
        assert_eq!(body["notifications"][0]["message"], "Complete upload!");
        assert_eq!(body["progress"][0]["increment"], 0);
        assert_eq!(body["progress"][1]["increment"], 100);
    }

    #[actix_web::test]
    async fn test_missing_editor_is_bad_request() {
        let (status, body) = call(valid_cos_settings(), "/api/v1/commands/paste", json!({})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "NO_ACTIVE_EDITOR");
    }

    #[actix_web::test]
    async fn test_invalid_config_lists_every_violation() {
        let tmp = tempfile::tempdir().unwrap();
        let doc = tmp.path().join("post.md");

        let (status, body) = call(
            CosSettings::default(),
            "/api/v1/commands/paste",
            json!({ "document": doc }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_CONFIG");
        let messages: Vec<&str> = body["notifications"]
            .as_array()
            .unwrap()
            .iter()
            .map(|n| n["message"].as_str().unwrap())
            .collect();
        assert_eq!(
            messages,
            vec![
                "missing bucket param",
                "missing region param",
                "missing secretId param",
                "missing secretKey param",
            ]
        );
    }

    #[actix_web::test]
    async fn test_select_without_file_is_cancelled() {
        let (status, body) = call(
            valid_cos_settings(),
            "/api/v1/commands/select",
            json!({ "document": "/tmp/post.md" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "cancelled");
        assert_eq!(body["notifications"], json!([]));
    }

    #[actix_web::test]
    async fn test_select_missing_file_is_upload_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let doc = tmp.path().join("post.md");

        let (status, body) = call(
            valid_cos_settings(),
            "/api/v1/commands/select",
            json!({ "document": doc, "file": tmp.path().join("gone.png") }),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "UPLOAD_FAILED");
        assert!(!doc.exists());
    }
}
