//! COS-Paste
//!
//! Local editor bridge that uploads clipboard images and picked files to
//! Tencent Cloud COS and inserts markdown image links into the active document.

use actix_web::{web, App, HttpServer, middleware};
use anyhow::Context;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;

mod api;
mod capture;
mod commands;
mod config;
mod domain;
mod pipeline;
mod storage;

use crate::capture::ScriptCapturer;
use crate::commands::Commands;
use crate::config::Settings;
use crate::domain::Platform;
use crate::storage::CosClient;

/// Application state shared across all handlers
pub struct AppState {
    pub settings: Settings,
    pub commands: Arc<Commands>,
    pub started_at: Instant,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing subscriber for structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cos_paste=info".parse()?)
                .add_directive("actix_web=info".parse()?)
        )
        .json()
        .init();

    let settings = Settings::load().context("Failed to load configuration")?;
    let bind_addr = format!("{}:{}", settings.server.host, settings.server.port);

    info!(
        "Starting COS-Paste v{} on {}",
        env!("CARGO_PKG_VERSION"),
        bind_addr
    );

    // Commands re-validate on every call; a bad config only disables uploads.
    if let Err(e) = settings.cos.validate() {
        warn!(error = %e, "COS settings incomplete, commands will report errors");
    }

    // One storage client for the lifetime of the process
    let store = Arc::new(CosClient::new(&settings.cos).context("Failed to create COS client")?);
    info!(bucket = %store.bucket(), region = %settings.cos.region, "COS client ready");

    let platform = Platform::current();
    let capturer = Arc::new(ScriptCapturer::for_platform(
        platform,
        &settings.capture.scripts_dir,
        settings.capture.timeout(),
    ));

    let commands = Arc::new(Commands::new(
        settings.cos.clone(),
        store,
        capturer,
        platform,
    ));

    let workers = settings.server.workers.unwrap_or(1);
    let app_state = web::Data::new(AppState {
        settings,
        commands,
        started_at: Instant::now(),
    });

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(TracingLogger::default())
            .wrap(
                middleware::DefaultHeaders::new()
                    .add(("X-Service", "cos-paste"))
                    .add(("X-Version", env!("CARGO_PKG_VERSION")))
            )
            .configure(api::configure_routes)
    })
    .workers(workers)
    .bind(&bind_addr)?
    .run()
    .await?;

    Ok(())
}

/// State wired to an in-memory store and a clipboard holding a small PNG
#[cfg(test)]
pub(crate) fn test_state(cos: crate::config::CosSettings) -> AppState {
    use crate::capture::{FakeCapturer, FakeClipboard};
    use crate::storage::MemoryStore;

    let commands = Commands::new(
        cos.clone(),
        Arc::new(MemoryStore::new()),
        FakeCapturer::new(FakeClipboard::Image(b"\x89PNG")),
        Platform::Linux,
    );

    AppState {
        settings: Settings {
            cos,
            ..Settings::default()
        },
        commands: Arc::new(commands),
        started_at: Instant::now(),
    }
}
