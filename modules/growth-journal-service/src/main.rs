//! Growth Journal Service: standalone binary for a family's growth records.
//!
//! Hosts the JSON API and a dashboard page on the same port.
//! Default: http://127.0.0.1:9110/

mod age;
mod ai;
mod config;
mod dashboard;
mod db;
mod http;
mod import;
mod routes;
mod validate;

use axum::routing::{delete, get, post};
use routes::AppState;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    if let Err(e) = run().await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let config = config::Config::from_env();

    log::info!("Opening database at: {}", config.db_path);
    let database = Arc::new(
        db::Db::open(&config.db_path).map_err(|e| format!("Failed to open database: {}", e))?,
    );

    for (name, settings) in [("OpenAI", &config.openai), ("Claude", &config.claude)] {
        if settings.is_configured() {
            log::info!("{} enrichment available", name);
        } else {
            log::warn!("{} API key not set, so that provider falls back to local rules", name);
        }
    }
    match config.child_birthday {
        Some(b) => log::info!("Child: {} (born {})", config.child_name, b),
        None => log::info!("Child: {} (no birthday set, ages left blank)", config.child_name),
    }

    let port = config.port;
    let state = Arc::new(AppState::new(database, config));

    let cors = tower_http::cors::CorsLayer::permissive();

    let app = axum::Router::new()
        .route("/", get(dashboard::dashboard))
        // Memories
        .route(
            "/api/memories",
            get(routes::memories_list)
                .post(routes::memories_create)
                .delete(routes::memories_delete_all),
        )
        .route(
            "/api/memories/conversations",
            delete(routes::memories_delete_conversations),
        )
        .route("/api/memories/export", get(routes::memories_export))
        .route("/api/memories/import", post(routes::memories_import))
        .route(
            "/api/memories/:id",
            get(routes::memories_get)
                .put(routes::memories_update)
                .delete(routes::memories_delete),
        )
        // Todos
        .route(
            "/api/todos",
            get(routes::todos_list).post(routes::todos_create),
        )
        .route(
            "/api/todos/:id",
            get(routes::todos_get)
                .put(routes::todos_update)
                .delete(routes::todos_delete),
        )
        // Daily tasks
        .route(
            "/api/daily-tasks",
            get(routes::daily_tasks_list).post(routes::daily_tasks_create),
        )
        .route(
            "/api/daily-tasks/:id",
            axum::routing::put(routes::daily_tasks_update).delete(routes::daily_tasks_delete),
        )
        .route(
            "/api/daily-tasks/:id/toggle",
            post(routes::daily_tasks_toggle),
        )
        // Schedule
        .route(
            "/api/schedule",
            get(routes::schedule_list).post(routes::schedule_create),
        )
        .route(
            "/api/schedule/:id",
            axum::routing::put(routes::schedule_update).delete(routes::schedule_delete),
        )
        // Import
        .route("/api/import/segment", post(routes::import_segment))
        .route("/api/import/docx", post(routes::import_docx))
        .route("/api/import/ai-parse", post(routes::import_ai_parse))
        .route("/api/import/confirm", post(routes::import_confirm))
        // Service
        .route("/api/status", get(routes::status))
        .with_state(state)
        .layer(cors);

    let addr = format!("127.0.0.1:{}", port);
    log::info!("Growth Journal Service listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("Failed to bind {}: {}", addr, e))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| format!("Server error: {}", e))
}
