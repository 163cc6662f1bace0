//! Axum route handlers for the growth journal API.

use crate::age::age_for_record;
use crate::ai::AiClient;
use crate::config::{Config, ProviderConfig};
use crate::db::Db;
use crate::import::ai_parse::parse_with_ai;
use crate::import::enrich::{Enricher, FallbackEnricher, LocalEnricher, RemoteEnricher};
use crate::import::segmenter::Segmenter;
use crate::import::{build_previews, docx};
use crate::validate::{check_weekday, normalize_date, normalize_time, require_text};
use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use growth_journal_types::*;
use serde::Serialize;
use std::fmt::Display;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub struct AppState {
    pub db: Arc<Db>,
    pub config: Config,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(db: Arc<Db>, config: Config) -> Self {
        Self {
            db,
            config,
            start_time: Instant::now(),
        }
    }

    fn provider_settings(&self, provider: EnrichmentProvider) -> &ProviderConfig {
        match provider {
            EnrichmentProvider::OpenAi => &self.config.openai,
            EnrichmentProvider::Claude => &self.config.claude,
        }
    }

    fn ai_client(&self, provider: EnrichmentProvider) -> Result<AiClient, String> {
        AiClient::from_config(
            provider,
            self.provider_settings(provider),
            Duration::from_secs(self.config.ai_timeout_secs),
        )
    }
}

type Reply<T> = (StatusCode, Json<RpcResponse<T>>);

fn ok<T: Serialize>(data: T) -> Reply<T> {
    (StatusCode::OK, Json(RpcResponse::ok(data)))
}

fn fail<T: Serialize>(status: StatusCode, msg: impl Into<String>) -> Reply<T> {
    (status, Json(RpcResponse::err(msg)))
}

fn bad_request<T: Serialize>(msg: impl Into<String>) -> Reply<T> {
    fail(StatusCode::BAD_REQUEST, msg)
}

fn not_found<T: Serialize>(what: &str, id: &str) -> Reply<T> {
    fail(StatusCode::NOT_FOUND, format!("{} {} not found", what, id))
}

fn storage_error<T: Serialize>(action: &str, e: impl Display) -> Reply<T> {
    log::error!("[DB] Failed to {}: {}", action, e);
    fail(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Failed to {}", action),
    )
}

/// Unwrap a JSON body, turning extractor rejections into the 400 envelope.
fn body<T, R: Serialize>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Reply<R>> {
    payload
        .map(|Json(v)| v)
        .map_err(|e| bad_request(format!("Invalid request body: {}", e.body_text())))
}

fn today() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Normalize an optional date; blank counts as absent.
fn optional_date(value: Option<&str>) -> Result<Option<String>, String> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => normalize_date(v).map(Some),
        None => Ok(None),
    }
}

// =====================================================
// Memory Endpoints
// =====================================================

// GET /api/memories
pub async fn memories_list(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<MemoryFilter>,
) -> Reply<Paginated<Memory>> {
    if let Some(kind) = filter.kind.as_deref().filter(|k| !k.is_empty()) {
        if MemoryKind::parse(kind).is_none() {
            return bad_request(format!("Unknown memory type: {}", kind));
        }
    }
    match state.db.list_memories(&filter) {
        Ok(page) => ok(page),
        Err(e) => storage_error("list memories", e),
    }
}

// POST /api/memories
pub async fn memories_create(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateMemoryRequest>, JsonRejection>,
) -> Reply<Memory> {
    let req = match body(payload) {
        Ok(r) => r,
        Err(reply) => return reply,
    };
    if let Err(e) = require_text("title", &req.title) {
        return bad_request(e);
    }
    if req.kind == MemoryKind::Conversation {
        if let Err(e) = require_text("content", &req.content) {
            return bad_request(e);
        }
    }
    let date = match optional_date(req.date.as_deref()) {
        Ok(d) => d.unwrap_or_else(today),
        Err(e) => return bad_request(e),
    };

    let age = non_empty(req.age)
        .unwrap_or_else(|| age_for_record(state.config.child_birthday, &date));
    let timestamp = now();
    let memory = Memory {
        id: uuid::Uuid::new_v4().to_string(),
        kind: req.kind,
        title: req.title.trim().to_string(),
        content: req.content,
        date,
        tags: req.tags,
        child_name: non_empty(req.child_name).unwrap_or_else(|| state.config.child_name.clone()),
        age,
        context: non_empty(req.context),
        image_url: non_empty(req.image_url),
        created_at: timestamp.clone(),
        updated_at: timestamp,
    };

    if let Err(e) = state.db.insert_memory(&memory) {
        return storage_error("create memory", e);
    }
    match state.db.get_memory(&memory.id) {
        Ok(Some(stored)) => ok(stored),
        Ok(None) => storage_error("create memory", "row missing after insert"),
        Err(e) => storage_error("create memory", e),
    }
}

// GET /api/memories/:id
pub async fn memories_get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Reply<Memory> {
    match state.db.get_memory(&id) {
        Ok(Some(memory)) => ok(memory),
        Ok(None) => not_found("Memory", &id),
        Err(e) => storage_error("load memory", e),
    }
}

// PUT /api/memories/:id
pub async fn memories_update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateMemoryRequest>, JsonRejection>,
) -> Reply<Memory> {
    let mut req = match body(payload) {
        Ok(r) => r,
        Err(reply) => return reply,
    };
    let existing = match state.db.get_memory(&id) {
        Ok(Some(m)) => m,
        Ok(None) => return not_found("Memory", &id),
        Err(e) => return storage_error("load memory", e),
    };

    if let Some(title) = req.title.as_deref() {
        if let Err(e) = require_text("title", title) {
            return bad_request(e);
        }
        req.title = Some(title.trim().to_string());
    }
    if existing.kind == MemoryKind::Conversation {
        if let Some(Err(e)) = req.content.as_deref().map(|c| require_text("content", c)) {
            return bad_request(e);
        }
    }
    if let Some(date) = req.date.as_deref() {
        match normalize_date(date) {
            Ok(d) => req.date = Some(d),
            Err(e) => return bad_request(e),
        }
    }

    match state.db.update_memory(&id, &req) {
        Ok(Some(memory)) => ok(memory),
        Ok(None) => not_found("Memory", &id),
        Err(e) => storage_error("update memory", e),
    }
}

// DELETE /api/memories/:id
pub async fn memories_delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Reply<String> {
    match state.db.delete_memory(&id) {
        Ok(true) => ok(id),
        Ok(false) => not_found("Memory", &id),
        Err(e) => storage_error("delete memory", e),
    }
}

// DELETE /api/memories/conversations
pub async fn memories_delete_conversations(State(state): State<Arc<AppState>>) -> Reply<usize> {
    match state.db.delete_memories_of_kind(MemoryKind::Conversation) {
        Ok(n) => {
            log::info!("[DB] Deleted {} conversation memories", n);
            ok(n)
        }
        Err(e) => storage_error("delete conversations", e),
    }
}

// DELETE /api/memories
pub async fn memories_delete_all(State(state): State<Arc<AppState>>) -> Reply<usize> {
    match state.db.delete_all_memories() {
        Ok(n) => {
            log::info!("[DB] Deleted all {} memories", n);
            ok(n)
        }
        Err(e) => storage_error("delete memories", e),
    }
}

// GET /api/memories/export
pub async fn memories_export(State(state): State<Arc<AppState>>) -> Reply<ExportDocument> {
    match state.db.all_memories() {
        Ok(memories) => ok(ExportDocument {
            version: EXPORT_VERSION.to_string(),
            export_date: now(),
            memories,
        }),
        Err(e) => storage_error("export memories", e),
    }
}

// POST /api/memories/import
pub async fn memories_import(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ExportDocument>, JsonRejection>,
) -> Reply<usize> {
    let doc = match body(payload) {
        Ok(d) => d,
        Err(reply) => return reply,
    };
    if doc.version != EXPORT_VERSION {
        return bad_request(format!("Unsupported export version: {}", doc.version));
    }
    match state.db.restore_memories(&doc.memories) {
        Ok(n) => {
            log::info!("[DB] Restored {} memories from export of {}", n, doc.export_date);
            ok(n)
        }
        Err(e) => storage_error("import memories", e),
    }
}

// =====================================================
// Todo Endpoints
// =====================================================

// GET /api/todos
pub async fn todos_list(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<TodoFilter>,
) -> Reply<Paginated<Todo>> {
    if let Some(status) = filter.status.as_deref().filter(|s| !s.is_empty()) {
        if TodoStatus::parse(status).is_none() {
            return bad_request(format!("Unknown todo status: {}", status));
        }
    }
    if let Some(priority) = filter.priority.as_deref().filter(|p| !p.is_empty()) {
        if TodoPriority::parse(priority).is_none() {
            return bad_request(format!("Unknown todo priority: {}", priority));
        }
    }
    match state.db.list_todos(&filter) {
        Ok(page) => ok(page),
        Err(e) => storage_error("list todos", e),
    }
}

// POST /api/todos
pub async fn todos_create(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> Reply<Todo> {
    let req = match body(payload) {
        Ok(r) => r,
        Err(reply) => return reply,
    };
    if let Err(e) = require_text("title", &req.title) {
        return bad_request(e);
    }
    let due_date = match optional_date(req.due_date.as_deref()) {
        Ok(d) => d,
        Err(e) => return bad_request(e),
    };

    let timestamp = now();
    let todo = Todo {
        id: uuid::Uuid::new_v4().to_string(),
        title: req.title.trim().to_string(),
        description: req.description,
        status: req.status.unwrap_or(TodoStatus::Pending),
        priority: req.priority.unwrap_or(TodoPriority::Medium),
        due_date,
        created_at: timestamp.clone(),
        updated_at: timestamp,
    };

    if let Err(e) = state.db.insert_todo(&todo) {
        return storage_error("create todo", e);
    }
    match state.db.get_todo(&todo.id) {
        Ok(Some(stored)) => ok(stored),
        Ok(None) => storage_error("create todo", "row missing after insert"),
        Err(e) => storage_error("create todo", e),
    }
}

// GET /api/todos/:id
pub async fn todos_get(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Reply<Todo> {
    match state.db.get_todo(&id) {
        Ok(Some(todo)) => ok(todo),
        Ok(None) => not_found("Todo", &id),
        Err(e) => storage_error("load todo", e),
    }
}

// PUT /api/todos/:id
pub async fn todos_update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTodoRequest>, JsonRejection>,
) -> Reply<Todo> {
    let mut req = match body(payload) {
        Ok(r) => r,
        Err(reply) => return reply,
    };
    if let Some(title) = req.title.as_deref() {
        if let Err(e) = require_text("title", title) {
            return bad_request(e);
        }
        req.title = Some(title.trim().to_string());
    }
    if let Some(due) = req.due_date.as_deref() {
        match normalize_date(due) {
            Ok(d) => req.due_date = Some(d),
            Err(e) => return bad_request(e),
        }
    }

    match state.db.update_todo(&id, &req) {
        Ok(Some(todo)) => ok(todo),
        Ok(None) => not_found("Todo", &id),
        Err(e) => storage_error("update todo", e),
    }
}

// DELETE /api/todos/:id
pub async fn todos_delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Reply<String> {
    match state.db.delete_todo(&id) {
        Ok(true) => ok(id),
        Ok(false) => not_found("Todo", &id),
        Err(e) => storage_error("delete todo", e),
    }
}

// =====================================================
// Daily Task Endpoints
// =====================================================

// GET /api/daily-tasks
pub async fn daily_tasks_list(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<DailyTaskFilter>,
) -> Reply<Vec<DailyTask>> {
    let date = match optional_date(filter.date.as_deref()) {
        Ok(d) => d,
        Err(e) => return bad_request(e),
    };
    match state.db.list_daily_tasks(date.as_deref()) {
        Ok(tasks) => ok(tasks),
        Err(e) => storage_error("list daily tasks", e),
    }
}

// POST /api/daily-tasks
pub async fn daily_tasks_create(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateDailyTaskRequest>, JsonRejection>,
) -> Reply<DailyTask> {
    let req = match body(payload) {
        Ok(r) => r,
        Err(reply) => return reply,
    };
    if let Err(e) = require_text("title", &req.title) {
        return bad_request(e);
    }
    let date = match optional_date(req.date.as_deref()) {
        Ok(d) => d.unwrap_or_else(today),
        Err(e) => return bad_request(e),
    };

    let timestamp = now();
    let task = DailyTask {
        id: uuid::Uuid::new_v4().to_string(),
        title: req.title.trim().to_string(),
        date,
        completed: false,
        created_at: timestamp.clone(),
        updated_at: timestamp,
    };

    if let Err(e) = state.db.insert_daily_task(&task) {
        return storage_error("create daily task", e);
    }
    match state.db.get_daily_task(&task.id) {
        Ok(Some(stored)) => ok(stored),
        Ok(None) => storage_error("create daily task", "row missing after insert"),
        Err(e) => storage_error("create daily task", e),
    }
}

// PUT /api/daily-tasks/:id
pub async fn daily_tasks_update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateDailyTaskRequest>, JsonRejection>,
) -> Reply<DailyTask> {
    let mut req = match body(payload) {
        Ok(r) => r,
        Err(reply) => return reply,
    };
    if let Some(title) = req.title.as_deref() {
        if let Err(e) = require_text("title", title) {
            return bad_request(e);
        }
        req.title = Some(title.trim().to_string());
    }
    if let Some(date) = req.date.as_deref() {
        match normalize_date(date) {
            Ok(d) => req.date = Some(d),
            Err(e) => return bad_request(e),
        }
    }

    match state.db.update_daily_task(&id, &req) {
        Ok(Some(task)) => ok(task),
        Ok(None) => not_found("Daily task", &id),
        Err(e) => storage_error("update daily task", e),
    }
}

// POST /api/daily-tasks/:id/toggle
pub async fn daily_tasks_toggle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Reply<DailyTask> {
    match state.db.toggle_daily_task(&id) {
        Ok(Some(task)) => ok(task),
        Ok(None) => not_found("Daily task", &id),
        Err(e) => storage_error("toggle daily task", e),
    }
}

// DELETE /api/daily-tasks/:id
pub async fn daily_tasks_delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Reply<String> {
    match state.db.delete_daily_task(&id) {
        Ok(true) => ok(id),
        Ok(false) => not_found("Daily task", &id),
        Err(e) => storage_error("delete daily task", e),
    }
}

// =====================================================
// Schedule Endpoints
// =====================================================

fn check_time_range(start: &str, end: &str) -> Result<(), String> {
    // Both are normalized HH:MM, so string order is time order
    if start >= end {
        return Err(format!("startTime {} must be before endTime {}", start, end));
    }
    Ok(())
}

// GET /api/schedule
pub async fn schedule_list(State(state): State<Arc<AppState>>) -> Reply<Vec<ScheduleEntry>> {
    match state.db.list_schedule() {
        Ok(entries) => ok(entries),
        Err(e) => storage_error("list schedule", e),
    }
}

// POST /api/schedule
pub async fn schedule_create(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateScheduleEntryRequest>, JsonRejection>,
) -> Reply<ScheduleEntry> {
    let req = match body(payload) {
        Ok(r) => r,
        Err(reply) => return reply,
    };
    let checked = (|| {
        require_text("subject", &req.subject)?;
        check_weekday(req.weekday)?;
        let start = normalize_time(&req.start_time)?;
        let end = normalize_time(&req.end_time)?;
        check_time_range(&start, &end)?;
        Ok::<_, String>((start, end))
    })();
    let (start_time, end_time) = match checked {
        Ok(times) => times,
        Err(e) => return bad_request(e),
    };

    let timestamp = now();
    let entry = ScheduleEntry {
        id: uuid::Uuid::new_v4().to_string(),
        weekday: req.weekday,
        start_time,
        end_time,
        subject: req.subject.trim().to_string(),
        location: non_empty(req.location),
        teacher: non_empty(req.teacher),
        created_at: timestamp.clone(),
        updated_at: timestamp,
    };

    if let Err(e) = state.db.insert_schedule_entry(&entry) {
        return storage_error("create schedule entry", e);
    }
    match state.db.get_schedule_entry(&entry.id) {
        Ok(Some(stored)) => ok(stored),
        Ok(None) => storage_error("create schedule entry", "row missing after insert"),
        Err(e) => storage_error("create schedule entry", e),
    }
}

// PUT /api/schedule/:id
pub async fn schedule_update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateScheduleEntryRequest>, JsonRejection>,
) -> Reply<ScheduleEntry> {
    let mut req = match body(payload) {
        Ok(r) => r,
        Err(reply) => return reply,
    };
    let existing = match state.db.get_schedule_entry(&id) {
        Ok(Some(e)) => e,
        Ok(None) => return not_found("Schedule entry", &id),
        Err(e) => return storage_error("load schedule entry", e),
    };

    let checked = (|| {
        if let Some(subject) = req.subject.as_deref() {
            require_text("subject", subject)?;
        }
        if let Some(weekday) = req.weekday {
            check_weekday(weekday)?;
        }
        let start = req.start_time.as_deref().map(normalize_time).transpose()?;
        let end = req.end_time.as_deref().map(normalize_time).transpose()?;
        check_time_range(
            start.as_deref().unwrap_or(&existing.start_time),
            end.as_deref().unwrap_or(&existing.end_time),
        )?;
        Ok::<_, String>((start, end))
    })();
    match checked {
        Ok((start, end)) => {
            req.start_time = start;
            req.end_time = end;
        }
        Err(e) => return bad_request(e),
    }

    match state.db.update_schedule_entry(&id, &req) {
        Ok(Some(entry)) => ok(entry),
        Ok(None) => not_found("Schedule entry", &id),
        Err(e) => storage_error("update schedule entry", e),
    }
}

// DELETE /api/schedule/:id
pub async fn schedule_delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Reply<String> {
    match state.db.delete_schedule_entry(&id) {
        Ok(true) => ok(id),
        Ok(false) => not_found("Schedule entry", &id),
        Err(e) => storage_error("delete schedule entry", e),
    }
}

// =====================================================
// Import Endpoints
// =====================================================

/// Segment `text` and title/tag each segment, locally or with a remote override.
async fn previews_for_text(
    state: &AppState,
    text: &str,
    enrich: bool,
    provider: Option<EnrichmentProvider>,
) -> Reply<Vec<ImportPreview>> {
    let segments = Segmenter::starting_now().segment(text);
    let local = LocalEnricher::new(state.config.child_name.clone());

    let enricher: Box<dyn Enricher> = if enrich {
        let provider = provider.unwrap_or(EnrichmentProvider::OpenAi);
        match state.ai_client(provider) {
            Ok(client) => Box::new(FallbackEnricher::new(RemoteEnricher::new(client), local)),
            Err(e) => {
                log::warn!("[IMPORT] {}, using local enrichment", e);
                Box::new(local)
            }
        }
    } else {
        Box::new(local)
    };

    log::info!(
        "[IMPORT] {} segments from {} chars ({})",
        segments.len(),
        text.chars().count(),
        enricher.name()
    );

    match build_previews(segments, enricher.as_ref()).await {
        Ok(previews) => ok(previews),
        Err(e) => {
            log::error!("[IMPORT] Preview build failed: {}", e);
            fail(StatusCode::INTERNAL_SERVER_ERROR, "Failed to build previews")
        }
    }
}

// POST /api/import/segment
pub async fn import_segment(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SegmentRequest>, JsonRejection>,
) -> Reply<Vec<ImportPreview>> {
    let req = match body(payload) {
        Ok(r) => r,
        Err(reply) => return reply,
    };
    if let Err(e) = require_text("text", &req.text) {
        return bad_request(e);
    }
    previews_for_text(&state, &req.text, req.enrich, req.provider).await
}

// POST /api/import/docx (body: the raw .docx file)
pub async fn import_docx(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DocxImportQuery>,
    file: Bytes,
) -> Reply<Vec<ImportPreview>> {
    if file.is_empty() {
        return bad_request("Document body is empty");
    }
    let text = match docx::extract_text(&file) {
        Ok(t) => t,
        Err(e) => return bad_request(e),
    };
    if text.trim().is_empty() {
        return bad_request("Document contains no text");
    }
    log::info!("[IMPORT] Read {} bytes of .docx", file.len());
    previews_for_text(&state, &text, query.enrich, query.provider).await
}

// POST /api/import/ai-parse
pub async fn import_ai_parse(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AiParseRequest>, JsonRejection>,
) -> Reply<Vec<ImportPreview>> {
    let req = match body(payload) {
        Ok(r) => r,
        Err(reply) => return reply,
    };
    if let Err(e) = require_text("text", &req.text) {
        return bad_request(e);
    }

    let client = match state.ai_client(req.provider) {
        Ok(c) => Some(c),
        Err(e) => {
            log::warn!("[IMPORT] {}, splitting per line", e);
            None
        }
    };
    let records = parse_with_ai(client.as_ref(), &req.text, &today()).await;
    log::info!("[IMPORT] AI parse produced {} records", records.len());
    ok(records)
}

// POST /api/import/confirm
pub async fn import_confirm(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ConfirmImportRequest>, JsonRejection>,
) -> Reply<usize> {
    let req = match body(payload) {
        Ok(r) => r,
        Err(reply) => return reply,
    };
    if req.records.is_empty() {
        return bad_request("records must not be empty");
    }

    let mut memories = Vec::with_capacity(req.records.len());
    for (i, record) in req.records.into_iter().enumerate() {
        let checked = require_text("title", &record.title)
            .and_then(|_| require_text("content", &record.content))
            .and_then(|_| normalize_date(&record.date));
        let date = match checked {
            Ok(d) => d,
            Err(e) => return bad_request(format!("Record {}: {}", i + 1, e)),
        };
        let timestamp = now();
        memories.push(Memory {
            id: uuid::Uuid::new_v4().to_string(),
            kind: MemoryKind::Conversation,
            title: record.title.trim().to_string(),
            content: record.content,
            age: age_for_record(state.config.child_birthday, &date),
            date,
            tags: record.tags,
            child_name: state.config.child_name.clone(),
            context: non_empty(record.context).filter(|c| c != DEFAULT_CONTEXT),
            image_url: None,
            created_at: timestamp.clone(),
            updated_at: timestamp,
        });
    }

    let total = memories.len();
    let tasks = memories.into_iter().map(|memory| {
        let db = state.db.clone();
        tokio::task::spawn_blocking(move || db.insert_memory(&memory))
    });
    let results = futures_util::future::join_all(tasks).await;

    let mut failed = 0;
    for result in results {
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                failed += 1;
                log::error!("[IMPORT] Failed to save record: {}", e);
            }
            Err(e) => {
                failed += 1;
                log::error!("[IMPORT] Save task panicked: {}", e);
            }
        }
    }

    if failed > 0 {
        return fail(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to save {} of {} records", failed, total),
        );
    }
    log::info!("[IMPORT] Saved {} conversation records", total);
    ok(total)
}

// =====================================================
// Service Endpoints
// =====================================================

// GET /api/status
pub async fn status(State(state): State<Arc<AppState>>) -> Reply<ServiceStatus> {
    let stats = match state.db.memory_stats() {
        Ok(s) => s,
        Err(e) => return storage_error("load stats", e),
    };
    let open_todos = match state.db.count_open_todos() {
        Ok(n) => n,
        Err(e) => return storage_error("load stats", e),
    };

    ok(ServiceStatus {
        running: true,
        uptime_secs: state.start_time.elapsed().as_secs(),
        total_memories: stats.total,
        conversation_count: stats.conversations,
        photo_count: stats.photos,
        open_todos,
        openai_configured: state.config.openai.is_configured(),
        claude_configured: state.config.claude.is_configured(),
    })
}
