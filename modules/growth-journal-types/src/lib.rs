//! Shared types for the growth journal service and its RPC clients.

use serde::{Deserialize, Serialize};

/// Context label given to a segment that had no title header.
pub const DEFAULT_CONTEXT: &str = "日常对话";

/// Version string written into export documents.
pub const EXPORT_VERSION: &str = "1.0";

// =====================================================
// Memory Types
// =====================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryKind {
    Conversation,
    Photo,
}

impl MemoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryKind::Conversation => "conversation",
            MemoryKind::Photo => "photo",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "conversation" => Some(MemoryKind::Conversation),
            "photo" => Some(MemoryKind::Photo),
            _ => None,
        }
    }
}

/// A stored growth memory (conversation or photo)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memory {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MemoryKind,
    pub title: String,
    pub content: String,
    pub date: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub child_name: String,
    #[serde(default)]
    pub age: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Inline data URI for photo records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemoryRequest {
    #[serde(rename = "type", default = "default_kind")]
    pub kind: MemoryKind,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub date: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub child_name: Option<String>,
    pub age: Option<String>,
    pub context: Option<String>,
    pub image_url: Option<String>,
}

fn default_kind() -> MemoryKind {
    MemoryKind::Conversation
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemoryRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub date: Option<String>,
    pub tags: Option<Vec<String>>,
    pub child_name: Option<String>,
    pub age: Option<String>,
    pub context: Option<String>,
    pub image_url: Option<String>,
}

/// Query parameters for listing memories
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MemoryFilter {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub search: Option<String>,
}

// =====================================================
// Todo Types
// =====================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    Pending,
    InProgress,
    Completed,
}

impl TodoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TodoStatus::Pending => "pending",
            TodoStatus::InProgress => "in_progress",
            TodoStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TodoStatus::Pending),
            "in_progress" => Some(TodoStatus::InProgress),
            "completed" => Some(TodoStatus::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TodoPriority {
    Low,
    Medium,
    High,
}

impl TodoPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TodoPriority::Low => "low",
            TodoPriority::Medium => "medium",
            TodoPriority::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(TodoPriority::Low),
            "medium" => Some(TodoPriority::Medium),
            "high" => Some(TodoPriority::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: TodoStatus,
    pub priority: TodoPriority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: Option<TodoStatus>,
    pub priority: Option<TodoPriority>,
    pub due_date: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TodoStatus>,
    pub priority: Option<TodoPriority>,
    pub due_date: Option<String>,
}

/// Query parameters for listing todos
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TodoFilter {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub search: Option<String>,
}

// =====================================================
// Daily Tasks & Schedule
// =====================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTask {
    pub id: String,
    pub title: String,
    pub date: String,
    pub completed: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDailyTaskRequest {
    pub title: String,
    pub date: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct UpdateDailyTaskRequest {
    pub title: Option<String>,
    pub date: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct DailyTaskFilter {
    pub date: Option<String>,
}

/// A weekly class slot. `weekday` runs 1 (Monday) to 7 (Sunday).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub id: String,
    pub weekday: u8,
    pub start_time: String,
    pub end_time: String,
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateScheduleEntryRequest {
    pub weekday: u8,
    pub start_time: String,
    pub end_time: String,
    pub subject: String,
    pub location: Option<String>,
    pub teacher: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScheduleEntryRequest {
    pub weekday: Option<u8>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub subject: Option<String>,
    pub location: Option<String>,
    pub teacher: Option<String>,
}

// =====================================================
// Pagination
// =====================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
    pub has_more: bool,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            total.div_ceil(limit as u64) as u32
        };
        Self {
            page,
            limit,
            total,
            total_pages,
            has_more: page < total_pages,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

// =====================================================
// Import Types
// =====================================================

/// A run of pasted lines grouped by the segmenter, before titling and tagging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySegment {
    pub content: String,
    pub date: String,
    pub context: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrichmentProvider {
    #[serde(alias = "openai_compatible")]
    OpenAi,
    Claude,
}

impl EnrichmentProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrichmentProvider::OpenAi => "openai",
            EnrichmentProvider::Claude => "claude",
        }
    }
}

/// A candidate conversation record shown to the user before confirmation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportPreview {
    pub title: String,
    pub content: String,
    pub date: String,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentRequest {
    pub text: String,
    #[serde(default)]
    pub enrich: bool,
    pub provider: Option<EnrichmentProvider>,
}

/// Query string for a `.docx` upload; the document itself is the body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocxImportQuery {
    #[serde(default)]
    pub enrich: bool,
    pub provider: Option<EnrichmentProvider>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiParseRequest {
    pub text: String,
    pub provider: EnrichmentProvider,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmImportRequest {
    pub records: Vec<ImportPreview>,
}

// =====================================================
// Export Types
// =====================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub version: String,
    pub export_date: String,
    pub memories: Vec<Memory>,
}

// =====================================================
// RPC Response Types
// =====================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct RpcResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> RpcResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

// =====================================================
// Service Status
// =====================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub running: bool,
    pub uptime_secs: u64,
    pub total_memories: i64,
    pub conversation_count: i64,
    pub photo_count: i64,
    pub open_todos: i64,
    pub openai_configured: bool,
    pub claude_configured: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_math() {
        let p = Pagination::new(1, 20, 45);
        assert_eq!(p.total_pages, 3);
        assert!(p.has_more);

        let last = Pagination::new(3, 20, 45);
        assert!(!last.has_more);

        let empty = Pagination::new(1, 20, 0);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_more);
    }

    #[test]
    fn test_memory_wire_shape_is_camel_case() {
        let memory = Memory {
            id: "m1".to_string(),
            kind: MemoryKind::Conversation,
            title: "洗澡时光".to_string(),
            content: "妈妈：该洗澡了".to_string(),
            date: "2022-03-30".to_string(),
            tags: vec!["家庭".to_string()],
            child_name: "哈哈".to_string(),
            age: "2岁".to_string(),
            context: None,
            image_url: None,
            created_at: "2022-03-30T00:00:00+00:00".to_string(),
            updated_at: "2022-03-30T00:00:00+00:00".to_string(),
        };
        let value = serde_json::to_value(&memory).unwrap();
        assert_eq!(value["type"], "conversation");
        assert_eq!(value["childName"], "哈哈");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("context").is_none());
    }

    #[test]
    fn test_create_request_defaults_to_conversation() {
        let req: CreateMemoryRequest =
            serde_json::from_str(r#"{"title":"t","content":"c"}"#).unwrap();
        assert_eq!(req.kind, MemoryKind::Conversation);
        assert!(req.tags.is_empty());
    }

    #[test]
    fn test_provider_names() {
        let p: EnrichmentProvider = serde_json::from_str(r#""claude""#).unwrap();
        assert_eq!(p, EnrichmentProvider::Claude);
        let p: EnrichmentProvider = serde_json::from_str(r#""openai""#).unwrap();
        assert_eq!(p.as_str(), "openai");
    }
}
