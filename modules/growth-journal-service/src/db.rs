//! SQLite database operations for the growth journal service.

use growth_journal_types::*;
use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Mutex, MutexGuard};

const DEFAULT_PAGE_SIZE: u32 = 20;
const MAX_PAGE_SIZE: u32 = 100;

const MEMORY_COLUMNS: &str = "id, kind, title, content, date, tags_json, child_name, age,
                              context, image_url, created_at, updated_at";
const TODO_COLUMNS: &str =
    "id, title, description, status, priority, due_date, created_at, updated_at";
const DAILY_TASK_COLUMNS: &str = "id, title, date, completed, created_at, updated_at";
const SCHEDULE_COLUMNS: &str =
    "id, weekday, start_time, end_time, subject, location, teacher, created_at, updated_at";

pub struct Db {
    conn: Mutex<Connection>,
}

/// Counts shown on the status endpoint and dashboard
#[derive(Debug, Default, Clone, Copy)]
pub struct MemoryStats {
    pub total: i64,
    pub conversations: i64,
    pub photos: i64,
}

/// Accumulates `WHERE` fragments with numbered parameters.
struct Conditions {
    clauses: Vec<String>,
    params: Vec<Box<dyn rusqlite::ToSql>>,
}

impl Conditions {
    fn new() -> Self {
        Self {
            clauses: vec!["1=1".to_string()],
            params: Vec::new(),
        }
    }

    fn next_idx(&self) -> usize {
        self.params.len() + 1
    }

    fn push(&mut self, clause: impl FnOnce(usize) -> String, param: Box<dyn rusqlite::ToSql>) {
        let idx = self.next_idx();
        self.clauses.push(clause(idx));
        self.params.push(param);
    }

    fn sql(&self) -> String {
        self.clauses.join(" AND ")
    }

    fn refs(&self) -> Vec<&dyn rusqlite::ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }
}

/// Builds `SET a = ?1, b = ?2` lists for partial updates.
struct Updates {
    sets: Vec<String>,
    params: Vec<Box<dyn rusqlite::ToSql>>,
}

impl Updates {
    fn new(updated_at: String) -> Self {
        Self {
            sets: vec!["updated_at = ?1".to_string()],
            params: vec![Box::new(updated_at)],
        }
    }

    fn set<T: rusqlite::ToSql + 'static>(&mut self, column: &str, value: Option<T>) {
        if let Some(v) = value {
            self.sets.push(format!("{} = ?{}", column, self.params.len() + 1));
            self.params.push(Box::new(v));
        }
    }

    fn execute(mut self, conn: &Connection, table: &str, id: &str) -> SqliteResult<bool> {
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            table,
            self.sets.join(", "),
            self.params.len() + 1
        );
        self.params.push(Box::new(id.to_string()));
        let refs: Vec<&dyn rusqlite::ToSql> = self.params.iter().map(|p| p.as_ref()).collect();
        Ok(conn.execute(&sql, refs.as_slice())? > 0)
    }
}

fn page_bounds(page: Option<u32>, limit: Option<u32>) -> (u32, u32) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    (page, limit)
}

/// `%term%` for a LIKE against `unicode_lower(...)`, with LIKE
/// metacharacters escaped.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// SQLite's own `LOWER` folds ASCII only; searches fold both sides with
/// Rust's Unicode lowercase instead.
fn register_functions(conn: &Connection) -> SqliteResult<()> {
    conn.create_scalar_function(
        "unicode_lower",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: Option<String> = ctx.get(0)?;
            Ok(text.map(|t| t.to_lowercase()))
        },
    )
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

impl Db {
    pub fn open(path: &str) -> SqliteResult<Self> {
        let conn = if path == ":memory:" {
            Connection::open_in_memory()?
        } else {
            Connection::open(path)?
        };
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        register_functions(&conn)?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.create_tables()?;
        Ok(db)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn create_tables(&self) -> SqliteResult<()> {
        let conn = self.conn();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS memories (
                id TEXT PRIMARY KEY,
                kind TEXT NOT NULL,
                title TEXT NOT NULL,
                content TEXT NOT NULL DEFAULT '',
                date TEXT NOT NULL,
                tags_json TEXT NOT NULL DEFAULT '[]',
                child_name TEXT NOT NULL DEFAULT '',
                age TEXT NOT NULL DEFAULT '',
                context TEXT,
                image_url TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_memories_date ON memories(date DESC, created_at DESC)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_memories_kind ON memories(kind)",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS todos (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                status TEXT NOT NULL DEFAULT 'pending',
                priority TEXT NOT NULL DEFAULT 'medium',
                due_date TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS daily_tasks (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                date TEXT NOT NULL,
                completed INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_daily_tasks_date ON daily_tasks(date)",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS schedule_entries (
                id TEXT PRIMARY KEY,
                weekday INTEGER NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                subject TEXT NOT NULL,
                location TEXT,
                teacher TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    // =====================================================
    // Memory Operations
    // =====================================================

    pub fn insert_memory(&self, memory: &Memory) -> SqliteResult<()> {
        let conn = self.conn();
        write_memory(&conn, "INSERT", memory)
    }

    /// Upsert a whole export document in one transaction
    pub fn restore_memories(&self, memories: &[Memory]) -> SqliteResult<usize> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        for memory in memories {
            write_memory(&tx, "INSERT OR REPLACE", memory)?;
        }
        tx.commit()?;
        Ok(memories.len())
    }

    pub fn get_memory(&self, id: &str) -> SqliteResult<Option<Memory>> {
        let conn = self.conn();
        get_memory_impl(&conn, id)
    }

    pub fn list_memories(&self, filter: &MemoryFilter) -> SqliteResult<Paginated<Memory>> {
        let conn = self.conn();
        let (page, limit) = page_bounds(filter.page, filter.limit);

        let mut conditions = Conditions::new();
        if let Some(kind) = filter.kind.as_deref().filter(|k| !k.is_empty()) {
            conditions.push(|i| format!("kind = ?{}", i), Box::new(kind.to_string()));
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            conditions.push(
                |i| {
                    format!(
                        "(unicode_lower(title) LIKE ?{i} ESCAPE '\\'
                          OR unicode_lower(content) LIKE ?{i} ESCAPE '\\'
                          OR EXISTS (SELECT 1 FROM json_each(memories.tags_json)
                                     WHERE unicode_lower(json_each.value) LIKE ?{i} ESCAPE '\\'))"
                    )
                },
                Box::new(like_pattern(search)),
            );
        }

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM memories WHERE {}", conditions.sql()),
            conditions.refs().as_slice(),
            |row| row.get(0),
        )?;

        let sql = format!(
            "SELECT {} FROM memories WHERE {}
             ORDER BY date DESC, created_at DESC
             LIMIT {} OFFSET {}",
            MEMORY_COLUMNS,
            conditions.sql(),
            limit,
            (page as u64 - 1) * limit as u64
        );
        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map(conditions.refs().as_slice(), row_to_memory)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(Paginated {
            items,
            pagination: Pagination::new(page, limit, total as u64),
        })
    }

    /// Every memory, oldest first, for export
    pub fn all_memories(&self) -> SqliteResult<Vec<Memory>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM memories ORDER BY date ASC, created_at ASC",
            MEMORY_COLUMNS
        ))?;
        let items = stmt
            .query_map([], row_to_memory)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(items)
    }

    /// Apply the provided fields. Returns the stored row, or `None` if the id is unknown.
    pub fn update_memory(
        &self,
        id: &str,
        req: &UpdateMemoryRequest,
    ) -> SqliteResult<Option<Memory>> {
        let conn = self.conn();
        let tags_json = req
            .tags
            .as_ref()
            .map(|t| serde_json::to_string(t).unwrap_or_else(|_| "[]".to_string()));

        let mut updates = Updates::new(now());
        updates.set("title", req.title.clone());
        updates.set("content", req.content.clone());
        updates.set("date", req.date.clone());
        updates.set("tags_json", tags_json);
        updates.set("child_name", req.child_name.clone());
        updates.set("age", req.age.clone());
        updates.set("context", req.context.clone());
        updates.set("image_url", req.image_url.clone());

        if !updates.execute(&conn, "memories", id)? {
            return Ok(None);
        }
        get_memory_impl(&conn, id)
    }

    pub fn delete_memory(&self, id: &str) -> SqliteResult<bool> {
        let conn = self.conn();
        let rows = conn.execute("DELETE FROM memories WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    pub fn delete_memories_of_kind(&self, kind: MemoryKind) -> SqliteResult<usize> {
        let conn = self.conn();
        conn.execute("DELETE FROM memories WHERE kind = ?1", [kind.as_str()])
    }

    pub fn delete_all_memories(&self) -> SqliteResult<usize> {
        let conn = self.conn();
        conn.execute("DELETE FROM memories", [])
    }

    pub fn memory_stats(&self) -> SqliteResult<MemoryStats> {
        let conn = self.conn();
        let count = |kind: Option<&str>| -> SqliteResult<i64> {
            match kind {
                Some(k) => conn.query_row(
                    "SELECT COUNT(*) FROM memories WHERE kind = ?1",
                    [k],
                    |row| row.get(0),
                ),
                None => conn.query_row("SELECT COUNT(*) FROM memories", [], |row| row.get(0)),
            }
        };
        Ok(MemoryStats {
            total: count(None)?,
            conversations: count(Some(MemoryKind::Conversation.as_str()))?,
            photos: count(Some(MemoryKind::Photo.as_str()))?,
        })
    }

    // =====================================================
    // Todo Operations
    // =====================================================

    pub fn insert_todo(&self, todo: &Todo) -> SqliteResult<()> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO todos (id, title, description, status, priority, due_date, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                todo.id,
                todo.title,
                todo.description,
                todo.status.as_str(),
                todo.priority.as_str(),
                todo.due_date,
                todo.created_at,
                todo.updated_at
            ],
        )?;
        Ok(())
    }

    pub fn get_todo(&self, id: &str) -> SqliteResult<Option<Todo>> {
        let conn = self.conn();
        get_todo_impl(&conn, id)
    }

    pub fn list_todos(&self, filter: &TodoFilter) -> SqliteResult<Paginated<Todo>> {
        let conn = self.conn();
        let (page, limit) = page_bounds(filter.page, filter.limit);

        let mut conditions = Conditions::new();
        if let Some(status) = filter.status.as_deref().filter(|s| !s.is_empty()) {
            conditions.push(|i| format!("status = ?{}", i), Box::new(status.to_string()));
        }
        if let Some(priority) = filter.priority.as_deref().filter(|p| !p.is_empty()) {
            conditions.push(|i| format!("priority = ?{}", i), Box::new(priority.to_string()));
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            conditions.push(
                |i| {
                    format!(
                        "(unicode_lower(title) LIKE ?{i} ESCAPE '\\' OR unicode_lower(description) LIKE ?{i} ESCAPE '\\')"
                    )
                },
                Box::new(like_pattern(search)),
            );
        }

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM todos WHERE {}", conditions.sql()),
            conditions.refs().as_slice(),
            |row| row.get(0),
        )?;

        // Open work first, then by priority
        let sql = format!(
            "SELECT {} FROM todos WHERE {}
             ORDER BY CASE status WHEN 'completed' THEN 1 ELSE 0 END,
                      CASE priority WHEN 'high' THEN 0 WHEN 'medium' THEN 1 ELSE 2 END,
                      created_at DESC
             LIMIT {} OFFSET {}",
            TODO_COLUMNS,
            conditions.sql(),
            limit,
            (page as u64 - 1) * limit as u64
        );
        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map(conditions.refs().as_slice(), row_to_todo)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(Paginated {
            items,
            pagination: Pagination::new(page, limit, total as u64),
        })
    }

    pub fn update_todo(&self, id: &str, req: &UpdateTodoRequest) -> SqliteResult<Option<Todo>> {
        let conn = self.conn();
        let mut updates = Updates::new(now());
        updates.set("title", req.title.clone());
        updates.set("description", req.description.clone());
        updates.set("status", req.status.map(|s| s.as_str()));
        updates.set("priority", req.priority.map(|p| p.as_str()));
        updates.set("due_date", req.due_date.clone());

        if !updates.execute(&conn, "todos", id)? {
            return Ok(None);
        }
        get_todo_impl(&conn, id)
    }

    pub fn delete_todo(&self, id: &str) -> SqliteResult<bool> {
        let conn = self.conn();
        let rows = conn.execute("DELETE FROM todos WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    pub fn count_open_todos(&self) -> SqliteResult<i64> {
        let conn = self.conn();
        conn.query_row(
            "SELECT COUNT(*) FROM todos WHERE status != 'completed'",
            [],
            |row| row.get(0),
        )
    }

    // =====================================================
    // Daily Task Operations
    // =====================================================

    pub fn insert_daily_task(&self, task: &DailyTask) -> SqliteResult<()> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO daily_tasks (id, title, date, completed, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                task.id,
                task.title,
                task.date,
                task.completed,
                task.created_at,
                task.updated_at
            ],
        )?;
        Ok(())
    }

    pub fn get_daily_task(&self, id: &str) -> SqliteResult<Option<DailyTask>> {
        let conn = self.conn();
        get_daily_task_impl(&conn, id)
    }

    pub fn list_daily_tasks(&self, date: Option<&str>) -> SqliteResult<Vec<DailyTask>> {
        let conn = self.conn();
        let items = match date {
            Some(d) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM daily_tasks WHERE date = ?1 ORDER BY created_at ASC",
                    DAILY_TASK_COLUMNS
                ))?;
                stmt.query_map([d], row_to_daily_task)?
                    .collect::<SqliteResult<Vec<_>>>()?
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM daily_tasks ORDER BY date DESC, created_at ASC",
                    DAILY_TASK_COLUMNS
                ))?;
                stmt.query_map([], row_to_daily_task)?
                    .collect::<SqliteResult<Vec<_>>>()?
            }
        };
        Ok(items)
    }

    pub fn update_daily_task(
        &self,
        id: &str,
        req: &UpdateDailyTaskRequest,
    ) -> SqliteResult<Option<DailyTask>> {
        let conn = self.conn();
        let mut updates = Updates::new(now());
        updates.set("title", req.title.clone());
        updates.set("date", req.date.clone());
        updates.set("completed", req.completed);

        if !updates.execute(&conn, "daily_tasks", id)? {
            return Ok(None);
        }
        get_daily_task_impl(&conn, id)
    }

    pub fn toggle_daily_task(&self, id: &str) -> SqliteResult<Option<DailyTask>> {
        let conn = self.conn();
        let rows = conn.execute(
            "UPDATE daily_tasks SET completed = 1 - completed, updated_at = ?1 WHERE id = ?2",
            rusqlite::params![now(), id],
        )?;
        if rows == 0 {
            return Ok(None);
        }
        get_daily_task_impl(&conn, id)
    }

    pub fn delete_daily_task(&self, id: &str) -> SqliteResult<bool> {
        let conn = self.conn();
        let rows = conn.execute("DELETE FROM daily_tasks WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    // =====================================================
    // Schedule Operations
    // =====================================================

    pub fn insert_schedule_entry(&self, entry: &ScheduleEntry) -> SqliteResult<()> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO schedule_entries (id, weekday, start_time, end_time, subject, location,
                                           teacher, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            rusqlite::params![
                entry.id,
                entry.weekday,
                entry.start_time,
                entry.end_time,
                entry.subject,
                entry.location,
                entry.teacher,
                entry.created_at,
                entry.updated_at
            ],
        )?;
        Ok(())
    }

    pub fn get_schedule_entry(&self, id: &str) -> SqliteResult<Option<ScheduleEntry>> {
        let conn = self.conn();
        get_schedule_entry_impl(&conn, id)
    }

    pub fn list_schedule(&self) -> SqliteResult<Vec<ScheduleEntry>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM schedule_entries ORDER BY weekday ASC, start_time ASC",
            SCHEDULE_COLUMNS
        ))?;
        let items = stmt
            .query_map([], row_to_schedule_entry)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(items)
    }

    pub fn update_schedule_entry(
        &self,
        id: &str,
        req: &UpdateScheduleEntryRequest,
    ) -> SqliteResult<Option<ScheduleEntry>> {
        let conn = self.conn();
        let mut updates = Updates::new(now());
        updates.set("weekday", req.weekday);
        updates.set("start_time", req.start_time.clone());
        updates.set("end_time", req.end_time.clone());
        updates.set("subject", req.subject.clone());
        updates.set("location", req.location.clone());
        updates.set("teacher", req.teacher.clone());

        if !updates.execute(&conn, "schedule_entries", id)? {
            return Ok(None);
        }
        get_schedule_entry_impl(&conn, id)
    }

    pub fn delete_schedule_entry(&self, id: &str) -> SqliteResult<bool> {
        let conn = self.conn();
        let rows = conn.execute("DELETE FROM schedule_entries WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

fn write_memory(conn: &Connection, verb: &str, memory: &Memory) -> SqliteResult<()> {
    let tags_json = serde_json::to_string(&memory.tags).unwrap_or_else(|_| "[]".to_string());
    conn.execute(
        &format!(
            "{} INTO memories ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            verb, MEMORY_COLUMNS
        ),
        rusqlite::params![
            memory.id,
            memory.kind.as_str(),
            memory.title,
            memory.content,
            memory.date,
            tags_json,
            memory.child_name,
            memory.age,
            memory.context,
            memory.image_url,
            memory.created_at,
            memory.updated_at
        ],
    )?;
    Ok(())
}

fn get_memory_impl(conn: &Connection, id: &str) -> SqliteResult<Option<Memory>> {
    conn.query_row(
        &format!("SELECT {} FROM memories WHERE id = ?1", MEMORY_COLUMNS),
        [id],
        row_to_memory,
    )
    .optional()
}

fn get_todo_impl(conn: &Connection, id: &str) -> SqliteResult<Option<Todo>> {
    conn.query_row(
        &format!("SELECT {} FROM todos WHERE id = ?1", TODO_COLUMNS),
        [id],
        row_to_todo,
    )
    .optional()
}

fn get_daily_task_impl(conn: &Connection, id: &str) -> SqliteResult<Option<DailyTask>> {
    conn.query_row(
        &format!("SELECT {} FROM daily_tasks WHERE id = ?1", DAILY_TASK_COLUMNS),
        [id],
        row_to_daily_task,
    )
    .optional()
}

fn get_schedule_entry_impl(conn: &Connection, id: &str) -> SqliteResult<Option<ScheduleEntry>> {
    conn.query_row(
        &format!("SELECT {} FROM schedule_entries WHERE id = ?1", SCHEDULE_COLUMNS),
        [id],
        row_to_schedule_entry,
    )
    .optional()
}

fn invalid_text(idx: usize, value: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        rusqlite::types::Type::Text,
        format!("unexpected value {:?}", value).into(),
    )
}

fn row_to_memory(row: &rusqlite::Row) -> SqliteResult<Memory> {
    let kind: String = row.get(1)?;
    let tags_json: String = row.get(5)?;
    Ok(Memory {
        id: row.get(0)?,
        kind: MemoryKind::parse(&kind).ok_or_else(|| invalid_text(1, kind))?,
        title: row.get(2)?,
        content: row.get(3)?,
        date: row.get(4)?,
        tags: serde_json::from_str(&tags_json).unwrap_or_default(),
        child_name: row.get(6)?,
        age: row.get(7)?,
        context: row.get(8)?,
        image_url: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

fn row_to_todo(row: &rusqlite::Row) -> SqliteResult<Todo> {
    let status: String = row.get(3)?;
    let priority: String = row.get(4)?;
    Ok(Todo {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status: TodoStatus::parse(&status).ok_or_else(|| invalid_text(3, status))?,
        priority: TodoPriority::parse(&priority).ok_or_else(|| invalid_text(4, priority))?,
        due_date: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn row_to_daily_task(row: &rusqlite::Row) -> SqliteResult<DailyTask> {
    Ok(DailyTask {
        id: row.get(0)?,
        title: row.get(1)?,
        date: row.get(2)?,
        completed: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn row_to_schedule_entry(row: &rusqlite::Row) -> SqliteResult<ScheduleEntry> {
    Ok(ScheduleEntry {
        id: row.get(0)?,
        weekday: row.get(1)?,
        start_time: row.get(2)?,
        end_time: row.get(3)?,
        subject: row.get(4)?,
        location: row.get(5)?,
        teacher: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory(id: &str, kind: MemoryKind, title: &str, content: &str, date: &str) -> Memory {
        Memory {
            id: id.to_string(),
            kind,
            title: title.to_string(),
            content: content.to_string(),
            date: date.to_string(),
            tags: vec!["家庭".to_string(), "Bath".to_string()],
            child_name: "哈哈".to_string(),
            age: "2岁".to_string(),
            context: None,
            image_url: None,
            created_at: "2022-03-30T08:00:00+00:00".to_string(),
            updated_at: "2022-03-30T08:00:00+00:00".to_string(),
        }
    }

    fn seeded() -> Db {
        let db = Db::open(":memory:").unwrap();
        db.insert_memory(&memory("a", MemoryKind::Conversation, "洗澡时光", "妈妈：该洗澡了", "2022-03-30"))
            .unwrap();
        db.insert_memory(&memory("b", MemoryKind::Conversation, "Meal Time", "哈哈：我饿了", "2022-04-01"))
            .unwrap();
        db.insert_memory(&memory("c", MemoryKind::Photo, "公园", "", "2022-04-02"))
            .unwrap();
        db
    }

    #[test]
    fn test_insert_and_get_memory() {
        let db = seeded();
        let m = db.get_memory("a").unwrap().unwrap();
        assert_eq!(m.title, "洗澡时光");
        assert_eq!(m.tags, vec!["家庭", "Bath"]);
        assert!(db.get_memory("missing").unwrap().is_none());
    }

    #[test]
    fn test_list_memories_newest_first_with_pagination() {
        let db = seeded();
        let page = db
            .list_memories(&MemoryFilter {
                page: Some(1),
                limit: Some(2),
                ..Default::default()
            })
            .unwrap();
        let ids: Vec<&str> = page.items.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b"]);
        assert_eq!(page.pagination.total, 3);
        assert_eq!(page.pagination.total_pages, 2);
        assert!(page.pagination.has_more);

        let page2 = db
            .list_memories(&MemoryFilter {
                page: Some(2),
                limit: Some(2),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(page2.items.len(), 1);
        assert!(!page2.pagination.has_more);
    }

    #[test]
    fn test_list_memories_filters() {
        let db = seeded();
        let photos = db
            .list_memories(&MemoryFilter {
                kind: Some("photo".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(photos.pagination.total, 1);

        let search = db
            .list_memories(&MemoryFilter {
                search: Some("meal".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(search.items.len(), 1);
        assert_eq!(search.items[0].id, "b");

        let by_tag = db
            .list_memories(&MemoryFilter {
                search: Some("bath".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(by_tag.pagination.total, 3);

        let by_content = db
            .list_memories(&MemoryFilter {
                search: Some("洗澡".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(by_content.items[0].id, "a");

        let literal_percent = db
            .list_memories(&MemoryFilter {
                search: Some("%".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(literal_percent.pagination.total, 0);
    }

    fn search_total(db: &Db, term: &str) -> u64 {
        db.list_memories(&MemoryFilter {
            search: Some(term.to_string()),
            ..Default::default()
        })
        .unwrap()
        .pagination
        .total
    }

    #[test]
    fn test_search_matches_tag_values_not_json() {
        let db = Db::open(":memory:").unwrap();
        let mut untagged = memory("u", MemoryKind::Conversation, "早安", "哈哈：早", "2022-03-30");
        untagged.tags = Vec::new();
        db.insert_memory(&untagged).unwrap();
        let mut tagged = memory("t", MemoryKind::Conversation, "晚安", "哈哈：晚安", "2022-03-31");
        tagged.tags = vec!["家庭".to_string(), "好奇".to_string()];
        db.insert_memory(&tagged).unwrap();

        for term in ["[", "]", "\"", ","] {
            assert_eq!(search_total(&db, term), 0, "term {:?}", term);
        }
        assert_eq!(search_total(&db, "好奇"), 1);
        assert_eq!(search_total(&db, "家"), 1);
    }

    #[test]
    fn test_search_folds_non_ascii_case() {
        let db = Db::open(":memory:").unwrap();
        let mut trip = memory("e", MemoryKind::Photo, "École trip", "", "2022-05-01");
        trip.tags = vec!["Ünterwegs".to_string()];
        db.insert_memory(&trip).unwrap();

        assert_eq!(search_total(&db, "École"), 1);
        assert_eq!(search_total(&db, "école"), 1);
        assert_eq!(search_total(&db, "ÉCOLE"), 1);
        assert_eq!(search_total(&db, "ünterwegs"), 1);
    }

    #[test]
    fn test_update_memory() {
        let db = seeded();
        let updated = db
            .update_memory(
                "a",
                &UpdateMemoryRequest {
                    title: Some("新标题".to_string()),
                    tags: Some(vec!["睡眠".to_string()]),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "新标题");
        assert_eq!(updated.tags, vec!["睡眠"]);
        assert_eq!(updated.content, "妈妈：该洗澡了");
        assert_ne!(updated.updated_at, updated.created_at);

        assert!(db
            .update_memory("missing", &UpdateMemoryRequest::default())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_bulk_deletes() {
        let db = seeded();
        assert_eq!(db.delete_memories_of_kind(MemoryKind::Conversation).unwrap(), 2);
        let stats = db.memory_stats().unwrap();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.photos, 1);
        assert_eq!(db.delete_all_memories().unwrap(), 1);
        assert!(!db.delete_memory("c").unwrap());
    }

    #[test]
    fn test_export_restore_is_identical() {
        let db = seeded();
        let exported = db.all_memories().unwrap();

        let other = Db::open(":memory:").unwrap();
        assert_eq!(other.restore_memories(&exported).unwrap(), 3);
        assert_eq!(other.all_memories().unwrap(), exported);

        // Restoring over existing rows replaces rather than duplicates
        assert_eq!(other.restore_memories(&exported).unwrap(), 3);
        assert_eq!(other.memory_stats().unwrap().total, 3);
    }

    #[test]
    fn test_todos_crud_and_filters() {
        let db = Db::open(":memory:").unwrap();
        for (id, status, priority) in [
            ("t1", TodoStatus::Pending, TodoPriority::Low),
            ("t2", TodoStatus::Completed, TodoPriority::High),
            ("t3", TodoStatus::InProgress, TodoPriority::High),
        ] {
            db.insert_todo(&Todo {
                id: id.to_string(),
                title: format!("Todo {}", id),
                description: String::new(),
                status,
                priority,
                due_date: None,
                created_at: now(),
                updated_at: now(),
            })
            .unwrap();
        }

        let all = db.list_todos(&TodoFilter::default()).unwrap();
        let ids: Vec<&str> = all.items.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t3", "t1", "t2"]);

        let high = db
            .list_todos(&TodoFilter {
                priority: Some("high".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(high.pagination.total, 2);

        let searched = db
            .list_todos(&TodoFilter {
                search: Some("TODO T1".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(searched.items.len(), 1);

        assert_eq!(db.count_open_todos().unwrap(), 2);

        let done = db
            .update_todo(
                "t1",
                &UpdateTodoRequest {
                    status: Some(TodoStatus::Completed),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(done.status, TodoStatus::Completed);
        assert_eq!(db.count_open_todos().unwrap(), 1);

        assert!(db.delete_todo("t1").unwrap());
        assert!(db.get_todo("t1").unwrap().is_none());
    }

    #[test]
    fn test_daily_task_toggle() {
        let db = Db::open(":memory:").unwrap();
        db.insert_daily_task(&DailyTask {
            id: "d1".to_string(),
            title: "读绘本".to_string(),
            date: "2024-05-01".to_string(),
            completed: false,
            created_at: now(),
            updated_at: now(),
        })
        .unwrap();

        assert!(db.toggle_daily_task("d1").unwrap().unwrap().completed);
        assert!(!db.toggle_daily_task("d1").unwrap().unwrap().completed);
        assert!(db.toggle_daily_task("nope").unwrap().is_none());

        assert_eq!(db.list_daily_tasks(Some("2024-05-01")).unwrap().len(), 1);
        assert!(db.list_daily_tasks(Some("2024-05-02")).unwrap().is_empty());
    }

    #[test]
    fn test_schedule_ordering() {
        let db = Db::open(":memory:").unwrap();
        for (id, weekday, start) in [("s1", 3, "09:00"), ("s2", 1, "10:00"), ("s3", 1, "08:30")] {
            db.insert_schedule_entry(&ScheduleEntry {
                id: id.to_string(),
                weekday,
                start_time: start.to_string(),
                end_time: "11:00".to_string(),
                subject: "美术".to_string(),
                location: None,
                teacher: None,
                created_at: now(),
                updated_at: now(),
            })
            .unwrap();
        }
        let ids: Vec<String> = db.list_schedule().unwrap().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["s3", "s2", "s1"]);

        let moved = db
            .update_schedule_entry(
                "s1",
                &UpdateScheduleEntryRequest {
                    weekday: Some(7),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(moved.weekday, 7);
    }
}
