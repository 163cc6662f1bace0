//! Dashboard HTML page handler.
//!
//! A read-only overview: memory counts, recent memories, open todos,
//! today's daily tasks and the weekly class schedule.

use crate::routes::AppState;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use growth_journal_types::{MemoryFilter, ScheduleEntry, TodoFilter, TodoStatus};
use std::sync::Arc;

const RECENT_MEMORIES: u32 = 10;
const PREVIEW_CHARS: usize = 80;
const WEEKDAYS: [&str; 7] = ["周一", "周二", "周三", "周四", "周五", "周六", "周日"];

pub async fn dashboard(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let stats = state.db.memory_stats().unwrap_or_default();
    let open_todos = state.db.count_open_todos().unwrap_or(0);
    let recent = state
        .db
        .list_memories(&MemoryFilter {
            limit: Some(RECENT_MEMORIES),
            ..Default::default()
        })
        .map(|p| p.items)
        .unwrap_or_default();
    let todos = state
        .db
        .list_todos(&TodoFilter {
            limit: Some(20),
            ..Default::default()
        })
        .map(|p| p.items)
        .unwrap_or_default();
    let today = chrono::Local::now().date_naive().format("%Y-%m-%d").to_string();
    let tasks = state.db.list_daily_tasks(Some(&today)).unwrap_or_default();
    let schedule = state.db.list_schedule().unwrap_or_default();

    let mut memory_rows = String::new();
    for m in &recent {
        let preview: String = m.content.chars().take(PREVIEW_CHARS).collect();
        let ellipsis = if m.content.chars().count() > PREVIEW_CHARS { "…" } else { "" };
        memory_rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td class=\"pre\">{}{}</td><td>{}</td></tr>\n",
            m.date,
            escape_html(&m.title),
            escape_html(&m.age),
            escape_html(&preview),
            ellipsis,
            escape_html(&m.tags.join("、")),
        ));
    }
    if memory_rows.is_empty() {
        memory_rows = "<tr><td colspan=\"5\">还没有记录</td></tr>".to_string();
    }

    let mut todo_rows = String::new();
    for t in todos.iter().filter(|t| t.status != TodoStatus::Completed) {
        todo_rows.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            t.priority.as_str(),
            escape_html(&t.title),
            t.status.as_str(),
            t.due_date.as_deref().unwrap_or("-"),
        ));
    }
    if todo_rows.is_empty() {
        todo_rows = "<tr><td colspan=\"3\">没有待办事项</td></tr>".to_string();
    }

    let mut task_items = String::new();
    for t in &tasks {
        task_items.push_str(&format!(
            "<li class=\"{}\">{}</li>\n",
            if t.completed { "done" } else { "open" },
            escape_html(&t.title)
        ));
    }
    if task_items.is_empty() {
        task_items = "<li>今天没有任务</li>".to_string();
    }

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="zh-CN">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>成长记录</title>
<style>
  body {{ font-family: -apple-system, 'PingFang SC', 'Microsoft YaHei', sans-serif; background: #fdf8f2; color: #3d3a36; margin: 0; padding: 24px; }}
  h1 {{ color: #d9734e; margin: 0 0 6px; }}
  h2 {{ font-size: 1.05em; margin: 0 0 10px; color: #6b5e4f; }}
  .meta {{ color: #9a8d7d; font-size: 0.85em; margin-bottom: 20px; }}
  .stats {{ display: flex; gap: 14px; flex-wrap: wrap; margin-bottom: 24px; }}
  .stat {{ background: #fff; border: 1px solid #efe4d6; border-radius: 10px; padding: 14px 22px; min-width: 110px; text-align: center; }}
  .stat b {{ display: block; font-size: 1.8em; color: #d9734e; }}
  .stat span {{ font-size: 0.85em; color: #9a8d7d; }}
  .section {{ margin-bottom: 26px; }}
  table {{ width: 100%; border-collapse: collapse; background: #fff; }}
  th, td {{ padding: 7px 10px; border-bottom: 1px solid #f1e9de; text-align: left; font-size: 0.9em; vertical-align: top; }}
  th {{ color: #9a8d7d; font-weight: normal; }}
  td.pre {{ white-space: pre-wrap; }}
  tr.high td:first-child {{ border-left: 3px solid #d9534f; }}
  tr.medium td:first-child {{ border-left: 3px solid #f0ad4e; }}
  tr.low td:first-child {{ border-left: 3px solid #8fbf7f; }}
  li.done {{ text-decoration: line-through; color: #9a8d7d; }}
</style>
</head>
<body>
  <h1>{child}的成长记录</h1>
  <p class="meta">运行时间 {uptime} &middot; 今天 {today}</p>

  <div class="stats">
    <div class="stat"><b>{total}</b><span>全部记录</span></div>
    <div class="stat"><b>{conversations}</b><span>对话</span></div>
    <div class="stat"><b>{photos}</b><span>照片</span></div>
    <div class="stat"><b>{open_todos}</b><span>待办</span></div>
  </div>

  <div class="section">
    <h2>最近的记录</h2>
    <table>
      <thead><tr><th>日期</th><th>标题</th><th>年龄</th><th>内容</th><th>标签</th></tr></thead>
      <tbody>{memory_rows}</tbody>
    </table>
  </div>

  <div class="section">
    <h2>待办事项</h2>
    <table>
      <thead><tr><th>事项</th><th>状态</th><th>截止</th></tr></thead>
      <tbody>{todo_rows}</tbody>
    </table>
  </div>

  <div class="section">
    <h2>今日任务</h2>
    <ul>{task_items}</ul>
  </div>

  <div class="section">
    <h2>课程表</h2>
    <table>
      <thead><tr><th>星期</th><th>时间</th><th>课程</th><th>地点</th><th>老师</th></tr></thead>
      <tbody>{schedule_rows}</tbody>
    </table>
  </div>
</body>
</html>"#,
        child = escape_html(&state.config.child_name),
        uptime = format_uptime(state.start_time.elapsed().as_secs()),
        today = today,
        total = stats.total,
        conversations = stats.conversations,
        photos = stats.photos,
        open_todos = open_todos,
        memory_rows = memory_rows,
        todo_rows = todo_rows,
        task_items = task_items,
        schedule_rows = schedule_rows(&schedule),
    );

    ([(header::CONTENT_TYPE, "text/html; charset=utf-8")], html)
}

fn schedule_rows(entries: &[ScheduleEntry]) -> String {
    if entries.is_empty() {
        return "<tr><td colspan=\"5\">还没有课程</td></tr>".to_string();
    }
    entries
        .iter()
        .map(|e| {
            let day = WEEKDAYS
                .get(usize::from(e.weekday).saturating_sub(1))
                .copied()
                .unwrap_or("?");
            format!(
                "<tr><td>{}</td><td>{}-{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                day,
                e.start_time,
                e.end_time,
                escape_html(&e.subject),
                escape_html(e.location.as_deref().unwrap_or("-")),
                escape_html(e.teacher.as_deref().unwrap_or("-")),
            )
        })
        .collect()
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn format_uptime(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    if hours > 0 {
        format!("{}小时{}分", hours, minutes)
    } else if minutes > 0 {
        format!("{}分{}秒", minutes, secs % 60)
    } else {
        format!("{}秒", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>\"哈哈\" & 妈妈</b>"), "&lt;b&gt;&quot;哈哈&quot; &amp; 妈妈&lt;/b&gt;");
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(42), "42秒");
        assert_eq!(format_uptime(125), "2分5秒");
        assert_eq!(format_uptime(7260), "2小时1分");
    }
}
