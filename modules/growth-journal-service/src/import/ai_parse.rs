//! Whole-text parsing by a hosted model, with a per-line fallback.

use super::enrich::extract_json;
use super::recognizer::parse_date_prefix;
use crate::ai::{AiClient, Message};
use growth_journal_types::ImportPreview;
use serde::Deserialize;

pub const PARSE_SYSTEM_PROMPT: &str = "你是一个帮助家长整理孩子成长记录的助手。\
用户会粘贴一段包含多次亲子对话的文本。请把它拆分成若干条独立的记录，\
保留原文内容和换行，不要改写。每条记录包含 title（不超过12个字的中文标题）、\
content（原文）、date（YYYY-MM-DD，文本中没有日期时省略）和 tags（1到5个中文标签）。\
只返回JSON数组，例如 [{\"title\": \"标题\", \"content\": \"原文\", \"date\": \"2022-03-30\", \"tags\": [\"标签\"]}]，不要输出其他内容。";

/// Tags given to every record produced by the per-line fallback
pub const FALLBACK_TAGS: &[&str] = &["对话"];

const FALLBACK_TITLE_CHARS: usize = 20;

#[derive(Debug, Deserialize)]
struct ParsedRecord {
    title: Option<String>,
    content: Option<String>,
    date: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

/// Ask the model to split `text` into records. Without a client, or on any
/// failure, every non-blank line becomes one record instead.
pub async fn parse_with_ai(client: Option<&AiClient>, text: &str, today: &str) -> Vec<ImportPreview> {
    let Some(client) = client else {
        return split_lines(text, today);
    };

    let result = client
        .generate_text(vec![
            Message::system(PARSE_SYSTEM_PROMPT),
            Message::user(text.to_string()),
        ])
        .await
        .and_then(|answer| parse_records(&answer, today));

    match result {
        Ok(records) => records,
        Err(e) => {
            log::warn!(
                "[IMPORT] {} parse failed, splitting per line: {}",
                client.provider().as_str(),
                e
            );
            split_lines(text, today)
        }
    }
}

pub fn parse_records(answer: &str, today: &str) -> Result<Vec<ImportPreview>, String> {
    let json = extract_json(answer, '[', ']').ok_or("No JSON array in model answer")?;
    let parsed: Vec<ParsedRecord> =
        serde_json::from_str(json).map_err(|e| format!("Invalid parse JSON: {}", e))?;

    let records: Vec<ImportPreview> = parsed
        .into_iter()
        .filter_map(|r| {
            let content = r.content.filter(|c| !c.trim().is_empty())?;
            let title = r
                .title
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| fallback_title(&content));
            let date = r
                .date
                .as_deref()
                .and_then(|d| parse_date_prefix(d.trim()))
                .unwrap_or_else(|| today.to_string());
            Some(ImportPreview {
                title,
                content,
                date,
                context: None,
                tags: r.tags,
            })
        })
        .collect();

    if records.is_empty() {
        return Err("Model answer contained no records".to_string());
    }
    Ok(records)
}

/// One record per non-blank line, placeholder tags, dated `today`.
pub fn split_lines(text: &str, today: &str) -> Vec<ImportPreview> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|line| ImportPreview {
            title: fallback_title(line),
            content: line.to_string(),
            date: today.to_string(),
            context: None,
            tags: FALLBACK_TAGS.iter().map(|t| t.to_string()).collect(),
        })
        .collect()
}

fn fallback_title(content: &str) -> String {
    let first_line = content.lines().next().unwrap_or("").trim();
    first_line.chars().take(FALLBACK_TITLE_CHARS).collect()
}
