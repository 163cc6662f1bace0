//! Title/tag enrichment for segments.
//!
//! `LocalEnricher` runs the keyword tables, `RemoteEnricher` asks a hosted
//! model, and `FallbackEnricher` composes the two so a remote failure is
//! logged and replaced by the local answer.

use super::tags::generate_tags;
use super::title::synthesize_title;
use crate::ai::{AiClient, Message};
use async_trait::async_trait;
use growth_journal_types::MemorySegment;
use serde::Deserialize;

pub const ENRICH_SYSTEM_PROMPT: &str = "你是一个帮助家长整理孩子成长记录的助手。\
阅读用户提供的一段亲子对话，为它起一个不超过12个字的中文标题，\
并给出1到5个简短的中文标签。\
只返回JSON，格式为 {\"title\": \"标题\", \"tags\": [\"标签1\", \"标签2\"]}，不要输出其他内容。";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrichment {
    pub title: String,
    pub tags: Vec<String>,
}

#[async_trait]
pub trait Enricher: Send + Sync {
    fn name(&self) -> &str;

    async fn enrich(&self, segment: &MemorySegment) -> Result<Enrichment, String>;
}

// =====================================================
// Local
// =====================================================

pub struct LocalEnricher {
    child_name: String,
}

impl LocalEnricher {
    pub fn new(child_name: impl Into<String>) -> Self {
        Self {
            child_name: child_name.into(),
        }
    }

    pub fn enrich_segment(&self, segment: &MemorySegment) -> Enrichment {
        Enrichment {
            title: synthesize_title(&segment.content, Some(segment.context.as_str()), &self.child_name),
            tags: generate_tags(&segment.content),
        }
    }
}

#[async_trait]
impl Enricher for LocalEnricher {
    fn name(&self) -> &str {
        "local"
    }

    async fn enrich(&self, segment: &MemorySegment) -> Result<Enrichment, String> {
        Ok(self.enrich_segment(segment))
    }
}

// =====================================================
// Remote
// =====================================================

pub struct RemoteEnricher {
    client: AiClient,
}

impl RemoteEnricher {
    pub fn new(client: AiClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct RemoteAnswer {
    title: Option<String>,
    tags: Option<Vec<String>>,
}

#[async_trait]
impl Enricher for RemoteEnricher {
    fn name(&self) -> &str {
        self.client.provider().as_str()
    }

    async fn enrich(&self, segment: &MemorySegment) -> Result<Enrichment, String> {
        let answer = self
            .client
            .generate_text(vec![
                Message::system(ENRICH_SYSTEM_PROMPT),
                Message::user(segment.content.clone()),
            ])
            .await?;
        parse_enrichment(&answer)
    }
}

/// Pull `{title, tags}` out of a model answer. Code fences or prose around
/// the JSON object are tolerated.
pub fn parse_enrichment(answer: &str) -> Result<Enrichment, String> {
    let json = extract_json(answer, '{', '}')
        .ok_or_else(|| format!("No JSON object in model answer: {}", truncate(answer, 80)))?;
    let parsed: RemoteAnswer =
        serde_json::from_str(json).map_err(|e| format!("Invalid enrichment JSON: {}", e))?;

    let title = parsed
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or("Enrichment answer is missing a title")?;
    let tags = parsed
        .tags
        .ok_or("Enrichment answer is missing tags")?
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    Ok(Enrichment { title, tags })
}

/// Slice from the first `open` to the last `close`, inclusive.
pub fn extract_json(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

// =====================================================
// Fallback
// =====================================================

pub struct FallbackEnricher<P, F> {
    primary: P,
    fallback: F,
}

impl<P: Enricher, F: Enricher> FallbackEnricher<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl<P: Enricher, F: Enricher> Enricher for FallbackEnricher<P, F> {
    fn name(&self) -> &str {
        self.primary.name()
    }

    async fn enrich(&self, segment: &MemorySegment) -> Result<Enrichment, String> {
        match self.primary.enrich(segment).await {
            Ok(enrichment) => Ok(enrichment),
            Err(e) => {
                log::warn!(
                    "[IMPORT] {} enrichment failed, using {}: {}",
                    self.primary.name(),
                    self.fallback.name(),
                    e
                );
                self.fallback.enrich(segment).await
            }
        }
    }
}
