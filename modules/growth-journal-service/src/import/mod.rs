//! Smart import: pasted text -> segments -> titled, tagged previews.

pub mod ai_parse;
pub mod docx;
pub mod enrich;
pub mod recognizer;
pub mod segmenter;
pub mod tags;
pub mod title;

use enrich::Enricher;
use growth_journal_types::{ImportPreview, MemorySegment, DEFAULT_CONTEXT};

/// Title and tag each segment in order, one enrichment call at a time.
pub async fn build_previews(
    segments: Vec<MemorySegment>,
    enricher: &dyn Enricher,
) -> Result<Vec<ImportPreview>, String> {
    let mut previews = Vec::with_capacity(segments.len());
    for segment in segments {
        let enrichment = enricher.enrich(&segment).await?;
        let context = (segment.context != DEFAULT_CONTEXT).then_some(segment.context);
        previews.push(ImportPreview {
            title: enrichment.title,
            content: segment.content,
            date: segment.date,
            context,
            tags: enrichment.tags,
        });
    }
    Ok(previews)
}

#[cfg(test)]
mod tests {
    use super::enrich::{FallbackEnricher, LocalEnricher, RemoteEnricher};
    use super::segmenter::Segmenter;
    use super::*;
    use crate::ai::AiClient;
    use crate::config::ProviderConfig;
    use axum::http::StatusCode;
    use axum::routing::post;
    use chrono::NaiveDate;
    use growth_journal_types::EnrichmentProvider;
    use std::time::Duration;

    /// Bind a throwaway model endpoint and return its URL.
    async fn spawn_model_stub(status: StatusCode, body: &'static str) -> String {
        let app = axum::Router::new().route("/v1/chat", post(move || async move { (status, body) }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });
        format!("http://{}/v1/chat", addr)
    }

    fn remote(provider: EnrichmentProvider, endpoint: String) -> RemoteEnricher {
        let settings = ProviderConfig {
            api_key: Some("test-key".to_string()),
            endpoint: Some(endpoint),
            model: None,
        };
        RemoteEnricher::new(AiClient::from_config(provider, &settings, Duration::from_secs(5)).unwrap())
    }

    fn sample_segments() -> Vec<MemorySegment> {
        Segmenter::new(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()).segment(
            "2022.3.30\n洗澡时的对话\n妈妈：该洗澡了\n哈哈：好的\n2022.3.31\n哈哈：妈妈为什么天黑了？",
        )
    }

    #[tokio::test]
    async fn test_local_pipeline() {
        let previews = build_previews(sample_segments(), &LocalEnricher::new("哈哈"))
            .await
            .unwrap();
        assert_eq!(previews.len(), 2);
        assert_eq!(previews[0].title, "洗澡时的对话");
        assert_eq!(previews[0].context.as_deref(), Some("洗澡时的对话"));
        assert_eq!(previews[0].tags, vec!["家庭"]);
        assert_eq!(previews[1].title, "哈哈的对话");
        assert_eq!(previews[1].context, None);
        assert_eq!(previews[1].tags, vec!["家庭", "好奇"]);
    }

    #[tokio::test]
    async fn test_remote_non_200_keeps_count_and_local_values() {
        let endpoint = spawn_model_stub(StatusCode::INTERNAL_SERVER_ERROR, "upstream down").await;
        let enricher = FallbackEnricher::new(
            remote(EnrichmentProvider::OpenAi, endpoint),
            LocalEnricher::new("哈哈"),
        );
        let segments = sample_segments();
        let expected = build_previews(segments.clone(), &LocalEnricher::new("哈哈"))
            .await
            .unwrap();

        let previews = build_previews(segments, &enricher).await.unwrap();
        assert_eq!(previews, expected);
    }

    #[tokio::test]
    async fn test_remote_unparseable_answer_falls_back() {
        let body = r#"{"content": [{"type": "text", "text": "我无法给出标题"}]}"#;
        let endpoint = spawn_model_stub(StatusCode::OK, body).await;
        let enricher = FallbackEnricher::new(
            remote(EnrichmentProvider::Claude, endpoint),
            LocalEnricher::new("哈哈"),
        );
        let previews = build_previews(sample_segments(), &enricher).await.unwrap();
        assert_eq!(previews.len(), 2);
        assert_eq!(previews[0].title, "洗澡时的对话");
    }

    #[tokio::test]
    async fn test_remote_answer_overrides_title_and_tags() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": "{\"title\": \"远程标题\", \"tags\": [\"远程\"]}"}}]}"#;
        let endpoint = spawn_model_stub(StatusCode::OK, body).await;
        let enricher = FallbackEnricher::new(
            remote(EnrichmentProvider::OpenAi, endpoint),
            LocalEnricher::new("哈哈"),
        );
        let previews = build_previews(sample_segments(), &enricher).await.unwrap();
        assert!(previews.iter().all(|p| p.title == "远程标题"));
        assert!(previews.iter().all(|p| p.tags == vec!["远程".to_string()]));
        assert_eq!(previews[0].content, "妈妈：该洗澡了\n哈哈：好的");
    }

    #[tokio::test]
    async fn test_ai_parse_falls_back_on_error_status() {
        let endpoint = spawn_model_stub(StatusCode::BAD_GATEWAY, "").await;
        let settings = ProviderConfig {
            api_key: Some("test-key".to_string()),
            endpoint: Some(endpoint),
            model: None,
        };
        let client =
            AiClient::from_config(EnrichmentProvider::OpenAi, &settings, Duration::from_secs(5))
                .unwrap();
        let records =
            ai_parse::parse_with_ai(Some(&client), "妈妈：早\n\n哈哈：早", "2024-05-01").await;
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.tags == vec!["对话".to_string()]));
    }
}
