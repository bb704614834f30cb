//! Consumer-side composition: framed stream → think-block parser → throttled
//! renderer, the way a chat front end drives an answer.

use std::sync::Arc;
use std::time::Duration;

use passage_answer::cache::ReasoningCache;
use passage_answer::engine::AnswerEngine;
use passage_answer::render::{RenderSink, StreamRenderer};
use passage_answer::{StreamEvent, ThinkParser};
use passage_core::config::RetrievalConfig;
use passage_core::TenantId;
use passage_index::document::{Chunk, DocumentMetadata};
use passage_index::VectorIndex;
use passage_llm::hash::HashProvider;
use passage_llm::mock::MockProvider;
use tokio_stream::StreamExt;

#[derive(Debug, Default)]
struct Recorder {
    frames: Vec<String>,
}

impl RenderSink for Recorder {
    async fn render(&mut self, text: &str) -> anyhow::Result<()> {
        self.frames.push(text.to_owned());
        Ok(())
    }
}

async fn seeded_engine(
    dir: &std::path::Path,
    chat: MockProvider,
) -> (AnswerEngine<HashProvider, MockProvider>, TenantId) {
    let index = Arc::new(VectorIndex::new(dir, HashProvider::default()));
    let tenant = TenantId::new("acme").unwrap();
    index
        .add(
            &tenant,
            &[Chunk {
                text: "the project ships next week".into(),
                chunk_id: "c1".into(),
                metadata: DocumentMetadata {
                    source: "plan.txt".into(),
                    page: None,
                },
            }],
        )
        .await
        .unwrap();

    let engine = AnswerEngine::new(index, chat, RetrievalConfig {
        top_k: 3,
        snippet_window: 200,
    });
    (engine, tenant)
}

#[tokio::test]
async fn reasoning_is_hidden_and_cached_answer_is_rendered() {
    let dir = tempfile::tempdir().unwrap();
    let chat = MockProvider::with_fragments(vec![vec![
        "<think>".into(),
        "the user asks about timing".into(),
        "</think>".into(),
        "It ships ".into(),
        "next week.".into(),
    ]]);
    let (engine, tenant) = seeded_engine(dir.path(), chat).await;

    let mut stream = engine
        .answer_stream(&tenant, "when does it ship?", None)
        .await
        .unwrap();

    let mut parser = ThinkParser::new();
    let mut renderer = StreamRenderer::new(Recorder::default(), Duration::ZERO);
    let mut cache = ReasoningCache::new(16);
    let mut sources = Vec::new();

    while let Some(event) = stream.next().await {
        match event {
            StreamEvent::Context { sources: s } => sources = s,
            StreamEvent::Token { text } => {
                let visible = parser.push(&text);
                renderer.push(&visible).await.unwrap();
            }
            StreamEvent::Done { .. } | StreamEvent::Error { .. } => {
                renderer.finish().await.unwrap();
                break;
            }
        }
    }

    cache.insert("acme", "msg-1", parser.reasoning());

    assert_eq!(sources.len(), 1);
    assert_eq!(parser.answer(), "It ships next week.");
    assert_eq!(
        cache.get("acme", "msg-1"),
        Some("the user asks about timing")
    );

    let frames = renderer.into_sink().frames;
    assert_eq!(frames.last().map(String::as_str), Some("It ships next week."));
    // The reasoning never reached the display surface.
    for frame in &frames {
        assert!(!frame.contains("the user asks"));
    }
}

#[tokio::test]
async fn error_terminal_still_flushes_partial_answer() {
    let dir = tempfile::tempdir().unwrap();
    let chat = MockProvider::with_fragments(vec![vec!["partial ".into(), "answer".into()]])
        .with_stream_error_after(1);
    let (engine, tenant) = seeded_engine(dir.path(), chat).await;

    let mut stream = engine
        .answer_stream(&tenant, "question", None)
        .await
        .unwrap();

    let mut parser = ThinkParser::new();
    let mut renderer = StreamRenderer::new(Recorder::default(), Duration::from_secs(3600));
    let mut saw_error = false;

    while let Some(event) = stream.next().await {
        match event {
            StreamEvent::Context { .. } => {}
            StreamEvent::Token { text } => {
                let visible = parser.push(&text);
                renderer.push(&visible).await.unwrap();
            }
            StreamEvent::Error { .. } => {
                saw_error = true;
                renderer.finish().await.unwrap();
                break;
            }
            StreamEvent::Done { .. } => {
                renderer.finish().await.unwrap();
                break;
            }
        }
    }

    assert!(saw_error);
    let frames = renderer.into_sink().frames;
    assert_eq!(frames.last().map(String::as_str), Some("partial "));
}
