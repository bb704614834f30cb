//! Prompt assembly and the framed answer stream.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use passage_core::TenantId;
use passage_core::config::RetrievalConfig;
use passage_index::retrieval::search_previews;
use passage_index::store::VectorIndex;
use passage_index::SourcePreview;
use passage_llm::provider::{ChatStream, Message, Role};
use passage_llm::LlmProvider;
use tokio_stream::StreamExt;

use crate::error::AnswerError;
use crate::event::StreamEvent;

/// Buffered question-answering result.
#[derive(Debug, Clone)]
pub struct Answer {
    pub answer: String,
    pub sources: Vec<SourcePreview>,
}

/// Ordered stream of protocol frames; see [`StreamEvent`] for the contract.
pub type EventStream = Pin<Box<dyn Stream<Item = StreamEvent> + Send>>;

/// Answers questions over one tenant's collection: retrieve, assemble the
/// prompt, call the chat backend, frame the reply.
pub struct AnswerEngine<E, C> {
    index: Arc<VectorIndex<E>>,
    chat: C,
    retrieval: RetrievalConfig,
}

impl<E: LlmProvider, C: LlmProvider> AnswerEngine<E, C> {
    #[must_use]
    pub fn new(index: Arc<VectorIndex<E>>, chat: C, retrieval: RetrievalConfig) -> Self {
        Self {
            index,
            chat,
            retrieval,
        }
    }

    /// Buffered variant: identical retrieval and prompt construction as the
    /// streamed path, fragments collected server-side.
    ///
    /// # Errors
    ///
    /// Validation and retrieval errors surface directly; a chat failure at
    /// any point, including mid-stream, fails the whole call. No retries.
    pub async fn answer(
        &self,
        tenant: &TenantId,
        question: &str,
        top_k: Option<usize>,
    ) -> Result<Answer, AnswerError> {
        let (sources, messages) = self.retrieve(tenant, question, top_k).await?;

        let mut upstream = self.chat.chat_stream(&messages).await?;
        let mut answer = String::new();
        while let Some(fragment) = upstream.next().await {
            answer.push_str(&fragment?);
        }

        Ok(Answer { answer, sources })
    }

    /// Streamed variant: one `context` frame, then `token` frames, then one
    /// terminal frame. Dropping the returned stream stops the upstream model
    /// call; nothing is buffered for a consumer that went away.
    ///
    /// # Errors
    ///
    /// Validation and retrieval errors, and failure to start the upstream
    /// call, surface here before any frame is emitted. Mid-stream failures
    /// become the terminal `error` frame instead.
    pub async fn answer_stream(
        &self,
        tenant: &TenantId,
        question: &str,
        top_k: Option<usize>,
    ) -> Result<EventStream, AnswerError> {
        let (sources, messages) = self.retrieve(tenant, question, top_k).await?;
        let upstream = self.chat.chat_stream(&messages).await?;

        Ok(Box::pin(AnswerStream {
            context: Some(sources),
            upstream: Some(upstream),
        }))
    }

    async fn retrieve(
        &self,
        tenant: &TenantId,
        question: &str,
        top_k: Option<usize>,
    ) -> Result<(Vec<SourcePreview>, Vec<Message>), AnswerError> {
        if question.trim().is_empty() {
            return Err(AnswerError::Validation("empty question".into()));
        }

        let k = top_k.unwrap_or(self.retrieval.top_k);
        let sources = search_previews(
            &self.index,
            tenant,
            question,
            k,
            self.retrieval.snippet_window,
        )
        .await?;

        tracing::debug!(tenant = %tenant, sources = sources.len(), "retrieval complete");

        let prompt = build_prompt(question, &sources);
        let messages = vec![Message::new(Role::User, prompt)];
        Ok((sources, messages))
    }
}

fn build_prompt(question: &str, sources: &[SourcePreview]) -> String {
    let mut context = String::new();
    for (i, source) in sources.iter().enumerate() {
        if i > 0 {
            context.push_str("\n\n");
        }
        context.push_str(&format!("Source {}: {}", i + 1, source.snippet));
    }

    format!(
        "You are a helpful assistant. Answer the user based only on the sources.\n\
         If unsure, say you don't know.\n\n\
         Question: {question}\n\n\
         Sources:\n{context}\n\n\
         Answer in the language of the question."
    )
}

/// Framing state machine over the upstream fragment stream. The upstream is
/// polled only on demand and dropped as soon as a terminal frame goes out,
/// so cancellation is simply "stop pulling".
struct AnswerStream {
    context: Option<Vec<SourcePreview>>,
    upstream: Option<ChatStream>,
}

impl Stream for AnswerStream {
    type Item = StreamEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if let Some(sources) = this.context.take() {
            return Poll::Ready(Some(StreamEvent::Context { sources }));
        }

        loop {
            let Some(upstream) = this.upstream.as_mut() else {
                return Poll::Ready(None);
            };

            match upstream.as_mut().poll_next(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Some(Ok(fragment))) => {
                    if fragment.is_empty() {
                        continue;
                    }
                    return Poll::Ready(Some(StreamEvent::Token { text: fragment }));
                }
                Poll::Ready(Some(Err(e))) => {
                    this.upstream = None;
                    return Poll::Ready(Some(StreamEvent::Error {
                        message: e.to_string(),
                    }));
                }
                Poll::Ready(None) => {
                    this.upstream = None;
                    return Poll::Ready(Some(StreamEvent::Done {
                        finish_reason: "stop".into(),
                    }));
                }
            }
        }
    }
}
