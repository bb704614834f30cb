//! Render throttling for streamed answers.
//!
//! Chat surfaces that redraw the whole message on every fragment (message
//! edits, terminal repaints) get hammered by token-rate updates, so the
//! renderer flushes the accumulated visible text at most once per interval.
//! The terminal event always forces a final flush.

use std::future::Future;
use std::time::{Duration, Instant};

/// Where the accumulated visible answer is drawn. Each flush receives the
/// full text so far, not a delta.
pub trait RenderSink: Send {
    fn render(&mut self, text: &str) -> impl Future<Output = anyhow::Result<()>> + Send;
}

#[derive(Debug)]
pub struct StreamRenderer<S> {
    sink: S,
    interval: Duration,
    last_flush: Option<Instant>,
    visible: String,
    dirty: bool,
}

impl<S: RenderSink> StreamRenderer<S> {
    #[must_use]
    pub fn new(sink: S, interval: Duration) -> Self {
        Self {
            sink,
            interval,
            last_flush: None,
            visible: String::new(),
            dirty: false,
        }
    }

    fn should_flush(&self) -> bool {
        match self.last_flush {
            None => true,
            Some(last) => last.elapsed() >= self.interval,
        }
    }

    /// Append newly visible text and flush if the interval has elapsed.
    ///
    /// # Errors
    ///
    /// Propagates sink failures.
    pub async fn push(&mut self, delta: &str) -> anyhow::Result<()> {
        if delta.is_empty() {
            return Ok(());
        }
        self.visible.push_str(delta);
        self.dirty = true;

        if self.should_flush() {
            self.flush().await?;
        }
        Ok(())
    }

    /// Unconditional final flush, called on the terminal event.
    ///
    /// # Errors
    ///
    /// Propagates sink failures.
    pub async fn finish(&mut self) -> anyhow::Result<()> {
        if self.dirty || self.last_flush.is_none() {
            self.flush().await?;
        }
        Ok(())
    }

    async fn flush(&mut self) -> anyhow::Result<()> {
        self.sink.render(&self.visible).await?;
        self.last_flush = Some(Instant::now());
        self.dirty = false;
        Ok(())
    }

    /// Full visible text accumulated so far.
    #[must_use]
    pub fn visible(&self) -> &str {
        &self.visible
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
