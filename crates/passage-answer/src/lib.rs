//! Retrieval-grounded answering over a tenant's collection.
//!
//! The engine assembles a prompt from ranked source snippets and streams the
//! model's reply as a framed event sequence: one `context`, then `token`s,
//! then exactly one terminal `done` or `error`. Consumer-side pieces live
//! here too: the think-block parser that hides model reasoning, the render
//! throttle, and the bounded reasoning cache.

pub mod cache;
pub mod engine;
pub mod error;
pub mod event;
pub mod render;
pub mod think;

pub use engine::{Answer, AnswerEngine};
pub use error::AnswerError;
pub use event::StreamEvent;
pub use think::{ThinkParser, ThinkState};
