//! Document ingestion and retrieval: token-window chunking, per-tenant
//! persisted vector collections, the asynchronous indexing job engine, and
//! query-anchored snippet extraction.

pub mod chunker;
pub mod document;
pub mod error;
pub mod highlight;
pub mod job;
pub mod loader;
pub mod locks;
pub mod retrieval;
pub mod service;
pub mod store;
mod worker;

pub use error::{IndexError, Result};
pub use job::{FileInfo, JobSnapshot, JobStatus};
pub use retrieval::SourcePreview;
pub use service::{IngestService, SubmittedFile};
pub use store::VectorIndex;
