//! File loaders turning uploaded bytes into normalized [`Document`]s.
//!
//! DOCX and other formats without a loader here are rejected at submission;
//! parsing them is an external concern.

use std::path::Path;
use std::pin::Pin;

use passage_core::text::normalize;

use crate::document::{Document, DocumentMetadata};
use crate::error::IndexError;

/// Default maximum file size: 50 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

pub trait DocumentLoader: Send + Sync {
    fn load(
        &self,
        path: &Path,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Vec<Document>, IndexError>> + Send + '_>>;

    fn supported_extensions(&self) -> &[&str];
}

/// Extensions accepted at submission time.
#[must_use]
pub fn allowed_extensions() -> &'static [&'static str] {
    #[cfg(feature = "pdf")]
    {
        &["txt", "md", "markdown", "pdf"]
    }
    #[cfg(not(feature = "pdf"))]
    {
        &["txt", "md", "markdown"]
    }
}

/// Pick a loader by file extension.
///
/// # Errors
///
/// Returns a validation error for unsupported extensions.
pub fn loader_for(path: &Path, max_file_size: u64) -> Result<Box<dyn DocumentLoader>, IndexError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_lowercase();

    match ext.as_str() {
        "txt" | "md" | "markdown" => Ok(Box::new(TextLoader { max_file_size })),
        #[cfg(feature = "pdf")]
        "pdf" => Ok(Box::new(PdfLoader { max_file_size })),
        _ => Err(IndexError::Validation(format!(
            "unsupported file: {}",
            path.display()
        ))),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map_or_else(|| path.display().to_string(), ToOwned::to_owned)
}

pub struct TextLoader {
    pub max_file_size: u64,
}

impl Default for TextLoader {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl DocumentLoader for TextLoader {
    fn load(
        &self,
        path: &Path,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Vec<Document>, IndexError>> + Send + '_>>
    {
        let path = path.to_path_buf();
        let max_size = self.max_file_size;
        Box::pin(async move {
            let meta = tokio::fs::metadata(&path).await?;
            if meta.len() > max_size {
                return Err(IndexError::PayloadTooLarge(format!(
                    "file too big: {} ({} bytes)",
                    file_name(&path),
                    meta.len()
                )));
            }

            let content = tokio::fs::read_to_string(&path).await?;

            Ok(vec![Document {
                content: normalize(&content),
                metadata: DocumentMetadata {
                    source: file_name(&path),
                    page: None,
                },
            }])
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["txt", "md", "markdown"]
    }
}

#[cfg(feature = "pdf")]
pub struct PdfLoader {
    pub max_file_size: u64,
}

#[cfg(feature = "pdf")]
impl Default for PdfLoader {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

#[cfg(feature = "pdf")]
impl DocumentLoader for PdfLoader {
    fn load(
        &self,
        path: &Path,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Vec<Document>, IndexError>> + Send + '_>>
    {
        let path = path.to_path_buf();
        let max_size = self.max_file_size;
        Box::pin(async move {
            let meta = tokio::fs::metadata(&path).await?;
            if meta.len() > max_size {
                return Err(IndexError::PayloadTooLarge(format!(
                    "file too big: {} ({} bytes)",
                    file_name(&path),
                    meta.len()
                )));
            }

            let source = file_name(&path);
            let extract_path = path.clone();
            let content = tokio::task::spawn_blocking(move || {
                pdf_extract::extract_text(&extract_path).map_err(|e| IndexError::Pdf(e.to_string()))
            })
            .await
            .map_err(|e| IndexError::Io(std::io::Error::other(e)))??;

            Ok(vec![Document {
                content: normalize(&content),
                metadata: DocumentMetadata { source, page: None },
            }])
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["pdf"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn load_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("test.txt");
        std::fs::write(&file, "hello   world").unwrap();

        let docs = TextLoader::default().load(&file).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].content, "hello world");
        assert_eq!(docs[0].metadata.source, "test.txt");
        assert!(docs[0].metadata.page.is_none());
    }

    #[tokio::test]
    async fn load_nonexistent_file() {
        let result = TextLoader::default()
            .load(Path::new("/nonexistent/file.txt"))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn load_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("empty.txt");
        std::fs::write(&file, "").unwrap();

        let docs = TextLoader::default().load(&file).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert!(docs[0].content.is_empty());
    }

    #[tokio::test]
    async fn file_too_large_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("big.txt");
        std::fs::write(&file, "x").unwrap();

        let loader = TextLoader { max_file_size: 0 };
        let result = loader.load(&file).await;
        assert!(matches!(result, Err(IndexError::PayloadTooLarge(_))));
    }

    #[test]
    fn loader_for_known_extensions() {
        assert!(loader_for(Path::new("a.txt"), 1).is_ok());
        assert!(loader_for(Path::new("a.MD"), 1).is_ok());
        assert!(loader_for(Path::new("a.markdown"), 1).is_ok());
    }

    #[test]
    fn loader_for_unsupported_extension() {
        let result = loader_for(Path::new("slides.pptx"), 1);
        assert!(matches!(result, Err(IndexError::Validation(_))));
        let result = loader_for(Path::new("no_extension"), 1);
        assert!(matches!(result, Err(IndexError::Validation(_))));
    }

    #[test]
    fn allowed_extensions_cover_text() {
        let exts = allowed_extensions();
        assert!(exts.contains(&"txt"));
        assert!(exts.contains(&"md"));
    }
}
