use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use futures::StreamExt;
use passage_answer::engine::AnswerEngine;
use passage_answer::render::{RenderSink, StreamRenderer};
use passage_answer::{StreamEvent, ThinkParser};
use passage_core::config::BackendKind;
use passage_core::{Config, TenantId};
use passage_index::{IngestService, JobStatus, SourcePreview, SubmittedFile, VectorIndex};
use passage_llm::any::AnyProvider;

#[derive(Debug, Parser)]
#[command(name = "passage", version, about = "Per-tenant document indexing and grounded Q&A")]
struct Cli {
    /// Path to the config file (default: config/default.toml or PASSAGE_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a fresh tenant id
    Tenant,
    /// Upload files and index them, waiting for the job to finish
    Index {
        #[arg(long)]
        tenant: String,
        /// Files to ingest (txt, md, pdf with the pdf feature)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Search the tenant's collection and print ranked previews
    Search {
        #[arg(long)]
        tenant: String,
        query: String,
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },
    /// Ask a question grounded in the tenant's documents
    Ask {
        #[arg(long)]
        tenant: String,
        question: String,
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
        /// Stream the answer instead of waiting for the full response
        #[arg(long)]
        stream: bool,
        /// Print the model's hidden reasoning after the answer
        #[arg(long)]
        show_reasoning: bool,
    },
    /// Delete the tenant's collection and uploads
    Reset {
        #[arg(long)]
        tenant: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config_path = cli
        .config
        .or_else(|| std::env::var("PASSAGE_CONFIG").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("config/default.toml"));
    let config = Config::load(&config_path)?;

    match cli.command {
        Command::Tenant => {
            println!("{}", TenantId::generate());
            Ok(())
        }
        Command::Index { tenant, files } => index_files(&config, &tenant, files).await,
        Command::Search {
            tenant,
            query,
            top_k,
        } => search(&config, &tenant, &query, top_k).await,
        Command::Ask {
            tenant,
            question,
            top_k,
            stream,
            show_reasoning,
        } => ask(&config, &tenant, &question, top_k, stream, show_reasoning).await,
        Command::Reset { tenant } => reset(&config, &tenant).await,
    }
}

fn build_index(config: &Config) -> anyhow::Result<Arc<VectorIndex<AnyProvider>>> {
    let provider = AnyProvider::for_embeddings(config)?;
    Ok(Arc::new(VectorIndex::new(
        &config.storage.data_dir,
        provider,
    )))
}

fn build_service(config: &Config) -> anyhow::Result<IngestService<AnyProvider>> {
    let index = build_index(config)?;
    Ok(IngestService::new(
        &config.storage.data_dir,
        config.limits,
        config.chunking,
        config.indexing.workers,
        index,
    ))
}

async fn index_files(config: &Config, tenant: &str, files: Vec<PathBuf>) -> anyhow::Result<()> {
    let tenant = TenantId::new(tenant)?;
    let service = build_service(config)?;

    let mut submitted = Vec::with_capacity(files.len());
    for path in &files {
        let content = std::fs::read(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("invalid filename: {}", path.display()))?
            .to_owned();
        submitted.push(SubmittedFile { filename, content });
    }

    let job_id = service.submit(&tenant, submitted).await?;
    println!("job {job_id} queued");

    let mut last_progress = None;
    loop {
        let snapshot = service.status(&job_id)?;
        if last_progress != Some(snapshot.progress) {
            println!("job {job_id} {:?} {}%", snapshot.status, snapshot.progress);
            last_progress = Some(snapshot.progress);
        }
        if snapshot.status.is_terminal() {
            if snapshot.status == JobStatus::Error {
                anyhow::bail!(
                    "indexing failed: {}",
                    snapshot.error.unwrap_or_else(|| "unknown error".into())
                );
            }
            println!("done");
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
}

async fn search(
    config: &Config,
    tenant: &str,
    query: &str,
    top_k: Option<usize>,
) -> anyhow::Result<()> {
    let tenant = TenantId::new(tenant)?;
    let index = build_index(config)?;
    let k = top_k.unwrap_or(config.retrieval.top_k);

    let previews = passage_index::retrieval::search_previews(
        &index,
        &tenant,
        query,
        k,
        config.retrieval.snippet_window,
    )
    .await?;

    if previews.is_empty() {
        println!("no results");
        return Ok(());
    }
    for (i, preview) in previews.iter().enumerate() {
        print_preview(i + 1, preview);
    }
    Ok(())
}

fn print_preview(rank: usize, preview: &SourcePreview) {
    let source = preview.filename.as_deref().unwrap_or("?");
    let page = preview
        .page
        .map(|p| format!(" p.{p}"))
        .unwrap_or_default();
    println!(
        "{rank}. [{:.3}] {source}{page}\n   {}",
        preview.score, preview.snippet
    );
}

struct StdoutSink {
    printed: usize,
}

impl RenderSink for StdoutSink {
    async fn render(&mut self, text: &str) -> anyhow::Result<()> {
        // The visible buffer only ever grows, so print the new suffix.
        print!("{}", &text[self.printed..]);
        std::io::stdout().flush()?;
        self.printed = text.len();
        Ok(())
    }
}

async fn ask(
    config: &Config,
    tenant: &str,
    question: &str,
    top_k: Option<usize>,
    stream: bool,
    show_reasoning: bool,
) -> anyhow::Result<()> {
    let tenant = TenantId::new(tenant)?;
    let index = build_index(config)?;
    let chat = AnyProvider::for_chat(config)?;

    if let (BackendKind::Ollama, AnyProvider::Ollama(ollama)) = (config.llm.backend, &chat)
        && let Err(e) = ollama.health_check().await
    {
        tracing::warn!("ollama health check failed: {e:#}");
    }

    let engine = AnswerEngine::new(index, chat, config.retrieval);

    if stream {
        let mut events = engine.answer_stream(&tenant, question, top_k).await?;
        let mut parser = ThinkParser::new();
        let mut renderer = StreamRenderer::new(
            StdoutSink { printed: 0 },
            Duration::from_millis(config.answer.render_interval_ms),
        );
        let mut sources = Vec::new();
        let mut stream_error = None;

        while let Some(event) = events.next().await {
            match event {
                StreamEvent::Context { sources: s } => sources = s,
                StreamEvent::Token { text } => {
                    let visible = parser.push(&text);
                    renderer.push(&visible).await?;
                }
                StreamEvent::Done { .. } => {
                    renderer.finish().await?;
                    break;
                }
                StreamEvent::Error { message } => {
                    renderer.finish().await?;
                    stream_error = Some(message);
                    break;
                }
            }
        }
        println!();

        if show_reasoning && !parser.reasoning().is_empty() {
            println!("\n--- reasoning ---\n{}", parser.reasoning());
        }
        print_sources(&sources);

        if let Some(message) = stream_error {
            anyhow::bail!("stream failed: {message}");
        }
    } else {
        let result = engine.answer(&tenant, question, top_k).await?;
        let mut parser = ThinkParser::new();
        parser.push(&result.answer);
        println!("{}", parser.answer());

        if show_reasoning && !parser.reasoning().is_empty() {
            println!("\n--- reasoning ---\n{}", parser.reasoning());
        }
        print_sources(&result.sources);
    }

    Ok(())
}

fn print_sources(sources: &[SourcePreview]) {
    if sources.is_empty() {
        return;
    }
    println!("\nSources:");
    for (i, preview) in sources.iter().enumerate() {
        print_preview(i + 1, preview);
    }
}

async fn reset(config: &Config, tenant: &str) -> anyhow::Result<()> {
    let tenant = TenantId::new(tenant)?;
    let service = build_service(config)?;
    service.reset(&tenant).await?;
    println!("collection and uploads removed for {tenant}");
    Ok(())
}
