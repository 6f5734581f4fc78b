//! CLI binary for edgequake-pdfqa.
//!
//! A thin shim over the library crate that maps CLI flags to `ServerConfig`
//! and serves the HTTP API until Ctrl+C / SIGTERM.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_pdfqa::{router, ActiveDocumentPolicy, AppState, PdfiumExtractor, ServerConfig};
use std::io;
use std::path::PathBuf;
use tokio::signal;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Serve on 0.0.0.0:8000 against a local Ollama
  pdfqa

  # Different model, bounded inference time
  pdfqa --model llama3.2 --inference-timeout 120

  # Upload a PDF and ask about it
  curl -F "file=@paper.pdf" http://localhost:8000/upload-pdf
  curl -H 'Content-Type: application/json' \
       -d '{"question": "What is the main result?"}' \
       http://localhost:8000/ask-question

ENDPOINTS:
  GET  /              liveness check
  POST /upload-pdf    multipart form, field "file" (name must end in .pdf)
  POST /ask-question  {"question": "...", "document": "optional.pdf"}

ENVIRONMENT VARIABLES:
  OLLAMA_URL              Generation endpoint (default http://localhost:11434/api/generate)
  PDFQA_MODEL             Model ID (default deepseek-r1:1.5b)
  PDFIUM_LIB_PATH         Path to libpdfium if it is not on the system library path
  RUST_LOG                Overrides --verbose / --quiet log filtering
"#;

/// Answer questions about uploaded PDFs with a local Ollama model.
#[derive(Parser, Debug)]
#[command(
    name = "pdfqa",
    version,
    about = "Answer questions about uploaded PDFs with a local Ollama model",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Interface to bind.
    #[arg(long, env = "PDFQA_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on.
    #[arg(short, long, env = "PDFQA_PORT", default_value_t = 8000)]
    port: u16,

    /// Ollama generation endpoint.
    #[arg(long, env = "OLLAMA_URL", default_value = edgequake_pdfqa::config::DEFAULT_INFERENCE_URL)]
    inference_url: String,

    /// Model ID sent with every generation request.
    #[arg(short, long, env = "PDFQA_MODEL", default_value = edgequake_pdfqa::config::DEFAULT_MODEL)]
    model: String,

    /// Inference timeout in seconds. Omit to wait indefinitely.
    #[arg(long, env = "PDFQA_INFERENCE_TIMEOUT")]
    inference_timeout: Option<u64>,

    /// Sampling temperature (0.0–2.0). Omit to use the model default.
    #[arg(long, env = "PDFQA_TEMPERATURE")]
    temperature: Option<f32>,

    /// Maximum upload size in MiB.
    #[arg(long, env = "PDFQA_MAX_UPLOAD_MB", default_value_t = 50)]
    max_upload_mb: usize,

    /// Remove <think>…</think> blocks from model output before parsing.
    #[arg(long, env = "PDFQA_STRIP_REASONING")]
    strip_reasoning: bool,

    /// Document answered against when a question names none.
    #[arg(long, env = "PDFQA_ACTIVE_DOCUMENT", value_enum, default_value = "first")]
    active_document: ActiveDocumentArg,

    /// Disable the permissive CORS layer.
    #[arg(long, env = "PDFQA_NO_CORS")]
    no_cors: bool,

    /// Path to the pdfium shared library.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib_path: Option<PathBuf>,

    /// Enable DEBUG-level tracing logs (prompts and raw model output).
    #[arg(short, long, env = "PDFQA_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDFQA_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum ActiveDocumentArg {
    /// The first document uploaded.
    First,
    /// The most recently uploaded document.
    Latest,
}

impl From<ActiveDocumentArg> for ActiveDocumentPolicy {
    fn from(v: ActiveDocumentArg) -> Self {
        match v {
            ActiveDocumentArg::First => ActiveDocumentPolicy::FirstUploaded,
            ActiveDocumentArg::Latest => ActiveDocumentPolicy::MostRecent,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "edgequake_pdfqa=debug,tower_http=debug"
    } else if cli.quiet {
        "error"
    } else {
        "edgequake_pdfqa=info,tower_http=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli)?;
    let addr = config.socket_addr().context("Invalid bind address")?;

    // ── Check the PDF engine up front ────────────────────────────────────
    // Uploads fail with a 500 until pdfium can be bound; say so at startup.
    let probe = match &config.pdfium_lib_path {
        Some(path) => PdfiumExtractor::with_library_path(path),
        None => PdfiumExtractor::new(),
    };
    match tokio::task::spawn_blocking(move || probe.bind().map(|_| ())).await {
        Ok(Ok(())) => tracing::info!("PDFium engine available"),
        Ok(Err(e)) => tracing::warn!("{}", e),
        Err(e) => tracing::warn!("PDFium probe panicked: {}", e),
    }

    tracing::info!(
        "Inference endpoint: {} (model '{}', timeout {})",
        config.inference_url,
        config.model,
        config
            .inference_timeout_secs
            .map(|s| format!("{s}s"))
            .unwrap_or_else(|| "none".to_string())
    );

    // ── Serve ────────────────────────────────────────────────────────────
    let app = router(AppState::new(config));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("pdfqa v{} listening on {}", env!("CARGO_PKG_VERSION"), addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Map CLI args to `ServerConfig`.
fn build_config(cli: &Cli) -> Result<ServerConfig> {
    let mut builder = ServerConfig::builder()
        .host(&cli.host)
        .port(cli.port)
        .inference_url(&cli.inference_url)
        .model(&cli.model)
        .max_upload_bytes(cli.max_upload_mb.saturating_mul(1024 * 1024))
        .strip_reasoning(cli.strip_reasoning)
        .active_document(cli.active_document.clone().into())
        .permissive_cors(!cli.no_cors);

    if let Some(secs) = cli.inference_timeout {
        builder = builder.inference_timeout_secs(secs);
    }
    if let Some(t) = cli.temperature {
        builder = builder.temperature(t);
    }
    if let Some(ref path) = cli.pdfium_lib_path {
        builder = builder.pdfium_lib_path(path);
    }

    builder.build().context("Invalid configuration")
}

/// Resolve on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
