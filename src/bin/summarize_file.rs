//! Summarize a local file with the same pipeline the HTTP server runs.
//!
//! The media type is inferred from the file extension unless `--media-type` is given, and the
//! outcome is printed to stdout as JSON. Logs go to stderr.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use docsum::{
    config, extraction::SubmittedFile, logging, pipeline::SummaryService,
    summarization::SummaryLength,
};

#[derive(Parser)]
#[command(
    name = "summarize-file",
    about = "Extract text from a PDF, image, or text file and summarize it"
)]
struct Cli {
    /// File to summarize.
    path: PathBuf,
    /// Summary length: short, medium, or long. Unknown values use medium.
    #[arg(long, default_value = "medium")]
    length: String,
    /// Declared media type; inferred from the extension when omitted.
    #[arg(long)]
    media_type: Option<String>,
    /// Print compact instead of pretty JSON.
    #[arg(long)]
    compact: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

#[tokio::main]
async fn run() -> Result<()> {
    let cli = Cli::parse();
    config::init_config();
    logging::init_cli_tracing();
    let config = config::get_config();
    config.log_loaded();

    let bytes = tokio::fs::read(&cli.path)
        .await
        .with_context(|| format!("failed to read {}", cli.path.display()))?;
    let media_type = cli
        .media_type
        .or_else(|| media_type_for_path(&cli.path).map(str::to_string));
    let name = cli
        .path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| cli.path.display().to_string());
    let file = SubmittedFile::new(name, media_type, bytes);

    let service = SummaryService::from_config(config)?;
    let outcome = service
        .summarize(&file, SummaryLength::from_label(Some(cli.length.as_str())))
        .await?;

    let rendered = if cli.compact {
        serde_json::to_string(&outcome)?
    } else {
        serde_json::to_string_pretty(&outcome)?
    };
    println!("{rendered}");
    Ok(())
}

fn media_type_for_path(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "pdf" => Some("application/pdf"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        "tif" | "tiff" => Some("image/tiff"),
        "webp" => Some("image/webp"),
        "txt" | "md" => Some("text/plain"),
        _ => None,
    }
}
