//! tallshot — full-page article screenshot archiver.
//!
//! Drives a Chromium-family browser over CDP, scrolls each article one
//! viewport at a time, and stitches the captures into a single tall PNG
//! named `{publication}_{title}_{date}.png`. The legacy variant takes one
//! capture-beyond-viewport shot and emits a paginated PDF alongside it.
//!
//! ```sh
//! tallshot https://example.com/story
//! tallshot --input urls.txt --out-dir screenshots
//! tallshot --legacy --input urls.txt
//! ```

use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tallshot::core::config::{load_file_config, CaptureConfig};
use tallshot::core::urls::read_url_list;
use tallshot::run::{run_capture, CaptureVariant};

/// Command-line arguments. Flags override `tallshot.json` values.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Article URLs to capture (alternative to --input)
    urls: Vec<String>,

    /// Plain-text file with one URL per line
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output directory for captured artifacts
    #[arg(short, long, env = "TALLSHOT_OUT_DIR")]
    out_dir: Option<PathBuf>,

    /// Use the legacy single-pass variant (full-page shot + PDF, numeric names)
    #[arg(long)]
    legacy: bool,

    /// Scroll cutoff as a multiple of the measured document height
    #[arg(long)]
    scroll_limit: Option<u32>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Cli::parse();

    let mut urls: Vec<String> = args
        .urls
        .iter()
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .collect();
    if let Some(input) = &args.input {
        urls.extend(read_url_list(input)?);
    }
    if urls.is_empty() {
        anyhow::bail!("no URLs given — pass them as arguments or via --input <file>");
    }

    let mut cfg = CaptureConfig::default().with_file(&load_file_config());
    if let Some(out_dir) = args.out_dir {
        cfg.out_dir = out_dir;
    }
    if let Some(limit) = args.scroll_limit {
        cfg.scroll_limit_multiplier = limit;
    }

    let variant = if args.legacy {
        CaptureVariant::Legacy
    } else {
        CaptureVariant::ScrollStitch
    };

    info!(
        "tallshot starting: {} URL(s) → {}",
        urls.len(),
        cfg.out_dir.display()
    );
    run_capture(&urls, variant, &cfg).await
}
