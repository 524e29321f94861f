//! The end-to-end capture run: one browser session, URLs processed in
//! order, relaunch-and-retry on failure.

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::browser::session::{BrowserMode, BrowserSession};
use crate::capture;
use crate::core::config::CaptureConfig;
use crate::core::error::CaptureError;

/// Which capture pipeline a run uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureVariant {
    /// Scroll viewport by viewport and stitch (default).
    ScrollStitch,
    /// One capture-beyond-viewport shot plus a paginated PDF.
    Legacy,
}

/// Run the full workflow over `urls`.
///
/// A single failing URL never aborts the run: a bot block skips the URL,
/// any other per-URL failure triggers one teardown-and-relaunch into
/// visible-slow mode and a single retry. After a retry the session stays
/// in whatever mode it reached — subsequent URLs ride the live session.
pub async fn run_capture(
    urls: &[String],
    variant: CaptureVariant,
    cfg: &CaptureConfig,
) -> Result<()> {
    std::fs::create_dir_all(&cfg.out_dir)
        .with_context(|| format!("failed to create output dir {}", cfg.out_dir.display()))?;

    let mut session = BrowserSession::launch(BrowserMode::Headless, cfg).await?;
    let total = urls.len();

    for (idx, url) in urls.iter().enumerate() {
        let idx = idx + 1;
        info!("🔄 processing {} ({}/{})", url, idx, total);

        match capture_one(&session, url, idx, variant, cfg).await {
            Ok(()) => {}
            Err(e) if !e.is_retryable() => {
                warn!("🛑 {} — skipping {}", e, url);
            }
            Err(e) => {
                warn!("❌ {} — relaunching in visible mode and retrying", e);
                session = session.relaunch(BrowserMode::VisibleSlow, cfg).await?;
                if let Err(e) = capture_one(&session, url, idx, variant, cfg).await {
                    error!("❌ still failed in visible mode: {} — skipping {}", e, url);
                }
            }
        }
    }

    session.close().await;
    info!("✅ all captures completed");
    Ok(())
}

async fn capture_one(
    session: &BrowserSession,
    url: &str,
    idx: usize,
    variant: CaptureVariant,
    cfg: &CaptureConfig,
) -> Result<(), CaptureError> {
    match variant {
        CaptureVariant::ScrollStitch => capture::capture_article(session, url, idx, cfg)
            .await
            .map(|_| ()),
        CaptureVariant::Legacy => capture::legacy::capture_single_pass(session, url, idx, cfg)
            .await
            .map(|_| ()),
    }
}
