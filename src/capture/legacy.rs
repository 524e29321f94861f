//! Legacy single-pass variant.
//!
//! No incremental stitching: the page is walked to the bottom once to
//! trigger lazy content, then captured in a single beyond-viewport shot,
//! with a paginated PDF emitted alongside. Artifacts use numeric-index
//! names (`screenshot_{idx}.*`).

use anyhow::{anyhow, Context};
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, PrintToPdfParams};
use chromiumoxide::page::ScreenshotParams;
use std::path::PathBuf;
use tracing::info;

use crate::browser::page as dom;
use crate::browser::session::BrowserSession;
use crate::core::config::CaptureConfig;
use crate::core::error::CaptureError;

use super::convert::normalize_page_image;

// A4 paper, inches.
const PDF_PAPER_WIDTH_IN: f64 = 8.27;
const PDF_PAPER_HEIGHT_IN: f64 = 11.69;

/// Step cap for the pre-capture walk; lazy-loading pages get their
/// content triggered without falling into an infinite feed.
const MAX_AUTO_SCROLL_STEPS: u32 = 50;

/// Capture one article as a full-page PNG + paginated PDF. Returns the
/// PNG path.
pub async fn capture_single_pass(
    session: &BrowserSession,
    url: &str,
    idx: usize,
    cfg: &CaptureConfig,
) -> Result<PathBuf, CaptureError> {
    let page = session.page();

    dom::navigate(page, url, cfg.network_idle_timeout, cfg.load_event_timeout).await?;

    if let Some(reason) = dom::detect_bot_block(page).await? {
        return Err(CaptureError::BotBlocked(reason));
    }

    auto_scroll_to_bottom(session, cfg).await?;

    let shot = page
        .screenshot(
            ScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Png)
                .full_page(true)
                .build(),
        )
        .await
        .map_err(|e| anyhow!("full-page screenshot failed: {}", e))?;

    let png_path = cfg.out_dir.join(format!("screenshot_{idx}.png"));
    tokio::fs::write(&png_path, &shot)
        .await
        .with_context(|| format!("failed to write {}", png_path.display()))?;
    info!("🖼️ PNG saved: {}", png_path.display());

    // PDF-ready rendition: plain RGB, capped width.
    let full = image::load_from_memory(&shot).context("failed to decode full-page capture")?;
    let normalized = normalize_page_image(&full, cfg.pdf_page_width);
    let page_png_path = cfg.out_dir.join(format!("screenshot_{idx}_page.png"));
    normalized
        .save(&page_png_path)
        .with_context(|| format!("failed to save {}", page_png_path.display()))?;

    let pdf = page
        .pdf(
            PrintToPdfParams::builder()
                .paper_width(PDF_PAPER_WIDTH_IN)
                .paper_height(PDF_PAPER_HEIGHT_IN)
                .print_background(true)
                .build(),
        )
        .await
        .map_err(|e| anyhow!("pdf generation failed: {}", e))?;

    let pdf_path = cfg.out_dir.join(format!("screenshot_{idx}.pdf"));
    tokio::fs::write(&pdf_path, &pdf)
        .await
        .with_context(|| format!("failed to write {}", pdf_path.display()))?;
    info!("📄 PDF saved: {}", pdf_path.display());

    Ok(png_path)
}

/// Scroll a viewport at a time until the document stops growing, then
/// return to the top so the capture starts at the masthead.
async fn auto_scroll_to_bottom(
    session: &BrowserSession,
    cfg: &CaptureConfig,
) -> Result<(), CaptureError> {
    let page = session.page();
    let mut last_height = dom::document_height(page)
        .await
        .ok_or(CaptureError::MissingDocumentHeight)?;

    for _ in 0..MAX_AUTO_SCROLL_STEPS {
        dom::scroll_by_viewport(page).await?;
        dom::settle_after_scroll(page, session.settle(cfg.settle_budget)).await;
        let height = dom::document_height(page).await.unwrap_or(last_height);
        if height == last_height {
            break;
        }
        last_height = height;
    }

    dom::scroll_to(page, 0).await?;
    dom::settle_after_scroll(page, session.settle(cfg.settle_budget)).await;
    Ok(())
}
