//! The scroll-and-stitch capture workflow.
//!
//! One article at a time: load, shoot the header viewport, hide sticky
//! overlays, walk down the page a viewport per step shooting each stop,
//! then stitch the parts into a single tall PNG named from the page
//! metadata.

pub mod convert;
pub mod legacy;
pub mod metadata;
pub mod stitch;

use anyhow::{anyhow, Context};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use crate::browser::page as dom;
use crate::browser::session::BrowserSession;
use crate::core::config::CaptureConfig;
use crate::core::error::CaptureError;

use self::metadata::extract_page_metadata;

/// Budget for the optional wait on a `header` element.
const HEADER_WAIT: Duration = Duration::from_secs(3);

/// Scroll offsets the capture loop visits, in order.
///
/// Starts one viewport below the top (the header shot covers offset 0)
/// and advances a viewport per step until the measured document height is
/// passed. The cutoff stops runaway pages whose height keeps growing
/// mid-capture; the height is measured once, so this is a bound, not a
/// guarantee.
pub fn scroll_positions(total_height: u64, viewport_height: u64, limit_multiplier: u32) -> Vec<u64> {
    let mut positions = Vec::new();
    if viewport_height == 0 {
        return positions;
    }
    let cutoff = total_height.saturating_mul(u64::from(limit_multiplier));
    let mut y = viewport_height;
    while y < total_height {
        positions.push(y);
        y += viewport_height;
        if y > cutoff {
            warn!("🛑 scroll cutoff reached at {}px (possible infinite page)", y);
            break;
        }
    }
    positions
}

/// Viewport screenshot of whatever is currently on screen.
async fn capture_viewport(page: &Page) -> anyhow::Result<Vec<u8>> {
    page.screenshot(
        ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build(),
    )
    .await
    .map_err(|e| anyhow!("screenshot capture failed: {}", e))
}

/// Capture one article into a stitched PNG. Returns the artifact path.
///
/// Temp part files live in the output directory as `tmp_{idx}_*.png` and
/// are deleted once the stitched artifact is on disk — nothing from index
/// `idx` survives into the next URL.
pub async fn capture_article(
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

    let meta = extract_page_metadata(page, url).await;
    let stem = meta.file_stem();
    info!("📰 {} — \"{}\" ({})", meta.publication, meta.title, meta.date);

    // Header shot is taken before overlay hiding so the masthead survives
    // in the stitched artifact.
    dom::wait_for_header(page, HEADER_WAIT).await;
    dom::settle_content(page, session.settle(cfg.settle_budget)).await;

    let header_path = cfg.out_dir.join(format!("tmp_{idx}_header.png"));
    let shot = capture_viewport(page).await?;
    tokio::fs::write(&header_path, &shot)
        .await
        .with_context(|| format!("failed to write {}", header_path.display()))?;

    info!("👻 hiding sticky overlays");
    dom::hide_sticky_elements(page).await?;

    let total_height = dom::document_height(page)
        .await
        .ok_or(CaptureError::MissingDocumentHeight)?;
    let viewport_height = u64::from(cfg.viewport_height);

    let mut part_paths = vec![header_path];
    for (part, y) in scroll_positions(total_height, viewport_height, cfg.scroll_limit_multiplier)
        .into_iter()
        .enumerate()
    {
        let part = part + 1;
        info!("📸 capturing part {} at scrollY {}px", part, y);
        dom::scroll_to(page, y).await?;
        dom::settle_after_scroll(page, session.settle(cfg.settle_budget)).await;

        let part_path = cfg.out_dir.join(format!("tmp_{idx}_part{part}.png"));
        let shot = capture_viewport(page).await?;
        tokio::fs::write(&part_path, &shot)
            .await
            .with_context(|| format!("failed to write {}", part_path.display()))?;
        part_paths.push(part_path);
    }

    info!("🔧 stitching {} parts", part_paths.len());
    let stitched = stitch::stitch_vertical(&part_paths)?;
    let out_path = cfg.out_dir.join(format!("{stem}.png"));
    stitched
        .save(&out_path)
        .with_context(|| format!("failed to save {}", out_path.display()))?;
    info!("🖼️ saved full screenshot: {}", out_path.display());

    remove_temp_parts(&part_paths);
    dom::restore_sticky_elements(page).await;

    Ok(out_path)
}

/// Best-effort temp cleanup; a missing file is already what we want, so
/// repeat calls are harmless.
pub fn remove_temp_parts(paths: &[PathBuf]) {
    for path in paths {
        if let Err(e) = std::fs::remove_file(path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("failed to remove {}: {}", path.display(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_viewport_page_needs_no_scrolling() {
        assert!(scroll_positions(1080, 1080, 3).is_empty());
        assert!(scroll_positions(600, 1080, 3).is_empty());
    }

    #[test]
    fn steps_one_viewport_at_a_time() {
        // 4000px document, 1080px viewport: stops at 1080, 2160, 3240.
        assert_eq!(scroll_positions(4000, 1080, 3), vec![1080, 2160, 3240]);
    }

    #[test]
    fn capture_count_is_bounded_by_document_height() {
        let total = 25_000u64;
        let viewport = 1080u64;
        let positions = scroll_positions(total, viewport, 3);
        // Header shot + scroll shots never exceed ceil(H/V).
        let max_captures = total.div_ceil(viewport) as usize;
        assert!(positions.len() + 1 <= max_captures + 1);
        assert!(positions.last().unwrap() < &total);
    }

    #[test]
    fn positions_stop_at_measured_height() {
        // Whatever the multiplier, a step is only planned below the
        // once-measured height.
        let positions = scroll_positions(100, 30, 1000);
        assert_eq!(positions, vec![30, 60, 90]);
        assert!(scroll_positions(10, 25, 2).is_empty());
    }

    #[test]
    fn zero_viewport_yields_nothing() {
        assert!(scroll_positions(5000, 0, 3).is_empty());
    }

    #[test]
    fn temp_cleanup_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tmp_1_part1.png");
        std::fs::write(&path, b"png").unwrap();
        let paths = vec![path.clone()];
        remove_temp_parts(&paths);
        assert!(!path.exists());
        // Second pass over already-deleted files is a no-op.
        remove_temp_parts(&paths);
    }
}
