//! Page loading and DOM plumbing.
//!
//! Navigation with a network-idle primary wait and a load-event fallback,
//! bot-challenge scanning, sticky-overlay hiding, and the evaluate-based
//! scroll/measure helpers the capture loop uses. All waits are condition
//! polls under a timeout budget — no blind sleeps.

use anyhow::anyhow;
use chromiumoxide::Page;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::core::error::CaptureError;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Quiet window for the network-idle heuristic: no new resource entries
/// for this long (with the DOM complete) counts as idle.
const NETWORK_QUIET: Duration = Duration::from_millis(1500);

// ── Evaluate helpers ─────────────────────────────────────────────────────────

async fn eval_u64(page: &Page, expr: &str) -> Option<u64> {
    page.evaluate(expr)
        .await
        .ok()
        .and_then(|v| v.into_value::<serde_json::Value>().ok())
        .and_then(|j| j.as_u64())
}

async fn eval_bool(page: &Page, expr: &str) -> Option<bool> {
    page.evaluate(expr)
        .await
        .ok()
        .and_then(|v| v.into_value::<serde_json::Value>().ok())
        .and_then(|j| j.as_bool())
}

pub(crate) async fn eval_string(page: &Page, expr: &str) -> Option<String> {
    page.evaluate(expr)
        .await
        .ok()
        .and_then(|v| v.into_value::<serde_json::Value>().ok())
        .and_then(|j| j.as_str().map(|s| s.to_string()))
}

// ── Navigation ───────────────────────────────────────────────────────────────

/// Navigate to `url` and wait for readiness.
///
/// Primary wait: network idle within `idle_budget`. On timeout, fall back
/// to the bare load event within `load_budget` — the navigation already
/// happened, so the fallback re-waits rather than re-fetching. Navigation
/// errors other than a timeout abort the URL at this layer; the retry
/// policy lives in the session manager.
pub async fn navigate(
    page: &Page,
    url: &str,
    idle_budget: Duration,
    load_budget: Duration,
) -> Result<(), CaptureError> {
    info!("🔗 loading: {}", url);
    match tokio::time::timeout(idle_budget, page.goto(url)).await {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => return Err(CaptureError::Navigation(e.to_string())),
        Err(_) => return Err(CaptureError::NavigationTimeout),
    }

    if wait_for_network_idle(page, NETWORK_QUIET, idle_budget).await {
        return Ok(());
    }

    warn!("⚠️ network-idle wait timed out, falling back to load event");
    if wait_for_load_event(page, load_budget).await {
        return Ok(());
    }

    Err(CaptureError::NavigationTimeout)
}

/// Poll `performance` resource entries until the network goes quiet.
///
/// Playwright-style networkidle heuristic without CDP Network events: the
/// count of resource entries must hold still for `quiet` while
/// `document.readyState` is `complete`. Returns `false` when `budget`
/// runs out first.
pub async fn wait_for_network_idle(page: &Page, quiet: Duration, budget: Duration) -> bool {
    let start = Instant::now();
    let mut last_count: u64 = 0;
    let mut stable_since = Instant::now();

    while start.elapsed() < budget {
        let count = eval_u64(page, "performance.getEntriesByType('resource').length")
            .await
            .unwrap_or(0);
        let complete = eval_bool(page, "document.readyState === 'complete'")
            .await
            .unwrap_or(false);

        if !complete || count != last_count {
            last_count = count;
            stable_since = Instant::now();
        } else if stable_since.elapsed() >= quiet {
            info!(
                "✅ network idle after {}ms ({} resources)",
                start.elapsed().as_millis(),
                count
            );
            return true;
        }

        tokio::time::sleep(POLL_INTERVAL).await;
    }
    false
}

/// Wait for the basic load event (`document.readyState === 'complete'`).
pub async fn wait_for_load_event(page: &Page, budget: Duration) -> bool {
    let start = Instant::now();
    while start.elapsed() < budget {
        if eval_bool(page, "document.readyState === 'complete'")
            .await
            .unwrap_or(false)
        {
            return true;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
    false
}

// ── Bot-challenge detection ──────────────────────────────────────────────────

/// Bot-challenge signatures scanned for in the rendered page.
/// Keep these high-confidence: a false positive silently drops the URL.
const BOT_BLOCK_SIGNATURES: &[(&str, &str)] = &[
    ("confirm you are human", "human-confirmation challenge"),
    ("verify you are human", "human-verification challenge"),
    ("are you a robot", "robot check"),
    ("unusual traffic", "rate-limit block"),
    ("cf-turnstile", "Cloudflare turnstile"),
    ("px-captcha", "PerimeterX captcha"),
];

/// Scan the loaded page for a bot challenge. `Some(reason)` means this
/// URL should be skipped without capturing.
pub async fn detect_bot_block(page: &Page) -> Result<Option<&'static str>, CaptureError> {
    let content = page
        .content()
        .await
        .map_err(|e| CaptureError::Navigation(e.to_string()))?;
    Ok(scan_for_bot_block(&content))
}

pub fn scan_for_bot_block(html: &str) -> Option<&'static str> {
    let lower = html.to_lowercase();
    BOT_BLOCK_SIGNATURES
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map(|&(_, reason)| reason)
}

// ── DOM helpers ──────────────────────────────────────────────────────────────

/// Wait for a `header` element to exist. Absence is tolerated: warn and
/// let the caller proceed with whatever rendered.
pub async fn wait_for_header(page: &Page, budget: Duration) -> bool {
    let start = Instant::now();
    while start.elapsed() < budget {
        if eval_bool(page, "document.querySelector('header') !== null")
            .await
            .unwrap_or(false)
        {
            return true;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
    warn!("⚠️ no header element found — proceeding anyway");
    false
}

const HIDE_STICKY_JS: &str = r#"
(() => {
    for (const el of document.querySelectorAll('*')) {
        const style = window.getComputedStyle(el);
        if ((style.position === 'fixed' || style.position === 'sticky')
            && parseInt(style.height) < 200) {
            el.setAttribute('data-tallshot-display', el.style.display);
            el.style.display = 'none';
        }
    }
})()
"#;

const RESTORE_STICKY_JS: &str = r#"
(() => {
    for (const el of document.querySelectorAll('[data-tallshot-display]')) {
        el.style.display = el.getAttribute('data-tallshot-display');
        el.removeAttribute('data-tallshot-display');
    }
})()
"#;

/// Hide fixed/sticky overlays under 200px tall so they don't repeat in
/// every stitched segment. The original inline display value is stashed
/// in a data attribute for [`restore_sticky_elements`].
pub async fn hide_sticky_elements(page: &Page) -> anyhow::Result<()> {
    page.evaluate(HIDE_STICKY_JS)
        .await
        .map_err(|e| anyhow!("failed to hide sticky elements: {}", e))?;
    Ok(())
}

/// Best-effort restore: the stitched artifact is already on disk when
/// this runs.
pub async fn restore_sticky_elements(page: &Page) {
    if let Err(e) = page.evaluate(RESTORE_STICKY_JS).await {
        warn!("failed to restore sticky elements: {}", e);
    }
}

/// Total scrollable document height. Measured once per capture, after
/// overlay hiding.
pub async fn document_height(page: &Page) -> Option<u64> {
    eval_u64(page, "document.body.scrollHeight").await
}

pub async fn scroll_to(page: &Page, y: u64) -> anyhow::Result<()> {
    page.evaluate(format!("window.scrollTo(0, {y})"))
        .await
        .map_err(|e| anyhow!("scroll to {} failed: {}", y, e))?;
    Ok(())
}

pub async fn scroll_by_viewport(page: &Page) -> anyhow::Result<()> {
    page.evaluate("window.scrollBy(0, window.innerHeight)")
        .await
        .map_err(|e| anyhow!("viewport scroll failed: {}", e))?;
    Ok(())
}

/// Wait for a scroll to land: the reported scroll position must hold
/// still across two consecutive polls, within `budget`.
pub async fn settle_after_scroll(page: &Page, budget: Duration) {
    let start = Instant::now();
    let mut last_y: Option<u64> = None;
    while start.elapsed() < budget {
        tokio::time::sleep(Duration::from_millis(150)).await;
        let y = eval_u64(page, "Math.round(window.scrollY)").await;
        if y.is_some() && y == last_y {
            return;
        }
        last_y = y;
    }
}

/// Wait for the rendered content to stop reflowing: the document height
/// must hold still across two consecutive polls, within `budget`.
pub async fn settle_content(page: &Page, budget: Duration) {
    let start = Instant::now();
    let mut last_height: Option<u64> = None;
    while start.elapsed() < budget {
        tokio::time::sleep(Duration::from_millis(150)).await;
        let height = document_height(page).await;
        if height.is_some() && height == last_height {
            return;
        }
        last_height = height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_the_challenge_phrase() {
        let html = "<html><body>Please confirm you are human to continue</body></html>";
        assert_eq!(
            scan_for_bot_block(html),
            Some("human-confirmation challenge")
        );
    }

    #[test]
    fn detection_is_case_insensitive() {
        assert!(scan_for_bot_block("VERIFY YOU ARE HUMAN").is_some());
    }

    #[test]
    fn detects_turnstile_markup() {
        let html = r#"<div class="cf-turnstile" data-sitekey="x"></div>"#;
        assert_eq!(scan_for_bot_block(html), Some("Cloudflare turnstile"));
    }

    #[test]
    fn clean_article_passes() {
        let html = "<html><head><title>News</title></head>\
                    <body><header>Daily</header><article>All quiet today.</article></body></html>";
        assert_eq!(scan_for_bot_block(html), None);
    }
}
