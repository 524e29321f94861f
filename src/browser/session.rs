//! Browser session management over `chromiumoxide`.
//!
//! Single source of truth for:
//! * Finding a usable Chromium-family executable (env override → PATH →
//!   well-known install paths).
//! * The two operating modes and their launch configurations.
//! * `BrowserSession` — the one browser + page a capture run drives, with
//!   the teardown-then-relaunch path the per-URL retry uses.

use anyhow::{anyhow, Result};
use chromiumoxide::browser::BrowserConfig;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use std::path::Path;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::core::config::{self, CaptureConfig};

/// Operating mode of the browser session.
///
/// `Headless` is the normal mode. `VisibleSlow` opens a real window and
/// stretches every settle wait — the relaunch target after a headless
/// failure, where automation detection or a flaky page gets a second
/// chance at human pace (and a human can step in if the window is
/// attended).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrowserMode {
    Headless,
    VisibleSlow,
}

impl BrowserMode {
    /// Multiplier applied to settle budgets in this mode.
    pub fn pacing_factor(self) -> u32 {
        match self {
            BrowserMode::Headless => 1,
            BrowserMode::VisibleSlow => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BrowserMode::Headless => "headless",
            BrowserMode::VisibleSlow => "visible-slow",
        }
    }
}

/// Find a usable Chromium-family browser executable.
///
/// Resolution order:
/// 1. `CHROME_EXECUTABLE` env var (explicit override)
/// 2. PATH scan — finds package-manager installs on all platforms.
/// 3. OS-specific well-known install paths.
pub fn find_chrome_executable() -> Option<String> {
    if let Some(p) = config::chrome_executable_override() {
        return Some(p);
    }

    if let Ok(path_var) = std::env::var("PATH") {
        let candidates = [
            "google-chrome",
            "chromium",
            "chromium-browser",
            "chrome",
            "brave-browser",
        ];
        for dir in std::env::split_paths(&path_var) {
            for exe in candidates {
                let full = dir.join(exe);
                if full.exists() {
                    return Some(full.to_string_lossy().to_string());
                }
            }
        }
    }

    #[cfg(target_os = "macos")]
    {
        let candidates = [
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/Applications/Brave Browser.app/Contents/MacOS/Brave Browser",
        ];
        for c in candidates {
            if Path::new(c).exists() {
                return Some(c.to_string());
            }
        }
    }

    #[cfg(target_os = "linux")]
    {
        let candidates = [
            "/usr/bin/google-chrome",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/usr/bin/brave-browser",
            "/usr/local/bin/chromium",
        ];
        for c in candidates {
            if Path::new(c).exists() {
                return Some(c.to_string());
            }
        }
    }

    #[cfg(target_os = "windows")]
    {
        let candidates = [
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
        ];
        for c in candidates {
            if Path::new(c).exists() {
                return Some(c.to_string());
            }
        }
    }

    None
}

/// Build a `BrowserConfig` for the given mode with the fixed capture
/// profile: configured viewport, device scale factor 1, one desktop user
/// agent, en-US locale.
pub fn build_browser_config(
    exe: &str,
    mode: BrowserMode,
    cfg: &CaptureConfig,
) -> Result<BrowserConfig> {
    let mut builder = BrowserConfig::builder()
        .chrome_executable(exe)
        .viewport(Viewport {
            width: cfg.viewport_width,
            height: cfg.viewport_height,
            device_scale_factor: Some(cfg.device_scale_factor),
            emulating_mobile: false,
            is_landscape: true,
            has_touch: false,
        })
        .window_size(cfg.viewport_width, cfg.viewport_height)
        .arg("--disable-gpu")
        .arg("--no-sandbox") // often required in CI / restricted environments
        .arg("--disable-setuid-sandbox")
        .arg("--disable-dev-shm-usage") // avoids /dev/shm OOM in constrained environments
        .arg("--disable-extensions")
        .arg("--disable-background-networking")
        .arg("--disable-sync")
        .arg("--disable-translate")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--hide-scrollbars")
        .arg("--mute-audio")
        .arg("--disable-blink-features=AutomationControlled")
        .arg(format!("--lang={}", cfg.locale))
        .arg(format!("--accept-lang={},en;q=0.9", cfg.locale))
        .arg(format!("--user-agent={}", cfg.user_agent));

    if mode == BrowserMode::VisibleSlow {
        builder = builder.with_head();
    }

    builder
        .build()
        .map_err(|e| anyhow!("failed to build browser config: {}", e))
}

/// The single browser session a capture run drives.
///
/// One session (one page) is reused across all URLs. `relaunch` tears the
/// current instance down before the replacement starts — the two modes
/// never coexist.
pub struct BrowserSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    mode: BrowserMode,
}

impl BrowserSession {
    pub async fn launch(mode: BrowserMode, cfg: &CaptureConfig) -> Result<Self> {
        let exe = find_chrome_executable().ok_or_else(|| {
            anyhow!(
                "no browser found — install Chrome or Chromium, \
                 or point CHROME_EXECUTABLE at one"
            )
        })?;
        info!("🚀 launching {} browser ({})", mode.as_str(), exe);

        let browser_config = build_browser_config(&exe, mode, cfg)?;
        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| anyhow!("failed to launch browser ({}): {}", exe, e))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!("CDP handler error: {}", e);
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| anyhow!("failed to open page: {}", e))?;

        Ok(Self {
            browser,
            page,
            handler,
            mode,
        })
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn mode(&self) -> BrowserMode {
        self.mode
    }

    /// Settle budget scaled by the mode's pacing factor.
    pub fn settle(&self, base: Duration) -> Duration {
        base * self.mode.pacing_factor()
    }

    /// Tear this session down and bring up a replacement in `mode`.
    pub async fn relaunch(self, mode: BrowserMode, cfg: &CaptureConfig) -> Result<Self> {
        warn!("🔄 relaunching browser in {} mode", mode.as_str());
        self.close().await;
        Self::launch(mode, cfg).await
    }

    /// Close the browser and stop the CDP event loop.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("browser close error (non-fatal): {}", e);
        }
        self.handler.abort();
    }
}
