//! Capture configuration: compiled-in defaults, optional `tallshot.json`
//! overrides, and env-var escape hatches.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Fixed desktop user agent presented in both browser modes.
pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 13_6_5) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.6367.207 Safari/537.36";

pub const ENV_CHROME_EXECUTABLE: &str = "CHROME_EXECUTABLE";
pub const ENV_CONFIG_PATH: &str = "TALLSHOT_CONFIG";

/// Optional overrides loaded from `tallshot.json`. Every field defaults to
/// the compiled-in value when absent.
#[derive(Deserialize, Default, Clone, Debug)]
pub struct FileConfig {
    pub viewport_width: Option<u32>,
    pub viewport_height: Option<u32>,
    pub out_dir: Option<String>,
    pub network_idle_timeout_secs: Option<u64>,
    pub load_event_timeout_secs: Option<u64>,
    pub settle_ms: Option<u64>,
    pub scroll_limit_multiplier: Option<u32>,
    pub pdf_page_width: Option<u32>,
}

/// Load `tallshot.json` from standard locations.
///
/// Search order (first found wins):
/// 1. `TALLSHOT_CONFIG` env var path
/// 2. `./tallshot.json` (process cwd)
///
/// Missing file → `FileConfig::default()` (silent).
/// Parse error → log a warning, return `FileConfig::default()`.
pub fn load_file_config() -> FileConfig {
    let candidates: Vec<PathBuf> = {
        let mut v = vec![PathBuf::from("tallshot.json")];
        if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
            v.insert(0, PathBuf::from(env_path));
        }
        v
    };

    for path in &candidates {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<FileConfig>(&contents) {
                Ok(cfg) => {
                    info!("tallshot.json loaded from {}", path.display());
                    return cfg;
                }
                Err(e) => {
                    warn!(
                        "tallshot.json parse error at {}: {} — using defaults",
                        path.display(),
                        e
                    );
                    return FileConfig::default();
                }
            },
            Err(_) => continue, // file not found at this path — try next
        }
    }

    FileConfig::default()
}

/// Resolved capture settings for a run.
#[derive(Clone, Debug)]
pub struct CaptureConfig {
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub device_scale_factor: f64,
    pub user_agent: String,
    pub locale: String,
    /// Directory receiving stitched artifacts and per-part temp files.
    pub out_dir: PathBuf,
    /// Budget for the primary network-idle wait after navigation.
    pub network_idle_timeout: Duration,
    /// Budget for the fallback load-event wait.
    pub load_event_timeout: Duration,
    /// Base settle budget after a scroll; stretched in visible-slow mode.
    pub settle_budget: Duration,
    /// Scroll cutoff as a multiple of the once-measured document height.
    pub scroll_limit_multiplier: u32,
    /// Max width of the legacy variant's PDF-ready rendition.
    pub pdf_page_width: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            viewport_width: 1920,
            viewport_height: 1080,
            device_scale_factor: 1.0,
            user_agent: DESKTOP_USER_AGENT.to_string(),
            locale: "en-US".to_string(),
            out_dir: PathBuf::from("screenshots"),
            network_idle_timeout: Duration::from_secs(60),
            load_event_timeout: Duration::from_secs(30),
            settle_budget: Duration::from_millis(1500),
            scroll_limit_multiplier: 3,
            pdf_page_width: 1240,
        }
    }
}

impl CaptureConfig {
    /// Apply `tallshot.json` overrides on top of the defaults.
    pub fn with_file(mut self, file: &FileConfig) -> Self {
        if let Some(w) = file.viewport_width {
            self.viewport_width = w;
        }
        if let Some(h) = file.viewport_height {
            self.viewport_height = h;
        }
        if let Some(ref dir) = file.out_dir {
            self.out_dir = PathBuf::from(dir);
        }
        if let Some(s) = file.network_idle_timeout_secs {
            self.network_idle_timeout = Duration::from_secs(s);
        }
        if let Some(s) = file.load_event_timeout_secs {
            self.load_event_timeout = Duration::from_secs(s);
        }
        if let Some(ms) = file.settle_ms {
            self.settle_budget = Duration::from_millis(ms);
        }
        if let Some(m) = file.scroll_limit_multiplier {
            self.scroll_limit_multiplier = m;
        }
        if let Some(w) = file.pdf_page_width {
            self.pdf_page_width = w;
        }
        self
    }
}

/// Optional override for the Chromium-family browser executable.
///
/// Default behavior is auto-discovery (see
/// `browser::session::find_chrome_executable`). This returns a value only
/// when `CHROME_EXECUTABLE` is set to an existing path.
pub fn chrome_executable_override() -> Option<String> {
    let p = std::env::var(ENV_CHROME_EXECUTABLE).ok()?;
    let p = p.trim();
    if p.is_empty() {
        return None;
    }
    if Path::new(p).exists() {
        Some(p.to_string())
    } else {
        None
    }
}
