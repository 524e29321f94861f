//! Per-URL failure classification.
//!
//! The session manager keys its retry policy off these variants: a bot
//! block skips the URL outright, anything else earns exactly one relaunch
//! in visible-slow mode.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("navigation timed out (network-idle and load-event waits exhausted)")]
    NavigationTimeout,

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("bot challenge detected: {0}")]
    BotBlocked(&'static str),

    #[error("could not measure document height")]
    MissingDocumentHeight,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CaptureError {
    /// Bot blocks are terminal for the URL — a visible relaunch would land
    /// on the same challenge page.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, CaptureError::BotBlocked(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bot_block_is_not_retryable() {
        assert!(!CaptureError::BotBlocked("captcha").is_retryable());
    }

    #[test]
    fn timeouts_and_failures_are_retryable() {
        assert!(CaptureError::NavigationTimeout.is_retryable());
        assert!(CaptureError::Navigation("net::ERR_FAILED".into()).is_retryable());
        assert!(CaptureError::MissingDocumentHeight.is_retryable());
        assert!(CaptureError::Other(anyhow::anyhow!("boom")).is_retryable());
    }
}
