//! Full-page article capture: scroll-and-stitch screenshots over native
//! Chromium CDP.
//!
//! The crate drives a single Chromium-family browser session, loads each
//! article URL, scrolls through the page one viewport at a time, and
//! stitches the captures into one tall archival PNG. A legacy variant
//! takes a single capture-beyond-viewport shot and emits a paginated PDF
//! alongside it.

pub mod browser;
pub mod capture;
pub mod core;
pub mod run;

pub use crate::core::config::CaptureConfig;
pub use crate::core::error::CaptureError;
pub use crate::run::{run_capture, CaptureVariant};
