pub mod page;
pub mod session;

pub use session::{BrowserMode, BrowserSession};
