//! Browser automation module
//!
//! Wraps agent-browser CLI for web automation.

mod driver;
mod session;
mod snapshot;

pub use driver::{AgentBrowserCli, BrowserDriver};
pub use session::Browser;
pub use snapshot::{Element, Snapshot};
