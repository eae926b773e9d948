//! # ReviewFilter CDP page context
//!
//! Runs snapshot and apply operations against a tab of a Chrome/Chromium
//! instance started with remote debugging:
//!
//! ```bash
//! chrome --remote-debugging-port=9222
//! ```
//!
//! Snapshots come from `DOM.getDocument`, so node ids in verdicts refer to
//! nodes of the same DevTools session and stay valid until the page is
//! reloaded or navigated.

pub mod cdp;
mod page_context;

pub use cdp::{CdpClient, CdpError, PageInfo, PageSession};
pub use page_context::{CdpPageContext, DISPLAY_FUNCTION};
