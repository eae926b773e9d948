//! Chrome DevTools Protocol (CDP) client.
//!
//! Talks JSON-RPC over the browser WebSocket; one flattened session per
//! attached tab shares the connection.

mod client;
mod error;
mod protocol;
mod session;

pub use client::CdpClient;
pub use error::CdpError;
pub use protocol::*;
pub use session::PageSession;
