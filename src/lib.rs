//! Atomik Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod fetcher;
pub mod ledger;
pub mod server;

// Re-export commonly used types for convenience
pub use ledger::{LedgerError, LedgerStore};
pub use server::{run_server, RequestsLoggingLevel, ServerConfig};
