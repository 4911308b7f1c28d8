use thiserror::Error;

/// Errors the ledger store can signal to callers.
///
/// Deletes and updates on absent ids are deliberately not errors; they are
/// soft no-ops so that retried requests stay idempotent.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("a favorite for video {video_id} already exists")]
    Conflict { video_id: String },
}
