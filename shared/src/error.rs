use thiserror::Error;

use crate::AdapterId;

/// Errors that can occur while decoding wire-level payloads.
#[derive(Debug, Error)]
pub enum WireError {
    /// The incoming message was not valid JSON or did not have the
    /// expected envelope shape
    #[error("failed to decode incoming message: {source}")]
    InvalidMessage {
        #[source]
        source: serde_json::Error,
    },

    /// An adapter-data entry was keyed under a different id than the
    /// descriptor it contains
    #[error("adapter data keyed under {key} carries id {entry_id}")]
    MismatchedAdapterDataKey { key: AdapterId, entry_id: AdapterId },
}
