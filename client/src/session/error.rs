use thiserror::Error;

use tether_shared::AdapterId;

use crate::adapter::AdapterError;

/// Errors surfaced by registry and dispatch operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Ids are assigned by the server and never reused; a second
    /// registration under a live id is a protocol violation
    #[error("adapter id {adapter_id} is already registered")]
    DuplicateAdapterId { adapter_id: AdapterId },

    /// An id was referenced with no live adapter and no adapter-data
    /// entry in the current batch
    #[error("no adapter data found for id {adapter_id}")]
    NoAdapterData { adapter_id: AdapterId },

    /// An operation addressed an id with no registered adapter
    #[error("no adapter registered for id {adapter_id}")]
    AdapterNotRegistered { adapter_id: AdapterId },

    #[error(transparent)]
    Adapter(#[from] AdapterError),
}
