use thiserror::Error;

use tether_shared::AdapterId;

/// Lifecycle and construction errors. These indicate bugs in the
/// caller and are always surfaced, never swallowed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    /// A descriptor was missing a field required for construction
    #[error("adapter descriptor is missing required field '{field}'")]
    MissingRequiredField { field: &'static str },

    /// Any API call on a destroyed adapter other than a no-op destroy
    #[error("cannot {operation} on destroyed adapter {adapter_id}")]
    UseAfterDestroy {
        adapter_id: AdapterId,
        operation: &'static str,
    },
}

/// Per-property synchronization failures. One malformed relation must
/// not block synchronization of independent adapters in the same batch;
/// these are logged by the property loop and the offending reference is
/// dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// A relational property referenced an id with no live adapter and
    /// no pending adapter-data entry
    #[error("relational property '{property}' references unknown adapter {adapter_id}")]
    UnknownAdapterReference {
        property: String,
        adapter_id: AdapterId,
    },

    /// A relational property held a value that is not an adapter
    /// reference in the configured child-resolution strategy
    #[error("relational property '{property}' holds a value that is not an adapter reference")]
    MalformedReference { property: String },
}
