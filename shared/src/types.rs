use std::fmt;

use serde::{Deserialize, Serialize};

/// Id of the single well-known root adapter of a session.
pub const ROOT_ADAPTER_ID: &str = "1";

/// Returns the [`AdapterId`] of the root adapter.
pub fn root_adapter_id() -> AdapterId {
    AdapterId::new(ROOT_ADAPTER_ID)
}

/// Opaque stable identifier of one server-side object mirrored by the
/// client. Assigned by the server, unique within a session, and never
/// reused while the session is active.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdapterId(String);

impl AdapterId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == ROOT_ADAPTER_ID
    }
}

impl fmt::Display for AdapterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AdapterId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for AdapterId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
