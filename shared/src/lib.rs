//! # Tether Shared
//! Wire-level types shared between the tether client and the server half
//! of the protocol: the event envelope, adapter descriptors, and the
//! framing of one decoded server response.

mod error;
mod event;
mod types;

pub use error::WireError;
pub use event::{
    adapter_data::{AdapterData, IncomingMessage},
    remote_event::{CoalescePredicate, EventHints, RemoteEvent, PROPERTY_EVENT_TYPE},
};
pub use types::{root_adapter_id, AdapterId, ROOT_ADAPTER_ID};
