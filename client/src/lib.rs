//! # Tether Client
//! Client-side half of a remote-model synchronization layer: an
//! authoritative object graph lives on a server, and a mirrored,
//! interactive widget tree lives here. The [`Session`] owns the adapter
//! registry and dispatches decoded server events; each [`Adapter`]
//! mirrors one server-side object, converting model events into widget
//! mutations and local widget events into outgoing [`RemoteEvent`]s,
//! with per-adapter filters suppressing echoes of server-applied
//! changes.

pub mod adapter;
pub mod filters;
pub mod session;
pub mod widget;

pub use adapter::{
    Adapter, AdapterError, LifecycleState, SendFn, SyncError, SyncFn, SyncTable,
};
pub use filters::{PropertyChangeEventFilter, WidgetEventTypeFilter};
pub use session::{
    DefaultValues, EventTransport, NullTransport, ObjectFactory, Session, SessionConfig,
    SessionError, WidgetConstructor,
};
pub use widget::{ChildResolution, GenericWidget, ResolvedChild, Widget, WidgetEvent};

pub use tether_shared::{
    root_adapter_id, AdapterData, AdapterId, CoalescePredicate, EventHints, IncomingMessage,
    RemoteEvent, WireError, PROPERTY_EVENT_TYPE, ROOT_ADAPTER_ID,
};
