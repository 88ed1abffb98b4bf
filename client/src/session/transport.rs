use std::time::Duration;

use tether_shared::RemoteEvent;

/// Seam to the out-of-scope transport layer. The core hands events over
/// fire-and-forget; batching, request framing, retry, and delivery
/// ordering of queued events are the transport's responsibility. The
/// `coalesce`/`new_request`/`show_busy_indicator` hints travel on the
/// event itself, the delay is passed alongside.
pub trait EventTransport {
    fn deliver(&mut self, event: RemoteEvent, delay: Option<Duration>);
}

/// Transport that drops every event, for sessions that are not (yet)
/// connected.
#[derive(Debug, Default)]
pub struct NullTransport;

impl EventTransport for NullTransport {
    fn deliver(&mut self, event: RemoteEvent, _delay: Option<Duration>) {
        log::trace!(
            "null transport dropping '{}' event for adapter {}",
            event.event_type,
            event.target
        );
    }
}
