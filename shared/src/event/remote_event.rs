use std::{fmt, rc::Rc, time::Duration};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::AdapterId;

/// Reserved event-type discriminator for property-change batches. Every
/// other type string is an action event.
pub const PROPERTY_EVENT_TYPE: &str = "property";

/// Predicate used by the transport to collapse a queued event with an
/// earlier one targeting the same object. Returns true for events the
/// new one supersedes.
pub type CoalescePredicate = Rc<dyn Fn(&RemoteEvent) -> bool>;

/// Transport hints attached to a [`RemoteEvent`]. Never part of the
/// serialized payload; the transport reads them when the event is queued
/// and drops them afterwards.
#[derive(Clone, Default)]
pub struct EventHints {
    /// Milliseconds-scale wait before the transport flushes this event.
    pub delay: Option<Duration>,
    /// Collapse predicate, see [`CoalescePredicate`].
    pub coalesce: Option<CoalescePredicate>,
    /// Forces a new request boundary.
    pub new_request: bool,
    /// Asks the transport to show a busy indicator while the request
    /// containing this event is in flight.
    pub show_busy_indicator: bool,
}

impl fmt::Debug for EventHints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHints")
            .field("delay", &self.delay)
            .field("coalesce", &self.coalesce.as_ref().map(|_| "<predicate>"))
            .field("new_request", &self.new_request)
            .field("show_busy_indicator", &self.show_busy_indicator)
            .finish()
    }
}

/// The wire envelope for a property or action change crossing the
/// client/server boundary.
///
/// Serialized shapes:
/// - property batch: `{"target": id, "type": "property", "properties": {..}}`
/// - action: `{"target": id, "type": <string>, ...payload}`
///
/// The order of keys in `properties` is the order the server listed
/// them; the client treats that order as the default synchronization
/// order, so it must survive decoding.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RemoteEvent {
    pub target: AdapterId,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
    #[serde(flatten)]
    pub data: Map<String, Value>,
    #[serde(skip)]
    pub hints: EventHints,
}

impl RemoteEvent {
    /// A property-change batch for `target`.
    pub fn property(target: AdapterId, properties: Map<String, Value>) -> Self {
        Self {
            target,
            event_type: PROPERTY_EVENT_TYPE.to_string(),
            properties,
            data: Map::new(),
            hints: EventHints::default(),
        }
    }

    /// An action event for `target` with an arbitrary payload.
    pub fn action(target: AdapterId, event_type: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            target,
            event_type: event_type.into(),
            properties: Map::new(),
            data,
            hints: EventHints::default(),
        }
    }

    pub fn is_property_event(&self) -> bool {
        self.event_type == PROPERTY_EVENT_TYPE
    }
}

// Hints are transport metadata, not payload; two events are the same
// event regardless of how they are queued.
impl PartialEq for RemoteEvent {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target
            && self.event_type == other.event_type
            && self.properties == other.properties
            && self.data == other.data
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn property_event_round_trip() {
        let mut properties = Map::new();
        properties.insert("visible".to_string(), json!(false));
        let event = RemoteEvent::property(AdapterId::new("7"), properties);

        let text = serde_json::to_string(&event).unwrap();
        assert_eq!(
            text,
            r#"{"target":"7","type":"property","properties":{"visible":false}}"#
        );

        let decoded: RemoteEvent = serde_json::from_str(&text).unwrap();
        assert_eq!(decoded, event);
        assert!(decoded.is_property_event());
    }

    #[test]
    fn action_payload_is_flattened() {
        let mut data = Map::new();
        data.insert("row".to_string(), json!(3));
        let event = RemoteEvent::action(AdapterId::new("4"), "rowClicked", data);

        let text = serde_json::to_string(&event).unwrap();
        assert_eq!(text, r#"{"target":"4","type":"rowClicked","row":3}"#);

        let decoded: RemoteEvent = serde_json::from_str(&text).unwrap();
        assert_eq!(decoded.data.get("row"), Some(&json!(3)));
        assert!(!decoded.is_property_event());
    }

    #[test]
    fn property_key_order_survives_decoding() {
        let decoded: RemoteEvent =
            serde_json::from_str(r#"{"target":"2","type":"property","properties":{"b":2,"a":1}}"#)
                .unwrap();
        let keys: Vec<&String> = decoded.properties.keys().collect();
        assert_eq!(keys, ["b", "a"]);
    }
}
