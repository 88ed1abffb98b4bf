use std::fmt;

use crate::widget::WidgetEvent;

enum EventPredicate {
    ByType(String),
    ByPredicate(Box<dyn Fn(&WidgetEvent) -> bool>),
}

impl fmt::Debug for EventPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventPredicate::ByType(event_type) => {
                f.debug_tuple("ByType").field(event_type).finish()
            }
            EventPredicate::ByPredicate(_) => f.debug_tuple("ByPredicate").finish(),
        }
    }
}

/// Suppression filter for outgoing widget events, matching on event
/// shape or type. An event is suppressed if any registered predicate
/// matches.
#[derive(Debug, Default)]
pub struct WidgetEventTypeFilter {
    predicates: Vec<EventPredicate>,
}

impl WidgetEventTypeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suppress every event of the given type string.
    pub fn add_filter_for_event_type(&mut self, event_type: impl Into<String>) {
        self.predicates
            .push(EventPredicate::ByType(event_type.into()));
    }

    /// Suppress every event the predicate matches.
    pub fn add_filter(&mut self, predicate: impl Fn(&WidgetEvent) -> bool + 'static) {
        self.predicates
            .push(EventPredicate::ByPredicate(Box::new(predicate)));
    }

    /// Returns true if the event should be suppressed.
    pub fn filter(&self, event: &WidgetEvent) -> bool {
        self.predicates.iter().any(|predicate| match predicate {
            EventPredicate::ByType(event_type) => event.event_type() == event_type,
            EventPredicate::ByPredicate(predicate) => predicate(event),
        })
    }

    pub fn reset(&mut self) {
        self.predicates.clear();
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Map};

    use super::*;

    fn action(event_type: &str) -> WidgetEvent {
        WidgetEvent::Action {
            event_type: event_type.to_string(),
            data: Map::new(),
        }
    }

    #[test]
    fn filters_by_event_type_string() {
        let mut filter = WidgetEventTypeFilter::new();
        filter.add_filter_for_event_type("rowOrderChanged");

        assert!(filter.filter(&action("rowOrderChanged")));
        assert!(!filter.filter(&action("rowClicked")));
    }

    #[test]
    fn filters_by_arbitrary_predicate() {
        let mut filter = WidgetEventTypeFilter::new();
        filter.add_filter(|event| {
            matches!(event, WidgetEvent::PropertyChange { value, .. } if value.is_null())
        });

        assert!(filter.filter(&WidgetEvent::PropertyChange {
            name: "text".to_string(),
            value: json!(null),
        }));
        assert!(!filter.filter(&WidgetEvent::PropertyChange {
            name: "text".to_string(),
            value: json!("a"),
        }));
    }

    #[test]
    fn reset_removes_all_predicates() {
        let mut filter = WidgetEventTypeFilter::new();
        filter.add_filter_for_event_type("rowClicked");
        filter.reset();
        assert!(!filter.filter(&action("rowClicked")));
    }
}
