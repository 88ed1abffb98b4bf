use std::collections::HashSet;

use serde_json::{Map, Value};

/// Suppression filter for outgoing property-change events.
///
/// Holds two kinds of entries: value-specific one-shot entries, seeded
/// with an entire incoming property batch so the echo of the resulting
/// local mutation is not re-sent, and value-agnostic name-only entries
/// that persist until [`reset`](Self::reset).
///
/// Unconsumed one-shot entries must not outlive the dispatch turn they
/// were created for; the session resets the filter once the turn (or an
/// outgoing flush) completes. Otherwise a later, unrelated value that
/// coincidentally matches a stale entry would be wrongly dropped.
#[derive(Debug, Default)]
pub struct PropertyChangeEventFilter {
    value_entries: Vec<(String, Value)>,
    name_entries: HashSet<String>,
}

impl PropertyChangeEventFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a value-specific one-shot entry for every property of
    /// an incoming batch.
    pub fn add_filter_for_properties(&mut self, properties: &Map<String, Value>) {
        for (name, value) in properties {
            self.value_entries.push((name.clone(), value.clone()));
        }
    }

    /// Registers a persistent, value-agnostic entry for `name`.
    pub fn add_filter_for_property_name(&mut self, name: impl Into<String>) {
        self.name_entries.insert(name.into());
    }

    /// Returns true if the change should be suppressed. A matching
    /// value-specific entry is consumed; name-only entries match without
    /// being consumed.
    pub fn filter(&mut self, name: &str, value: &Value) -> bool {
        if let Some(index) = self
            .value_entries
            .iter()
            .position(|(entry_name, entry_value)| entry_name == name && entry_value == value)
        {
            self.value_entries.remove(index);
            return true;
        }
        self.name_entries.contains(name)
    }

    /// Clears all entries, one-shot and persistent alike.
    pub fn reset(&mut self) {
        self.value_entries.clear();
        self.name_entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn batch(entries: &[(&str, Value)]) -> Map<String, Value> {
        entries
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn value_entry_is_consumed_by_first_match() {
        let mut filter = PropertyChangeEventFilter::new();
        filter.add_filter_for_properties(&batch(&[("x", json!(5))]));

        assert!(filter.filter("x", &json!(5)));
        // consumed: the same change a second time is no longer an echo
        assert!(!filter.filter("x", &json!(5)));
    }

    #[test]
    fn mismatched_value_is_not_suppressed() {
        let mut filter = PropertyChangeEventFilter::new();
        filter.add_filter_for_properties(&batch(&[("x", json!(5))]));

        assert!(!filter.filter("x", &json!(6)));
        // the entry for 5 is still armed
        assert!(filter.filter("x", &json!(5)));
    }

    #[test]
    fn name_entries_persist_across_matches() {
        let mut filter = PropertyChangeEventFilter::new();
        filter.add_filter_for_property_name("selection");

        assert!(filter.filter("selection", &json!([1])));
        assert!(filter.filter("selection", &json!([2])));
        assert!(!filter.filter("text", &json!("a")));
    }

    #[test]
    fn reset_clears_both_entry_kinds() {
        let mut filter = PropertyChangeEventFilter::new();
        filter.add_filter_for_properties(&batch(&[("x", json!(1))]));
        filter.add_filter_for_property_name("selection");

        filter.reset();

        assert!(!filter.filter("x", &json!(1)));
        assert!(!filter.filter("selection", &json!([1])));
    }
}
