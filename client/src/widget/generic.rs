use std::collections::HashSet;

use serde_json::{Map, Value};

use tether_shared::{AdapterData, AdapterId};

use crate::widget::{Widget, WidgetEvent};

/// Built-in model actions every widget understands. Concrete widgets
/// extend the vocabulary through their own `invoke_action`.
const BUILTIN_ACTIONS: &[&str] = &["scrollToTop", "reveal"];

/// Default property-bag widget, used for any object type without a
/// registered constructor. Stores properties in server key order,
/// emits a `PropertyChange` only when a stored value actually changes,
/// and records invocations of the built-in action vocabulary (rendering
/// is the embedder's concern).
#[derive(Debug, Default)]
pub struct GenericWidget {
    object_type: String,
    parent: Option<AdapterId>,
    properties: Map<String, Value>,
    widget_properties: HashSet<String>,
    invoked_actions: Vec<String>,
    destroyed: bool,
}

impl GenericWidget {
    pub fn new(object_type: impl Into<String>) -> Self {
        Self {
            object_type: object_type.into(),
            ..Self::default()
        }
    }

    /// Builds the widget from an adapter descriptor, seeding initial
    /// properties and the relational-property markers.
    pub fn from_data(data: &AdapterData) -> Self {
        Self {
            object_type: data.object_type.clone(),
            parent: None,
            properties: data.properties.clone(),
            widget_properties: data.widget_properties.iter().cloned().collect(),
            invoked_actions: Vec::new(),
            destroyed: false,
        }
    }

    pub fn mark_widget_property(&mut self, name: impl Into<String>) {
        self.widget_properties.insert(name.into());
    }

    /// Built-in actions applied to this widget, in invocation order.
    pub fn invoked_actions(&self) -> &[String] {
        &self.invoked_actions
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

impl Widget for GenericWidget {
    fn object_type(&self) -> &str {
        &self.object_type
    }

    fn parent(&self) -> Option<&AdapterId> {
        self.parent.as_ref()
    }

    fn set_parent(&mut self, parent: Option<AdapterId>) {
        self.parent = parent;
    }

    fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    fn set_property(&mut self, name: &str, value: Value) -> Vec<WidgetEvent> {
        if self.properties.get(name) == Some(&value) {
            return Vec::new();
        }
        self.properties.insert(name.to_string(), value.clone());
        vec![WidgetEvent::PropertyChange {
            name: name.to_string(),
            value,
        }]
    }

    fn is_widget_property(&self, name: &str) -> bool {
        self.widget_properties.contains(name)
    }

    fn invoke_action(&mut self, action: &str, _data: &Map<String, Value>) -> bool {
        if BUILTIN_ACTIONS.contains(&action) {
            self.invoked_actions.push(action.to_string());
            return true;
        }
        false
    }

    fn destroy(&mut self) -> Vec<WidgetEvent> {
        if self.destroyed {
            return Vec::new();
        }
        self.destroyed = true;
        vec![WidgetEvent::Destroy]
    }
}
