use std::collections::HashMap;

use log::trace;
use serde_json::{Map, Value};

use tether_shared::AdapterData;

use crate::widget::{GenericWidget, Widget};

/// Constructor for the widget mirrored by one object type.
pub type WidgetConstructor = fn(&AdapterData) -> Box<dyn Widget>;

/// Maps an adapter descriptor's `objectType` to the widget to
/// instantiate. Object types without a registered constructor fall back
/// to [`GenericWidget`].
#[derive(Debug, Default)]
pub struct ObjectFactory {
    constructors: HashMap<String, WidgetConstructor>,
}

impl ObjectFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, object_type: impl Into<String>, constructor: WidgetConstructor) {
        self.constructors.insert(object_type.into(), constructor);
    }

    pub fn create(&self, data: &AdapterData) -> Box<dyn Widget> {
        if let Some(constructor) = self.constructors.get(&data.object_type) {
            return constructor(data);
        }
        trace!(
            "no constructor registered for object type '{}', using generic widget",
            data.object_type
        );
        Box::new(GenericWidget::from_data(data))
    }
}

/// Per-objectType property defaults, applied for any property not
/// explicitly present in a descriptor before the widget is built.
#[derive(Debug, Default)]
pub struct DefaultValues {
    per_type: HashMap<String, Map<String, Value>>,
}

impl DefaultValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, object_type: impl Into<String>, defaults: Map<String, Value>) {
        self.per_type
            .entry(object_type.into())
            .or_default()
            .extend(defaults);
    }

    pub fn apply(&self, data: &mut AdapterData) {
        let Some(defaults) = self.per_type.get(&data.object_type) else {
            return;
        };
        for (name, value) in defaults {
            if !data.properties.contains_key(name) {
                data.properties.insert(name.clone(), value.clone());
            }
        }
    }
}
