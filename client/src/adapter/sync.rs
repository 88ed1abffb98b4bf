use std::collections::HashMap;

use serde_json::Value;

use crate::{adapter::Adapter, adapter::SyncError, session::Session};

/// Handler applying one incoming property to the local widget. The
/// receiving adapter is taken out of the registry for the duration of
/// the dispatch, so the handler gets both the adapter and the session.
pub type SyncFn = fn(&mut Adapter, &mut Session, &str, Value) -> Result<(), SyncError>;

/// Handler overriding how one property's local change is sent to the
/// server.
pub type SendFn = fn(&mut Adapter, &mut Session, &str, &Value);

/// Per-property sync dispatch, populated at adapter construction.
/// Properties without a registered handler fall through to the default
/// handler (scalar write, or relational sync for widget-valued
/// properties).
#[derive(Debug, Default)]
pub struct SyncTable {
    handlers: HashMap<String, SyncFn>,
    order: Vec<String>,
}

impl SyncTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, property: impl Into<String>, handler: SyncFn) {
        self.handlers.insert(property.into(), handler);
    }

    pub fn handler(&self, property: &str) -> Option<SyncFn> {
        self.handlers.get(property).copied()
    }

    /// Installs a priority order for property application, for adapters
    /// where one property's setter depends on another already being
    /// applied (e.g. `rows` after `columns`).
    pub fn set_order(&mut self, order: Vec<String>) {
        self.order = order;
    }

    /// Orders an incoming property batch for application.
    ///
    /// Names on the priority list come first, in list order; the rest
    /// keep the order the server listed them. Without a priority list
    /// the server order is used as-is. Beyond these two rules the
    /// ordering is unspecified; callers must not rely on incidental
    /// encoding behavior.
    pub fn order_property_names_on_sync(&self, names: &[String]) -> Vec<String> {
        if self.order.is_empty() {
            return names.to_vec();
        }
        let mut ordered = Vec::with_capacity(names.len());
        for name in &self.order {
            if names.contains(name) {
                ordered.push(name.clone());
            }
        }
        for name in names {
            if !self.order.contains(name) {
                ordered.push(name.clone());
            }
        }
        ordered
    }
}
