mod error;
mod lifecycle;
mod relational;
mod sync;

pub use error::{AdapterError, SyncError};
pub use lifecycle::LifecycleState;
pub use sync::{SendFn, SyncFn, SyncTable};

use std::collections::{HashMap, HashSet};

use log::{debug, trace, warn};
use serde_json::{Map, Value};

use tether_shared::{
    AdapterData, AdapterId, EventHints, RemoteEvent, PROPERTY_EVENT_TYPE,
};

use crate::{
    filters::{PropertyChangeEventFilter, WidgetEventTypeFilter},
    session::Session,
    widget::{Widget, WidgetEvent},
};

/// Client-side proxy mirroring one server-side object.
///
/// The adapter exclusively owns its widget: it creates it and is the
/// only code path allowed to destroy it. Its `owner` is the adapter
/// responsible for destroying *it* (None only for the root adapter) and
/// is distinct from the widget's structural parent, which is used for
/// nesting alone.
pub struct Adapter {
    id: AdapterId,
    object_type: String,
    owner: Option<AdapterId>,
    widget: Box<dyn Widget>,
    /// Properties pushed to the server on local change; everything else
    /// is local-only.
    remote_properties: HashSet<String>,
    /// Last synchronized value of each relational property, for
    /// diffing.
    relational_state: HashMap<String, Vec<AdapterId>>,
    property_filter: PropertyChangeEventFilter,
    event_filter: WidgetEventTypeFilter,
    sync_table: SyncTable,
    send_overrides: HashMap<String, SendFn>,
    lifecycle: LifecycleState,
}

impl Adapter {
    /// Builds an initialized adapter from its descriptor. Construction
    /// alone leaves the adapter in `Initialized`; it synchronizes only
    /// once registered with a session and attached. Most adapters are
    /// built through [`Session::create_adapter`], which also derives the
    /// owner and resolves initial relational properties.
    pub fn new(
        data: &AdapterData,
        owner: Option<AdapterId>,
        widget: Box<dyn Widget>,
    ) -> Result<Self, AdapterError> {
        if data.id.as_str().is_empty() {
            return Err(AdapterError::MissingRequiredField { field: "id" });
        }
        if data.object_type.is_empty() {
            return Err(AdapterError::MissingRequiredField {
                field: "objectType",
            });
        }
        Ok(Self {
            id: data.id.clone(),
            object_type: data.object_type.clone(),
            owner,
            widget,
            remote_properties: HashSet::new(),
            relational_state: HashMap::new(),
            property_filter: PropertyChangeEventFilter::new(),
            event_filter: WidgetEventTypeFilter::new(),
            sync_table: SyncTable::new(),
            send_overrides: HashMap::new(),
            lifecycle: LifecycleState::Initialized,
        })
    }

    pub fn id(&self) -> &AdapterId {
        &self.id
    }

    pub fn object_type(&self) -> &str {
        &self.object_type
    }

    pub fn owner(&self) -> Option<&AdapterId> {
        self.owner.as_ref()
    }

    pub fn lifecycle(&self) -> LifecycleState {
        self.lifecycle
    }

    pub fn widget(&self) -> &dyn Widget {
        self.widget.as_ref()
    }

    pub fn widget_mut(&mut self) -> &mut dyn Widget {
        self.widget.as_mut()
    }

    /// Marks a property as pushed to the server on local change.
    pub fn mark_remote_property(&mut self, name: impl Into<String>) {
        self.remote_properties.insert(name.into());
    }

    pub fn sync_table_mut(&mut self) -> &mut SyncTable {
        &mut self.sync_table
    }

    /// Installs a send override invoked instead of the default
    /// property-change send for `name`.
    pub fn register_send_override(&mut self, name: impl Into<String>, handler: SendFn) {
        self.send_overrides.insert(name.into(), handler);
    }

    pub fn property_filter_mut(&mut self) -> &mut PropertyChangeEventFilter {
        &mut self.property_filter
    }

    pub fn event_filter_mut(&mut self) -> &mut WidgetEventTypeFilter {
        &mut self.event_filter
    }

    pub(crate) fn relational_state(&self, name: &str) -> Vec<AdapterId> {
        self.relational_state.get(name).cloned().unwrap_or_default()
    }

    pub(crate) fn set_relational_state(&mut self, name: &str, ids: Vec<AdapterId>) {
        self.relational_state.insert(name.to_string(), ids);
    }

    /// References currently held by a relational property, in server
    /// order.
    pub fn relational_references(&self, name: &str) -> Vec<AdapterId> {
        self.relational_state(name)
    }

    // Lifecycle

    /// Installs the internal widget listener. First attach moves
    /// `Initialized → Attached`; attaching an already-attached adapter
    /// is a no-op, re-attaching a detached one resumes synchronization.
    pub fn attach(&mut self) -> Result<(), AdapterError> {
        match self.lifecycle {
            LifecycleState::Destroyed => Err(self.use_after_destroy("attach")),
            _ => {
                self.lifecycle = LifecycleState::Attached;
                Ok(())
            }
        }
    }

    /// Suspends the internal widget listener without destroying the
    /// widget or giving up the id (e.g. while offline).
    pub fn detach(&mut self) -> Result<(), AdapterError> {
        match self.lifecycle {
            LifecycleState::Destroyed => Err(self.use_after_destroy("detach")),
            LifecycleState::Attached => {
                self.lifecycle = LifecycleState::Detached;
                Ok(())
            }
            other => {
                trace!(
                    "detach of adapter {} in state {} is a no-op",
                    self.id,
                    other.name()
                );
                Ok(())
            }
        }
    }

    /// Destroys this adapter: cascades over every adapter it owns, then
    /// destroys its own widget, then unregisters. Idempotent, and safe
    /// against re-entrant destroy calls triggered by widget destroy
    /// events.
    pub fn destroy(&mut self, session: &mut Session) {
        if self.lifecycle.is_destroyed() {
            return;
        }
        // Terminal from here on; re-entrant destroys become no-ops.
        self.lifecycle = LifecycleState::Destroyed;

        // The cascade must fully complete before the owner's widget
        // goes away, so no owned adapter observes a dangling parent.
        for owned_id in session.owned_by(&self.id) {
            session.destroy_adapter(&owned_id);
        }

        // Listener is logically detached already; discard whatever the
        // widget emits on the way out.
        let _ = self.widget.destroy();

        session.unregister_adapter(&self.id);
        debug!("destroyed adapter {} ({})", self.id, self.object_type);
    }

    // Server → client

    /// Dispatch point for server-originated events. Property batches
    /// seed the echo-suppression filter and run ordered property sync;
    /// everything else is a model action.
    pub fn on_model_event(
        &mut self,
        session: &mut Session,
        event: &RemoteEvent,
    ) -> Result<(), AdapterError> {
        self.guard_destroyed("dispatch model event")?;
        if event.event_type == PROPERTY_EVENT_TYPE {
            self.property_filter
                .add_filter_for_properties(&event.properties);
            self.sync_properties(session, &event.properties);
            Ok(())
        } else {
            self.on_model_action(session, event);
            Ok(())
        }
    }

    /// Applies one property batch in the order produced by
    /// [`SyncTable::order_property_names_on_sync`]. A property that
    /// fails to sync is logged and skipped; the rest of the batch
    /// proceeds.
    fn sync_properties(&mut self, session: &mut Session, properties: &Map<String, Value>) {
        let names: Vec<String> = properties.keys().cloned().collect();
        for name in self.sync_table.order_property_names_on_sync(&names) {
            let Some(value) = properties.get(&name) else {
                continue;
            };
            let result = match self.sync_table.handler(&name) {
                Some(handler) => handler(self, session, &name, value.clone()),
                None => self.sync_property_default(session, &name, value),
            };
            if let Err(err) = result {
                warn!("skipping property '{}' on adapter {}: {}", name, self.id, err);
            }
            if self.lifecycle.is_destroyed() {
                // A sync destroyed this adapter through its widget.
                break;
            }
        }
    }

    /// Default per-property handler: relational sync for widget-valued
    /// properties, a plain widget write for everything else.
    pub fn sync_property_default(
        &mut self,
        session: &mut Session,
        name: &str,
        value: &Value,
    ) -> Result<(), SyncError> {
        if self.widget.is_widget_property(name) {
            relational::sync_relational_property(self, session, name, value)
        } else {
            let events = self.widget.set_property(name, value.clone());
            self.handle_widget_events(session, events);
            Ok(())
        }
    }

    /// Default action handling: the widget's action vocabulary is the
    /// open extension point; anything it does not recognize is logged
    /// and ignored so newer servers stay compatible.
    pub fn on_model_action(&mut self, _session: &mut Session, event: &RemoteEvent) {
        if self.widget.invoke_action(&event.event_type, &event.data) {
            return;
        }
        warn!(
            "model action '{}' is not supported by adapter {} ({})",
            event.event_type, self.id, self.object_type
        );
    }

    // Client → server

    /// Wraps `(id, type, data)` as a [`RemoteEvent`], copies the
    /// non-persisted transport hints onto it, and hands it to the
    /// session transport with the requested delay. Fire-and-forget.
    pub fn send(
        &mut self,
        session: &mut Session,
        event_type: &str,
        data: Map<String, Value>,
        hints: EventHints,
    ) -> Result<(), AdapterError> {
        self.guard_destroyed("send")?;
        let mut event = if event_type == PROPERTY_EVENT_TYPE {
            RemoteEvent::property(self.id.clone(), data)
        } else {
            RemoteEvent::action(self.id.clone(), event_type, data)
        };
        event.hints.coalesce = hints.coalesce;
        event.hints.new_request = hints.new_request;
        event.hints.show_busy_indicator = hints.show_busy_indicator;
        session.send_event(event, hints.delay);
        Ok(())
    }

    /// The single internal listener on the widget's event stream.
    /// Destroy events tear the adapter down; property changes are
    /// checked against the echo-suppression filter and the
    /// remote-property set; other events are forwarded as actions
    /// unless the event-type filter suppresses them.
    pub(crate) fn handle_widget_events(
        &mut self,
        session: &mut Session,
        events: Vec<WidgetEvent>,
    ) {
        for event in events {
            if !self.lifecycle.is_attached() {
                // Listener removed (detached) or adapter destroyed.
                return;
            }
            self.handle_widget_event(session, event);
        }
    }

    fn handle_widget_event(&mut self, session: &mut Session, event: WidgetEvent) {
        if let WidgetEvent::Destroy = event {
            self.destroy(session);
            return;
        }
        if self.event_filter.filter(&event) {
            trace!(
                "suppressed {} event from widget of adapter {}",
                event.event_type(),
                self.id
            );
            return;
        }
        match event {
            WidgetEvent::PropertyChange { name, value } => {
                if self.property_filter.filter(&name, &value) {
                    trace!(
                        "suppressed echo of property '{}' on adapter {}",
                        name,
                        self.id
                    );
                    return;
                }
                if !self.remote_properties.contains(&name) {
                    return;
                }
                let prepared = self.prepare_remote_value(&name, value);
                if let Some(handler) = self.send_overrides.get(&name).copied() {
                    handler(self, session, &name, &prepared);
                } else {
                    let mut properties = Map::new();
                    properties.insert(name, prepared);
                    if let Err(err) =
                        self.send(session, PROPERTY_EVENT_TYPE, properties, EventHints::default())
                    {
                        warn!("dropping outgoing property event from adapter {}: {}", self.id, err);
                    }
                }
            }
            WidgetEvent::Action { event_type, data } => {
                if let Err(err) = self.send(session, &event_type, data, EventHints::default()) {
                    warn!(
                        "dropping outgoing '{}' event from adapter {}: {}",
                        event_type, self.id, err
                    );
                }
            }
            WidgetEvent::Destroy => unreachable!("handled above"),
        }
    }

    /// Prepares a local property value for the wire. Widget-valued
    /// properties already hold adapter ids in this model, so the value
    /// passes through; concrete adapters with richer widget values hook
    /// in via send overrides.
    fn prepare_remote_value(&self, _name: &str, value: Value) -> Value {
        value
    }

    /// Drops all suppression entries. Called by the session at the end
    /// of every dispatch turn that touched this adapter, and when a
    /// batch of outgoing events is flushed.
    pub fn reset_event_filters(&mut self) {
        self.property_filter.reset();
    }

    fn guard_destroyed(&self, operation: &'static str) -> Result<(), AdapterError> {
        if self.lifecycle.is_destroyed() {
            return Err(self.use_after_destroy(operation));
        }
        Ok(())
    }

    fn use_after_destroy(&self, operation: &'static str) -> AdapterError {
        AdapterError::UseAfterDestroy {
            adapter_id: self.id.clone(),
            operation,
        }
    }
}
