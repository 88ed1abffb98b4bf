mod error;
mod object_factory;
mod transport;

pub use error::SessionError;
pub use object_factory::{DefaultValues, ObjectFactory, WidgetConstructor};
pub use transport::{EventTransport, NullTransport};

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use log::{debug, trace, warn};
use serde_json::Value;

use tether_shared::{
    root_adapter_id, AdapterData, AdapterId, IncomingMessage, RemoteEvent,
};

use crate::{
    adapter::{Adapter, AdapterError},
    widget::{ChildResolution, GenericWidget},
};

/// Session-level model action destroying one adapter on the client
/// after the server disposed it.
const DISPOSE_ADAPTER_ACTION: &str = "disposeAdapter";

#[derive(Clone, Copy, Debug, Default)]
pub struct SessionConfig {
    /// When enabled, a pristine deep copy of every adapter descriptor
    /// is retained for inspection/export, so widget construction never
    /// mutates the recorded server payload.
    pub inspector_enabled: bool,
    /// How relational child values are resolved, chosen once at setup.
    pub child_resolution: ChildResolution,
}

/// The session owns the adapter registry — the one shared mutable
/// resource of the core. All registration and unregistration funnels
/// through it, lookups are O(1) by id, and no adapter keeps a shadow
/// registry of its own.
///
/// Incoming messages are dispatched per event in array order; the
/// targeted adapter is taken out of the registry for the duration of
/// its handler so it can freely create and destroy other adapters, and
/// is reinserted afterwards unless the handler destroyed it.
pub struct Session {
    config: SessionConfig,
    adapters: HashMap<AdapterId, Adapter>,
    /// Descriptors received with a message, consumed on first read.
    adapter_data_cache: HashMap<AdapterId, AdapterData>,
    /// Pristine descriptors kept when the inspector is enabled.
    inspected_data: HashMap<AdapterId, AdapterData>,
    object_factory: ObjectFactory,
    default_values: DefaultValues,
    transport: Box<dyn EventTransport>,
    /// Adapters touched by the current dispatch turn; their suppression
    /// filters are reset when the turn completes.
    touched: HashSet<AdapterId>,
    /// Ids of adapters currently taken out of the map while their
    /// handler runs. They are still live: a relational reference to a
    /// taken-out id (a back-reference within the same batch) must
    /// resolve, not fall through to the adapter-data cache.
    in_dispatch: HashSet<AdapterId>,
}

impl Session {
    pub fn new(
        config: SessionConfig,
        object_factory: ObjectFactory,
        default_values: DefaultValues,
        transport: Box<dyn EventTransport>,
    ) -> Self {
        let mut session = Self {
            config,
            adapters: HashMap::new(),
            adapter_data_cache: HashMap::new(),
            inspected_data: HashMap::new(),
            object_factory,
            default_values,
            transport,
            touched: HashSet::new(),
            in_dispatch: HashSet::new(),
        };

        // The root adapter anchors ownership: globally owned adapters
        // hang off it, and unknown event targets are created under it.
        let root_data = AdapterData::new(root_adapter_id(), "RootAdapter");
        let widget = Box::new(GenericWidget::from_data(&root_data));
        let mut root = Adapter::new(&root_data, None, widget)
            .expect("root adapter descriptor is well-formed");
        root.attach()
            .expect("root adapter attaches from Initialized");
        session.adapters.insert(root_data.id, root);
        session
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // Registry

    pub fn register_adapter(&mut self, adapter: Adapter) -> Result<(), SessionError> {
        if adapter.id().as_str().is_empty() {
            return Err(AdapterError::MissingRequiredField { field: "id" }.into());
        }
        if self.adapters.contains_key(adapter.id()) {
            return Err(SessionError::DuplicateAdapterId {
                adapter_id: adapter.id().clone(),
            });
        }
        self.adapters.insert(adapter.id().clone(), adapter);
        Ok(())
    }

    pub fn unregister_adapter(&mut self, id: &AdapterId) {
        if self.adapters.remove(id).is_some() {
            trace!("unregistered adapter {}", id);
        }
        self.touched.remove(id);
    }

    pub fn get_adapter(&self, id: &AdapterId) -> Option<&Adapter> {
        self.adapters.get(id)
    }

    pub fn get_adapter_mut(&mut self, id: &AdapterId) -> Option<&mut Adapter> {
        self.adapters.get_mut(id)
    }

    pub fn has_adapter(&self, id: &AdapterId) -> bool {
        self.adapters.contains_key(id)
    }

    pub fn adapter_count(&self) -> usize {
        self.adapters.len()
    }

    /// Owner of the given adapter, None when the adapter is not
    /// registered or is the root.
    pub fn adapter_owner(&self, id: &AdapterId) -> Option<AdapterId> {
        self.adapters.get(id).and_then(|adapter| adapter.owner().cloned())
    }

    /// Adapters currently owned by `owner`, in id order.
    pub fn owned_by(&self, owner: &AdapterId) -> Vec<AdapterId> {
        let mut owned: Vec<AdapterId> = self
            .adapters
            .values()
            .filter(|adapter| adapter.owner() == Some(owner))
            .map(|adapter| adapter.id().clone())
            .collect();
        owned.sort();
        owned
    }

    /// Looks up an adapter, creating it from cached adapter data when
    /// it does not exist yet. A server-sent owner in the data takes
    /// precedence over `fallback_owner`; descriptors marked global are
    /// owned by the root adapter regardless.
    pub fn get_or_create_adapter(
        &mut self,
        id: &AdapterId,
        fallback_owner: &AdapterId,
    ) -> Result<AdapterId, SessionError> {
        if self.adapters.contains_key(id) || self.in_dispatch.contains(id) {
            trace!("adapter {} already exists", id);
            return Ok(id.clone());
        }
        let Some(data) = self.adapter_data_cache.remove(id) else {
            return Err(SessionError::NoAdapterData {
                adapter_id: id.clone(),
            });
        };
        self.create_adapter(data, fallback_owner.clone())
    }

    /// Builds, registers, and attaches an adapter from a descriptor,
    /// then resolves its initial relational properties (which may
    /// create further adapters from the same batch).
    pub fn create_adapter(
        &mut self,
        mut data: AdapterData,
        fallback_owner: AdapterId,
    ) -> Result<AdapterId, SessionError> {
        if data.id.as_str().is_empty() {
            return Err(AdapterError::MissingRequiredField { field: "id" }.into());
        }
        if self.adapters.contains_key(&data.id) || self.in_dispatch.contains(&data.id) {
            return Err(SessionError::DuplicateAdapterId {
                adapter_id: data.id,
            });
        }

        if self.config.inspector_enabled {
            self.inspected_data.insert(data.id.clone(), data.clone());
        }
        self.default_values.apply(&mut data);

        let owner = if data.global {
            root_adapter_id()
        } else {
            data.owner.clone().unwrap_or(fallback_owner)
        };

        let widget = self.object_factory.create(&data);
        let mut adapter = Adapter::new(&data, Some(owner), widget)?;
        adapter.attach()?;

        let id = data.id.clone();
        debug!("created adapter {} ({})", id, data.object_type);
        self.adapters.insert(id.clone(), adapter);

        let relational: Vec<(String, Value)> = data
            .widget_properties
            .iter()
            .filter_map(|name| {
                data.properties
                    .get(name)
                    .map(|value| (name.clone(), value.clone()))
            })
            .collect();
        if !relational.is_empty() {
            if let Some(mut adapter) = self.adapters.remove(&id) {
                self.in_dispatch.insert(id.clone());
                for (name, value) in relational {
                    if let Err(err) = adapter.sync_property_default(self, &name, &value) {
                        warn!(
                            "skipping initial property '{}' on adapter {}: {}",
                            name, id, err
                        );
                    }
                }
                self.in_dispatch.remove(&id);
                if !adapter.lifecycle().is_destroyed() {
                    self.adapters.insert(id.clone(), adapter);
                }
            }
        }

        Ok(id)
    }

    /// Destroys an adapter and everything it transitively owns.
    /// Unknown ids are already-destroyed no-ops, which keeps cascades
    /// re-entrancy safe.
    pub fn destroy_adapter(&mut self, id: &AdapterId) {
        let Some(mut adapter) = self.adapters.remove(id) else {
            trace!("destroy of unregistered adapter {} ignored", id);
            return;
        };
        adapter.destroy(self);
        self.touched.remove(id);
    }

    // Adapter data

    /// Stashes descriptors arriving with a message. Each entry is
    /// consumed by the first lookup; an id can only be materialized
    /// once.
    pub fn stash_adapter_data(&mut self, data: AdapterData) {
        self.adapter_data_cache.insert(data.id.clone(), data);
    }

    pub fn has_adapter_data(&self, id: &AdapterId) -> bool {
        self.adapter_data_cache.contains_key(id)
    }

    /// Pristine descriptor recorded for inspection, when the inspector
    /// is enabled.
    pub fn inspected_data(&self, id: &AdapterId) -> Option<&AdapterData> {
        self.inspected_data.get(id)
    }

    // Dispatch

    /// Applies one decoded server response: descriptors are stashed,
    /// then events dispatch in array order. A failing event is logged
    /// and does not block the rest of the batch. When the turn
    /// completes, the suppression filters of every touched adapter are
    /// reset so no one-shot entry outlives the turn it was seeded for.
    pub fn dispatch_incoming(&mut self, message: IncomingMessage) {
        debug!(
            "dispatching {} events ({} adapter data entries)",
            message.events.len(),
            message.adapter_data.len()
        );
        for (_, data) in message.adapter_data {
            self.stash_adapter_data(data);
        }
        for event in message.events {
            let target = event.target.clone();
            if let Err(err) = self.dispatch_event(event) {
                warn!("dropping event for adapter {}: {}", target, err);
            }
        }
        self.reset_touched_filters();
    }

    fn dispatch_event(&mut self, event: RemoteEvent) -> Result<(), SessionError> {
        debug!(
            "processing event '{}' for adapter {}",
            event.event_type, event.target
        );

        if event.target.is_root() && event.event_type == DISPOSE_ADAPTER_ACTION {
            self.on_dispose_adapter(&event);
            return Ok(());
        }

        let id = event.target.clone();
        if !self.adapters.contains_key(&id) {
            // First reference to this id: materialize it under the root.
            self.get_or_create_adapter(&id, &root_adapter_id())?;
        }
        let Some(mut adapter) = self.adapters.remove(&id) else {
            return Err(SessionError::AdapterNotRegistered { adapter_id: id });
        };
        self.in_dispatch.insert(id.clone());
        self.touched.insert(id.clone());
        let result = adapter.on_model_event(self, &event);
        self.in_dispatch.remove(&id);
        if !adapter.lifecycle().is_destroyed() {
            self.adapters.insert(id, adapter);
        }
        result.map_err(Into::into)
    }

    fn on_dispose_adapter(&mut self, event: &RemoteEvent) {
        let Some(id) = event.data.get("adapter").and_then(Value::as_str) else {
            warn!("disposeAdapter event without an 'adapter' id");
            return;
        };
        let id = AdapterId::new(id);
        if self.adapters.contains_key(&id) {
            self.destroy_adapter(&id);
        } else {
            // The adapter may never have been materialized on the
            // client, e.g. it lived and died within one request.
            trace!("disposeAdapter for unknown adapter {} ignored", id);
        }
    }

    /// Entry point for user-driven widget events. Events for detached
    /// adapters are dropped (the listener is suspended); events for
    /// unknown ids are an error.
    pub fn process_widget_event(
        &mut self,
        id: &AdapterId,
        event: crate::widget::WidgetEvent,
    ) -> Result<(), SessionError> {
        let Some(mut adapter) = self.adapters.remove(id) else {
            return Err(SessionError::AdapterNotRegistered {
                adapter_id: id.clone(),
            });
        };
        self.in_dispatch.insert(id.clone());
        adapter.handle_widget_events(self, vec![event]);
        self.in_dispatch.remove(id);
        if !adapter.lifecycle().is_destroyed() {
            self.adapters.insert(id.clone(), adapter);
        }
        Ok(())
    }

    // Outgoing

    /// Forwards an event to the transport. Fire-and-forget; queuing and
    /// ordering beyond this point are the transport's concern.
    pub fn send_event(&mut self, event: RemoteEvent, delay: Option<Duration>) {
        self.transport.deliver(event, delay);
    }

    /// Hook for the transport: a batch of outgoing events was flushed,
    /// so no suppression entry may survive into the next turn.
    pub fn notify_flushed(&mut self) {
        for adapter in self.adapters.values_mut() {
            adapter.reset_event_filters();
        }
        self.touched.clear();
    }

    /// Records the structural (nesting) parent of a widget. Structural
    /// parentage is independent of ownership and never drives destroy
    /// cascades.
    pub fn set_structural_parent(&mut self, id: &AdapterId, parent: Option<AdapterId>) {
        if let Some(adapter) = self.adapters.get_mut(id) {
            adapter.widget_mut().set_parent(parent);
        }
    }

    fn reset_touched_filters(&mut self) {
        let touched: Vec<AdapterId> = self.touched.drain().collect();
        for id in touched {
            if let Some(adapter) = self.adapters.get_mut(&id) {
                adapter.reset_event_filters();
            }
        }
    }
}
