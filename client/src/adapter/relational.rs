use log::warn;
use serde_json::Value;

use tether_shared::AdapterId;

use crate::{
    adapter::{Adapter, SyncError},
    session::Session,
    widget::ResolvedChild,
};

/// Synchronizes a property whose value is one-or-many adapter ids.
///
/// The incoming references are resolved through the registry in the
/// order given by the server (the server treats that order as
/// canonical, including for pure reference properties). The diff
/// against the previously synchronized references decides lifecycles:
/// ids no longer referenced are destroyed only when owned by the
/// syncing adapter, new ids are created through the registry, and ids
/// present on both sides are left alone.
pub(crate) fn sync_relational_property(
    adapter: &mut Adapter,
    session: &mut Session,
    name: &str,
    value: &Value,
) -> Result<(), SyncError> {
    let strategy = session.config().child_resolution;

    let elements: Vec<&Value> = match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    let mut new_ids: Vec<AdapterId> = Vec::with_capacity(elements.len());
    for element in elements {
        match strategy.resolve(name, element)? {
            ResolvedChild::Reference(id) => new_ids.push(id),
            ResolvedChild::Inline(data) => {
                // Inline definitions behave like references whose
                // adapter data arrived in the same batch.
                let id = data.id.clone();
                session.stash_adapter_data(data);
                new_ids.push(id);
            }
        }
    }

    // Look up or create in server order. A reference that cannot be
    // materialized is dropped so the rest of the relation still syncs.
    let mut live_ids: Vec<AdapterId> = Vec::with_capacity(new_ids.len());
    for id in &new_ids {
        match session.get_or_create_adapter(id, adapter.id()) {
            Ok(_) => live_ids.push(id.clone()),
            Err(_) => {
                let err = SyncError::UnknownAdapterReference {
                    property: name.to_string(),
                    adapter_id: id.clone(),
                };
                warn!("dropping reference on adapter {}: {}", adapter.id(), err);
            }
        }
    }

    // Ids referenced before but absent from the new value are destroy
    // candidates; adapters owned elsewhere are never destroyed by a
    // relation change.
    let old_ids = adapter.relational_state(name);
    for old_id in &old_ids {
        if new_ids.contains(old_id) {
            continue;
        }
        if session.adapter_owner(old_id).as_ref() == Some(adapter.id()) {
            session.destroy_adapter(old_id);
        }
    }

    // Re-parent current children structurally (nesting, not ownership).
    for id in &live_ids {
        session.set_structural_parent(id, Some(adapter.id().clone()));
    }

    // Default render hook: write the resolved references back to the
    // widget, preserving the shape the server sent so the echo matches
    // the suppression entry seeded for this batch.
    let write_back = match value {
        Value::Null => Value::Null,
        Value::Array(_) => Value::Array(
            live_ids
                .iter()
                .map(|id| Value::String(id.as_str().to_string()))
                .collect(),
        ),
        _ => live_ids
            .first()
            .map(|id| Value::String(id.as_str().to_string()))
            .unwrap_or(Value::Null),
    };
    let events = adapter.widget_mut().set_property(name, write_back);
    adapter.handle_widget_events(session, events);

    adapter.set_relational_state(name, live_ids);
    Ok(())
}
