use serde_json::Value;

use tether_shared::{AdapterData, AdapterId};

use crate::adapter::SyncError;

/// One element of a relational property value, resolved by a
/// [`ChildResolution`] strategy.
#[derive(Clone, Debug, PartialEq)]
pub enum ResolvedChild {
    /// A remote reference: the child already has (or is about to get)
    /// an adapter under this id.
    Reference(AdapterId),
    /// An inline local definition carrying its own descriptor.
    Inline(AdapterData),
}

/// Strategy deciding how a generic "create child" value is resolved.
/// Selected once at session setup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChildResolution {
    /// Child values must be adapter ids resolved through the registry
    /// and the adapter-data cache.
    #[default]
    RemoteReference,
    /// Child values may also be inline descriptor objects, instantiated
    /// locally without server-provided adapter data.
    LocalInline,
}

impl ChildResolution {
    /// Resolves one element of a relational property value. `property`
    /// is only used for diagnostics.
    pub fn resolve(&self, property: &str, value: &Value) -> Result<ResolvedChild, SyncError> {
        match value {
            Value::String(id) => Ok(ResolvedChild::Reference(AdapterId::new(id.as_str()))),
            Value::Object(_) if *self == ChildResolution::LocalInline => {
                let data = AdapterData::from_value(value).map_err(|_| {
                    SyncError::MalformedReference {
                        property: property.to_string(),
                    }
                })?;
                Ok(ResolvedChild::Inline(data))
            }
            _ => Err(SyncError::MalformedReference {
                property: property.to_string(),
            }),
        }
    }
}
