use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{error::WireError, AdapterId, RemoteEvent};

fn is_false(value: &bool) -> bool {
    !*value
}

/// Descriptor for one server-side object, sent alongside the event that
/// first references its id: `{id, objectType, ...initial properties}`.
///
/// `widget_properties` names the properties whose values are adapter ids
/// rather than plain data; relational sync resolves those through the
/// registry instead of treating them as opaque values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterData {
    pub id: AdapterId,
    pub object_type: String,
    /// Owner assigned by the server. Takes precedence over the owner the
    /// client would otherwise derive from the creation context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<AdapterId>,
    /// Marks a root-owned (global) object.
    #[serde(default, skip_serializing_if = "is_false")]
    pub global: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub widget_properties: Vec<String>,
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

impl AdapterData {
    pub fn new(id: impl Into<AdapterId>, object_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            object_type: object_type.into(),
            owner: None,
            global: false,
            widget_properties: Vec::new(),
            properties: Map::new(),
        }
    }

    /// Decodes an inline descriptor value, e.g. one embedded in a
    /// relational property by the local-inline child strategy.
    pub fn from_value(value: &Value) -> Result<Self, WireError> {
        serde_json::from_value(value.clone()).map_err(|source| WireError::InvalidMessage { source })
    }
}

/// One decoded server response: adapter descriptors keyed by id, plus
/// the events to dispatch in array order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IncomingMessage {
    #[serde(
        default,
        rename = "adapterData",
        skip_serializing_if = "HashMap::is_empty"
    )]
    pub adapter_data: HashMap<AdapterId, AdapterData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<RemoteEvent>,
}

impl IncomingMessage {
    pub fn decode(text: &str) -> Result<Self, WireError> {
        let message: Self =
            serde_json::from_str(text).map_err(|source| WireError::InvalidMessage { source })?;
        for (key, data) in &message.adapter_data {
            if key != &data.id {
                return Err(WireError::MismatchedAdapterDataKey {
                    key: key.clone(),
                    entry_id: data.id.clone(),
                });
            }
        }
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_adapter_data_with_initial_properties() {
        let message = IncomingMessage::decode(
            r#"{
                "adapterData": {
                    "7": {"id": "7", "objectType": "Generic", "visible": true, "text": "hi"}
                },
                "events": [
                    {"target": "7", "type": "property", "properties": {"visible": false}}
                ]
            }"#,
        )
        .unwrap();

        let data = &message.adapter_data[&AdapterId::new("7")];
        assert_eq!(data.object_type, "Generic");
        assert_eq!(data.properties.get("visible"), Some(&json!(true)));
        assert_eq!(data.properties.get("text"), Some(&json!("hi")));
        assert_eq!(message.events.len(), 1);
    }

    #[test]
    fn rejects_mismatched_adapter_data_key() {
        let result = IncomingMessage::decode(
            r#"{"adapterData": {"7": {"id": "8", "objectType": "Generic"}}, "events": []}"#,
        );
        assert!(matches!(
            result,
            Err(WireError::MismatchedAdapterDataKey { .. })
        ));
    }

    #[test]
    fn widget_properties_marker_is_decoded() {
        let data = AdapterData::from_value(&json!({
            "id": "3",
            "objectType": "Group",
            "widgetProperties": ["fields"],
            "fields": ["4", "5"]
        }))
        .unwrap();
        assert_eq!(data.widget_properties, ["fields"]);
        assert_eq!(data.properties.get("fields"), Some(&json!(["4", "5"])));
    }
}
