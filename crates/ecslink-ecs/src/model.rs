//! Raw `getECSData` payload as sent by the engine.
//!
//! Field names follow the engine's camelCase keys. Every list defaults to
//! empty so partial payloads still decode.

use serde::{Deserialize, Serialize};

use crate::error::EcsError;

/// A component reference: a name and the declared C++/script type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDesc {
    pub name: String,
    #[serde(rename = "type", default)]
    pub type_name: String,
}

impl ComponentDesc {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// An entity template: a named, ordered set of components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateData {
    pub name: String,
    #[serde(default)]
    pub components: Vec<ComponentDesc>,
}

/// A native system or query with its component requirements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemData {
    pub name: String,
    /// Components the system function takes as arguments.
    #[serde(default)]
    pub components: Vec<ComponentDesc>,
    #[serde(default)]
    pub have_components: Vec<ComponentDesc>,
    #[serde(default)]
    pub not_have_components: Vec<ComponentDesc>,
    #[serde(default)]
    pub is_true_components: Vec<ComponentDesc>,
    #[serde(default)]
    pub is_false_components: Vec<ComponentDesc>,
}

/// A system declared in script. Only argument components are reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptSystemData {
    pub name: String,
    #[serde(default)]
    pub components: Vec<ComponentDesc>,
}

/// The whole payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EcsData {
    #[serde(default)]
    pub templates: Vec<TemplateData>,
    #[serde(default)]
    pub systems: Vec<SystemData>,
    #[serde(default)]
    pub script_systems: Vec<ScriptSystemData>,
}

impl EcsData {
    /// Decode from a JSON value, e.g. the `getECSData` member of a reply.
    pub fn from_value(value: serde_json::Value) -> Result<Self, EcsError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Decode from JSON text.
    pub fn from_json(text: &str) -> Result<Self, EcsError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Decode from a serialized BSON document.
    pub fn from_bson(bytes: &[u8]) -> Result<Self, EcsError> {
        Ok(bson::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_json_reads_camel_case_lists() {
        let data = EcsData::from_json(
            r#"{
                "templates": [{"name": "Ball", "components": [{"type": "Vec3", "name": "pos"}]}],
                "systems": [{
                    "name": "exec_move",
                    "components": [{"type": "Vec3", "name": "pos"}],
                    "haveComponents": [{"type": "Tag", "name": "alive"}],
                    "notHaveComponents": [{"type": "Tag", "name": "frozen"}],
                    "isTrueComponents": [],
                    "isFalseComponents": [{"type": "bool", "name": "sleeping"}]
                }],
                "scriptSystems": [{"name": "bounce", "components": []}]
            }"#,
        )
        .unwrap();

        assert_eq!(data.templates[0].components[0].type_name, "Vec3");
        assert_eq!(data.systems[0].have_components[0].name, "alive");
        assert_eq!(data.systems[0].not_have_components[0].name, "frozen");
        assert_eq!(data.systems[0].is_false_components[0].name, "sleeping");
        assert_eq!(data.script_systems[0].name, "bounce");
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let data = EcsData::from_value(json!({"systems": [{"name": "query_all"}]})).unwrap();
        assert!(data.templates.is_empty());
        assert!(data.script_systems.is_empty());
        assert!(data.systems[0].components.is_empty());
        assert!(data.systems[0].not_have_components.is_empty());
    }

    #[test]
    fn wrong_shape_is_decode_error() {
        let err = EcsData::from_value(json!({"templates": "nope"})).unwrap_err();
        assert!(matches!(err, EcsError::Decode(_)));
    }

    #[test]
    fn from_bson_reads_document() {
        let doc = bson::doc! {
            "templates": [ { "name": "Ball", "components": [ { "type": "Vec3", "name": "pos" } ] } ],
            "systems": [ { "name": "exec_move", "components": [ { "type": "Vec3", "name": "pos" } ] } ],
        };
        let mut bytes = Vec::new();
        doc.to_writer(&mut bytes).unwrap();

        let data = EcsData::from_bson(&bytes).unwrap();
        assert_eq!(data.templates[0].name, "Ball");
        assert_eq!(data.systems[0].components[0], ComponentDesc::new("pos", "Vec3"));
    }
}
