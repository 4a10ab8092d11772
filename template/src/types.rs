//! Wire types for the remote config service.
//!
//! The server document can grow fields we do not model (conditions,
//! parameter groups, per-condition values). Every struct carries a flattened
//! passthrough map so a fetch → publish round trip leaves those untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, HashMap};

/// The authoritative server-side template for one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteTemplate {
    /// Parameter key to definition. Empty for a freshly-created project.
    #[serde(default)]
    pub parameters: BTreeMap<String, Parameter>,

    /// Version metadata of the fetched revision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<TemplateVersion>,

    /// Other top-level fields (`conditions`, `parameterGroups`, future
    /// fields), passed through as-is.
    #[serde(flatten)]
    pub extra_fields: HashMap<String, JsonValue>,
}

impl RemoteTemplate {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// A single parameter definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<ParameterValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ValueType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Per-parameter fields we do not touch (`conditionalValues`).
    #[serde(flatten)]
    pub extra_fields: HashMap<String, JsonValue>,
}

/// The default value slot of a parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// `useInAppDefault` and friends.
    #[serde(flatten)]
    pub extra_fields: HashMap<String, JsonValue>,
}

impl ParameterValue {
    pub fn new(value: impl Into<String>) -> Self {
        ParameterValue {
            value: Some(value.into()),
            extra_fields: HashMap::new(),
        }
    }
}

/// Declared type of a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueType {
    #[default]
    String,
    Boolean,
    Number,
    Json,
    /// Catch-all so an unknown wire tag does not fail the whole fetch.
    #[serde(other, rename = "PARAMETER_VALUE_TYPE_UNSPECIFIED")]
    Unspecified,
}

impl ValueType {
    /// Resolve the tag of a locally-authored entry. Absent or unrecognized
    /// tags fall back to `String`.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("BOOLEAN") => ValueType::Boolean,
            Some("NUMBER") => ValueType::Number,
            Some("JSON") => ValueType::Json,
            _ => ValueType::String,
        }
    }
}

/// Version record attached to a template revision.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateVersion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_origin: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_type: Option<String>,

    /// `updateUser` and future fields.
    #[serde(flatten)]
    pub extra_fields: HashMap<String, JsonValue>,
}
